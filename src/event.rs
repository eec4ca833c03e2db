//! Workflow events.
//!
//! This module provides [`WorkflowEvent`] for observing the engine. Events
//! are broadcast through a channel that can be subscribed to for
//! monitoring, auditing or building dashboards. Emitting never fails a
//! transition.

use crate::{NotificationType, WorkflowAction, WorkflowState};

/// An event emitted by the engine.
///
/// Events use `String` for article IDs to keep the type simple and easy to
/// serialize for logging or transmission.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum WorkflowEvent {
    /// A transition was persisted and logged.
    TransitionCommitted {
        /// The article's identifier.
        article_id: String,
        /// State before.
        from: WorkflowState,
        /// State after.
        to: WorkflowState,
        /// The action taken.
        action: WorkflowAction,
        /// Who took it.
        performed_by: String,
    },

    /// A transition was refused before anything was written.
    TransitionRejected {
        /// The article's identifier.
        article_id: String,
        /// The action that was refused.
        action: WorkflowAction,
        /// Why it was refused.
        error: String,
    },

    /// The reviewer-assignment collaborator ran.
    ReviewerAssigned {
        /// The article's identifier.
        article_id: String,
        /// The chosen reviewer, if the collaborator picked one.
        reviewer: Option<String>,
    },

    /// An approval cascaded into a follow-up transition.
    CascadeTriggered {
        /// The article's identifier.
        article_id: String,
        /// The follow-up action.
        action: WorkflowAction,
    },

    /// A post-transition side effect failed after commit.
    PostActionFailed {
        /// The article's identifier.
        article_id: String,
        /// The state whose side effect failed.
        state: WorkflowState,
        /// Error message describing the failure.
        error: String,
    },

    /// A notification was handed to the sender.
    NotificationSent {
        /// The article's identifier.
        article_id: String,
        /// Who it was addressed to.
        recipient: String,
        /// The kind of notification.
        kind: NotificationType,
    },

    /// A notification could not be delivered and was dropped.
    NotificationFailed {
        /// The article's identifier.
        article_id: String,
        /// Who it was addressed to.
        recipient: String,
        /// Error message describing the failure.
        error: String,
    },
}

impl WorkflowEvent {
    /// Returns the article ID for this event.
    pub fn article_id(&self) -> &str {
        match self {
            Self::TransitionCommitted { article_id, .. }
            | Self::TransitionRejected { article_id, .. }
            | Self::ReviewerAssigned { article_id, .. }
            | Self::CascadeTriggered { article_id, .. }
            | Self::PostActionFailed { article_id, .. }
            | Self::NotificationSent { article_id, .. }
            | Self::NotificationFailed { article_id, .. } => article_id,
        }
    }

    /// Returns true if this event reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::TransitionRejected { .. }
                | Self::PostActionFailed { .. }
                | Self::NotificationFailed { .. }
        )
    }
}
