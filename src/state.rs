//! Workflow states, actions and the static transition table.
//!
//! The transition table and the action resolver are fixed at compile time.
//! An action always resolves to the same target state regardless of where
//! the article currently is; whether that target is reachable is a separate
//! question answered by [`WorkflowState::can_transition_to`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The editorial state of an article.
///
/// An article is in exactly one of these states at any time. [`Archived`]
/// is terminal.
///
/// [`Archived`]: WorkflowState::Archived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Being written; not visible to editors.
    Draft,

    /// Submitted and waiting for a reviewer.
    PendingReview,

    /// A reviewer is looking at it.
    InReview,

    /// Passed review; may be published or scheduled.
    Approved,

    /// Turned down by a reviewer.
    Rejected,

    /// Sent back to the writer with feedback.
    RevisionRequested,

    /// Approved and waiting for its publication time.
    Scheduled,

    /// Live.
    Published,

    /// Retired. No further transitions are possible.
    Archived,
}

impl WorkflowState {
    /// Every state, in declaration order.
    pub const ALL: [WorkflowState; 9] = [
        WorkflowState::Draft,
        WorkflowState::PendingReview,
        WorkflowState::InReview,
        WorkflowState::Approved,
        WorkflowState::Rejected,
        WorkflowState::RevisionRequested,
        WorkflowState::Scheduled,
        WorkflowState::Published,
        WorkflowState::Archived,
    ];

    /// Returns the states reachable from this one in a single transition.
    pub fn legal_targets(self) -> &'static [WorkflowState] {
        use WorkflowState::*;
        match self {
            Draft => &[PendingReview],
            PendingReview => &[InReview, Draft],
            InReview => &[Approved, Rejected, RevisionRequested],
            Approved => &[Scheduled, Published, RevisionRequested],
            Rejected => &[Draft, Archived],
            RevisionRequested => &[Draft, PendingReview],
            Scheduled => &[Published, Draft],
            Published => &[Archived],
            Archived => &[],
        }
    }

    /// Returns true if `target` is a legal next state.
    pub fn can_transition_to(self, target: WorkflowState) -> bool {
        self.legal_targets().contains(&target)
    }

    /// Returns true if no transition leaves this state.
    pub fn is_terminal(self) -> bool {
        self.legal_targets().is_empty()
    }

    /// Returns the snake_case name used in storage and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowState::Draft => "draft",
            WorkflowState::PendingReview => "pending_review",
            WorkflowState::InReview => "in_review",
            WorkflowState::Approved => "approved",
            WorkflowState::Rejected => "rejected",
            WorkflowState::RevisionRequested => "revision_requested",
            WorkflowState::Scheduled => "scheduled",
            WorkflowState::Published => "published",
            WorkflowState::Archived => "archived",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        WorkflowState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("unknown workflow state: {}", s))
    }
}

/// A caller's intent, resolved to exactly one target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    /// Writer hands the draft to the editors.
    SubmitForReview,
    /// An editor picks the article up.
    AssignReviewer,
    /// Reviewer accepts the article.
    Approve,
    /// Reviewer turns the article down.
    Reject,
    /// Reviewer sends the article back with feedback.
    RequestRevision,
    /// Writer sends a revised article back to the queue.
    Resubmit,
    /// Publication is set for a future time.
    Schedule,
    /// Article goes live.
    Publish,
    /// Article is pulled back to draft.
    Unpublish,
    /// Article is retired.
    Archive,
}

impl WorkflowAction {
    /// Every action, in declaration order.
    pub const ALL: [WorkflowAction; 10] = [
        WorkflowAction::SubmitForReview,
        WorkflowAction::AssignReviewer,
        WorkflowAction::Approve,
        WorkflowAction::Reject,
        WorkflowAction::RequestRevision,
        WorkflowAction::Resubmit,
        WorkflowAction::Schedule,
        WorkflowAction::Publish,
        WorkflowAction::Unpublish,
        WorkflowAction::Archive,
    ];

    /// Resolves the action to its target state.
    ///
    /// The mapping ignores the article's current state.
    pub fn target_state(self) -> WorkflowState {
        match self {
            WorkflowAction::SubmitForReview => WorkflowState::PendingReview,
            WorkflowAction::AssignReviewer => WorkflowState::InReview,
            WorkflowAction::Approve => WorkflowState::Approved,
            WorkflowAction::Reject => WorkflowState::Rejected,
            WorkflowAction::RequestRevision => WorkflowState::RevisionRequested,
            WorkflowAction::Resubmit => WorkflowState::PendingReview,
            WorkflowAction::Schedule => WorkflowState::Scheduled,
            WorkflowAction::Publish => WorkflowState::Published,
            WorkflowAction::Unpublish => WorkflowState::Draft,
            WorkflowAction::Archive => WorkflowState::Archived,
        }
    }

    /// Returns the snake_case name used in storage and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowAction::SubmitForReview => "submit_for_review",
            WorkflowAction::AssignReviewer => "assign_reviewer",
            WorkflowAction::Approve => "approve",
            WorkflowAction::Reject => "reject",
            WorkflowAction::RequestRevision => "request_revision",
            WorkflowAction::Resubmit => "resubmit",
            WorkflowAction::Schedule => "schedule",
            WorkflowAction::Publish => "publish",
            WorkflowAction::Unpublish => "unpublish",
            WorkflowAction::Archive => "archive",
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        WorkflowAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("unknown workflow action: {}", s))
    }
}

/// Returns the actions that would succeed the legality check from `state`.
///
/// Useful for building action menus. Content checks are not considered.
pub fn available_actions(state: WorkflowState) -> Vec<WorkflowAction> {
    WorkflowAction::ALL
        .into_iter()
        .filter(|action| state.can_transition_to(action.target_state()))
        .collect()
}
