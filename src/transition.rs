//! Transition records and requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{WorkflowAction, WorkflowState};

/// A committed change of an article's state.
///
/// Created once by the engine and never modified afterwards; the
/// [`TransitionLog`](crate::TransitionLog) owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTransition {
    /// Unique identifier.
    pub id: String,
    /// The article that moved.
    pub article_id: String,
    /// State before the transition.
    pub from_state: WorkflowState,
    /// State after the transition.
    pub to_state: WorkflowState,
    /// The action that caused it.
    pub action: WorkflowAction,
    /// Who performed it.
    pub performed_by: String,
    /// When it was committed.
    pub timestamp: DateTime<Utc>,
    /// Free-text reason, shown to the writer on rejection or revision.
    pub reason: Option<String>,
    /// Structured extras, such as `{"publishAt": ...}` for scheduling.
    pub metadata: Option<JsonValue>,
}

impl WorkflowTransition {
    /// Creates a record for a transition committed at `timestamp`.
    pub fn new(
        article_id: impl Into<String>,
        from_state: WorkflowState,
        request: &TransitionRequest,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            article_id: article_id.into(),
            from_state,
            to_state: request.action.target_state(),
            action: request.action,
            performed_by: request.performed_by.clone(),
            timestamp,
            reason: request.reason.clone(),
            metadata: request.metadata.clone(),
        }
    }
}

/// What a caller asks the engine to do to an article.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest {
    /// The requested action.
    pub action: WorkflowAction,
    /// Who is asking.
    pub performed_by: String,
    /// Optional reason.
    pub reason: Option<String>,
    /// Optional structured metadata.
    pub metadata: Option<JsonValue>,
}

impl TransitionRequest {
    /// Creates a request with no reason or metadata.
    pub fn new(action: WorkflowAction, performed_by: impl Into<String>) -> Self {
        Self {
            action,
            performed_by: performed_by.into(),
            reason: None,
            metadata: None,
        }
    }

    /// Attaches a reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches metadata.
    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Reads `metadata.publishAt` as an RFC 3339 timestamp, if present.
    pub fn publish_at(&self) -> Option<DateTime<Utc>> {
        self.metadata
            .as_ref()?
            .get("publishAt")?
            .as_str()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|at| at.with_timezone(&Utc))
    }
}
