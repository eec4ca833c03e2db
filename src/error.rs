//! Error types for the Quill workflow engine.
//!
//! This module defines the error types used throughout the crate, following
//! the non-exhaustive enum pattern to allow future error variants without
//! breaking compatibility.

use thiserror::Error;

use crate::validation::ValidationFailure;
use crate::{WorkflowAction, WorkflowState};

/// The main error type for Quill operations.
///
/// The first four variants are fatal to a transition and are always raised
/// before anything is written. The remaining variants come from
/// collaborators; the engine swallows [`QuillError::NotificationDelivery`] and
/// [`QuillError::PostAction`] once a transition has committed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuillError {
    /// No article exists with the given identifier.
    #[error("Article not found: {0}")]
    NotFound(String),

    /// The action's target state is not reachable from the current state.
    #[error("Invalid transition for article {article_id}: cannot {action} from {from} to {to}")]
    InvalidTransition {
        /// The article the action was attempted on.
        article_id: String,
        /// The requested action.
        action: WorkflowAction,
        /// The article's current state.
        from: WorkflowState,
        /// The state the action resolves to.
        to: WorkflowState,
    },

    /// A pre-transition content or quality check failed.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    /// The article changed between load and persist.
    #[error("Version conflict for article {article_id}: expected {expected}, found {actual}")]
    Conflict {
        /// The article being written.
        article_id: String,
        /// The version the writer loaded.
        expected: u64,
        /// The version currently stored.
        actual: u64,
    },

    /// A notification could not be delivered.
    #[error("Notification delivery failed: {0}")]
    NotificationDelivery(String),

    /// A post-transition side effect failed.
    #[error("Post-transition action failed: {0}")]
    PostAction(String),

    /// Error occurred in a storage adapter.
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration is invalid or incomplete.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error from file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuillError {
    /// Returns true if this error aborted a transition before any mutation.
    pub fn is_fatal_to_transition(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::InvalidTransition { .. }
                | Self::Validation(_)
                | Self::Conflict { .. }
        )
    }
}

/// A specialized `Result` type for Quill operations.
pub type Result<T> = std::result::Result<T, QuillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let error = QuillError::NotFound("article-1".to_string());
        assert_eq!(error.to_string(), "Article not found: article-1");
    }

    #[test]
    fn test_error_display_invalid_transition() {
        let error = QuillError::InvalidTransition {
            article_id: "a-1".to_string(),
            action: WorkflowAction::Approve,
            from: WorkflowState::Draft,
            to: WorkflowState::Approved,
        };
        assert_eq!(
            error.to_string(),
            "Invalid transition for article a-1: cannot approve from draft to approved"
        );
    }

    #[test]
    fn test_error_from_validation_failure() {
        let failure = ValidationFailure::TitleTooShort { actual: 9, min: 10 };
        let error: QuillError = failure.into();
        assert!(error.to_string().starts_with("Validation failed:"));
        assert!(matches!(
            error,
            QuillError::Validation(ValidationFailure::TitleTooShort { .. })
        ));
    }

    #[test]
    fn test_error_display_conflict() {
        let error = QuillError::Conflict {
            article_id: "a-1".to_string(),
            expected: 3,
            actual: 4,
        };
        assert_eq!(
            error.to_string(),
            "Version conflict for article a-1: expected 3, found 4"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: QuillError = io_error.into();
        assert!(error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(QuillError::NotFound("x".to_string()).is_fatal_to_transition());
        assert!(!QuillError::NotificationDelivery("smtp down".to_string()).is_fatal_to_transition());
        assert!(!QuillError::PostAction("assigner offline".to_string()).is_fatal_to_transition());
        assert!(!QuillError::Store("disk full".to_string()).is_fatal_to_transition());
    }
}
