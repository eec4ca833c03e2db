//! # Quill
//!
//! An editorial workflow engine for a newsroom CMS.
//!
//! Quill governs how an article moves from draft to publication. It checks
//! every requested state change against a fixed transition table, enforces
//! content checks before certain states, records an immutable history, runs
//! side effects after each change (including at most one automatic
//! follow-up transition), notifies the people involved, and computes
//! pipeline analytics.
//!
//! It is designed for a **single-process service** where:
//!
//! - Articles live in an external store reached through [`ArticleStore`]
//! - Every committed transition is appended to a [`TransitionLog`]
//! - Reviewer assignment and notification delivery are pluggable ports
//! - Side-effect failures never roll back a committed transition
//!
//! ## Quick Example
//!
//! ```rust
//! use quill::{
//!     Article, ArticleStore, MemoryArticleStore, MemoryTransitionLog, WorkflowAction,
//!     WorkflowEngine, WorkflowState,
//! };
//!
//! # async fn example() -> quill::Result<()> {
//! let store = MemoryArticleStore::new();
//! store
//!     .insert_article(&Article::new(
//!         "a-1",
//!         "Dubai Launches New Metro Line",
//!         "The new line connects the airport to the old town. ".repeat(3),
//!         "writer1",
//!     ))
//!     .await?;
//!
//! let engine = WorkflowEngine::builder()
//!     .article_store(store.clone())
//!     .transition_log(MemoryTransitionLog::new())
//!     .build()?;
//!
//! let transition = engine
//!     .transition_article("a-1", WorkflowAction::SubmitForReview, "writer1", None, None)
//!     .await?;
//! assert_eq!(transition.to_state, WorkflowState::PendingReview);
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Philosophy
//!
//! The name comes from the **quill**, the editor's pen. Nothing reaches the
//! page without passing under it, and every stroke leaves a mark. Quill
//! keeps the same promise: no article changes state without a legal
//! transition, and no transition goes unrecorded.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![forbid(unsafe_code)]

pub mod actions;
pub mod analytics;
pub mod article;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
mod lock;
pub mod notification;
pub mod state;
pub mod store;
pub mod transition;
pub mod validation;

pub use actions::{LoggingReviewerAssigner, PostAction, ReviewerAssigner, MAX_CASCADE_DEPTH};
pub use analytics::{AnalyticsSnapshot, Bottleneck};
pub use article::{Article, ArticleUpdate};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::WorkflowConfig;
pub use engine::{WorkflowEngine, WorkflowEngineBuilder};
pub use error::{QuillError, Result};
pub use event::WorkflowEvent;
pub use notification::{
    MemoryNotifier, NotificationSender, NotificationType, TracingNotifier, WorkflowNotification,
};
pub use state::{available_actions, WorkflowAction, WorkflowState};
pub use store::{ArticleStore, MemoryArticleStore, MemoryTransitionLog, TransitionLog};
pub use transition::{TransitionRequest, WorkflowTransition};
pub use validation::ValidationFailure;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_returns_valid_semver() {
        let version = version();
        assert!(!version.is_empty());
        assert!(version.contains('.'));
    }
}
