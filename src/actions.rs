//! Post-transition side effects.
//!
//! Side effects are keyed on the state an article has just entered.
//! [`plan_post_actions`] decides what should happen; the engine carries the
//! plan out after the transition has been persisted. Failures while carrying
//! it out are logged and do not undo the transition.

use async_trait::async_trait;
use std::fmt::Debug;
use tracing::info;

use crate::{
    Article, Result, TransitionRequest, WorkflowAction, WorkflowConfig, WorkflowState,
    WorkflowTransition,
};

/// How many automatic follow-up transitions may chain off one request.
///
/// An approval may cascade into a publication; that publication may not
/// cascade again.
pub const MAX_CASCADE_DEPTH: usize = 1;

/// Reason recorded on the publication that follows a high-scoring approval.
pub const AUTO_PUBLISH_REASON: &str = "Auto-published after approval";

/// Picks a reviewer for a newly submitted article.
///
/// Category-aware selection lives outside this crate; implementations may
/// return `Ok(None)` to leave the article in the shared queue.
#[async_trait]
pub trait ReviewerAssigner: Debug + Send + Sync {
    /// Chooses a reviewer for `article`.
    async fn assign_reviewer(&self, article: &Article) -> Result<Option<String>>;
}

/// A reviewer assigner that only records the request in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReviewerAssigner;

#[async_trait]
impl ReviewerAssigner for LoggingReviewerAssigner {
    async fn assign_reviewer(&self, article: &Article) -> Result<Option<String>> {
        info!(
            article_id = %article.id,
            category = article.category.as_deref().unwrap_or("uncategorised"),
            "reviewer assignment requested"
        );
        Ok(None)
    }
}

/// A side effect to run after a transition commits.
#[derive(Debug, Clone, PartialEq)]
pub enum PostAction {
    /// Ask the [`ReviewerAssigner`] for a reviewer.
    AssignReviewer,
    /// Issue a follow-up transition.
    Cascade(TransitionRequest),
}

/// Decides the side effects for a committed transition.
///
/// `cascade_depth` is the number of automatic transitions already chained
/// to reach this one; no cascade is planned once it reaches
/// [`MAX_CASCADE_DEPTH`].
pub fn plan_post_actions(
    article: &Article,
    transition: &WorkflowTransition,
    config: &WorkflowConfig,
    cascade_depth: usize,
) -> Vec<PostAction> {
    match transition.to_state {
        WorkflowState::PendingReview => vec![PostAction::AssignReviewer],
        WorkflowState::Approved
            if article.ai_confidence_score >= config.auto_publish_score
                && cascade_depth < MAX_CASCADE_DEPTH =>
        {
            vec![PostAction::Cascade(
                TransitionRequest::new(WorkflowAction::Publish, config.system_actor.clone())
                    .with_reason(AUTO_PUBLISH_REASON),
            )]
        }
        _ => Vec::new(),
    }
}
