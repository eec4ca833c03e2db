//! The article data model.
//!
//! Articles are owned by the surrounding application. The engine reads them
//! through an [`ArticleStore`](crate::ArticleStore) and writes back only the
//! fields described by an [`ArticleUpdate`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::WorkflowState;

/// A content item whose lifecycle the engine governs.
///
/// `version` is bumped by the store on every successful write and is used
/// for optimistic concurrency: an update carrying a stale version is
/// refused.
///
/// # Examples
///
/// ```
/// use quill::{Article, WorkflowState};
///
/// let article = Article::new("a-1", "Dubai Launches New Metro Line", "x".repeat(150), "writer1")
///     .with_category("transport")
///     .with_ai_confidence_score(82.0);
///
/// assert_eq!(article.state, WorkflowState::Draft);
/// assert_eq!(article.version, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier.
    pub id: String,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Section the article belongs to.
    pub category: Option<String>,
    /// Quality score in `0..=100`, supplied by an external scorer.
    pub ai_confidence_score: f64,
    /// Current workflow state.
    pub state: WorkflowState,
    /// Identifier of the writer.
    pub created_by: String,
    /// When the article was created.
    pub created_at: DateTime<Utc>,
    /// When the article last changed.
    pub updated_at: DateTime<Utc>,
    /// When the article went live.
    pub published_at: Option<DateTime<Utc>>,
    /// When the article was retired.
    pub archived_at: Option<DateTime<Utc>>,
    /// Publication time recorded by the `schedule` action.
    pub scheduled_publish_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency token.
    pub version: u64,
}

impl Article {
    /// Creates a new draft article.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            category: None,
            ai_confidence_score: 0.0,
            state: WorkflowState::Draft,
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
            published_at: None,
            archived_at: None,
            scheduled_publish_at: None,
            version: 0,
        }
    }

    /// Sets the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the AI confidence score.
    pub fn with_ai_confidence_score(mut self, score: f64) -> Self {
        self.ai_confidence_score = score;
        self
    }

    /// Places the article in `state`.
    ///
    /// Intended for seeding stores; running code changes state only
    /// through the engine.
    pub fn with_state(mut self, state: WorkflowState) -> Self {
        self.state = state;
        self
    }

    /// Sets both creation and update timestamps.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }
}

/// A patch of engine-owned article fields, guarded by a version check.
///
/// Fields left as `None` are not touched. `scheduled_publish_at` uses a
/// nested option so that `Some(None)` clears the stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleUpdate {
    /// The version the writer loaded; the store rejects the write if the
    /// stored version differs.
    pub expected_version: u64,
    /// New workflow state.
    pub state: Option<WorkflowState>,
    /// New `updated_at`.
    pub updated_at: DateTime<Utc>,
    /// New `published_at`.
    pub published_at: Option<DateTime<Utc>>,
    /// New `archived_at`.
    pub archived_at: Option<DateTime<Utc>>,
    /// New `scheduled_publish_at`; `Some(None)` clears it.
    pub scheduled_publish_at: Option<Option<DateTime<Utc>>>,
}

impl ArticleUpdate {
    /// Creates an update that only touches `updated_at`.
    pub fn new(expected_version: u64, updated_at: DateTime<Utc>) -> Self {
        Self {
            expected_version,
            state: None,
            updated_at,
            published_at: None,
            archived_at: None,
            scheduled_publish_at: None,
        }
    }

    /// Sets the new workflow state.
    pub fn with_state(mut self, state: WorkflowState) -> Self {
        self.state = Some(state);
        self
    }

    /// Sets `published_at`.
    pub fn with_published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    /// Sets `archived_at`.
    pub fn with_archived_at(mut self, at: DateTime<Utc>) -> Self {
        self.archived_at = Some(at);
        self
    }

    /// Sets or clears `scheduled_publish_at`.
    pub fn with_scheduled_publish_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.scheduled_publish_at = Some(at);
        self
    }

    /// Applies the patch to `article` and bumps its version.
    ///
    /// The version check is the caller's responsibility; stores call this
    /// after comparing `expected_version`.
    pub fn apply_to(&self, article: &mut Article) {
        if let Some(state) = self.state {
            article.state = state;
        }
        article.updated_at = self.updated_at;
        if let Some(at) = self.published_at {
            article.published_at = Some(at);
        }
        if let Some(at) = self.archived_at {
            article.archived_at = Some(at);
        }
        if let Some(at) = self.scheduled_publish_at {
            article.scheduled_publish_at = at;
        }
        article.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_article_is_draft() {
        let article = Article::new("a-1", "Title", "Body", "writer1");
        assert_eq!(article.state, WorkflowState::Draft);
        assert_eq!(article.created_at, article.updated_at);
        assert!(article.category.is_none());
        assert!(article.published_at.is_none());
        assert_eq!(article.version, 0);
    }

    #[test]
    fn test_builder_methods() {
        let created = Utc::now() - Duration::days(3);
        let article = Article::new("a-1", "Title", "Body", "writer1")
            .with_category("news")
            .with_ai_confidence_score(91.5)
            .with_state(WorkflowState::InReview)
            .with_created_at(created);

        assert_eq!(article.category.as_deref(), Some("news"));
        assert_eq!(article.ai_confidence_score, 91.5);
        assert_eq!(article.state, WorkflowState::InReview);
        assert_eq!(article.created_at, created);
        assert_eq!(article.updated_at, created);
    }

    #[test]
    fn test_update_applies_only_set_fields() {
        let mut article = Article::new("a-1", "Title", "Body", "writer1");
        let now = Utc::now();

        ArticleUpdate::new(0, now)
            .with_state(WorkflowState::PendingReview)
            .apply_to(&mut article);

        assert_eq!(article.state, WorkflowState::PendingReview);
        assert_eq!(article.updated_at, now);
        assert!(article.published_at.is_none());
        assert!(article.archived_at.is_none());
        assert_eq!(article.version, 1);
    }

    #[test]
    fn test_update_clears_schedule() {
        let publish_at = Utc::now() + Duration::hours(6);
        let mut article = Article::new("a-1", "Title", "Body", "writer1");

        ArticleUpdate::new(0, Utc::now())
            .with_scheduled_publish_at(Some(publish_at))
            .apply_to(&mut article);
        assert_eq!(article.scheduled_publish_at, Some(publish_at));

        ArticleUpdate::new(1, Utc::now())
            .with_scheduled_publish_at(None)
            .apply_to(&mut article);
        assert!(article.scheduled_publish_at.is_none());
        assert_eq!(article.version, 2);
    }

    #[test]
    fn test_article_serializes_state_in_snake_case() {
        let article =
            Article::new("a-1", "Title", "Body", "writer1").with_state(WorkflowState::InReview);
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["state"], "in_review");
    }
}
