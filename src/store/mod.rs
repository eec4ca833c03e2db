//! Storage ports for the Quill workflow engine.
//!
//! This module provides the [`ArticleStore`] and [`TransitionLog`] traits the
//! engine persists through, along with in-memory implementations:
//!
//! - [`MemoryArticleStore`]: thread-safe article storage with optimistic
//!   versioning
//! - [`MemoryTransitionLog`]: append-only transition history
//!
//! # Example
//!
//! ```
//! use quill::{Article, ArticleStore, ArticleUpdate, MemoryArticleStore, WorkflowState};
//!
//! # async fn example() -> quill::Result<()> {
//! let store = MemoryArticleStore::new();
//! store.insert_article(&Article::new("a-1", "Title", "Body", "writer1")).await?;
//!
//! let article = store.load_article("a-1").await?.expect("seeded above");
//! let update = ArticleUpdate::new(article.version, chrono::Utc::now())
//!     .with_state(WorkflowState::PendingReview);
//! let saved = store.update_article_fields("a-1", &update).await?;
//! assert_eq!(saved.version, 1);
//! # Ok(())
//! # }
//! ```

mod memory;

pub use memory::{MemoryArticleStore, MemoryTransitionLog};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Article, ArticleUpdate, Result, WorkflowState, WorkflowTransition};

/// Loads and persists articles.
///
/// # Object Safety
///
/// This trait is object-safe; the engine holds it as
/// `Arc<dyn ArticleStore>` so backends can be swapped at runtime.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Retrieves an article.
    ///
    /// Returns `Ok(None)` if no article has the given id.
    async fn load_article(&self, id: &str) -> Result<Option<Article>>;

    /// Applies `update` to the stored article and returns the result.
    ///
    /// # Errors
    ///
    /// - [`QuillError::NotFound`](crate::QuillError::NotFound) if the
    ///   article does not exist
    /// - [`QuillError::Conflict`](crate::QuillError::Conflict) if the stored
    ///   version differs from `update.expected_version`; nothing is written
    async fn update_article_fields(&self, id: &str, update: &ArticleUpdate) -> Result<Article>;

    /// Stores a new article, replacing any article with the same id.
    async fn insert_article(&self, article: &Article) -> Result<()>;

    /// Lists articles created at or after `since`.
    async fn list_articles_created_since(&self, since: DateTime<Utc>) -> Result<Vec<Article>>;

    /// Lists up to `limit` articles in `state`, most recently updated first.
    async fn list_articles_by_state(
        &self,
        state: WorkflowState,
        limit: usize,
    ) -> Result<Vec<Article>>;
}

/// Append-only record of committed transitions.
#[async_trait]
pub trait TransitionLog: Send + Sync {
    /// Appends a committed transition.
    async fn append_transition(&self, record: &WorkflowTransition) -> Result<()>;

    /// Returns every transition of an article, oldest first.
    async fn transitions_for(&self, article_id: &str) -> Result<Vec<WorkflowTransition>>;

    /// Returns every transition committed at or after `since`, oldest first.
    async fn transitions_since(&self, since: DateTime<Utc>) -> Result<Vec<WorkflowTransition>>;
}
