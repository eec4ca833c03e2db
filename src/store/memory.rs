//! In-memory storage implementations.
//!
//! This module provides [`MemoryArticleStore`] and [`MemoryTransitionLog`],
//! thread-safe implementations of the storage ports suitable for testing
//! and development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{ArticleStore, TransitionLog};
use crate::{Article, ArticleUpdate, QuillError, Result, WorkflowState, WorkflowTransition};

/// An in-memory implementation of [`ArticleStore`].
///
/// Uses `Arc<RwLock<...>>` internally, so clones share the same articles.
/// The version check and the write happen under one write lock, making
/// [`update_article_fields`](ArticleStore::update_article_fields) a true
/// compare-and-swap.
#[derive(Debug, Clone, Default)]
pub struct MemoryArticleStore {
    articles: Arc<RwLock<HashMap<String, Article>>>,
}

impl MemoryArticleStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of articles currently stored.
    pub async fn article_count(&self) -> usize {
        self.articles.read().await.len()
    }

    /// Removes every article.
    pub async fn clear(&self) {
        self.articles.write().await.clear();
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn load_article(&self, id: &str) -> Result<Option<Article>> {
        Ok(self.articles.read().await.get(id).cloned())
    }

    async fn update_article_fields(&self, id: &str, update: &ArticleUpdate) -> Result<Article> {
        let mut articles = self.articles.write().await;
        let article = articles
            .get_mut(id)
            .ok_or_else(|| QuillError::NotFound(id.to_string()))?;

        if article.version != update.expected_version {
            return Err(QuillError::Conflict {
                article_id: id.to_string(),
                expected: update.expected_version,
                actual: article.version,
            });
        }

        update.apply_to(article);
        Ok(article.clone())
    }

    async fn insert_article(&self, article: &Article) -> Result<()> {
        self.articles
            .write()
            .await
            .insert(article.id.clone(), article.clone());
        Ok(())
    }

    async fn list_articles_created_since(&self, since: DateTime<Utc>) -> Result<Vec<Article>> {
        let articles = self.articles.read().await;
        let mut found: Vec<Article> = articles
            .values()
            .filter(|a| a.created_at >= since)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn list_articles_by_state(
        &self,
        state: WorkflowState,
        limit: usize,
    ) -> Result<Vec<Article>> {
        let articles = self.articles.read().await;
        let mut found: Vec<Article> = articles
            .values()
            .filter(|a| a.state == state)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        found.truncate(limit);
        Ok(found)
    }
}

/// An in-memory implementation of [`TransitionLog`].
///
/// Records are kept in append order.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransitionLog {
    records: Arc<RwLock<Vec<WorkflowTransition>>>,
}

impl MemoryTransitionLog {
    /// Creates a new, empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records in the log.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true if nothing has been appended.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Returns a copy of every record.
    pub async fn all(&self) -> Vec<WorkflowTransition> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl TransitionLog for MemoryTransitionLog {
    async fn append_transition(&self, record: &WorkflowTransition) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn transitions_for(&self, article_id: &str) -> Result<Vec<WorkflowTransition>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.article_id == article_id)
            .cloned()
            .collect())
    }

    async fn transitions_since(&self, since: DateTime<Utc>) -> Result<Vec<WorkflowTransition>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.timestamp >= since)
            .cloned()
            .collect())
    }
}
