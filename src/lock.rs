//! Per-article locking.
//!
//! Serialises transitions on the same article within one process. Locks for
//! different articles never contend.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Hands out one async mutex per article id.
#[derive(Debug, Default)]
pub(crate) struct ArticleLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ArticleLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `article_id`.
    ///
    /// Entries nobody holds or waits on are dropped on each call so the map
    /// does not grow with every article ever touched.
    pub(crate) async fn acquire(&self, article_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(article_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_article_is_exclusive() {
        let locks = Arc::new(ArticleLocks::new());
        let guard = locks.acquire("a-1").await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("a-1").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_articles_do_not_contend() {
        let locks = ArticleLocks::new();
        let _a = locks.acquire("a-1").await;
        let _b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("b-1"))
            .await
            .expect("independent article should lock immediately");
    }

    #[tokio::test]
    async fn test_released_entries_are_pruned() {
        let locks = ArticleLocks::new();
        drop(locks.acquire("a-1").await);
        drop(locks.acquire("b-1").await);
        let _c = locks.acquire("c-1").await;
        assert_eq!(locks.tracked().await, 1);
    }
}
