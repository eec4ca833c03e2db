//! Workflow notifications.
//!
//! Notifications are built from a committed transition and handed to a
//! [`NotificationSender`]. Delivery is best-effort: the engine logs and
//! drops any sender error, and the transition stands.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::{Article, Result, WorkflowConfig, WorkflowState, WorkflowTransition};

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// An article is waiting for a reviewer.
    Assignment,
    /// The writer's article was approved.
    Approval,
    /// The writer's article was rejected.
    Rejection,
    /// The writer is asked to revise.
    RevisionRequest,
    /// The writer's article went live.
    Published,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationType::Assignment => "assignment",
            NotificationType::Approval => "approval",
            NotificationType::Rejection => "rejection",
            NotificationType::RevisionRequest => "revision_request",
            NotificationType::Published => "published",
        };
        f.write_str(name)
    }
}

/// A message to a person about an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNotification {
    /// Unique identifier.
    pub id: String,
    /// The article concerned.
    pub article_id: String,
    /// Recipient identifier; a user id or the editor pool.
    pub recipient: String,
    /// What it is about.
    pub kind: NotificationType,
    /// Short heading.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Where the recipient can act on it.
    pub action_url: String,
    /// When it was sent.
    pub sent_at: DateTime<Utc>,
    /// When the recipient read it.
    pub read_at: Option<DateTime<Utc>>,
}

/// Builds the notifications for a committed transition.
///
/// Returns an empty list for states that notify nobody (`draft`,
/// `in_review`, `scheduled`, `archived`).
pub fn build_notifications(
    article: &Article,
    transition: &WorkflowTransition,
    config: &WorkflowConfig,
    sent_at: DateTime<Utc>,
) -> Vec<WorkflowNotification> {
    let reason = transition.reason.as_deref().unwrap_or("No reason given");
    let (recipient, kind, title, message) = match transition.to_state {
        WorkflowState::PendingReview => (
            config.editor_pool.clone(),
            NotificationType::Assignment,
            "New article awaiting review".to_string(),
            format!(
                "\"{}\" was submitted for review by {}.",
                article.title, transition.performed_by
            ),
        ),
        WorkflowState::Approved => (
            article.created_by.clone(),
            NotificationType::Approval,
            "Article approved".to_string(),
            format!("Your article \"{}\" has been approved.", article.title),
        ),
        WorkflowState::Rejected => (
            article.created_by.clone(),
            NotificationType::Rejection,
            "Article rejected".to_string(),
            format!(
                "Your article \"{}\" was rejected. Reason: {}",
                article.title, reason
            ),
        ),
        WorkflowState::RevisionRequested => (
            article.created_by.clone(),
            NotificationType::RevisionRequest,
            "Revisions requested".to_string(),
            format!(
                "Your article \"{}\" needs revisions. Reason: {}",
                article.title, reason
            ),
        ),
        WorkflowState::Published => (
            article.created_by.clone(),
            NotificationType::Published,
            "Article published".to_string(),
            format!("Your article \"{}\" is now live.", article.title),
        ),
        WorkflowState::Draft
        | WorkflowState::InReview
        | WorkflowState::Scheduled
        | WorkflowState::Archived => return Vec::new(),
    };

    vec![WorkflowNotification {
        id: Uuid::new_v4().to_string(),
        article_id: article.id.clone(),
        recipient,
        kind,
        title,
        message,
        action_url: format!(
            "{}/{}",
            config.action_url_base.trim_end_matches('/'),
            article.id
        ),
        sent_at,
        read_at: None,
    }]
}

/// Delivers notifications.
///
/// Implementations report failures as
/// [`QuillError::NotificationDelivery`](crate::QuillError::NotificationDelivery);
/// the engine logs them and carries on.
#[async_trait]
pub trait NotificationSender: Debug + Send + Sync {
    /// Sends one notification.
    async fn send(&self, notification: &WorkflowNotification) -> Result<()>;
}

/// A sender that writes each notification to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationSender for TracingNotifier {
    async fn send(&self, notification: &WorkflowNotification) -> Result<()> {
        info!(
            article_id = %notification.article_id,
            recipient = %notification.recipient,
            kind = %notification.kind,
            title = %notification.title,
            "notification sent"
        );
        Ok(())
    }
}

/// A sender that keeps every notification in memory.
///
/// Clones share the same outbox.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    outbox: Arc<RwLock<Vec<WorkflowNotification>>>,
}

impl MemoryNotifier {
    /// Creates an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything sent so far.
    pub async fn sent(&self) -> Vec<WorkflowNotification> {
        self.outbox.read().await.clone()
    }

    /// Returns the notifications addressed to `recipient`.
    pub async fn sent_to(&self, recipient: &str) -> Vec<WorkflowNotification> {
        self.outbox
            .read()
            .await
            .iter()
            .filter(|n| n.recipient == recipient)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationSender for MemoryNotifier {
    async fn send(&self, notification: &WorkflowNotification) -> Result<()> {
        self.outbox.write().await.push(notification.clone());
        Ok(())
    }
}
