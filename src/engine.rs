//! The workflow engine.
//!
//! This module provides [`WorkflowEngine`], which composes the transition
//! table, the pre-transition checks, the storage ports, post-transition side
//! effects and notifications into one operation:
//! [`transition_article`](WorkflowEngine::transition_article).

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value as JsonValue};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::actions::{plan_post_actions, PostAction};
use crate::lock::ArticleLocks;
use crate::notification::build_notifications;
use crate::validation::validate_transition;
use crate::{
    AnalyticsSnapshot, Article, ArticleStore, ArticleUpdate, Clock, LoggingReviewerAssigner,
    NotificationSender, QuillError, Result, ReviewerAssigner, SystemClock, TracingNotifier,
    TransitionLog, TransitionRequest, WorkflowAction, WorkflowConfig, WorkflowEvent,
    WorkflowState, WorkflowTransition,
};

/// Reason recorded on every transition made by [`WorkflowEngine::bulk_approve`].
pub const BULK_APPROVAL_REASON: &str = "Bulk approval";

/// Reason recorded on publications made by
/// [`WorkflowEngine::publish_due_articles`].
pub const SCHEDULED_PUBLICATION_REASON: &str = "Scheduled publication";

type TransitionFuture<'a> = Pin<Box<dyn Future<Output = Result<WorkflowTransition>> + Send + 'a>>;

/// Governs how articles move from draft to publication.
///
/// Every state change goes through [`transition_article`], which:
///
/// 1. loads the article, failing with [`QuillError::NotFound`]
/// 2. resolves the action's target and checks it against the transition
///    table, failing with [`QuillError::InvalidTransition`]
/// 3. runs the target state's content checks, failing with
///    [`QuillError::Validation`]
/// 4. persists the new state with a version check and appends a
///    [`WorkflowTransition`] to the log
/// 5. runs post-transition side effects, including at most one cascaded
///    transition
/// 6. sends notifications
///
/// Steps 1–3 never write anything. Once step 4 succeeds the transition
/// stands: failures in steps 5 and 6 are logged, broadcast as
/// [`WorkflowEvent`]s and otherwise swallowed.
///
/// Transitions on the same article are serialised by a per-article lock, and
/// the store's version check refuses writes based on a stale read.
///
/// # Construction
///
/// ```
/// use quill::{MemoryArticleStore, MemoryTransitionLog, WorkflowEngine};
///
/// let engine = WorkflowEngine::builder()
///     .article_store(MemoryArticleStore::new())
///     .transition_log(MemoryTransitionLog::new())
///     .build()?;
/// # Ok::<(), quill::QuillError>(())
/// ```
///
/// [`transition_article`]: WorkflowEngine::transition_article
pub struct WorkflowEngine {
    articles: Arc<dyn ArticleStore>,
    log: Arc<dyn TransitionLog>,
    notifier: Arc<dyn NotificationSender>,
    reviewers: Arc<dyn ReviewerAssigner>,
    clock: Arc<dyn Clock>,
    config: WorkflowConfig,
    locks: ArticleLocks,
    /// Event broadcast channel sender.
    event_tx: broadcast::Sender<WorkflowEvent>,
}

impl WorkflowEngine {
    /// Creates a new engine builder.
    pub fn builder() -> WorkflowEngineBuilder {
        WorkflowEngineBuilder::new()
    }

    /// Subscribes to engine events.
    ///
    /// Events are not persisted; if the receiver is too slow, events may be
    /// dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.event_tx.subscribe()
    }

    /// Emits an event to all subscribers.
    ///
    /// Ignores send errors (no subscribers or channel full).
    pub(crate) fn emit(&self, event: WorkflowEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Returns the engine's configuration.
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Moves an article to the state `action` resolves to.
    ///
    /// Returns the committed transition record.
    ///
    /// # Errors
    ///
    /// - [`QuillError::NotFound`] if the article does not exist
    /// - [`QuillError::InvalidTransition`] if the target is not legal from
    ///   the article's current state
    /// - [`QuillError::Validation`] if a content check fails
    /// - [`QuillError::Conflict`] if the article changed underneath us
    /// - [`QuillError::Store`] if a storage adapter fails
    ///
    /// In every error case except a transition-log failure, the article is
    /// unchanged.
    pub async fn transition_article(
        &self,
        article_id: &str,
        action: WorkflowAction,
        performed_by: &str,
        reason: Option<&str>,
        metadata: Option<JsonValue>,
    ) -> Result<WorkflowTransition> {
        let mut request = TransitionRequest::new(action, performed_by);
        request.reason = reason.map(str::to_string);
        request.metadata = metadata;
        self.apply_request(article_id, request).await
    }

    /// Like [`transition_article`](Self::transition_article), taking a
    /// prepared [`TransitionRequest`].
    ///
    /// # Errors
    ///
    /// As [`transition_article`](Self::transition_article).
    pub async fn apply_request(
        &self,
        article_id: &str,
        request: TransitionRequest,
    ) -> Result<WorkflowTransition> {
        let span = info_span!("transition", article_id = %article_id, action = %request.action);
        self.transition_internal(article_id, request, 0)
            .instrument(span)
            .await
    }

    /// Boxes the transition future so a cascade can re-enter it.
    fn transition_boxed<'a>(
        &'a self,
        article_id: &'a str,
        request: TransitionRequest,
        cascade_depth: usize,
    ) -> TransitionFuture<'a> {
        Box::pin(self.transition_internal(article_id, request, cascade_depth))
    }

    async fn transition_internal(
        &self,
        article_id: &str,
        request: TransitionRequest,
        cascade_depth: usize,
    ) -> Result<WorkflowTransition> {
        let guard = self.locks.acquire(article_id).await;

        let article = match self.articles.load_article(article_id).await? {
            Some(article) => article,
            None => {
                let err = QuillError::NotFound(article_id.to_string());
                return Err(self.reject(article_id, request.action, err));
            }
        };

        let from = article.state;
        let to = request.action.target_state();
        if !from.can_transition_to(to) {
            let err = QuillError::InvalidTransition {
                article_id: article_id.to_string(),
                action: request.action,
                from,
                to,
            };
            return Err(self.reject(article_id, request.action, err));
        }

        if let Err(failure) = validate_transition(&article, to, &self.config) {
            return Err(self.reject(article_id, request.action, failure.into()));
        }

        let now = self.clock.now();
        let mut update = ArticleUpdate::new(article.version, now).with_state(to);
        if to == WorkflowState::Scheduled {
            update = update.with_scheduled_publish_at(request.publish_at());
        } else if from == WorkflowState::Scheduled {
            update = update.with_scheduled_publish_at(None);
        }
        match to {
            WorkflowState::Published => update = update.with_published_at(now),
            WorkflowState::Archived => update = update.with_archived_at(now),
            _ => {}
        }

        let article = match self.articles.update_article_fields(article_id, &update).await {
            Ok(article) => article,
            Err(err @ QuillError::Conflict { .. }) => {
                return Err(self.reject(article_id, request.action, err));
            }
            Err(err) => return Err(err),
        };

        let transition = WorkflowTransition::new(article_id, from, &request, now);
        self.log.append_transition(&transition).await?;

        info!(
            from = %from,
            to = %to,
            performed_by = %transition.performed_by,
            cascade_depth,
            "transition committed"
        );
        self.emit(WorkflowEvent::TransitionCommitted {
            article_id: article_id.to_string(),
            from,
            to,
            action: transition.action,
            performed_by: transition.performed_by.clone(),
        });

        let mut follow_up = None;
        for action in plan_post_actions(&article, &transition, &self.config, cascade_depth) {
            match action {
                PostAction::Cascade(request) => follow_up = Some(request),
                other => {
                    if let Err(e) = self.run_post_action(&article, other).await {
                        warn!(error = %e, state = %to, "post-transition action failed");
                        self.emit(WorkflowEvent::PostActionFailed {
                            article_id: article_id.to_string(),
                            state: to,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        // The cascade takes the lock again.
        drop(guard);

        if let Some(request) = follow_up {
            info!(action = %request.action, "cascading");
            self.emit(WorkflowEvent::CascadeTriggered {
                article_id: article_id.to_string(),
                action: request.action,
            });

            let span = info_span!("cascade", action = %request.action);
            if let Err(e) = self
                .transition_boxed(article_id, request, cascade_depth + 1)
                .instrument(span)
                .await
            {
                warn!(error = %e, "cascaded transition failed");
                self.emit(WorkflowEvent::PostActionFailed {
                    article_id: article_id.to_string(),
                    state: to,
                    error: e.to_string(),
                });
            }
        } else if to == WorkflowState::Approved {
            debug!(
                score = article.ai_confidence_score,
                threshold = self.config.auto_publish_score,
                "no auto-publish cascade"
            );
        }

        self.dispatch_notifications(&article, &transition).await;

        Ok(transition)
    }

    /// Runs one non-cascading side effect.
    async fn run_post_action(&self, article: &Article, action: PostAction) -> Result<()> {
        match action {
            PostAction::AssignReviewer => {
                let reviewer = self.reviewers.assign_reviewer(article).await?;
                debug!(reviewer = ?reviewer, "reviewer assignment finished");
                self.emit(WorkflowEvent::ReviewerAssigned {
                    article_id: article.id.clone(),
                    reviewer,
                });
            }
            PostAction::Cascade(_) => {
                // Cascades are run by the caller after the lock is released
            }
        }
        Ok(())
    }

    async fn dispatch_notifications(&self, article: &Article, transition: &WorkflowTransition) {
        let notifications = build_notifications(article, transition, &self.config, self.clock.now());
        if notifications.is_empty() {
            debug!(state = %transition.to_state, "no notification for state");
            return;
        }

        for notification in notifications {
            match self.notifier.send(&notification).await {
                Ok(()) => {
                    self.emit(WorkflowEvent::NotificationSent {
                        article_id: notification.article_id.clone(),
                        recipient: notification.recipient.clone(),
                        kind: notification.kind,
                    });
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        recipient = %notification.recipient,
                        kind = %notification.kind,
                        "notification dropped"
                    );
                    self.emit(WorkflowEvent::NotificationFailed {
                        article_id: notification.article_id.clone(),
                        recipient: notification.recipient.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    /// Logs and broadcasts a refused transition, handing the error back.
    fn reject(&self, article_id: &str, action: WorkflowAction, error: QuillError) -> QuillError {
        warn!(error = %error, "transition rejected");
        self.emit(WorkflowEvent::TransitionRejected {
            article_id: article_id.to_string(),
            action,
            error: error.to_string(),
        });
        error
    }

    /// Returns every committed transition of an article, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition log cannot be read.
    pub async fn get_workflow_history(&self, article_id: &str) -> Result<Vec<WorkflowTransition>> {
        self.log.transitions_for(article_id).await
    }

    /// Summarises the articles created in the last `days` days.
    ///
    /// A zero-day window yields an empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if a store cannot be read.
    pub async fn get_workflow_analytics(&self, days: u32) -> Result<AnalyticsSnapshot> {
        if days == 0 {
            return Ok(AnalyticsSnapshot::empty(days));
        }

        let now = self.clock.now();
        // Windows reaching past the calendar cover everything
        let since = now
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let articles = self.articles.list_articles_created_since(since).await?;
        let transitions = self.log.transitions_since(since).await?;

        let snapshot = AnalyticsSnapshot::compute(&articles, &transitions, days, now);
        debug!(
            days,
            total = snapshot.total_articles,
            approval_rate = snapshot.approval_rate,
            "analytics computed"
        );
        Ok(snapshot)
    }

    /// Returns up to `limit` articles in `state`, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns an error if the article store cannot be read.
    pub async fn get_articles_by_state(
        &self,
        state: WorkflowState,
        limit: usize,
    ) -> Result<Vec<Article>> {
        self.articles.list_articles_by_state(state, limit).await
    }

    /// Approves each article in turn and returns how many succeeded.
    ///
    /// Articles are processed one after another. A failure is logged and
    /// does not stop the batch; compare the count with the input length to
    /// detect partial failure.
    pub async fn bulk_approve<S>(&self, article_ids: &[S], approved_by: &str) -> usize
    where
        S: AsRef<str> + Sync,
    {
        let mut approved = 0;
        for id in article_ids {
            let id = id.as_ref();
            match self
                .transition_article(
                    id,
                    WorkflowAction::Approve,
                    approved_by,
                    Some(BULK_APPROVAL_REASON),
                    None,
                )
                .await
            {
                Ok(_) => approved += 1,
                Err(e) if e.is_fatal_to_transition() => {
                    warn!(article_id = %id, error = %e, "bulk approval skipped article")
                }
                Err(e) => error!(article_id = %id, error = %e, "bulk approval failed for article"),
            }
        }
        info!(approved, requested = article_ids.len(), "bulk approval finished");
        approved
    }

    /// Schedules an approved article for publication at `publish_at`.
    ///
    /// Only the intent is recorded. Publication happens when an external
    /// scheduler calls [`publish_due_articles`](Self::publish_due_articles)
    /// or publishes the article directly.
    ///
    /// # Errors
    ///
    /// As [`transition_article`](Self::transition_article).
    pub async fn schedule_article(
        &self,
        article_id: &str,
        publish_at: DateTime<Utc>,
        scheduled_by: &str,
    ) -> Result<()> {
        let metadata = json!({ "publishAt": publish_at.to_rfc3339() });
        self.transition_article(
            article_id,
            WorkflowAction::Schedule,
            scheduled_by,
            None,
            Some(metadata),
        )
        .await?;
        Ok(())
    }

    /// Publishes every scheduled article whose publication time has passed.
    ///
    /// Intended to be called periodically by an external scheduler. Articles
    /// are processed one after another and failures do not stop the run.
    /// Scheduled articles without a recorded time are left alone.
    ///
    /// # Errors
    ///
    /// Returns an error only if the scheduled articles cannot be listed.
    pub async fn publish_due_articles(&self) -> Result<usize> {
        let now = self.clock.now();
        let due: Vec<Article> = self
            .articles
            .list_articles_by_state(WorkflowState::Scheduled, usize::MAX)
            .await?
            .into_iter()
            .filter(|a| a.scheduled_publish_at.is_some_and(|at| at <= now))
            .collect();

        let mut published = 0;
        for article in &due {
            let request =
                TransitionRequest::new(WorkflowAction::Publish, self.config.scheduler_actor.clone())
                    .with_reason(SCHEDULED_PUBLICATION_REASON);
            match self.apply_request(&article.id, request).await {
                Ok(_) => published += 1,
                Err(e) => warn!(article_id = %article.id, error = %e, "scheduled publication failed"),
            }
        }
        if !due.is_empty() {
            info!(published, due = due.len(), "scheduled publication run finished");
        }
        Ok(published)
    }
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine")
            .field("config", &self.config)
            .field("notifier", &self.notifier)
            .field("reviewers", &self.reviewers)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing [`WorkflowEngine`] instances.
///
/// The article store and transition log are required. Notifications default
/// to [`TracingNotifier`], reviewer assignment to
/// [`LoggingReviewerAssigner`], and time to [`SystemClock`].
pub struct WorkflowEngineBuilder {
    articles: Option<Arc<dyn ArticleStore>>,
    log: Option<Arc<dyn TransitionLog>>,
    notifier: Arc<dyn NotificationSender>,
    reviewers: Arc<dyn ReviewerAssigner>,
    clock: Arc<dyn Clock>,
    config: WorkflowConfig,
}

impl WorkflowEngineBuilder {
    fn new() -> Self {
        Self {
            articles: None,
            log: None,
            notifier: Arc::new(TracingNotifier),
            reviewers: Arc::new(LoggingReviewerAssigner),
            clock: Arc::new(SystemClock),
            config: WorkflowConfig::default(),
        }
    }

    /// Sets the article store.
    pub fn article_store(mut self, store: impl ArticleStore + 'static) -> Self {
        self.articles = Some(Arc::new(store));
        self
    }

    /// Sets the transition log.
    pub fn transition_log(mut self, log: impl TransitionLog + 'static) -> Self {
        self.log = Some(Arc::new(log));
        self
    }

    /// Sets the notification sender.
    pub fn notifier(mut self, notifier: impl NotificationSender + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Sets the reviewer assigner.
    pub fn reviewer_assigner(mut self, reviewers: impl ReviewerAssigner + 'static) -> Self {
        self.reviewers = Arc::new(reviewers);
        self
    }

    /// Sets the clock.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Sets the configuration.
    pub fn config(mut self, config: WorkflowConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Config`] if a required port is missing or the
    /// configuration is invalid.
    pub fn build(self) -> Result<WorkflowEngine> {
        self.config.validate()?;
        let articles = self
            .articles
            .ok_or_else(|| QuillError::Config("an article store is required".to_string()))?;
        let log = self
            .log
            .ok_or_else(|| QuillError::Config("a transition log is required".to_string()))?;

        let (event_tx, _) = broadcast::channel(self.config.event_channel_capacity);

        Ok(WorkflowEngine {
            articles,
            log,
            notifier: self.notifier,
            reviewers: self.reviewers,
            clock: self.clock,
            config: self.config,
            locks: ArticleLocks::new(),
            event_tx,
        })
    }
}
