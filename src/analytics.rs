//! Workflow analytics.
//!
//! This module provides [`AnalyticsSnapshot`], a read-only summary of the
//! articles created in a trailing window: how many sit in each state, how
//! long review and publication take, and where work is piling up.

use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::{Article, WorkflowState, WorkflowTransition};

/// How many bottleneck states a snapshot reports.
const BOTTLENECK_COUNT: usize = 3;

/// A state holding many articles.
#[derive(Debug, Clone, PartialEq)]
pub struct Bottleneck {
    /// The state.
    pub state: WorkflowState,
    /// Articles currently in it.
    pub count: usize,
    /// Mean hours those articles have spent in it so far.
    pub avg_hours_in_state: f64,
}

/// Derived workflow metrics for a time window.
///
/// Computed on demand and never persisted. Rates are percentages in
/// `0.0..=100.0`; averages are hours and are `0.0` when there is nothing to
/// average.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSnapshot {
    /// Length of the window in days.
    pub window_days: u32,
    /// Articles created within the window.
    pub total_articles: usize,
    /// Article count per current state; states with no articles are absent.
    pub by_state: BTreeMap<WorkflowState, usize>,
    /// Mean hours between entering `in_review` and leaving it.
    pub avg_time_in_review_hours: f64,
    /// Mean hours from creation to publication.
    pub avg_time_to_publish_hours: f64,
    /// `(published + approved) / total × 100`.
    pub approval_rate: f64,
    /// `revision_requested / total × 100`.
    pub revision_rate: f64,
    /// The most populated states, largest first.
    pub bottlenecks: Vec<Bottleneck>,
}

impl AnalyticsSnapshot {
    /// Returns a snapshot with no data.
    pub fn empty(window_days: u32) -> Self {
        Self {
            window_days,
            total_articles: 0,
            by_state: BTreeMap::new(),
            avg_time_in_review_hours: 0.0,
            avg_time_to_publish_hours: 0.0,
            approval_rate: 0.0,
            revision_rate: 0.0,
            bottlenecks: Vec::new(),
        }
    }

    /// Computes a snapshot.
    ///
    /// `articles` should already be limited to the window; `transitions`
    /// may include records of other articles, which are ignored.
    pub fn compute(
        articles: &[Article],
        transitions: &[WorkflowTransition],
        window_days: u32,
        now: DateTime<Utc>,
    ) -> Self {
        if articles.is_empty() {
            return Self::empty(window_days);
        }

        let total = articles.len();
        let mut by_state: BTreeMap<WorkflowState, usize> = BTreeMap::new();
        for article in articles {
            *by_state.entry(article.state).or_default() += 1;
        }

        let count = |state: WorkflowState| by_state.get(&state).copied().unwrap_or(0);
        let approval_rate = percent(
            count(WorkflowState::Published) + count(WorkflowState::Approved),
            total,
        );
        let revision_rate = percent(count(WorkflowState::RevisionRequested), total);

        let in_window: HashSet<&str> = articles.iter().map(|a| a.id.as_str()).collect();
        let avg_time_in_review_hours =
            mean_hours(review_durations(transitions, &in_window).into_iter());

        let avg_time_to_publish_hours = mean_hours(
            articles
                .iter()
                .filter_map(|a| a.published_at.map(|at| at - a.created_at)),
        );

        let mut bottlenecks: Vec<Bottleneck> = by_state
            .iter()
            .map(|(&state, &count)| Bottleneck {
                state,
                count,
                avg_hours_in_state: mean_hours(
                    articles
                        .iter()
                        .filter(|a| a.state == state)
                        .map(|a| now - a.updated_at),
                ),
            })
            .collect();
        // Stable sort keeps declaration order among equal counts.
        bottlenecks.sort_by(|a, b| b.count.cmp(&a.count));
        bottlenecks.truncate(BOTTLENECK_COUNT);

        Self {
            window_days,
            total_articles: total,
            by_state,
            avg_time_in_review_hours,
            avg_time_to_publish_hours,
            approval_rate,
            revision_rate,
            bottlenecks,
        }
    }

    /// Returns the number of window articles currently in `state`.
    pub fn count(&self, state: WorkflowState) -> usize {
        self.by_state.get(&state).copied().unwrap_or(0)
    }

    /// Returns true if the window held no articles.
    pub fn is_empty(&self) -> bool {
        self.total_articles == 0
    }
}

/// Time each article spent in review, paired from consecutive transitions.
fn review_durations(
    transitions: &[WorkflowTransition],
    in_window: &HashSet<&str>,
) -> Vec<Duration> {
    let mut entered: HashMap<&str, DateTime<Utc>> = HashMap::new();
    let mut durations = Vec::new();

    for t in transitions
        .iter()
        .filter(|t| in_window.contains(t.article_id.as_str()))
    {
        if t.from_state == WorkflowState::InReview {
            if let Some(start) = entered.remove(t.article_id.as_str()) {
                durations.push(t.timestamp - start);
            }
        }
        if t.to_state == WorkflowState::InReview {
            entered.insert(t.article_id.as_str(), t.timestamp);
        }
    }

    durations
}

fn mean_hours(durations: impl Iterator<Item = Duration>) -> f64 {
    let (sum, n) = durations.fold((0i64, 0usize), |(sum, n), d| (sum + d.num_seconds(), n + 1));
    if n == 0 {
        return 0.0;
    }
    sum as f64 / n as f64 / 3600.0
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

impl fmt::Display for AnalyticsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Workflow analytics, last {} day(s):", self.window_days)?;
        writeln!(f)?;

        if self.is_empty() {
            writeln!(f, "  No articles in window")?;
            return Ok(());
        }

        for (state, count) in &self.by_state {
            writeln!(f, "  {:<20} {:>5}", state.as_str(), count)?;
        }
        writeln!(f, "  {:<20} {:>5}", "total", self.total_articles)?;

        writeln!(f)?;
        writeln!(f, "Approval rate:      {:.1}%", self.approval_rate)?;
        writeln!(f, "Revision rate:      {:.1}%", self.revision_rate)?;
        writeln!(f, "Avg time in review: {:.1}h", self.avg_time_in_review_hours)?;
        writeln!(f, "Avg time to publish: {:.1}h", self.avg_time_to_publish_hours)?;

        writeln!(f)?;
        writeln!(f, "Bottlenecks:")?;
        for (rank, b) in self.bottlenecks.iter().enumerate() {
            writeln!(
                f,
                "  {}. {:<20} {:>5} article(s), avg {:.1}h in state",
                rank + 1,
                b.state.as_str(),
                b.count,
                b.avg_hours_in_state
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TransitionRequest, WorkflowAction};

    fn articles_in(states: &[(WorkflowState, usize)], now: DateTime<Utc>) -> Vec<Article> {
        let mut out = Vec::new();
        for (state, n) in states {
            for i in 0..*n {
                out.push(
                    Article::new(format!("{}-{}", state, i), "Title", "Body", "writer1")
                        .with_state(*state)
                        .with_created_at(now - Duration::days(2)),
                );
            }
        }
        out
    }

    #[test]
    fn test_rates() {
        let now = Utc::now();
        let articles = articles_in(
            &[
                (WorkflowState::Published, 4),
                (WorkflowState::Approved, 1),
                (WorkflowState::RevisionRequested, 2),
                (WorkflowState::Draft, 3),
            ],
            now,
        );
        let snapshot = AnalyticsSnapshot::compute(&articles, &[], 30, now);

        assert_eq!(snapshot.total_articles, 10);
        assert_eq!(snapshot.approval_rate, 50.0);
        assert_eq!(snapshot.revision_rate, 20.0);
        assert_eq!(snapshot.count(WorkflowState::Draft), 3);
        assert_eq!(snapshot.count(WorkflowState::Archived), 0);
    }

    #[test]
    fn test_bottlenecks_top_three() {
        let now = Utc::now();
        let articles = articles_in(
            &[
                (WorkflowState::Published, 4),
                (WorkflowState::Approved, 1),
                (WorkflowState::RevisionRequested, 2),
                (WorkflowState::Draft, 3),
            ],
            now,
        );
        let snapshot = AnalyticsSnapshot::compute(&articles, &[], 30, now);

        let states: Vec<_> = snapshot.bottlenecks.iter().map(|b| b.state).collect();
        assert_eq!(
            states,
            vec![
                WorkflowState::Published,
                WorkflowState::Draft,
                WorkflowState::RevisionRequested
            ]
        );
        assert!((snapshot.bottlenecks[0].avg_hours_in_state - 48.0).abs() < 0.01);
    }

    #[test]
    fn test_bottleneck_ties_follow_state_order() {
        let now = Utc::now();
        let articles = articles_in(
            &[
                (WorkflowState::Archived, 1),
                (WorkflowState::InReview, 1),
                (WorkflowState::Draft, 1),
                (WorkflowState::Scheduled, 1),
            ],
            now,
        );
        let snapshot = AnalyticsSnapshot::compute(&articles, &[], 7, now);
        let states: Vec<_> = snapshot.bottlenecks.iter().map(|b| b.state).collect();
        assert_eq!(
            states,
            vec![
                WorkflowState::Draft,
                WorkflowState::InReview,
                WorkflowState::Scheduled
            ]
        );
    }

    #[test]
    fn test_empty_window() {
        let snapshot = AnalyticsSnapshot::compute(&[], &[], 0, Utc::now());
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.approval_rate, 0.0);
        assert!(snapshot.bottlenecks.is_empty());
        assert!(snapshot.to_string().contains("No articles in window"));
    }

    #[test]
    fn test_time_to_publish() {
        let now = Utc::now();
        let mut fast = Article::new("fast", "Title", "Body", "w")
            .with_state(WorkflowState::Published)
            .with_created_at(now - Duration::hours(10));
        fast.published_at = Some(now - Duration::hours(8));
        let mut slow = Article::new("slow", "Title", "Body", "w")
            .with_state(WorkflowState::Published)
            .with_created_at(now - Duration::hours(10));
        slow.published_at = Some(now - Duration::hours(4));
        let draft = Article::new("draft", "Title", "Body", "w").with_created_at(now);

        let snapshot = AnalyticsSnapshot::compute(&[fast, slow, draft], &[], 1, now);
        assert!((snapshot.avg_time_to_publish_hours - 4.0).abs() < 0.01);
    }

    #[test]
    fn test_time_in_review_pairs_entry_and_exit() {
        let now = Utc::now();
        let t0 = now - Duration::hours(12);
        let article = Article::new("a-1", "Title", "Body", "w")
            .with_state(WorkflowState::Approved)
            .with_created_at(t0);
        let outsider = "b-1";

        let record = |id: &str, from, action, at| {
            WorkflowTransition::new(id, from, &TransitionRequest::new(action, "editor1"), at)
        };
        let transitions = vec![
            record("a-1", WorkflowState::Draft, WorkflowAction::SubmitForReview, t0),
            record(
                "a-1",
                WorkflowState::PendingReview,
                WorkflowAction::AssignReviewer,
                t0 + Duration::hours(1),
            ),
            record(
                outsider,
                WorkflowState::PendingReview,
                WorkflowAction::AssignReviewer,
                t0 + Duration::hours(1),
            ),
            record(
                "a-1",
                WorkflowState::InReview,
                WorkflowAction::Approve,
                t0 + Duration::hours(4),
            ),
            record(
                outsider,
                WorkflowState::InReview,
                WorkflowAction::Approve,
                t0 + Duration::hours(11),
            ),
        ];

        let snapshot = AnalyticsSnapshot::compute(&[article], &transitions, 1, now);
        assert!((snapshot.avg_time_in_review_hours - 3.0).abs() < 0.01);
    }

    #[test]
    fn test_display() {
        let now = Utc::now();
        let articles = articles_in(
            &[(WorkflowState::Published, 2), (WorkflowState::Draft, 1)],
            now,
        );
        let display = AnalyticsSnapshot::compute(&articles, &[], 30, now).to_string();

        assert!(display.contains("last 30 day(s)"));
        assert!(display.contains("published"));
        assert!(display.contains("Approval rate:      66.7%"));
        assert!(display.contains("Bottlenecks:"));
    }
}
