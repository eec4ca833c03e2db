//! Pre-transition content and quality checks.
//!
//! Checks are keyed on the *target* state and run before anything is
//! persisted. Only `pending_review`, `approved` and `published` have
//! preconditions; every other target passes.

use thiserror::Error;

use crate::{Article, WorkflowConfig, WorkflowState};

/// The check that blocked a transition.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ValidationFailure {
    /// Title missing or shorter than the minimum.
    #[error("title must be at least {min} characters (got {actual})")]
    TitleTooShort {
        /// Characters in the trimmed title.
        actual: usize,
        /// Required minimum.
        min: usize,
    },

    /// Content missing or shorter than the minimum.
    #[error("content must be at least {min} characters (got {actual})")]
    ContentTooShort {
        /// Characters in the trimmed content.
        actual: usize,
        /// Required minimum.
        min: usize,
    },

    /// AI confidence score below the approval bar.
    #[error("quality too low: AI confidence score {score} is below {min}")]
    QualityTooLow {
        /// The article's score.
        score: f64,
        /// Required minimum.
        min: f64,
    },

    /// AI confidence score is not a number in `0..=100`.
    #[error("AI confidence score {score} is outside 0..=100")]
    ScoreOutOfRange {
        /// The article's score.
        score: f64,
    },

    /// A field required for publication is empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Runs the checks for moving `article` into `target`.
///
/// Returns the first failing check.
pub fn validate_transition(
    article: &Article,
    target: WorkflowState,
    config: &WorkflowConfig,
) -> Result<(), ValidationFailure> {
    match target {
        WorkflowState::PendingReview => {
            let title = char_count(&article.title);
            if title < config.min_title_chars {
                return Err(ValidationFailure::TitleTooShort {
                    actual: title,
                    min: config.min_title_chars,
                });
            }
            let content = char_count(&article.content);
            if content < config.min_content_chars {
                return Err(ValidationFailure::ContentTooShort {
                    actual: content,
                    min: config.min_content_chars,
                });
            }
            Ok(())
        }
        WorkflowState::Approved => {
            let score = article.ai_confidence_score;
            // NaN fails the range check
            if !(0.0..=100.0).contains(&score) {
                return Err(ValidationFailure::ScoreOutOfRange { score });
            }
            if score < config.min_approval_score {
                return Err(ValidationFailure::QualityTooLow {
                    score,
                    min: config.min_approval_score,
                });
            }
            Ok(())
        }
        WorkflowState::Published => {
            if is_blank(&article.title) {
                return Err(ValidationFailure::MissingField("title"));
            }
            if is_blank(&article.content) {
                return Err(ValidationFailure::MissingField("content"));
            }
            if article.category.as_deref().map_or(true, is_blank) {
                return Err(ValidationFailure::MissingField("category"));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn char_count(s: &str) -> usize {
    s.trim().chars().count()
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, content_len: usize) -> Article {
        Article::new("a-1", title, "x".repeat(content_len), "writer1")
            .with_category("news")
            .with_ai_confidence_score(75.0)
    }

    #[test]
    fn test_nine_char_title_fails_submission() {
        let config = WorkflowConfig::default();
        let result = validate_transition(
            &article("123456789", 150),
            WorkflowState::PendingReview,
            &config,
        );
        assert_eq!(
            result,
            Err(ValidationFailure::TitleTooShort { actual: 9, min: 10 })
        );
    }

    #[test]
    fn test_ten_char_title_passes() {
        let config = WorkflowConfig::default();
        let result = validate_transition(
            &article("1234567890", 100),
            WorkflowState::PendingReview,
            &config,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_title_whitespace_does_not_count() {
        let config = WorkflowConfig::default();
        let result = validate_transition(
            &article("   short    ", 150),
            WorkflowState::PendingReview,
            &config,
        );
        assert!(matches!(result, Err(ValidationFailure::TitleTooShort { actual: 5, .. })));
    }

    #[test]
    fn test_short_content_fails_submission() {
        let config = WorkflowConfig::default();
        let result = validate_transition(
            &article("A perfectly fine title", 99),
            WorkflowState::PendingReview,
            &config,
        );
        assert_eq!(
            result,
            Err(ValidationFailure::ContentTooShort {
                actual: 99,
                min: 100
            })
        );
    }

    #[test]
    fn test_approval_requires_score() {
        let config = WorkflowConfig::default();
        let low = article("A perfectly fine title", 150).with_ai_confidence_score(59.9);
        assert!(matches!(
            validate_transition(&low, WorkflowState::Approved, &config),
            Err(ValidationFailure::QualityTooLow { .. })
        ));

        let edge = article("A perfectly fine title", 150).with_ai_confidence_score(60.0);
        assert!(validate_transition(&edge, WorkflowState::Approved, &config).is_ok());
    }

    #[test]
    fn test_approval_rejects_malformed_score() {
        let config = WorkflowConfig::default();
        for score in [f64::NAN, 150.0, -1.0, f64::INFINITY] {
            let bad = article("A perfectly fine title", 150).with_ai_confidence_score(score);
            assert!(
                matches!(
                    validate_transition(&bad, WorkflowState::Approved, &config),
                    Err(ValidationFailure::ScoreOutOfRange { .. })
                ),
                "score {score} should be refused"
            );
        }

        let top = article("A perfectly fine title", 150).with_ai_confidence_score(100.0);
        assert!(validate_transition(&top, WorkflowState::Approved, &config).is_ok());
    }

    #[test]
    fn test_publication_requires_category() {
        let config = WorkflowConfig::default();
        let mut uncategorised = article("A perfectly fine title", 150);
        uncategorised.category = None;
        assert_eq!(
            validate_transition(&uncategorised, WorkflowState::Published, &config),
            Err(ValidationFailure::MissingField("category"))
        );

        uncategorised.category = Some("  ".to_string());
        assert_eq!(
            validate_transition(&uncategorised, WorkflowState::Published, &config),
            Err(ValidationFailure::MissingField("category"))
        );
    }

    #[test]
    fn test_publication_requires_content() {
        let config = WorkflowConfig::default();
        let empty = article("A perfectly fine title", 0);
        assert_eq!(
            validate_transition(&empty, WorkflowState::Published, &config),
            Err(ValidationFailure::MissingField("content"))
        );
    }

    #[test]
    fn test_unchecked_targets_always_pass() {
        let config = WorkflowConfig::default();
        let bare = Article::new("a-1", "", "", "writer1");
        for target in [
            WorkflowState::Draft,
            WorkflowState::InReview,
            WorkflowState::Rejected,
            WorkflowState::RevisionRequested,
            WorkflowState::Scheduled,
            WorkflowState::Archived,
        ] {
            assert!(validate_transition(&bare, target, &config).is_ok());
        }
    }

    #[test]
    fn test_thresholds_follow_config() {
        let config = WorkflowConfig {
            min_title_chars: 3,
            min_content_chars: 5,
            ..WorkflowConfig::default()
        };
        let short = Article::new("a-1", "Hey", "Hello", "writer1");
        assert!(validate_transition(&short, WorkflowState::PendingReview, &config).is_ok());
    }
}
