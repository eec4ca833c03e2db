//! Engine configuration.
//!
//! Thresholds and naming used by the engine. The transition table itself is
//! not configurable.

use serde::Deserialize;
use std::path::Path;

use crate::{QuillError, Result};

/// Default channel capacity for workflow events.
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Tunable settings for a [`WorkflowEngine`](crate::WorkflowEngine).
///
/// Every field has a default, so a TOML file only needs to name the values
/// it changes:
///
/// ```
/// use quill::WorkflowConfig;
///
/// let config = WorkflowConfig::from_toml_str("auto_publish_score = 95.0")?;
/// assert_eq!(config.auto_publish_score, 95.0);
/// assert_eq!(config.min_title_chars, 10);
/// # Ok::<(), quill::QuillError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Minimum trimmed title length for submission.
    pub min_title_chars: usize,
    /// Minimum trimmed content length for submission.
    pub min_content_chars: usize,
    /// Minimum AI confidence score for approval.
    pub min_approval_score: f64,
    /// Score at or above which approval cascades into publication.
    pub auto_publish_score: f64,
    /// Recipient for "awaiting review" notifications.
    pub editor_pool: String,
    /// Prefix for notification action URLs; the article id is appended.
    pub action_url_base: String,
    /// Capacity of the event broadcast channel.
    pub event_channel_capacity: usize,
    /// Actor recorded on cascaded transitions.
    pub system_actor: String,
    /// Actor recorded on scheduled publications.
    pub scheduler_actor: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            min_title_chars: 10,
            min_content_chars: 100,
            min_approval_score: 60.0,
            auto_publish_score: 90.0,
            editor_pool: "editors".to_string(),
            action_url_base: "/admin/articles".to_string(),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            system_actor: "system".to_string(),
            scheduler_actor: "scheduler".to_string(),
        }
    }
}

impl WorkflowConfig {
    /// Parses a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Config`] if the document is malformed, names
    /// an unknown field, or fails [`validate`](Self::validate).
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| QuillError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Checks that the settings are coherent.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Config`] when a score lies outside `0..=100`,
    /// auto-publication would bypass the approval bar, or the event channel
    /// has no capacity.
    pub fn validate(&self) -> Result<()> {
        for (name, score) in [
            ("min_approval_score", self.min_approval_score),
            ("auto_publish_score", self.auto_publish_score),
        ] {
            if !(0.0..=100.0).contains(&score) {
                return Err(QuillError::Config(format!(
                    "{} must be within 0..=100 (got {})",
                    name, score
                )));
            }
        }
        if self.auto_publish_score < self.min_approval_score {
            return Err(QuillError::Config(
                "auto_publish_score must not be below min_approval_score".to_string(),
            ));
        }
        if self.event_channel_capacity == 0 {
            return Err(QuillError::Config(
                "event_channel_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkflowConfig::default();
        assert_eq!(config.min_title_chars, 10);
        assert_eq!(config.min_content_chars, 100);
        assert_eq!(config.min_approval_score, 60.0);
        assert_eq!(config.auto_publish_score, 90.0);
        assert_eq!(config.editor_pool, "editors");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = WorkflowConfig::from_toml_str(
            r#"
            editor_pool = "desk-editors"
            min_content_chars = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.editor_pool, "desk-editors");
        assert_eq!(config.min_content_chars, 250);
        assert_eq!(config.min_title_chars, 10);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = WorkflowConfig::from_toml_str("").unwrap();
        assert_eq!(config, WorkflowConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = WorkflowConfig::from_toml_str("max_cascade_depth = 5").unwrap_err();
        assert!(matches!(err, QuillError::Config(_)));
    }

    #[test]
    fn test_out_of_range_score_rejected() {
        let err = WorkflowConfig::from_toml_str("min_approval_score = 140.0").unwrap_err();
        assert!(err.to_string().contains("min_approval_score"));
    }

    #[test]
    fn test_auto_publish_below_approval_rejected() {
        let err = WorkflowConfig::from_toml_str(
            "min_approval_score = 70.0\nauto_publish_score = 65.0",
        )
        .unwrap_err();
        assert!(matches!(err, QuillError::Config(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = WorkflowConfig::load("/nonexistent/quill.toml").unwrap_err();
        assert!(matches!(err, QuillError::Io(_)));
    }
}
