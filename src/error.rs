//! Error types for the store and tagging layers.

use std::time::Duration;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Failures reported by an [`ArticleStore`](crate::store::ArticleStore) backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed document store content: {0}")]
    Malformed(String),
}

/// Failures of a single tagging invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("store unavailable while applying rule '{rule}': {reason}")]
    StoreUnavailable { rule: String, reason: String },

    #[error("rule '{rule}' timed out after {after:?}")]
    QueryTimeout { rule: String, after: Duration },

    #[error("malformed window: start {start} is not before end {end}")]
    MalformedWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl TagError {
    /// Store-side failures clear up on their own; a bad window never does.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TagError::StoreUnavailable { .. } | TagError::QueryTimeout { .. }
        )
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TagError::StoreUnavailable { .. } => "store_unavailable",
            TagError::QueryTimeout { .. } => "query_timeout",
            TagError::MalformedWindow { .. } => "malformed_window",
        }
    }

    pub(crate) fn from_store(rule: &str, err: StoreError) -> Self {
        TagError::StoreUnavailable {
            rule: rule.to_string(),
            reason: err.to_string(),
        }
    }
}
