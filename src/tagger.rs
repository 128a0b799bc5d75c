//! # Tagger
//!
//! Assigns a publication label to untagged articles inside a time window.
//!
//! - One bulk conditional update per rule, applied in rule order.
//! - Every update is guarded by "`source` absent", so a label is never
//!   overwritten and re-running a window is always safe.
//! - Each store call runs under a per-operation deadline.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use regex::Regex;
use serde::Serialize;

use crate::error::TagError;
use crate::store::{ArticleStore, UpdateFilter};
use crate::window::Window;

/// `(pattern, label)`: articles whose url matches `pattern` get `label`.
#[derive(Debug, Clone)]
pub struct TaggingRule {
    pub pattern: Regex,
    pub label: String,
}

impl TaggingRule {
    pub fn new(pattern: &str, label: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            label: label.into(),
        })
    }
}

/// Ordered rule table.
#[derive(Debug, Clone)]
pub struct RuleSet(Vec<TaggingRule>);

impl RuleSet {
    pub fn new(rules: Vec<TaggingRule>) -> Self {
        Self(rules)
    }

    /// Built-in table: detik.com and kompas.com.
    pub fn builtin() -> Self {
        Self(
            [(r"detik\.com", "detik"), (r"kompas\.com", "kompas")]
                .into_iter()
                .filter_map(|(p, l)| TaggingRule::new(p, l).ok())
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaggingRule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.0.iter().map(|r| r.label.clone()).collect()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RuleOutcome {
    pub label: String,
    pub pattern: String,
    pub modified: u64,
}

/// What one invocation changed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TagReport {
    pub window: Window,
    pub per_rule: Vec<RuleOutcome>,
    pub total: u64,
}

pub struct Tagger {
    store: Arc<dyn ArticleStore>,
    rules: RuleSet,
    op_timeout: Duration,
}

impl Tagger {
    pub fn new(store: Arc<dyn ArticleStore>, rules: RuleSet, op_timeout: Duration) -> Self {
        crate::metrics::ensure_metrics_described();
        Self {
            store,
            rules,
            op_timeout,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn store(&self) -> &Arc<dyn ArticleStore> {
        &self.store
    }

    /// Tag every untagged article in `window`. The first failing rule aborts
    /// the rest of the invocation; already applied rules stay applied.
    pub async fn tag_window(&self, window: Window) -> Result<TagReport, TagError> {
        let mut per_rule = Vec::with_capacity(self.rules.len());
        let mut total = 0u64;

        for rule in self.rules.iter() {
            let filter = UpdateFilter::new(rule.pattern.clone(), window);
            let call = self.store.update_many(&filter, &rule.label);
            let modified = match tokio::time::timeout(self.op_timeout, call).await {
                Ok(Ok(n)) => n,
                Ok(Err(e)) => return Err(record_failure(TagError::from_store(&rule.label, e))),
                Err(_) => {
                    return Err(record_failure(TagError::QueryTimeout {
                        rule: rule.label.clone(),
                        after: self.op_timeout,
                    }))
                }
            };

            counter!("tagger_records_tagged_total", "label" => rule.label.clone())
                .increment(modified);
            tracing::debug!(
                target: "tagger",
                label = %rule.label,
                pattern = %rule.pattern,
                %window,
                modified,
                "rule applied"
            );

            total += modified;
            per_rule.push(RuleOutcome {
                label: rule.label.clone(),
                pattern: rule.pattern.as_str().to_string(),
                modified,
            });
        }

        counter!("tagger_runs_total").increment(1);
        tracing::info!(target: "tagger", %window, total, store = self.store.name(), "tagging finished");

        Ok(TagReport {
            window,
            per_rule,
            total,
        })
    }
}

fn record_failure(err: TagError) -> TagError {
    counter!("tagger_errors_total", "kind" => err.kind()).increment(1);
    err
}
