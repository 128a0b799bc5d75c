// src/config/mod.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveTime;
use serde::Deserialize;

use crate::scheduler::SchedulerCfg;
use crate::tagger::{RuleSet, TaggingRule};

pub const ENV_CONFIG_PATH: &str = "TARI_CONFIG_PATH";
pub const ENV_STORE_URL: &str = "TARI_STORE_URL";
pub const ENV_BIND_ADDR: &str = "TARI_BIND_ADDR";
pub const ENV_FIRE_AT: &str = "TARI_FIRE_AT";

fn default_store_url() -> String {
    "file://data/tari_article.json".to_string()
}
fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}
fn default_fire_at() -> String {
    "01:00".to_string()
}
fn default_lookback_days() -> u32 {
    3
}
fn default_op_timeout_secs() -> u64 {
    30
}
fn default_fallback_label() -> String {
    "kompas".to_string()
}
fn default_allowed_sources() -> Vec<String> {
    vec!["kompas-tv".to_string(), "detik".to_string()]
}
fn default_top_words() -> usize {
    100
}
fn default_top_dances() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    pub pattern: String,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawScheduler {
    #[serde(default = "default_fire_at")]
    fire_at: String,
    #[serde(default = "default_lookback_days")]
    lookback_days: u32,
    #[serde(default = "default_op_timeout_secs")]
    op_timeout_secs: u64,
}

impl Default for RawScheduler {
    fn default() -> Self {
        Self {
            fire_at: default_fire_at(),
            lookback_days: default_lookback_days(),
            op_timeout_secs: default_op_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct BootstrapCfg {
    /// Serve the dashboard even if the startup sweep failed.
    #[serde(default)]
    pub continue_on_error: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DashboardCfg {
    /// Display-only label for articles that have no `source` yet.
    #[serde(default = "default_fallback_label")]
    pub fallback_label: String,
    #[serde(default = "default_allowed_sources")]
    pub allowed_sources: Vec<String>,
    #[serde(default = "default_top_words")]
    pub top_words: usize,
    #[serde(default = "default_top_dances")]
    pub top_dances: usize,
    /// One stopword per line; the built-in Indonesian list is used when unset.
    #[serde(default)]
    pub stopwords_path: Option<PathBuf>,
}

impl Default for DashboardCfg {
    fn default() -> Self {
        Self {
            fallback_label: default_fallback_label(),
            allowed_sources: default_allowed_sources(),
            top_words: default_top_words(),
            top_dances: default_top_dances(),
            stopwords_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    store_url: Option<String>,
    #[serde(default)]
    bind_addr: Option<String>,
    #[serde(default)]
    scheduler: RawScheduler,
    #[serde(default)]
    bootstrap: BootstrapCfg,
    #[serde(default)]
    rules: Option<Vec<RuleSpec>>,
    #[serde(default)]
    dashboard: DashboardCfg,
}

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_url: String,
    pub bind_addr: String,
    pub scheduler: SchedulerCfg,
    pub op_timeout: Duration,
    pub bootstrap: BootstrapCfg,
    pub rules: RuleSet,
    pub dashboard: DashboardCfg,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_url: default_store_url(),
            bind_addr: default_bind_addr(),
            scheduler: SchedulerCfg::default(),
            op_timeout: Duration::from_secs(default_op_timeout_secs()),
            bootstrap: BootstrapCfg::default(),
            rules: RuleSet::builtin(),
            dashboard: DashboardCfg::default(),
        }
    }
}

impl AppConfig {
    /// Load config from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = read_raw(path)?;
        raw.validate()
            .with_context(|| format!("validating {}", path.display()))
    }

    /// Load config using env var + fallbacks, then apply env overrides:
    /// 1) $TARI_CONFIG_PATH
    /// 2) config/tari.toml
    /// 3) config/tari.json
    /// 4) built-in defaults
    pub fn load() -> Result<Self> {
        let mut raw = match locate()? {
            Some(path) => {
                tracing::info!(target: "config", path = %path.display(), "loading config");
                read_raw(&path)?
            }
            None => RawConfig::default(),
        };
        raw.apply_env();
        raw.validate()
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        parse_raw(s, "toml")?.validate()
    }
}

fn locate() -> Result<Option<PathBuf>> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(Some(pb));
        }
        return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
    }
    for candidate in ["config/tari.toml", "config/tari.json"] {
        let pb = PathBuf::from(candidate);
        if pb.exists() {
            return Ok(Some(pb));
        }
    }
    Ok(None)
}

fn read_raw(path: &Path) -> Result<RawConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_raw(&content, &ext).with_context(|| format!("parsing {}", path.display()))
}

fn parse_raw(s: &str, hint_ext: &str) -> Result<RawConfig> {
    if hint_ext == "json" {
        return Ok(serde_json::from_str(s)?);
    }
    match toml::from_str(s) {
        Ok(v) => Ok(v),
        // Unknown extension: give JSON a chance before reporting the TOML error.
        Err(e) if hint_ext != "toml" => serde_json::from_str(s).map_err(|_| anyhow!(e)),
        Err(e) => Err(e.into()),
    }
}

fn parse_fire_at(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .with_context(|| format!("fire_at '{s}' is not HH:MM"))
}

impl RawConfig {
    fn apply_env(&mut self) {
        if let Some(v) = non_empty_env(ENV_STORE_URL) {
            self.store_url = Some(v);
        }
        if let Some(v) = non_empty_env(ENV_BIND_ADDR) {
            self.bind_addr = Some(v);
        }
        if let Some(v) = non_empty_env(ENV_FIRE_AT) {
            self.scheduler.fire_at = v;
        }
    }

    fn validate(self) -> Result<AppConfig> {
        let fire_at = parse_fire_at(&self.scheduler.fire_at)?;
        if self.scheduler.lookback_days == 0 {
            bail!("scheduler.lookback_days must be at least 1");
        }
        if self.scheduler.op_timeout_secs == 0 {
            bail!("scheduler.op_timeout_secs must be at least 1");
        }

        let rules = match self.rules {
            None => RuleSet::builtin(),
            Some(specs) => {
                let mut out = Vec::with_capacity(specs.len());
                for spec in specs {
                    let label = spec.label.trim();
                    if label.is_empty() {
                        bail!("rule '{}' has an empty label", spec.pattern);
                    }
                    let rule = TaggingRule::new(&spec.pattern, label)
                        .with_context(|| format!("compiling rule pattern '{}'", spec.pattern))?;
                    out.push(rule);
                }
                RuleSet::new(out)
            }
        };

        let mut dashboard = self.dashboard;
        dashboard.allowed_sources = clean_list(dashboard.allowed_sources);

        Ok(AppConfig {
            store_url: self.store_url.unwrap_or_else(default_store_url),
            bind_addr: self.bind_addr.unwrap_or_else(default_bind_addr),
            scheduler: SchedulerCfg {
                fire_at,
                lookback_days: self.scheduler.lookback_days,
            },
            op_timeout: Duration::from_secs(self.scheduler.op_timeout_secs),
            bootstrap: self.bootstrap,
            rules,
            dashboard,
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim, drop empties and duplicates, keep the configured order.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|o| o == t) {
            out.push(t.to_string());
        }
    }
    out
}
