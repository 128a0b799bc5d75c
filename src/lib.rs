// src/lib.rs
// Public library surface for the binary and the integration tests.

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod metrics;
pub mod model;
pub mod scheduler;
pub mod store;
pub mod tagger;
pub mod window;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::bootstrap::bootstrap_sweep;
pub use crate::error::{StoreError, TagError};
pub use crate::model::Article;
pub use crate::scheduler::{next_run, DailyScheduler, SchedulerCfg};
pub use crate::tagger::{RuleSet, TagReport, Tagger, TaggingRule};
pub use crate::window::Window;
