// src/bootstrap.rs
use metrics::counter;

use crate::error::TagError;
use crate::tagger::{TagReport, Tagger};
use crate::window::Window;

/// Tag every untagged article regardless of date. Runs once at startup,
/// before the dashboard serves its first read; errors go back to the caller.
pub async fn bootstrap_sweep(tagger: &Tagger) -> Result<TagReport, TagError> {
    tracing::info!(target: "bootstrap", rules = tagger.rules().len(), "starting all-time sweep");
    let report = tagger.tag_window(Window::all_time()).await?;
    counter!("bootstrap_tagged_total").increment(report.total);
    tracing::info!(target: "bootstrap", tagged = report.total, "all-time sweep finished");
    Ok(report)
}
