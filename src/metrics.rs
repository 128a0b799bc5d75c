use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Only one recorder can be
    /// installed per process.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }
}

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("tagger_runs_total", "Completed tagging invocations.");
        describe_counter!(
            "tagger_records_tagged_total",
            "Articles that received a source label, by label."
        );
        describe_counter!("tagger_errors_total", "Failed tagging invocations, by kind.");
        describe_counter!(
            "bootstrap_tagged_total",
            "Articles tagged by startup and manual all-time sweeps."
        );
        describe_gauge!(
            "scheduler_next_run_ts",
            "Local wall-clock unix ts of the next daily tagging run."
        );
        describe_gauge!(
            "scheduler_last_run_ts",
            "Local wall-clock unix ts when the daily tagging run last fired."
        );
    });
}
