// src/scheduler.rs
use std::sync::Arc;

use chrono::{Days, NaiveDateTime, NaiveTime};
use metrics::gauge;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::tagger::{TagReport, Tagger};
use crate::window::Window;

/// Source of local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerCfg {
    /// Local time of day the daily run fires.
    pub fire_at: NaiveTime,
    /// Whole days before today covered by each run (1 = yesterday only).
    pub lookback_days: u32,
}

impl Default for SchedulerCfg {
    fn default() -> Self {
        Self {
            fire_at: NaiveTime::from_hms_opt(1, 0, 0).unwrap_or(NaiveTime::MIN),
            lookback_days: 3,
        }
    }
}

/// Next fire time: `fire_at` on the day after `now`'s date. Never today,
/// even when today's `fire_at` is still ahead.
pub fn next_run(now: NaiveDateTime, fire_at: NaiveTime) -> NaiveDateTime {
    now.date()
        .checked_add_days(Days::new(1))
        .unwrap_or(now.date())
        .and_time(fire_at)
}

/// Window tagged by a run that fires at `now`.
pub fn target_window(now: NaiveDateTime, lookback_days: u32) -> Window {
    Window::trailing_days(now.date(), lookback_days)
}

/// Long-lived daily tagging loop: WAITING (sleep until the next fire time)
/// then FIRING (tag the trailing window), forever, until cancelled.
pub struct DailyScheduler {
    tagger: Arc<Tagger>,
    cfg: SchedulerCfg,
    clock: Arc<dyn Clock>,
}

impl DailyScheduler {
    pub fn new(tagger: Arc<Tagger>, cfg: SchedulerCfg) -> Self {
        Self::with_clock(tagger, cfg, Arc::new(LocalClock))
    }

    pub fn with_clock(tagger: Arc<Tagger>, cfg: SchedulerCfg, clock: Arc<dyn Clock>) -> Self {
        Self { tagger, cfg, clock }
    }

    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            target: "scheduler",
            fire_at = %self.cfg.fire_at,
            lookback_days = self.cfg.lookback_days,
            "daily scheduler started"
        );

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let now = self.clock.now();
            let next = next_run(now, self.cfg.fire_at);
            let wait = (next - now).to_std().unwrap_or_default();
            gauge!("scheduler_next_run_ts").set(next.and_utc().timestamp() as f64);
            tracing::info!(
                target: "scheduler",
                next_run = %next,
                wait_secs = wait.as_secs(),
                "waiting for next daily run"
            );

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
            if shutdown.is_cancelled() {
                break;
            }

            self.fire().await;
        }

        tracing::info!(target: "scheduler", "daily scheduler stopped");
    }

    /// One FIRING step. Failures are logged and swallowed; the trailing
    /// window lets the next cycles pick the backlog up again.
    pub async fn fire(&self) -> Option<TagReport> {
        let now = self.clock.now();
        let window = target_window(now, self.cfg.lookback_days);
        gauge!("scheduler_last_run_ts").set(now.and_utc().timestamp() as f64);

        match self.tagger.tag_window(window).await {
            Ok(report) => {
                tracing::info!(
                    target: "scheduler",
                    %window,
                    tagged = report.total,
                    "daily tagging done"
                );
                Some(report)
            }
            Err(e) => {
                tracing::warn!(
                    target: "scheduler",
                    error = %e,
                    %window,
                    retryable = e.is_retryable(),
                    "daily tagging failed"
                );
                None
            }
        }
    }
}
