// tests/scheduler_loop.rs
//
// Drives DailyScheduler with tokio's paused clock: each `sleep` below jumps
// simulated time forward, letting the scheduler wake at its 01:00 fire times.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{at, sources, FlakyStore, TokioClock};
use tari_dashboard::store::ArticleStore;
use tari_dashboard::{Article, DailyScheduler, RuleSet, SchedulerCfg, Tagger};
use tokio_util::sync::CancellationToken;

const HOUR: Duration = Duration::from_secs(3600);

fn cfg(lookback_days: u32) -> SchedulerCfg {
    SchedulerCfg {
        lookback_days,
        ..SchedulerCfg::default()
    }
}

fn articles() -> Vec<Article> {
    vec![
        Article::new("https://detik.com/a", at(2024, 5, 10, 8, 0)),
        Article::new("https://kompas.com/b", at(2024, 5, 11, 9, 0)),
    ]
}

fn scheduler(store: Arc<FlakyStore>, cfg: SchedulerCfg) -> DailyScheduler {
    let tagger = Arc::new(Tagger::new(store, RuleSet::builtin(), Duration::from_secs(30)));
    // Friday 13:00: the first fire is Saturday 01:00, twelve hours later.
    let clock = Arc::new(TokioClock::starting_at(at(2024, 5, 10, 13, 0)));
    DailyScheduler::with_clock(tagger, cfg, clock)
}

#[tokio::test(start_paused = true)]
async fn fires_once_per_day_for_the_previous_day() {
    let store = Arc::new(FlakyStore::new(articles()));
    let shutdown = CancellationToken::new();
    let handle = scheduler(store.clone(), cfg(1)).spawn(shutdown.clone());

    tokio::time::sleep(11 * HOUR).await;
    assert_eq!(sources(&store.find_all().await.unwrap()), vec![None, None]);

    tokio::time::sleep(2 * HOUR).await;
    assert_eq!(
        sources(&store.find_all().await.unwrap()),
        vec![Some("detik"), None]
    );

    tokio::time::sleep(24 * HOUR).await;
    assert_eq!(
        sources(&store.find_all().await.unwrap()),
        vec![Some("detik"), Some("kompas")]
    );

    shutdown.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failed_cycle_does_not_stop_the_loop_and_backlog_is_caught_up() {
    let store = Arc::new(FlakyStore::new(articles()));
    let shutdown = CancellationToken::new();
    let handle = scheduler(store.clone(), cfg(3)).spawn(shutdown.clone());

    store.set_offline(true);
    tokio::time::sleep(13 * HOUR).await;
    assert!(!handle.is_finished());

    store.set_offline(false);
    assert_eq!(sources(&store.find_all().await.unwrap()), vec![None, None]);

    // Sunday 01:00 covers Thursday..Saturday, including Friday's missed article.
    tokio::time::sleep(24 * HOUR).await;
    assert_eq!(
        sources(&store.find_all().await.unwrap()),
        vec![Some("detik"), Some("kompas")]
    );

    shutdown.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn cancellation_while_waiting_stops_without_firing() {
    let store = Arc::new(FlakyStore::new(articles()));
    let shutdown = CancellationToken::new();
    let handle = scheduler(store.clone(), cfg(1)).spawn(shutdown.clone());

    tokio::time::sleep(HOUR).await;
    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("scheduler should stop promptly")
        .unwrap();

    assert_eq!(sources(&store.find_all().await.unwrap()), vec![None, None]);
}

#[tokio::test(start_paused = true)]
async fn cancelled_before_start_returns_immediately() {
    let store = Arc::new(FlakyStore::new(articles()));
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    scheduler(store.clone(), cfg(1)).run(shutdown).await;
    assert_eq!(sources(&store.find_all().await.unwrap()), vec![None, None]);
}

#[tokio::test(start_paused = true)]
async fn single_fire_reports_what_it_tagged() {
    let store = Arc::new(FlakyStore::new(articles()));
    let sched = scheduler(store.clone(), cfg(1));

    // Clock still reads Friday 13:00, so the window is Thursday: nothing to do.
    let report = sched.fire().await.unwrap();
    assert_eq!(report.total, 0);

    store.set_offline(true);
    assert!(sched.fire().await.is_none());
}
