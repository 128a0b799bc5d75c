//! tari-dashboard — Binary Entrypoint
//! Opens the article store, runs the startup sweep, spawns the daily tagging
//! scheduler and serves the dashboard API until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tari_dashboard::config::AppConfig;
use tari_dashboard::dashboard::Dashboard;
use tari_dashboard::metrics::Metrics;
use tari_dashboard::{api, bootstrap_sweep, store, AppState, DailyScheduler, Tagger};

/// Compact logs by default; `TARI_LOG_JSON=1` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tari_dashboard=info,warn"));
    let json = std::env::var("TARI_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load().context("loading configuration")?;
    let metrics = Metrics::init()?;

    let store = store::connect(&cfg.store_url)
        .await
        .with_context(|| format!("connecting to store {}", cfg.store_url))?;
    let tagger = Arc::new(Tagger::new(store.clone(), cfg.rules.clone(), cfg.op_timeout));

    // The first dashboard read must see tagged data.
    if let Err(e) = bootstrap_sweep(&tagger).await {
        if !cfg.bootstrap.continue_on_error {
            if let Err(ce) = store.close().await {
                tracing::warn!(target: "store", error = %ce, "closing store after failed startup");
            }
            return Err(e).context("startup sweep failed");
        }
        tracing::warn!(target: "bootstrap", error = %e, "startup sweep failed; serving anyway");
    }

    let shutdown = CancellationToken::new();
    let scheduler = DailyScheduler::new(tagger.clone(), cfg.scheduler).spawn(shutdown.clone());

    let dashboard = Arc::new(Dashboard::new(store.clone(), cfg.dashboard.clone())?);
    let app = api::router(AppState {
        dashboard,
        tagger,
        metrics: Some(metrics.handle.clone()),
    });

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr.as_str())
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    tracing::info!(addr = %cfg.bind_addr, "dashboard listening");

    let stop = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "ctrl-c handler failed");
            }
            stop.cancel();
        })
        .await
        .context("serving dashboard")?;

    shutdown.cancel();
    if let Err(e) = scheduler.await {
        tracing::warn!(error = %e, "scheduler task ended abnormally");
    }
    store.close().await.context("closing store")?;
    tracing::info!("shutdown complete");
    Ok(())
}
