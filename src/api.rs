use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;

use crate::bootstrap::bootstrap_sweep;
use crate::dashboard::{Dashboard, DashboardView};
use crate::error::{StoreError, TagError};
use crate::tagger::{TagReport, Tagger};

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub tagger: Arc<Tagger>,
    /// Prometheus exposition for `/metrics`; `None` when no recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/sources", get(sources))
        .route("/api/dashboard", get(dashboard))
        .route("/admin/sweep", post(manual_sweep))
        .route("/metrics", get(render_metrics))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
    retryable: bool,
}

enum ApiError {
    Store(StoreError),
    Tag(TagError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Store(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody {
                    error: e.to_string(),
                    retryable: true,
                },
            ),
            ApiError::Tag(e) => {
                let status = if e.is_retryable() {
                    StatusCode::SERVICE_UNAVAILABLE
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (
                    status,
                    ErrorBody {
                        retryable: e.is_retryable(),
                        error: e.to_string(),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

async fn sources(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let out = state.dashboard.sources().await.map_err(|e| {
        tracing::warn!(target: "api", error = %e, "sources read failed");
        ApiError::Store(e)
    })?;
    Ok(Json(out))
}

/// `?sources=detik,kompas-tv`; missing or empty selects every allowed source.
async fn dashboard(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Result<Json<DashboardView>, ApiError> {
    let selected: Vec<String> = q
        .get("sources")
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let view = state.dashboard.view(&selected).await.map_err(|e| {
        tracing::warn!(target: "api", error = %e, "dashboard read failed");
        ApiError::Store(e)
    })?;
    Ok(Json(view))
}

async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn manual_sweep(State(state): State<AppState>) -> Result<Json<TagReport>, ApiError> {
    let report = bootstrap_sweep(&state.tagger).await.map_err(|e| {
        tracing::warn!(target: "api", error = %e, "manual sweep failed");
        ApiError::Tag(e)
    })?;
    Ok(Json(report))
}
