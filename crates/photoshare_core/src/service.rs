/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::config::{ServiceConfig, TimelineConfig};
use crate::relation_store::RelationStore;
use crate::social_db::SocialDb;
use crate::timeline::list_latest_albums_vm;
use crate::timeline_metrics::TimelineMetrics;
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use http::StatusCode;
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RelationStore>,
    pub timeline: Arc<TimelineConfig>,
    pub metrics: Arc<TimelineMetrics>,
}

#[derive(Debug, serde::Deserialize)]
pub struct TimelineQuery {
    pub viewer: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/timeline", get(timeline))
        .route("/_photoshare/metrics", get(metrics_json))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn timeline(State(state): State<AppState>, Query(q): Query<TimelineQuery>) -> Response {
    let res = list_latest_albums_vm(
        state.store.as_ref(),
        q.viewer.as_deref(),
        &state.timeline,
        &state.metrics,
    )
    .await;
    match res {
        Ok(items) => axum::Json(items).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(serde_json::json!({ "error": format!("{e:#}") })),
        )
            .into_response(),
    }
}

async fn metrics_json(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.metrics.snapshot())
}

async fn healthz() -> &'static str {
    "ok"
}

/// Opens the store, binds and serves until `shutdown` flips to true.
pub async fn serve(cfg: ServiceConfig, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    let db_path = cfg.db_path()?;
    if let Some(dir) = db_path.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("create data dir: {}", dir.display()))?;
    }
    let db = SocialDb::open(&db_path)?;
    db.health_check().context("db health check")?;

    let state = AppState {
        store: Arc::new(db),
        timeline: Arc::new(cfg.timeline()),
        metrics: Arc::new(TimelineMetrics::new()),
    };

    let addr: SocketAddr = cfg.bind.parse().context("parse bind")?;
    let listener = tokio::net::TcpListener::bind(addr).await.context("bind")?;
    info!(db = %db_path.display(), "photoshare timeline http://{addr}");

    let shutdown = async move {
        while !*shutdown.borrow() {
            if shutdown.changed().await.is_err() {
                break;
            }
        }
    };
    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("http server")?;
    Ok(())
}
