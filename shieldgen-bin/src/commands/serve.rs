use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use log::{info, warn};
use serde::Deserialize;
use shieldgen_lib::{Dataset, Generator, Rule};
use tokio::net::TcpListener;

use super::CommandParams;
use crate::ExitCode;

/// Shared by all requests; every request runs its own aggregation
#[derive(Debug)]
struct AppState {
    generator: Generator,
    dataset: Dataset,
    interest: HashSet<u32>,
    default_limit: usize,
}

#[derive(Debug, Deserialize)]
struct GenerateQuery {
    limit: Option<String>,
}

impl GenerateQuery {
    /// A missing or unparsable limit falls back to `default`
    fn limit_or(&self, default: usize) -> usize {
        self.limit
            .as_deref()
            .and_then(|limit| limit.trim().parse().ok())
            .unwrap_or(default)
    }
}

/// Serve freshly generated rules over HTTP until interrupted
pub(crate) async fn serve(params: CommandParams) -> Result<ExitCode> {
    let address = params.cfg.address.clone();
    let app = router(params);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Cannot bind to `{address}`"))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(ExitCode::Success)
}

fn router(params: CommandParams) -> Router {
    let state = AppState {
        generator: params.generator,
        dataset: params.dataset,
        interest: params.cfg.interest(),
        default_limit: params.cfg.limit,
    };

    Router::new()
        .route("/health", get(health))
        .route("/generate", get(generate_rules))
        .fallback(not_found)
        .with_state(Arc::new(state))
}

async fn health() -> &'static str {
    "ok"
}

async fn generate_rules(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GenerateQuery>,
) -> Json<Vec<Rule>> {
    let limit = query.limit_or(state.default_limit);
    let urls = state.dataset.urls(&state.interest);
    info!("Generating up to {limit} rules from {} lists", urls.len());
    Json(state.generator.generate(urls, limit).await)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
