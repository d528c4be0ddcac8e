//! `/v1/liveness` and `/v1/readiness`, mounted without authentication.

use std::time::Duration;

use axum::{extract::State, routing::get, Router};
use serde::Serialize;

use crate::app::AppState;
use crate::database::HealthCheck;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

const READINESS_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub version: &'static str,
    pub host: String,
}

#[derive(Debug, Serialize)]
pub struct Readiness {
    pub status: &'static str,
}

async fn liveness() -> ApiResult<Liveness> {
    let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "unavailable".to_string());

    Ok(ApiResponse::success(Liveness {
        status: "up",
        version: env!("CARGO_PKG_VERSION"),
        host,
    }))
}

async fn readiness(State(state): State<AppState>) -> ApiResult<Readiness> {
    match tokio::time::timeout(READINESS_TIMEOUT, state.health.ping()).await {
        Ok(Ok(())) => Ok(ApiResponse::success(Readiness { status: "ok" })),
        Ok(Err(e)) => {
            tracing::info!("readiness failure: {}", e);
            Err(ApiError::service_unavailable("db not ready"))
        }
        Err(_) => {
            tracing::info!("readiness failure: ping timed out");
            Err(ApiError::service_unavailable("db not ready"))
        }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/liveness", get(liveness))
        .route("/readiness", get(readiness))
        .with_state(state)
}
