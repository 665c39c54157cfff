// Business analysis gateway: validate a company profile, spend one unit of the
// daily quota, ask Gemini, return four tables plus a summary

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod gemini;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod prompt;
pub mod rate_limit;
pub mod state;
pub mod storage;
pub mod worker;

use axum::{
    Router, routing::{get, post}
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::{analyze_handler, health_handler, metrics_handler, rate_limit_handler};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/rate-limit", get(rate_limit_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
