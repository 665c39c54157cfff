use axum::{Json, extract::State};
use std::sync::Arc;
use crate::rate_limit::RateLimitStatus;
use crate::state::AppState;

// Remaining quota for the status display; never consumes
pub async fn rate_limit_handler(State(state): State<Arc<AppState>>) -> Json<RateLimitStatus> {
    Json(state.rate_limiter.inspect())
}
