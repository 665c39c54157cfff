use axum::{Json, extract::State, extract::rejection::JsonRejection};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use crate::error::AnalysisError;
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{AnalysisJob, AnalysisParams, AnalysisResult};
use crate::state::AppState;

pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalysisParams>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AnalysisError> {
    REQUEST_TOTAL.inc();

    let Json(params) = payload.map_err(|e| AnalysisError::InvalidParams(e.body_text()))?;

    params.validate()?;

    // no quota is spent on a request that cannot reach Gemini
    let job_tx = state.job_tx.as_ref().ok_or(AnalysisError::MissingApiKey)?;

    // the store may write a file, keep it off the async workers
    let limiter = Arc::clone(&state.rate_limiter);
    tokio::task::spawn_blocking(move || limiter.check_and_consume())
        .await
        .map_err(|e| AnalysisError::Internal(format!("quota check aborted: {e}")))??;

    let start_time = Instant::now();

    let (response_tx, response_rx) = oneshot::channel();

    let job = AnalysisJob {
        params,
        response_tx,
    };

    job_tx.send(job).await
        .map_err(|_| AnalysisError::Queue("failed to queue request".to_string()))?;

    let result = response_rx.await
        .map_err(|_| AnalysisError::Queue("worker failed to respond".to_string()))?;

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    result.map(Json)
}
