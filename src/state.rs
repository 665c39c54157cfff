use std::sync::Arc;
use tokio::sync::mpsc;
use crate::models::AnalysisJob;
use crate::rate_limit::RateLimiter;
// app's shared state

pub struct AppState {
    pub rate_limiter: Arc<RateLimiter>,
    // None when no API key is configured
    pub job_tx: Option<mpsc::Sender<AnalysisJob>>,
}
