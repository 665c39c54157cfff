use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};
use crate::cache::{CacheEntry, make_cache_key};
use crate::error::AnalysisError;
use crate::gemini::{GeminiClient, parse_analysis};
use crate::metrics::{CACHE_HITS, CACHE_MISSES, CACHE_SIZE, UPSTREAM_FAILURES};
use crate::models::{AnalysisJob, AnalysisParams, AnalysisResult};
use crate::prompt;


pub async fn analysis_worker(
    mut rx: mpsc::Receiver<AnalysisJob>,
    gemini: GeminiClient,
    cache: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
) {
    info!("Analysis worker started - processing jobs sequentially");

    // keep receiving jobs from the queue
    while let Some(job) = rx.recv().await {
        let result = run_analysis(&gemini, &cache, ttl, &job.params).await;
        // handler may have gone away (client disconnected)
        let _ = job.response_tx.send(result);
    }

    info!("Analysis queue closed, worker exiting");
}

pub async fn run_analysis(
    gemini: &GeminiClient,
    cache: &DashMap<String, CacheEntry>,
    ttl: Duration,
    params: &AnalysisParams,
) -> Result<AnalysisResult, AnalysisError> {
    let cache_key = make_cache_key(gemini.model(), params);

    // check cache first
    if let Some(entry) = cache.get(&cache_key) {
        if entry.created_at.elapsed() < ttl {
            CACHE_HITS.inc();
            info!("[Worker] Cache HIT");
            return Ok(entry.result.clone());
        }
    }
    CACHE_MISSES.inc();

    let text = match gemini.generate(&prompt::build(params)).await {
        Ok(text) => text,
        Err(e) => {
            UPSTREAM_FAILURES.inc();
            warn!(error = %e, "[Worker] Gemini call failed");
            return Err(e);
        }
    };

    let result = match parse_analysis(&text) {
        Ok(result) => result,
        Err(e) => {
            UPSTREAM_FAILURES.inc();
            warn!(error = %e, reply_len = text.len(), "[Worker] Unusable Gemini reply");
            return Err(e);
        }
    };

    // saving to cache, dropping expired entries on the way
    cache.retain(|_, entry| entry.created_at.elapsed() < ttl);
    cache.insert(cache_key, CacheEntry {
        result: result.clone(),
        created_at: Instant::now(),
    });
    CACHE_SIZE.set(cache.len() as f64);

    Ok(result)
}
