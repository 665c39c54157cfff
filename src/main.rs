use anyhow::Context;
use clap::Parser; // for cli
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cio_assist::clock::SystemClock;
use cio_assist::config::{Args, MEMORY_STORAGE};
use cio_assist::gemini::GeminiClient;
use cio_assist::models::AnalysisJob;
use cio_assist::rate_limit::{Quota, RateLimiter};
use cio_assist::state::AppState;
use cio_assist::storage::{FileStore, KeyValueStore, MemoryStore};
use cio_assist::worker::analysis_worker;

// this is main async function with tokio
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cio_assist=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // parse cli arguments
    let args = Args::parse();

    let store: Arc<dyn KeyValueStore> = if args.storage == MEMORY_STORAGE {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(FileStore::open(&args.storage))
    };
    let quota = Quota::default();
    let rate_limiter = Arc::new(RateLimiter::new(store, Arc::new(SystemClock), quota));

    // spawn the background worker when Gemini is reachable
    let job_tx = match args.api_key() {
        Some(api_key) => {
            let (job_tx, job_rx) = mpsc::channel::<AnalysisJob>(args.queue_size);
            let gemini = GeminiClient::new(
                reqwest::Client::new(),
                &args.gemini_url,
                &args.model,
                api_key,
                Duration::from_secs(args.request_timeout),
            );
            let cache = Arc::new(DashMap::new());
            let ttl = Duration::from_secs(args.cache_ttl);
            tokio::spawn(analysis_worker(job_rx, gemini, cache, ttl));
            Some(job_tx)
        }
        None => {
            warn!("GEMINI_API_KEY is not set, analysis requests will be rejected");
            None
        }
    };

    let state = Arc::new(AppState {
        rate_limiter,
        job_tx,
    });

    let app = cio_assist::router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!("Gateway running on http://localhost:{}", args.port);
    info!("Forwarding to Gemini at {} (model {})", args.gemini_url, args.model);
    info!("Cache TTL: {} seconds", args.cache_ttl);
    info!(
        "Rate limit: {} requests per {} seconds, state in {}",
        quota.limit,
        quota.window_ms / 1000,
        args.storage
    );
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
