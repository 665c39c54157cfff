use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("cio_analysis_requests_total", "Total number of analysis requests").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter =
        register_counter!("cio_rate_limited_total", "Attempts rejected by the submission quota").unwrap();
    pub static ref UPSTREAM_FAILURES: Counter =
        register_counter!("cio_upstream_failures_total", "Failed or unparsable Gemini calls").unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("cio_cache_hits_total", "Total cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("cio_cache_misses_total", "Total cache misses").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "cio_analysis_latency_seconds",
        "Analysis latency in seconds"
    )
    .unwrap();
    pub static ref CACHE_SIZE: Gauge =
        register_gauge!("cio_cache_size", "Current number of analyses in cache").unwrap();
}
