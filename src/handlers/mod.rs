mod analyze;
mod health;
mod metrics;
mod rate_limit;

pub use analyze::analyze_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use rate_limit::rate_limit_handler;
