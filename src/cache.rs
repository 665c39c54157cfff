use sha2::{Digest, Sha256};
use std::time::Instant;
use crate::models::{AnalysisParams, AnalysisResult};

// Cache entry with timestamp
#[derive(Clone)]
pub struct CacheEntry {
    pub result: AnalysisResult,
    pub created_at: Instant,
}

// Cache key: hash of the normalized params (model included, a model switch
// must not serve stale answers)
pub fn make_cache_key(model: &str, params: &AnalysisParams) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model);
    for field in [
        &params.region,
        &params.industry,
        &params.company_size,
        &params.department,
        &params.current_system,
        &params.pain_points,
    ] {
        // separator keeps ("ab","c") and ("a","bc") apart
        hasher.update([0u8]);
        hasher.update(field.trim().to_lowercase());
    }
    format!("{:x}", hasher.finalize())
}
