use clap::Parser;

// Storage value selecting the in-process store
pub const MEMORY_STORAGE: &str = "memory";

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "cio-assist")]
#[command(about = "Business analysis gateway in front of the Gemini API, with a daily submission quota")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Where the quota record is kept; "memory" keeps it in-process only
    #[arg(short, long, default_value = "rate-limit.json")]
    pub storage: String,

    // Cache TTL in seconds
    #[arg(short, long, default_value_t = 300)]
    pub cache_ttl: u64,

    // Gemini API base url
    #[arg(long, default_value = "https://generativelanguage.googleapis.com")]
    pub gemini_url: String,

    // Gemini model name
    #[arg(short, long, default_value = "gemini-pro")]
    pub model: String,

    // Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    // Upstream request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub request_timeout: u64,

    // Max queued analyses before handlers wait
    #[arg(long, default_value_t = 100)]
    pub queue_size: usize,
}

impl Args {
    // Blank keys count as missing
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
