//! Server configuration

use std::time::Duration;

pub const DEFAULT_JWT_SECRET: &str = "change-this-secret";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RATE_LIMIT_RPS: u32 = 10;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub jwt_secret: String,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub serpapi_key: Option<String>,
    /// Upper bound on a single completion or search call
    pub ai_timeout: Duration,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| "host=localhost user=postgres dbname=healthsync".into()),
            bind_address: var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:4000".into()),
            jwt_secret: var("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.into()),
            groq_api_key: var("GROQ_API_KEY"),
            groq_model: var("GROQ_MODEL").unwrap_or_else(|| DEFAULT_GROQ_MODEL.into()),
            serpapi_key: var("SERPAPI_KEY"),
            ai_timeout: Duration::from_secs(
                var("AI_TIMEOUT_SECS")
                    .and_then(|v| v.trim().parse().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(DEFAULT_AI_TIMEOUT_SECS),
            ),
            cors_origins: var("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| vec!["*".to_string()]),
            rate_limit_rps: var("RATE_LIMIT_RPS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|rps| *rps > 0)
                .unwrap_or(DEFAULT_RATE_LIMIT_RPS),
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}
