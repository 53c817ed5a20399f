use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// When unset the service runs against the in-memory store.
    pub database_url: Option<String>,
    /// JSON array of resumes loaded into the in-memory store at startup.
    pub seed_resumes_path: Option<PathBuf>,
    pub llm: LlmSettings,
    pub analysis: AnalysisSettings,
    pub port: u16,
    pub rust_log: String,
}

/// Connection settings for the text-generation gateway.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

/// Worker pool sizing and the fixed delays of the local heuristics.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub workers: usize,
    pub queue_capacity: usize,
    pub skill_gap_delay: Duration,
    pub heatmap_delay: Duration,
    /// Upper bound on a caller-requested poll window.
    pub poll_window_max: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            seed_resumes_path: std::env::var("SEED_RESUMES_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            llm: LlmSettings {
                api_key: require_env("LLM_API_KEY")?,
                base_url: std::env::var("LLM_BASE_URL")
                    .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
                model: std::env::var("LLM_MODEL")
                    .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string()),
                max_tokens: parse_env("LLM_MAX_TOKENS", 1024)?,
                timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 60)?),
            },
            analysis: AnalysisSettings {
                workers: parse_env::<usize>("ANALYSIS_WORKERS", 8)?.max(1),
                queue_capacity: parse_env::<usize>("ANALYSIS_QUEUE_CAPACITY", 64)?.max(1),
                skill_gap_delay: Duration::from_millis(parse_env("SKILL_GAP_DELAY_MS", 3000)?),
                heatmap_delay: Duration::from_millis(parse_env("HEATMAP_DELAY_MS", 2000)?),
                poll_window_max: Duration::from_millis(parse_env("POLL_WINDOW_MAX_MS", 30_000)?),
            },
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} must be a valid {}", std::any::type_name::<T>()))
}

#[cfg(test)]
impl Config {
    /// Config with instant heuristics and a small pool, for router and dispatcher tests.
    pub fn for_tests() -> Self {
        Config {
            database_url: None,
            seed_resumes_path: None,
            llm: LlmSettings {
                api_key: "test-key".to_string(),
                base_url: "http://127.0.0.1:9".to_string(),
                model: "test-model".to_string(),
                max_tokens: 256,
                timeout: Duration::from_secs(1),
            },
            analysis: AnalysisSettings {
                workers: 4,
                queue_capacity: 16,
                skill_gap_delay: Duration::ZERO,
                heatmap_delay: Duration::ZERO,
                poll_window_max: Duration::from_secs(5),
            },
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
