use std::env;
use std::time::Duration;

use eyre::{Result, WrapErr};

/// Base URL of the mock API that acts as the external system of record.
pub const DEFAULT_EXTERNAL_API_BASE: &str =
    "https://509a1ddd-a23a-47b7-a201-24b9339c6911.mock.pstmn.io";

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_INTERVAL_SECONDS: u64 = 600;

/// Configuration for the external sync adapter and its periodic trigger.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the remote API, without a trailing slash
    pub base_url: String,

    /// Timeout applied to every remote request
    pub request_timeout: Duration,

    /// Time between periodic trigger ticks
    pub interval: Duration,

    /// Whether a tick runs a full pull or only logs
    pub sync_on_tick: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EXTERNAL_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECONDS),
            sync_on_tick: false,
        }
    }
}

impl SyncConfig {
    /// Loads the sync configuration from environment variables.
    ///
    /// - `EXTERNAL_API_BASE`: remote base URL (default: the mock API)
    /// - `EXTERNAL_API_TIMEOUT_SECONDS`: per-request timeout (default: 10)
    /// - `SYNC_INTERVAL_SECONDS`: periodic trigger interval (default: 600)
    /// - `SYNC_ON_TICK`: `true` to pull on every tick (default: false)
    ///
    /// # Errors
    ///
    /// Returns an error if `EXTERNAL_API_BASE` is not an absolute URL.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("EXTERNAL_API_BASE")
            .unwrap_or_else(|_| DEFAULT_EXTERNAL_API_BASE.to_string());
        reqwest::Url::parse(&base_url).wrap_err("Invalid EXTERNAL_API_BASE value")?;

        let request_timeout = Duration::from_secs(positive_seconds(
            "EXTERNAL_API_TIMEOUT_SECONDS",
            DEFAULT_TIMEOUT_SECONDS,
        ));
        let interval = Duration::from_secs(positive_seconds(
            "SYNC_INTERVAL_SECONDS",
            DEFAULT_INTERVAL_SECONDS,
        ));

        let sync_on_tick = env::var("SYNC_ON_TICK")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout,
            interval,
            sync_on_tick,
        })
    }
}

fn positive_seconds(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(default)
}
