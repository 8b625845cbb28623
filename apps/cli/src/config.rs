//! Configuration for the priorflow CLI

use priorflow_poll::{MAX_ATTEMPTS, MAX_INTERVAL_SECONDS, MIN_ATTEMPTS, MIN_INTERVAL_SECONDS};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the prior-authorization backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for one HTTP request, in seconds.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            http_timeout_seconds: default_http_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Seconds between poll attempts (1-10).
    #[serde(default = "default_poll_interval")]
    pub interval_seconds: u64,
    /// Attempt budget per session (1-30).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_poll_interval(),
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CacheConfig {
    /// Directory for the result slot. Defaults to `~/.priorflow`.
    #[serde(default)]
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Use JSON formatting for logs
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default values
fn default_base_url() -> String {
    priorflow_client::DEFAULT_BASE_URL.to_string()
}

fn default_http_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    2
}

fn default_max_attempts() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from defaults, an optional `config` file, and
    /// environment variables.
    ///
    /// Environment overrides use the `PRIORFLOW` prefix with `__` separators,
    /// e.g. `PRIORFLOW__SERVER__BASE_URL` → `config.server.base_url`.
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("server.base_url", default_base_url())?
            .set_default("server.http_timeout_seconds", default_http_timeout() as i64)?
            .set_default("polling.interval_seconds", default_poll_interval() as i64)?
            .set_default("polling.max_attempts", default_max_attempts() as i64)?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.json", false)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("PRIORFLOW")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Validate configuration before any session starts.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.base_url.trim().is_empty() {
            return Err("server.base_url must not be empty".to_string());
        }
        if self.server.http_timeout_seconds == 0 {
            return Err("server.http_timeout_seconds must be > 0".to_string());
        }
        if !(MIN_INTERVAL_SECONDS..=MAX_INTERVAL_SECONDS).contains(&self.polling.interval_seconds) {
            return Err(format!(
                "polling.interval_seconds must be between {MIN_INTERVAL_SECONDS} and {MAX_INTERVAL_SECONDS}"
            ));
        }
        if !(MIN_ATTEMPTS..=MAX_ATTEMPTS).contains(&self.polling.max_attempts) {
            return Err(format!(
                "polling.max_attempts must be between {MIN_ATTEMPTS} and {MAX_ATTEMPTS}"
            ));
        }
        Ok(())
    }
}
