// bibavail-config - Runtime configuration for the availability resolver
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from BIBAVAIL_CONFIG env var
// 3. Config file contents from BIBAVAIL_CONFIG_CONTENT env var
// 4. Default config file location (./bibavail.toml)
// 5. Built-in defaults (lowest priority)

use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

mod sources;
mod validation;

pub use validation::ConfigError;

/// Main runtime configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub alma: AlmaConfig,

    #[serde(default)]
    pub resolve: ResolveConfig,
}

/// ILS API endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlmaConfig {
    /// Alma API gateway, region-specific.
    pub base_url: String,
    /// API key. Usually left empty in the file and supplied via the
    /// ALMA_API_KEY environment variable.
    pub api_key: String,
}

impl Default for AlmaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-na.hosted.exlibrisgroup.com".to_string(),
            api_key: String::new(),
        }
    }
}

/// Resolution behavior configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Record ids per upstream request.
    pub batch_size: usize,
    /// Dispatch attempts per batch, timeouts included.
    pub max_attempts: u32,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
    /// Completion re-check interval.
    pub poll_interval_ms: u64,
    /// Overall deadline for one resolution run.
    pub max_wait_secs: u64,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            max_attempts: 3,
            request_timeout_secs: 5,
            poll_interval_ms: 1000,
            max_wait_secs: 60,
        }
    }
}

impl ResolveConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }
}

impl RuntimeConfig {
    /// Load configuration from all sources, apply env overrides, validate.
    pub fn load() -> Result<Self> {
        let mut config = sources::from_sources()?;
        sources::apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML string into a config (no env overrides, no validation).
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate(self)
    }
}
