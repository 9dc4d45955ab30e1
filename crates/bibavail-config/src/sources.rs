//! Config source resolution and environment overrides.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::RuntimeConfig;

const CONFIG_PATH_VAR: &str = "BIBAVAIL_CONFIG";
const CONFIG_CONTENT_VAR: &str = "BIBAVAIL_CONFIG_CONTENT";
const DEFAULT_CONFIG_PATH: &str = "bibavail.toml";

/// Resolve the config in priority order: explicit path, inline content,
/// the default file location, then built-in defaults.
pub(crate) fn from_sources() -> Result<RuntimeConfig> {
    if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
        debug!("loading config from {CONFIG_PATH_VAR}={path}");
        return from_file(Path::new(&path));
    }

    if let Ok(content) = std::env::var(CONFIG_CONTENT_VAR) {
        debug!("loading config from {CONFIG_CONTENT_VAR}");
        return RuntimeConfig::from_toml(&content)
            .context("failed to parse config from BIBAVAIL_CONFIG_CONTENT");
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        debug!("loading config from ./{DEFAULT_CONFIG_PATH}");
        return from_file(default_path);
    }

    debug!("no config file found, using built-in defaults");
    Ok(RuntimeConfig::default())
}

fn from_file(path: &Path) -> Result<RuntimeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    RuntimeConfig::from_toml(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

/// Apply environment variable overrides on top of the loaded config.
pub(crate) fn apply_env_overrides(config: &mut RuntimeConfig) {
    if let Ok(key) = std::env::var("ALMA_API_KEY") {
        if !key.is_empty() {
            config.alma.api_key = key;
        }
    }
    if let Ok(url) = std::env::var("BIBAVAIL_BASE_URL") {
        if !url.is_empty() {
            config.alma.base_url = url;
        }
    }

    override_parsed("BIBAVAIL_BATCH_SIZE", &mut config.resolve.batch_size);
    override_parsed("BIBAVAIL_MAX_ATTEMPTS", &mut config.resolve.max_attempts);
    override_parsed(
        "BIBAVAIL_REQUEST_TIMEOUT_SECS",
        &mut config.resolve.request_timeout_secs,
    );
    override_parsed(
        "BIBAVAIL_POLL_INTERVAL_MS",
        &mut config.resolve.poll_interval_ms,
    );
    override_parsed("BIBAVAIL_MAX_WAIT_SECS", &mut config.resolve.max_wait_secs);
}

fn override_parsed<T: std::str::FromStr>(key: &str, slot: &mut T) {
    if let Ok(raw) = std::env::var(key) {
        match raw.parse() {
            Ok(value) => *slot = value,
            Err(_) => warn!("ignoring unparseable {key}={raw:?}"),
        }
    }
}
