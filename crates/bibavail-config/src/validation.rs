//! Config validation.

use thiserror::Error;

use crate::RuntimeConfig;

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("alma.base_url must not be empty")]
    EmptyBaseUrl,

    #[error("resolve.batch_size must be at least 1")]
    ZeroBatchSize,

    #[error("resolve.max_attempts must be at least 1")]
    ZeroMaxAttempts,

    #[error("resolve.request_timeout_secs must be at least 1")]
    ZeroRequestTimeout,

    #[error("resolve.poll_interval_ms must be at least 1")]
    ZeroPollInterval,

    #[error("resolve.max_wait_secs ({max_wait}) must cover at least one request timeout ({timeout})")]
    DeadlineTooShort { max_wait: u64, timeout: u64 },
}

pub(crate) fn validate(config: &RuntimeConfig) -> Result<(), ConfigError> {
    if config.alma.base_url.trim().is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    if config.resolve.batch_size == 0 {
        return Err(ConfigError::ZeroBatchSize);
    }
    if config.resolve.max_attempts == 0 {
        return Err(ConfigError::ZeroMaxAttempts);
    }
    if config.resolve.request_timeout_secs == 0 {
        return Err(ConfigError::ZeroRequestTimeout);
    }
    if config.resolve.poll_interval_ms == 0 {
        return Err(ConfigError::ZeroPollInterval);
    }
    if config.resolve.max_wait_secs < config.resolve.request_timeout_secs {
        return Err(ConfigError::DeadlineTooShort {
            max_wait: config.resolve.max_wait_secs,
            timeout: config.resolve.request_timeout_secs,
        });
    }
    Ok(())
}
