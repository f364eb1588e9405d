//! Application configuration read from the environment
//!
//! `.env` is loaded by the binary before `AppConfig::from_env` runs.

use std::path::PathBuf;

use thiserror::Error;

/// Default listening port
pub const DEFAULT_PORT: u16 = 3000;

/// Default maximum number of records in one batch request
pub const DEFAULT_MAX_BATCH_SIZE: usize = 10_000;

/// Configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Runtime settings for the API server
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Port the server listens on
    pub port: u16,
    /// Deployment environment name, reported by the health endpoint
    pub environment: String,
    /// JSON scoring profile to activate at startup
    pub scoring_profile_path: Option<PathBuf>,
    /// Largest batch accepted by the batch and data quality endpoints
    pub max_batch_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            environment: "development".to_string(),
            scoring_profile_path: None,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                expected: "port number",
                value,
            })?,
            None => defaults.port,
        };

        let max_batch_size = match lookup("MAX_BATCH_SIZE") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "MAX_BATCH_SIZE",
                        expected: "positive integer",
                        value,
                    })
                }
            },
            None => defaults.max_batch_size,
        };

        let environment = lookup("APP_ENV")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.environment);

        let scoring_profile_path = lookup("SCORING_PROFILE_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            port,
            environment,
            scoring_profile_path,
            max_batch_size,
        })
    }
}
