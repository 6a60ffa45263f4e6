use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::models::{
    Config, ConfigMetadata, DatabaseConfig, GradingConfig, ServerConfig,
};

/// Environment variable names consumed by the loader.
pub const ENV_SERVER_HOST: &str = "SERVER_HOST";
pub const ENV_SERVER_PORT: &str = "SERVER_PORT";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_PSK: &str = "GRADEX_PSK";
pub const ENV_ALLOWED_SKEW_SECS: &str = "GRADEX_ALLOWED_SKEW_SECS";
pub const ENV_EXECUTOR_TIMEOUT_SECS: &str = "GRADEX_EXECUTOR_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {name} has invalid value {value:?}: {reason}")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// A non-fatal observation made while loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
}

/// Result of a successful load: the configuration plus any warnings the
/// caller should surface through its own logging.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: Vec<ConfigWarning>,
}

/// Loads configuration from a `.env` file (if present) and the process
/// environment.
#[derive(Debug, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load(self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = dotenvy::dotenv().is_ok();
        let mut warnings = Vec::new();

        let host = optional_var(ENV_SERVER_HOST)
            .unwrap_or_else(|| ServerConfig::default().host);
        let port = parse_var(ENV_SERVER_PORT)?
            .unwrap_or_else(|| ServerConfig::default().port);

        let psk =
            optional_var(ENV_PSK).ok_or(ConfigLoadError::MissingVar(ENV_PSK))?;

        let allowed_skew_secs = parse_var(ENV_ALLOWED_SKEW_SECS)?
            .unwrap_or(GradingConfig::DEFAULT_ALLOWED_SKEW_SECS);
        if allowed_skew_secs <= 0 {
            warnings.push(ConfigWarning {
                message: format!(
                    "{ENV_ALLOWED_SKEW_SECS} is {allowed_skew_secs}; every signed request will be rejected as too old"
                ),
            });
        }

        let executor_timeout_secs = parse_var(ENV_EXECUTOR_TIMEOUT_SECS)?
            .unwrap_or(GradingConfig::DEFAULT_EXECUTOR_TIMEOUT_SECS);

        let config = Config {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: optional_var(ENV_DATABASE_URL),
            },
            grading: GradingConfig {
                psk,
                allowed_skew_secs,
                executor_timeout_secs,
            },
            metadata: ConfigMetadata { env_file_loaded },
        };

        Ok(ConfigLoad { config, warnings })
    }
}

/// Reads a variable, treating unset and empty as absent.
fn optional_var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn parse_var<T>(name: &'static str) -> Result<Option<T>, ConfigLoadError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_var(name) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|err| {
            ConfigLoadError::InvalidVar {
                name,
                value: raw,
                reason: err.to_string(),
            }
        }),
    }
}
