use serde::{Deserialize, Serialize};

/// Top-level runtime configuration for the Gradex server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub grading: GradingConfig,
    #[serde(skip)]
    pub metadata: ConfigMetadata,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// PostgreSQL connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

/// Settings for the autograding dispatch subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingConfig {
    /// Pre-shared key for the HMAC request envelope.
    pub psk: String,
    /// Maximum accepted age of a signed request, in seconds.
    pub allowed_skew_secs: i64,
    /// Hard timeout for one outbound executor call, in seconds.
    pub executor_timeout_secs: u64,
}

impl GradingConfig {
    pub const DEFAULT_ALLOWED_SKEW_SECS: i64 = 30;
    pub const DEFAULT_EXECUTOR_TIMEOUT_SECS: u64 = 30;
}

/// Provenance recorded during loading, not part of the configuration
/// surface itself.
#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub env_file_loaded: bool,
}
