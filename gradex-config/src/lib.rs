//! Shared configuration library for Gradex.
//!
//! Centralizes `.env` discovery and environment-variable loading so the
//! server binary and integration tooling agree on variable names, defaults,
//! and validation rules.

pub mod loader;
pub mod models;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigWarning};
pub use models::{
    Config, ConfigMetadata, DatabaseConfig, GradingConfig, ServerConfig,
};
