//! Core library for Gradex.
//!
//! Implements the autograding dispatch subsystem: the executor registry and
//! its load accounting, least-relative-load executor selection, the signed
//! outbound dispatch call, and verification of inbound signed assessment
//! requests. HTTP routing and persistence wiring live in `gradex-server`.

pub mod auth;
pub mod dispatch;
pub mod error;
pub mod registry;

pub use auth::{CryptoError, RequestCrypto, VerifyError};
pub use dispatch::{Dispatcher, select_executor};
pub use error::{CoreError, Result};
pub use registry::{
    ExecutorRegistry, ExecutorStore, LoadAccounting, MemoryExecutorStore,
    PostgresExecutorStore,
};
