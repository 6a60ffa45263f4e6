//! # Gradex Server
//!
//! HTTP surface of the Gradex autograding dispatch subsystem.
//!
//! ## Overview
//!
//! The server exposes two things:
//!
//! - **Signed assessment endpoint**: accepts HMAC-signed submissions for an
//!   exercise and forwards them to the least loaded capable executor.
//! - **Executor management**: registering, updating, and removing grading
//!   executors, and associating them with exercises.
//!
//! The dispatch semantics (selection, load accounting, the outbound call)
//! live in `gradex-core`; this crate wires them to axum and PostgreSQL.

pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
pub use infra::errors::{AppError, AppResult};
pub use routes::create_api_router;
