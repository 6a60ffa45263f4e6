//! Core data model definitions shared across Gradex crates.
#![allow(missing_docs)]

pub mod assessment;
pub mod error;
pub mod executor;
pub mod ids;

// Intentionally curated re-exports for downstream consumers.
pub use assessment::Assessment;
pub use error::{ModelError, Result as ModelResult};
pub use executor::{Executor, ExecutorUpdate, NewExecutor};
pub use ids::{ExecutorId, ExerciseId};
