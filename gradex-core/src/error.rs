use gradex_model::{ExecutorId, ExerciseId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("no executor is configured for exercise {0}")]
    NoExecutorConfigured(ExerciseId),

    #[error("all executors capable of grading this exercise are at maximum load")]
    ServiceOverloaded,

    #[error("executor selection was given an empty candidate set")]
    NoExecutorAvailable,

    #[error("executor {executor} returned a bad response: {reason}")]
    BadExecutorResponse {
        executor: ExecutorId,
        reason: String,
    },

    #[error("executor {executor} unreachable: {source}")]
    ExecutorUnreachable {
        executor: ExecutorId,
        #[source]
        source: reqwest::Error,
    },

    #[error("executor {0} not found")]
    ExecutorNotFound(ExecutorId),

    #[error("max load must be positive, got {0}")]
    InvalidMaxLoad(i32),

    #[error("exercise {0} must keep at least one capable executor")]
    EmptyCapabilitySet(ExerciseId),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
