//! Executor registry and load accounting ports.
//!
//! The registry owns the set of known executors and the exercise capability
//! mapping; load accounting tracks in-flight dispatches per executor. The
//! two concerns share a store in practice, so [`ExecutorStore`] bundles them
//! for injection into the dispatcher.

use async_trait::async_trait;

use gradex_model::{
    Executor, ExecutorId, ExecutorUpdate, ExerciseId, NewExecutor,
};

use crate::error::{CoreError, Result};

mod memory;
mod postgres;

pub use memory::MemoryExecutorStore;
pub use postgres::PostgresExecutorStore;

/// Management surface for the executor set and its capability mapping.
#[async_trait]
pub trait ExecutorRegistry: Send + Sync {
    /// Persist a new executor with `current_load = 0` and return its id.
    async fn register(&self, executor: NewExecutor) -> Result<ExecutorId>;

    /// Update an executor's declared name, base URL, and capacity.
    async fn update(
        &self,
        id: ExecutorId,
        update: ExecutorUpdate,
    ) -> Result<()>;

    /// Delete an executor. In-flight dispatches against it are not
    /// cancelled; their eventual decrement lands on the missing row as a
    /// no-op.
    async fn remove(&self, id: ExecutorId) -> Result<()>;

    async fn get(&self, id: ExecutorId) -> Result<Option<Executor>>;

    /// All executors, ordered by id ascending.
    async fn list_all(&self) -> Result<Vec<Executor>>;

    /// Executors associated with an exercise, ordered by id ascending.
    async fn list_capable(&self, exercise: ExerciseId) -> Result<Vec<Executor>>;

    /// Replace the capability set of an exercise. The set must be non-empty
    /// and every referenced executor must exist.
    async fn set_capabilities(
        &self,
        exercise: ExerciseId,
        executors: &[ExecutorId],
    ) -> Result<()>;
}

/// In-flight load counters, incremented when a dispatch reserves an
/// executor and decremented when the outbound call completes.
#[async_trait]
pub trait LoadAccounting: Send + Sync {
    /// Atomically add one to the executor's load. The mutation is a single
    /// update-in-place at the storage layer, never read-then-write here.
    async fn increment_load(&self, id: ExecutorId) -> Result<()>;

    /// Atomically subtract one from the executor's load, floored at zero.
    /// A missing executor id is a silent no-op: removal races with
    /// in-flight dispatches are expected.
    async fn decrement_load(&self, id: ExecutorId) -> Result<()>;
}

/// The combined store the dispatcher is wired against.
pub trait ExecutorStore: ExecutorRegistry + LoadAccounting {}

impl<T: ExecutorRegistry + LoadAccounting> ExecutorStore for T {}

pub(crate) fn validate_new(executor: &NewExecutor) -> Result<()> {
    if executor.max_load <= 0 {
        return Err(CoreError::InvalidMaxLoad(executor.max_load));
    }
    Ok(())
}

pub(crate) fn validate_update(update: &ExecutorUpdate) -> Result<()> {
    if update.max_load <= 0 {
        return Err(CoreError::InvalidMaxLoad(update.max_load));
    }
    Ok(())
}
