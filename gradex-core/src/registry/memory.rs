use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use gradex_model::{
    Executor, ExecutorId, ExecutorUpdate, ExerciseId, NewExecutor,
};

use crate::error::{CoreError, Result};
use crate::registry::{
    ExecutorRegistry, LoadAccounting, validate_new, validate_update,
};

/// In-memory executor store.
///
/// Single-process twin of [`super::PostgresExecutorStore`], used by the test
/// suites and by single-node setups that do not share state between
/// instances. Every operation runs under one mutex, which gives the same
/// no-lost-updates guarantee the database store gets from atomic row
/// updates.
#[derive(Debug, Default)]
pub struct MemoryExecutorStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    executors: BTreeMap<ExecutorId, Executor>,
    capabilities: HashMap<ExerciseId, BTreeSet<ExecutorId>>,
}

impl MemoryExecutorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Lock poisoning only happens if a holder panicked; propagate.
        self.inner.lock().expect("executor store mutex poisoned")
    }
}

#[async_trait]
impl ExecutorRegistry for MemoryExecutorStore {
    async fn register(&self, executor: NewExecutor) -> Result<ExecutorId> {
        validate_new(&executor)?;
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = ExecutorId(inner.next_id);
        inner.executors.insert(
            id,
            Executor {
                id,
                name: executor.name,
                base_url: executor.base_url,
                max_load: executor.max_load,
                current_load: 0,
            },
        );
        Ok(id)
    }

    async fn update(
        &self,
        id: ExecutorId,
        update: ExecutorUpdate,
    ) -> Result<()> {
        validate_update(&update)?;
        let mut inner = self.lock();
        let executor = inner
            .executors
            .get_mut(&id)
            .ok_or(CoreError::ExecutorNotFound(id))?;
        executor.name = update.name;
        executor.base_url = update.base_url;
        executor.max_load = update.max_load;
        Ok(())
    }

    async fn remove(&self, id: ExecutorId) -> Result<()> {
        let mut inner = self.lock();
        if inner.executors.remove(&id).is_none() {
            return Err(CoreError::ExecutorNotFound(id));
        }
        for capable in inner.capabilities.values_mut() {
            capable.remove(&id);
        }
        Ok(())
    }

    async fn get(&self, id: ExecutorId) -> Result<Option<Executor>> {
        Ok(self.lock().executors.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Executor>> {
        // BTreeMap iteration is already id-ascending.
        Ok(self.lock().executors.values().cloned().collect())
    }

    async fn list_capable(
        &self,
        exercise: ExerciseId,
    ) -> Result<Vec<Executor>> {
        let inner = self.lock();
        let Some(capable) = inner.capabilities.get(&exercise) else {
            return Ok(Vec::new());
        };
        Ok(capable
            .iter()
            .filter_map(|id| inner.executors.get(id).cloned())
            .collect())
    }

    async fn set_capabilities(
        &self,
        exercise: ExerciseId,
        executors: &[ExecutorId],
    ) -> Result<()> {
        if executors.is_empty() {
            return Err(CoreError::EmptyCapabilitySet(exercise));
        }
        let mut inner = self.lock();
        for id in executors {
            if !inner.executors.contains_key(id) {
                return Err(CoreError::ExecutorNotFound(*id));
            }
        }
        inner
            .capabilities
            .insert(exercise, executors.iter().copied().collect());
        Ok(())
    }
}

#[async_trait]
impl LoadAccounting for MemoryExecutorStore {
    async fn increment_load(&self, id: ExecutorId) -> Result<()> {
        let mut inner = self.lock();
        if let Some(executor) = inner.executors.get_mut(&id) {
            executor.current_load += 1;
        }
        Ok(())
    }

    async fn decrement_load(&self, id: ExecutorId) -> Result<()> {
        let mut inner = self.lock();
        if let Some(executor) = inner.executors.get_mut(&id) {
            executor.current_load = (executor.current_load - 1).max(0);
        }
        Ok(())
    }
}
