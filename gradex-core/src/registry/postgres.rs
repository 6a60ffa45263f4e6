use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use gradex_model::{
    Executor, ExecutorId, ExecutorUpdate, ExerciseId, NewExecutor,
};

use crate::error::{CoreError, Result};
use crate::registry::{
    ExecutorRegistry, LoadAccounting, validate_new, validate_update,
};

/// PostgreSQL-backed executor store.
///
/// Load accounting is expressed as single atomic UPDATEs so the counters
/// stay correct under concurrent dispatches from any number of service
/// instances sharing the database. No method opens a transaction around
/// anything but plain row writes; the outbound executor call never runs
/// inside one.
#[derive(Clone, Debug)]
pub struct PostgresExecutorStore {
    pool: PgPool,
}

impl PostgresExecutorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with pool settings suited to short registry queries.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(16)
            .acquire_timeout(std::time::Duration::from_secs(10))
            .test_before_acquire(true)
            .connect(database_url)
            .await
            .map_err(storage)?;
        Ok(Self::new(pool))
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the executor tables if they do not exist yet.
    pub async fn bootstrap_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS executor (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                base_url TEXT NOT NULL,
                max_load INT NOT NULL CHECK (max_load > 0),
                current_load INT NOT NULL DEFAULT 0 CHECK (current_load >= 0)
            )
            "#,
        )
        .execute(self.pool())
        .await
        .map_err(storage)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS exercise_executor (
                exercise_id BIGINT NOT NULL,
                executor_id BIGINT NOT NULL
                    REFERENCES executor (id) ON DELETE CASCADE,
                PRIMARY KEY (exercise_id, executor_id)
            )
            "#,
        )
        .execute(self.pool())
        .await
        .map_err(storage)?;

        info!("executor schema ready");
        Ok(())
    }
}

fn storage(err: sqlx::Error) -> CoreError {
    CoreError::Storage(err.to_string())
}

#[async_trait]
impl ExecutorRegistry for PostgresExecutorStore {
    async fn register(&self, executor: NewExecutor) -> Result<ExecutorId> {
        validate_new(&executor)?;
        let row = sqlx::query(
            r#"
            INSERT INTO executor (name, base_url, max_load, current_load)
            VALUES ($1, $2, $3, 0)
            RETURNING id
            "#,
        )
        .bind(&executor.name)
        .bind(&executor.base_url)
        .bind(executor.max_load)
        .fetch_one(self.pool())
        .await
        .map_err(storage)?;

        let id = ExecutorId(row.get::<i64, _>("id"));
        info!(executor = %id, name = %executor.name, "registered executor");
        Ok(id)
    }

    async fn update(
        &self,
        id: ExecutorId,
        update: ExecutorUpdate,
    ) -> Result<()> {
        validate_update(&update)?;
        let result = sqlx::query(
            "UPDATE executor SET name = $2, base_url = $3, max_load = $4 WHERE id = $1",
        )
        .bind(id.as_i64())
        .bind(&update.name)
        .bind(&update.base_url)
        .bind(update.max_load)
        .execute(self.pool())
        .await
        .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ExecutorNotFound(id));
        }
        Ok(())
    }

    async fn remove(&self, id: ExecutorId) -> Result<()> {
        let result = sqlx::query("DELETE FROM executor WHERE id = $1")
            .bind(id.as_i64())
            .execute(self.pool())
            .await
            .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ExecutorNotFound(id));
        }
        info!(executor = %id, "removed executor");
        Ok(())
    }

    async fn get(&self, id: ExecutorId) -> Result<Option<Executor>> {
        sqlx::query_as::<_, Executor>(
            "SELECT id, name, base_url, max_load, current_load FROM executor WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool())
        .await
        .map_err(storage)
    }

    async fn list_all(&self) -> Result<Vec<Executor>> {
        sqlx::query_as::<_, Executor>(
            "SELECT id, name, base_url, max_load, current_load FROM executor ORDER BY id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(storage)
    }

    async fn list_capable(
        &self,
        exercise: ExerciseId,
    ) -> Result<Vec<Executor>> {
        sqlx::query_as::<_, Executor>(
            r#"
            SELECT e.id, e.name, e.base_url, e.max_load, e.current_load
            FROM executor e
            INNER JOIN exercise_executor ee ON ee.executor_id = e.id
            WHERE ee.exercise_id = $1
            ORDER BY e.id
            "#,
        )
        .bind(exercise.as_i64())
        .fetch_all(self.pool())
        .await
        .map_err(storage)
    }

    async fn set_capabilities(
        &self,
        exercise: ExerciseId,
        executors: &[ExecutorId],
    ) -> Result<()> {
        if executors.is_empty() {
            return Err(CoreError::EmptyCapabilitySet(exercise));
        }

        for id in executors {
            let exists =
                sqlx::query("SELECT 1 FROM executor WHERE id = $1")
                    .bind(id.as_i64())
                    .fetch_optional(self.pool())
                    .await
                    .map_err(storage)?
                    .is_some();
            if !exists {
                return Err(CoreError::ExecutorNotFound(*id));
            }
        }

        let mut tx = self.pool().begin().await.map_err(storage)?;
        sqlx::query("DELETE FROM exercise_executor WHERE exercise_id = $1")
            .bind(exercise.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        for id in executors {
            sqlx::query(
                "INSERT INTO exercise_executor (exercise_id, executor_id) VALUES ($1, $2)",
            )
            .bind(exercise.as_i64())
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        }
        tx.commit().await.map_err(storage)?;
        Ok(())
    }
}

#[async_trait]
impl LoadAccounting for PostgresExecutorStore {
    async fn increment_load(&self, id: ExecutorId) -> Result<()> {
        // Single atomic update-in-place; a missing row affects zero rows
        // and that is fine (the executor was removed mid-dispatch).
        sqlx::query(
            "UPDATE executor SET current_load = current_load + 1 WHERE id = $1",
        )
        .bind(id.as_i64())
        .execute(self.pool())
        .await
        .map_err(storage)?;
        Ok(())
    }

    async fn decrement_load(&self, id: ExecutorId) -> Result<()> {
        sqlx::query(
            "UPDATE executor SET current_load = GREATEST(current_load - 1, 0) WHERE id = $1",
        )
        .bind(id.as_i64())
        .execute(self.pool())
        .await
        .map_err(storage)?;
        Ok(())
    }
}
