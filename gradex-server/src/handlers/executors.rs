use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use gradex_core::ExecutorRegistry;
use gradex_model::{
    Executor, ExecutorId, ExecutorUpdate, ExerciseId, NewExecutor,
};

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

#[derive(Debug, Deserialize)]
pub struct RegisterExecutorRequest {
    pub name: String,
    pub base_url: String,
    pub max_load: i32,
}

#[derive(Debug, Serialize)]
pub struct RegisterExecutorResponse {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExecutorRequest {
    pub name: String,
    pub base_url: String,
    pub max_load: i32,
}

#[derive(Debug, Serialize)]
pub struct ExecutorDto {
    pub id: i64,
    pub name: String,
    pub base_url: String,
    pub max_load: i32,
    pub current_load: i32,
}

impl From<Executor> for ExecutorDto {
    fn from(executor: Executor) -> Self {
        Self {
            id: executor.id.as_i64(),
            name: executor.name,
            base_url: executor.base_url,
            max_load: executor.max_load,
            current_load: executor.current_load,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetExerciseExecutorsRequest {
    pub executors: Vec<i64>,
}

pub async fn register_executor_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterExecutorRequest>,
) -> AppResult<(StatusCode, Json<RegisterExecutorResponse>)> {
    validate_fields(&body.name, &body.base_url)?;

    let id = state
        .store
        .register(NewExecutor {
            name: body.name,
            base_url: body.base_url,
            max_load: body.max_load,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterExecutorResponse { id: id.as_i64() }),
    ))
}

pub async fn list_executors_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ExecutorDto>>> {
    let executors = state.store.list_all().await?;
    Ok(Json(executors.into_iter().map(ExecutorDto::from).collect()))
}

pub async fn update_executor_handler(
    State(state): State<AppState>,
    Path(executor_id): Path<i64>,
    Json(body): Json<UpdateExecutorRequest>,
) -> AppResult<StatusCode> {
    validate_fields(&body.name, &body.base_url)?;

    state
        .store
        .update(
            ExecutorId(executor_id),
            ExecutorUpdate {
                name: body.name,
                base_url: body.base_url,
                max_load: body.max_load,
            },
        )
        .await?;

    info!(executor = executor_id, "updated executor");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_executor_handler(
    State(state): State<AppState>,
    Path(executor_id): Path<i64>,
) -> AppResult<StatusCode> {
    state.store.remove(ExecutorId(executor_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the set of executors eligible to grade an exercise.
///
/// An automatically graded exercise must keep at least one capable
/// executor, so an empty set is rejected rather than applied.
pub async fn set_exercise_executors_handler(
    State(state): State<AppState>,
    Path(exercise_id): Path<i64>,
    Json(body): Json<SetExerciseExecutorsRequest>,
) -> AppResult<StatusCode> {
    let executors: Vec<ExecutorId> =
        body.executors.into_iter().map(ExecutorId).collect();

    state
        .store
        .set_capabilities(ExerciseId(exercise_id), &executors)
        .await?;

    info!(
        exercise = exercise_id,
        executors = executors.len(),
        "replaced exercise capability set"
    );
    Ok(StatusCode::NO_CONTENT)
}

fn validate_fields(name: &str, base_url: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::bad_request("name must not be blank"));
    }
    if base_url.trim().is_empty() {
        return Err(AppError::bad_request("base_url must not be blank"));
    }
    Ok(())
}
