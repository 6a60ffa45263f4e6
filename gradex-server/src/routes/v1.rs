use axum::{
    Router,
    routing::{post, put},
};

use crate::{
    handlers::{assessment, executors},
    infra::app_state::AppState,
};

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        // Executor-facing signed assessment endpoint
        .route(
            "/exercises/{exercise_id}/automatic-assessment",
            post(assessment::auto_assess_handler),
        )
        // Executor management surface
        .route(
            "/executors",
            post(executors::register_executor_handler)
                .get(executors::list_executors_handler),
        )
        .route(
            "/executors/{executor_id}",
            put(executors::update_executor_handler)
                .delete(executors::delete_executor_handler),
        )
        // Exercise capability mapping
        .route(
            "/exercises/{exercise_id}/executors",
            put(executors::set_exercise_executors_handler),
        )
}
