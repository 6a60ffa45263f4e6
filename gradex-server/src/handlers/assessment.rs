use axum::{
    Json,
    extract::{Path, State},
};
use tracing::warn;

use gradex_contracts::{AssessRequest, AssessResponse};
use gradex_model::ExerciseId;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

/// Signed assessment endpoint.
///
/// Verifies the request envelope, then dispatches the submission to a
/// capable executor. The precise rejection reason is logged but never
/// returned; callers only ever see a generic 403.
pub async fn auto_assess_handler(
    State(state): State<AppState>,
    Path(exercise_id): Path<i64>,
    Json(body): Json<AssessRequest>,
) -> AppResult<Json<AssessResponse>> {
    let exercise = ExerciseId(exercise_id);

    if let Err(reason) = state.crypto.verify(
        exercise,
        &body.submission,
        body.timestamp,
        &body.signature,
    ) {
        warn!(%exercise, %reason, "rejected assessment request");
        return Err(AppError::forbidden("Forbidden"));
    }

    let assessment =
        state.dispatcher.assess(exercise, &body.submission).await?;

    Ok(Json(AssessResponse {
        grade: assessment.grade(),
        feedback: assessment.feedback().to_string(),
    }))
}
