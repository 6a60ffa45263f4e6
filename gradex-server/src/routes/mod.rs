use axum::Router;
use tower_http::trace::TraceLayer;

use crate::infra::app_state::AppState;

mod v1;

/// Build the full API router with tracing applied.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .nest("/v1", v1::create_v1_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
