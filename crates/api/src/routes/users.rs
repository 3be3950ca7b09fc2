//! Read and admin endpoints over the record store.

use axum::{
    extract::{Path, State},
    Json,
};
use import_core::UserRecord;
use tracing::info;

use crate::response::{ApiError, ClearResponse, CountResponse};
use crate::state::AppState;

/// GET /api/users - All users, ordered by id.
pub async fn list_handler(State(state): State<AppState>) -> Json<Vec<UserRecord>> {
    Json(state.records.find_all())
}

/// GET /api/users/count
pub async fn count_handler(State(state): State<AppState>) -> Json<CountResponse> {
    Json(CountResponse {
        count: state.records.count(),
    })
}

/// GET /api/users/:id
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserRecord>, ApiError> {
    state
        .records
        .find_by_id(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("User not found: {}", id)))
}

/// DELETE /api/users - Administrative wipe.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let removed = state.records.clear();
    info!(removed = removed, "Cleared users via API");
    Json(ClearResponse { removed })
}
