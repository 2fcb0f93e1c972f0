//! Datastore API endpoints.

use axum::extract::State;

use super::{success, ApiResult};
use crate::models::Datastore;
use crate::AppState;

/// GET /api/datastore - Snapshot of the whole board.
pub async fn get_datastore(State(state): State<AppState>) -> ApiResult<Datastore> {
    let datastore = state.ideas.read().await.snapshot();
    let revision_id = datastore.revision_id;
    success(datastore, revision_id)
}
