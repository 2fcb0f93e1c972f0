//! Idea API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{current_revision, error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{ApplyRequest, CreateIdeaRequest, Idea, IdeaFilter, PartOptions};
use crate::AppState;

/// GET /api/ideas - List ideas in posting order.
pub async fn list_ideas(
    State(state): State<AppState>,
    Query(filter): Query<IdeaFilter>,
) -> ApiResult<Vec<Idea>> {
    let store = state.ideas.read().await;
    success(store.list_ideas(filter), store.revision())
}

/// GET /api/ideas/:id - Get a single idea.
pub async fn get_idea(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Idea> {
    let store = state.ideas.read().await;
    let revision_id = store.revision();

    match store.get_idea(id) {
        Some(idea) => success(idea.clone(), revision_id),
        None => error(
            AppError::NotFound(format!("Idea {} not found", id)),
            revision_id,
        ),
    }
}

/// POST /api/ideas - Post a new idea.
pub async fn create_idea(
    State(state): State<AppState>,
    Json(request): Json<CreateIdeaRequest>,
) -> ApiResult<Idea> {
    let mut store = state.ideas.write().await;
    let idea = store.create_idea(request);
    success(idea, store.revision())
}

/// DELETE /api/ideas/:id - Remove an idea. Removing an unknown id is a no-op.
pub async fn delete_idea(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    let mut store = state.ideas.write().await;
    if !store.remove_idea(id) {
        tracing::debug!(idea_id = id, "Nothing to remove");
    }
    success((), store.revision())
}

/// GET /api/ideas/:id/parts - Which parts still accept applicants.
pub async fn get_part_options(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<PartOptions> {
    let store = state.ideas.read().await;
    match store.part_options(id) {
        Ok(options) => success(options, store.revision()),
        Err(e) => error(e, store.revision()),
    }
}

/// POST /api/ideas/:id/applications - Apply to one part of an idea.
pub async fn apply_to_idea(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ApplyRequest>,
) -> ApiResult<Idea> {
    let result = state.ideas.write().await.accept_applicant(id, request.part);

    match result {
        Ok(idea) => success(idea, current_revision(&state).await),
        Err(e) => {
            if e.is_capacity_exceeded() {
                tracing::info!(idea_id = id, part = %request.part, "Application rejected: {}", e);
            }
            error(e, current_revision(&state).await)
        }
    }
}
