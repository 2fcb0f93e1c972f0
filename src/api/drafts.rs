//! Draft API endpoints for the idea authoring surface.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{current_revision, error, success, ApiResult};
use crate::drafts::{EventOutcome, LifecycleEvent};
use crate::errors::AppError;
use crate::models::{DraftFormRequest, DraftPayload, DraftRecovery, Idea, IdeaForm};
use crate::AppState;

/// Autosave state after recording an edit.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveStatus {
    pub pending: bool,
    /// Quiet interval before the pending save is written
    pub delay_ms: u64,
}

/// Request body for submitting the form.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    /// Form to submit; the active form when absent
    #[serde(default)]
    pub form: Option<IdeaForm>,
}

/// GET /api/draft - The stored draft to offer for recovery, or null.
pub async fn get_draft(State(state): State<AppState>) -> ApiResult<Option<DraftRecovery>> {
    let recovery = state.drafts.recover().await;
    success(recovery, current_revision(&state).await)
}

/// PUT /api/draft - Save the form now and report storage failures.
pub async fn save_draft(
    State(state): State<AppState>,
    Json(request): Json<DraftFormRequest>,
) -> ApiResult<DraftPayload> {
    let revision_id = current_revision(&state).await;
    match state.drafts.save_now(request.form).await {
        Ok(payload) => success(payload, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/draft - Discard the stored draft and start blank.
pub async fn discard_draft(State(state): State<AppState>) -> ApiResult<()> {
    state.drafts.discard_recovery().await;
    success((), current_revision(&state).await)
}

/// POST /api/draft/accept - Load the stored draft into the active form.
pub async fn accept_draft(State(state): State<AppState>) -> ApiResult<IdeaForm> {
    let revision_id = current_revision(&state).await;
    match state.drafts.accept_recovery().await {
        Some(form) => success(form, revision_id),
        None => error(
            AppError::NotFound("No stored draft".to_string()),
            revision_id,
        ),
    }
}

/// POST /api/draft/changes - Record a form edit; it is autosaved once editing pauses.
pub async fn record_draft_change(
    State(state): State<AppState>,
    Json(request): Json<DraftFormRequest>,
) -> ApiResult<AutosaveStatus> {
    state.drafts.record_change(request.form).await;
    let status = AutosaveStatus {
        pending: state.drafts.is_pending().await,
        delay_ms: u64::try_from(state.config.autosave_delay.as_millis()).unwrap_or(u64::MAX),
    };
    success(status, current_revision(&state).await)
}

/// POST /api/draft/events - Page lifecycle signal (hide, navigation, offline).
pub async fn draft_event(
    State(state): State<AppState>,
    Json(event): Json<LifecycleEvent>,
) -> ApiResult<EventOutcome> {
    let outcome = state.drafts.handle_event(event).await;
    success(outcome, current_revision(&state).await)
}

/// POST /api/draft/submit - Post the form as an idea and drop its draft.
pub async fn submit_draft(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> ApiResult<Idea> {
    let form = state.drafts.take_for_submission(request.form).await;

    let (idea, revision_id) = {
        let mut store = state.ideas.write().await;
        let idea = store.submit_form(&form);
        (idea, store.revision())
    };

    state.drafts.finish_submission().await;
    success(idea, revision_id)
}
