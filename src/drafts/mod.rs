//! Draft persistence for the idea authoring form.
//!
//! A single snapshot lives under one well-known key. Persistence is advisory:
//! failures are logged and reported, never allowed to block the form.

mod autosave;

pub use autosave::*;

use chrono::{DateTime, Local, Utc};
use serde_json::Value;

use crate::db::KeyValueStore;
use crate::errors::AppError;
use crate::models::{count_from_value, DraftPayload, DraftRecovery, IdeaForm, Part, TeamCounts};
use crate::sanitize::sanitize_description;

/// How a save failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Log the failure and carry on (autosave, flush)
    Silent,
    /// Return the failure so the user sees it (manual save)
    Notify,
}

/// Reads and writes the draft snapshot.
pub struct DraftStore {
    storage: KeyValueStore,
    key: String,
}

impl DraftStore {
    pub fn new(storage: KeyValueStore, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Overwrite the stored draft with `form`, stamped with the current time.
    ///
    /// Returns the written payload, or `Ok(None)` when a silent save failed.
    pub async fn save_draft(
        &self,
        form: &IdeaForm,
        mode: SaveMode,
    ) -> Result<Option<DraftPayload>, AppError> {
        let payload = DraftPayload {
            form: IdeaForm {
                description: sanitize_description(&form.description),
                ..form.clone()
            },
            saved_at: Utc::now().to_rfc3339(),
        };

        let result = match serde_json::to_string(&payload) {
            Ok(json) => self.storage.set(&self.key, &json).await,
            Err(e) => Err(AppError::from(e)),
        };

        match result {
            Ok(()) => {
                tracing::debug!(saved_at = %payload.saved_at, "Draft saved");
                Ok(Some(payload))
            }
            Err(e) if mode == SaveMode::Silent => {
                tracing::warn!("Draft not saved: {}", e);
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Draft save failed: {}", e);
                Err(e)
            }
        }
    }

    /// Read the stored draft, if there is a usable one.
    ///
    /// Missing or unparseable snapshots are treated as "no draft".
    pub async fn load_draft(&self) -> Option<DraftRecovery> {
        let raw = match self.storage.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read draft from storage: {}", e);
                return None;
            }
        };

        let stored: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring unreadable draft: {}", e);
                return None;
            }
        };

        let form = stored.get("form").filter(|form| form.is_object())?;
        let saved_at = stored
            .get("savedAt")
            .and_then(Value::as_str)
            .map(str::to_string);
        let saved_at_display = saved_at.as_deref().map(format_saved_at).unwrap_or_default();

        Some(DraftRecovery {
            form: reshape_form(form),
            saved_at,
            saved_at_display,
        })
    }

    /// Delete the stored draft.
    pub async fn clear_draft(&self) -> Result<(), AppError> {
        self.storage.remove(&self.key).await?;
        tracing::debug!("Draft cleared");
        Ok(())
    }
}

/// Rebuild a form from a stored snapshot against the blank form.
///
/// Missing fields take the blank form's value and counts are parsed permissively.
/// The legacy single `team.frontend` count maps onto `frontendWeb`, and the
/// description is sanitized again since older snapshots were stored raw.
pub fn reshape_form(raw: &Value) -> IdeaForm {
    let base = IdeaForm::default();
    let text = |field: &str, fallback: String| {
        raw.get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(fallback)
    };
    let count = |field: &str| raw.get(field).map(count_from_value).unwrap_or(0);

    let mut team = TeamCounts::default();
    if let Some(stored_team) = raw.get("team").filter(|team| team.is_object()) {
        for part in Part::ALL {
            if let Some(value) = stored_team.get(part.as_str()) {
                team.set(part, count_from_value(value));
            }
        }
        if stored_team.get(Part::FrontendWeb.as_str()).is_none() {
            if let Some(legacy) = stored_team.get("frontend").filter(|v| v.is_number()) {
                team.frontend_web = count_from_value(legacy);
            }
        }
    }

    IdeaForm {
        topic: text("topic", base.topic),
        title: text("title", base.title),
        intro: text("intro", base.intro),
        description: sanitize_description(&text("description", base.description)),
        preferred_part: text("preferredPart", base.preferred_part),
        team,
        current_members: count("currentMembers"),
        total_members: count("totalMembers"),
    }
}

/// Format a stored timestamp as `YYYY.MM.DD HH:MM` in local time.
pub fn format_saved_at(saved_at: &str) -> String {
    DateTime::parse_from_rfc3339(saved_at)
        .map(|at| at.with_timezone(&Local).format("%Y.%m.%d %H:%M").to_string())
        .unwrap_or_default()
}
