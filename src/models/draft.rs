//! Idea authoring form and its locally persisted draft snapshot.

use serde::{Deserialize, Serialize};

use super::{lenient_count, TeamCounts};

/// Topic preselected on a blank form.
pub const DEFAULT_TOPIC: &str = "전체";
/// Preferred part preselected on a blank form.
pub const DEFAULT_PREFERRED_PART: &str = "기획";

/// State of the idea authoring form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct IdeaForm {
    pub topic: String,
    pub title: String,
    pub intro: String,
    pub description: String,
    pub preferred_part: String,
    pub team: TeamCounts,
    #[serde(deserialize_with = "lenient_count")]
    pub current_members: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub total_members: u32,
}

impl Default for IdeaForm {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            title: String::new(),
            intro: String::new(),
            description: String::new(),
            preferred_part: DEFAULT_PREFERRED_PART.to_string(),
            team: TeamCounts::default(),
            current_members: 0,
            total_members: 0,
        }
    }
}

/// What gets written to draft storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DraftPayload {
    pub form: IdeaForm,
    /// RFC 3339 timestamp of the save
    pub saved_at: String,
}

/// A stored draft offered to the user on their next visit.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecovery {
    pub form: IdeaForm,
    pub saved_at: Option<String>,
    /// `YYYY.MM.DD HH:MM` in local time, empty when unknown
    pub saved_at_display: String,
}

/// Request body for saving or recording a form edit.
#[derive(Debug, Clone, Deserialize)]
pub struct DraftFormRequest {
    pub form: IdeaForm,
}
