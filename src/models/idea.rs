//! Idea model: a team-recruitment posting with fill progress.

use serde::{Deserialize, Serialize};

use super::{lenient_count_opt, Part, TeamCounts};

/// Recruitment status, always derivable from the member counts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum IdeaStatus {
    Open,
    Closed,
}

impl IdeaStatus {
    /// Closed once every seat is taken; an idea without seats stays open.
    pub fn derive(current_members: u32, total_members: u32) -> Self {
        if total_members > 0 && current_members >= total_members {
            IdeaStatus::Closed
        } else {
            IdeaStatus::Open
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IdeaStatus::Open => "모집 중",
            IdeaStatus::Closed => "모집 마감",
        }
    }
}

/// A posted idea.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: i64,
    pub topic: String,
    pub title: String,
    pub intro: String,
    /// Sanitized rich-text HTML
    pub description: String,
    pub preferred_part: String,
    /// Seats offered per part
    pub team: TeamCounts,
    /// Accepted applicants per part, never above `team`
    pub filled_team: TeamCounts,
    pub current_members: u32,
    pub total_members: u32,
    pub status: IdeaStatus,
}

impl Idea {
    pub fn is_closed(&self) -> bool {
        self.status == IdeaStatus::Closed
    }
}

/// Request body for creating a new idea.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIdeaRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub preferred_part: Option<String>,
    #[serde(default)]
    pub team: TeamCounts,
    #[serde(default)]
    pub filled_team: Option<TeamCounts>,
    #[serde(default, deserialize_with = "lenient_count_opt")]
    pub current_members: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count_opt")]
    pub total_members: Option<u32>,
    #[serde(default)]
    pub status: Option<IdeaStatus>,
}

/// Query parameters for listing ideas.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaFilter {
    /// Hide ideas whose recruitment is closed
    #[serde(default)]
    pub exclude_closed: bool,
}

/// Request body for applying to an idea.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ApplyRequest {
    pub part: Part,
}

/// Seat availability of one part.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PartAvailability {
    pub part: Part,
    pub label: &'static str,
    pub capacity: u32,
    pub filled: u32,
    /// Whether an application to this part can currently succeed
    pub open: bool,
}

/// Application options for an idea, in display order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PartOptions {
    pub idea_id: i64,
    pub parts: Vec<PartAvailability>,
    /// Part preselected on the application form
    pub default_part: Part,
}
