//! Idea registry with capacity-gated applicant acceptance.

use chrono::Utc;

use super::IdGenerator;
use crate::errors::AppError;
use crate::models::{
    CreateIdeaRequest, Datastore, Idea, IdeaFilter, IdeaForm, IdeaStatus, Part, PartAvailability,
    PartOptions, TeamCounts, DEFAULT_PREFERRED_PART, SCHEMA_VERSION,
};
use crate::sanitize::sanitize_description;

/// Registry of every idea posted during the process lifetime.
///
/// Ideas keep insertion order. Mutation happens only through [`IdeaStore::create_idea`],
/// [`IdeaStore::remove_idea`] and [`IdeaStore::accept_applicant`]; each successful
/// mutation bumps the revision.
pub struct IdeaStore {
    ideas: Vec<Idea>,
    ids: Box<dyn IdGenerator>,
    revision: i64,
}

impl IdeaStore {
    pub fn new(ids: impl IdGenerator + 'static) -> Self {
        Self {
            ideas: Vec::new(),
            ids: Box::new(ids),
            revision: 0,
        }
    }

    /// Current revision, bumped on every successful mutation.
    pub fn revision(&self) -> i64 {
        self.revision
    }

    /// Create and register a new idea.
    ///
    /// Never fails: malformed counts were already normalized to zero and the
    /// remaining gaps are filled with safe defaults.
    pub fn create_idea(&mut self, request: CreateIdeaRequest) -> Idea {
        let team = request.team;
        let filled_team = request.filled_team.unwrap_or_default().clamped_to(&team);

        let total_members = request
            .total_members
            .filter(|total| *total > 0)
            .unwrap_or_else(|| default_total(&team));
        let current_members = request
            .current_members
            .unwrap_or_else(|| filled_team.total())
            .min(total_members);
        let status = request
            .status
            .unwrap_or_else(|| IdeaStatus::derive(current_members, total_members));

        let preferred_part = request
            .preferred_part
            .filter(|part| !part.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PREFERRED_PART.to_string());

        let idea = Idea {
            id: self.ids.next_id(),
            topic: request.topic,
            title: request.title,
            intro: request.intro,
            description: sanitize_description(&request.description),
            preferred_part,
            team,
            filled_team,
            current_members,
            total_members,
            status,
        };

        self.ideas.push(idea.clone());
        self.revision += 1;

        tracing::info!(
            idea_id = idea.id,
            total_members = idea.total_members,
            "Created idea {:?}",
            idea.title
        );

        idea
    }

    /// Register the finalized authoring form as a new idea.
    ///
    /// The seat total always follows the requested team; the form's own total is ignored.
    pub fn submit_form(&mut self, form: &IdeaForm) -> Idea {
        self.create_idea(CreateIdeaRequest {
            topic: form.topic.clone(),
            title: form.title.clone(),
            intro: form.intro.clone(),
            description: form.description.clone(),
            preferred_part: Some(form.preferred_part.clone()),
            team: form.team,
            filled_team: None,
            current_members: Some(form.current_members),
            total_members: Some(default_total(&form.team)),
            status: None,
        })
    }

    /// Look up an idea by id.
    pub fn get_idea(&self, id: i64) -> Option<&Idea> {
        self.ideas.iter().find(|idea| idea.id == id)
    }

    /// List ideas in insertion order.
    pub fn list_ideas(&self, filter: IdeaFilter) -> Vec<Idea> {
        self.ideas
            .iter()
            .filter(|idea| !(filter.exclude_closed && idea.is_closed()))
            .cloned()
            .collect()
    }

    /// Remove an idea. Returns whether anything was removed.
    pub fn remove_idea(&mut self, id: i64) -> bool {
        let before = self.ideas.len();
        self.ideas.retain(|idea| idea.id != id);
        let removed = self.ideas.len() != before;
        if removed {
            self.revision += 1;
            tracing::info!(idea_id = id, "Removed idea");
        }
        removed
    }

    /// Which parts of an idea are still accepting applicants.
    pub fn part_options(&self, id: i64) -> Result<PartOptions, AppError> {
        let idea = self.get_idea(id).ok_or_else(|| not_found(id))?;
        let idea_full = is_full(idea);

        let parts: Vec<PartAvailability> = Part::ALL
            .iter()
            .map(|&part| {
                let capacity = idea.team.get(part);
                let filled = idea.filled_team.get(part);
                PartAvailability {
                    part,
                    label: part.label(),
                    capacity,
                    filled,
                    open: !idea_full && capacity > 0 && filled < capacity,
                }
            })
            .collect();

        let default_part = Part::ALL
            .iter()
            .copied()
            .find(|&part| {
                let capacity = idea.team.get(part);
                capacity > 0 && idea.filled_team.get(part) < capacity
            })
            .unwrap_or(Part::Planning);

        Ok(PartOptions {
            idea_id: id,
            parts,
            default_part,
        })
    }

    /// Accept one applicant for `part`.
    ///
    /// Rejected when the idea is missing, when every seat is taken, or when the
    /// part has no seat left (a part with zero seats is not recruiting). A
    /// rejection leaves the idea untouched.
    pub fn accept_applicant(&mut self, id: i64, part: Part) -> Result<Idea, AppError> {
        let idea = self
            .ideas
            .iter_mut()
            .find(|idea| idea.id == id)
            .ok_or_else(|| not_found(id))?;

        if is_full(idea) {
            tracing::debug!(idea_id = id, %part, "Application rejected: idea closed");
            return Err(AppError::IdeaClosed { idea_id: id });
        }

        let limit = idea.team.get(part);
        let filled = idea.filled_team.get(part);
        if limit == 0 || filled >= limit {
            tracing::debug!(idea_id = id, %part, limit, filled, "Application rejected: part full");
            return Err(AppError::PartFull { idea_id: id, part });
        }

        let mut filled_team = idea.filled_team;
        filled_team.set(part, (filled + 1).min(limit));
        let current_members = filled_team
            .total()
            .min(idea.total_members)
            .max(idea.current_members);
        let status = IdeaStatus::derive(current_members, idea.total_members);

        *idea = Idea {
            filled_team,
            current_members,
            status,
            ..idea.clone()
        };
        let accepted = idea.clone();
        self.revision += 1;

        tracing::info!(
            idea_id = id,
            %part,
            current_members,
            total_members = accepted.total_members,
            "Accepted applicant ({})",
            status.label()
        );

        Ok(accepted)
    }

    /// Snapshot of the whole board.
    pub fn snapshot(&self) -> Datastore {
        Datastore {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now().to_rfc3339(),
            revision_id: self.revision,
            ideas: self.ideas.clone(),
        }
    }
}

/// Seats implied by a team: the sum of its parts, but never zero.
fn default_total(team: &TeamCounts) -> u32 {
    match team.total() {
        0 => 1,
        total => total,
    }
}

fn is_full(idea: &Idea) -> bool {
    idea.total_members > 0
        && (idea.filled_team.total() >= idea.total_members
            || idea.current_members >= idea.total_members)
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Idea {} not found", id))
}
