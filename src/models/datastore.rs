//! Snapshot of the whole idea board.

use serde::Serialize;

use super::Idea;

/// Version of the snapshot shape.
pub const SCHEMA_VERSION: i32 = 1;

/// Every idea plus the revision it was taken at.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Datastore {
    pub schema_version: i32,
    pub generated_at: String,
    pub revision_id: i64,
    pub ideas: Vec<Idea>,
}
