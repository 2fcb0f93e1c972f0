//! Data models for the team-building board.
//!
//! Field names serialize in camelCase to match the browser client's shapes.

mod datastore;
mod draft;
mod idea;
mod team;

pub use datastore::*;
pub use draft::*;
pub use idea::*;
pub use team::*;
