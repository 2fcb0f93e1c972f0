//! In-memory idea board.
//!
//! The store is the only owner of idea records and the only place team counts change.

mod ideas;
mod ids;

pub use ideas::*;
pub use ids::*;
