//! Identity generation for new ideas.

use chrono::Utc;

/// Source of idea ids. Every returned id must be unique for the store's lifetime.
pub trait IdGenerator: Send + Sync {
    fn next_id(&mut self) -> i64;
}

/// Monotonic counter. Seeded from the wall clock in production so ids keep
/// their millisecond-timestamp shape across restarts.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: i64,
}

impl SequentialIds {
    pub fn starting_at(first: i64) -> Self {
        Self { next: first }
    }

    pub fn from_clock() -> Self {
        Self::starting_at(Utc::now().timestamp_millis())
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }
}
