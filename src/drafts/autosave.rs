//! Debounced autosave of the active authoring form.
//!
//! Every edit replaces the active form and (re)arms a single trailing timer; only
//! the last edit of a burst reaches storage. Exit signals flush the pending save
//! immediately, and losing connectivity drops the draft altogether.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{DraftStore, SaveMode};
use crate::errors::AppError;
use crate::models::{DraftPayload, DraftRecovery, IdeaForm};

/// Page visibility as reported by the client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Lifecycle signals from the editing surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LifecycleEvent {
    /// The page is being hidden or unloaded
    PageHide,
    VisibilityChanged { state: Visibility },
    /// Navigation away from the editing surface started
    NavigationStart,
    /// Connectivity was lost
    Offline,
}

/// What a lifecycle event did.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum EventOutcome {
    /// A pending save was written (or attempted, when `draft` is absent)
    Flushed { draft: Option<DraftPayload> },
    /// Nothing was pending
    Idle,
    /// The stored draft was dropped
    Cleared,
}

struct AutosaveState {
    active: IdeaForm,
    /// Bumped on every edit or cancel; a timer only fires for its own generation.
    generation: u64,
    /// A timer is armed for the current generation.
    pending: bool,
    /// The active form differs from what was last written successfully.
    dirty: bool,
}

struct Inner {
    drafts: DraftStore,
    delay: Duration,
    state: Mutex<AutosaveState>,
}

/// Owner of the active form and its pending autosave.
#[derive(Clone)]
pub struct Autosaver {
    inner: Arc<Inner>,
}

impl Autosaver {
    pub fn new(drafts: DraftStore, delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                drafts,
                delay,
                state: Mutex::new(AutosaveState {
                    active: IdeaForm::default(),
                    generation: 0,
                    pending: false,
                    dirty: false,
                }),
            }),
        }
    }

    /// The form currently being edited.
    pub async fn active_form(&self) -> IdeaForm {
        self.inner.state.lock().await.active.clone()
    }

    /// Whether an autosave is waiting for its quiet interval.
    pub async fn is_pending(&self) -> bool {
        self.inner.state.lock().await.pending
    }

    /// Record an edit and (re)schedule the autosave.
    pub async fn record_change(&self, form: IdeaForm) {
        let generation = {
            let mut state = self.inner.state.lock().await;
            state.active = form;
            state.generation += 1;
            state.pending = true;
            state.dirty = true;
            state.generation
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.delay).await;

            // The lock is held through the write so a later flush cannot be
            // overtaken by this (older) save.
            let mut state = inner.state.lock().await;
            if state.generation != generation || !state.pending {
                return;
            }
            state.pending = false;
            let form = state.active.clone();
            let saved = inner.drafts.save_draft(&form, SaveMode::Silent).await;
            state.dirty = !matches!(saved, Ok(Some(_)));
        });
    }

    /// Replace the active form without scheduling a save, cancelling any pending one.
    pub async fn reset(&self, form: IdeaForm) {
        let mut state = self.inner.state.lock().await;
        cancel_pending(&mut state);
        state.active = form;
        state.dirty = false;
    }

    /// Write the active form now if it has unsaved edits.
    ///
    /// Edits whose autosave failed are still unsaved and get written here.
    pub async fn flush(&self) -> EventOutcome {
        let mut state = self.inner.state.lock().await;
        if !state.dirty {
            return EventOutcome::Idle;
        }
        cancel_pending(&mut state);
        let form = state.active.clone();
        let draft = self
            .inner
            .drafts
            .save_draft(&form, SaveMode::Silent)
            .await
            .unwrap_or_default();
        state.dirty = draft.is_none();
        EventOutcome::Flushed { draft }
    }

    /// Manual save: make `form` active and write it, reporting failures.
    pub async fn save_now(&self, form: IdeaForm) -> Result<DraftPayload, AppError> {
        let mut state = self.inner.state.lock().await;
        cancel_pending(&mut state);
        state.active = form;
        state.dirty = true;
        let form = state.active.clone();
        let payload = self
            .inner
            .drafts
            .save_draft(&form, SaveMode::Notify)
            .await?
            .ok_or_else(|| AppError::Internal("Draft save returned no payload".to_string()))?;
        state.dirty = false;
        Ok(payload)
    }

    /// React to a lifecycle signal from the editing surface.
    pub async fn handle_event(&self, event: LifecycleEvent) -> EventOutcome {
        match event {
            LifecycleEvent::PageHide
            | LifecycleEvent::NavigationStart
            | LifecycleEvent::VisibilityChanged {
                state: Visibility::Hidden,
            } => self.flush().await,
            LifecycleEvent::VisibilityChanged {
                state: Visibility::Visible,
            } => EventOutcome::Idle,
            LifecycleEvent::Offline => {
                let mut state = self.inner.state.lock().await;
                cancel_pending(&mut state);
                state.dirty = false;
                if let Err(e) = self.inner.drafts.clear_draft().await {
                    tracing::error!("Failed to clear draft storage on offline: {}", e);
                }
                tracing::info!("Connectivity lost, draft dropped");
                EventOutcome::Cleared
            }
        }
    }

    /// The stored draft to offer for recovery, if any.
    pub async fn recover(&self) -> Option<DraftRecovery> {
        self.inner.drafts.load_draft().await
    }

    /// Load the stored draft into the active form.
    pub async fn accept_recovery(&self) -> Option<IdeaForm> {
        let recovery = self.recover().await?;
        self.reset(recovery.form.clone()).await;
        Some(recovery.form)
    }

    /// Drop the stored draft and start from a blank form.
    pub async fn discard_recovery(&self) {
        let mut state = self.inner.state.lock().await;
        cancel_pending(&mut state);
        if let Err(e) = self.inner.drafts.clear_draft().await {
            tracing::warn!("Failed to discard draft: {}", e);
        }
        state.active = IdeaForm::default();
        state.dirty = false;
    }

    /// Stop autosaving and hand out the form to submit.
    ///
    /// `form` replaces the active form when given.
    pub async fn take_for_submission(&self, form: Option<IdeaForm>) -> IdeaForm {
        let mut state = self.inner.state.lock().await;
        cancel_pending(&mut state);
        if let Some(form) = form {
            state.active = form;
        }
        state.active.clone()
    }

    /// Drop the draft of a submitted form and start over blank.
    pub async fn finish_submission(&self) {
        let mut state = self.inner.state.lock().await;
        cancel_pending(&mut state);
        if let Err(e) = self.inner.drafts.clear_draft().await {
            tracing::warn!("Failed to clear submitted draft: {}", e);
        }
        state.active = IdeaForm::default();
        state.dirty = false;
    }
}

fn cancel_pending(state: &mut AutosaveState) {
    state.generation += 1;
    state.pending = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{KeyValueStore, MemoryStore};

    const DELAY: Duration = Duration::from_millis(1000);

    fn autosaver(memory: &MemoryStore) -> Autosaver {
        Autosaver::new(
            DraftStore::new(KeyValueStore::Memory(memory.clone()), "ideaDraft"),
            DELAY,
        )
    }

    fn titled(title: &str) -> IdeaForm {
        IdeaForm {
            title: title.to_string(),
            ..Default::default()
        }
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_into_one_save() {
        let memory = MemoryStore::new();
        let saver = autosaver(&memory);

        for i in 0..5 {
            saver.record_change(titled(&format!("draft {}", i))).await;
            advance(200).await;
        }
        assert_eq!(memory.write_count(), 0);
        assert!(saver.is_pending().await);

        advance(1500).await;
        assert_eq!(memory.write_count(), 1);
        assert!(!saver.is_pending().await);

        let recovered = saver.recover().await.unwrap();
        assert_eq!(recovered.form.title, "draft 4");

        advance(5000).await;
        assert_eq!(memory.write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_signals_flush_immediately() {
        for event in [
            LifecycleEvent::PageHide,
            LifecycleEvent::NavigationStart,
            LifecycleEvent::VisibilityChanged {
                state: Visibility::Hidden,
            },
        ] {
            let memory = MemoryStore::new();
            let saver = autosaver(&memory);

            saver.record_change(titled("unsaved")).await;
            let outcome = saver.handle_event(event).await;
            assert!(matches!(outcome, EventOutcome::Flushed { draft: Some(_) }));
            assert_eq!(memory.write_count(), 1);

            advance(2000).await;
            assert_eq!(memory.write_count(), 1);
            assert_eq!(saver.recover().await.unwrap().form.title, "unsaved");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_without_changes_is_idle() {
        let memory = MemoryStore::new();
        let saver = autosaver(&memory);

        assert_eq!(saver.flush().await, EventOutcome::Idle);
        let visible = LifecycleEvent::VisibilityChanged {
            state: Visibility::Visible,
        };
        saver.record_change(titled("x")).await;
        assert_eq!(saver.handle_event(visible).await, EventOutcome::Idle);
        assert!(saver.is_pending().await);
        assert_eq!(memory.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_offline_drops_draft_and_pending_save() {
        let memory = MemoryStore::new();
        let saver = autosaver(&memory);

        saver.save_now(titled("saved")).await.unwrap();
        saver.record_change(titled("pending")).await;

        let outcome = saver.handle_event(LifecycleEvent::Offline).await;
        assert_eq!(outcome, EventOutcome::Cleared);
        assert!(saver.recover().await.is_none());

        advance(2000).await;
        assert!(saver.recover().await.is_none());
        assert_eq!(memory.write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_storage_failure_does_not_block_editing() {
        let memory = MemoryStore::with_quota(8);
        let saver = autosaver(&memory);

        saver.record_change(titled("too big to store")).await;
        advance(1500).await;
        assert_eq!(memory.write_count(), 0);
        assert_eq!(saver.active_form().await.title, "too big to store");

        let err = saver.save_now(titled("still too big")).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(saver.active_form().await.title, "still too big");
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_flush_retries_failed_autosave() {
        let memory = MemoryStore::with_quota(600);
        let storage = KeyValueStore::Memory(memory.clone());
        storage.set("otherApp", &"x".repeat(500)).await.unwrap();
        let saver = autosaver(&memory);

        saver.record_change(titled("important edit")).await;
        advance(1500).await;
        assert_eq!(memory.write_count(), 1);
        assert!(!saver.is_pending().await);
        assert!(saver.recover().await.is_none());

        storage.remove("otherApp").await.unwrap();
        let outcome = saver.handle_event(LifecycleEvent::PageHide).await;
        assert!(matches!(outcome, EventOutcome::Flushed { draft: Some(_) }));
        assert_eq!(saver.recover().await.unwrap().form.title, "important edit");

        assert_eq!(saver.flush().await, EventOutcome::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_flush_retries_failed_manual_save() {
        let memory = MemoryStore::with_quota(600);
        let storage = KeyValueStore::Memory(memory.clone());
        storage.set("otherApp", &"x".repeat(500)).await.unwrap();
        let saver = autosaver(&memory);

        assert!(saver.save_now(titled("manual")).await.is_err());

        storage.remove("otherApp").await.unwrap();
        let outcome = saver.handle_event(LifecycleEvent::NavigationStart).await;
        assert!(matches!(outcome, EventOutcome::Flushed { draft: Some(_) }));
        assert_eq!(saver.recover().await.unwrap().form.title, "manual");
    }

    #[tokio::test(start_paused = true)]
    async fn test_discard_cancels_pending_autosave() {
        let memory = MemoryStore::new();
        let saver = autosaver(&memory);
        saver.save_now(titled("old")).await.unwrap();

        saver.record_change(titled("edited")).await;
        saver.discard_recovery().await;
        advance(2000).await;

        assert!(saver.recover().await.is_none());
        assert_eq!(memory.write_count(), 1);
        assert_eq!(saver.flush().await, EventOutcome::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_accept_and_discard() {
        let memory = MemoryStore::new();
        let saver = autosaver(&memory);
        saver.save_now(titled("yesterday")).await.unwrap();

        let restarted = autosaver(&memory);
        assert_eq!(restarted.active_form().await, IdeaForm::default());
        let form = restarted.accept_recovery().await.unwrap();
        assert_eq!(form.title, "yesterday");
        assert_eq!(restarted.active_form().await.title, "yesterday");
        assert!(!restarted.is_pending().await);

        restarted.discard_recovery().await;
        assert!(restarted.recover().await.is_none());
        assert_eq!(restarted.active_form().await, IdeaForm::default());
        assert!(restarted.accept_recovery().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_cancels_autosave_and_clears() {
        let memory = MemoryStore::new();
        let saver = autosaver(&memory);

        saver.record_change(titled("almost done")).await;
        let form = saver.take_for_submission(None).await;
        assert_eq!(form.title, "almost done");
        saver.finish_submission().await;

        advance(2000).await;
        assert_eq!(memory.write_count(), 0);
        assert!(saver.recover().await.is_none());
        assert_eq!(saver.active_form().await, IdeaForm::default());
        assert_eq!(saver.flush().await, EventOutcome::Idle);
    }
}
