//! Inventory screen controller.
//!
//! Owns the [`ScreenState`] and runs remote calls between state transitions.
//! The state lock is held for one transition at a time and never across a
//! remote call, so actions can be dispatched while another is still pending.
//! Nothing serializes overlapping submits; whichever write to `items`
//! completes last wins.

use std::sync::Arc;

use tokio::sync::Mutex;

use stockpos_core::ExpectedRevision;
use stockpos_infra::{ConcurrencyMode, InventoryStore, StoreError};
use stockpos_inventory::InventoryRecord;

use crate::form::FormField;
use crate::state::{DeletePrompt, ScreenFailure, ScreenState, SubmitPlan, ValidationPrompt};
use crate::view::ScreenView;

/// Result of a submit action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Rejected locally; nothing was sent to the store.
    Rejected(ValidationPrompt),
    /// Written and the list reloaded.
    Saved,
    /// The store rejected the write; the message is on the screen.
    Failed(ScreenFailure),
}

pub struct InventoryScreen<S> {
    store: S,
    state: Arc<Mutex<ScreenState>>,
    concurrency: ConcurrencyMode,
}

impl<S: Clone> Clone for InventoryScreen<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            state: self.state.clone(),
            concurrency: self.concurrency,
        }
    }
}

impl<S: InventoryStore> InventoryScreen<S> {
    pub fn new(store: S) -> Self {
        Self::with_concurrency(store, ConcurrencyMode::default())
    }

    pub fn with_concurrency(store: S, concurrency: ConcurrencyMode) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(ScreenState::new())),
            concurrency,
        }
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> ScreenState {
        self.state.lock().await.clone()
    }

    pub async fn view(&self) -> ScreenView {
        ScreenView::render(&*self.state.lock().await)
    }

    /// Initial fetch when the screen is shown.
    pub async fn mount(&self) {
        self.load().await;
    }

    pub async fn load(&self) {
        self.state.lock().await.begin_load();

        let result = self.store.list().await;
        if let Err(err) = &result {
            tracing::error!(error = %err, "could not load inventory");
        }

        self.state.lock().await.finish_load(result);
    }

    pub async fn set_field(&self, field: FormField, text: &str) {
        self.state.lock().await.set_field(field, text);
    }

    pub async fn begin_edit(&self, record: &InventoryRecord) {
        self.state.lock().await.begin_edit(record);
    }

    pub async fn reset(&self) {
        self.state.lock().await.reset();
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let plan = match self.state.lock().await.prepare_submit(self.concurrency) {
            Ok(plan) => plan,
            Err(prompt) => return SubmitOutcome::Rejected(prompt),
        };

        let result = match &plan {
            SubmitPlan::Create(draft) => self.store.create(draft).await,
            SubmitPlan::Update {
                id,
                expected,
                draft,
            } => match expected {
                ExpectedRevision::Any => self.store.update(id, draft).await,
                ExpectedRevision::UpdatedAt(_) => {
                    self.store.update_if_unchanged(id, *expected, draft).await
                }
            },
        };

        let result = result.map_err(|err| {
            tracing::error!(error = %err, "could not save inventory item");
            save_failure(&err)
        });

        self.state.lock().await.finish_submit(result);
        let outcome = match result {
            Ok(()) => {
                self.load().await;
                SubmitOutcome::Saved
            }
            Err(failure) => SubmitOutcome::Failed(failure),
        };

        self.state.lock().await.end_submit();
        outcome
    }

    /// First half of a delete: the confirmation to show the user.
    pub async fn request_delete(&self, record: &InventoryRecord) -> DeletePrompt {
        self.state.lock().await.delete_prompt(record)
    }

    /// Second half of a delete, once the user accepted `prompt`.
    ///
    /// Returns `true` when the record was deleted and the list reloaded.
    pub async fn confirm_delete(&self, prompt: DeletePrompt) -> bool {
        let result = self.store.delete(&prompt.id).await.map_err(|err| {
            tracing::error!(error = %err, id = %prompt.id, "could not delete inventory item");
            ScreenFailure::Delete
        });

        let deleted = self.state.lock().await.finish_delete(result);
        if deleted {
            self.load().await;
        }
        deleted
    }
}

fn save_failure(err: &StoreError) -> ScreenFailure {
    if err.is_conflict() {
        ScreenFailure::Conflict
    } else {
        ScreenFailure::Save
    }
}
