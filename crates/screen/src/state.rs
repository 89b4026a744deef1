//! Screen state and its transitions.
//!
//! Every user or lifecycle event is a method on [`ScreenState`] that takes the
//! current state (plus the remote result, where there is one) to the next
//! state. Nothing here performs IO; the controller runs the remote calls
//! between a `begin_*`/`prepare_*` step and the matching `finish_*` step.

use stockpos_core::{Entity, ExpectedRevision, RecordId};
use stockpos_infra::ConcurrencyMode;
use stockpos_inventory::{InventoryDraft, InventoryRecord, total_value};

use crate::form::{FormField, parse_price, parse_quantity};

/// The remote failure kinds the screen distinguishes.
///
/// Whatever went wrong underneath (network, permissions, missing document),
/// the user sees one fixed message per kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScreenFailure {
    Load,
    Save,
    Delete,
    /// Optimistic update rejected because the record changed since edit began.
    Conflict,
}

impl ScreenFailure {
    pub fn message(self) -> &'static str {
        match self {
            ScreenFailure::Load => {
                "Could not load inventory. Check the store configuration and access rules."
            }
            ScreenFailure::Save => "Could not save item. Please retry.",
            ScreenFailure::Delete => "Could not delete the item.",
            ScreenFailure::Conflict => "This item was changed elsewhere. Reload it and retry.",
        }
    }
}

impl core::fmt::Display for ScreenFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

/// Blocking prompt shown when a submit is rejected locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPrompt {
    pub title: &'static str,
    pub message: &'static str,
}

impl ValidationPrompt {
    pub fn missing_fields() -> Self {
        Self {
            title: "Missing fields",
            message: "Name and SKU are required.",
        }
    }
}

/// Confirmation the user must accept before a record is deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub id: RecordId,
    pub name: String,
}

impl DeletePrompt {
    pub fn title(&self) -> &'static str {
        "Delete item?"
    }

    pub fn message(&self) -> String {
        format!("Remove {} from inventory?", self.name)
    }
}

/// The write a validated submit resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitPlan {
    Create(InventoryDraft),
    Update {
        id: RecordId,
        expected: ExpectedRevision,
        draft: InventoryDraft,
    },
}

/// Record currently loaded into the form for editing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EditTarget {
    id: RecordId,
    seen_updated_at: i64,
}

/// In-memory UI state of the inventory screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenState {
    items: Vec<InventoryRecord>,
    total_value: f64,
    loading: bool,
    submitting: bool,
    form: InventoryDraft,
    editing: Option<EditTarget>,
    error: Option<ScreenFailure>,
}

impl Default for ScreenState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenState {
    /// Initial state: nothing fetched yet, a load is about to start.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            total_value: 0.0,
            loading: true,
            submitting: false,
            form: InventoryDraft::empty(),
            editing: None,
            error: None,
        }
    }

    pub fn items(&self) -> &[InventoryRecord] {
        &self.items
    }

    /// Σ quantity × price over `items`, refreshed whenever `items` is replaced.
    pub fn total_value(&self) -> f64 {
        self.total_value
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// UI hint only; overlapping submits are not blocked.
    pub fn submitting(&self) -> bool {
        self.submitting
    }

    pub fn form(&self) -> &InventoryDraft {
        &self.form
    }

    pub fn editing_id(&self) -> Option<&RecordId> {
        self.editing.as_ref().map(|e| &e.id)
    }

    pub fn failure(&self) -> Option<ScreenFailure> {
        self.error
    }

    /// User-facing error message, sticky until the next action replaces it.
    pub fn error(&self) -> Option<&'static str> {
        self.error.map(ScreenFailure::message)
    }

    pub fn find(&self, id: &RecordId) -> Option<&InventoryRecord> {
        self.items.iter().find(|r| r.id() == id)
    }

    // --- Load ---

    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// A failed load keeps the previous (stale but present) items.
    pub fn finish_load<E>(&mut self, result: Result<Vec<InventoryRecord>, E>) {
        match result {
            Ok(items) => {
                self.total_value = total_value(&items);
                self.items = items;
            }
            Err(_) => self.error = Some(ScreenFailure::Load),
        }
        self.loading = false;
    }

    // --- Form editing ---

    pub fn set_field(&mut self, field: FormField, text: &str) {
        match field {
            FormField::Name => self.form.name = text.to_string(),
            FormField::Sku => self.form.sku = text.to_string(),
            FormField::Quantity => self.form.quantity = parse_quantity(text),
            FormField::Price => self.form.price = parse_price(text),
        }
    }

    pub fn begin_edit(&mut self, record: &InventoryRecord) {
        self.editing = Some(EditTarget {
            id: record.id().clone(),
            seen_updated_at: record.updated_at,
        });
        self.form = record.draft();
    }

    pub fn reset(&mut self) {
        self.form = InventoryDraft::empty();
        self.editing = None;
    }

    // --- Submit ---

    /// Validate the form and, if it passes, mark a submit as in flight.
    ///
    /// A rejected submit leaves the state untouched; the prompt is returned to
    /// the caller and never stored.
    pub fn prepare_submit(&mut self, mode: ConcurrencyMode) -> Result<SubmitPlan, ValidationPrompt> {
        self.form
            .validate()
            .map_err(|_| ValidationPrompt::missing_fields())?;

        self.submitting = true;
        self.error = None;

        let draft = self.form.clone();
        Ok(match &self.editing {
            Some(target) => SubmitPlan::Update {
                id: target.id.clone(),
                expected: match mode {
                    ConcurrencyMode::LastWriterWins => ExpectedRevision::Any,
                    ConcurrencyMode::Optimistic => {
                        ExpectedRevision::UpdatedAt(target.seen_updated_at)
                    }
                },
                draft,
            },
            None => SubmitPlan::Create(draft),
        })
    }

    /// Apply the write result. On success the form is cleared and the caller
    /// should reload; on failure the form and edit target are kept.
    ///
    /// `submitting` stays set until [`ScreenState::end_submit`].
    pub fn finish_submit(&mut self, result: Result<(), ScreenFailure>) -> bool {
        match result {
            Ok(()) => {
                self.reset();
                true
            }
            Err(failure) => {
                self.error = Some(failure);
                false
            }
        }
    }

    pub fn end_submit(&mut self) {
        self.submitting = false;
    }

    // --- Delete ---

    pub fn delete_prompt(&self, record: &InventoryRecord) -> DeletePrompt {
        DeletePrompt {
            id: record.id().clone(),
            name: record.name.clone(),
        }
    }

    /// Nothing was removed optimistically, so a failure needs no rollback.
    pub fn finish_delete(&mut self, result: Result<(), ScreenFailure>) -> bool {
        match result {
            Ok(()) => true,
            Err(failure) => {
                self.error = Some(failure);
                false
            }
        }
    }
}
