use serde::{Deserialize, Serialize};

use stockpos_core::{DomainError, DomainResult, Entity, RecordId};

/// Name of the stored timestamp field; the collection is ordered by it.
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Editable subset of a record, as supplied by the form.
///
/// `id` and `updatedAt` are never client-supplied. Updates always resend the
/// whole draft; there are no partial updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryDraft {
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    pub price: f64,
}

impl InventoryDraft {
    pub fn new(name: impl Into<String>, sku: impl Into<String>, quantity: i64, price: f64) -> Self {
        Self {
            name: name.into(),
            sku: sku.into(),
            quantity,
            price,
        }
    }

    /// The form's initial state: blank text, zero quantity and price.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    /// Required-field check performed before any write.
    ///
    /// Only `name` and `sku` are required (trimmed non-empty). Quantity and
    /// price are not range-checked.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.sku.trim().is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        Ok(())
    }
}

/// Body of a stored inventory document (everything except the document id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDocument {
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    pub price: f64,
    pub updated_at: i64,
}

impl InventoryDocument {
    /// Stamp a draft with the write-path timestamp.
    pub fn stamp(draft: InventoryDraft, updated_at: i64) -> Self {
        Self {
            name: draft.name,
            sku: draft.sku,
            quantity: draft.quantity,
            price: draft.price,
            updated_at,
        }
    }

    /// Pair the stored fields with the id the store assigned.
    pub fn into_record(self, id: RecordId) -> InventoryRecord {
        InventoryRecord {
            id,
            name: self.name,
            sku: self.sku,
            quantity: self.quantity,
            price: self.price,
            updated_at: self.updated_at,
        }
    }
}

/// A persisted inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub id: RecordId,
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    pub price: f64,
    pub updated_at: i64,
}

impl InventoryRecord {
    /// Editable fields of this record (drops `id` and `updatedAt`).
    pub fn draft(&self) -> InventoryDraft {
        InventoryDraft {
            name: self.name.clone(),
            sku: self.sku.clone(),
            quantity: self.quantity,
            price: self.price,
        }
    }

    /// Stock value of this line: quantity × price.
    pub fn line_value(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

impl Entity for InventoryRecord {
    type Id = RecordId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Total stock value over a list of records.
pub fn total_value(items: &[InventoryRecord]) -> f64 {
    // An empty f64 sum starts from -0.0; fold keeps it positive.
    items
        .iter()
        .map(InventoryRecord::line_value)
        .fold(0.0, |total, line| total + line)
}
