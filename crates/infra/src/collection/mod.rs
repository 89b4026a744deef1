//! Remote document collection boundary.
//!
//! The inventory store never talks to a database directly; it goes through this
//! narrow contract, which is all the external document store has to offer:
//! append a document and get its id back, overwrite by id, delete by id, read
//! by id, and query everything ordered by one field descending. No schema is
//! enforced on the stored fields.

pub mod firestore;
pub mod in_memory;

use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};
use stockpos_core::RecordId;

use crate::error::StoreError;

pub use firestore::FirestoreCollection;
pub use in_memory::InMemoryCollection;

/// Stored field map of a document.
pub type DocumentFields = Map<String, JsonValue>;

/// One document as returned by the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: RecordId,
    pub fields: DocumentFields,
}

/// A single named collection in a document store.
#[async_trait::async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Collection name (e.g. `inventory`).
    fn name(&self) -> &str;

    /// Append a new document; the store assigns and returns its id.
    async fn add(&self, fields: DocumentFields) -> Result<RecordId, StoreError>;

    /// Overwrite an existing document. Fails with `NotFound` if `id` is absent.
    async fn set(&self, id: &RecordId, fields: DocumentFields) -> Result<(), StoreError>;

    /// Delete an existing document. Fails with `NotFound` if `id` is absent.
    async fn remove(&self, id: &RecordId) -> Result<(), StoreError>;

    /// Read one document.
    async fn get(&self, id: &RecordId) -> Result<Option<Document>, StoreError>;

    /// All documents carrying `field`, ordered by it descending.
    async fn query_ordered_desc(&self, field: &str) -> Result<Vec<Document>, StoreError>;
}

#[async_trait::async_trait]
impl<C> DocumentCollection for Arc<C>
where
    C: DocumentCollection + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn add(&self, fields: DocumentFields) -> Result<RecordId, StoreError> {
        (**self).add(fields).await
    }

    async fn set(&self, id: &RecordId, fields: DocumentFields) -> Result<(), StoreError> {
        (**self).set(id, fields).await
    }

    async fn remove(&self, id: &RecordId) -> Result<(), StoreError> {
        (**self).remove(id).await
    }

    async fn get(&self, id: &RecordId) -> Result<Option<Document>, StoreError> {
        (**self).get(id).await
    }

    async fn query_ordered_desc(&self, field: &str) -> Result<Vec<Document>, StoreError> {
        (**self).query_ordered_desc(field).await
    }
}
