//! Inventory store client.
//!
//! Four logical operations (list, create, update, delete) against one named
//! collection, with no local caching and no retries. A retried `create`
//! produces a duplicate record.

pub mod client;

use std::sync::Arc;

use stockpos_core::{ExpectedRevision, RecordId};
use stockpos_inventory::{InventoryDraft, InventoryRecord};

use crate::collection::{FirestoreCollection, InMemoryCollection};
use crate::config::{Backend, StoreConfig};
use crate::error::StoreError;

pub use client::InventoryStoreClient;

/// CRUD access to the inventory collection.
#[async_trait::async_trait]
pub trait InventoryStore: Send + Sync {
    /// All records, most recently updated first.
    async fn list(&self) -> Result<Vec<InventoryRecord>, StoreError>;

    /// Write a new record. The store assigns the id; it is not returned.
    async fn create(&self, draft: &InventoryDraft) -> Result<(), StoreError>;

    /// Overwrite all editable fields of `id` (last writer wins).
    async fn update(&self, id: &RecordId, draft: &InventoryDraft) -> Result<(), StoreError>;

    /// Overwrite `id` only if its stored `updatedAt` still matches `expected`.
    async fn update_if_unchanged(
        &self,
        id: &RecordId,
        expected: ExpectedRevision,
        draft: &InventoryDraft,
    ) -> Result<(), StoreError>;

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn list(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        (**self).list().await
    }

    async fn create(&self, draft: &InventoryDraft) -> Result<(), StoreError> {
        (**self).create(draft).await
    }

    async fn update(&self, id: &RecordId, draft: &InventoryDraft) -> Result<(), StoreError> {
        (**self).update(id, draft).await
    }

    async fn update_if_unchanged(
        &self,
        id: &RecordId,
        expected: ExpectedRevision,
        draft: &InventoryDraft,
    ) -> Result<(), StoreError> {
        (**self).update_if_unchanged(id, expected, draft).await
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }
}

/// Build the store client selected by `config`.
pub fn open(config: &StoreConfig) -> Result<Arc<dyn InventoryStore>, StoreError> {
    match &config.backend {
        Backend::Memory => {
            tracing::info!(collection = %config.collection, "using in-memory inventory collection");
            let collection = InMemoryCollection::new(config.collection.clone());
            Ok(Arc::new(InventoryStoreClient::new(collection)))
        }
        Backend::Firestore(fs) => {
            tracing::info!(
                project_id = %fs.project_id,
                collection = %config.collection,
                "using Firestore inventory collection"
            );
            let collection = FirestoreCollection::new(fs, config.collection.clone())?;
            Ok(Arc::new(InventoryStoreClient::new(collection)))
        }
    }
}
