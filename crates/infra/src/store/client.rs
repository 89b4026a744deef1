use serde_json::Value as JsonValue;
use stockpos_core::{Clock, ExpectedRevision, MonotonicClock, RecordId, SystemClock};
use stockpos_inventory::{InventoryDocument, InventoryDraft, InventoryRecord, UPDATED_AT_FIELD};
use tracing::instrument;

use super::InventoryStore;
use crate::collection::{Document, DocumentCollection, DocumentFields};
use crate::error::StoreError;

/// `InventoryStore` over a single document collection.
///
/// Every create and update stamps `updatedAt` from `clock`. With the default
/// `MonotonicClock`, two writes from the same client never share a timestamp,
/// so an update always moves a record strictly forward in the list order.
#[derive(Debug)]
pub struct InventoryStoreClient<C, K = MonotonicClock<SystemClock>> {
    collection: C,
    clock: K,
}

impl<C: DocumentCollection> InventoryStoreClient<C> {
    pub fn new(collection: C) -> Self {
        Self::with_clock(collection, MonotonicClock::default())
    }
}

impl<C, K> InventoryStoreClient<C, K>
where
    C: DocumentCollection,
    K: Clock,
{
    pub fn with_clock(collection: C, clock: K) -> Self {
        Self { collection, clock }
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    fn stamp(&self, draft: &InventoryDraft) -> Result<DocumentFields, StoreError> {
        let doc = InventoryDocument::stamp(draft.clone(), self.clock.now_millis());
        match serde_json::to_value(&doc) {
            Ok(JsonValue::Object(fields)) => Ok(fields),
            Ok(other) => Err(StoreError::Decode(format!("record encoded as non-object: {other}"))),
            Err(e) => Err(StoreError::Decode(e.to_string())),
        }
    }
}

fn into_record(doc: Document) -> Result<InventoryRecord, StoreError> {
    let Document { id, fields } = doc;
    serde_json::from_value::<InventoryDocument>(JsonValue::Object(fields))
        .map(|stored| stored.into_record(id.clone()))
        .map_err(|e| StoreError::Decode(format!("document {id}: {e}")))
}

#[async_trait::async_trait]
impl<C, K> InventoryStore for InventoryStoreClient<C, K>
where
    C: DocumentCollection,
    K: Clock,
{
    #[instrument(skip(self), fields(collection = %self.collection.name()))]
    async fn list(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        let docs = self.collection.query_ordered_desc(UPDATED_AT_FIELD).await?;

        // The store enforces no schema; documents that do not decode are skipped.
        let records: Vec<InventoryRecord> = docs
            .into_iter()
            .filter_map(|doc| match into_record(doc) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed inventory document");
                    None
                }
            })
            .collect();

        tracing::debug!(count = records.len(), "listed inventory");
        Ok(records)
    }

    #[instrument(skip(self, draft), fields(collection = %self.collection.name(), sku = %draft.sku))]
    async fn create(&self, draft: &InventoryDraft) -> Result<(), StoreError> {
        let id = self.collection.add(self.stamp(draft)?).await?;
        tracing::info!(%id, "created inventory record");
        Ok(())
    }

    #[instrument(skip(self, draft), fields(collection = %self.collection.name()))]
    async fn update(&self, id: &RecordId, draft: &InventoryDraft) -> Result<(), StoreError> {
        self.collection.set(id, self.stamp(draft)?).await?;
        tracing::info!(%id, "updated inventory record");
        Ok(())
    }

    #[instrument(skip(self, draft), fields(collection = %self.collection.name()))]
    async fn update_if_unchanged(
        &self,
        id: &RecordId,
        expected: ExpectedRevision,
        draft: &InventoryDraft,
    ) -> Result<(), StoreError> {
        // Read-check-write; a writer landing between get and set still wins.
        let current = self
            .collection
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let current = into_record(current)?;

        expected
            .check(current.updated_at)
            .map_err(|e| StoreError::from_domain(id, e))?;

        self.update(id, draft).await
    }

    #[instrument(skip(self), fields(collection = %self.collection.name()))]
    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        self.collection.remove(id).await?;
        tracing::info!(%id, "deleted inventory record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};

    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::collection::InMemoryCollection;

    /// Clock that advances 1ms per reading, from a fixed origin.
    #[derive(Debug)]
    struct StepClock(AtomicI64);

    impl StepClock {
        fn starting_at(ms: i64) -> Self {
            Self(AtomicI64::new(ms))
        }
    }

    impl Clock for StepClock {
        fn now_millis(&self) -> i64 {
            self.0.fetch_add(1, Ordering::SeqCst)
        }
    }

    /// Clock stuck at one instant, to exercise the monotonic adapter.
    struct StoppedClock;

    impl Clock for StoppedClock {
        fn now_millis(&self) -> i64 {
            1_700_000_000_000
        }
    }

    fn client() -> InventoryStoreClient<Arc<InMemoryCollection>, StepClock> {
        InventoryStoreClient::with_clock(
            Arc::new(InMemoryCollection::default()),
            StepClock::starting_at(1_000),
        )
    }

    fn widget() -> InventoryDraft {
        InventoryDraft::new("Widget", "W1", 5, 2.5)
    }

    fn is_sorted_desc(items: &[InventoryRecord]) -> bool {
        items.windows(2).all(|w| w[0].updated_at >= w[1].updated_at)
    }

    #[tokio::test]
    async fn create_then_list_returns_the_record() {
        let store = client();
        store.create(&widget()).await.unwrap();

        let items = store.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].draft(), widget());
        assert_eq!(items[0].updated_at, 1_000);
        assert_eq!(stockpos_inventory::total_value(&items), 12.5);
    }

    #[tokio::test]
    async fn update_keeps_id_and_advances_updated_at() {
        let store = InventoryStoreClient::with_clock(
            Arc::new(InMemoryCollection::default()),
            MonotonicClock::new(StoppedClock),
        );
        store.create(&InventoryDraft::new("Bolt", "B1", 3, 10.0)).await.unwrap();
        let before = store.list().await.unwrap().remove(0);

        store
            .update(&before.id, &InventoryDraft::new("Bolt", "B1", 4, 10.0))
            .await
            .unwrap();

        let after = store.list().await.unwrap().remove(0);
        assert_eq!(after.id, before.id);
        assert_eq!(after.quantity, 4);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn updated_record_moves_to_the_front() {
        let store = client();
        store.create(&InventoryDraft::new("A", "A1", 1, 1.0)).await.unwrap();
        store.create(&InventoryDraft::new("B", "B1", 1, 1.0)).await.unwrap();

        let items = store.list().await.unwrap();
        assert_eq!(items[0].name, "B");
        let a = items[1].id.clone();

        store.update(&a, &InventoryDraft::new("A", "A1", 2, 1.0)).await.unwrap();
        let items = store.list().await.unwrap();
        assert_eq!(items[0].id, a);
        assert!(is_sorted_desc(&items));
    }

    #[tokio::test]
    async fn deleting_the_only_record_empties_the_list() {
        let store = client();
        store.create(&widget()).await.unwrap();
        let id = store.list().await.unwrap()[0].id.clone();

        store.delete(&id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_to_missing_ids_fail_with_not_found() {
        let store = client();
        let missing = RecordId::new("a1").unwrap();

        assert!(store.update(&missing, &widget()).await.unwrap_err().is_not_found());
        assert!(store.delete(&missing).await.unwrap_err().is_not_found());
        assert!(
            store
                .update_if_unchanged(&missing, ExpectedRevision::Any, &widget())
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn stale_optimistic_update_is_a_conflict() {
        let store = client();
        store.create(&widget()).await.unwrap();
        let seen = store.list().await.unwrap().remove(0);

        // Someone else writes first.
        store.update(&seen.id, &InventoryDraft::new("Widget", "W1", 9, 2.5)).await.unwrap();

        let err = store
            .update_if_unchanged(&seen.id, ExpectedRevision::UpdatedAt(seen.updated_at), &widget())
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.list().await.unwrap()[0].quantity, 9);

        let fresh = store.list().await.unwrap().remove(0);
        store
            .update_if_unchanged(&fresh.id, ExpectedRevision::UpdatedAt(fresh.updated_at), &widget())
            .await
            .unwrap();
        assert_eq!(store.list().await.unwrap()[0].quantity, 5);
    }

    #[tokio::test]
    async fn malformed_documents_are_skipped() {
        let store = client();
        store.create(&widget()).await.unwrap();
        let junk = json!({ "name": "Broken", "updatedAt": 999_999 });
        if let JsonValue::Object(fields) = junk {
            store.collection().add(fields).await.unwrap();
        }

        let items = store.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Widget");
    }

    #[derive(Debug, Clone)]
    enum Op {
        Create(i64),
        Update(usize, i64),
        Delete(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0i64..100).prop_map(Op::Create),
            (any::<usize>(), 0i64..100).prop_map(|(i, q)| Op::Update(i, q)),
            any::<usize>().prop_map(Op::Delete),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: whatever mix of writes ran before, list is newest-first.
        #[test]
        fn list_is_always_sorted_by_updated_at_desc(ops in prop::collection::vec(op(), 0..30)) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let store = client();
                for op in ops {
                    let ids: Vec<RecordId> =
                        store.list().await.unwrap().into_iter().map(|r| r.id).collect();
                    match op {
                        Op::Create(q) => store.create(&InventoryDraft::new("X", "X1", q, 1.0)).await.unwrap(),
                        Op::Update(i, q) if !ids.is_empty() => store
                            .update(&ids[i % ids.len()], &InventoryDraft::new("X", "X1", q, 1.0))
                            .await
                            .unwrap(),
                        Op::Delete(i) if !ids.is_empty() => store.delete(&ids[i % ids.len()]).await.unwrap(),
                        _ => {}
                    }
                }
                let items = store.list().await.unwrap();
                assert!(is_sorted_desc(&items));
            });
        }
    }
}
