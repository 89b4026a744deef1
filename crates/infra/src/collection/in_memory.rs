use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value as JsonValue;
use stockpos_core::RecordId;
use uuid::Uuid;

use super::{Document, DocumentCollection, DocumentFields};
use crate::error::StoreError;

/// In-memory document collection.
///
/// Intended for tests/dev and the offline demo backend. Ids are generated the
/// way a document store would: opaque and unique, never client-supplied.
#[derive(Debug)]
pub struct InMemoryCollection {
    name: String,
    docs: RwLock<HashMap<RecordId, DocumentFields>>,
}

impl InMemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.docs.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> StoreError {
        StoreError::Transport("lock poisoned".to_string())
    }

    fn next_id() -> Result<RecordId, StoreError> {
        RecordId::new(Uuid::now_v7().simple().to_string())
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

impl Default for InMemoryCollection {
    fn default() -> Self {
        Self::new("inventory")
    }
}

/// Descending order on a stored field value.
///
/// Integers compare as integers, other numbers as floats, strings
/// lexicographically. Mixed kinds fall back to a fixed kind order.
fn compare_desc(a: &JsonValue, b: &JsonValue) -> Ordering {
    fn rank(v: &JsonValue) -> u8 {
        match v {
            JsonValue::Null => 0,
            JsonValue::Bool(_) => 1,
            JsonValue::Number(_) => 2,
            JsonValue::String(_) => 3,
            JsonValue::Array(_) => 4,
            JsonValue::Object(_) => 5,
        }
    }

    let asc = match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => {
                let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
        },
        (JsonValue::String(x), JsonValue::String(y)) => x.cmp(y),
        (JsonValue::Bool(x), JsonValue::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    };
    asc.reverse()
}

#[async_trait::async_trait]
impl DocumentCollection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn add(&self, fields: DocumentFields) -> Result<RecordId, StoreError> {
        let id = Self::next_id()?;
        let mut docs = self.docs.write().map_err(|_| Self::poisoned())?;
        docs.insert(id.clone(), fields);
        Ok(id)
    }

    async fn set(&self, id: &RecordId, fields: DocumentFields) -> Result<(), StoreError> {
        let mut docs = self.docs.write().map_err(|_| Self::poisoned())?;
        match docs.get_mut(id) {
            Some(existing) => {
                *existing = fields;
                Ok(())
            }
            None => Err(StoreError::NotFound(id.clone())),
        }
    }

    async fn remove(&self, id: &RecordId) -> Result<(), StoreError> {
        let mut docs = self.docs.write().map_err(|_| Self::poisoned())?;
        docs.remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn get(&self, id: &RecordId) -> Result<Option<Document>, StoreError> {
        let docs = self.docs.read().map_err(|_| Self::poisoned())?;
        Ok(docs.get(id).map(|fields| Document {
            id: id.clone(),
            fields: fields.clone(),
        }))
    }

    async fn query_ordered_desc(&self, field: &str) -> Result<Vec<Document>, StoreError> {
        let docs = self.docs.read().map_err(|_| Self::poisoned())?;

        // Documents without the order field are excluded, as an ordered query would.
        let mut out: Vec<Document> = docs
            .iter()
            .filter(|(_, fields)| fields.contains_key(field))
            .map(|(id, fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect();

        out.sort_by(|a, b| {
            compare_desc(&a.fields[field], &b.fields[field]).then_with(|| a.id.cmp(&b.id))
        });

        Ok(out)
    }
}
