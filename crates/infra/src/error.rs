//! Store operation errors.

use stockpos_core::{DomainError, RecordId};
use thiserror::Error;

/// Error raised by a document collection or the inventory store client.
///
/// These are **infrastructure errors** (transport, remote status, decoding) plus
/// the two store-defined outcomes a write can hit: a missing document and a
/// stale optimistic update.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(RecordId),

    #[error("stale write to {id}: {reason}")]
    Conflict { id: RecordId, reason: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote store returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("malformed document: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    /// Attach a domain error raised while writing `id`.
    pub fn from_domain(id: &RecordId, err: DomainError) -> Self {
        match err {
            DomainError::NotFound => StoreError::NotFound(id.clone()),
            DomainError::Conflict(reason) => StoreError::Conflict {
                id: id.clone(),
                reason,
            },
            other => StoreError::Decode(other.to_string()),
        }
    }
}
