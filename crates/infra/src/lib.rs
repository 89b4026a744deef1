//! Infrastructure layer: document collections, the inventory store client, config.

pub mod collection;
pub mod config;
pub mod error;
pub mod store;

pub use collection::{Document, DocumentCollection, DocumentFields, FirestoreCollection, InMemoryCollection};
pub use config::{Backend, ConcurrencyMode, ConfigError, FirestoreConfig, StoreConfig};
pub use error::StoreError;
pub use store::{InventoryStore, InventoryStoreClient};
