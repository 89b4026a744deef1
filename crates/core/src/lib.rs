//! `stockpos-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod revision;

pub use clock::{Clock, MonotonicClock, SystemClock};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::RecordId;
pub use revision::ExpectedRevision;
