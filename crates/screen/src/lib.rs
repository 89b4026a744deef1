//! `stockpos-screen`
//!
//! The inventory screen: form and list state, the transitions between them,
//! and the controller that runs store calls in between. The `stockpos`
//! binary puts a line-oriented terminal front end on top.

pub mod controller;
pub mod form;
pub mod state;
pub mod terminal;
pub mod view;

pub use controller::{InventoryScreen, SubmitOutcome};
pub use form::FormField;
pub use state::{DeletePrompt, ScreenFailure, ScreenState, SubmitPlan, ValidationPrompt};
pub use view::ScreenView;
