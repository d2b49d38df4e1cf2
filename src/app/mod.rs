//! Application orchestration layer
//!
//! Owns the places store and viewport controller and exposes the user actions
//! of the map and list screens.

pub mod controller;
pub mod state;

pub use controller::App;
pub use state::{AppState, FormPresentation, Notice, SaveForm, Screen};
