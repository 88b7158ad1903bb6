//! Shared types and rules for the FarmHub platform
//!
//! This crate contains the domain models plus the side-effect-free alert
//! rules and recommendation logic shared between the backend and the
//! browser client (via WASM).

pub mod models;
pub mod recommendations;
pub mod rules;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
