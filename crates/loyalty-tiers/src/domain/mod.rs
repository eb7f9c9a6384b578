//! Domain module
//!
//! Tier rules, classification and the loyalty aggregates.

pub mod aggregates;
pub mod value_objects;
pub mod events;
pub mod rules;
pub mod services;

pub use aggregates::*;
pub use value_objects::*;
pub use events::*;
