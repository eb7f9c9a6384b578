//! Aggregates module

pub mod tier;
pub mod program;
pub mod customer;

pub use tier::{Tier, DEFAULT_USER_TIER_COLOR};
pub use program::{LoyaltyProgram, ProgramError, TierChanges};
pub use customer::{Customer, CustomerError};
