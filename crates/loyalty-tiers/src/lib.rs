//! Loyalty Tiers
//!
//! Tier rules and spend classification for the business dashboard,
//! following Domain-Driven Design (DDD) with a hexagonal shell.
//!
//! ## Architecture
//!
//! - **Domain Layer**: Tier rules, classification, aggregates, domain events
//! - **Application Layer**: Use case orchestration, DTOs
//! - **Ports Layer**: Hexagonal architecture interfaces
//! - **Infrastructure Layer**: In-memory adapters
//!
//! ## Tier Rules
//!
//! - `Guest` is the reserved name of the single system tier at zero spend
//! - User tiers need a minimum spend of at least one minor unit
//! - A customer holds the highest tier whose minimum spend they have reached
//!
//! ```
//! use loyalty_tiers::{classify_tier, Tier};
//!
//! let tiers = vec![Tier::system(), Tier::user("Gold", 1000), Tier::user("VIP", 5000)];
//! assert_eq!(classify_tier(&tiers, 1200).unwrap().name(), "Gold");
//! ```

pub mod domain;
pub mod application;
pub mod ports;
pub mod infrastructure;
pub mod config;
pub mod telemetry;

// Re-exports for convenience
pub use domain::aggregates::{Customer, CustomerError, LoyaltyProgram, ProgramError, Tier, TierChanges};
pub use domain::value_objects::{EntityId, MinorUnits};
pub use domain::events::{CustomerEvent, LoyaltyEvent, ProgramEvent};
pub use domain::rules::{
    is_reserved_tier_name, is_valid_min_spend, validate_tier_definition, validate_tier_update,
    ValidationError, DEFAULT_TIER, MIN_SPEND_FOR_USER_TIERS, RESERVED_TIER_NAMES, SYSTEM_TIER_NAME,
};
pub use domain::services::{classify_tier, ordered_tiers, tier_progress, ClassificationError, TierProgress};
pub use application::{CustomerService, TierService};
pub use ports::inbound::{CustomerUseCases, TierUseCases, UseCaseError};
pub use ports::outbound::{CustomerRepository, EventPublisher, LoyaltyProgramRepository, RepositoryError};
pub use config::{ConfigError, LoyaltyConfig};
