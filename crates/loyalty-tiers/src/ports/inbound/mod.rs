//! Inbound ports (Use case traits)
//!
//! Hexagonal architecture: application service interfaces.

use async_trait::async_trait;
use thiserror::Error;

use crate::application::dto::*;
use crate::domain::aggregates::{CustomerError, LoyaltyProgram, ProgramError};
use crate::domain::rules::ValidationError;
use crate::domain::services::ClassificationError;
use crate::domain::value_objects::EntityId;
use crate::ports::outbound::RepositoryError;

/// Tier management use cases
#[async_trait]
pub trait TierUseCases: Send + Sync {
    /// Seed a tenant's program with the system tier
    async fn initialize_program(&self, tenant_id: &EntityId) -> Result<LoyaltyProgram, UseCaseError>;

    /// Create a user tier
    async fn create_tier(&self, command: CreateTierCommand) -> Result<TierView, UseCaseError>;

    /// Edit a tier
    async fn update_tier(&self, command: UpdateTierCommand) -> Result<TierView, UseCaseError>;

    /// Delete a user tier
    async fn delete_tier(&self, tenant_id: &EntityId, tier_id: &EntityId) -> Result<(), UseCaseError>;

    /// List tiers, lowest threshold first
    async fn list_tiers(&self, tenant_id: &EntityId) -> Result<Vec<TierView>, UseCaseError>;

    /// Dry-run a tier definition against the rules and the tenant's tier set
    async fn validate_tier(&self, command: CreateTierCommand) -> Result<TierView, UseCaseError>;
}

/// Customer tier use cases
#[async_trait]
pub trait CustomerUseCases: Send + Sync {
    /// Register a customer
    async fn register_customer(&self, command: RegisterCustomerCommand) -> Result<CustomerTierBadge, UseCaseError>;

    /// Record a purchase
    async fn record_purchase(&self, command: RecordSpendCommand) -> Result<CustomerTierBadge, UseCaseError>;

    /// Record a refund
    async fn record_refund(&self, command: RecordSpendCommand) -> Result<CustomerTierBadge, UseCaseError>;

    /// Current tier badge for a profile view
    async fn get_tier_badge(&self, customer_id: &EntityId) -> Result<CustomerTierBadge, UseCaseError>;

    /// Customer count per tier for reporting
    async fn tier_distribution(&self, tenant_id: &EntityId) -> Result<TierDistributionView, UseCaseError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UseCaseError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("domain error: {0}")]
    Domain(String),
    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

impl From<ProgramError> for UseCaseError {
    fn from(err: ProgramError) -> Self {
        match err {
            ProgramError::Validation(e) => Self::Validation(e),
            ProgramError::TierNotFound(id) => Self::NotFound(format!("tier {}", id)),
            other => Self::Conflict(other.to_string()),
        }
    }
}

impl From<RepositoryError> for UseCaseError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            RepositoryError::DuplicateKey(key) => Self::Conflict(format!("duplicate key: {}", key)),
            other => Self::Repository(other),
        }
    }
}

impl From<CustomerError> for UseCaseError {
    fn from(err: CustomerError) -> Self {
        Self::Domain(err.to_string())
    }
}

impl From<ClassificationError> for UseCaseError {
    fn from(err: ClassificationError) -> Self {
        Self::Domain(err.to_string())
    }
}
