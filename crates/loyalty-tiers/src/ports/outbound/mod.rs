//! Outbound ports (Repository traits)
//!
//! Hexagonal architecture: these are the interfaces that infrastructure must implement.
//! Aggregates only reach a repository after passing the tier rules.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::aggregates::{Customer, LoyaltyProgram};
use crate::domain::value_objects::EntityId;
use crate::domain::LoyaltyEvent;

/// Loyalty program repository port
#[async_trait]
pub trait LoyaltyProgramRepository: Send + Sync {
    /// Find program by ID
    async fn find_by_id(&self, id: &EntityId) -> Result<Option<LoyaltyProgram>, RepositoryError>;

    /// Find the program of a tenant
    async fn find_by_tenant(&self, tenant_id: &EntityId) -> Result<Option<LoyaltyProgram>, RepositoryError>;

    /// Save program (insert or update)
    ///
    /// Fails with `Conflict` when the stored version moved on since
    /// `program` was loaded.
    async fn save(&self, program: &LoyaltyProgram) -> Result<(), RepositoryError>;
}

/// Customer repository port
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Find customer by ID
    async fn find_by_id(&self, id: &EntityId) -> Result<Option<Customer>, RepositoryError>;

    /// Find all customers of a tenant
    async fn find_by_tenant(&self, tenant_id: &EntityId) -> Result<Vec<Customer>, RepositoryError>;

    /// Save customer (insert or update), rejecting stale versions with `Conflict`
    async fn save(&self, customer: &Customer) -> Result<(), RepositoryError>;

    /// Delete customer
    async fn delete(&self, id: &EntityId) -> Result<(), RepositoryError>;
}

/// Event publisher port
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish domain events
    async fn publish(&self, events: Vec<LoyaltyEvent>) -> Result<(), RepositoryError>;
}

/// Repository error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("entity not found")]
    NotFound,
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("conflict: {0}")]
    Conflict(String),
}
