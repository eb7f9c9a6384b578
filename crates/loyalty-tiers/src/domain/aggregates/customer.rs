//! Customer Aggregate
//!
//! Tracks cumulative spend and the tier it currently earns. The tier is a
//! projection of spend against the tenant's program and is recomputed on
//! every spend change or tier-set change.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::aggregates::program::LoyaltyProgram;
use crate::domain::aggregates::tier::Tier;
use crate::domain::events::{CustomerEvent, LoyaltyEvent};
use crate::domain::services::ClassificationError;
use crate::domain::value_objects::{EntityId, MinorUnits};

/// Customer aggregate root
#[derive(Clone, Debug)]
pub struct Customer {
    id: EntityId,
    tenant_id: EntityId,
    version: u64,
    name: String,
    cumulative_spend: MinorUnits,
    tier_id: EntityId,
    tier_name: String,
    tier_min_spend: MinorUnits,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<LoyaltyEvent>,
}

impl Customer {
    /// Register a customer at zero spend
    pub fn register(
        tenant_id: EntityId,
        name: impl Into<String>,
        program: &LoyaltyProgram,
    ) -> Result<Self, CustomerError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(CustomerError::EmptyName);
        }

        let tier = program.classify(MinorUnits::ZERO)?;
        let now = Utc::now();
        let id = EntityId::new();

        let mut customer = Self {
            id: id.clone(),
            tenant_id: tenant_id.clone(),
            version: 0,
            name,
            cumulative_spend: MinorUnits::ZERO,
            tier_id: tier.id().clone(),
            tier_name: tier.name().to_string(),
            tier_min_spend: tier.min_spend(),
            created_at: now,
            updated_at: now,
            events: vec![],
        };

        customer.raise_event(LoyaltyEvent::Customer(CustomerEvent::Registered {
            customer_id: id,
            tenant_id,
            tier_id: tier.id().clone(),
            registered_at: now,
        }));

        Ok(customer)
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn id(&self) -> &EntityId { &self.id }
    pub fn tenant_id(&self) -> &EntityId { &self.tenant_id }
    pub fn version(&self) -> u64 { self.version }
    pub fn name(&self) -> &str { &self.name }
    pub fn cumulative_spend(&self) -> MinorUnits { self.cumulative_spend }
    pub fn tier_id(&self) -> &EntityId { &self.tier_id }
    pub fn tier_name(&self) -> &str { &self.tier_name }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    // =========================================================================
    // Business Operations
    // =========================================================================

    /// Add a purchase to cumulative spend and reclassify
    pub fn record_purchase(&mut self, amount: MinorUnits, program: &LoyaltyProgram) -> Result<bool, CustomerError> {
        if !amount.is_positive() {
            return Err(CustomerError::NonPositiveAmount(amount));
        }

        let spend = self
            .cumulative_spend
            .checked_add(amount)
            .ok_or(CustomerError::SpendOverflow)?;
        let tier = program.classify(spend)?;

        self.cumulative_spend = spend;
        self.touch();
        self.raise_event(LoyaltyEvent::Customer(CustomerEvent::PurchaseRecorded {
            customer_id: self.id.clone(),
            amount,
            cumulative_spend: spend,
        }));

        Ok(self.settle_tier(tier))
    }

    /// Take a refund off cumulative spend (never below zero) and reclassify
    pub fn record_refund(&mut self, amount: MinorUnits, program: &LoyaltyProgram) -> Result<bool, CustomerError> {
        if !amount.is_positive() {
            return Err(CustomerError::NonPositiveAmount(amount));
        }

        let spend = self.cumulative_spend.saturating_sub(amount);
        let tier = program.classify(spend)?;

        self.cumulative_spend = spend;
        self.touch();
        self.raise_event(LoyaltyEvent::Customer(CustomerEvent::RefundRecorded {
            customer_id: self.id.clone(),
            amount,
            cumulative_spend: spend,
        }));

        Ok(self.settle_tier(tier))
    }

    /// Recompute the tier; returns whether the customer moved to another tier
    pub fn reclassify(&mut self, program: &LoyaltyProgram) -> Result<bool, CustomerError> {
        let tier = program.classify(self.cumulative_spend)?;
        Ok(self.settle_tier(tier))
    }

    fn settle_tier(&mut self, tier: &Tier) -> bool {
        if tier.id() == &self.tier_id {
            // renames and threshold edits of the same tier are not moves
            self.tier_name = tier.name().to_string();
            self.tier_min_spend = tier.min_spend();
            return false;
        }

        let from_tier = std::mem::replace(&mut self.tier_name, tier.name().to_string());
        let upgrade = tier.min_spend() > self.tier_min_spend;
        self.tier_id = tier.id().clone();
        self.tier_min_spend = tier.min_spend();
        self.touch();

        self.raise_event(LoyaltyEvent::Customer(CustomerEvent::TierChanged {
            customer_id: self.id.clone(),
            from_tier,
            to_tier: self.tier_name.clone(),
            upgrade,
            changed_at: Utc::now(),
        }));

        true
    }

    pub(crate) fn committed(&self) -> Self {
        Self {
            version: self.version + 1,
            events: vec![],
            ..self.clone()
        }
    }

    // =========================================================================
    // Domain Events
    // =========================================================================

    /// Get and clear accumulated domain events
    pub fn take_events(&mut self) -> Vec<LoyaltyEvent> {
        std::mem::take(&mut self.events)
    }

    fn raise_event(&mut self, event: LoyaltyEvent) {
        self.events.push(event);
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomerError {
    #[error("customer name cannot be empty")]
    EmptyName,
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(MinorUnits),
    #[error("cumulative spend overflow")]
    SpendOverflow,
    #[error(transparent)]
    Classification(#[from] ClassificationError),
}
