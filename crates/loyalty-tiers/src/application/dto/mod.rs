//! Data Transfer Objects (DTOs)
//!
//! Objects for transferring data across boundaries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::Tier;

// =============================================================================
// Tier Commands
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateTierCommand {
    pub tenant_id: String,
    pub name: String,
    pub min_spend: i64,
    pub color: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateTierCommand {
    pub tenant_id: String,
    pub tier_id: String,
    pub name: Option<String>,
    pub min_spend: Option<i64>,
    pub color: Option<String>,
}

// =============================================================================
// Customer Commands
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterCustomerCommand {
    pub tenant_id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordSpendCommand {
    pub customer_id: String,
    pub amount: i64,
}

// =============================================================================
// Views (Read Models)
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierView {
    pub id: String,
    pub name: String,
    pub min_spend: i64,
    pub min_spend_display: Decimal,
    pub is_system: bool,
    pub color: String,
}

impl TierView {
    pub fn from_tier(tier: &Tier, scale: u32) -> Self {
        Self {
            id: tier.id().to_string(),
            name: tier.name().to_string(),
            min_spend: tier.min_spend().value(),
            min_spend_display: tier.min_spend().to_decimal(scale),
            is_system: tier.is_system(),
            color: tier.color().to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerTierBadge {
    pub customer_id: String,
    pub customer_name: String,
    pub tier: TierView,
    pub currency: String,
    pub cumulative_spend: i64,
    pub cumulative_spend_display: Decimal,
    pub next_tier: Option<String>,
    pub spend_to_next_tier: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierBucketView {
    pub tier: TierView,
    pub customer_count: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierDistributionView {
    pub tenant_id: String,
    pub total_customers: u64,
    pub tiers: Vec<TierBucketView>,
}
