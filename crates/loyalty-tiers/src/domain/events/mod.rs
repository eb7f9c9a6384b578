//! Domain Events
//!
//! Events raised by aggregates to communicate state changes.

use chrono::{DateTime, Utc};
use crate::domain::value_objects::{EntityId, MinorUnits};

/// All domain events in the loyalty bounded context
#[derive(Clone, Debug, PartialEq)]
pub enum LoyaltyEvent {
    Program(ProgramEvent),
    Customer(CustomerEvent),
}

/// Loyalty program (tier set) events
#[derive(Clone, Debug, PartialEq)]
pub enum ProgramEvent {
    Created {
        program_id: EntityId,
        tenant_id: EntityId,
        system_tier_id: EntityId,
        created_at: DateTime<Utc>,
    },

    TierAdded {
        program_id: EntityId,
        tier_id: EntityId,
        name: String,
        min_spend: MinorUnits,
    },

    TierUpdated {
        program_id: EntityId,
        tier_id: EntityId,
        previous_name: String,
        name: String,
        previous_min_spend: MinorUnits,
        min_spend: MinorUnits,
    },

    TierRemoved {
        program_id: EntityId,
        tier_id: EntityId,
        name: String,
    },
}

/// Customer events
#[derive(Clone, Debug, PartialEq)]
pub enum CustomerEvent {
    Registered {
        customer_id: EntityId,
        tenant_id: EntityId,
        tier_id: EntityId,
        registered_at: DateTime<Utc>,
    },

    PurchaseRecorded {
        customer_id: EntityId,
        amount: MinorUnits,
        cumulative_spend: MinorUnits,
    },

    RefundRecorded {
        customer_id: EntityId,
        amount: MinorUnits,
        cumulative_spend: MinorUnits,
    },

    TierChanged {
        customer_id: EntityId,
        from_tier: String,
        to_tier: String,
        upgrade: bool,
        changed_at: DateTime<Utc>,
    },
}

impl LoyaltyEvent {
    /// Get the aggregate ID this event belongs to
    pub fn aggregate_id(&self) -> &EntityId {
        match self {
            LoyaltyEvent::Program(e) => match e {
                ProgramEvent::Created { program_id, .. } => program_id,
                ProgramEvent::TierAdded { program_id, .. } => program_id,
                ProgramEvent::TierUpdated { program_id, .. } => program_id,
                ProgramEvent::TierRemoved { program_id, .. } => program_id,
            },
            LoyaltyEvent::Customer(e) => match e {
                CustomerEvent::Registered { customer_id, .. } => customer_id,
                CustomerEvent::PurchaseRecorded { customer_id, .. } => customer_id,
                CustomerEvent::RefundRecorded { customer_id, .. } => customer_id,
                CustomerEvent::TierChanged { customer_id, .. } => customer_id,
            },
        }
    }

    /// Get event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            LoyaltyEvent::Program(e) => match e {
                ProgramEvent::Created { .. } => "program.created",
                ProgramEvent::TierAdded { .. } => "program.tier_added",
                ProgramEvent::TierUpdated { .. } => "program.tier_updated",
                ProgramEvent::TierRemoved { .. } => "program.tier_removed",
            },
            LoyaltyEvent::Customer(e) => match e {
                CustomerEvent::Registered { .. } => "customer.registered",
                CustomerEvent::PurchaseRecorded { .. } => "customer.purchase_recorded",
                CustomerEvent::RefundRecorded { .. } => "customer.refund_recorded",
                CustomerEvent::TierChanged { .. } => "customer.tier_changed",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_metadata() {
        let customer_id = EntityId::new();
        let event = LoyaltyEvent::Customer(CustomerEvent::TierChanged {
            customer_id: customer_id.clone(),
            from_tier: "Guest".into(),
            to_tier: "Gold".into(),
            upgrade: true,
            changed_at: Utc::now(),
        });
        assert_eq!(event.aggregate_id(), &customer_id);
        assert_eq!(event.event_type(), "customer.tier_changed");
    }
}
