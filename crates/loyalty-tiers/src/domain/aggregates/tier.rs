//! Tier Entity
//!
//! A named customer-classification bucket with a minimum-spend threshold.
//! Construction does not validate; definitions pass through
//! [`validate_tier_definition`](crate::domain::rules::validate_tier_definition)
//! before they reach a [`LoyaltyProgram`](super::LoyaltyProgram).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::rules::DEFAULT_TIER;
use crate::domain::value_objects::{EntityId, MinorUnits};

/// Color assigned to user tiers created without one
pub const DEFAULT_USER_TIER_COLOR: &str = "#6366F1";

/// Tier entity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    id: EntityId,
    name: String,
    min_spend: MinorUnits,
    is_system: bool,
    color: String,
    created_at: DateTime<Utc>,
}

impl Tier {
    /// Create a tier definition. The name is trimmed.
    pub fn new(name: impl Into<String>, min_spend: impl Into<MinorUnits>, is_system: bool) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into().trim().to_string(),
            min_spend: min_spend.into(),
            is_system,
            color: DEFAULT_USER_TIER_COLOR.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Create a user (non-system) tier definition
    pub fn user(name: impl Into<String>, min_spend: impl Into<MinorUnits>) -> Self {
        Self::new(name, min_spend, false)
    }

    /// Materialize the built-in system tier
    pub fn system() -> Self {
        Self::new(DEFAULT_TIER.name, DEFAULT_TIER.min_spend, true).with_color(DEFAULT_TIER.color)
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn id(&self) -> &EntityId { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn min_spend(&self) -> MinorUnits { self.min_spend }
    pub fn is_system(&self) -> bool { self.is_system }
    pub fn color(&self) -> &str { &self.color }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into().trim().to_string();
    }

    pub(crate) fn set_min_spend(&mut self, min_spend: MinorUnits) {
        self.min_spend = min_spend;
    }

    pub(crate) fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_tier_matches_default() {
        let guest = Tier::system();
        assert_eq!(guest.name(), "Guest");
        assert_eq!(guest.min_spend(), MinorUnits::ZERO);
        assert!(guest.is_system());
        assert_eq!(guest.color(), DEFAULT_TIER.color);
    }

    #[test]
    fn test_name_is_trimmed() {
        let tier = Tier::user("  Gold ", 1000);
        assert_eq!(tier.name(), "Gold");
        assert!(!tier.is_system());
        assert_eq!(tier.color(), DEFAULT_USER_TIER_COLOR);
    }

    #[test]
    fn test_each_tier_gets_its_own_id() {
        assert_ne!(Tier::user("Gold", 1000).id(), Tier::user("Gold", 1000).id());
    }
}
