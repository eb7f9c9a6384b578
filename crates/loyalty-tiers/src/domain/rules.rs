//! Tier rules
//!
//! Naming and threshold invariants for tier definitions. Everything here is a
//! pure function of its arguments.
//!
//! - A reserved name may only be carried by the system tier.
//! - A user tier needs `min_spend >= MIN_SPEND_FOR_USER_TIERS`; the system
//!   tier needs `min_spend >= 0`.
//! - The system tier is always named [`SYSTEM_TIER_NAME`]. Once seeded only
//!   its color may change.

use thiserror::Error;

use crate::domain::aggregates::Tier;
use crate::domain::value_objects::MinorUnits;

/// Name of the built-in tier every customer qualifies for
pub const SYSTEM_TIER_NAME: &str = "Guest";

/// Names user tiers may not take
pub const RESERVED_TIER_NAMES: &[&str] = &[SYSTEM_TIER_NAME];

/// Lowest threshold a user tier may declare (one minor unit)
pub const MIN_SPEND_FOR_USER_TIERS: MinorUnits = MinorUnits::new(1);

/// Compile-time description of the system tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemTierTemplate {
    pub name: &'static str,
    pub min_spend: MinorUnits,
    pub color: &'static str,
}

/// The system tier seeded into every loyalty program
pub const DEFAULT_TIER: SystemTierTemplate = SystemTierTemplate {
    name: SYSTEM_TIER_NAME,
    min_spend: MinorUnits::ZERO,
    color: "#9CA3AF",
};

/// Tier validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("tier name cannot be empty")]
    EmptyName,
    #[error("tier name '{0}' is reserved for system tiers")]
    ReservedName(String),
    #[error("minimum spend {min_spend} is below the floor for {} tiers", tier_kind(.is_system))]
    InvalidThreshold { min_spend: MinorUnits, is_system: bool },
    #[error("system tier must be named '{expected}', got '{0}'", expected = SYSTEM_TIER_NAME)]
    SystemTierNameMismatch(String),
    #[error("the system tier only accepts color changes")]
    ImmutableSystemTier,
}

impl ValidationError {
    /// Stable machine-readable kind, surfaced to forms
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyName => "empty_name",
            Self::ReservedName(_) => "reserved_name",
            Self::InvalidThreshold { .. } => "invalid_threshold",
            Self::SystemTierNameMismatch(_) => "system_tier_name_mismatch",
            Self::ImmutableSystemTier => "immutable_system_tier",
        }
    }
}

fn tier_kind(is_system: &bool) -> &'static str {
    if *is_system { "system" } else { "user" }
}

/// Case-sensitive membership in [`RESERVED_TIER_NAMES`]
pub fn is_reserved_tier_name(name: &str) -> bool {
    RESERVED_TIER_NAMES.contains(&name)
}

/// Whether `min_spend` satisfies the floor for a system or user tier
pub fn is_valid_min_spend(min_spend: impl Into<MinorUnits>, is_system: bool) -> bool {
    let min_spend = min_spend.into();
    if is_system {
        min_spend >= MinorUnits::ZERO
    } else {
        min_spend >= MIN_SPEND_FOR_USER_TIERS
    }
}

/// Validate a tier definition, returning it unchanged on success
pub fn validate_tier_definition(tier: Tier) -> Result<Tier, ValidationError> {
    if tier.name().trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }

    if !tier.is_system() && is_reserved_tier_name(tier.name()) {
        return Err(ValidationError::ReservedName(tier.name().to_string()));
    }

    if !is_valid_min_spend(tier.min_spend(), tier.is_system()) {
        return Err(ValidationError::InvalidThreshold {
            min_spend: tier.min_spend(),
            is_system: tier.is_system(),
        });
    }

    if tier.is_system() && tier.name() != SYSTEM_TIER_NAME {
        return Err(ValidationError::SystemTierNameMismatch(tier.name().to_string()));
    }

    Ok(tier)
}

/// Validate an edit of `existing` into `proposed`
///
/// Only the color of the system tier may change. A user tier cannot be
/// promoted to the system tier.
pub fn validate_tier_update(existing: &Tier, proposed: Tier) -> Result<Tier, ValidationError> {
    if existing.is_system() {
        if !proposed.is_system()
            || proposed.name() != existing.name()
            || proposed.min_spend() != existing.min_spend()
        {
            return Err(ValidationError::ImmutableSystemTier);
        }
    } else if proposed.is_system() {
        return Err(ValidationError::ImmutableSystemTier);
    }

    validate_tier_definition(proposed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_guest_is_reserved() {
        assert!(is_reserved_tier_name("Guest"));
        assert!(!is_reserved_tier_name("guest"));
        assert!(!is_reserved_tier_name("GUEST"));
        assert!(!is_reserved_tier_name("Guest "));
        assert!(!is_reserved_tier_name("VIP"));
        assert!(!is_reserved_tier_name(""));
    }

    #[test]
    fn test_min_spend_boundaries() {
        assert!(is_valid_min_spend(0, true));
        assert!(!is_valid_min_spend(-1, true));
        assert!(is_valid_min_spend(1, false));
        assert!(!is_valid_min_spend(0, false));
        assert!(!is_valid_min_spend(-100, false));
        assert!(is_valid_min_spend(i64::MAX, false));
        assert!(!is_valid_min_spend(i64::MIN, true));
    }

    #[test]
    fn test_default_system_tier_is_valid() {
        let guest = Tier::new("Guest", 0, true);
        assert_eq!(validate_tier_definition(guest.clone()), Ok(guest));
        assert!(validate_tier_definition(Tier::system()).is_ok());
    }

    #[test]
    fn test_guest_as_user_tier_is_reserved() {
        let err = validate_tier_definition(Tier::new("Guest", 0, false)).unwrap_err();
        assert_eq!(err, ValidationError::ReservedName("Guest".into()));
        assert_eq!(err.kind(), "reserved_name");
    }

    #[test]
    fn test_zero_threshold_user_tier_rejected() {
        let err = validate_tier_definition(Tier::new("VIP", 0, false)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidThreshold { min_spend: MinorUnits::ZERO, is_system: false }
        );
    }

    #[test]
    fn test_valid_user_tier() {
        let vip = Tier::new("VIP", 500, false);
        assert_eq!(validate_tier_definition(vip.clone()), Ok(vip));
    }

    #[test]
    fn test_system_tier_must_be_named_guest() {
        let err = validate_tier_definition(Tier::new("Member", 0, true)).unwrap_err();
        assert_eq!(err, ValidationError::SystemTierNameMismatch("Member".into()));
    }

    #[test]
    fn test_negative_system_threshold_rejected() {
        let err = validate_tier_definition(Tier::new("Guest", -5, true)).unwrap_err();
        assert_eq!(err.kind(), "invalid_threshold");
    }

    #[test]
    fn test_empty_name_rejected() {
        assert_eq!(
            validate_tier_definition(Tier::user("   ", 100)),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn test_revalidation_is_idempotent() {
        let gold = validate_tier_definition(Tier::user("Gold", 1000)).unwrap();
        let again = validate_tier_definition(gold.clone()).unwrap();
        assert_eq!(gold, again);
    }

    #[test]
    fn test_system_tier_color_may_change() {
        let guest = Tier::system();
        let recolored = guest.clone().with_color("#000000");
        assert!(validate_tier_update(&guest, recolored).is_ok());
    }

    #[test]
    fn test_system_tier_rename_rejected() {
        let guest = Tier::system();
        let mut renamed = guest.clone();
        renamed.rename("Visitor");
        assert_eq!(validate_tier_update(&guest, renamed), Err(ValidationError::ImmutableSystemTier));
    }

    #[test]
    fn test_system_tier_threshold_change_rejected() {
        let guest = Tier::system();
        let mut raised = guest.clone();
        raised.set_min_spend(MinorUnits::new(10));
        assert_eq!(validate_tier_update(&guest, raised), Err(ValidationError::ImmutableSystemTier));
    }

    #[test]
    fn test_user_tier_cannot_become_system() {
        let gold = Tier::user("Gold", 1000);
        let promoted = Tier::new("Guest", 0, true);
        assert_eq!(validate_tier_update(&gold, promoted), Err(ValidationError::ImmutableSystemTier));
    }

    #[test]
    fn test_user_tier_update_revalidates() {
        let gold = Tier::user("Gold", 1000);
        let mut lowered = gold.clone();
        lowered.set_min_spend(MinorUnits::ZERO);
        assert_eq!(validate_tier_update(&gold, lowered).unwrap_err().kind(), "invalid_threshold");
    }

    proptest! {
        #[test]
        fn prop_reserved_iff_guest(s in ".*") {
            prop_assert_eq!(is_reserved_tier_name(&s), s == "Guest");
        }

        #[test]
        fn prop_system_floor_is_zero(m in any::<i64>()) {
            prop_assert_eq!(is_valid_min_spend(m, true), m >= 0);
        }

        #[test]
        fn prop_user_floor_is_one(m in any::<i64>()) {
            prop_assert_eq!(is_valid_min_spend(m, false), m >= 1);
        }

        #[test]
        fn prop_valid_user_tiers_round_trip(name in "[A-Za-z][A-Za-z ]{0,15}", m in 1i64..1_000_000) {
            prop_assume!(name.trim() != "Guest");
            let tier = Tier::user(name, m);
            prop_assert_eq!(validate_tier_definition(tier.clone()), Ok(tier));
        }
    }
}
