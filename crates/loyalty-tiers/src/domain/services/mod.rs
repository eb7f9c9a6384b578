//! Domain services module
//!
//! Tier classification over an unordered set of tiers. Tiers are sorted on
//! every call; nothing is cached between calls.

use std::cmp::Ordering;
use thiserror::Error;

use crate::domain::aggregates::Tier;
use crate::domain::value_objects::MinorUnits;

/// Classification failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    #[error("cumulative spend cannot be negative: {0}")]
    NegativeSpend(MinorUnits),
    #[error("tier set has no system tier")]
    MissingSystemTier,
    #[error("tier set has {0} system tiers, expected exactly one")]
    MultipleSystemTiers(usize),
    #[error("no tier qualifies for spend {0}")]
    NoQualifyingTier(MinorUnits),
}

/// Where a spend sits on the tier ladder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierProgress<'a> {
    /// Tier the spend qualifies for
    pub current: &'a Tier,
    /// Next tier up, if any
    pub next: Option<&'a Tier>,
    /// Spend still needed to reach `next`
    pub remaining: Option<MinorUnits>,
}

/// Classification order: `min_spend` ascending; among equal thresholds the
/// system tier first, then oldest first, then input order.
fn classification_order(a: &Tier, b: &Tier) -> Ordering {
    a.min_spend()
        .cmp(&b.min_spend())
        .then_with(|| b.is_system().cmp(&a.is_system()))
        .then_with(|| a.created_at().cmp(&b.created_at()))
}

/// Sort tiers for display and classification
pub fn ordered_tiers<'a>(tiers: impl IntoIterator<Item = &'a Tier>) -> Vec<&'a Tier> {
    let mut ordered: Vec<&Tier> = tiers.into_iter().collect();
    // stable: equal keys keep input order
    ordered.sort_by(|a, b| classification_order(a, b));
    ordered
}

/// Assign the highest tier whose `min_spend` does not exceed `cumulative_spend`
///
/// Colliding thresholds resolve to the non-system tier, then the most
/// recently created, then the one given last.
pub fn classify_tier<'a>(
    tiers: impl IntoIterator<Item = &'a Tier>,
    cumulative_spend: impl Into<MinorUnits>,
) -> Result<&'a Tier, ClassificationError> {
    let ordered = ordered_tiers(tiers);
    classify_ordered(&ordered, cumulative_spend.into())
}

fn classify_ordered<'a>(
    ordered: &[&'a Tier],
    spend: MinorUnits,
) -> Result<&'a Tier, ClassificationError> {
    if spend.is_negative() {
        return Err(ClassificationError::NegativeSpend(spend));
    }

    match ordered.iter().filter(|t| t.is_system()).count() {
        0 => return Err(ClassificationError::MissingSystemTier),
        1 => {}
        n => return Err(ClassificationError::MultipleSystemTiers(n)),
    }

    ordered
        .iter()
        .rev()
        .find(|t| t.min_spend() <= spend)
        .copied()
        .ok_or(ClassificationError::NoQualifyingTier(spend))
}

/// Current tier, the next tier up and the spend left to reach it
pub fn tier_progress<'a>(
    tiers: impl IntoIterator<Item = &'a Tier>,
    cumulative_spend: impl Into<MinorUnits>,
) -> Result<TierProgress<'a>, ClassificationError> {
    let spend = cumulative_spend.into();
    let ordered = ordered_tiers(tiers);
    let current = classify_ordered(&ordered, spend)?;

    let next = match ordered.iter().find(|t| t.min_spend() > spend) {
        // the tier a customer lands in on reaching that threshold
        Some(t) => Some(classify_ordered(&ordered, t.min_spend())?),
        None => None,
    };
    let remaining = next.map(|t| MinorUnits::new(t.min_spend().value() - spend.value()));

    Ok(TierProgress { current, next, remaining })
}
