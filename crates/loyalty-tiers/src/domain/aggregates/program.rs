//! Loyalty Program Aggregate
//!
//! One per tenant. Owns the tenant's tier set: the seeded system tier plus any
//! number of user tiers, unique by name and by threshold.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::aggregates::tier::{Tier, DEFAULT_USER_TIER_COLOR};
use crate::domain::events::{LoyaltyEvent, ProgramEvent};
use crate::domain::rules::{self, ValidationError};
use crate::domain::services::{self, ClassificationError, TierProgress};
use crate::domain::value_objects::{EntityId, MinorUnits};

/// Loyalty program aggregate root
#[derive(Clone, Debug)]
pub struct LoyaltyProgram {
    id: EntityId,
    tenant_id: EntityId,
    version: u64,
    system_tier: Tier,
    user_tiers: Vec<Tier>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<LoyaltyEvent>,
}

/// Partial edit of a tier
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TierChanges {
    pub name: Option<String>,
    pub min_spend: Option<MinorUnits>,
    pub color: Option<String>,
}

impl LoyaltyProgram {
    /// Create a program for a tenant, seeding the system tier
    pub fn create(tenant_id: EntityId, guest_color: impl Into<String>) -> Self {
        let now = Utc::now();
        let id = EntityId::new();
        let system_tier = Tier::system().with_color(guest_color).with_created_at(now);

        let mut program = Self {
            id: id.clone(),
            tenant_id: tenant_id.clone(),
            version: 0,
            system_tier: system_tier.clone(),
            user_tiers: vec![],
            created_at: now,
            updated_at: now,
            events: vec![],
        };

        program.raise_event(LoyaltyEvent::Program(ProgramEvent::Created {
            program_id: id,
            tenant_id,
            system_tier_id: system_tier.id().clone(),
            created_at: now,
        }));

        program
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn id(&self) -> &EntityId { &self.id }
    pub fn tenant_id(&self) -> &EntityId { &self.tenant_id }
    /// Last stored version; 0 until first saved
    pub fn version(&self) -> u64 { self.version }
    pub fn system_tier(&self) -> &Tier { &self.system_tier }
    pub fn user_tiers(&self) -> &[Tier] { &self.user_tiers }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Every tier, system tier first, in insertion order
    pub fn tiers(&self) -> impl Iterator<Item = &Tier> + Clone {
        std::iter::once(&self.system_tier).chain(self.user_tiers.iter())
    }

    /// Tiers in classification order (lowest threshold first)
    pub fn ordered_tiers(&self) -> Vec<&Tier> {
        services::ordered_tiers(self.tiers())
    }

    pub fn find_tier(&self, tier_id: &EntityId) -> Option<&Tier> {
        self.tiers().find(|t| t.id() == tier_id)
    }

    pub fn classify(&self, cumulative_spend: MinorUnits) -> Result<&Tier, ClassificationError> {
        services::classify_tier(self.tiers(), cumulative_spend)
    }

    pub fn progress(&self, cumulative_spend: MinorUnits) -> Result<TierProgress<'_>, ClassificationError> {
        services::tier_progress(self.tiers(), cumulative_spend)
    }

    // =========================================================================
    // Business Operations
    // =========================================================================

    /// Add a user tier
    pub fn add_tier(
        &mut self,
        name: impl Into<String>,
        min_spend: MinorUnits,
        color: Option<String>,
        max_user_tiers: usize,
    ) -> Result<Tier, ProgramError> {
        if self.user_tiers.len() >= max_user_tiers {
            return Err(ProgramError::TierLimitReached(max_user_tiers));
        }

        let color = color.unwrap_or_else(|| DEFAULT_USER_TIER_COLOR.to_string());
        let tier = rules::validate_tier_definition(Tier::user(name, min_spend).with_color(color))?;
        self.ensure_unique(&tier, None)?;

        self.user_tiers.push(tier.clone());
        self.touch();

        self.raise_event(LoyaltyEvent::Program(ProgramEvent::TierAdded {
            program_id: self.id.clone(),
            tier_id: tier.id().clone(),
            name: tier.name().to_string(),
            min_spend: tier.min_spend(),
        }));

        Ok(tier)
    }

    /// Edit a tier. The system tier only accepts color changes.
    pub fn update_tier(&mut self, tier_id: &EntityId, changes: TierChanges) -> Result<Tier, ProgramError> {
        let existing = self
            .find_tier(tier_id)
            .cloned()
            .ok_or_else(|| ProgramError::TierNotFound(tier_id.clone()))?;

        let mut proposed = existing.clone();
        if let Some(name) = changes.name {
            proposed.rename(name);
        }
        if let Some(min_spend) = changes.min_spend {
            proposed.set_min_spend(min_spend);
        }
        if let Some(color) = changes.color {
            proposed.set_color(color);
        }

        let updated = rules::validate_tier_update(&existing, proposed)?;
        self.ensure_unique(&updated, Some(tier_id))?;

        if updated.is_system() {
            self.system_tier = updated.clone();
        } else if let Some(slot) = self.user_tiers.iter_mut().find(|t| t.id() == tier_id) {
            *slot = updated.clone();
        }
        self.touch();

        self.raise_event(LoyaltyEvent::Program(ProgramEvent::TierUpdated {
            program_id: self.id.clone(),
            tier_id: tier_id.clone(),
            previous_name: existing.name().to_string(),
            name: updated.name().to_string(),
            previous_min_spend: existing.min_spend(),
            min_spend: updated.min_spend(),
        }));

        Ok(updated)
    }

    /// Delete a user tier
    pub fn remove_tier(&mut self, tier_id: &EntityId) -> Result<Tier, ProgramError> {
        if self.system_tier.id() == tier_id {
            return Err(ValidationError::ImmutableSystemTier.into());
        }

        let position = self
            .user_tiers
            .iter()
            .position(|t| t.id() == tier_id)
            .ok_or_else(|| ProgramError::TierNotFound(tier_id.clone()))?;

        let removed = self.user_tiers.remove(position);
        self.touch();

        self.raise_event(LoyaltyEvent::Program(ProgramEvent::TierRemoved {
            program_id: self.id.clone(),
            tier_id: removed.id().clone(),
            name: removed.name().to_string(),
        }));

        Ok(removed)
    }

    fn ensure_unique(&self, candidate: &Tier, ignore: Option<&EntityId>) -> Result<(), ProgramError> {
        for tier in self.tiers().filter(|t| Some(t.id()) != ignore) {
            if tier.name() == candidate.name() {
                return Err(ProgramError::DuplicateName(candidate.name().to_string()));
            }
            if tier.min_spend() == candidate.min_spend() {
                return Err(ProgramError::DuplicateThreshold {
                    min_spend: candidate.min_spend(),
                    existing: tier.name().to_string(),
                });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Domain Events
    // =========================================================================

    /// Get and clear accumulated domain events
    pub fn take_events(&mut self) -> Vec<LoyaltyEvent> {
        std::mem::take(&mut self.events)
    }

    /// The copy a repository stores: next version, no pending events
    pub(crate) fn committed(&self) -> Self {
        Self {
            version: self.version + 1,
            events: vec![],
            ..self.clone()
        }
    }

    fn raise_event(&mut self, event: LoyaltyEvent) {
        self.events.push(event);
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a tier named '{0}' already exists")]
    DuplicateName(String),
    #[error("tier '{existing}' already uses minimum spend {min_spend}")]
    DuplicateThreshold { min_spend: MinorUnits, existing: String },
    #[error("tier not found: {0}")]
    TierNotFound(EntityId),
    #[error("tier limit reached ({0} user tiers)")]
    TierLimitReached(usize),
}
