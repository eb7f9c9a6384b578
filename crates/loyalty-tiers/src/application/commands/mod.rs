//! Command handlers
//!
//! Application services that orchestrate use cases.

use std::sync::Arc;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::application::dto::*;
use crate::config::LoyaltyConfig;
use crate::domain::aggregates::{Customer, LoyaltyProgram, TierChanges};
use crate::domain::value_objects::{EntityId, MinorUnits};
use crate::domain::LoyaltyEvent;
use crate::ports::inbound::{CustomerUseCases, TierUseCases, UseCaseError};
use crate::ports::outbound::{CustomerRepository, EventPublisher, LoyaltyProgramRepository};

async fn load_program(
    repo: &dyn LoyaltyProgramRepository,
    tenant_id: &EntityId,
) -> Result<LoyaltyProgram, UseCaseError> {
    repo.find_by_tenant(tenant_id)
        .await?
        .ok_or_else(|| UseCaseError::NotFound(format!("loyalty program for tenant {}", tenant_id)))
}

async fn publish(publisher: &dyn EventPublisher, events: Vec<LoyaltyEvent>) -> Result<(), UseCaseError> {
    if events.is_empty() {
        return Ok(());
    }
    debug!(count = events.len(), "Publishing loyalty events");
    publisher.publish(events).await?;
    Ok(())
}

fn build_badge(
    customer: &Customer,
    program: &LoyaltyProgram,
    config: &LoyaltyConfig,
) -> Result<CustomerTierBadge, UseCaseError> {
    let progress = program.progress(customer.cumulative_spend())?;
    let scale = config.minor_unit_scale;

    Ok(CustomerTierBadge {
        customer_id: customer.id().to_string(),
        customer_name: customer.name().to_string(),
        tier: TierView::from_tier(progress.current, scale),
        currency: config.currency.clone(),
        cumulative_spend: customer.cumulative_spend().value(),
        cumulative_spend_display: customer.cumulative_spend().to_decimal(scale),
        next_tier: progress.next.map(|t| t.name().to_string()),
        spend_to_next_tier: progress.remaining.map(MinorUnits::value),
    })
}

/// Tier management application service
pub struct TierService {
    program_repo: Arc<dyn LoyaltyProgramRepository>,
    customer_repo: Arc<dyn CustomerRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    config: LoyaltyConfig,
}

impl TierService {
    pub fn new(
        program_repo: Arc<dyn LoyaltyProgramRepository>,
        customer_repo: Arc<dyn CustomerRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        config: LoyaltyConfig,
    ) -> Self {
        Self {
            program_repo,
            customer_repo,
            event_publisher,
            config,
        }
    }

    async fn commit(&self, program: &mut LoyaltyProgram) -> Result<(), UseCaseError> {
        let events = program.take_events();
        self.program_repo.save(program).await?;
        publish(self.event_publisher.as_ref(), events).await
    }

    /// Move every customer of the tenant onto the tier their spend now earns
    ///
    /// Runs after the program is committed. A failure stops the pass and
    /// leaves the remaining customers on their previous tier until they are
    /// next reclassified.
    async fn reclassify_customers(&self, program: &LoyaltyProgram) -> Result<usize, UseCaseError> {
        let customers = self.customer_repo.find_by_tenant(program.tenant_id()).await?;
        let total = customers.len();
        let mut moved = 0;

        for (done, mut customer) in customers.into_iter().enumerate() {
            match self.reclassify_customer(&mut customer, program).await {
                Ok(true) => moved += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        tenant_id = %program.tenant_id(),
                        customer_id = %customer.id(),
                        reclassified = done,
                        total,
                        error = %e,
                        "Customer reclassification stopped partway"
                    );
                    return Err(e);
                }
            }
        }

        if moved > 0 {
            info!(tenant_id = %program.tenant_id(), moved, "Customers reclassified after tier change");
        }
        Ok(moved)
    }

    async fn reclassify_customer(&self, customer: &mut Customer, program: &LoyaltyProgram) -> Result<bool, UseCaseError> {
        let changed = customer.reclassify(program)?;
        let events = customer.take_events();
        self.customer_repo.save(customer).await?;
        publish(self.event_publisher.as_ref(), events).await?;
        Ok(changed)
    }
}

#[async_trait]
impl TierUseCases for TierService {
    async fn initialize_program(&self, tenant_id: &EntityId) -> Result<LoyaltyProgram, UseCaseError> {
        if self.program_repo.find_by_tenant(tenant_id).await?.is_some() {
            return Err(UseCaseError::Conflict(format!("tenant {} already has a loyalty program", tenant_id)));
        }

        let mut program = LoyaltyProgram::create(tenant_id.clone(), self.config.guest_color.clone());
        self.commit(&mut program).await?;

        info!(tenant_id = %tenant_id, program_id = %program.id(), "Loyalty program initialized");
        Ok(program)
    }

    async fn create_tier(&self, command: CreateTierCommand) -> Result<TierView, UseCaseError> {
        let tenant_id = EntityId::from_string(&command.tenant_id);
        let mut program = load_program(self.program_repo.as_ref(), &tenant_id).await?;

        let tier = program
            .add_tier(
                command.name,
                MinorUnits::new(command.min_spend),
                command.color,
                self.config.max_user_tiers,
            )
            .map_err(|e| {
                warn!(tenant_id = %tenant_id, error = %e, "Tier rejected");
                UseCaseError::from(e)
            })?;

        self.commit(&mut program).await?;
        self.reclassify_customers(&program).await?;

        info!(tenant_id = %tenant_id, tier = tier.name(), min_spend = %tier.min_spend(), "Tier created");
        Ok(TierView::from_tier(&tier, self.config.minor_unit_scale))
    }

    async fn update_tier(&self, command: UpdateTierCommand) -> Result<TierView, UseCaseError> {
        let tenant_id = EntityId::from_string(&command.tenant_id);
        let tier_id = EntityId::from_string(&command.tier_id);
        let mut program = load_program(self.program_repo.as_ref(), &tenant_id).await?;

        let changes = TierChanges {
            name: command.name,
            min_spend: command.min_spend.map(MinorUnits::new),
            color: command.color,
        };

        let tier = program.update_tier(&tier_id, changes).map_err(|e| {
            warn!(tenant_id = %tenant_id, tier_id = %tier_id, error = %e, "Tier update rejected");
            UseCaseError::from(e)
        })?;

        self.commit(&mut program).await?;
        self.reclassify_customers(&program).await?;

        info!(tenant_id = %tenant_id, tier = tier.name(), "Tier updated");
        Ok(TierView::from_tier(&tier, self.config.minor_unit_scale))
    }

    async fn delete_tier(&self, tenant_id: &EntityId, tier_id: &EntityId) -> Result<(), UseCaseError> {
        let mut program = load_program(self.program_repo.as_ref(), tenant_id).await?;

        let removed = program.remove_tier(tier_id).map_err(|e| {
            warn!(tenant_id = %tenant_id, tier_id = %tier_id, error = %e, "Tier deletion rejected");
            UseCaseError::from(e)
        })?;

        self.commit(&mut program).await?;
        self.reclassify_customers(&program).await?;

        info!(tenant_id = %tenant_id, tier = removed.name(), "Tier deleted");
        Ok(())
    }

    async fn list_tiers(&self, tenant_id: &EntityId) -> Result<Vec<TierView>, UseCaseError> {
        let program = load_program(self.program_repo.as_ref(), tenant_id).await?;
        Ok(program
            .ordered_tiers()
            .into_iter()
            .map(|t| TierView::from_tier(t, self.config.minor_unit_scale))
            .collect())
    }

    async fn validate_tier(&self, command: CreateTierCommand) -> Result<TierView, UseCaseError> {
        let tenant_id = EntityId::from_string(&command.tenant_id);
        // dry run: the draft is never saved and its events are dropped
        let mut draft = load_program(self.program_repo.as_ref(), &tenant_id).await?;
        let tier = draft.add_tier(
            command.name,
            MinorUnits::new(command.min_spend),
            command.color,
            self.config.max_user_tiers,
        )?;

        Ok(TierView::from_tier(&tier, self.config.minor_unit_scale))
    }
}

/// Customer tier application service
pub struct CustomerService {
    program_repo: Arc<dyn LoyaltyProgramRepository>,
    customer_repo: Arc<dyn CustomerRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    config: LoyaltyConfig,
}

impl CustomerService {
    pub fn new(
        program_repo: Arc<dyn LoyaltyProgramRepository>,
        customer_repo: Arc<dyn CustomerRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        config: LoyaltyConfig,
    ) -> Self {
        Self {
            program_repo,
            customer_repo,
            event_publisher,
            config,
        }
    }

    async fn load_customer(&self, customer_id: &EntityId) -> Result<Customer, UseCaseError> {
        self.customer_repo
            .find_by_id(customer_id)
            .await?
            .ok_or_else(|| UseCaseError::NotFound(format!("customer {}", customer_id)))
    }

    async fn commit(&self, customer: &mut Customer) -> Result<(), UseCaseError> {
        let events = customer.take_events();
        self.customer_repo.save(customer).await?;
        publish(self.event_publisher.as_ref(), events).await
    }
}

#[async_trait]
impl CustomerUseCases for CustomerService {
    async fn register_customer(&self, command: RegisterCustomerCommand) -> Result<CustomerTierBadge, UseCaseError> {
        let tenant_id = EntityId::from_string(&command.tenant_id);
        let program = load_program(self.program_repo.as_ref(), &tenant_id).await?;

        let mut customer = Customer::register(tenant_id, command.name, &program)?;
        self.commit(&mut customer).await?;

        info!(customer_id = %customer.id(), tier = customer.tier_name(), "Customer registered");
        build_badge(&customer, &program, &self.config)
    }

    async fn record_purchase(&self, command: RecordSpendCommand) -> Result<CustomerTierBadge, UseCaseError> {
        let customer_id = EntityId::from_string(&command.customer_id);
        let mut customer = self.load_customer(&customer_id).await?;
        let program = load_program(self.program_repo.as_ref(), customer.tenant_id()).await?;

        let previous = customer.tier_name().to_string();
        let moved = customer.record_purchase(MinorUnits::new(command.amount), &program)?;
        self.commit(&mut customer).await?;

        if moved {
            info!(customer_id = %customer_id, from = %previous, to = customer.tier_name(), "Customer tier changed");
        }
        build_badge(&customer, &program, &self.config)
    }

    async fn record_refund(&self, command: RecordSpendCommand) -> Result<CustomerTierBadge, UseCaseError> {
        let customer_id = EntityId::from_string(&command.customer_id);
        let mut customer = self.load_customer(&customer_id).await?;
        let program = load_program(self.program_repo.as_ref(), customer.tenant_id()).await?;

        let previous = customer.tier_name().to_string();
        let moved = customer.record_refund(MinorUnits::new(command.amount), &program)?;
        self.commit(&mut customer).await?;

        if moved {
            info!(customer_id = %customer_id, from = %previous, to = customer.tier_name(), "Customer tier changed");
        }
        build_badge(&customer, &program, &self.config)
    }

    async fn get_tier_badge(&self, customer_id: &EntityId) -> Result<CustomerTierBadge, UseCaseError> {
        let customer = self.load_customer(customer_id).await?;
        let program = load_program(self.program_repo.as_ref(), customer.tenant_id()).await?;
        build_badge(&customer, &program, &self.config)
    }

    async fn tier_distribution(&self, tenant_id: &EntityId) -> Result<TierDistributionView, UseCaseError> {
        let program = load_program(self.program_repo.as_ref(), tenant_id).await?;
        let customers = self.customer_repo.find_by_tenant(tenant_id).await?;
        let scale = self.config.minor_unit_scale;

        let mut buckets: Vec<TierBucketView> = program
            .ordered_tiers()
            .into_iter()
            .map(|t| TierBucketView { tier: TierView::from_tier(t, scale), customer_count: 0 })
            .collect();

        for customer in &customers {
            let tier = program.classify(customer.cumulative_spend())?;
            if let Some(bucket) = buckets.iter_mut().find(|b| b.tier.id == tier.id().as_str()) {
                bucket.customer_count += 1;
            }
        }

        Ok(TierDistributionView {
            tenant_id: tenant_id.to_string(),
            total_customers: customers.len() as u64,
            tiers: buckets,
        })
    }
}
