//! In-memory repository implementations for testing

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::domain::aggregates::{Customer, LoyaltyProgram};
use crate::domain::value_objects::EntityId;
use crate::domain::LoyaltyEvent;
use crate::ports::outbound::{CustomerRepository, EventPublisher, LoyaltyProgramRepository, RepositoryError};

fn stale(kind: &str, id: &EntityId, stored: u64, given: u64) -> RepositoryError {
    RepositoryError::Conflict(format!("{} {} is at version {}, write was based on {}", kind, id, stored, given))
}

/// In-memory loyalty program repository (for testing)
///
/// Saves are compare-and-set on the program version.
#[derive(Default)]
pub struct InMemoryLoyaltyProgramRepository {
    programs: DashMap<String, LoyaltyProgram>,
    /// tenant id -> program id
    tenants: DashMap<String, String>,
}

impl InMemoryLoyaltyProgramRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoyaltyProgramRepository for InMemoryLoyaltyProgramRepository {
    async fn find_by_id(&self, id: &EntityId) -> Result<Option<LoyaltyProgram>, RepositoryError> {
        Ok(self.programs.get(id.as_str()).map(|p| p.value().clone()))
    }

    async fn find_by_tenant(&self, tenant_id: &EntityId) -> Result<Option<LoyaltyProgram>, RepositoryError> {
        let program_id = match self.tenants.get(tenant_id.as_str()) {
            Some(id) => id.value().clone(),
            None => return Ok(None),
        };
        Ok(self.programs.get(&program_id).map(|p| p.value().clone()))
    }

    async fn save(&self, program: &LoyaltyProgram) -> Result<(), RepositoryError> {
        // lock order: tenant slot, then program slot
        let tenant_slot = self.tenants.entry(program.tenant_id().to_string());
        if let Entry::Occupied(owner) = &tenant_slot {
            if owner.get() != program.id().as_str() {
                return Err(RepositoryError::DuplicateKey(format!("tenant {}", program.tenant_id())));
            }
        }

        match self.programs.entry(program.id().to_string()) {
            Entry::Occupied(mut stored) => {
                if stored.get().version() != program.version() {
                    return Err(stale("program", program.id(), stored.get().version(), program.version()));
                }
                stored.insert(program.committed());
            }
            Entry::Vacant(slot) => {
                if program.version() != 0 {
                    return Err(RepositoryError::NotFound);
                }
                slot.insert(program.committed());
            }
        }

        if let Entry::Vacant(slot) = tenant_slot {
            slot.insert(program.id().to_string());
        }
        Ok(())
    }
}

/// In-memory customer repository (for testing)
///
/// Saves are compare-and-set on the customer version.
#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: DashMap<String, Customer>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn find_by_id(&self, id: &EntityId) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.customers.get(id.as_str()).map(|c| c.value().clone()))
    }

    async fn find_by_tenant(&self, tenant_id: &EntityId) -> Result<Vec<Customer>, RepositoryError> {
        Ok(self
            .customers
            .iter()
            .filter(|c| c.tenant_id() == tenant_id)
            .map(|c| c.value().clone())
            .collect())
    }

    async fn save(&self, customer: &Customer) -> Result<(), RepositoryError> {
        match self.customers.entry(customer.id().to_string()) {
            Entry::Occupied(mut stored) => {
                if stored.get().version() != customer.version() {
                    return Err(stale("customer", customer.id(), stored.get().version(), customer.version()));
                }
                stored.insert(customer.committed());
            }
            Entry::Vacant(slot) => {
                // deleted since it was loaded
                if customer.version() != 0 {
                    return Err(RepositoryError::NotFound);
                }
                slot.insert(customer.committed());
            }
        }
        Ok(())
    }

    async fn delete(&self, id: &EntityId) -> Result<(), RepositoryError> {
        self.customers
            .remove(id.as_str())
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

/// No-op event publisher for testing
#[derive(Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _events: Vec<LoyaltyEvent>) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Event publisher that keeps everything it is given
#[derive(Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<LoyaltyEvent>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Published event type names, oldest first
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|e| e.event_type()).collect()
    }

    pub fn take(&self) -> Vec<LoyaltyEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, events: Vec<LoyaltyEvent>) -> Result<(), RepositoryError> {
        self.events.lock().extend(events);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::MinorUnits;

    #[tokio::test]
    async fn test_program_repository_save_and_find() {
        let repo = InMemoryLoyaltyProgramRepository::new();
        let tenant_id = EntityId::new();
        let mut program = LoyaltyProgram::create(tenant_id.clone(), "#9CA3AF");
        program.add_tier("Gold", MinorUnits::new(1000), None, 10).unwrap();

        repo.save(&program).await.unwrap();

        let found = repo.find_by_tenant(&tenant_id).await.unwrap().unwrap();
        assert_eq!(found.id(), program.id());
        assert_eq!(found.user_tiers().len(), 1);
        assert!(repo.find_by_id(program.id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_second_program_for_tenant_rejected() {
        let repo = InMemoryLoyaltyProgramRepository::new();
        let tenant_id = EntityId::new();
        repo.save(&LoyaltyProgram::create(tenant_id.clone(), "#9CA3AF")).await.unwrap();

        let result = repo.save(&LoyaltyProgram::create(tenant_id, "#9CA3AF")).await;
        assert!(matches!(result, Err(RepositoryError::DuplicateKey(_))));
    }

    #[tokio::test]
    async fn test_stale_program_write_rejected() {
        let repo = InMemoryLoyaltyProgramRepository::new();
        let tenant_id = EntityId::new();
        repo.save(&LoyaltyProgram::create(tenant_id.clone(), "#9CA3AF")).await.unwrap();

        let mut first = repo.find_by_tenant(&tenant_id).await.unwrap().unwrap();
        let mut second = first.clone();
        assert_eq!(first.version(), 1);

        first.add_tier("Gold", MinorUnits::new(1000), None, 10).unwrap();
        second.add_tier("VIP", MinorUnits::new(5000), None, 10).unwrap();

        repo.save(&first).await.unwrap();
        assert!(matches!(repo.save(&second).await, Err(RepositoryError::Conflict(_))));

        let stored = repo.find_by_tenant(&tenant_id).await.unwrap().unwrap();
        assert_eq!(stored.version(), 2);
        let names: Vec<&str> = stored.user_tiers().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["Gold"]);
    }

    #[tokio::test]
    async fn test_stale_customer_write_rejected() {
        let repo = InMemoryCustomerRepository::new();
        let program = LoyaltyProgram::create(EntityId::new(), "#9CA3AF");
        let ada = Customer::register(program.tenant_id().clone(), "Ada", &program).unwrap();
        repo.save(&ada).await.unwrap();

        let mut first = repo.find_by_id(ada.id()).await.unwrap().unwrap();
        let mut second = first.clone();
        first.record_purchase(MinorUnits::new(100), &program).unwrap();
        second.record_purchase(MinorUnits::new(250), &program).unwrap();

        repo.save(&first).await.unwrap();
        assert!(matches!(repo.save(&second).await, Err(RepositoryError::Conflict(_))));

        let stored = repo.find_by_id(ada.id()).await.unwrap().unwrap();
        assert_eq!(stored.cumulative_spend(), MinorUnits::new(100));
        assert_eq!(stored.version(), 2);
    }

    #[tokio::test]
    async fn test_saving_deleted_customer_fails() {
        let repo = InMemoryCustomerRepository::new();
        let program = LoyaltyProgram::create(EntityId::new(), "#9CA3AF");
        let ada = Customer::register(program.tenant_id().clone(), "Ada", &program).unwrap();
        repo.save(&ada).await.unwrap();

        let loaded = repo.find_by_id(ada.id()).await.unwrap().unwrap();
        repo.delete(ada.id()).await.unwrap();
        assert_eq!(repo.save(&loaded).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_noop_publisher_accepts_events() {
        let publisher = NoOpEventPublisher;
        let mut program = LoyaltyProgram::create(EntityId::new(), "#9CA3AF");
        assert!(publisher.publish(program.take_events()).await.is_ok());
    }

    #[tokio::test]
    async fn test_customer_repository_by_tenant() {
        let repo = InMemoryCustomerRepository::new();
        let program = LoyaltyProgram::create(EntityId::new(), "#9CA3AF");
        let other = LoyaltyProgram::create(EntityId::new(), "#9CA3AF");

        let ada = Customer::register(program.tenant_id().clone(), "Ada", &program).unwrap();
        let bola = Customer::register(program.tenant_id().clone(), "Bola", &program).unwrap();
        let chidi = Customer::register(other.tenant_id().clone(), "Chidi", &other).unwrap();
        for c in [&ada, &bola, &chidi] {
            repo.save(c).await.unwrap();
        }

        assert_eq!(repo.find_by_tenant(program.tenant_id()).await.unwrap().len(), 2);

        repo.delete(ada.id()).await.unwrap();
        assert!(repo.find_by_id(ada.id()).await.unwrap().is_none());
        assert_eq!(repo.delete(ada.id()).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_recording_publisher() {
        let publisher = RecordingEventPublisher::new();
        let mut program = LoyaltyProgram::create(EntityId::new(), "#9CA3AF");
        publisher.publish(program.take_events()).await.unwrap();

        assert_eq!(publisher.event_types(), vec!["program.created"]);
        assert_eq!(publisher.take().len(), 1);
        assert!(publisher.event_types().is_empty());
    }
}
