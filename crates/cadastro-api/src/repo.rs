//! # Repository Contracts
//!
//! Storage contracts consumed by the service layer, plus the in-memory
//! implementations used when `DATABASE_URL` is unset and by the test suite.
//! The Postgres implementations live in [`crate::db`].
//!
//! Repositories take and return validated entities only; drafts never reach
//! this layer. Existence preconditions (fail-fast batch removal, not-found
//! before update) are service-layer concerns — repository operations are
//! plain storage primitives.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use cadastro_core::{Address, Customer};
use parking_lot::RwLock;

use crate::error::AppResult;

/// Storage contract for the customer aggregate root.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Persist a new customer and return the assigned id.
    async fn create(&self, customer: &Customer) -> AppResult<i64>;

    /// Full-replacement update. Email and password are immutable here.
    async fn update(&self, customer: &Customer) -> AppResult<()>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Customer>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Customer>>;

    /// All customers in id order.
    async fn list(&self) -> AppResult<Vec<Customer>>;

    async fn remove(&self, id: i64) -> AppResult<()>;
}

/// Storage contract for addresses owned by a customer.
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Bulk insert bound to one customer; returns the entities with their
    /// storage-assigned ids.
    async fn create_many(&self, customer_id: i64, addresses: &[Address])
        -> AppResult<Vec<Address>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Address>>;

    /// All addresses for a customer in id order; empty when none.
    async fn find_by_customer_id(&self, customer_id: i64) -> AppResult<Vec<Address>>;

    /// Bulk full-replacement update by id.
    async fn update_many(&self, addresses: &[Address]) -> AppResult<()>;

    async fn remove(&self, id: i64) -> AppResult<()>;

    async fn remove_many(&self, ids: &[i64]) -> AppResult<()>;

    async fn remove_all_by_customer_id(&self, customer_id: i64) -> AppResult<()>;
}

// ─── In-memory implementations ───────────────────────────────────────

/// In-memory customer store: a `HashMap` behind an `RwLock` with a
/// monotonically increasing id counter. Dev-mode and test backing store.
pub struct InMemoryCustomerRepository {
    rows: RwLock<HashMap<i64, Customer>>,
    next_id: AtomicI64,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn create(&self, customer: &Customer) -> AppResult<i64> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut stored = customer.clone();
        stored.set_id(id);
        self.rows.write().insert(id, stored);
        Ok(id)
    }

    async fn update(&self, customer: &Customer) -> AppResult<()> {
        if let Some(id) = customer.id() {
            let mut rows = self.rows.write();
            if rows.contains_key(&id) {
                rows.insert(id, customer.clone());
            }
        }
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Customer>> {
        Ok(self.rows.read().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Customer>> {
        Ok(self
            .rows
            .read()
            .values()
            .find(|c| c.email() == email)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<Customer>> {
        let mut customers: Vec<Customer> = self.rows.read().values().cloned().collect();
        customers.sort_by_key(Customer::id);
        Ok(customers)
    }

    async fn remove(&self, id: i64) -> AppResult<()> {
        self.rows.write().remove(&id);
        Ok(())
    }
}

/// In-memory address store, same shape as the customer store.
pub struct InMemoryAddressRepository {
    rows: RwLock<HashMap<i64, Address>>,
    next_id: AtomicI64,
}

impl InMemoryAddressRepository {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl AddressRepository for InMemoryAddressRepository {
    async fn create_many(
        &self,
        _customer_id: i64,
        addresses: &[Address],
    ) -> AppResult<Vec<Address>> {
        let mut rows = self.rows.write();
        let mut created = Vec::with_capacity(addresses.len());
        for address in addresses {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            let mut stored = address.clone();
            stored.set_id(id);
            rows.insert(id, stored.clone());
            created.push(stored);
        }
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Address>> {
        Ok(self.rows.read().get(&id).cloned())
    }

    async fn find_by_customer_id(&self, customer_id: i64) -> AppResult<Vec<Address>> {
        let mut addresses: Vec<Address> = self
            .rows
            .read()
            .values()
            .filter(|a| a.customer_id() == customer_id)
            .cloned()
            .collect();
        addresses.sort_by_key(Address::id);
        Ok(addresses)
    }

    async fn update_many(&self, addresses: &[Address]) -> AppResult<()> {
        let mut rows = self.rows.write();
        for address in addresses {
            if let Some(id) = address.id() {
                if rows.contains_key(&id) {
                    rows.insert(id, address.clone());
                }
            }
        }
        Ok(())
    }

    async fn remove(&self, id: i64) -> AppResult<()> {
        self.rows.write().remove(&id);
        Ok(())
    }

    async fn remove_many(&self, ids: &[i64]) -> AppResult<()> {
        let mut rows = self.rows.write();
        for id in ids {
            rows.remove(id);
        }
        Ok(())
    }

    async fn remove_all_by_customer_id(&self, customer_id: i64) -> AppResult<()> {
        self.rows
            .write()
            .retain(|_, address| address.customer_id() != customer_id);
        Ok(())
    }
}
