//! # Application Services
//!
//! Orchestration between validated entities and repositories. Services own
//! the cross-entity rules: address batches are bound to their customer,
//! existence preconditions run before destructive batch operations, and
//! customer removal cascades to addresses before the customer row goes.
//!
//! Repositories arrive through constructor injection (`Arc<dyn …>`), so the
//! same services run against Postgres in production and the in-memory
//! stores in tests.

pub mod addresses;
pub mod customers;

pub use addresses::{AddressService, AddressView};
pub use customers::{CustomerService, CustomerView};
