//! # cadastro-core — Domain Entities for the Cadastro Registry
//!
//! Validated domain types for the customer registry. The crate draws a hard
//! line between *drafts* (raw, deserialized input) and *entities* (validated
//! aggregates): the only way to obtain a [`Customer`] or an [`Address`] is
//! through a constructor that runs the full rule set and reports every
//! violation at once.
//!
//! ## Aggregate Model
//!
//! [`Customer`] is the aggregate root; [`Address`] records are owned by
//! exactly one customer and are never addressable across customers. Identity
//! (`id`) is absent until the storage layer assigns it.
//!
//! ## Validation Contract
//!
//! Constructors collect one human-readable message per violated rule into a
//! single [`ValidationError`] — a caller can surface every problem to an end
//! user in one round trip instead of fixing fields one at a time.

pub mod address;
pub mod customer;
pub mod error;
pub mod password;

pub use address::{Address, AddressDraft};
pub use customer::{Customer, CustomerDraft};
pub use error::ValidationError;
