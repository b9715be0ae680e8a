//! # API Route Modules
//!
//! - `customers` — customer lifecycle, existence checks, and credential
//!   validation. The credential and existence endpoints are on the public
//!   allowlist; everything else requires a bearer token.
//! - `addresses` — bulk create/replace/remove of the addresses owned by a
//!   customer.

pub mod addresses;
pub mod customers;
