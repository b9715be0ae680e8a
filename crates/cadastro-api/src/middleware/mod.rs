//! # Middleware Modules
//!
//! Tower middleware layers for the API service. Authentication lives in
//! [`crate::auth`]; this module holds the observability layers.

pub mod metrics;
