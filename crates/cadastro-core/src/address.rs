//! Address records owned by a customer.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{RuleCheck, ValidationError};

static ZIPCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}-\d{3}$").expect("invalid zipcode regex"));

/// Raw address data before validation.
///
/// The owning customer is not part of the draft; it is supplied by the caller
/// at construction time, usually from the request path.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressDraft {
    pub id: Option<i64>,
    pub street: String,
    pub number: String,
    pub zipcode: String,
    pub city: String,
    pub state: String,
}

/// A validated address, bound to exactly one customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    id: Option<i64>,
    customer_id: i64,
    street: String,
    number: String,
    zipcode: String,
    city: String,
    state: String,
}

impl Address {
    /// Validate a draft against every address rule.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] with one message per violated rule:
    /// street length in `[3, 256]`, number/city/state non-empty, zipcode
    /// matching `#####-###`.
    pub fn new(customer_id: i64, draft: AddressDraft) -> Result<Self, ValidationError> {
        let mut check = RuleCheck::default();

        if draft.street.is_empty() {
            check.require(false, "Street is required.");
        } else {
            check.require(draft.street.len() >= 3, "Street must be at least 3 characters.");
            check.require(
                draft.street.len() <= 256,
                "Street must be no more than 256 characters.",
            );
        }
        check.require(!draft.number.trim().is_empty(), "Number is required.");
        check.require(
            ZIPCODE_RE.is_match(&draft.zipcode),
            "Invalid postal code format. Expected format: #####-###.",
        );
        check.require(!draft.city.trim().is_empty(), "City is required.");
        check.require(!draft.state.trim().is_empty(), "State is required.");
        check.finish()?;

        Ok(Self {
            id: draft.id,
            customer_id,
            street: draft.street,
            number: draft.number,
            zipcode: draft.zipcode,
            city: draft.city,
            state: draft.state,
        })
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Attach the storage-assigned identity.
    pub fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    pub fn customer_id(&self) -> i64 {
        self.customer_id
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn zipcode(&self) -> &str {
        &self.zipcode
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }
}
