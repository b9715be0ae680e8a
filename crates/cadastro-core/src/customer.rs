//! Customer aggregate root.
//!
//! A [`Customer`] can only be obtained through [`Customer::new`], which runs
//! the full rule set over a [`CustomerDraft`] and aggregates every violation.
//! Document formats follow Brazilian conventions: CPF `###.###.###-##`,
//! RG `#.###.###-#` or `##.###.###-#` (final digit may be `X`).

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;

use crate::error::{RuleCheck, ValidationError};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex"));
static CPF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}\.\d{3}\.\d{3}-\d{2}$").expect("invalid cpf regex"));
static RG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}\.\d{3}\.\d{3}-[0-9Xx]$").expect("invalid rg regex"));

/// Raw customer data before validation.
///
/// This is the untrusted side of the draft/entity boundary: request bodies
/// and storage rows deserialize into a draft, and [`Customer::new`] is the
/// only path from here to a usable entity.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDraft {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    /// Argon2id PHC string. `None` marks a non-privileged customer —
    /// plaintext never reaches this type.
    pub password_hash: Option<String>,
    pub birthday: NaiveDate,
    pub cpf: String,
    pub rg: String,
    pub phone: String,
}

/// A validated customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    id: Option<i64>,
    name: String,
    email: String,
    password_hash: Option<String>,
    birthday: NaiveDate,
    cpf: String,
    rg: String,
    phone: String,
}

impl Customer {
    /// Validate a draft against every customer rule.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] carrying one message per violated rule:
    /// name and phone non-empty, email well-formed, CPF and RG pattern
    /// conformance, birthday not after the current UTC date.
    pub fn new(draft: CustomerDraft) -> Result<Self, ValidationError> {
        Self::new_at(draft, chrono::Utc::now().date_naive())
    }

    /// Like [`Customer::new`] with an explicit "today" for the birthday rule.
    pub fn new_at(draft: CustomerDraft, today: NaiveDate) -> Result<Self, ValidationError> {
        let mut check = RuleCheck::default();

        check.require(!draft.name.trim().is_empty(), "Name is required.");
        check.require(EMAIL_RE.is_match(&draft.email), "Invalid email format.");
        check.require(
            CPF_RE.is_match(&draft.cpf),
            "Invalid CPF format. Expected: ###.###.###-##.",
        );
        check.require(
            RG_RE.is_match(&draft.rg),
            "Invalid RG format. Expected: #.###.###-# or ##.###.###-#.",
        );
        check.require(!draft.phone.trim().is_empty(), "Phone number is required.");
        check.require(draft.birthday <= today, "Birthday cannot be in the future.");
        check.finish()?;

        Ok(Self {
            id: draft.id,
            name: draft.name,
            email: draft.email,
            password_hash: draft.password_hash.filter(|h| !h.is_empty()),
            birthday: draft.birthday,
            cpf: draft.cpf,
            rg: draft.rg,
            phone: draft.phone,
        })
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Attach the storage-assigned identity.
    pub fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Stored Argon2id hash; `None` for non-privileged customers.
    pub fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    pub fn birthday(&self) -> NaiveDate {
        self.birthday
    }

    pub fn cpf(&self) -> &str {
        &self.cpf
    }

    pub fn rg(&self) -> &str {
        &self.rg
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }
}
