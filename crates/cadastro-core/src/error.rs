//! Aggregated validation errors.

use thiserror::Error;

/// Every rule an entity constructor found violated, collected into one error.
///
/// `Display` joins the individual messages with spaces; callers that need the
/// per-rule breakdown (e.g. an HTTP `errors` envelope) use [`violations`].
///
/// [`violations`]: ValidationError::violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .violations.join(" "))]
pub struct ValidationError {
    violations: Vec<String>,
}

impl ValidationError {
    /// Build from a non-empty list of rule violations.
    pub fn new(violations: Vec<String>) -> Self {
        debug_assert!(!violations.is_empty());
        Self { violations }
    }

    /// One message per violated rule, in rule-declaration order.
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Consume the error, yielding the violation messages.
    pub fn into_violations(self) -> Vec<String> {
        self.violations
    }
}

/// Accumulator used by entity constructors.
///
/// Collects rule violations and converts to `Result` at the end, so a single
/// construction reports every failed rule rather than short-circuiting.
#[derive(Debug, Default)]
pub(crate) struct RuleCheck {
    violations: Vec<String>,
}

impl RuleCheck {
    pub(crate) fn require(&mut self, ok: bool, message: &str) {
        if !ok {
            self.violations.push(message.to_string());
        }
    }

    pub(crate) fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.violations))
        }
    }
}
