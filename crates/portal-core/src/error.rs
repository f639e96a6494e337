//! Domain-level error types.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Invalid input: {0}")]
    Invalid(ValidationErrors),

    #[error(transparent)]
    Repository(#[from] RepoError),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity_type, id }
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Invalid(errors)
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Field-level validation failures, keyed by input field name.
///
/// Errors that concern the submission as a whole (for example a title that
/// repeats the body) are collected under `non_field`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub fields: BTreeMap<String, Vec<String>>,
    pub non_field: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_field(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Return `value` when no error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    /// Flatten into `field: message` strings, non-field messages first.
    pub fn messages(&self) -> Vec<String> {
        self.non_field
            .iter()
            .cloned()
            .chain(self.fields.iter().flat_map(|(field, messages)| {
                messages.iter().map(move |m| format!("{field}: {m}"))
            }))
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_put_non_field_errors_first() {
        let mut errors = ValidationErrors::new();
        errors.add_field("title", "This field is required.");
        errors.add_non_field("post text must not be identical to the title");

        assert_eq!(
            errors.messages(),
            vec![
                "post text must not be identical to the title".to_string(),
                "title: This field is required.".to_string(),
            ]
        );
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ValidationErrors::new().into_result(7), Ok(7));

        let mut errors = ValidationErrors::new();
        errors.add_field("category", "bad");
        assert!(errors.into_result(7).is_err());
    }
}
