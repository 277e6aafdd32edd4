//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// lookups, malformed identifiers). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more fields failed validation. Messages are human-readable and
    /// ordered by field.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn validation(messages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Validation(messages.into_iter().map(Into::into).collect())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Validation messages, if this is a validation failure.
    pub fn messages(&self) -> Option<&[String]> {
        match self {
            Self::Validation(m) => Some(m),
            _ => None,
        }
    }
}
