//! Error types for fluentq

use thiserror::Error;

/// Result type alias for fluentq operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Boxed error produced by a [`StoreExecutor`](crate::StoreExecutor) implementation.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for query building and execution
#[derive(Debug, Error)]
pub enum QueryError {
    /// A predicate failed validation (null value under the reject policy,
    /// or an operator paired with the wrong number of operands)
    #[error("Invalid predicate on column '{column}': {reason}")]
    InvalidPredicate { column: String, reason: String },

    /// Count derivation could not locate the SELECT ... FROM span of a raw query
    #[error("Malformed raw query: {0}")]
    MalformedRawQuery(String),

    /// A paged result was requested without `page()`
    #[error("Query is not paged, call page() first")]
    NotPaginated,

    /// An operator name that does not map to any predicate kind
    #[error("Unsupported predicate kind: {0}")]
    UnsupportedPredicateKind(String),

    /// Builder method called out of order
    #[error("Illegal builder state: {0}")]
    IllegalState(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Configuration load or parse error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error reported by the store executor, passed through unchanged
    #[error(transparent)]
    Store(StoreError),
}

impl QueryError {
    /// Create an invalid predicate error for a specific column
    pub fn invalid_predicate(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPredicate {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create an illegal state error
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState(message.into())
    }

    /// Wrap an error raised by the store executor
    pub fn store(err: impl Into<StoreError>) -> Self {
        Self::Store(err.into())
    }

    /// Check if this is an invalid predicate error
    pub fn is_invalid_predicate(&self) -> bool {
        matches!(self, Self::InvalidPredicate { .. })
    }

    /// Check if this is a not-paginated error
    pub fn is_not_paginated(&self) -> bool {
        matches!(self, Self::NotPaginated)
    }

    /// Check if this error came from the store executor
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

impl From<toml::de::Error> for QueryError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
