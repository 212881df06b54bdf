//! Domain error model.

use thiserror::Error;

use crate::quantity::Quantity;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// missing records, stock shortfalls, uniqueness). Infrastructure concerns
/// belong elsewhere. Every variant is recoverable: the caller gets the
/// condition back and the prior state is untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. zero quantity where a positive one is required).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested record was not found.
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    /// A remove would take the sealed quantity below zero.
    #[error("not enough {item} in inventory to remove (requested {requested}, available {available})")]
    InsufficientStock {
        item: String,
        requested: Quantity,
        available: Quantity,
    },

    /// A uniqueness constraint was violated (duplicate item name, duplicate code).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn insufficient_stock(item: impl Into<String>, requested: Quantity, available: Quantity) -> Self {
        Self::InsufficientStock {
            item: item.into(),
            requested,
            available,
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
