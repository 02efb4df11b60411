use serde::Serialize;
use thiserror::Error;

use crate::repositories::RepositoryError;

/// A single failed input field, surfaced in validation error payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub errors: Vec<String>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            errors: vec![message.into()],
        }
    }
}

/// The closed error taxonomy raised by the identity and lifecycle services.
///
/// The HTTP boundary maps each variant to a status code exhaustively; no
/// authorization or validation logic lives in the handlers themselves.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Input validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Database error")]
    Database(#[from] RepositoryError),
    #[error("Internal server error")]
    Internal(String),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
