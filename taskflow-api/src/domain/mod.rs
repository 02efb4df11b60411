pub mod access;
mod error;
pub mod models;
pub mod services;
mod slug;

pub use error::{DomainError, FieldError};
