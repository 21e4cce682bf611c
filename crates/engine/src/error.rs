//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidExpense`] thrown when an expense fails validation.
//! - [`Unauthorized`] thrown when credentials do not match a user.
//! - [`Cache`] thrown when the balance cache backend is unavailable.
//!
//!  [`InvalidExpense`]: EngineError::InvalidExpense
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`Cache`]: EngineError::Cache
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid expense: {0}")]
    InvalidExpense(String),
    #[error("Invalid user: {0}")]
    InvalidUser(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("authorization failed")]
    Unauthorized,
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
    #[error("Balance cache unavailable: {0}")]
    Cache(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidExpense(a), Self::InvalidExpense(b)) => a == b,
            (Self::InvalidUser(a), Self::InvalidUser(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Unauthorized, Self::Unauthorized) => true,
            (Self::PasswordHash(a), Self::PasswordHash(b)) => a == b,
            (Self::Cache(a), Self::Cache(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
