//! Driving port for registration, login, and token validation.
//!
//! Inbound adapters call this port without knowing how users are stored or
//! how tokens are signed, so handler tests can substitute a mock.

use async_trait::async_trait;
use serde_json::json;

use crate::domain::{
    AuthSession, Error, LoginCredentials, Registration, UserError, UserId, UserValidationError,
};

use super::{TokenError, UserPersistenceError};

/// Failures raised by [`AuthService`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("user with this email already exists")]
    UserAlreadyExists,
    /// Unknown email and wrong password are deliberately the same error.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error(transparent)]
    Validation(#[from] UserValidationError),
    #[error("password hashing failed: {message}")]
    PasswordHash { message: String },
    #[error(transparent)]
    Persistence(#[from] UserPersistenceError),
    #[error("token issuance failed: {0}")]
    TokenIssue(TokenError),
}

impl From<UserError> for AuthError {
    fn from(value: UserError) -> Self {
        match value {
            UserError::Validation(err) => Self::Validation(err),
            UserError::PasswordHash { message } => Self::PasswordHash { message },
        }
    }
}

fn field_for(error: &UserValidationError) -> &'static str {
    match error {
        UserValidationError::InvalidEmail => "email",
        UserValidationError::InvalidPassword { .. } => "password",
        UserValidationError::InvalidName => "name",
        UserValidationError::EmptyId | UserValidationError::InvalidId => "id",
    }
}

impl From<AuthError> for Error {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::UserAlreadyExists => Error::conflict(value.to_string()),
            AuthError::InvalidCredentials | AuthError::InvalidToken => {
                Error::unauthorized(value.to_string())
            }
            AuthError::Validation(err) => Error::invalid_request(err.to_string())
                .with_details(json!({ "field": field_for(&err) })),
            AuthError::PasswordHash { .. }
            | AuthError::Persistence(_)
            | AuthError::TokenIssue(_) => Error::internal(value.to_string()),
        }
    }
}

/// Authentication use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a user and issue a token for it.
    async fn register(&self, registration: &Registration) -> Result<AuthSession, AuthError>;

    /// Verify credentials and issue a token.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, AuthError>;

    /// Resolve a bearer token to the user it identifies.
    fn validate_token(&self, token: &str) -> Result<UserId, AuthError>;
}
