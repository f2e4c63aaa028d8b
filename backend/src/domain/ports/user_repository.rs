//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{EmailAddress, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// No record exists for the identifier.
        NotFound { id: String } => "user {id} not found",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Credential store keyed by user id with a unique email index.
///
/// Email uniqueness is not enforced here; callers check with
/// [`UserRepository::find_by_email`] before creating.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and point the email index at it.
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by normalised email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Replace an existing user record.
    async fn update(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Remove a user and its email index entry.
    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError>;
}
