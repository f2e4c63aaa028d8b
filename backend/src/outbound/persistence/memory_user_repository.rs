//! In-memory `UserRepository` adapter.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, User, UserId};

#[derive(Debug, Default)]
struct UserTable {
    users: HashMap<UserId, User>,
    by_email: HashMap<EmailAddress, UserId>,
}

/// User store keyed by id with a secondary index by normalised email.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    table: RwLock<UserTable>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> UserPersistenceError {
    UserPersistenceError::query("user store lock poisoned")
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut table = self.table.write().map_err(poisoned)?;
        table.by_email.insert(user.email().clone(), user.id().clone());
        table.users.insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table.users.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table
            .by_email
            .get(email)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut table = self.table.write().map_err(poisoned)?;
        let previous_email = match table.users.get(user.id()) {
            Some(existing) => existing.email().clone(),
            None => return Err(UserPersistenceError::not_found(user.id().to_string())),
        };
        if &previous_email != user.email() {
            table.by_email.remove(&previous_email);
            table.by_email.insert(user.email().clone(), user.id().clone());
        }
        table.users.insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        let mut table = self.table.write().map_err(poisoned)?;
        let removed = table
            .users
            .remove(id)
            .ok_or_else(|| UserPersistenceError::not_found(id.to_string()))?;
        if table.by_email.get(removed.email()) == Some(id) {
            table.by_email.remove(removed.email());
        }
        Ok(())
    }
}
