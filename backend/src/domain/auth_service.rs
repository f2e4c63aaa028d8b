//! Authentication domain service implementing the [`AuthService`] driving port.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{AuthError, AuthService, TokenCodec, UserRepository};
use crate::domain::{
    AuthSession, EmailAddress, LoginCredentials, PasswordHash, Registration, User, UserId,
};

/// Registration, login, and token validation over a user repository.
#[derive(Clone)]
pub struct AuthServiceImpl<R> {
    user_repo: Arc<R>,
    tokens: Arc<dyn TokenCodec>,
    clock: Arc<dyn Clock>,
}

impl<R> AuthServiceImpl<R> {
    pub fn new(user_repo: Arc<R>, tokens: Arc<dyn TokenCodec>, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_repo,
            tokens,
            clock,
        }
    }

    fn session_for(&self, user: User) -> Result<AuthSession, AuthError> {
        let token = self.tokens.issue(&user).map_err(AuthError::TokenIssue)?;
        Ok(AuthSession::new(token, user))
    }
}

#[async_trait]
impl<R> AuthService for AuthServiceImpl<R>
where
    R: UserRepository,
{
    async fn register(&self, registration: &Registration) -> Result<AuthSession, AuthError> {
        // Check-then-create is not atomic: two concurrent registrations for
        // one email can both pass the lookup. The later create wins the index.
        if let Ok(email) = EmailAddress::new(registration.email())
            && self.user_repo.find_by_email(&email).await?.is_some()
        {
            return Err(AuthError::UserAlreadyExists);
        }

        let user = User::create(
            registration.email(),
            registration.password(),
            registration.name(),
            self.clock.utc(),
        )?;
        self.user_repo.create(&user).await?;
        info!(user_id = %user.id(), "user registered");

        self.session_for(user)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, AuthError> {
        let Ok(email) = EmailAddress::new(credentials.email()) else {
            PasswordHash::verify_decoy(credentials.password());
            return Err(AuthError::InvalidCredentials);
        };
        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            PasswordHash::verify_decoy(credentials.password());
            debug!("login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        if !user.verify_password(credentials.password()) {
            debug!(user_id = %user.id(), "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        self.session_for(user)
    }

    fn validate_token(&self, token: &str) -> Result<UserId, AuthError> {
        self.tokens.validate(token).map_err(|err| {
            debug!(error = %err, "token rejected");
            AuthError::InvalidToken
        })
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
