//! Authentication inputs and outputs.
//!
//! Passwords are held in [`Zeroizing`] buffers so they are wiped once the
//! request that carried them is dropped.

use std::fmt;

use zeroize::Zeroizing;

use super::User;

/// Email and password presented at login.
///
/// No format validation happens here: an unknown or malformed email must be
/// indistinguishable from a wrong password.
///
/// # Examples
/// ```
/// use voiceline::domain::LoginCredentials;
///
/// let creds = LoginCredentials::new("ada@example.com", "secret");
/// assert_eq!(creds.email(), "ada@example.com");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Raw registration input; validated by [`User::create`].
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    email: String,
    password: Zeroizing<String>,
    name: String,
}

impl Registration {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
            name: name.into(),
        }
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// Issued bearer token together with the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    token: String,
    user: User,
}

impl AuthSession {
    pub fn new(token: String, user: User) -> Self {
        Self { token, user }
    }

    pub fn token(&self) -> &str {
        self.token.as_str()
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Split into the token and user.
    pub fn into_parts(self) -> (String, User) {
        (self.token, self.user)
    }
}
