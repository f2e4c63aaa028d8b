//! User aggregate and its validated value types.
//!
//! Every constructor validates its input, so a [`User`] that exists is always
//! well formed: the email is normalised, the display name is non-empty, and
//! the only credential material kept is a bcrypt hash.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum password length in bytes.
pub const PASSWORD_MIN_LEN: usize = 8;

#[cfg(not(test))]
const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;
/// Lowest cost bcrypt accepts; keeps unit tests fast.
#[cfg(test)]
const BCRYPT_COST: u32 = 4;

/// Validation errors raised while building user values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    InvalidEmail,
    InvalidPassword { min: usize },
    InvalidName,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::InvalidEmail => write!(f, "invalid email format"),
            Self::InvalidPassword { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::InvalidName => write!(f, "name is required"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Failures raised by [`User`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserError {
    /// Input failed validation; nothing was changed.
    #[error(transparent)]
    Validation(#[from] UserValidationError),
    /// The hashing backend rejected the password.
    #[error("password hashing failed: {message}")]
    PasswordHash { message: String },
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Normalised email address.
///
/// Surrounding whitespace is trimmed and the address is lowercased before
/// validation, so two spellings of one address compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

impl EmailAddress {
    /// Normalise and validate an email address.
    ///
    /// # Examples
    /// ```
    /// use voiceline::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new("  Ada@Example.COM ").unwrap();
    /// assert_eq!(email.as_ref(), "ada@example.com");
    /// assert!(EmailAddress::new("not-an-email").is_err());
    /// ```
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = email.as_ref().trim().to_lowercase();
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable display name for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`]; blank names are rejected.
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(UserValidationError::InvalidName);
        }
        Ok(Self(display_name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

pub(crate) static DECOY_HASH: OnceLock<Option<PasswordHash>> = OnceLock::new();

fn decoy_hash() -> Option<&'static PasswordHash> {
    DECOY_HASH
        .get_or_init(|| {
            bcrypt::hash("voiceline-decoy-password", BCRYPT_COST)
                .ok()
                .map(PasswordHash)
        })
        .as_ref()
}

/// bcrypt hash in modular-crypt form (`$2b$<cost>$...`).
///
/// The cost is encoded in the hash itself, so hashes produced under an older
/// work factor keep verifying after the factor changes.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Validate the password length and hash it.
    pub fn from_plaintext(password: &str) -> Result<Self, UserError> {
        if password.len() < PASSWORD_MIN_LEN {
            return Err(UserValidationError::InvalidPassword {
                min: PASSWORD_MIN_LEN,
            }
            .into());
        }
        bcrypt::hash(password, BCRYPT_COST)
            .map(Self)
            .map_err(|err| UserError::PasswordHash {
                message: err.to_string(),
            })
    }

    /// Check a candidate password. Malformed hashes never match.
    pub fn verify(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.0).unwrap_or(false)
    }

    /// Run one verification against a throwaway hash of the configured cost.
    ///
    /// Login calls this when no account matches, so an unknown email costs
    /// as much as a wrong password.
    pub fn verify_decoy(password: &str) {
        if let Some(decoy) = decoy_hash() {
            std::hint::black_box(decoy.verify(password));
        }
    }

    /// Raw hash string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Registered user.
///
/// ## Invariants
/// - `email` is normalised and matches the accepted address shape.
/// - `password_hash` is the only credential material retained.
/// - `updated_at` is never earlier than `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    password_hash: PasswordHash,
    name: DisplayName,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Validate registration input and hash the password.
    ///
    /// Rules are checked in order (email, password, name) and the first
    /// violation is reported.
    pub fn create(
        email: &str,
        password: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, UserError> {
        let email = EmailAddress::new(email)?;
        if password.len() < PASSWORD_MIN_LEN {
            return Err(UserValidationError::InvalidPassword {
                min: PASSWORD_MIN_LEN,
            }
            .into());
        }
        let name = DisplayName::new(name)?;
        let password_hash = PasswordHash::from_plaintext(password)?;

        Ok(Self {
            id: UserId::random(),
            email,
            password_hash,
            name,
            created_at: now,
            updated_at: now,
        })
    }

    /// Check a plaintext password against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        self.password_hash.verify(password)
    }

    /// Replace the password. The user is left untouched on failure.
    pub fn update_password(&mut self, password: &str, now: DateTime<Utc>) -> Result<(), UserError> {
        let hash = PasswordHash::from_plaintext(password)?;
        self.password_hash = hash;
        self.updated_at = now.max(self.created_at);
        Ok(())
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Normalised email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Display name.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests;
