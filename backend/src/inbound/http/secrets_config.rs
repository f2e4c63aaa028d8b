//! Secret loading for token signing and the transcription provider.
//!
//! Secrets come from the environment rather than the settings file so they
//! never end up in configuration that gets committed or logged.

use std::fmt;

use mockable::Env;
use tracing::warn;
use zeroize::Zeroizing;

const JWT_SECRET_ENV: &str = "JWT_SECRET";
const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
const JWT_SECRET_MIN_LEN: usize = 32;
const DEV_JWT_SECRET: &str = "voiceline-development-only-signing-secret";

/// Build mode for secret validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds fall back to development values and warn.
    Debug,
    /// Release builds require every secret to be present and strong.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use voiceline::inbound::http::secrets_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Secrets needed to wire the services.
pub struct Secrets {
    /// HMAC key for HS256 tokens.
    pub jwt_secret: Zeroizing<Vec<u8>>,
    /// Provider API key; `None` leaves transcription unconfigured.
    pub openai_api_key: Option<Zeroizing<String>>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("jwt_secret", &"<redacted>")
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Errors raised while loading secrets.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SecretsConfigError {
    /// A required environment variable is missing or blank.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A secret is present but too short to be safe.
    #[error("{name} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort {
        name: &'static str,
        length: usize,
        min_len: usize,
    },
}

/// Load secrets from the environment.
///
/// # Examples
///
/// ```rust
/// use voiceline::inbound::http::secrets_config::{BuildMode, secrets_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "JWT_SECRET" => Some("0123456789abcdef0123456789abcdef".to_owned()),
///     _ => None,
/// });
///
/// let secrets = secrets_from_env(&env, BuildMode::Release).expect("valid secrets");
/// assert_eq!(secrets.jwt_secret.len(), 32);
/// assert!(secrets.openai_api_key.is_none());
/// ```
pub fn secrets_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Secrets, SecretsConfigError> {
    Ok(Secrets {
        jwt_secret: jwt_secret_from_env(env, mode)?,
        openai_api_key: openai_api_key_from_env(env),
    })
}

fn non_blank<E: Env>(env: &E, name: &str) -> Option<Zeroizing<String>> {
    let value = Zeroizing::new(env.string(name)?);
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(Zeroizing::new(trimmed.to_owned()))
    }
}

fn jwt_secret_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<Zeroizing<Vec<u8>>, SecretsConfigError> {
    let Some(secret) = non_blank(env, JWT_SECRET_ENV) else {
        if mode.is_debug() {
            warn!("JWT_SECRET not set; using the development signing secret");
            return Ok(Zeroizing::new(DEV_JWT_SECRET.as_bytes().to_vec()));
        }
        return Err(SecretsConfigError::MissingEnv {
            name: JWT_SECRET_ENV,
        });
    };

    let length = secret.len();
    if length < JWT_SECRET_MIN_LEN {
        if !mode.is_debug() {
            return Err(SecretsConfigError::SecretTooShort {
                name: JWT_SECRET_ENV,
                length,
                min_len: JWT_SECRET_MIN_LEN,
            });
        }
        warn!(
            length,
            min_len = JWT_SECRET_MIN_LEN,
            "JWT_SECRET is shorter than recommended"
        );
    }
    Ok(Zeroizing::new(secret.as_bytes().to_vec()))
}

fn openai_api_key_from_env<E: Env>(env: &E) -> Option<Zeroizing<String>> {
    let key = non_blank(env, OPENAI_API_KEY_ENV);
    if key.is_none() {
        warn!("OPENAI_API_KEY not set; transcription requests will return 503");
    }
    key
}
