//! Port for issuing and validating bearer tokens.

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token codecs.
    pub enum TokenError {
        /// The token is malformed, expired, forged, or carries unusable claims.
        Invalid { message: String } => "invalid token: {message}",
        /// Signing a new token failed.
        Issue { message: String } => "token issuance failed: {message}",
    }
}

/// Stateless bearer-token codec.
#[cfg_attr(test, mockall::automock)]
pub trait TokenCodec: Send + Sync {
    /// Sign a token identifying `user`.
    fn issue(&self, user: &User) -> Result<String, TokenError>;

    /// Verify a token and return the user it identifies.
    fn validate(&self, token: &str) -> Result<UserId, TokenError>;
}
