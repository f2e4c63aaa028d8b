//! Bearer token authentication for protected handlers.
//!
//! Handlers take an [`AuthenticatedUser`] argument; actix runs the extractor
//! before the handler body, so a request without a valid token is answered
//! with `401` and never reaches the domain.

use actix_web::dev::Payload;
use actix_web::http::header::{AUTHORIZATION, HeaderValue};
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::{Error, UserId};

use super::ApiResult;
use super::state::HttpState;

const BEARER_SCHEME: &str = "Bearer";

/// Identity of the caller, taken from a validated bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    pub fn user_id(&self) -> &UserId {
        &self.0
    }

    pub fn into_inner(self) -> UserId {
        self.0
    }
}

/// Extract the token from `Bearer <token>`.
///
/// The header must hold exactly two space separated parts and the scheme is
/// matched case-sensitively.
fn bearer_token(header: &HeaderValue) -> ApiResult<&str> {
    let invalid = || Error::unauthorized("Invalid authorization header format");
    let raw = header.to_str().map_err(|_| invalid())?;
    let mut parts = raw.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) => Ok(token),
        _ => Err(invalid()),
    }
}

fn authenticate(req: &HttpRequest) -> ApiResult<AuthenticatedUser> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))?;
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("Authorization header is required"))?;
    let token = bearer_token(header)?;

    state
        .auth
        .validate_token(token)
        .map(AuthenticatedUser)
        .map_err(|error| {
            debug!(%error, "bearer token rejected");
            Error::unauthorized("Invalid or expired token")
        })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
