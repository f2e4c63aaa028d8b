//! Domain primitives, aggregates, and services.
//!
//! Purpose: define the transport-agnostic core of the backend. Types validate
//! on construction and services talk to the outside world only through
//! [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User and its value types: registered identity and credentials.
//! - Transcription: audio transcription record and its lifecycle.
//! - AuthServiceImpl / TranscriptionServiceImpl: driving port implementations.

pub mod auth;
mod auth_service;
pub mod error;
pub mod ports;
pub mod trace_id;
pub mod transcription;
mod transcription_service;
pub mod user;

pub use self::auth::{AuthSession, LoginCredentials, Registration};
pub use self::auth_service::AuthServiceImpl;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::transcription::{
    InvalidTranscriptionId, Transcription, TranscriptionId, TranscriptionStateError,
    TranscriptionStatus,
};
pub use self::transcription_service::{
    DEFAULT_LANGUAGE, DEFAULT_PROVIDER_TIMEOUT, TranscriptionOptions, TranscriptionServiceImpl,
};
pub use self::user::{
    DisplayName, EmailAddress, PASSWORD_MIN_LEN, PasswordHash, User, UserError, UserId,
    UserValidationError,
};
