//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the transcription provider, the token codec)
//! are implemented by outbound adapters. Driving ports ([`AuthService`],
//! [`TranscriptionService`]) are called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_command;
mod token_codec;
mod transcription_command;
mod transcription_provider;
mod transcription_repository;
mod user_repository;

#[cfg(test)]
pub use auth_command::MockAuthService;
pub use auth_command::{AuthError, AuthService};
#[cfg(test)]
pub use token_codec::MockTokenCodec;
pub use token_codec::{TokenCodec, TokenError};
#[cfg(test)]
pub use transcription_command::MockTranscriptionService;
pub use transcription_command::{TranscriptionError, TranscriptionService};
#[cfg(test)]
pub use transcription_provider::MockTranscriptionProvider;
pub use transcription_provider::{
    AudioUpload, ProviderTranscript, TranscriptionProvider, TranscriptionProviderError,
    UnconfiguredTranscriptionProvider,
};
#[cfg(test)]
pub use transcription_repository::MockTranscriptionRepository;
pub use transcription_repository::{TranscriptionPersistenceError, TranscriptionRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
