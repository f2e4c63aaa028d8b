//! Driving port for transcription use-cases.

use async_trait::async_trait;
use serde_json::json;

use crate::domain::{Error, Transcription, TranscriptionId, UserId};

use super::{AudioUpload, TranscriptionPersistenceError, TranscriptionProviderError};

/// Failures raised by [`TranscriptionService`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranscriptionError {
    #[error("transcription not found")]
    NotFound,
    /// The record exists but belongs to another user.
    #[error("access to this transcription is not allowed")]
    UnauthorizedAccess,
    #[error("transcription returned empty text")]
    EmptyText,
    #[error("transcription failed: {0}")]
    Provider(#[from] TranscriptionProviderError),
    #[error(transparent)]
    Persistence(#[from] TranscriptionPersistenceError),
    /// The background transcription task ended without reporting back.
    #[error("transcription task interrupted: {message}")]
    Interrupted { message: String },
}

impl From<TranscriptionError> for Error {
    fn from(value: TranscriptionError) -> Self {
        match value {
            TranscriptionError::NotFound => Error::not_found(value.to_string()),
            TranscriptionError::UnauthorizedAccess => Error::forbidden(value.to_string()),
            TranscriptionError::Provider(TranscriptionProviderError::NotConfigured) => {
                Error::service_unavailable("transcription service not configured")
                    .with_details(json!({ "reason": "not_configured" }))
            }
            TranscriptionError::Provider(
                TranscriptionProviderError::Timeout { .. }
                | TranscriptionProviderError::RateLimited { .. }
                | TranscriptionProviderError::Transport { .. },
            ) => Error::service_unavailable("transcription provider unavailable")
                .with_details(json!({ "reason": "provider_unavailable" })),
            TranscriptionError::EmptyText
            | TranscriptionError::Provider(_)
            | TranscriptionError::Persistence(_)
            | TranscriptionError::Interrupted { .. } => Error::internal(value.to_string()),
        }
    }
}

/// Transcription use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Transcribe `audio` for `user_id`, returning the terminal record.
    async fn transcribe(
        &self,
        user_id: &UserId,
        audio: AudioUpload,
    ) -> Result<Transcription, TranscriptionError>;

    /// Fetch a record owned by `user_id`.
    async fn get_transcription(
        &self,
        id: &TranscriptionId,
        user_id: &UserId,
    ) -> Result<Transcription, TranscriptionError>;

    /// List records owned by `user_id`, oldest first.
    async fn get_user_transcriptions(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Transcription>, TranscriptionError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(TranscriptionError::NotFound, ErrorCode::NotFound)]
    #[case(TranscriptionError::UnauthorizedAccess, ErrorCode::Forbidden)]
    #[case(TranscriptionError::EmptyText, ErrorCode::InternalError)]
    #[case(
        TranscriptionError::Provider(TranscriptionProviderError::not_configured()),
        ErrorCode::ServiceUnavailable
    )]
    #[case(
        TranscriptionError::Provider(TranscriptionProviderError::timeout("slow")),
        ErrorCode::ServiceUnavailable
    )]
    #[case(
        TranscriptionError::Provider(TranscriptionProviderError::rejected(400_u16, "bad audio")),
        ErrorCode::InternalError
    )]
    #[case(
        TranscriptionError::Persistence(TranscriptionPersistenceError::query("poisoned")),
        ErrorCode::InternalError
    )]
    fn transcription_errors_map_to_codes(
        #[case] error: TranscriptionError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(Error::from(error).code(), expected);
    }
}
