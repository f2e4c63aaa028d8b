//! Port for external speech-to-text providers.
//!
//! Adapters turn an uploaded audio file into text. They must not retry; the
//! caller bounds the call with its own timeout.

use std::fmt;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by transcription provider adapters.
    pub enum TranscriptionProviderError {
        /// No credentials are configured; permanent until redeployed.
        NotConfigured => "transcription provider is not configured",
        /// The provider did not answer in time.
        Timeout { message: String } => "transcription provider timed out: {message}",
        /// The provider asked the caller to slow down.
        RateLimited { message: String } => "transcription provider rate limited: {message}",
        /// The provider rejected the request.
        Rejected { status: u16, message: String } => "transcription provider rejected request ({status}): {message}",
        /// Network or upstream failure.
        Transport { message: String } => "transcription provider transport failed: {message}",
        /// The response body could not be decoded.
        Decode { message: String } => "transcription provider response invalid: {message}",
    }
}

/// Uploaded audio file handed to a provider.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioUpload {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

impl AudioUpload {
    /// Fallback file name when the client did not send one.
    pub const DEFAULT_FILE_NAME: &'static str = "audio";

    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let file_name = if file_name.trim().is_empty() {
            Self::DEFAULT_FILE_NAME.to_owned()
        } else {
            file_name
        };
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for AudioUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Text and duration returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderTranscript {
    pub text: String,
    pub duration_seconds: f64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Transcribe `audio`, hinting the spoken `language` (ISO-639-1).
    async fn transcribe(
        &self,
        audio: &AudioUpload,
        language: &str,
    ) -> Result<ProviderTranscript, TranscriptionProviderError>;
}

/// Provider used when no API key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredTranscriptionProvider;

#[async_trait]
impl TranscriptionProvider for UnconfiguredTranscriptionProvider {
    async fn transcribe(
        &self,
        _audio: &AudioUpload,
        _language: &str,
    ) -> Result<ProviderTranscript, TranscriptionProviderError> {
        Err(TranscriptionProviderError::not_configured())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn unconfigured_provider_always_reports_not_configured() {
        let audio = AudioUpload::new("a.wav", None, vec![1, 2, 3]);
        let err = UnconfiguredTranscriptionProvider
            .transcribe(&audio, "en")
            .await
            .expect_err("unconfigured provider must fail");
        assert_eq!(err, TranscriptionProviderError::NotConfigured);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_file_names_fall_back(#[case] name: &str) {
        let audio = AudioUpload::new(name, None, Vec::new());
        assert_eq!(audio.file_name(), AudioUpload::DEFAULT_FILE_NAME);
        assert!(audio.is_empty());
    }

    #[rstest]
    fn debug_omits_audio_bytes() {
        let audio = AudioUpload::new("clip.mp3", Some("audio/mpeg".to_owned()), vec![7; 4]);
        let rendered = format!("{audio:?}");
        assert!(rendered.contains("len: 4"));
        assert!(!rendered.contains("[7, 7"));
    }
}
