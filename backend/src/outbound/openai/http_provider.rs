//! Reqwest-backed transcription provider.
//!
//! This adapter owns transport details only: multipart encoding, bearer
//! authentication, HTTP error mapping, and JSON decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::TranscriptionResponseDto;
use crate::domain::ports::{
    AudioUpload, ProviderTranscript, TranscriptionProvider, TranscriptionProviderError,
};

/// Hosted OpenAI transcription endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/audio/transcriptions";
/// Model requested when none is configured.
pub const DEFAULT_MODEL: &str = "whisper-1";
const RESPONSE_FORMAT: &str = "verbose_json";

/// Provider that POSTs audio to one transcription endpoint.
pub struct OpenAiTranscriptionProvider {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
    model: String,
}

impl OpenAiTranscriptionProvider {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: Zeroizing::new(api_key.into()),
            model: model.into(),
        })
    }

    fn form(&self, audio: &AudioUpload, language: &str) -> Form {
        let form = Form::new()
            .part("file", audio_part(audio))
            .text("model", self.model.clone())
            .text("response_format", RESPONSE_FORMAT);
        if language.trim().is_empty() {
            form
        } else {
            form.text("language", language.trim().to_owned())
        }
    }
}

#[async_trait]
impl TranscriptionProvider for OpenAiTranscriptionProvider {
    async fn transcribe(
        &self,
        audio: &AudioUpload,
        language: &str,
    ) -> Result<ProviderTranscript, TranscriptionProviderError> {
        debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            bytes = audio.len(),
            "sending audio to transcription provider"
        );
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .multipart(self.form(audio, language))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_transcript(body.as_ref())
    }
}

fn audio_part(audio: &AudioUpload) -> Part {
    let part = || Part::bytes(audio.bytes().to_vec()).file_name(audio.file_name().to_owned());
    match audio.content_type() {
        Some(content_type) => part().mime_str(content_type).unwrap_or_else(|_| part()),
        None => part(),
    }
}

fn parse_transcript(body: &[u8]) -> Result<ProviderTranscript, TranscriptionProviderError> {
    serde_json::from_slice::<TranscriptionResponseDto>(body)
        .map(ProviderTranscript::from)
        .map_err(|error| {
            TranscriptionProviderError::decode(format!("invalid transcription payload: {error}"))
        })
}

fn map_transport_error(error: reqwest::Error) -> TranscriptionProviderError {
    if error.is_timeout() {
        TranscriptionProviderError::timeout(error.to_string())
    } else {
        TranscriptionProviderError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> TranscriptionProviderError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => TranscriptionProviderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            TranscriptionProviderError::timeout(message)
        }
        _ if status.is_client_error() => {
            TranscriptionProviderError::rejected(status.as_u16(), message)
        }
        _ => TranscriptionProviderError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
