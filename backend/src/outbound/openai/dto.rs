//! DTOs for decoding `verbose_json` transcription responses.

use serde::Deserialize;

use crate::domain::ports::ProviderTranscript;

#[derive(Debug, Deserialize)]
pub(super) struct TranscriptionResponseDto {
    pub(super) text: String,
    #[serde(default)]
    pub(super) duration: Option<f64>,
}

impl From<TranscriptionResponseDto> for ProviderTranscript {
    fn from(value: TranscriptionResponseDto) -> Self {
        Self {
            text: value.text.trim().to_owned(),
            duration_seconds: value.duration.unwrap_or_default(),
        }
    }
}
