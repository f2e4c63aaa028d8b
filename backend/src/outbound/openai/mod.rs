//! OpenAI-compatible speech-to-text adapter.
//!
//! Implements the `TranscriptionProvider` port against any endpoint that
//! speaks the `/v1/audio/transcriptions` multipart protocol.

mod dto;
mod http_provider;

pub use http_provider::{
    DEFAULT_ENDPOINT, DEFAULT_MODEL, OpenAiTranscriptionProvider,
};
