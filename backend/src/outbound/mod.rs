//! Outbound adapters implementing domain ports.
//!
//! - `persistence`: in-memory user and transcription stores.
//! - `openai`: reqwest client for OpenAI-compatible transcription endpoints.
//! - `token`: HS256 JWT bearer tokens.

pub mod openai;
pub mod persistence;
pub mod token;
