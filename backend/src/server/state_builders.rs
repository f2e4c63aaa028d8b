//! Builders wiring adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use reqwest::Url;
use tracing::info;

use voiceline::domain::ports::{TranscriptionProvider, UnconfiguredTranscriptionProvider};
use voiceline::domain::{AuthServiceImpl, TranscriptionServiceImpl};
use voiceline::inbound::http::state::HttpState;
use voiceline::outbound::openai::OpenAiTranscriptionProvider;
use voiceline::outbound::persistence::{MemoryTranscriptionRepository, MemoryUserRepository};
use voiceline::outbound::token::JwtTokenCodec;

use super::ServerConfig;

/// Pick the real provider when an API key is present.
fn build_provider(config: &ServerConfig) -> std::io::Result<Arc<dyn TranscriptionProvider>> {
    let Some(api_key) = config.secrets.openai_api_key.as_ref() else {
        return Ok(Arc::new(UnconfiguredTranscriptionProvider));
    };

    let endpoint = Url::parse(&config.provider.endpoint).map_err(|error| {
        std::io::Error::other(format!(
            "invalid transcription endpoint {}: {error}",
            config.provider.endpoint
        ))
    })?;
    let provider = OpenAiTranscriptionProvider::new(
        endpoint,
        api_key.as_str(),
        config.provider.model.as_str(),
        config.transcription.timeout,
    )
    .map_err(|error| std::io::Error::other(format!("HTTP client setup failed: {error}")))?;

    info!(
        endpoint = %config.provider.endpoint,
        model = %config.provider.model,
        "transcription provider configured"
    );
    Ok(Arc::new(provider))
}

/// Build the in-memory stores, services and token codec behind the handlers.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let users = Arc::new(MemoryUserRepository::new());
    let transcriptions = Arc::new(MemoryTranscriptionRepository::new());
    let tokens = Arc::new(JwtTokenCodec::new(
        config.secrets.jwt_secret.as_slice(),
        clock.clone(),
    ));
    let provider = build_provider(config)?;

    let auth = AuthServiceImpl::new(users, tokens, clock.clone());
    let transcription = TranscriptionServiceImpl::new(
        transcriptions,
        provider,
        clock,
        config.transcription.clone(),
    );

    Ok(web::Data::new(HttpState::new(
        Arc::new(auth),
        Arc::new(transcription),
    )))
}
