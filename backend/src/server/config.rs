//! Server settings and the assembled server configuration.

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use voiceline::domain::{DEFAULT_LANGUAGE, DEFAULT_PROVIDER_TIMEOUT, TranscriptionOptions};
use voiceline::inbound::http::secrets_config::Secrets;
use voiceline::outbound::openai::{DEFAULT_ENDPOINT, DEFAULT_MODEL};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Non-secret settings loaded from CLI flags, `VOICELINE_*` variables and
/// configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "VOICELINE")]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Transcription endpoint URL.
    pub openai_endpoint: Option<String>,
    /// Transcription model name.
    pub openai_model: Option<String>,
    /// Spoken-language hint passed to the provider.
    pub language: Option<String>,
    /// Upper bound on one provider call, in seconds.
    pub provider_timeout_secs: Option<u64>,
    /// Single allowed CORS origin; any origin when unset.
    pub cors_origin: Option<String>,
}

impl ServerSettings {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Resolve `host:port` to the first matching socket address.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        (self.host(), self.port())
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                std::io::Error::other(format!(
                    "no address found for {}:{}",
                    self.host(),
                    self.port()
                ))
            })
    }

    pub fn openai_endpoint(&self) -> &str {
        self.openai_endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn openai_model(&self) -> &str {
        self.openai_model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn provider_timeout(&self) -> Duration {
        self.provider_timeout_secs
            .map_or(DEFAULT_PROVIDER_TIMEOUT, Duration::from_secs)
    }

    /// Options for the transcription service.
    pub fn transcription_options(&self) -> TranscriptionOptions {
        TranscriptionOptions {
            language: self
                .language
                .clone()
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned()),
            timeout: self.provider_timeout(),
        }
    }
}

/// Provider wiring derived from settings.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub model: String,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) cors_origin: Option<String>,
    pub(crate) provider: ProviderConfig,
    pub(crate) transcription: TranscriptionOptions,
    pub(crate) secrets: Secrets,
}

impl ServerConfig {
    /// Assemble the configuration from loaded settings and secrets.
    pub fn from_settings(settings: &ServerSettings, secrets: Secrets) -> std::io::Result<Self> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            cors_origin: settings.cors_origin.clone(),
            provider: ProviderConfig {
                endpoint: settings.openai_endpoint().to_owned(),
                model: settings.openai_model().to_owned(),
            },
            transcription: settings.transcription_options(),
            secrets,
        })
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
