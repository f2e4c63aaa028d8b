//! Voiceline server entry-point.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, ServerSettings, create_server};
use voiceline::inbound::http::health::HealthState;
use voiceline::inbound::http::secrets_config::{BuildMode, secrets_from_env};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        ServerSettings::load().map_err(|error| std::io::Error::other(error.to_string()))?;
    let secrets = secrets_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|error| std::io::Error::other(error.to_string()))?;
    let config = ServerConfig::from_settings(&settings, secrets)?;
    let bind_addr = config.bind_addr();

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, version = env!("CARGO_PKG_VERSION"), "voiceline listening");

    let result = server.await;
    health_state.mark_unhealthy();
    result
}
