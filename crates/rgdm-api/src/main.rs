//! # rgdm-api: Binary Entry Point
//!
//! Loads `.env`, initializes tracing, connects to Redis, builds the
//! presentation verifier, and serves the API (default port 3500).

use std::sync::Arc;

use anyhow::Context;
use rgdm_api::config::AppConfig;
use rgdm_api::state::AppState;
use rgdm_api::store::RedisStore;
use rgdm_verifier::{
    DynVerifier, EvmRegistryClient, PresentationVerifier, SignatureRegistry, VerifierConfig,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may be set directly.
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let config = AppConfig::from_env().context("loading service configuration")?;
    init_tracing(config.json_logs);
    if dotenv_loaded {
        tracing::debug!("loaded .env");
    }

    let store = RedisStore::connect(&config.redis_url)
        .await
        .context("connecting to Redis")?;

    let verifier = match build_verifier() {
        Ok(verifier) => {
            tracing::info!(trusted_key = %verifier.trusted_key(), "presentation verifier configured");
            Some(Arc::new(verifier))
        }
        Err(e) => {
            tracing::warn!(
                "presentation verifier not configured: {e:#}. Every verification will fail."
            );
            None
        }
    };

    let port = config.port;
    let state = AppState::new(config, Arc::new(store), verifier);
    let app = rgdm_api::app(state).context("building router")?;

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("rgdm API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_verifier() -> anyhow::Result<DynVerifier> {
    let config = VerifierConfig::from_env()?;
    let client = EvmRegistryClient::new(&config)?;
    tracing::info!(
        endpoint = %config.registry_endpoint,
        contract = %client.contract(),
        "registry client configured"
    );
    let registry: Arc<dyn SignatureRegistry> = Arc::new(client);
    Ok(PresentationVerifier::new(registry, config.trusted_issuer_key))
}
