//! PokéDex chat server
//!
//! A guided conversation about Pokémon, backed by the public PokéAPI and
//! exposed over a small JSON HTTP API.

mod api;
mod chat;
mod config;
mod pokeapi;
mod sessions;

use api::{create_router, AppState};
use config::AppConfig;
use pokeapi::{PokeApiClient, ReqwestTransport};
use sessions::InMemorySessionStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokedex_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env();

    // PokéAPI client with its response cache
    let transport = ReqwestTransport::new(config.upstream_timeout)?;
    let client = Arc::new(PokeApiClient::new(
        config.pokeapi_base_url.clone(),
        transport,
        config.cache_ttl,
    ));
    tracing::info!(
        base_url = %client.base_url(),
        cache_ttl_secs = config.cache_ttl.as_secs(),
        session_ttl_secs = config.session_ttl.as_secs(),
        max_sessions = config.max_sessions,
        "PokéAPI client ready"
    );

    // Sessions, swept in the background
    let sessions = Arc::new(InMemorySessionStore::new(
        config.session_ttl,
        config.max_sessions,
    ));
    let _sweeper = sessions.spawn_sweeper(config.sweep_interval);
    let _cache_sweeper = client.spawn_sweeper(config.sweep_interval);

    let state = AppState::new(sessions, client.clone(), client);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(CompressionLayer::new().gzip(true))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("PokéDex chat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
