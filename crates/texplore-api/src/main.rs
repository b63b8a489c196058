//! # texplore-api — Binary Entry Point
//!
//! Loads the schema directory, builds the registry, and starts the Axum
//! HTTP server.

use std::path::PathBuf;

use texplore_api::state::{AppConfig, AppState};
use texplore_core::SchemaRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let schema_dir: PathBuf = std::env::var("TEXPLORE_SCHEMA_DIR")
        .map_err(|_| "TEXPLORE_SCHEMA_DIR must point at a directory of .thrift files")?
        .into();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let default_protocol = match std::env::var("TEXPLORE_DEFAULT_PROTOCOL") {
        Ok(name) => name
            .parse::<texplore_wire::Protocol>()
            .map_err(|e| e.to_string())?,
        Err(_) => texplore_wire::Protocol::Binary,
    };
    let default_transport = match std::env::var("TEXPLORE_DEFAULT_TRANSPORT") {
        Ok(name) => name
            .parse::<texplore_wire::Transport>()
            .map_err(|e| e.to_string())?,
        Err(_) => texplore_wire::Transport::Buffered,
    };
    let config = AppConfig {
        port,
        default_protocol,
        default_transport,
    };

    // Build the registry once; it is immutable for the process lifetime.
    let loaded = texplore_idl::load_schema_dir(&schema_dir).map_err(|e| {
        tracing::error!("schema loading failed: {e}");
        e
    })?;
    let registry = SchemaRegistry::build(loaded).map_err(|e| {
        tracing::error!("schema extraction failed: {e}");
        e
    })?;
    tracing::info!(
        services = registry.listings().len(),
        dir = %schema_dir.display(),
        "schema registry built"
    );

    let state = AppState::new(registry, config);
    let app = texplore_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("texplore API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
