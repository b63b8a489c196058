//! # Application State
//!
//! The registry is built once in `main` and shared by `Arc` into every
//! handler; no handler mutates it. Configuration is read from the
//! environment once at startup.

use std::sync::Arc;

use texplore_core::SchemaRegistry;
use texplore_wire::{Protocol, Transport};

/// Startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP server binds.
    pub port: u16,
    /// Protocol used when a request omits one, and shown in templates.
    pub default_protocol: Protocol,
    /// Transport used when a request omits one, and shown in templates.
    pub default_transport: Transport,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            default_protocol: Protocol::Binary,
            default_transport: Transport::Buffered,
        }
    }
}

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The immutable schema registry.
    pub registry: Arc<SchemaRegistry>,
    /// Startup configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Create state around an already-built registry.
    pub fn new(registry: SchemaRegistry, config: AppConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
        }
    }
}
