//! # socket_http - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor HTTP/1.1.
//! La configuración viene de argumentos CLI o variables de entorno.

use socket_http::config::Config;
use socket_http::handlers::{build_router, UserStore};
use socket_http::server::Server;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "socket_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new();
    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(2);
    }

    tracing::info!(
        address = %config.address(),
        static_dir = %config.static_dir.display(),
        idle_timeout_ms = config.idle_timeout_ms,
        max_requests = config.max_requests,
        max_connections = config.max_connections,
        "socket_http v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let router = build_router(&config, Arc::new(UserStore::new()));

    let server = match Server::bind(config, router) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}
