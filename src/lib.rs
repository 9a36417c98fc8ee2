//! # socket_http
//! src/lib.rs
//!
//! Cliente y servidor HTTP/1.1 implementados desde cero sobre sockets TCP,
//! sin librerías HTTP: el protocolo se lee y escribe byte a byte.
//!
//! ## Arquitectura
//!
//! El crate está dividido en módulos especializados:
//! - `http`: tipos del mensaje y codec (parser + encoder, incluido chunked)
//! - `client`: cliente con reutilización de conexión, redirecciones y caché
//! - `server`: accept loop, límite de conexiones y loop de keep-alive
//! - `router`: tabla (método, path) → handler, con 405 y handler por defecto
//! - `cache`: `Last-Modified` / `If-Modified-Since` en ambos lados
//! - `handlers`: archivos estáticos, usuarios y rutas de demostración
//! - `config`: configuración CLI/env del servidor
//! - `error`: `HttpError`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use socket_http::config::Config;
//! use socket_http::handlers::{build_router, UserStore};
//! use socket_http::server::Server;
//! use std::sync::Arc;
//!
//! let config = Config::default();
//! let router = build_router(&config, Arc::new(UserStore::new()));
//! let server = Server::bind(config, router).expect("Error al iniciar servidor");
//! server.run().expect("Error en el accept loop");
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod router;
pub mod server;

pub use error::HttpError;
