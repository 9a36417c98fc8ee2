//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes (con un tope de conexiones simultáneas)
//! 3. Lee y parsea requests HTTP, varios por conexión (keep-alive)
//! 4. Genera y envía responses HTTP

pub mod connection;
pub mod pool;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::{handle_connection, CloseReason, ConnectionSettings};
pub use pool::{ConnectionPool, ConnectionSlot};
pub use tcp::Server;
