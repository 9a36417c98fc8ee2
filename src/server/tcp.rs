//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Implementación del servidor TCP que maneja múltiples conexiones simultáneas
//! usando threads. Cada conexión se procesa en su propio thread, siempre que
//! haya lugar en el `ConnectionPool`; si no, recibe un 503 y se cierra.

use super::connection::{handle_connection, ConnectionSettings};
use super::pool::ConnectionPool;
use crate::config::{Config, SERVER_NAME};
use crate::http::headers::names;
use crate::http::{Response, StatusCode};
use crate::router::Router;
use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};

/// Servidor HTTP/1.1 concurrente
pub struct Server {
    config: Config,
    router: Arc<Router>,
    pool: ConnectionPool,
    listener: TcpListener,
}

impl Server {
    /// Hace bind en `config.address()`
    ///
    /// Con `port = 0` el sistema elige un puerto libre; `local_addr()` lo
    /// informa.
    pub fn bind(config: Config, router: Router) -> io::Result<Self> {
        let address = config.address();
        let listener = TcpListener::bind(&address)?;
        info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            pool: ConnectionPool::new(config.max_connections),
            config,
            router: Arc::new(router),
            listener,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Accept loop; solo retorna si el listener falla al clonarse
    ///
    /// Los errores de `accept` se registran y el loop sigue.
    pub fn run(&self) -> io::Result<()> {
        let settings = Arc::new(ConnectionSettings::from_config(&self.config));

        for (method, path) in self.router.routes() {
            info!("Route: {} {}", method, path);
        }

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => self.accept(stream, &settings),
                Err(e) => error!("Error accepting connection: {}", e),
            }
        }

        Ok(())
    }

    /// Corre el accept loop en un thread aparte
    ///
    /// Útil para tests: el servidor vive hasta que termine el proceso.
    pub fn spawn(self) -> io::Result<SocketAddr> {
        let addr = self.local_addr()?;
        thread::Builder::new()
            .name("accept-loop".to_string())
            .spawn(move || {
                if let Err(e) = self.run() {
                    error!("Accept loop stopped: {}", e);
                }
            })?;
        Ok(addr)
    }

    fn accept(&self, stream: TcpStream, settings: &Arc<ConnectionSettings>) {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        let Some(slot) = self.pool.try_acquire() else {
            warn!(
                "[{}] Rejected: {} active connections (max {})",
                peer,
                self.pool.active(),
                self.pool.max()
            );
            reject_busy(stream, self.config.retry_after_secs);
            return;
        };

        info!("[{}] New connection ({} active)", peer, self.pool.active());

        let router = Arc::clone(&self.router);
        let settings = Arc::clone(settings);
        let spawned = thread::Builder::new()
            .name(format!("conn-{}", peer))
            .spawn(move || {
                let _slot = slot;
                handle_connection(stream, &router, &settings);
            });

        if let Err(e) = spawned {
            error!("[{}] Could not spawn connection thread: {}", peer, e);
        }
    }
}

/// 503 con `Retry-After` y cierre inmediato
fn reject_busy(mut stream: TcpStream, retry_after_secs: u64) {
    let mut response = Response::error(
        StatusCode::ServiceUnavailable,
        "Server is at its connection limit, try again later",
    )
    .with_header(names::RETRY_AFTER, &retry_after_secs.to_string())
    .with_header(names::SERVER, SERVER_NAME);
    response.set_keep_alive(false, 0, 0);

    let _ = stream.write_all(&response.to_bytes());
    let _ = stream.flush();
    let _ = stream.shutdown(Shutdown::Both);
}
