//! # Ciclo de vida de una conexión
//! src/server/connection.rs
//!
//! Atiende requests de una misma conexión TCP hasta que:
//!
//! ```text
//! ACCEPTED → AWAITING_REQUEST → DISPATCHING → RESPONDING ─┐
//!               ↑                                          │
//!               └────────── keep-alive y cupo ─────────────┘
//!                                                          ↓
//!                                                       CLOSED
//! ```
//!
//! - el cliente cierra (EOF) o pide `Connection: close`,
//! - se alcanza `max_requests`,
//! - pasa `idle_timeout` sin que llegue el siguiente request,
//! - falla el parseo o el socket.
//!
//! Nada de esto se propaga al accept loop: el resultado es un `CloseReason`.

use crate::cache::conditional::format_http_date;
use crate::config::{Config, SERVER_NAME};
use crate::http::headers::names;
use crate::http::{parser, Request, Response};
use crate::router::{panic_message, Router};
use std::fmt;
use std::io::{BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info, warn};

/// Parámetros del loop de keep-alive
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub idle_timeout: Duration,
    pub max_requests: usize,
}

impl ConnectionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            idle_timeout: config.idle_timeout(),
            max_requests: config.max_requests,
        }
    }

    fn keep_alive_timeout_secs(&self) -> u64 {
        self.idle_timeout.as_secs()
    }
}

/// Por qué terminó una conexión
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// EOF (o línea vacía) esperando un request
    PeerClosed,
    /// El request no pedía keep-alive
    NotKeepAlive,
    /// Se atendieron `max_requests`
    RequestLimit,
    IdleTimeout,
    ParseError(String),
    Io(String),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::PeerClosed => write!(f, "peer closed"),
            CloseReason::NotKeepAlive => write!(f, "connection: close"),
            CloseReason::RequestLimit => write!(f, "request limit reached"),
            CloseReason::IdleTimeout => write!(f, "idle timeout"),
            CloseReason::ParseError(e) => write!(f, "parse error: {}", e),
            CloseReason::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

/// Atiende una conexión completa y la cierra
///
/// Retorna el motivo del cierre y cuántos requests se atendieron.
pub fn handle_connection(
    stream: TcpStream,
    router: &Router,
    settings: &ConnectionSettings,
) -> (CloseReason, usize) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let mut served = 0;
    let reason = serve(&stream, &peer, router, settings, &mut served);

    match &reason {
        CloseReason::ParseError(_) => warn!("[{}] Closing after {} requests: {}", peer, served, reason),
        CloseReason::Io(_) => warn!("[{}] Closing after {} requests: {}", peer, served, reason),
        CloseReason::IdleTimeout => info!("[{}] Connection timeout after {} requests", peer, served),
        _ => debug!("[{}] Closing after {} requests: {}", peer, served, reason),
    }

    let _ = stream.shutdown(Shutdown::Both);
    (reason, served)
}

fn serve(
    stream: &TcpStream,
    peer: &str,
    router: &Router,
    settings: &ConnectionSettings,
    served: &mut usize,
) -> CloseReason {
    let mut reader = match stream.try_clone() {
        Ok(s) => BufReader::new(s),
        Err(e) => return CloseReason::Io(e.to_string()),
    };
    let mut writer = stream;

    loop {
        // AWAITING_REQUEST
        if let Err(e) = stream.set_read_timeout(Some(settings.idle_timeout)) {
            return CloseReason::Io(e.to_string());
        }

        let request = match parser::read_request(&mut reader) {
            Ok(Some(request)) => request,
            Ok(None) => return CloseReason::PeerClosed,
            Err(e) if e.is_timeout() => return CloseReason::IdleTimeout,
            Err(e) if e.is_parse_error() => return CloseReason::ParseError(e.to_string()),
            Err(e) => return CloseReason::Io(e.to_string()),
        };

        *served += 1;
        let keep_alive = request.is_keep_alive();

        info!(
            "[{}] #{} {} {} {}",
            peer,
            served,
            request.method(),
            request.target(),
            request.version()
        );

        // DISPATCHING
        let mut response = dispatch(router, &request);
        add_default_headers(&mut response);
        // Refleja lo que pidió el cliente; el tope se aplica al cerrar
        response.set_keep_alive(
            keep_alive,
            settings.keep_alive_timeout_secs(),
            settings.max_requests,
        );

        // RESPONDING
        let bytes = response.to_bytes();
        if let Err(e) = writer.write_all(&bytes).and_then(|_| writer.flush()) {
            return CloseReason::Io(e.to_string());
        }
        info!("[{}] -> {}", peer, response);

        if !keep_alive {
            return CloseReason::NotKeepAlive;
        }
        if *served >= settings.max_requests {
            return CloseReason::RequestLimit;
        }
    }
}

/// El router ya contiene los fallos de los handlers; esto cubre el resto
fn dispatch(router: &Router, request: &Request) -> Response {
    match panic::catch_unwind(AssertUnwindSafe(|| router.route(request))) {
        Ok(response) => response,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("Routing panicked: {}", message);
            Response::internal_server_error(&message)
        }
    }
}

/// `Server` y `Date` en toda respuesta, salvo que el handler ya los puso
fn add_default_headers(response: &mut Response) {
    let headers = response.headers_mut();
    if !headers.contains(names::SERVER) {
        headers.set(names::SERVER, SERVER_NAME);
    }
    if !headers.contains(names::DATE) {
        headers.set(names::DATE, &format_http_date(SystemTime::now()));
    }
}
