//! # Errores del protocolo
//! src/error.rs
//!
//! Un único tipo de error para cliente y servidor. Las variantes se agrupan
//! en cuatro familias:
//!
//! - **Parseo**: request/status line malformada, status code o chunk size
//!   no numéricos, respuesta vacía.
//! - **I/O**: fallos de lectura/escritura del socket.
//! - **Timeout**: el socket no entregó datos a tiempo.
//! - **Redirecciones**: se superó el máximo configurado (solo cliente).

use std::io;
use thiserror::Error;

/// Errores que pueden ocurrir al leer, escribir o intercambiar mensajes HTTP
#[derive(Debug, Error)]
pub enum HttpError {
    /// La request line no tiene `METHOD target VERSION`
    #[error("Invalid request line: {0}")]
    InvalidRequestLine(String),

    /// La status line no tiene al menos `VERSION code`
    #[error("Invalid status line: {0}")]
    InvalidStatusLine(String),

    /// El status code no es un entero en base 10
    #[error("Invalid status code: {0}")]
    InvalidStatusCode(String),

    /// El tamaño de un chunk no es hexadecimal
    #[error("Invalid chunk size: {0}")]
    InvalidChunkSize(String),

    /// El buffer no contiene ninguna request line
    #[error("Empty request")]
    EmptyRequest,

    /// El servidor cerró sin enviar status line
    #[error("Empty response")]
    EmptyResponse,

    /// URL que el cliente no sabe usar
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Cadena de redirecciones más larga que el máximo
    #[error("Too many redirects (max: {0})")]
    TooManyRedirects(usize),

    /// Timeout de lectura o escritura
    #[error("Timed out waiting for the peer")]
    Timeout,

    /// Cualquier otro fallo del socket
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl HttpError {
    /// `true` para los errores de formato del mensaje
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            HttpError::InvalidRequestLine(_)
                | HttpError::InvalidStatusLine(_)
                | HttpError::InvalidStatusCode(_)
                | HttpError::InvalidChunkSize(_)
                | HttpError::EmptyRequest
                | HttpError::EmptyResponse
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Timeout)
    }
}

impl From<io::Error> for HttpError {
    /// Los sockets con `set_read_timeout` reportan el timeout como
    /// `WouldBlock` (Unix) o `TimedOut` (Windows).
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => HttpError::Timeout,
            _ => HttpError::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_kinds_map_to_timeout() {
        let err: HttpError = io::Error::new(io::ErrorKind::WouldBlock, "x").into();
        assert!(err.is_timeout());

        let err: HttpError = io::Error::new(io::ErrorKind::TimedOut, "x").into();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_other_io_errors_stay_io() {
        let err: HttpError = io::Error::new(io::ErrorKind::ConnectionReset, "reset").into();
        assert!(matches!(err, HttpError::Io(_)));
        assert!(!err.is_parse_error());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(HttpError::TooManyRedirects(10).to_string(), "Too many redirects (max: 10)");
        assert_eq!(
            HttpError::InvalidStatusCode("abc".to_string()).to_string(),
            "Invalid status code: abc"
        );
        assert!(HttpError::EmptyResponse.is_parse_error());
    }
}
