//! # Conexión del cliente
//! src/client/connection.rs
//!
//! Un socket TCP etiquetado con el (host, port) al que apunta. El cliente
//! guarda como máximo una y la reutiliza mientras siga abierta.

use crate::error::HttpError;
use crate::http::{parser, Response};
use std::io::{self, BufReader, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::debug;

pub struct Connection {
    host: String,
    port: u16,
    writer: TcpStream,
    reader: BufReader<TcpStream>,
}

impl Connection {
    /// Abre una conexión nueva; `timeout` limita el connect, las lecturas
    /// y las escrituras
    pub fn open(host: &str, port: u16, timeout: Duration) -> Result<Self, HttpError> {
        debug!("Connecting to {}:{}", host, port);

        let stream = connect(host, port, timeout)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;

        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            host: host.to_string(),
            port,
            writer: stream,
            reader,
        })
    }

    /// ¿Sirve para un request a `host:port`?
    pub fn matches(&self, host: &str, port: u16) -> bool {
        self.host == host && self.port == port
    }

    /// Detecta si el servidor ya cerró su lado
    ///
    /// Hace un `peek` no bloqueante: 0 bytes significa EOF.
    pub fn is_open(&self) -> bool {
        if !self.reader.buffer().is_empty() {
            return true;
        }
        if self.writer.set_nonblocking(true).is_err() {
            return false;
        }

        let mut probe = [0u8; 1];
        let open = match self.writer.peek(&mut probe) {
            Ok(0) => false,
            Ok(_) => true,
            Err(e) => e.kind() == io::ErrorKind::WouldBlock,
        };

        self.writer.set_nonblocking(false).is_ok() && open
    }

    /// Escribe un request ya serializado y lee exactamente una respuesta
    pub fn exchange(&mut self, request: &[u8]) -> Result<Response, HttpError> {
        self.writer.write_all(request)?;
        self.writer.flush()?;
        parser::read_response(&mut self.reader)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn close(self) {
        debug!("Closing connection to {}:{}", self.host, self.port);
        let _ = self.writer.shutdown(Shutdown::Both);
    }
}

/// Prueba cada dirección resuelta y devuelve el último error si ninguna responde
fn connect(host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_error = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!("Connect to {} failed: {}", addr, e);
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("No addresses found for {}:{}", host, port),
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::time::Instant;

    #[test]
    fn test_open_and_exchange() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            parser::read_request(&mut reader).unwrap();
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok")
                .unwrap();
        });

        let mut connection = Connection::open("127.0.0.1", port, Duration::from_secs(5)).unwrap();
        assert!(connection.matches("127.0.0.1", port));
        let response = connection.exchange(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(response.body_string().as_deref(), Some("ok"));

        server.join().unwrap();
        connection.close();
    }

    #[test]
    fn test_connect_respects_timeout() {
        // 10.255.255.1 no enruta: el connect queda colgado hasta el timeout
        // (o falla de inmediato si no hay ruta)
        let started = Instant::now();
        let result = Connection::open("10.255.255.1", 81, Duration::from_millis(300));

        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_connect_refused_is_io_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let result = Connection::open("127.0.0.1", port, Duration::from_secs(1));
        assert!(matches!(result, Err(HttpError::Io(_))));
    }
}
