//! # Lectura de mensajes HTTP desde un stream
//! src/http/parser.rs
//!
//! Parser incremental sobre cualquier `BufRead` (socket con `BufReader`,
//! `Cursor` en los tests). Lee exactamente lo que ocupa un mensaje y deja el
//! resto en el stream, lo que permite varios requests por conexión.
//!
//! ## Estrategia para el body (en este orden)
//!
//! 1. `Transfer-Encoding: chunked` → se reensamblan los chunks.
//! 2. `Content-Length` numérico → se leen exactamente esos bytes; si el
//!    peer cierra antes, el body queda truncado sin error.
//! 3. Ninguno de los dos → no hay body. No existe el modo "leer hasta que
//!    cierre la conexión".

use super::headers::Headers;
use super::request::{Method, Request};
use super::response::Response;
use crate::error::HttpError;
use std::io::{BufRead, Read};
use tracing::debug;

/// Lee una línea terminada en CRLF
///
/// - Retorna el contenido sin el `\r\n`.
/// - Un `\n` suelto (sin `\r` antes) no termina la línea: queda como contenido.
/// - `Ok(None)` si el stream terminó sin leer ningún byte.
/// - Si el stream termina a mitad de línea, retorna lo leído.
///
/// # Ejemplo
/// ```
/// use socket_http::http::parser::read_line;
/// use std::io::Cursor;
///
/// let mut input = Cursor::new(&b"uno\ndos\r\n\r\ntres"[..]);
/// assert_eq!(read_line(&mut input).unwrap(), Some("uno\ndos".to_string()));
/// assert_eq!(read_line(&mut input).unwrap(), Some(String::new()));
/// assert_eq!(read_line(&mut input).unwrap(), Some("tres".to_string()));
/// assert_eq!(read_line(&mut input).unwrap(), None);
/// ```
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>, HttpError> {
    let mut line = Vec::new();

    loop {
        let read = reader.read_until(b'\n', &mut line)?;

        if read == 0 {
            // Fin del stream
            if line.is_empty() {
                return Ok(None);
            }
            return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
        }

        if line.ends_with(b"\r\n") {
            line.truncate(line.len() - 2);
            return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
        }
    }
}

/// Lee el bloque de headers hasta la primera línea vacía
///
/// Cada línea se corta en el primer `:`; nombre y valor se recortan.
/// Las líneas sin `:` se ignoran.
pub fn read_headers<R: BufRead>(reader: &mut R) -> Result<Headers, HttpError> {
    let mut headers = Headers::new();

    while let Some(line) = read_line(reader)? {
        if line.is_empty() {
            break;
        }

        match line.split_once(':') {
            Some((name, value)) => headers.set(name.trim(), value.trim()),
            None => debug!(line = %line, "header sin ':' ignorado"),
        }
    }

    Ok(headers)
}

/// Lee el body según los headers ya parseados
pub fn read_body<R: BufRead>(
    reader: &mut R,
    headers: &Headers,
) -> Result<Option<Vec<u8>>, HttpError> {
    if headers.is_chunked() {
        return read_chunked_body(reader).map(Some);
    }

    match headers.content_length() {
        Some(length) => read_up_to(reader, length).map(Some),
        None => Ok(None),
    }
}

/// Reensambla un body con `Transfer-Encoding: chunked`
///
/// ```text
/// 5\r\n
/// hello\r\n
/// 0\r\n
/// \r\n
/// ```
fn read_chunked_body<R: BufRead>(reader: &mut R) -> Result<Vec<u8>, HttpError> {
    let mut body = Vec::new();

    loop {
        let size_line = match read_line(reader)? {
            Some(line) => line,
            None => break,
        };

        // Las extensiones (`;name=value`) no se usan
        let size_text = size_line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_text, 16)
            .map_err(|_| HttpError::InvalidChunkSize(size_line.clone()))?;

        if size == 0 {
            read_line(reader)?;
            break;
        }

        let chunk = read_up_to(reader, size)?;
        let complete = chunk.len() == size;
        body.extend_from_slice(&chunk);

        if !complete {
            break;
        }

        // CRLF que cierra el chunk
        read_line(reader)?;
    }

    Ok(body)
}

/// Lee `length` bytes, reintentando lecturas parciales, o hasta EOF
fn read_up_to<R: BufRead>(reader: &mut R, length: usize) -> Result<Vec<u8>, HttpError> {
    let mut buffer = Vec::with_capacity(length.min(64 * 1024));
    reader.take(length as u64).read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Lee un request completo (request line, headers y body)
///
/// `Ok(None)` significa que el peer cerró sin enviar nada (o envió una
/// línea vacía): no hay request que atender.
pub fn read_request<R: BufRead>(reader: &mut R) -> Result<Option<Request>, HttpError> {
    let line = match read_line(reader)? {
        Some(line) if !line.is_empty() => line,
        _ => return Ok(None),
    };

    // Formato: METHOD target VERSION, separados por un espacio
    let parts: Vec<&str> = line.split(' ').collect();
    if parts.len() != 3 {
        return Err(HttpError::InvalidRequestLine(line));
    }

    let mut request = Request::from_parts(Method::parse(parts[0]), parts[1], parts[2]);
    *request.headers_mut() = read_headers(reader)?;

    let body = read_body(reader, request.headers())?;
    request.set_body(body);

    Ok(Some(request))
}

/// Lee una respuesta completa (status line, headers y body)
pub fn read_response<R: BufRead>(reader: &mut R) -> Result<Response, HttpError> {
    let line = match read_line(reader)? {
        Some(line) if !line.is_empty() => line,
        _ => return Err(HttpError::EmptyResponse),
    };

    // Formato: VERSION code reason (la reason puede tener espacios o faltar)
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    let code_text = parts
        .next()
        .ok_or_else(|| HttpError::InvalidStatusLine(line.clone()))?;
    let status_code: u16 = code_text
        .parse()
        .map_err(|_| HttpError::InvalidStatusCode(code_text.to_string()))?;
    let reason = parts.next().unwrap_or("");

    let mut response = Response::from_parts(version, status_code, reason);
    *response.headers_mut() = read_headers(reader)?;

    let body = read_body(reader, response.headers())?;
    response.set_body(body);

    Ok(response)
}
