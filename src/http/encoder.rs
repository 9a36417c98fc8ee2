//! # Serialización de mensajes HTTP
//! src/http/encoder.rs
//!
//! Genera los bytes exactos que viajan por el socket.
//!
//! Request:
//!
//! ```text
//! METHOD target VERSION\r\n
//! Host: host[:port]\r\n         <- siempre primero; sin puerto si es 80
//! Header: value\r\n             <- orden de inserción
//! Content-Length: n\r\n         <- calculado si hay body
//! \r\n
//! body
//! ```
//!
//! Response: status line, headers en orden de inserción, línea vacía y body.
//! Si la respuesta lleva `Transfer-Encoding: chunked` el body sale en chunks.

use super::headers::names;
use super::request::Request;
use super::response::Response;

/// Tamaño de chunk cuando el servidor responde con `chunked`
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

const CRLF: &[u8] = b"\r\n";

/// Serializa un request dirigido a `host:port`
///
/// # Ejemplo
/// ```
/// use socket_http::http::{encoder, Method, Request};
///
/// let request = Request::new(Method::POST, "/api/login").with_body("{}");
/// let bytes = encoder::encode_request(&request, "localhost", 8080);
///
/// assert_eq!(
///     String::from_utf8(bytes).unwrap(),
///     "POST /api/login HTTP/1.1\r\nHost: localhost:8080\r\nContent-Length: 2\r\n\r\n{}"
/// );
/// ```
pub fn encode_request(request: &Request, host: &str, port: u16) -> Vec<u8> {
    let mut out = Vec::new();

    // 1. Request line
    let request_line = format!(
        "{} {} {}\r\n",
        request.method().as_str(),
        request.target(),
        request.version()
    );
    out.extend_from_slice(request_line.as_bytes());

    // 2. Host siempre primero
    let host_value = if port == 80 {
        host.to_string()
    } else {
        format!("{}:{}", host, port)
    };
    push_header(&mut out, names::HOST, &host_value);

    // 3. Resto de headers; Content-Length lo calculamos nosotros
    let body = request.body().filter(|b| !b.is_empty());
    for (name, value) in request.headers().iter() {
        if name.eq_ignore_ascii_case(names::HOST) {
            continue;
        }
        if body.is_some() && name.eq_ignore_ascii_case(names::CONTENT_LENGTH) {
            continue;
        }
        push_header(&mut out, name, value);
    }

    if let Some(body) = body {
        push_header(&mut out, names::CONTENT_LENGTH, &body.len().to_string());
    }

    // 4. Línea vacía + body
    out.extend_from_slice(CRLF);
    if let Some(body) = body {
        out.extend_from_slice(body);
    }

    out
}

/// Serializa una respuesta
pub fn encode_response(response: &Response) -> Vec<u8> {
    let mut out = Vec::new();

    // 1. Status line: HTTP/1.1 200 OK\r\n
    let status_line = format!(
        "{} {} {}\r\n",
        response.version(),
        response.status_code(),
        response.reason()
    );
    out.extend_from_slice(status_line.as_bytes());

    let chunked = response.headers().is_chunked();
    let body = response.body().filter(|b| !b.is_empty());

    // 2. Headers
    for (name, value) in response.headers().iter() {
        if chunked && name.eq_ignore_ascii_case(names::CONTENT_LENGTH) {
            continue;
        }
        push_header(&mut out, name, value);
    }

    if let Some(body) = body {
        if !chunked && !response.headers().contains(names::CONTENT_LENGTH) {
            push_header(&mut out, names::CONTENT_LENGTH, &body.len().to_string());
        }
    }

    // 3. Línea vacía
    out.extend_from_slice(CRLF);

    // 4. Body
    if chunked {
        out.extend_from_slice(&encode_chunked(body.unwrap_or_default(), DEFAULT_CHUNK_SIZE));
    } else if let Some(body) = body {
        out.extend_from_slice(body);
    }

    out
}

/// Codifica `body` en chunks de hasta `chunk_size` bytes, terminando con el
/// chunk de tamaño cero
///
/// # Ejemplo
/// ```
/// use socket_http::http::encoder::encode_chunked;
///
/// assert_eq!(encode_chunked(b"hello", 3), b"3\r\nhel\r\n2\r\nlo\r\n0\r\n\r\n");
/// ```
pub fn encode_chunked(body: &[u8], chunk_size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 16);

    for chunk in body.chunks(chunk_size.max(1)) {
        out.extend_from_slice(format!("{:X}\r\n", chunk.len()).as_bytes());
        out.extend_from_slice(chunk);
        out.extend_from_slice(CRLF);
    }
    out.extend_from_slice(b"0\r\n\r\n");

    out
}

fn push_header(out: &mut Vec<u8>, name: &str, value: &str) {
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(b": ");
    out.extend_from_slice(value.as_bytes());
    out.extend_from_slice(CRLF);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::parser::{read_request, read_response};
    use crate::http::{Method, StatusCode};
    use std::io::Cursor;

    #[test]
    fn test_host_first_and_default_port_omitted() {
        let request = Request::new(Method::GET, "/index.html?x=1")
            .with_header("Accept", "*/*")
            .with_header("Host", "ignored.example");
        let text = String::from_utf8(encode_request(&request, "example.com", 80)).unwrap();

        assert_eq!(
            text,
            "GET /index.html?x=1 HTTP/1.1\r\nHost: example.com\r\nAccept: */*\r\n\r\n"
        );
    }

    #[test]
    fn test_caller_content_length_replaced() {
        let request = Request::new(Method::PUT, "/x")
            .with_header("Content-Length", "999")
            .with_header("X-After", "1")
            .with_body("abc");
        let text = String::from_utf8(encode_request(&request, "h", 8080)).unwrap();

        assert!(text.contains("X-After: 1\r\nContent-Length: 3\r\n\r\nabc"));
        assert!(!text.contains("999"));
    }

    #[test]
    fn test_empty_body_has_no_content_length() {
        let request = Request::new(Method::POST, "/x").with_body("");
        let text = String::from_utf8(encode_request(&request, "h", 80)).unwrap();
        assert_eq!(text, "POST /x HTTP/1.1\r\nHost: h\r\n\r\n");
    }

    #[test]
    fn test_response_layout() {
        let response = Response::new(StatusCode::Ok)
            .with_header("Content-Type", "text/plain")
            .with_body("Test");
        let text = String::from_utf8(encode_response(&response)).unwrap();

        assert_eq!(
            text,
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 4\r\n\r\nTest"
        );
    }

    #[test]
    fn test_empty_body_response() {
        let text = String::from_utf8(encode_response(&Response::not_modified())).unwrap();
        assert_eq!(text, "HTTP/1.1 304 Not Modified\r\n\r\n");
    }

    #[test]
    fn test_request_body_round_trip() {
        let body: Vec<u8> = (0u8..=255).chain(b"\r\n\r\n".iter().copied()).collect();
        let request = Request::new(Method::POST, "/upload").with_body(body.clone());

        let bytes = encode_request(&request, "localhost", 8080);
        let parsed = read_request(&mut Cursor::new(bytes)).unwrap().unwrap();

        assert_eq!(parsed.body(), Some(&body[..]));
        assert_eq!(parsed.header("Host"), Some("localhost:8080"));
    }

    #[test]
    fn test_response_body_round_trip() {
        let response = Response::new(StatusCode::Created).with_body_bytes(vec![0, 13, 10, 255]);
        let parsed = read_response(&mut Cursor::new(encode_response(&response))).unwrap();

        assert_eq!(parsed.status_code(), 201);
        assert_eq!(parsed.body(), Some(&[0u8, 13, 10, 255][..]));
    }

    #[test]
    fn test_chunked_round_trip_various_sizes() {
        let body = b"The quick brown fox jumps over the lazy dog\r\n0\r\n\r\n".to_vec();

        for chunk_size in [1, 2, 3, 7, 16, body.len(), body.len() + 10] {
            let mut raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
            raw.extend_from_slice(&encode_chunked(&body, chunk_size));

            let parsed = read_response(&mut Cursor::new(raw)).unwrap();
            assert_eq!(parsed.body(), Some(&body[..]), "chunk_size = {}", chunk_size);
        }
    }

    #[test]
    fn test_chunked_empty_body() {
        assert_eq!(encode_chunked(b"", 4), b"0\r\n\r\n");
    }

    #[test]
    fn test_chunked_response_drops_content_length() {
        let response = Response::new(StatusCode::Ok)
            .with_header("Transfer-Encoding", "chunked")
            .with_body("hello");
        let text = String::from_utf8(encode_response(&response)).unwrap();

        assert!(!text.contains("Content-Length"));
        assert!(text.ends_with("\r\n\r\n5\r\nhello\r\n0\r\n\r\n"));

        let parsed = read_response(&mut Cursor::new(text.into_bytes())).unwrap();
        assert_eq!(parsed.body(), Some(&b"hello"[..]));
    }
}
