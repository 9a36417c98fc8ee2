//! # Construcción de Respuestas HTTP
//!
//! Este módulo proporciona una API para construir respuestas HTTP/1.1
//! de forma programática. El cliente usa el mismo tipo para las respuestas
//! que lee del socket, por eso el código se guarda como número y la reason
//! phrase como texto libre.
//!
//! ## Formato de una respuesta HTTP/1.1
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: application/json; charset=UTF-8\r\n
//! Content-Length: 13\r\n
//! Connection: keep-alive\r\n
//! \r\n
//! {"ok": true}
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use socket_http::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "application/json")
//!     .with_body(r#"{"message": "Hello"}"#);
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

use super::headers::{names, Headers};
use super::request::HTTP_1_1;
use super::StatusCode;
use serde_json::json;

/// Códigos que el cliente sigue como redirección
const REDIRECT_CODES: [u16; 5] = [301, 302, 303, 307, 308];

/// Representa una respuesta HTTP completa
#[derive(Debug, Clone)]
pub struct Response {
    version: String,

    /// Código numérico (200, 404, ...); no tiene que estar en el catálogo
    status_code: u16,

    reason: String,

    headers: Headers,

    /// `None` = sin body (ej: 304)
    body: Option<Vec<u8>>,
}

impl Response {
    /// Crea una nueva respuesta HTTP/1.1 con el código especificado
    ///
    /// Por defecto, la respuesta no tiene headers ni body.
    pub fn new(status: StatusCode) -> Self {
        Self::from_parts(HTTP_1_1, status.as_u16(), status.reason_phrase())
    }

    /// Crea una respuesta desde las piezas de la status line
    pub fn from_parts(version: &str, status_code: u16, reason: &str) -> Self {
        Self {
            version: version.to_string(),
            status_code,
            reason: reason.to_string(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// Agrega un header a la respuesta
    ///
    /// Si el header ya existe, se sobrescribe.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.set(name, value);
    }

    /// Establece el cuerpo de la respuesta desde un string
    ///
    /// Automáticamente calcula y agrega el header `Content-Length`.
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el cuerpo de la respuesta desde bytes
    ///
    /// Útil para respuestas binarias (imágenes, archivos, etc.)
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.headers
            .set(names::CONTENT_LENGTH, &body.len().to_string());
        self.body = Some(body);
        self
    }

    pub(crate) fn set_body(&mut self, body: Option<Vec<u8>>) {
        self.body = body;
    }

    pub(crate) fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    // === Atajos para respuestas comunes ===

    /// 200 con `Content-Type: application/json; charset=UTF-8`
    pub fn json(body: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header(names::CONTENT_TYPE, "application/json; charset=UTF-8")
            .with_body(body)
    }

    /// 200 con HTML
    pub fn html(body: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header(names::CONTENT_TYPE, "text/html; charset=UTF-8")
            .with_body(body)
    }

    /// 200 con texto plano
    pub fn text(body: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header(names::CONTENT_TYPE, "text/plain; charset=UTF-8")
            .with_body(body)
    }

    /// Respuesta de error con cuerpo JSON
    ///
    /// Formato: `{"code": 400, "message": "..."}`
    ///
    /// # Ejemplo
    /// ```
    /// use socket_http::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::BadRequest, "Invalid \"path\"");
    /// assert_eq!(response.status_code(), 400);
    /// assert!(response.body_string().unwrap().contains(r#"Invalid \"path\""#));
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = json!({ "code": status.as_u16(), "message": message }).to_string();
        Self::new(status)
            .with_header(names::CONTENT_TYPE, "application/json; charset=UTF-8")
            .with_body(&body)
    }

    /// 301 con `Location`
    pub fn moved_permanently(location: &str) -> Self {
        Self::redirect(StatusCode::MovedPermanently, location)
    }

    /// 302 con `Location`
    pub fn found(location: &str) -> Self {
        Self::redirect(StatusCode::Found, location)
    }

    fn redirect(status: StatusCode, location: &str) -> Self {
        let body = format!(
            "<html><body><h1>{}</h1><p>Redirecting to <a href=\"{}\">{}</a></p></body></html>",
            status, location, location
        );
        Self::new(status)
            .with_header(names::LOCATION, location)
            .with_header(names::CONTENT_TYPE, "text/html; charset=UTF-8")
            .with_body(&body)
    }

    /// 304 sin body
    pub fn not_modified() -> Self {
        Self::new(StatusCode::NotModified)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::error(StatusCode::BadRequest, message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NotFound)
            .with_header(names::CONTENT_TYPE, "text/html; charset=UTF-8")
            .with_body("<html><body><h1>404 Not Found</h1><p>The requested resource was not found on this server.</p></body></html>")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::MethodNotAllowed)
            .with_header(names::CONTENT_TYPE, "text/html; charset=UTF-8")
            .with_body("<html><body><h1>405 Method Not Allowed</h1><p>The request method is not supported for this resource.</p></body></html>")
    }

    /// 500 con el mensaje del fallo en el body
    ///
    /// El mensaje llega tal cual al cliente, incluido lo que diga el error
    /// del handler.
    pub fn internal_server_error(message: &str) -> Self {
        Self::error(StatusCode::InternalServerError, message)
    }

    /// Fija `Connection` (y `Keep-Alive` cuando se mantiene la conexión)
    pub fn set_keep_alive(&mut self, keep_alive: bool, timeout_secs: u64, max_requests: usize) {
        if keep_alive {
            self.headers.set(names::CONNECTION, "keep-alive");
            self.headers.set(
                names::KEEP_ALIVE,
                &format!("timeout={}, max={}", timeout_secs, max_requests),
            );
        } else {
            self.headers.set(names::CONNECTION, "close");
            self.headers.remove(names::KEEP_ALIVE);
        }
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    pub fn to_bytes(&self) -> Vec<u8> {
        super::encoder::encode_response(self)
    }

    // === Getters ===

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// El código como variante del catálogo, si lo es
    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.status_code)
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Body como texto (UTF-8 con reemplazo de bytes inválidos)
    pub fn body_string(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(names::LOCATION)
    }

    pub fn last_modified(&self) -> Option<&str> {
        self.headers.get(names::LAST_MODIFIED)
    }

    pub fn is_redirect(&self) -> bool {
        REDIRECT_CODES.contains(&self.status_code)
    }

    pub fn is_not_modified(&self) -> bool {
        self.status_code == StatusCode::NotModified.as_u16()
    }

    /// Misma regla que en el request, aplicada a la respuesta
    pub fn is_keep_alive(&self) -> bool {
        self.headers.keep_alive_for(&self.version)
    }
}

impl std::fmt::Display for Response {
    /// Formato: "HTTP/1.1 200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.version, self.status_code, self.reason)
    }
}
