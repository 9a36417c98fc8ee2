//! # Requests HTTP
//! src/http/request.rs
//!
//! Representación en memoria de un request, tanto el que el servidor lee
//! del socket como el que el cliente arma para enviar.
//!
//! ## Formato de un Request HTTP/1.1
//!
//! ```text
//! POST /api/login?lang=es HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 39\r\n
//! \r\n
//! {"username":"ana","password":"secreto"}
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD target VERSION`
//! 2. **Headers**: Pares `Name: Value` (uno por línea)
//! 3. **Empty Line**: `\r\n` que separa headers del body
//! 4. **Body**: Opcional; su largo lo define `Content-Length` o chunked

use super::headers::{names, Headers};
use crate::error::HttpError;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;

/// Versión que usa el cliente al enviar
pub const HTTP_1_1: &str = "HTTP/1.1";
pub const HTTP_1_0: &str = "HTTP/1.0";

/// Métodos HTTP reconocidos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    HEAD,
    OPTIONS,
    PATCH,
    /// Cualquier token que no sea uno de los anteriores
    UNKNOWN,
}

impl Method {
    /// Parsea un método HTTP sin distinguir mayúsculas
    ///
    /// Nunca falla: lo desconocido queda como `UNKNOWN`.
    ///
    /// # Ejemplo
    /// ```
    /// use socket_http::http::Method;
    /// assert_eq!(Method::parse("get"), Method::GET);
    /// assert_eq!(Method::parse("BREW"), Method::UNKNOWN);
    /// ```
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "HEAD" => Method::HEAD,
            "OPTIONS" => Method::OPTIONS,
            "PATCH" => Method::PATCH,
            _ => Method::UNKNOWN,
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::UNKNOWN => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representa un request HTTP
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP
    method: Method,

    /// Target tal como viaja en la request line (ej: "/a%20b?x=1")
    target: String,

    /// Path decodificado, sin query (ej: "/a b")
    path: String,

    /// Query parameters decodificados (ej: {"x": "1"})
    query_params: HashMap<String, String>,

    /// Versión HTTP tal como llegó ("HTTP/1.1", "HTTP/1.0", ...)
    version: String,

    headers: Headers,

    /// `None` = sin body; `Some(vec![])` = body de largo cero
    body: Option<Vec<u8>>,
}

impl Request {
    /// Crea un request HTTP/1.1 sin headers ni body
    ///
    /// # Ejemplo
    /// ```
    /// use socket_http::http::{Method, Request};
    ///
    /// let request = Request::new(Method::GET, "/search?q=rust%20lang");
    /// assert_eq!(request.path(), "/search");
    /// assert_eq!(request.query_param("q"), Some("rust lang"));
    /// ```
    pub fn new(method: Method, target: &str) -> Self {
        Self::from_parts(method, target, HTTP_1_1)
    }

    /// Crea un request a partir de las tres piezas de la request line
    pub fn from_parts(method: Method, target: &str, version: &str) -> Self {
        let (path, query_params) = Self::parse_path_and_query(target);
        Self {
            method,
            target: target.to_string(),
            path,
            query_params,
            version: version.to_string(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// Parsea un request completo desde bytes
    ///
    /// Atajo sobre el parser de streams para requests que ya están en memoria.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use socket_http::http::Request;
    ///
    /// let raw = b"GET /status?verbose=1 HTTP/1.1\r\nHost: localhost\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/status");
    /// assert_eq!(request.query_param("verbose"), Some("1"));
    /// assert_eq!(request.header("host"), Some("localhost"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, HttpError> {
        let mut reader = std::io::Cursor::new(buffer);
        super::parser::read_request(&mut reader)?.ok_or(HttpError::EmptyRequest)
    }

    /// Separa path y query string
    ///
    /// Ejemplo: "/docs/a%20b?page=2&q=x+y"
    /// Retorna: ("/docs/a b", {"page": "2", "q": "x y"})
    fn parse_path_and_query(target: &str) -> (String, HashMap<String, String>) {
        match target.split_once('?') {
            Some((path, query)) => (decode_path(path), parse_urlencoded(query)),
            None => (decode_path(target), HashMap::new()),
        }
    }

    // === Modificadores ===

    /// Asigna un header (last-write-wins)
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.set(name, value);
    }

    /// Agrega un header (versión builder)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn set_body(&mut self, body: Option<Vec<u8>>) {
        self.body = body;
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub(crate) fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    // === Métodos públicos para acceder a los campos ===

    pub fn method(&self) -> Method {
        self.method
    }

    /// Target sin decodificar, con query
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Obtiene un header específico (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Obtiene el body del request como String (si es UTF-8 válido)
    pub fn body_string(&self) -> Option<String> {
        self.body
            .as_ref()
            .and_then(|b| String::from_utf8(b.clone()).ok())
    }

    pub fn content_length(&self) -> Option<usize> {
        self.headers.content_length()
    }

    /// Campos de un body `application/x-www-form-urlencoded`
    ///
    /// Retorna un mapa vacío si el Content-Type es otro.
    pub fn form_params(&self) -> HashMap<String, String> {
        let is_form = self
            .header(names::CONTENT_TYPE)
            .map(|ct| ct.contains("application/x-www-form-urlencoded"))
            .unwrap_or(false);
        match (is_form, self.body_string()) {
            (true, Some(body)) => parse_urlencoded(&body),
            _ => HashMap::new(),
        }
    }

    /// ¿El cliente pidió mantener la conexión?
    pub fn is_keep_alive(&self) -> bool {
        self.headers.keep_alive_for(&self.version)
    }
}

/// Decodifica un path igual que un componente de formulario (`%XX` y `+`)
fn decode_path(path: &str) -> String {
    decode_form_component(path)
}

/// Parsea `a=1&b=x+y` decodificando claves y valores (`+` es espacio)
pub(crate) fn parse_urlencoded(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(decode_form_component(key), decode_form_component(value));
    }

    params
}

fn decode_form_component(s: &str) -> String {
    let spaced = s.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
