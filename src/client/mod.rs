//! # Cliente HTTP
//! src/client/mod.rs
//!
//! Cliente HTTP/1.1 sobre `TcpStream`:
//!
//! - Reutiliza una única conexión mientras el (host, port) no cambie.
//! - Sigue redirecciones (301, 302, 303, 307, 308) hasta `max_redirects`.
//!   301 y 302 pasan a GET sin body; el resto conserva método y body.
//! - Recuerda el `Last-Modified` de cada GET 200 y lo envía como
//!   `If-Modified-Since` en el siguiente GET a la misma URL.
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use socket_http::client::HttpClient;
//!
//! let mut client = HttpClient::new();
//! let response = client.get("http://localhost:8080/index.html").unwrap();
//! println!("{} ({} bytes)", response, response.body().map_or(0, |b| b.len()));
//! ```

mod connection;

pub use connection::Connection;

use crate::cache::ResponseCache;
use crate::error::HttpError;
use crate::http::headers::names;
use crate::http::{encoder, Headers, Method, Request, Response};
use std::time::Duration;
use tracing::{debug, info};
use url::{form_urlencoded, Url};

pub const DEFAULT_USER_AGENT: &str = "SimpleHttpClient/1.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Opciones del cliente
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout de lectura/escritura del socket
    pub timeout: Duration,

    /// Redirecciones que se siguen antes de fallar
    pub max_redirects: usize,

    pub follow_redirects: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            follow_redirects: true,
        }
    }
}

/// Destino de un request: a dónde conectar y qué poner en la request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    /// Path + `?query`, listo para la request line
    pub path_and_query: String,
}

impl Target {
    /// Extrae host, puerto (80 por defecto), path ("/" por defecto) y query
    ///
    /// # Ejemplo
    /// ```
    /// use socket_http::client::Target;
    ///
    /// let target = Target::parse("http://localhost:8080/search?q=1").unwrap();
    /// assert_eq!(target.host, "localhost");
    /// assert_eq!(target.port, 8080);
    /// assert_eq!(target.path_and_query, "/search?q=1");
    /// ```
    pub fn parse(url: &str) -> Result<Self, HttpError> {
        let parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl(format!("{}: {}", url, e)))?;

        if parsed.scheme() != "http" {
            return Err(HttpError::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                url,
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| HttpError::InvalidUrl(format!("{}: missing host", url)))?;

        let mut path_and_query = match parsed.path() {
            "" => "/".to_string(),
            path => path.to_string(),
        };
        if let Some(query) = parsed.query() {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }

        Ok(Self {
            host: host.to_string(),
            port: parsed.port().unwrap_or(80),
            path_and_query,
        })
    }

    /// `http://host[:port]` (sin puerto si es 80)
    fn origin(&self) -> String {
        if self.port == 80 {
            format!("http://{}", self.host)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    /// Resuelve un `Location` relativo contra este destino
    ///
    /// `/x` y `x` quedan como `http://host[:port]/x`; las URLs absolutas
    /// pasan sin cambios.
    pub fn resolve(&self, location: &str) -> String {
        if location.starts_with("http://") || location.starts_with("https://") {
            location.to_string()
        } else if location.starts_with('/') {
            format!("{}{}", self.origin(), location)
        } else {
            format!("{}/{}", self.origin(), location)
        }
    }
}

/// Cliente con una conexión reutilizable y caché de `Last-Modified`
pub struct HttpClient {
    config: ClientConfig,
    cache: ResponseCache,
    connection: Option<Connection>,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            cache: ResponseCache::new(),
            connection: None,
        }
    }

    // === Atajos ===

    pub fn get(&mut self, url: &str) -> Result<Response, HttpError> {
        self.send(Method::GET, url, &Headers::new(), None)
    }

    pub fn get_with_headers(&mut self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.send(Method::GET, url, headers, None)
    }

    /// POST con `Content-Type: application/json; charset=UTF-8`
    pub fn post_json(&mut self, url: &str, json: &str) -> Result<Response, HttpError> {
        let mut headers = Headers::new();
        headers.set(names::CONTENT_TYPE, "application/json; charset=UTF-8");
        self.send(Method::POST, url, &headers, Some(json.as_bytes()))
    }

    /// POST `application/x-www-form-urlencoded`, campos en el orden dado
    pub fn post_form(&mut self, url: &str, fields: &[(&str, &str)]) -> Result<Response, HttpError> {
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter())
            .finish();

        let mut headers = Headers::new();
        headers.set(names::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(Method::POST, url, &headers, Some(body.as_bytes()))
    }

    /// Envía un request y devuelve la respuesta final (tras redirecciones)
    pub fn send(
        &mut self,
        method: Method,
        url: &str,
        headers: &Headers,
        body: Option<&[u8]>,
    ) -> Result<Response, HttpError> {
        self.send_following(method, url, headers.clone(), body.map(|b| b.to_vec()), 0)
    }

    fn send_following(
        &mut self,
        method: Method,
        url: &str,
        mut headers: Headers,
        body: Option<Vec<u8>>,
        redirect_count: usize,
    ) -> Result<Response, HttpError> {
        if redirect_count > self.config.max_redirects {
            return Err(HttpError::TooManyRedirects(self.config.max_redirects));
        }

        let target = Target::parse(url)?;

        if method == Method::GET {
            if let Some(last_modified) = self.cache.if_modified_since(url) {
                headers.set(names::IF_MODIFIED_SINCE, last_modified);
            }
        }

        let request = self.build_request(method, &target, &headers, body.clone());
        let bytes = encoder::encode_request(&request, &target.host, target.port);

        info!("{} {}", method, url);
        let response = self.exchange(&target, &bytes)?;
        info!("{} <- {}", response, url);

        // 304 con entrada en caché: se devuelve tal cual
        if response.is_not_modified() && self.cache.contains(url) {
            debug!("Not modified: {}", url);
            self.close_if_requested(&response);
            return Ok(response);
        }

        if method == Method::GET && response.status_code() == 200 {
            if let Some(last_modified) = response.last_modified() {
                debug!("Caching {} (Last-Modified: {})", url, last_modified);
                self.cache.store(url, last_modified, response.body_string());
            }
        }

        if self.config.follow_redirects && response.is_redirect() {
            if let Some(location) = response.location() {
                let next = target.resolve(location);
                info!("Redirect {} -> {}", response.status_code(), next);

                // El destino puede ser otro servidor
                self.close_connection();

                return match response.status_code() {
                    301 | 302 => {
                        self.send_following(Method::GET, &next, Headers::new(), None, redirect_count + 1)
                    }
                    _ => {
                        headers.remove(names::IF_MODIFIED_SINCE);
                        self.send_following(method, &next, headers, body, redirect_count + 1)
                    }
                };
            }
        }

        self.close_if_requested(&response);
        Ok(response)
    }

    /// Request con los headers por defecto; los del caller los sobrescriben
    fn build_request(
        &self,
        method: Method,
        target: &Target,
        headers: &Headers,
        body: Option<Vec<u8>>,
    ) -> Request {
        let mut request = Request::new(method, &target.path_and_query)
            .with_header(names::USER_AGENT, DEFAULT_USER_AGENT)
            .with_header(names::ACCEPT, "*/*")
            .with_header(names::CONNECTION, "keep-alive");

        for (name, value) in headers.iter() {
            request.set_header(name, value);
        }
        request.set_body(body);
        request
    }

    /// Escribe y lee por la conexión actual (o una nueva)
    ///
    /// Si falla, la conexión se descarta para no reutilizar un socket roto.
    fn exchange(&mut self, target: &Target, bytes: &[u8]) -> Result<Response, HttpError> {
        let mut connection = match self.connection.take() {
            Some(conn) if conn.matches(&target.host, target.port) && conn.is_open() => {
                debug!("Reusing connection to {}:{}", target.host, target.port);
                conn
            }
            Some(stale) => {
                stale.close();
                Connection::open(&target.host, target.port, self.config.timeout)?
            }
            None => Connection::open(&target.host, target.port, self.config.timeout)?,
        };

        match connection.exchange(bytes) {
            Ok(response) => {
                self.connection = Some(connection);
                Ok(response)
            }
            Err(e) => {
                connection.close();
                Err(e)
            }
        }
    }

    fn close_if_requested(&mut self, response: &Response) {
        if !response.is_keep_alive() {
            self.close_connection();
        }
    }

    /// Cierra la conexión actual (si hay)
    pub fn close_connection(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
        }
    }

    /// Cierra la conexión y vacía la caché
    pub fn close(&mut self) {
        self.close_connection();
        self.cache.clear();
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// `(host, port)` de la conexión abierta, si hay
    pub fn connected_to(&self) -> Option<(&str, u16)> {
        self.connection.as_ref().map(|c| (c.host(), c.port()))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.config.timeout = timeout;
    }

    pub fn set_max_redirects(&mut self, max_redirects: usize) {
        self.config.max_redirects = max_redirects;
    }

    pub fn set_follow_redirects(&mut self, follow: bool) {
        self.config.follow_redirects = follow;
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HttpClient {
    fn drop(&mut self) {
        self.close_connection();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_defaults() {
        let target = Target::parse("http://example.com").unwrap();
        assert_eq!(target.host, "example.com");
        assert_eq!(target.port, 80);
        assert_eq!(target.path_and_query, "/");
    }

    #[test]
    fn test_target_keeps_raw_query() {
        let target = Target::parse("http://h:9000/a/b?x=1&y=%20").unwrap();
        assert_eq!(target.port, 9000);
        assert_eq!(target.path_and_query, "/a/b?x=1&y=%20");
    }

    #[test]
    fn test_target_rejects_other_schemes() {
        assert!(matches!(
            Target::parse("https://example.com/"),
            Err(HttpError::InvalidUrl(_))
        ));
        assert!(matches!(Target::parse("not a url"), Err(HttpError::InvalidUrl(_))));
    }

    #[test]
    fn test_resolve_relative_locations() {
        let target = Target::parse("http://localhost:8080/old").unwrap();
        assert_eq!(target.resolve("/new"), "http://localhost:8080/new");
        assert_eq!(target.resolve("new"), "http://localhost:8080/new");
        assert_eq!(target.resolve("http://other/x"), "http://other/x");

        let target = Target::parse("http://localhost/old").unwrap();
        assert_eq!(target.resolve("/new"), "http://localhost/new");
    }

    #[test]
    fn test_default_headers_overridden_by_caller() {
        let client = HttpClient::new();
        let target = Target::parse("http://h/").unwrap();
        let mut headers = Headers::new();
        headers.set("user-agent", "custom/2.0");

        let request = client.build_request(Method::GET, &target, &headers, None);
        assert_eq!(request.header("User-Agent"), Some("custom/2.0"));
        assert_eq!(request.header("Accept"), Some("*/*"));
        assert_eq!(request.header("Connection"), Some("keep-alive"));
    }

    #[test]
    fn test_setters() {
        let mut client = HttpClient::new();
        client.set_max_redirects(3);
        client.set_follow_redirects(false);
        client.set_timeout(Duration::from_secs(1));

        assert_eq!(client.config().max_redirects, 3);
        assert!(!client.config().follow_redirects);
        assert_eq!(client.config().timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_redirect_limit_checked_before_connecting() {
        let mut client = HttpClient::new();
        client.set_max_redirects(2);

        let result = client.send_following(Method::GET, "http://127.0.0.1:1/", Headers::new(), None, 3);
        assert!(matches!(result, Err(HttpError::TooManyRedirects(2))));
    }
}
