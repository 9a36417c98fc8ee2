//! # Headers HTTP
//! src/http/headers.rs
//!
//! Colección de headers compartida por requests y responses.
//!
//! - La búsqueda por nombre no distingue mayúsculas/minúsculas.
//! - Se conserva el orden de inserción (es el orden en que se serializan).
//! - Si un nombre se asigna dos veces, el valor nuevo reemplaza al anterior
//!   en su misma posición. No se combinan valores múltiples: de varios
//!   `Set-Cookie` solo sobrevive el último.

/// Nombres de headers usados por el cliente y el servidor
pub mod names {
    pub const HOST: &str = "Host";
    pub const CONNECTION: &str = "Connection";
    pub const KEEP_ALIVE: &str = "Keep-Alive";
    pub const CONTENT_LENGTH: &str = "Content-Length";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const TRANSFER_ENCODING: &str = "Transfer-Encoding";
    pub const LOCATION: &str = "Location";
    pub const LAST_MODIFIED: &str = "Last-Modified";
    pub const IF_MODIFIED_SINCE: &str = "If-Modified-Since";
    pub const SERVER: &str = "Server";
    pub const DATE: &str = "Date";
    pub const USER_AGENT: &str = "User-Agent";
    pub const ACCEPT: &str = "Accept";
    pub const RETRY_AFTER: &str = "Retry-After";
}

/// Lista ordenada de pares `(nombre, valor)`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Asigna un header
    ///
    /// Si ya existe (sin importar mayúsculas), se sobrescribe el valor y se
    /// mantiene la posición original.
    ///
    /// # Ejemplo
    /// ```
    /// use socket_http::http::Headers;
    ///
    /// let mut headers = Headers::new();
    /// headers.set("content-type", "text/plain");
    /// headers.set("Content-Type", "application/json");
    ///
    /// assert_eq!(headers.len(), 1);
    /// assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
    /// ```
    pub fn set(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(i) => self.entries[i].1 = value.to_string(),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
    }

    /// Obtiene el valor de un header
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.entries[i].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Elimina un header y retorna su valor
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|i| self.entries.remove(i).1)
    }

    /// Itera en orden de inserción
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compara el valor de un header con `expected` sin distinguir mayúsculas
    pub fn value_eq_ignore_case(&self, name: &str, expected: &str) -> bool {
        self.get(name)
            .map(|v| v.eq_ignore_ascii_case(expected))
            .unwrap_or(false)
    }

    /// `Content-Length` numérico, si existe
    pub fn content_length(&self) -> Option<usize> {
        self.get(names::CONTENT_LENGTH)
            .and_then(|v| v.trim().parse::<usize>().ok())
    }

    /// `true` si `Transfer-Encoding: chunked`
    pub fn is_chunked(&self) -> bool {
        self.value_eq_ignore_case(names::TRANSFER_ENCODING, "chunked")
    }

    /// Regla de conexión persistente compartida por request y response:
    /// un `Connection` explícito manda ("keep-alive" → sí, otro valor → no);
    /// sin el header, solo HTTP/1.1 mantiene la conexión.
    pub fn keep_alive_for(&self, version: &str) -> bool {
        match self.get(names::CONNECTION) {
            Some(value) => value.eq_ignore_ascii_case("keep-alive"),
            None => version == "HTTP/1.1",
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Headers {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}
