//! # Caché condicional
//! src/cache/mod.rs
//!
//! Dos lados del mismo mecanismo (`Last-Modified` / `If-Modified-Since`):
//!
//! - `ResponseCache`: lo usa el cliente para recordar el `Last-Modified` de
//!   cada URL y mandarlo de vuelta en el siguiente GET.
//! - `conditional`: lo usa el servidor para decidir entre 200 y 304.

pub mod conditional;

use std::collections::HashMap;

/// Lo que el cliente recuerda de una URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Valor del header `Last-Modified` tal cual llegó
    pub last_modified: String,

    /// Body de la respuesta 200 (texto)
    pub body: Option<String>,
}

/// Caché del cliente, indexada por la URL exacta que pidió el usuario
///
/// No expira por edad ni por tamaño: solo se vacía con `clear()`.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: HashMap<String, CacheEntry>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Valor para `If-Modified-Since` si la URL está en caché
    ///
    /// # Ejemplo
    /// ```
    /// use socket_http::cache::ResponseCache;
    ///
    /// let mut cache = ResponseCache::new();
    /// cache.store("http://localhost/a", "Tue, 01 Jan 2030 00:00:00 GMT", None);
    ///
    /// assert_eq!(
    ///     cache.if_modified_since("http://localhost/a"),
    ///     Some("Tue, 01 Jan 2030 00:00:00 GMT")
    /// );
    /// assert_eq!(cache.if_modified_since("http://localhost/a?x=1"), None);
    /// ```
    pub fn if_modified_since(&self, url: &str) -> Option<&str> {
        self.entries.get(url).map(|e| e.last_modified.as_str())
    }

    pub fn get(&self, url: &str) -> Option<&CacheEntry> {
        self.entries.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    /// Inserta o reemplaza la entrada de `url`
    pub fn store(&mut self, url: &str, last_modified: &str, body: Option<String>) {
        self.entries.insert(
            url.to_string(),
            CacheEntry {
                last_modified: last_modified.to_string(),
                body,
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_replaces_entry() {
        let mut cache = ResponseCache::new();
        cache.store("http://h/a", "old", Some("v1".to_string()));
        cache.store("http://h/a", "new", Some("v2".to_string()));

        assert_eq!(cache.len(), 1);
        let entry = cache.get("http://h/a").unwrap();
        assert_eq!(entry.last_modified, "new");
        assert_eq!(entry.body.as_deref(), Some("v2"));
    }

    #[test]
    fn test_keyed_by_exact_url() {
        let mut cache = ResponseCache::new();
        cache.store("http://h/a", "x", None);

        assert!(cache.contains("http://h/a"));
        assert!(!cache.contains("http://h:80/a"));
        assert!(!cache.contains("http://h/a/"));
    }

    #[test]
    fn test_clear() {
        let mut cache = ResponseCache::new();
        cache.store("http://h/a", "x", None);
        cache.store("http://h/b", "y", None);
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.if_modified_since("http://h/a"), None);
    }
}
