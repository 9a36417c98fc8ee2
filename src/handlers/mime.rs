//! # Tipos MIME
//! src/handlers/mime.rs
//!
//! Tabla extensión → `Content-Type` para los archivos estáticos.

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

const MIME_TYPES: &[(&str, &str)] = &[
    // Texto
    ("html", "text/html; charset=UTF-8"),
    ("htm", "text/html; charset=UTF-8"),
    ("css", "text/css; charset=UTF-8"),
    ("js", "application/javascript; charset=UTF-8"),
    ("json", "application/json; charset=UTF-8"),
    ("xml", "application/xml; charset=UTF-8"),
    ("txt", "text/plain; charset=UTF-8"),
    // Imágenes
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("ico", "image/x-icon"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    // Otros binarios
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
];

/// `Content-Type` según la extensión del nombre (sin distinguir mayúsculas)
///
/// # Ejemplo
/// ```
/// use socket_http::handlers::mime::mime_type;
///
/// assert_eq!(mime_type("index.HTML"), "text/html; charset=UTF-8");
/// assert_eq!(mime_type("logo.png"), "image/png");
/// assert_eq!(mime_type("README"), "application/octet-stream");
/// ```
pub fn mime_type(file_name: &str) -> &'static str {
    let Some((_, extension)) = file_name.rsplit_once('.') else {
        return DEFAULT_MIME_TYPE;
    };

    MIME_TYPES
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME_TYPE)
}

pub fn is_text_type(mime: &str) -> bool {
    mime.starts_with("text/")
        || mime.contains("json")
        || mime.contains("xml")
        || mime.contains("javascript")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(mime_type("app.js"), "application/javascript; charset=UTF-8");
        assert_eq!(mime_type("/static/photo.JPeG"), "image/jpeg");
        assert_eq!(mime_type("font.woff2"), "font/woff2");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(mime_type("archive.tar.gz"), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type("Makefile"), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_is_text_type() {
        assert!(is_text_type(mime_type("a.css")));
        assert!(is_text_type(mime_type("a.svg")));
        assert!(!is_text_type(mime_type("a.png")));
    }
}
