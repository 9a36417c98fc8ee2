//! # Archivos estáticos
//! src/handlers/static_files.rs
//!
//! Sirve archivos desde un directorio raíz con soporte de GET condicional:
//!
//! | Caso                                   | Respuesta                  |
//! |----------------------------------------|----------------------------|
//! | método distinto de GET                 | 405                        |
//! | path con `..`                          | 400                        |
//! | no existe o no es archivo              | 404                        |
//! | `If-Modified-Since` >= mtime           | 304 + `Last-Modified`      |
//! | error leyendo                          | 500                        |
//! | resto                                  | 200 + tipo MIME + fecha    |
//!
//! `/` se sirve como `/index.html`.

use super::mime::mime_type;
use crate::cache::conditional::{format_http_date, is_not_modified, truncate_to_seconds};
use crate::http::headers::names;
use crate::http::{Method, Request, Response, StatusCode};
use crate::router::{Handler, HandlerResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

pub struct StaticFileHandler {
    root: PathBuf,
}

impl StaticFileHandler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn serve(&self, request: &Request) -> Response {
        if request.method() != Method::GET {
            return Response::method_not_allowed();
        }

        let path = match request.path() {
            "/" => "/index.html",
            other => other,
        };

        if path.contains("..") {
            return Response::bad_request("Invalid path");
        }

        let file = self.root.join(path.trim_start_matches('/'));
        let metadata = match fs::metadata(&file) {
            Ok(m) if m.is_file() => m,
            _ => return Response::not_found(),
        };

        let mtime = match metadata.modified() {
            Ok(t) => truncate_to_seconds(t),
            Err(e) => {
                error!("Cannot read mtime of {}: {}", file.display(), e);
                return Response::internal_server_error("Failed to read file");
            }
        };
        let last_modified = format_http_date(mtime);

        if is_not_modified(mtime, request.header(names::IF_MODIFIED_SINCE)) {
            debug!("Not modified: {}", file.display());
            return Response::not_modified().with_header(names::LAST_MODIFIED, &last_modified);
        }

        match fs::read(&file) {
            Ok(content) => Response::new(StatusCode::Ok)
                .with_header(names::CONTENT_TYPE, mime_type(path))
                .with_header(names::LAST_MODIFIED, &last_modified)
                .with_body_bytes(content),
            Err(e) => {
                error!("Failed to read {}: {}", file.display(), e);
                Response::internal_server_error("Failed to read file")
            }
        }
    }
}

impl Handler for StaticFileHandler {
    fn handle(&self, request: &Request) -> HandlerResult {
        Ok(self.serve(request))
    }
}
