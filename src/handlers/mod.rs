//! # Handlers del Servidor
//! src/handlers/mod.rs
//!
//! Rutas que expone el binario `socket_http`:
//!
//! | Método | Path             | Handler                               |
//! |--------|------------------|---------------------------------------|
//! | GET    | /api/status      | estado del servidor (JSON)            |
//! | POST   | /api/register    | alta de usuario                       |
//! | POST   | /api/login       | login, devuelve token                 |
//! | GET    | /old-page        | 301 → /index.html                     |
//! | GET    | /temp-redirect   | 302 → /index.html                     |
//! | GET    | /api/error       | falla a propósito (500)               |
//! | *      | (resto)          | archivos estáticos                    |

pub mod mime;
pub mod static_files;
pub mod users;

pub use static_files::StaticFileHandler;
pub use users::{login_handler, register_handler, UserStore};

use crate::config::{Config, SERVER_NAME};
use crate::http::{Request, Response};
use crate::router::{HandlerResult, Router, RouterBuilder};
use serde_json::json;
use std::io;
use std::sync::Arc;

/// Arma el router completo de la aplicación
pub fn build_router(config: &Config, users: Arc<UserStore>) -> Router {
    let port = config.port;
    let register_users = Arc::clone(&users);
    let login_users = Arc::clone(&users);
    let status_users = users;

    RouterBuilder::new()
        .get("/api/status", move |req: &Request| status_handler(req, port, &status_users))
        .post("/api/register", move |req: &Request| register_handler(&register_users, req))
        .post("/api/login", move |req: &Request| login_handler(&login_users, req))
        .get("/old-page", |_req: &Request| Ok(Response::moved_permanently("/index.html")))
        .get("/temp-redirect", |_req: &Request| Ok(Response::found("/index.html")))
        .get("/api/error", error_handler)
        .default_handler(StaticFileHandler::new(config.static_dir.clone()))
        .build()
}

/// Handler para /api/status
///
/// # Ejemplo de response
/// ```json
/// {"status": "running", "port": 8080, "server": "SimpleHttpServer/1.0", "users": 3}
/// ```
pub fn status_handler(_req: &Request, port: u16, users: &UserStore) -> HandlerResult {
    let body = json!({
        "status": "running",
        "port": port,
        "server": SERVER_NAME,
        "users": users.len(),
    });
    Ok(Response::json(&body.to_string()))
}

/// Handler para /api/error: siempre falla
pub fn error_handler(_req: &Request) -> HandlerResult {
    Err(Box::new(io::Error::new(
        io::ErrorKind::Other,
        "This is a test error for 500 status code",
    )))
}
