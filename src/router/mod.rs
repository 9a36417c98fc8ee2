//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Este módulo implementa el router que mapea (método, path) a handlers.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler → Response
//! ```
//!
//! - Coincidencia exacta del path: sin patrones, sin parámetros y sin
//!   normalizar la barra final.
//! - Si el path existe pero con otro método → 405 Method Not Allowed.
//! - Si no existe → handler por defecto (archivos estáticos), o 404.
//! - Un handler que retorna `Err` o entra en pánico produce un 500 con el
//!   mensaje del fallo en el body.
//!
//! La tabla se arma con `RouterBuilder` y queda inmutable; el servidor la
//! comparte entre threads con `Arc<Router>`.

use crate::http::{Method, Request, Response};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;

/// Error de un handler; cualquier error sirve gracias a `?`
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Lo que retorna un handler
pub type HandlerResult = Result<Response, BoxError>;

/// Un handler recibe un Request y produce una Response
///
/// Cualquier closure `Fn(&Request) -> HandlerResult` es un handler.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &Request) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> HandlerResult + Send + Sync,
{
    fn handle(&self, request: &Request) -> HandlerResult {
        self(request)
    }
}

/// Construye la tabla de rutas
///
/// # Ejemplo
/// ```
/// use socket_http::router::RouterBuilder;
/// use socket_http::http::{Method, Request, Response};
///
/// let router = RouterBuilder::new()
///     .get("/hello", |_req: &Request| Ok(Response::json(r#"{"message": "Hello"}"#)))
///     .build();
///
/// let response = router.route(&Request::new(Method::GET, "/hello"));
/// assert_eq!(response.status_code(), 200);
///
/// let response = router.route(&Request::new(Method::POST, "/hello"));
/// assert_eq!(response.status_code(), 405);
/// ```
#[derive(Default)]
pub struct RouterBuilder {
    routes: HashMap<Method, HashMap<String, Arc<dyn Handler>>>,
    default_handler: Option<Arc<dyn Handler>>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un handler para (método, path exacto)
    ///
    /// Registrar dos veces el mismo par reemplaza el handler anterior.
    pub fn route<F>(self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(&Request) -> HandlerResult + Send + Sync + 'static,
    {
        self.route_handler(method, path, handler)
    }

    /// Igual que `route`, para tipos que implementan `Handler`
    pub fn route_handler<H: Handler + 'static>(mut self, method: Method, path: &str, handler: H) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path.to_string(), Arc::new(handler));
        self
    }

    pub fn get<F>(self, path: &str, handler: F) -> Self
    where
        F: Fn(&Request) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::GET, path, handler)
    }

    pub fn post<F>(self, path: &str, handler: F) -> Self
    where
        F: Fn(&Request) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::POST, path, handler)
    }

    pub fn put<F>(self, path: &str, handler: F) -> Self
    where
        F: Fn(&Request) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::PUT, path, handler)
    }

    pub fn delete<F>(self, path: &str, handler: F) -> Self
    where
        F: Fn(&Request) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::DELETE, path, handler)
    }

    /// Handler para todo lo que no coincide con ninguna ruta
    pub fn default_handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.default_handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Router {
        Router {
            routes: self.routes,
            default_handler: self.default_handler,
        }
    }
}

/// Tabla de rutas inmutable
pub struct Router {
    routes: HashMap<Method, HashMap<String, Arc<dyn Handler>>>,
    default_handler: Option<Arc<dyn Handler>>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    ///
    /// Nunca falla: todos los errores de handler terminan en una Response.
    pub fn route(&self, request: &Request) -> Response {
        let path = request.path();

        if let Some(handler) = self
            .routes
            .get(&request.method())
            .and_then(|by_path| by_path.get(path))
        {
            return Self::invoke(handler.as_ref(), request);
        }

        // El path existe bajo otro método
        let other_method = self
            .routes
            .iter()
            .any(|(method, by_path)| *method != request.method() && by_path.contains_key(path));
        if other_method {
            return Response::method_not_allowed();
        }

        match &self.default_handler {
            Some(handler) => Self::invoke(handler.as_ref(), request),
            None => Response::not_found(),
        }
    }

    /// Ejecuta un handler conteniendo errores y pánicos
    fn invoke(handler: &dyn Handler, request: &Request) -> Response {
        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(request))) {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!("Handler error on {} {}: {}", request.method(), request.path(), e);
                Response::internal_server_error(&e.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("Handler panicked on {} {}: {}", request.method(), request.path(), message);
                Response::internal_server_error(&message)
            }
        }
    }

    /// Rutas registradas, ordenadas por path y método (para logs)
    pub fn routes(&self) -> Vec<(Method, &str)> {
        let mut list: Vec<(Method, &str)> = self
            .routes
            .iter()
            .flat_map(|(method, by_path)| by_path.keys().map(move |p| (*method, p.as_str())))
            .collect();
        list.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
        list
    }

    pub fn has_default_handler(&self) -> bool {
        self.default_handler.is_some()
    }
}

/// Texto de un pánico (`panic!("...")` produce `&str` o `String`)
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_handler(_req: &Request) -> HandlerResult {
        Ok(Response::json(r#"{"test": "ok"}"#))
    }

    fn hello_handler(_req: &Request) -> HandlerResult {
        Ok(Response::json(r#"{"message": "hello"}"#))
    }

    fn get(path: &str) -> Request {
        Request::new(Method::GET, path)
    }

    #[test]
    fn test_route_found() {
        let router = RouterBuilder::new().get("/test", test_handler).build();
        let response = router.route(&get("/test"));
        assert_eq!(response.status(), Some(StatusCode::Ok));
    }

    #[test]
    fn test_route_not_found() {
        let router = RouterBuilder::new().build();
        let response = router.route(&get("/nonexistent"));
        assert_eq!(response.status(), Some(StatusCode::NotFound));
    }

    #[test]
    fn test_multiple_routes() {
        let router = RouterBuilder::new()
            .get("/test", test_handler)
            .get("/hello", hello_handler)
            .build();

        assert_eq!(router.route(&get("/test")).status_code(), 200);
        let response = router.route(&get("/hello"));
        assert!(response.body_string().unwrap().contains("hello"));
    }

    #[test]
    fn test_exact_match_only() {
        let router = RouterBuilder::new().get("/test", test_handler).build();

        assert_eq!(router.route(&get("/test/")).status_code(), 404);
        assert_eq!(router.route(&get("/TEST")).status_code(), 404);
        // La query no forma parte del path
        assert_eq!(router.route(&get("/test?x=1")).status_code(), 200);
    }

    #[test]
    fn test_method_not_allowed_skips_handlers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let router = RouterBuilder::new()
            .post("/api/login", move |_req: &Request| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Response::json("{}"))
            })
            .default_handler(|_req: &Request| -> HandlerResult { Ok(Response::text("default")) })
            .build();

        let response = router.route(&get("/api/login"));
        assert_eq!(response.status_code(), 405);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_default_handler() {
        let router = RouterBuilder::new()
            .get("/api/status", test_handler)
            .default_handler(|req: &Request| -> HandlerResult { Ok(Response::text(req.path())) })
            .build();

        let response = router.route(&get("/index.html"));
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.body_string().as_deref(), Some("/index.html"));
    }

    #[test]
    fn test_handler_error_becomes_500() {
        let router = RouterBuilder::new()
            .get("/fail", |_req: &Request| -> HandlerResult {
                let n: u32 = "not a number".parse()?;
                Ok(Response::text(&n.to_string()))
            })
            .build();

        let response = router.route(&get("/fail"));
        assert_eq!(response.status_code(), 500);
        assert!(response.body_string().unwrap().contains("invalid digit"));
    }

    #[test]
    fn test_handler_panic_becomes_500() {
        let router = RouterBuilder::new()
            .get("/panic", |_req: &Request| -> HandlerResult { panic!("Simulated crash") })
            .default_handler(|_req: &Request| -> HandlerResult {
                Err("default failed".into())
            })
            .build();

        let response = router.route(&get("/panic"));
        assert_eq!(response.status_code(), 500);
        assert!(response.body_string().unwrap().contains("Simulated crash"));

        let response = router.route(&get("/other"));
        assert_eq!(response.status_code(), 500);
        assert!(response.body_string().unwrap().contains("default failed"));
    }

    #[test]
    fn test_register_twice_replaces() {
        let router = RouterBuilder::new()
            .get("/x", test_handler)
            .get("/x", hello_handler)
            .build();

        assert_eq!(router.routes(), vec![(Method::GET, "/x")]);
        assert!(router.route(&get("/x")).body_string().unwrap().contains("hello"));
    }

    #[test]
    fn test_routes_listing() {
        let router = RouterBuilder::new()
            .post("/b", test_handler)
            .get("/a", test_handler)
            .put("/b", test_handler)
            .delete("/b", test_handler)
            .build();

        assert_eq!(
            router.routes(),
            vec![
                (Method::GET, "/a"),
                (Method::DELETE, "/b"),
                (Method::POST, "/b"),
                (Method::PUT, "/b"),
            ]
        );
        assert!(!router.has_default_handler());
    }
}
