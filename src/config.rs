//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor HTTP con soporte completo
//! para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./socket_http --port 8080 \
//!   --static-dir ./resources \
//!   --idle-timeout-ms 60000 \
//!   --max-requests 100
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_HOST=0.0.0.0 ./socket_http
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Nombre que el servidor pone en el header `Server`
pub const SERVER_NAME: &str = "SimpleHttpServer/1.0";

/// Configuración del servidor HTTP/1.1
#[derive(Debug, Clone, Parser)]
#[command(name = "socket_http")]
#[command(about = "Servidor HTTP/1.1 sobre sockets TCP, sin librerías HTTP")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = cualquiera libre)
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Directorio raíz de los archivos estáticos
    #[arg(long = "static-dir", default_value = "./resources", env = "STATIC_DIR")]
    pub static_dir: PathBuf,

    // === Keep-Alive ===

    /// Tiempo máximo esperando el siguiente request de una conexión
    #[arg(long = "idle-timeout-ms", default_value = "60000", env = "IDLE_TIMEOUT_MS")]
    pub idle_timeout_ms: u64,

    /// Requests atendidos por conexión antes de cerrarla
    #[arg(long = "max-requests", default_value = "100", env = "MAX_REQUESTS")]
    pub max_requests: usize,

    // === Backpressure ===

    /// Conexiones simultáneas; las que sobran reciben 503
    #[arg(long = "max-connections", default_value = "1024", env = "MAX_CONNECTIONS")]
    pub max_connections: usize,

    /// Valor del header `Retry-After` en las respuestas 503
    #[arg(long = "retry-after-secs", default_value = "5", env = "RETRY_AFTER_SECS")]
    pub retry_after_secs: u64,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use socket_http::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Segundos para el header `Keep-Alive: timeout=...`
    pub fn idle_timeout_secs(&self) -> u64 {
        self.idle_timeout_ms / 1000
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.idle_timeout_ms == 0 {
            return Err("Idle timeout must be > 0".to_string());
        }
        if self.max_requests == 0 {
            return Err("Max requests per connection must be >= 1".to_string());
        }
        if self.max_connections == 0 {
            return Err("Max connections must be >= 1".to_string());
        }
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }

        Ok(())
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            static_dir: PathBuf::from("./resources"),
            idle_timeout_ms: 60_000,
            max_requests: 100,
            max_connections: 1024,
            retry_after_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.max_requests, 100);
        assert_eq!(config.idle_timeout(), Duration::from_secs(60));
        assert_eq!(config.idle_timeout_secs(), 60);
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "0.0.0.0".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_validate_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_idle_timeout() {
        let mut config = Config::default();
        config.idle_timeout_ms = 0;
        let result = config.validate();
        assert!(result.unwrap_err().contains("Idle timeout"));
    }

    #[test]
    fn test_validate_invalid_max_requests() {
        let mut config = Config::default();
        config.max_requests = 0;
        assert!(config.validate().unwrap_err().contains("Max requests"));
    }

    #[test]
    fn test_validate_invalid_max_connections() {
        let mut config = Config::default();
        config.max_connections = 0;
        assert!(config.validate().unwrap_err().contains("Max connections"));
    }

    #[test]
    fn test_parse_from_args() {
        let config = Config::parse_from([
            "socket_http",
            "--port",
            "9000",
            "--static-dir",
            "/srv/www",
            "--max-requests",
            "5",
        ]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.static_dir, PathBuf::from("/srv/www"));
        assert_eq!(config.max_requests, 5);
        assert_eq!(config.max_connections, 1024);
    }
}
