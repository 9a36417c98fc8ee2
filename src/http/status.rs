//! # Códigos de Estado HTTP
//!
//! Catálogo de los códigos que el servidor genera por nombre. Las respuestas
//! leídas por el cliente guardan el código numérico tal cual, así que un
//! 303 o un 418 del otro lado no necesitan estar aquí.
//!
//! - **2xx**: Éxito (200, 201)
//! - **3xx**: Redirección y caché (301, 302, 304)
//! - **4xx**: Error del cliente (400, 401, 403, 404, 405)
//! - **5xx**: Error del servidor (500, 501, 503)

/// Códigos de estado con nombre y reason phrase canónica
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok = 200,

    /// 201 Created - Se creó un recurso
    Created = 201,

    /// 301 Moved Permanently - Redirección permanente
    MovedPermanently = 301,

    /// 302 Found - Redirección temporal
    Found = 302,

    /// 304 Not Modified - La copia en caché del cliente sigue vigente
    NotModified = 304,

    /// 400 Bad Request - Parámetros inválidos o malformados
    BadRequest = 400,

    /// 401 Unauthorized - Credenciales incorrectas
    Unauthorized = 401,

    /// 403 Forbidden
    Forbidden = 403,

    /// 404 Not Found - Ruta o recurso no encontrado
    NotFound = 404,

    /// 405 Method Not Allowed - El path existe pero con otro método
    MethodNotAllowed = 405,

    /// 500 Internal Server Error - Fallo de un handler
    InternalServerError = 500,

    /// 501 Not Implemented
    NotImplemented = 501,

    /// 503 Service Unavailable - Pool de conexiones lleno
    ServiceUnavailable = 503,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use socket_http::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Busca el código en el catálogo
    ///
    /// # Ejemplo
    /// ```
    /// use socket_http::http::StatusCode;
    /// assert_eq!(StatusCode::from_u16(405), Some(StatusCode::MethodNotAllowed));
    /// assert_eq!(StatusCode::from_u16(418), None);
    /// ```
    pub fn from_u16(code: u16) -> Option<Self> {
        let status = match code {
            200 => StatusCode::Ok,
            201 => StatusCode::Created,
            301 => StatusCode::MovedPermanently,
            302 => StatusCode::Found,
            304 => StatusCode::NotModified,
            400 => StatusCode::BadRequest,
            401 => StatusCode::Unauthorized,
            403 => StatusCode::Forbidden,
            404 => StatusCode::NotFound,
            405 => StatusCode::MethodNotAllowed,
            500 => StatusCode::InternalServerError,
            501 => StatusCode::NotImplemented,
            503 => StatusCode::ServiceUnavailable,
            _ => return None,
        };
        Some(status)
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use socket_http::http::StatusCode;
    /// assert_eq!(StatusCode::NotModified.reason_phrase(), "Not Modified");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::Found => "Found",
            StatusCode::NotModified => "Not Modified",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// Verifica si el código indica éxito (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.as_u16())
    }

    /// Verifica si el código indica error del cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.as_u16())
    }

    /// Verifica si el código indica error del servidor (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
