//! # Módulo HTTP
//!
//! Codec HTTP/1.1 escrito sobre `std::io`, sin librerías HTTP. Lo usan
//! tanto el servidor como el cliente:
//!
//! - `parser`: lee requests y responses desde cualquier `BufRead`
//! - `encoder`: serializa requests y responses a bytes
//! - `headers`: colección ordenada y case-insensitive
//! - `request` / `response` / `status`: los tipos del mensaje
//!
//! ### Formato de Request
//!
//! ```text
//! GET /path?query=value HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 13\r\n
//! \r\n
//! {"ok": true}
//! ```
//!
//! El body se delimita con `Content-Length` o con `Transfer-Encoding: chunked`.
//! Sin ninguno de los dos el mensaje no tiene body.

pub mod encoder;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod status;

pub use headers::Headers;
pub use request::{Method, Request};
pub use response::Response;
pub use status::StatusCode;
