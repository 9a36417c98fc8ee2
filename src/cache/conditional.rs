//! # GET condicional (lado servidor)
//! src/cache/conditional.rs
//!
//! Las fechas HTTP tienen resolución de un segundo, así que el mtime del
//! archivo se trunca antes de compararlo o de publicarlo en `Last-Modified`.

use httpdate::{fmt_http_date, parse_http_date};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Descarta la fracción de segundo
pub fn truncate_to_seconds(time: SystemTime) -> SystemTime {
    let since_epoch = time
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO);
    UNIX_EPOCH + Duration::from_secs(since_epoch.as_secs())
}

/// Formato IMF-fixdate: `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(time: SystemTime) -> String {
    fmt_http_date(time)
}

/// ¿Se puede responder 304?
///
/// `true` solo si el header existe, es una fecha HTTP válida y el recurso
/// no es más nuevo que ella. Un header inválido se ignora.
///
/// # Ejemplo
/// ```
/// use socket_http::cache::conditional::{format_http_date, is_not_modified};
/// use std::time::{Duration, UNIX_EPOCH};
///
/// let mtime = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
/// let header = format_http_date(mtime);
///
/// assert!(is_not_modified(mtime, Some(&header)));
/// assert!(!is_not_modified(mtime + Duration::from_secs(1), Some(&header)));
/// assert!(!is_not_modified(mtime, Some("ayer")));
/// assert!(!is_not_modified(mtime, None));
/// ```
pub fn is_not_modified(mtime: SystemTime, if_modified_since: Option<&str>) -> bool {
    let Some(value) = if_modified_since else {
        return false;
    };

    match parse_http_date(value.trim()) {
        Ok(client_time) => truncate_to_seconds(mtime) <= client_time,
        Err(_) => {
            warn!("Ignoring invalid If-Modified-Since: {:?}", value);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: u64, millis: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs) + Duration::from_millis(millis)
    }

    #[test]
    fn test_truncate_drops_subsecond_part() {
        assert_eq!(truncate_to_seconds(at(100, 999)), at(100, 0));
    }

    #[test]
    fn test_equal_dates_are_not_modified() {
        let header = format_http_date(at(1_600_000_000, 0));
        assert!(is_not_modified(at(1_600_000_000, 0), Some(&header)));
    }

    #[test]
    fn test_subsecond_mtime_still_matches() {
        let header = format_http_date(at(1_600_000_000, 0));
        assert!(is_not_modified(at(1_600_000_000, 750), Some(&header)));
    }

    #[test]
    fn test_older_client_date_is_modified() {
        let header = format_http_date(at(1_600_000_000, 0));
        assert!(!is_not_modified(at(1_600_000_001, 0), Some(&header)));
    }

    #[test]
    fn test_newer_client_date_is_not_modified() {
        let header = format_http_date(at(1_600_000_100, 0));
        assert!(is_not_modified(at(1_600_000_000, 0), Some(&header)));
    }

    #[test]
    fn test_invalid_header_is_ignored() {
        assert!(!is_not_modified(at(0, 0), Some("not a date")));
        assert!(!is_not_modified(at(0, 0), Some("")));
    }

    #[test]
    fn test_format_http_date() {
        assert_eq!(format_http_date(at(784_111_777, 0)), "Sun, 06 Nov 1994 08:49:37 GMT");
    }
}
