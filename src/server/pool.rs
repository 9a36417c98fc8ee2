//! # Límite de conexiones simultáneas
//! src/server/pool.rs
//!
//! Cada conexión aceptada corre en su propio thread, pero solo si antes
//! obtuvo un `ConnectionSlot`. El slot se libera solo al hacer drop, así que
//! un thread que termina por pánico también devuelve su lugar.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Contador de conexiones activas con tope
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    active: Arc<AtomicUsize>,
    max: usize,
}

impl ConnectionPool {
    pub fn new(max: usize) -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            max,
        }
    }

    /// Reserva un lugar; `None` si ya hay `max` conexiones activas
    ///
    /// # Ejemplo
    /// ```
    /// use socket_http::server::ConnectionPool;
    ///
    /// let pool = ConnectionPool::new(1);
    /// let slot = pool.try_acquire().unwrap();
    /// assert!(pool.try_acquire().is_none());
    ///
    /// drop(slot);
    /// assert!(pool.try_acquire().is_some());
    /// ```
    pub fn try_acquire(&self) -> Option<ConnectionSlot> {
        self.active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max).then_some(n + 1)
            })
            .ok()
            .map(|_| ConnectionSlot {
                active: Arc::clone(&self.active),
            })
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

/// Lugar ocupado en el pool; se libera en `Drop`
#[derive(Debug)]
pub struct ConnectionSlot {
    active: Arc<AtomicUsize>,
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_acquire_up_to_max() {
        let pool = ConnectionPool::new(2);
        let a = pool.try_acquire();
        let b = pool.try_acquire();

        assert!(a.is_some() && b.is_some());
        assert!(pool.try_acquire().is_none());
        assert_eq!(pool.active(), 2);
    }

    #[test]
    fn test_slot_released_on_panic() {
        let pool = ConnectionPool::new(1);
        let slot = pool.try_acquire().unwrap();

        let result = thread::spawn(move || {
            let _slot = slot;
            panic!("connection thread crashed");
        })
        .join();

        assert!(result.is_err());
        assert_eq!(pool.active(), 0);
    }

    #[test]
    fn test_concurrent_acquire_never_exceeds_max() {
        let pool = ConnectionPool::new(4);
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let pool = pool.clone();
                thread::spawn(move || pool.try_acquire())
            })
            .collect();

        let slots: Vec<_> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(slots.len(), 4);
        assert_eq!(pool.active(), 4);
    }
}
