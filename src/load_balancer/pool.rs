//! Backend pool management.
//!
//! # Responsibilities
//! - Own the ordered list of registered backends
//! - Apply liveness updates from the health checker
//! - Select the next peer for each proxied request

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use url::Url;

use crate::load_balancer::{backend::Backend, round_robin::RoundRobin};

/// Reasons no peer could be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectError {
    /// The pool is empty.
    #[error("no backends registered")]
    NoBackendsRegistered,

    /// Every registered backend is currently marked dead.
    #[error("no healthy backend available")]
    NoHealthyBackend,
}

/// Thread-safe registry of backends with round-robin selection.
///
/// Writers (`add_backend`, `mark_status`) take the write lock. Selection
/// takes the read lock and advances the cursor atomically, so concurrent
/// readers never contend on anything but the counter.
#[derive(Debug, Default)]
pub struct BackendPool {
    backends: RwLock<Vec<Backend>>,
    selector: RoundRobin,
}

impl BackendPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool and register every URL in order.
    pub fn from_urls<I>(urls: I) -> Self
    where
        I: IntoIterator<Item = Url>,
    {
        let pool = Self::new();
        for url in urls {
            pool.add_backend(url);
        }
        pool
    }

    /// Append a backend. It stays dead until a health check finds it reachable.
    ///
    /// Duplicate addresses are kept as separate entries.
    pub fn add_backend(&self, url: Url) {
        tracing::info!(backend = %url, "Backend registered");
        self.write().push(Backend::new(url));
    }

    /// Record the liveness of the backend(s) with this address.
    ///
    /// Returns `true` if any entry changed state. An unknown address is
    /// ignored: it can only come from a stale snapshot.
    pub fn mark_status(&self, url: &Url, alive: bool) -> bool {
        let mut backends = self.write();
        let mut changed = false;

        for backend in backends.iter_mut().filter(|b| b.matches(url)) {
            if backend.is_alive() != alive {
                backend.set_alive(alive);
                changed = true;
                tracing::info!(
                    backend = %url,
                    status = if alive { "UP" } else { "DOWN" },
                    "Backend status changed"
                );
            }
        }
        changed
    }

    /// Select the next alive backend in round-robin order.
    pub fn next_peer(&self) -> Result<Backend, SelectError> {
        let backends = self.read();
        if backends.is_empty() {
            tracing::warn!("No backends registered in the pool");
            return Err(SelectError::NoBackendsRegistered);
        }

        match self.selector.select(&backends) {
            Some(backend) => Ok(backend.clone()),
            None => {
                tracing::warn!(backend_count = backends.len(), "No healthy backends available");
                Err(SelectError::NoHealthyBackend)
            }
        }
    }

    /// Copy of the current backend list.
    pub fn snapshot(&self) -> Vec<Backend> {
        self.read().clone()
    }

    /// Number of registered backends.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Number of backends currently marked alive.
    pub fn alive_count(&self) -> usize {
        self.read().iter().filter(|b| b.is_alive()).count()
    }

    // The list is never left half-updated, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Backend>> {
        self.backends.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Backend>> {
        self.backends.write().unwrap_or_else(PoisonError::into_inner)
    }
}
