//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server by its address
//! - Carry the liveness verdict of the most recent health check

use std::fmt;
use url::Url;

/// A single backend server.
///
/// The address is fixed at construction. Liveness is only changed through
/// [`BackendPool::mark_status`](crate::load_balancer::pool::BackendPool::mark_status).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    url: Url,
    alive: bool,
}

impl Backend {
    /// Create a backend that is not yet known to be alive.
    pub fn new(url: Url) -> Self {
        Self { url, alive: false }
    }

    /// The backend's address (scheme, host and port).
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Whether the last health check found this backend reachable.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Identity used for status lookups: the canonical string form of the URL.
    pub fn matches(&self, url: &Url) -> bool {
        self.url.as_str() == url.as_str()
    }

    pub(crate) fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
