//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicU64, Ordering};
use crate::load_balancer::backend::Backend;

/// Round-robin selector.
/// Stores an internal counter to rotate through backends.
///
/// The counter advances by exactly one per selection, whether or not the
/// slot it lands on is alive. Dead backends are skipped by scanning forward
/// from that slot, wrapping once around the list.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicU64,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn starting_at(cursor: u64) -> Self {
        Self {
            cursor: AtomicU64::new(cursor),
        }
    }

    /// Pick the next alive backend, or `None` if the slice is empty or all dead.
    pub fn select<'a>(&self, backends: &'a [Backend]) -> Option<&'a Backend> {
        if backends.is_empty() {
            return None;
        }

        // fetch_add wraps on overflow; only the remainder matters.
        let len = backends.len();
        let start = (self.cursor.fetch_add(1, Ordering::Relaxed) % len as u64) as usize;

        (0..len)
            .map(|i| &backends[(start + i) % len])
            .find(|backend| backend.is_alive())
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> u64 {
        self.cursor.load(Ordering::Relaxed)
    }
}
