//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Periodic timer (active.rs)
//!     → Snapshot the pool's backend list
//!     → probe.rs: TCP connect per backend, all concurrently, bounded timeout
//!     → Join every probe
//!     → pool.mark_status per result
//! ```
//!
//! # Design Decisions
//! - Connect success alone means alive; no application-level request
//! - No thresholds: each pass re-evaluates liveness from scratch
//! - The pool lock is never held while probing
//! - Passes never overlap

pub mod active;
pub mod probe;

pub use active::{HealthChecker, PassReport};
pub use probe::{tcp_probe, ProbeError};
