//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → pool.rs (read-lock the backend list)
//!     → round_robin.rs (advance cursor, skip dead backends)
//!     → backend.rs (cloned record handed to the proxy)
//!     → Return peer or SelectError
//!
//! Health checker
//!     → pool.rs snapshot (no lock held during probes)
//!     → pool.rs mark_status (write lock per result)
//! ```
//!
//! # Design Decisions
//! - One pool per process, passed around as `Arc<BackendPool>`
//! - Cursor is atomic and independent of the list lock
//! - Dead backends excluded from selection

pub mod backend;
pub mod pool;
pub mod round_robin;

pub use backend::Backend;
pub use pool::{BackendPool, SelectError};
pub use round_robin::RoundRobin;
