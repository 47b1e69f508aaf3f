//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! pool.rs      → backend registered, status changed UP/DOWN
//! active.rs    → pass start/complete, backend unreachable
//! proxy.rs     → routing decision, no peer, upstream error
//!     → logging.rs (tracing-subscriber fmt output)
//! ```
//!
//! # Design Decisions
//! - Structured fields, not formatted messages, carry the context
//! - Log level configurable via config and environment

pub mod logging;
