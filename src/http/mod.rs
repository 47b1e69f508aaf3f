//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, connect info, tracing layer)
//!     → proxy.rs (pick peer from the pool)
//!     → forwarded.rs (rewrite URI and forwarding headers)
//!     → hyper client → backend
//!     → proxy.rs (relay response, or map failure to 502/503)
//!     → Send to client
//! ```

pub mod forwarded;
pub mod proxy;
pub mod server;

pub use proxy::{proxy_handler, ProxyError};
pub use server::{AppState, HttpServer};
