//! Round-robin HTTP load balancer library.
//!
//! A reverse proxy that spreads requests over a pool of backends in
//! round-robin order, skipping backends that failed their last TCP health
//! probe.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;

pub use config::ProxyConfig;
pub use health::HealthChecker;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load_balancer::{Backend, BackendPool, SelectError};
