//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) and/or CLI flags
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, backend URL parsing)
//!     → ProxyConfig (validated, immutable)
//!     → lifecycle::startup builds the BackendPool from it
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    BackendConfig, HealthCheckConfig, ListenerConfig, ObservabilityConfig, ProxyConfig,
    TimeoutConfig, DEFAULT_BACKENDS,
};
pub use validation::{parse_backend_url, validate_config, ValidationError};
