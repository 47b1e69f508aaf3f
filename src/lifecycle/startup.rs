//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn the validated configuration into a populated backend pool
//! - Bind the listener (failure here is fatal)
//! - Start the health checker before anything can trigger shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last, after the pool exists

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::{parse_backend_url, ProxyConfig, ValidationError};
use crate::health::HealthChecker;
use crate::lifecycle::Shutdown;
use crate::load_balancer::BackendPool;

/// Register every configured backend, in order.
pub fn build_pool(config: &ProxyConfig) -> Result<Arc<BackendPool>, ValidationError> {
    let pool = BackendPool::new();
    for backend in &config.backends {
        pool.add_backend(parse_backend_url(&backend.address)?);
    }
    if pool.is_empty() {
        tracing::warn!("No backends configured; every request will receive 503");
    }
    Ok(Arc::new(pool))
}

/// Bind the configured listen address.
pub async fn bind_listener(config: &ProxyConfig) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listener bound");
    Ok(listener)
}

/// Spawn the health-check loop over `pool`.
///
/// Subscribes to `shutdown` before returning, so a trigger issued any time
/// after this call stops the loop.
pub fn start_health_checker(
    pool: Arc<BackendPool>,
    config: &ProxyConfig,
    shutdown: &Shutdown,
) -> JoinHandle<()> {
    HealthChecker::from_config(pool, &config.health_check).spawn(shutdown.subscribe())
}
