//! Round-robin HTTP load balancer.
//!
//! ```text
//!     Client ──▶ listener ──▶ proxy handler ──▶ BackendPool.next_peer() ──▶ backend
//!                                                      ▲
//!                         HealthChecker (TCP probes) ──┘ mark_status()
//! ```

use std::path::PathBuf;
use clap::Parser;

use lb_proxy::config::{load_config, validate_config, ConfigError, ProxyConfig, DEFAULT_BACKENDS};
use lb_proxy::lifecycle::{signals, startup, Shutdown};
use lb_proxy::observability::logging;
use lb_proxy::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "lb-proxy")]
#[command(about = "Round-robin HTTP load balancer with TCP health checks", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8080.
    #[arg(short, long)]
    listen: Option<String>,

    /// Backend URL; repeat for each backend. Replaces backends from the config file.
    #[arg(short, long = "backend")]
    backends: Vec<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(listen) = self.listen {
            config.listener.bind_address = listen;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if !self.backends.is_empty() {
            config.backends.clear();
            for backend in self.backends {
                config.add_backend(backend);
            }
        } else if self.config.is_none() {
            for backend in DEFAULT_BACKENDS {
                config.add_backend(backend);
            }
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;
    logging::init(&config.observability)?;

    tracing::info!("lb-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        health_interval_secs = config.health_check.interval_secs,
        health_timeout_secs = config.health_check.timeout_secs,
        "Configuration loaded"
    );

    let pool = startup::build_pool(&config)?;

    let listener = match startup::bind_listener(&config).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(
                address = %config.listener.bind_address,
                error = %e,
                "Failed to bind listen address"
            );
            return Err(e.into());
        }
    };

    // Both receivers exist before the signal listener can fire
    let shutdown = Shutdown::new();
    let health_task = startup::start_health_checker(pool.clone(), &config, &shutdown);
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config, pool);
    let served = server.run(listener, server_shutdown).await;
    // Stop the health loop even if the server exited on an error
    shutdown.trigger();

    if let Err(e) = health_task.await {
        tracing::error!(error = %e, "Health checker task failed");
    }
    served?;

    tracing::info!("Shutdown complete");
    Ok(())
}
