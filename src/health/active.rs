//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every registered backend
//! - Update backend liveness in the pool based on results

use std::sync::Arc;
use std::time::{Duration, Instant};
use futures_util::future::join_all;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::health::probe;
use crate::load_balancer::BackendPool;

/// Outcome of a single health check pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    /// Backends probed in this pass.
    pub checked: usize,
    /// Backends found reachable.
    pub alive: usize,
    /// Wall time of the whole pass.
    pub elapsed: Duration,
}

/// Periodic TCP prober writing liveness back into a [`BackendPool`].
pub struct HealthChecker {
    pool: Arc<BackendPool>,
    interval: Duration,
    timeout: Duration,
}

impl HealthChecker {
    /// `interval` must be non-zero.
    pub fn new(pool: Arc<BackendPool>, interval: Duration, timeout: Duration) -> Self {
        Self {
            pool,
            interval,
            timeout,
        }
    }

    pub fn from_config(pool: Arc<BackendPool>, config: &HealthCheckConfig) -> Self {
        Self::new(
            pool,
            Duration::from_secs(config.interval_secs),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Run passes until the shutdown signal fires. The first pass starts immediately.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs_f64(),
            timeout_secs = self.timeout.as_secs_f64(),
            "Health checker starting"
        );

        let mut ticker = time::interval(self.interval);
        // A pass that overruns the interval delays the next one instead of bursting.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health checker received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run the loop on a background task.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Probe every backend concurrently and record the results.
    ///
    /// Returns once all probes have finished; each probe is bounded by the
    /// configured timeout.
    pub async fn check_all(&self) -> PassReport {
        let targets = self.pool.snapshot();
        let started = Instant::now();
        tracing::info!(backends = targets.len(), "Starting health check pass");

        let probes = targets.iter().map(|backend| async move {
            let url = backend.url();
            let alive = match probe::tcp_probe(url, self.timeout).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(backend = %url, error = %e, "Backend unreachable");
                    false
                }
            };
            self.pool.mark_status(url, alive);
            alive
        });

        let results = join_all(probes).await;

        let report = PassReport {
            checked: results.len(),
            alive: results.iter().filter(|alive| **alive).count(),
            elapsed: started.elapsed(),
        };
        tracing::info!(
            checked = report.checked,
            alive = report.alive,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Health check pass complete"
        );
        report
    }
}
