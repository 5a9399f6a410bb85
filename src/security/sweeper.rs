//! Periodic removal of expired counter and login records.
//!
//! # Responsibilities
//! - Bound memory of the in-process stores
//! - Stop promptly on shutdown

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::observability::metrics;
use crate::security::clock::Clock;
use crate::security::counter_store::CounterStore;
use crate::security::login_throttle::LoginThrottle;

pub struct Sweeper {
    counters: Arc<dyn CounterStore>,
    logins: Arc<LoginThrottle>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(
        counters: Arc<dyn CounterStore>,
        logins: Arc<LoginThrottle>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            counters,
            logins,
            clock,
            interval,
        }
    }

    /// One pass over both stores. Returns (counters, logins) removed.
    pub fn sweep_once(&self) -> (usize, usize) {
        let counters = self.counters.sweep(self.clock.now());
        let logins = self.logins.sweep();
        if counters + logins > 0 {
            tracing::debug!(counters, logins, "Swept expired records");
        }
        metrics::record_swept("rate_limit", counters);
        metrics::record_swept("login", logins);
        (counters, logins)
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if self.interval.is_zero() {
            tracing::info!("Record sweeper disabled");
            return;
        }

        tracing::info!(interval_secs = self.interval.as_secs(), "Record sweeper starting");
        let mut ticker = time::interval(self.interval);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_once();
                }
                _ = shutdown.recv() => {
                    tracing::info!("Record sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
