//! Background cache sweeping

use super::database::Database;
use super::types::Record;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Periodically sweeps a database until stopped or dropped
#[derive(Debug)]
pub struct CacheSweeper {
    handle: JoinHandle<()>,
}

impl CacheSweeper {
    /// Spawn a sweeper on the current Tokio runtime.
    ///
    /// The first sweep runs immediately, then once per `interval`.
    pub fn spawn<R: Record>(database: Database<R>, ttl: Duration, interval: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match database.sweep(ttl) {
                    Ok(report) => debug!(
                        "Periodic sweep: {} removed, {} vetoed",
                        report.removed(),
                        report.vetoed
                    ),
                    Err(e) => warn!("Periodic sweep failed: {e}"),
                }
            }
        });

        Self { handle }
    }

    /// Whether the sweep task is still alive
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop sweeping
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for CacheSweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
