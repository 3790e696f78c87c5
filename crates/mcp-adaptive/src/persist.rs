//! Background persistence of the registry.
//!
//! A single task wakes up every flush interval and writes the registry if it
//! is dirty. Cancelling the token stops the loop after one last flush, so
//! nothing learned during the final interval is lost on shutdown.

use crate::registry::RegistryStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Spawns the periodic flush loop for `store`.
///
/// Flush failures are logged and retried on the next tick.
pub fn spawn_flush_task(
    store: Arc<RegistryStore>,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        timer.tick().await;

        debug!(
            flush_interval_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            "Registry flush task started"
        );

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = timer.tick() => {
                    if let Err(e) = store.flush().await {
                        warn!(error = %e, "Registry flush failed, will retry");
                    }
                }
            }
        }

        match store.flush().await {
            Ok(true) => info!("Registry flushed on shutdown"),
            Ok(false) => debug!("Registry clean on shutdown"),
            Err(e) => warn!(error = %e, "Final registry flush failed"),
        }
    })
}
