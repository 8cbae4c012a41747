//! Sweep Task
//!
//! Background task that periodically purges expired cache entries and
//! rate-limit windows that have ended.
//!
//! Reads already treat expired entries as absent; the sweep only bounds
//! memory held by keys nobody asks for again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::gateway::Gateway;

/// Spawns a background task that sweeps the gateway every `interval_secs`.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let sweep_handle = spawn_sweep_task(state.gateway.clone(), 30);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(gateway: Arc<Gateway>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!("Starting sweep task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let report = gateway.purge_expired();
            if report.total() > 0 {
                info!(
                    search_entries = report.search_entries,
                    quote_entries = report.quote_entries,
                    idle_clients = report.idle_clients,
                    "Sweep removed expired state"
                );
            } else {
                debug!("Sweep: nothing expired");
            }
        }
    })
}
