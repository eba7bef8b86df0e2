//! Keeps the issue store warm: once at boot, then on a fixed cadence.

use std::time::Duration;

use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{error, info, instrument};

use crate::base::types::Void;

use super::sync::IssueSync;

/// Fill the store before any chat event is served.
///
/// Does nothing when the store already holds entries. A failure here is fatal
/// to the caller.
#[instrument(skip(sync))]
pub async fn cold_start(sync: &IssueSync, owner: &str, repo: &str) -> Void {
    if sync.store().size().await > 0 {
        info!("Issue cache already populated, skipping cold start fetch.");
        return Ok(());
    }

    sync.fetch(owner, repo).await?;

    Ok(())
}

/// Spawn the periodic refresh.
///
/// The first refresh happens one `period` after spawning. Failures are logged
/// and left for the next tick.
pub fn spawn_refresh(sync: IssueSync, owner: String, repo: String, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match sync.fetch(&owner, &repo).await {
                Ok(count) => info!("Scheduled refresh: {} issues fetched into cache.", count),
                Err(err) => error!("Scheduled refresh failed: {}", err),
            }
        }
    })
}

// Tests.
