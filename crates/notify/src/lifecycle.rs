//! Drive lifecycle transitions and the deadline sweep.
//!
//! Two ways a drive changes status: an explicit admin action routed
//! through [`transition_drive`], and the automatic `open → closed` edge
//! performed by [`DeadlineSweep`] once the application deadline passes.
//! Closing a drive sends nothing; students are only notified when a
//! drive is created or updated.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use placedrive_core::types::DbId;
use placedrive_core::{CoreError, DriveStatus, DriveStore};

/// How often the sweep checks for expired drives unless configured
/// otherwise.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Manual transitions
// ---------------------------------------------------------------------------

/// Apply an admin-requested status change to a drive.
///
/// Requesting the status a drive already has is a no-op. Illegal edges
/// are rejected with a conflict, as is losing a race against a
/// concurrent transition of the same drive.
pub async fn transition_drive(
    store: &dyn DriveStore,
    drive_id: DbId,
    target: DriveStatus,
) -> Result<(), CoreError> {
    let drive = store
        .fetch_drive(drive_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "drive",
            id: drive_id,
        })?;

    if drive.status == target {
        return Ok(());
    }
    if !drive.status.can_transition_to(target) {
        return Err(CoreError::Conflict(format!(
            "cannot transition drive from {} to {}",
            drive.status, target
        )));
    }

    let applied = store.set_status(drive_id, drive.status, target).await?;
    if !applied {
        return Err(CoreError::Conflict(
            "drive status changed concurrently".to_string(),
        ));
    }

    info!(drive_id, from = %drive.status, to = %target, "Drive status changed");
    Ok(())
}

// ---------------------------------------------------------------------------
// DeadlineSweep
// ---------------------------------------------------------------------------

/// Background service that closes open drives past their deadline.
///
/// The expiry comparison happens on the store's own clock, so every
/// process running a sweep agrees on what is expired and repeated passes
/// are idempotent.
pub struct DeadlineSweep {
    store: Arc<dyn DriveStore>,
    interval: Duration,
}

impl DeadlineSweep {
    /// Create a sweep with the default interval.
    pub fn new(store: Arc<dyn DriveStore>) -> Self {
        Self {
            store,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run the sweep loop.
    ///
    /// The first pass runs immediately, then one pass per interval. The
    /// loop exits gracefully when the provided [`CancellationToken`] is
    /// cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Deadline sweep cancelled");
                    break;
                }
                _ = interval.tick() => {
                    self.sweep_once().await;
                }
            }
        }
    }

    /// One sweep pass. Errors are logged and swallowed; the next tick
    /// tries again.
    pub async fn sweep_once(&self) {
        match self.store.close_expired().await {
            Ok(0) => debug!("Deadline sweep found no expired drives"),
            Ok(closed) => info!(closed, "Deadline sweep closed expired drives"),
            Err(e) => error!(error = %e, "Deadline sweep failed"),
        }
    }
}
