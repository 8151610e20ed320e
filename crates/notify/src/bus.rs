//! In-process drive event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`DriveEventBus`] is the publish/subscribe hub connecting drive writes
//! to the notification fan-out. It is designed to be shared via
//! `Arc<DriveEventBus>` across the application.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::debug;

use placedrive_core::{Drive, DriveEventKind};

// ---------------------------------------------------------------------------
// DriveEvent
// ---------------------------------------------------------------------------

/// A drive lifecycle occurrence worth notifying students about.
///
/// The event carries a full [`Drive`] snapshot taken at publish time, so
/// subscribers never have to re-read the drive to build message content.
#[derive(Debug, Clone)]
pub struct DriveEvent {
    /// Whether the drive was just created or updated.
    pub kind: DriveEventKind,

    /// Snapshot of the drive as committed.
    pub drive: Drive,

    /// When the event was published (UTC).
    pub occurred_at: DateTime<Utc>,
}

impl DriveEvent {
    /// Event for a drive that was just created and opened.
    pub fn created(drive: Drive) -> Self {
        Self {
            kind: DriveEventKind::Created,
            drive,
            occurred_at: Utc::now(),
        }
    }

    /// Event for a drive whose details were just updated.
    pub fn updated(drive: Drive) -> Self {
        Self {
            kind: DriveEventKind::Updated,
            drive,
            occurred_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// DriveEventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`DriveEvent`]. Publishing never
/// blocks the caller and never fails; drive writes commit whether or not
/// anything is listening.
pub struct DriveEventBus {
    sender: broadcast::Sender<DriveEvent>,
}

impl DriveEventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed events are dropped
    /// and slow receivers observe a `RecvError::Lagged`.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: DriveEvent) {
        let drive_id = event.drive.id;
        let kind = event.kind;
        // Ignore the SendError — it only means there are zero receivers.
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(drive_id, %kind, receivers, "drive event published");
            }
            Err(_) => {
                debug!(drive_id, %kind, "drive event published with no subscribers");
            }
        }
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DriveEvent> {
        self.sender.subscribe()
    }
}

impl Default for DriveEventBus {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
