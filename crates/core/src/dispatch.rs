//! Dispatch result bookkeeping.
//!
//! Fan-out is best-effort: outcomes are counted and logged, never
//! propagated to the write that triggered them. These types are that
//! record.

use uuid::Uuid;

use crate::channels::Channel;
use crate::drive::DriveEventKind;
use crate::types::DbId;

/// Result of one delivery attempt: a whole push batch or a single
/// templated message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    Failed { reason: String },
    Skipped { reason: String },
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Per-channel counters for one fan-out invocation.
///
/// `attempted` counts recipients actually handed to the gateway;
/// recipients dropped before any gateway call only appear in `skipped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub channel: Channel,
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl DispatchSummary {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            attempted: 0,
            delivered: 0,
            failed: 0,
            skipped: 0,
        }
    }

    /// Fold in a single-recipient outcome.
    pub fn record(&mut self, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Delivered => self.add_delivered(1),
            DispatchOutcome::Failed { .. } => self.add_failed(1),
            DispatchOutcome::Skipped { .. } => self.add_skipped(1),
        }
    }

    pub fn add_delivered(&mut self, count: usize) {
        self.attempted += count;
        self.delivered += count;
    }

    pub fn add_failed(&mut self, count: usize) {
        self.attempted += count;
        self.failed += count;
    }

    pub fn add_skipped(&mut self, count: usize) {
        self.skipped += count;
    }
}

// ---------------------------------------------------------------------------
// Fan-out report
// ---------------------------------------------------------------------------

/// Aggregated result of one fan-out invocation.
///
/// Logged when dispatch finishes and returned to direct callers so tests
/// can assert on it. A `None` channel summary means the channel was not
/// configured for this process.
#[derive(Debug, Clone)]
pub struct FanoutReport {
    /// Correlation id carried by every log event of this invocation.
    pub fanout_id: Uuid,
    pub drive_id: DbId,
    pub event: DriveEventKind,
    pub push: Option<DispatchSummary>,
    pub messaging: Option<DispatchSummary>,
    /// Why dispatch stopped before reaching any gateway, if it did.
    pub aborted: Option<String>,
}

impl FanoutReport {
    pub fn new(drive_id: DbId, event: DriveEventKind) -> Self {
        Self {
            fanout_id: Uuid::new_v4(),
            drive_id,
            event,
            push: None,
            messaging: None,
            aborted: None,
        }
    }

    pub fn total_delivered(&self) -> usize {
        self.push.map_or(0, |s| s.delivered) + self.messaging.map_or(0, |s| s.delivered)
    }

    pub fn total_attempted(&self) -> usize {
        self.push.map_or(0, |s| s.attempted) + self.messaging.map_or(0, |s| s.attempted)
    }
}
