//! Placement drives and their status state machine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::criteria::EligibilityCriteria;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Drive Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a placement drive.
///
/// Legal transitions: `draft → open`; `open → closed | cancelled |
/// on_hold | completed`; `on_hold → open`. The only automatic transition
/// is `open → closed`, performed by the deadline sweep; everything else
/// is an explicit admin action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveStatus {
    Draft,
    Open,
    Closed,
    OnHold,
    Completed,
    Cancelled,
}

impl DriveStatus {
    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "on_hold" => Some(Self::OnHold),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition_to(&self, next: DriveStatus) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Open)
                | (Self::Open, Self::Closed)
                | (Self::Open, Self::Cancelled)
                | (Self::Open, Self::OnHold)
                | (Self::Open, Self::Completed)
                | (Self::OnHold, Self::Open)
        )
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for DriveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Drive Event Kind
// ---------------------------------------------------------------------------

/// The write that triggered a notification fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveEventKind {
    Created,
    Updated,
}

impl DriveEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

impl std::fmt::Display for DriveEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Drive
// ---------------------------------------------------------------------------

/// A placement opportunity posted by an admin.
///
/// Drives are mutated by admin edits and by the deadline sweep, never by
/// the fan-out path; dispatch always works on an immutable snapshot
/// captured at commit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drive {
    pub id: DbId,
    pub company_name: String,
    pub job_role: String,
    pub eligibility: EligibilityCriteria,
    /// Day the drive takes place.
    pub drive_date: NaiveDate,
    /// Application deadline; drives past this are closed by the sweep.
    pub deadline: Timestamp,
    pub status: DriveStatus,
    pub posted_by: DbId,
    pub created_at: Timestamp,
}
