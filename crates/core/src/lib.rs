//! Placedrive domain core.
//!
//! Pure domain types and logic shared by every other crate in the
//! workspace:
//!
//! - [`Drive`] and its status state machine.
//! - [`EligibilityCriteria`] — the typed, conjunctive filter deciding
//!   which students a drive applies to.
//! - [`StudentEligibilityProfile`] and per-channel recipient resolution.
//! - The notification message catalog and dispatch bookkeeping types.
//! - The [`DriveStore`] and [`StudentDirectory`] traits implemented by
//!   the storage layer and by in-memory fakes in tests.
//!
//! This crate performs no I/O of its own.

pub mod channels;
pub mod criteria;
pub mod dispatch;
pub mod drive;
pub mod error;
pub mod message;
pub mod recipients;
pub mod store;
pub mod student;
pub mod types;

pub use channels::Channel;
pub use criteria::EligibilityCriteria;
pub use dispatch::{DispatchOutcome, DispatchSummary, FanoutReport};
pub use drive::{Drive, DriveEventKind, DriveStatus};
pub use error::CoreError;
pub use store::{DriveStore, StudentDirectory};
pub use student::StudentEligibilityProfile;
