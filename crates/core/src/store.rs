//! Persistence seams.
//!
//! The domain crate never talks to a database directly. Callers inject
//! implementations of these traits, which keeps the evaluator and the
//! fan-out path testable against in-memory fakes.

use async_trait::async_trait;

use crate::criteria::EligibilityCriteria;
use crate::drive::{Drive, DriveStatus};
use crate::error::CoreError;
use crate::student::StudentEligibilityProfile;
use crate::types::DbId;

/// Read and transition placement drives.
#[async_trait]
pub trait DriveStore: Send + Sync {
    /// Fetch a drive snapshot by id. `Ok(None)` means the drive does not
    /// exist (or no longer exists).
    async fn fetch_drive(&self, id: DbId) -> Result<Option<Drive>, CoreError>;

    /// Close every open drive whose deadline has passed on the store's
    /// own clock. Returns the number of drives closed; repeated calls
    /// with no new expirations return zero.
    async fn close_expired(&self) -> Result<u64, CoreError>;

    /// Compare-and-set a drive's status. Returns `false` when the drive
    /// was not in `from` anymore, so a lost race is visible to the
    /// caller without a second read.
    async fn set_status(
        &self,
        id: DbId,
        from: DriveStatus,
        to: DriveStatus,
    ) -> Result<bool, CoreError>;
}

/// Read student eligibility profiles.
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    /// Fetch candidate profiles for the given criteria in one read.
    ///
    /// Implementations may pre-filter server-side but are allowed to
    /// return a superset; callers re-apply the full predicate in
    /// process, so over-returning is correct and under-returning is not.
    async fn eligible_pool(
        &self,
        criteria: &EligibilityCriteria,
    ) -> Result<Vec<StudentEligibilityProfile>, CoreError>;
}
