//! Eligibility evaluation against the student directory.
//!
//! [`EligibilityEvaluator`] turns a drive's criteria into the concrete
//! set of students it applies to. The directory is read exactly once per
//! evaluation and the full predicate is re-applied in process, so the
//! result does not depend on how much filtering the directory performs.

use std::sync::Arc;

use tracing::debug;

use placedrive_core::{
    CoreError, EligibilityCriteria, StudentDirectory, StudentEligibilityProfile,
};

/// Resolves eligibility criteria to student profiles.
pub struct EligibilityEvaluator {
    directory: Arc<dyn StudentDirectory>,
}

impl EligibilityEvaluator {
    pub fn new(directory: Arc<dyn StudentDirectory>) -> Self {
        Self { directory }
    }

    /// Return every student the given criteria admit.
    ///
    /// Invalid criteria are rejected before any directory read. The
    /// returned order is whatever the directory produced.
    pub async fn eligible_students(
        &self,
        criteria: &EligibilityCriteria,
    ) -> Result<Vec<StudentEligibilityProfile>, CoreError> {
        criteria.validate()?;

        let pool = self.directory.eligible_pool(criteria).await?;
        let candidates = pool.len();

        let eligible: Vec<StudentEligibilityProfile> =
            pool.into_iter().filter(|s| criteria.matches(s)).collect();

        debug!(
            candidates,
            eligible = eligible.len(),
            "eligibility pool resolved"
        );
        Ok(eligible)
    }
}
