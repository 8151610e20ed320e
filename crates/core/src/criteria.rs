//! Typed eligibility criteria and the conjunctive predicate.
//!
//! Criteria are a value, not a query: the clauses below are the single
//! source of truth for who a drive applies to. Store implementations may
//! pre-filter server-side, but callers always re-apply [`EligibilityCriteria::matches`]
//! so correctness never depends on how much filtering a store performs.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::student::StudentEligibilityProfile;

/// Upper bound of the 10-point CGPA scale.
const CGPA_MAX: f64 = 10.0;

/// Earliest plausible batch (graduation) year.
const BATCH_YEAR_MIN: i32 = 1950;

// ---------------------------------------------------------------------------
// Eligibility Criteria
// ---------------------------------------------------------------------------

/// The conjunctive filter attached to a drive.
///
/// Every clause must hold for a student to be eligible; there is no
/// OR-of-criteria mode. Empty department/batch sets mean unrestricted,
/// not "none match".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityCriteria {
    /// Inclusive lower CGPA bound.
    pub min_cgpa: f64,
    /// Inclusive upper bound on active backlogs.
    pub max_backlogs_allowed: i32,
    /// Allowed departments; empty means unrestricted.
    pub eligible_departments: Vec<String>,
    /// Allowed batch years; empty means unrestricted.
    pub eligible_batches: Vec<i32>,
}

impl Default for EligibilityCriteria {
    /// No CGPA bar, no backlog allowance, unrestricted sets.
    fn default() -> Self {
        Self {
            min_cgpa: 0.0,
            max_backlogs_allowed: 0,
            eligible_departments: Vec::new(),
            eligible_batches: Vec::new(),
        }
    }
}

impl EligibilityCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_cgpa(mut self, min_cgpa: f64) -> Self {
        self.min_cgpa = min_cgpa;
        self
    }

    pub fn with_max_backlogs(mut self, max_backlogs: i32) -> Self {
        self.max_backlogs_allowed = max_backlogs;
        self
    }

    pub fn with_departments<I, S>(mut self, departments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.eligible_departments = departments.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_batches<I>(mut self, batches: I) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        self.eligible_batches = batches.into_iter().collect();
        self
    }

    /// Reject criteria a drive should never have been saved with.
    ///
    /// Rules:
    /// - `min_cgpa` must be finite and within `0..=10`
    /// - `max_backlogs_allowed` must not be negative
    /// - department entries must not be blank
    /// - batch years must be plausible calendar years
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.min_cgpa.is_finite() || self.min_cgpa < 0.0 || self.min_cgpa > CGPA_MAX {
            return Err(CoreError::Validation(format!(
                "minimum CGPA must be between 0 and {CGPA_MAX}, got {}",
                self.min_cgpa
            )));
        }
        if self.max_backlogs_allowed < 0 {
            return Err(CoreError::Validation(format!(
                "maximum backlogs allowed must not be negative, got {}",
                self.max_backlogs_allowed
            )));
        }
        if self.eligible_departments.iter().any(|d| d.trim().is_empty()) {
            return Err(CoreError::Validation(
                "eligible departments must not contain blank entries".to_string(),
            ));
        }
        if let Some(year) = self
            .eligible_batches
            .iter()
            .find(|y| **y < BATCH_YEAR_MIN)
        {
            return Err(CoreError::Validation(format!(
                "eligible batch year {year} is not a plausible year"
            )));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Predicate clauses
    // -----------------------------------------------------------------------

    /// Whether `student` satisfies every clause.
    pub fn matches(&self, student: &StudentEligibilityProfile) -> bool {
        self.passes_academic_bar(student)
            && self.allows_department(student.department.as_deref())
            && self.allows_batch(student.batch_year)
            && student.is_open_to_placement()
    }

    /// CGPA and backlog clauses. Students without an academic record
    /// evaluate as CGPA 0 / backlogs 0, so they pass any zero bar.
    pub fn passes_academic_bar(&self, student: &StudentEligibilityProfile) -> bool {
        student.cgpa_or_default() >= self.min_cgpa
            && student.backlogs_or_default() <= self.max_backlogs_allowed
    }

    /// Department clause; an empty set is unrestricted.
    pub fn allows_department(&self, department: Option<&str>) -> bool {
        self.eligible_departments.is_empty()
            || department.is_some_and(|d| self.eligible_departments.iter().any(|e| e == d))
    }

    /// Batch clause; an empty set is unrestricted.
    pub fn allows_batch(&self, batch_year: Option<i32>) -> bool {
        self.eligible_batches.is_empty()
            || batch_year.is_some_and(|y| self.eligible_batches.contains(&y))
    }
}
