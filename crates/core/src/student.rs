//! Read-only student view consumed by eligibility evaluation.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Per-student snapshot of everything eligibility and recipient
/// resolution need. Sourced from the student directory; the core only
/// consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentEligibilityProfile {
    pub student_id: DbId,
    pub department: Option<String>,
    pub batch_year: Option<i32>,
    /// `None` when the student has no academic record yet.
    pub cgpa: Option<f64>,
    /// `None` when the student has no academic record yet.
    pub backlogs: Option<i32>,
    /// `None` = never answered, `Some(true)` = interested,
    /// `Some(false)` = explicitly opted out.
    pub placement_willing: Option<bool>,
    pub push_token: Option<String>,
    pub phone: Option<String>,
}

impl StudentEligibilityProfile {
    /// Missing academic records evaluate as a zero CGPA, so unprofiled
    /// students pass any zero bar. Deliberate; see the criteria module.
    pub fn cgpa_or_default(&self) -> f64 {
        self.cgpa.unwrap_or(0.0)
    }

    /// Missing academic records evaluate as zero backlogs.
    pub fn backlogs_or_default(&self) -> i32 {
        self.backlogs.unwrap_or(0)
    }

    /// Only an explicit opt-out excludes a student; silence counts as
    /// open to placement.
    pub fn is_open_to_placement(&self) -> bool {
        self.placement_willing.unwrap_or(true)
    }
}
