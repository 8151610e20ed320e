//! Student eligibility profile row model.

use serde::Serialize;
use sqlx::FromRow;

use placedrive_core::types::DbId;
use placedrive_core::StudentEligibilityProfile;

/// Willingness value stored for students who opted in to placements.
/// Anything else that is non-NULL counts as an opt-out.
pub const WILLINGNESS_INTERESTED: &str = "Interested";

/// One student's joined profile as returned by the eligibility query:
/// `users` joined with `student_personal` and (optionally)
/// `student_academics`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentProfileRow {
    pub student_id: DbId,
    pub department: Option<String>,
    pub batch_year: Option<i32>,
    pub cgpa: Option<f64>,
    pub backlogs: Option<i32>,
    pub placement_willingness: Option<String>,
    pub push_token: Option<String>,
    pub phone: Option<String>,
}

impl From<StudentProfileRow> for StudentEligibilityProfile {
    fn from(row: StudentProfileRow) -> Self {
        StudentEligibilityProfile {
            student_id: row.student_id,
            department: row.department,
            batch_year: row.batch_year,
            cgpa: row.cgpa,
            backlogs: row.backlogs,
            placement_willing: row
                .placement_willingness
                .map(|w| w == WILLINGNESS_INTERESTED),
            push_token: row.push_token,
            phone: row.phone,
        }
    }
}
