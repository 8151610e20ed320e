//! Placement drive row model.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

use placedrive_core::types::{DbId, Timestamp};
use placedrive_core::{CoreError, Drive, DriveStatus, EligibilityCriteria};

/// A row from the `placement_drives` table.
///
/// Eligibility columns live inline on the drive row; the conversion to
/// [`Drive`] assembles them into typed criteria.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DriveRow {
    pub id: DbId,
    pub company_name: String,
    pub job_role: String,
    pub min_cgpa: f64,
    pub max_backlogs_allowed: i32,
    pub eligible_departments: Json<Vec<String>>,
    pub eligible_batches: Json<Vec<i32>>,
    pub drive_date: NaiveDate,
    pub deadline_date: Timestamp,
    pub status: String,
    pub posted_by: DbId,
    pub created_at: Timestamp,
}

impl TryFrom<DriveRow> for Drive {
    type Error = CoreError;

    fn try_from(row: DriveRow) -> Result<Self, Self::Error> {
        let status = DriveStatus::from_str(&row.status).ok_or_else(|| {
            CoreError::Store(format!(
                "unknown drive status '{}' on drive {}",
                row.status, row.id
            ))
        })?;
        Ok(Drive {
            id: row.id,
            company_name: row.company_name,
            job_role: row.job_role,
            eligibility: EligibilityCriteria {
                min_cgpa: row.min_cgpa,
                max_backlogs_allowed: row.max_backlogs_allowed,
                eligible_departments: row.eligible_departments.0,
                eligible_batches: row.eligible_batches.0,
            },
            drive_date: row.drive_date,
            deadline: row.deadline_date,
            status,
            posted_by: row.posted_by,
            created_at: row.created_at,
        })
    }
}
