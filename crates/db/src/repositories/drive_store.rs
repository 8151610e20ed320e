//! [`DriveStore`] implementation for the `placement_drives` table.

use async_trait::async_trait;

use placedrive_core::types::DbId;
use placedrive_core::{CoreError, Drive, DriveStatus, DriveStore};

use crate::models::drive::DriveRow;
use crate::DbPool;

/// Column list for `placement_drives` queries.
const DRIVE_COLUMNS: &str = "id, company_name, job_role, min_cgpa, max_backlogs_allowed, \
     COALESCE(eligible_departments, '[]'::jsonb) AS eligible_departments, \
     COALESCE(eligible_batches, '[]'::jsonb) AS eligible_batches, \
     drive_date, deadline_date, status, posted_by, created_at";

/// Map a driver error onto the storage variant of [`CoreError`].
pub(crate) fn store_error(e: sqlx::Error) -> CoreError {
    CoreError::Store(e.to_string())
}

/// Drive reads and status writes backed by PostgreSQL.
pub struct PgDriveStore {
    pool: DbPool,
}

impl PgDriveStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriveStore for PgDriveStore {
    async fn fetch_drive(&self, id: DbId) -> Result<Option<Drive>, CoreError> {
        let query = format!("SELECT {DRIVE_COLUMNS} FROM placement_drives WHERE id = $1");
        let row = sqlx::query_as::<_, DriveRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
        row.map(Drive::try_from).transpose()
    }

    async fn close_expired(&self) -> Result<u64, CoreError> {
        // The comparison runs on the database clock, so concurrent sweeps
        // agree on what is expired and repeating the update is harmless.
        let result = sqlx::query(
            "UPDATE placement_drives \
             SET status = 'closed' \
             WHERE status = 'open' AND deadline_date < CURRENT_TIMESTAMP",
        )
        .execute(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(result.rows_affected())
    }

    async fn set_status(
        &self,
        id: DbId,
        from: DriveStatus,
        to: DriveStatus,
    ) -> Result<bool, CoreError> {
        let result =
            sqlx::query("UPDATE placement_drives SET status = $3 WHERE id = $1 AND status = $2")
                .bind(id)
                .bind(from.as_str())
                .bind(to.as_str())
                .execute(&self.pool)
                .await
                .map_err(store_error)?;
        Ok(result.rows_affected() == 1)
    }
}
