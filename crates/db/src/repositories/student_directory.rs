//! [`StudentDirectory`] implementation over the student tables.

use async_trait::async_trait;
use tracing::debug;

use placedrive_core::{
    CoreError, EligibilityCriteria, StudentDirectory, StudentEligibilityProfile,
};

use crate::models::student::{StudentProfileRow, WILLINGNESS_INTERESTED};
use crate::repositories::drive_store::store_error;
use crate::DbPool;

/// Eligibility candidate query.
///
/// Joins `users` with `student_personal` and `student_academics` and
/// applies the criteria server-side to keep the result small; callers
/// still re-apply the full predicate in process. Students without an
/// academics row are kept, with CGPA and backlogs coalesced to zero.
/// An empty department or batch set disables its containment clause.
const ELIGIBLE_POOL_QUERY: &str = "\
    SELECT u.id AS student_id, \
           sp.department, \
           sp.batch_year, \
           sa.cgpa, \
           sa.backlogs, \
           sp.placement_willingness, \
           u.push_token, \
           sp.phone \
    FROM users u \
    JOIN student_personal sp ON sp.user_id = u.id \
    LEFT JOIN student_academics sa ON sa.user_id = u.id \
    WHERE u.role = 'student' \
      AND u.is_active \
      AND COALESCE(sa.cgpa, 0) >= $1 \
      AND COALESCE(sa.backlogs, 0) <= $2 \
      AND (sp.placement_willingness IS NULL OR sp.placement_willingness = $3) \
      AND ($4::jsonb = '[]'::jsonb OR $4::jsonb @> to_jsonb(sp.department)) \
      AND ($5::jsonb = '[]'::jsonb OR $5::jsonb @> to_jsonb(sp.batch_year))";

/// Student profile reads backed by PostgreSQL.
pub struct PgStudentDirectory {
    pool: DbPool,
}

impl PgStudentDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentDirectory for PgStudentDirectory {
    async fn eligible_pool(
        &self,
        criteria: &EligibilityCriteria,
    ) -> Result<Vec<StudentEligibilityProfile>, CoreError> {
        let rows = sqlx::query_as::<_, StudentProfileRow>(ELIGIBLE_POOL_QUERY)
            .bind(criteria.min_cgpa)
            .bind(criteria.max_backlogs_allowed)
            .bind(WILLINGNESS_INTERESTED)
            .bind(serde_json::json!(criteria.eligible_departments))
            .bind(serde_json::json!(criteria.eligible_batches))
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        debug!(
            candidates = rows.len(),
            "Eligibility query matched candidate profiles"
        );
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
