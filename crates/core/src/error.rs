use crate::types::DbId;

/// Error taxonomy shared by domain logic and store implementations.
///
/// The fan-out path never lets any of these escape to the caller of the
/// triggering write; they end up classified, counted and logged inside
/// the coordinator.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
