//! Registry error types for campus-db.

use std::time::Duration;

use campus_core::Id;
use thiserror::Error;

/// Errors from registry operations.
///
/// The first three variants are user-actionable and meant for inline display
/// near the offending control; everything else is persistence-class and
/// indicates the store itself failed (see [`RegistryError::is_persistence`]).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Caller-supplied input is structurally invalid (e.g., skill level
    /// outside 0-100).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A foreign reference does not resolve in the relevant registry at the
    /// time of the call.
    #[error("{entity} {id} does not resolve to a cached record")]
    InvalidReference { entity: &'static str, id: Id },

    /// A delete was rejected because dependent rows still reference the row.
    #[error("cannot delete {entity}: has associated {dependents}")]
    EntityInUse {
        entity: &'static str,
        dependents: &'static str,
    },

    /// Schema migration failed.
    #[error("migration failed: {0}")]
    Migration(String),

    /// A store call did not complete within the configured bound.
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    /// Underlying libSQL error.
    #[error("store error: {0}")]
    Store(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RegistryError {
    /// Whether this error indicates the backing store itself failed, as
    /// opposed to a user-actionable rejection. The UI collaborator renders
    /// persistence-class errors as a blocking alert.
    #[must_use]
    pub const fn is_persistence(&self) -> bool {
        !matches!(
            self,
            Self::Validation(_) | Self::InvalidReference { .. } | Self::EntityInUse { .. }
        )
    }
}
