//! Referential delete guard.
//!
//! The only place a failed write is expected: a delete rejected by a
//! foreign-key constraint means the row still has dependents, and the
//! registries route that to the domain-level `EntityInUse` outcome instead
//! of a generic store failure. The predicate is intentionally narrow so
//! genuine store errors are never mistaken for the in-use case.

use crate::error::RegistryError;

/// Primary SQLite result code for any constraint violation.
const SQLITE_CONSTRAINT: i32 = 19;

/// Classification of a backing-store delete failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteFailure {
    /// The row is still referenced by dependent rows.
    InUse,
    /// Anything else (connectivity, unrelated constraint, SQL error).
    Other,
}

/// Decide whether a store error is a referential-constraint rejection.
#[must_use]
pub fn classify(err: &libsql::Error) -> DeleteFailure {
    if let libsql::Error::SqliteFailure(code, message) = err {
        if (*code & 0xff) == SQLITE_CONSTRAINT && message.contains("FOREIGN KEY") {
            return DeleteFailure::InUse;
        }
    }
    // Remote connections surface constraint violations without the numeric
    // result code, so fall back to the canonical SQLite message.
    if err.to_string().contains("FOREIGN KEY constraint failed") {
        return DeleteFailure::InUse;
    }
    DeleteFailure::Other
}

/// Translate a delete failure for a registry: an in-use rejection becomes
/// `EntityInUse` carrying the dependent kind for display, everything else is
/// passed through unchanged. The caller leaves its snapshot untouched either
/// way.
pub(crate) fn route_delete_failure(
    err: RegistryError,
    entity: &'static str,
    dependents: &'static str,
) -> RegistryError {
    match &err {
        RegistryError::Store(inner) if classify(inner) == DeleteFailure::InUse => {
            RegistryError::EntityInUse { entity, dependents }
        }
        _ => err,
    }
}
