//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` for idempotent
//! re-running.

use crate::CampusDb;
use crate::error::RegistryError;

/// Initial schema: 4 tables, 3 FK indexes.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");

impl CampusDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), RegistryError> {
        self.conn()
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| RegistryError::Migration(format!("001_initial: {e}")))?;
        Ok(())
    }
}
