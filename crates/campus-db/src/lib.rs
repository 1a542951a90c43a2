//! # campus-db
//!
//! libSQL-backed entity registries for the campus records core.
//!
//! Four registries (rooms, companies, courses, students) mirror persisted
//! records as in-memory snapshots: seeded once at startup, adjusted
//! incrementally on successful writes, never partially updated on failure.
//! Cross-registry references (course → room, student → course/company) are
//! resolved before an entity is constructed, and the referential delete
//! guard turns the store's foreign-key rejections into a domain-level
//! "entity in use" outcome.
//!
//! Uses the `libsql` crate: local file databases (`:memory:` in tests) or
//! a remote `libsql://` URL, both with per-connection foreign-key
//! enforcement.

pub mod error;
pub mod guard;
mod migrations;
pub mod registries;
pub mod search;

#[cfg(test)]
mod test_support;

use std::time::Duration;

use campus_config::StoreConfig;
use libsql::Builder;
use libsql::params::IntoParams;

use error::RegistryError;

/// Default bound on any single store call, derived from the config default
/// so the two cannot drift.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(campus_config::DEFAULT_TIMEOUT_SECS);

/// Backing-store handle shared by all registries.
///
/// Wraps a libSQL database and connection. Every call goes through a bounded
/// timeout so a stalled connection surfaces as a persistence error instead
/// of hanging the registries. No call is ever retried.
pub struct CampusDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    timeout: Duration,
}

impl CampusDb {
    /// Open a local database at the given path (`:memory:` for throwaway
    /// databases) with the default call timeout.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, RegistryError> {
        Self::open_local_with_timeout(path, DEFAULT_TIMEOUT).await
    }

    /// Open a local database with an explicit call timeout.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local_with_timeout(
        path: &str,
        timeout: Duration,
    ) -> Result<Self, RegistryError> {
        let db = Builder::new_local(path).build().await?;
        Self::finish_open(db, timeout).await
    }

    /// Open a remote database by URL and auth token.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the connection cannot be established or
    /// migrations fail.
    pub async fn open_remote(
        url: &str,
        auth_token: &str,
        timeout: Duration,
    ) -> Result<Self, RegistryError> {
        let db = Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await?;
        Self::finish_open(db, timeout).await
    }

    /// Open the store described by a [`StoreConfig`]: the local path when
    /// set, the remote URL otherwise.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` when neither a local path nor a remote URL is
    /// configured, or when opening fails.
    pub async fn from_config(config: &StoreConfig) -> Result<Self, RegistryError> {
        config
            .require_configured()
            .map_err(|e| RegistryError::Other(e.into()))?;
        if config.has_local_path() {
            Self::open_local_with_timeout(&config.local_path, config.timeout()).await
        } else {
            Self::open_remote(&config.url, &config.auth_token, config.timeout()).await
        }
    }

    async fn finish_open(db: libsql::Database, timeout: Duration) -> Result<Self, RegistryError> {
        let conn = db.connect()?;

        // Foreign keys must be enabled per-connection in SQLite; the
        // delete guard depends on the store rejecting in-use rows.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| RegistryError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let campus_db = Self { db, conn, timeout };
        campus_db.run_migrations().await?;
        Ok(campus_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Execute a write statement, returning the affected row count.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Timeout` when the call exceeds the configured
    /// bound, or the underlying store error.
    pub async fn execute(
        &self,
        sql: &str,
        params: impl IntoParams,
    ) -> Result<u64, RegistryError> {
        self.with_timeout(self.conn.execute(sql, params)).await
    }

    /// Run a query, returning the result rows.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Timeout` when the call exceeds the configured
    /// bound, or the underlying store error.
    pub async fn query(
        &self,
        sql: &str,
        params: impl IntoParams,
    ) -> Result<libsql::Rows, RegistryError> {
        self.with_timeout(self.conn.query(sql, params)).await
    }

    /// Begin a transaction on the shared connection.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Timeout` or the underlying store error.
    pub async fn transaction(&self) -> Result<libsql::Transaction, RegistryError> {
        self.with_timeout(self.conn.transaction()).await
    }

    /// The row id assigned by the most recent insert on this connection.
    #[must_use]
    pub fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// Bound a store future with the configured timeout. Every store call,
    /// including individual transaction statements, goes through here.
    pub(crate) async fn with_timeout<T>(
        &self,
        fut: impl Future<Output = Result<T, libsql::Error>>,
    ) -> Result<T, RegistryError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(RegistryError::from),
            Err(_) => Err(RegistryError::Timeout(self.timeout)),
        }
    }
}
