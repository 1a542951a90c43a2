//! Company registry: flat cache of partner companies.
//!
//! Same contract as the room registry; the dependent kind on delete is
//! students instead of courses.

use std::sync::Arc;

use campus_core::{Company, Id};

use crate::CampusDb;
use crate::error::RegistryError;
use crate::guard;
use crate::search;

const SELECT_COLS: &str = "id, name";

fn row_to_company(row: &libsql::Row) -> Result<Company, RegistryError> {
    Ok(Company {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

/// In-memory snapshot of the `company` table plus its CRUD operations.
pub struct CompanyRegistry {
    db: Arc<CampusDb>,
    companies: Vec<Company>,
}

impl CompanyRegistry {
    pub(crate) fn new(db: Arc<CampusDb>) -> Self {
        Self {
            db,
            companies: Vec::new(),
        }
    }

    /// Replace the snapshot with every persisted company, in stable id order.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the query fails; the old snapshot is kept.
    pub async fn load_all(&mut self) -> Result<(), RegistryError> {
        let mut rows = self
            .db
            .query(
                &format!("SELECT {SELECT_COLS} FROM company ORDER BY id"),
                (),
            )
            .await?;
        let mut companies = Vec::new();
        while let Some(row) = rows.next().await? {
            companies.push(row_to_company(&row)?);
        }
        self.companies = companies;
        Ok(())
    }

    /// Insert a company, append it to the snapshot, and return it with the
    /// store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` on insert failure; the snapshot is untouched.
    pub async fn add(&mut self, name: &str) -> Result<Company, RegistryError> {
        self.db
            .execute("INSERT INTO company (name) VALUES (?1)", [name])
            .await?;
        let company = Company {
            id: self.db.last_insert_id(),
            name: name.to_string(),
        };
        self.companies.push(company.clone());
        Ok(company)
    }

    /// Delete a company. A company absent from the snapshot is a no-op.
    ///
    /// # Errors
    ///
    /// `EntityInUse` when students still reference the company; the
    /// snapshot is untouched on any failure.
    pub async fn remove(&mut self, company: &Company) -> Result<(), RegistryError> {
        if self.find_by_id(company.id).is_none() {
            return Ok(());
        }
        self.db
            .execute("DELETE FROM company WHERE id = ?1", [company.id])
            .await
            .map_err(|e| guard::route_delete_failure(e, "company", "students"))?;
        self.companies.retain(|c| c.id != company.id);
        Ok(())
    }

    #[must_use]
    pub fn find_by_id(&self, id: Id) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }

    /// Exact-match lookup by name (case-sensitive).
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.name == name)
    }

    /// Case-insensitive substring search against the store.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the query fails.
    pub async fn search(&self, term: &str) -> Result<Vec<Company>, RegistryError> {
        let mut rows = self
            .db
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM company \
                     WHERE LOWER(name) LIKE ?1 ESCAPE '\\' ORDER BY id"
                ),
                [search::like_pattern(term)],
            )
            .await?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(row_to_company(&row)?);
        }
        Ok(results)
    }

    /// The current snapshot, in load/insert order.
    #[must_use]
    pub fn snapshot(&self) -> &[Company] {
        &self.companies
    }
}
