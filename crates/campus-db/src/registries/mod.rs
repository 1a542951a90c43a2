//! Registry modules: one in-memory snapshot plus CRUD per entity kind.
//!
//! Every mutating method takes `&mut self`: the single-writer assumption
//! of the UI-event caller is encoded in the borrow checker instead of
//! internal locks, and reads can never observe a snapshot mid-mutation.
//! A caller exposing a registry to concurrent writers must wrap it in its
//! own async mutex held across the combined store write + snapshot update.
//!
//! Snapshot mutation strictly follows store success: a failed write leaves
//! the cache exactly as it was.

mod company;
mod course;
mod room;
mod student;

pub use company::CompanyRegistry;
pub use course::CourseRegistry;
pub use room::RoomRegistry;
pub use student::StudentRegistry;

use std::sync::Arc;

use crate::CampusDb;
use crate::error::RegistryError;

/// All four registries over one shared store handle.
///
/// [`Registries::open`] seeds the snapshots in dependency order: rooms and
/// companies first, then courses (which resolve rooms), then students
/// (which resolve courses and companies).
pub struct Registries {
    pub rooms: RoomRegistry,
    pub companies: CompanyRegistry,
    pub courses: CourseRegistry,
    pub students: StudentRegistry,
}

impl Registries {
    /// Build the registries and seed every snapshot from the store.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if any of the seed queries fails.
    pub async fn open(db: CampusDb) -> Result<Self, RegistryError> {
        let db = Arc::new(db);
        let mut registries = Self {
            rooms: RoomRegistry::new(Arc::clone(&db)),
            companies: CompanyRegistry::new(Arc::clone(&db)),
            courses: CourseRegistry::new(Arc::clone(&db)),
            students: StudentRegistry::new(db),
        };
        registries.reload().await?;
        Ok(registries)
    }

    /// Re-seed every snapshot from the store, in dependency order.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if any of the queries fails.
    pub async fn reload(&mut self) -> Result<(), RegistryError> {
        self.rooms.load_all().await?;
        self.companies.load_all().await?;
        self.courses.load_all(&self.rooms).await?;
        self.students
            .load_all(&self.courses, &self.companies)
            .await?;
        Ok(())
    }
}
