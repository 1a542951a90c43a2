//! Course registry: cache of courses with their room references resolved.

use std::sync::Arc;

use campus_core::{Course, Id, Student};

use crate::CampusDb;
use crate::error::RegistryError;
use crate::guard;
use crate::registries::{CompanyRegistry, RoomRegistry};
use crate::search;

const SELECT_COLS: &str = "id, name, room_id";

/// Build a course from a row, resolving its room through the room registry.
///
/// A dangling `room_id` is a data-integrity problem in the store: the row
/// is logged and skipped, never cached with a missing room.
fn resolve_course_row(
    row: &libsql::Row,
    rooms: &RoomRegistry,
) -> Result<Option<Course>, RegistryError> {
    let id: Id = row.get(0)?;
    let name: String = row.get(1)?;
    let room_id: Id = row.get(2)?;
    match rooms.find_by_id(room_id) {
        Some(room) => Ok(Some(Course {
            id,
            name,
            room: room.clone(),
        })),
        None => {
            tracing::warn!(
                course_id = id,
                room_id,
                "course references a room that is not cached; skipping row"
            );
            Ok(None)
        }
    }
}

/// In-memory snapshot of the `course` table plus its CRUD operations.
///
/// Cross-registry resolution is explicit: methods that construct courses
/// take the room registry as an argument, so the caller controls which
/// snapshot references are resolved against.
pub struct CourseRegistry {
    db: Arc<CampusDb>,
    courses: Vec<Course>,
}

impl CourseRegistry {
    pub(crate) fn new(db: Arc<CampusDb>) -> Self {
        Self {
            db,
            courses: Vec::new(),
        }
    }

    /// Replace the snapshot with every persisted course whose room resolves.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the query fails; the old snapshot is kept.
    pub async fn load_all(&mut self, rooms: &RoomRegistry) -> Result<(), RegistryError> {
        let mut rows = self
            .db
            .query(&format!("SELECT {SELECT_COLS} FROM course ORDER BY id"), ())
            .await?;
        let mut courses = Vec::new();
        while let Some(row) = rows.next().await? {
            if let Some(course) = resolve_course_row(&row, rooms)? {
                courses.push(course);
            }
        }
        self.courses = courses;
        Ok(())
    }

    /// Insert a course after resolving its room.
    ///
    /// # Errors
    ///
    /// `InvalidReference` when `room_id` does not resolve; nothing is
    /// inserted in that case. `RegistryError` on insert failure, leaving
    /// the snapshot untouched.
    pub async fn add(
        &mut self,
        rooms: &RoomRegistry,
        name: &str,
        room_id: Id,
    ) -> Result<Course, RegistryError> {
        let room = rooms
            .find_by_id(room_id)
            .ok_or(RegistryError::InvalidReference {
                entity: "room",
                id: room_id,
            })?
            .clone();
        self.db
            .execute(
                "INSERT INTO course (name, room_id) VALUES (?1, ?2)",
                libsql::params![name, room_id],
            )
            .await?;
        let course = Course {
            id: self.db.last_insert_id(),
            name: name.to_string(),
            room,
        };
        self.courses.push(course.clone());
        Ok(course)
    }

    /// Delete a course. A course absent from the snapshot is a no-op.
    ///
    /// # Errors
    ///
    /// `EntityInUse` when students are still enrolled; the snapshot is
    /// untouched on any failure.
    pub async fn remove(&mut self, course: &Course) -> Result<(), RegistryError> {
        if self.find_by_id(course.id).is_none() {
            return Ok(());
        }
        self.db
            .execute("DELETE FROM course WHERE id = ?1", [course.id])
            .await
            .map_err(|e| guard::route_delete_failure(e, "course", "students"))?;
        self.courses.retain(|c| c.id != course.id);
        Ok(())
    }

    /// Persist a full overwrite of `name` and `room_id`, then replace the
    /// matching snapshot entry in place (position preserved). A course
    /// missing from the snapshot triggers a reload so cache and store
    /// cannot diverge.
    ///
    /// # Errors
    ///
    /// `InvalidReference` when the course's room is no longer cached;
    /// `RegistryError` on store failure, leaving the snapshot untouched.
    pub async fn update(
        &mut self,
        rooms: &RoomRegistry,
        course: &Course,
    ) -> Result<(), RegistryError> {
        if rooms.find_by_id(course.room.id).is_none() {
            return Err(RegistryError::InvalidReference {
                entity: "room",
                id: course.room.id,
            });
        }
        self.db
            .execute(
                "UPDATE course SET name = ?1, room_id = ?2 WHERE id = ?3",
                libsql::params![course.name.as_str(), course.room.id, course.id],
            )
            .await?;
        match self.courses.iter().position(|c| c.id == course.id) {
            Some(index) => self.courses[index] = course.clone(),
            None => {
                tracing::warn!(
                    course_id = course.id,
                    "updated course was missing from the cache; reloading"
                );
                self.load_all(rooms).await?;
            }
        }
        Ok(())
    }

    /// Live query of the students enrolled in a course, never served from
    /// the cache. Each row's company is resolved through the company
    /// registry; rows with a dangling company are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the query fails.
    pub async fn course_students(
        &self,
        companies: &CompanyRegistry,
        course: &Course,
    ) -> Result<Vec<Student>, RegistryError> {
        let mut rows = self
            .db
            .query(
                "SELECT id, name, surname, javaskills, company_id FROM student \
                 WHERE course_id = ?1 ORDER BY id",
                [course.id],
            )
            .await?;
        let mut students = Vec::new();
        while let Some(row) = rows.next().await? {
            let id: Id = row.get(0)?;
            let company_id: Id = row.get(4)?;
            let Some(company) = companies.find_by_id(company_id) else {
                tracing::warn!(
                    student_id = id,
                    company_id,
                    "student references a company that is not cached; skipping row"
                );
                continue;
            };
            students.push(Student {
                id,
                name: row.get(1)?,
                surname: row.get(2)?,
                skill_level: row.get(3)?,
                course: course.clone(),
                company: company.clone(),
            });
        }
        Ok(students)
    }

    #[must_use]
    pub fn find_by_id(&self, id: Id) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    /// Exact-match lookup by name (case-sensitive).
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.name == name)
    }

    /// Case-insensitive substring search against the store, rooms resolved
    /// per row. Results are never merged into the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the query fails.
    pub async fn search(
        &self,
        rooms: &RoomRegistry,
        term: &str,
    ) -> Result<Vec<Course>, RegistryError> {
        let mut rows = self
            .db
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM course \
                     WHERE LOWER(name) LIKE ?1 ESCAPE '\\' ORDER BY id"
                ),
                [search::like_pattern(term)],
            )
            .await?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            if let Some(course) = resolve_course_row(&row, rooms)? {
                results.push(course);
            }
        }
        Ok(results)
    }

    /// The current snapshot, in load/insert order.
    #[must_use]
    pub fn snapshot(&self) -> &[Course] {
        &self.courses
    }
}
