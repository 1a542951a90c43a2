//! Student registry: cache of students with course and company resolved.

use std::collections::HashSet;
use std::sync::Arc;

use campus_core::{Id, Student};

use crate::CampusDb;
use crate::error::RegistryError;
use crate::registries::{CompanyRegistry, CourseRegistry};
use crate::search;

const SELECT_COLS: &str = "id, name, surname, javaskills, course_id, company_id";

/// The registry rejects out-of-range skill levels instead of clamping;
/// the input control clamps on its own side.
fn validate_skill_level(skill_level: i64) -> Result<(), RegistryError> {
    if (0..=100).contains(&skill_level) {
        Ok(())
    } else {
        Err(RegistryError::Validation(format!(
            "skill level {skill_level} is outside 0-100"
        )))
    }
}

/// Build a student from a row, resolving both references. Dangling
/// references are logged and the row skipped, as in the course registry.
fn resolve_student_row(
    row: &libsql::Row,
    courses: &CourseRegistry,
    companies: &CompanyRegistry,
) -> Result<Option<Student>, RegistryError> {
    let id: Id = row.get(0)?;
    let course_id: Id = row.get(4)?;
    let company_id: Id = row.get(5)?;
    let Some(course) = courses.find_by_id(course_id) else {
        tracing::warn!(
            student_id = id,
            course_id,
            "student references a course that is not cached; skipping row"
        );
        return Ok(None);
    };
    let Some(company) = companies.find_by_id(company_id) else {
        tracing::warn!(
            student_id = id,
            company_id,
            "student references a company that is not cached; skipping row"
        );
        return Ok(None);
    };
    Ok(Some(Student {
        id,
        name: row.get(1)?,
        surname: row.get(2)?,
        skill_level: row.get(3)?,
        course: course.clone(),
        company: company.clone(),
    }))
}

/// In-memory snapshot of the `student` table plus its CRUD operations.
pub struct StudentRegistry {
    db: Arc<CampusDb>,
    students: Vec<Student>,
}

impl StudentRegistry {
    pub(crate) fn new(db: Arc<CampusDb>) -> Self {
        Self {
            db,
            students: Vec::new(),
        }
    }

    /// Replace the snapshot with every persisted student whose references
    /// resolve.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the query fails; the old snapshot is kept.
    pub async fn load_all(
        &mut self,
        courses: &CourseRegistry,
        companies: &CompanyRegistry,
    ) -> Result<(), RegistryError> {
        let mut rows = self
            .db
            .query(
                &format!("SELECT {SELECT_COLS} FROM student ORDER BY id"),
                (),
            )
            .await?;
        let mut students = Vec::new();
        while let Some(row) = rows.next().await? {
            if let Some(student) = resolve_student_row(&row, courses, companies)? {
                students.push(student);
            }
        }
        self.students = students;
        Ok(())
    }

    /// Validate, resolve both references, insert, and cache the new student.
    ///
    /// # Errors
    ///
    /// `Validation` when `skill_level` is outside 0-100, `InvalidReference`
    /// when either id does not resolve; nothing is inserted in those cases.
    /// `RegistryError` on insert failure, leaving the snapshot untouched.
    #[allow(clippy::too_many_arguments)]
    pub async fn add(
        &mut self,
        courses: &CourseRegistry,
        companies: &CompanyRegistry,
        name: &str,
        surname: &str,
        skill_level: i64,
        course_id: Id,
        company_id: Id,
    ) -> Result<Student, RegistryError> {
        validate_skill_level(skill_level)?;
        let course = courses
            .find_by_id(course_id)
            .ok_or(RegistryError::InvalidReference {
                entity: "course",
                id: course_id,
            })?
            .clone();
        let company = companies
            .find_by_id(company_id)
            .ok_or(RegistryError::InvalidReference {
                entity: "company",
                id: company_id,
            })?
            .clone();
        self.db
            .execute(
                "INSERT INTO student (name, surname, javaskills, course_id, company_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![name, surname, skill_level, course_id, company_id],
            )
            .await?;
        let student = Student {
            id: self.db.last_insert_id(),
            name: name.to_string(),
            surname: surname.to_string(),
            skill_level,
            course,
            company,
        };
        self.students.push(student.clone());
        Ok(student)
    }

    /// Delete a student. Nothing references students, so there is no in-use
    /// conflict class; a student absent from the snapshot is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` on store failure; the snapshot is untouched.
    pub async fn remove(&mut self, student: &Student) -> Result<(), RegistryError> {
        if self.find_by_id(student.id).is_none() {
            return Ok(());
        }
        self.db
            .execute("DELETE FROM student WHERE id = ?1", [student.id])
            .await?;
        self.students.retain(|s| s.id != student.id);
        Ok(())
    }

    /// Delete a batch of students atomically.
    ///
    /// All deletes run in one transaction: on any failure the transaction
    /// rolls back and the snapshot keeps every listed student; only after
    /// commit are the listed ids dropped from the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` on any store failure.
    pub async fn remove_many(&mut self, students: &[Student]) -> Result<(), RegistryError> {
        if students.is_empty() {
            return Ok(());
        }
        let tx = self.db.transaction().await?;
        for student in students {
            // Per-statement calls go through the same bounded wrapper as
            // every other store call; a stalled statement surfaces Timeout
            // instead of hanging the batch.
            if let Err(e) = self
                .db
                .with_timeout(tx.execute("DELETE FROM student WHERE id = ?1", [student.id]))
                .await
            {
                if let Err(rollback_err) = self.db.with_timeout(tx.rollback()).await {
                    tracing::warn!(
                        error = %rollback_err,
                        "rollback after failed batch delete also failed"
                    );
                }
                return Err(e);
            }
        }
        self.db.with_timeout(tx.commit()).await?;
        let removed: HashSet<Id> = students.iter().map(|s| s.id).collect();
        self.students.retain(|s| !removed.contains(&s.id));
        Ok(())
    }

    /// Persist a full overwrite of every field for the row matching
    /// `student.id`, then replace the matching snapshot entry in place. A
    /// student missing from the snapshot triggers a reload.
    ///
    /// # Errors
    ///
    /// `Validation` / `InvalidReference` as in [`Self::add`];
    /// `RegistryError` on store failure, leaving the snapshot untouched.
    pub async fn update(
        &mut self,
        courses: &CourseRegistry,
        companies: &CompanyRegistry,
        student: &Student,
    ) -> Result<(), RegistryError> {
        validate_skill_level(student.skill_level)?;
        if courses.find_by_id(student.course.id).is_none() {
            return Err(RegistryError::InvalidReference {
                entity: "course",
                id: student.course.id,
            });
        }
        if companies.find_by_id(student.company.id).is_none() {
            return Err(RegistryError::InvalidReference {
                entity: "company",
                id: student.company.id,
            });
        }
        self.db
            .execute(
                "UPDATE student SET name = ?1, surname = ?2, javaskills = ?3, \
                 course_id = ?4, company_id = ?5 WHERE id = ?6",
                libsql::params![
                    student.name.as_str(),
                    student.surname.as_str(),
                    student.skill_level,
                    student.course.id,
                    student.company.id,
                    student.id
                ],
            )
            .await?;
        match self.students.iter().position(|s| s.id == student.id) {
            Some(index) => self.students[index] = student.clone(),
            None => {
                tracing::warn!(
                    student_id = student.id,
                    "updated student was missing from the cache; reloading"
                );
                self.load_all(courses, companies).await?;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn find_by_id(&self, id: Id) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    /// Case-insensitive substring search against name or surname, issued
    /// against the store. Results are never merged into the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the query fails.
    pub async fn search(
        &self,
        courses: &CourseRegistry,
        companies: &CompanyRegistry,
        term: &str,
    ) -> Result<Vec<Student>, RegistryError> {
        let mut rows = self
            .db
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM student \
                     WHERE LOWER(name) LIKE ?1 ESCAPE '\\' \
                        OR LOWER(surname) LIKE ?1 ESCAPE '\\' ORDER BY id"
                ),
                [search::like_pattern(term)],
            )
            .await?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            if let Some(student) = resolve_student_row(&row, courses, companies)? {
                results.push(student);
            }
        }
        Ok(results)
    }

    /// The current snapshot, in load/insert order.
    #[must_use]
    pub fn snapshot(&self) -> &[Student] {
        &self.students
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::error::RegistryError;
    use crate::test_support::helpers::{seeded_registries, test_registries};

    #[tokio::test]
    async fn add_and_find_roundtrip() {
        let reg = seeded_registries().await;
        let student = reg.students.snapshot()[0].clone();

        let found = reg.students.find_by_id(student.id).unwrap();
        assert_eq!(found, &student);
        assert_eq!(found.course.name, "Algorithms");
        assert_eq!(found.company.name, "Initech");
    }

    #[rstest]
    #[case(0)]
    #[case(50)]
    #[case(100)]
    #[tokio::test]
    async fn add_accepts_skill_level_in_range(#[case] skill_level: i64) {
        let mut reg = seeded_registries().await;
        let course_id = reg.courses.find_by_name("Algorithms").unwrap().id;
        let company_id = reg.companies.find_by_name("Initech").unwrap().id;

        let student = reg
            .students
            .add(
                &reg.courses,
                &reg.companies,
                "Grace",
                "Hopper",
                skill_level,
                course_id,
                company_id,
            )
            .await
            .unwrap();
        assert_eq!(student.skill_level, skill_level);
    }

    #[rstest]
    #[case(-1)]
    #[case(101)]
    #[case(i64::MAX)]
    #[tokio::test]
    async fn add_rejects_skill_level_out_of_range(#[case] skill_level: i64) {
        let mut reg = seeded_registries().await;
        let course_id = reg.courses.find_by_name("Algorithms").unwrap().id;
        let company_id = reg.companies.find_by_name("Initech").unwrap().id;
        let before = reg.students.snapshot().len();

        let result = reg
            .students
            .add(
                &reg.courses,
                &reg.companies,
                "Grace",
                "Hopper",
                skill_level,
                course_id,
                company_id,
            )
            .await;
        assert!(matches!(result, Err(RegistryError::Validation(_))));
        assert_eq!(reg.students.snapshot().len(), before);
    }

    #[tokio::test]
    async fn add_with_unresolvable_references_inserts_nothing() {
        let mut reg = seeded_registries().await;
        let course_id = reg.courses.find_by_name("Algorithms").unwrap().id;
        let company_id = reg.companies.find_by_name("Initech").unwrap().id;

        let result = reg
            .students
            .add(&reg.courses, &reg.companies, "G", "H", 50, 999, company_id)
            .await;
        assert!(matches!(
            result,
            Err(RegistryError::InvalidReference { entity: "course", .. })
        ));

        let result = reg
            .students
            .add(&reg.courses, &reg.companies, "G", "H", 50, course_id, 999)
            .await;
        assert!(matches!(
            result,
            Err(RegistryError::InvalidReference { entity: "company", .. })
        ));

        assert_eq!(reg.students.snapshot().len(), 1);
        let stored = reg
            .students
            .search(&reg.courses, &reg.companies, "")
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn remove_twice_is_a_noop() {
        let mut reg = seeded_registries().await;
        let student = reg.students.snapshot()[0].clone();

        reg.students.remove(&student).await.unwrap();
        reg.students.remove(&student).await.unwrap();
        assert!(reg.students.snapshot().is_empty());
    }

    #[tokio::test]
    async fn remove_many_drops_exactly_the_batch() {
        let mut reg = seeded_registries().await;
        let course_id = reg.courses.find_by_name("Algorithms").unwrap().id;
        let company_id = reg.companies.find_by_name("Initech").unwrap().id;
        let s1 = reg
            .students
            .add(&reg.courses, &reg.companies, "Grace", "Hopper", 90, course_id, company_id)
            .await
            .unwrap();
        let s2 = reg
            .students
            .add(&reg.courses, &reg.companies, "Alan", "Turing", 95, course_id, company_id)
            .await
            .unwrap();

        reg.students.remove_many(&[s1, s2]).await.unwrap();
        assert_eq!(reg.students.snapshot().len(), 1);
        assert_eq!(reg.students.snapshot()[0].name, "Ada");
    }

    #[tokio::test]
    async fn remove_many_of_empty_batch_is_a_noop() {
        let mut reg = seeded_registries().await;
        reg.students.remove_many(&[]).await.unwrap();
        assert_eq!(reg.students.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn update_overwrites_all_fields_in_place() {
        let mut reg = seeded_registries().await;
        let mut student = reg.students.snapshot()[0].clone();
        student.surname = "Byron".to_string();
        student.skill_level = 99;

        reg.students
            .update(&reg.courses, &reg.companies, &student)
            .await
            .unwrap();

        let cached = reg.students.find_by_id(student.id).unwrap();
        assert_eq!(cached.surname, "Byron");
        assert_eq!(cached.skill_level, 99);

        // Persisted too.
        reg.reload().await.unwrap();
        assert_eq!(reg.students.find_by_id(student.id).unwrap().surname, "Byron");
    }

    #[tokio::test]
    async fn update_rejects_out_of_range_skill_level() {
        let mut reg = seeded_registries().await;
        let mut student = reg.students.snapshot()[0].clone();
        student.skill_level = 101;

        let result = reg
            .students
            .update(&reg.courses, &reg.companies, &student)
            .await;
        assert!(matches!(result, Err(RegistryError::Validation(_))));
        assert_eq!(reg.students.snapshot()[0].skill_level, 80);
    }

    #[tokio::test]
    async fn search_matches_name_or_surname() {
        let mut reg = seeded_registries().await;
        let course_id = reg.courses.find_by_name("Algorithms").unwrap().id;
        let company_id = reg.companies.find_by_name("Initech").unwrap().id;
        reg.students
            .add(&reg.courses, &reg.companies, "Grace", "Hopper", 90, course_id, company_id)
            .await
            .unwrap();

        // Surname hit.
        let hits = reg
            .students
            .search(&reg.courses, &reg.companies, "LOVE")
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Ada");

        // Name hit.
        let hits = reg
            .students
            .search(&reg.courses, &reg.companies, "gra")
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].surname, "Hopper");

        assert!(reg
            .students
            .search(&reg.courses, &reg.companies, "zzz")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn search_with_empty_term_returns_all_rows() {
        let reg = seeded_registries().await;
        let hits = reg
            .students
            .search(&reg.courses, &reg.companies, "")
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }
}
