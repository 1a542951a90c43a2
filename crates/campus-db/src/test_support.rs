//! Shared test utilities for campus-db tests.

pub(crate) mod helpers {
    use crate::CampusDb;
    use crate::registries::Registries;

    /// In-memory database with the schema applied.
    pub async fn test_db() -> CampusDb {
        CampusDb::open_local(":memory:").await.unwrap()
    }

    /// Empty registries over an in-memory database.
    pub async fn test_registries() -> Registries {
        Registries::open(test_db().await).await.unwrap()
    }

    /// Registries seeded with one room ("Lab 1"), one company ("Initech"),
    /// one course ("Algorithms") in that room, and one student
    /// ("Ada Lovelace", skill 80) wired to both.
    pub async fn seeded_registries() -> Registries {
        let mut reg = test_registries().await;
        let room = reg.rooms.add("Lab 1").await.unwrap();
        let company = reg.companies.add("Initech").await.unwrap();
        let course = reg
            .courses
            .add(&reg.rooms, "Algorithms", room.id)
            .await
            .unwrap();
        reg.students
            .add(
                &reg.courses,
                &reg.companies,
                "Ada",
                "Lovelace",
                80,
                course.id,
                company.id,
            )
            .await
            .unwrap();
        reg
    }
}
