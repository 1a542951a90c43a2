//! Cross-registry integrity scenarios over a shared store.
//!
//! These exercise the delete guard against the store's real constraint
//! graph and pin down the atomic batch-delete policy.

use campus_core::Student;
use campus_db::CampusDb;
use campus_db::error::RegistryError;
use campus_db::registries::Registries;

async fn registries() -> Registries {
    Registries::open(CampusDb::open_local(":memory:").await.unwrap())
        .await
        .unwrap()
}

/// Room ← Course ← Student chain used by most scenarios. Returns the
/// registries plus the seeded student.
async fn seeded_chain(reg: &mut Registries) -> Student {
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
        .unwrap()
}

#[tokio::test]
async fn transitive_dependents_block_room_removal() {
    let mut reg = registries().await;
    seeded_chain(&mut reg).await;
    let room = reg.rooms.find_by_name("Lab 1").unwrap().clone();

    // Only the course references the room directly, but the store's
    // constraint graph blocks the delete all the same.
    let result = reg.rooms.remove(&room).await;
    assert!(matches!(
        result,
        Err(RegistryError::EntityInUse {
            entity: "room",
            dependents: "courses"
        })
    ));
    assert!(reg.rooms.find_by_id(room.id).is_some());

    // And the store agrees after a reload.
    reg.reload().await.unwrap();
    assert!(reg.rooms.find_by_id(room.id).is_some());
}

#[tokio::test]
async fn removal_unblocks_bottom_up() {
    let mut reg = registries().await;
    let student = seeded_chain(&mut reg).await;
    let room = reg.rooms.find_by_name("Lab 1").unwrap().clone();
    let company = reg.companies.find_by_name("Initech").unwrap().clone();
    let course = reg.courses.find_by_name("Algorithms").unwrap().clone();

    reg.students.remove(&student).await.unwrap();
    reg.courses.remove(&course).await.unwrap();
    reg.rooms.remove(&room).await.unwrap();
    reg.companies.remove(&company).await.unwrap();

    reg.reload().await.unwrap();
    assert!(reg.rooms.snapshot().is_empty());
    assert!(reg.companies.snapshot().is_empty());
    assert!(reg.courses.snapshot().is_empty());
    assert!(reg.students.snapshot().is_empty());
}

#[tokio::test]
async fn remove_many_is_atomic() {
    let db = CampusDb::open_local(":memory:").await.unwrap();
    // Simulate a backing store that rejects one row of the batch.
    db.execute(
        "CREATE TRIGGER block_student_delete BEFORE DELETE ON student \
         WHEN OLD.surname = 'Blocked' \
         BEGIN SELECT RAISE(ABORT, 'delete rejected'); END",
        (),
    )
    .await
    .unwrap();
    let mut reg = Registries::open(db).await.unwrap();

    let s1 = seeded_chain(&mut reg).await;
    let course_id = reg.courses.find_by_name("Algorithms").unwrap().id;
    let company_id = reg.companies.find_by_name("Initech").unwrap().id;
    let s2 = reg
        .students
        .add(
            &reg.courses,
            &reg.companies,
            "Boris",
            "Blocked",
            40,
            course_id,
            company_id,
        )
        .await
        .unwrap();

    let result = reg.students.remove_many(&[s1, s2]).await;
    assert!(result.unwrap_err().is_persistence());

    // All-or-nothing: both stay cached, and both stay persisted.
    assert_eq!(reg.students.snapshot().len(), 2);
    reg.reload().await.unwrap();
    assert_eq!(reg.students.snapshot().len(), 2);
}

#[tokio::test]
async fn remove_many_success_drops_exactly_the_batch() {
    let mut reg = registries().await;
    let s1 = seeded_chain(&mut reg).await;
    let course_id = reg.courses.find_by_name("Algorithms").unwrap().id;
    let company_id = reg.companies.find_by_name("Initech").unwrap().id;
    let s2 = reg
        .students
        .add(
            &reg.courses,
            &reg.companies,
            "Grace",
            "Hopper",
            90,
            course_id,
            company_id,
        )
        .await
        .unwrap();
    let s3 = reg
        .students
        .add(
            &reg.courses,
            &reg.companies,
            "Alan",
            "Turing",
            95,
            course_id,
            company_id,
        )
        .await
        .unwrap();

    reg.students.remove_many(&[s1, s3]).await.unwrap();
    assert_eq!(reg.students.snapshot().len(), 1);
    assert_eq!(reg.students.snapshot()[0].id, s2.id);

    reg.reload().await.unwrap();
    assert_eq!(reg.students.snapshot().len(), 1);
    assert_eq!(reg.students.snapshot()[0].id, s2.id);
}

#[tokio::test]
async fn startup_seeds_in_dependency_order() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("campus.db");
    let path = path.to_str().unwrap();

    {
        let mut reg = Registries::open(CampusDb::open_local(path).await.unwrap())
            .await
            .unwrap();
        seeded_chain(&mut reg).await;
    }

    // Fresh process equivalent: everything resolves from the persisted
    // rows alone.
    let reg = Registries::open(CampusDb::open_local(path).await.unwrap())
        .await
        .unwrap();
    assert_eq!(reg.rooms.snapshot().len(), 1);
    assert_eq!(reg.companies.snapshot().len(), 1);
    assert_eq!(reg.courses.snapshot().len(), 1);
    assert_eq!(reg.students.snapshot().len(), 1);

    let student = &reg.students.snapshot()[0];
    assert_eq!(student.course.room.name, "Lab 1");
    assert_eq!(student.company.name, "Initech");
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
    let mut reg = registries().await;
    let first = reg.rooms.add("Lab 1").await.unwrap();
    reg.rooms.remove(&first).await.unwrap();

    let second = reg.rooms.add("Lab 2").await.unwrap();
    assert!(second.id > first.id);
}
