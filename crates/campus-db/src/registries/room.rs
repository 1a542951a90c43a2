//! Room registry: flat cache of training rooms.

use std::sync::Arc;

use campus_core::{Id, Room};

use crate::CampusDb;
use crate::error::RegistryError;
use crate::guard;
use crate::search;

const SELECT_COLS: &str = "id, name";

fn row_to_room(row: &libsql::Row) -> Result<Room, RegistryError> {
    Ok(Room {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

/// In-memory snapshot of the `room` table plus its CRUD operations.
pub struct RoomRegistry {
    db: Arc<CampusDb>,
    rooms: Vec<Room>,
}

impl RoomRegistry {
    pub(crate) fn new(db: Arc<CampusDb>) -> Self {
        Self {
            db,
            rooms: Vec::new(),
        }
    }

    /// Replace the snapshot with every persisted room, in stable id order.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the query fails; the old snapshot is kept
    /// in that case.
    pub async fn load_all(&mut self) -> Result<(), RegistryError> {
        let mut rows = self
            .db
            .query(&format!("SELECT {SELECT_COLS} FROM room ORDER BY id"), ())
            .await?;
        let mut rooms = Vec::new();
        while let Some(row) = rows.next().await? {
            rooms.push(row_to_room(&row)?);
        }
        self.rooms = rooms;
        Ok(())
    }

    /// Insert a room, append it to the snapshot, and return it with the
    /// store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` on insert failure; the snapshot is untouched.
    pub async fn add(&mut self, name: &str) -> Result<Room, RegistryError> {
        self.db
            .execute("INSERT INTO room (name) VALUES (?1)", [name])
            .await?;
        let room = Room {
            id: self.db.last_insert_id(),
            name: name.to_string(),
        };
        self.rooms.push(room.clone());
        Ok(room)
    }

    /// Delete a room. A room absent from the snapshot is a no-op.
    ///
    /// # Errors
    ///
    /// `EntityInUse` when courses still reference the room, any other store
    /// failure as-is; the snapshot is untouched on failure.
    pub async fn remove(&mut self, room: &Room) -> Result<(), RegistryError> {
        if self.find_by_id(room.id).is_none() {
            return Ok(());
        }
        self.db
            .execute("DELETE FROM room WHERE id = ?1", [room.id])
            .await
            .map_err(|e| guard::route_delete_failure(e, "room", "courses"))?;
        self.rooms.retain(|r| r.id != room.id);
        Ok(())
    }

    #[must_use]
    pub fn find_by_id(&self, id: Id) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// Exact-match lookup by name (case-sensitive).
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.name == name)
    }

    /// Case-insensitive substring search against the store.
    ///
    /// Results are never merged into the snapshot; an empty term returns
    /// every row.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the query fails.
    pub async fn search(&self, term: &str) -> Result<Vec<Room>, RegistryError> {
        let mut rows = self
            .db
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM room \
                     WHERE LOWER(name) LIKE ?1 ESCAPE '\\' ORDER BY id"
                ),
                [search::like_pattern(term)],
            )
            .await?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(row_to_room(&row)?);
        }
        Ok(results)
    }

    /// The current snapshot, in load/insert order.
    #[must_use]
    pub fn snapshot(&self) -> &[Room] {
        &self.rooms
    }
}
