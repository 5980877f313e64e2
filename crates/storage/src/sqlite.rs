use rusqlite::{Connection, OptionalExtension};

use aquarium_core::{
    ids::{ItemId, UserId},
    item::{InventoryItemRef, ItemKind},
    layout::{payload_checksum, LayoutSnapshot},
};

use crate::error::StorageError;
use crate::traits::{InventoryStore, LayoutStore};

/// SQLite-backed inventory and layout persistence.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Record a purchase. Granting an item the user already owns refreshes
    /// its metadata and keeps its acquisition time.
    pub fn grant_item(&mut self, user_id: UserId, item: &InventoryItemRef) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO owned_items (user_id, item_id, kind, display_name, image_ref) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (user_id, item_id) DO UPDATE SET kind = excluded.kind, display_name = excluded.display_name, image_ref = excluded.image_ref",
            rusqlite::params![
                user_id.as_bytes().as_slice(),
                item.id.as_str(),
                item.kind.as_str(),
                item.display_name,
                item.image_ref,
            ],
        )?;
        Ok(())
    }

    /// Remove an item from the catalog. Returns false if it was not owned.
    /// The user's saved layout is left alone.
    pub fn revoke_item(&mut self, user_id: UserId, item_id: &ItemId) -> Result<bool, StorageError> {
        let removed = self.conn.execute(
            "DELETE FROM owned_items WHERE user_id = ?1 AND item_id = ?2",
            rusqlite::params![user_id.as_bytes().as_slice(), item_id.as_str()],
        )?;
        Ok(removed > 0)
    }

    /// Millisecond timestamp of the last layout write, if any.
    pub fn layout_updated_at(&self, user_id: UserId) -> Result<Option<i64>, StorageError> {
        let updated = self
            .conn
            .query_row(
                "SELECT updated_at FROM layouts WHERE user_id = ?1",
                rusqlite::params![user_id.as_bytes().as_slice()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(updated)
    }
}

impl InventoryStore for SqliteStorage {
    fn get_owned_items(&self, user_id: UserId) -> Result<Vec<InventoryItemRef>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT item_id, kind, display_name, image_ref FROM owned_items WHERE user_id = ?1 ORDER BY acquired_at, rowid",
        )?;
        let rows = stmt.query_map(rusqlite::params![user_id.as_bytes().as_slice()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut items = Vec::new();
        for row in rows {
            let (item_id, kind, display_name, image_ref) = row?;
            items.push(InventoryItemRef {
                id: ItemId::from(item_id),
                kind: ItemKind::parse(&kind)?,
                display_name,
                image_ref,
            });
        }
        Ok(items)
    }
}

impl LayoutStore for SqliteStorage {
    fn get_layout(&self, user_id: UserId) -> Result<Option<LayoutSnapshot>, StorageError> {
        let row: Option<(Vec<u8>, Vec<u8>)> = self
            .conn
            .query_row(
                "SELECT payload, checksum FROM layouts WHERE user_id = ?1",
                rusqlite::params![user_id.as_bytes().as_slice()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((payload, checksum)) = row else {
            return Ok(None);
        };
        if payload_checksum(&payload).as_slice() != checksum.as_slice() {
            return Err(StorageError::Corrupted {
                user_id: user_id.to_string(),
            });
        }
        Ok(Some(LayoutSnapshot::from_msgpack(&payload)?))
    }

    fn put_layout(&mut self, user_id: UserId, snapshot: &LayoutSnapshot) -> Result<(), StorageError> {
        let payload = snapshot.to_msgpack()?;
        let checksum = payload_checksum(&payload);
        self.conn.execute(
            "INSERT INTO layouts (user_id, payload, checksum, tank_count, warehouse_count) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (user_id) DO UPDATE SET payload = excluded.payload, checksum = excluded.checksum,
                 tank_count = excluded.tank_count, warehouse_count = excluded.warehouse_count,
                 updated_at = CAST(unixepoch('now','subsec') * 1000 AS INTEGER)",
            rusqlite::params![
                user_id.as_bytes().as_slice(),
                payload,
                checksum.as_slice(),
                snapshot.tank_items.len() as i64,
                snapshot.warehouse_items.len() as i64,
            ],
        )?;
        Ok(())
    }
}
