use rusqlite::Connection;

use crate::error::StorageError;

pub const SCHEMA_VERSION: i32 = 1;

pub fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
    ",
    )?;
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at INTEGER NOT NULL
);
INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, unixepoch());

CREATE TABLE IF NOT EXISTS owned_items (
    user_id BLOB NOT NULL CHECK (length(user_id) = 16),
    item_id TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('creature', 'decoration')),
    display_name TEXT NOT NULL,
    image_ref TEXT NOT NULL,
    acquired_at INTEGER NOT NULL DEFAULT (CAST(unixepoch('now','subsec') * 1000 AS INTEGER)),
    PRIMARY KEY (user_id, item_id)
);
CREATE INDEX IF NOT EXISTS idx_owned_items_acquired ON owned_items (user_id, acquired_at);

CREATE TABLE IF NOT EXISTS layouts (
    user_id BLOB PRIMARY KEY CHECK (length(user_id) = 16),
    payload BLOB NOT NULL,
    checksum BLOB NOT NULL CHECK (length(checksum) = 32),
    tank_count INTEGER NOT NULL,
    warehouse_count INTEGER NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (CAST(unixepoch('now','subsec') * 1000 AS INTEGER))
);
";

pub fn schema_version(conn: &Connection) -> Result<i32, StorageError> {
    let version = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(version)
}
