use std::path::Path;

use rusqlite::Connection;

use crate::error::NexusResult;

/// Initialize the database schema. Creates all tables if they don't exist.
pub fn initialize(conn: &Connection) -> NexusResult<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS family_groups (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            parent_id TEXT REFERENCES family_groups(id)
        );

        CREATE INDEX IF NOT EXISTS idx_groups_parent ON family_groups(parent_id);

        CREATE TABLE IF NOT EXISTS contacts (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            phone_number TEXT NOT NULL,
            email TEXT,
            notes TEXT,
            avatar_url TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS contact_alternative_numbers (
            contact_id TEXT NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            number TEXT NOT NULL,
            PRIMARY KEY (contact_id, position)
        );

        CREATE TABLE IF NOT EXISTS contact_addresses (
            contact_id TEXT NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            label TEXT,
            street TEXT,
            city TEXT,
            state TEXT,
            zip TEXT,
            country TEXT,
            PRIMARY KEY (contact_id, position)
        );

        CREATE TABLE IF NOT EXISTS contact_display_names (
            contact_id TEXT NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
            lang TEXT NOT NULL,
            name TEXT NOT NULL,
            PRIMARY KEY (contact_id, lang)
        );

        CREATE TABLE IF NOT EXISTS group_memberships (
            contact_id TEXT NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
            group_id TEXT NOT NULL REFERENCES family_groups(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            PRIMARY KEY (contact_id, group_id)
        );

        CREATE TABLE IF NOT EXISTS contact_sources (
            contact_id TEXT NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
            source TEXT NOT NULL,
            PRIMARY KEY (contact_id, source)
        );
        ",
    )?;
    Ok(())
}

/// Open (or create) a file-backed address book.
pub fn open(path: &Path) -> NexusResult<Connection> {
    let conn = Connection::open(path)?;
    initialize(&conn)?;
    Ok(conn)
}

/// Open a fresh address book that lives only as long as the connection.
pub fn open_in_memory() -> NexusResult<Connection> {
    let conn = Connection::open_in_memory()?;
    initialize(&conn)?;
    Ok(conn)
}

/// Create an in-memory connection for testing.
pub fn test_connection() -> Connection {
    open_in_memory().unwrap()
}
