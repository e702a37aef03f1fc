//! SQLite schema creation for the catalog store.

use rusqlite::Connection;

use crate::error::StoreError;

/// Create the four store tables and their indexes if they don't exist.
pub fn create_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Open an in-memory database with the full schema.
///
/// Ingestion bulk-loads into one of these before snapshotting to disk;
/// tests use it directly.
pub fn open_memory() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

const SCHEMA_SQL: &str = r#"
-- Catalog header (at most one row)
CREATE TABLE IF NOT EXISTS mame (
    mame_id INTEGER PRIMARY KEY AUTOINCREMENT,
    build TEXT,
    debug TEXT,
    mameconfig TEXT
);

-- Machines; machine_type is 'b' (bios), 'd' (device), or NULL (regular)
CREATE TABLE IF NOT EXISTS machine (
    machine_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    description TEXT,
    year TEXT,
    manufacturer TEXT,
    romof TEXT,
    cloneof TEXT,
    machine_type CHAR(1)
);
CREATE INDEX IF NOT EXISTS idx_machine_cloneof ON machine(cloneof);

-- Unique ROMs; identity is (name, size, crc), crc stored uppercase
CREATE TABLE IF NOT EXISTS rom (
    rom_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    size INTEGER NOT NULL,
    crc TEXT NOT NULL,
    rom_type CHAR(1),
    UNIQUE(name, size, crc)
);
CREATE INDEX IF NOT EXISTS idx_rom_crc ON rom(crc);

-- A machine's claim on a ROM
CREATE TABLE IF NOT EXISTS machine_rom (
    machine_rom_id INTEGER PRIMARY KEY AUTOINCREMENT,
    machine_id INTEGER NOT NULL REFERENCES machine(machine_id),
    rom_id INTEGER NOT NULL REFERENCES rom(rom_id),
    merge TEXT,
    UNIQUE(machine_id, rom_id)
);
CREATE INDEX IF NOT EXISTS idx_machine_rom_machine ON machine_rom(machine_id);
"#;
