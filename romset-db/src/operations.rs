//! Bulk insert operations for the store writer.
//!
//! Each phase runs in a single transaction: header, then machines, then
//! ROMs, then machine-ROM edges. Surrogate ids are assigned by the caller
//! and inserted explicitly so the edge phase can reference them.

use romset_core::{Machine, MachineRom, Rom};
use rusqlite::{params, Connection};

use crate::error::StoreError;

/// Insert the catalog header row.
pub fn insert_header(
    conn: &Connection,
    build: Option<&str>,
    debug: Option<&str>,
    mameconfig: Option<&str>,
) -> Result<(), StoreError> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO mame (build, debug, mameconfig) VALUES (?1, ?2, ?3)",
        params![build, debug, mameconfig],
    )?;
    tx.commit()?;
    Ok(())
}

/// Insert all machines in one transaction.
pub fn insert_machines(conn: &Connection, machines: &[Machine]) -> Result<(), StoreError> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO machine (machine_id, name, description, year, manufacturer, romof, cloneof, machine_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for machine in machines {
            stmt.execute(params![
                machine.machine_id,
                machine.name,
                machine.description,
                machine.year,
                machine.manufacturer,
                machine.romof,
                machine.cloneof,
                machine.machine_type.as_code(),
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// Insert all unique ROMs in one transaction.
pub fn insert_roms(conn: &Connection, roms: &[Rom]) -> Result<(), StoreError> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO rom (rom_id, name, size, crc, rom_type) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for rom in roms {
            stmt.execute(params![
                rom.rom_id,
                rom.name,
                rom.size,
                rom.crc,
                rom.rom_type.as_code(),
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// Insert machine-ROM edges in one transaction. Returns the number of
/// edges actually inserted.
///
/// `INSERT OR IGNORE` absorbs duplicate (machine, rom) pairs: when a
/// direct ROM and a device-induced ROM coincide, the edge inserted first
/// wins and keeps its `merge` value.
pub fn insert_edges(conn: &Connection, edges: &[MachineRom]) -> Result<u64, StoreError> {
    let tx = conn.unchecked_transaction()?;
    let mut inserted: u64 = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO machine_rom (machine_id, rom_id, merge) VALUES (?1, ?2, ?3)",
        )?;
        for edge in edges {
            inserted += stmt.execute(params![edge.machine_id, edge.rom_id, edge.merge])? as u64;
        }
    }
    tx.commit()?;
    Ok(inserted)
}
