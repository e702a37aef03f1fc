//! Read queries for the catalog store.
//!
//! Provides the catalog version, machine listings and lookups, CRC-set
//! matching, and summary statistics. All functions take a plain
//! `Connection`; the serialized [`Store`](crate::store::Store) handle
//! wraps them for concurrent callers.

use romset_core::MachineType;
use rusqlite::{params, Connection};
use std::collections::HashSet;

use crate::error::StoreError;

// ── Row Shapes ──────────────────────────────────────────────────────────────

const SUMMARY_COLUMNS: &str =
    "machine_id, name, description, year, manufacturer, cloneof, machine_type";

/// One machine row, trimmed to what the table renderer needs.
#[derive(Debug, Clone)]
pub struct MachineSummary {
    pub machine_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub year: Option<String>,
    pub manufacturer: Option<String>,
    pub cloneof: Option<String>,
    pub machine_type: MachineType,
}

fn row_to_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<MachineSummary> {
    let code: Option<String> = row.get(6)?;
    Ok(MachineSummary {
        machine_id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        year: row.get(3)?,
        manufacturer: row.get(4)?,
        cloneof: row.get(5)?,
        machine_type: MachineType::from_code(code.as_deref()),
    })
}

// ── Catalog Header ──────────────────────────────────────────────────────────

/// The build string of the ingested catalog.
pub fn catalog_version(conn: &Connection) -> Result<String, StoreError> {
    let result = conn.query_row("SELECT build FROM mame LIMIT 1", [], |row| {
        row.get::<_, Option<String>>(0)
    });
    match result {
        Ok(build) => Ok(build.unwrap_or_default()),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            Err(StoreError::not_found("catalog header"))
        }
        Err(e) => Err(e.into()),
    }
}

// ── Machine Lookups ─────────────────────────────────────────────────────────

/// List every machine in the store, ordered by name.
pub fn list_machines(conn: &Connection) -> Result<Vec<MachineSummary>, StoreError> {
    let sql = format!("SELECT {SUMMARY_COLUMNS} FROM machine ORDER BY name");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_summary)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Look up one machine by name.
pub fn machine_summary(
    conn: &Connection,
    name: &str,
) -> Result<Option<MachineSummary>, StoreError> {
    let sql = format!("SELECT {SUMMARY_COLUMNS} FROM machine WHERE name = ?1");
    let mut stmt = conn.prepare(&sql)?;
    match stmt.query_row(params![name], row_to_summary) {
        Ok(summary) => Ok(Some(summary)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Resolve a machine id back to its name.
pub fn machine_name(conn: &Connection, machine_id: i64) -> Result<Option<String>, StoreError> {
    let result = conn.query_row(
        "SELECT name FROM machine WHERE machine_id = ?1",
        params![machine_id],
        |row| row.get(0),
    );
    match result {
        Ok(name) => Ok(Some(name)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// List the clones of a parent machine, ordered by name.
pub fn clones_of(conn: &Connection, name: &str) -> Result<Vec<MachineSummary>, StoreError> {
    let sql = format!("SELECT {SUMMARY_COLUMNS} FROM machine WHERE cloneof = ?1 ORDER BY name");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![name], row_to_summary)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Search machines by name or description (case-insensitive LIKE).
pub fn search_machines(
    conn: &Connection,
    query: &str,
) -> Result<Vec<MachineSummary>, StoreError> {
    let pattern = format!("%{}%", query);
    let sql = format!(
        "SELECT {SUMMARY_COLUMNS} FROM machine \
         WHERE name LIKE ?1 OR description LIKE ?1 \
         ORDER BY name LIMIT 100"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![pattern], row_to_summary)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── CRC Matching ────────────────────────────────────────────────────────────

/// Find the machine whose ROM CRC set contains every given CRC, with the
/// match count exactly equal to the number of distinct CRCs provided.
///
/// Comparison is case-insensitive: CRCs are stored uppercase and the input
/// is uppercased (and deduplicated) before matching. Ties return the
/// lowest machine id; no match returns `None`.
pub fn find_machine_by_crcs<S: AsRef<str>>(
    conn: &Connection,
    crcs: &[S],
) -> Result<Option<i64>, StoreError> {
    let mut unique: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for crc in crcs {
        let upper = crc.as_ref().to_uppercase();
        if seen.insert(upper.clone()) {
            unique.push(upper);
        }
    }
    if unique.is_empty() {
        return Ok(None);
    }

    let placeholders = (1..=unique.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT mr.machine_id \
         FROM machine_rom mr \
         JOIN rom r ON r.rom_id = mr.rom_id \
         WHERE r.crc IN ({placeholders}) \
         GROUP BY mr.machine_id \
         HAVING COUNT(DISTINCT r.crc) = {count} \
         ORDER BY mr.machine_id \
         LIMIT 1",
        count = unique.len()
    );
    let mut stmt = conn.prepare(&sql)?;
    match stmt.query_row(rusqlite::params_from_iter(unique.iter()), |row| row.get(0)) {
        Ok(machine_id) => Ok(Some(machine_id)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Summary statistics for the store.
#[derive(Debug)]
pub struct CatalogStats {
    pub machines: i64,
    pub bios_machines: i64,
    pub device_machines: i64,
    pub roms: i64,
    pub edges: i64,
}

pub fn catalog_stats(conn: &Connection) -> Result<CatalogStats, StoreError> {
    let machines: i64 = conn.query_row("SELECT COUNT(*) FROM machine", [], |r| r.get(0))?;
    let bios_machines: i64 = conn.query_row(
        "SELECT COUNT(*) FROM machine WHERE machine_type = 'b'",
        [],
        |r| r.get(0),
    )?;
    let device_machines: i64 = conn.query_row(
        "SELECT COUNT(*) FROM machine WHERE machine_type = 'd'",
        [],
        |r| r.get(0),
    )?;
    let roms: i64 = conn.query_row("SELECT COUNT(*) FROM rom", [], |r| r.get(0))?;
    let edges: i64 = conn.query_row("SELECT COUNT(*) FROM machine_rom", [], |r| r.get(0))?;

    Ok(CatalogStats {
        machines,
        bios_machines,
        device_machines,
        roms,
        edges,
    })
}
