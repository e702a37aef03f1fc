//! Ingest a parsed catalog into a store file.
//!
//! The load runs against an in-memory database in four transactional
//! phases (header, machines, ROMs, edges), then snapshots the result onto
//! the target path with SQLite's backup facility. Machine ids are assigned
//! in insert order, and every machine's edges cover its direct ROMs plus
//! the ROMs of its transitive device closure.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use romset_core::{Machine, MachineRom, Rom};
use romset_db::store::{close_store, open_store, Store};
use romset_db::{operations, schema, StoreError};
use romset_listxml::{
    machine_type, parse_listxml_file, DeviceResolver, ListXml, ListXmlError, MachineRecord,
    RomTable,
};
use rusqlite::backup::Backup;
use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("catalog parse failed: {0}")]
    Parse(#[from] ListXmlError),

    #[error("store write failed: {0}")]
    Write(#[from] rusqlite::Error),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("output already exists: {0}")]
    AlreadyExists(PathBuf),
}

/// Counters from a single ingestion.
#[derive(Debug, Default)]
pub struct IngestStats {
    pub machines: u64,
    pub machines_skipped: u64,
    pub roms: u64,
    pub edges: u64,
    /// Duplicate (machine, rom) pairs absorbed by the edge phase.
    pub edges_absorbed: u64,
}

/// Ingest the catalog XML at `xml_path` into a store file at `out_path`
/// and return an open handle to it.
///
/// Fails with `AlreadyExists` when `out_path` exists and `overwrite` is
/// false. A parse failure aborts before anything is written to disk.
pub fn ingest(xml_path: &Path, out_path: &Path, overwrite: bool) -> Result<Arc<Store>, IngestError> {
    if out_path.exists() && !overwrite {
        return Err(IngestError::AlreadyExists(out_path.to_path_buf()));
    }
    log::info!(
        "ingesting {} into {}",
        xml_path.display(),
        out_path.display()
    );
    let doc = parse_listxml_file(xml_path)?;
    let (store, stats) = ingest_document(&doc, out_path)?;
    log::info!(
        "ingested {} machines ({} skipped), {} roms, {} edges ({} absorbed)",
        stats.machines,
        stats.machines_skipped,
        stats.roms,
        stats.edges,
        stats.edges_absorbed,
    );
    Ok(store)
}

/// Load an already-parsed catalog into a store file, replacing any prior
/// content at `out_path`.
pub fn ingest_document(
    doc: &ListXml,
    out_path: &Path,
) -> Result<(Arc<Store>, IngestStats), IngestError> {
    let conn = schema::open_memory()?;
    let stats = load_catalog(&conn, doc)?;

    // The file at out_path is about to be replaced; a cached handle for
    // it would keep serving the old content.
    close_store(out_path);
    snapshot(&conn, out_path)?;

    let store = open_store(out_path)?;
    Ok((store, stats))
}

/// Bulk-load the catalog into `conn` in the four insert phases.
fn load_catalog(conn: &Connection, doc: &ListXml) -> Result<IngestStats, IngestError> {
    let mut stats = IngestStats::default();

    if let Some(header) = &doc.header {
        operations::insert_header(
            conn,
            header.build.as_deref(),
            header.debug.as_deref(),
            header.mameconfig.as_deref(),
        )?;
    }

    // Names referenced as a device by any machine.
    let mut referenced: HashSet<&str> = HashSet::new();
    for machine in &doc.machines {
        for dep in &machine.device_refs {
            referenced.insert(dep.as_str());
        }
    }

    // Phase: machines. Insert order assigns machine_id.
    let mut machine_rows: Vec<Machine> = Vec::new();
    let mut kept: Vec<&MachineRecord> = Vec::new();
    let mut id_by_name: HashMap<&str, i64> = HashMap::new();
    for machine in &doc.machines {
        if machine.roms.is_empty() && !referenced.contains(machine.name.as_str()) {
            log::debug!(
                "skipping {}: no roms and never referenced as a device",
                machine.name
            );
            stats.machines_skipped += 1;
            continue;
        }
        if id_by_name.contains_key(machine.name.as_str()) {
            log::warn!("duplicate machine name {}, keeping the first", machine.name);
            continue;
        }
        let machine_id = machine_rows.len() as i64 + 1;
        machine_rows.push(Machine {
            machine_id,
            name: machine.name.clone(),
            description: machine.description.clone(),
            year: machine.year.clone(),
            manufacturer: machine.manufacturer.clone(),
            romof: machine.romof.clone(),
            cloneof: machine.cloneof.clone(),
            machine_type: machine_type(machine),
        });
        id_by_name.insert(machine.name.as_str(), machine_id);
        kept.push(machine);
    }
    operations::insert_machines(conn, &machine_rows)?;
    stats.machines = machine_rows.len() as u64;

    // Phase: unique ROMs.
    let table = RomTable::build(&doc.machines);
    let rom_rows: Vec<Rom> = table
        .roms()
        .iter()
        .map(|rom| Rom {
            rom_id: rom.rom_id,
            name: rom.name.clone(),
            size: rom.size as i64,
            crc: rom.crc.clone(),
            rom_type: rom.rom_type,
        })
        .collect();
    operations::insert_roms(conn, &rom_rows)?;
    stats.roms = rom_rows.len() as u64;

    // Phase: edges. Direct edges first so a coinciding device-induced
    // edge is absorbed and the direct merge value survives.
    let mut resolver = DeviceResolver::new(&doc.machines);
    let record_by_name: HashMap<&str, &MachineRecord> = doc
        .machines
        .iter()
        .map(|machine| (machine.name.as_str(), machine))
        .collect();
    let mut edges: Vec<MachineRom> = Vec::new();
    for machine in kept {
        let machine_id = id_by_name[machine.name.as_str()];
        for rom in &machine.roms {
            let Some(rom_id) = table.rom_id(&rom.name, rom.size, &rom.crc) else {
                continue;
            };
            edges.push(MachineRom {
                machine_id,
                rom_id,
                merge: rom.merge.clone(),
            });
        }
        for dep in resolver.closure(&machine.name) {
            let Some(provider) = record_by_name.get(dep.as_str()) else {
                continue;
            };
            for rom in &provider.roms {
                let Some(rom_id) = table.rom_id(&rom.name, rom.size, &rom.crc) else {
                    continue;
                };
                edges.push(MachineRom {
                    machine_id,
                    rom_id,
                    merge: None,
                });
            }
        }
    }
    stats.edges = operations::insert_edges(conn, &edges)?;
    stats.edges_absorbed = edges.len() as u64 - stats.edges;

    Ok(stats)
}

/// Snapshot the in-memory database onto the target file.
fn snapshot(src: &Connection, out_path: &Path) -> Result<(), IngestError> {
    let mut dst = Connection::open(out_path)?;
    let backup = Backup::new(src, &mut dst)?;
    backup.run_to_completion(64, Duration::from_millis(25), None)?;
    Ok(())
}
