//! Dossier loading: one target machine plus everything reachable from it.
//!
//! Two queries populate a dossier. The first resolves the target, its
//! parent, and the ids of its clones and siblings. The second fetches
//! every ROM edge for that id family; the loader groups the edges by ROM,
//! assigns provenance, and resolves replacement back-edges.

use std::collections::{HashMap, HashSet};

use romset_core::{Dossier, DossierRom, Machine, MachineType, Rom, RomKind, RomSource, RomType};
use rusqlite::{params, Connection};

use crate::error::StoreError;

const FAMILY_SQL: &str = "\
    SELECT m.machine_id, m.name, m.description, m.year, m.manufacturer, \
           m.romof, m.cloneof, m.machine_type, \
           p.machine_id, p.name, p.description, p.year, p.manufacturer, \
           p.romof, p.cloneof, p.machine_type, \
           (SELECT group_concat(c.machine_id) FROM machine c WHERE c.cloneof = ?1) AS clone_ids, \
           (SELECT group_concat(s.machine_id) FROM machine s \
             WHERE m.cloneof IS NOT NULL AND s.cloneof = m.cloneof AND s.name <> ?1) AS sibling_ids \
    FROM machine m \
    LEFT JOIN machine p ON p.name = m.cloneof \
    WHERE m.name = ?1";

/// Load the dossier for a machine name.
///
/// Returns `StoreError::NotFound` when the name resolves to no row.
pub fn load_dossier(conn: &Connection, name: &str) -> Result<Dossier, StoreError> {
    let (machine, parent, family_ids) = fetch_family(conn, name)?;
    let mut roms = fetch_roms(conn, &machine, parent.as_ref(), &family_ids)?;
    link_replacements(&mut roms);
    log::debug!(
        "dossier for {}: {} roms across {} machines",
        machine.name,
        roms.len(),
        family_ids.len()
    );
    Ok(Dossier {
        machine,
        parent,
        roms,
    })
}

/// Query 1: the target row, its parent row, and the clone/sibling id lists.
fn fetch_family(
    conn: &Connection,
    name: &str,
) -> Result<(Machine, Option<Machine>, Vec<i64>), StoreError> {
    let mut stmt = conn.prepare(FAMILY_SQL)?;
    let result = stmt.query_row(params![name], |row| {
        let machine = machine_at(row, 0)?;
        let parent_id: Option<i64> = row.get(8)?;
        let parent = match parent_id {
            Some(_) => Some(machine_at(row, 8)?),
            None => None,
        };
        let clone_ids: Option<String> = row.get(16)?;
        let sibling_ids: Option<String> = row.get(17)?;
        Ok((machine, parent, clone_ids, sibling_ids))
    });
    let (machine, parent, clone_ids, sibling_ids) = match result {
        Ok(family) => family,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Err(StoreError::not_found(format!("machine '{name}'")));
        }
        Err(e) => return Err(e.into()),
    };

    let mut ids: Vec<i64> = vec![machine.machine_id];
    if let Some(ref parent) = parent {
        ids.push(parent.machine_id);
    }
    ids.extend(parse_id_list(clone_ids.as_deref()));
    ids.extend(parse_id_list(sibling_ids.as_deref()));
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(*id));

    Ok((machine, parent, ids))
}

/// Query 2: every ROM edge for the family, grouped so each ROM appears
/// once. Rows are ordered target-first, then parent, then the rest in
/// machine order, and the first edge per ROM wins the attribution.
fn fetch_roms(
    conn: &Connection,
    machine: &Machine,
    parent: Option<&Machine>,
    family_ids: &[i64],
) -> Result<Vec<DossierRom>, StoreError> {
    let placeholders = (1..=family_ids.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let target_id = machine.machine_id;
    let parent_id = parent.map(|p| p.machine_id).unwrap_or(-1);
    let sql = format!(
        "SELECT mr.machine_id, m.name, mr.merge, r.rom_id, r.name, r.size, r.crc, r.rom_type \
         FROM machine_rom mr \
         JOIN rom r ON r.rom_id = mr.rom_id \
         JOIN machine m ON m.machine_id = mr.machine_id \
         WHERE mr.machine_id IN ({placeholders}) \
         ORDER BY CASE mr.machine_id WHEN {target_id} THEN 0 WHEN {parent_id} THEN 1 ELSE 2 END, \
                  mr.machine_id, mr.machine_rom_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(family_ids.iter()), |row| {
        let rom_type: Option<String> = row.get(7)?;
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            Rom {
                rom_id: row.get(3)?,
                name: row.get(4)?,
                size: row.get(5)?,
                crc: row.get(6)?,
                rom_type: RomType::from_code(rom_type.as_deref()),
            },
        ))
    })?;

    let mut seen_roms = HashSet::new();
    let mut out = Vec::new();
    for row in rows {
        let (owner_id, owner_name, merge, rom) = row?;
        if !seen_roms.insert(rom.rom_id) {
            continue;
        }
        let source = rom_source(&rom, owner_id, target_id, parent_id);
        let kind = rom_kind(&rom, owner_id, machine, parent);
        out.push(DossierRom {
            rom,
            source,
            machine_id: owner_id,
            machine_name: owner_name,
            kind,
            replaces: merge,
            replaced_by: Vec::new(),
        });
    }
    Ok(out)
}

fn rom_source(rom: &Rom, owner_id: i64, target_id: i64, parent_id: i64) -> RomSource {
    match rom.rom_type {
        RomType::Bios => RomSource::Bios,
        RomType::Device => RomSource::Device,
        RomType::Regular => {
            if owner_id == target_id {
                RomSource::Machine
            } else if owner_id == parent_id {
                RomSource::Parent
            } else {
                RomSource::Clone
            }
        }
    }
}

fn rom_kind(rom: &Rom, owner_id: i64, machine: &Machine, parent: Option<&Machine>) -> RomKind {
    match rom.rom_type {
        RomType::Bios => RomKind::BiosRom,
        RomType::Device => RomKind::DeviceRom,
        RomType::Regular => {
            if owner_id == machine.machine_id {
                if machine.is_clone() {
                    RomKind::CloneRom
                } else {
                    RomKind::GameRom
                }
            } else if parent.is_some_and(|p| p.machine_id == owner_id) {
                RomKind::GameRom
            } else {
                RomKind::CloneRom
            }
        }
    }
}

/// Resolve `replaced_by` back-edges from the forward `replaces` pointers.
/// One pass builds a name-to-index map (last writer wins); a second pass
/// appends each replacing ROM's name to its target row.
fn link_replacements(roms: &mut [DossierRom]) {
    let mut index_by_name: HashMap<String, usize> = HashMap::new();
    for (i, row) in roms.iter().enumerate() {
        index_by_name.insert(row.rom.name.clone(), i);
    }
    for i in 0..roms.len() {
        let Some(target_name) = roms[i].replaces.clone() else {
            continue;
        };
        if let Some(&j) = index_by_name.get(&target_name) {
            let replacer = roms[i].rom.name.clone();
            roms[j].replaced_by.push(replacer);
        }
    }
}

fn machine_at(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<Machine> {
    let code: Option<String> = row.get(base + 7)?;
    Ok(Machine {
        machine_id: row.get(base)?,
        name: row.get(base + 1)?,
        description: row.get(base + 2)?,
        year: row.get(base + 3)?,
        manufacturer: row.get(base + 4)?,
        romof: row.get(base + 5)?,
        cloneof: row.get(base + 6)?,
        machine_type: MachineType::from_code(code.as_deref()),
    })
}

fn parse_id_list(joined: Option<&str>) -> Vec<i64> {
    joined
        .unwrap_or("")
        .split(',')
        .filter_map(|id| id.trim().parse().ok())
        .collect()
}
