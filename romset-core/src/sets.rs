//! ROM-set derivation.
//!
//! A set view is a pure function of a dossier: scan the dossier rows in
//! order, keep the rows the view's sources admit, and dedup where the view
//! calls for it. Nothing here touches the store.

use std::collections::HashSet;

use crate::types::{Dossier, DossierRom, RomSource, SetKind};

/// Derive one of the seven canonical set views from a dossier.
///
/// Result order follows the dossier traversal order within each scan;
/// appended scans (the `plus`/`full` variants) follow in definition order.
pub fn derive_set(dossier: &Dossier, kind: SetKind) -> Vec<DossierRom> {
    match kind {
        SetKind::Split => split(dossier),
        SetKind::Merged => deduped(
            dossier,
            &[RomSource::Machine, RomSource::Parent, RomSource::Clone],
            false,
        ),
        SetKind::MergedPlus => deduped(
            dossier,
            &[
                RomSource::Machine,
                RomSource::Parent,
                RomSource::Clone,
                RomSource::Device,
            ],
            false,
        ),
        SetKind::MergedFull => deduped(
            dossier,
            &[
                RomSource::Machine,
                RomSource::Parent,
                RomSource::Clone,
                RomSource::Device,
                RomSource::Bios,
            ],
            false,
        ),
        SetKind::NonMerged => non_merged(dossier),
        SetKind::NonMergedPlus => {
            let mut out = non_merged(dossier);
            out.extend(deduped(dossier, &[RomSource::Device], false));
            out
        }
        SetKind::NonMergedFull => {
            let mut out = non_merged(dossier);
            out.extend(deduped(dossier, &[RomSource::Device], false));
            out.extend(deduped(dossier, &[RomSource::Bios], false));
            out
        }
    }
}

/// The target's own ROMs, minus any that share a name with a parent ROM
/// when the target is a clone. No dedup.
fn split(dossier: &Dossier) -> Vec<DossierRom> {
    let direct = dossier
        .roms
        .iter()
        .filter(|row| row.source == RomSource::Machine);

    if dossier.is_clone() {
        let parent_names: HashSet<&str> = dossier
            .roms
            .iter()
            .filter(|row| row.source == RomSource::Parent)
            .map(|row| row.rom.name.as_str())
            .collect();
        direct
            .filter(|row| !parent_names.contains(row.rom.name.as_str()))
            .cloned()
            .collect()
    } else {
        direct.cloned().collect()
    }
}

/// The target's own ROMs plus, for a clone, the parent ROMs the clone
/// neither declares as replaced nor shadows through a back-edge.
fn non_merged(dossier: &Dossier) -> Vec<DossierRom> {
    let mut out: Vec<DossierRom> = dossier
        .roms
        .iter()
        .filter(|row| row.source == RomSource::Machine)
        .cloned()
        .collect();

    if dossier.is_clone() {
        let replaced_names: HashSet<&str> = dossier
            .roms
            .iter()
            .filter(|row| row.source == RomSource::Machine)
            .filter_map(|row| row.replaces.as_deref())
            .collect();
        for row in dossier
            .roms
            .iter()
            .filter(|row| row.source == RomSource::Parent)
        {
            if !replaced_names.contains(row.rom.name.as_str()) && row.replaced_by.is_empty() {
                out.push(row.clone());
            }
        }
    }

    out
}

/// Scan the dossier in order, keep rows whose source is admitted, skip
/// replaced rows unless asked not to, and emit each distinct (name, crc)
/// at most once in first-seen order.
fn deduped(dossier: &Dossier, sources: &[RomSource], include_replaced: bool) -> Vec<DossierRom> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut out = Vec::new();
    for row in &dossier.roms {
        if !sources.contains(&row.source) {
            continue;
        }
        if !include_replaced && !row.replaced_by.is_empty() {
            continue;
        }
        if seen.insert((row.rom.name.as_str(), row.rom.crc.as_str())) {
            out.push(row.clone());
        }
    }
    out
}
