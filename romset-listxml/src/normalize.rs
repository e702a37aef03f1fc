//! Machine classification and ROM deduplication.

use std::collections::{HashMap, HashSet};

use romset_core::{MachineType, RomType};

use crate::model::{MachineRecord, RomEntry};

/// Classify a machine record: BIOS wins over device, everything else is a
/// regular machine.
pub fn machine_type(machine: &MachineRecord) -> MachineType {
    if machine.is_bios {
        MachineType::Bios
    } else if machine.is_device {
        MachineType::Device
    } else {
        MachineType::Regular
    }
}

/// One unique ROM after deduplication, with its assigned surrogate id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRom {
    pub rom_id: i64,
    pub name: String,
    pub size: u64,
    pub crc: String,
    pub rom_type: RomType,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RomKey {
    name: String,
    size: u64,
    crc: String,
}

impl RomKey {
    fn of(rom: &RomEntry) -> Self {
        RomKey {
            name: rom.name.clone(),
            size: rom.size,
            crc: rom.crc.clone(),
        }
    }
}

/// The deduplicated ROM table for a catalog.
///
/// Identity is the triple (name, size, crc); each unique ROM gets a dense
/// `rom_id` in first-sight order. The `merge` attribute never participates
/// in identity, so two entries differing only in `merge` collapse to one
/// ROM.
#[derive(Debug, Default)]
pub struct RomTable {
    roms: Vec<NormalizedRom>,
    index: HashMap<RomKey, i64>,
}

impl RomTable {
    /// Build the table from every machine in the catalog.
    ///
    /// ROM type assignment: `bios` if the name is referenced by any BIOS
    /// machine or any entry carries a non-empty `bios` attribute, else
    /// `device` if referenced by any device machine, else regular.
    pub fn build(machines: &[MachineRecord]) -> RomTable {
        let mut bios_names: HashSet<&str> = HashSet::new();
        let mut device_names: HashSet<&str> = HashSet::new();

        for machine in machines {
            let kind = machine_type(machine);
            for rom in &machine.roms {
                match kind {
                    MachineType::Bios => {
                        bios_names.insert(rom.name.as_str());
                    }
                    MachineType::Device => {
                        device_names.insert(rom.name.as_str());
                    }
                    MachineType::Regular => {}
                }
                if rom.bios.as_deref().is_some_and(|b| !b.is_empty()) {
                    bios_names.insert(rom.name.as_str());
                }
            }
        }

        let mut table = RomTable::default();
        for machine in machines {
            for rom in &machine.roms {
                let key = RomKey::of(rom);
                if table.index.contains_key(&key) {
                    continue;
                }
                let rom_id = table.roms.len() as i64 + 1;
                let rom_type = if bios_names.contains(rom.name.as_str()) {
                    RomType::Bios
                } else if device_names.contains(rom.name.as_str()) {
                    RomType::Device
                } else {
                    RomType::Regular
                };
                table.roms.push(NormalizedRom {
                    rom_id,
                    name: rom.name.clone(),
                    size: rom.size,
                    crc: rom.crc.clone(),
                    rom_type,
                });
                table.index.insert(key, rom_id);
            }
        }
        log::debug!("deduplicated to {} unique roms", table.roms.len());
        table
    }

    /// All unique ROMs in id order.
    pub fn roms(&self) -> &[NormalizedRom] {
        &self.roms
    }

    /// Look up the surrogate id assigned to an identity triple.
    pub fn rom_id(&self, name: &str, size: u64, crc: &str) -> Option<i64> {
        self.index
            .get(&RomKey {
                name: name.to_string(),
                size,
                crc: crc.to_string(),
            })
            .copied()
    }

    pub fn len(&self) -> usize {
        self.roms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom(name: &str, size: u64, crc: &str) -> RomEntry {
        RomEntry {
            name: name.to_string(),
            size,
            crc: crc.to_string(),
            merge: None,
            bios: None,
        }
    }

    fn machine(name: &str, roms: Vec<RomEntry>) -> MachineRecord {
        MachineRecord {
            name: name.to_string(),
            roms,
            ..Default::default()
        }
    }

    #[test]
    fn test_machine_type_classification() {
        let mut m = machine("m", vec![]);
        assert_eq!(machine_type(&m), MachineType::Regular);
        m.is_device = true;
        assert_eq!(machine_type(&m), MachineType::Device);
        m.is_bios = true;
        assert_eq!(machine_type(&m), MachineType::Bios);
    }

    #[test]
    fn test_dedup_by_identity_triple() {
        let machines = vec![
            machine("m1", vec![rom("a", 16, "AAAA"), rom("b", 16, "BBBB")]),
            machine("m2", vec![rom("a", 16, "AAAA"), rom("a", 32, "AAAA")]),
        ];
        let table = RomTable::build(&machines);
        assert_eq!(table.len(), 3);
        assert_eq!(table.rom_id("a", 16, "AAAA"), Some(1));
        assert_eq!(table.rom_id("b", 16, "BBBB"), Some(2));
        assert_eq!(table.rom_id("a", 32, "AAAA"), Some(3));
        assert_eq!(table.rom_id("a", 16, "FFFF"), None);
    }

    #[test]
    fn test_merge_attribute_does_not_split_identity() {
        let mut with_merge = rom("a", 16, "AAAA");
        with_merge.merge = Some("parent_a".to_string());
        let machines = vec![
            machine("m1", vec![rom("a", 16, "AAAA")]),
            machine("m2", vec![with_merge]),
        ];
        let table = RomTable::build(&machines);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_rom_type_from_bios_machine() {
        let mut bios_machine = machine("neogeo", vec![rom("neo-bios", 128, "CAFE")]);
        bios_machine.is_bios = true;
        let machines = vec![
            bios_machine,
            machine("mslug", vec![rom("mslug.p1", 512, "1234")]),
        ];
        let table = RomTable::build(&machines);
        assert_eq!(table.roms()[0].rom_type, RomType::Bios);
        assert_eq!(table.roms()[1].rom_type, RomType::Regular);
    }

    #[test]
    fn test_rom_type_from_bios_attribute() {
        let mut flagged = rom("sys.bin", 64, "FEED");
        flagged.bios = Some("euro".to_string());
        let machines = vec![machine("m", vec![flagged])];
        let table = RomTable::build(&machines);
        assert_eq!(table.roms()[0].rom_type, RomType::Bios);
    }

    #[test]
    fn test_empty_bios_attribute_is_ignored() {
        let mut flagged = rom("sys.bin", 64, "FEED");
        flagged.bios = Some(String::new());
        let machines = vec![machine("m", vec![flagged])];
        let table = RomTable::build(&machines);
        assert_eq!(table.roms()[0].rom_type, RomType::Regular);
    }

    #[test]
    fn test_bios_takes_precedence_over_device() {
        // The same name referenced by both a BIOS and a device machine.
        let mut bios_machine = machine("b", vec![rom("shared", 8, "0001")]);
        bios_machine.is_bios = true;
        let mut device_machine = machine("d", vec![rom("shared", 8, "0001")]);
        device_machine.is_device = true;
        let table = RomTable::build(&[device_machine, bios_machine]);
        assert_eq!(table.roms()[0].rom_type, RomType::Bios);
    }

    #[test]
    fn test_device_rom_type() {
        let mut device_machine = machine("d", vec![rom("dev.bin", 8, "0002")]);
        device_machine.is_device = true;
        let table = RomTable::build(&[device_machine]);
        assert_eq!(table.roms()[0].rom_type, RomType::Device);
    }
}
