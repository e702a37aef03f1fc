//! Entity types shared across the workspace.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Classification of a catalog machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineType {
    /// A runnable arcade system.
    #[default]
    Regular,
    /// A BIOS provider (`isbios="yes"`).
    Bios,
    /// A device provider (`isdevice="yes"`).
    Device,
}

impl MachineType {
    /// Single-character code stored in the `machine_type` column.
    /// Regular machines are stored as NULL.
    pub fn as_code(&self) -> Option<&'static str> {
        match self {
            MachineType::Regular => None,
            MachineType::Bios => Some("b"),
            MachineType::Device => Some("d"),
        }
    }

    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("b") => MachineType::Bios,
            Some("d") => MachineType::Device,
            _ => MachineType::Regular,
        }
    }
}

/// Provenance category of a ROM, assigned at normalization time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RomType {
    #[default]
    Regular,
    /// Referenced by a BIOS machine, or carries a `bios` attribute.
    Bios,
    /// Referenced by a device machine.
    Device,
}

impl RomType {
    /// Single-character code stored in the `rom_type` column.
    /// Regular ROMs are stored as NULL.
    pub fn as_code(&self) -> Option<&'static str> {
        match self {
            RomType::Regular => None,
            RomType::Bios => Some("b"),
            RomType::Device => Some("d"),
        }
    }

    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("b") => RomType::Bios,
            Some("d") => RomType::Device,
            _ => RomType::Regular,
        }
    }
}

/// One machine row from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub machine_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub year: Option<String>,
    pub manufacturer: Option<String>,
    /// Parent machine for ROM inheritance.
    pub romof: Option<String>,
    /// Parent machine name when this machine is a clone.
    pub cloneof: Option<String>,
    pub machine_type: MachineType,
}

impl Machine {
    pub fn is_clone(&self) -> bool {
        self.cloneof.is_some()
    }
}

/// One ROM row from the store. Identity is the triple (name, size, crc);
/// the crc is stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rom {
    pub rom_id: i64,
    pub name: String,
    pub size: i64,
    pub crc: String,
    pub rom_type: RomType,
}

/// A machine's claim on a ROM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineRom {
    pub machine_id: i64,
    pub rom_id: i64,
    /// Name of the parent ROM this entry replaces, if any.
    pub merge: Option<String>,
}

/// Which machine in the dossier a ROM row was credited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RomSource {
    /// The target machine itself.
    Machine,
    /// The target's parent.
    Parent,
    /// A clone or sibling of the target.
    Clone,
    Device,
    Bios,
}

/// Renderer-facing tag for a dossier ROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RomKind {
    GameRom,
    CloneRom,
    BiosRom,
    DeviceRom,
}

/// A ROM inside a dossier, annotated with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DossierRom {
    pub rom: Rom,
    pub source: RomSource,
    /// Machine this row was attributed to.
    pub machine_id: i64,
    pub machine_name: String,
    pub kind: RomKind,
    /// Parent ROM name this row replaces (`merge` on the edge).
    pub replaces: Option<String>,
    /// Names of dossier ROMs that replace this one. Derived, never stored.
    pub replaced_by: Vec<String>,
}

/// Per-query snapshot of one target machine and everything reachable from
/// it: the machine, its parent, and the ROMs of the machine, parent,
/// clones/siblings, transitive devices, and reachable BIOS artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dossier {
    pub machine: Machine,
    pub parent: Option<Machine>,
    pub roms: Vec<DossierRom>,
}

impl Dossier {
    pub fn is_clone(&self) -> bool {
        self.machine.is_clone()
    }
}

/// The seven canonical ROM-set views over a dossier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetKind {
    Split,
    Merged,
    MergedPlus,
    MergedFull,
    NonMerged,
    NonMergedPlus,
    NonMergedFull,
}

impl SetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetKind::Split => "split",
            SetKind::Merged => "merged",
            SetKind::MergedPlus => "mergedplus",
            SetKind::MergedFull => "mergedfull",
            SetKind::NonMerged => "nonmerged",
            SetKind::NonMergedPlus => "nonmergedplus",
            SetKind::NonMergedFull => "nonmergedfull",
        }
    }

    pub fn all() -> &'static [SetKind] {
        &[
            SetKind::Split,
            SetKind::Merged,
            SetKind::MergedPlus,
            SetKind::MergedFull,
            SetKind::NonMerged,
            SetKind::NonMergedPlus,
            SetKind::NonMergedFull,
        ]
    }
}

impl fmt::Display for SetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown set kind: {0}")]
pub struct SetKindParseError(pub String);

impl FromStr for SetKind {
    type Err = SetKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "split" => Ok(SetKind::Split),
            "merged" => Ok(SetKind::Merged),
            "mergedplus" => Ok(SetKind::MergedPlus),
            "mergedfull" => Ok(SetKind::MergedFull),
            "nonmerged" => Ok(SetKind::NonMerged),
            "nonmergedplus" => Ok(SetKind::NonMergedPlus),
            "nonmergedfull" => Ok(SetKind::NonMergedFull),
            _ => Err(SetKindParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_kind_round_trip() {
        for kind in SetKind::all() {
            assert_eq!(kind.as_str().parse::<SetKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_set_kind_parse_is_case_insensitive() {
        assert_eq!("MergedFull".parse::<SetKind>().unwrap(), SetKind::MergedFull);
    }

    #[test]
    fn test_set_kind_parse_rejects_unknown() {
        assert!("demerged".parse::<SetKind>().is_err());
    }

    #[test]
    fn test_machine_type_codes() {
        assert_eq!(MachineType::Regular.as_code(), None);
        assert_eq!(MachineType::Bios.as_code(), Some("b"));
        assert_eq!(MachineType::Device.as_code(), Some("d"));
        assert_eq!(MachineType::from_code(Some("b")), MachineType::Bios);
        assert_eq!(MachineType::from_code(Some("d")), MachineType::Device);
        assert_eq!(MachineType::from_code(None), MachineType::Regular);
        assert_eq!(MachineType::from_code(Some("x")), MachineType::Regular);
    }

    #[test]
    fn test_rom_type_codes() {
        assert_eq!(RomType::Bios.as_code(), Some("b"));
        assert_eq!(RomType::from_code(Some("d")), RomType::Device);
        assert_eq!(RomType::from_code(None), RomType::Regular);
    }
}
