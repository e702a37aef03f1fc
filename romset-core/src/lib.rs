//! Core domain types for the MAME machine catalog.
//!
//! Defines the machine/ROM entities shared across the parser, store, and
//! query crates, the per-query dossier structures, and the pure set-view
//! derivation over a dossier.

pub mod sets;
pub mod types;

pub use sets::derive_set;
pub use types::{
    Dossier, DossierRom, Machine, MachineRom, MachineType, Rom, RomKind, RomSource, RomType,
    SetKind, SetKindParseError,
};
