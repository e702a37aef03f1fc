//! Parsed-document model for a `-listxml` catalog.

/// Attributes of the `<mame>` root element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogHeader {
    pub build: Option<String>,
    pub debug: Option<String>,
    pub mameconfig: Option<String>,
}

/// One `<rom>` entry. `crc` is canonicalized to uppercase at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomEntry {
    pub name: String,
    pub size: u64,
    pub crc: String,
    /// Parent ROM name this entry replaces.
    pub merge: Option<String>,
    /// BIOS selector this entry belongs to.
    pub bios: Option<String>,
}

/// One `<machine>` element with the attributes and children the store
/// persists.
#[derive(Debug, Clone, Default)]
pub struct MachineRecord {
    pub name: String,
    pub cloneof: Option<String>,
    pub romof: Option<String>,
    pub is_bios: bool,
    pub is_device: bool,
    pub description: Option<String>,
    pub year: Option<String>,
    pub manufacturer: Option<String>,
    pub roms: Vec<RomEntry>,
    pub device_refs: Vec<String>,
}

/// A fully parsed catalog document.
#[derive(Debug, Clone, Default)]
pub struct ListXml {
    pub header: Option<CatalogHeader>,
    pub machines: Vec<MachineRecord>,
}
