//! Streaming parser and normalizer for MAME `-listxml` catalogs.
//!
//! Turns the catalog XML into machine records, resolves the transitive
//! device closure per machine, and dedupes ROMs by identity so the store
//! writer can bulk-load a relational representation.

pub mod devices;
pub mod error;
pub mod model;
pub mod normalize;
pub mod reader;

pub use devices::DeviceResolver;
pub use error::ListXmlError;
pub use model::{CatalogHeader, ListXml, MachineRecord, RomEntry};
pub use normalize::{machine_type, NormalizedRom, RomTable};
pub use reader::{parse_listxml, parse_listxml_file};
