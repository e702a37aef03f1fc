//! SQLite persistence layer for the machine catalog.
//!
//! Provides schema creation, bulk insert operations for the ingestion
//! pipeline, read queries, dossier loading, and the serialized store
//! handle with its process-wide per-path cache.

pub mod dossier;
pub mod error;
pub mod operations;
pub mod queries;
pub mod schema;
pub mod store;

pub use dossier::load_dossier;
pub use error::StoreError;
pub use operations::{insert_edges, insert_header, insert_machines, insert_roms};
pub use queries::{
    catalog_stats, catalog_version, clones_of, find_machine_by_crcs, list_machines, machine_name,
    machine_summary, search_machines, CatalogStats, MachineSummary,
};
pub use rusqlite::Connection;
pub use schema::{create_schema, open_memory};
pub use store::{close_store, open_store, Store};
