//! Catalog ingestion pipeline.
//!
//! Parses a `-listxml` catalog, normalizes machines and ROMs, resolves
//! device closures, bulk-loads an in-memory database, and snapshots it to
//! the target store file.

pub mod ingest;

pub use ingest::{ingest, ingest_document, IngestError, IngestStats};
