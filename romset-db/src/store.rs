//! The store handle and the process-wide handle cache.
//!
//! A [`Store`] owns one SQLite connection behind a mutex: all access is
//! serialized, concurrent callers queue, and a statement always runs to
//! completion before the next begins. Handles are cached per path, so a
//! repeated open of the same file returns the same handle.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use romset_core::Dossier;
use rusqlite::Connection;

use crate::dossier;
use crate::error::StoreError;
use crate::queries::{self, CatalogStats, MachineSummary};

static REGISTRY: OnceLock<Mutex<HashMap<PathBuf, Arc<Store>>>> = OnceLock::new();

fn registry() -> &'static Mutex<HashMap<PathBuf, Arc<Store>>> {
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// An open catalog store.
pub struct Store {
    path: PathBuf,
    conn: Mutex<Connection>,
}

/// Open the store at `path`, or return the cached handle if this path is
/// already open.
///
/// Returns `StoreError::NotFound` when no file exists at `path`.
pub fn open_store(path: &Path) -> Result<Arc<Store>, StoreError> {
    let mut stores = registry()
        .lock()
        .map_err(|_| StoreError::unavailable("store registry poisoned"))?;
    if let Some(store) = stores.get(path) {
        return Ok(store.clone());
    }
    if !path.exists() {
        return Err(StoreError::not_found(format!(
            "no store file at {}",
            path.display()
        )));
    }
    let conn = Connection::open(path).map_err(|e| {
        StoreError::unavailable(format!("failed to open {}: {e}", path.display()))
    })?;
    let store = Arc::new(Store {
        path: path.to_path_buf(),
        conn: Mutex::new(conn),
    });
    stores.insert(path.to_path_buf(), store.clone());
    log::info!("opened store {}", path.display());
    Ok(store)
}

/// Evict the handle for `path` from the cache. Returns whether a handle
/// was present. The connection closes once the last caller drops its
/// `Arc`.
pub fn close_store(path: &Path) -> bool {
    let Ok(mut stores) = registry().lock() else {
        return false;
    };
    let evicted = stores.remove(path).is_some();
    if evicted {
        log::info!("closed store {}", path.display());
    }
    evicted
}

impl Store {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Evict this store from the handle cache.
    pub fn close(&self) -> bool {
        close_store(&self.path)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::unavailable("store connection poisoned"))
    }

    /// The build string of the ingested catalog.
    pub fn catalog_version(&self) -> Result<String, StoreError> {
        let conn = self.lock()?;
        queries::catalog_version(&conn)
    }

    /// List every machine in the store, ordered by name.
    pub fn list_machines(&self) -> Result<Vec<MachineSummary>, StoreError> {
        let conn = self.lock()?;
        queries::list_machines(&conn)
    }

    /// Look up one machine by name.
    pub fn machine_summary(&self, name: &str) -> Result<Option<MachineSummary>, StoreError> {
        let conn = self.lock()?;
        queries::machine_summary(&conn, name)
    }

    /// Resolve a machine id back to its name.
    pub fn machine_name(&self, machine_id: i64) -> Result<Option<String>, StoreError> {
        let conn = self.lock()?;
        queries::machine_name(&conn, machine_id)
    }

    /// List the clones of a parent machine.
    pub fn clones_of(&self, name: &str) -> Result<Vec<MachineSummary>, StoreError> {
        let conn = self.lock()?;
        queries::clones_of(&conn, name)
    }

    /// Search machines by name or description.
    pub fn search_machines(&self, query: &str) -> Result<Vec<MachineSummary>, StoreError> {
        let conn = self.lock()?;
        queries::search_machines(&conn, query)
    }

    /// Find the machine matching a set of ROM CRCs exactly.
    pub fn find_machine_by_crcs<S: AsRef<str>>(
        &self,
        crcs: &[S],
    ) -> Result<Option<i64>, StoreError> {
        let conn = self.lock()?;
        queries::find_machine_by_crcs(&conn, crcs)
    }

    /// Summary statistics for the store.
    pub fn catalog_stats(&self) -> Result<CatalogStats, StoreError> {
        let conn = self.lock()?;
        queries::catalog_stats(&conn)
    }

    /// Load the dossier for a machine name.
    pub fn load_dossier(&self, name: &str) -> Result<Dossier, StoreError> {
        let conn = self.lock()?;
        dossier::load_dossier(&conn, name)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("path", &self.path).finish()
    }
}
