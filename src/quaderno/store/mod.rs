//! # Storage Layer
//!
//! Every collection lives in its own JSON file inside the scope directory. The
//! files are the only source of truth; there is no cache or index.
//!
//! ## Storage Layout
//!
//! ```text
//! .quaderno/
//! ├── magazzino.json        # Stock table
//! ├── movimenti.json        # Movement log
//! ├── trattamenti.json      # Treatments
//! ├── fertilizzazioni.json  # Fertilizations
//! ├── azienda.json          # Company profile
//! └── config.json           # Scope configuration (see crate::config)
//! ```
//!
//! ## Recovery
//!
//! Loading never fails because of file *content*. A missing file is an empty
//! collection ([`LoadState::Missing`]); an unreadable or malformed one is an
//! empty collection flagged [`LoadState::Corrupt`] so the caller can warn.
//! Before a save overwrites a file that does not parse, its bytes are copied to
//! `<file>.corrupt-<timestamp>` so nothing typed by hand is lost for good.
//!
//! Errors from a load are reserved for the scope itself being unavailable.
//!
//! ## Stock table shapes
//!
//! `magazzino.json` is either a bare array of lines or, in files written by
//! older versions, an object holding the array under `prodotti`. The shape is
//! kept in [`TableShape`] and written back as it was read.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: JSON files on disk, atomic writes.
//! - [`memory::InMemoryStore`]: Same parsing, strings in memory. For tests.

use crate::error::Result;
use crate::model::{CompanyProfile, FertilizationRecord, MovementRecord, Scope, StockLine, TreatmentRecord};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

pub mod backend;
pub mod fs;
pub mod fs_backend;
pub mod json_store;
pub mod mem_backend;
pub mod memory;

/// The data files of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Stock,
    Movements,
    Treatments,
    Fertilizations,
    Company,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Stock,
        Collection::Movements,
        Collection::Treatments,
        Collection::Fertilizations,
        Collection::Company,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Stock => "magazzino.json",
            Collection::Movements => "movimenti.json",
            Collection::Treatments => "trattamenti.json",
            Collection::Fertilizations => "fertilizzazioni.json",
            Collection::Company => "azienda.json",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// No file yet.
    Missing,
    Ok,
    /// Unreadable or malformed; the value is empty. Carries the reason.
    Corrupt(String),
}

impl LoadState {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, LoadState::Corrupt(_))
    }
}

/// A loaded collection plus how the load went.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value: T,
    pub state: LoadState,
}

impl<T> Loaded<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            state: LoadState::Ok,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loaded<U> {
        Loaded {
            value: f(self.value),
            state: self.state,
        }
    }
}

impl<T: Default> Loaded<T> {
    pub fn missing() -> Self {
        Self {
            value: T::default(),
            state: LoadState::Missing,
        }
    }

    pub fn corrupt(reason: impl Into<String>) -> Self {
        Self {
            value: T::default(),
            state: LoadState::Corrupt(reason.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum TableShape {
    #[default]
    Bare,
    /// `{"prodotti": [...], ...}`; other top-level keys are kept.
    Wrapped { extra: Map<String, Value> },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockTable {
    pub lines: Vec<StockLine>,
    pub shape: TableShape,
}

impl StockTable {
    pub fn new(lines: Vec<StockLine>) -> Self {
        Self {
            lines,
            shape: TableShape::Bare,
        }
    }
}

/// Abstract interface for logbook storage.
///
/// Loads take `&self` and never fail on bad content (see module docs). Saves
/// replace the whole collection.
pub trait DataStore {
    fn load_stock(&self, scope: Scope) -> Result<Loaded<StockTable>>;
    fn save_stock(&mut self, scope: Scope, table: &StockTable) -> Result<()>;

    fn load_movements(&self, scope: Scope) -> Result<Loaded<Vec<MovementRecord>>>;
    fn save_movements(&mut self, scope: Scope, movements: &[MovementRecord]) -> Result<()>;

    fn load_treatments(&self, scope: Scope) -> Result<Loaded<Vec<TreatmentRecord>>>;
    fn save_treatments(&mut self, scope: Scope, records: &[TreatmentRecord]) -> Result<()>;

    fn load_fertilizations(&self, scope: Scope) -> Result<Loaded<Vec<FertilizationRecord>>>;
    fn save_fertilizations(&mut self, scope: Scope, records: &[FertilizationRecord]) -> Result<()>;

    fn load_company(&self, scope: Scope) -> Result<Loaded<CompanyProfile>>;
    fn save_company(&mut self, scope: Scope, profile: &CompanyProfile) -> Result<()>;

    /// Where a collection lives. Virtual for in-memory stores.
    fn collection_path(&self, scope: Scope, collection: Collection) -> Result<PathBuf>;

    /// Raw bytes of a collection file, if present. Used by export.
    fn read_raw(&self, scope: Scope, collection: Collection) -> Result<Option<String>>;

    fn scope_available(&self, scope: Scope) -> bool;
}
