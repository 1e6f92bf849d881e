use super::backend::StorageBackend;
use super::{Collection, DataStore, LoadState, Loaded, StockTable, TableShape};
use crate::error::{QuadernoError, Result};
use crate::model::{
    CompanyProfile, FertilizationRecord, MovementRecord, Scope, StockLine, TreatmentRecord,
};
use chrono::Local;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Legacy wrapper key of the stock table.
const WRAPPED_STOCK_KEY: &str = "prodotti";

pub struct JsonStore<B: StorageBackend> {
    pub(crate) backend: B,
}

impl<B: StorageBackend> JsonStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Read a collection's text. I/O failures on an existing file become
    /// `Corrupt`; an unavailable scope is still an error.
    fn read_text(&self, scope: Scope, collection: Collection) -> Result<Loaded<Option<String>>> {
        match self.backend.read(scope, collection.file_name()) {
            Ok(None) => Ok(Loaded {
                value: None,
                state: LoadState::Missing,
            }),
            Ok(Some(text)) => Ok(Loaded::ok(Some(text))),
            Err(QuadernoError::Io(e)) => {
                warn!(file = %collection, error = %e, "unreadable data file, using empty");
                Ok(Loaded::corrupt(format!("cannot read: {}", e)))
            }
            Err(e) => Err(e),
        }
    }

    fn load_with<T: Default>(
        &self,
        scope: Scope,
        collection: Collection,
        parse: fn(&str) -> std::result::Result<T, String>,
    ) -> Result<Loaded<T>> {
        let text = self.read_text(scope, collection)?;
        let raw = match (text.state, text.value) {
            (LoadState::Ok, Some(raw)) => raw,
            (LoadState::Corrupt(reason), _) => return Ok(Loaded::corrupt(reason)),
            _ => return Ok(Loaded::missing()),
        };
        match parse(&raw) {
            Ok(value) => {
                debug!(file = %collection, "loaded");
                Ok(Loaded::ok(value))
            }
            Err(reason) => {
                warn!(file = %collection, %reason, "malformed data file, using empty");
                Ok(Loaded::corrupt(reason))
            }
        }
    }

    /// Write `value` to a collection, first copying aside any existing file
    /// that cannot be read or does not parse.
    fn save_with<T>(
        &self,
        scope: Scope,
        collection: Collection,
        value: &Value,
        parse: fn(&str) -> std::result::Result<T, String>,
    ) -> Result<()> {
        let file = collection.file_name();
        let damaged = match self.backend.read(scope, file) {
            Ok(Some(existing)) => parse(&existing).is_err(),
            Ok(None) => false,
            Err(QuadernoError::Io(_)) => true,
            Err(e) => return Err(e),
        };
        if damaged {
            let suffix = format!("corrupt-{}", Local::now().format("%Y%m%d%H%M%S"));
            if let Some(copy) = self.backend.preserve(scope, file, &suffix)? {
                warn!(file, backup = %copy.display(), "preserved damaged file before overwrite");
            }
        }
        let content = serde_json::to_string_pretty(value).map_err(QuadernoError::Serialization)?;
        self.backend.write(scope, file, &content)?;
        debug!(file, "saved");
        Ok(())
    }

    fn save_list<T: Serialize + DeserializeOwned>(
        &self,
        scope: Scope,
        collection: Collection,
        records: &[T],
    ) -> Result<()> {
        let value = serde_json::to_value(records).map_err(QuadernoError::Serialization)?;
        self.save_with(scope, collection, &value, parse_list::<T>)
    }
}

fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// A JSON array of records. A blank file is an empty list.
pub(crate) fn parse_list<T: DeserializeOwned>(raw: &str) -> std::result::Result<Vec<T>, String> {
    if is_blank(raw) {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    match value {
        Value::Array(_) => serde_json::from_value(value).map_err(|e| e.to_string()),
        other => Err(format!("expected a list, found {}", kind_of(&other))),
    }
}

/// Bare array, or the legacy `{"prodotti": [...]}` wrapper.
pub(crate) fn parse_stock(raw: &str) -> std::result::Result<StockTable, String> {
    if is_blank(raw) {
        return Ok(StockTable::default());
    }
    let value: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    match value {
        Value::Array(_) => {
            let lines: Vec<StockLine> = serde_json::from_value(value).map_err(|e| e.to_string())?;
            Ok(StockTable::new(lines))
        }
        Value::Object(mut map) => {
            let inner = map
                .remove(WRAPPED_STOCK_KEY)
                .ok_or_else(|| format!("object without a '{}' list", WRAPPED_STOCK_KEY))?;
            if !inner.is_array() {
                return Err(format!("'{}' is not a list", WRAPPED_STOCK_KEY));
            }
            let lines: Vec<StockLine> = serde_json::from_value(inner).map_err(|e| e.to_string())?;
            Ok(StockTable {
                lines,
                shape: TableShape::Wrapped { extra: map },
            })
        }
        other => Err(format!("expected a list, found {}", kind_of(&other))),
    }
}

/// A single object. Blank, `{}` and `[]` all mean "nothing saved yet".
pub(crate) fn parse_company(raw: &str) -> std::result::Result<CompanyProfile, String> {
    if is_blank(raw) {
        return Ok(CompanyProfile::default());
    }
    let value: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    match value {
        Value::Object(_) => serde_json::from_value(value).map_err(|e| e.to_string()),
        Value::Array(ref items) if items.is_empty() => Ok(CompanyProfile::default()),
        other => Err(format!("expected an object, found {}", kind_of(&other))),
    }
}

fn stock_to_value(table: &StockTable) -> Result<Value> {
    let lines = serde_json::to_value(&table.lines).map_err(QuadernoError::Serialization)?;
    Ok(match &table.shape {
        TableShape::Bare => lines,
        TableShape::Wrapped { extra } => {
            let mut map = extra.clone();
            map.insert(WRAPPED_STOCK_KEY.to_string(), lines);
            Value::Object(map)
        }
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

impl<B: StorageBackend> DataStore for JsonStore<B> {
    fn load_stock(&self, scope: Scope) -> Result<Loaded<StockTable>> {
        self.load_with(scope, Collection::Stock, parse_stock)
    }

    fn save_stock(&mut self, scope: Scope, table: &StockTable) -> Result<()> {
        let value = stock_to_value(table)?;
        self.save_with(scope, Collection::Stock, &value, parse_stock)
    }

    fn load_movements(&self, scope: Scope) -> Result<Loaded<Vec<MovementRecord>>> {
        self.load_with(scope, Collection::Movements, parse_list::<MovementRecord>)
    }

    fn save_movements(&mut self, scope: Scope, movements: &[MovementRecord]) -> Result<()> {
        self.save_list(scope, Collection::Movements, movements)
    }

    fn load_treatments(&self, scope: Scope) -> Result<Loaded<Vec<TreatmentRecord>>> {
        self.load_with(scope, Collection::Treatments, parse_list::<TreatmentRecord>)
    }

    fn save_treatments(&mut self, scope: Scope, records: &[TreatmentRecord]) -> Result<()> {
        self.save_list(scope, Collection::Treatments, records)
    }

    fn load_fertilizations(&self, scope: Scope) -> Result<Loaded<Vec<FertilizationRecord>>> {
        self.load_with(
            scope,
            Collection::Fertilizations,
            parse_list::<FertilizationRecord>,
        )
    }

    fn save_fertilizations(&mut self, scope: Scope, records: &[FertilizationRecord]) -> Result<()> {
        self.save_list(scope, Collection::Fertilizations, records)
    }

    fn load_company(&self, scope: Scope) -> Result<Loaded<CompanyProfile>> {
        self.load_with(scope, Collection::Company, parse_company)
    }

    fn save_company(&mut self, scope: Scope, profile: &CompanyProfile) -> Result<()> {
        let value = serde_json::to_value(profile).map_err(QuadernoError::Serialization)?;
        self.save_with(scope, Collection::Company, &value, parse_company)
    }

    fn collection_path(&self, scope: Scope, collection: Collection) -> Result<PathBuf> {
        self.backend.location(scope, collection.file_name())
    }

    fn read_raw(&self, scope: Scope, collection: Collection) -> Result<Option<String>> {
        self.backend.read(scope, collection.file_name())
    }

    fn scope_available(&self, scope: Scope) -> bool {
        self.backend.scope_available(scope)
    }
}
