use super::backend::StorageBackend;
use crate::error::{QuadernoError, Result};
use crate::model::Scope;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since quaderno is single-threaded.
/// This keeps the `StorageBackend` trait on `&self` for all methods.
#[derive(Default)]
pub struct MemBackend {
    files: RefCell<HashMap<(Scope, String), String>>,
    /// Files that exist but cannot be read (simulates bad permissions).
    unreadable: RefCell<Vec<(Scope, String)>>,
    simulate_write_error: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Put raw text in place, bypassing serialization. Test helper for
    /// hand-edited and corrupt files.
    pub fn put_raw(&self, scope: Scope, file: &str, content: &str) {
        self.files
            .borrow_mut()
            .insert((scope, file.to_string()), content.to_string());
    }

    pub fn get_raw(&self, scope: Scope, file: &str) -> Option<String> {
        self.files.borrow().get(&(scope, file.to_string())).cloned()
    }

    pub fn set_unreadable(&self, scope: Scope, file: &str) {
        self.unreadable.borrow_mut().push((scope, file.to_string()));
    }

    pub fn file_names(&self, scope: Scope) -> Vec<String> {
        let mut names: Vec<String> = self
            .files
            .borrow()
            .keys()
            .filter(|(s, _)| *s == scope)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }
}

impl StorageBackend for MemBackend {
    fn read(&self, scope: Scope, file: &str) -> Result<Option<String>> {
        let key = (scope, file.to_string());
        if self.unreadable.borrow().contains(&key) {
            return Err(QuadernoError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "Simulated read error",
            )));
        }
        Ok(self.files.borrow().get(&key).cloned())
    }

    fn write(&self, scope: Scope, file: &str, content: &str) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(QuadernoError::Store("Simulated write error".to_string()));
        }
        self.put_raw(scope, file, content);
        Ok(())
    }

    fn preserve(&self, scope: Scope, file: &str, suffix: &str) -> Result<Option<PathBuf>> {
        let Some(bytes) = self.get_raw(scope, file) else {
            return Ok(None);
        };
        let copy = format!("{}.{}", file, suffix);
        self.put_raw(scope, &copy, &bytes);
        self.location(scope, &copy).map(Some)
    }

    fn location(&self, scope: Scope, file: &str) -> Result<PathBuf> {
        let scope = match scope {
            Scope::Project => "project",
            Scope::Global => "global",
        };
        Ok(PathBuf::from(format!("memory://{}/{}", scope, file)))
    }

    fn scope_available(&self, _scope: Scope) -> bool {
        true
    }
}
