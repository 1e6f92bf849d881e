use super::backend::StorageBackend;
use crate::error::{QuadernoError, Result};
use crate::model::Scope;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct FsBackend {
    project_root: Option<PathBuf>,
    global_root: PathBuf,
}

impl FsBackend {
    pub fn new(project_root: Option<PathBuf>, global_root: PathBuf) -> Self {
        Self {
            project_root,
            global_root,
        }
    }

    fn root(&self, scope: Scope) -> Result<&Path> {
        match scope {
            Scope::Project => self.project_root.as_deref().ok_or_else(|| {
                QuadernoError::Store("No project scope available".to_string())
            }),
            Scope::Global => Ok(&self.global_root),
        }
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(QuadernoError::Io)?;
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn read(&self, scope: Scope, file: &str) -> Result<Option<String>> {
        let path = self.root(scope)?.join(file);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(QuadernoError::Io(e)),
        }
    }

    fn write(&self, scope: Scope, file: &str, content: &str) -> Result<()> {
        let root = self.root(scope)?;
        self.ensure_dir(root)?;

        let target = root.join(file);

        // Atomic write
        let tmp = root.join(format!(".{}-{}.tmp", file, Uuid::new_v4()));
        fs::write(&tmp, content).map_err(QuadernoError::Io)?;
        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(QuadernoError::Io(e));
        }
        Ok(())
    }

    fn preserve(&self, scope: Scope, file: &str, suffix: &str) -> Result<Option<PathBuf>> {
        let root = self.root(scope)?;
        let source = root.join(file);
        if !source.exists() {
            return Ok(None);
        }
        let copy = root.join(format!("{}.{}", file, suffix));
        fs::copy(&source, &copy).map_err(QuadernoError::Io)?;
        Ok(Some(copy))
    }

    fn location(&self, scope: Scope, file: &str) -> Result<PathBuf> {
        Ok(self.root(scope)?.join(file))
    }

    fn scope_available(&self, scope: Scope) -> bool {
        self.root(scope).is_ok()
    }
}
