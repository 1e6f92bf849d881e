use super::fs_backend::FsBackend;
use super::json_store::JsonStore;
use std::path::PathBuf;

pub type FileStore = JsonStore<FsBackend>;

impl FileStore {
    pub fn new(project_root: Option<PathBuf>, global_root: PathBuf) -> Self {
        JsonStore::with_backend(FsBackend::new(project_root, global_root))
    }
}
