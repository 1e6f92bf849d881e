use super::json_store::JsonStore;
use super::mem_backend::MemBackend;

pub type InMemoryStore = JsonStore<MemBackend>;

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        JsonStore::with_backend(MemBackend::new())
    }
}
