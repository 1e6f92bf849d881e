use crate::api::QuadernoApi;
use crate::commands::QuadernoPaths;
use crate::config::QuadernoConfig;
use crate::model::Scope;
use crate::store::fs::FileStore;
use directories::{BaseDirs, ProjectDirs};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DATA_DIR_NAME: &str = ".quaderno";
pub const PROJECT_DATA_ENV: &str = "QUADERNO_DATA";
pub const GLOBAL_DATA_ENV: &str = "QUADERNO_GLOBAL_DATA";

pub struct QuadernoContext {
    pub api: QuadernoApi<FileStore>,
    pub scope: Scope,
    pub config: QuadernoConfig,
}

/// Find the nearest directory, from `cwd` upward, that holds a `.quaderno`
/// logbook. Stops at the home directory or the filesystem root.
pub fn find_project_root(cwd: &Path) -> Option<PathBuf> {
    let home_dir = BaseDirs::new().map(|bd| bd.home_dir().to_path_buf());
    let mut current = cwd.to_path_buf();

    loop {
        if current.join(DATA_DIR_NAME).is_dir() {
            return Some(current);
        }

        if let Some(ref home) = home_dir {
            if &current == home {
                return None;
            }
        }

        match current.parent() {
            Some(parent) if parent != current => {
                current = parent.to_path_buf();
            }
            _ => return None,
        }
    }
}

fn env_dir(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Project data dir: `$QUADERNO_DATA`, else the nearest `.quaderno` above
/// `cwd`, else `cwd/.quaderno` (created on first write).
pub fn project_data_dir(cwd: &Path) -> PathBuf {
    env_dir(PROJECT_DATA_ENV).unwrap_or_else(|| {
        find_project_root(cwd)
            .unwrap_or_else(|| cwd.to_path_buf())
            .join(DATA_DIR_NAME)
    })
}

/// Global data dir: `$QUADERNO_GLOBAL_DATA`, else the OS data directory.
pub fn global_data_dir(cwd: &Path) -> PathBuf {
    if let Some(dir) = env_dir(GLOBAL_DATA_ENV) {
        return dir;
    }
    match ProjectDirs::from("com", "quaderno", "quaderno") {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        None => {
            warn!("no OS data directory available, using the working directory for global data");
            cwd.join(DATA_DIR_NAME).join("global")
        }
    }
}

pub fn initialize(cwd: &Path, use_global: bool) -> QuadernoContext {
    let project_dir = project_data_dir(cwd);
    let global_dir = global_data_dir(cwd);

    let scope = if use_global {
        Scope::Global
    } else {
        Scope::Project
    };

    let config_dir = match scope {
        Scope::Project => &project_dir,
        Scope::Global => &global_dir,
    };
    let config = QuadernoConfig::load(config_dir).unwrap_or_else(|e| {
        warn!(error = %e, "ignoring unreadable config, using defaults");
        QuadernoConfig::default()
    });
    debug!(project = %project_dir.display(), global = %global_dir.display(), ?scope, "data directories");

    let store = FileStore::new(Some(project_dir.clone()), global_dir.clone());
    let paths = QuadernoPaths {
        project: Some(project_dir),
        global: global_dir,
    };
    let api = QuadernoApi::new(store, paths, config.clone());

    QuadernoContext { api, scope, config }
}
