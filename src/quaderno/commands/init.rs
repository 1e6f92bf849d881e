use crate::commands::{CmdMessage, CmdResult, QuadernoPaths};
use crate::error::Result;
use crate::model::Scope;
use std::fs;

pub fn run(paths: &QuadernoPaths, scope: Scope) -> Result<CmdResult> {
    let dir = paths.scope_dir(scope)?;
    let existed = dir.is_dir();
    fs::create_dir_all(&dir)?;
    let mut result = CmdResult::default();
    if existed {
        result.add_message(CmdMessage::info(format!(
            "Logbook already present at {}",
            dir.display()
        )));
    } else {
        result.add_message(CmdMessage::success(format!(
            "Initialized logbook at {}",
            dir.display()
        )));
    }
    Ok(result.with_paths(vec![dir]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_directory_once() {
        let tmp = tempdir().unwrap();
        let paths = QuadernoPaths {
            project: Some(tmp.path().join(".quaderno")),
            global: tmp.path().join("global"),
        };

        let first = run(&paths, Scope::Project).unwrap();
        assert!(tmp.path().join(".quaderno").is_dir());
        assert!(first.messages[0].content.starts_with("Initialized"));

        let second = run(&paths, Scope::Project).unwrap();
        assert!(second.messages[0].content.starts_with("Logbook already present"));
    }

    #[test]
    fn test_init_without_project_scope_fails() {
        let tmp = tempdir().unwrap();
        let paths = QuadernoPaths {
            project: None,
            global: tmp.path().to_path_buf(),
        };
        assert!(run(&paths, Scope::Project).is_err());
        assert!(run(&paths, Scope::Global).is_ok());
    }
}
