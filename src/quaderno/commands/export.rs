use crate::commands::{CmdMessage, CmdResult};
use crate::config::CONFIG_FILENAME;
use crate::error::{QuadernoError, Result};
use crate::model::Scope;
use crate::store::{Collection, DataStore};
use chrono::Local;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Archive every present data file, plus `config.json` from `config_dir`,
/// into `quaderno-<timestamp>.tar.gz` inside `out_dir`.
pub fn run<S: DataStore>(
    store: &S,
    scope: Scope,
    config_dir: Option<&Path>,
    out_dir: &Path,
) -> Result<CmdResult> {
    // 1. Gather files
    let mut files = collect_files(store, scope)?;
    if let Some(config) = read_config(config_dir)? {
        files.push((CONFIG_FILENAME.to_string(), config));
    }

    if files.is_empty() {
        let mut res = CmdResult::default();
        res.add_message(CmdMessage::info("No data files to export."));
        return Ok(res);
    }

    // 2. Prepare output file
    let now = Local::now();
    let filename = format!("quaderno-{}.tar.gz", now.format("%Y-%m-%d_%H%M%S"));
    let target = out_dir.join(&filename);
    let file = File::create(&target).map_err(QuadernoError::Io)?;

    // 3. Write archive
    write_archive(file, &files)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Exported {} file(s) to {}",
        files.len(),
        target.display()
    )));
    Ok(result.with_paths(vec![target]))
}

fn collect_files<S: DataStore>(store: &S, scope: Scope) -> Result<Vec<(String, String)>> {
    let mut files = Vec::new();
    for collection in Collection::ALL {
        if let Some(content) = store.read_raw(scope, collection)? {
            files.push((collection.file_name().to_string(), content));
        }
    }
    Ok(files)
}

fn read_config(config_dir: Option<&Path>) -> Result<Option<String>> {
    let Some(dir) = config_dir else {
        return Ok(None);
    };
    match fs::read_to_string(dir.join(CONFIG_FILENAME)) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(QuadernoError::Io(e)),
    }
}

fn write_archive<W: Write>(writer: W, files: &[(String, String)]) -> Result<()> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);

    for (name, content) in files {
        let entry_name = format!("quaderno/{}", name);

        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();

        tar.append_data(&mut header, entry_name, content.as_bytes())
            .map_err(QuadernoError::Io)?;
    }

    tar.into_inner()
        .and_then(|enc| enc.finish())
        .map_err(QuadernoError::Io)?;
    Ok(())
}
