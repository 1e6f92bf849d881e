#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Runs inside `dir` with the global scope pointed into the temp dir, so no
/// test touches the real user data directory.
fn quaderno(dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("quaderno"));
    cmd.current_dir(dir)
        .env_remove("QUADERNO_DATA")
        .env("QUADERNO_GLOBAL_DATA", dir.join("global"))
        .env("NO_COLOR", "1");
    cmd
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_treatment_workflow() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    quaderno(dir)
        .args(["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    quaderno(dir)
        .args(["stock", "add", "Rame", "10", "--unit", "L", "--cost", "7,5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rame now at 10 L"));

    quaderno(dir)
        .args([
            "treatment", "add", "--field", "Vigna Nord", "--product", "Rame", "--dose", "2.5",
            "--hectares", "1.2", "--date", "2024-04-10", "--operator", "Anna",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deducted 3 of Rame: 7 left"));

    let data = dir.join(".quaderno");
    let treatments = read_json(&data.join("trattamenti.json"));
    assert_eq!(treatments[0]["campo"], "Vigna Nord");
    assert_eq!(treatments[0]["dose_l_ha"], serde_json::json!(2.5));

    let movements = read_json(&data.join("movimenti.json"));
    assert_eq!(movements[0]["note"], "Trattamento Vigna Nord");
    assert_eq!(movements[0]["quantita"], serde_json::json!(-3.0));

    quaderno(dir)
        .args(["movements", "--product", "rame"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-04-10"))
        .stdout(predicate::str::contains("-3"));

    quaderno(dir)
        .args(["stock", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total stock value: 52.50"));
}

#[test]
fn test_unknown_product_warns_but_records() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    quaderno(dir)
        .args([
            "fertilization", "add", "--field", "Campo 3", "--product", "Zeolite", "--dose", "10",
            "--hectares", "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Zeolite is not in stock"));

    let data = dir.join(".quaderno");
    assert_eq!(read_json(&data.join("fertilizzazioni.json")).as_array().unwrap().len(), 1);
    assert!(!data.join("movimenti.json").exists());
}

#[test]
fn test_return_creates_line_and_reports_residual() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    quaderno(dir)
        .args(["config", "default-operator", "Mario"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default-operator set to Mario"));

    quaderno(dir)
        .args(["return", "Rame", "5", "--unit", "kg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 kg left of Rame"));

    let movements = read_json(&dir.join(".quaderno").join("movimenti.json"));
    assert_eq!(movements[0]["operatore"], "Mario");
    assert_eq!(movements[0]["quantita"], serde_json::json!(5.0));
}

#[test]
fn test_invalid_return_exits_with_error() {
    let temp = TempDir::new().unwrap();
    quaderno(temp.path())
        .args(["return", "Rame", "0", "--unit", "kg"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Invalid input"));
}

#[test]
fn test_doctor_flags_corrupt_file() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join(".quaderno");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("movimenti.json"), "not json").unwrap();

    quaderno(temp.path())
        .args(["doctor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("movimenti.json: corrupt"));
}

#[test]
fn test_global_flag_uses_global_dir() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    quaderno(dir)
        .args(["--global", "company", "set", "--name", "Az. Agr. Verdi"])
        .assert()
        .success();

    assert!(dir.join("global").join("azienda.json").exists());
    assert!(!dir.join(".quaderno").exists());

    quaderno(dir)
        .args(["company", "show", "-g"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Az. Agr. Verdi"));
}

#[test]
fn test_export_writes_archive() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    quaderno(dir)
        .args(["stock", "add", "Urea", "100", "--unit", "kg"])
        .assert()
        .success();

    quaderno(dir)
        .args(["export", "--out", dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 file(s)"));

    let archives: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|n| n.starts_with("quaderno-") && n.ends_with(".tar.gz"))
        .collect();
    assert_eq!(archives.len(), 1);
}
