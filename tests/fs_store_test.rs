use chrono::NaiveDate;
use quaderno::commands::helpers::{commit_ledger, open_ledger};
use quaderno::commands::returns;
use quaderno::config::QuadernoConfig;
use quaderno::ledger::{ConsumeRequest, ReturnRequest};
use quaderno::model::{ReturnDirection, Scope, StockLine};
use quaderno::store::fs::FileStore;
use quaderno::store::{DataStore, LoadState, StockTable};
use rust_decimal_macros::dec;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, TempDir, FileStore) {
    let project_dir = TempDir::new().unwrap();
    let global_dir = TempDir::new().unwrap();
    let store = FileStore::new(
        Some(project_dir.path().to_path_buf()),
        global_dir.path().to_path_buf(),
    );
    (project_dir, global_dir, store)
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_consume_against_legacy_wrapped_file() {
    let (proj, _glob, mut store) = setup();
    fs::write(
        proj.path().join("magazzino.json"),
        r#"{"prodotti": [{"nome": "Urea", "lotto": "", "unita": "kg", "giacenza": "100", "costo_unitario": 0.8}]}"#,
    )
    .unwrap();

    let mut open = open_ledger(&store, Scope::Project).unwrap();
    open.ledger
        .consume(&ConsumeRequest::new("urea", dec!(30), day()).with_operator("Mario"))
        .unwrap();
    commit_ledger(&mut store, Scope::Project, &open).unwrap();

    let stock = read_json(&proj.path().join("magazzino.json"));
    assert_eq!(stock["prodotti"][0]["prodotto"], "Urea");
    assert_eq!(stock["prodotti"][0]["giacenza"], serde_json::json!(70.0));
    assert_eq!(stock["prodotti"][0]["costo_unitario"], serde_json::json!(0.8));

    let movements = read_json(&proj.path().join("movimenti.json"));
    assert_eq!(movements[0]["data"], "2024-06-10");
    assert_eq!(movements[0]["prodotto"], "Urea");
    assert_eq!(movements[0]["quantita"], serde_json::json!(-30.0));
    assert_eq!(movements[0]["operatore"], "Mario");
}

#[test]
fn test_return_into_missing_files_creates_both() {
    let (proj, _glob, mut store) = setup();

    let mut open = open_ledger(&store, Scope::Project).unwrap();
    open.ledger
        .return_stock(&ReturnRequest {
            product_name: "Rame".into(),
            lot: String::new(),
            unit: "kg".into(),
            quantity: dec!(5),
            date: day(),
            operator: "Mario".into(),
            note: String::new(),
            direction: ReturnDirection::IntoStock,
        })
        .unwrap();
    commit_ledger(&mut store, Scope::Project, &open).unwrap();

    let stock = read_json(&proj.path().join("magazzino.json"));
    assert!(stock.is_array());
    assert_eq!(stock[0]["giacenza"], serde_json::json!(5.0));
    assert_eq!(read_json(&proj.path().join("movimenti.json"))[0]["quantita"], serde_json::json!(5.0));
}

#[test]
fn test_corrupt_file_recovers_and_is_backed_up() {
    let (proj, _glob, mut store) = setup();
    fs::write(proj.path().join("magazzino.json"), "[{\"prodotto\": ").unwrap();

    let loaded = store.load_stock(Scope::Project).unwrap();
    assert!(matches!(loaded.state, LoadState::Corrupt(_)));

    store
        .save_stock(
            Scope::Project,
            &StockTable::new(vec![StockLine::new("Zolfo", "", "kg").with_quantity(dec!(1))]),
        )
        .unwrap();

    let backups: Vec<_> = fs::read_dir(proj.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|n| n.starts_with("magazzino.json.corrupt-"))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(
        fs::read_to_string(proj.path().join(&backups[0])).unwrap(),
        "[{\"prodotto\": "
    );
    assert_eq!(store.load_stock(Scope::Project).unwrap().state, LoadState::Ok);
}

#[test]
fn test_non_utf8_file_is_backed_up_before_return() {
    let (proj, _glob, mut store) = setup();
    let mut bytes = br#"[{"prodotto": "Urea", "unita": "kg", "giacenza": 100, "note": "unit"#.to_vec();
    bytes.push(0xE0);
    bytes.extend_from_slice(br#""}]"#);
    fs::write(proj.path().join("magazzino.json"), &bytes).unwrap();

    returns::run(
        &mut store,
        Scope::Project,
        &QuadernoConfig::default(),
        ReturnRequest {
            product_name: "Rame".into(),
            lot: String::new(),
            unit: "kg".into(),
            quantity: dec!(5),
            date: day(),
            operator: "Mario".into(),
            note: String::new(),
            direction: ReturnDirection::IntoStock,
        },
    )
    .unwrap();

    let backups: Vec<_> = fs::read_dir(proj.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|n| n.starts_with("magazzino.json.corrupt-"))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read(proj.path().join(&backups[0])).unwrap(), bytes);

    let stock = read_json(&proj.path().join("magazzino.json"));
    assert_eq!(stock[0]["prodotto"], "Rame");
}

#[test]
fn test_no_tmp_files_left_behind() {
    let (proj, _glob, mut store) = setup();
    store
        .save_stock(Scope::Project, &StockTable::new(vec![StockLine::new("Urea", "", "kg")]))
        .unwrap();
    store.save_movements(Scope::Project, &[]).unwrap();

    for entry in fs::read_dir(proj.path()).unwrap() {
        let name = entry.unwrap().file_name().into_string().unwrap();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[test]
fn test_global_scope_is_separate() {
    let (proj, glob, mut store) = setup();
    store
        .save_stock(Scope::Global, &StockTable::new(vec![StockLine::new("Urea", "", "kg")]))
        .unwrap();

    assert!(glob.path().join("magazzino.json").exists());
    assert!(!proj.path().join("magazzino.json").exists());
    assert_eq!(store.load_stock(Scope::Project).unwrap().state, LoadState::Missing);
}
