use super::CmdMessage;
use crate::error::Result;
use crate::ledger::InventoryLedger;
use crate::model::Scope;
use crate::store::{Collection, DataStore, LoadState, Loaded, StockTable, TableShape};
use tracing::debug;

/// Turn a corrupt load into a user-facing warning.
pub fn load_warning(collection: Collection, state: &LoadState) -> Option<CmdMessage> {
    match state {
        LoadState::Corrupt(reason) => Some(CmdMessage::warning(format!(
            "{} is unreadable ({}); treated as empty, a backup is kept on the next save",
            collection, reason
        ))),
        _ => None,
    }
}

/// Unwrap a load, pushing a warning when the file was corrupt.
pub fn take_loaded<T>(loaded: Loaded<T>, collection: Collection, warnings: &mut Vec<CmdMessage>) -> T {
    if let Some(msg) = load_warning(collection, &loaded.state) {
        warnings.push(msg);
    }
    loaded.value
}

/// A ledger loaded from a scope, remembering how to write it back.
pub struct OpenLedger {
    pub ledger: InventoryLedger,
    pub warnings: Vec<CmdMessage>,
    shape: TableShape,
}

pub fn open_ledger<S: DataStore>(store: &S, scope: Scope) -> Result<OpenLedger> {
    let mut warnings = Vec::new();
    let table = take_loaded(store.load_stock(scope)?, Collection::Stock, &mut warnings);
    let movements = take_loaded(
        store.load_movements(scope)?,
        Collection::Movements,
        &mut warnings,
    );
    Ok(OpenLedger {
        ledger: InventoryLedger::new(table.lines, movements),
        warnings,
        shape: table.shape,
    })
}

/// Persist whatever the ledger changed. Stock first, then movements.
pub fn commit_ledger<S: DataStore>(store: &mut S, scope: Scope, open: &OpenLedger) -> Result<()> {
    let ledger = &open.ledger;
    if ledger.stock_changed() {
        let table = StockTable {
            lines: ledger.lines().to_vec(),
            shape: open.shape.clone(),
        };
        store.save_stock(scope, &table)?;
    }
    if ledger.movements_appended() > 0 {
        store.save_movements(scope, ledger.movements())?;
    }
    debug!(
        stock = ledger.stock_changed(),
        movements = ledger.movements_appended(),
        "ledger committed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ConsumeRequest;
    use crate::model::StockLine;
    use crate::store::memory::InMemoryStore;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_commit_writes_only_what_changed() {
        let mut store = InMemoryStore::new();
        store
            .save_stock(
                Scope::Project,
                &StockTable::new(vec![StockLine::new("Urea", "", "kg").with_quantity(dec!(5))]),
            )
            .unwrap();

        let open = open_ledger(&store, Scope::Project).unwrap();
        commit_ledger(&mut store, Scope::Project, &open).unwrap();
        assert!(store.backend().get_raw(Scope::Project, "movimenti.json").is_none());

        let mut open = open_ledger(&store, Scope::Project).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        open.ledger
            .consume(&ConsumeRequest::new("Urea", dec!(2), day))
            .unwrap();
        commit_ledger(&mut store, Scope::Project, &open).unwrap();

        let reloaded = store.load_movements(Scope::Project).unwrap();
        assert_eq!(reloaded.value.len(), 1);
        assert_eq!(
            store.load_stock(Scope::Project).unwrap().value.lines[0].quantity_on_hand,
            dec!(3)
        );
    }

    #[test]
    fn test_open_ledger_warns_on_corrupt_stock() {
        let store = InMemoryStore::new();
        store
            .backend()
            .put_raw(Scope::Project, "magazzino.json", "[{");
        let open = open_ledger(&store, Scope::Project).unwrap();
        assert!(open.ledger.lines().is_empty());
        assert_eq!(open.warnings.len(), 1);
        assert!(open.warnings[0].content.contains("magazzino.json"));
    }
}
