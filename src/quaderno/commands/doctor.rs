use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::ledger::InventoryLedger;
use crate::model::Scope;
use crate::store::{Collection, DataStore, LoadState};
use rust_decimal::Decimal;

/// Read-only health check of a scope. Reports, never repairs.
pub fn run<S: DataStore>(store: &S, scope: Scope) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut problems = 0usize;

    let stock = store.load_stock(scope)?;
    let states = [
        (Collection::Stock, stock.state.clone(), stock.value.lines.len()),
        count(Collection::Movements, store.load_movements(scope)?.map(|v| v.len())),
        count(Collection::Treatments, store.load_treatments(scope)?.map(|v| v.len())),
        count(
            Collection::Fertilizations,
            store.load_fertilizations(scope)?.map(|v| v.len()),
        ),
        count(Collection::Company, store.load_company(scope)?.map(|_| 1)),
    ];

    for (collection, state, records) in states {
        match state {
            LoadState::Ok => result.add_message(CmdMessage::info(format!(
                "{}: ok ({} record(s))",
                collection, records
            ))),
            LoadState::Missing => {
                result.add_message(CmdMessage::info(format!("{}: missing", collection)))
            }
            LoadState::Corrupt(reason) => {
                problems += 1;
                result.add_message(CmdMessage::warning(format!(
                    "{}: corrupt ({})",
                    collection, reason
                )));
            }
        }
    }

    let ledger = InventoryLedger::new(stock.value.lines, Vec::new());
    for key in ledger.duplicate_keys() {
        problems += 1;
        result.add_message(CmdMessage::warning(format!(
            "Duplicate stock line: {}",
            key
        )));
    }
    for line in ledger.lines().iter().filter(|l| l.quantity_on_hand < Decimal::ZERO) {
        problems += 1;
        result.add_message(CmdMessage::warning(format!(
            "Negative balance: {} at {}",
            line.key(),
            line.quantity_on_hand.normalize()
        )));
    }

    if problems == 0 {
        result.add_message(CmdMessage::success("No problems found."));
    }
    Ok(result)
}

fn count(collection: Collection, loaded: crate::store::Loaded<usize>) -> (Collection, LoadState, usize) {
    (collection, loaded.state, loaded.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn test_fresh_scope_is_healthy() {
        let store = InMemoryStore::new();
        let result = run(&store, Scope::Project).unwrap();
        assert!(!result.has_warnings());
        assert_eq!(result.messages[0].content, "magazzino.json: missing");
        assert_eq!(result.messages.last().unwrap().content, "No problems found.");
    }

    #[test]
    fn test_reports_corrupt_duplicates_and_negatives() {
        let store = InMemoryStore::new();
        store.backend().put_raw(
            Scope::Project,
            "magazzino.json",
            r#"[
                {"prodotto": "Rame", "unita": "kg", "giacenza": 1},
                {"nome": "rame", "unita": "KG", "giacenza": 2},
                {"prodotto": "Urea", "unita": "kg", "giacenza": -4}
            ]"#,
        );
        store
            .backend()
            .put_raw(Scope::Project, "movimenti.json", "{{{");

        let result = run(&store, Scope::Project).unwrap();
        let warnings: Vec<_> = result
            .messages
            .iter()
            .filter(|m| m.level == MessageLevel::Warning)
            .map(|m| m.content.as_str())
            .collect();

        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].starts_with("movimenti.json: corrupt"));
        assert_eq!(warnings[1], "Duplicate stock line: rame (kg)");
        assert_eq!(warnings[2], "Negative balance: urea (kg) at -4");
        assert_eq!(result.messages[0].content, "magazzino.json: ok (3 record(s))");
    }
}
