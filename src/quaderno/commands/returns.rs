use crate::commands::helpers::{commit_ledger, open_ledger};
use crate::commands::stock::describe_balance;
use crate::commands::{CmdMessage, CmdResult};
use crate::config::QuadernoConfig;
use crate::error::Result;
use crate::ledger::ReturnRequest;
use crate::model::{ReturnDirection, Scope};
use crate::store::DataStore;

/// Record a manual return. Blank unit and operator fall back to the config.
pub fn run<S: DataStore>(
    store: &mut S,
    scope: Scope,
    config: &QuadernoConfig,
    mut request: ReturnRequest,
) -> Result<CmdResult> {
    request.unit = config.unit_or_default(Some(&request.unit));
    request.operator = config.operator_or_default(&request.operator);

    let mut open = open_ledger(store, scope)?;
    let line = open.ledger.return_stock(&request)?;
    commit_ledger(store, scope, &open)?;

    let mut result = CmdResult::default();
    result.extend_messages(open.warnings);
    let action = match request.direction {
        ReturnDirection::IntoStock => "Returned to stock",
        ReturnDirection::OutOfStock => "Removed from stock",
    };
    result.add_message(CmdMessage::success(format!(
        "{}: {} {} of {}",
        action,
        request.quantity.normalize(),
        line.unit,
        line.product_name
    )));
    result.add_message(CmdMessage::info(describe_balance(&line)));
    Ok(result.with_stock_lines(vec![line]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuadernoError;
    use crate::store::memory::InMemoryStore;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn request(product: &str, unit: &str, qty: Decimal, direction: ReturnDirection) -> ReturnRequest {
        ReturnRequest {
            product_name: product.into(),
            lot: String::new(),
            unit: unit.into(),
            quantity: qty,
            date: NaiveDate::from_ymd_opt(2024, 7, 3).unwrap(),
            operator: String::new(),
            note: "avanzo".into(),
            direction,
        }
    }

    #[test]
    fn test_return_into_empty_stock_creates_line() {
        let mut store = InMemoryStore::new();
        let config = QuadernoConfig {
            default_operator: "Mario".into(),
            ..Default::default()
        };
        let result = run(
            &mut store,
            Scope::Project,
            &config,
            request("Rame", "kg", dec!(5), ReturnDirection::IntoStock),
        )
        .unwrap();

        assert_eq!(result.stock_lines[0].quantity_on_hand, dec!(5));
        assert!(result.messages[1].content.contains("5 kg left of Rame"));
        let movements = store.load_movements(Scope::Project).unwrap().value;
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].signed_quantity, dec!(5));
        assert_eq!(movements[0].operator, "Mario");
        assert_eq!(movements[0].note, "avanzo");
    }

    #[test]
    fn test_return_blank_unit_uses_default() {
        let mut store = InMemoryStore::new();
        let result = run(
            &mut store,
            Scope::Project,
            &QuadernoConfig::default(),
            request("Olio", " ", dec!(2), ReturnDirection::IntoStock),
        )
        .unwrap();
        assert_eq!(result.stock_lines[0].unit, "L");
    }

    #[test]
    fn test_return_zero_is_rejected_without_writes() {
        let mut store = InMemoryStore::new();
        let err = run(
            &mut store,
            Scope::Project,
            &QuadernoConfig::default(),
            request("Rame", "kg", Decimal::ZERO, ReturnDirection::OutOfStock),
        )
        .unwrap_err();
        assert!(matches!(err, QuadernoError::InvalidInput(_)));
        assert!(store.backend().file_names(Scope::Project).is_empty());
    }
}
