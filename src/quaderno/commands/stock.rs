use crate::commands::helpers::{commit_ledger, open_ledger, take_loaded};
use crate::commands::{CmdMessage, CmdResult};
use crate::config::QuadernoConfig;
use crate::error::{QuadernoError, Result};
use crate::ledger::{round_quantity, UpsertRequest};
use crate::model::{normalize_name, Scope, StockKey, StockLine, UpsertMode};
use crate::store::{Collection, DataStore};
use rust_decimal::Decimal;

/// A warehouse edit as typed by the user. A missing unit falls back to the
/// configured default.
#[derive(Debug, Clone)]
pub struct StockEntry {
    pub product_name: String,
    pub lot: String,
    pub unit: Option<String>,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

pub fn upsert<S: DataStore>(
    store: &mut S,
    scope: Scope,
    config: &QuadernoConfig,
    entry: StockEntry,
    mode: UpsertMode,
) -> Result<CmdResult> {
    let mut open = open_ledger(store, scope)?;
    let request = UpsertRequest {
        product_name: entry.product_name,
        lot: entry.lot,
        unit: config.unit_or_default(entry.unit.as_deref()),
        quantity_delta: entry.quantity,
        unit_cost: entry.unit_cost,
        mode,
    };
    let line = open.ledger.upsert_stock_line(&request)?;
    commit_ledger(store, scope, &open)?;

    let mut result = CmdResult::default();
    result.extend_messages(open.warnings);
    let verb = match mode {
        UpsertMode::AddToExisting => "Stock updated",
        UpsertMode::ReplaceExisting => "Stock set",
    };
    result.add_message(CmdMessage::success(format!(
        "{}: {} now at {} {}",
        verb,
        line.product_name,
        line.quantity_on_hand.normalize(),
        line.unit
    )));
    Ok(result.with_stock_lines(vec![line]))
}

pub fn list<S: DataStore>(store: &S, scope: Scope, filter: Option<&str>) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut warnings = Vec::new();
    let table = take_loaded(store.load_stock(scope)?, Collection::Stock, &mut warnings);
    result.extend_messages(warnings);

    let needle = filter.map(normalize_name).filter(|n| !n.is_empty());
    let lines: Vec<StockLine> = table
        .lines
        .into_iter()
        .filter(|line| match &needle {
            Some(n) => normalize_name(&line.product_name).contains(n.as_str()),
            None => true,
        })
        .collect();

    if lines.is_empty() {
        result.add_message(CmdMessage::info("No stock lines."));
        return Ok(result);
    }

    result.add_message(CmdMessage::info(format!(
        "Total stock value: {:.2}",
        total_value(&lines)?
    )));
    Ok(result.with_stock_lines(lines))
}

/// Σ balance × unit cost.
pub fn total_value(lines: &[StockLine]) -> Result<Decimal> {
    lines.iter().try_fold(Decimal::ZERO, |total, line| {
        total
            .checked_add(line.value()?)
            .ok_or_else(|| QuadernoError::invalid("total stock value is out of range"))
    })
}

#[derive(Debug, Clone)]
pub struct RelabelRequest {
    pub product_name: String,
    pub lot: String,
    pub unit: Option<String>,
    pub new_lot: Option<String>,
    pub new_unit: Option<String>,
}

pub fn relabel<S: DataStore>(
    store: &mut S,
    scope: Scope,
    config: &QuadernoConfig,
    request: RelabelRequest,
) -> Result<CmdResult> {
    let mut open = open_ledger(store, scope)?;
    let unit = config.unit_or_default(request.unit.as_deref());
    let from = StockKey::new(&request.product_name, &request.lot, &unit);

    let new_lot = request.new_lot.unwrap_or_else(|| request.lot.clone());
    let new_unit = request.new_unit.unwrap_or_else(|| unit.clone());
    let line = open.ledger.relabel(&from, &new_lot, &new_unit)?;
    commit_ledger(store, scope, &open)?;

    let mut result = CmdResult::default();
    result.extend_messages(open.warnings);
    result.add_message(CmdMessage::success(format!(
        "Relabelled {} as {}",
        from,
        line.key()
    )));
    Ok(result.with_stock_lines(vec![line]))
}

/// Residual balance of a key, for messages after a change.
pub fn describe_balance(line: &StockLine) -> String {
    format!(
        "{} {} left of {}",
        round_quantity(line.quantity_on_hand),
        line.unit,
        line.product_name
    )
}
