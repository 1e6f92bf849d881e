//! Treatments and fertilizations.
//!
//! Both follow the same two-step flow: the application record is saved to its
//! own file first, then the quantity used (dose × hectares) is drawn from the
//! warehouse through the ledger. A product missing from the warehouse is a
//! warning, never a reason to drop the record.

use crate::commands::consume::outcome_messages;
use crate::commands::helpers::{commit_ledger, open_ledger, take_loaded};
use crate::commands::{CmdMessage, CmdResult};
use crate::config::QuadernoConfig;
use crate::error::{QuadernoError, Result};
use crate::ledger::ConsumeRequest;
use crate::model::{FertilizationRecord, FieldApplication, Scope, TreatmentRecord};
use crate::store::{Collection, DataStore, Loaded};
use tracing::info;

/// An application kind together with the file it lives in.
pub trait Logbook: FieldApplication + Clone + Sized {
    const COLLECTION: Collection;

    fn load<S: DataStore>(store: &S, scope: Scope) -> Result<Loaded<Vec<Self>>>;
    fn save<S: DataStore>(store: &mut S, scope: Scope, records: &[Self]) -> Result<()>;
    fn attach(result: CmdResult, records: Vec<Self>) -> CmdResult;
}

impl Logbook for TreatmentRecord {
    const COLLECTION: Collection = Collection::Treatments;

    fn load<S: DataStore>(store: &S, scope: Scope) -> Result<Loaded<Vec<Self>>> {
        store.load_treatments(scope)
    }

    fn save<S: DataStore>(store: &mut S, scope: Scope, records: &[Self]) -> Result<()> {
        store.save_treatments(scope, records)
    }

    fn attach(result: CmdResult, records: Vec<Self>) -> CmdResult {
        result.with_treatments(records)
    }
}

impl Logbook for FertilizationRecord {
    const COLLECTION: Collection = Collection::Fertilizations;

    fn load<S: DataStore>(store: &S, scope: Scope) -> Result<Loaded<Vec<Self>>> {
        store.load_fertilizations(scope)
    }

    fn save<S: DataStore>(store: &mut S, scope: Scope, records: &[Self]) -> Result<()> {
        store.save_fertilizations(scope, records)
    }

    fn attach(result: CmdResult, records: Vec<Self>) -> CmdResult {
        result.with_fertilizations(records)
    }
}

pub fn add<R: Logbook, S: DataStore>(
    store: &mut S,
    scope: Scope,
    config: &QuadernoConfig,
    mut record: R,
) -> Result<CmdResult> {
    record.trim_text();
    if record.product_name().is_empty() {
        return Err(QuadernoError::invalid("product name cannot be empty"));
    }
    let quantity = record.quantity_used()?;
    let operator = config.operator_or_default(record.operator());
    record.set_operator(operator);

    let mut result = CmdResult::default();
    let mut warnings = Vec::new();

    // 1. Record first
    let mut records = take_loaded(R::load(store, scope)?, R::COLLECTION, &mut warnings);
    records.push(record.clone());
    R::save(store, scope, &records)?;
    info!(kind = R::LABEL, field = record.field(), product = record.product_name(), "application recorded");

    // 2. Then stock
    let mut request = ConsumeRequest::new(record.product_name(), quantity, record.date())
        .with_operator(record.operator())
        .with_note(format!("{} {}", R::LABEL, record.field()));
    if !record.unit().is_empty() {
        request = request.with_unit(record.unit());
    }
    if !record.lot().is_empty() {
        request = request.with_lot(record.lot());
    }

    let mut open = open_ledger(store, scope)?;
    let outcome = open.ledger.consume(&request)?;
    commit_ledger(store, scope, &open)?;

    warnings.extend(open.warnings);
    result.extend_messages(warnings);
    result.add_message(CmdMessage::success(format!(
        "{} recorded: {} on {} ({} × {} ha = {})",
        R::LABEL,
        record.product_name(),
        record.field(),
        record.dose_per_hectare().normalize(),
        record.hectares().normalize(),
        request.quantity.normalize()
    )));
    result.extend_messages(outcome_messages(&request, &outcome));

    Ok(R::attach(result.with_consumption(outcome), vec![record]))
}

pub fn list<R: Logbook, S: DataStore>(store: &S, scope: Scope) -> Result<CmdResult> {
    let mut warnings = Vec::new();
    let records = take_loaded(R::load(store, scope)?, R::COLLECTION, &mut warnings);

    let mut result = CmdResult::default();
    result.extend_messages(warnings);
    if records.is_empty() {
        result.add_message(CmdMessage::info(format!("No {} records.", R::LABEL)));
    }
    Ok(R::attach(result, records))
}
