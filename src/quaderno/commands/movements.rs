use crate::commands::helpers::take_loaded;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{normalize_name, MovementRecord, Scope};
use crate::store::{Collection, DataStore};
use chrono::NaiveDate;

#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    /// Case-insensitive substring of the product name.
    pub product: Option<String>,
    /// Inclusive lower bound on the movement date.
    pub since: Option<NaiveDate>,
}

impl MovementFilter {
    fn matches(&self, record: &MovementRecord) -> bool {
        let product_ok = match &self.product {
            Some(p) => normalize_name(&record.product_name).contains(&normalize_name(p)),
            None => true,
        };
        let date_ok = self.since.map_or(true, |since| record.date >= since);
        product_ok && date_ok
    }
}

pub fn run<S: DataStore>(store: &S, scope: Scope, filter: &MovementFilter) -> Result<CmdResult> {
    let mut warnings = Vec::new();
    let all = take_loaded(
        store.load_movements(scope)?,
        Collection::Movements,
        &mut warnings,
    );

    let movements: Vec<MovementRecord> = all.into_iter().filter(|m| filter.matches(m)).collect();

    let mut result = CmdResult::default();
    result.extend_messages(warnings);
    if movements.is_empty() {
        result.add_message(CmdMessage::info("No movements."));
    }
    Ok(result.with_movements(movements))
}
