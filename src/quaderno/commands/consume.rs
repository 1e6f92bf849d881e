use crate::commands::helpers::{commit_ledger, open_ledger};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::ledger::{ConsumeRequest, ConsumeResult};
use crate::model::Scope;
use crate::store::DataStore;
use tracing::warn;

pub fn run<S: DataStore>(store: &mut S, scope: Scope, request: ConsumeRequest) -> Result<CmdResult> {
    let mut open = open_ledger(store, scope)?;
    let outcome = open.ledger.consume(&request)?;
    commit_ledger(store, scope, &open)?;

    let mut result = CmdResult::default();
    result.extend_messages(open.warnings);
    result.extend_messages(outcome_messages(&request, &outcome));
    Ok(result.with_consumption(outcome))
}

/// Messages for a consume outcome, shared with the application commands.
pub fn outcome_messages(request: &ConsumeRequest, outcome: &ConsumeResult) -> Vec<CmdMessage> {
    let product = request.product_name.trim();
    if !outcome.found {
        warn!(product, "product not in stock, nothing deducted");
        return vec![CmdMessage::warning(format!(
            "{} is not in stock; nothing was deducted",
            product
        ))];
    }
    if !outcome.applied {
        return vec![CmdMessage::info(format!(
            "Nothing to deduct for {} (quantity {})",
            product,
            request.quantity.normalize()
        ))];
    }

    let mut messages = vec![CmdMessage::success(format!(
        "Deducted {} of {}: {} left",
        outcome.applied_quantity.normalize(),
        product,
        outcome.new_balance.normalize()
    ))];
    if outcome.clamped(request.quantity) {
        messages.push(CmdMessage::warning(format!(
            "Requested {} but only {} was in stock; balance set to 0",
            request.quantity.normalize(),
            outcome.applied_quantity.normalize()
        )));
    }
    messages
}
