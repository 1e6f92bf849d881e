//! # Inventory Ledger
//!
//! The ledger owns two collections and keeps them consistent with each other:
//!
//! - the **stock table**: one [`StockLine`] per (product, lot, unit) key, in
//!   insertion order
//! - the **movement log**: append-only [`MovementRecord`]s, one per stock
//!   change caused by a field application or a manual return
//!
//! ## Balances
//!
//! Balances are maintained incrementally and floored at zero. A deduction
//! larger than the balance empties the line; it never errors and never goes
//! negative. The movement log, in contrast, always records the *requested*
//! delta: the log keeps demand, the balance keeps what is physically there.
//! Balances are rounded to [`QUANTITY_DP`] fractional digits.
//!
//! ## Matching
//!
//! | Operation            | Lookup                                            | Missing key             |
//! |----------------------|---------------------------------------------------|-------------------------|
//! | `consume`            | unit/lot match first, then by name alone          | `found: false`, no-op   |
//! | `return_stock`       | exact key                                         | zero-balance line added |
//! | `upsert_stock_line`  | exact key                                         | line inserted           |
//! | `relabel`            | exact key                                         | `InvalidInput`          |
//!
//! ## Persistence
//!
//! The ledger is pure in-memory state. Callers load it from the store, run one
//! operation, and persist whichever collections changed (see
//! `commands::helpers`). Mutations touch both in-memory collections before
//! either file is written.

use crate::error::{QuadernoError, Result};
use crate::model::{
    normalize_name, MovementRecord, ReturnDirection, StockKey, StockLine, UpsertMode,
};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info};

/// Fractional digits kept on stock balances.
pub const QUANTITY_DP: u32 = 3;

pub fn round_quantity(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(QUANTITY_DP, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

fn clamp_balance(value: Decimal) -> Decimal {
    round_quantity(value.max(Decimal::ZERO))
}

fn in_range(value: Option<Decimal>, key: &StockKey) -> Result<Decimal> {
    value.ok_or_else(|| QuadernoError::invalid(format!("balance of {} is out of range", key)))
}

/// Draw `quantity` of a product out of stock for a field application.
#[derive(Debug, Clone)]
pub struct ConsumeRequest {
    pub product_name: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub lot: Option<String>,
    pub date: NaiveDate,
    pub operator: String,
    pub note: String,
}

impl ConsumeRequest {
    pub fn new(product_name: impl Into<String>, quantity: Decimal, date: NaiveDate) -> Self {
        Self {
            product_name: product_name.into(),
            quantity,
            unit: None,
            lot: None,
            date,
            operator: String::new(),
            note: String::new(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_lot(mut self, lot: impl Into<String>) -> Self {
        self.lot = Some(lot.into());
        self
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = operator.into();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// Outcome of [`InventoryLedger::consume`].
///
/// `found: false` is the "product not found" warning signal, not an error.
/// `applied` is false when nothing was deducted and nothing was logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumeResult {
    pub found: bool,
    pub applied: bool,
    /// What actually left the balance (less than requested when clamped).
    pub applied_quantity: Decimal,
    pub new_balance: Decimal,
    /// The matched line's key, when one matched.
    pub key: Option<StockKey>,
}

impl ConsumeResult {
    fn not_found() -> Self {
        Self {
            found: false,
            applied: false,
            applied_quantity: Decimal::ZERO,
            new_balance: Decimal::ZERO,
            key: None,
        }
    }

    /// True when the requested amount exceeded the balance.
    pub fn clamped(&self, requested: Decimal) -> bool {
        self.applied && self.applied_quantity < requested
    }
}

/// A manual stock adjustment.
#[derive(Debug, Clone)]
pub struct ReturnRequest {
    pub product_name: String,
    pub lot: String,
    pub unit: String,
    pub quantity: Decimal,
    pub date: NaiveDate,
    pub operator: String,
    pub note: String,
    pub direction: ReturnDirection,
}

/// Direct warehouse edit. Never logged as a movement.
#[derive(Debug, Clone)]
pub struct UpsertRequest {
    pub product_name: String,
    pub lot: String,
    pub unit: String,
    pub quantity_delta: Decimal,
    pub unit_cost: Decimal,
    pub mode: UpsertMode,
}

#[derive(Debug, Default, Clone)]
pub struct InventoryLedger {
    lines: Vec<StockLine>,
    movements: Vec<MovementRecord>,
    stock_changed: bool,
    movements_appended: usize,
}

impl InventoryLedger {
    pub fn new(lines: Vec<StockLine>, movements: Vec<MovementRecord>) -> Self {
        Self {
            lines,
            movements,
            stock_changed: false,
            movements_appended: 0,
        }
    }

    pub fn lines(&self) -> &[StockLine] {
        &self.lines
    }

    pub fn movements(&self) -> &[MovementRecord] {
        &self.movements
    }

    /// Whether the stock table differs from what was loaded.
    pub fn stock_changed(&self) -> bool {
        self.stock_changed
    }

    /// Number of movements appended since load.
    pub fn movements_appended(&self) -> usize {
        self.movements_appended
    }

    pub fn into_parts(self) -> (Vec<StockLine>, Vec<MovementRecord>) {
        (self.lines, self.movements)
    }

    pub fn find(&self, key: &StockKey) -> Option<&StockLine> {
        self.position(key).map(|idx| &self.lines[idx])
    }

    fn position(&self, key: &StockKey) -> Option<usize> {
        self.lines.iter().position(|line| &line.key() == key)
    }

    /// Pick the line a consumption draws from.
    ///
    /// Lines matching the product name plus whichever of unit and lot were
    /// given come first. When none do, any line with the product name
    /// qualifies. Among several candidates the first with a positive balance
    /// wins, else the first in table order.
    fn select_for_consumption(
        &self,
        product: &str,
        unit: Option<&str>,
        lot: Option<&str>,
    ) -> Option<usize> {
        let product = normalize_name(product);
        let unit = unit.map(normalize_name);
        let lot = lot.map(|l| l.trim().to_string());

        let by_name: Vec<(usize, StockKey)> = self
            .lines
            .iter()
            .enumerate()
            .map(|(idx, line)| (idx, line.key()))
            .filter(|(_, key)| key.product() == product)
            .collect();

        let exact: Vec<usize> = by_name
            .iter()
            .filter(|(_, key)| {
                unit.as_deref().map_or(true, |u| key.unit() == u)
                    && lot.as_deref().map_or(true, |l| key.lot() == l)
            })
            .map(|(idx, _)| *idx)
            .collect();

        let candidates = if exact.is_empty() {
            if !by_name.is_empty() {
                debug!(product = %product, "consume: no unit/lot match, falling back to name");
            }
            by_name.into_iter().map(|(idx, _)| idx).collect()
        } else {
            exact
        };

        candidates
            .iter()
            .copied()
            .find(|&idx| self.lines[idx].quantity_on_hand > Decimal::ZERO)
            .or_else(|| candidates.first().copied())
    }

    fn append(&mut self, record: MovementRecord) {
        self.movements.push(record);
        self.movements_appended += 1;
    }

    /// Deduct stock for a treatment or fertilization.
    pub fn consume(&mut self, request: &ConsumeRequest) -> Result<ConsumeResult> {
        let product = request.product_name.trim();
        if product.is_empty() {
            return Err(QuadernoError::invalid("product name cannot be empty"));
        }

        let Some(idx) = self.select_for_consumption(
            product,
            request.unit.as_deref(),
            request.lot.as_deref(),
        ) else {
            debug!(product, "consume: no matching stock line");
            return Ok(ConsumeResult::not_found());
        };

        let line = &self.lines[idx];
        let key = line.key();
        let current = line.quantity_on_hand;

        if request.quantity <= Decimal::ZERO {
            return Ok(ConsumeResult {
                found: true,
                applied: false,
                applied_quantity: Decimal::ZERO,
                new_balance: current,
                key: Some(key),
            });
        }

        let new_balance = clamp_balance(in_range(current.checked_sub(request.quantity), &key)?);
        let applied_quantity = (current - new_balance).max(Decimal::ZERO);
        let record = MovementRecord {
            date: request.date,
            product_name: line.product_name.clone(),
            lot: line.lot.clone(),
            unit: line.unit.clone(),
            signed_quantity: -request.quantity,
            operator: request.operator.trim().to_string(),
            note: request.note.trim().to_string(),
        };

        self.lines[idx].quantity_on_hand = new_balance;
        self.stock_changed = true;
        self.append(record);

        info!(
            key = %key,
            requested = %request.quantity,
            applied = %applied_quantity,
            balance = %new_balance,
            "stock consumed"
        );

        Ok(ConsumeResult {
            found: true,
            applied: true,
            applied_quantity,
            new_balance,
            key: Some(key),
        })
    }

    /// Record a manual return. Creates the line when the key is new.
    pub fn return_stock(&mut self, request: &ReturnRequest) -> Result<StockLine> {
        let product = request.product_name.trim();
        if product.is_empty() {
            return Err(QuadernoError::invalid("product name cannot be empty"));
        }
        if request.quantity <= Decimal::ZERO {
            return Err(QuadernoError::invalid(format!(
                "return quantity must be positive, got {}",
                request.quantity
            )));
        }

        let key = StockKey::new(product, &request.lot, &request.unit);
        let idx = match self.position(&key) {
            Some(idx) => idx,
            None => {
                debug!(key = %key, "return: creating stock line");
                self.lines
                    .push(StockLine::new(product, &request.lot, &request.unit));
                self.lines.len() - 1
            }
        };

        let signed_delta = match request.direction {
            ReturnDirection::IntoStock => request.quantity,
            ReturnDirection::OutOfStock => -request.quantity,
        };

        let line = &mut self.lines[idx];
        line.quantity_on_hand =
            clamp_balance(in_range(line.quantity_on_hand.checked_add(signed_delta), &key)?);
        let updated = line.clone();
        self.stock_changed = true;

        self.append(MovementRecord {
            date: request.date,
            product_name: updated.product_name.clone(),
            lot: updated.lot.clone(),
            unit: updated.unit.clone(),
            signed_quantity: signed_delta,
            operator: request.operator.trim().to_string(),
            note: request.note.trim().to_string(),
        });

        info!(key = %key, delta = %signed_delta, balance = %updated.quantity_on_hand, "stock returned");
        Ok(updated)
    }

    /// Insert or edit a warehouse line directly.
    pub fn upsert_stock_line(&mut self, request: &UpsertRequest) -> Result<StockLine> {
        let product = request.product_name.trim();
        if product.is_empty() {
            return Err(QuadernoError::invalid("product name cannot be empty"));
        }
        if request.unit_cost < Decimal::ZERO {
            return Err(QuadernoError::invalid(format!(
                "unit cost cannot be negative, got {}",
                request.unit_cost
            )));
        }

        let key = StockKey::new(product, &request.lot, &request.unit);
        let replacement = StockLine::new(product, &request.lot, &request.unit)
            .with_quantity(clamp_balance(request.quantity_delta))
            .with_unit_cost(request.unit_cost);

        let updated = match (self.position(&key), request.mode) {
            (None, _) => {
                self.lines.push(replacement.clone());
                replacement
            }
            (Some(idx), UpsertMode::AddToExisting) => {
                let line = &mut self.lines[idx];
                line.quantity_on_hand = clamp_balance(in_range(
                    line.quantity_on_hand.checked_add(request.quantity_delta),
                    &key,
                )?);
                if !request.unit_cost.is_zero() {
                    line.unit_cost = request.unit_cost;
                }
                line.clone()
            }
            (Some(idx), UpsertMode::ReplaceExisting) => {
                self.lines[idx] = replacement.clone();
                replacement
            }
        };

        self.stock_changed = true;
        info!(key = %key, mode = ?request.mode, balance = %updated.quantity_on_hand, "stock line saved");
        Ok(updated)
    }

    /// Move a line to a new lot and/or unit, keeping its balance and cost.
    ///
    /// This is the only way to change a line's identity. The target key must
    /// be free, so two lines never merge silently.
    pub fn relabel(&mut self, from: &StockKey, new_lot: &str, new_unit: &str) -> Result<StockLine> {
        let idx = self
            .position(from)
            .ok_or_else(|| QuadernoError::invalid(format!("no stock line {}", from)))?;

        let target = StockKey::new(from.product(), new_lot, new_unit);
        if &target != from && self.position(&target).is_some() {
            return Err(QuadernoError::invalid(format!(
                "stock line {} already exists",
                target
            )));
        }

        let line = &mut self.lines[idx];
        line.lot = new_lot.trim().to_string();
        line.unit = new_unit.trim().to_string();
        let updated = line.clone();
        self.stock_changed = true;
        info!(from = %from, to = %target, "stock line relabelled");
        Ok(updated)
    }

    /// Keys that appear on more than one line. Only legacy files can contain
    /// these; every mutation here preserves uniqueness.
    pub fn duplicate_keys(&self) -> Vec<StockKey> {
        let mut seen = std::collections::HashSet::new();
        let mut dups = Vec::new();
        for line in &self.lines {
            let key = line.key();
            if !seen.insert(key.clone()) && !dups.contains(&key) {
                dups.push(key);
            }
        }
        dups
    }
}
