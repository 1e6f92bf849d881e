//! # Data Model
//!
//! Every record here maps 1:1 onto an object in one of the JSON files. Serde
//! names follow the on-disk (Italian) keys so files written by earlier versions
//! of the logbook keep loading; Rust-side names describe what the field is.
//!
//! Legacy aliases are resolved here, at deserialization time, so nothing past
//! the store ever has to know that a product used to be called `nome`.

use crate::coerce;
use crate::error::QuadernoError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Project,
    Global,
}

/// Normalized identity of a stock line: (product, lot, unit).
///
/// Product and unit compare case-insensitively; all three are trimmed. An
/// empty lot means "no lot" and is a valid, distinct identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StockKey {
    product: String,
    lot: String,
    unit: String,
}

impl StockKey {
    pub fn new(product: &str, lot: &str, unit: &str) -> Self {
        Self {
            product: normalize_name(product),
            lot: lot.trim().to_string(),
            unit: normalize_name(unit),
        }
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn lot(&self) -> &str {
        &self.lot
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }
}

impl fmt::Display for StockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.product)?;
        if !self.lot.is_empty() {
            write!(f, " [lotto {}]", self.lot)?;
        }
        write!(f, " ({})", self.unit)
    }
}

/// Case-folded, trimmed form used for product and unit comparisons.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// One row of the warehouse table (`magazzino.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLine {
    #[serde(rename = "prodotto", alias = "nome", with = "coerce::text")]
    pub product_name: String,

    #[serde(rename = "lotto", default, with = "coerce::text")]
    pub lot: String,

    #[serde(rename = "unita", default, with = "coerce::text")]
    pub unit: String,

    #[serde(rename = "giacenza", default, with = "coerce::decimal")]
    pub quantity_on_hand: Decimal,

    #[serde(rename = "costo_unitario", default, with = "coerce::decimal")]
    pub unit_cost: Decimal,

    /// Keys this version does not know about, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StockLine {
    pub fn new(product_name: &str, lot: &str, unit: &str) -> Self {
        Self {
            product_name: product_name.trim().to_string(),
            lot: lot.trim().to_string(),
            unit: unit.trim().to_string(),
            quantity_on_hand: Decimal::ZERO,
            unit_cost: Decimal::ZERO,
            extra: Map::new(),
        }
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity_on_hand = quantity;
        self
    }

    pub fn with_unit_cost(mut self, unit_cost: Decimal) -> Self {
        self.unit_cost = unit_cost;
        self
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(&self.product_name, &self.lot, &self.unit)
    }

    /// Balance times unit cost.
    pub fn value(&self) -> crate::error::Result<Decimal> {
        self.quantity_on_hand
            .checked_mul(self.unit_cost)
            .ok_or_else(|| {
                QuadernoError::invalid(format!("stock value of {} is out of range", self.key()))
            })
    }
}

/// One entry of the movement log (`movimenti.json`). Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRecord {
    #[serde(rename = "data")]
    pub date: NaiveDate,

    #[serde(rename = "prodotto", alias = "nome", with = "coerce::text")]
    pub product_name: String,

    #[serde(rename = "lotto", default, with = "coerce::text")]
    pub lot: String,

    #[serde(rename = "unita", default, with = "coerce::text")]
    pub unit: String,

    /// Positive = into stock, negative = out of stock. Always the requested
    /// amount, even when the balance was clamped.
    #[serde(rename = "quantita", with = "coerce::decimal")]
    pub signed_quantity: Decimal,

    #[serde(rename = "operatore", default, with = "coerce::text")]
    pub operator: String,

    #[serde(default, with = "coerce::text")]
    pub note: String,
}

impl MovementRecord {
    pub fn key(&self) -> StockKey {
        StockKey::new(&self.product_name, &self.lot, &self.unit)
    }
}

/// Which way a manual return moves goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnDirection {
    /// Goods coming back into the warehouse (e.g. unused field material).
    IntoStock,
    /// Goods sent back to the supplier.
    OutOfStock,
}

/// How `upsert_stock_line` treats an existing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertMode {
    AddToExisting,
    ReplaceExisting,
}

/// A pesticide treatment (`trattamenti.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentRecord {
    #[serde(rename = "data")]
    pub date: NaiveDate,

    #[serde(rename = "campo", default, with = "coerce::text")]
    pub field: String,

    #[serde(rename = "prodotto", alias = "nome", with = "coerce::text")]
    pub product_name: String,

    #[serde(rename = "dose_l_ha", default, with = "coerce::decimal")]
    pub dose_per_hectare: Decimal,

    #[serde(rename = "ettari", default, with = "coerce::decimal")]
    pub hectares: Decimal,

    #[serde(rename = "operatore", default, with = "coerce::text")]
    pub operator: String,

    #[serde(default, with = "coerce::text")]
    pub note: String,

    #[serde(
        rename = "lotto",
        default,
        with = "coerce::text",
        skip_serializing_if = "String::is_empty"
    )]
    pub lot: String,

    #[serde(
        rename = "unita",
        default,
        with = "coerce::text",
        skip_serializing_if = "String::is_empty"
    )]
    pub unit: String,
}

/// A fertilization (`fertilizzazioni.json`). Same shape as a treatment with
/// the dose in kg/ha.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizationRecord {
    #[serde(rename = "data")]
    pub date: NaiveDate,

    #[serde(rename = "campo", default, with = "coerce::text")]
    pub field: String,

    #[serde(rename = "prodotto", alias = "nome", with = "coerce::text")]
    pub product_name: String,

    #[serde(rename = "dose_kg_ha", default, with = "coerce::decimal")]
    pub dose_per_hectare: Decimal,

    #[serde(rename = "ettari", default, with = "coerce::decimal")]
    pub hectares: Decimal,

    #[serde(rename = "operatore", default, with = "coerce::text")]
    pub operator: String,

    #[serde(default, with = "coerce::text")]
    pub note: String,

    #[serde(
        rename = "lotto",
        default,
        with = "coerce::text",
        skip_serializing_if = "String::is_empty"
    )]
    pub lot: String,

    #[serde(
        rename = "unita",
        default,
        with = "coerce::text",
        skip_serializing_if = "String::is_empty"
    )]
    pub unit: String,
}

/// Common view over the two kinds of field application, so the recording
/// command can treat them alike.
pub trait FieldApplication {
    /// Label used in movement notes and messages ("Trattamento", ...).
    const LABEL: &'static str;

    fn date(&self) -> NaiveDate;
    fn field(&self) -> &str;
    fn product_name(&self) -> &str;
    fn dose_per_hectare(&self) -> Decimal;
    fn hectares(&self) -> Decimal;
    fn operator(&self) -> &str;
    fn lot(&self) -> &str;
    fn unit(&self) -> &str;
    fn set_operator(&mut self, operator: String);

    /// Trim every free-text field.
    fn trim_text(&mut self);

    /// Quantity drawn from the warehouse: dose × hectares.
    fn quantity_used(&self) -> crate::error::Result<Decimal> {
        self.dose_per_hectare()
            .checked_mul(self.hectares())
            .ok_or_else(|| {
                QuadernoError::invalid(format!(
                    "{} × {} ha is out of range",
                    self.dose_per_hectare(),
                    self.hectares()
                ))
            })
    }
}

macro_rules! impl_field_application {
    ($ty:ty, $label:expr) => {
        impl FieldApplication for $ty {
            const LABEL: &'static str = $label;

            fn date(&self) -> NaiveDate {
                self.date
            }
            fn field(&self) -> &str {
                &self.field
            }
            fn product_name(&self) -> &str {
                &self.product_name
            }
            fn dose_per_hectare(&self) -> Decimal {
                self.dose_per_hectare
            }
            fn hectares(&self) -> Decimal {
                self.hectares
            }
            fn operator(&self) -> &str {
                &self.operator
            }
            fn lot(&self) -> &str {
                &self.lot
            }
            fn unit(&self) -> &str {
                &self.unit
            }
            fn set_operator(&mut self, operator: String) {
                self.operator = operator;
            }
            fn trim_text(&mut self) {
                for text in [
                    &mut self.field,
                    &mut self.product_name,
                    &mut self.operator,
                    &mut self.note,
                    &mut self.lot,
                    &mut self.unit,
                ] {
                    *text = text.trim().to_string();
                }
            }
        }
    };
}

impl_field_application!(TreatmentRecord, "Trattamento");
impl_field_application!(FertilizationRecord, "Fertilizzazione");

/// Farm registry data (`azienda.json`). Single record, no history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(default, with = "coerce::text")]
    pub ragione_sociale: String,
    #[serde(default, with = "coerce::text")]
    pub piva: String,
    #[serde(default, with = "coerce::text")]
    pub indirizzo: String,
    #[serde(default, with = "coerce::text")]
    pub telefono: String,
    #[serde(default, with = "coerce::text")]
    pub email: String,
}

/// Partial update for [`CompanyProfile`]; `None` leaves a field as stored.
#[derive(Debug, Clone, Default)]
pub struct CompanyUpdate {
    pub ragione_sociale: Option<String>,
    pub piva: Option<String>,
    pub indirizzo: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
}

impl CompanyProfile {
    pub fn apply(&mut self, update: CompanyUpdate) {
        let fields = [
            (&mut self.ragione_sociale, update.ragione_sociale),
            (&mut self.piva, update.piva),
            (&mut self.indirizzo, update.indirizzo),
            (&mut self.telefono, update.telefono),
            (&mut self.email, update.email),
        ];
        for (slot, value) in fields {
            if let Some(v) = value {
                *slot = v.trim().to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_stock_key_ignores_case_and_padding() {
        let a = StockKey::new(" Urea ", "", "KG");
        let b = StockKey::new("urea", "", "kg");
        assert_eq!(a, b);
    }

    #[test]
    fn test_stock_key_lot_is_part_of_identity() {
        assert_ne!(
            StockKey::new("Rame", "L1", "kg"),
            StockKey::new("Rame", "", "kg")
        );
    }

    #[test]
    fn test_stock_key_display() {
        assert_eq!(StockKey::new("Rame", "L1", "kg").to_string(), "rame [lotto L1] (kg)");
        assert_eq!(StockKey::new("Urea", "", "kg").to_string(), "urea (kg)");
    }

    #[test]
    fn test_stock_line_reads_legacy_nome_alias() {
        let line: StockLine = serde_json::from_str(
            r#"{"nome": "Zolfo", "lotto": "", "unita": "kg", "giacenza": 12, "costo_unitario": 1.5}"#,
        )
        .unwrap();
        assert_eq!(line.product_name, "Zolfo");
        assert_eq!(line.quantity_on_hand, dec!(12));
        assert_eq!(line.unit_cost, dec!(1.5));
    }

    #[test]
    fn test_stock_line_writes_canonical_keys_and_keeps_extras() {
        let line: StockLine = serde_json::from_str(
            r#"{"nome": "Zolfo", "unita": "kg", "giacenza": "3", "fornitore": "Agri Srl"}"#,
        )
        .unwrap();
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["prodotto"], "Zolfo");
        assert_eq!(json["fornitore"], "Agri Srl");
        assert!(json.get("nome").is_none());
    }

    #[test]
    fn test_movement_record_keys() {
        let record = MovementRecord {
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            product_name: "Urea".into(),
            lot: String::new(),
            unit: "kg".into(),
            signed_quantity: dec!(-30),
            operator: "Mario".into(),
            note: String::new(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["data"], "2024-05-02");
        assert_eq!(json["quantita"], serde_json::json!(-30.0));
        assert_eq!(json["operatore"], "Mario");
    }

    #[test]
    fn test_treatment_quantity_used() {
        let t: TreatmentRecord = serde_json::from_str(
            r#"{"data": "2024-04-10", "campo": "Vigna Nord", "prodotto": "Rame", "dose_l_ha": 2.5, "ettari": 1.2, "operatore": "", "note": ""}"#,
        )
        .unwrap();
        assert_eq!(t.quantity_used().unwrap(), dec!(3.0));
        assert_eq!(TreatmentRecord::LABEL, "Trattamento");
    }

    #[test]
    fn test_quantity_used_out_of_range_is_invalid() {
        let t: TreatmentRecord = serde_json::from_str(
            r#"{"data": "2024-04-10", "campo": "A", "prodotto": "Rame", "dose_l_ha": "70000000000000000000000000000", "ettari": 10}"#,
        )
        .unwrap();
        assert!(matches!(t.quantity_used(), Err(QuadernoError::InvalidInput(_))));
    }

    #[test]
    fn test_stock_value_out_of_range_is_invalid() {
        let line = StockLine::new("Urea", "", "kg")
            .with_quantity(dec!(100000000000000000000))
            .with_unit_cost(dec!(10000000000));
        assert!(matches!(line.value(), Err(QuadernoError::InvalidInput(_))));
        let small = StockLine::new("Urea", "", "kg")
            .with_quantity(dec!(100))
            .with_unit_cost(dec!(0.8));
        assert_eq!(small.value().unwrap(), dec!(80));
    }

    #[test]
    fn test_trim_text_trims_every_field() {
        let mut t: TreatmentRecord = serde_json::from_str(
            r#"{"data": "2024-04-10", "campo": " Vigna Nord ", "prodotto": "Rame  ", "dose_l_ha": 1, "ettari": 1, "operatore": " Anna", "note": " pioggia ", "lotto": " L1 ", "unita": "kg "}"#,
        )
        .unwrap();
        t.trim_text();
        assert_eq!(t.field, "Vigna Nord");
        assert_eq!(t.product_name, "Rame");
        assert_eq!(t.operator, "Anna");
        assert_eq!(t.note, "pioggia");
        assert_eq!(t.lot, "L1");
        assert_eq!(t.unit, "kg");
    }

    #[test]
    fn test_treatment_omits_empty_lot_and_unit() {
        let t: TreatmentRecord = serde_json::from_str(
            r#"{"data": "2024-04-10", "campo": "A", "prodotto": "Rame", "dose_l_ha": 1, "ettari": 1}"#,
        )
        .unwrap();
        let json = serde_json::to_value(&t).unwrap();
        assert!(json.get("lotto").is_none());
        assert!(json.get("unita").is_none());
    }

    #[test]
    fn test_company_apply_merges_given_fields() {
        let mut profile = CompanyProfile {
            ragione_sociale: "Az. Agricola Rossi".into(),
            email: "info@rossi.it".into(),
            ..Default::default()
        };
        profile.apply(CompanyUpdate {
            telefono: Some(" 0331 123456 ".into()),
            ..Default::default()
        });
        assert_eq!(profile.ragione_sociale, "Az. Agricola Rossi");
        assert_eq!(profile.telefono, "0331 123456");
        assert_eq!(profile.email, "info@rossi.it");
    }
}
