//! # Lenient Field Decoding
//!
//! The data files are hand-editable and several generations of the forms wrote
//! them, so the same field can show up in different JSON types:
//!
//! - quantities and costs as numbers (`12.5`), numeric strings (`"12,5"`, `"12.5"`),
//!   empty strings or `null`
//! - lots and units as strings, bare numbers (`2023`) or `null`
//!
//! These serde helpers accept all of the above and always write the canonical
//! form back: decimals as JSON numbers, text as JSON strings. Anything that
//! cannot be coerced (e.g. `"abc"` as a quantity) is a deserialization error,
//! which the store reports as a corrupt file.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a user- or file-supplied decimal. Accepts `,` as decimal separator.
/// Blank input is zero.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(&trimmed.replace(',', ".")).ok()
}

/// `clap` value parser for quantities and costs.
pub fn parse_decimal_arg(raw: &str) -> Result<Decimal, String> {
    parse_decimal(raw).ok_or_else(|| format!("'{}' is not a number", raw))
}

pub mod decimal {
    use super::parse_decimal;
    use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
    use rust_decimal::Decimal;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(Decimal::ZERO),
            Some(Raw::Number(n)) => Decimal::from_f64(n)
                .ok_or_else(|| D::Error::custom(format!("number out of range: {}", n))),
            Some(Raw::Text(s)) => {
                parse_decimal(&s).ok_or_else(|| D::Error::custom(format!("not a number: {:?}", s)))
            }
        }
    }

    pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value.normalize().to_f64() {
            Some(f) => serializer.serialize_f64(f),
            None => serializer.serialize_str(&value.to_string()),
        }
    }
}

pub mod text {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
        Flag(bool),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Raw>::deserialize(deserializer)? {
            None => String::new(),
            Some(Raw::Text(s)) => s,
            Some(Raw::Integer(i)) => i.to_string(),
            Some(Raw::Float(f)) => f.to_string(),
            Some(Raw::Flag(b)) => b.to_string(),
        })
    }

    pub fn serialize<S>(value: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Row {
        #[serde(default, with = "super::decimal")]
        qty: Decimal,
        #[serde(default, with = "super::text")]
        lot: String,
    }

    fn row(json: &str) -> Row {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_decimal_accepts_comma_separator() {
        assert_eq!(parse_decimal("12,5"), Some(dec!(12.5)));
        assert_eq!(parse_decimal(" 3.25 "), Some(dec!(3.25)));
        assert_eq!(parse_decimal(""), Some(Decimal::ZERO));
        assert_eq!(parse_decimal("dodici"), None);
    }

    #[test]
    fn test_parse_decimal_arg_reports_bad_input() {
        assert!(parse_decimal_arg("x").unwrap_err().contains("'x'"));
    }

    #[test]
    fn test_decimal_from_number_string_and_null() {
        assert_eq!(row(r#"{"qty": 0.8}"#).qty, dec!(0.8));
        assert_eq!(row(r#"{"qty": 100}"#).qty, dec!(100));
        assert_eq!(row(r#"{"qty": "7,25"}"#).qty, dec!(7.25));
        assert_eq!(row(r#"{"qty": null}"#).qty, Decimal::ZERO);
        assert_eq!(row(r#"{}"#).qty, Decimal::ZERO);
    }

    #[test]
    fn test_decimal_rejects_garbage() {
        let parsed: Result<Row, _> = serde_json::from_str(r#"{"qty": "molto"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_text_from_number_and_null() {
        assert_eq!(row(r#"{"lot": 2023}"#).lot, "2023");
        assert_eq!(row(r#"{"lot": null}"#).lot, "");
        assert_eq!(row(r#"{"lot": "A1"}"#).lot, "A1");
    }

    #[test]
    fn test_decimal_written_as_json_number() {
        let json = serde_json::to_value(Row {
            qty: dec!(70.000),
            lot: "L1".into(),
        })
        .unwrap();
        assert_eq!(json["qty"], serde_json::json!(70.0));
        assert_eq!(json["lot"], serde_json::json!("L1"));
    }
}
