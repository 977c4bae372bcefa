// dsv_value.rs
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

use crate::error::{Error, Result};

/// A single cell after type coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    /// An empty cell in a typed column. Renders as an empty string.
    Absent,
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Numeric view used by range filtering. Strings never count as numbers here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            Value::Str(_) | Value::Absent => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numbers, and strings made only of decimal digits (any script), line up on
    /// the right in tables.
    pub fn is_right_aligned(&self) -> bool {
        match self {
            Value::Int(_) | Value::Float(_) => true,
            Value::Str(s) => {
                !s.is_empty()
                    && s.chars()
                        .all(|c| c.general_category() == GeneralCategory::DecimalNumber)
            }
            Value::Absent => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Absent => Ok(()),
        }
    }
}

// Shortest round-trip digits. Plain notation for exponents -4..16 (with ".0" on
// integral values), otherwise `1.5e+16` / `1e-05` style.
fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        let text = if x > 0.0 { "inf" } else { "-inf" };
        return text.to_string();
    }

    // `{:e}` yields the shortest digits, e.g. "-9.16e2".
    let sci = format!("{x:e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return sci;
    };
    if !(-4..16).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exp.unsigned_abs());
    }

    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let body = if exp < 0 {
        format!("0.{}{digits}", "0".repeat(exp.unsigned_abs() as usize - 1))
    } else {
        let point = exp as usize + 1;
        if digits.len() <= point {
            format!("{digits}{}.0", "0".repeat(point - digits.len()))
        } else {
            format!("{}.{}", &digits[..point], &digits[point..])
        }
    };
    format!("{sign}{body}")
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Absent, Into::into)
    }
}

/// Target type of a column named in a [`TypeMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int,
    Float,
}

impl FieldType {
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Int => "integer",
            FieldType::Float => "float",
        }
    }

    /// Blank cells become [`Value::Absent`] without being parsed. Otherwise
    /// surrounding whitespace is ignored and `_` may group digits (`1_000`);
    /// a cell of only whitespace is still invalid.
    pub fn coerce(self, field: &str, raw: &str, line: usize) -> Result<Value> {
        if raw.is_empty() {
            return Ok(Value::Absent);
        }
        let parsed = without_digit_separators(raw.trim()).and_then(|text| match self {
            FieldType::Int => text.parse::<i64>().ok().map(Value::Int),
            FieldType::Float => text.parse::<f64>().ok().map(Value::Float),
        });
        parsed.ok_or_else(|| Error::Coercion {
            line,
            field: field.to_string(),
            raw: raw.to_string(),
            expected: self.name(),
        })
    }
}

// Every `_` must sit between two digits.
fn without_digit_separators(text: &str) -> Option<Cow<'_, str>> {
    if !text.contains('_') {
        return Some(Cow::Borrowed(text));
    }
    let bytes = text.as_bytes();
    let is_digit_at = |idx: Option<usize>| idx.and_then(|i| bytes.get(i)).is_some_and(u8::is_ascii_digit);
    let grouped = text
        .match_indices('_')
        .all(|(idx, _)| is_digit_at(idx.checked_sub(1)) && is_digit_at(Some(idx + 1)));
    grouped.then(|| Cow::Owned(text.replace('_', "")))
}

pub type TypeMap = BTreeMap<String, FieldType>;

pub(crate) fn ensure_unique(fieldnames: &[String]) -> Result<()> {
    for (idx, name) in fieldnames.iter().enumerate() {
        if fieldnames[..idx].contains(name) {
            return Err(Error::DuplicateField {
                field: name.clone(),
            });
        }
    }
    Ok(())
}

/// One data line keyed by field name. Keeps insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs names with cells by position; the shorter side decides the length.
    pub fn from_row(fieldnames: &[String], cells: Vec<String>) -> Self {
        let entries = fieldnames
            .iter()
            .cloned()
            .zip(cells.into_iter().map(Value::Str))
            .collect();
        Self { entries }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Replaces the value in place when the field exists, appends otherwise.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        match self.get_mut(&field) {
            Some(slot) => *slot = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Applies `type_map` in place. Fields the record does not carry are skipped.
    pub fn coerce(&mut self, type_map: &TypeMap, line: usize) -> Result<()> {
        for (field, field_type) in type_map {
            let coerced = match self.get(field) {
                Some(Value::Str(raw)) => field_type.coerce(field, raw, line)?,
                _ => continue,
            };
            if let Some(slot) = self.get_mut(field) {
                *slot = coerced;
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn floats_keep_their_fraction() {
        assert_eq!(Value::Float(100000.0).to_string(), "100000.0");
        assert_eq!(Value::Float(0.0).to_string(), "0.0");
        assert_eq!(Value::Float(-7.4).to_string(), "-7.4");
        assert_eq!(Value::Float(54.81667).to_string(), "54.81667");
        assert_eq!(Value::Float(f64::INFINITY).to_string(), "inf");
        assert_eq!(Value::Float(0.0001).to_string(), "0.0001");
        assert_eq!(Value::Float(123456789.125).to_string(), "123456789.125");
        assert_eq!(Value::Int(-74).to_string(), "-74");
        assert_eq!(Value::Absent.to_string(), "");
    }

    #[test]
    fn blank_cells_skip_coercion() {
        assert_eq!(
            FieldType::Float.coerce("mass (g)", "", 3).unwrap(),
            Value::Absent
        );
        assert_eq!(
            FieldType::Int.coerce("year", "2013", 3).unwrap(),
            Value::Int(2013)
        );
    }

    #[test]
    fn malformed_number_reports_field_and_line() {
        let err = FieldType::Float.coerce("mass (g)", "abc", 7).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        let msg = err.to_string();
        assert!(msg.contains("line 7"), "{msg}");
        assert!(msg.contains("mass (g)"), "{msg}");
        assert!(msg.contains("abc"), "{msg}");

        // Integers are strict: a fractional year is rejected.
        assert!(FieldType::Int.coerce("year", "2013.0", 1).is_err());
    }

    #[test]
    fn extreme_magnitudes_use_signed_two_digit_exponents() {
        assert_eq!(Value::Float(1e16).to_string(), "1e+16");
        assert_eq!(Value::Float(-1.5e16).to_string(), "-1.5e+16");
        assert_eq!(Value::Float(1e-5).to_string(), "1e-05");
        assert_eq!(Value::Float(2.5e-7).to_string(), "2.5e-07");
        assert_eq!(Value::Float(1e100).to_string(), "1e+100");
        assert_eq!(Value::Float(1e15).to_string(), "1000000000000000.0");
    }

    #[test]
    fn padded_and_grouped_numbers_coerce() {
        assert_eq!(
            FieldType::Int.coerce("year", " 2013", 2).unwrap(),
            Value::Int(2013)
        );
        assert_eq!(
            FieldType::Float.coerce("mass (g)", "916.0 ", 2).unwrap(),
            Value::Float(916.0)
        );
        assert_eq!(
            FieldType::Float.coerce("mass (g)", "\t1_000.5\n", 2).unwrap(),
            Value::Float(1000.5)
        );
        assert_eq!(
            FieldType::Int.coerce("id", "10_000", 2).unwrap(),
            Value::Int(10000)
        );

        for bad in ["   ", "1__0", "_1", "1_", "1_.5"] {
            let err = FieldType::Float.coerce("mass (g)", bad, 4).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Parse, "{bad:?}");
        }
    }

    #[test]
    fn alignment_rule() {
        assert!(Value::Int(1).is_right_aligned());
        assert!(Value::Float(1.5).is_right_aligned());
        assert!(Value::from("2013").is_right_aligned());
        assert!(!Value::from("-1.0").is_right_aligned());
        assert!(!Value::from("").is_right_aligned());
        assert!(!Value::from("Chelyabinsk").is_right_aligned());
        assert!(!Value::Absent.is_right_aligned());
        // Arabic-Indic digits are decimal; superscripts and fractions are not.
        assert!(Value::from("\u{661}\u{669}\u{668}\u{660}").is_right_aligned());
        assert!(!Value::from("\u{b2}").is_right_aligned());
        assert!(!Value::from("\u{bd}").is_right_aligned());
    }

    #[test]
    fn accessors_distinguish_text_from_numbers() {
        assert_eq!(Value::from("Aachen").as_str(), Some("Aachen"));
        assert_eq!(Value::Int(21).as_str(), None);
        assert_eq!(Value::Int(21).as_f64(), Some(21.0));
        assert_eq!(Value::from("21").as_f64(), None);
        assert!(Value::Absent.is_absent());
    }

    #[test]
    fn record_keeps_order_and_replaces_in_place() {
        let mut record: Record = [("name", Value::from("Aachen")), ("year", Value::from("1880"))]
            .into_iter()
            .collect();
        record.insert("name", "Abee");
        record.insert("id", 6_i64);

        assert_eq!(record.keys().collect::<Vec<_>>(), ["name", "year", "id"]);
        assert_eq!(
            record.values().cloned().collect::<Vec<_>>(),
            [Value::from("Abee"), Value::from("1880"), Value::Int(6)]
        );
        assert_eq!(record.iter().last(), Some(("id", &Value::Int(6))));
        assert_eq!(record.get("name"), Some(&Value::from("Abee")));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn from_row_truncates_to_shorter_side() {
        let names = vec!["a".to_string(), "b".to_string()];
        let long = Record::from_row(&names, vec!["1".into(), "2".into(), "3".into()]);
        assert_eq!(long.len(), 2);

        let short = Record::from_row(&names, vec!["1".into()]);
        assert_eq!(short.len(), 1);
        assert_eq!(short.get("b"), None);
    }

    #[test]
    fn coerce_skips_missing_fields() {
        let names = vec!["name".to_string(), "year".to_string()];
        let mut record = Record::from_row(&names, vec!["Abee".into()]);
        let mut type_map = TypeMap::new();
        type_map.insert("year".into(), FieldType::Int);
        type_map.insert("id".into(), FieldType::Int);

        record.coerce(&type_map, 2).unwrap();
        assert_eq!(record.get("year"), None);
        assert_eq!(record.get("name"), Some(&Value::from("Abee")));
    }
}
