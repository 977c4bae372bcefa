// record_filter.rs
use std::cmp::Ordering;

use thiserror::Error;
use tracing::debug;

use crate::dsv_value::{Record, Value};

/// Why a pair of typed limits was refused. The shell shows the message and asks again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeInputError {
    #[error("At least one limit must be set.")]
    NoLimits,
    #[error("Limits must be valid numeric values.")]
    NotNumeric,
}

/// Inclusive numeric range. Either end may be infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Parses the two limits as typed. A blank limit leaves that side open.
    pub fn parse(lower: &str, upper: &str) -> Result<Self, RangeInputError> {
        let lower = lower.trim();
        let upper = upper.trim();
        if lower.is_empty() && upper.is_empty() {
            return Err(RangeInputError::NoLimits);
        }
        let min = parse_limit(lower, f64::NEG_INFINITY)?;
        let max = parse_limit(upper, f64::INFINITY)?;
        Ok(Self { min, max })
    }
}

fn parse_limit(text: &str, unbounded: f64) -> Result<f64, RangeInputError> {
    if text.is_empty() {
        return Ok(unbounded);
    }
    match text.parse::<f64>() {
        Ok(limit) if !limit.is_nan() => Ok(limit),
        _ => Err(RangeInputError::NotNumeric),
    }
}

/// Records whose `field` is a number inside `range`, sorted by that number and
/// then by `name_field`. Blank and non-numeric values never match.
pub fn filter_records(records: &[Record], field: &str, name_field: &str, range: Range) -> Vec<Record> {
    let mut matched: Vec<(f64, &Record)> = records
        .iter()
        .filter_map(|record| {
            let value = record.get(field)?.as_f64()?;
            range.contains(value).then_some((value, record))
        })
        .collect();

    matched.sort_by(|(a, left), (b, right)| {
        a.total_cmp(b)
            .then_with(|| compare_names(left.get(name_field), right.get(name_field)))
    });
    debug!(
        field,
        min = range.min,
        max = range.max,
        total = records.len(),
        matched = matched.len(),
        "filtered records"
    );

    matched.into_iter().map(|(_, record)| record.clone()).collect()
}

fn compare_names(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    let text = |value: Option<&Value>| value.map(Value::to_string).unwrap_or_default();
    text(left).cmp(&text(right))
}
