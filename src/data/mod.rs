//! Tabular input: rows of named fields.
//!
//! A [`Row`] maps field names to [`FieldValue`]s. One field (by default
//! `"Total"`) is the numeric measure; every other field is a categorical
//! grouping key. Rows are immutable once loaded.

pub mod filter;
pub mod loader;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A single cell value.
///
/// Ordering is total: numbers sort before text, numbers compare with
/// `f64::total_cmp`, text compares byte-lexicographically.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric reading of the value. Text is parsed; anything unparseable is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
            (FieldValue::Number(_), FieldValue::Text(_)) => Ordering::Less,
            (FieldValue::Text(_), FieldValue::Number(_)) => Ordering::Greater,
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => f.write_str(&format_number(*n)),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

/// Format a number without a trailing `.0` for integral values.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One input record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: BTreeMap<String, FieldValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Measure contribution of this row: the field read as a number,
    /// `0.0` when absent, unparseable or NaN.
    pub fn measure(&self, field: &str) -> f64 {
        match self.fields.get(field) {
            None => {
                log::debug!("Row has no {:?} field; counting it as 0", field);
                0.0
            }
            Some(value) => match value.as_f64() {
                Some(n) if !n.is_nan() => n,
                _ => {
                    log::debug!("Measure {:?} = {} is not a number; counting it as 0", field, value);
                    0.0
                }
            },
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Rows together with their column names in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Every column except `measure_field`, in source order.
    pub fn grouping_columns(&self, measure_field: &str) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.as_str() != measure_field)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_defaults_to_zero() {
        let row = Row::new().with("Region", "A").with("Total", "n/a");
        assert_eq!(row.measure("Total"), 0.0);
        assert_eq!(row.measure("Missing"), 0.0);
        assert_eq!(Row::new().with("Total", " 12.5 ").measure("Total"), 12.5);
        assert_eq!(Row::new().with("Total", f64::NAN).measure("Total"), 0.0);
        assert_eq!(Row::new().with("Total", "NaN").measure("Total"), 0.0);
        assert_eq!(Row::new().with("Total", -3.0).measure("Total"), -3.0);
    }

    #[test]
    fn test_value_ordering() {
        let mut values = vec![
            FieldValue::from("b"),
            FieldValue::from(10.0),
            FieldValue::from("a"),
            FieldValue::from(2.0),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                FieldValue::from(2.0),
                FieldValue::from(10.0),
                FieldValue::from("a"),
                FieldValue::from("b"),
            ]
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(22.0), "22");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(FieldValue::from(-3i64).to_string(), "-3");
    }

    #[test]
    fn test_grouping_columns_skip_measure() {
        let table = Table {
            columns: vec!["Region".into(), "Total".into(), "City".into()],
            rows: Vec::new(),
        };
        assert_eq!(table.grouping_columns("Total"), vec!["Region", "City"]);
    }
}
