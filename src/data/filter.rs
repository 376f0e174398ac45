//! Filter options and row filtering.
//!
//! [`extract_filter_options`] scans rows once and collects, per categorical
//! field, the ascending list of distinct values the host can turn into
//! filter controls. [`RowFilter`] is the matching selection: a set of hidden
//! values per field, applied before the hierarchy is (re)built.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::DEFAULT_MEASURE_FIELD;
use crate::data::{FieldValue, Row};

/// Distinct values per field, each list sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    options: BTreeMap<String, Vec<FieldValue>>,
}

impl FilterOptions {
    /// Field names, ascending.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(|k| k.as_str())
    }

    pub fn values(&self, field: &str) -> Option<&[FieldValue]> {
        self.options.get(field).map(|v| v.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldValue])> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Collect filter options, treating `"Total"` as the measure field.
pub fn extract_filter_options(rows: &[Row]) -> FilterOptions {
    extract_filter_options_excluding(rows, DEFAULT_MEASURE_FIELD)
}

/// Collect filter options for every field except `measure_field`.
pub fn extract_filter_options_excluding(rows: &[Row], measure_field: &str) -> FilterOptions {
    let mut seen: BTreeMap<String, BTreeSet<FieldValue>> = BTreeMap::new();
    for row in rows {
        for (field, value) in row.iter() {
            if field == measure_field {
                continue;
            }
            seen.entry(field.to_string())
                .or_default()
                .insert(value.clone());
        }
    }

    FilterOptions {
        options: seen
            .into_iter()
            .map(|(field, values)| (field, values.into_iter().collect()))
            .collect(),
    }
}

/// Hidden values per field.
///
/// A row passes when none of its values is hidden. Rows that lack a
/// constrained field have nothing to hide and always pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFilter {
    hidden: BTreeMap<String, BTreeSet<FieldValue>>,
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hide(&mut self, field: &str, value: FieldValue) {
        self.hidden.entry(field.to_string()).or_default().insert(value);
    }

    pub fn show(&mut self, field: &str, value: &FieldValue) {
        if let Some(set) = self.hidden.get_mut(field) {
            set.remove(value);
            if set.is_empty() {
                self.hidden.remove(field);
            }
        }
    }

    /// Show or hide `value` depending on `visible`.
    pub fn set_visible(&mut self, field: &str, value: &FieldValue, visible: bool) {
        if visible {
            self.show(field, value);
        } else {
            self.hide(field, value.clone());
        }
    }

    pub fn is_visible(&self, field: &str, value: &FieldValue) -> bool {
        self.hidden
            .get(field)
            .map_or(true, |set| !set.contains(value))
    }

    /// Whether any value is hidden.
    pub fn is_active(&self) -> bool {
        !self.hidden.is_empty()
    }

    pub fn clear(&mut self) {
        self.hidden.clear();
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.hidden.iter().all(|(field, set)| {
            row.get(field).map_or(true, |value| !set.contains(value))
        })
    }

    pub fn apply(&self, rows: &[Row]) -> Vec<Row> {
        if !self.is_active() {
            return rows.to_vec();
        }
        let kept: Vec<Row> = rows.iter().filter(|r| self.matches(r)).cloned().collect();
        log::debug!("Row filter kept {} of {} rows", kept.len(), rows.len());
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Row> {
        vec![
            Row::new().with("Region", "B").with("City", "Z").with("Total", 7.0),
            Row::new().with("Region", "A").with("City", "Y").with("Total", 5.0),
            Row::new().with("Region", "A").with("City", "X").with("Total", 10.0),
        ]
    }

    #[test]
    fn test_options_sorted_and_distinct() {
        let options = extract_filter_options(&sample());
        assert_eq!(options.fields().collect::<Vec<_>>(), vec!["City", "Region"]);
        assert_eq!(
            options.values("Region").unwrap(),
            &[FieldValue::from("A"), FieldValue::from("B")]
        );
        assert_eq!(
            options.values("City").unwrap(),
            &[FieldValue::from("X"), FieldValue::from("Y"), FieldValue::from("Z")]
        );
        assert!(options.values("Total").is_none());
    }

    #[test]
    fn test_empty_rows_give_empty_options() {
        assert!(extract_filter_options(&[]).is_empty());
    }

    #[test]
    fn test_sparse_fields_collected() {
        let rows = vec![
            Row::new().with("Region", "A"),
            Row::new().with("Channel", "Web").with("Total", 1.0),
        ];
        let options = extract_filter_options(&rows);
        assert_eq!(options.len(), 2);
        assert_eq!(options.values("Channel").unwrap().len(), 1);
    }

    #[test]
    fn test_custom_measure_field() {
        let rows = vec![Row::new().with("Region", "A").with("Amount", 3.0).with("Total", "x")];
        let options = extract_filter_options_excluding(&rows, "Amount");
        assert!(options.values("Amount").is_none());
        assert!(options.values("Total").is_some());
    }

    #[test]
    fn test_row_filter_hides_values() {
        let mut filter = RowFilter::new();
        filter.hide("Region", FieldValue::from("A"));
        let kept = filter.apply(&sample());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].get("City"), Some(&FieldValue::from("Z")));

        filter.set_visible("Region", &FieldValue::from("A"), true);
        assert!(!filter.is_active());
        assert_eq!(filter.apply(&sample()).len(), 3);
    }

    #[test]
    fn test_row_without_field_passes() {
        let mut filter = RowFilter::new();
        filter.hide("Region", FieldValue::from("A"));
        assert!(filter.matches(&Row::new().with("City", "X")));
    }
}
