//! Record normalization.
//!
//! Sheets are edited by hand, so headers drift ("Student_ID ", "FIRST_NAME")
//! and the status checkbox shows up as a bool, "TRUE", "Yes" or nothing at
//! all. Everything above the store works on normalized records: lowercase
//! trimmed field names, string values, and a derived `enrolled` flag.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::store::grid::cell_text;
use crate::store::RawRecord;

/// Status strings that count as enrolled (compared lowercase, trimmed)
const ENROLLED_VALUES: [&str; 4] = ["true", "yes", "1", "checked"];

/// Field carrying an already-derived enrolled flag
pub const ENROLLED_FIELD: &str = "enrolled";

/// Canonical form of a field name
pub fn normalize_field_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Interpret a status cell as the enrolled flag.
/// Anything unrecognized, including a missing cell, is not enrolled.
pub fn is_enrolled_value(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => {
            let lower = s.trim().to_lowercase();
            ENROLLED_VALUES.contains(&lower.as_str())
        }
        _ => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, String>,
    enrolled: bool,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field value, or "" when the field is missing
    pub fn get(&self, name: &str) -> &str {
        self.fields
            .get(&normalize_field_name(name))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(normalize_field_name(name), value.into());
    }

    /// True when the field is missing or whitespace only
    pub fn is_blank(&self, name: &str) -> bool {
        self.get(name).trim().is_empty()
    }

    pub fn enrolled(&self) -> bool {
        self.enrolled
    }

    /// Tick the status checkbox
    pub fn mark_enrolled(&mut self, status_field: &str) {
        self.set(status_field, "TRUE");
        self.enrolled = true;
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_raw(&self) -> RawRecord {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    status_field: Option<String>,
}

impl Normalizer {
    /// Normalizer for sheets without a status checkbox
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn with_status(status_field: &str) -> Self {
        Self {
            status_field: Some(normalize_field_name(status_field)),
        }
    }

    /// Normalize field names and derive `enrolled` from the status field.
    /// Without a status field, an `enrolled` field is read instead.
    pub fn normalize(&self, raw: &RawRecord) -> Record {
        let mut record = Record::new();
        let mut status = None;
        let mut flag = None;
        for (name, value) in raw {
            let name = normalize_field_name(name);
            if record.fields.contains_key(&name) {
                // First occurrence wins, like a header lookup would
                continue;
            }
            if self.status_field.as_deref() == Some(name.as_str()) {
                status = Some(is_enrolled_value(Some(value)));
            } else if name == ENROLLED_FIELD {
                flag = Some(is_enrolled_value(Some(value)));
            }
            record.fields.insert(name, cell_text(value));
        }
        if self.status_field.is_some() {
            record.enrolled = status.or(flag).unwrap_or(false);
        }
        record
    }
}

/// A normalized sheet: records plus the column order to write them back in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw(raw: &[RawRecord], normalizer: &Normalizer) -> Self {
        let mut table = Table::new();
        for record in raw {
            for name in record.keys() {
                table.ensure_column(name);
            }
            table.records.push(normalizer.normalize(record));
        }
        table
    }

    /// Every record gets every column, missing values written as ""
    pub fn to_raw(&self) -> Vec<RawRecord> {
        self.records
            .iter()
            .map(|record| {
                self.columns
                    .iter()
                    .map(|column| (column.clone(), Value::String(record.get(column).to_string())))
                    .collect()
            })
            .collect()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&Record> {
        self.records.get(row)
    }

    pub fn ensure_column(&mut self, name: &str) {
        let name = normalize_field_name(name);
        if !name.is_empty() && !self.columns.contains(&name) {
            self.columns.push(name);
        }
    }

    pub fn ensure_columns(&mut self, names: &[&str]) {
        for name in names {
            self.ensure_column(name);
        }
    }

    /// Append a record, adding any columns it introduces
    pub fn push(&mut self, record: Record) {
        for (name, _) in record.fields() {
            if !self.columns.iter().any(|c| c == name) {
                self.columns.push(name.to_string());
            }
        }
        self.records.push(record);
    }

    /// Set one field of an existing row. Returns false if the row does not exist.
    pub fn set(&mut self, row: usize, name: &str, value: impl Into<String>) -> bool {
        let Some(record) = self.records.get_mut(row) else {
            return false;
        };
        record.set(name, value);
        self.ensure_column(name);
        true
    }

    pub fn mark_enrolled(&mut self, row: usize, status_field: &str) -> bool {
        let Some(record) = self.records.get_mut(row) else {
            return false;
        };
        record.mark_enrolled(status_field);
        self.ensure_column(status_field);
        true
    }

    /// Row index of the first record whose `field` equals `value` (trimmed)
    pub fn position(&self, field: &str, value: &str) -> Option<usize> {
        let wanted = value.trim();
        self.records
            .iter()
            .position(|record| record.get(field).trim() == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(pairs: &[(&str, Value)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_field_names_lowercased_and_trimmed() {
        let record = Normalizer::plain().normalize(&raw(&[
            (" Student_ID ", json!("2025R10001")),
            ("FIRST_NAME", json!("Ana")),
        ]));

        assert_eq!(record.get("student_id"), "2025R10001");
        assert_eq!(record.get("first_name"), "Ana");
        assert_eq!(record.get("nickname"), "");
        assert!(record.is_blank("nickname"));
    }

    #[test]
    fn test_status_recognizer() {
        let normalizer = Normalizer::with_status("status");
        let cases = [
            (Some(json!(true)), true),
            (Some(json!("Yes")), true),
            (Some(json!("CHECKED")), true),
            (Some(json!(" 1 ")), true),
            (Some(json!("")), false),
            (Some(Value::Null), false),
            (None, false),
            (Some(json!("maybe")), false),
            (Some(json!(1)), false),
            (Some(json!(false)), false),
        ];

        for (value, expected) in cases {
            let mut record = raw(&[("first_name", json!("Ana"))]);
            if let Some(v) = value.clone() {
                record.insert("Status".into(), v);
            }
            assert_eq!(
                normalizer.normalize(&record).enrolled(),
                expected,
                "status value {:?}",
                value
            );
        }
    }

    #[test]
    fn test_enrolled_flag_without_status_field() {
        let normalizer = Normalizer::with_status("status");

        let record = normalizer.normalize(&raw(&[
            ("first_name", json!("Ana")),
            ("enrolled", json!(true)),
        ]));
        assert!(record.enrolled());
        let record = normalizer.normalize(&raw(&[("Enrolled ", json!("Yes"))]));
        assert!(record.enrolled());

        let record = normalizer.normalize(&raw(&[
            ("enrolled", json!(true)),
            ("status", json!("FALSE")),
        ]));
        assert!(!record.enrolled());

        let record = Normalizer::plain().normalize(&raw(&[("enrolled", json!(true))]));
        assert!(!record.enrolled());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let normalizer = Normalizer::with_status("status");
        let values = [
            Some(json!(true)),
            Some(json!("Yes")),
            Some(json!("CHECKED")),
            Some(json!("")),
            None,
            Some(json!("maybe")),
        ];

        for value in values {
            let mut record = raw(&[(" First_Name", json!("Ana")), ("AGE", json!(12))]);
            if let Some(v) = value {
                record.insert("STATUS ".into(), v);
            }
            let once = normalizer.normalize(&record);
            let twice = normalizer.normalize(&once.to_raw());
            assert_eq!(once, twice);
        }

        let once = normalizer.normalize(&raw(&[("enrolled", json!(true))]));
        assert_eq!(once, normalizer.normalize(&once.to_raw()));
    }

    #[test]
    fn test_first_duplicate_field_wins() {
        let record = Normalizer::plain().normalize(&raw(&[
            ("section_code", json!("S1")),
            ("Section_Code", json!("S2")),
        ]));
        assert_eq!(record.get("section_code"), "S1");
    }

    #[test]
    fn test_mark_enrolled() {
        let mut record = Record::new();
        record.mark_enrolled("Status");
        assert!(record.enrolled());
        assert_eq!(record.get("status"), "TRUE");
    }

    #[test]
    fn test_table_keeps_column_order() {
        let rows = vec![
            raw(&[("Student_ID", json!("2025R10001")), ("Last_Name", json!("Cruz"))]),
            raw(&[("Student_ID", json!("2025R10002")), ("Notes", json!("late"))]),
        ];
        let mut table = Table::from_raw(&rows, &Normalizer::plain());
        assert_eq!(table.columns(), ["student_id", "last_name", "notes"]);

        assert!(table.set(0, "section_code", "S1"));
        assert!(!table.set(5, "section_code", "S1"));

        let out = table.to_raw();
        let keys: Vec<&String> = out[0].keys().collect();
        assert_eq!(keys, ["student_id", "last_name", "notes", "section_code"]);
        assert_eq!(out[1]["section_code"], json!(""));
        assert_eq!(table.position("student_id", " 2025R10002"), Some(1));
    }
}
