//! Tabular input
//!
//! A [`Table`] is a point-in-time snapshot of one domain's rows, keyed by
//! `patientID`. Cells are optional strings; `None` is an absent value.

use crate::{Error, Result};
use ahash::AHashSet;
use serde_json::Value;

/// Raw values treated as missing after trimming
const NULL_MARKERS: [&str; 3] = ["", "nan", "NA"];

/// Normalize a raw cell: trim surrounding whitespace, drop embedded newlines,
/// and map null markers to `None`.
pub fn normalize_value(raw: &str) -> Option<String> {
    let cleaned = raw.trim().replace('\n', "");
    if NULL_MARKERS.contains(&cleaned.as_str()) {
        None
    } else {
        Some(cleaned)
    }
}

/// Stringify a JSON scalar the way it should appear in a profile
pub fn json_cell(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            // integral floats, e.g. ages from a nullable integer column
            Some(f) if f.is_finite() && f.fract() == 0.0 => Some(format!("{}", f)),
            _ => Some(n.to_string()),
        },
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// One domain table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from string literals, mostly useful for fixtures
    pub fn from_rows<S: AsRef<str>>(name: &str, columns: &[S], rows: &[Vec<Option<&str>>]) -> Result<Self> {
        let mut table = Table::new(name, columns.iter().map(|c| c.as_ref().to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|cell| cell.map(str::to_string)).collect())?;
        }
        Ok(table)
    }

    /// Build a table from an array of JSON objects. Columns are the union of
    /// keys, in order of first appearance.
    pub fn from_json_records(name: &str, records: &[Value]) -> Result<Self> {
        let mut columns: Vec<String> = Vec::new();
        let mut seen = AHashSet::new();
        for (i, record) in records.iter().enumerate() {
            let object = record
                .as_object()
                .ok_or_else(|| Error::input_data(name, format!("record {} is not an object", i)))?;
            for key in object.keys() {
                if seen.insert(key.clone()) {
                    columns.push(key.clone());
                }
            }
        }

        let mut table = Table::new(name, columns);
        for record in records {
            let row = table
                .columns
                .iter()
                .map(|column| record.get(column).and_then(json_cell))
                .collect();
            table.rows.push(row);
        }
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Column index, or an error naming this table
    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column).ok_or_else(|| Error::MissingColumn {
            table: self.name.clone(),
            column: column.to_string(),
        })
    }

    pub fn push_row(&mut self, row: Vec<Option<String>>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::input_data(
                &self.name,
                format!(
                    "row {} has {} cells, expected {}",
                    self.rows.len(),
                    row.len(),
                    self.columns.len()
                ),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Option<String>]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }

    /// Apply [`normalize_value`] to every header and every cell
    pub fn normalize(&mut self) {
        for column in &mut self.columns {
            *column = column.trim().replace('\n', "");
        }
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                *cell = cell.as_deref().and_then(normalize_value);
            }
        }
    }

    /// Lowercase every value of a column; no-op when the column is absent
    pub fn lowercase_column(&mut self, column: &str) {
        let Some(idx) = self.column_index(column) else {
            return;
        };
        for row in &mut self.rows {
            if let Some(value) = row[idx].as_mut() {
                *value = value.to_lowercase();
            }
        }
    }

    /// Keep only the first row for each distinct value of `column`
    pub fn dedup_by_column(&mut self, column: &str) -> Result<usize> {
        let idx = self.require_column(column)?;
        let before = self.rows.len();
        let mut seen: AHashSet<Option<String>> = AHashSet::new();
        self.rows.retain(|row| seen.insert(row[idx].clone()));
        Ok(before - self.rows.len())
    }
}
