//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Zi Dataset Module
//!
//! This module provides the column-oriented container that flows through
//! every anonymization operator. A [`ZiDataset`] is an ordered list of named
//! [`ZiColumn`]s, each holding one [`ZiValue`] per row.
//!
//! ## Design Principles
//!
//! - **Positional rows**: rows have no key; row `i` is the `i`-th value of
//!   every column
//! - **Snapshots**: operators borrow a dataset and return a new one, so a
//!   failed call never leaves a half-transformed dataset behind
//! - **Validated layout**: construction rejects ragged columns and duplicate
//!   names, including on deserialization
//!
//! ## Usage Example
//!
//! ```rust
//! use zianon::dataset::{ZiColumn, ZiDataset, ZiValue};
//!
//! let dataset = ZiDataset::from_columns(vec![
//!     ZiColumn::from_values("Age", [25i64, 30]),
//!     ZiColumn::from_values("Zip", ["12345", "67890"]),
//! ])?;
//! assert_eq!(dataset.row_count(), 2);
//! # Ok::<(), zianon::ZiError>(())
//! ```

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Result, ZiError};

/// Date layout used for display, keys, and JSON conversion.
pub const ZI_DATE_FORMAT: &str = "%Y-%m-%d";

/// A single cell value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ZiValue {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
}

impl ZiValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ZiValue::Null)
    }

    /// Human-readable type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ZiValue::Null => "null",
            ZiValue::Int(_) => "integer",
            ZiValue::Float(_) => "float",
            ZiValue::Str(_) => "string",
            ZiValue::Date(_) => "date",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ZiValue::Int(i) => Some(*i as f64),
            ZiValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ZiValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            ZiValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Canonical grouping key.
    ///
    /// Two values share a key exactly when they belong to the same
    /// equivalence class: integral floats key like the equal integer, and
    /// `Null` has a key no string, number, or date can produce.
    pub fn key(&self) -> String {
        match self {
            ZiValue::Null => "null".to_string(),
            ZiValue::Int(i) => format!("n:{i}"),
            ZiValue::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
                    format!("n:{}", *f as i64)
                } else {
                    format!("n:{f}")
                }
            }
            ZiValue::Str(s) => format!("s:{s}"),
            ZiValue::Date(d) => format!("d:{}", d.format(ZI_DATE_FORMAT)),
        }
    }

    /// Converts a JSON config value into a cell value.
    ///
    /// Dates are written as `{"date": "YYYY-MM-DD"}` so they stay distinct
    /// from plain strings.
    pub fn from_json(value: &Value) -> Result<ZiValue> {
        match value {
            Value::Null => Ok(ZiValue::Null),
            Value::String(s) => Ok(ZiValue::Str(s.clone())),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(ZiValue::Int(i)),
                None => n
                    .as_f64()
                    .map(ZiValue::Float)
                    .ok_or_else(|| ZiError::invalid_config(format!("unsupported number {n}"))),
            },
            Value::Object(map) if map.len() == 1 => {
                let text = map
                    .get("date")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ZiError::invalid_config("object values must be {\"date\": ...}"))?;
                NaiveDate::parse_from_str(text, ZI_DATE_FORMAT)
                    .map(ZiValue::Date)
                    .map_err(|e| ZiError::invalid_config(format!("invalid date '{text}': {e}")))
            }
            other => Err(ZiError::invalid_config(format!(
                "unsupported value {other}"
            ))),
        }
    }
}

impl fmt::Display for ZiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZiValue::Null => write!(f, "null"),
            ZiValue::Int(i) => write!(f, "{i}"),
            ZiValue::Float(x) => write!(f, "{x}"),
            ZiValue::Str(s) => write!(f, "{s}"),
            ZiValue::Date(d) => write!(f, "{}", d.format(ZI_DATE_FORMAT)),
        }
    }
}

impl From<i64> for ZiValue {
    fn from(value: i64) -> Self {
        ZiValue::Int(value)
    }
}

impl From<f64> for ZiValue {
    fn from(value: f64) -> Self {
        ZiValue::Float(value)
    }
}

impl From<&str> for ZiValue {
    fn from(value: &str) -> Self {
        ZiValue::Str(value.to_string())
    }
}

impl From<String> for ZiValue {
    fn from(value: String) -> Self {
        ZiValue::Str(value)
    }
}

impl From<NaiveDate> for ZiValue {
    fn from(value: NaiveDate) -> Self {
        ZiValue::Date(value)
    }
}

impl<T: Into<ZiValue>> From<Option<T>> for ZiValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ZiValue::Null)
    }
}

/// A named sequence of values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiColumn {
    pub name: String,
    pub values: Vec<ZiValue>,
}

impl ZiColumn {
    #[allow(non_snake_case)]
    pub fn new(name: impl Into<String>, values: Vec<ZiValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Builds a column from anything convertible into [`ZiValue`].
    pub fn from_values<I, T>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ZiValue>,
    {
        Self::new(name, values.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns a column with the same name and the given values.
    pub fn with_values(&self, values: Vec<ZiValue>) -> ZiColumn {
        ZiColumn::new(self.name.clone(), values)
    }
}

/// Ordered collection of equal-length named columns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ZiColumn>", into = "Vec<ZiColumn>")]
pub struct ZiDataset {
    columns: Vec<ZiColumn>,
}

impl ZiDataset {
    /// Creates a dataset with no columns and no rows.
    #[allow(non_snake_case)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dataset, rejecting ragged columns and duplicate names.
    pub fn from_columns(columns: Vec<ZiColumn>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ZiError::schema(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }
        if let Some(first) = columns.first() {
            if let Some(ragged) = columns.iter().find(|c| c.len() != first.len()) {
                return Err(ZiError::schema(format!(
                    "column '{}' has {} rows but '{}' has {}",
                    ragged.name,
                    ragged.len(),
                    first.name,
                    first.len()
                )));
            }
        }
        Ok(Self { columns })
    }

    /// Appends a column, validating length and name uniqueness.
    pub fn with_column(self, column: ZiColumn) -> Result<Self> {
        let mut columns = self.columns;
        columns.push(column);
        Self::from_columns(columns)
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(ZiColumn::len).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn columns(&self) -> &[ZiColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn position(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| ZiError::unknown_column(name))
    }

    /// Looks up a column by name, failing with `UnknownColumn`.
    pub fn column(&self, name: &str) -> Result<&ZiColumn> {
        self.position(name).map(|idx| &self.columns[idx])
    }

    /// Fails with `UnknownColumn` on the first name that is absent.
    pub fn require_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        for name in names {
            self.position(name.as_ref())?;
        }
        Ok(())
    }

    /// Swaps in a transformed column of the same name and length.
    pub fn replace_column(&mut self, column: ZiColumn) -> Result<()> {
        let idx = self.position(&column.name)?;
        if column.len() != self.row_count() {
            return Err(ZiError::schema(format!(
                "replacement column '{}' has {} rows, expected {}",
                column.name,
                column.len(),
                self.row_count()
            )));
        }
        self.columns[idx] = column;
        Ok(())
    }

    /// Returns a copy of the dataset with one column replaced.
    pub fn with_replaced(&self, column: ZiColumn) -> Result<ZiDataset> {
        let mut out = self.clone();
        out.replace_column(column)?;
        Ok(out)
    }

    pub fn row(&self, index: usize) -> Option<Vec<&ZiValue>> {
        if index >= self.row_count() {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }

    /// Builds a dataset from the given row positions, in order.
    ///
    /// Positions must be below `row_count()`.
    pub fn take_rows(&self, indices: &[usize]) -> ZiDataset {
        let columns = self
            .columns
            .iter()
            .map(|c| c.with_values(indices.iter().map(|&i| c.values[i].clone()).collect()))
            .collect();
        ZiDataset { columns }
    }

    /// Keeps the rows whose flag is `true`.
    pub fn filter_rows(&self, keep: &[bool]) -> ZiDataset {
        let indices: Vec<usize> = keep
            .iter()
            .enumerate()
            .filter_map(|(i, k)| k.then_some(i))
            .collect();
        self.take_rows(&indices)
    }

    /// Drops the named columns; names that are absent are ignored.
    pub fn without_columns<S: AsRef<str>>(&self, names: &[S]) -> ZiDataset {
        let drop: HashSet<&str> = names.iter().map(|n| n.as_ref()).collect();
        let columns = self
            .columns
            .iter()
            .filter(|c| !drop.contains(c.name.as_str()))
            .cloned()
            .collect();
        ZiDataset { columns }
    }
}

impl TryFrom<Vec<ZiColumn>> for ZiDataset {
    type Error = ZiError;

    fn try_from(columns: Vec<ZiColumn>) -> Result<Self> {
        Self::from_columns(columns)
    }
}

impl From<ZiDataset> for Vec<ZiColumn> {
    fn from(dataset: ZiDataset) -> Self {
        dataset.columns
    }
}
