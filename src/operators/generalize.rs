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

//! # Generalization Operators
//!
//! Lossy precision reduction for quasi-identifiers:
//!
//! - **Date generalization** keeps only the year, quarter, or month
//! - **Mean generalization** bins a numeric column and replaces each value
//!   with its bin's mean (or the bin midpoint)
//! - **Bucketing** maps numbers to labels through explicit boundaries

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ZiContext;
use crate::dataset::{ZiColumn, ZiDataset, ZiValue};
use crate::errors::{Result, ZiError};
use crate::operator::ZiOperator;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZiDateUnit {
    /// `YYYY`
    Year,
    /// `YYYY-Qn`
    Quarter,
    /// `YYYY-MM`
    Month,
}

impl Default for ZiDateUnit {
    fn default() -> Self {
        Self::Year
    }
}

/// Reduces each date to the given unit. Output values are strings.
pub fn generalize_date(column: &ZiColumn, unit: ZiDateUnit) -> Result<ZiColumn> {
    let values = column
        .values
        .iter()
        .map(|value| match value {
            ZiValue::Null => Ok(ZiValue::Null),
            ZiValue::Date(date) => Ok(ZiValue::Str(match unit {
                ZiDateUnit::Year => format!("{:04}", date.year()),
                ZiDateUnit::Quarter => format!("{:04}-Q{}", date.year(), date.month0() / 3 + 1),
                ZiDateUnit::Month => format!("{:04}-{:02}", date.year(), date.month()),
            })),
            other => Err(ZiError::type_mismatch(&column.name, "date", other.type_name())),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(column.with_values(values))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZiBinning {
    /// Bins of equal width over `[min, max]`.
    EqualWidth,
    /// Bins holding (nearly) equal numbers of rows; equal values share a bin.
    EqualFrequency,
}

impl Default for ZiBinning {
    fn default() -> Self {
        Self::EqualWidth
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZiBinValue {
    /// Mean of the values that fell into the bin.
    Mean,
    /// Midpoint of the bin interval.
    Midpoint,
}

impl Default for ZiBinValue {
    fn default() -> Self {
        Self::Mean
    }
}

struct Bin {
    low: f64,
    high: f64,
    sum: f64,
    count: usize,
}

impl Bin {
    fn empty(low: f64, high: f64) -> Self {
        Self {
            low,
            high,
            sum: 0.0,
            count: 0,
        }
    }

    fn representative(&self, value: ZiBinValue) -> f64 {
        match value {
            ZiBinValue::Mean => self.sum / self.count as f64,
            ZiBinValue::Midpoint => (self.low + self.high) / 2.0,
        }
    }
}

/// Occupied bins keyed by index. `bin_count` may far exceed the number of
/// values, so empty bins are never materialized.
type BinMap = BTreeMap<usize, Bin>;

fn assign_equal_width(values: &[f64], bin_count: usize) -> (Vec<usize>, BinMap) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bin_count as f64;

    let assignment: Vec<usize> = values
        .iter()
        .map(|v| {
            if width == 0.0 {
                0
            } else {
                (((v - min) / width).floor() as usize).min(bin_count - 1)
            }
        })
        .collect();

    let mut bins = BinMap::new();
    for (x, &b) in values.iter().zip(&assignment) {
        let bin = bins.entry(b).or_insert_with(|| {
            let high = if b + 1 == bin_count {
                max
            } else {
                min + width * (b + 1) as f64
            };
            Bin::empty(min + width * b as f64, high)
        });
        bin.sum += x;
        bin.count += 1;
    }

    (assignment, bins)
}

fn assign_equal_frequency(values: &[f64], bin_count: usize) -> (Vec<usize>, BinMap) {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut assignment = vec![0usize; n];
    let mut previous: Option<(f64, usize)> = None;
    for (rank, &idx) in order.iter().enumerate() {
        let bin = match previous {
            Some((value, bin)) if value == values[idx] => bin,
            // Always below `bin_count`, but the product can exceed usize.
            _ => (rank as u128 * bin_count as u128 / n as u128) as usize,
        };
        assignment[idx] = bin;
        previous = Some((values[idx], bin));
    }

    let mut bins = BinMap::new();
    for (x, &b) in values.iter().zip(&assignment) {
        let bin = bins
            .entry(b)
            .or_insert_with(|| Bin::empty(f64::INFINITY, f64::NEG_INFINITY));
        bin.low = bin.low.min(*x);
        bin.high = bin.high.max(*x);
        bin.sum += x;
        bin.count += 1;
    }

    (assignment, bins)
}

/// Replaces every numeric value with a summary of its bin.
///
/// Bins are computed once from the whole column, so the result depends only
/// on the column and the parameters. Nulls and non-finite floats pass
/// through; integer columns become float columns.
pub fn mean_generalize(
    column: &ZiColumn,
    bin_count: usize,
    binning: ZiBinning,
    value: ZiBinValue,
) -> Result<ZiColumn> {
    if bin_count == 0 {
        return Err(ZiError::invalid_config("mean generalization needs at least one bin"));
    }

    let mut rows = Vec::new();
    let mut numbers = Vec::new();
    for (row, cell) in column.values.iter().enumerate() {
        match cell {
            ZiValue::Null => {}
            ZiValue::Int(_) | ZiValue::Float(_) => {
                let x = cell.as_f64().unwrap_or(f64::NAN);
                if x.is_finite() {
                    rows.push(row);
                    numbers.push(x);
                }
            }
            other => {
                return Err(ZiError::type_mismatch(&column.name, "numeric", other.type_name()))
            }
        }
    }

    let mut values = column.values.clone();
    if numbers.is_empty() {
        return Ok(column.with_values(values));
    }

    let (assignment, bins) = match binning {
        ZiBinning::EqualWidth => assign_equal_width(&numbers, bin_count),
        ZiBinning::EqualFrequency => assign_equal_frequency(&numbers, bin_count),
    };
    for (row, bin) in rows.iter().zip(&assignment) {
        values[*row] = ZiValue::Float(bins[bin].representative(value));
    }

    log::debug!(
        "generalize.mean: column binned - column={}, bins={}, occupied={}",
        column.name,
        bin_count,
        bins.len()
    );

    Ok(column.with_values(values))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZiClosedSide {
    /// Intervals `[low, high)`.
    Left,
    /// Intervals `(low, high]`.
    Right,
}

impl Default for ZiClosedSide {
    fn default() -> Self {
        Self::Right
    }
}

/// Boundaries and labels for bucketing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiBucketSpec {
    pub boundaries: Vec<f64>,
    pub labels: Vec<String>,
    #[serde(default)]
    pub closed: ZiClosedSide,
    /// Label for values outside every interval.
    #[serde(default)]
    pub catch_all: Option<String>,
}

impl ZiBucketSpec {
    pub fn new<S: Into<String>>(boundaries: Vec<f64>, labels: Vec<S>) -> Result<Self> {
        let spec = Self {
            boundaries,
            labels: labels.into_iter().map(Into::into).collect(),
            closed: ZiClosedSide::default(),
            catch_all: None,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn with_catch_all(mut self, label: impl Into<String>) -> Self {
        self.catch_all = Some(label.into());
        self
    }

    pub fn with_closed(mut self, closed: ZiClosedSide) -> Self {
        self.closed = closed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.boundaries.len() < 2 {
            return Err(ZiError::invalid_config("bucketing needs at least two boundaries"));
        }
        if self.boundaries.iter().any(|b| !b.is_finite()) {
            return Err(ZiError::invalid_config("bucket boundaries must be finite"));
        }
        if self.boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ZiError::invalid_config(
                "bucket boundaries must be strictly increasing",
            ));
        }
        if self.labels.len() != self.boundaries.len() - 1 {
            return Err(ZiError::invalid_config(format!(
                "{} boundaries need {} labels, got {}",
                self.boundaries.len(),
                self.boundaries.len() - 1,
                self.labels.len()
            )));
        }
        Ok(())
    }

    /// Label of the interval containing `x`, if any.
    pub fn label_for(&self, x: f64) -> Option<&str> {
        let idx = match self.closed {
            ZiClosedSide::Right => self.boundaries.partition_point(|b| *b < x),
            ZiClosedSide::Left => self.boundaries.partition_point(|b| *b <= x),
        };
        if idx == 0 || idx == self.boundaries.len() {
            return None;
        }
        Some(self.labels[idx - 1].as_str())
    }
}

/// Replaces numeric values with their bucket labels.
pub fn bucket(column: &ZiColumn, spec: &ZiBucketSpec) -> Result<ZiColumn> {
    spec.validate()?;
    let mut caught = 0usize;
    let values = column
        .values
        .iter()
        .map(|value| {
            if value.is_null() {
                return Ok(ZiValue::Null);
            }
            let x = value
                .as_f64()
                .ok_or_else(|| ZiError::type_mismatch(&column.name, "numeric", value.type_name()))?;
            match (spec.label_for(x), &spec.catch_all) {
                (Some(label), _) => Ok(ZiValue::Str(label.to_string())),
                (None, Some(fallback)) => {
                    caught += 1;
                    Ok(ZiValue::Str(fallback.clone()))
                }
                (None, None) => Err(ZiError::OutOfRangeValue {
                    column: column.name.clone(),
                    value: value.to_string(),
                }),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    if caught > 0 {
        log::debug!(
            "generalize.bucket: values assigned to catch-all - column={}, count={}",
            column.name,
            caught
        );
    }
    Ok(column.with_values(values))
}

#[derive(Debug)]
pub struct ZiGeneralizeDate {
    column: String,
    unit: ZiDateUnit,
}

impl ZiGeneralizeDate {
    #[allow(non_snake_case)]
    pub fn new(column: impl Into<String>, unit: ZiDateUnit) -> Self {
        Self {
            column: column.into(),
            unit,
        }
    }
}

impl ZiOperator for ZiGeneralizeDate {
    fn name(&self) -> &'static str {
        "generalize.date"
    }

    fn apply(&self, dataset: &ZiDataset, _context: &mut ZiContext) -> Result<ZiDataset> {
        dataset.with_replaced(generalize_date(dataset.column(&self.column)?, self.unit)?)
    }
}

#[derive(Debug)]
pub struct ZiGeneralizeMean {
    column: String,
    bins: usize,
    binning: ZiBinning,
    value: ZiBinValue,
}

impl ZiGeneralizeMean {
    #[allow(non_snake_case)]
    pub fn new(column: impl Into<String>, bins: usize, binning: ZiBinning, value: ZiBinValue) -> Self {
        Self {
            column: column.into(),
            bins,
            binning,
            value,
        }
    }
}

impl ZiOperator for ZiGeneralizeMean {
    fn name(&self) -> &'static str {
        "generalize.mean"
    }

    fn apply(&self, dataset: &ZiDataset, _context: &mut ZiContext) -> Result<ZiDataset> {
        let column = mean_generalize(
            dataset.column(&self.column)?,
            self.bins,
            self.binning,
            self.value,
        )?;
        dataset.with_replaced(column)
    }
}

#[derive(Debug)]
pub struct ZiBucket {
    column: String,
    spec: ZiBucketSpec,
}

impl ZiBucket {
    #[allow(non_snake_case)]
    pub fn new(column: impl Into<String>, spec: ZiBucketSpec) -> Self {
        Self {
            column: column.into(),
            spec,
        }
    }
}

impl ZiOperator for ZiBucket {
    fn name(&self) -> &'static str {
        "generalize.bucket"
    }

    fn apply(&self, dataset: &ZiDataset, _context: &mut ZiContext) -> Result<ZiDataset> {
        dataset.with_replaced(bucket(dataset.column(&self.column)?, &self.spec)?)
    }
}

fn required_column(config: &Value, operator: &str) -> Result<String> {
    config
        .as_object()
        .ok_or_else(|| ZiError::invalid_config(format!("{operator} config must be object")))?
        .get("column")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ZiError::invalid_config(format!("{operator} requires string 'column'")))
}

fn optional_field<T: serde::de::DeserializeOwned + Default>(
    config: &Value,
    key: &str,
    operator: &str,
) -> Result<T> {
    match config.get(key) {
        None => Ok(T::default()),
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| ZiError::invalid_config(format!("{operator} '{key}': {e}"))),
    }
}

#[allow(non_snake_case)]
pub fn generalize_date_factory(config: &Value) -> Result<Box<dyn ZiOperator + Send + Sync>> {
    let column = required_column(config, "generalize.date")?;
    let unit: ZiDateUnit = optional_field(config, "unit", "generalize.date")?;
    Ok(Box::new(ZiGeneralizeDate::new(column, unit)))
}

#[allow(non_snake_case)]
pub fn generalize_mean_factory(config: &Value) -> Result<Box<dyn ZiOperator + Send + Sync>> {
    let column = required_column(config, "generalize.mean")?;
    let bins = config
        .get("bins")
        .and_then(Value::as_u64)
        .filter(|b| *b > 0)
        .map(|b| usize::try_from(b).unwrap_or(usize::MAX))
        .ok_or_else(|| ZiError::invalid_config("generalize.mean requires positive integer 'bins'"))?;
    let binning: ZiBinning = optional_field(config, "binning", "generalize.mean")?;
    let value: ZiBinValue = optional_field(config, "value", "generalize.mean")?;
    Ok(Box::new(ZiGeneralizeMean::new(column, bins, binning, value)))
}

#[allow(non_snake_case)]
pub fn bucket_factory(config: &Value) -> Result<Box<dyn ZiOperator + Send + Sync>> {
    let column = required_column(config, "generalize.bucket")?;
    let spec: ZiBucketSpec = serde_json::from_value(config.clone())
        .map_err(|e| ZiError::invalid_config(format!("generalize.bucket: {e}")))?;
    spec.validate()?;
    Ok(Box::new(ZiBucket::new(column, spec)))
}
