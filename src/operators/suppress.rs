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

//! # Suppression Operators
//!
//! Column suppression drops whole attributes. Record suppression drops rows
//! whose values appear in a per-column forbidden set; values are compared by
//! [`ZiValue::key`], so `30` and `30.0` match each other.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ZiContext;
use crate::dataset::{ZiDataset, ZiValue};
use crate::errors::{Result, ZiError};
use crate::operator::ZiOperator;

/// How per-column matches combine into a row decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZiMatchPolicy {
    /// Drop a row when any listed column holds a forbidden value.
    Any,
    /// Drop a row only when every listed column holds a forbidden value.
    All,
}

impl Default for ZiMatchPolicy {
    fn default() -> Self {
        Self::Any
    }
}

/// Removes the named columns. Fails before changing anything if one is absent.
pub fn suppress_columns<S: AsRef<str>>(dataset: &ZiDataset, names: &[S]) -> Result<ZiDataset> {
    dataset.require_columns(names)?;
    Ok(dataset.without_columns(names))
}

/// Removes rows holding forbidden values.
///
/// `value_sets[i]` lists the forbidden values of `names[i]`.
pub fn suppress_records<S: AsRef<str>>(
    dataset: &ZiDataset,
    names: &[S],
    value_sets: &[Vec<ZiValue>],
    policy: ZiMatchPolicy,
) -> Result<ZiDataset> {
    if names.len() != value_sets.len() {
        return Err(ZiError::invalid_config(format!(
            "record suppression got {} columns but {} value sets",
            names.len(),
            value_sets.len()
        )));
    }
    dataset.require_columns(names)?;
    if dataset.row_count() == 0 || names.is_empty() {
        return Ok(dataset.clone());
    }

    let mut hits: Vec<Vec<bool>> = Vec::with_capacity(names.len());
    for (name, forbidden) in names.iter().zip(value_sets) {
        let keys: HashSet<String> = forbidden.iter().map(ZiValue::key).collect();
        let column = dataset.column(name.as_ref())?;
        hits.push(column.values.iter().map(|v| keys.contains(&v.key())).collect());
    }

    let keep: Vec<bool> = (0..dataset.row_count())
        .map(|row| {
            let matched = match policy {
                ZiMatchPolicy::Any => hits.iter().any(|h| h[row]),
                ZiMatchPolicy::All => hits.iter().all(|h| h[row]),
            };
            !matched
        })
        .collect();

    let out = dataset.filter_rows(&keep);
    log::debug!(
        "suppress.records: rows removed - removed={}, remaining={}",
        dataset.row_count() - out.row_count(),
        out.row_count()
    );
    Ok(out)
}

#[derive(Debug)]
pub struct ZiSuppressColumns {
    columns: Vec<String>,
}

impl ZiSuppressColumns {
    #[allow(non_snake_case)]
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }
}

impl ZiOperator for ZiSuppressColumns {
    fn name(&self) -> &'static str {
        "suppress.columns"
    }

    fn apply(&self, dataset: &ZiDataset, _context: &mut ZiContext) -> Result<ZiDataset> {
        suppress_columns(dataset, &self.columns)
    }
}

#[derive(Debug)]
pub struct ZiSuppressRecords {
    columns: Vec<String>,
    values: Vec<Vec<ZiValue>>,
    policy: ZiMatchPolicy,
}

impl ZiSuppressRecords {
    #[allow(non_snake_case)]
    pub fn new(columns: Vec<String>, values: Vec<Vec<ZiValue>>, policy: ZiMatchPolicy) -> Self {
        Self {
            columns,
            values,
            policy,
        }
    }
}

impl ZiOperator for ZiSuppressRecords {
    fn name(&self) -> &'static str {
        "suppress.records"
    }

    fn apply(&self, dataset: &ZiDataset, _context: &mut ZiContext) -> Result<ZiDataset> {
        suppress_records(dataset, &self.columns, &self.values, self.policy)
    }
}

fn string_list(value: Option<&Value>, operator: &str, key: &str) -> Result<Vec<String>> {
    value
        .and_then(Value::as_array)
        .ok_or_else(|| ZiError::invalid_config(format!("{operator} requires array '{key}'")))?
        .iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                ZiError::invalid_config(format!("{operator} '{key}' entries must be strings"))
            })
        })
        .collect()
}

#[allow(non_snake_case)]
pub fn suppress_columns_factory(config: &Value) -> Result<Box<dyn ZiOperator + Send + Sync>> {
    let obj = config
        .as_object()
        .ok_or_else(|| ZiError::invalid_config("suppress.columns config must be object"))?;
    let columns = string_list(obj.get("columns"), "suppress.columns", "columns")?;
    Ok(Box::new(ZiSuppressColumns::new(columns)))
}

#[allow(non_snake_case)]
pub fn suppress_records_factory(config: &Value) -> Result<Box<dyn ZiOperator + Send + Sync>> {
    let obj = config
        .as_object()
        .ok_or_else(|| ZiError::invalid_config("suppress.records config must be object"))?;
    let columns = string_list(obj.get("columns"), "suppress.records", "columns")?;

    let values = obj
        .get("values")
        .and_then(Value::as_array)
        .ok_or_else(|| ZiError::invalid_config("suppress.records requires array 'values'"))?
        .iter()
        .map(|set| {
            set.as_array()
                .ok_or_else(|| {
                    ZiError::invalid_config("suppress.records 'values' entries must be arrays")
                })?
                .iter()
                .map(ZiValue::from_json)
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let policy = match obj.get("policy") {
        None => ZiMatchPolicy::default(),
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| ZiError::invalid_config(format!("suppress.records 'policy': {e}")))?,
    };

    if columns.len() != values.len() {
        return Err(ZiError::invalid_config(
            "suppress.records needs one value set per column",
        ));
    }
    Ok(Box::new(ZiSuppressRecords::new(columns, values, policy)))
}
