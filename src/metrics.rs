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

//! # k-Anonymity Metrics
//!
//! Rows are grouped into equivalence classes by the tuple of their
//! quasi-identifier keys ([`ZiValue::key`](crate::dataset::ZiValue::key)).
//! A null is an ordinary group value, so rows with a null quasi-identifier
//! group together rather than with any concrete value.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::dataset::ZiDataset;
use crate::errors::{Result, ZiError};

/// Class key (one entry per quasi-identifier) to the rows in that class.
pub type ZiEquivalenceClasses = BTreeMap<Vec<String>, Vec<usize>>;

pub fn equivalence_classes<S: AsRef<str>>(
    dataset: &ZiDataset,
    columns: &[S],
) -> Result<ZiEquivalenceClasses> {
    if columns.is_empty() {
        return Err(ZiError::EmptyColumnSet);
    }
    let selected = columns
        .iter()
        .map(|name| dataset.column(name.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let mut classes = ZiEquivalenceClasses::new();
    for row in 0..dataset.row_count() {
        let key: Vec<String> = selected.iter().map(|c| c.values[row].key()).collect();
        classes.entry(key).or_default().push(row);
    }
    Ok(classes)
}

/// Size of the smallest equivalence class; `0` for a dataset without rows.
pub fn k_anonymity<S: AsRef<str>>(dataset: &ZiDataset, columns: &[S]) -> Result<usize> {
    let classes = equivalence_classes(dataset, columns)?;
    Ok(classes.values().map(Vec::len).min().unwrap_or(0))
}

pub fn is_k_anonymous<S: AsRef<str>>(dataset: &ZiDataset, columns: &[S], k: usize) -> Result<bool> {
    Ok(k_anonymity(dataset, columns)? >= k)
}

/// Summary of a dataset's re-identification risk over a quasi-identifier set.
#[derive(Debug, Serialize, Default, PartialEq, Eq)]
pub struct ZiAnonymityMetrics {
    pub k: usize,
    pub class_count: usize,
    pub row_count: usize,
    pub target_k: usize,
    /// Rows that sit in classes smaller than `target_k`.
    pub rows_below_target: usize,
    pub smallest_classes: Vec<Vec<String>>,
}

impl ZiAnonymityMetrics {
    #[allow(non_snake_case)]
    pub fn compute<S: AsRef<str>>(dataset: &ZiDataset, columns: &[S], target_k: usize) -> Result<Self> {
        let classes = equivalence_classes(dataset, columns)?;
        let k = classes.values().map(Vec::len).min().unwrap_or(0);

        let rows_below_target = classes
            .values()
            .filter(|rows| rows.len() < target_k)
            .map(Vec::len)
            .sum();
        let smallest_classes = classes
            .iter()
            .filter(|(_, rows)| rows.len() == k)
            .map(|(key, _)| key.clone())
            .collect();

        Ok(Self {
            k,
            class_count: classes.len(),
            row_count: dataset.row_count(),
            target_k,
            rows_below_target,
            smallest_classes,
        })
    }

    pub fn satisfies_target(&self) -> bool {
        self.k >= self.target_k
    }

    pub fn as_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
