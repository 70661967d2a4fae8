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

//! # Pseudonym Registry
//!
//! Replaces identifiers with generated surrogates while keeping a key table
//! that maps every original value to its pseudonym. The table is owned by
//! the caller and threaded through each call; the same value always gets
//! the same pseudonym from the same table, and no two values ever share one.
//!
//! Tokens look like `abcde123456789`: lowercase letters followed by a number
//! with a fixed digit count. A freshly drawn token that is already taken is
//! redrawn, at most `max_retries` times.

use std::collections::{BTreeMap, HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::context::ZiContext;
use crate::dataset::{ZiColumn, ZiDataset, ZiValue};
use crate::errors::{Result, ZiError};
use crate::operator::ZiOperator;

/// Pseudonym emitted for every null value.
pub const ZI_NULL_PSEUDONYM: &str = "<null>";

/// Mapping from original value to pseudonym for one column context.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct ZiPseudonymTable {
    forward: BTreeMap<String, String>,
    reverse: HashMap<String, String>,
}

impl ZiPseudonymTable {
    #[allow(non_snake_case)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Pseudonym stored for `original`, if any.
    pub fn get(&self, original: &str) -> Option<&str> {
        self.forward.get(original).map(String::as_str)
    }

    /// Original value behind `pseudonym`, if any.
    pub fn reverse(&self, pseudonym: &str) -> Option<&str> {
        self.reverse.get(pseudonym).map(String::as_str)
    }

    pub fn contains_pseudonym(&self, pseudonym: &str) -> bool {
        self.reverse.contains_key(pseudonym)
    }

    /// Records a mapping.
    ///
    /// Re-inserting an identical pair is a no-op. Remapping a value or
    /// reusing a pseudonym for a different value fails, since either would
    /// break the one-to-one mapping.
    pub fn insert(&mut self, original: impl Into<String>, pseudonym: impl Into<String>) -> Result<()> {
        let original = original.into();
        let pseudonym = pseudonym.into();
        if let Some(existing) = self.forward.get(&original) {
            if *existing == pseudonym {
                return Ok(());
            }
            return Err(ZiError::invalid_config(format!(
                "value '{original}' is already mapped to '{existing}'"
            )));
        }
        if let Some(owner) = self.reverse.get(&pseudonym) {
            return Err(ZiError::invalid_config(format!(
                "pseudonym '{pseudonym}' already belongs to '{owner}'"
            )));
        }
        self.reverse.insert(pseudonym.clone(), original.clone());
        self.forward.insert(original, pseudonym);
        Ok(())
    }

    /// Iterates `(original, pseudonym)` pairs in original-value order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forward.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl TryFrom<BTreeMap<String, String>> for ZiPseudonymTable {
    type Error = ZiError;

    fn try_from(entries: BTreeMap<String, String>) -> Result<Self> {
        let mut table = ZiPseudonymTable::new();
        for (original, pseudonym) in entries {
            table.insert(original, pseudonym)?;
        }
        Ok(table)
    }
}

impl From<ZiPseudonymTable> for BTreeMap<String, String> {
    fn from(table: ZiPseudonymTable) -> Self {
        table.forward
    }
}

/// Token shape and generation limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiPseudonymConfig {
    /// Number of leading lowercase letters.
    pub letters: usize,
    /// Number of trailing digits; the number never starts with zero.
    pub digits: usize,
    /// Redraws allowed after the first colliding token.
    pub max_retries: usize,
    /// Seed for reproducible tokens; `None` draws from process entropy.
    pub seed: Option<u64>,
    pub null_sentinel: String,
}

impl Default for ZiPseudonymConfig {
    fn default() -> Self {
        Self {
            letters: 5,
            digits: 9,
            max_retries: 16,
            seed: None,
            null_sentinel: ZI_NULL_PSEUDONYM.to_string(),
        }
    }
}

impl ZiPseudonymConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn token_length(&self) -> usize {
        self.letters + self.digits
    }

    pub fn validate(&self) -> Result<()> {
        if self.token_length() == 0 {
            return Err(ZiError::invalid_config(
                "pseudonym tokens need at least one letter or digit",
            ));
        }
        if self.digits > 18 {
            return Err(ZiError::invalid_config(
                "pseudonym tokens support at most 18 digits",
            ));
        }
        Ok(())
    }

    fn draw_token(&self, rng: &mut StdRng) -> String {
        let mut token = String::with_capacity(self.token_length());
        for _ in 0..self.letters {
            token.push((b'a' + rng.gen_range(0..26u8)) as char);
        }
        if self.digits > 0 {
            let low = 10u64.pow(self.digits as u32 - 1);
            let high = 10u64.pow(self.digits as u32);
            token.push_str(&rng.gen_range(low..high).to_string());
        }
        token
    }
}

/// Replaces every value of `column` with its pseudonym from `table`.
///
/// Values missing from the table get a new token, which is added to the
/// table only if the whole column succeeds. Nulls map to the configured
/// sentinel and never enter the table.
///
/// The table is keyed by each value's text form, so cells that print the
/// same share one pseudonym regardless of type: `Int(30)`, `Float(30.0)` and
/// `Str("30")` all map to the token issued for `"30"`.
pub fn pseudonymize(
    column: &ZiColumn,
    table: &mut ZiPseudonymTable,
    config: &ZiPseudonymConfig,
) -> Result<ZiColumn> {
    config.validate()?;

    let mut entropy = config.seed.is_none().then(StdRng::from_entropy);
    let mut staged: Vec<(String, String)> = Vec::new();
    let mut staged_by_value: HashMap<String, usize> = HashMap::new();
    let mut staged_tokens: HashSet<String> = HashSet::new();
    let mut values = Vec::with_capacity(column.len());

    for value in &column.values {
        if value.is_null() {
            values.push(ZiValue::Str(config.null_sentinel.clone()));
            continue;
        }

        let original = value.to_string();
        if let Some(existing) = table.get(&original) {
            values.push(ZiValue::Str(existing.to_string()));
            continue;
        }
        if let Some(&idx) = staged_by_value.get(&original) {
            values.push(ZiValue::Str(staged[idx].1.clone()));
            continue;
        }

        let mut rng = match (config.seed, entropy.as_mut()) {
            (Some(seed), _) => StdRng::seed_from_u64(xxh3_64_with_seed(original.as_bytes(), seed)),
            (None, Some(shared)) => StdRng::seed_from_u64(shared.gen()),
            (None, None) => StdRng::from_entropy(),
        };

        let attempts = config.max_retries + 1;
        let mut token = None;
        for attempt in 0..attempts {
            let candidate = config.draw_token(&mut rng);
            let taken = candidate == config.null_sentinel
                || table.contains_pseudonym(&candidate)
                || staged_tokens.contains(&candidate);
            if !taken {
                token = Some(candidate);
                break;
            }
            log::debug!(
                "pseudonym.collision: regenerating token - column={}, attempt={}",
                column.name,
                attempt + 1
            );
        }

        let token = token.ok_or_else(|| {
            log::warn!(
                "pseudonym.exhausted: no free token found - column={}, attempts={}, table_size={}",
                column.name,
                attempts,
                table.len() + staged.len()
            );
            ZiError::GenerationExhausted {
                column: column.name.clone(),
                attempts,
            }
        })?;

        staged_tokens.insert(token.clone());
        staged_by_value.insert(original.clone(), staged.len());
        staged.push((original, token.clone()));
        values.push(ZiValue::Str(token));
    }

    let new_entries = staged.len();
    for (original, token) in staged {
        table.insert(original, token)?;
    }

    log::debug!(
        "pseudonym.apply: column pseudonymized - column={}, rows={}, new_entries={}, table_size={}",
        column.name,
        column.len(),
        new_entries,
        table.len()
    );

    Ok(column.with_values(values))
}

/// Pseudonymizes one column using the table stored in the [`ZiContext`].
#[derive(Debug)]
pub struct ZiPseudonymize {
    column: String,
    context: Option<String>,
    config: ZiPseudonymConfig,
}

impl ZiPseudonymize {
    #[allow(non_snake_case)]
    pub fn new(column: impl Into<String>, config: ZiPseudonymConfig) -> Self {
        Self {
            column: column.into(),
            context: None,
            config,
        }
    }

    /// Shares the key table under `context` instead of the column name.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    fn context_name(&self) -> &str {
        self.context.as_deref().unwrap_or(&self.column)
    }
}

impl ZiOperator for ZiPseudonymize {
    fn name(&self) -> &'static str {
        "pseudonymize"
    }

    fn apply(&self, dataset: &ZiDataset, context: &mut ZiContext) -> Result<ZiDataset> {
        let column = dataset.column(&self.column)?;
        let name = self.context_name();

        let pseudonymized = match context.table_mut(name) {
            Some(table) => pseudonymize(column, table, &self.config)?,
            None => {
                let mut table = ZiPseudonymTable::new();
                let out = pseudonymize(column, &mut table, &self.config)?;
                context.insert_table(name, table);
                out
            }
        };

        dataset.with_replaced(pseudonymized)
    }
}

#[allow(non_snake_case)]
pub fn pseudonymize_factory(config: &Value) -> Result<Box<dyn ZiOperator + Send + Sync>> {
    let obj = config
        .as_object()
        .ok_or_else(|| ZiError::invalid_config("pseudonymize config must be object"))?;

    let column = obj
        .get("column")
        .and_then(Value::as_str)
        .ok_or_else(|| ZiError::invalid_config("pseudonymize requires string 'column'"))?;

    let settings: ZiPseudonymConfig = serde_json::from_value(config.clone())
        .map_err(|e| ZiError::invalid_config(format!("pseudonymize: {e}")))?;
    settings.validate()?;

    let mut operator = ZiPseudonymize::new(column, settings);
    if let Some(shared) = obj.get("context").and_then(Value::as_str) {
        operator = operator.with_context(shared);
    }
    Ok(Box::new(operator))
}
