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

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ZiContext;
use crate::dataset::{ZiColumn, ZiDataset, ZiValue};
use crate::errors::{Result, ZiError};
use crate::operator::ZiOperator;

fn email_shape() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("email pattern is valid"))
}

/// Visible characters kept around a masked identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiMaskPolicy {
    pub visible_leading: usize,
    pub visible_trailing: usize,
    pub mask_char: char,
}

impl Default for ZiMaskPolicy {
    fn default() -> Self {
        Self {
            visible_leading: 0,
            visible_trailing: 3,
            mask_char: '*',
        }
    }
}

/// How much of an email's local part survives masking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiEmailMaskPolicy {
    pub visible_prefix: usize,
    pub mask_char: char,
    /// Fixed number of mask characters; `None` keeps the local part length.
    pub mask_count: Option<usize>,
}

impl Default for ZiEmailMaskPolicy {
    fn default() -> Self {
        Self {
            visible_prefix: 1,
            mask_char: '*',
            mask_count: Some(5),
        }
    }
}

/// Masked column plus per-call counters.
#[derive(Clone, Debug, PartialEq)]
pub struct ZiMaskOutcome {
    pub column: ZiColumn,
    pub masked: usize,
    pub skipped: usize,
}

fn mask_text(text: &str, policy: &ZiMaskPolicy) -> String {
    let chars: Vec<char> = text.chars().collect();
    let lead = policy.visible_leading.min(chars.len());
    let trail = policy.visible_trailing.min(chars.len() - lead);
    let hidden_end = chars.len() - trail;

    let mut out = String::with_capacity(text.len());
    out.extend(&chars[..lead]);
    out.extend(std::iter::repeat(policy.mask_char).take(hidden_end - lead));
    out.extend(&chars[hidden_end..]);
    out
}

fn mask_address(address: &str, policy: &ZiEmailMaskPolicy) -> Option<String> {
    if !email_shape().is_match(address) {
        return None;
    }
    let (local, domain) = address.split_once('@')?;
    let prefix: String = local.chars().take(policy.visible_prefix).collect();
    let hidden = policy
        .mask_count
        .unwrap_or_else(|| local.chars().count().saturating_sub(policy.visible_prefix));
    let mut out = prefix;
    out.extend(std::iter::repeat(policy.mask_char).take(hidden));
    out.push('@');
    out.push_str(domain);
    Some(out)
}

fn mask_with(column: &ZiColumn, mut mask: impl FnMut(&str) -> Option<String>) -> ZiMaskOutcome {
    let mut masked = 0;
    let mut skipped = 0;
    let values = column
        .values
        .iter()
        .map(|value| match value.as_str().and_then(&mut mask) {
            Some(text) => {
                masked += 1;
                ZiValue::Str(text)
            }
            None => {
                skipped += 1;
                value.clone()
            }
        })
        .collect();
    ZiMaskOutcome {
        column: column.with_values(values),
        masked,
        skipped,
    }
}

/// Masks fixed-format identifiers, preserving their length.
///
/// Non-string and null values are left as they are and counted as skipped.
pub fn mask_id(column: &ZiColumn, policy: &ZiMaskPolicy) -> ZiMaskOutcome {
    mask_with(column, |text| Some(mask_text(text, policy)))
}

/// Masks the local part of email addresses and keeps the domain.
///
/// Strings that are not shaped like an address are skipped.
pub fn mask_email(column: &ZiColumn, policy: &ZiEmailMaskPolicy) -> ZiMaskOutcome {
    mask_with(column, |text| mask_address(text, policy))
}

#[derive(Debug)]
pub struct ZiMaskId {
    column: String,
    policy: ZiMaskPolicy,
}

impl ZiMaskId {
    #[allow(non_snake_case)]
    pub fn new(column: impl Into<String>, policy: ZiMaskPolicy) -> Self {
        Self {
            column: column.into(),
            policy,
        }
    }
}

impl ZiOperator for ZiMaskId {
    fn name(&self) -> &'static str {
        "mask.id"
    }

    fn apply(&self, dataset: &ZiDataset, _context: &mut ZiContext) -> Result<ZiDataset> {
        let outcome = mask_id(dataset.column(&self.column)?, &self.policy);
        log::debug!(
            "mask.id: column masked - column={}, masked={}, skipped={}",
            self.column,
            outcome.masked,
            outcome.skipped
        );
        dataset.with_replaced(outcome.column)
    }
}

#[derive(Debug)]
pub struct ZiMaskEmail {
    column: String,
    policy: ZiEmailMaskPolicy,
}

impl ZiMaskEmail {
    #[allow(non_snake_case)]
    pub fn new(column: impl Into<String>, policy: ZiEmailMaskPolicy) -> Self {
        Self {
            column: column.into(),
            policy,
        }
    }
}

impl ZiOperator for ZiMaskEmail {
    fn name(&self) -> &'static str {
        "mask.email"
    }

    fn apply(&self, dataset: &ZiDataset, _context: &mut ZiContext) -> Result<ZiDataset> {
        let outcome = mask_email(dataset.column(&self.column)?, &self.policy);
        log::debug!(
            "mask.email: column masked - column={}, masked={}, skipped={}",
            self.column,
            outcome.masked,
            outcome.skipped
        );
        dataset.with_replaced(outcome.column)
    }
}

fn column_from_config(config: &Value, operator: &str) -> Result<String> {
    config
        .as_object()
        .ok_or_else(|| ZiError::invalid_config(format!("{operator} config must be object")))?
        .get("column")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ZiError::invalid_config(format!("{operator} requires string 'column'")))
}

#[allow(non_snake_case)]
pub fn mask_id_factory(config: &Value) -> Result<Box<dyn ZiOperator + Send + Sync>> {
    let column = column_from_config(config, "mask.id")?;
    let policy: ZiMaskPolicy = serde_json::from_value(config.clone())
        .map_err(|e| ZiError::invalid_config(format!("mask.id: {e}")))?;
    Ok(Box::new(ZiMaskId::new(column, policy)))
}

#[allow(non_snake_case)]
pub fn mask_email_factory(config: &Value) -> Result<Box<dyn ZiOperator + Send + Sync>> {
    let column = column_from_config(config, "mask.email")?;
    let policy: ZiEmailMaskPolicy = serde_json::from_value(config.clone())
        .map_err(|e| ZiError::invalid_config(format!("mask.email: {e}")))?;
    Ok(Box::new(ZiMaskEmail::new(column, policy)))
}
