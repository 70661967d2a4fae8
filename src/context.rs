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

//! # Zi Context Module
//!
//! The context is the caller's anonymization session. It owns one
//! [`ZiPseudonymTable`] per column context so that a value pseudonymized in
//! one call keeps its pseudonym in every later call of the same session.
//!
//! The engine never keeps a context of its own: callers create it, pass it
//! by `&mut` to operators and pipelines, and persist it if they need the
//! key tables across sessions. It is not synchronized; share it between
//! threads only behind the caller's own lock.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::operators::pseudonym::ZiPseudonymTable;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZiContext {
    tables: BTreeMap<String, ZiPseudonymTable>,
}

impl ZiContext {
    #[allow(non_snake_case)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, context: &str) -> Option<&ZiPseudonymTable> {
        self.tables.get(context)
    }

    pub fn table_mut(&mut self, context: &str) -> Option<&mut ZiPseudonymTable> {
        self.tables.get_mut(context)
    }

    /// Installs a previously persisted table, replacing any existing one.
    pub fn insert_table(&mut self, context: impl Into<String>, table: ZiPseudonymTable) {
        self.tables.insert(context.into(), table);
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
