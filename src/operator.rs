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

//! # Zi Operator Module
//!
//! This module defines the core operator trait and execution helper for the
//! anonymization engine. Operators are the building blocks that transform a
//! dataset snapshot within Zi pipelines.
//!
//! ## Operator Design
//!
//! An operator borrows the incoming [`ZiDataset`] and returns a new one. The
//! only state an operator may touch is the caller-owned [`ZiContext`], which
//! carries pseudonym tables between calls. Stateless operators ignore it.
//!
//! ```rust
//! use zianon::context::ZiContext;
//! use zianon::dataset::ZiDataset;
//! use zianon::errors::Result;
//! use zianon::operator::ZiOperator;
//!
//! #[derive(Debug)]
//! struct DropEverything;
//!
//! impl ZiOperator for DropEverything {
//!     fn name(&self) -> &'static str {
//!         "drop.everything"
//!     }
//!
//!     fn apply(&self, _dataset: &ZiDataset, _context: &mut ZiContext) -> Result<ZiDataset> {
//!         Ok(ZiDataset::new())
//!     }
//! }
//! ```

use crate::context::ZiContext;
use crate::dataset::ZiDataset;
use crate::errors::{Result, ZiError};

/// Contract that every anonymization operator fulfills.
pub trait ZiOperator: std::fmt::Debug {
    /// Unique, human-readable name for the operator.
    ///
    /// This name is used for logging, error messages, and registry lookup.
    fn name(&self) -> &'static str;

    /// Applies the operator to a dataset snapshot.
    ///
    /// Implementations must not modify `context` when they return an error.
    fn apply(&self, dataset: &ZiDataset, context: &mut ZiContext) -> Result<ZiDataset>;
}

/// Executes an operator, tagging any failure with the operator's name.
pub fn execute_operator(
    operator: &dyn ZiOperator,
    dataset: &ZiDataset,
    context: &mut ZiContext,
) -> Result<ZiDataset> {
    operator
        .apply(dataset, context)
        .map_err(|err| ZiError::operator(operator.name(), err))
}
