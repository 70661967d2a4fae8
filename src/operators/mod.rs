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

//! # Operators Module
//!
//! Privacy transforms available in Zi Anon. Each submodule exposes plain
//! functions over [`ZiColumn`](crate::dataset::ZiColumn) or
//! [`ZiDataset`](crate::dataset::ZiDataset), an operator struct implementing
//! [`ZiOperator`](crate::operator::ZiOperator), and a `*_factory` used by the
//! pipeline builder.
//!
//! ## Operator Categories
//!
//! - **mask**: Length-preserving identifier and email masking
//! - **pseudonym**: Consistent random pseudonyms backed by a key table
//! - **perturb**: Bounded numeric noise and date shifting
//! - **generalize**: Date truncation, mean binning, and labelled buckets
//! - **suppress**: Column removal and record suppression
//! - **shuffle**: Row permutation

use rand::rngs::StdRng;
use rand::SeedableRng;

pub mod generalize;
pub mod mask;
pub mod perturb;
pub mod pseudonym;
pub mod shuffle;
pub mod suppress;

/// Deterministic generator for `Some(seed)`, OS entropy otherwise.
pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}
