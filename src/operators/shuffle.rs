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

use rand::seq::SliceRandom;
use serde_json::Value;

use crate::context::ZiContext;
use crate::dataset::ZiDataset;
use crate::errors::{Result, ZiError};
use crate::operator::ZiOperator;
use crate::operators::seeded_rng;

/// Row order produced by a Fisher-Yates shuffle of `0..row_count`.
pub fn permutation(row_count: usize, seed: Option<u64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..row_count).collect();
    let mut rng = seeded_rng(seed);
    order.shuffle(&mut rng);
    order
}

/// Reorders rows, moving every column together.
pub fn shuffle(dataset: &ZiDataset, seed: Option<u64>) -> ZiDataset {
    if dataset.row_count() <= 1 {
        return dataset.clone();
    }
    dataset.take_rows(&permutation(dataset.row_count(), seed))
}

#[derive(Debug)]
pub struct ZiShuffle {
    seed: Option<u64>,
}

impl ZiShuffle {
    #[allow(non_snake_case)]
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }
}

impl ZiOperator for ZiShuffle {
    fn name(&self) -> &'static str {
        "shuffle"
    }

    fn apply(&self, dataset: &ZiDataset, _context: &mut ZiContext) -> Result<ZiDataset> {
        log::debug!(
            "shuffle: rows permuted - rows={}, seeded={}",
            dataset.row_count(),
            self.seed.is_some()
        );
        Ok(shuffle(dataset, self.seed))
    }
}

#[allow(non_snake_case)]
pub fn shuffle_factory(config: &Value) -> Result<Box<dyn ZiOperator + Send + Sync>> {
    if config.is_null() {
        return Ok(Box::new(ZiShuffle::new(None)));
    }
    let obj = config
        .as_object()
        .ok_or_else(|| ZiError::invalid_config("shuffle config must be object"))?;

    let seed = match obj.get("seed") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            v.as_u64()
                .ok_or_else(|| ZiError::invalid_config("shuffle 'seed' must be unsigned integer"))?,
        ),
    };

    Ok(Box::new(ZiShuffle::new(seed)))
}
