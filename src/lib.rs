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

//! # Zi Anon Library
//!
//! Privacy-preserving transformations for in-memory tabular datasets.
//!
//! ## Module Overview
//!
//! - **dataset**: Named, equal-length columns of nullable values
//! - **operator**: The operator trait and execution helper
//! - **operators**: Masking, pseudonymization, perturbation, generalization,
//!   suppression, and shuffling
//! - **context**: Caller-owned session holding pseudonym key tables
//! - **pipeline**: Config-driven sequential composition of operators
//! - **metrics**: k-anonymity and equivalence classes
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use zianon::{ZiColumn, ZiContext, ZiDataset, ZiPipelineBuilder};
//!
//! let dataset = ZiDataset::from_columns(vec![
//!     ZiColumn::from_values("ID", ["S1234567A", "S7654321B"]),
//!     ZiColumn::from_values("Age", [34i64, 51]),
//! ])?;
//!
//! let pipeline = ZiPipelineBuilder::with_defaults().build_from_config(&[
//!     json!({"operator": "pseudonymize", "config": {"column": "ID"}}),
//!     json!({"operator": "perturb.numeric", "config": {"column": "Age", "preset": "age"}}),
//! ])?;
//!
//! let mut context = ZiContext::new();
//! let anonymized = pipeline.run(&dataset, &mut context)?;
//! # Ok::<(), zianon::ZiError>(())
//! ```
//!
//! ## Randomness
//!
//! Every random operator takes an optional seed. With a seed the output is
//! reproducible; without one the generator draws from OS entropy.
//!
//! ## Error Handling
//!
//! All operations return `Result<T, ZiError>`. Operators never leave a
//! partially modified dataset or key table behind when they fail.

pub mod context;
pub mod dataset;
pub mod errors;
pub mod metrics;
pub mod operator;
pub mod operators;
pub mod pipeline;

pub use context::ZiContext;
pub use dataset::{ZiColumn, ZiDataset, ZiValue, ZI_DATE_FORMAT};
pub use errors::{Result, ZiError};
pub use metrics::{
    equivalence_classes, is_k_anonymous, k_anonymity, ZiAnonymityMetrics, ZiEquivalenceClasses,
};
pub use operator::{execute_operator, ZiOperator};
pub use pipeline::{ZiPipeline, ZiPipelineBuilder};

pub use operators::generalize::{
    bucket, generalize_date, mean_generalize, ZiBinValue, ZiBinning, ZiBucket, ZiBucketSpec,
    ZiClosedSide, ZiDateUnit, ZiGeneralizeDate, ZiGeneralizeMean,
};
pub use operators::mask::{
    mask_email, mask_id, ZiEmailMaskPolicy, ZiMaskEmail, ZiMaskId, ZiMaskOutcome, ZiMaskPolicy,
};
pub use operators::perturb::{
    perturb, perturb_dates, round_to_base, ZiNoiseDistribution, ZiNoiseSpec, ZiPerturbDate,
    ZiPerturbNumeric, ZiRounding,
};
pub use operators::pseudonym::{
    pseudonymize, ZiPseudonymConfig, ZiPseudonymTable, ZiPseudonymize, ZI_NULL_PSEUDONYM,
};
pub use operators::shuffle::{shuffle, ZiShuffle};
pub use operators::suppress::{
    suppress_columns, suppress_records, ZiMatchPolicy, ZiSuppressColumns, ZiSuppressRecords,
};
