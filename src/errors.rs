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

//! # Zi Anon Error Module
//!
//! This module defines the error types used throughout the anonymization
//! engine for consistent error handling and reporting.
//!
//! ## Error Categories
//!
//! - **UnknownColumn**: A referenced column does not exist in the dataset
//! - **OutOfRangeValue**: A value falls outside every bucket with no catch-all
//! - **GenerationExhausted**: Pseudonym collision retries were used up
//! - **InvalidConfiguration**: Malformed operator parameters
//! - **EmptyColumnSet**: k-anonymity was asked for with no quasi-identifiers
//! - **TypeMismatch**: A column holds values the operator cannot transform
//! - **Schema**: The dataset itself is malformed (ragged or duplicate columns)
//! - **Operator**: Wraps the failure of a pipeline stage with its name
//! - **Pipeline**: Pipeline orchestration failures
//! - **Serde**: Serialization/deserialization errors
//!
//! Every failing call reports synchronously and leaves the caller's dataset
//! and pseudonym tables untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Zi Anon.
pub type Result<T> = std::result::Result<T, ZiError>;

/// Canonical error enumeration for Zi Anon.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ZiError {
    /// A referenced column is absent from the dataset.
    #[error("unknown column '{column}'")]
    UnknownColumn { column: String },

    /// A value fell outside every bucket interval and no catch-all is set.
    #[error("value {value} in column '{column}' is outside every bucket")]
    OutOfRangeValue { column: String, value: String },

    /// Pseudonym generation kept colliding until the retry budget ran out.
    #[error("pseudonym generation for column '{column}' exhausted after {attempts} attempts")]
    GenerationExhausted { column: String, attempts: usize },

    /// Operator parameters are malformed.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// k-anonymity requires at least one quasi-identifier column.
    #[error("quasi-identifier column set is empty")]
    EmptyColumnSet,

    /// A column holds a value type the operator does not accept.
    #[error("column '{column}' expected {expected} values but found {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// The dataset layout is malformed.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Failure raised by a pipeline stage, tagged with the stage's operator name.
    #[error("operator '{operator}' failed: {source}")]
    Operator {
        operator: String,
        source: Box<ZiError>,
    },

    /// Failures that occur while orchestrating a pipeline.
    #[error("pipeline error at stage '{stage}': {message}")]
    Pipeline { stage: String, message: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),
}

impl From<serde_json::Error> for ZiError {
    fn from(err: serde_json::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

impl From<serde_yaml::Error> for ZiError {
    fn from(err: serde_yaml::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

impl ZiError {
    /// Helper to construct unknown column errors.
    pub fn unknown_column(column: impl Into<String>) -> Self {
        ZiError::UnknownColumn {
            column: column.into(),
        }
    }

    /// Helper to construct configuration errors.
    pub fn invalid_config<T: Into<String>>(message: T) -> Self {
        ZiError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Helper to construct schema errors.
    pub fn schema<T: Into<String>>(message: T) -> Self {
        ZiError::Schema {
            message: message.into(),
        }
    }

    pub fn type_mismatch(
        column: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        ZiError::TypeMismatch {
            column: column.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Helper to wrap a stage failure with its operator name.
    pub fn operator(name: impl Into<String>, source: ZiError) -> Self {
        ZiError::Operator {
            operator: name.into(),
            source: Box::new(source),
        }
    }

    /// Helper to construct pipeline errors.
    pub fn pipeline(stage: impl Into<String>, message: impl Into<String>) -> Self {
        ZiError::Pipeline {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Returns the innermost error, looking through operator wrappers.
    pub fn root(&self) -> &ZiError {
        match self {
            ZiError::Operator { source, .. } => source.root(),
            other => other,
        }
    }
}
