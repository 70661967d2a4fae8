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

//! # Zi Pipeline Module
//!
//! Sequential composition of anonymization operators.
//!
//! A pipeline definition is a list of steps of the form
//! `{"operator": "<name>", "config": {...}}`, given as JSON values or as a
//! YAML sequence. [`ZiPipelineBuilder::with_defaults`] knows every bundled
//! operator; custom operators can be added with
//! [`ZiPipelineBuilder::register`].
//!
//! Running a pipeline is all-or-nothing with respect to the caller's
//! [`ZiContext`]: stages work on a scratch copy that replaces the caller's
//! context only after the last stage succeeds.

use std::collections::HashMap;

use serde_json::Value;

use crate::context::ZiContext;
use crate::dataset::ZiDataset;
use crate::errors::{Result, ZiError};
use crate::metrics::ZiAnonymityMetrics;
use crate::operator::{execute_operator, ZiOperator};
use crate::operators::{generalize, mask, perturb, pseudonym, shuffle, suppress};

/// Constructor signature shared by every registered operator.
pub type OperatorFactory = fn(&Value) -> Result<Box<dyn ZiOperator + Send + Sync>>;

/// Simple linear pipeline composed of sequential operators.
#[derive(Debug)]
pub struct ZiPipeline {
    stages: Vec<Box<dyn ZiOperator + Send + Sync>>,
}

impl ZiPipeline {
    #[allow(non_snake_case)]
    pub fn new(stages: Vec<Box<dyn ZiOperator + Send + Sync>>) -> Self {
        ZiPipeline { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Ensures the pipeline contains at least one stage.
    pub fn validate(&self) -> Result<()> {
        if self.stages.is_empty() {
            return Err(ZiError::pipeline("pipeline", "no stages configured"));
        }
        Ok(())
    }

    /// Runs every stage in order.
    pub fn run(&self, dataset: &ZiDataset, context: &mut ZiContext) -> Result<ZiDataset> {
        self.run_with_progress(dataset, context, |_, _, _| {})
    }

    /// Runs every stage in order, reporting `(stage, rows_before, rows_after)`.
    pub fn run_with_progress(
        &self,
        dataset: &ZiDataset,
        context: &mut ZiContext,
        progress: impl Fn(&str, usize, usize),
    ) -> Result<ZiDataset> {
        log::info!(
            "pipeline.run: starting - stages={}, rows={}, columns={}",
            self.stages.len(),
            dataset.row_count(),
            dataset.column_count()
        );

        let mut scratch = context.clone();
        let mut current = dataset.clone();
        for (index, stage) in self.stages.iter().enumerate() {
            let before = current.row_count();
            current = execute_operator(stage.as_ref(), &current, &mut scratch).map_err(|err| {
                log::warn!(
                    "pipeline.stage: failed - index={}, operator={}, error={}",
                    index,
                    stage.name(),
                    err.root()
                );
                err
            })?;
            log::debug!(
                "pipeline.stage: completed - index={}, operator={}, rows_before={}, rows_after={}",
                index,
                stage.name(),
                before,
                current.row_count()
            );
            progress(stage.name(), before, current.row_count());
        }

        *context = scratch;
        log::info!(
            "pipeline.run: finished - rows={}, columns={}",
            current.row_count(),
            current.column_count()
        );
        Ok(current)
    }

    /// Runs the pipeline and measures k-anonymity of the result.
    pub fn run_with_metrics<S: AsRef<str>>(
        &self,
        dataset: &ZiDataset,
        context: &mut ZiContext,
        quasi_identifiers: &[S],
        target_k: usize,
    ) -> Result<(ZiDataset, ZiAnonymityMetrics)> {
        let processed = self.run(dataset, context)?;
        let metrics = ZiAnonymityMetrics::compute(&processed, quasi_identifiers, target_k)?;
        Ok((processed, metrics))
    }
}

/// Builder that knows how to instantiate operators from configuration.
pub struct ZiPipelineBuilder {
    factories: HashMap<String, OperatorFactory>,
}

impl Default for ZiPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ZiPipelineBuilder {
    /// Creates an empty builder.
    #[allow(non_snake_case)]
    pub fn new() -> Self {
        ZiPipelineBuilder {
            factories: HashMap::new(),
        }
    }

    /// Creates a builder pre-loaded with the bundled operators.
    pub fn with_defaults() -> Self {
        let mut builder = Self::new();
        builder.register_defaults();
        builder
    }

    /// Registers a factory for the given operator name.
    pub fn register(&mut self, name: impl Into<String>, factory: OperatorFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn operator_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn register_defaults(&mut self) {
        self.register("mask.id", mask::mask_id_factory as OperatorFactory);
        self.register("mask.email", mask::mask_email_factory as OperatorFactory);
        self.register(
            "pseudonymize",
            pseudonym::pseudonymize_factory as OperatorFactory,
        );
        self.register(
            "perturb.numeric",
            perturb::perturb_numeric_factory as OperatorFactory,
        );
        self.register(
            "perturb.date",
            perturb::perturb_date_factory as OperatorFactory,
        );
        self.register(
            "generalize.date",
            generalize::generalize_date_factory as OperatorFactory,
        );
        self.register(
            "generalize.mean",
            generalize::generalize_mean_factory as OperatorFactory,
        );
        self.register(
            "generalize.bucket",
            generalize::bucket_factory as OperatorFactory,
        );
        self.register(
            "suppress.columns",
            suppress::suppress_columns_factory as OperatorFactory,
        );
        self.register(
            "suppress.records",
            suppress::suppress_records_factory as OperatorFactory,
        );
        self.register("shuffle", shuffle::shuffle_factory as OperatorFactory);
    }

    /// Builds a pipeline from a list of `{"operator", "config"}` steps.
    pub fn build_from_config(&self, steps: &[Value]) -> Result<ZiPipeline> {
        let mut stages = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            let object = step.as_object().ok_or_else(|| {
                ZiError::invalid_config(format!("pipeline step #{index} must be an object"))
            })?;

            let operator_name = object
                .get("operator")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ZiError::invalid_config(format!(
                        "pipeline step #{index} missing string 'operator'"
                    ))
                })?;

            let factory = self.factories.get(operator_name).ok_or_else(|| {
                ZiError::invalid_config(format!("unknown operator '{operator_name}'"))
            })?;

            let config_value = object.get("config").cloned().unwrap_or(Value::Null);
            let operator =
                factory(&config_value).map_err(|err| ZiError::operator(operator_name, err))?;
            stages.push(operator);
        }

        let pipeline = ZiPipeline::new(stages);
        pipeline.validate()?;
        log::debug!(
            "pipeline.build: pipeline assembled - stages={}",
            pipeline.len()
        );
        Ok(pipeline)
    }

    /// Builds a pipeline from a JSON array of steps.
    pub fn build_from_json(&self, text: &str) -> Result<ZiPipeline> {
        let value: Value = serde_json::from_str(text)?;
        self.build_from_value(value)
    }

    /// Builds a pipeline from a YAML sequence of steps.
    pub fn build_from_yaml(&self, text: &str) -> Result<ZiPipeline> {
        let value: Value = serde_yaml::from_str(text)?;
        self.build_from_value(value)
    }

    fn build_from_value(&self, value: Value) -> Result<ZiPipeline> {
        match value {
            Value::Array(steps) => self.build_from_config(&steps),
            _ => Err(ZiError::invalid_config(
                "pipeline definition must be a list of steps",
            )),
        }
    }
}
