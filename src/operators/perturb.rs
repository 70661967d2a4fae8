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

//! # Perturbation Operators
//!
//! Numeric perturbation adds independent per-row noise, then rounds and
//! clamps the result:
//!
//! ```text
//! x' = clamp(round(x + noise), min, max)
//! ```
//!
//! Noise is uniform on `[-bound, bound]` or Gaussian with the given standard
//! deviation, in which case samples are clamped to `±bound` (3σ unless set)
//! so the deviation stays bounded. Gaussian samples use the Box-Muller
//! transform:
//!
//! ```text
//! Z = √(-2 ln U₁) · cos(2π U₂),   U₁, U₂ ~ Uniform(0, 1)
//! ```
//!
//! `ZiRounding::Base(unit)` floors to a multiple of `unit`; combined with no
//! noise it is plain base rounding (ages to multiples of 3, heights to 5).
//!
//! Date perturbation shifts each date by a uniform whole number of days in
//! `[-max_days, max_days]`.
//!
//! Every operator takes an optional seed; the same seed and input always
//! produce the same output.

use std::f64::consts::PI;

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ZiContext;
use crate::dataset::{ZiColumn, ZiDataset, ZiValue};
use crate::errors::{Result, ZiError};
use crate::operator::ZiOperator;
use crate::operators::seeded_rng;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZiNoiseDistribution {
    None,
    Uniform { bound: f64 },
    Gaussian { std_dev: f64, bound: Option<f64> },
}

impl Default for ZiNoiseDistribution {
    fn default() -> Self {
        Self::None
    }
}

impl ZiNoiseDistribution {
    fn validate(&self) -> Result<()> {
        match self {
            ZiNoiseDistribution::None => Ok(()),
            ZiNoiseDistribution::Uniform { bound } => {
                if !bound.is_finite() || *bound < 0.0 {
                    return Err(ZiError::invalid_config(format!(
                        "uniform noise bound must be finite and non-negative, got {bound}"
                    )));
                }
                Ok(())
            }
            ZiNoiseDistribution::Gaussian { std_dev, bound } => {
                if !std_dev.is_finite() || *std_dev <= 0.0 {
                    return Err(ZiError::invalid_config(format!(
                        "gaussian std_dev must be finite and positive, got {std_dev}"
                    )));
                }
                if let Some(b) = bound {
                    if !b.is_finite() || *b <= 0.0 {
                        return Err(ZiError::invalid_config(format!(
                            "gaussian bound must be finite and positive, got {b}"
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    fn sample(&self, rng: &mut StdRng) -> f64 {
        match self {
            ZiNoiseDistribution::None => 0.0,
            ZiNoiseDistribution::Uniform { bound } => {
                if *bound == 0.0 {
                    0.0
                } else {
                    // Scaled unit draw; `-bound..=bound` overflows near f64::MAX.
                    *bound * rng.gen_range(-1.0f64..=1.0)
                }
            }
            ZiNoiseDistribution::Gaussian { std_dev, bound } => {
                let limit = bound.unwrap_or(3.0 * std_dev);
                (standard_normal(rng) * std_dev).clamp(-limit, limit)
            }
        }
    }
}

fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZiRounding {
    None,
    Integer,
    /// Round half away from zero to this many decimal places.
    Decimals(u32),
    /// Floor to the nearest lower multiple of the unit.
    Base(f64),
}

impl Default for ZiRounding {
    fn default() -> Self {
        Self::None
    }
}

impl ZiRounding {
    fn apply(self, x: f64) -> f64 {
        match self {
            ZiRounding::None => x,
            ZiRounding::Integer => x.round(),
            ZiRounding::Decimals(places) => {
                let factor = 10f64.powi(places as i32);
                (x * factor).round() / factor
            }
            ZiRounding::Base(unit) => (x / unit).floor() * unit,
        }
    }
}

/// Parameters of a numeric perturbation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiNoiseSpec {
    pub distribution: ZiNoiseDistribution,
    pub rounding: ZiRounding,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ZiNoiseSpec {
    /// Ages: ±1 year, whole years, never negative.
    pub fn age() -> Self {
        Self {
            distribution: ZiNoiseDistribution::Uniform { bound: 1.0 },
            rounding: ZiRounding::Integer,
            min: Some(0.0),
            max: None,
        }
    }

    /// Weights: ±2 units, one decimal place, never negative.
    pub fn weight() -> Self {
        Self {
            distribution: ZiNoiseDistribution::Uniform { bound: 2.0 },
            rounding: ZiRounding::Decimals(1),
            min: Some(0.0),
            max: None,
        }
    }

    /// Heights: ±2 units, whole units, never negative.
    pub fn height() -> Self {
        Self {
            distribution: ZiNoiseDistribution::Uniform { bound: 2.0 },
            rounding: ZiRounding::Integer,
            min: Some(0.0),
            max: None,
        }
    }

    /// No noise, values floored to multiples of `unit`.
    pub fn base(unit: f64) -> Self {
        Self {
            rounding: ZiRounding::Base(unit),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.distribution.validate()?;
        match self.rounding {
            ZiRounding::Base(unit) if !unit.is_finite() || unit <= 0.0 => {
                return Err(ZiError::invalid_config(format!(
                    "base rounding unit must be finite and positive, got {unit}"
                )));
            }
            ZiRounding::Decimals(places) if places > 15 => {
                return Err(ZiError::invalid_config(format!(
                    "at most 15 decimal places are supported, got {places}"
                )));
            }
            _ => {}
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(ZiError::invalid_config(format!(
                    "perturbation min {min} exceeds max {max}"
                )));
            }
        }
        Ok(())
    }

    fn perturb_value(&self, x: f64, rng: &mut StdRng) -> f64 {
        let mut out = self.rounding.apply(x + self.distribution.sample(rng));
        if let Some(min) = self.min {
            out = out.max(min);
        }
        if let Some(max) = self.max {
            out = out.min(max);
        }
        out
    }
}

/// Adds noise to a numeric column.
///
/// Integer columns stay integer (rounded after perturbation), float columns
/// stay float. Nulls and non-finite floats pass through unchanged.
pub fn perturb(column: &ZiColumn, spec: &ZiNoiseSpec, seed: Option<u64>) -> Result<ZiColumn> {
    spec.validate()?;
    let mut rng = seeded_rng(seed);
    let values = column
        .values
        .iter()
        .map(|value| match value {
            ZiValue::Null => Ok(ZiValue::Null),
            ZiValue::Float(f) if !f.is_finite() => Ok(ZiValue::Float(*f)),
            ZiValue::Int(i) => Ok(ZiValue::Int(spec.perturb_value(*i as f64, &mut rng).round() as i64)),
            ZiValue::Float(f) => Ok(ZiValue::Float(spec.perturb_value(*f, &mut rng))),
            other => Err(ZiError::type_mismatch(&column.name, "numeric", other.type_name())),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(column.with_values(values))
}

/// Floors every numeric value to a multiple of `unit`.
pub fn round_to_base(column: &ZiColumn, unit: f64) -> Result<ZiColumn> {
    perturb(column, &ZiNoiseSpec::base(unit), None)
}

/// Shifts every date by a uniform number of days in `[-max_days, max_days]`.
pub fn perturb_dates(column: &ZiColumn, max_days: u32, seed: Option<u64>) -> Result<ZiColumn> {
    let mut rng = seeded_rng(seed);
    let span = i64::from(max_days);
    let values = column
        .values
        .iter()
        .map(|value| match value {
            ZiValue::Null => Ok(ZiValue::Null),
            ZiValue::Date(date) => {
                let shift = rng.gen_range(-span..=span);
                let shifted = date
                    .checked_add_signed(Duration::days(shift))
                    .unwrap_or(if shift < 0 { NaiveDate::MIN } else { NaiveDate::MAX });
                Ok(ZiValue::Date(shifted))
            }
            other => Err(ZiError::type_mismatch(&column.name, "date", other.type_name())),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(column.with_values(values))
}

#[derive(Debug)]
pub struct ZiPerturbNumeric {
    column: String,
    spec: ZiNoiseSpec,
    seed: Option<u64>,
}

impl ZiPerturbNumeric {
    #[allow(non_snake_case)]
    pub fn new(column: impl Into<String>, spec: ZiNoiseSpec, seed: Option<u64>) -> Self {
        Self {
            column: column.into(),
            spec,
            seed,
        }
    }
}

impl ZiOperator for ZiPerturbNumeric {
    fn name(&self) -> &'static str {
        "perturb.numeric"
    }

    fn apply(&self, dataset: &ZiDataset, _context: &mut ZiContext) -> Result<ZiDataset> {
        let column = perturb(dataset.column(&self.column)?, &self.spec, self.seed)?;
        log::debug!(
            "perturb.numeric: column perturbed - column={}, seeded={}",
            self.column,
            self.seed.is_some()
        );
        dataset.with_replaced(column)
    }
}

#[allow(non_snake_case)]
pub fn perturb_numeric_factory(config: &Value) -> Result<Box<dyn ZiOperator + Send + Sync>> {
    let obj = config
        .as_object()
        .ok_or_else(|| ZiError::invalid_config("perturb.numeric config must be object"))?;

    let column = obj
        .get("column")
        .and_then(Value::as_str)
        .ok_or_else(|| ZiError::invalid_config("perturb.numeric requires string 'column'"))?;

    let spec = match obj.get("preset").and_then(Value::as_str) {
        Some("age") => ZiNoiseSpec::age(),
        Some("weight") => ZiNoiseSpec::weight(),
        Some("height") => ZiNoiseSpec::height(),
        Some(other) => {
            return Err(ZiError::invalid_config(format!(
                "perturb.numeric unknown preset '{other}'"
            )))
        }
        None => serde_json::from_value(config.clone())
            .map_err(|e| ZiError::invalid_config(format!("perturb.numeric: {e}")))?,
    };
    spec.validate()?;

    let seed = obj.get("seed").and_then(Value::as_u64);
    Ok(Box::new(ZiPerturbNumeric::new(column, spec, seed)))
}

#[derive(Debug)]
pub struct ZiPerturbDate {
    column: String,
    max_days: u32,
    seed: Option<u64>,
}

impl ZiPerturbDate {
    #[allow(non_snake_case)]
    pub fn new(column: impl Into<String>, max_days: u32, seed: Option<u64>) -> Self {
        Self {
            column: column.into(),
            max_days,
            seed,
        }
    }
}

impl ZiOperator for ZiPerturbDate {
    fn name(&self) -> &'static str {
        "perturb.date"
    }

    fn apply(&self, dataset: &ZiDataset, _context: &mut ZiContext) -> Result<ZiDataset> {
        let column = perturb_dates(dataset.column(&self.column)?, self.max_days, self.seed)?;
        log::debug!(
            "perturb.date: dates shifted - column={}, max_days={}",
            self.column,
            self.max_days
        );
        dataset.with_replaced(column)
    }
}

#[allow(non_snake_case)]
pub fn perturb_date_factory(config: &Value) -> Result<Box<dyn ZiOperator + Send + Sync>> {
    let obj = config
        .as_object()
        .ok_or_else(|| ZiError::invalid_config("perturb.date config must be object"))?;

    let column = obj
        .get("column")
        .and_then(Value::as_str)
        .ok_or_else(|| ZiError::invalid_config("perturb.date requires string 'column'"))?;

    let max_days = match obj.get("max_days") {
        None => 30,
        Some(v) => v
            .as_u64()
            .and_then(|d| u32::try_from(d).ok())
            .ok_or_else(|| ZiError::invalid_config("perturb.date 'max_days' must be a small unsigned integer"))?,
    };

    let seed = obj.get("seed").and_then(Value::as_u64);
    Ok(Box::new(ZiPerturbDate::new(column, max_days, seed)))
}
