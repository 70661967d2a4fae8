//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! you may not use this file except in compliance with the License.
//!
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Zi Operator Tests - Generalize
//!
//! Tests for date generalization, mean binning, and bucketing.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test generalize
//! ```

use chrono::NaiveDate;
use serde_json::json;
use zianon::operators::generalize::{
    bucket_factory, generalize_date_factory, generalize_mean_factory,
};
use zianon::{
    bucket, generalize_date, mean_generalize, ZiBinValue, ZiBinning, ZiBucketSpec, ZiColumn,
    ZiContext, ZiDataset, ZiDateUnit, ZiError, ZiOperator, ZiValue,
};

fn floats(column: &ZiColumn) -> Vec<f64> {
    column.values.iter().map(|v| v.as_f64().unwrap()).collect()
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
    }
}

fn age_buckets() -> ZiBucketSpec {
    ZiBucketSpec::new(vec![0.0, 30.0, 60.0], vec!["Young", "Adult"]).unwrap()
}

#[test]
fn dates_reduce_to_requested_unit() {
    let day = NaiveDate::from_ymd_opt(2021, 8, 15).unwrap();
    let input = ZiColumn::new("Birth", vec![ZiValue::Date(day), ZiValue::Null]);

    let year = generalize_date(&input, ZiDateUnit::Year).unwrap();
    let month = generalize_date(&input, ZiDateUnit::Month).unwrap();
    let quarter = generalize_date(&input, ZiDateUnit::Quarter).unwrap();

    assert_eq!(year.values, vec![ZiValue::from("2021"), ZiValue::Null]);
    assert_eq!(month.values[0], ZiValue::from("2021-08"));
    assert_eq!(quarter.values[0], ZiValue::from("2021-Q3"));
}

#[test]
fn date_generalization_rejects_text() {
    let input = ZiColumn::from_values("Birth", ["2021-08-15"]);
    let err = generalize_date(&input, ZiDateUnit::Year).unwrap_err();
    assert!(matches!(err, ZiError::TypeMismatch { .. }));
}

/// Equal-width bins replace each value with its bin mean.
#[test]
fn equal_width_mean_generalization() {
    let input = ZiColumn::from_values("Age", [22i64, 27, 35, 45, 51]);
    let out = mean_generalize(&input, 3, ZiBinning::EqualWidth, ZiBinValue::Mean).unwrap();
    assert_close(&floats(&out), &[24.5, 24.5, 35.0, 48.0, 48.0]);
}

#[test]
fn midpoint_uses_bin_interval() {
    let input = ZiColumn::from_values("Age", [0i64, 10, 20, 30]);
    let out = mean_generalize(&input, 3, ZiBinning::EqualWidth, ZiBinValue::Midpoint).unwrap();
    assert_close(&floats(&out), &[5.0, 15.0, 25.0, 25.0]);
}

#[test]
fn equal_frequency_balances_rows() {
    let input = ZiColumn::from_values("Income", [6.0, 1.0, 4.0, 2.0, 5.0, 3.0]);
    let out = mean_generalize(&input, 3, ZiBinning::EqualFrequency, ZiBinValue::Mean).unwrap();
    assert_close(&floats(&out), &[5.5, 1.5, 3.5, 1.5, 5.5, 3.5]);
}

#[test]
fn mean_generalization_keeps_nulls_and_checks_arguments() {
    let input = ZiColumn::new("Age", vec![ZiValue::Null, ZiValue::Int(40), ZiValue::Int(40)]);
    let out = mean_generalize(&input, 2, ZiBinning::EqualWidth, ZiBinValue::Mean).unwrap();
    assert_eq!(
        out.values,
        vec![ZiValue::Null, ZiValue::Float(40.0), ZiValue::Float(40.0)]
    );

    assert!(matches!(
        mean_generalize(&input, 0, ZiBinning::EqualWidth, ZiBinValue::Mean).unwrap_err(),
        ZiError::InvalidConfiguration { .. }
    ));
    let text = ZiColumn::from_values("Age", ["forty"]);
    assert!(mean_generalize(&text, 2, ZiBinning::EqualWidth, ZiBinValue::Mean).is_err());
}

/// More bins than values leaves every value alone in its bin.
#[test]
fn bin_count_far_above_row_count() {
    let input = ZiColumn::from_values("Age", [1i64, 2, 3, 4]);
    for binning in [ZiBinning::EqualFrequency, ZiBinning::EqualWidth] {
        let out = mean_generalize(&input, usize::MAX / 2, binning, ZiBinValue::Mean).unwrap();
        assert_close(&floats(&out), &[1.0, 2.0, 3.0, 4.0]);
    }

    let operator = generalize_mean_factory(&json!({
        "column": "Age",
        "bins": u64::MAX,
        "binning": "equal_frequency"
    }))
    .unwrap();
    let dataset = ZiDataset::from_columns(vec![input]).unwrap();
    let out = operator.apply(&dataset, &mut ZiContext::new()).unwrap();
    assert_close(&floats(out.column("Age").unwrap()), &[1.0, 2.0, 3.0, 4.0]);
}

/// 22 and 47 fall into labelled buckets; 65 is outside every interval.
#[test]
fn bucketing_labels_values_and_reports_out_of_range() {
    let input = ZiColumn::from_values("Age", [22i64, 47]);
    let out = bucket(&input, &age_buckets()).unwrap();
    assert_eq!(out.values, vec![ZiValue::from("Young"), ZiValue::from("Adult")]);

    let outlier = ZiColumn::from_values("Age", [22i64, 65]);
    match bucket(&outlier, &age_buckets()).unwrap_err() {
        ZiError::OutOfRangeValue { column, value } => {
            assert_eq!(column, "Age");
            assert_eq!(value, "65");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let out = bucket(&outlier, &age_buckets().with_catch_all("Other")).unwrap();
    assert_eq!(out.values, vec![ZiValue::from("Young"), ZiValue::from("Other")]);
}

#[test]
fn bucketing_rejects_text() {
    let input = ZiColumn::from_values("Age", ["adult"]);
    assert!(matches!(
        bucket(&input, &age_buckets()).unwrap_err(),
        ZiError::TypeMismatch { .. }
    ));
}

/// Factories parse units, binning, and bucket definitions from JSON.
#[test]
fn factories_build_generalizers() {
    let dataset = ZiDataset::from_columns(vec![
        ZiColumn::new(
            "Visit",
            vec![ZiValue::Date(NaiveDate::from_ymd_opt(2019, 2, 3).unwrap())],
        ),
        ZiColumn::from_values("Age", [30i64]),
        ZiColumn::from_values("Score", [7.5]),
    ])
    .unwrap();
    let mut context = ZiContext::new();

    let date = generalize_date_factory(&json!({"column": "Visit", "unit": "month"})).unwrap();
    let out = date.apply(&dataset, &mut context).unwrap();
    assert_eq!(out.column("Visit").unwrap().values[0], ZiValue::from("2019-02"));

    let left = bucket_factory(&json!({
        "column": "Age",
        "boundaries": [0, 30, 60],
        "labels": ["Young", "Adult"],
        "closed": "left"
    }))
    .unwrap();
    let out = left.apply(&out, &mut context).unwrap();
    assert_eq!(out.column("Age").unwrap().values[0], ZiValue::from("Adult"));

    let mean = generalize_mean_factory(&json!({
        "column": "Score",
        "bins": 4,
        "binning": "equal_frequency",
        "value": "midpoint"
    }))
    .unwrap();
    let out = mean.apply(&out, &mut context).unwrap();
    assert_eq!(out.column("Score").unwrap().values[0], ZiValue::Float(7.5));

    assert!(generalize_mean_factory(&json!({"column": "Score", "bins": 0})).is_err());
    assert!(bucket_factory(&json!({
        "column": "Age",
        "boundaries": [60, 30],
        "labels": ["x"]
    }))
    .is_err());
    assert!(generalize_date_factory(&json!({"column": "Visit", "unit": "week"})).is_err());
}
