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

//! # Zi Core Tests - Anonymity
//!
//! Tests for k-anonymity and equivalence classes.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test anonymity
//! ```

use proptest::prelude::*;
use zianon::{
    equivalence_classes, is_k_anonymous, k_anonymity, ZiAnonymityMetrics, ZiColumn, ZiDataset,
    ZiError, ZiValue,
};

fn age_zip() -> ZiDataset {
    ZiDataset::from_columns(vec![
        ZiColumn::from_values("Age", [25i64, 25, 30, 30]),
        ZiColumn::from_values("Zip", ["12345", "12345", "67890", "67890"]),
    ])
    .unwrap()
}

#[test]
fn paired_rows_are_two_anonymous() {
    let dataset = age_zip();
    assert_eq!(k_anonymity(&dataset, &["Age", "Zip"]).unwrap(), 2);
    assert!(is_k_anonymous(&dataset, &["Age", "Zip"], 2).unwrap());
    assert!(!is_k_anonymous(&dataset, &["Age", "Zip"], 3).unwrap());
}

#[test]
fn unique_row_drops_k_to_one() {
    let dataset = age_zip()
        .with_column(ZiColumn::from_values("Sex", ["F", "M", "F", "F"]))
        .unwrap();
    assert_eq!(k_anonymity(&dataset, &["Age", "Sex"]).unwrap(), 1);
    assert_eq!(k_anonymity(&dataset, &["Zip"]).unwrap(), 2);
}

#[test]
fn empty_inputs() {
    assert!(matches!(
        k_anonymity(&age_zip(), &Vec::<String>::new()).unwrap_err(),
        ZiError::EmptyColumnSet
    ));
    assert!(matches!(
        k_anonymity(&age_zip(), &["Age", "Height"]).unwrap_err(),
        ZiError::UnknownColumn { .. }
    ));

    let no_rows = ZiDataset::from_columns(vec![ZiColumn::new("Age", vec![])]).unwrap();
    assert_eq!(k_anonymity(&no_rows, &["Age"]).unwrap(), 0);
}

/// Integer and integral float cells land in the same class.
#[test]
fn numeric_keys_unify_ints_and_floats() {
    let dataset = ZiDataset::from_columns(vec![ZiColumn::new(
        "Age",
        vec![ZiValue::Int(30), ZiValue::Float(30.0), ZiValue::Null],
    )])
    .unwrap();
    let classes = equivalence_classes(&dataset, &["Age"]).unwrap();
    assert_eq!(classes.len(), 2);
    assert!(classes.values().any(|rows| rows == &vec![0, 1]));
}

#[test]
fn metrics_summarize_classes() {
    let dataset = age_zip()
        .with_column(ZiColumn::from_values("Sex", ["F", "M", "F", "F"]))
        .unwrap();
    let metrics = ZiAnonymityMetrics::compute(&dataset, &["Age", "Sex"], 2).unwrap();
    assert_eq!(metrics.k, 1);
    assert_eq!(metrics.class_count, 3);
    assert_eq!(metrics.row_count, 4);
    assert_eq!(metrics.rows_below_target, 2);
    assert_eq!(metrics.smallest_classes.len(), 2);
}

proptest! {
    #[test]
    fn k_never_exceeds_row_count(ages in proptest::collection::vec(0i64..5, 1..60)) {
        let n = ages.len();
        let dataset = ZiDataset::from_columns(vec![ZiColumn::from_values("Age", ages)]).unwrap();
        let k = k_anonymity(&dataset, &["Age"]).unwrap();
        prop_assert!(k >= 1 && k <= n);
    }

    #[test]
    fn identical_rows_give_k_equal_to_row_count(n in 1usize..50, age in 0i64..100) {
        let dataset = ZiDataset::from_columns(vec![
            ZiColumn::from_values("Age", std::iter::repeat(age).take(n)),
            ZiColumn::from_values("Zip", std::iter::repeat("12345").take(n)),
        ])
        .unwrap();
        prop_assert_eq!(k_anonymity(&dataset, &["Age", "Zip"]).unwrap(), n);
    }
}
