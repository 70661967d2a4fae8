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

//! # Zi Operator Tests - Suppress
//!
//! Tests for column suppression and record suppression.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test suppress
//! ```

use serde_json::json;
use zianon::operators::suppress::{suppress_columns_factory, suppress_records_factory};
use zianon::{
    suppress_columns, suppress_records, ZiColumn, ZiContext, ZiDataset, ZiError, ZiMatchPolicy,
    ZiOperator, ZiValue,
};

fn patients() -> ZiDataset {
    ZiDataset::from_columns(vec![
        ZiColumn::from_values("Name", ["Ann", "Ben", "Cho", "Dev"]),
        ZiColumn::from_values("Age", [25i64, 31, 25, 90]),
        ZiColumn::from_values("Zip", ["12345", "12345", "67890", "67890"]),
    ])
    .unwrap()
}

/// Dropping `Name` keeps every row and the other columns.
#[test]
fn suppressing_name_keeps_rows() {
    let out = suppress_columns(&patients(), &["Name"]).unwrap();
    assert!(!out.contains("Name"));
    assert_eq!(out.row_count(), 4);
    assert_eq!(out.column_names(), vec!["Age", "Zip"]);
}

#[test]
fn unknown_column_aborts_column_suppression() {
    let err = suppress_columns(&patients(), &["Name", "SSN"]).unwrap_err();
    assert!(matches!(err, ZiError::UnknownColumn { column } if column == "SSN"));
}

/// Under the default policy one matching column is enough to drop a row.
#[test]
fn any_policy_drops_on_single_match() {
    let out = suppress_records(
        &patients(),
        &["Age", "Zip"],
        &[vec![ZiValue::Int(90)], vec![ZiValue::from("12345")]],
        ZiMatchPolicy::default(),
    )
    .unwrap();
    assert_eq!(out.row_count(), 1);
    assert_eq!(out.column("Name").unwrap().values, vec![ZiValue::from("Cho")]);
}

#[test]
fn all_policy_requires_every_column() {
    let out = suppress_records(
        &patients(),
        &["Age", "Zip"],
        &[vec![ZiValue::Int(25)], vec![ZiValue::from("67890")]],
        ZiMatchPolicy::All,
    )
    .unwrap();
    assert_eq!(
        out.column("Name").unwrap().values,
        vec![ZiValue::from("Ann"), ZiValue::from("Ben"), ZiValue::from("Dev")]
    );
}

#[test]
fn record_suppression_validates_inputs() {
    let err = suppress_records(
        &patients(),
        &["Age"],
        &[vec![ZiValue::Int(25)], vec![]],
        ZiMatchPolicy::Any,
    )
    .unwrap_err();
    assert!(matches!(err, ZiError::InvalidConfiguration { .. }));

    let err = suppress_records(&patients(), &["Weight"], &[vec![]], ZiMatchPolicy::Any).unwrap_err();
    assert!(matches!(err, ZiError::UnknownColumn { .. }));
}

#[test]
fn empty_dataset_is_returned_unchanged() {
    let empty = ZiDataset::from_columns(vec![ZiColumn::new("Age", vec![])]).unwrap();
    let out = suppress_records(&empty, &["Age"], &[vec![ZiValue::Int(1)]], ZiMatchPolicy::Any).unwrap();
    assert_eq!(out, empty);
}

#[test]
fn nulls_can_be_suppressed() {
    let dataset = ZiDataset::from_columns(vec![ZiColumn::new(
        "Zip",
        vec![ZiValue::Null, ZiValue::from("12345")],
    )])
    .unwrap();
    let out = suppress_records(&dataset, &["Zip"], &[vec![ZiValue::Null]], ZiMatchPolicy::Any).unwrap();
    assert_eq!(out.column("Zip").unwrap().values, vec![ZiValue::from("12345")]);
}

/// Factories read column lists, value sets, and the match policy.
#[test]
fn factories_build_suppressors() {
    let mut context = ZiContext::new();

    let columns = suppress_columns_factory(&json!({"columns": ["Name"]})).unwrap();
    let out = columns.apply(&patients(), &mut context).unwrap();
    assert_eq!(out.column_count(), 2);

    let records = suppress_records_factory(&json!({
        "columns": ["Age", "Zip"],
        "values": [[25], ["67890"]],
        "policy": "all"
    }))
    .unwrap();
    let out = records.apply(&out, &mut context).unwrap();
    assert_eq!(out.row_count(), 3);

    assert!(suppress_columns_factory(&json!({"columns": "Name"})).is_err());
    assert!(suppress_records_factory(&json!({"columns": ["Age"], "values": [25]})).is_err());
    assert!(suppress_records_factory(&json!({
        "columns": ["Age"],
        "values": [[25]],
        "policy": "most"
    }))
    .is_err());
}
