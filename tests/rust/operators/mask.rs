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

//! # Zi Operator Tests - Mask
//!
//! Tests for identifier and email masking.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test mask
//! ```

use proptest::prelude::*;
use serde_json::json;
use zianon::operators::mask::{mask_email_factory, mask_id_factory};
use zianon::{
    mask_email, mask_id, ZiColumn, ZiContext, ZiDataset, ZiEmailMaskPolicy, ZiError, ZiMaskPolicy,
    ZiOperator, ZiValue,
};

/// Only the last three characters of an identifier stay visible.
#[test]
fn mask_id_keeps_last_three_characters() {
    let column = ZiColumn::from_values("ID", ["123456789", "S1234567A"]);
    let outcome = mask_id(&column, &ZiMaskPolicy::default());
    assert_eq!(
        outcome.column.values,
        vec![ZiValue::from("******789"), ZiValue::from("******67A")]
    );
    assert_eq!(outcome.masked, 2);
    assert_eq!(outcome.skipped, 0);
}

#[test]
fn mask_id_skips_nulls_and_numbers() {
    let column = ZiColumn::new(
        "ID",
        vec![ZiValue::Null, ZiValue::Int(42), ZiValue::from("ab")],
    );
    let outcome = mask_id(&column, &ZiMaskPolicy::default());
    assert_eq!(
        outcome.column.values,
        vec![ZiValue::Null, ZiValue::Int(42), ZiValue::from("ab")]
    );
    assert_eq!(outcome.masked, 1);
    assert_eq!(outcome.skipped, 2);
}

#[test]
fn mask_email_keeps_first_letter_and_domain() {
    let column = ZiColumn::from_values("Email", ["alice@example.com", "no email", "b@x.org"]);
    let outcome = mask_email(&column, &ZiEmailMaskPolicy::default());
    assert_eq!(
        outcome.column.values,
        vec![
            ZiValue::from("a*****@example.com"),
            ZiValue::from("no email"),
            ZiValue::from("b*****@x.org"),
        ]
    );
    assert_eq!(outcome.skipped, 1);
}

/// Factories read the column and policy overrides from JSON.
#[test]
fn factories_apply_policy_overrides() {
    let dataset = ZiDataset::from_columns(vec![
        ZiColumn::from_values("ID", ["ABCDEFGH"]),
        ZiColumn::from_values("Email", ["carol@corp.io"]),
    ])
    .unwrap();
    let mut context = ZiContext::new();

    let mask = mask_id_factory(&json!({
        "column": "ID",
        "visible_leading": 1,
        "visible_trailing": 2,
        "mask_char": "#"
    }))
    .unwrap();
    let out = mask.apply(&dataset, &mut context).unwrap();
    assert_eq!(out.column("ID").unwrap().values[0], ZiValue::from("A#####GH"));

    let mask = mask_email_factory(&json!({"column": "Email", "mask_count": null})).unwrap();
    let out = mask.apply(&out, &mut context).unwrap();
    assert_eq!(out.column("Email").unwrap().values[0], ZiValue::from("c****@corp.io"));
}

#[test]
fn masking_unknown_column_fails() {
    let dataset = ZiDataset::from_columns(vec![ZiColumn::from_values("ID", ["1"])]).unwrap();
    let mask = mask_id_factory(&json!({"column": "SSN"})).unwrap();
    let err = mask.apply(&dataset, &mut ZiContext::new()).unwrap_err();
    assert!(matches!(err, ZiError::UnknownColumn { column } if column == "SSN"));
}

#[test]
fn factory_requires_column() {
    assert!(matches!(
        mask_id_factory(&json!({})).unwrap_err(),
        ZiError::InvalidConfiguration { .. }
    ));
    assert!(mask_email_factory(&json!("Email")).is_err());
}

proptest! {
    #[test]
    fn masked_id_preserves_length_and_suffix(text in "[a-zA-Z0-9]{0,24}") {
        let column = ZiColumn::from_values("ID", [text.as_str()]);
        let outcome = mask_id(&column, &ZiMaskPolicy::default());
        let masked = outcome.column.values[0].as_str().unwrap().to_string();

        prop_assert_eq!(masked.chars().count(), text.chars().count());
        let keep = text.len().min(3);
        prop_assert_eq!(&masked[masked.len() - keep..], &text[text.len() - keep..]);
        prop_assert!(masked[..masked.len() - keep].chars().all(|c| c == '*'));
    }
}
