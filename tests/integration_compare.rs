// SPDX-License-Identifier: AGPL-3.0-only

//! Integration tests: structural comparison of JSON artifacts.
//!
//! Fixed examples for each divergence reason, then property tests over
//! generated documents. CI: 256 cases. Soak: `PROPTEST_CASES=10000`.

use databank_verify::{
    compare, Comparator, CompareMode, Comparison, Divergence, Locator, Reason,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn divergence_of(expected: &Value, actual: &Value, tolerance: f64) -> Divergence {
    match compare(expected, actual, tolerance) {
        Comparison::Divergent(d) => d,
        Comparison::Equal => panic!("{expected} and {actual} compared equal at {tolerance}"),
    }
}

#[test]
fn length_mismatch_short_circuits() {
    let d = divergence_of(&json!([1, 2, 3]), &json!([1, 2]), 1e-2);
    assert_eq!(d.reason, Reason::LengthMismatch);
    assert!(d.locator.is_root());
    assert!(d.detail.contains('3') && d.detail.contains('2'));
}

#[test]
fn key_set_mismatch_names_both_sides() {
    let d = divergence_of(&json!({"a": 1, "b": 2}), &json!({"a": 1, "c": 2}), 1e-2);
    assert_eq!(d.reason, Reason::KeySetMismatch);
    assert!(d.detail.contains("\"b\""), "{}", d.detail);
    assert!(d.detail.contains("\"c\""), "{}", d.detail);
}

#[test]
fn nested_values_within_tolerance() {
    let expected = json!({"x": [1.0, 2.0], "y": {"z": 100.0}});
    let actual = json!({"x": [1.0, 2.005], "y": {"z": 101.0}});
    assert_eq!(compare(&expected, &actual, 1e-2), Comparison::Equal);

    let d = divergence_of(&expected, &actual, 1e-4);
    assert_eq!(d.reason, Reason::ValueOutOfTolerance);
    assert_eq!(d.locator.to_string(), "x.1");
    assert_eq!(d.expected, json!(2.0));
    assert_eq!(d.actual, json!(2.005));

    let all = Comparator::new(1e-4)
        .with_mode(CompareMode::CollectAll)
        .compare_all(&expected, &actual);
    let locs: Vec<String> = all.iter().map(|d| d.locator.to_string()).collect();
    assert_eq!(locs, vec!["x.1", "y.z"]);
}

#[test]
fn sequence_vs_mapping_is_type_mismatch() {
    let d = divergence_of(&json!([1, 2]), &json!({"0": 1, "1": 2}), 1e-2);
    assert_eq!(d.reason, Reason::TypeMismatch);
    assert!(d.locator.is_root());
}

#[test]
fn empty_containers_are_equal() {
    assert!(compare(&json!([]), &json!([]), 1e-2).is_equal());
    assert!(compare(&json!({}), &json!({}), 1e-2).is_equal());
}

#[test]
fn integer_and_float_spellings_agree() {
    assert!(compare(&json!({"n": 64}), &json!({"n": 64.0}), 0.0).is_equal());
}

#[test]
fn strings_compare_exactly() {
    let d = divergence_of(&json!({"lipid": "POPC"}), &json!({"lipid": "popc"}), 1.0);
    assert_eq!(d.reason, Reason::ValueMismatch);
    assert_eq!(d.locator.to_string(), "lipid");
}

#[test]
fn order_parameter_table_reports_first_bad_atom_pair() {
    let reference = json!({
        "M_G1C3_M M_G1C3H1_M": [[-0.21, 0.003, 0.001]],
        "M_G1C4_M M_G1C4H1_M": [[-0.18, 0.004, 0.001]]
    });
    let computed = json!({
        "M_G1C3_M M_G1C3H1_M": [[-0.2101, 0.003, 0.001]],
        "M_G1C4_M M_G1C4H1_M": [[-0.25, 0.004, 0.001]]
    });
    let d = divergence_of(&reference, &computed, 1e-2);
    assert_eq!(d.locator.to_string(), "M_G1C4_M M_G1C4H1_M.0.0");
    assert_eq!(d.locator.resolve(&reference), Some(&json!(-0.18)));
    let rendered = d.to_string();
    assert!(rendered.contains("expected: -0.18"), "{rendered}");
    assert!(rendered.contains("actual:   -0.25"), "{rendered}");
}

#[test]
fn root_locator_renders() {
    assert_eq!(Locator::root().to_string(), "<root>");
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|i| json!(i)),
        (-1.0e6..1.0e6f64).prop_map(|f| json!(f)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,3}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Multiply every number in the document by `factor`.
fn scale_numbers(value: &Value, factor: f64) -> Value {
    match value {
        Value::Number(n) => json!(n.as_f64().unwrap_or(0.0) * factor),
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| scale_numbers(v, factor)).collect())
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), scale_numbers(v, factor)))
                .collect(),
        ),
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn reflexive(doc in arb_json(), tolerance in 0.0..1.0f64) {
        prop_assert!(compare(&doc, &doc, tolerance).is_equal());
    }

    #[test]
    fn divergence_detection_is_symmetric(
        a in arb_json(),
        b in arb_json(),
        tolerance in 0.0..0.5f64,
    ) {
        prop_assert_eq!(
            compare(&a, &b, tolerance).is_equal(),
            compare(&b, &a, tolerance).is_equal()
        );
    }

    #[test]
    fn small_relative_drift_is_equal(doc in arb_json(), drift in 0.0..0.01f64) {
        let drifted = scale_numbers(&doc, 1.0 + drift);
        prop_assert!(compare(&doc, &drifted, 0.01).is_equal());
    }

    #[test]
    fn tolerance_is_monotone(
        doc in arb_json(),
        drift in 0.0..0.2f64,
        eps1 in 0.0..0.2f64,
        extra in 0.0..0.5f64,
    ) {
        let drifted = scale_numbers(&doc, 1.0 + drift);
        if compare(&doc, &drifted, eps1).is_equal() {
            prop_assert!(compare(&doc, &drifted, eps1 + extra).is_equal());
        }
    }

    #[test]
    fn locators_resolve_in_both_documents(a in arb_json(), b in arb_json()) {
        let all = Comparator::new(1e-2)
            .with_mode(CompareMode::CollectAll)
            .compare_all(&a, &b);
        for d in &all {
            prop_assert_eq!(d.locator.resolve(&a), Some(&d.expected));
            prop_assert_eq!(d.locator.resolve(&b), Some(&d.actual));
        }
        prop_assert_eq!(all.is_empty(), compare(&a, &b, 1e-2).is_equal());
    }

    #[test]
    fn first_divergence_leads_collect_all(a in arb_json(), b in arb_json()) {
        let all = Comparator::new(1e-2)
            .with_mode(CompareMode::CollectAll)
            .compare_all(&a, &b);
        if let Comparison::Divergent(first) = compare(&a, &b, 1e-2) {
            prop_assert_eq!(Some(&first), all.first());
        }
    }
}
