use crate::value::{Float64, IndexValue, ValueTag, canonical_cmp, strict_order_cmp};
use proptest::prelude::*;
use std::cmp::Ordering;
use ulid::Ulid;

fn arb_value() -> impl Strategy<Value = IndexValue> {
    prop_oneof![
        Just(IndexValue::Null),
        any::<bool>().prop_map(IndexValue::Bool),
        any::<i64>().prop_map(IndexValue::Int),
        any::<u64>().prop_map(IndexValue::Uint),
        (-1.0e9f64..1.0e9).prop_map(|v| IndexValue::float(v).unwrap()),
        "[a-z]{0,6}".prop_map(IndexValue::Text),
        any::<u128>().prop_map(|n| IndexValue::Ulid(Ulid(n))),
        Just(IndexValue::Unit),
    ]
}

#[test]
fn mixed_variants_order_by_rank() {
    let null = IndexValue::Null;
    let int = IndexValue::Int(i64::MAX);
    let uint = IndexValue::Uint(0);
    let text = IndexValue::from("a");

    assert_eq!(canonical_cmp(&null, &int), Ordering::Less);
    assert_eq!(canonical_cmp(&int, &uint), Ordering::Less);
    assert_eq!(canonical_cmp(&uint, &text), Ordering::Less);
    assert_eq!(strict_order_cmp(&int, &uint), None);
}

#[test]
fn same_variant_orders_by_payload() {
    assert!(IndexValue::Int(-3) < IndexValue::Int(2));
    assert!(IndexValue::from("apple") < IndexValue::from("banana"));
    assert!(IndexValue::float(-0.5).unwrap() < IndexValue::float(0.25).unwrap());
}

#[test]
fn float_rejects_non_finite_and_normalizes_negative_zero() {
    assert!(Float64::try_new(f64::NAN).is_none());
    assert!(Float64::try_new(f64::INFINITY).is_none());
    assert_eq!(
        Float64::try_new(-0.0).unwrap(),
        Float64::try_new(0.0).unwrap()
    );
}

#[test]
fn option_conversion_maps_none_to_null() {
    assert_eq!(IndexValue::from(None::<i64>), IndexValue::Null);
    assert_eq!(IndexValue::from(Some(7_i32)), IndexValue::Int(7));
    assert_eq!(IndexValue::Null.tag(), ValueTag::Null);
}

#[test]
fn values_read_back_from_json() {
    let id = Ulid(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
    let values = vec![
        IndexValue::Ulid(id),
        IndexValue::Int(-4),
        IndexValue::from("a"),
        IndexValue::float(1.5).unwrap(),
    ];

    let json = serde_json::to_string(&values).unwrap();
    assert!(json.contains(&format!("{{\"Ulid\":\"{id}\"}}")));

    let back: Vec<IndexValue> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, values);
}

proptest! {
    #[test]
    fn canonical_order_is_total_and_antisymmetric(a in arb_value(), b in arb_value()) {
        let forward = canonical_cmp(&a, &b);
        let backward = canonical_cmp(&b, &a);
        prop_assert_eq!(forward, backward.reverse());
        prop_assert_eq!(forward == Ordering::Equal, a == b);
    }

    #[test]
    fn canonical_order_is_transitive(a in arb_value(), b in arb_value(), c in arb_value()) {
        let mut sorted = vec![a, b, c];
        sorted.sort();
        prop_assert!(sorted[0] <= sorted[1]);
        prop_assert!(sorted[1] <= sorted[2]);
        prop_assert!(sorted[0] <= sorted[2]);
    }
}
