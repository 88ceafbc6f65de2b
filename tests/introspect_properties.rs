//! Property-based tests for introspection and map validation

use proptest::prelude::*;
use weir::introspect::{indirect, is_empty, length_of, to_float, to_int, to_uint};
use weir::prelude::*;
use weir::rule::{required, skip};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Nil),
        Just(Value::none()),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<u64>().prop_map(Value::Uint),
        (-1.0e6f64..1.0e6).prop_map(Value::Float),
        ".{0,8}".prop_map(Value::String),
        prop::collection::vec(any::<u8>(), 0..4).prop_map(Value::Bytes),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            prop::collection::btree_map("[a-z]{1,4}", inner.clone(), 0..4)
                .prop_map(|m| Value::from(m.into_iter().collect::<ValueMap>())),
            inner.prop_map(Value::some),
        ]
    })
}

fn container() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[A-Za-z]{1,6}", value(), 0..12)
        .prop_map(|m| Value::from(m.into_iter().collect::<ValueMap>()))
}

proptest! {
    #[test]
    fn prop_is_empty_ignores_non_nil_indirection(v in value()) {
        let wrapped = Value::some(Value::some(v.clone()));
        prop_assert_eq!(is_empty(&wrapped), is_empty(&v));
    }

    #[test]
    fn prop_nil_at_any_depth_is_empty(depth in 0usize..8) {
        let mut v = Value::none();
        for _ in 0..depth {
            v = Value::some(v);
        }
        prop_assert!(is_empty(&v));
        prop_assert!(indirect(&v).is_none());
    }

    #[test]
    fn prop_numeric_families_do_not_cross(i in any::<i64>(), u in any::<u64>(), f in -1.0e6f64..1.0e6) {
        prop_assert_eq!(to_int(&Value::Int(i)).unwrap(), i);
        prop_assert_eq!(to_uint(&Value::Uint(u)).unwrap(), u);
        prop_assert!(to_int(&Value::Float(f)).is_err());
        prop_assert!(to_float(&Value::Int(i)).is_err());
        prop_assert!(to_uint(&Value::Int(i)).is_err());
    }

    #[test]
    fn prop_string_length_is_byte_length(s in ".{0,16}") {
        prop_assert_eq!(length_of(&Value::from(s.as_str())).unwrap(), s.len());
    }

    #[test]
    fn prop_allow_extra_with_zero_keys_always_valid(c in container()) {
        let rule = map(vec![]).allow_extra_keys();
        prop_assert!(validate_map(&c, &rule, None).is_ok());
        prop_assert!(validate_map(&c, &rule, Some(&Context::background())).is_ok());
    }

    #[test]
    fn prop_missing_required_key_is_reported(c in container()) {
        // Keys in the generated containers never contain digits.
        let rule = map(vec![key!("K1")]).allow_extra_keys();
        let err = validate_map(&c, &rule, None).unwrap_err();
        prop_assert_eq!(err.to_string(), "K1: required key is missing.");
    }

    #[test]
    fn prop_every_undeclared_key_is_unexpected(c in container()) {
        let count = c.as_map().map(ValueMap::len).unwrap_or_default();
        match validate_map(&c, &map(vec![]), None) {
            Ok(()) => prop_assert_eq!(count, 0),
            Err(err) => {
                let errs = err.as_errors().cloned().unwrap_or_default();
                prop_assert_eq!(errs.len(), count);
                prop_assert!(errs.iter().all(|(_, e)| e.to_string() == "key not expected"));
            }
        }
    }

    #[test]
    fn prop_validation_is_deterministic(c in container()) {
        let rule = map(vec![key!("A", required()), key!("B", skip(), required())]);
        let first = validate_map(&c, &rule, None).map_err(|e| e.to_string());
        let second = validate_map(&c, &rule, Some(&Context::background())).map_err(|e| e.to_string());
        prop_assert_eq!(first, second);
    }
}
