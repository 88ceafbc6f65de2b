//! Testing utilities for code that validates with weir
//!
//! Assertion macros over validation results, a few canned rules, and (with
//! the `proptest` feature) `Arbitrary` strategies for [`Value`] and [`Key`].
//!
//! # Examples
//!
//! ```rust
//! use weir::{assert_error_text, assert_invalid, assert_valid, key, map, validate_map, Value};
//! use weir::rule::required;
//!
//! let rule = map(vec![key!("Name", required())]);
//!
//! assert_valid!(validate_map(&Value::from([("Name", "x")]), &rule, None));
//! assert_invalid!(validate_map(&Value::from([("Name", "")]), &rule, None));
//! assert_error_text!(
//!     validate_map(&Value::Nil, &rule, None),
//!     "Name: required key is missing."
//! );
//! ```

use crate::error::{Error, InternalError, RuleError};
use crate::rule::{by, Rule};
use crate::value::Value;

/// Assert that a validation result is `Ok`.
///
/// Panics with the rendered error otherwise.
#[macro_export]
macro_rules! assert_valid {
    ($result:expr) => {
        match $result {
            ::std::result::Result::Ok(()) => {}
            ::std::result::Result::Err(e) => {
                panic!("Expected valid, got error: {}", e);
            }
        }
    };
}

/// Assert that a validation result is a violation (not a fault).
#[macro_export]
macro_rules! assert_invalid {
    ($result:expr) => {
        match $result {
            ::std::result::Result::Err(e) if !$crate::Error::is_internal(&e) => {}
            ::std::result::Result::Err(e) => {
                panic!("Expected a violation, got fault: {}", e);
            }
            ::std::result::Result::Ok(()) => {
                panic!("Expected a violation, got valid");
            }
        }
    };
}

/// Assert the rendered text of a validation result.
///
/// An empty expectation asserts that the result is `Ok`.
#[macro_export]
macro_rules! assert_error_text {
    ($result:expr, $expected:expr) => {{
        let expected: &str = $expected;
        match $result {
            ::std::result::Result::Ok(()) => {
                assert!(expected.is_empty(), "Expected error {:?}, got valid", expected);
            }
            ::std::result::Result::Err(e) => {
                assert_eq!(e.to_string(), expected);
            }
        }
    }};
}

/// A rule that accepts only the string `expected`, failing with
/// `error <expected>`.
pub fn equals(expected: &'static str) -> impl Rule {
    by(move |v: &Value| match v.as_str() {
        Some(s) if s == expected => Ok(()),
        _ => Err(RuleError::new(expected, format!("error {}", expected)).into()),
    })
}

/// A rule that always faults with `message`.
pub fn fault(message: &'static str) -> impl Rule {
    by(move |_: &Value| -> Result<(), Error> { Err(InternalError::new(message).into()) })
}

#[cfg(feature = "proptest")]
mod strategies {
    use proptest::prelude::*;

    use crate::value::{Key, Value, ValueMap};

    impl Arbitrary for Key {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
            prop_oneof![
                "[A-Za-z0-9_]{0,8}".prop_map(Key::Str),
                any::<i64>().prop_map(Key::Int),
                any::<u64>().prop_map(Key::Uint),
                any::<bool>().prop_map(Key::Bool),
            ]
            .boxed()
        }
    }

    fn string_keyed_map(inner: BoxedStrategy<Value>) -> impl Strategy<Value = Value> {
        prop::collection::btree_map("[A-Za-z]{1,6}", inner, 0..6)
            .prop_map(|m| Value::Map(m.into_iter().collect::<ValueMap>()))
    }

    impl Arbitrary for Value {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
            let leaf = prop_oneof![
                Just(Value::Nil),
                any::<bool>().prop_map(Value::Bool),
                any::<i64>().prop_map(Value::Int),
                any::<u64>().prop_map(Value::Uint),
                (-1.0e9f64..1.0e9).prop_map(Value::Float),
                ".{0,12}".prop_map(Value::String),
                prop::collection::vec(any::<u8>(), 0..8).prop_map(Value::Bytes),
                Just(Value::Ref(None)),
            ];
            leaf.prop_recursive(4, 32, 6, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 0..6).prop_map(Value::List),
                    string_keyed_map(inner.clone()),
                    inner.prop_map(Value::some),
                ]
            })
            .boxed()
        }
    }
}
