//! Keyed-container validation
//!
//! A [`MapRule`] binds rule chains to the keys of a [`ValueMap`]. Every
//! declared key is looked up, checked for presence and validated; keys the
//! rule does not declare are rejected unless extra keys are allowed. All
//! violations are collected into one structured [`Errors`], keyed by the
//! stringified key. A fault aborts the whole call instead.
//!
//! # Example
//!
//! ```
//! use weir::rule::{length, required};
//! use weir::{key, map, validate, rules, Value};
//!
//! let profile = Value::from([
//!     ("Name", Value::from("name")),
//!     ("Value", Value::from("demo")),
//!     ("Extra", Value::from(true)),
//! ]);
//!
//! let rule = map(vec![
//!     key!("Name", required()),
//!     key!("Value", required(), length(5, 10)),
//! ]);
//!
//! let err = validate(&profile, &rules![rule]).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Extra: key not expected; Value: the length must be between 5 and 10."
//! );
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::chain::{absorb, evaluate, materialized, run_chain, Validator};
use crate::context::Context;
use crate::error::{Error, Errors, InternalError, RuleError};
use crate::introspect::indirect;
use crate::rule::{BoxedRule, Rule};
use crate::semigroup::Semigroup;
use crate::value::{Key, Value, ValueMap};

const ERR_KEY_WRONG_TYPE: RuleError =
    RuleError::from_static("validation_key_wrong_type", "key not the correct type");
const ERR_KEY_MISSING: RuleError =
    RuleError::from_static("validation_key_missing", "required key is missing");
const ERR_KEY_UNEXPECTED: RuleError =
    RuleError::from_static("validation_key_unexpected", "key not expected");

/// A rule chain bound to one key of a container.
#[derive(Clone)]
pub struct KeyRules {
    key: Key,
    optional: bool,
    rules: Vec<BoxedRule>,
}

/// Bind `rules` to `key`. The key is required unless marked
/// [`optional`](KeyRules::optional).
///
/// The [`key!`](crate::key) macro is usually more convenient.
pub fn key(key: impl Into<Key>, rules: Vec<BoxedRule>) -> KeyRules {
    KeyRules::new(key, rules)
}

impl KeyRules {
    /// Bind `rules` to `key`.
    pub fn new(key: impl Into<Key>, rules: Vec<BoxedRule>) -> Self {
        KeyRules {
            key: key.into(),
            optional: false,
            rules,
        }
    }

    /// Allow the key to be absent.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Append a rule to the key's chain.
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(std::sync::Arc::new(rule));
        self
    }

    /// The declared key.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Whether the key may be absent.
    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

impl fmt::Debug for KeyRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRules")
            .field("key", &self.key)
            .field("optional", &self.optional)
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// Declare a key and its rules.
///
/// ```
/// use weir::key;
/// use weir::rule::{length, required};
///
/// let name = key!("Name", required(), length(1, 64));
/// let nick = key!("Nick").optional();
/// let code = key!(11);
/// assert_eq!(name.key().to_string(), "Name");
/// assert!(nick.is_optional());
/// assert!(!code.is_optional());
/// ```
#[macro_export]
macro_rules! key {
    ($key:expr) => {
        $crate::map::key($key, ::std::vec::Vec::new())
    };
    ($key:expr, $($rule:expr),+ $(,)?) => {
        $crate::map::key($key, $crate::rules![$($rule),+])
    };
}

/// Validates a keyed container.
#[derive(Clone, Default)]
pub struct MapRule {
    keys: Vec<KeyRules>,
    key_rules: Vec<BoxedRule>,
    value_rules: Vec<BoxedRule>,
    allow_extra_keys: bool,
}

/// A map rule declaring `keys`. Undeclared keys are rejected until
/// [`allow_extra_keys`](MapRule::allow_extra_keys) is called.
pub fn map(keys: Vec<KeyRules>) -> MapRule {
    MapRule {
        keys,
        ..MapRule::default()
    }
}

impl MapRule {
    /// Declare one more key.
    pub fn key(mut self, key: KeyRules) -> Self {
        self.keys.push(key);
        self
    }

    /// Rules applied to every key of the container (the key itself, not its
    /// value). A key failing them is reported and its value is not checked.
    pub fn keys(mut self, rules: Vec<BoxedRule>) -> Self {
        self.key_rules = rules;
        self
    }

    /// Rules applied to every value, after the chain of its declared key.
    pub fn values(mut self, rules: Vec<BoxedRule>) -> Self {
        self.value_rules = rules;
        self
    }

    /// Accept keys that have no declaration.
    pub fn allow_extra_keys(mut self) -> Self {
        self.allow_extra_keys = true;
        self
    }

    /// The declared keys, in declaration order.
    pub fn declared(&self) -> impl Iterator<Item = &KeyRules> {
        self.keys.iter()
    }

    fn declared_keys(&self) -> Result<HashSet<&Key>, Error> {
        let mut seen = HashSet::with_capacity(self.keys.len());
        for kr in &self.keys {
            if !seen.insert(&kr.key) {
                #[cfg(feature = "tracing")]
                tracing::warn!(key = %kr.key, "key declared more than once");
                return Err(InternalError::duplicate_key(&kr.key).into());
            }
        }
        Ok(seen)
    }

    pub(crate) fn run(&self, ctx: Option<&Context>, value: &Value) -> Result<(), Error> {
        let declared = self.declared_keys()?;

        let resolved = materialized(value);
        let empty = ValueMap::new();
        let container = match indirect(resolved.as_ref().unwrap_or(value)) {
            None => &empty,
            Some(Value::Map(m)) => m,
            Some(_other) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(kind = _other.kind_name(), "map rule applied to a non-map value");
                return Err(InternalError::not_a_container().into());
            }
        };
        // Only a map whose keys share one kind can rule a declared key out.
        let key_kind = container.key_kind();

        let mut errs = Errors::new();
        for kr in &self.keys {
            let name = kr.key.to_string();
            if key_kind.is_some_and(|kind| kind != kr.key.kind()) {
                errs.insert_first(name, ERR_KEY_WRONG_TYPE);
                continue;
            }
            match container.get(&kr.key) {
                None if kr.optional => {}
                None => errs.insert_first(name, ERR_KEY_MISSING),
                Some(v) => {
                    if self.check_key(ctx, &mut errs, &kr.key)? {
                        if let Err(e) = evaluate(ctx, v, kr.rules.iter().chain(&self.value_rules)) {
                            absorb(&mut errs, name, e)?;
                        }
                    }
                }
            }
        }

        let mut extra = Errors::new();
        for (k, v) in container.iter() {
            if declared.contains(k) {
                continue;
            }
            if !self.allow_extra_keys {
                #[cfg(feature = "tracing")]
                tracing::debug!(key = %k, "unexpected key");
                extra.insert_first(k.to_string(), ERR_KEY_UNEXPECTED);
                continue;
            }
            if self.check_key(ctx, &mut extra, k)? && !self.value_rules.is_empty() {
                if let Err(e) = evaluate(ctx, v, &self.value_rules) {
                    absorb(&mut extra, k.to_string(), e)?;
                }
            }
        }

        errs.combine(extra).into_result()
    }

    // Ok(true) when the key passes its identity rules.
    fn check_key(&self, ctx: Option<&Context>, errs: &mut Errors, key: &Key) -> Result<bool, Error> {
        if self.key_rules.is_empty() {
            return Ok(true);
        }
        match run_chain(ctx, &key.to_value(), &self.key_rules) {
            Ok(_) => Ok(true),
            Err(e) => absorb(errs, key.to_string(), e).map(|()| false),
        }
    }
}

impl Rule for MapRule {
    fn validate(&self, value: &Value) -> Result<(), Error> {
        self.run(None, value)
    }

    fn validate_with_context(&self, ctx: &Context, value: &Value) -> Result<(), Error> {
        self.run(Some(ctx), value)
    }

    fn descends(&self) -> bool {
        true
    }
}

impl fmt::Debug for MapRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapRule")
            .field("keys", &self.keys)
            .field("key_rules", &self.key_rules.len())
            .field("value_rules", &self.value_rules.len())
            .field("allow_extra_keys", &self.allow_extra_keys)
            .finish()
    }
}

/// Validate a keyed container against a map rule.
///
/// A nil value is an empty container. Anything else that is not a map fails
/// with a [`NotAContainer`](crate::FaultKind::NotAContainer) fault.
///
/// Uses the default [`Validator`]; call [`Validator::validate_map`] to
/// validate with a materializer.
pub fn validate_map(value: &Value, rule: &MapRule, ctx: Option<&Context>) -> Result<(), Error> {
    Validator::new().validate_map(value, rule, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FaultKind;
    use crate::rule::{by, length, required};
    use crate::rules;

    fn xyz() -> impl Rule {
        by(|v: &Value| match v.as_str() {
            Some("xyz") => Ok(()),
            _ => Err(RuleError::new("xyz", "error xyz").into()),
        })
    }

    fn sample() -> Value {
        Value::from([("A", "abc"), ("B", "xyz")])
    }

    #[test]
    fn test_declared_keys_validated() {
        let r = map(vec![key!("A", xyz()), key!("B", xyz())]);
        assert_eq!(
            validate_map(&sample(), &r, None).unwrap_err().to_string(),
            "A: error xyz."
        );
    }

    #[test]
    fn test_missing_and_optional_keys() {
        let r = map(vec![key!("X"), key!("Y").optional()]).allow_extra_keys();
        assert_eq!(
            validate_map(&sample(), &r, None).unwrap_err().to_string(),
            "X: required key is missing."
        );
    }

    #[test]
    fn test_wrong_key_kind() {
        let r = map(vec![key!(123)]).allow_extra_keys();
        let err = validate_map(&sample(), &r, None).unwrap_err();
        let errs = err.as_errors().unwrap();
        assert_eq!(errs.get("123").and_then(Error::code), Some("validation_key_wrong_type"));
    }

    #[test]
    fn test_mixed_key_kinds_are_looked_up() {
        let mut m = ValueMap::new();
        m.insert("a", 1);
        m.insert(11, "abc");
        let m = Value::from(m);

        let r = map(vec![key!(11, xyz())]).allow_extra_keys();
        assert_eq!(validate_map(&m, &r, None).unwrap_err().to_string(), "11: error xyz.");
        assert!(validate_map(&m, &map(vec![key!(11)]).allow_extra_keys(), None).is_ok());
        assert_eq!(
            validate_map(&m, &map(vec![key!(22)]).allow_extra_keys(), None)
                .unwrap_err()
                .to_string(),
            "22: required key is missing."
        );
    }

    #[test]
    fn test_duplicate_key_detected_across_builders() {
        let r = map(vec![key!("A")]).key(key!("A", required()));
        let err = validate_map(&sample(), &r, None).unwrap_err();
        assert_eq!(err.as_internal().map(InternalError::kind), Some(FaultKind::DuplicateKey));
        assert_eq!(err.to_string(), "key declared more than once: A");
    }

    #[test]
    fn test_duplicate_key_reported_before_container_check() {
        let r = map(vec![key!("A"), key!("A")]);
        let err = validate_map(&Value::from(123), &r, None).unwrap_err();
        assert_eq!(err.as_internal().map(InternalError::kind), Some(FaultKind::DuplicateKey));
    }

    #[test]
    fn test_nil_is_an_empty_container() {
        assert!(validate_map(&Value::Nil, &map(vec![]), None).is_ok());
        assert!(validate_map(&Value::none(), &map(vec![key!("A").optional()]), None).is_ok());
        assert_eq!(
            validate_map(&Value::none(), &map(vec![key!("A")]), None)
                .unwrap_err()
                .to_string(),
            "A: required key is missing."
        );
    }

    #[test]
    fn test_non_container_is_fault() {
        let err = validate_map(&Value::from(123), &map(vec![]), None).unwrap_err();
        assert_eq!(err.as_internal().map(InternalError::kind), Some(FaultKind::NotAContainer));
        assert_eq!(err.to_string(), "only a map can be validated");
    }

    #[test]
    fn test_nested_non_container_is_violation() {
        let r = map(vec![key!("A", map(vec![]))]);
        let err = validate_map(&Value::from([("A", 1)]), &r, None).unwrap_err();
        assert_eq!(err.to_string(), "A: only a map can be validated.");
        assert_eq!(err.as_errors().and_then(|e| e.get("A")).and_then(Error::code), Some("validation_not_map"));
    }

    #[test]
    fn test_key_rules_suppress_value_chain() {
        let m = Value::from([("11", "abc"), ("222", "abc")]);
        let r = map(vec![key!("11", xyz()), key!("222", xyz())]).keys(rules![length(3, 4)]);
        assert_eq!(
            validate_map(&m, &r, None).unwrap_err().to_string(),
            "11: the length must be between 3 and 4; 222: error xyz."
        );
    }

    #[test]
    fn test_extra_keys_without_value_rules_are_not_checked() {
        let r = map(vec![]).allow_extra_keys();
        assert!(validate_map(&sample(), &r, None).is_ok());

        let r = r.values(rules![xyz()]);
        assert_eq!(validate_map(&sample(), &r, None).unwrap_err().to_string(), "A: error xyz.");
    }

    #[test]
    fn test_usable_as_rule() {
        let r = map(vec![key!("A", xyz())]).allow_extra_keys();
        let err = crate::validate(&sample(), &rules![r]).unwrap_err();
        assert_eq!(err.to_string(), "A: error xyz.");
    }

    #[test]
    fn test_key_rules_builder() {
        let kr = key("A", rules![]).rule(required()).rule(length(1, 2)).optional();
        assert_eq!(kr.key(), &Key::from("A"));
        assert!(kr.is_optional());
        assert_eq!(kr.rules.len(), 2);
        let r = map(vec![kr]);
        assert_eq!(r.declared().count(), 1);
    }

    #[cfg(feature = "tracing")]
    mod tracing_tests {
        use tracing_test::traced_test;

        use super::*;

        #[traced_test]
        #[test]
        fn test_unexpected_key_is_logged() {
            let _ = validate_map(&sample(), &map(vec![key!("A")]), None);
            assert!(logs_contain("unexpected key"));
        }

        #[traced_test]
        #[test]
        fn test_duplicate_key_is_logged() {
            let _ = validate_map(&sample(), &map(vec![key!("A"), key!("A")]), None);
            assert!(logs_contain("key declared more than once"));
        }
    }
}
