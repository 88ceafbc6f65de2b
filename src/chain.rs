//! Rule chain evaluation and the validation entry points
//!
//! A chain runs left to right against one value and stops at the first
//! failure or at the first active [`skip`](crate::rule::skip). When the chain
//! completes without skipping, any [`Validatable`](crate::Validatable) object
//! behind the value gets to validate itself. Containers of objects are
//! self-validated element-wise, unless a composite rule in the chain (a map
//! rule or [`each`](crate::rule::each)) already visited the elements.
//!
//! # Example
//!
//! ```
//! use weir::{rules, validate, validate_with_context, Context, Value};
//! use weir::rule::{length, required};
//!
//! let chain = rules![required(), length(5, 10)];
//! let value = Value::from("demo");
//!
//! let plain = validate(&value, &chain).unwrap_err();
//! let with_ctx = validate_with_context(&Context::background(), &value, &chain).unwrap_err();
//! assert_eq!(plain.to_string(), "the length must be between 5 and 10");
//! assert_eq!(plain, with_ctx);
//! ```

use std::borrow::Cow;
use std::cell::RefCell;

use crate::context::Context;
use crate::error::{Error, Errors};
use crate::introspect::{indirect, indirect_with, Materializer};
use crate::map::MapRule;
use crate::rule::BoxedRule;
use crate::value::Value;

/// How a chain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Completed,
    /// Completed, and a composite rule already validated the elements.
    Descended,
    Skipped,
}

/// Run rules in order until one fails or skips.
pub(crate) fn run_chain<'r, I>(ctx: Option<&Context>, value: &Value, rules: I) -> Result<Flow, Error>
where
    I: IntoIterator<Item = &'r BoxedRule>,
{
    let mut descended = false;
    for rule in rules {
        if rule.skips() {
            #[cfg(feature = "tracing")]
            tracing::trace!("skip reached, remaining rules suppressed");
            return Ok(Flow::Skipped);
        }
        match ctx {
            Some(ctx) => rule.validate_with_context(ctx, value)?,
            None => rule.validate(value)?,
        }
        descended |= rule.descends();
    }
    Ok(if descended { Flow::Descended } else { Flow::Completed })
}

/// Run a chain, then let the value validate itself unless the chain skipped.
///
/// Rules see the materialized form of the value; self-validation sees the
/// value as given.
pub(crate) fn evaluate<'r, I>(ctx: Option<&Context>, value: &Value, rules: I) -> Result<(), Error>
where
    I: IntoIterator<Item = &'r BoxedRule>,
{
    let resolved = materialized(value);
    match run_chain(ctx, resolved.as_ref().unwrap_or(value), rules)? {
        Flow::Skipped => Ok(()),
        Flow::Completed => validate_self(ctx, value, true),
        Flow::Descended => validate_self(ctx, value, false),
    }
}

fn validate_self(ctx: Option<&Context>, value: &Value, elements: bool) -> Result<(), Error> {
    match indirect(value) {
        Some(Value::Object(object)) => match ctx {
            Some(ctx) => object.validate_with_context(ctx),
            None => object.validate(),
        },
        Some(Value::List(items)) if elements => {
            let mut errs = Errors::new();
            for (i, item) in items.iter().enumerate() {
                if let Some(Value::Object(_)) = indirect(item) {
                    if let Err(e) = validate_self(ctx, item, true) {
                        absorb(&mut errs, i.to_string(), e)?;
                    }
                }
            }
            errs.into_result()
        }
        Some(Value::Map(m)) if elements => {
            let mut errs = Errors::new();
            for (k, item) in m.iter() {
                if let Some(Value::Object(_)) = indirect(item) {
                    if let Err(e) = validate_self(ctx, item, true) {
                        absorb(&mut errs, k.to_string(), e)?;
                    }
                }
            }
            errs.into_result()
        }
        _ => Ok(()),
    }
}

thread_local! {
    static ACTIVE_MATERIALIZER: RefCell<Option<Materializer>> = const { RefCell::new(None) };
}

/// Installs a validator's materializer for the duration of one call.
///
/// Validation runs on the caller's thread, so nested rules and objects reach
/// the hook through the thread-local slot. Dropping restores the outer call's
/// hook.
struct MaterializerScope {
    outer: Option<Materializer>,
}

impl MaterializerScope {
    fn enter(materializer: Option<Materializer>) -> Self {
        let outer = ACTIVE_MATERIALIZER.with(|slot| slot.replace(materializer));
        MaterializerScope { outer }
    }
}

impl Drop for MaterializerScope {
    fn drop(&mut self) {
        let outer = self.outer.take();
        ACTIVE_MATERIALIZER.with(|slot| {
            slot.replace(outer);
        });
    }
}

/// The alternate form of `value` under the active materializer, if it has one.
///
/// An object that materializes to nil yields [`Value::Nil`].
pub(crate) fn materialized(value: &Value) -> Option<Value> {
    // Cloned out so the hook may itself start a nested validation.
    let materializer = ACTIVE_MATERIALIZER.with(|slot| slot.borrow().clone())?;
    match indirect_with(value, &materializer) {
        Some(Cow::Borrowed(_)) => None,
        Some(Cow::Owned(alternate)) => Some(alternate),
        None if indirect(value).is_some() => Some(Value::Nil),
        None => None,
    }
}

/// Record `err` under `key`, or hand it back when it must abort.
///
/// Faults abort, except type mismatches, which are the key's own violation.
pub(crate) fn absorb(errs: &mut Errors, key: String, err: Error) -> Result<(), Error> {
    match err {
        Error::Internal(fault) if fault.is_type_mismatch() => {
            errs.insert_first(key, fault.into_violation());
            Ok(())
        }
        err @ Error::Internal(_) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(key = %key, error = %err, "validation aborted by fault");
            Err(err)
        }
        other => {
            errs.insert_first(key, other);
            Ok(())
        }
    }
}

/// Per-call validation configuration.
///
/// The default validator uses no materializer; [`validate`],
/// [`validate_with_context`] and [`validate_map`](crate::validate_map) are
/// shorthands for it.
///
/// With a materializer, rules check what an object stands for while the
/// object still validates itself.
///
/// ```
/// use weir::introspect::default_materializer;
/// use weir::rule::required;
/// use weir::{rules, Error, Validatable, Validator, Value};
///
/// #[derive(Debug)]
/// struct NullString(Option<String>);
///
/// impl Validatable for NullString {
///     fn validate(&self) -> Result<(), Error> {
///         Ok(())
///     }
///
///     fn materialize(&self) -> Option<Value> {
///         Some(Value::from(self.0.clone()))
///     }
/// }
///
/// let value = Value::object(NullString(None));
/// let chain = rules![required()];
///
/// // Without a materializer the object is present.
/// assert!(Validator::new().validate(&value, &chain).is_ok());
///
/// // With one, it is the nil it stands for.
/// let v = Validator::new().with_materializer(default_materializer());
/// assert_eq!(v.validate(&value, &chain).unwrap_err().to_string(), "cannot be blank");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validator {
    materializer: Option<Materializer>,
}

impl Validator {
    /// A validator with no materializer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Let rules see the alternate representation the materializer gives a
    /// value. Objects still run their own validation.
    pub fn with_materializer(mut self, materializer: Materializer) -> Self {
        self.materializer = Some(materializer);
        self
    }

    /// Validate `value` against `rules`.
    pub fn validate(&self, value: &Value, rules: &[BoxedRule]) -> Result<(), Error> {
        let _scope = MaterializerScope::enter(self.materializer.clone());
        evaluate(None, value, rules)
    }

    /// Validate `value` against `rules`, passing `ctx` to context-aware rules.
    pub fn validate_with_context(
        &self,
        ctx: &Context,
        value: &Value,
        rules: &[BoxedRule],
    ) -> Result<(), Error> {
        let _scope = MaterializerScope::enter(self.materializer.clone());
        evaluate(Some(ctx), value, rules)
    }

    /// Validate a keyed container against a map rule.
    ///
    /// See [`validate_map`](crate::validate_map).
    pub fn validate_map(&self, value: &Value, rule: &MapRule, ctx: Option<&Context>) -> Result<(), Error> {
        let _scope = MaterializerScope::enter(self.materializer.clone());
        rule.run(ctx, value)
    }
}

/// Validate `value` against `rules`.
///
/// Returns `Ok(())`, the first violation of the chain, the value's own
/// validation error, or a fault.
pub fn validate(value: &Value, rules: &[BoxedRule]) -> Result<(), Error> {
    Validator::new().validate(value, rules)
}

/// Validate `value` against `rules` with an execution context.
pub fn validate_with_context(ctx: &Context, value: &Value, rules: &[BoxedRule]) -> Result<(), Error> {
    Validator::new().validate_with_context(ctx, value, rules)
}
