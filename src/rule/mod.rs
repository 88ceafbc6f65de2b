//! Rules: the unit of validation
//!
//! A [`Rule`] looks at one [`Value`] and either approves it or returns an
//! [`Error`]. Rules are stateless once built, so one rule set can be shared
//! by any number of concurrent validations.
//!
//! Rules come in three flavours:
//!
//! - leaf rules that check content ([`length`], [`string_in`], [`by`], ...)
//! - sentinels that steer the chain ([`skip`], [`required`], [`not_nil`])
//! - composites that recurse ([`each`], [`map`](crate::map::map))
//!
//! Chains are plain `Vec<BoxedRule>`, usually built with [`rules!`](crate::rules).
//!
//! # Example
//!
//! ```
//! use weir::{rules, validate, Value};
//! use weir::rule::{length, required, skip};
//!
//! let chain = rules![required(), length(2, 5)];
//! assert!(validate(&Value::from("abc"), &chain).is_ok());
//! assert_eq!(
//!     validate(&Value::from(""), &chain).unwrap_err().to_string(),
//!     "cannot be blank"
//! );
//!
//! // Nothing after a skip runs.
//! assert!(validate(&Value::from(""), &rules![skip(), required()]).is_ok());
//! ```

use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Error;
use crate::value::Value;

mod each;
mod length;
mod sentinel;
mod string_in;

pub use each::{each, Each};
pub use length::{length, rune_length, Length};
pub use sentinel::{not_nil, required, skip, NotNil, Required, Skip};
pub use string_in::{string_in, string_not_in, StringIn, StringNotIn};

/// A unit of validation over one value.
pub trait Rule: Send + Sync {
    /// Validate a value.
    fn validate(&self, value: &Value) -> Result<(), Error>;

    /// Validate a value with an execution context.
    ///
    /// Rules that never look at the context keep the default, which ignores it.
    fn validate_with_context(&self, ctx: &Context, value: &Value) -> Result<(), Error> {
        let _ = ctx;
        self.validate(value)
    }

    /// Whether reaching this rule ends its chain successfully.
    fn skips(&self) -> bool {
        false
    }

    /// Whether this rule validates the elements of the container it checks.
    ///
    /// Such rules run the elements' own chains, so the engine does not
    /// self-validate those elements a second time.
    fn descends(&self) -> bool {
        false
    }
}

/// A shareable, type-erased rule.
pub type BoxedRule = Arc<dyn Rule>;

impl<R: Rule + ?Sized> Rule for Arc<R> {
    fn validate(&self, value: &Value) -> Result<(), Error> {
        (**self).validate(value)
    }

    fn validate_with_context(&self, ctx: &Context, value: &Value) -> Result<(), Error> {
        (**self).validate_with_context(ctx, value)
    }

    fn skips(&self) -> bool {
        (**self).skips()
    }

    fn descends(&self) -> bool {
        (**self).descends()
    }
}

/// Build a rule chain (`Vec<BoxedRule>`) from rule expressions.
///
/// ```
/// use weir::rules;
/// use weir::rule::{length, required};
///
/// let chain = rules![required(), length(1, 10)];
/// assert_eq!(chain.len(), 2);
/// assert!(rules![].is_empty());
/// ```
#[macro_export]
macro_rules! rules {
    () => {
        ::std::vec::Vec::<$crate::BoxedRule>::new()
    };
    ($($rule:expr),+ $(,)?) => {
        ::std::vec![$(::std::sync::Arc::new($rule) as $crate::BoxedRule),+]
    };
}

/// Rule backed by a closure.
pub struct By<F>(F);

/// Wrap a closure as a rule.
///
/// ```
/// use weir::{rules, validate, Error, RuleError, Value};
/// use weir::rule::by;
///
/// let abc = by(|v: &Value| match v.as_str() {
///     Some("abc") => Ok(()),
///     _ => Err(Error::from(RuleError::new("abc", "error abc"))),
/// });
/// assert!(validate(&Value::from("abc"), &rules![abc]).is_ok());
/// ```
pub fn by<F>(f: F) -> By<F>
where
    F: Fn(&Value) -> Result<(), Error> + Send + Sync,
{
    By(f)
}

impl<F> Rule for By<F>
where
    F: Fn(&Value) -> Result<(), Error> + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<(), Error> {
        (self.0)(value)
    }
}

impl<F> fmt::Debug for By<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("By")
    }
}

/// Context-aware rule backed by a closure.
pub struct WithContext<F>(F);

/// Wrap a context-aware closure as a rule.
///
/// Without a context the closure receives [`Context::background`].
pub fn with_context<F>(f: F) -> WithContext<F>
where
    F: Fn(&Context, &Value) -> Result<(), Error> + Send + Sync,
{
    WithContext(f)
}

impl<F> Rule for WithContext<F>
where
    F: Fn(&Context, &Value) -> Result<(), Error> + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<(), Error> {
        (self.0)(&Context::background(), value)
    }

    fn validate_with_context(&self, ctx: &Context, value: &Value) -> Result<(), Error> {
        (self.0)(ctx, value)
    }
}

impl<F> fmt::Debug for WithContext<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WithContext")
    }
}
