//! Element-wise validation of lists and maps

use std::fmt;

use crate::chain::{absorb, evaluate, materialized};
use crate::context::Context;
use crate::error::{Error, Errors, InternalError};
use crate::introspect::indirect;
use crate::rule::{BoxedRule, Rule};
use crate::value::Value;

/// Runs a chain against every element of a list or map.
///
/// Violations are keyed by index (lists) or key (maps) in a nested
/// [`Errors`].
#[derive(Clone)]
pub struct Each {
    rules: Vec<BoxedRule>,
}

/// Validate every element with `rules`. Nil passes.
///
/// ```
/// use weir::rule::{each, length, Rule};
/// use weir::{rules, Value};
///
/// let r = each(rules![length(0, 3)]);
/// let err = r.validate(&Value::from(vec!["abc", "toolong"])).unwrap_err();
/// assert_eq!(err.to_string(), "1: the length must be no more than 3.");
/// ```
pub fn each(rules: Vec<BoxedRule>) -> Each {
    Each { rules }
}

impl Each {
    fn run(&self, ctx: Option<&Context>, value: &Value) -> Result<(), Error> {
        let resolved = materialized(value);
        let mut errs = Errors::new();
        match indirect(resolved.as_ref().unwrap_or(value)) {
            None => return Ok(()),
            Some(Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    if let Err(e) = evaluate(ctx, item, &self.rules) {
                        absorb(&mut errs, i.to_string(), e)?;
                    }
                }
            }
            Some(Value::Map(m)) => {
                for (k, item) in m.iter() {
                    if let Err(e) = evaluate(ctx, item, &self.rules) {
                        absorb(&mut errs, k.to_string(), e)?;
                    }
                }
            }
            Some(_) => return Err(InternalError::not_iterable().into()),
        }
        errs.into_result()
    }
}

impl Rule for Each {
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

impl fmt::Debug for Each {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Each")
            .field("rules", &self.rules.len())
            .finish()
    }
}
