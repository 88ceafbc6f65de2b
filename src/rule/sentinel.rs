//! Chain-steering and presence rules

use crate::error::{Error, RuleError};
use crate::introspect::{indirect, is_empty};
use crate::rule::Rule;
use crate::value::Value;

/// Ends the chain successfully when reached.
///
/// Rules placed before a skip have already run; only the ones after it are
/// suppressed, together with the value's own validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skip {
    active: bool,
}

/// An unconditional skip.
pub fn skip() -> Skip {
    Skip { active: true }
}

impl Skip {
    /// Skip only when `condition` holds; otherwise a no-op.
    pub fn when(self, condition: bool) -> Skip {
        Skip { active: condition }
    }
}

impl Rule for Skip {
    fn validate(&self, _value: &Value) -> Result<(), Error> {
        Ok(())
    }

    fn skips(&self) -> bool {
        self.active
    }
}

const ERR_REQUIRED: RuleError = RuleError::from_static("validation_required", "cannot be blank");
const ERR_NOT_NIL: RuleError = RuleError::from_static("validation_not_nil_required", "is required");

/// Rejects empty values (after following references).
#[derive(Debug, Clone)]
pub struct Required {
    condition: bool,
    err: RuleError,
}

/// Fails with `cannot be blank` on nil, zero and empty values.
pub fn required() -> Required {
    Required {
        condition: true,
        err: ERR_REQUIRED,
    }
}

impl Required {
    /// Only enforce the rule when `condition` holds.
    pub fn when(mut self, condition: bool) -> Self {
        self.condition = condition;
        self
    }

    /// Replace the message, keeping the code.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.err = self.err.with_message(message.into());
        self
    }

    /// Replace the whole error.
    pub fn error_object(mut self, err: RuleError) -> Self {
        self.err = err;
        self
    }
}

impl Rule for Required {
    fn validate(&self, value: &Value) -> Result<(), Error> {
        if self.condition && is_empty(value) {
            return Err(self.err.clone().into());
        }
        Ok(())
    }
}

/// Rejects nil references only.
#[derive(Debug, Clone)]
pub struct NotNil {
    err: RuleError,
}

/// Fails with `is required` when the value is nil after indirection.
/// Present-but-empty values pass.
pub fn not_nil() -> NotNil {
    NotNil { err: ERR_NOT_NIL }
}

impl NotNil {
    /// Replace the message, keeping the code.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.err = self.err.with_message(message.into());
        self
    }

    /// Replace the whole error.
    pub fn error_object(mut self, err: RuleError) -> Self {
        self.err = err;
        self
    }
}

impl Rule for NotNil {
    fn validate(&self, value: &Value) -> Result<(), Error> {
        match indirect(value) {
            None => Err(self.err.clone().into()),
            Some(_) => Ok(()),
        }
    }
}
