//! Length rules

use crate::error::{Error, RuleError};
use crate::introspect::{as_string_or_bytes, indirect, is_empty, length_of};
use crate::rule::Rule;
use crate::value::Value;

/// Checks the length of a string, byte sequence, list or map.
///
/// Nil and empty values pass; pair with [`required`](crate::rule::required)
/// to reject them.
#[derive(Debug, Clone)]
pub struct Length {
    min: usize,
    max: usize,
    rune: bool,
    err: RuleError,
}

/// Length between `min` and `max` inclusive. A bound of zero is open, and
/// `length(0, 0)` only accepts empty values.
///
/// ```
/// use weir::rule::{length, Rule};
/// use weir::Value;
///
/// let r = length(5, 10);
/// assert!(r.validate(&Value::from("hello")).is_ok());
/// assert_eq!(
///     r.validate(&Value::from("demo")).unwrap_err().to_string(),
///     "the length must be between 5 and 10"
/// );
/// ```
pub fn length(min: usize, max: usize) -> Length {
    Length {
        min,
        max,
        rune: false,
        err: length_error(min, max),
    }
}

/// Like [`length`], but strings are measured in characters, not bytes.
pub fn rune_length(min: usize, max: usize) -> Length {
    Length {
        rune: true,
        ..length(min, max)
    }
}

fn length_error(min: usize, max: usize) -> RuleError {
    match (min, max) {
        (0, 0) => RuleError::from_static("validation_length_empty_required", "the value must be empty"),
        (0, max) => RuleError::from_static(
            "validation_length_too_long",
            "the length must be no more than {max}",
        )
        .with_param("max", max),
        (min, 0) => RuleError::from_static(
            "validation_length_too_short",
            "the length must be no less than {min}",
        )
        .with_param("min", min),
        (min, max) if min == max => {
            RuleError::from_static("validation_length_invalid", "the length must be exactly {min}")
                .with_param("min", min)
        }
        (min, max) => RuleError::from_static(
            "validation_length_out_of_range",
            "the length must be between {min} and {max}",
        )
        .with_param("min", min)
        .with_param("max", max),
    }
}

impl Length {
    /// Replace the message template, keeping code and parameters.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.err = self.err.with_message(message.into());
        self
    }

    /// Replace the whole error.
    pub fn error_object(mut self, err: RuleError) -> Self {
        self.err = err;
        self
    }

    fn measure(&self, value: &Value) -> Result<usize, Error> {
        if self.rune && matches!(value, Value::String(_) | Value::Bytes(_)) {
            return Ok(as_string_or_bytes(value)?.chars().count());
        }
        Ok(length_of(value)?)
    }
}

impl Rule for Length {
    fn validate(&self, value: &Value) -> Result<(), Error> {
        let value = match indirect(value) {
            Some(v) if !is_empty(v) => v,
            _ => return Ok(()),
        };
        let len = self.measure(value)?;
        let too_short = self.min > 0 && len < self.min;
        let too_long = self.max > 0 && len > self.max;
        let not_empty = self.min == 0 && self.max == 0 && len > 0;
        if too_short || too_long || not_empty {
            return Err(self.err.clone().into());
        }
        Ok(())
    }
}
