//! Membership rules for text values

use crate::error::{Error, RuleError};
use crate::introspect::{as_string_or_bytes, indirect, is_empty};
use crate::rule::Rule;
use crate::value::Value;

fn contains(values: &[String], case_sensitive: bool, candidate: &str) -> bool {
    if case_sensitive {
        values.iter().any(|v| v == candidate)
    } else {
        let candidate = candidate.to_lowercase();
        values.iter().any(|v| v.to_lowercase() == candidate)
    }
}

/// Passes when the text is one of a fixed list.
#[derive(Debug, Clone)]
pub struct StringIn {
    case_sensitive: bool,
    values: Vec<String>,
    err: RuleError,
}

/// Text must equal one of `values`. Nil and empty values pass.
///
/// ```
/// use weir::rule::{string_in, Rule};
/// use weir::Value;
///
/// let r = string_in(false, ["A", "B"]);
/// assert!(r.validate(&Value::from("b")).is_ok());
/// assert_eq!(r.validate(&Value::from("c")).unwrap_err().to_string(), "must be a valid value");
/// ```
pub fn string_in<I, S>(case_sensitive: bool, values: I) -> StringIn
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    StringIn {
        case_sensitive,
        values: values.into_iter().map(Into::into).collect(),
        err: RuleError::from_static("validation_in_invalid", "must be a valid value"),
    }
}

impl StringIn {
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

impl Rule for StringIn {
    fn validate(&self, value: &Value) -> Result<(), Error> {
        let value = match indirect(value) {
            Some(v) if !is_empty(v) => v,
            _ => return Ok(()),
        };
        let text = as_string_or_bytes(value)?;
        if contains(&self.values, self.case_sensitive, &text) {
            Ok(())
        } else {
            Err(self.err.clone().into())
        }
    }
}

/// Passes when the text is none of a fixed list.
#[derive(Debug, Clone)]
pub struct StringNotIn {
    case_sensitive: bool,
    values: Vec<String>,
    err: RuleError,
}

/// Text must differ from every entry of `values`. Nil and empty values pass.
pub fn string_not_in<I, S>(case_sensitive: bool, values: I) -> StringNotIn
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    StringNotIn {
        case_sensitive,
        values: values.into_iter().map(Into::into).collect(),
        err: RuleError::from_static("validation_not_in_invalid", "must not be in list"),
    }
}

impl StringNotIn {
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

impl Rule for StringNotIn {
    fn validate(&self, value: &Value) -> Result<(), Error> {
        let value = match indirect(value) {
            Some(v) if !is_empty(v) => v,
            _ => return Ok(()),
        };
        let text = as_string_or_bytes(value)?;
        if contains(&self.values, self.case_sensitive, &text) {
            Err(self.err.clone().into())
        } else {
            Ok(())
        }
    }
}
