//! Validation errors
//!
//! Every rule reports through one [`Error`] type with three shapes:
//!
//! - [`Error::Rule`]: a leaf violation (`cannot be blank`, `key not expected`, ...)
//! - [`Error::Errors`]: a structured, keyed aggregate of other errors
//! - [`Error::Internal`]: a fault that has nothing to do with the data
//!   (duplicate key declarations, cancelled contexts, misconfigured rules)
//!
//! Violations are collected per key; faults abort the validation call and are
//! returned as-is.
//!
//! # Examples
//!
//! ```
//! use weir::{Error, Errors, RuleError};
//!
//! let mut errs = Errors::new();
//! errs.insert("Value", RuleError::new("validation_length_out_of_range", "the length must be between {min} and {max}")
//!     .with_param("min", 5)
//!     .with_param("max", 10));
//! errs.insert("Extra", RuleError::new("validation_key_unexpected", "key not expected"));
//!
//! assert_eq!(
//!     Error::from(errs).to_string(),
//!     "Extra: key not expected; Value: the length must be between 5 and 10."
//! );
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

use crate::Semigroup;

/// A leaf validation violation.
///
/// The message is a template: `{name}` placeholders are replaced by the
/// matching entry of [`params`](RuleError::params) when the error is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleError {
    code: Cow<'static, str>,
    message: Cow<'static, str>,
    params: BTreeMap<String, String>,
}

impl RuleError {
    /// Create a new rule error from a code and a message template.
    pub fn new(code: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) -> Self {
        RuleError {
            code: code.into(),
            message: message.into(),
            params: BTreeMap::new(),
        }
    }

    /// Const constructor used by the built-in rules.
    pub const fn from_static(code: &'static str, message: &'static str) -> Self {
        RuleError {
            code: Cow::Borrowed(code),
            message: Cow::Borrowed(message),
            params: BTreeMap::new(),
        }
    }

    /// The machine-readable error code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The message template, before parameter substitution.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Parameters substituted into the message template.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Replace the code.
    pub fn with_code(mut self, code: impl Into<Cow<'static, str>>) -> Self {
        self.code = code.into();
        self
    }

    /// Replace the message template, keeping code and parameters.
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a template parameter.
    ///
    /// ```
    /// use weir::RuleError;
    ///
    /// let err = RuleError::new("too_long", "at most {max} characters").with_param("max", 8);
    /// assert_eq!(err.to_string(), "at most 8 characters");
    /// ```
    pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    /// Render the message with every parameter substituted.
    ///
    /// Substitution is a single pass over the template: placeholders inside
    /// parameter values are left as they are, and unknown placeholders are
    /// kept verbatim.
    pub fn render(&self) -> String {
        if self.params.is_empty() {
            return self.message.to_string();
        }
        let mut out = String::with_capacity(self.message.len());
        let mut rest: &str = &self.message;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let param = after
                .find('}')
                .and_then(|close| self.params.get(&after[..close]).map(|v| (close, v)));
            match param {
                Some((close, value)) => {
                    out.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl StdError for RuleError {}

/// Classification of an [`InternalError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// A map rule was applied to something that is not a keyed container.
    NotAContainer,
    /// An element-wise rule was applied to something that is not iterable.
    NotIterable,
    /// The same key was declared twice in one map rule.
    DuplicateKey,
    /// The validation context was cancelled.
    Cancelled,
    /// The validation context's deadline passed.
    DeadlineExceeded,
    /// A rule reported a fault of its own.
    Rule,
}

/// A fault unrelated to the data being validated.
///
/// Internal errors are never folded into a structured [`Errors`]; they abort
/// the enclosing validation and surface verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalError {
    kind: FaultKind,
    message: Cow<'static, str>,
}

impl InternalError {
    /// Create a rule fault.
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(FaultKind::Rule, message)
    }

    /// Create a fault of a specific kind.
    pub fn with_kind(kind: FaultKind, message: impl Into<Cow<'static, str>>) -> Self {
        InternalError {
            kind,
            message: message.into(),
        }
    }

    /// The value is not a map.
    pub fn not_a_container() -> Self {
        Self::with_kind(FaultKind::NotAContainer, "only a map can be validated")
    }

    /// The value is neither a list nor a map.
    pub fn not_iterable() -> Self {
        Self::with_kind(
            FaultKind::NotIterable,
            "must be an iterable (map, slice or array)",
        )
    }

    /// A key was declared more than once.
    pub fn duplicate_key(key: impl fmt::Display) -> Self {
        Self::with_kind(
            FaultKind::DuplicateKey,
            format!("key declared more than once: {}", key),
        )
    }

    /// The fault kind.
    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    /// The fault message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the fault describes a value of the wrong shape rather than a
    /// broken rule set. Such faults become violations when they happen under
    /// a key.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.kind, FaultKind::NotAContainer | FaultKind::NotIterable)
    }

    pub(crate) fn into_violation(self) -> RuleError {
        let code = match self.kind {
            FaultKind::NotAContainer => "validation_not_map",
            FaultKind::NotIterable => "validation_not_iterable",
            _ => "validation_internal",
        };
        RuleError::new(code, self.message)
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for InternalError {}

/// Structured, keyed aggregate of validation errors.
///
/// Entries are ordered by key so the rendered text is the same on every run,
/// whatever order the validated container yields its entries in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Errors(BTreeMap<String, Error>);

impl Errors {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Errors(BTreeMap::new())
    }

    /// Record an error under a key, replacing any earlier entry.
    pub fn insert(&mut self, key: impl Into<String>, err: impl Into<Error>) {
        self.0.insert(key.into(), err.into());
    }

    /// Record an error under a key unless the key already has one.
    pub fn insert_first(&mut self, key: impl Into<String>, err: impl Into<Error>) {
        self.0.entry(key.into()).or_insert_with(|| err.into());
    }

    /// Look up the error recorded for a key.
    pub fn get(&self, key: &str) -> Option<&Error> {
        self.0.get(key)
    }

    /// Whether a key has an error.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of keyed entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `None` when empty, otherwise the aggregate as an [`Error`].
    pub fn filter(self) -> Option<Error> {
        if self.0.is_empty() {
            None
        } else {
            Some(Error::Errors(self))
        }
    }

    /// `Ok(())` when empty, otherwise `Err` with the aggregate.
    pub fn into_result(self) -> Result<(), Error> {
        match self.filter() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        for (i, (key, err)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            match err {
                Error::Errors(nested) => write!(f, "{}: ({})", key, nested)?,
                other => write!(f, "{}: {}", key, other)?,
            }
        }
        f.write_str(".")
    }
}

impl StdError for Errors {}

// Left-biased union: an existing entry for a key is never overwritten.
impl Semigroup for Errors {
    fn combine(mut self, other: Self) -> Self {
        for (key, err) in other.0 {
            self.0.entry(key).or_insert(err);
        }
        self
    }
}

impl FromIterator<(String, Error)> for Errors {
    fn from_iter<I: IntoIterator<Item = (String, Error)>>(iter: I) -> Self {
        Errors(iter.into_iter().collect())
    }
}

impl IntoIterator for Errors {
    type Item = (String, Error);
    type IntoIter = std::collections::btree_map::IntoIter<String, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The error returned by every rule and validation entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A leaf violation.
    Rule(RuleError),
    /// A keyed aggregate of violations.
    Errors(Errors),
    /// A fault that aborts validation.
    Internal(InternalError),
}

impl Error {
    /// Whether this is a fault rather than a violation.
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Internal(_))
    }

    /// The code of a leaf violation.
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Rule(e) => Some(e.code()),
            _ => None,
        }
    }

    /// The structured aggregate, if this is one.
    pub fn as_errors(&self) -> Option<&Errors> {
        match self {
            Error::Errors(errs) => Some(errs),
            _ => None,
        }
    }

    /// The fault, if this is one.
    pub fn as_internal(&self) -> Option<&InternalError> {
        match self {
            Error::Internal(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Rule(e) => fmt::Display::fmt(e, f),
            Error::Errors(e) => fmt::Display::fmt(e, f),
            Error::Internal(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Rule(e) => Some(e),
            Error::Errors(e) => Some(e),
            Error::Internal(e) => Some(e),
        }
    }
}

impl From<RuleError> for Error {
    fn from(e: RuleError) -> Self {
        Error::Rule(e)
    }
}

impl From<Errors> for Error {
    fn from(e: Errors) -> Self {
        Error::Errors(e)
    }
}

impl From<InternalError> for Error {
    fn from(e: InternalError) -> Self {
        Error::Internal(e)
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::ser::SerializeMap;
    use serde::{Serialize, Serializer};

    use super::{Error, Errors};

    impl Serialize for Errors {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.0.len()))?;
            for (key, err) in &self.0 {
                map.serialize_entry(key, err)?;
            }
            map.end()
        }
    }

    impl Serialize for Error {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Error::Errors(errs) => errs.serialize(serializer),
                other => serializer.serialize_str(&other.to_string()),
            }
        }
    }
}
