//! Type-uniform views over values
//!
//! Rules ask three kinds of questions about the value they check: is it text,
//! how long is it, what number is it. Each question is a small capability
//! trait ([`TextLike`], [`HasLength`], [`NumericLike`]) implemented for
//! [`Value`] and for the matching native Rust types, so the same helpers work
//! on both.
//!
//! Indirection is handled separately: [`indirect`] follows reference layers
//! down to a concrete value, and [`indirect_with`] additionally lets a
//! [`Materializer`] swap objects for an alternate representation.
//!
//! # Examples
//!
//! ```
//! use weir::introspect::{indirect, is_empty, length_of, to_int};
//! use weir::Value;
//!
//! let v = Value::some(Value::some("abc"));
//! assert_eq!(indirect(&v), Some(&Value::from("abc")));
//! assert_eq!(length_of(indirect(&v).unwrap()).unwrap(), 3);
//! assert!(is_empty(&Value::some(Value::some(""))));
//!
//! assert_eq!(to_int(&Value::from(7)).unwrap(), 7);
//! assert!(to_int(&Value::from(7.5)).is_err());
//! ```

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, RuleError};
use crate::value::Value;

/// Upper bound on chained materializations of a single value.
pub const MAX_MATERIALIZE_DEPTH: usize = 32;

/// Why an introspection helper could not produce a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntrospectErrorKind {
    /// Neither text nor bytes.
    NotStringOrBytes,
    /// No length.
    NoLength,
    /// Not in the requested numeric family.
    NotConvertible,
}

/// Error returned by the introspection helpers.
///
/// Converts into an [`Error::Rule`] violation, so a rule can `?` it and the
/// mismatch is reported against the key being checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntrospectError {
    kind: IntrospectErrorKind,
    message: String,
}

impl IntrospectError {
    fn new(kind: IntrospectErrorKind, message: String) -> Self {
        IntrospectError { kind, message }
    }

    /// The failure kind.
    pub fn kind(&self) -> IntrospectErrorKind {
        self.kind
    }

    fn code(&self) -> &'static str {
        match self.kind {
            IntrospectErrorKind::NotStringOrBytes => "validation_not_string_or_bytes",
            IntrospectErrorKind::NoLength => "validation_no_length",
            IntrospectErrorKind::NotConvertible => "validation_not_convertible",
        }
    }
}

impl fmt::Display for IntrospectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for IntrospectError {}

impl From<IntrospectError> for Error {
    fn from(e: IntrospectError) -> Self {
        Error::Rule(RuleError::new(e.code(), e.message))
    }
}

/// Values that can be read as text.
pub trait TextLike {
    /// The text, or `None` when the value is not textual.
    fn as_text(&self) -> Option<Cow<'_, str>>;
}

/// Values with a length.
pub trait HasLength {
    /// The length, or `None` when the value has none.
    fn length(&self) -> Option<usize>;

    /// Name used in error messages.
    fn length_kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Values that may be numbers.
///
/// Each family only answers for itself: an integer has no float view.
pub trait NumericLike {
    /// Signed integer view.
    fn as_i64(&self) -> Option<i64> {
        None
    }

    /// Unsigned integer view.
    fn as_u64(&self) -> Option<u64> {
        None
    }

    /// Floating point view.
    fn as_f64(&self) -> Option<f64> {
        None
    }

    /// Name used in error messages.
    fn numeric_kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl TextLike for Value {
    fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Bytes(b) => Some(String::from_utf8_lossy(b)),
            _ => None,
        }
    }
}

impl HasLength for Value {
    fn length(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.len()),
            Value::Bytes(b) => Some(b.len()),
            Value::List(items) => Some(items.len()),
            Value::Map(m) => Some(m.len()),
            _ => None,
        }
    }

    fn length_kind(&self) -> &'static str {
        self.kind_name()
    }
}

impl NumericLike for Value {
    fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint(u) => Some(*u),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn numeric_kind(&self) -> &'static str {
        self.kind_name()
    }
}

impl TextLike for str {
    fn as_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl TextLike for String {
    fn as_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl TextLike for [u8] {
    fn as_text(&self) -> Option<Cow<'_, str>> {
        Some(String::from_utf8_lossy(self))
    }
}

impl TextLike for Vec<u8> {
    fn as_text(&self) -> Option<Cow<'_, str>> {
        Some(String::from_utf8_lossy(self))
    }
}

impl HasLength for str {
    fn length(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl HasLength for String {
    fn length(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<T> HasLength for [T] {
    fn length(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<T> HasLength for Vec<T> {
    fn length(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<T, const N: usize> HasLength for [T; N] {
    fn length(&self) -> Option<usize> {
        Some(N)
    }
}

impl<K, V, S> HasLength for HashMap<K, V, S> {
    fn length(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<K, V> HasLength for BTreeMap<K, V> {
    fn length(&self) -> Option<usize> {
        Some(self.len())
    }
}

macro_rules! impl_numeric_like {
    ($method:ident, $target:ty; $($t:ty),+) => {
        $(
            impl NumericLike for $t {
                fn $method(&self) -> Option<$target> {
                    Some(*self as $target)
                }
            }
        )+
    };
}

impl_numeric_like!(as_i64, i64; i8, i16, i32, i64, isize);
impl_numeric_like!(as_u64, u64; u8, u16, u32, u64, usize);
impl_numeric_like!(as_f64, f64; f32, f64);

/// Read a value as text. Byte sequences are decoded lossily.
pub fn as_string_or_bytes<T: TextLike + ?Sized>(value: &T) -> Result<Cow<'_, str>, IntrospectError> {
    value.as_text().ok_or_else(|| {
        IntrospectError::new(
            IntrospectErrorKind::NotStringOrBytes,
            "must be either a string or byte slice".to_string(),
        )
    })
}

/// The length of a string, byte sequence, list or map.
pub fn length_of<T: HasLength + ?Sized>(value: &T) -> Result<usize, IntrospectError> {
    value.length().ok_or_else(|| {
        IntrospectError::new(
            IntrospectErrorKind::NoLength,
            format!("cannot get the length of {}", value.length_kind()),
        )
    })
}

/// The value as a signed integer.
pub fn to_int<T: NumericLike + ?Sized>(value: &T) -> Result<i64, IntrospectError> {
    value
        .as_i64()
        .ok_or_else(|| not_convertible(value.numeric_kind(), "int64"))
}

/// The value as an unsigned integer.
pub fn to_uint<T: NumericLike + ?Sized>(value: &T) -> Result<u64, IntrospectError> {
    value
        .as_u64()
        .ok_or_else(|| not_convertible(value.numeric_kind(), "uint64"))
}

/// The value as a float.
pub fn to_float<T: NumericLike + ?Sized>(value: &T) -> Result<f64, IntrospectError> {
    value
        .as_f64()
        .ok_or_else(|| not_convertible(value.numeric_kind(), "float64"))
}

fn not_convertible(from: &str, to: &str) -> IntrospectError {
    IntrospectError::new(
        IntrospectErrorKind::NotConvertible,
        format!("cannot convert {} to {}", from, to),
    )
}

/// Whether a value is empty.
///
/// Zero numbers, `false`, empty strings, byte sequences, lists and maps, nil,
/// and references to any of those are empty. Objects decide for themselves.
pub fn is_empty(value: &Value) -> bool {
    match indirect(value) {
        None => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Int(i)) => *i == 0,
        Some(Value::Uint(u)) => *u == 0,
        Some(Value::Float(f)) => *f == 0.0,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Bytes(b)) => b.is_empty(),
        Some(Value::List(items)) => items.is_empty(),
        Some(Value::Map(m)) => m.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(Value::Nil) | Some(Value::Ref(_)) => true,
    }
}

/// Follow reference layers to the first concrete value.
///
/// Returns `None` as soon as any layer is nil.
pub fn indirect(value: &Value) -> Option<&Value> {
    let mut current = value;
    loop {
        match current {
            Value::Nil | Value::Ref(None) => return None,
            Value::Ref(Some(inner)) => current = inner,
            other => return Some(other),
        }
    }
}

fn into_indirect(value: Value) -> Option<Value> {
    let mut current = value;
    loop {
        match current {
            Value::Nil | Value::Ref(None) => return None,
            Value::Ref(Some(inner)) => current = *inner,
            other => return Some(other),
        }
    }
}

/// Like [`indirect`], but a concrete value the materializer recognises is
/// replaced by its alternate representation, which is indirected again.
pub fn indirect_with<'a>(value: &'a Value, materializer: &Materializer) -> Option<Cow<'a, Value>> {
    let concrete = indirect(value)?;
    let mut alternate = match materializer.apply(concrete) {
        None => return Some(Cow::Borrowed(concrete)),
        Some(v) => into_indirect(v)?,
    };
    for _ in 1..MAX_MATERIALIZE_DEPTH {
        match materializer.apply(&alternate) {
            None => break,
            Some(next) => alternate = into_indirect(next)?,
        }
    }
    Some(Cow::Owned(alternate))
}

type MaterializeFn = dyn Fn(&Value) -> Option<Value> + Send + Sync;

/// Hook that maps a concrete value onto an alternate representation.
///
/// Passed to [`Validator::with_materializer`](crate::Validator::with_materializer)
/// rather than installed globally, so two validations in the same process can
/// use different hooks.
#[derive(Clone)]
pub struct Materializer(Arc<MaterializeFn>);

impl Materializer {
    /// Wrap a mapping function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        Materializer(Arc::new(f))
    }

    /// Materializer that asks objects for [`Validatable::materialize`](crate::Validatable::materialize).
    pub fn objects() -> Self {
        Materializer::new(|value| match value {
            Value::Object(o) => o.materialize(),
            _ => None,
        })
    }

    /// Apply the hook to one value.
    pub fn apply(&self, value: &Value) -> Option<Value> {
        (self.0)(value)
    }
}

impl fmt::Debug for Materializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Materializer").finish_non_exhaustive()
    }
}

/// The stock materializer: objects are replaced by what they materialize to.
pub fn default_materializer() -> Materializer {
    Materializer::objects()
}
