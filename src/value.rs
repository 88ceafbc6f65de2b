//! Dynamically typed values under validation
//!
//! Rules never see a concrete Rust type. Callers map their data onto
//! [`Value`] through the `From` adapters in this module (or build it by hand),
//! and the [`introspect`](crate::introspect) functions give rules a uniform
//! view of it.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use weir::{Key, Value};
//!
//! let mut fields = HashMap::new();
//! fields.insert("Name", Value::from("name"));
//! fields.insert("Age", Value::from(42));
//! fields.insert("Nick", Value::from(None::<String>));
//!
//! let value = Value::from(fields);
//! let map = value.as_map().unwrap();
//! assert_eq!(map.get(&Key::from("Age")), Some(&Value::Int(42)));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Error;

/// An identity addressing one entry of a keyed container.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// Textual key.
    Str(String),
    /// Signed integer key.
    Int(i64),
    /// Unsigned integer key.
    Uint(u64),
    /// Boolean key.
    Bool(bool),
}

/// The family a [`Key`] belongs to.
///
/// A map only accepts lookups by keys of its own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// [`Key::Str`]
    Str,
    /// [`Key::Int`]
    Int,
    /// [`Key::Uint`]
    Uint,
    /// [`Key::Bool`]
    Bool,
}

impl Key {
    /// The family of this key.
    pub fn kind(&self) -> KeyKind {
        match self {
            Key::Str(_) => KeyKind::Str,
            Key::Int(_) => KeyKind::Int,
            Key::Uint(_) => KeyKind::Uint,
            Key::Bool(_) => KeyKind::Bool,
        }
    }

    /// The key as a value, for rules that validate keys themselves.
    pub fn to_value(&self) -> Value {
        match self {
            Key::Str(s) => Value::String(s.clone()),
            Key::Int(i) => Value::Int(*i),
            Key::Uint(u) => Value::Uint(*u),
            Key::Bool(b) => Value::Bool(*b),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => f.write_str(s),
            Key::Int(i) => write!(f, "{}", i),
            Key::Uint(u) => write!(f, "{}", u),
            Key::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

macro_rules! impl_key_from {
    ($variant:ident, $target:ty; $($t:ty),+) => {
        $(
            impl From<$t> for Key {
                fn from(n: $t) -> Self {
                    Key::$variant(n as $target)
                }
            }
        )+
    };
}

impl_key_from!(Int, i64; i8, i16, i32, i64, isize);
impl_key_from!(Uint, u64; u8, u16, u32, u64, usize);

/// A keyed container.
///
/// Entries iterate in key order, which is also the order unexpected keys are
/// reported in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap {
    entries: BTreeMap<Key, Value>,
}

impl ValueMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Look up an entry.
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Whether the key is present.
    pub fn contains_key(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter()
    }

    /// Iterate keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    /// The kind every key shares, or `None` when the map is empty or mixes
    /// key kinds.
    pub fn key_kind(&self) -> Option<KeyKind> {
        let mut kinds = self.entries.keys().map(Key::kind);
        let first = kinds.next()?;
        kinds.all(|kind| kind == first).then_some(first)
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ValueMap {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A user type that carries its own validation logic.
///
/// After a value's rule chain completes without a skip, the engine calls
/// `validate` (or `validate_with_context`) on any object it finds behind the
/// value. An object may also expose an alternate representation through
/// [`materialize`](Validatable::materialize), which a
/// [`Materializer`](crate::introspect::Materializer) can substitute for it.
pub trait Validatable: fmt::Debug + Send + Sync {
    /// Validate the object.
    fn validate(&self) -> Result<(), Error>;

    /// Validate the object with an execution context.
    fn validate_with_context(&self, ctx: &Context) -> Result<(), Error> {
        let _ = ctx;
        self.validate()
    }

    /// An alternate representation of the object, e.g. the primitive a
    /// database column adapter stores.
    fn materialize(&self) -> Option<Value> {
        None
    }

    /// Whether the object counts as empty for `required`.
    fn is_empty(&self) -> bool {
        false
    }
}

/// A value under validation.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent value.
    Nil,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Floating point number.
    Float(f64),
    /// Text.
    String(String),
    /// Byte sequence.
    Bytes(Vec<u8>),
    /// Ordered sequence.
    List(Vec<Value>),
    /// Keyed container.
    Map(ValueMap),
    /// Pointer or optional wrapper; `None` is a nil reference.
    Ref(Option<Box<Value>>),
    /// A user object.
    Object(Arc<dyn Validatable>),
}

impl Value {
    /// Wrap a value in a non-nil reference.
    pub fn some(value: impl Into<Value>) -> Self {
        Value::Ref(Some(Box::new(value.into())))
    }

    /// A nil reference.
    pub fn none() -> Self {
        Value::Ref(None)
    }

    /// Wrap a user object.
    pub fn object<T: Validatable + 'static>(object: T) -> Self {
        Value::Object(Arc::new(object))
    }

    /// A short name for the value's shape, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "slice",
            Value::Map(_) => "map",
            Value::Ref(_) => "ptr",
            Value::Object(_) => "object",
        }
    }

    /// The container, if this value is one (without indirection).
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// The text, if this value is a string (without indirection).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

// Objects compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Uint(a), Value::Uint(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Ref(a), Value::Ref(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Key> for Value {
    fn from(k: Key) -> Self {
        k.to_value()
    }
}

impl From<ValueMap> for Value {
    fn from(m: ValueMap) -> Self {
        Value::Map(m)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

macro_rules! impl_value_from {
    ($variant:ident, $target:ty; $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::$variant(n as $target)
                }
            }
        )+
    };
}

impl_value_from!(Int, i64; i8, i16, i32, i64, isize);
impl_value_from!(Uint, u64; u8, u16, u32, u64, usize);
impl_value_from!(Float, f64; f32, f64);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        Value::Ref(opt.map(|v| Box::new(v.into())))
    }
}

impl<T: Into<Value>> From<Box<T>> for Value {
    fn from(b: Box<T>) -> Self {
        Value::Ref(Some(Box::new((*b).into())))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<Key>, V: Into<Value>> From<HashMap<K, V>> for Value {
    fn from(m: HashMap<K, V>) -> Self {
        Value::Map(m.into_iter().collect())
    }
}

impl<K: Into<Key>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(m: BTreeMap<K, V>) -> Self {
        Value::Map(m.into_iter().collect())
    }
}

impl<K: Into<Key>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Value {
    fn from(entries: [(K, V); N]) -> Self {
        Value::Map(entries.into_iter().collect())
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::ser::{SerializeMap, SerializeSeq};
    use serde::{Serialize, Serializer};

    use super::{Key, Value};

    impl Serialize for Key {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Value::Nil | Value::Ref(None) => serializer.serialize_none(),
                Value::Bool(b) => serializer.serialize_bool(*b),
                Value::Int(i) => serializer.serialize_i64(*i),
                Value::Uint(u) => serializer.serialize_u64(*u),
                Value::Float(f) => serializer.serialize_f64(*f),
                Value::String(s) => serializer.serialize_str(s),
                Value::Bytes(b) => serializer.serialize_bytes(b),
                Value::List(items) => {
                    let mut seq = serializer.serialize_seq(Some(items.len()))?;
                    for item in items {
                        seq.serialize_element(item)?;
                    }
                    seq.end()
                }
                Value::Map(m) => {
                    let mut map = serializer.serialize_map(Some(m.len()))?;
                    for (k, v) in m.iter() {
                        map.serialize_entry(k, v)?;
                    }
                    map.end()
                }
                Value::Ref(Some(inner)) => inner.serialize(serializer),
                Value::Object(o) => match o.materialize() {
                    Some(v) => v.serialize(serializer),
                    None => serializer.serialize_str(&format!("{:?}", o)),
                },
            }
        }
    }

    impl From<serde_json::Value> for Value {
        fn from(json: serde_json::Value) -> Self {
            match json {
                serde_json::Value::Null => Value::Nil,
                serde_json::Value::Bool(b) => Value::Bool(b),
                serde_json::Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        Value::Int(i)
                    } else if let Some(u) = n.as_u64() {
                        Value::Uint(u)
                    } else {
                        Value::Float(n.as_f64().unwrap_or(f64::NAN))
                    }
                }
                serde_json::Value::String(s) => Value::String(s),
                serde_json::Value::Array(items) => {
                    Value::List(items.into_iter().map(Value::from).collect())
                }
                serde_json::Value::Object(fields) => Value::Map(
                    fields
                        .into_iter()
                        .map(|(k, v)| (Key::Str(k), Value::from(v)))
                        .collect(),
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        assert_eq!(Key::from("A").to_string(), "A");
        assert_eq!(Key::from(11).to_string(), "11");
        assert_eq!(Key::from(7u8).to_string(), "7");
        assert_eq!(Key::from(true).to_string(), "true");
    }

    #[test]
    fn test_key_kinds() {
        assert_eq!(Key::from(11).kind(), KeyKind::Int);
        assert_eq!(Key::from(11u32).kind(), KeyKind::Uint);
        assert_eq!(Key::from("11").kind(), KeyKind::Str);
    }

    #[test]
    fn test_map_key_kind() {
        let m: ValueMap = [(11, "abc"), (22, "xyz")].into_iter().collect();
        assert_eq!(m.key_kind(), Some(KeyKind::Int));
        assert_eq!(ValueMap::new().key_kind(), None);

        let mut mixed = ValueMap::new();
        mixed.insert("a", 1);
        mixed.insert(11, "abc");
        assert_eq!(mixed.key_kind(), None);
    }

    #[test]
    fn test_option_maps_to_ref() {
        assert_eq!(Value::from(None::<i32>), Value::Ref(None));
        assert_eq!(Value::from(Some("x")), Value::some("x"));
    }

    #[test]
    fn test_map_iterates_in_key_order() {
        let v = Value::from([("b", 1), ("a", 2), ("c", 3)]);
        let keys: Vec<String> = v
            .as_map()
            .unwrap()
            .keys()
            .map(ToString::to_string)
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_objects_compare_by_identity() {
        #[derive(Debug)]
        struct Thing;
        impl Validatable for Thing {
            fn validate(&self) -> Result<(), Error> {
                Ok(())
            }
        }

        let a = Value::object(Thing);
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Value::object(Thing));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json() {
        let json = serde_json::json!({"Name": "name", "Tags": ["a", "b"], "Age": 3, "Gone": null});
        let value = Value::from(json);
        let map = value.as_map().unwrap();
        assert_eq!(map.get(&Key::from("Age")), Some(&Value::Int(3)));
        assert_eq!(map.get(&Key::from("Gone")), Some(&Value::Nil));
        assert_eq!(
            map.get(&Key::from("Tags")),
            Some(&Value::from(vec!["a", "b"]))
        );
    }
}
