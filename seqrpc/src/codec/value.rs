//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! The value universe carried by call arguments and return values.

use super::error::{DecodeError, EncodeError};
use super::remote::RemoteError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::hash_map::{DefaultHasher, RandomState};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};

/// The string value returned by operations that produce no result.
pub const VOID: &str = "void";

/// A single value that can cross the wire.
///
/// Every argument of a call and every result of a return is a `Value`. The
/// enum is closed: anything that is not one of these kinds has to be mapped
/// onto one before it can be sent, either by hand or through
/// [`Value::from_serialize`].
///
/// Equality is by value. Arrays, lists and maps compare element-wise and
/// sets compare without regard to order. Floats compare by bit pattern, so a
/// NaN equals itself and `0.0` differs from `-0.0`, matching what survives a
/// trip through the wire.
///
/// # Examples
///
/// ```rust
/// use seqrpc::codec::Value;
///
/// let args = vec![Value::from(42), Value::from("hello"), Value::Null];
/// assert_eq!(args[0].as_i32(), Some(42));
/// assert_eq!(args[1].as_str(), Some("hello"));
/// assert!(args[2].is_null());
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A single byte.
    Byte(u8),
    /// A character from the basic multilingual plane.
    Char(char),
    /// A 16-bit signed integer.
    Short(i16),
    /// A 32-bit signed integer.
    Int(i32),
    /// A 32-bit float.
    Float(f32),
    /// A 64-bit float.
    Double(f64),
    /// A 64-bit signed integer.
    Long(i64),
    /// A UTF-8 string.
    String(String),
    /// A raw byte array.
    Bytes(Vec<u8>),
    /// A fixed sequence of values, possibly of mixed kinds.
    Array(Vec<Value>),
    /// An ordered list.
    List(Vec<Value>),
    /// An unordered collection of distinct values.
    Set(ValueSet),
    /// A string-keyed map.
    Map(BTreeMap<String, Value>),
    /// A structured object (JSON-like tree).
    Object(serde_json::Map<String, serde_json::Value>),
    /// A JSON array.
    JsonArray(Vec<serde_json::Value>),
    /// A failure raised on the remote side.
    RemoteError(RemoteError),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Array(a), Value::Array(b)) | (Value::List(a), Value::List(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::JsonArray(a), Value::JsonArray(b)) => a == b,
            (Value::RemoteError(a), Value::RemoteError(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Byte(b) => b.hash(state),
            Value::Char(c) => c.hash(state),
            Value::Short(s) => s.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Double(d) => d.to_bits().hash(state),
            Value::Long(l) => l.hash(state),
            Value::String(s) => s.hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::Array(items) | Value::List(items) => items.hash(state),
            Value::Set(set) => set.hash(state),
            Value::Map(map) => map.hash(state),
            // JSON trees hash by size only; equality settles the rest.
            Value::Object(map) => map.len().hash(state),
            Value::JsonArray(items) => items.len().hash(state),
            Value::RemoteError(err) => err.hash(state),
        }
    }
}

impl Value {
    /// The sentinel carried back for operations with no result.
    #[must_use]
    pub fn void() -> Self {
        Value::String(VOID.to_string())
    }

    /// Returns `true` if this is the void sentinel.
    pub fn is_void(&self) -> bool {
        matches!(self, Value::String(s) if s == VOID)
    }

    /// Returns `true` if this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// A short name for the kind of this value, used in logs and errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Byte(_) => "byte",
            Value::Char(_) => "char",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Long(_) => "long",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
            Value::JsonArray(_) => "json array",
            Value::RemoteError(_) => "remote error",
        }
    }

    /// Returns the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an `i32` if it is an integer kind that fits.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Byte(b) => Some(i32::from(*b)),
            Value::Short(s) => Some(i32::from(*s)),
            Value::Int(i) => Some(*i),
            Value::Long(l) => i32::try_from(*l).ok(),
            _ => None,
        }
    }

    /// Returns the value as an `i64` if it is any integer kind.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(b) => Some(i64::from(*b)),
            Value::Short(s) => Some(i64::from(*s)),
            Value::Int(i) => Some(i64::from(*i)),
            Value::Long(l) => Some(*l),
            _ => None,
        }
    }

    /// Returns the value as an `f64` if it is a floating point kind.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(f64::from(*f)),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the string slice, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the raw bytes, if this is a byte array.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the elements of an array or list.
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) | Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the map, if this is one.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the remote error, if this value wraps one.
    pub fn as_remote_error(&self) -> Option<&RemoteError> {
        match self {
            Value::RemoteError(err) => Some(err),
            _ => None,
        }
    }

    /// Lifts any serializable Rust value into the value universe.
    ///
    /// Structs and maps become [`Value::Object`], sequences become
    /// [`Value::JsonArray`] and scalars become the matching primitive.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] if the value cannot be represented, for example
    /// a map with non-string keys or an integer outside the `i64` range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqrpc::codec::Value;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct Point { x: i32, y: i32 }
    ///
    /// let value = Value::from_serialize(&Point { x: 1, y: 2 }).unwrap();
    /// assert!(matches!(value, Value::Object(_)));
    /// ```
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, EncodeError> {
        let json = serde_json::to_value(value)?;
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Long(i)
                } else if n.is_u64() {
                    return Err(EncodeError::unsupported(
                        "integer",
                        format!("{n} does not fit a signed 64-bit integer"),
                    ));
                } else {
                    Value::Double(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::JsonArray(items),
            serde_json::Value::Object(map) => Value::Object(map),
        })
    }

    /// Converts the value into a JSON tree, if it has a JSON rendering.
    ///
    /// Characters become one-character strings and byte arrays become arrays
    /// of numbers. Non-finite floats, sets and remote errors have no rendering.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        use serde_json::Value as Json;
        Some(match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Byte(b) => Json::from(*b),
            Value::Char(c) => Json::String(c.to_string()),
            Value::Short(s) => Json::from(*s),
            Value::Int(i) => Json::from(*i),
            Value::Long(l) => Json::from(*l),
            Value::Float(f) => Json::Number(serde_json::Number::from_f64(f64::from(*f))?),
            Value::Double(d) => Json::Number(serde_json::Number::from_f64(*d)?),
            Value::String(s) => Json::String(s.clone()),
            Value::Bytes(b) => Json::Array(b.iter().map(|byte| Json::from(*byte)).collect()),
            Value::Array(items) | Value::List(items) => {
                Json::Array(items.iter().map(Value::to_json).collect::<Option<_>>()?)
            }
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| v.to_json().map(|v| (k.clone(), v)))
                    .collect::<Option<_>>()?,
            ),
            Value::Object(map) => Json::Object(map.clone()),
            Value::JsonArray(items) => Json::Array(items.clone()),
            Value::Set(_) | Value::RemoteError(_) => return None,
        })
    }

    /// Deserializes the value into a Rust type through its JSON rendering.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the value has no JSON rendering or does not
    /// match the shape of `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqrpc::codec::Value;
    ///
    /// let value = Value::List(vec![Value::from(1), Value::from(2)]);
    /// let numbers: Vec<i32> = value.deserialize().unwrap();
    /// assert_eq!(numbers, vec![1, 2]);
    /// ```
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        let json = self
            .to_json()
            .ok_or_else(|| DecodeError::invalid(self.kind_name(), "has no JSON rendering"))?;
        Ok(serde_json::from_value(json)?)
    }
}

/// An unordered collection of distinct [`Value`]s.
///
/// Members are kept in insertion order next to a hash index, so `insert` and
/// `contains` do not scan the whole set. Two sets are equal when they hold the
/// same members in any order.
///
/// # Examples
///
/// ```rust
/// use seqrpc::codec::{Value, ValueSet};
///
/// let a: ValueSet = vec![Value::from(1), Value::from(2)].into_iter().collect();
/// let b: ValueSet = vec![Value::from(2), Value::from(1), Value::from(1)].into_iter().collect();
/// assert_eq!(a, b);
/// assert_eq!(b.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct ValueSet {
    items: Vec<Value>,
    index: HashMap<u64, Vec<usize>>,
    hasher: RandomState,
}

impl ValueSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set with room for `capacity` members.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            hasher: RandomState::new(),
        }
    }

    /// Adds a value, returning `false` if an equal value was already present.
    pub fn insert(&mut self, value: Value) -> bool {
        let key = self.hasher.hash_one(&value);
        let slot = self.index.entry(key).or_default();
        if slot.iter().any(|&i| self.items[i] == value) {
            return false;
        }
        slot.push(self.items.len());
        self.items.push(value);
        true
    }

    /// Returns `true` if an equal value is a member.
    pub fn contains(&self, value: &Value) -> bool {
        self.position(value).is_some()
    }

    /// Removes an equal value, returning whether it was present.
    pub fn remove(&mut self, value: &Value) -> bool {
        match self.position(value) {
            Some(index) => {
                self.items.remove(index);
                self.reindex();
                true
            }
            None => false,
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the members in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    fn position(&self, value: &Value) -> Option<usize> {
        let slot = self.index.get(&self.hasher.hash_one(value))?;
        slot.iter().copied().find(|&i| &self.items[i] == value)
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, item) in self.items.iter().enumerate() {
            self.index.entry(self.hasher.hash_one(item)).or_default().push(i);
        }
    }
}

impl fmt::Debug for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(&self.items).finish()
    }
}

impl PartialEq for ValueSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|item| other.contains(item))
    }
}

impl Eq for ValueSet {}

impl Hash for ValueSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-independent: members combine by wrapping sum.
        let sum = self.items.iter().fold(0u64, |sum, item| {
            let mut hasher = DefaultHasher::new();
            item.hash(&mut hasher);
            sum.wrapping_add(hasher.finish())
        });
        self.items.len().hash(state);
        sum.hash(state);
    }
}

impl FromIterator<Value> for ValueSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = ValueSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Value> for ValueSet {
    fn extend<I: IntoIterator<Item = Value>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl IntoIterator for ValueSet {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValueSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    u8 => Byte,
    char => Char,
    i16 => Short,
    i32 => Int,
    f32 => Float,
    f64 => Double,
    i64 => Long,
    String => String,
    Vec<u8> => Bytes,
    Vec<Value> => List,
    ValueSet => Set,
    BTreeMap<String, Value> => Map,
    serde_json::Map<String, serde_json::Value> => Object,
    RemoteError => RemoteError,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_sentinel() {
        assert!(Value::void().is_void());
        assert!(Value::from("void").is_void());
        assert!(!Value::from("avoid").is_void());
        assert!(!Value::Null.is_void());
    }

    #[test]
    fn test_integer_widening() {
        assert_eq!(Value::Byte(7).as_i64(), Some(7));
        assert_eq!(Value::Short(-3).as_i32(), Some(-3));
        assert_eq!(Value::Long(i64::MAX).as_i32(), None);
        assert_eq!(Value::from("1").as_i32(), None);
    }

    #[test]
    fn test_set_ignores_order_and_duplicates() {
        let mut set = ValueSet::new();
        assert!(set.insert(Value::from("a")));
        assert!(set.insert(Value::from(1)));
        assert!(!set.insert(Value::from("a")));
        assert_eq!(set.len(), 2);

        let other: ValueSet = vec![Value::from(1), Value::from("a")].into_iter().collect();
        assert_eq!(set, other);

        assert!(set.remove(&Value::from(1)));
        assert_ne!(set, other);
    }

    #[test]
    fn test_set_remove_keeps_index_consistent() {
        let mut set: ValueSet = (0..10).map(Value::Int).collect();
        assert!(set.remove(&Value::Int(3)));
        assert!(!set.contains(&Value::Int(3)));
        assert!(set.contains(&Value::Int(9)));
        assert!(!set.insert(Value::Int(9)));
        assert!(set.insert(Value::Int(3)));
        assert_eq!(set.len(), 10);
    }

    #[test]
    fn test_nested_sets_match_in_any_order() {
        let inner_a: ValueSet = vec![Value::Int(1), Value::Int(2)].into_iter().collect();
        let inner_b: ValueSet = vec![Value::Int(2), Value::Int(1)].into_iter().collect();
        let mut outer = ValueSet::new();
        assert!(outer.insert(Value::Set(inner_a)));
        assert!(!outer.insert(Value::Set(inner_b)));
    }

    #[test]
    fn test_nan_equals_itself() {
        assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
        assert_eq!(Value::Float(f32::NAN), Value::Float(f32::NAN));
        assert_ne!(Value::Double(0.0), Value::Double(-0.0));

        let mut set = ValueSet::new();
        assert!(set.insert(Value::Double(f64::NAN)));
        assert!(!set.insert(Value::Double(f64::NAN)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_from_serialize_struct() {
        #[derive(Serialize)]
        struct Account {
            id: u32,
            name: &'static str,
        }

        let value = Value::from_serialize(&Account { id: 9, name: "ops" }).unwrap();
        match value {
            Value::Object(map) => {
                assert_eq!(map["id"], serde_json::json!(9));
                assert_eq!(map["name"], serde_json::json!("ops"));
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn test_from_serialize_rejects_non_string_keys() {
        let mut map = std::collections::HashMap::new();
        map.insert((1, 2), "pair");
        assert!(Value::from_serialize(&map).is_err());
    }

    #[test]
    fn test_from_serialize_rejects_huge_unsigned() {
        let err = Value::from_serialize(&u64::MAX).unwrap_err();
        assert!(matches!(err, EncodeError::Unsupported { .. }));
    }

    #[test]
    fn test_deserialize_map() {
        let mut map = BTreeMap::new();
        map.insert("x".to_string(), Value::Int(3));
        map.insert("y".to_string(), Value::Int(4));

        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Point {
            x: i32,
            y: i32,
        }

        let point: Point = Value::Map(map).deserialize().unwrap();
        assert_eq!(point, Point { x: 3, y: 4 });
    }

    #[test]
    fn test_deserialize_without_json_rendering() {
        let value = Value::RemoteError(RemoteError::new("E", "m"));
        assert!(value.deserialize::<String>().is_err());
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(5)), Value::Int(5));
    }
}
