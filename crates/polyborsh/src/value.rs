// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime values.

use crate::error::{ErrorKind, Result};
use crate::registry::TypeId;
use num_bigint::BigUint;
use std::collections::HashMap;

/// A value that can be encoded against a [`crate::TypeDescriptor`].
///
/// An option field holds either [`Value::Null`] (absent) or its element
/// directly (present). Vectors and fixed arrays both decode to
/// [`Value::Sequence`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,

    // Primitives
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    U256(BigUint),
    U512(BigUint),
    String(String),

    // Composites
    Bytes(Vec<u8>),
    Sequence(Vec<Value>),
    Record(Record),
    /// Untyped field map, produced by plain-map decoding.
    Map(HashMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the value's shape, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::U128(_) => "u128",
            Self::U256(_) => "u256",
            Self::U512(_) => "u512",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Sequence(_) => "sequence",
            Self::Record(_) => "record",
            Self::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Field lookup on records and plain maps.
    pub fn get_field(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Record(r) => r.field(key),
            Self::Map(m) => m.get(key),
            _ => None,
        }
    }
}

/// An instance of a registered type: its runtime type plus field values.
///
/// A missing key and an explicit [`Value::Null`] are the same field state:
/// both encode as an absent option, and equality does not tell them apart.
#[derive(Debug, Clone)]
pub struct Record {
    ty: TypeId,
    fields: HashMap<String, Value>,
}

impl Record {
    pub fn new(ty: TypeId) -> Self {
        Self {
            ty,
            fields: HashMap::new(),
        }
    }

    pub fn from_fields(ty: TypeId, fields: HashMap<String, Value>) -> Self {
        Self { ty, fields }
    }

    /// Runtime type of this record.
    pub fn type_id(&self) -> TypeId {
        self.ty
    }

    /// Builder-style field assignment.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl IntoValue) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl IntoValue) {
        self.fields.insert(key.into(), value.into_value());
    }

    /// Raw field access. A missing key reads as absent.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Typed field access.
    pub fn get<T: FromValue>(&self, key: &str) -> Result<T> {
        let value = self.fields.get(key).unwrap_or(&Value::Null);
        T::from_value(value).map_err(|e| e.in_field(key))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_fields(self) -> HashMap<String, Value> {
        self.fields
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        let same = |a: &Record, b: &Record| {
            a.fields
                .iter()
                .all(|(k, v)| b.fields.get(k).unwrap_or(&Value::Null) == v)
        };
        self.ty == other.ty && same(self, other) && same(other, self)
    }
}

/// Conversion out of a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

/// Conversion into a [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

fn mismatch(expected: &str, found: &Value) -> crate::error::Error {
    ErrorKind::TypeMismatch {
        expected: expected.to_string(),
        found: found.type_name().to_string(),
    }
    .into()
}

macro_rules! impl_value_conversions {
    ($ty:ty, $variant:ident, $name:expr) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v.clone()),
                    other => Err(mismatch($name, other)),
                }
            }
        }

        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_value_conversions!(bool, Bool, "bool");
impl_value_conversions!(u8, U8, "u8");
impl_value_conversions!(u16, U16, "u16");
impl_value_conversions!(u32, U32, "u32");
impl_value_conversions!(u64, U64, "u64");
impl_value_conversions!(u128, U128, "u128");
impl_value_conversions!(String, String, "string");
impl_value_conversions!(Record, Record, "record");

/// Accepts either wide integer width.
impl FromValue for BigUint {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::U256(v) | Value::U512(v) => Ok(v.clone()),
            Value::U128(v) => Ok(BigUint::from(*v)),
            other => Err(mismatch("u256 or u512", other)),
        }
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| T::from_value(item).map_err(|e| e.at_index(i)))
                .collect(),
            other => Err(mismatch("sequence", other)),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::Sequence(self.into_iter().map(IntoValue::into_value).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_record_access() {
        let rec = Record::new(TypeId::from_index(0))
            .with("id", 42u32)
            .with("name", "probe")
            .with("tags", vec![1u8, 2, 3])
            .with("parent", None::<u32>);

        assert_eq!(rec.get::<u32>("id").unwrap(), 42);
        assert_eq!(rec.get::<String>("name").unwrap(), "probe");
        assert_eq!(rec.get::<Vec<u8>>("tags").unwrap(), vec![1, 2, 3]);
        assert_eq!(rec.get::<Option<u32>>("parent").unwrap(), None);
        assert_eq!(rec.get::<Option<u32>>("not-set").unwrap(), None);
    }

    #[test]
    fn mismatch_names_the_field() {
        let rec = Record::new(TypeId::from_index(0)).with("id", 42u32);
        let err = rec.get::<u64>("id").unwrap_err();
        assert_eq!(err.to_string(), "id: type mismatch: expected u64, found u32");
    }

    #[test]
    fn sequence_mismatch_names_the_index() {
        let v = Value::Sequence(vec![Value::U8(1), Value::Bool(true)]);
        let err = Vec::<u8>::from_value(&v).unwrap_err();
        assert_eq!(err.path_string(), "[1]");
    }

    #[test]
    fn big_uint_from_any_wide_width() {
        let n = BigUint::from(7u32);
        assert_eq!(BigUint::from_value(&Value::U256(n.clone())).unwrap(), n);
        assert_eq!(BigUint::from_value(&Value::U512(n.clone())).unwrap(), n);
        assert!(BigUint::from_value(&Value::U8(7)).is_err());
    }

    #[test]
    fn field_access_on_maps() {
        let mut map = HashMap::new();
        map.insert("x".to_string(), Value::U32(5));
        let v = Value::Map(map);
        assert_eq!(v.get_field("x"), Some(&Value::U32(5)));
        assert!(v.get_field("y").is_none());
        assert_eq!(Value::U32(1).get_field("x"), None);
    }

    #[test]
    fn absent_and_null_fields_compare_equal() {
        let ty = TypeId::from_index(0);
        let sparse = Record::new(ty).with("id", 1u32);
        let explicit = Record::new(ty).with("id", 1u32).with("note", Value::Null);
        assert_eq!(sparse, explicit);
        assert_eq!(explicit, sparse);
        assert_ne!(sparse, explicit.clone().with("note", "set"));
        assert_ne!(sparse, Record::new(TypeId::from_index(1)).with("id", 1u32));
    }
}
