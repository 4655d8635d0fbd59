// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serialization engine.
//!
//! A record is written as its ancestor chain, topmost first. Each entry that
//! contributes to the wire emits its variant tag (if any) followed by its own
//! fields in declaration order. Field values are written per their declared
//! descriptor, never per the runtime shape of the value.

use crate::binary::BinaryWriter;
use crate::de::{DepthBudget, DEFAULT_MAX_DEPTH};
use crate::error::{ErrorKind, Result};
use crate::registry::Registry;
use crate::types::{PrimitiveKind, TypeDescriptor};
use crate::value::{Record, Value};

impl Registry {
    /// Encode a record according to its registered chain.
    pub fn serialize(&self, record: &Record) -> Result<Vec<u8>> {
        let mut writer = BinaryWriter::new();
        self.serialize_into(record, &mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Encode into an existing writer, e.g. from inside a custom codec.
    pub fn serialize_into(&self, record: &Record, writer: &mut BinaryWriter) -> Result<()> {
        Serializer::new(self).write_record(record, writer)
    }

    /// Encode a single value against an explicit descriptor.
    pub fn serialize_value(
        &self,
        value: &Value,
        descriptor: &TypeDescriptor,
        writer: &mut BinaryWriter,
    ) -> Result<()> {
        Serializer::new(self).write_value(value, descriptor, writer)
    }
}

struct Serializer<'r> {
    registry: &'r Registry,
    budget: DepthBudget,
}

impl<'r> Serializer<'r> {
    fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            budget: DepthBudget::new(DEFAULT_MAX_DEPTH),
        }
    }

    fn write_record(&self, record: &Record, w: &mut BinaryWriter) -> Result<()> {
        let ty = record.type_id();
        if let Some(codec) = self.registry.codec_of(ty) {
            return codec.encode(&Value::Record(record.clone()), w);
        }

        let chain = self.registry.schema_chain(ty);
        if chain.is_empty() {
            return Err(ErrorKind::UnknownType(self.registry.type_name(ty).to_string()).into());
        }

        for entry in chain {
            if let Some(tag) = entry.variant() {
                tag.write(w)?;
            }
            for field in entry.fields() {
                let value = record.field(&field.key).unwrap_or(&Value::Null);
                self.write_value(value, &field.ty, w)
                    .map_err(|e| e.in_field(&field.key))?;
            }
        }
        Ok(())
    }

    fn write_value(&self, value: &Value, desc: &TypeDescriptor, w: &mut BinaryWriter) -> Result<()> {
        // Custom codecs see absent values too.
        if let TypeDescriptor::Custom(codec) = desc {
            return codec.encode(value, w);
        }

        match desc {
            TypeDescriptor::Option(_)
            | TypeDescriptor::Vector(_)
            | TypeDescriptor::FixedArray(..)
            | TypeDescriptor::Struct(_) => self.budget.nested(|| self.write_descriptor(value, desc, w)),
            _ => self.write_descriptor(value, desc, w),
        }
    }

    fn write_descriptor(&self, value: &Value, desc: &TypeDescriptor, w: &mut BinaryWriter) -> Result<()> {
        if value.is_null() {
            return match desc {
                TypeDescriptor::Option(_) => {
                    w.u8(0);
                    Ok(())
                }
                _ => Err(ErrorKind::MissingRequiredValue {
                    declared: self.registry.describe(desc),
                }
                .into()),
            };
        }

        match desc {
            TypeDescriptor::Primitive(kind) => write_primitive(value, *kind, w),
            TypeDescriptor::Option(inner) => {
                w.u8(1);
                self.write_value(value, inner, w)
            }
            TypeDescriptor::Vector(inner) => {
                let items = sequence(value)?;
                w.length(items.len())?;
                self.write_items(items, inner, w)
            }
            TypeDescriptor::FixedArray(inner, length) => {
                let items = sequence(value)?;
                if items.len() != *length as usize {
                    return Err(ErrorKind::ArrayLengthMismatch {
                        expected: *length,
                        actual: items.len(),
                    }
                    .into());
                }
                self.write_items(items, inner, w)
            }
            TypeDescriptor::Struct(declared) => match value {
                Value::Record(record) => {
                    if !self.registry.is_compatible(record.type_id(), *declared) {
                        return Err(ErrorKind::IncompatibleType {
                            expected: self.registry.type_name(*declared).to_string(),
                            found: self.registry.type_name(record.type_id()).to_string(),
                        }
                        .into());
                    }
                    self.write_record(record, w)
                }
                other => Err(mismatch(self.registry.type_name(*declared), other)),
            },
            TypeDescriptor::ByteBuffer => match value {
                Value::Bytes(bytes) => w.byte_buffer(bytes),
                other => Err(mismatch("bytes", other)),
            },
            TypeDescriptor::Custom(codec) => codec.encode(value, w),
        }
    }

    fn write_items(&self, items: &[Value], inner: &TypeDescriptor, w: &mut BinaryWriter) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            self.write_value(item, inner, w).map_err(|e| e.at_index(i))?;
        }
        Ok(())
    }
}

fn write_primitive(value: &Value, kind: PrimitiveKind, w: &mut BinaryWriter) -> Result<()> {
    match (kind, value) {
        (PrimitiveKind::Bool, Value::Bool(v)) => w.bool(*v),
        (PrimitiveKind::String, Value::String(v)) => w.string(v)?,
        (PrimitiveKind::U8, Value::U8(v)) => w.u8(*v),
        (PrimitiveKind::U16, Value::U16(v)) => w.u16(*v),
        (PrimitiveKind::U32, Value::U32(v)) => w.u32(*v),
        (PrimitiveKind::U64, Value::U64(v)) => w.u64(*v),
        (PrimitiveKind::U128, Value::U128(v)) => w.u128(*v),
        (PrimitiveKind::U256, Value::U256(v) | Value::U512(v)) => w.u256(v)?,
        (PrimitiveKind::U512, Value::U256(v) | Value::U512(v)) => w.u512(v)?,
        (kind, other) => return Err(mismatch(kind.name(), other)),
    }
    Ok(())
}

fn sequence(value: &Value) -> Result<&[Value]> {
    value.as_sequence().ok_or_else(|| mismatch("sequence", value))
}

fn mismatch(expected: &str, found: &Value) -> crate::error::Error {
    ErrorKind::TypeMismatch {
        expected: expected.to_string(),
        found: found.type_name().to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RegistryBuilder, TypeId};
    use num_bigint::BigUint;

    fn single(desc: TypeDescriptor) -> (Registry, TypeId) {
        let mut b = RegistryBuilder::new();
        let t = b.declare("T", None).unwrap();
        b.field(t, "v", desc, None).unwrap();
        (b.build().unwrap(), t)
    }

    #[test]
    fn option_encoding() {
        let (reg, t) = single(TypeDescriptor::option(TypeDescriptor::u32()));
        assert_eq!(reg.serialize(&Record::new(t)).unwrap(), vec![0]);
        assert_eq!(
            reg.serialize(&Record::new(t).with("v", 7u32)).unwrap(),
            vec![1, 7, 0, 0, 0]
        );
    }

    #[test]
    fn missing_required_value_names_declared_type() {
        let (reg, t) = single(TypeDescriptor::vec(TypeDescriptor::u16()));
        let err = reg.serialize(&Record::new(t)).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::MissingRequiredValue {
                declared: "vec<u16>".into()
            }
        );
        assert_eq!(err.path_string(), "v");
    }

    #[test]
    fn vector_has_count_prefix_array_does_not() {
        let (reg, t) = single(TypeDescriptor::vec(TypeDescriptor::u8()));
        let rec = Record::new(t).with("v", vec![1u8, 2]);
        assert_eq!(reg.serialize(&rec).unwrap(), vec![2, 0, 0, 0, 1, 2]);

        let (reg, t) = single(TypeDescriptor::array(TypeDescriptor::u8(), 2));
        let rec = Record::new(t).with("v", vec![1u8, 2]);
        assert_eq!(reg.serialize(&rec).unwrap(), vec![1, 2]);
    }

    #[test]
    fn array_length_checked() {
        let (reg, t) = single(TypeDescriptor::array(TypeDescriptor::u8(), 3));
        let err = reg
            .serialize(&Record::new(t).with("v", vec![1u8, 2]))
            .unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::ArrayLengthMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn primitive_mismatch_carries_element_index() {
        let (reg, t) = single(TypeDescriptor::vec(TypeDescriptor::u8()));
        let rec = Record::new(t).with("v", Value::Sequence(vec![Value::U8(1), Value::U32(2)]));
        let err = reg.serialize(&rec).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::TypeMismatch { .. }));
        assert_eq!(err.path_string(), "v[1]");
    }

    #[test]
    fn wide_integers_are_zero_padded() {
        let (reg, t) = single(TypeDescriptor::u256());
        let rec = Record::new(t).with("v", Value::U256(BigUint::from(0x0102u32)));
        let bytes = reg.serialize(&rec).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[..3], &[2, 1, 0]);
    }

    #[test]
    fn unregistered_record_rejected() {
        let mut b = RegistryBuilder::new();
        let t = b.declare("Empty", None).unwrap();
        let reg = b.build().unwrap();
        let err = reg.serialize(&Record::new(t)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnknownType("Empty".into()));
    }

    #[test]
    fn unrelated_struct_rejected() {
        let mut b = RegistryBuilder::new();
        let inner = b.declare("Inner", None).unwrap();
        b.field(inner, "x", TypeDescriptor::u8(), None).unwrap();
        let other = b.declare("Other", None).unwrap();
        b.field(other, "x", TypeDescriptor::u8(), None).unwrap();
        let outer = b.declare("Outer", None).unwrap();
        b.field(outer, "inner", inner, None).unwrap();
        let reg = b.build().unwrap();

        let rec = Record::new(outer).with("inner", Record::new(other).with("x", 1u8));
        let err = reg.serialize(&rec).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::IncompatibleType { .. }));
        assert_eq!(err.path_string(), "inner");
    }

    #[test]
    fn deep_values_hit_depth_limit() {
        let mut b = RegistryBuilder::new();
        let node = b.declare("Node", None).unwrap();
        b.field(node, "value", TypeDescriptor::u8(), None).unwrap();
        b.field(node, "next", TypeDescriptor::option(node), None).unwrap();
        let reg = b.build().unwrap();

        let chain = |len: usize| {
            let mut rec = Record::new(node).with("value", 0u8);
            for _ in 0..len {
                rec = Record::new(node).with("value", 1u8).with("next", rec);
            }
            rec
        };

        let shallow = chain(10);
        let bytes = reg.serialize(&shallow).unwrap();
        assert_eq!(bytes.len(), 22);
        assert_eq!(reg.deserialize_record(&bytes, node).unwrap(), shallow);

        let err = reg.serialize(&chain(500)).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::DepthLimitExceeded {
                limit: DEFAULT_MAX_DEPTH
            }
        );
        assert!(err.path_string().starts_with("next.next"));
    }
}
