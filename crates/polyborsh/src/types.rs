// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors: how a field's value maps to bytes.

use crate::binary::{BinaryReader, BinaryWriter};
use crate::error::Result;
use crate::registry::TypeId;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    String,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    U512,
}

impl PrimitiveKind {
    /// Encoded size in bytes (None for strings).
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::U8 => Some(1),
            Self::U16 => Some(2),
            Self::U32 => Some(4),
            Self::U64 => Some(8),
            Self::U128 => Some(16),
            Self::U256 => Some(32),
            Self::U512 => Some(64),
            Self::String => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::U256 => "u256",
            Self::U512 => "u512",
        }
    }

    /// Parse a primitive name as written in schema documents.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Self::Bool,
            "string" => Self::String,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "u128" => Self::U128,
            "u256" => Self::U256,
            "u512" => Self::U512,
            _ => return None,
        })
    }
}

/// Encode hook of a [`CustomCodec`].
pub type EncodeFn = dyn Fn(&Value, &mut BinaryWriter) -> Result<()> + Send + Sync;
/// Decode hook of a [`CustomCodec`].
pub type DecodeFn = dyn Fn(&mut BinaryReader<'_>) -> Result<Value> + Send + Sync;

/// Externally defined wire format for one field or one whole type.
///
/// The engines call the hooks verbatim; no discriminator or field logic runs
/// around them. Two codecs are equal only if they share the same hooks.
#[derive(Clone)]
pub struct CustomCodec {
    name: Arc<str>,
    encode: Arc<EncodeFn>,
    decode: Arc<DecodeFn>,
}

impl CustomCodec {
    pub fn new<E, D>(name: impl Into<Arc<str>>, encode: E, decode: D) -> Self
    where
        E: Fn(&Value, &mut BinaryWriter) -> Result<()> + Send + Sync + 'static,
        D: Fn(&mut BinaryReader<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            encode: Arc::new(encode),
            decode: Arc::new(decode),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn encode(&self, value: &Value, writer: &mut BinaryWriter) -> Result<()> {
        (self.encode)(value, writer)
    }

    pub fn decode(&self, reader: &mut BinaryReader<'_>) -> Result<Value> {
        (self.decode)(reader)
    }
}

impl PartialEq for CustomCodec {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.encode, &other.encode) && Arc::ptr_eq(&self.decode, &other.decode)
    }
}

impl fmt::Debug for CustomCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomCodec").field(&self.name).finish()
    }
}

/// How a value is laid out on the wire. Immutable once registered.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    /// One tag byte (0 absent, 1 present), then the element if present.
    Option(Box<TypeDescriptor>),
    /// u32 element count, then the elements.
    Vector(Box<TypeDescriptor>),
    /// Exactly `length` elements, no count prefix.
    FixedArray(Box<TypeDescriptor>, u32),
    /// Length-prefixed raw bytes.
    ByteBuffer,
    /// Nested registered type.
    Struct(TypeId),
    Custom(CustomCodec),
}

impl TypeDescriptor {
    pub fn bool() -> Self {
        Self::Primitive(PrimitiveKind::Bool)
    }

    pub fn string() -> Self {
        Self::Primitive(PrimitiveKind::String)
    }

    pub fn u8() -> Self {
        Self::Primitive(PrimitiveKind::U8)
    }

    pub fn u16() -> Self {
        Self::Primitive(PrimitiveKind::U16)
    }

    pub fn u32() -> Self {
        Self::Primitive(PrimitiveKind::U32)
    }

    pub fn u64() -> Self {
        Self::Primitive(PrimitiveKind::U64)
    }

    pub fn u128() -> Self {
        Self::Primitive(PrimitiveKind::U128)
    }

    pub fn u256() -> Self {
        Self::Primitive(PrimitiveKind::U256)
    }

    pub fn u512() -> Self {
        Self::Primitive(PrimitiveKind::U512)
    }

    pub fn bytes() -> Self {
        Self::ByteBuffer
    }

    pub fn option(inner: impl Into<TypeDescriptor>) -> Self {
        Self::Option(Box::new(inner.into()))
    }

    pub fn vec(inner: impl Into<TypeDescriptor>) -> Self {
        Self::Vector(Box::new(inner.into()))
    }

    pub fn array(inner: impl Into<TypeDescriptor>, length: u32) -> Self {
        Self::FixedArray(Box::new(inner.into()), length)
    }

    pub fn structure(ty: TypeId) -> Self {
        Self::Struct(ty)
    }

    /// Struct types referenced anywhere inside this descriptor.
    pub fn referenced_types(&self) -> Vec<TypeId> {
        let mut out = Vec::new();
        self.collect_types(&mut out);
        out
    }

    fn collect_types(&self, out: &mut Vec<TypeId>) {
        match self {
            Self::Struct(ty) => out.push(*ty),
            Self::Option(inner) | Self::Vector(inner) | Self::FixedArray(inner, _) => {
                inner.collect_types(out)
            }
            Self::Primitive(_) | Self::ByteBuffer | Self::Custom(_) => {}
        }
    }
}

impl From<PrimitiveKind> for TypeDescriptor {
    fn from(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }
}

impl From<TypeId> for TypeDescriptor {
    fn from(ty: TypeId) -> Self {
        Self::Struct(ty)
    }
}

impl From<CustomCodec> for TypeDescriptor {
    fn from(codec: CustomCodec) -> Self {
        Self::Custom(codec)
    }
}

/// One declared field of a registered type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub key: String,
    pub ty: TypeDescriptor,
    /// Explicit slot, if the field was declared with one.
    pub index: Option<u32>,
}

impl FieldDescriptor {
    pub fn new(key: impl Into<String>, ty: impl Into<TypeDescriptor>) -> Self {
        Self {
            key: key.into(),
            ty: ty.into(),
            index: None,
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }
}
