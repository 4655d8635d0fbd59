// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Deserialization engine with polymorphic resolution.
//!
//! Decoding always starts at the topmost ancestor of the requested type and
//! walks down the hierarchy:
//!
//! ```text
//! root ──(tag of root, if any, skipped)
//!  │ read root fields
//!  ├─ non-trivial children: read ONE tag, match it against children in order
//!  │    match       -> descend
//!  │    one child   -> descend (tag, if any, is consumed)
//!  │    else        -> NoMatchingVariant
//!  └─ no children -> stop, current type is the resolved type
//! ```
//!
//! The resolved type must be compatible with the requested target; the
//! decoded fields are then materialized per [`DeserializeOptions`].

use crate::binary::BinaryReader;
use crate::error::{ErrorKind, Result};
use crate::registry::{Registry, TypeId};
use crate::types::{PrimitiveKind, TypeDescriptor};
use crate::value::{Record, Value};
use crate::variant::VariantTag;
use std::cell::Cell;
use std::collections::HashMap;

/// Nesting budget applied when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Counts nested struct, option and sequence levels of one encode or decode
/// call.
pub(crate) struct DepthBudget {
    depth: Cell<usize>,
    limit: usize,
}

impl DepthBudget {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            depth: Cell::new(0),
            limit,
        }
    }

    /// Run `f` one level deeper, failing once the limit is reached.
    pub(crate) fn nested<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let depth = self.depth.get();
        if depth >= self.limit {
            return Err(ErrorKind::DepthLimitExceeded { limit: self.limit }.into());
        }
        self.depth.set(depth + 1);
        let result = f();
        self.depth.set(depth);
        result
    }
}

/// What a decoded struct turns into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Materialize {
    /// A [`Record`] of the resolved type with exactly the decoded fields.
    #[default]
    Record,
    /// Start from the resolved type's registered constructor (nearest one in
    /// the chain), then overlay the decoded fields.
    Construct,
    /// An untyped [`Value::Map`] of the decoded fields.
    PlainMap,
}

/// Deserialization options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeserializeOptions {
    /// Accept unconsumed trailing bytes.
    pub unchecked: bool,
    pub materialize: Materialize,
    /// Deepest nesting of structs, options and sequences accepted.
    pub max_depth: usize,
}

impl Default for DeserializeOptions {
    fn default() -> Self {
        Self {
            unchecked: false,
            materialize: Materialize::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DeserializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn unchecked(mut self, unchecked: bool) -> Self {
        self.unchecked = unchecked;
        self
    }

    #[must_use]
    pub fn materialize(mut self, materialize: Materialize) -> Self {
        self.materialize = materialize;
        self
    }

    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Registry {
    /// Decode `bytes` as `target` (or a subtype of it) with default options.
    pub fn deserialize(&self, bytes: &[u8], target: TypeId) -> Result<Value> {
        self.deserialize_with(bytes, target, &DeserializeOptions::default())
    }

    pub fn deserialize_with(
        &self,
        bytes: &[u8],
        target: TypeId,
        options: &DeserializeOptions,
    ) -> Result<Value> {
        let mut reader = BinaryReader::new(bytes);
        let value = self.deserialize_from(&mut reader, target, options)?;
        if !options.unchecked && !reader.is_exhausted() {
            return Err(ErrorKind::TrailingBytes(reader.remaining()).into());
        }
        Ok(value)
    }

    /// Decode a record, failing if the options produce a plain map.
    pub fn deserialize_record(&self, bytes: &[u8], target: TypeId) -> Result<Record> {
        match self.deserialize(bytes, target)? {
            Value::Record(record) => Ok(record),
            other => Err(ErrorKind::TypeMismatch {
                expected: "record".to_string(),
                found: other.type_name().to_string(),
            }
            .into()),
        }
    }

    /// Decode from an existing reader without the trailing-bytes check.
    pub fn deserialize_from(
        &self,
        reader: &mut BinaryReader<'_>,
        target: TypeId,
        options: &DeserializeOptions,
    ) -> Result<Value> {
        Deserializer::new(self, options).read_struct(target, reader)
    }

    /// Decode a single value against an explicit descriptor.
    pub fn deserialize_value(
        &self,
        reader: &mut BinaryReader<'_>,
        descriptor: &TypeDescriptor,
        options: &DeserializeOptions,
    ) -> Result<Value> {
        Deserializer::new(self, options).read_value(descriptor, reader)
    }
}

struct Deserializer<'r> {
    registry: &'r Registry,
    options: &'r DeserializeOptions,
    budget: DepthBudget,
}

impl<'r> Deserializer<'r> {
    fn new(registry: &'r Registry, options: &'r DeserializeOptions) -> Self {
        Self {
            registry,
            options,
            budget: DepthBudget::new(options.max_depth),
        }
    }

    fn read_struct(&self, target: TypeId, r: &mut BinaryReader<'_>) -> Result<Value> {
        let registry = self.registry;
        if let Some(codec) = registry.codec_of(target) {
            return codec.decode(r);
        }

        let root = registry.entry(registry.root_of(target))?;
        if let Some(tag) = root.variant() {
            // The topmost tag selects nothing; it is skipped, not matched.
            VariantTag::read(tag.kind(), r)?;
        }

        let mut fields = HashMap::new();
        let mut current = root.id();
        let mut visited_any = false;
        loop {
            let entry = registry.entry(current)?;
            if entry.is_trivial() && registry.non_trivial_children_of(current).is_empty() {
                break;
            }
            visited_any = true;

            for field in entry.fields() {
                let value = self
                    .read_value(&field.ty, r)
                    .map_err(|e| e.in_field(&field.key))?;
                fields.insert(field.key.clone(), value);
            }

            match self.select_child(current, r)? {
                Some(next) => {
                    log::trace!(
                        "[de] {} -> {}",
                        entry.path(),
                        registry.type_name(next)
                    );
                    current = next;
                }
                None => break,
            }
        }

        if !visited_any {
            return Err(ErrorKind::UnknownType(registry.type_name(target).to_string()).into());
        }
        if !registry.is_compatible(current, target) {
            return Err(ErrorKind::IncompatibleResolvedType {
                target: registry.type_name(target).to_string(),
                resolved: registry.type_name(current).to_string(),
            }
            .into());
        }

        Ok(self.materialize(current, fields))
    }

    /// Pick the child to descend into, consuming at most one tag.
    fn select_child(&self, parent: TypeId, r: &mut BinaryReader<'_>) -> Result<Option<TypeId>> {
        let registry = self.registry;
        let candidates = registry.non_trivial_children_of(parent);
        if candidates.is_empty() {
            return Ok(None);
        }

        let first_tagged = candidates
            .iter()
            .find_map(|c| registry.lookup(*c).and_then(|e| e.variant()));

        match first_tagged {
            Some(tag) => {
                let read = VariantTag::read(tag.kind(), r)?;
                let matched = candidates.iter().copied().find(|c| {
                    registry
                        .lookup(*c)
                        .and_then(|e| e.variant())
                        .is_some_and(|t| *t == read)
                });
                match matched {
                    Some(child) => Ok(Some(child)),
                    // A lone child is the only path; its tag is consumed
                    // without selecting anything.
                    None if candidates.len() == 1 => Ok(Some(candidates[0])),
                    None => Err(self.no_match(parent, candidates)),
                }
            }
            None if candidates.len() == 1 => Ok(Some(candidates[0])),
            None => Err(self.no_match(parent, candidates)),
        }
    }

    fn no_match(&self, parent: TypeId, candidates: &[TypeId]) -> crate::error::Error {
        let registry = self.registry;
        let names: Vec<String> = candidates
            .iter()
            .map(|c| match registry.lookup(*c).and_then(|e| e.variant()) {
                Some(tag) => format!("{} = {}", registry.type_name(*c), tag),
                None => registry.type_name(*c).to_string(),
            })
            .collect();
        ErrorKind::NoMatchingVariant {
            parent: registry.type_name(parent).to_string(),
            candidates: names.join(", "),
        }
        .into()
    }

    fn materialize(&self, resolved: TypeId, fields: HashMap<String, Value>) -> Value {
        match self.options.materialize {
            Materialize::Record => Value::Record(Record::from_fields(resolved, fields)),
            Materialize::PlainMap => Value::Map(fields),
            Materialize::Construct => {
                let mut base = self
                    .registry
                    .constructor_of(resolved)
                    .map(|ctor| ctor())
                    .unwrap_or_default();
                base.extend(fields);
                Value::Record(Record::from_fields(resolved, base))
            }
        }
    }

    fn read_value(&self, desc: &TypeDescriptor, r: &mut BinaryReader<'_>) -> Result<Value> {
        match desc {
            TypeDescriptor::Option(_)
            | TypeDescriptor::Vector(_)
            | TypeDescriptor::FixedArray(..)
            | TypeDescriptor::Struct(_) => self.budget.nested(|| self.read_nested(desc, r)),
            _ => self.read_nested(desc, r),
        }
    }

    fn read_nested(&self, desc: &TypeDescriptor, r: &mut BinaryReader<'_>) -> Result<Value> {
        match desc {
            TypeDescriptor::Primitive(kind) => read_primitive(*kind, r),
            TypeDescriptor::ByteBuffer => Ok(Value::Bytes(r.byte_buffer()?)),
            TypeDescriptor::Custom(codec) => codec.decode(r),
            TypeDescriptor::Option(inner) => match r.u8()? {
                0 => Ok(Value::Null),
                1 => self.read_value(inner, r),
                other => Err(ErrorKind::TypeMismatch {
                    expected: "option tag 0 or 1".to_string(),
                    found: other.to_string(),
                }
                .into()),
            },
            TypeDescriptor::Vector(inner) => {
                let count = r.length()?;
                self.read_items(inner, count, r)
            }
            TypeDescriptor::FixedArray(inner, length) => {
                self.read_items(inner, *length as usize, r)
            }
            TypeDescriptor::Struct(ty) => self.read_struct(*ty, r),
        }
    }

    fn read_items(&self, inner: &TypeDescriptor, count: usize, r: &mut BinaryReader<'_>) -> Result<Value> {
        // A corrupt count must not drive the allocation.
        let min_size = match inner {
            TypeDescriptor::Primitive(kind) => kind.size().unwrap_or(4),
            _ => 1,
        };
        let mut items = Vec::with_capacity(count.min(r.remaining() / min_size));
        for i in 0..count {
            items.push(self.read_value(inner, r).map_err(|e| e.at_index(i))?);
        }
        Ok(Value::Sequence(items))
    }
}

fn read_primitive(kind: PrimitiveKind, r: &mut BinaryReader<'_>) -> Result<Value> {
    Ok(match kind {
        PrimitiveKind::Bool => Value::Bool(r.bool()?),
        PrimitiveKind::String => Value::String(r.string()?),
        PrimitiveKind::U8 => Value::U8(r.u8()?),
        PrimitiveKind::U16 => Value::U16(r.u16()?),
        PrimitiveKind::U32 => Value::U32(r.u32()?),
        PrimitiveKind::U64 => Value::U64(r.u64()?),
        PrimitiveKind::U128 => Value::U128(r.u128()?),
        PrimitiveKind::U256 => Value::U256(r.u256()?),
        PrimitiveKind::U512 => Value::U512(r.u512()?),
    })
}
