// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Frozen registry and hierarchy queries.

use super::builder::Constructor;
use super::TypeId;
use crate::error::{Error, ErrorKind, Result};
use crate::types::{CustomCodec, FieldDescriptor, TypeDescriptor};
use crate::variant::VariantTag;
use std::collections::HashMap;
use std::fmt;

/// Everything known about one registered type.
pub struct RegistryEntry {
    pub(crate) id: TypeId,
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) parent: Option<TypeId>,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) variant: Option<VariantTag>,
    pub(crate) constructor: Option<Constructor>,
    pub(crate) codec: Option<CustomCodec>,
    /// Direct children, in registration order.
    pub(crate) children: Vec<TypeId>,
    /// Ancestors, topmost first, excluding the type itself.
    pub(crate) ancestors: Vec<TypeId>,
    /// Children with trivial bridges flattened away.
    pub(crate) non_trivial_children: Vec<TypeId>,
}

impl RegistryEntry {
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Short name as declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full identity path (`Base::A`).
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parent(&self) -> Option<TypeId> {
        self.parent
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn variant(&self) -> Option<&VariantTag> {
        self.variant.as_ref()
    }

    pub fn children(&self) -> &[TypeId] {
        &self.children
    }

    pub fn custom_codec(&self) -> Option<&CustomCodec> {
        self.codec.as_ref()
    }

    /// A type with neither fields nor a variant tag is a pure bridge.
    pub fn is_trivial(&self) -> bool {
        self.fields.is_empty() && self.variant.is_none()
    }

    /// Whether the type contributes anything to the wire.
    pub fn has_schema(&self) -> bool {
        !self.is_trivial()
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("parent", &self.parent)
            .field("fields", &self.fields)
            .field("variant", &self.variant)
            .field("children", &self.children)
            .field("constructor", &self.constructor.is_some())
            .field("codec", &self.codec)
            .finish()
    }
}

/// Immutable registry produced by [`crate::RegistryBuilder::build`].
///
/// Safe to share across threads; all engines take `&Registry`.
#[derive(Debug)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
    by_path: HashMap<String, TypeId>,
}

impl Registry {
    pub(crate) fn new(entries: Vec<RegistryEntry>, by_path: HashMap<String, TypeId>) -> Self {
        Self { entries, by_path }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter()
    }

    pub fn lookup(&self, ty: TypeId) -> Option<&RegistryEntry> {
        self.entries.get(ty.index())
    }

    /// Like [`Registry::lookup`], failing with `UnknownTypeName`.
    pub fn entry(&self, ty: TypeId) -> Result<&RegistryEntry> {
        self.lookup(ty)
            .ok_or_else(|| Error::new(ErrorKind::UnknownTypeName(format!("{ty:?}"))))
    }

    pub fn lookup_path(&self, path: &str) -> Option<TypeId> {
        self.by_path.get(path).copied()
    }

    /// Resolve a full path, failing with `UnknownTypeName`.
    pub fn resolve(&self, path: &str) -> Result<TypeId> {
        self.lookup_path(path)
            .ok_or_else(|| Error::new(ErrorKind::UnknownTypeName(path.to_string())))
    }

    /// Full path of a type, or `?` for a foreign handle.
    pub fn type_name(&self, ty: TypeId) -> &str {
        self.lookup(ty).map_or("?", |e| e.path.as_str())
    }

    pub fn children_of(&self, ty: TypeId) -> Vec<&RegistryEntry> {
        self.lookup(ty)
            .map(|e| e.children.iter().map(|c| &self.entries[c.index()]).collect())
            .unwrap_or_default()
    }

    /// Children after flattening trivial bridges, recursively.
    pub fn non_trivial_children_of(&self, ty: TypeId) -> &[TypeId] {
        self.lookup(ty)
            .map_or(&[][..], |e| e.non_trivial_children.as_slice())
    }

    /// The type and all its ancestors, topmost first.
    pub fn ancestor_chain_of(&self, ty: TypeId) -> Vec<&RegistryEntry> {
        let Some(entry) = self.lookup(ty) else {
            return Vec::new();
        };
        entry
            .ancestors
            .iter()
            .map(|a| &self.entries[a.index()])
            .chain(std::iter::once(entry))
            .collect()
    }

    /// Entries of the ancestor chain that contribute to the wire.
    pub fn schema_chain(&self, ty: TypeId) -> Vec<&RegistryEntry> {
        self.ancestor_chain_of(ty)
            .into_iter()
            .filter(|e| e.has_schema())
            .collect()
    }

    /// Topmost declared ancestor (the type itself if it has no parent).
    pub fn root_of(&self, ty: TypeId) -> TypeId {
        self.lookup(ty)
            .and_then(|e| e.ancestors.first().copied())
            .unwrap_or(ty)
    }

    /// The type and every descendant, depth-first in registration order.
    pub fn descendants_of(&self, ty: TypeId) -> Vec<TypeId> {
        let mut out = Vec::new();
        let mut stack = vec![ty];
        while let Some(id) = stack.pop() {
            let Some(entry) = self.lookup(id) else {
                continue;
            };
            out.push(id);
            stack.extend(entry.children.iter().rev());
        }
        out
    }

    /// True if `ancestor` is a strict ancestor of `ty`.
    pub fn is_ancestor(&self, ancestor: TypeId, ty: TypeId) -> bool {
        self.lookup(ty)
            .is_some_and(|e| e.ancestors.contains(&ancestor))
    }

    /// Types are compatible when equal or related by inheritance in either
    /// direction.
    pub fn is_compatible(&self, a: TypeId, b: TypeId) -> bool {
        a == b || self.is_ancestor(a, b) || self.is_ancestor(b, a)
    }

    /// Nearest whole-type codec: the type's own, else the closest ancestor's.
    pub(crate) fn codec_of(&self, ty: TypeId) -> Option<&CustomCodec> {
        self.ancestor_chain_of(ty)
            .into_iter()
            .rev()
            .find_map(|e| e.codec.as_ref())
    }

    pub(crate) fn constructor_of(&self, ty: TypeId) -> Option<&Constructor> {
        self.ancestor_chain_of(ty)
            .into_iter()
            .rev()
            .find_map(|e| e.constructor.as_ref())
    }

    /// Human-readable rendering of a descriptor, for error messages.
    pub fn describe(&self, descriptor: &TypeDescriptor) -> String {
        match descriptor {
            TypeDescriptor::Primitive(kind) => kind.name().to_string(),
            TypeDescriptor::Option(inner) => format!("option<{}>", self.describe(inner)),
            TypeDescriptor::Vector(inner) => format!("vec<{}>", self.describe(inner)),
            TypeDescriptor::FixedArray(inner, len) => {
                format!("[{}; {}]", self.describe(inner), len)
            }
            TypeDescriptor::ByteBuffer => "bytes".to_string(),
            TypeDescriptor::Struct(ty) => self.type_name(*ty).to_string(),
            TypeDescriptor::Custom(codec) => format!("custom<{}>", codec.name()),
        }
    }
}
