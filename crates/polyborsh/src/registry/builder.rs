// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Build phase of the registry.

use super::registry::{Registry, RegistryEntry};
use super::{TypeId, PATH_SEPARATOR};
use crate::error::{Error, ErrorKind, Result};
use crate::types::{CustomCodec, FieldDescriptor, TypeDescriptor};
use crate::value::Value;
use crate::variant::VariantTag;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Produces the initial field values of a constructed instance.
pub type Constructor = Arc<dyn Fn() -> HashMap<String, Value> + Send + Sync>;

#[derive(Clone)]
struct TypeNode {
    name: String,
    path: String,
    parent: Option<TypeId>,
    /// Fields keyed by slot. Gaps are only reported at build time.
    slots: BTreeMap<u32, FieldDescriptor>,
    variant: Option<VariantTag>,
    constructor: Option<Constructor>,
    codec: Option<CustomCodec>,
    children: Vec<TypeId>,
}

/// Collects type declarations before they are frozen into a [`Registry`].
///
/// # Example
///
/// ```
/// use polyborsh::{RegistryBuilder, TypeDescriptor};
///
/// let mut builder = RegistryBuilder::new();
/// let base = builder.declare("Base", None).unwrap();
/// let a = builder.register("A", Some(base), Some(0u8.into())).unwrap();
/// builder.field(a, "x", TypeDescriptor::u32(), None).unwrap();
///
/// let registry = builder.build().unwrap();
/// assert_eq!(registry.children_of(base).len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct RegistryBuilder {
    nodes: Vec<TypeNode>,
    by_path: HashMap<String, TypeId>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of declared types.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Declare a type under an optional parent.
    ///
    /// Idempotent: declaring the same name under the same parent returns the
    /// existing handle. Names must be non-empty and must not contain
    /// [`PATH_SEPARATOR`].
    pub fn declare(&mut self, name: &str, parent: Option<TypeId>) -> Result<TypeId> {
        if name.is_empty() || name.contains(PATH_SEPARATOR) {
            return Err(ErrorKind::InvalidTypeName(name.to_string()).into());
        }
        let path = match parent {
            Some(p) => format!("{}{}{}", self.node(p)?.path, PATH_SEPARATOR, name),
            None => name.to_string(),
        };
        if let Some(existing) = self.by_path.get(&path) {
            return Ok(*existing);
        }

        let id = TypeId::from_index(self.nodes.len() as u32);
        self.nodes.push(TypeNode {
            name: name.to_string(),
            path: path.clone(),
            parent,
            slots: BTreeMap::new(),
            variant: None,
            constructor: None,
            codec: None,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            self.nodes[p.index()].children.push(id);
        }
        self.by_path.insert(path, id);
        Ok(id)
    }

    /// Declare a type and optionally attach its variant tag in one call.
    pub fn register(
        &mut self,
        name: &str,
        parent: Option<TypeId>,
        variant: Option<VariantTag>,
    ) -> Result<TypeId> {
        let id = self.declare(name, parent)?;
        if let Some(tag) = variant {
            self.variant(id, tag)?;
        }
        Ok(id)
    }

    /// Attach a variant tag. Siblings must not share a tag value.
    pub fn variant(&mut self, ty: TypeId, tag: impl Into<VariantTag>) -> Result<()> {
        let tag = tag.into();
        let node = self.node(ty)?;
        match &node.variant {
            Some(existing) if *existing == tag => return Ok(()),
            Some(existing) => {
                return Err(ErrorKind::ConflictingVariants {
                    first: node.path.clone(),
                    second: node.path.clone(),
                    tag: format!("{existing} vs {tag}"),
                }
                .into());
            }
            None => {}
        }

        if let Some(parent) = node.parent {
            for sibling in &self.nodes[parent.index()].children {
                let sibling = &self.nodes[sibling.index()];
                if sibling.variant.as_ref() == Some(&tag) {
                    return Err(ErrorKind::ConflictingVariants {
                        first: sibling.path.clone(),
                        second: node.path.clone(),
                        tag: tag.to_string(),
                    }
                    .into());
                }
            }
        }

        self.node_mut(ty)?.variant = Some(tag);
        Ok(())
    }

    /// Append a field, or place it at an explicit slot.
    pub fn field(
        &mut self,
        ty: TypeId,
        key: &str,
        descriptor: impl Into<TypeDescriptor>,
        index: Option<u32>,
    ) -> Result<()> {
        let node = self.node_mut(ty)?;
        let field = FieldDescriptor::new(key, descriptor);
        let (slot, field) = match index {
            Some(i) => (i, field.with_index(i)),
            // Appends go after the highest slot taken so far.
            None => match node.slots.last_key_value() {
                None => (0, field),
                Some((last, _)) => {
                    let next = last
                        .checked_add(1)
                        .ok_or(ErrorKind::LengthOverflow(u32::MAX as usize))?;
                    (next, field)
                }
            },
        };
        if node.slots.contains_key(&slot) {
            return Err(ErrorKind::DuplicateFieldIndex {
                type_name: node.path.clone(),
                index: slot as usize,
            }
            .into());
        }
        node.slots.insert(slot, field);
        Ok(())
    }

    /// Register the constructor used by [`crate::Materialize::Construct`].
    pub fn constructor<F>(&mut self, ty: TypeId, constructor: F) -> Result<()>
    where
        F: Fn() -> HashMap<String, Value> + Send + Sync + 'static,
    {
        self.node_mut(ty)?.constructor = Some(Arc::new(constructor));
        Ok(())
    }

    /// Replace the whole wire format of a type (and its descendants).
    pub fn custom_codec(&mut self, ty: TypeId, codec: CustomCodec) -> Result<()> {
        self.node_mut(ty)?.codec = Some(codec);
        Ok(())
    }

    /// Handle of an already declared path.
    pub fn lookup_path(&self, path: &str) -> Option<TypeId> {
        self.by_path.get(path).copied()
    }

    /// Freeze into an immutable registry.
    ///
    /// Fails with [`ErrorKind::MissingFieldIndex`] if explicit indices left
    /// a gap in any field list.
    pub fn build(&self) -> Result<Registry> {
        let mut entries = Vec::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            let mut fields = Vec::with_capacity(node.slots.len());
            for (expected, (slot, field)) in node.slots.iter().enumerate() {
                if *slot as usize != expected {
                    return Err(ErrorKind::MissingFieldIndex {
                        type_name: node.path.clone(),
                        index: expected,
                    }
                    .into());
                }
                fields.push(field.clone());
            }

            entries.push(RegistryEntry {
                id: TypeId::from_index(i as u32),
                name: node.name.clone(),
                path: node.path.clone(),
                parent: node.parent,
                fields,
                variant: node.variant.clone(),
                constructor: node.constructor.clone(),
                codec: node.codec.clone(),
                children: node.children.clone(),
                ancestors: self.ancestors(node),
                non_trivial_children: Vec::new(),
            });
        }

        // Children are always declared after their parent, so a reverse
        // sweep sees every child's list before the parent needs it.
        for i in (0..entries.len()).rev() {
            let mut resolved = Vec::new();
            for child in &entries[i].children {
                let child = &entries[child.index()];
                if child.is_trivial() {
                    resolved.extend_from_slice(&child.non_trivial_children);
                } else {
                    resolved.push(child.id);
                }
            }
            entries[i].non_trivial_children = resolved;
        }

        log::debug!(
            "[Registry] frozen {} types ({} roots)",
            entries.len(),
            entries.iter().filter(|e| e.parent.is_none()).count()
        );
        Ok(Registry::new(entries, self.by_path.clone()))
    }

    fn ancestors(&self, node: &TypeNode) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut current = node.parent;
        while let Some(id) = current {
            chain.push(id);
            current = self.nodes[id.index()].parent;
        }
        chain.reverse();
        chain
    }

    fn node(&self, ty: TypeId) -> Result<&TypeNode> {
        self.nodes
            .get(ty.index())
            .ok_or_else(|| Error::new(ErrorKind::UnknownTypeName(format!("{ty:?}"))))
    }

    fn node_mut(&mut self, ty: TypeId) -> Result<&mut TypeNode> {
        self.nodes
            .get_mut(ty.index())
            .ok_or_else(|| Error::new(ErrorKind::UnknownTypeName(format!("{ty:?}"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveKind;

    #[test]
    fn declare_is_idempotent_per_path() {
        let mut b = RegistryBuilder::new();
        let base = b.declare("Base", None).unwrap();
        let a1 = b.declare("A", Some(base)).unwrap();
        let a2 = b.declare("A", Some(base)).unwrap();
        let other_a = b.declare("A", None).unwrap();

        assert_eq!(a1, a2);
        assert_ne!(a1, other_a);
        assert_eq!(b.lookup_path("Base::A"), Some(a1));
        assert_eq!(b.lookup_path("A"), Some(other_a));
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn sibling_tags_must_differ() {
        let mut b = RegistryBuilder::new();
        let base = b.declare("Base", None).unwrap();
        b.register("A", Some(base), Some(0u8.into())).unwrap();
        let err = b.register("B", Some(base), Some(0u8.into())).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ConflictingVariants { .. }));

        // same tag under a different parent is fine
        let other = b.declare("Other", None).unwrap();
        b.register("C", Some(other), Some(0u8.into())).unwrap();
    }

    #[test]
    fn retagging_with_same_value_is_a_no_op() {
        let mut b = RegistryBuilder::new();
        let a = b.declare("A", None).unwrap();
        b.variant(a, "a").unwrap();
        b.variant(a, "a").unwrap();
        assert!(b.variant(a, "b").is_err());
    }

    #[test]
    fn explicit_indices_order_fields() {
        let mut b = RegistryBuilder::new();
        let t = b.declare("T", None).unwrap();
        b.field(t, "second", PrimitiveKind::U8, Some(1)).unwrap();
        b.field(t, "first", PrimitiveKind::U8, Some(0)).unwrap();
        let registry = b.build().unwrap();

        let keys: Vec<_> = registry
            .entry(t)
            .unwrap()
            .fields
            .iter()
            .map(|f| f.key.as_str())
            .collect();
        assert_eq!(keys, ["first", "second"]);
    }

    #[test]
    fn duplicate_index_rejected() {
        let mut b = RegistryBuilder::new();
        let t = b.declare("T", None).unwrap();
        b.field(t, "a", PrimitiveKind::U8, Some(0)).unwrap();
        let err = b.field(t, "b", PrimitiveKind::U8, Some(0)).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::DuplicateFieldIndex {
                type_name: "T".into(),
                index: 0
            }
        );
    }

    #[test]
    fn gap_rejected_at_build() {
        let mut b = RegistryBuilder::new();
        let t = b.declare("T", None).unwrap();
        b.field(t, "a", PrimitiveKind::U8, Some(0)).unwrap();
        b.field(t, "c", PrimitiveKind::U8, Some(2)).unwrap();
        let err = b.build().err().unwrap();
        assert_eq!(
            err.kind(),
            &ErrorKind::MissingFieldIndex {
                type_name: "T".into(),
                index: 1
            }
        );
    }

    #[test]
    fn non_trivial_children_skip_bridges() {
        let mut b = RegistryBuilder::new();
        let root = b.declare("Root", None).unwrap();
        let bridge = b.declare("Bridge", Some(root)).unwrap();
        let leaf = b.register("Leaf", Some(bridge), Some(1u8.into())).unwrap();
        let direct = b.declare("Direct", Some(root)).unwrap();
        b.field(direct, "x", PrimitiveKind::U8, None).unwrap();

        let registry = b.build().unwrap();
        assert_eq!(registry.non_trivial_children_of(root), &[leaf, direct]);
        assert_eq!(registry.non_trivial_children_of(bridge), &[leaf]);
        assert!(registry.non_trivial_children_of(leaf).is_empty());
    }

    #[test]
    fn names_cannot_forge_paths() {
        let mut b = RegistryBuilder::new();
        let err = b.declare("A::B", None).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidTypeName("A::B".into()));
        assert!(b.declare("", None).is_err());
        assert!(b.is_empty());

        let a = b.declare("A", None).unwrap();
        let nested = b.declare("B", Some(a)).unwrap();
        assert!(b.declare("C::D", Some(a)).is_err());

        let registry = b.build().unwrap();
        assert_eq!(registry.resolve("A::B").unwrap(), nested);
        assert_eq!(registry.entry(nested).unwrap().parent(), Some(a));
        assert_eq!(registry.children_of(a).len(), 1);
    }

    #[test]
    fn huge_explicit_index_is_a_gap_not_an_allocation() {
        let mut b = RegistryBuilder::new();
        let t = b.declare("T", None).unwrap();
        b.field(t, "far", PrimitiveKind::U8, Some(u32::MAX)).unwrap();

        // nothing fits after the last possible slot
        let err = b.field(t, "after", PrimitiveKind::U8, None).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::LengthOverflow(_)));

        let err = b.build().err().unwrap();
        assert_eq!(
            err.kind(),
            &ErrorKind::MissingFieldIndex {
                type_name: "T".into(),
                index: 0
            }
        );
    }

    #[test]
    fn appends_follow_the_highest_slot() {
        let mut b = RegistryBuilder::new();
        let t = b.declare("T", None).unwrap();
        b.field(t, "b", PrimitiveKind::U8, Some(1)).unwrap();
        b.field(t, "c", PrimitiveKind::U8, None).unwrap();
        b.field(t, "a", PrimitiveKind::U8, Some(0)).unwrap();
        let registry = b.build().unwrap();

        let fields = registry.entry(t).unwrap().fields();
        let keys: Vec<_> = fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(fields[0].index, Some(0));
        assert_eq!(fields[2].index, None);
    }
}
