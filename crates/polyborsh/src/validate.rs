// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Static hierarchy checks.
//!
//! `validate` walks every family reachable from the given roots (the whole
//! tree under each topmost ancestor, plus every type referenced by a struct
//! field) and rejects hierarchies whose encodings could not be decoded back
//! unambiguously.

use crate::error::{Error, ErrorKind, Result};
use crate::registry::{Registry, TypeId};
use crate::variant::VariantTag;
use std::collections::HashSet;

/// Validation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Skip the check that struct field types are registered.
    pub allow_unknown_field_types: bool,
}

impl ValidateOptions {
    #[must_use]
    pub fn allow_unknown_field_types(mut self, allow: bool) -> Self {
        self.allow_unknown_field_types = allow;
        self
    }
}

impl Registry {
    /// Check that every family reachable from `roots` decodes unambiguously.
    pub fn validate(&self, roots: &[TypeId], options: &ValidateOptions) -> Result<()> {
        let mut validator = Validator {
            registry: self,
            options,
            families: HashSet::new(),
        };
        for root in roots {
            self.entry(*root)?;
            validator.family(*root)?;
        }
        Ok(())
    }

    /// Validate every registered family.
    pub fn validate_all(&self, options: &ValidateOptions) -> Result<()> {
        let roots: Vec<TypeId> = self
            .iter()
            .filter(|e| e.parent().is_none())
            .map(|e| e.id())
            .collect();
        self.validate(&roots, options)
    }
}

struct Validator<'r> {
    registry: &'r Registry,
    options: &'r ValidateOptions,
    families: HashSet<TypeId>,
}

impl Validator<'_> {
    fn family(&mut self, ty: TypeId) -> Result<()> {
        let root = self.registry.root_of(ty);
        if !self.families.insert(root) {
            return Ok(());
        }

        let members = self.registry.descendants_of(root);
        for &node in &members {
            self.siblings(node)?;
            self.chain(node)?;
        }
        for &node in &members {
            self.field_types(node)?;
        }
        log::debug!(
            "[validate] family {} ok ({} types)",
            self.registry.type_name(root),
            members.len()
        );
        Ok(())
    }

    /// Non-trivial children of one node must be distinguishable by tag.
    fn siblings(&self, node: TypeId) -> Result<()> {
        let registry = self.registry;
        let children = registry.non_trivial_children_of(node);

        let mut first: Option<(TypeId, &VariantTag)> = None;
        let mut untagged = false;
        for &child in children {
            let Some(tag) = registry.entry(child)?.variant() else {
                untagged = true;
                continue;
            };
            match first {
                None => first = Some((child, tag)),
                Some((first_child, first_tag)) => {
                    if first_tag.kind() != tag.kind() {
                        return Err(ErrorKind::IncompatibleVariantKinds {
                            parent: registry.type_name(node).to_string(),
                            first: format!("{} ({})", registry.type_name(first_child), first_tag.kind()),
                            second: format!("{} ({})", registry.type_name(child), tag.kind()),
                        }
                        .into());
                    }
                }
            }
        }

        if children.len() > 1 && untagged {
            return Err(ErrorKind::AmbiguousInheritance(registry.type_name(node).to_string()).into());
        }

        // Bridges can bring together children that were never siblings at
        // registration time.
        for (i, &a) in children.iter().enumerate() {
            let Some(tag) = registry.entry(a)?.variant() else {
                continue;
            };
            for &b in &children[i + 1..] {
                if registry.entry(b)?.variant() == Some(tag) {
                    return Err(ErrorKind::ConflictingVariants {
                        first: registry.type_name(a).to_string(),
                        second: registry.type_name(b).to_string(),
                        tag: tag.to_string(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// At most one entry per chain may interleave a tag with fields.
    fn chain(&self, node: TypeId) -> Result<()> {
        let mixed = self
            .registry
            .schema_chain(node)
            .iter()
            .filter(|e| e.variant().is_some() && !e.fields().is_empty())
            .count();
        if mixed > 1 {
            return Err(ErrorKind::AmbiguousInheritance(self.registry.type_name(node).to_string()).into());
        }
        Ok(())
    }

    fn field_types(&mut self, node: TypeId) -> Result<()> {
        let registry = self.registry;
        let entry = registry.entry(node)?;
        for field in entry.fields() {
            for referenced in field.ty.referenced_types() {
                let Some(target) = registry.lookup(referenced) else {
                    return Err(Error::new(ErrorKind::UnknownFieldType(format!("{referenced:?}")))
                        .in_field(&field.key));
                };
                let known = target.has_schema()
                    || target.custom_codec().is_some()
                    || !registry.non_trivial_children_of(referenced).is_empty();
                if !known {
                    if self.options.allow_unknown_field_types {
                        continue;
                    }
                    return Err(Error::new(ErrorKind::UnknownFieldType(target.path().to_string()))
                        .in_field(&field.key));
                }
                self.family(referenced).map_err(|e| e.in_field(&field.key))?;
            }
        }
        Ok(())
    }
}
