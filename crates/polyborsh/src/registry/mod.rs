// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry.
//!
//! Registration is two-phase: a mutable [`RegistryBuilder`] collects type
//! declarations, variant tags and fields, then [`RegistryBuilder::build`]
//! freezes everything into an immutable [`Registry`] that the engines read.
//!
//! # Architecture
//!
//! ```text
//! RegistryBuilder (build phase, single owner)
//! +-- nodes: Vec<TypeNode>          arena, TypeId = index
//! +-- by_path: HashMap<String, TypeId>
//!
//! Registry (frozen, Send + Sync)
//! +-- entries: Vec<RegistryEntry>   fields, tag, children, ancestor chain
//! +-- by_path: HashMap<String, TypeId>
//! ```
//!
//! A type's identity is its full path from the topmost declared ancestor
//! (`Shape::Circle`), so equal short names under different parents never
//! collide.

mod builder;
pub mod global;
#[allow(clippy::module_inception)]
mod registry;

pub use builder::{Constructor, RegistryBuilder};
pub use registry::{Registry, RegistryEntry};

use std::fmt;

/// Separator between path components of a type identity.
pub const PATH_SEPARATOR: &str = "::";

/// Handle to a declared type. Only meaningful for the builder/registry that
/// issued it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub(crate) const fn from_index(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}
