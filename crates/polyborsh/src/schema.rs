// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML schema loader.
//!
//! Declares a whole registry from a document instead of code.
//!
//! # Example YAML
//!
//! ```yaml
//! types:
//!   - name: Shape
//!   - name: Circle
//!     extends: Shape
//!     variant: 0
//!     fields:
//!       - { key: radius, type: u32 }
//!   - name: Polygon
//!     extends: Shape
//!     variant: 1
//!     fields:
//!       - { key: points, type: "vec<[u32; 2]>" }
//!       - { key: label, type: "option<string>" }
//! ```
//!
//! `variant` is a byte (`0`), a byte tuple (`[1, 2]`) or a string (`"ping"`).
//! Field types are `bool`, `string`, `u8` to `u512`, `bytes`, `option<T>`,
//! `vec<T>`, `[T; N]`, or the name of another declared type. `extends` and
//! type references accept a short name when it is unique in the document,
//! or a full path (`Shape::Circle`) otherwise.

use crate::error::{ErrorKind, Result};
use crate::registry::{Registry, RegistryBuilder, TypeId, PATH_SEPARATOR};
use crate::types::{PrimitiveKind, TypeDescriptor};
use crate::variant::VariantTag;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// YAML schema loader.
pub struct SchemaLoader;

/// Root document.
#[derive(Debug, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

/// One declared type.
#[derive(Debug, Deserialize)]
pub struct TypeDecl {
    pub name: String,

    /// Parent type (short name or full path).
    #[serde(default)]
    pub extends: Option<String>,

    #[serde(default)]
    pub variant: Option<VariantDecl>,

    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VariantDecl {
    Byte(u8),
    Tuple(Vec<u8>),
    Text(String),
}

impl From<VariantDecl> for VariantTag {
    fn from(decl: VariantDecl) -> Self {
        match decl {
            VariantDecl::Byte(b) => VariantTag::U8(b),
            VariantDecl::Tuple(bytes) => VariantTag::Tuple(bytes),
            VariantDecl::Text(s) => VariantTag::String(s),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FieldDecl {
    pub key: String,

    /// Type expression.
    #[serde(rename = "type")]
    pub ty: String,

    /// Explicit field slot.
    #[serde(default)]
    pub index: Option<u32>,
}

fn schema_error(msg: impl Into<String>) -> crate::error::Error {
    ErrorKind::Schema(msg.into()).into()
}

impl SchemaLoader {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<SchemaDocument> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| schema_error(format!("failed to read {}: {}", path.display(), e)))?;
        Self::parse_yaml(&content)
    }

    pub fn parse_yaml(content: &str) -> Result<SchemaDocument> {
        serde_yaml::from_str(content).map_err(|e| schema_error(format!("failed to parse YAML: {}", e)))
    }

    /// Load, declare and freeze in one step.
    pub fn build_registry<P: AsRef<Path>>(path: P) -> Result<Registry> {
        let doc = Self::load_from_file(path)?;
        let mut builder = RegistryBuilder::new();
        doc.apply(&mut builder)?;
        builder.build()
    }
}

impl SchemaDocument {
    /// Declare every type of the document into `builder`.
    ///
    /// Parents may appear after their children in the document. Returns the
    /// handles in document order.
    pub fn apply(&self, builder: &mut RegistryBuilder) -> Result<Vec<TypeId>> {
        let mut ids: Vec<Option<TypeId>> = vec![None; self.types.len()];
        let mut names = NameTable::new(&self.types);

        let mut pending = self.types.len();
        while pending > 0 {
            let mut progressed = false;
            for (i, decl) in self.types.iter().enumerate() {
                if ids[i].is_some() {
                    continue;
                }
                let parent = match &decl.extends {
                    None => None,
                    Some(name) => match names.resolve(builder, name)? {
                        Some(id) => Some(id),
                        None => continue,
                    },
                };
                let id = builder.declare(&decl.name, parent)?;
                names.insert(&decl.name, id);
                ids[i] = Some(id);
                pending -= 1;
                progressed = true;
            }
            if !progressed {
                let stuck: Vec<&str> = self
                    .types
                    .iter()
                    .zip(&ids)
                    .filter(|(_, id)| id.is_none())
                    .map(|(d, _)| d.name.as_str())
                    .collect();
                return Err(schema_error(format!(
                    "unresolved or cyclic parents for: {}",
                    stuck.join(", ")
                )));
            }
        }

        let ids: Vec<TypeId> = ids.into_iter().flatten().collect();
        for (decl, &id) in self.types.iter().zip(&ids) {
            if let Some(variant) = &decl.variant {
                builder.variant(id, VariantTag::from(variant.clone()))?;
            }
            for field in &decl.fields {
                let ty = {
                    let declared: &RegistryBuilder = builder;
                    parse_type_expr(&field.ty, &|name| names.resolve(declared, name))
                        .map_err(|e| e.in_field(&field.key))?
                };
                builder.field(id, &field.key, ty, field.index)?;
            }
        }

        log::debug!("[SchemaLoader] declared {} types", ids.len());
        Ok(ids)
    }
}

/// Short-name index over the whole document.
struct NameTable {
    /// How many declarations use each short name.
    counts: HashMap<String, usize>,
    /// Short names declared at the root, which are also full paths.
    roots: HashSet<String>,
    short: HashMap<String, TypeId>,
}

impl NameTable {
    fn new(types: &[TypeDecl]) -> Self {
        let mut counts = HashMap::new();
        let mut roots = HashSet::new();
        for decl in types {
            *counts.entry(decl.name.clone()).or_insert(0) += 1;
            if decl.extends.is_none() {
                roots.insert(decl.name.clone());
            }
        }
        Self {
            counts,
            roots,
            short: HashMap::new(),
        }
    }

    fn insert(&mut self, name: &str, id: TypeId) {
        self.short.insert(name.to_string(), id);
    }

    /// Full paths win; short names must be unique across the document.
    ///
    /// `Ok(None)` means the name is not declared yet.
    fn resolve(&self, builder: &RegistryBuilder, name: &str) -> Result<Option<TypeId>> {
        if let Some(id) = builder.lookup_path(name) {
            return Ok(Some(id));
        }
        if name.contains(PATH_SEPARATOR) || self.roots.contains(name) {
            return Ok(None);
        }
        if self.counts.get(name).copied().unwrap_or(0) > 1 {
            return Err(schema_error(format!(
                "type name `{}` is ambiguous, use its full path",
                name
            )));
        }
        Ok(self.short.get(name).copied())
    }
}

/// Parse a field type expression.
pub fn parse_type_expr<F>(expr: &str, resolve: &F) -> Result<TypeDescriptor>
where
    F: Fn(&str) -> Result<Option<TypeId>>,
{
    let expr = expr.trim();
    if expr == "bytes" {
        return Ok(TypeDescriptor::ByteBuffer);
    }
    if let Some(kind) = PrimitiveKind::from_name(expr) {
        return Ok(TypeDescriptor::Primitive(kind));
    }
    if let Some(inner) = generic_arg(expr, "option") {
        return Ok(TypeDescriptor::option(parse_type_expr(inner, resolve)?));
    }
    if let Some(inner) = generic_arg(expr, "vec") {
        return Ok(TypeDescriptor::vec(parse_type_expr(inner, resolve)?));
    }
    if let Some(body) = expr.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        let (inner, len) = body
            .rsplit_once(';')
            .ok_or_else(|| schema_error(format!("array type `{}` needs `; N`", expr)))?;
        let len: u32 = len
            .trim()
            .parse()
            .map_err(|_| schema_error(format!("invalid array length in `{}`", expr)))?;
        return Ok(TypeDescriptor::array(parse_type_expr(inner, resolve)?, len));
    }

    match resolve(expr)? {
        Some(id) => Ok(TypeDescriptor::Struct(id)),
        None => Err(ErrorKind::UnknownTypeName(expr.to_string()).into()),
    }
}

fn generic_arg<'a>(expr: &'a str, name: &str) -> Option<&'a str> {
    expr.strip_prefix(name)?
        .trim_start()
        .strip_prefix('<')?
        .strip_suffix('>')
}
