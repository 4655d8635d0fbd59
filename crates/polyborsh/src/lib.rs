// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-driven binary serialization with polymorphic type hierarchies.
//!
//! Types are declared in a [`Registry`] together with their ordered fields
//! and an optional variant tag. Encoding a record writes its ancestor chain,
//! topmost first: each contributing type emits its tag and then its fields,
//! Borsh-style (little-endian integers, u32 length prefixes, no padding).
//! Decoding starts from the topmost ancestor and follows the tags down to the
//! concrete subtype.
//!
//! # Features
//!
//! - **Polymorphic decode**: ask for `Shape`, get back `Shape::Circle`
//! - **Static validation**: reject hierarchies that would not decode back
//! - **Discriminator prefixes**: know the leading bytes of any subtype
//! - **Schema loading**: declare a registry from YAML (`schema-loaders`)
//!
//! # Example
//!
//! ```
//! use polyborsh::{Record, RegistryBuilder, TypeDescriptor};
//!
//! let mut builder = RegistryBuilder::new();
//! let shape = builder.declare("Shape", None)?;
//! let circle = builder.register("Circle", Some(shape), Some(0u8.into()))?;
//! builder.field(circle, "radius", TypeDescriptor::u32(), None)?;
//! let square = builder.register("Square", Some(shape), Some(1u8.into()))?;
//! builder.field(square, "side", TypeDescriptor::u16(), None)?;
//! let registry = builder.build()?;
//!
//! let bytes = registry.serialize(&Record::new(circle).with("radius", 5u32))?;
//! assert_eq!(bytes, [0, 5, 0, 0, 0]);
//!
//! let decoded = registry.deserialize_record(&bytes, shape)?;
//! assert_eq!(decoded.type_id(), circle);
//! assert_eq!(decoded.get::<u32>("radius")?, 5);
//! # Ok::<(), polyborsh::Error>(())
//! ```

pub mod binary;
mod de;
mod discriminator;
pub mod error;
pub mod registry;
mod ser;
#[cfg(feature = "schema-loaders")]
pub mod schema;
pub mod types;
mod validate;
pub mod value;
pub mod variant;

pub use binary::{BinaryReader, BinaryWriter};
pub use de::{DeserializeOptions, Materialize, DEFAULT_MAX_DEPTH};
pub use error::{Error, ErrorKind, PathSegment, Result};
pub use registry::{Registry, RegistryBuilder, RegistryEntry, TypeId};
pub use types::{CustomCodec, FieldDescriptor, PrimitiveKind, TypeDescriptor};
pub use validate::ValidateOptions;
pub use value::{FromValue, IntoValue, Record, Value};
pub use variant::{VariantKind, VariantTag};

/// Encode with the frozen global registry.
pub fn serialize(record: &Record) -> Result<Vec<u8>> {
    registry::global::snapshot()?.serialize(record)
}

/// Decode with the frozen global registry.
pub fn deserialize(bytes: &[u8], target: TypeId) -> Result<Value> {
    registry::global::snapshot()?.deserialize(bytes, target)
}

/// Decode with the frozen global registry and explicit options.
pub fn deserialize_with(bytes: &[u8], target: TypeId, options: &DeserializeOptions) -> Result<Value> {
    registry::global::snapshot()?.deserialize_with(bytes, target, options)
}
