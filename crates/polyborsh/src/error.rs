// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy with field-path breadcrumbs.
//!
//! Every failure carries an [`ErrorKind`] plus the path of field keys and
//! element indices that led to it. The path is built inside-out: the
//! innermost call site creates the error, and each enclosing struct, option
//! or sequence prepends its own segment while the error unwinds.
//!
//! ```text
//! shapes[2].radius: missing required value
//! ^^^^^^ ^^ ^^^^^^
//! field  |  field
//!        index
//! ```

use std::fmt;
use thiserror::Error;

/// What went wrong, independent of where.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// The value's type has no registry entry anywhere in its chain.
    #[error("type `{0}` is not registered (no fields or variant anywhere in its chain)")]
    UnknownType(String),

    /// A type path was not found in the registry.
    #[error("no type registered under `{0}`")]
    UnknownTypeName(String),

    /// A field references a struct type that is neither registered nor has
    /// non-trivial descendants.
    #[error("unknown field type `{0}`")]
    UnknownFieldType(String),

    /// An absent value was supplied for a field that is not an option.
    #[error("missing required value (declared type: {declared})")]
    MissingRequiredValue { declared: String },

    /// A fixed array value does not have the declared length.
    #[error("array length mismatch: expected {expected}, got {actual}")]
    ArrayLengthMismatch { expected: u32, actual: usize },

    /// A nested struct value is not related to the declared type.
    #[error("value of type `{found}` is not compatible with declared type `{expected}`")]
    IncompatibleType { expected: String, found: String },

    /// Polymorphic resolution ended on a type unrelated to the target.
    #[error("decoding `{target}` resolved to `{resolved}`, which is not compatible")]
    IncompatibleResolvedType { target: String, resolved: String },

    /// No child of `parent` matched the discriminator read from the buffer.
    #[error("no variant of `{parent}` matches the discriminator read from the buffer (candidates: {candidates})")]
    NoMatchingVariant { parent: String, candidates: String },

    /// Several children of a type introduce fields without distinguishing tags.
    #[error("ambiguous inheritance below `{0}`")]
    AmbiguousInheritance(String),

    /// Sibling variants use different tag kinds.
    #[error("children of `{parent}` mix variant kinds ({first} vs {second})")]
    IncompatibleVariantKinds {
        parent: String,
        first: String,
        second: String,
    },

    /// Two siblings declare the same tag value.
    #[error("conflicting variants: `{first}` and `{second}` share variant {tag}")]
    ConflictingVariants {
        first: String,
        second: String,
        tag: String,
    },

    /// Explicit field indices left a slot unassigned.
    #[error("type `{type_name}` has no field at index {index}")]
    MissingFieldIndex { type_name: String, index: usize },

    /// Two fields claim the same explicit index.
    #[error("type `{type_name}` defines multiple fields at index {index}")]
    DuplicateFieldIndex { type_name: String, index: usize },

    /// The discriminator of a type cannot be computed without a payload.
    #[error("discriminator of `{0}` is ambiguous: an ancestor declares fields before the last tag")]
    AmbiguousDiscriminator(String),

    /// The runtime value does not match the declared descriptor.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// An integer does not fit the declared byte width.
    #[error("integer does not fit in {bits} bits")]
    IntegerOverflow { bits: u32 },

    /// Reading past the end of the input.
    #[error("unexpected end of buffer at offset {offset}: needed {needed} bytes, {available} available")]
    UnexpectedEndOfBuffer {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Bytes left over after a complete checked decode.
    #[error("unexpected {0} bytes after deserialized data")]
    TrailingBytes(usize),

    /// Nesting of structs, options and sequences went past the budget.
    #[error("nesting depth exceeds the limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// A type name is empty or contains the path separator.
    #[error("invalid type name `{0}`")]
    InvalidTypeName(String),

    /// A length-prefixed string is not valid UTF-8.
    #[error("invalid UTF-8 in string")]
    InvalidUtf8,

    /// A length does not fit the u32 prefix.
    #[error("length {0} exceeds u32::MAX")]
    LengthOverflow(usize),

    /// The global registry no longer accepts registrations.
    #[error("registry is frozen")]
    RegistryFrozen,

    /// The global registry was used before being frozen.
    #[error("global registry has not been frozen yet")]
    RegistryNotFrozen,

    /// Schema document problems.
    #[error("schema error: {0}")]
    Schema(String),

    /// Free-form failure raised by a custom codec.
    #[error("{0}")]
    Custom(String),
}

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Codec error: a kind plus the field path it surfaced through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    path: Vec<PathSegment>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            path: Vec::new(),
        }
    }

    /// Shorthand for [`ErrorKind::Custom`], for use by custom codecs.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Custom(message.into()))
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    /// Breadcrumb segments, outermost first.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Prepend a field key to the breadcrumb.
    #[must_use]
    pub fn in_field(mut self, key: &str) -> Self {
        self.path.insert(0, PathSegment::Field(key.to_string()));
        self
    }

    /// Prepend an element index to the breadcrumb.
    #[must_use]
    pub fn at_index(mut self, index: usize) -> Self {
        self.path.insert(0, PathSegment::Index(index));
        self
    }

    /// Render the breadcrumb as `a.b[3].c`.
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Field(key) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(key);
                }
                PathSegment::Index(i) => {
                    out.push('[');
                    out.push_str(&i.to_string());
                    out.push(']');
                }
            }
        }
        out
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.path_string(), self.kind)
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_prepended_outward() {
        let err = Error::new(ErrorKind::MissingRequiredValue {
            declared: "u32".into(),
        })
        .in_field("radius")
        .at_index(2)
        .in_field("shapes");

        assert_eq!(err.path_string(), "shapes[2].radius");
        assert_eq!(
            err.to_string(),
            "shapes[2].radius: missing required value (declared type: u32)"
        );
    }

    #[test]
    fn display_without_path() {
        let err = Error::new(ErrorKind::TrailingBytes(1));
        assert_eq!(err.to_string(), "unexpected 1 bytes after deserialized data");
        assert!(err.path().is_empty());
    }

    #[test]
    fn kind_survives_wrapping() {
        let err: Error = ErrorKind::InvalidUtf8.into();
        let err = err.in_field("name");
        assert_eq!(err.kind(), &ErrorKind::InvalidUtf8);
        assert_eq!(err.path(), &[PathSegment::Field("name".into())]);
    }
}
