// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Variant tags (discriminators) of polymorphic families.

use crate::binary::{BinaryReader, BinaryWriter};
use crate::error::Result;
use std::fmt;

/// Discriminator attached to a registered type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariantTag {
    /// One byte.
    U8(u8),
    /// Fixed-length tuple of bytes, written in declaration order.
    Tuple(Vec<u8>),
    /// Length-prefixed string.
    String(String),
}

/// Shape of a tag, used to check sibling consistency and to know how many
/// bytes to read before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    U8,
    Tuple(usize),
    String,
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8 => write!(f, "u8"),
            Self::Tuple(len) => write!(f, "[u8; {len}]"),
            Self::String => write!(f, "string"),
        }
    }
}

impl VariantTag {
    pub fn kind(&self) -> VariantKind {
        match self {
            Self::U8(_) => VariantKind::U8,
            Self::Tuple(bytes) => VariantKind::Tuple(bytes.len()),
            Self::String(_) => VariantKind::String,
        }
    }

    pub fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        match self {
            Self::U8(tag) => writer.u8(*tag),
            Self::Tuple(bytes) => writer.bytes(bytes),
            Self::String(tag) => writer.string(tag)?,
        }
        Ok(())
    }

    /// Read a tag of the given kind.
    pub fn read(kind: VariantKind, reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(match kind {
            VariantKind::U8 => Self::U8(reader.u8()?),
            VariantKind::Tuple(len) => Self::Tuple(reader.read_bytes(len)?.to_vec()),
            VariantKind::String => Self::String(reader.string()?),
        })
    }
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8(tag) => write!(f, "{tag}"),
            Self::Tuple(bytes) => write!(f, "{bytes:?}"),
            Self::String(tag) => write!(f, "{tag:?}"),
        }
    }
}

impl From<u8> for VariantTag {
    fn from(tag: u8) -> Self {
        Self::U8(tag)
    }
}

impl From<Vec<u8>> for VariantTag {
    fn from(tag: Vec<u8>) -> Self {
        Self::Tuple(tag)
    }
}

impl<const N: usize> From<[u8; N]> for VariantTag {
    fn from(tag: [u8; N]) -> Self {
        Self::Tuple(tag.to_vec())
    }
}

impl From<&str> for VariantTag {
    fn from(tag: &str) -> Self {
        Self::String(tag.to_string())
    }
}

impl From<String> for VariantTag {
    fn from(tag: String) -> Self {
        Self::String(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(VariantTag::from(3u8).kind(), VariantKind::U8);
        assert_eq!(VariantTag::from([1u8, 2]).kind(), VariantKind::Tuple(2));
        assert_eq!(VariantTag::from("ping").kind(), VariantKind::String);
        assert_ne!(VariantKind::Tuple(2), VariantKind::Tuple(3));
    }

    #[test]
    fn wire_layout() {
        let mut w = BinaryWriter::new();
        VariantTag::from(7u8).write(&mut w).unwrap();
        VariantTag::from([1u8, 2, 3]).write(&mut w).unwrap();
        VariantTag::from("ab").write(&mut w).unwrap();
        assert_eq!(w.as_bytes(), &[7, 1, 2, 3, 2, 0, 0, 0, b'a', b'b']);

        let bytes = w.into_bytes();
        let mut r = BinaryReader::new(&bytes);
        assert_eq!(VariantTag::read(VariantKind::U8, &mut r).unwrap(), 7u8.into());
        assert_eq!(
            VariantTag::read(VariantKind::Tuple(3), &mut r).unwrap(),
            vec![1u8, 2, 3].into()
        );
        assert_eq!(VariantTag::read(VariantKind::String, &mut r).unwrap(), "ab".into());
    }
}
