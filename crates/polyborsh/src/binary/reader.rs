// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked byte reader.

use crate::error::{Error, ErrorKind, Result};
use num_bigint::BigUint;

/// Generate fixed-width little-endian read methods.
///
/// Each generated method checks bounds, copies N bytes, converts them via
/// `from_le_bytes()` and advances the cursor.
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> Result<$type> {
            let slice = self.read_bytes($size)?;
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(slice);
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Consumes bytes from a borrowed buffer.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    /// Current cursor position.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    /// True once every byte has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(Error::new(ErrorKind::UnexpectedEndOfBuffer {
                offset: self.offset,
                needed: count,
                available: self.remaining(),
            }));
        }
        let slice = &self.buffer[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    pub fn bool(&mut self) -> Result<bool> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ErrorKind::TypeMismatch {
                expected: "bool (0 or 1)".into(),
                found: format!("byte {other}"),
            }
            .into()),
        }
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    impl_read_le!(u16, u16, 2);
    impl_read_le!(u32, u32, 4);
    impl_read_le!(u64, u64, 8);
    impl_read_le!(u128, u128, 16);

    pub fn u256(&mut self) -> Result<BigUint> {
        Ok(BigUint::from_bytes_le(self.read_bytes(32)?))
    }

    pub fn u512(&mut self) -> Result<BigUint> {
        Ok(BigUint::from_bytes_le(self.read_bytes(64)?))
    }

    /// u32 length or element-count prefix.
    pub fn length(&mut self) -> Result<usize> {
        Ok(self.u32()? as usize)
    }

    pub fn string(&mut self) -> Result<String> {
        let len = self.length()?;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ErrorKind::InvalidUtf8.into())
    }

    pub fn byte_buffer(&mut self) -> Result<Vec<u8>> {
        let len = self.length()?;
        Ok(self.read_bytes(len)?.to_vec())
    }
}
