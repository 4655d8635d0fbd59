// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Append-only byte writer.

use crate::error::{ErrorKind, Result};
use num_bigint::BigUint;

/// Generate fixed-width little-endian write methods.
macro_rules! impl_write_le {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) {
            self.buffer.extend_from_slice(&value.to_le_bytes());
        }
    };
}

/// Accumulates encoded bytes. There is no seek: every write appends.
#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    buffer: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn bool(&mut self, value: bool) {
        self.buffer.push(u8::from(value));
    }

    pub fn u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    impl_write_le!(u16, u16);
    impl_write_le!(u32, u32);
    impl_write_le!(u64, u64);
    impl_write_le!(u128, u128);

    pub fn u256(&mut self, value: &BigUint) -> Result<()> {
        self.big_uint(value, 32)
    }

    pub fn u512(&mut self, value: &BigUint) -> Result<()> {
        self.big_uint(value, 64)
    }

    /// UTF-8 bytes behind a u32 byte-length prefix (not a character count).
    pub fn string(&mut self, value: &str) -> Result<()> {
        self.byte_buffer(value.as_bytes())
    }

    /// Raw bytes behind a u32 byte-length prefix.
    pub fn byte_buffer(&mut self, bytes: &[u8]) -> Result<()> {
        self.length(bytes.len())?;
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    /// u32 length or element-count prefix.
    pub fn length(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| ErrorKind::LengthOverflow(len))?;
        self.u32(len);
        Ok(())
    }

    /// Raw bytes, no prefix.
    pub fn bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    fn big_uint(&mut self, value: &BigUint, width: usize) -> Result<()> {
        let mut bytes = value.to_bytes_le();
        if bytes.len() > width {
            return Err(ErrorKind::IntegerOverflow {
                bits: (width * 8) as u32,
            }
            .into());
        }
        bytes.resize(width, 0);
        self.buffer.extend_from_slice(&bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_little_endian() {
        let mut w = BinaryWriter::new();
        w.u8(0xAB);
        w.u16(0x0102);
        w.u32(0x0304_0506);
        w.u64(7);
        assert_eq!(
            w.as_bytes(),
            &[0xAB, 0x02, 0x01, 0x06, 0x05, 0x04, 0x03, 7, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn u128_is_sixteen_bytes() {
        let mut w = BinaryWriter::new();
        w.u128(u128::MAX - 1);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[0], 0xFE);
        assert!(bytes[1..].iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn big_uints_are_padded() {
        let mut w = BinaryWriter::new();
        w.u256(&BigUint::from(258u32)).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[..3], &[2, 1, 0]);

        let mut w = BinaryWriter::new();
        w.u512(&BigUint::from(0u32)).unwrap();
        assert_eq!(w.into_bytes(), vec![0u8; 64]);
    }

    #[test]
    fn big_uint_overflow_rejected() {
        let mut w = BinaryWriter::new();
        let too_wide = BigUint::from(1u32) << 256;
        let err = w.u256(&too_wide).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::IntegerOverflow { bits: 256 });
        assert!(w.is_empty());
    }

    #[test]
    fn string_prefix_counts_bytes() {
        let mut w = BinaryWriter::new();
        w.string("hé").unwrap();
        // 'é' is two UTF-8 bytes
        assert_eq!(w.as_bytes(), &[3, 0, 0, 0, b'h', 0xC3, 0xA9]);
    }

    #[test]
    fn byte_buffer_prefix() {
        let mut w = BinaryWriter::new();
        w.byte_buffer(&[9, 8]).unwrap();
        w.bool(true);
        w.bool(false);
        assert_eq!(w.as_bytes(), &[2, 0, 0, 0, 9, 8, 1, 0]);
    }
}
