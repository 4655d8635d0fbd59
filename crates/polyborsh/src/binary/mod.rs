// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire primitives.
//!
//! | Construct | Encoding |
//! |---|---|
//! | `bool` | 1 byte, 0 or 1 |
//! | `u8`..`u512` | fixed-width little-endian |
//! | `string` | u32 LE byte length, then UTF-8 bytes |
//! | byte buffer | u32 LE byte length, then raw bytes |

mod reader;
mod writer;

pub use reader::BinaryReader;
pub use writer::BinaryWriter;
