// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Discriminator prefixes.

use crate::binary::BinaryWriter;
use crate::error::{ErrorKind, Result};
use crate::registry::{Registry, TypeId};

impl Registry {
    /// Bytes that every encoding of `ty` starts with: the concatenated tags
    /// of its chain.
    ///
    /// Only defined when no entry before the last one declares fields, since
    /// field bytes would otherwise sit between the tags.
    pub fn discriminator_of(&self, ty: TypeId) -> Result<Vec<u8>> {
        self.entry(ty)?;
        let chain = self.schema_chain(ty);
        let mut writer = BinaryWriter::new();
        for (i, entry) in chain.iter().enumerate() {
            if i + 1 < chain.len() && !entry.fields().is_empty() {
                return Err(ErrorKind::AmbiguousDiscriminator(self.type_name(ty).to_string()).into());
            }
            if let Some(tag) = entry.variant() {
                tag.write(&mut writer)?;
            }
        }
        Ok(writer.into_bytes())
    }
}
