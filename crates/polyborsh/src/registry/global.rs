// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide registry.
//!
//! ```text
//! BUILDER: Mutex<Option<RegistryBuilder>>   open until freeze()
//! FROZEN:  OnceLock<Arc<Registry>>          set exactly once
//! ```
//!
//! Registration happens through [`register_with`] during startup. After
//! [`freeze`] the builder is closed and every later registration fails with
//! `RegistryFrozen`; readers grab the frozen snapshot without locking.

use super::{Registry, RegistryBuilder};
use crate::error::{ErrorKind, Result};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};

static BUILDER: Mutex<Option<RegistryBuilder>> = parking_lot::const_mutex(None);
static FROZEN: OnceLock<Arc<Registry>> = OnceLock::new();

/// Run registration code against the global builder.
pub fn register_with<F, R>(f: F) -> Result<R>
where
    F: FnOnce(&mut RegistryBuilder) -> Result<R>,
{
    let mut guard = BUILDER.lock();
    if FROZEN.get().is_some() {
        return Err(ErrorKind::RegistryFrozen.into());
    }
    f(guard.get_or_insert_with(RegistryBuilder::new))
}

/// Freeze the global builder. Idempotent: later calls return the same
/// snapshot.
pub fn freeze() -> Result<Arc<Registry>> {
    let guard = BUILDER.lock();
    if let Some(frozen) = FROZEN.get() {
        return Ok(Arc::clone(frozen));
    }

    let registry = match guard.as_ref() {
        Some(builder) => builder.build()?,
        None => RegistryBuilder::new().build()?,
    };
    log::info!("[Registry] global registry frozen with {} types", registry.len());

    let registry = Arc::new(registry);
    // Only set while holding BUILDER, so this cannot race.
    let _ = FROZEN.set(Arc::clone(&registry));
    Ok(registry)
}

/// The frozen global registry.
pub fn snapshot() -> Result<Arc<Registry>> {
    FROZEN
        .get()
        .cloned()
        .ok_or_else(|| ErrorKind::RegistryNotFrozen.into())
}

pub fn is_frozen() -> bool {
    FROZEN.get().is_some()
}
