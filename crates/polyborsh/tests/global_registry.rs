// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Process-wide registry lifecycle. Kept to a single test: the registry can
// only be frozen once per process.

use polyborsh::registry::global;
use polyborsh::{ErrorKind, Record, TypeDescriptor};

#[test]
fn register_freeze_use() {
    assert!(!global::is_frozen());
    assert_eq!(global::snapshot().unwrap_err().kind(), &ErrorKind::RegistryNotFrozen);

    let (base, leaf) = global::register_with(|b| {
        let base = b.declare("Status", None)?;
        let leaf = b.register("Ready", Some(base), Some(4u8.into()))?;
        b.field(leaf, "since", TypeDescriptor::u32(), None)?;
        Ok((base, leaf))
    })
    .unwrap();

    // a second registration phase adds to the same builder
    let busy = global::register_with(|b| {
        let base = b.lookup_path("Status").expect("declared above");
        b.register("Busy", Some(base), Some(5u8.into()))
    })
    .unwrap();

    // encoding needs a frozen registry
    let record = Record::new(leaf).with("since", 9u32);
    let err = polyborsh::serialize(&record).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::RegistryNotFrozen);

    let registry = global::freeze().unwrap();
    assert_eq!(registry.len(), 3);
    assert!(global::is_frozen());
    assert!(std::sync::Arc::ptr_eq(&registry, &global::freeze().unwrap()));

    let err = global::register_with(|b| b.declare("Late", None)).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::RegistryFrozen);

    let bytes = polyborsh::serialize(&record).unwrap();
    assert_eq!(bytes, [4, 9, 0, 0, 0]);
    let decoded = polyborsh::deserialize(&bytes, base).unwrap();
    assert_eq!(decoded.as_record(), Some(&record));

    let decoded = polyborsh::deserialize(&[5], base).unwrap();
    assert_eq!(decoded.as_record().map(Record::type_id), Some(busy));
}
