// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Recursive types and the nesting depth limit.

use polyborsh::{
    DeserializeOptions, ErrorKind, Record, Registry, RegistryBuilder, TypeDescriptor, TypeId,
    DEFAULT_MAX_DEPTH,
};

fn tree() -> (Registry, TypeId) {
    let mut builder = RegistryBuilder::new();
    let tree = builder.declare("Tree", None).unwrap();
    builder.field(tree, "label", TypeDescriptor::u8(), None).unwrap();
    builder.field(tree, "children", TypeDescriptor::vec(tree), None).unwrap();
    (builder.build().unwrap(), tree)
}

/// A single-branch tree `levels` records deep.
fn spine(tree: TypeId, levels: usize) -> Record {
    let mut node = Record::new(tree).with("label", 0u8).with("children", Vec::<Record>::new());
    for label in 1..levels {
        node = Record::new(tree)
            .with("label", label as u8)
            .with("children", vec![node]);
    }
    node
}

#[test]
fn recursive_tree_round_trips() {
    let (reg, tree) = tree();
    let leaf = |label: u8| Record::new(tree).with("label", label).with("children", Vec::<Record>::new());
    let root = Record::new(tree)
        .with("label", 1u8)
        .with("children", vec![leaf(2), spine(tree, 3)]);

    let bytes = reg.serialize(&root).unwrap();
    assert_eq!(&bytes[..5], [1, 2, 0, 0, 0]);
    assert_eq!(reg.deserialize_record(&bytes, tree).unwrap(), root);
}

#[test]
fn hostile_nesting_is_an_error_not_a_crash() {
    let (reg, tree) = tree();
    // every level claims one child, far past any sane depth
    let mut bytes = Vec::new();
    for _ in 0..100_000 {
        bytes.extend_from_slice(&[7, 1, 0, 0, 0]);
    }

    let err = reg.deserialize(&bytes, tree).unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::DepthLimitExceeded {
            limit: DEFAULT_MAX_DEPTH
        }
    );
    assert!(err.path_string().starts_with("children[0].children[0]"));
}

#[test]
fn huge_count_with_short_input_fails_cleanly() {
    let (reg, tree) = tree();
    let err = reg.deserialize(&[7, 0xff, 0xff, 0xff, 0xff], tree).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnexpectedEndOfBuffer { .. }));
    assert!(err.path_string().starts_with("children[0]"));
}

#[test]
fn max_depth_is_configurable() {
    let (reg, tree) = tree();
    let bytes = reg.serialize(&spine(tree, 3)).unwrap();

    // below the root: three sequences and two nested records
    let fits = DeserializeOptions::new().max_depth(5);
    reg.deserialize_with(&bytes, tree, &fits).unwrap();

    let tight = DeserializeOptions::new().max_depth(4);
    let err = reg.deserialize_with(&bytes, tree, &tight).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::DepthLimitExceeded { limit: 4 });
    assert_eq!(err.path_string(), "children[0].children[0].children");
}

#[test]
fn serializer_shares_the_limit() {
    let (reg, tree) = tree();
    reg.serialize(&spine(tree, 20)).unwrap();

    let err = reg.serialize(&spine(tree, DEFAULT_MAX_DEPTH)).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::DepthLimitExceeded { .. }));
}
