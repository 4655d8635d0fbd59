// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Registries declared from YAML schema files.

#![cfg(feature = "schema-loaders")]

use polyborsh::schema::SchemaLoader;
use polyborsh::{ErrorKind, Record, ValidateOptions};
use std::io::Write;
use tempfile::NamedTempFile;

const MESSAGES: &str = r#"
types:
  - name: Message

  - name: Request
    extends: Message
    variant: 0

  - name: Ping
    extends: Request
    variant: 1
    fields:
      - { key: nonce, type: u64 }

  - name: Pong
    extends: Request
    variant: 2
    fields:
      - { key: nonce, type: u64 }
      - { key: peers, type: "vec<string>" }
      - { key: hash, type: "option<[u8; 4]>" }
"#;

fn schema_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write schema");
    file
}

#[test]
fn load_and_round_trip() {
    let file = schema_file(MESSAGES);
    let registry = SchemaLoader::build_registry(file.path()).expect("load schema");
    let message = registry.resolve("Message").unwrap();
    let pong = registry.resolve("Message::Request::Pong").unwrap();
    registry
        .validate(&[message], &ValidateOptions::default())
        .unwrap();

    let record = Record::new(pong)
        .with("nonce", 7u64)
        .with("peers", vec!["a"])
        .with("hash", Some(vec![1u8, 2, 3, 4]));
    let bytes = registry.serialize(&record).unwrap();
    assert_eq!(
        bytes,
        [
            0, 2, // tags
            7, 0, 0, 0, 0, 0, 0, 0, // nonce
            1, 0, 0, 0, 1, 0, 0, 0, b'a', // peers
            1, 1, 2, 3, 4, // hash
        ]
    );
    assert_eq!(registry.deserialize_record(&bytes, message).unwrap(), record);
    assert_eq!(registry.discriminator_of(pong).unwrap(), vec![0, 2]);
}

#[test]
fn gaps_in_explicit_indices_fail_the_build() {
    let file = schema_file(
        r#"
types:
  - name: Sparse
    fields:
      - { key: a, type: u8, index: 0 }
      - { key: c, type: u8, index: 2 }
"#,
    );
    let err = SchemaLoader::build_registry(file.path()).unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::MissingFieldIndex {
            type_name: "Sparse".into(),
            index: 1
        }
    );
}

#[test]
fn conflicting_tags_fail_at_load() {
    let file = schema_file(
        r#"
types:
  - name: Base
  - { name: A, extends: Base, variant: 3 }
  - { name: B, extends: Base, variant: 3 }
"#,
    );
    let err = SchemaLoader::build_registry(file.path()).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::ConflictingVariants { .. }));
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = SchemaLoader::build_registry(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Schema(_)));
}

#[test]
fn unknown_field_type_name() {
    let file = schema_file(
        r#"
types:
  - name: Holder
    fields:
      - { key: inner, type: "option<Missing>" }
"#,
    );
    let err = SchemaLoader::build_registry(file.path()).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::UnknownTypeName("Missing".into()));
    assert_eq!(err.path_string(), "inner");
}
