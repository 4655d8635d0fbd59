// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON <-> value conversion, guided by the registry's descriptors.
//!
//! Records are JSON objects. A `"$type"` member names the concrete type by
//! its full path; without it the object is read as the declared type.
//! Integers wider than 64 bits and byte buffers travel as strings (decimal
//! and hex respectively), since JSON numbers cannot hold them.

use anyhow::{anyhow, bail, Context};
use num_bigint::BigUint;
use polyborsh::{PrimitiveKind, Record, Registry, TypeDescriptor, TypeId, Value};
use serde_json::{Map, Number, Value as Json};

pub const TYPE_KEY: &str = "$type";

pub fn record_from_json(registry: &Registry, declared: TypeId, json: &Json) -> anyhow::Result<Record> {
    let obj = json
        .as_object()
        .ok_or_else(|| anyhow!("expected an object for `{}`", registry.type_name(declared)))?;

    let ty = match obj.get(TYPE_KEY) {
        Some(Json::String(path)) => registry.resolve(path)?,
        Some(other) => bail!("`{}` must be a string, got {}", TYPE_KEY, other),
        None => declared,
    };

    let mut record = Record::new(ty);
    for entry in registry.schema_chain(ty) {
        for field in entry.fields() {
            let value = match obj.get(&field.key) {
                Some(v) => value_from_json(registry, &field.ty, v)
                    .with_context(|| format!("field `{}`", field.key))?,
                None => Value::Null,
            };
            record.set(field.key.clone(), value);
        }
    }
    Ok(record)
}

fn value_from_json(registry: &Registry, desc: &TypeDescriptor, json: &Json) -> anyhow::Result<Value> {
    if json.is_null() {
        return Ok(Value::Null);
    }
    Ok(match desc {
        TypeDescriptor::Primitive(kind) => primitive_from_json(*kind, json)?,
        TypeDescriptor::Option(inner) => value_from_json(registry, inner, json)?,
        TypeDescriptor::ByteBuffer => match json {
            Json::String(s) => Value::Bytes(crate::hex::decode(s)?),
            Json::Array(items) => Value::Bytes(
                items
                    .iter()
                    .map(|v| small_uint(v).and_then(|n| u8::try_from(n).map_err(Into::into)))
                    .collect::<anyhow::Result<_>>()?,
            ),
            other => bail!("expected hex string or byte array, got {}", other),
        },
        TypeDescriptor::Vector(inner) | TypeDescriptor::FixedArray(inner, _) => {
            let items = json
                .as_array()
                .ok_or_else(|| anyhow!("expected an array, got {}", json))?;
            Value::Sequence(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| value_from_json(registry, inner, v).with_context(|| format!("element {i}")))
                    .collect::<anyhow::Result<_>>()?,
            )
        }
        TypeDescriptor::Struct(ty) => Value::Record(record_from_json(registry, *ty, json)?),
        TypeDescriptor::Custom(codec) => bail!("custom codec `{}` has no JSON form", codec.name()),
    })
}

fn primitive_from_json(kind: PrimitiveKind, json: &Json) -> anyhow::Result<Value> {
    Ok(match kind {
        PrimitiveKind::Bool => Value::Bool(json.as_bool().ok_or_else(|| anyhow!("expected bool, got {}", json))?),
        PrimitiveKind::String => Value::String(
            json.as_str()
                .ok_or_else(|| anyhow!("expected string, got {}", json))?
                .to_string(),
        ),
        PrimitiveKind::U8 => Value::U8(u8::try_from(small_uint(json)?)?),
        PrimitiveKind::U16 => Value::U16(u16::try_from(small_uint(json)?)?),
        PrimitiveKind::U32 => Value::U32(u32::try_from(small_uint(json)?)?),
        PrimitiveKind::U64 => Value::U64(small_uint(json)?),
        PrimitiveKind::U128 => Value::U128(
            u128::try_from(&big_uint(json)?).map_err(|_| anyhow!("{} does not fit in u128", json))?,
        ),
        PrimitiveKind::U256 => Value::U256(big_uint(json)?),
        PrimitiveKind::U512 => Value::U512(big_uint(json)?),
    })
}

fn small_uint(json: &Json) -> anyhow::Result<u64> {
    json.as_u64()
        .ok_or_else(|| anyhow!("expected unsigned integer, got {}", json))
}

fn big_uint(json: &Json) -> anyhow::Result<BigUint> {
    match json {
        Json::Number(n) => n
            .as_u64()
            .map(BigUint::from)
            .ok_or_else(|| anyhow!("expected unsigned integer, got {}", n)),
        Json::String(s) => s
            .parse::<BigUint>()
            .map_err(|e| anyhow!("invalid decimal integer `{}`: {}", s, e)),
        other => bail!("expected integer or decimal string, got {}", other),
    }
}

/// Render a decoded value. Records carry their concrete type in `$type`.
pub fn value_to_json(registry: &Registry, value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(v) => Json::Bool(*v),
        Value::U8(v) => Json::Number((*v).into()),
        Value::U16(v) => Json::Number((*v).into()),
        Value::U32(v) => Json::Number((*v).into()),
        Value::U64(v) => Json::Number(Number::from(*v)),
        Value::U128(v) => Json::String(v.to_string()),
        Value::U256(v) | Value::U512(v) => Json::String(v.to_string()),
        Value::String(s) => Json::String(s.clone()),
        Value::Bytes(b) => Json::String(crate::hex::encode(b)),
        Value::Sequence(items) => Json::Array(items.iter().map(|v| value_to_json(registry, v)).collect()),
        Value::Record(record) => {
            let mut obj = fields_to_json(registry, record.fields());
            obj.insert(
                TYPE_KEY.to_string(),
                Json::String(registry.type_name(record.type_id()).to_string()),
            );
            Json::Object(obj)
        }
        Value::Map(map) => Json::Object(fields_to_json(
            registry,
            map.iter().map(|(k, v)| (k.as_str(), v)),
        )),
    }
}

fn fields_to_json<'a>(registry: &Registry, fields: impl Iterator<Item = (&'a str, &'a Value)>) -> Map<String, Json> {
    let mut sorted: Vec<_> = fields.collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
        .into_iter()
        .map(|(k, v)| (k.to_string(), value_to_json(registry, v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyborsh::RegistryBuilder;
    use serde_json::json;

    fn registry() -> (Registry, TypeId, TypeId) {
        let mut b = RegistryBuilder::new();
        let base = b.declare("Base", None).unwrap();
        let leaf = b.register("Leaf", Some(base), Some(1u8.into())).unwrap();
        b.field(leaf, "id", TypeDescriptor::u32(), None).unwrap();
        b.field(leaf, "big", TypeDescriptor::u128(), None).unwrap();
        b.field(leaf, "raw", TypeDescriptor::bytes(), None).unwrap();
        b.field(leaf, "note", TypeDescriptor::option(TypeDescriptor::string()), None)
            .unwrap();
        (b.build().unwrap(), base, leaf)
    }

    #[test]
    fn json_round_trip() {
        let (reg, base, leaf) = registry();
        let input = json!({
            "$type": "Base::Leaf",
            "id": 7,
            "big": "340282366920938463463374607431768211455",
            "raw": "00ff",
        });
        let record = record_from_json(&reg, base, &input).unwrap();
        assert_eq!(record.type_id(), leaf);
        assert_eq!(record.get::<u128>("big").unwrap(), u128::MAX);
        assert_eq!(record.field("note"), Some(&Value::Null));

        let back = value_to_json(&reg, &Value::Record(record));
        assert_eq!(back["$type"], "Base::Leaf");
        assert_eq!(back["id"], 7);
        assert_eq!(back["raw"], "00ff");
        assert_eq!(back["note"], Json::Null);
    }

    #[test]
    fn out_of_range_rejected() {
        let (reg, _, leaf) = registry();
        let err = record_from_json(&reg, leaf, &json!({ "id": -1 })).unwrap_err();
        assert!(format!("{err:#}").contains("field `id`"));
    }
}
