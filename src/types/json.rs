// Copyright (C) 2025 Parity Technologies (UK) Ltd. (admin@parity.io)
// This file is a part of the frame-codec crate.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//         http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::{TypeDef, parse_type};
use crate::codec::{EnumDef, SetDef, StructDef, VariantDef};
use crate::error::Error;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Parse a JSON type definition, as found in type bundles:
///
/// - a string is a type string, eg `"Vec<u32>"`.
/// - `{"_enum": [..]}` or `{"_enum": {..}}` is an enum.
/// - `{"_set": {..}}` is a set of bit flags.
/// - any other object is a struct, with optional `_alias` and `_fallback` keys.
pub fn parse_definition(value: &Value) -> Result<TypeDef, Error> {
    match value {
        Value::String(s) => parse_type(s),
        Value::Null => Ok(TypeDef::Null),
        Value::Object(map) => {
            if let Some(variants) = map.get("_enum") {
                parse_enum(variants).map(|def| TypeDef::Enum(Arc::new(def)))
            } else if let Some(flags) = map.get("_set") {
                parse_set(flags).map(|def| TypeDef::Set(Arc::new(def)))
            } else {
                parse_struct(map).map(|def| TypeDef::Struct(Arc::new(def)))
            }
        }
        other => Err(invalid(other, "expected a type string or object")),
    }
}

fn parse_struct(map: &Map<String, Value>) -> Result<StructDef, Error> {
    let mut fields = Vec::with_capacity(map.len());
    let mut aliases = Vec::new();
    let mut fallback = None;

    for (name, def) in map {
        match name.as_str() {
            "_alias" => {
                let Value::Object(alias_map) = def else {
                    return Err(invalid(def, "_alias must be an object"));
                };
                for (from, to) in alias_map {
                    let to = to
                        .as_str()
                        .ok_or_else(|| invalid(to, "_alias values must be strings"))?;
                    aliases.push((from.clone(), to.to_owned()));
                }
            }
            "_fallback" => {
                let ty = def
                    .as_str()
                    .ok_or_else(|| invalid(def, "_fallback must be a type string"))?;
                fallback = Some(ty.to_owned());
            }
            _ => fields.push((name.clone(), parse_definition(def)?)),
        }
    }

    let mut def = StructDef::new(fields).with_aliases(aliases);
    if let Some(fallback) = fallback {
        def = def.with_fallback(fallback);
    }
    Ok(def)
}

fn parse_enum(variants: &Value) -> Result<EnumDef, Error> {
    match variants {
        Value::Array(names) => {
            let names = names
                .iter()
                .map(|n| {
                    n.as_str()
                        .map(str::to_owned)
                        .ok_or_else(|| invalid(n, "enum variant names must be strings"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            EnumDef::basic(names)
        }
        Value::Object(map) if !map.is_empty() && map.values().all(Value::is_number) => {
            let indexed = map
                .iter()
                .map(|(name, idx)| {
                    idx.as_u64()
                        .and_then(|i| u8::try_from(i).ok())
                        .map(|i| (name.clone(), i))
                        .ok_or_else(|| invalid(idx, "enum indexes must fit in a u8"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(EnumDef::indexed(indexed))
        }
        Value::Object(map) => {
            let variants = map
                .iter()
                .enumerate()
                .map(|(idx, (name, def))| {
                    let ty = match def {
                        Value::String(s) if s.is_empty() => TypeDef::Null,
                        other => parse_definition(other)?,
                    };
                    let idx = u8::try_from(idx)
                        .map_err(|_| invalid(variants, "enums have at most 256 variants"))?;
                    Ok(VariantDef::new(name.clone(), idx, ty))
                })
                .collect::<Result<Vec<_>, Error>>()?;
            Ok(EnumDef::new(variants))
        }
        other => Err(invalid(other, "_enum must be an array or object")),
    }
}

fn parse_set(flags: &Value) -> Result<SetDef, Error> {
    let Value::Object(map) = flags else {
        return Err(invalid(flags, "_set must be an object"));
    };
    let bit_length = match map.get("_bitLength") {
        Some(len) => len
            .as_u64()
            .and_then(|l| u16::try_from(l).ok())
            .ok_or_else(|| invalid(len, "_bitLength must be a number"))?,
        None => 8,
    };
    let flags = map
        .iter()
        .filter(|(name, _)| name.as_str() != "_bitLength")
        .map(|(name, bits)| {
            bits.as_u64()
                .map(|b| (name.clone(), b))
                .ok_or_else(|| invalid(bits, "set flag values must be numbers"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SetDef::new(bit_length, flags))
}

fn invalid(def: &Value, reason: &str) -> Error {
    Error::InvalidTypeDefinition {
        def: def.to_string(),
        reason: reason.to_owned(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_structs_with_aliases_and_fallbacks() {
        let def = parse_definition(&json!({
            "_alias": { "value": "Value" },
            "_fallback": "u64",
            "who": "AccountId",
            "value": "Compact<Balance>"
        }))
        .unwrap();
        let TypeDef::Struct(def) = def else {
            panic!("expected struct")
        };
        assert_eq!(def.keys().collect::<Vec<_>>(), vec!["who", "value"]);
        assert_eq!(def.json_key("value"), "Value");
        assert_eq!(def.json_key("who"), "who");
        assert_eq!(def.fallback(), Some("u64"));
    }

    #[test]
    fn parses_enum_forms() {
        let TypeDef::Enum(basic) = parse_definition(&json!({ "_enum": ["A", "B"] })).unwrap()
        else {
            panic!("expected enum")
        };
        assert!(basic.is_basic());

        let TypeDef::Enum(indexed) =
            parse_definition(&json!({ "_enum": { "A": 5, "B": 42 } })).unwrap()
        else {
            panic!("expected enum")
        };
        assert!(indexed.is_basic());
        assert_eq!(indexed.variants()[1].index(), 42);

        let TypeDef::Enum(data) =
            parse_definition(&json!({ "_enum": { "A": "u32", "B": { "x": "u8" } } })).unwrap()
        else {
            panic!("expected enum")
        };
        assert!(!data.is_basic());
        assert!(matches!(data.variants()[1].ty(), TypeDef::Struct(_)));
    }

    #[test]
    fn parses_sets() {
        let TypeDef::Set(set) =
            parse_definition(&json!({ "_set": { "_bitLength": 16, "A": 1, "B": 4 } })).unwrap()
        else {
            panic!("expected set")
        };
        assert_eq!(set.bit_length(), 16);
    }

    #[test]
    fn enums_beyond_256_variants_are_rejected() {
        let names: Vec<String> = (0..257).map(|i| format!("V{i}")).collect();
        assert!(matches!(
            parse_definition(&json!({ "_enum": names })),
            Err(Error::InvalidTypeDefinition { .. })
        ));

        let object: serde_json::Map<String, Value> =
            (0..257).map(|i| (format!("V{i}"), json!("u8"))).collect();
        assert!(matches!(
            parse_definition(&json!({ "_enum": object })),
            Err(Error::InvalidTypeDefinition { .. })
        ));

        let names: Vec<String> = (0..256).map(|i| format!("V{i}")).collect();
        let TypeDef::Enum(def) = parse_definition(&json!({ "_enum": names })).unwrap() else {
            panic!("expected an enum")
        };
        assert_eq!(def.by_index(255).map(|v| v.name()), Some("V255"));
    }
}
