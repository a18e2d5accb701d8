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

use super::{Codec, Input};
use crate::error::Error;
use crate::registry::Registry;
use crate::types::TypeDef;
use crate::utils::camel_case;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// The JSON form of a type definition: a string for most types, an
/// object for structs, enums and sets.
pub(crate) fn type_json(def: &TypeDef) -> Value {
    match def {
        TypeDef::Struct(def) => def.to_json_def(),
        TypeDef::Enum(def) => def.to_json_def(),
        TypeDef::Set(def) => def.to_json_def(),
        other => Value::String(other.to_string()),
    }
}

/// The shape of a struct: ordered, named, typed fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructDef {
    fields: Vec<(String, TypeDef)>,
    aliases: Vec<(String, String)>,
    fallback: Option<String>,
}

impl StructDef {
    /// A struct with the given fields, in encoding order.
    pub fn new(fields: Vec<(String, TypeDef)>) -> Self {
        StructDef {
            fields,
            aliases: Vec::new(),
            fallback: None,
        }
    }

    /// Map field names to the keys used for them in JSON.
    pub fn with_aliases(mut self, aliases: Vec<(String, String)>) -> Self {
        self.aliases = aliases;
        self
    }

    /// A type to try when constructing this struct fails.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// The field names, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// The fields, in order.
    pub fn fields(&self) -> &[(String, TypeDef)] {
        &self.fields
    }

    /// The JSON key used for some field.
    pub fn json_key<'a>(&'a self, field: &'a str) -> &'a str {
        self.aliases
            .iter()
            .find(|(from, _)| from == field)
            .map_or(field, |(_, to)| to.as_str())
    }

    /// The fallback type, if any.
    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    pub(crate) fn to_json_def(&self) -> Value {
        let mut map = Map::new();
        if !self.aliases.is_empty() {
            let aliases: Map<String, Value> = self
                .aliases
                .iter()
                .map(|(from, to)| (from.clone(), Value::String(to.clone())))
                .collect();
            map.insert("_alias".into(), Value::Object(aliases));
        }
        if let Some(fallback) = &self.fallback {
            map.insert("_fallback".into(), Value::String(fallback.clone()));
        }
        for (name, ty) in &self.fields {
            map.insert(name.clone(), type_json(ty));
        }
        Value::Object(map)
    }

    /// The JSON definition string of this struct.
    pub fn to_raw_json(&self) -> String {
        self.to_json_def().to_string()
    }
}

/// A struct value: one value per field, encoded in declaration order.
#[derive(Debug, Clone)]
pub struct Struct {
    def: Arc<StructDef>,
    values: Vec<Box<dyn Codec>>,
}

// Look a field up in object input: exact key, then the aliased JSON key,
// then the camelCased form of the input keys.
fn camel_index(entries: &[(String, Input<'_>)]) -> HashMap<String, usize> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, (k, _))| (camel_case(k), idx))
        .collect()
}

fn field_position(
    entries: &[(String, Input<'_>)],
    camel: &HashMap<String, usize>,
    name: &str,
    json_key: &str,
) -> Option<usize> {
    let exact = |key: &str| entries.iter().position(|(k, _)| k == key);
    if name != json_key && exact(name).is_none() {
        exact(json_key)
    } else {
        exact(name)
    }
    .or_else(|| camel.get(json_key).copied())
    .or_else(|| camel.get(&camel_case(json_key)).copied())
}

fn take_field<'a>(
    entries: &mut [(String, Input<'a>)],
    camel: &HashMap<String, usize>,
    name: &str,
    json_key: &str,
) -> Input<'a> {
    match field_position(entries, camel, name, json_key).and_then(|i| entries.get_mut(i)) {
        Some((_, input)) => core::mem::take(input),
        None => Input::Default,
    }
}

impl Struct {
    /// Build a struct from already constructed values, one per field.
    pub fn new(def: Arc<StructDef>, values: Vec<Box<dyn Codec>>) -> Result<Self, Error> {
        if values.len() != def.fields.len() {
            return Err(Error::StructArity {
                keys: def.keys().map(str::to_owned).collect(),
                found: values.len(),
            });
        }
        Ok(Struct { def, values })
    }

    /// The shape of this struct.
    pub fn def(&self) -> &Arc<StructDef> {
        &self.def
    }

    /// The value of some field.
    pub fn get(&self, field: &str) -> Option<&dyn Codec> {
        self.def
            .fields
            .iter()
            .position(|(name, _)| name == field)
            .and_then(|idx| self.values.get(idx))
            .map(|v| v.as_ref())
    }

    /// Replace the value of some field.
    pub fn set(&mut self, field: &str, value: Box<dyn Codec>) -> Result<(), Error> {
        let idx = self
            .def
            .fields
            .iter()
            .position(|(name, _)| name == field)
            .ok_or_else(|| Error::UnknownVariant {
                ty: self.raw_type(),
                variant: field.to_owned(),
            })?;
        self.values[idx] = value;
        Ok(())
    }

    /// Iterate over field names and values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Codec)> {
        self.def
            .fields
            .iter()
            .zip(&self.values)
            .map(|((name, _), value)| (name.as_str(), value.as_ref()))
    }

    /// The registry hash of the encoded struct.
    pub fn hash(&self, registry: &Registry) -> [u8; 32] {
        registry.hash(&self.to_u8a())
    }

    pub(crate) fn decode(
        registry: &Registry,
        def: &Arc<StructDef>,
        cursor: &mut &[u8],
    ) -> Result<Self, Error> {
        let values = def
            .fields
            .iter()
            .map(|(_, ty)| ty.decode(registry, cursor))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Struct {
            def: def.clone(),
            values,
        })
    }

    pub(crate) fn from_input(
        registry: &Registry,
        def: &Arc<StructDef>,
        input: Input<'_>,
    ) -> Result<Self, Error> {
        let inputs: Vec<Input<'_>> = match input {
            Input::Default | Input::Json(Value::Null) => {
                def.fields.iter().map(|_| Input::Default).collect()
            }
            Input::Json(Value::Object(map)) => {
                let entries = map.into_iter().map(|(k, v)| (k, Input::Json(v))).collect();
                Struct::inputs_from_object(def, entries)
            }
            Input::Object(entries) => Struct::inputs_from_object(def, entries),
            Input::Json(Value::Array(items)) => {
                Struct::inputs_from_array(def, items.into_iter().map(Input::Json).collect())?
            }
            Input::Array(items) => Struct::inputs_from_array(def, items)?,
            other => {
                return Err(Error::invalid_value(
                    def.to_raw_json(),
                    other.describe(),
                    "expected an object",
                ));
            }
        };

        let values = def
            .fields
            .iter()
            .zip(inputs)
            .map(|((_, ty), input)| ty.construct(registry, input))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Struct {
            def: def.clone(),
            values,
        })
    }

    fn inputs_from_object<'a>(
        def: &StructDef,
        mut entries: Vec<(String, Input<'a>)>,
    ) -> Vec<Input<'a>> {
        let camel = camel_index(&entries);
        def.fields
            .iter()
            .map(|(name, _)| take_field(&mut entries, &camel, name, def.json_key(name)))
            .collect()
    }

    // Every field must be present in the entries and equal to its value.
    fn eq_entries(&self, entries: &[(String, Input<'_>)]) -> bool {
        let camel = camel_index(entries);
        self.def
            .fields
            .iter()
            .zip(&self.values)
            .all(|((name, _), value)| {
                field_position(entries, &camel, name, self.def.json_key(name))
                    .is_some_and(|idx| value.eq_input(&entries[idx].1))
            })
    }

    fn inputs_from_array<'a>(def: &StructDef, items: Vec<Input<'a>>) -> Result<Vec<Input<'a>>, Error> {
        if items.len() != def.fields.len() {
            return Err(Error::StructArity {
                keys: def.keys().map(str::to_owned).collect(),
                found: items.len(),
            });
        }
        Ok(items)
    }

    fn render(&self, use_json_keys: bool, f: impl Fn(&dyn Codec) -> Value) -> Value {
        let map: Map<String, Value> = self
            .iter()
            .map(|(name, value)| {
                let key = if use_json_keys {
                    self.def.json_key(name)
                } else {
                    name
                };
                (key.to_owned(), f(value))
            })
            .collect();
        Value::Object(map)
    }
}

impl Codec for Struct {
    fn raw_type(&self) -> String {
        self.def.to_raw_json()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        for value in &self.values {
            value.encode_to(out);
        }
    }

    fn encoded_length(&self) -> usize {
        self.values.iter().map(|v| v.encoded_length()).sum()
    }

    fn to_json(&self) -> Value {
        self.render(true, |v| v.to_json())
    }

    fn to_human(&self) -> Value {
        self.render(false, |v| v.to_human())
    }

    fn to_primitive(&self) -> Value {
        self.render(true, |v| v.to_primitive())
    }

    fn is_empty(&self) -> bool {
        self.values.iter().all(|v| v.is_empty())
    }

    fn eq_input(&self, other: &Input<'_>) -> bool {
        match other {
            Input::Json(Value::Object(map)) => self.eq_entries(
                &map.iter()
                    .map(|(k, v)| (k.clone(), Input::Json(v.clone())))
                    .collect::<Vec<_>>(),
            ),
            Input::Object(entries) => self.eq_entries(entries),
            Input::Default => self.is_empty(),
            Input::Bytes(bytes) => bytes.as_ref() == self.to_u8a().as_slice(),
            Input::Hex(hex) => crate::utils::from_hex(hex).is_ok_and(|b| b == self.to_u8a()),
            Input::Codec(codec) => codec.to_u8a() == self.to_u8a(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn def(json: Value) -> Arc<StructDef> {
        match crate::types::parse_definition(&json).unwrap() {
            TypeDef::Struct(def) => def,
            other => panic!("not a struct: {other:?}"),
        }
    }

    #[test]
    fn field_order_follows_the_definition() {
        let registry = Registry::new();
        let def = def(json!({ "a": "u32", "b": "Text" }));
        let s = Struct::from_input(&registry, &def, Input::from(json!({ "b": "x", "a": 1 }))).unwrap();
        assert_eq!(s.to_u8a(), vec![1, 0, 0, 0, 0x04, b'x']);

        let tuple = TypeDef::parse("(u32,Text)")
            .unwrap()
            .construct(&registry, Input::from(json!([1, "x"])))
            .unwrap();
        assert_eq!(s.to_u8a(), tuple.to_u8a());
    }

    #[test]
    fn object_keys_resolve_exact_then_alias_then_camel_case() {
        let registry = Registry::new();
        let def = def(json!({
            "_alias": { "value": "Value" },
            "value": "u8",
            "someField": "u8"
        }));

        // alias key.
        let s = Struct::from_input(
            &registry,
            &def,
            Input::from(json!({ "Value": 1, "some_field": 2 })),
        )
        .unwrap();
        assert_eq!(s.to_u8a(), vec![1, 2]);
        assert_eq!(s.to_json(), json!({ "Value": 1, "someField": 2 }));
        assert_eq!(s.to_human(), json!({ "value": "1", "someField": "2" }));

        // exact key wins over the alias.
        let s = Struct::from_input(&registry, &def, Input::from(json!({ "value": 3, "Value": 4 })))
            .unwrap();
        assert_eq!(s.get("value").map(|v| v.to_json()), Some(json!(3)));

        // missing fields take defaults.
        assert_eq!(s.get("someField").map(|v| v.to_json()), Some(json!(0)));
    }

    #[test]
    fn array_input_must_match_arity() {
        let registry = Registry::new();
        let def = def(json!({ "a": "u8", "b": "u8" }));
        let res = Struct::from_input(&registry, &def, Input::from(json!([1])));
        assert!(matches!(res, Err(Error::StructArity { found: 1, .. })));
        assert!(Struct::from_input(&registry, &def, Input::from(json!([1, 2]))).is_ok());
    }

    #[test]
    fn decode_consumes_each_field_in_turn() {
        let registry = Registry::new();
        let def = def(json!({ "a": "u16", "b": "Vec<u8>" }));
        let s = Struct::decode(&registry, &def, &mut &[1u8, 0, 0x08, 5, 6][..]).unwrap();
        assert_eq!(s.to_json(), json!({ "a": 1, "b": "0x0506" }));
        assert!(s.eq_input(&Input::from(json!({ "a": 1, "b": "0x0506" }))));
        assert_eq!(s.encoded_length(), 5);
    }

    #[test]
    fn equality_needs_every_key() {
        let registry = Registry::new();
        let def = def(json!({ "a": "u8", "b": "u8" }));
        let s = Struct::from_input(&registry, &def, Input::from(json!({ "a": 1 }))).unwrap();
        assert_eq!(s.to_u8a(), vec![1, 0]);

        assert!(s.eq_input(&Input::from(json!({ "a": 1, "b": 0 }))));
        assert!(!s.eq_input(&Input::from(json!({ "a": 1 }))));
        assert!(!s.eq_input(&Input::from(json!({}))));
    }

    #[test]
    fn equality_with_object_entries() {
        let registry = Registry::new();
        let def = def(json!({ "a": "u8", "someField": "u16" }));
        let s = Struct::from_input(
            &registry,
            &def,
            Input::from(json!({ "a": 7, "someField": 300 })),
        )
        .unwrap();

        let matching = Input::object([
            ("some_field", Input::from(json!(300))),
            ("a", Input::from(json!(7))),
        ]);
        assert!(s.eq_input(&matching));

        let different = Input::object([
            ("a", Input::from(json!(7))),
            ("someField", Input::from(json!(301))),
        ]);
        assert!(!s.eq_input(&different));

        let missing = Input::object([("a", Input::from(json!(7)))]);
        assert!(!s.eq_input(&missing));
    }
}
