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

use super::structs::type_json;
use super::{Codec, Input, take_bytes};
use crate::error::Error;
use crate::registry::Registry;
use crate::types::TypeDef;
use crate::utils::camel_case;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Placeholder variant names which only exist to pad indexes.
const UNUSED_PREFIX: &str = "__Unused";

/// A single variant of an enum.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDef {
    name: String,
    index: u8,
    ty: TypeDef,
}

impl VariantDef {
    /// A variant with the given discriminant and payload type.
    pub fn new(name: impl Into<String>, index: u8, ty: TypeDef) -> Self {
        VariantDef {
            name: name.into(),
            index,
            ty,
        }
    }

    /// The declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The encoded discriminant.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// The payload type; `Null` for variants without data.
    pub fn ty(&self) -> &TypeDef {
        &self.ty
    }

    fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || camel_case(&self.name) == name
    }
}

/// The shape of an enum: its variants in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumDef {
    variants: Vec<VariantDef>,
}

impl EnumDef {
    /// An enum of data carrying variants.
    pub fn new(variants: Vec<VariantDef>) -> Self {
        EnumDef {
            variants: variants
                .into_iter()
                .filter(|v| !v.name.starts_with(UNUSED_PREFIX))
                .collect(),
        }
    }

    /// A C-like enum, discriminants following declaration order. Fails
    /// when there are more names than discriminants.
    pub fn basic(names: Vec<String>) -> Result<Self, Error> {
        let count = names.len();
        let variants = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let idx = u8::try_from(idx).map_err(|_| Error::InvalidTypeDefinition {
                    def: format!("_enum of {count} variants"),
                    reason: "enums have at most 256 variants".into(),
                })?;
                Ok(VariantDef::new(name, idx, TypeDef::Null))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(EnumDef::new(variants))
    }

    /// A C-like enum with explicit discriminants, eg `{A: 5, B: 42}`.
    pub fn indexed(variants: Vec<(String, u8)>) -> Self {
        let variants = variants
            .into_iter()
            .map(|(name, idx)| VariantDef::new(name, idx, TypeDef::Null))
            .collect();
        EnumDef::new(variants)
    }

    /// The variants in declaration order.
    pub fn variants(&self) -> &[VariantDef] {
        &self.variants
    }

    /// Do no variants carry data.
    pub fn is_basic(&self) -> bool {
        self.variants.iter().all(|v| v.ty.is_null())
    }

    /// Find a variant by discriminant.
    pub fn by_index(&self, index: u8) -> Option<&VariantDef> {
        self.variants.iter().find(|v| v.index == index)
    }

    /// Find a variant by name, ignoring case.
    pub fn by_name(&self, name: &str) -> Option<&VariantDef> {
        self.variants.iter().find(|v| v.matches_name(name))
    }

    fn position(&self, variant: &VariantDef) -> usize {
        self.variants
            .iter()
            .position(|v| v.index == variant.index)
            .unwrap_or_default()
    }

    pub(crate) fn to_json_def(&self) -> Value {
        let mut sorted: Vec<&VariantDef> = self.variants.iter().collect();
        sorted.sort_by_key(|v| v.index);
        let contiguous = sorted.iter().enumerate().all(|(idx, v)| usize::from(v.index) == idx);

        let body = if self.is_basic() && contiguous {
            Value::Array(sorted.iter().map(|v| Value::String(v.name.clone())).collect())
        } else if self.is_basic() {
            let map: Map<String, Value> = sorted
                .iter()
                .map(|v| (v.name.clone(), Value::from(v.index)))
                .collect();
            Value::Object(map)
        } else {
            let mut map = Map::new();
            for v in sorted {
                for gap in map.len()..usize::from(v.index) {
                    map.insert(format!("{UNUSED_PREFIX}{gap}"), Value::String("Null".into()));
                }
                map.insert(v.name.clone(), type_json(&v.ty));
            }
            Value::Object(map)
        };

        let mut def = Map::new();
        def.insert("_enum".into(), body);
        Value::Object(def)
    }

    /// The JSON definition string of this enum.
    pub fn to_raw_json(&self) -> String {
        self.to_json_def().to_string()
    }
}

/// An enum value: a discriminant followed by the active variant's payload.
#[derive(Debug, Clone)]
pub struct Enum {
    def: Arc<EnumDef>,
    position: usize,
    value: Box<dyn Codec>,
}

impl Enum {
    /// Build an enum from a variant name and an already constructed payload.
    pub fn new(def: Arc<EnumDef>, variant: &str, value: Box<dyn Codec>) -> Result<Self, Error> {
        let found = def.by_name(variant).ok_or_else(|| Error::UnknownVariant {
            ty: def.to_raw_json(),
            variant: variant.to_owned(),
        })?;
        let position = def.position(found);
        Ok(Enum {
            def,
            position,
            value,
        })
    }

    /// Construct the variant with some discriminant from some input.
    pub fn with_index(
        registry: &Registry,
        def: &Arc<EnumDef>,
        index: u8,
        input: Input<'_>,
    ) -> Result<Self, Error> {
        let variant = def.by_index(index).ok_or_else(|| unknown_index(def, index))?;
        let value = variant.ty.construct(registry, input)?;
        Ok(Enum {
            def: def.clone(),
            position: def.position(variant),
            value,
        })
    }

    fn with_variant(
        registry: &Registry,
        def: &Arc<EnumDef>,
        name: &str,
        input: Input<'_>,
    ) -> Result<Self, Error> {
        let variant = def.by_name(name).ok_or_else(|| Error::UnknownVariant {
            ty: def.to_raw_json(),
            variant: name.to_owned(),
        })?;
        Enum::with_index(registry, def, variant.index, input)
    }

    /// The shape of this enum.
    pub fn def(&self) -> &Arc<EnumDef> {
        &self.def
    }

    fn variant(&self) -> &VariantDef {
        &self.def.variants[self.position]
    }

    /// The declared name of the active variant.
    pub fn variant_name(&self) -> &str {
        &self.variant().name
    }

    /// The discriminant of the active variant.
    pub fn index(&self) -> u8 {
        self.variant().index
    }

    /// The discriminant as a number; only meaningful for C-like enums.
    pub fn to_number(&self) -> u8 {
        self.index()
    }

    /// The payload of the active variant.
    pub fn value(&self) -> &dyn Codec {
        self.value.as_ref()
    }

    /// Take the payload of the active variant.
    pub fn into_value(self) -> Box<dyn Codec> {
        self.value
    }

    /// Is this a C-like enum.
    pub fn is_basic(&self) -> bool {
        self.def.is_basic()
    }

    /// Is the named variant active.
    pub fn is(&self, variant: &str) -> bool {
        self.variant().matches_name(variant)
    }

    /// The payload of the named variant, failing if another variant is active.
    pub fn as_variant(&self, variant: &str) -> Result<&dyn Codec, Error> {
        if self.is(variant) {
            Ok(self.value())
        } else {
            Err(Error::InvalidVariantAccess {
                active: self.variant_name().to_owned(),
                requested: variant.to_owned(),
            })
        }
    }

    pub(crate) fn decode(
        registry: &Registry,
        def: &Arc<EnumDef>,
        cursor: &mut &[u8],
    ) -> Result<Self, Error> {
        let index = take_bytes("Enum", cursor, 1)?[0];
        let variant = def.by_index(index).ok_or_else(|| unknown_index(def, index))?;
        let value = variant.ty.decode(registry, cursor)?;
        Ok(Enum {
            def: def.clone(),
            position: def.position(variant),
            value,
        })
    }

    pub(crate) fn from_input(
        registry: &Registry,
        def: &Arc<EnumDef>,
        input: Input<'_>,
    ) -> Result<Self, Error> {
        match input {
            Input::Default | Input::Json(Value::Null) => {
                let first = def.variants.first().ok_or_else(|| Error::UnknownVariant {
                    ty: def.to_raw_json(),
                    variant: "<empty>".into(),
                })?;
                Enum::with_index(registry, def, first.index, Input::Default)
            }
            Input::Json(Value::Number(n)) => {
                let index = n
                    .as_u64()
                    .and_then(|i| u8::try_from(i).ok())
                    .ok_or_else(|| Error::invalid_value(def.to_raw_json(), &n, "invalid index"))?;
                Enum::with_index(registry, def, index, Input::Default)
            }
            Input::Json(Value::String(name)) => {
                Enum::with_variant(registry, def, &name, Input::Default)
            }
            Input::Json(Value::Object(map)) if map.len() == 1 => {
                let mut entries = map.into_iter();
                match entries.next() {
                    Some((name, value)) => {
                        Enum::with_variant(registry, def, &name, Input::Json(value))
                    }
                    None => Enum::from_input(registry, def, Input::Default),
                }
            }
            Input::Object(mut entries) if entries.len() == 1 => {
                let (name, value) = entries.remove(0);
                Enum::with_variant(registry, def, &name, value)
            }
            Input::Codec(existing) => Enum::from_codec(registry, def, existing),
            other => Err(Error::invalid_value(
                def.to_raw_json(),
                other.describe(),
                "expected an index, a variant name or {variant: value}",
            )),
        }
    }

    // Another enum contributes its index and payload; any other value picks
    // the variant whose payload type it is an instance of.
    fn from_codec(
        registry: &Registry,
        def: &Arc<EnumDef>,
        existing: Box<dyn Codec>,
    ) -> Result<Self, Error> {
        if existing.is::<Enum>() {
            if let Some(other) = existing.downcast::<Enum>() {
                let index = other.index();
                return Enum::with_index(registry, def, index, Input::Codec(other.value));
            }
            return Err(Error::UnknownType("Enum".into()));
        }

        let raw = existing.raw_type();
        let inferred = def.variants.iter().find(|v| {
            v.ty.to_string() == raw
                || registry
                    .resolve_def(&v.ty)
                    .is_ok_and(|resolved| resolved.to_string() == raw)
        });
        match inferred {
            Some(variant) => Ok(Enum {
                def: def.clone(),
                position: def.position(variant),
                value: existing,
            }),
            None => Enum::decode(registry, def, &mut existing.to_u8a().as_slice()),
        }
    }

    fn render(&self, key: String, value: Value) -> Value {
        let mut map = Map::new();
        map.insert(key, value);
        Value::Object(map)
    }
}

fn unknown_index(def: &EnumDef, index: u8) -> Error {
    Error::UnknownVariant {
        ty: def.to_raw_json(),
        variant: format!("index {index}"),
    }
}

impl Codec for Enum {
    fn raw_type(&self) -> String {
        self.def.to_raw_json()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        out.push(self.index());
        self.value.encode_to(out);
    }

    fn encoded_length(&self) -> usize {
        1 + self.value.encoded_length()
    }

    fn to_json(&self) -> Value {
        if self.is_basic() {
            return Value::String(self.variant_name().to_owned());
        }
        self.render(camel_case(self.variant_name()), self.value.to_json())
    }

    fn to_human(&self) -> Value {
        if self.is_basic() {
            return Value::String(self.variant_name().to_owned());
        }
        self.render(self.variant_name().to_owned(), self.value.to_human())
    }

    fn to_primitive(&self) -> Value {
        if self.is_basic() {
            return Value::String(self.variant_name().to_owned());
        }
        self.render(camel_case(self.variant_name()), self.value.to_primitive())
    }

    fn is_empty(&self) -> bool {
        self.position == 0 && self.value.is_empty()
    }

    fn eq_input(&self, other: &Input<'_>) -> bool {
        match other {
            Input::Json(Value::Number(n)) => n.as_u64() == Some(u64::from(self.index())),
            Input::Json(Value::String(s)) if !crate::utils::is_hex(s) => self.is(s),
            Input::Json(Value::Object(map)) if map.len() == 1 => map
                .iter()
                .next()
                .is_some_and(|(k, v)| self.is(k) && self.value.eq_input(&Input::Json(v.clone()))),
            Input::Object(entries) if entries.len() == 1 => {
                self.is(&entries[0].0) && self.value.eq_input(&entries[0].1)
            }
            Input::Codec(codec) => match codec.downcast_ref::<Enum>() {
                Some(other) => {
                    other.index() == self.index() && other.value.to_u8a() == self.value.to_u8a()
                }
                None => codec.to_u8a() == self.to_u8a(),
            },
            Input::Default => self.is_empty(),
            Input::Bytes(bytes) => bytes.as_ref() == self.to_u8a().as_slice(),
            Input::Hex(hex) => crate::utils::from_hex(hex).is_ok_and(|b| b == self.to_u8a()),
            Input::Json(Value::String(s)) => {
                crate::utils::from_hex(s).is_ok_and(|b| b == self.to_u8a())
            }
            _ => false,
        }
    }
}
