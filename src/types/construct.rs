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

use super::TypeDef;
use crate::codec::{
    BTreeMapCodec, BTreeSetCodec, BitVec, Bool, Bytes, Codec, Compact, Enum, Input, Int, Null,
    OptionCodec, ResultCodec, Set, Struct, Text, Tuple, U8aFixed, VecCodec, VecFixed,
};
use crate::error::Error;
use crate::registry::Registry;
use crate::utils::from_hex;

fn boxed<T: Codec>(value: T) -> Box<dyn Codec> {
    Box::new(value)
}

impl TypeDef {
    /// Decode a value of this type from the front of the cursor.
    pub fn decode(&self, registry: &Registry, cursor: &mut &[u8]) -> Result<Box<dyn Codec>, Error> {
        match self {
            TypeDef::Null => Ok(boxed(Null)),
            TypeDef::Bool => Bool::decode(cursor).map(boxed),
            TypeDef::Int(kind) => Int::decode(*kind, cursor).map(boxed),
            TypeDef::Compact(inner) => Compact::decode(registry, inner, cursor).map(boxed),
            TypeDef::Text => Text::decode(cursor).map(boxed),
            TypeDef::Bytes => Bytes::decode(cursor).map(boxed),
            TypeDef::U8aFixed(len) => U8aFixed::decode(*len, cursor).map(boxed),
            TypeDef::BitVec => BitVec::decode(cursor).map(boxed),
            TypeDef::Vec(inner) => VecCodec::decode(registry, inner, cursor).map(boxed),
            TypeDef::VecFixed(inner, len) => {
                VecFixed::decode(registry, inner, *len, cursor).map(boxed)
            }
            TypeDef::Tuple(fields) => Tuple::decode(registry, fields, cursor).map(boxed),
            TypeDef::Option(inner) => OptionCodec::decode(registry, inner, cursor).map(boxed),
            TypeDef::Result(ok, err) => ResultCodec::decode(registry, ok, err, cursor).map(boxed),
            TypeDef::BTreeMap(k, v) => BTreeMapCodec::decode(registry, k, v, cursor).map(boxed),
            TypeDef::BTreeSet(v) => BTreeSetCodec::decode(registry, v, cursor).map(boxed),
            TypeDef::Struct(def) => Struct::decode(registry, def, cursor).map(boxed),
            TypeDef::Enum(def) => Enum::decode(registry, def, cursor).map(boxed),
            TypeDef::Set(def) => Set::decode(def, cursor).map(boxed),
            TypeDef::Named(_) | TypeDef::Lookup(_) => match registry.alias_target(self)? {
                TypeDef::Lookup(id) => registry.decode_lookup(id, cursor),
                def => def.decode(registry, cursor),
            },
            TypeDef::Native(native) => native.decode(registry, cursor),
            TypeDef::DoNotConstruct(name) => Err(do_not_construct(name)),
        }
    }

    /// Decode a value of this type which must span exactly the given bytes.
    pub fn decode_all(&self, registry: &Registry, bytes: &[u8]) -> Result<Box<dyn Codec>, Error> {
        let cursor = &mut &*bytes;
        let value = self.decode(registry, cursor)?;
        if !cursor.is_empty() {
            return Err(Error::DecodeLength {
                ty: self.to_string(),
                expected: bytes.len() - cursor.len(),
                found: bytes.len(),
            });
        }
        Ok(value)
    }

    /// Construct a value of this type from some input.
    pub fn construct(&self, registry: &Registry, input: Input<'_>) -> Result<Box<dyn Codec>, Error> {
        match self {
            TypeDef::Named(_) | TypeDef::Lookup(_) => {
                return registry.resolve_def(self)?.construct(registry, input);
            }
            TypeDef::Native(native) => return native.construct(registry, input),
            TypeDef::DoNotConstruct(name) => return Err(do_not_construct(name)),
            _ => {}
        }

        match input.normalize_hex() {
            Input::Bytes(bytes) => self.decode(registry, &mut bytes.as_ref()),
            Input::Hex(hex) => self.construct_from_hex(registry, &from_hex(&hex)?),
            Input::Codec(existing) if self.is_instance(&*existing) => Ok(existing),
            input => self.construct_from_value(registry, input),
        }
    }

    /// Construct the default (zero) value of this type.
    pub fn default_value(&self, registry: &Registry) -> Result<Box<dyn Codec>, Error> {
        self.construct(registry, Input::Default)
    }

    /// Does hex input hold the SCALE encoding of this type, as opposed to
    /// raw content (bytes and text) or a big endian number (integers).
    pub(crate) fn hex_is_scale(&self) -> bool {
        !matches!(
            self,
            TypeDef::Int(_)
                | TypeDef::Compact(_)
                | TypeDef::Text
                | TypeDef::Bytes
                | TypeDef::BitVec
                | TypeDef::U8aFixed(_)
        )
    }

    fn construct_from_hex(&self, registry: &Registry, bytes: &[u8]) -> Result<Box<dyn Codec>, Error> {
        match self {
            TypeDef::Int(kind) => Int::from_be_bytes(*kind, bytes).map(boxed),
            TypeDef::Compact(inner) => Compact::from_be_bytes(registry, inner, bytes).map(boxed),
            TypeDef::Text => Text::from_raw(bytes.to_vec()).map(boxed),
            TypeDef::Bytes => Ok(boxed(Bytes::new(bytes.to_vec()))),
            TypeDef::BitVec => Ok(boxed(BitVec::from_raw(bytes.to_vec()))),
            TypeDef::U8aFixed(len) => U8aFixed::from_raw(*len, bytes.to_vec()).map(boxed),
            _ => self.decode(registry, &mut &*bytes),
        }
    }

    fn construct_from_value(
        &self,
        registry: &Registry,
        input: Input<'_>,
    ) -> Result<Box<dyn Codec>, Error> {
        // Existing values of some other type are re-decoded from their bytes,
        // except where the type can wrap them as they are.
        let input = match (self, input) {
            (TypeDef::Enum(_) | TypeDef::Option(_), input) => input,
            (_, Input::Codec(existing)) => {
                return self.decode_all(registry, &existing.to_u8a());
            }
            (_, input) => input,
        };

        match self {
            TypeDef::Null => Ok(boxed(Null)),
            TypeDef::Bool => Bool::from_input(input).map(boxed),
            TypeDef::Int(kind) => Int::from_input(*kind, input).map(boxed),
            TypeDef::Compact(inner) => Compact::from_input(registry, inner, input).map(boxed),
            TypeDef::Text => Text::from_input(input).map(boxed),
            TypeDef::Bytes => Bytes::from_input(input).map(boxed),
            TypeDef::U8aFixed(len) => U8aFixed::from_input(*len, input).map(boxed),
            TypeDef::BitVec => BitVec::from_input(input).map(boxed),
            TypeDef::Vec(inner) => VecCodec::from_input(registry, inner, input).map(boxed),
            TypeDef::VecFixed(inner, len) => {
                VecFixed::from_input(registry, inner, *len, input).map(boxed)
            }
            TypeDef::Tuple(fields) => Tuple::from_input(registry, fields, input).map(boxed),
            TypeDef::Option(inner) => OptionCodec::from_input(registry, inner, input).map(boxed),
            TypeDef::Result(ok, err) => {
                ResultCodec::from_input(registry, ok, err, input).map(boxed)
            }
            TypeDef::BTreeMap(k, v) => BTreeMapCodec::from_input(registry, k, v, input).map(boxed),
            TypeDef::BTreeSet(v) => BTreeSetCodec::from_input(registry, v, input).map(boxed),
            TypeDef::Struct(def) => Struct::from_input(registry, def, input).map(boxed),
            TypeDef::Enum(def) => Enum::from_input(registry, def, input).map(boxed),
            TypeDef::Set(def) => Set::from_input(def, input).map(boxed),
            TypeDef::Named(_)
            | TypeDef::Lookup(_)
            | TypeDef::Native(_)
            | TypeDef::DoNotConstruct(_) => self.construct(registry, input),
        }
    }

    /// Is the given value already an instance of this type.
    pub(crate) fn is_instance(&self, existing: &dyn Codec) -> bool {
        existing.raw_type() == self.to_string()
    }
}

fn do_not_construct(name: &str) -> Error {
    Error::UnknownType(format!("DoNotConstruct<{name}>"))
}
