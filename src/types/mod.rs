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

mod construct;
mod json;
mod native;
mod parse;

pub use json::parse_definition;
pub use native::{NativeClass, NativeCodec};
pub use parse::{parse_type, sanitize, split_top_level};

use crate::codec::{EnumDef, IntKind, SetDef, StructDef};
use std::sync::Arc;

/// The shape of a type: everything needed to decode, encode and construct
/// values of it.
///
/// Named types and metadata lookup types are referenced by [`TypeDef::Named`]
/// and [`TypeDef::Lookup`] and only resolved through the registry when a
/// value is constructed, which allows recursive definitions.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDef {
    /// `Null` or `()`; encodes to nothing.
    Null,
    /// `bool`.
    Bool,
    /// `u8` to `u256` and `i8` to `i256`.
    Int(IntKind),
    /// `Compact<T>`.
    Compact(Box<TypeDef>),
    /// `Text`, a compact length prefixed UTF-8 string.
    Text,
    /// `Bytes`, ie `Vec<u8>`.
    Bytes,
    /// `[u8; N]`.
    U8aFixed(usize),
    /// `BitVec`, a compact bit length followed by the packed bits.
    BitVec,
    /// `Vec<T>`.
    Vec(Box<TypeDef>),
    /// `[T; N]`.
    VecFixed(Box<TypeDef>, usize),
    /// `(A, B, ..)`.
    Tuple(Vec<TypeDef>),
    /// `Option<T>`.
    Option(Box<TypeDef>),
    /// `Result<T, E>`.
    Result(Box<TypeDef>, Box<TypeDef>),
    /// `BTreeMap<K, V>`.
    BTreeMap(Box<TypeDef>, Box<TypeDef>),
    /// `BTreeSet<T>`.
    BTreeSet(Box<TypeDef>),
    /// A struct with ordered, named fields.
    Struct(Arc<StructDef>),
    /// An enum.
    Enum(Arc<EnumDef>),
    /// A set of bit flags.
    Set(Arc<SetDef>),
    /// A type registered by name.
    Named(String),
    /// A type in the metadata lookup table.
    Lookup(u32),
    /// A hand written codec.
    Native(NativeClass),
    /// A type which exists in definitions but cannot be constructed.
    DoNotConstruct(String),
}

impl TypeDef {
    /// Parse a type string such as `Vec<(u32, Compact<Balance>)>`.
    pub fn parse(s: &str) -> Result<TypeDef, crate::Error> {
        parse_type(s)
    }

    /// Shorthand for an unsigned integer of the given bit length.
    pub fn uint(bits: u16) -> TypeDef {
        TypeDef::Int(IntKind::unsigned(bits))
    }

    /// Shorthand for a named type.
    pub fn named(name: impl Into<String>) -> TypeDef {
        TypeDef::Named(name.into())
    }

    /// Is this `Null`, or an empty tuple.
    pub fn is_null(&self) -> bool {
        match self {
            TypeDef::Null => true,
            TypeDef::Tuple(fields) => fields.is_empty(),
            _ => false,
        }
    }
}

impl core::fmt::Display for TypeDef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TypeDef::Null => f.write_str("Null"),
            TypeDef::Bool => f.write_str("bool"),
            TypeDef::Int(kind) => write!(f, "{kind}"),
            TypeDef::Compact(inner) => write!(f, "Compact<{inner}>"),
            TypeDef::Text => f.write_str("Text"),
            TypeDef::Bytes => f.write_str("Bytes"),
            TypeDef::U8aFixed(len) => write!(f, "[u8;{len}]"),
            TypeDef::BitVec => f.write_str("BitVec"),
            TypeDef::Vec(inner) => write!(f, "Vec<{inner}>"),
            TypeDef::VecFixed(inner, len) => write!(f, "[{inner};{len}]"),
            TypeDef::Tuple(fields) => {
                f.write_str("(")?;
                for (idx, field) in fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str(")")
            }
            TypeDef::Option(inner) => write!(f, "Option<{inner}>"),
            TypeDef::Result(ok, err) => write!(f, "Result<{ok},{err}>"),
            TypeDef::BTreeMap(k, v) => write!(f, "BTreeMap<{k},{v}>"),
            TypeDef::BTreeSet(v) => write!(f, "BTreeSet<{v}>"),
            TypeDef::Struct(def) => write!(f, "{}", def.to_raw_json()),
            TypeDef::Enum(def) => write!(f, "{}", def.to_raw_json()),
            TypeDef::Set(def) => write!(f, "{}", def.to_raw_json()),
            TypeDef::Named(name) => f.write_str(name),
            TypeDef::Lookup(id) => write!(f, "Lookup{id}"),
            TypeDef::Native(native) => f.write_str(native.name()),
            TypeDef::DoNotConstruct(name) => write!(f, "DoNotConstruct<{name}>"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_roundtrips_through_parse() {
        let defs = [
            "Vec<u32>",
            "(u8,Compact<u128>)",
            "Option<Bytes>",
            "[u8;32]",
            "[u16;4]",
            "BTreeMap<Text,u64>",
            "Result<Null,Text>",
            "Lookup12",
            r#"{"a":"u32","b":"Text"}"#,
            r#"{"_enum":["A","B"]}"#,
            r#"{"_enum":{"A":"u32","B":"Null"}}"#,
        ];
        for def in defs {
            let parsed = TypeDef::parse(def).unwrap();
            let reparsed = TypeDef::parse(&parsed.to_string()).unwrap();
            assert_eq!(parsed, reparsed, "{def}");
        }
    }
}
