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

use super::{Codec, Input, take_bytes};
use crate::error::Error;
use serde_json::{Map, Value};
use std::sync::Arc;

/// The shape of a set of bit flags.
#[derive(Debug, Clone, PartialEq)]
pub struct SetDef {
    bit_length: u16,
    flags: Vec<(String, u64)>,
}

impl SetDef {
    /// Flags with their bit values, stored in an integer of `bit_length` bits.
    pub fn new(bit_length: u16, flags: Vec<(String, u64)>) -> Self {
        SetDef { bit_length, flags }
    }

    /// The bit length of the underlying integer.
    pub fn bit_length(&self) -> u16 {
        self.bit_length
    }

    /// The flags and their values.
    pub fn flags(&self) -> &[(String, u64)] {
        &self.flags
    }

    fn byte_len(&self) -> usize {
        usize::from(self.bit_length / 8)
    }

    fn all_bits(&self) -> u64 {
        self.flags.iter().fold(0, |acc, (_, bits)| acc | bits)
    }

    pub(crate) fn to_json_def(&self) -> Value {
        let mut flags = Map::new();
        flags.insert("_bitLength".into(), Value::from(self.bit_length));
        for (name, bits) in &self.flags {
            flags.insert(name.clone(), Value::from(*bits));
        }
        let mut def = Map::new();
        def.insert("_set".into(), Value::Object(flags));
        Value::Object(def)
    }

    /// The JSON definition string of this set.
    pub fn to_raw_json(&self) -> String {
        self.to_json_def().to_string()
    }
}

/// A set of bit flags, encoded as a little endian integer.
#[derive(Debug, Clone)]
pub struct Set {
    def: Arc<SetDef>,
    value: u64,
}

impl Set {
    /// The raw bits.
    pub fn bits(&self) -> u64 {
        self.value
    }

    /// Is the named flag set.
    pub fn is(&self, flag: &str) -> bool {
        self.def
            .flags
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(flag))
            .is_some_and(|(_, bits)| *bits != 0 && self.value & bits == *bits)
    }

    /// The names of the flags which are set.
    pub fn strings(&self) -> Vec<String> {
        self.def
            .flags
            .iter()
            .filter(|(_, bits)| *bits != 0 && self.value & bits == *bits)
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn checked(def: &Arc<SetDef>, value: u64) -> Result<Self, Error> {
        if value & !def.all_bits() != 0 {
            return Err(Error::invalid_value(
                def.to_raw_json(),
                value,
                "contains bits which are not flags of this set",
            ));
        }
        Ok(Set {
            def: def.clone(),
            value,
        })
    }

    pub(crate) fn decode(def: &Arc<SetDef>, cursor: &mut &[u8]) -> Result<Self, Error> {
        if def.byte_len() > 8 {
            return Err(Error::InvalidTypeDefinition {
                def: def.to_raw_json(),
                reason: "sets wider than 64 bits are not supported".into(),
            });
        }
        let bytes = take_bytes("Set", cursor, def.byte_len())?;
        let mut buf = [0u8; 8];
        buf[..bytes.len()].copy_from_slice(bytes);
        Set::checked(def, u64::from_le_bytes(buf))
    }

    pub(crate) fn from_input(def: &Arc<SetDef>, input: Input<'_>) -> Result<Self, Error> {
        let flag = |name: &str| {
            def.flags
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, bits)| *bits)
                .ok_or_else(|| Error::UnknownVariant {
                    ty: def.to_raw_json(),
                    variant: name.to_owned(),
                })
        };
        let value = match input {
            Input::Default | Input::Json(Value::Null) => 0,
            Input::Json(Value::Number(n)) => n
                .as_u64()
                .ok_or_else(|| Error::invalid_value(def.to_raw_json(), &n, "expected bits"))?,
            Input::Json(Value::String(name)) => flag(&name)?,
            Input::Json(Value::Array(names)) => {
                let mut value = 0;
                for name in &names {
                    let name = name.as_str().ok_or_else(|| {
                        Error::invalid_value(def.to_raw_json(), name, "expected a flag name")
                    })?;
                    value |= flag(name)?;
                }
                value
            }
            other => {
                return Err(Error::invalid_value(
                    def.to_raw_json(),
                    other.describe(),
                    "expected flag names",
                ));
            }
        };
        Set::checked(def, value)
    }
}

impl Codec for Set {
    fn raw_type(&self) -> String {
        self.def.to_raw_json()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        let le = self.value.to_le_bytes();
        let len = self.def.byte_len().min(8);
        out.extend_from_slice(&le[..len]);
    }

    fn to_json(&self) -> Value {
        Value::Array(self.strings().into_iter().map(Value::String).collect())
    }

    fn is_empty(&self) -> bool {
        self.value == 0
    }

    fn eq_input(&self, other: &Input<'_>) -> bool {
        match other {
            Input::Json(Value::Array(names)) => {
                let mut ours = self.strings();
                let mut theirs: Vec<String> = names
                    .iter()
                    .filter_map(|n| n.as_str().map(str::to_owned))
                    .collect();
                ours.sort();
                theirs.sort();
                ours == theirs
            }
            Input::Json(Value::Number(n)) => n.as_u64() == Some(self.value),
            Input::Default => self.value == 0,
            Input::Bytes(bytes) => bytes.as_ref() == self.to_u8a().as_slice(),
            Input::Codec(codec) => codec.to_u8a() == self.to_u8a(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn def() -> Arc<SetDef> {
        Arc::new(SetDef::new(
            16,
            vec![("Read".into(), 1), ("Write".into(), 2), ("Admin".into(), 256)],
        ))
    }

    #[test]
    fn sets_encode_flags_as_integers() {
        let set = Set::from_input(&def(), Input::from(json!(["Read", "Admin"]))).unwrap();
        assert_eq!(set.to_u8a(), vec![0x01, 0x01]);
        assert_eq!(set.to_json(), json!(["Read", "Admin"]));
        assert!(set.is("admin"));
        assert!(!set.is("Write"));
    }

    #[test]
    fn unknown_bits_are_rejected() {
        assert!(Set::decode(&def(), &mut &[0x04, 0x00][..]).is_err());
        assert!(Set::from_input(&def(), Input::from("Delete")).is_err());
        let decoded = Set::decode(&def(), &mut &[0x03, 0x00][..]).unwrap();
        assert!(decoded.eq_input(&Input::from(json!(["Write", "Read"]))));
    }
}
