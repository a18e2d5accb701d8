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
use parity_scale_codec::Decode;
use serde_json::Value;

/// The empty type; encodes to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Null;

impl Codec for Null {
    fn raw_type(&self) -> String {
        "Null".into()
    }

    fn encode_to(&self, _out: &mut Vec<u8>) {}

    fn encoded_length(&self) -> usize {
        0
    }

    fn to_json(&self) -> Value {
        Value::Null
    }

    fn is_empty(&self) -> bool {
        true
    }

    fn eq_input(&self, other: &Input<'_>) -> bool {
        match other {
            Input::Default | Input::Json(Value::Null) => true,
            Input::Codec(codec) => codec.encoded_length() == 0,
            Input::Bytes(bytes) => bytes.is_empty(),
            _ => false,
        }
    }
}

/// A boolean, encoded as a single `0` or `1` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bool(pub bool);

impl Bool {
    /// The wrapped value.
    pub fn get(&self) -> bool {
        self.0
    }

    pub(crate) fn decode(cursor: &mut &[u8]) -> Result<Self, Error> {
        bool::decode(cursor)
            .map(Bool)
            .map_err(|e| Error::codec("bool", e))
    }

    pub(crate) fn from_input(input: Input<'_>) -> Result<Self, Error> {
        match input {
            Input::Default => Ok(Bool(false)),
            Input::Json(Value::Null) => Ok(Bool(false)),
            Input::Json(Value::Bool(b)) => Ok(Bool(b)),
            Input::Json(Value::Number(n)) => Ok(Bool(n.as_f64().is_some_and(|n| n != 0.0))),
            Input::Json(Value::String(s)) => match s.as_str() {
                "true" => Ok(Bool(true)),
                "false" | "" => Ok(Bool(false)),
                _ => Err(Error::invalid_value("bool", s, "expected true or false")),
            },
            other => Err(Error::invalid_value(
                "bool",
                other.describe(),
                "expected a boolean",
            )),
        }
    }
}

impl Codec for Bool {
    fn raw_type(&self) -> String {
        "bool".into()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        out.push(u8::from(self.0));
    }

    fn encoded_length(&self) -> usize {
        1
    }

    fn to_json(&self) -> Value {
        Value::Bool(self.0)
    }

    fn is_empty(&self) -> bool {
        !self.0
    }

    fn eq_input(&self, other: &Input<'_>) -> bool {
        match other {
            Input::Json(Value::Bool(b)) => *b == self.0,
            Input::Default => !self.0,
            Input::Bytes(bytes) => bytes.as_ref() == [u8::from(self.0)],
            Input::Codec(codec) => codec.to_u8a() == [u8::from(self.0)],
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn bool_roundtrips_and_rejects_invalid_bytes() {
        assert_eq!(Bool::decode(&mut &[1u8][..]).unwrap(), Bool(true));
        assert!(Bool::decode(&mut &[2u8][..]).is_err());
        assert_eq!(Bool(true).to_u8a(), vec![1]);
        assert_eq!(Bool::from_input(Input::from(true)).unwrap().to_json(), json!(true));
        assert!(Bool(false).eq_input(&Input::Default));
    }

    #[test]
    fn null_is_always_empty() {
        assert!(Null.to_u8a().is_empty());
        assert!(Null.is_empty());
        assert_eq!(Null.to_json(), Value::Null);
    }
}
