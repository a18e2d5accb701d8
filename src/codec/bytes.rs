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

//! Byte-like codecs: length prefixed bytes and text, fixed length byte
//! arrays and bit sequences.

use super::{Codec, Input, decode_length, encode_length, take_bytes};
use crate::error::Error;
use crate::utils::{from_hex, to_hex};
use serde_json::Value;

/// Printable ASCII renders as text, anything else as hex.
fn raw_primitive(bytes: &[u8]) -> Value {
    let printable = !bytes.is_empty()
        && bytes
            .iter()
            .all(|b| b.is_ascii_graphic() || matches!(b, b' ' | b'\t' | b'\n' | b'\r'));
    if printable {
        Value::String(String::from_utf8_lossy(bytes).into_owned())
    } else {
        Value::String(to_hex(bytes))
    }
}

/// Raw byte content from JSON: an array of numbers or a plain string.
fn json_bytes(ty: &str, value: Value) -> Result<Vec<u8>, Error> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(s.into_bytes()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| Error::invalid_value(ty, item, "expected a byte"))
            })
            .collect(),
        other => Err(Error::invalid_value(ty, other, "expected bytes")),
    }
}

fn eq_raw(content: &[u8], encoded: &[u8], other: &Input<'_>) -> bool {
    match other {
        Input::Default => content.is_empty() || content.iter().all(|b| *b == 0),
        Input::Bytes(bytes) => bytes.as_ref() == encoded,
        Input::Hex(hex) => from_hex(hex).is_ok_and(|b| b == content),
        Input::Json(Value::String(s)) => {
            s.as_bytes() == content || from_hex(s).is_ok_and(|b| b == content)
        }
        Input::Codec(codec) => codec.to_u8a() == encoded,
        _ => false,
    }
}

/// A UTF-8 string, encoded with a compact length prefix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Text(String);

impl Text {
    /// Wrap a string.
    pub fn new(text: impl Into<String>) -> Self {
        Text(text.into())
    }

    /// The wrapped string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Construct from raw UTF-8 content.
    pub fn from_raw(bytes: Vec<u8>) -> Result<Self, Error> {
        String::from_utf8(bytes)
            .map(Text)
            .map_err(|e| Error::invalid_value("Text", to_hex(e.as_bytes()), "invalid UTF-8"))
    }

    pub(crate) fn decode(cursor: &mut &[u8]) -> Result<Self, Error> {
        let len = decode_length("Text", cursor)?;
        let bytes = take_bytes("Text", cursor, len)?;
        Text::from_raw(bytes.to_vec())
    }

    pub(crate) fn from_input(input: Input<'_>) -> Result<Self, Error> {
        match input {
            Input::Default | Input::Json(Value::Null) => Ok(Text::default()),
            Input::Json(Value::String(s)) => Ok(Text(s)),
            Input::Json(Value::Array(items)) => {
                Text::from_raw(json_bytes("Text", Value::Array(items))?)
            }
            Input::Json(other) => Ok(Text(other.to_string())),
            other => Err(Error::invalid_value("Text", other.describe(), "expected a string")),
        }
    }
}

impl Codec for Text {
    fn raw_type(&self) -> String {
        "Text".into()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        encode_length(self.0.len(), out);
        out.extend_from_slice(self.0.as_bytes());
    }

    fn to_json(&self) -> Value {
        Value::String(self.0.clone())
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn eq_input(&self, other: &Input<'_>) -> bool {
        match other {
            Input::Json(Value::String(s)) => *s == self.0,
            other => eq_raw(self.0.as_bytes(), &self.to_u8a(), other),
        }
    }
}

/// Arbitrary bytes, encoded with a compact length prefix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    /// Wrap some bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }

    /// The wrapped bytes, without the length prefix.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Take the wrapped bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    pub(crate) fn decode(cursor: &mut &[u8]) -> Result<Self, Error> {
        let len = decode_length("Bytes", cursor)?;
        take_bytes("Bytes", cursor, len).map(|b| Bytes(b.to_vec()))
    }

    pub(crate) fn from_input(input: Input<'_>) -> Result<Self, Error> {
        match input {
            Input::Default => Ok(Bytes::default()),
            Input::Json(value) => json_bytes("Bytes", value).map(Bytes),
            other => Err(Error::invalid_value("Bytes", other.describe(), "expected bytes")),
        }
    }
}

impl Codec for Bytes {
    fn raw_type(&self) -> String {
        "Bytes".into()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        encode_length(self.0.len(), out);
        out.extend_from_slice(&self.0);
    }

    fn to_json(&self) -> Value {
        Value::String(to_hex(&self.0))
    }

    fn to_human(&self) -> Value {
        raw_primitive(&self.0)
    }

    fn to_primitive(&self) -> Value {
        raw_primitive(&self.0)
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn eq_input(&self, other: &Input<'_>) -> bool {
        eq_raw(&self.0, &self.to_u8a(), other)
    }
}

/// A fixed length byte array, `[u8; N]`, encoded without a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct U8aFixed(Vec<u8>);

impl U8aFixed {
    /// Wrap some bytes; the length of the array is the number of bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        U8aFixed(bytes)
    }

    /// An array of zeroes.
    pub fn zero(len: usize) -> Self {
        U8aFixed(vec![0; len])
    }

    /// The wrapped bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Construct from raw content which must be exactly `len` bytes, or empty.
    pub fn from_raw(len: usize, bytes: Vec<u8>) -> Result<Self, Error> {
        if bytes.is_empty() {
            return Ok(U8aFixed::zero(len));
        }
        if bytes.len() != len {
            return Err(Error::DecodeLength {
                ty: format!("[u8;{len}]"),
                expected: len,
                found: bytes.len(),
            });
        }
        Ok(U8aFixed(bytes))
    }

    pub(crate) fn decode(len: usize, cursor: &mut &[u8]) -> Result<Self, Error> {
        take_bytes(&format!("[u8;{len}]"), cursor, len).map(|b| U8aFixed(b.to_vec()))
    }

    pub(crate) fn from_input(len: usize, input: Input<'_>) -> Result<Self, Error> {
        match input {
            Input::Default => Ok(U8aFixed::zero(len)),
            Input::Json(value) => U8aFixed::from_raw(len, json_bytes(&format!("[u8;{len}]"), value)?),
            other => Err(Error::invalid_value(
                format!("[u8;{len}]"),
                other.describe(),
                "expected bytes",
            )),
        }
    }
}

impl Codec for U8aFixed {
    fn raw_type(&self) -> String {
        format!("[u8;{}]", self.0.len())
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }

    fn encoded_length(&self) -> usize {
        self.0.len()
    }

    fn to_json(&self) -> Value {
        Value::String(to_hex(&self.0))
    }

    fn to_primitive(&self) -> Value {
        raw_primitive(&self.0)
    }

    fn eq_input(&self, other: &Input<'_>) -> bool {
        eq_raw(&self.0, &self.0, other)
    }
}

/// A sequence of bits, encoded as a compact bit count then the packed bytes
/// (least significant bit first).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitVec {
    bit_len: usize,
    bytes: Vec<u8>,
}

impl BitVec {
    /// Every bit of the given bytes.
    pub fn from_raw(bytes: Vec<u8>) -> Self {
        BitVec {
            bit_len: bytes.len() * 8,
            bytes,
        }
    }

    /// Pack a list of bits.
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut bytes = vec![0u8; bits.len().div_ceil(8)];
        for (idx, bit) in bits.iter().enumerate() {
            if *bit {
                bytes[idx / 8] |= 1 << (idx % 8);
            }
        }
        BitVec {
            bit_len: bits.len(),
            bytes,
        }
    }

    /// The number of bits.
    pub fn len(&self) -> usize {
        self.bit_len
    }

    /// The individual bits.
    pub fn bits(&self) -> Vec<bool> {
        (0..self.bit_len)
            .map(|idx| self.bytes[idx / 8] & (1 << (idx % 8)) != 0)
            .collect()
    }

    pub(crate) fn decode(cursor: &mut &[u8]) -> Result<Self, Error> {
        let bit_len = decode_length("BitVec", cursor)?;
        let bytes = take_bytes("BitVec", cursor, bit_len.div_ceil(8))?;
        Ok(BitVec {
            bit_len,
            bytes: bytes.to_vec(),
        })
    }

    pub(crate) fn from_input(input: Input<'_>) -> Result<Self, Error> {
        match input {
            Input::Default | Input::Json(Value::Null) => Ok(BitVec::default()),
            Input::Json(Value::Array(items)) if items.iter().all(Value::is_boolean) => {
                let bits: Vec<bool> = items.iter().filter_map(Value::as_bool).collect();
                Ok(BitVec::from_bits(&bits))
            }
            Input::Json(value) => Ok(BitVec::from_raw(json_bytes("BitVec", value)?)),
            other => Err(Error::invalid_value("BitVec", other.describe(), "expected bits")),
        }
    }
}

impl Codec for BitVec {
    fn raw_type(&self) -> String {
        "BitVec".into()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        encode_length(self.bit_len, out);
        out.extend_from_slice(&self.bytes);
    }

    fn to_json(&self) -> Value {
        Value::String(to_hex(&self.bytes))
    }

    fn to_human(&self) -> Value {
        let groups: Vec<String> = self.bytes.iter().map(|b| format!("{b:08b}")).collect();
        Value::String(format!("0b{}", groups.join("_")))
    }

    fn is_empty(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }

    fn eq_input(&self, other: &Input<'_>) -> bool {
        eq_raw(&self.bytes, &self.to_u8a(), other)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_is_length_prefixed_utf8() {
        let text = Text::new("hello");
        assert_eq!(text.to_u8a(), b"\x14hello".to_vec());
        assert_eq!(Text::decode(&mut &b"\x14hello"[..]).unwrap(), text);
        assert!(Text::decode(&mut &[0x04, 0xff][..]).is_err());
        assert!(text.eq_input(&Input::from("hello")));
    }

    #[test]
    fn bytes_render_printable_content_as_text() {
        let bytes = Bytes::new(b"abc".to_vec());
        assert_eq!(bytes.to_json(), json!("0x616263"));
        assert_eq!(bytes.to_human(), json!("abc"));
        assert_eq!(Bytes::new(vec![0, 1]).to_human(), json!("0x0001"));
    }

    #[test]
    fn bytes_fail_on_short_input() {
        let res = Bytes::decode(&mut &[0x0c, 0x01][..]);
        assert!(matches!(
            res,
            Err(Error::DecodeLength {
                expected: 3,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn fixed_arrays_need_exact_lengths() {
        assert_eq!(U8aFixed::from_raw(4, vec![]).unwrap(), U8aFixed::zero(4));
        assert!(U8aFixed::from_raw(4, vec![1, 2]).is_err());
        let arr = U8aFixed::decode(2, &mut &[1u8, 2, 3][..]).unwrap();
        assert_eq!(arr.to_json(), json!("0x0102"));
        assert_eq!(arr.raw_type(), "[u8;2]");
    }

    #[test]
    fn bitvec_keeps_exact_bit_length() {
        let bits = BitVec::decode(&mut &[0x14, 0b0001_0101][..]).unwrap();
        assert_eq!(bits.len(), 5);
        assert_eq!(bits.bits(), vec![true, false, true, false, true]);
        assert_eq!(bits.to_u8a(), vec![0x14, 0b0001_0101]);
        assert_eq!(bits.to_human(), json!("0b00010101"));
        assert_eq!(BitVec::from_bits(&[true, false, true, false, true]), bits);
    }
}
