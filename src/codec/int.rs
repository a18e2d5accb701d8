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
use crate::registry::Registry;
use crate::types::TypeDef;
use crate::utils::{format_number, to_hex};
use parity_scale_codec::{Compact as ScaleCompact, Decode, Encode};
use serde_json::Value;

/// Largest integer which JSON consumers can represent exactly.
const MAX_SAFE_INTEGER: u128 = (1 << 53) - 1;

/// The width and signedness of an integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntKind {
    /// Bit length; one of 8, 16, 32, 64, 128 or 256.
    pub bits: u16,
    /// Is this a signed (two's complement) integer.
    pub signed: bool,
}

impl IntKind {
    /// An unsigned integer kind.
    pub const fn unsigned(bits: u16) -> Self {
        IntKind {
            bits,
            signed: false,
        }
    }

    /// A signed integer kind.
    pub const fn signed(bits: u16) -> Self {
        IntKind { bits, signed: true }
    }

    /// Parse a primitive name like `u32` or `i128`.
    pub fn from_name(name: &str) -> Option<Self> {
        let (signed, bits) = match name.as_bytes().first()? {
            b'u' => (false, &name[1..]),
            b'i' => (true, &name[1..]),
            _ => return None,
        };
        let bits: u16 = bits.parse().ok()?;
        matches!(bits, 8 | 16 | 32 | 64 | 128 | 256).then_some(IntKind { bits, signed })
    }

    /// Number of bytes in the fixed width encoding.
    pub fn byte_len(&self) -> usize {
        usize::from(self.bits / 8)
    }
}

impl core::fmt::Display for IntKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let prefix = if self.signed { 'i' } else { 'u' };
        write!(f, "{prefix}{}", self.bits)
    }
}

/// A fixed width integer, `u8` to `u256` or `i8` to `i256`.
///
/// Values are held as little endian (two's complement) bytes of the full
/// width, so 256 bit integers need no special casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Int {
    kind: IntKind,
    le: Vec<u8>,
}

impl Int {
    /// The zero value of some integer kind.
    pub fn zero(kind: IntKind) -> Self {
        Int {
            kind,
            le: vec![0; kind.byte_len()],
        }
    }

    /// An integer from an unsigned value, failing if it doesn't fit.
    pub fn from_u128(kind: IntKind, value: u128) -> Result<Self, Error> {
        let le = value.to_le_bytes();
        let width = kind.byte_len();
        let fits = if width >= 16 {
            !kind.signed || width > 16 || value >> 127 == 0
        } else {
            let limit_bits = u32::from(kind.bits) - u32::from(kind.signed);
            value >> limit_bits == 0
        };
        if !fits {
            return Err(out_of_range(kind, value));
        }
        let mut bytes = vec![0; width];
        let copy = width.min(16);
        bytes[..copy].copy_from_slice(&le[..copy]);
        Ok(Int { kind, le: bytes })
    }

    /// An integer from a signed value, failing if it doesn't fit.
    pub fn from_i128(kind: IntKind, value: i128) -> Result<Self, Error> {
        if value >= 0 {
            return Int::from_u128(kind, value as u128);
        }
        if !kind.signed {
            return Err(out_of_range(kind, value));
        }
        let width = kind.byte_len();
        if width < 16 {
            let min = -(1i128 << (kind.bits - 1));
            if value < min {
                return Err(out_of_range(kind, value));
            }
        }
        let le = value.to_le_bytes();
        let mut bytes = vec![0xff; width];
        let copy = width.min(16);
        bytes[..copy].copy_from_slice(&le[..copy]);
        Ok(Int { kind, le: bytes })
    }

    /// Construct from a big endian byte representation, as found in hex strings.
    pub fn from_be_bytes(kind: IntKind, be: &[u8]) -> Result<Self, Error> {
        let width = kind.byte_len();
        let significant = be.iter().skip_while(|b| **b == 0).count();
        if significant > width {
            return Err(Error::invalid_value(
                kind.to_string(),
                to_hex(be),
                format!("more than {width} bytes"),
            ));
        }
        let mut le: Vec<u8> = be.iter().rev().copied().take(width).collect();
        le.resize(width, 0);
        Ok(Int { kind, le })
    }

    pub(crate) fn decode(kind: IntKind, cursor: &mut &[u8]) -> Result<Self, Error> {
        let bytes = take_bytes(&kind.to_string(), cursor, kind.byte_len())?;
        Ok(Int {
            kind,
            le: bytes.to_vec(),
        })
    }

    pub(crate) fn from_input(kind: IntKind, input: Input<'_>) -> Result<Self, Error> {
        match input {
            Input::Default => Ok(Int::zero(kind)),
            Input::Json(value) => Int::from_json(kind, &value),
            other => Err(Error::invalid_value(
                kind.to_string(),
                other.describe(),
                "expected a number",
            )),
        }
    }

    fn from_json(kind: IntKind, value: &Value) -> Result<Self, Error> {
        match value {
            Value::Null => Ok(Int::zero(kind)),
            Value::Bool(b) => Int::from_u128(kind, u128::from(*b)),
            Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    Int::from_u128(kind, u128::from(v))
                } else if let Some(v) = n.as_i64() {
                    Int::from_i128(kind, i128::from(v))
                } else {
                    Err(Error::invalid_value(
                        kind.to_string(),
                        n,
                        "not an integer",
                    ))
                }
            }
            Value::String(s) => Int::from_decimal(kind, s),
            other => Err(Error::invalid_value(
                kind.to_string(),
                other,
                "expected a number",
            )),
        }
    }

    /// Parse a decimal string, which may use `,` or `_` digit separators.
    pub fn from_decimal(kind: IntKind, s: &str) -> Result<Self, Error> {
        let digits: String = s.chars().filter(|c| *c != ',' && *c != '_').collect();
        let (negative, digits) = match digits.strip_prefix('-') {
            Some(rest) => (true, rest.to_owned()),
            None => (false, digits),
        };
        let invalid = || Error::invalid_value(kind.to_string(), s, "not a decimal integer");
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let width = kind.byte_len();
        let mut le = decimal_to_le(&digits, width).ok_or_else(|| out_of_range(kind, s))?;
        if negative {
            if !kind.signed {
                return Err(out_of_range(kind, s));
            }
            negate_le(&mut le);
            if le.last().is_some_and(|b| b & 0x80 == 0) && le.iter().any(|b| *b != 0) {
                return Err(out_of_range(kind, s));
            }
        } else if kind.signed && le.last().is_some_and(|b| b & 0x80 != 0) {
            return Err(out_of_range(kind, s));
        }
        Ok(Int { kind, le })
    }

    /// The kind of this integer.
    pub fn kind(&self) -> IntKind {
        self.kind
    }

    /// The little endian bytes of this integer.
    pub fn as_le_bytes(&self) -> &[u8] {
        &self.le
    }

    /// Is this a negative value.
    pub fn is_negative(&self) -> bool {
        self.kind.signed && self.le.last().is_some_and(|b| b & 0x80 != 0)
    }

    /// The value as a `u128`, if it is non negative and fits.
    pub fn to_u128(&self) -> Option<u128> {
        if self.is_negative() || self.le.iter().skip(16).any(|b| *b != 0) {
            return None;
        }
        let mut buf = [0u8; 16];
        let copy = self.le.len().min(16);
        buf[..copy].copy_from_slice(&self.le[..copy]);
        Some(u128::from_le_bytes(buf))
    }

    /// The value as an `i128`, if it fits.
    pub fn to_i128(&self) -> Option<i128> {
        if !self.is_negative() {
            return self.to_u128().and_then(|v| i128::try_from(v).ok());
        }
        if self.le.iter().skip(16).any(|b| *b != 0xff) {
            return None;
        }
        let mut buf = [0xffu8; 16];
        let copy = self.le.len().min(16);
        buf[..copy].copy_from_slice(&self.le[..copy]);
        let v = i128::from_le_bytes(buf);
        (v < 0).then_some(v)
    }

    /// The value as a `u64`, if it is non negative and fits.
    pub fn to_u64(&self) -> Option<u64> {
        self.to_u128().and_then(|v| u64::try_from(v).ok())
    }

    /// The value in decimal.
    pub fn to_decimal_string(&self) -> String {
        if self.is_negative() {
            let mut magnitude = self.le.clone();
            negate_le(&mut magnitude);
            format!("-{}", le_to_decimal(&magnitude))
        } else {
            le_to_decimal(&self.le)
        }
    }

    fn safe_number(&self) -> Option<Value> {
        if let Some(v) = self.to_u128() {
            return (v <= MAX_SAFE_INTEGER).then(|| Value::from(v as u64));
        }
        self.to_i128()
            .filter(|v| v.unsigned_abs() <= MAX_SAFE_INTEGER)
            .map(|v| Value::from(v as i64))
    }

    fn to_be_hex(&self) -> String {
        let be: Vec<u8> = self.le.iter().rev().copied().collect();
        to_hex(&be)
    }
}

impl Codec for Int {
    fn raw_type(&self) -> String {
        self.kind.to_string()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.le);
    }

    fn encoded_length(&self) -> usize {
        self.le.len()
    }

    fn to_json(&self) -> Value {
        self.safe_number()
            .unwrap_or_else(|| Value::String(self.to_be_hex()))
    }

    fn to_human(&self) -> Value {
        Value::String(format_number(&self.to_decimal_string()))
    }

    fn to_primitive(&self) -> Value {
        self.safe_number()
            .unwrap_or_else(|| Value::String(self.to_decimal_string()))
    }

    fn is_empty(&self) -> bool {
        self.le.iter().all(|b| *b == 0)
    }

    fn eq_input(&self, other: &Input<'_>) -> bool {
        match other {
            Input::Json(value @ (Value::Number(_) | Value::String(_))) => {
                match Int::from_json(self.kind, value) {
                    Ok(parsed) => parsed.le == self.le,
                    Err(_) => match value {
                        Value::String(s) => crate::utils::from_hex(s)
                            .and_then(|be| Int::from_be_bytes(self.kind, &be))
                            .is_ok_and(|parsed| parsed.le == self.le),
                        _ => false,
                    },
                }
            }
            Input::Hex(hex) => crate::utils::from_hex(hex)
                .and_then(|be| Int::from_be_bytes(self.kind, &be))
                .is_ok_and(|parsed| parsed.le == self.le),
            Input::Codec(codec) => codec.to_u8a() == self.le,
            Input::Bytes(bytes) => bytes.as_ref() == self.le.as_slice(),
            Input::Default => self.is_empty(),
            _ => false,
        }
    }
}

/// A compact (variable length) encoded unsigned integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compact {
    inner: Int,
}

impl Compact {
    /// Wrap an integer. Compact encoding supports values up to `u128::MAX`.
    pub fn new(inner: Int) -> Result<Self, Error> {
        if inner.to_u128().is_none() {
            return Err(Error::invalid_value(
                format!("Compact<{}>", inner.kind()),
                inner.to_decimal_string(),
                "compact values must be non negative and fit in 128 bits",
            ));
        }
        Ok(Compact { inner })
    }

    /// The wrapped integer.
    pub fn inner(&self) -> &Int {
        &self.inner
    }

    /// The wrapped value.
    pub fn to_u128(&self) -> u128 {
        self.inner.to_u128().unwrap_or_default()
    }

    fn inner_kind(registry: &Registry, inner: &TypeDef) -> Result<IntKind, Error> {
        match registry.resolve_def(inner)? {
            TypeDef::Int(kind) => Ok(kind),
            TypeDef::Compact(inner) => Compact::inner_kind(registry, &inner),
            // Compact<()> appears in some metadata; treat as the smallest integer.
            TypeDef::Null => Ok(IntKind::unsigned(8)),
            other => Err(Error::InvalidTypeDefinition {
                def: format!("Compact<{inner}>"),
                reason: format!("{other} cannot be compact encoded"),
            }),
        }
    }

    pub(crate) fn decode(
        registry: &Registry,
        inner: &TypeDef,
        cursor: &mut &[u8],
    ) -> Result<Self, Error> {
        let kind = Compact::inner_kind(registry, inner)?;
        let value = ScaleCompact::<u128>::decode(cursor)
            .map_err(|e| Error::codec(format!("Compact<{kind}>"), e))?
            .0;
        Compact::new(Int::from_u128(kind, value)?)
    }

    pub(crate) fn from_be_bytes(
        registry: &Registry,
        inner: &TypeDef,
        be: &[u8],
    ) -> Result<Self, Error> {
        let kind = Compact::inner_kind(registry, inner)?;
        Compact::new(Int::from_be_bytes(kind, be)?)
    }

    pub(crate) fn from_input(
        registry: &Registry,
        inner: &TypeDef,
        input: Input<'_>,
    ) -> Result<Self, Error> {
        let kind = Compact::inner_kind(registry, inner)?;
        Compact::new(Int::from_input(kind, input)?)
    }
}

impl Codec for Compact {
    fn raw_type(&self) -> String {
        format!("Compact<{}>", self.inner.kind())
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        ScaleCompact(self.to_u128()).encode_to(out);
    }

    fn to_json(&self) -> Value {
        self.inner.to_json()
    }

    fn to_human(&self) -> Value {
        self.inner.to_human()
    }

    fn to_primitive(&self) -> Value {
        self.inner.to_primitive()
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn eq_input(&self, other: &Input<'_>) -> bool {
        match other {
            Input::Bytes(bytes) => bytes.as_ref() == self.to_u8a().as_slice(),
            other => self.inner.eq_input(other),
        }
    }
}

fn out_of_range(kind: IntKind, value: impl core::fmt::Display) -> Error {
    Error::invalid_value(kind.to_string(), value, "out of range")
}

// Convert decimal digits into little endian bytes of the given width.
fn decimal_to_le(digits: &str, width: usize) -> Option<Vec<u8>> {
    let mut le = vec![0u8; width];
    for digit in digits.bytes() {
        let mut carry = u16::from(digit - b'0');
        for byte in le.iter_mut() {
            let v = u16::from(*byte) * 10 + carry;
            *byte = (v & 0xff) as u8;
            carry = v >> 8;
        }
        if carry != 0 {
            return None;
        }
    }
    Some(le)
}

// Render little endian unsigned bytes as decimal.
fn le_to_decimal(le: &[u8]) -> String {
    let mut be: Vec<u8> = le.iter().rev().copied().collect();
    let mut digits = Vec::new();
    while be.iter().any(|b| *b != 0) {
        let mut rem = 0u16;
        for byte in be.iter_mut() {
            let v = (rem << 8) | u16::from(*byte);
            *byte = (v / 10) as u8;
            rem = v % 10;
        }
        digits.push(b'0' + rem as u8);
    }
    if digits.is_empty() {
        return "0".into();
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

// Two's complement negation in place.
fn negate_le(le: &mut [u8]) {
    let mut carry = true;
    for byte in le.iter_mut() {
        let (v, c) = (!*byte).overflowing_add(u8::from(carry));
        *byte = v;
        carry = c;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn kinds_parse_from_names() {
        assert_eq!(IntKind::from_name("u32"), Some(IntKind::unsigned(32)));
        assert_eq!(IntKind::from_name("i256"), Some(IntKind::signed(256)));
        assert_eq!(IntKind::from_name("u7"), None);
        assert_eq!(IntKind::from_name("usize"), None);
    }

    #[test]
    fn encodes_little_endian() {
        let v = Int::from_u128(IntKind::unsigned(32), 0x1234).unwrap();
        assert_eq!(v.to_u8a(), vec![0x34, 0x12, 0, 0]);
        assert_eq!(v.encoded_length(), 4);

        let neg = Int::from_i128(IntKind::signed(16), -2).unwrap();
        assert_eq!(neg.to_u8a(), vec![0xfe, 0xff]);
        assert_eq!(neg.to_json(), json!(-2));
        assert_eq!(neg.to_decimal_string(), "-2");
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Int::from_u128(IntKind::unsigned(8), 256).is_err());
        assert!(Int::from_u128(IntKind::signed(8), 128).is_err());
        assert!(Int::from_i128(IntKind::signed(8), -129).is_err());
        assert!(Int::from_i128(IntKind::unsigned(64), -1).is_err());
        assert!(Int::from_decimal(IntKind::unsigned(8), "1000").is_err());
    }

    #[test]
    fn large_values_render_as_hex_and_decimal() {
        let v = Int::from_decimal(IntKind::unsigned(128), "340282366920938463463374607431768211455")
            .unwrap();
        assert_eq!(v.to_json(), json!(format!("0x{}", "ff".repeat(16))));
        assert_eq!(
            v.to_primitive(),
            json!("340282366920938463463374607431768211455")
        );

        let big = Int::from_decimal(IntKind::unsigned(256), "1000000000000000000000000000000000000000")
            .unwrap();
        assert_eq!(
            big.to_decimal_string(),
            "1000000000000000000000000000000000000000"
        );
        assert!(big.to_u128().is_none());
    }

    #[test]
    fn human_rendering_groups_digits() {
        let v = Int::from_u128(IntKind::unsigned(64), 1_234_567).unwrap();
        assert_eq!(v.to_human(), json!("1,234,567"));
        assert_eq!(v.to_primitive(), json!(1_234_567));
    }

    #[test]
    fn compares_against_numbers_and_strings() {
        let v = Int::from_u128(IntKind::unsigned(32), 4660).unwrap();
        assert!(v.eq_input(&Input::from(4660u32)));
        assert!(v.eq_input(&Input::from("4660")));
        assert!(v.eq_input(&Input::from("0x1234")));
        assert!(!v.eq_input(&Input::from(4661u32)));
    }

    #[test]
    fn compact_encoding_modes() {
        let cases: [(u128, Vec<u8>); 4] = [
            (1, vec![0x04]),
            (64, vec![0x01, 0x01]),
            (16384, vec![0x02, 0x00, 0x01, 0x00]),
            (1 << 30, vec![0x03, 0x00, 0x00, 0x00, 0x40]),
        ];
        for (value, encoded) in cases {
            let c = Compact::new(Int::from_u128(IntKind::unsigned(128), value).unwrap()).unwrap();
            assert_eq!(c.to_u8a(), encoded, "{value}");
        }
    }

    #[test]
    fn compact_decodes_into_its_inner_width() {
        let registry = Registry::new();
        let c = Compact::decode(&registry, &TypeDef::uint(32), &mut &[0x01, 0x01][..]).unwrap();
        assert_eq!(c.raw_type(), "Compact<u32>");
        assert_eq!(c.to_u128(), 64);

        // 2^32 does not fit a u32.
        let too_big = Compact::decode(
            &registry,
            &TypeDef::uint(32),
            &mut &[0x07, 0x00, 0x00, 0x00, 0x00, 0x01][..],
        );
        assert!(too_big.is_err());
    }
}
