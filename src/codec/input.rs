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

use super::Codec;
use crate::utils::is_hex;
use serde_json::Value;
use std::borrow::Cow;

/// Something a value can be constructed from.
///
/// Construction dispatches on this once: bytes and hex are SCALE decoded,
/// while JSON, objects and arrays are mapped field by field onto the shape
/// of the type being constructed.
#[derive(Debug, Clone)]
pub enum Input<'a> {
    /// No value; construct the default (zero) value of the type.
    Default,
    /// SCALE encoded bytes.
    Bytes(Cow<'a, [u8]>),
    /// A hex string. Decoded as SCALE bytes, except for byte and text
    /// types where it holds the raw content and integers where it is a
    /// big endian number.
    Hex(Cow<'a, str>),
    /// A JSON value.
    Json(Value),
    /// An existing value, reused when its type already matches.
    Codec(Box<dyn Codec>),
    /// An ordered set of named inputs.
    Object(Vec<(String, Input<'a>)>),
    /// A list of inputs.
    Array(Vec<Input<'a>>),
}

impl<'a> Input<'a> {
    /// Build an object input from named values.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Input<'a>)>,
    {
        Input::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Detach this input from any borrowed data.
    pub fn into_owned(self) -> Input<'static> {
        match self {
            Input::Default => Input::Default,
            Input::Bytes(b) => Input::Bytes(Cow::Owned(b.into_owned())),
            Input::Hex(h) => Input::Hex(Cow::Owned(h.into_owned())),
            Input::Json(v) => Input::Json(v),
            Input::Codec(c) => Input::Codec(c),
            Input::Object(entries) => {
                Input::Object(entries.into_iter().map(|(k, v)| (k, v.into_owned())).collect())
            }
            Input::Array(items) => Input::Array(items.into_iter().map(Input::into_owned).collect()),
        }
    }

    /// A short description of the input, for error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Input::Default => "<default>".into(),
            Input::Bytes(b) => crate::utils::to_hex(b),
            Input::Hex(h) => h.to_string(),
            Input::Json(v) => v.to_string(),
            Input::Codec(c) => format!("{} {}", c.raw_type(), c.to_hex()),
            Input::Object(entries) => {
                let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
                format!("{{{}}}", keys.join(", "))
            }
            Input::Array(items) => format!("[{} items]", items.len()),
        }
    }

    /// Treat JSON hex strings as hex input.
    pub(crate) fn normalize_hex(self) -> Self {
        match self {
            Input::Json(Value::String(s)) if is_hex(&s) => Input::Hex(Cow::Owned(s)),
            other => other,
        }
    }
}

impl Default for Input<'_> {
    fn default() -> Self {
        Input::Default
    }
}

impl<'a> From<&'a [u8]> for Input<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Input::Bytes(Cow::Borrowed(bytes))
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Input<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Input::Bytes(Cow::Borrowed(bytes.as_slice()))
    }
}

impl<'a> From<&'a Vec<u8>> for Input<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Input::Bytes(Cow::Borrowed(bytes.as_slice()))
    }
}

impl From<Vec<u8>> for Input<'static> {
    fn from(bytes: Vec<u8>) -> Self {
        Input::Bytes(Cow::Owned(bytes))
    }
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(s: &'a str) -> Self {
        if is_hex(s) {
            Input::Hex(Cow::Borrowed(s))
        } else {
            Input::Json(Value::String(s.to_owned()))
        }
    }
}

impl From<String> for Input<'static> {
    fn from(s: String) -> Self {
        if is_hex(&s) {
            Input::Hex(Cow::Owned(s))
        } else {
            Input::Json(Value::String(s))
        }
    }
}

impl From<Value> for Input<'static> {
    fn from(value: Value) -> Self {
        Input::Json(value)
    }
}

impl From<Box<dyn Codec>> for Input<'static> {
    fn from(codec: Box<dyn Codec>) -> Self {
        Input::Codec(codec)
    }
}

impl<'a> From<Vec<Input<'a>>> for Input<'a> {
    fn from(items: Vec<Input<'a>>) -> Self {
        Input::Array(items)
    }
}

impl From<()> for Input<'static> {
    fn from(_: ()) -> Self {
        Input::Default
    }
}

impl From<bool> for Input<'static> {
    fn from(b: bool) -> Self {
        Input::Json(Value::Bool(b))
    }
}

macro_rules! from_number {
    ($($t:ty),*) => {$(
        impl From<$t> for Input<'static> {
            fn from(n: $t) -> Self {
                Input::Json(Value::from(n))
            }
        }
    )*}
}
from_number!(u8, u16, u32, u64, i8, i16, i32, i64);

impl From<u128> for Input<'static> {
    fn from(n: u128) -> Self {
        match u64::try_from(n) {
            Ok(n) => Input::Json(Value::from(n)),
            Err(_) => Input::Json(Value::String(n.to_string())),
        }
    }
}

impl From<i128> for Input<'static> {
    fn from(n: i128) -> Self {
        match i64::try_from(n) {
            Ok(n) => Input::Json(Value::from(n)),
            Err(_) => Input::Json(Value::String(n.to_string())),
        }
    }
}
