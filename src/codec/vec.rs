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

use super::{Codec, Input, decode_length, encode_length};
use crate::error::Error;
use crate::registry::Registry;
use crate::types::TypeDef;
use serde_json::Value;

/// Length prefixes above this are rejected before allocating anything.
const MAX_VEC_LENGTH: usize = 65536 * 64;

/// Construct each item of a list input.
pub(super) fn construct_items(
    registry: &Registry,
    ty: &str,
    inner: &TypeDef,
    input: Input<'_>,
) -> Result<Vec<Box<dyn Codec>>, Error> {
    match input {
        Input::Default | Input::Json(Value::Null) => Ok(Vec::new()),
        Input::Json(Value::Array(items)) => items
            .into_iter()
            .map(|item| inner.construct(registry, Input::Json(item)))
            .collect(),
        Input::Array(items) => items
            .into_iter()
            .map(|item| inner.construct(registry, item))
            .collect(),
        other => Err(Error::invalid_value(ty, other.describe(), "expected a list")),
    }
}

/// Compare a list of values element wise against list input.
pub(super) fn eq_items(items: &[Box<dyn Codec>], encoded: &[u8], other: &Input<'_>) -> bool {
    match other {
        Input::Json(Value::Array(values)) => {
            values.len() == items.len()
                && items
                    .iter()
                    .zip(values)
                    .all(|(item, value)| item.eq_input(&Input::Json(value.clone())))
        }
        Input::Array(values) => {
            values.len() == items.len()
                && items.iter().zip(values).all(|(item, value)| item.eq_input(value))
        }
        Input::Default => items.iter().all(|item| item.is_empty()),
        Input::Bytes(bytes) => bytes.as_ref() == encoded,
        Input::Hex(hex) => crate::utils::from_hex(hex).is_ok_and(|b| b == encoded),
        Input::Codec(codec) => codec.to_u8a() == encoded,
        _ => false,
    }
}

fn render(items: &[Box<dyn Codec>], f: impl Fn(&dyn Codec) -> Value) -> Value {
    Value::Array(items.iter().map(|item| f(item.as_ref())).collect())
}

/// A variable length list of values of one type.
#[derive(Debug, Clone)]
pub struct VecCodec {
    inner: TypeDef,
    items: Vec<Box<dyn Codec>>,
}

impl VecCodec {
    /// Build a list from already constructed items.
    pub fn new(inner: TypeDef, items: Vec<Box<dyn Codec>>) -> Self {
        VecCodec { inner, items }
    }

    /// The items in this list.
    pub fn items(&self) -> &[Box<dyn Codec>] {
        &self.items
    }

    /// The type of each item.
    pub fn item_type(&self) -> &TypeDef {
        &self.inner
    }

    /// The number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn decode(
        registry: &Registry,
        inner: &TypeDef,
        cursor: &mut &[u8],
    ) -> Result<Self, Error> {
        let ty = format!("Vec<{inner}>");
        let len = decode_length(&ty, cursor)?;
        if len > MAX_VEC_LENGTH {
            return Err(Error::DecodeLength {
                ty,
                expected: MAX_VEC_LENGTH,
                found: len,
            });
        }
        let items = (0..len)
            .map(|_| inner.decode(registry, cursor))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(VecCodec::new(inner.clone(), items))
    }

    pub(crate) fn from_input(
        registry: &Registry,
        inner: &TypeDef,
        input: Input<'_>,
    ) -> Result<Self, Error> {
        let items = construct_items(registry, &format!("Vec<{inner}>"), inner, input)?;
        Ok(VecCodec::new(inner.clone(), items))
    }
}

impl Codec for VecCodec {
    fn raw_type(&self) -> String {
        format!("Vec<{}>", self.inner)
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        encode_length(self.items.len(), out);
        for item in &self.items {
            item.encode_to(out);
        }
    }

    fn to_json(&self) -> Value {
        render(&self.items, |v| v.to_json())
    }

    fn to_human(&self) -> Value {
        render(&self.items, |v| v.to_human())
    }

    fn to_primitive(&self) -> Value {
        render(&self.items, |v| v.to_primitive())
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn eq_input(&self, other: &Input<'_>) -> bool {
        match other {
            Input::Default => self.items.is_empty(),
            other => eq_items(&self.items, &self.to_u8a(), other),
        }
    }
}

/// A fixed length array of values of one type, `[T; N]`.
#[derive(Debug, Clone)]
pub struct VecFixed {
    inner: TypeDef,
    items: Vec<Box<dyn Codec>>,
}

impl VecFixed {
    /// The items in this array.
    pub fn items(&self) -> &[Box<dyn Codec>] {
        &self.items
    }

    pub(crate) fn decode(
        registry: &Registry,
        inner: &TypeDef,
        len: usize,
        cursor: &mut &[u8],
    ) -> Result<Self, Error> {
        let items = (0..len)
            .map(|_| inner.decode(registry, cursor))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(VecFixed {
            inner: inner.clone(),
            items,
        })
    }

    pub(crate) fn from_input(
        registry: &Registry,
        inner: &TypeDef,
        len: usize,
        input: Input<'_>,
    ) -> Result<Self, Error> {
        let ty = format!("[{inner};{len}]");
        let items = match input {
            Input::Default => (0..len)
                .map(|_| inner.default_value(registry))
                .collect::<Result<Vec<_>, _>>()?,
            input => construct_items(registry, &ty, inner, input)?,
        };
        if items.len() != len {
            return Err(Error::DecodeLength {
                ty,
                expected: len,
                found: items.len(),
            });
        }
        Ok(VecFixed {
            inner: inner.clone(),
            items,
        })
    }
}

impl Codec for VecFixed {
    fn raw_type(&self) -> String {
        format!("[{};{}]", self.inner, self.items.len())
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        for item in &self.items {
            item.encode_to(out);
        }
    }

    fn to_json(&self) -> Value {
        render(&self.items, |v| v.to_json())
    }

    fn to_human(&self) -> Value {
        render(&self.items, |v| v.to_human())
    }

    fn to_primitive(&self) -> Value {
        render(&self.items, |v| v.to_primitive())
    }

    fn is_empty(&self) -> bool {
        self.items.iter().all(|item| item.is_empty())
    }

    fn eq_input(&self, other: &Input<'_>) -> bool {
        eq_items(&self.items, &self.to_u8a(), other)
    }
}
