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

use super::vec::construct_items;
use super::{Codec, Input, decode_length, encode_length};
use crate::error::Error;
use crate::registry::Registry;
use crate::types::TypeDef;
use core::cmp::Ordering;
use serde_json::{Map, Value};

// Order keys the way the runtime's `Ord` would: numbers numerically,
// strings lexically and anything else by encoded bytes.
fn compare_keys(a: &dyn Codec, b: &dyn Codec) -> Ordering {
    match (a.to_primitive(), b.to_primitive()) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Value::String(x), Value::String(y)) if a.raw_type() == "Text" => x.cmp(&y),
        _ => {
            let (x, y) = (a.to_u8a(), b.to_u8a());
            // integers wider than a JSON number compare by magnitude.
            if x.len() == y.len() && a.raw_type().starts_with('u') {
                x.iter().rev().cmp(y.iter().rev())
            } else {
                x.cmp(&y)
            }
        }
    }
}

fn key_string(key: &dyn Codec) -> String {
    match key.to_primitive() {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// An ordered map, encoded as a compact length then each key and value.
#[derive(Debug, Clone)]
pub struct BTreeMapCodec {
    key: TypeDef,
    value: TypeDef,
    entries: Vec<(Box<dyn Codec>, Box<dyn Codec>)>,
}

impl BTreeMapCodec {
    /// The entries of this map, in key order.
    pub fn entries(&self) -> &[(Box<dyn Codec>, Box<dyn Codec>)] {
        &self.entries
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Look up the value for a key.
    pub fn get<'a>(&self, key: impl Into<Input<'a>>) -> Option<&dyn Codec> {
        let key = key.into();
        self.entries
            .iter()
            .find(|(k, _)| k.eq_input(&key))
            .map(|(_, v)| v.as_ref())
    }

    fn ty(key: &TypeDef, value: &TypeDef) -> String {
        format!("BTreeMap<{key},{value}>")
    }

    pub(crate) fn decode(
        registry: &Registry,
        key: &TypeDef,
        value: &TypeDef,
        cursor: &mut &[u8],
    ) -> Result<Self, Error> {
        let len = decode_length(&BTreeMapCodec::ty(key, value), cursor)?;
        let mut entries = Vec::new();
        for _ in 0..len {
            let k = key.decode(registry, cursor)?;
            let v = value.decode(registry, cursor)?;
            entries.push((k, v));
        }
        Ok(BTreeMapCodec {
            key: key.clone(),
            value: value.clone(),
            entries,
        })
    }

    pub(crate) fn from_input(
        registry: &Registry,
        key: &TypeDef,
        value: &TypeDef,
        input: Input<'_>,
    ) -> Result<Self, Error> {
        let pairs: Vec<(Input<'_>, Input<'_>)> = match input {
            Input::Default | Input::Json(Value::Null) => Vec::new(),
            Input::Json(Value::Object(map)) => map
                .into_iter()
                .map(|(k, v)| (Input::from(k), Input::Json(v)))
                .collect(),
            Input::Object(entries) => entries
                .into_iter()
                .map(|(k, v)| (Input::from(k), v))
                .collect(),
            Input::Json(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::Array(mut pair) if pair.len() == 2 => {
                        let v = pair.pop().unwrap_or_default();
                        let k = pair.pop().unwrap_or_default();
                        Ok((Input::Json(k), Input::Json(v)))
                    }
                    other => Err(Error::invalid_value(
                        BTreeMapCodec::ty(key, value),
                        other,
                        "expected [key, value] pairs",
                    )),
                })
                .collect::<Result<_, _>>()?,
            other => {
                return Err(Error::invalid_value(
                    BTreeMapCodec::ty(key, value),
                    other.describe(),
                    "expected an object",
                ));
            }
        };

        let mut entries = pairs
            .into_iter()
            .map(|(k, v)| Ok((key.construct(registry, k)?, value.construct(registry, v)?)))
            .collect::<Result<Vec<_>, Error>>()?;
        entries.sort_by(|(a, _), (b, _)| compare_keys(a.as_ref(), b.as_ref()));
        Ok(BTreeMapCodec {
            key: key.clone(),
            value: value.clone(),
            entries,
        })
    }

    fn render(&self, f: impl Fn(&dyn Codec) -> Value) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| (key_string(k.as_ref()), f(v.as_ref())))
            .collect();
        Value::Object(map)
    }
}

impl Codec for BTreeMapCodec {
    fn raw_type(&self) -> String {
        BTreeMapCodec::ty(&self.key, &self.value)
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        encode_length(self.entries.len(), out);
        for (k, v) in &self.entries {
            k.encode_to(out);
            v.encode_to(out);
        }
    }

    fn to_json(&self) -> Value {
        self.render(|v| v.to_json())
    }

    fn to_human(&self) -> Value {
        self.render(|v| v.to_human())
    }

    fn to_primitive(&self) -> Value {
        self.render(|v| v.to_primitive())
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An ordered set, encoded as a compact length then each value.
#[derive(Debug, Clone)]
pub struct BTreeSetCodec {
    value: TypeDef,
    values: Vec<Box<dyn Codec>>,
}

impl BTreeSetCodec {
    /// The values of this set, in order.
    pub fn values(&self) -> &[Box<dyn Codec>] {
        &self.values
    }

    pub(crate) fn decode(
        registry: &Registry,
        value: &TypeDef,
        cursor: &mut &[u8],
    ) -> Result<Self, Error> {
        let len = decode_length(&format!("BTreeSet<{value}>"), cursor)?;
        let values = (0..len)
            .map(|_| value.decode(registry, cursor))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BTreeSetCodec {
            value: value.clone(),
            values,
        })
    }

    pub(crate) fn from_input(
        registry: &Registry,
        value: &TypeDef,
        input: Input<'_>,
    ) -> Result<Self, Error> {
        let mut values = construct_items(registry, &format!("BTreeSet<{value}>"), value, input)?;
        values.sort_by(|a, b| compare_keys(a.as_ref(), b.as_ref()));
        values.dedup_by(|a, b| a.to_u8a() == b.to_u8a());
        Ok(BTreeSetCodec {
            value: value.clone(),
            values,
        })
    }
}

impl Codec for BTreeSetCodec {
    fn raw_type(&self) -> String {
        format!("BTreeSet<{}>", self.value)
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        encode_length(self.values.len(), out);
        for v in &self.values {
            v.encode_to(out);
        }
    }

    fn to_json(&self) -> Value {
        Value::Array(self.values.iter().map(|v| v.to_json()).collect())
    }

    fn to_human(&self) -> Value {
        Value::Array(self.values.iter().map(|v| v.to_human()).collect())
    }

    fn to_primitive(&self) -> Value {
        Value::Array(self.values.iter().map(|v| v.to_primitive()).collect())
    }

    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_sort_numeric_keys() {
        let registry = Registry::new();
        let map = BTreeMapCodec::from_input(
            &registry,
            &TypeDef::uint(32),
            &TypeDef::Text,
            Input::from(json!({ "300": "b", "2": "a" })),
        )
        .unwrap();
        assert_eq!(map.to_json(), json!({ "2": "a", "300": "b" }));
        assert_eq!(
            map.to_u8a(),
            vec![0x08, 2, 0, 0, 0, 0x04, b'a', 0x2c, 1, 0, 0, 0x04, b'b']
        );
        assert_eq!(map.get(300u32).map(|v| v.to_json()), Some(json!("b")));

        let decoded =
            BTreeMapCodec::decode(&registry, &TypeDef::uint(32), &TypeDef::Text, &mut map.to_u8a().as_slice())
                .unwrap();
        assert_eq!(decoded.len(), 2);
    }

    #[test]
    fn sets_sort_and_dedup() {
        let registry = Registry::new();
        let set =
            BTreeSetCodec::from_input(&registry, &TypeDef::uint(8), Input::from(json!([3, 1, 3])))
                .unwrap();
        assert_eq!(set.to_json(), json!([1, 3]));
        assert_eq!(set.to_u8a(), vec![0x08, 1, 3]);
    }
}
