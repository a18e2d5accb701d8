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

use super::{Bool, Codec, Input, take_bytes};
use crate::error::Error;
use crate::registry::Registry;
use crate::types::TypeDef;
use serde_json::{Map, Value};

/// An optional value: `0x00` for none, else `0x01` followed by the value.
///
/// `Option<bool>` packs into a single byte: `0` none, `1` true, `2` false.
#[derive(Debug, Clone)]
pub struct OptionCodec {
    inner: TypeDef,
    packed_bool: bool,
    value: Option<Box<dyn Codec>>,
}

impl OptionCodec {
    fn is_packed_bool(registry: &Registry, inner: &TypeDef) -> Result<bool, Error> {
        Ok(matches!(registry.resolve_def(inner)?, TypeDef::Bool))
    }

    /// Is there a value.
    pub fn is_some(&self) -> bool {
        self.value.is_some()
    }

    /// Is there no value.
    pub fn is_none(&self) -> bool {
        self.value.is_none()
    }

    /// The value, if any.
    pub fn value(&self) -> Option<&dyn Codec> {
        self.value.as_deref()
    }

    /// The value, failing if there is none.
    pub fn unwrap(&self) -> Result<&dyn Codec, Error> {
        self.value().ok_or_else(|| Error::InvalidVariantAccess {
            active: "None".into(),
            requested: "Some".into(),
        })
    }

    /// Take the value out.
    pub fn into_inner(self) -> Option<Box<dyn Codec>> {
        self.value
    }

    pub(crate) fn decode(
        registry: &Registry,
        inner: &TypeDef,
        cursor: &mut &[u8],
    ) -> Result<Self, Error> {
        let packed_bool = OptionCodec::is_packed_bool(registry, inner)?;
        let ty = format!("Option<{inner}>");
        let flag = take_bytes(&ty, cursor, 1)?[0];
        let value: Option<Box<dyn Codec>> = match (flag, packed_bool) {
            (0, _) => None,
            (1, true) => Some(Box::new(Bool(true))),
            (2, true) => Some(Box::new(Bool(false))),
            (1, false) => Some(inner.decode(registry, cursor)?),
            (other, _) => {
                return Err(Error::invalid_value(ty, other, "invalid option discriminant"));
            }
        };
        Ok(OptionCodec {
            inner: inner.clone(),
            packed_bool,
            value,
        })
    }

    pub(crate) fn from_input(
        registry: &Registry,
        inner: &TypeDef,
        input: Input<'_>,
    ) -> Result<Self, Error> {
        let packed_bool = OptionCodec::is_packed_bool(registry, inner)?;
        let value = match input {
            Input::Default | Input::Json(Value::Null) => None,
            Input::Codec(existing) if existing.encoded_length() == 0 && !inner.is_null() => None,
            Input::Codec(existing) if existing.is::<OptionCodec>() => {
                match existing.downcast::<OptionCodec>().and_then(|o| o.value) {
                    Some(v) => Some(inner.construct(registry, Input::Codec(v))?),
                    None => None,
                }
            }
            other => Some(inner.construct(registry, other)?),
        };
        Ok(OptionCodec {
            inner: inner.clone(),
            packed_bool,
            value,
        })
    }
}

impl Codec for OptionCodec {
    fn raw_type(&self) -> String {
        format!("Option<{}>", self.inner)
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        match (&self.value, self.packed_bool) {
            (None, _) => out.push(0),
            (Some(v), true) => out.push(if v.is_empty() { 2 } else { 1 }),
            (Some(v), false) => {
                out.push(1);
                v.encode_to(out);
            }
        }
    }

    fn to_json(&self) -> Value {
        self.value.as_ref().map_or(Value::Null, |v| v.to_json())
    }

    fn to_human(&self) -> Value {
        self.value.as_ref().map_or(Value::Null, |v| v.to_human())
    }

    fn to_primitive(&self) -> Value {
        self.value.as_ref().map_or(Value::Null, |v| v.to_primitive())
    }

    fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    fn eq_input(&self, other: &Input<'_>) -> bool {
        match (other, &self.value) {
            (Input::Default | Input::Json(Value::Null), value) => value.is_none(),
            (Input::Codec(codec), _) => codec.to_u8a() == self.to_u8a(),
            (Input::Bytes(bytes), _) => bytes.as_ref() == self.to_u8a().as_slice(),
            (other, Some(value)) => value.eq_input(other),
            (_, None) => false,
        }
    }
}

/// A `Result<T, E>`: `0x00` followed by the ok value or `0x01` followed by
/// the error value.
#[derive(Debug, Clone)]
pub struct ResultCodec {
    ok: TypeDef,
    err: TypeDef,
    is_ok: bool,
    value: Box<dyn Codec>,
}

impl ResultCodec {
    /// Is this the ok variant.
    pub fn is_ok(&self) -> bool {
        self.is_ok
    }

    /// Is this the error variant.
    pub fn is_err(&self) -> bool {
        !self.is_ok
    }

    /// The ok value.
    pub fn as_ok(&self) -> Result<&dyn Codec, Error> {
        self.access(true)
    }

    /// The error value.
    pub fn as_err(&self) -> Result<&dyn Codec, Error> {
        self.access(false)
    }

    fn access(&self, ok: bool) -> Result<&dyn Codec, Error> {
        if self.is_ok != ok {
            return Err(Error::InvalidVariantAccess {
                active: self.variant_name().into(),
                requested: if ok { "Ok" } else { "Err" }.into(),
            });
        }
        Ok(self.value.as_ref())
    }

    fn variant_name(&self) -> &'static str {
        if self.is_ok { "Ok" } else { "Err" }
    }

    fn ty(ok: &TypeDef, err: &TypeDef) -> String {
        format!("Result<{ok},{err}>")
    }

    pub(crate) fn decode(
        registry: &Registry,
        ok: &TypeDef,
        err: &TypeDef,
        cursor: &mut &[u8],
    ) -> Result<Self, Error> {
        let ty = ResultCodec::ty(ok, err);
        let (is_ok, value) = match take_bytes(&ty, cursor, 1)?[0] {
            0 => (true, ok.decode(registry, cursor)?),
            1 => (false, err.decode(registry, cursor)?),
            other => return Err(Error::invalid_value(ty, other, "invalid result discriminant")),
        };
        Ok(ResultCodec {
            ok: ok.clone(),
            err: err.clone(),
            is_ok,
            value,
        })
    }

    pub(crate) fn from_input(
        registry: &Registry,
        ok: &TypeDef,
        err: &TypeDef,
        input: Input<'_>,
    ) -> Result<Self, Error> {
        let ty = ResultCodec::ty(ok, err);
        let (key, inner) = match input {
            Input::Default => ("ok".to_owned(), Input::Default),
            Input::Json(Value::Object(map)) if map.len() == 1 => {
                let mut entries = map.into_iter();
                match entries.next() {
                    Some((key, value)) => (key, Input::Json(value)),
                    None => ("ok".to_owned(), Input::Default),
                }
            }
            Input::Object(mut entries) if entries.len() == 1 => entries.remove(0),
            other => {
                return Err(Error::invalid_value(ty, other.describe(), "expected {Ok} or {Err}"));
            }
        };
        let (is_ok, value) = match key.to_ascii_lowercase().as_str() {
            "ok" => (true, ok.construct(registry, inner)?),
            "err" => (false, err.construct(registry, inner)?),
            _ => {
                return Err(Error::UnknownVariant {
                    ty,
                    variant: key,
                });
            }
        };
        Ok(ResultCodec {
            ok: ok.clone(),
            err: err.clone(),
            is_ok,
            value,
        })
    }

    fn render(&self, key: &str, value: Value) -> Value {
        let mut map = Map::new();
        map.insert(key.to_owned(), value);
        Value::Object(map)
    }
}

impl Codec for ResultCodec {
    fn raw_type(&self) -> String {
        ResultCodec::ty(&self.ok, &self.err)
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        out.push(if self.is_ok { 0 } else { 1 });
        self.value.encode_to(out);
    }

    fn to_json(&self) -> Value {
        let key = if self.is_ok { "ok" } else { "err" };
        self.render(key, self.value.to_json())
    }

    fn to_human(&self) -> Value {
        self.render(self.variant_name(), self.value.to_human())
    }

    fn to_primitive(&self) -> Value {
        let key = if self.is_ok { "ok" } else { "err" };
        self.render(key, self.value.to_primitive())
    }

    fn is_empty(&self) -> bool {
        self.is_ok && self.value.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn options_prefix_a_flag_byte() {
        let registry = Registry::new();
        let some = OptionCodec::from_input(&registry, &TypeDef::uint(16), Input::from(3u16))
            .unwrap();
        assert_eq!(some.to_u8a(), vec![1, 3, 0]);
        assert_eq!(some.to_json(), json!(3));

        let none = OptionCodec::decode(&registry, &TypeDef::uint(16), &mut &[0u8][..]).unwrap();
        assert!(none.is_none());
        assert_eq!(none.to_u8a(), vec![0]);
        assert!(none.unwrap().is_err());
        assert!(OptionCodec::decode(&registry, &TypeDef::uint(16), &mut &[3u8][..]).is_err());
    }

    #[test]
    fn option_bool_packs_into_one_byte() {
        let registry = Registry::new();
        for (bytes, json) in [(vec![0u8], json!(null)), (vec![1], json!(true)), (vec![2], json!(false))]
        {
            let v = OptionCodec::decode(&registry, &TypeDef::Bool, &mut bytes.as_slice()).unwrap();
            assert_eq!(v.to_json(), json);
            assert_eq!(v.to_u8a(), bytes);
        }
        let f = OptionCodec::from_input(&registry, &TypeDef::Bool, Input::from(false)).unwrap();
        assert_eq!(f.to_u8a(), vec![2]);
    }

    #[test]
    fn results_encode_their_variant() {
        let registry = Registry::new();
        let ok = ResultCodec::from_input(
            &registry,
            &TypeDef::uint(8),
            &TypeDef::Text,
            Input::from(json!({ "Ok": 7 })),
        )
        .unwrap();
        assert_eq!(ok.to_u8a(), vec![0, 7]);
        assert_eq!(ok.to_json(), json!({ "ok": 7 }));
        assert!(ok.as_err().is_err());

        let err = ResultCodec::decode(
            &registry,
            &TypeDef::uint(8),
            &TypeDef::Text,
            &mut &[1u8, 0x08, b'n', b'o'][..],
        )
        .unwrap();
        assert!(err.is_err());
        assert_eq!(err.to_human(), json!({ "Err": "no" }));
    }
}
