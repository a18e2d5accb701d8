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

use super::vec::eq_items;
use super::{Codec, Input};
use crate::error::Error;
use crate::registry::Registry;
use crate::types::TypeDef;
use serde_json::Value;

/// A fixed sequence of values of differing types, encoded back to back.
#[derive(Debug, Clone)]
pub struct Tuple {
    types: Vec<TypeDef>,
    values: Vec<Box<dyn Codec>>,
}

impl Tuple {
    /// The values in this tuple.
    pub fn values(&self) -> &[Box<dyn Codec>] {
        &self.values
    }

    /// The value at some position.
    pub fn get(&self, idx: usize) -> Option<&dyn Codec> {
        self.values.get(idx).map(|v| v.as_ref())
    }

    pub(crate) fn decode(
        registry: &Registry,
        types: &[TypeDef],
        cursor: &mut &[u8],
    ) -> Result<Self, Error> {
        let values = types
            .iter()
            .map(|ty| ty.decode(registry, cursor))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Tuple {
            types: types.to_vec(),
            values,
        })
    }

    pub(crate) fn from_input(
        registry: &Registry,
        types: &[TypeDef],
        input: Input<'_>,
    ) -> Result<Self, Error> {
        let mut inputs: Vec<Input<'_>> = match input {
            Input::Default | Input::Json(Value::Null) => Vec::new(),
            Input::Json(Value::Array(items)) => items.into_iter().map(Input::Json).collect(),
            Input::Array(items) => items,
            // a single value can construct a one element tuple.
            other if types.len() == 1 => vec![other],
            other => {
                return Err(Error::invalid_value(
                    TypeDef::Tuple(types.to_vec()).to_string(),
                    other.describe(),
                    "expected a list",
                ));
            }
        };
        if inputs.len() > types.len() {
            return Err(Error::DecodeLength {
                ty: TypeDef::Tuple(types.to_vec()).to_string(),
                expected: types.len(),
                found: inputs.len(),
            });
        }
        inputs.resize_with(types.len(), Input::default);

        let values = types
            .iter()
            .zip(inputs)
            .map(|(ty, input)| ty.construct(registry, input))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Tuple {
            types: types.to_vec(),
            values,
        })
    }
}

impl Codec for Tuple {
    fn raw_type(&self) -> String {
        TypeDef::Tuple(self.types.clone()).to_string()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        for value in &self.values {
            value.encode_to(out);
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
        self.values.iter().all(|v| v.is_empty())
    }

    fn eq_input(&self, other: &Input<'_>) -> bool {
        eq_items(&self.values, &self.to_u8a(), other)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn tuples_encode_in_order() {
        let registry = Registry::new();
        let types = vec![TypeDef::uint(32), TypeDef::Text];
        let t = Tuple::from_input(&registry, &types, Input::from(json!([1, "x"]))).unwrap();
        assert_eq!(t.to_u8a(), vec![1, 0, 0, 0, 0x04, b'x']);
        assert_eq!(t.raw_type(), "(u32,Text)");

        let decoded = Tuple::decode(&registry, &types, &mut t.to_u8a().as_slice()).unwrap();
        assert_eq!(decoded.to_json(), json!([1, "x"]));
    }

    #[test]
    fn missing_entries_take_defaults() {
        let registry = Registry::new();
        let types = vec![TypeDef::uint(8), TypeDef::Bool];
        let t = Tuple::from_input(&registry, &types, Input::from(json!([5]))).unwrap();
        assert_eq!(t.to_json(), json!([5, false]));
    }
}
