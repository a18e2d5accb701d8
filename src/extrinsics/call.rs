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

use super::{input_entries, take_entry};
use crate::codec::{Codec, Input, Struct, take_bytes};
use crate::error::Error;
use crate::registry::{CallFunction, Registry};
use crate::types::NativeCodec;
use crate::utils::{from_hex, to_hex};
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// A dispatchable call: the pallet and call index followed by the encoded
/// arguments.
///
/// Calls can only be decoded or constructed once metadata is registered,
/// since the index decides which arguments follow.
#[derive(Debug, Clone)]
pub struct Call {
    meta: Arc<CallFunction>,
    args: Struct,
}

impl Call {
    /// Construct a call by pallet and call name, eg `balances`,
    /// `transferKeepAlive`. Names are matched in any case.
    pub fn new<'a>(
        registry: &Registry,
        section: &str,
        method: &str,
        args: impl Into<Input<'a>>,
    ) -> Result<Self, Error> {
        let meta = registry.find_call_by_name(section, method)?;
        let args = Struct::from_input(registry, &meta.args, args.into())?;
        Ok(Call { meta, args })
    }

    /// The pallet name, in camelCase.
    pub fn section(&self) -> &str {
        &self.meta.section
    }

    /// The call name, in camelCase.
    pub fn method(&self) -> &str {
        &self.meta.method
    }

    /// The pallet index followed by the call index.
    pub fn call_index(&self) -> [u8; 2] {
        self.meta.index
    }

    /// The call arguments.
    pub fn args(&self) -> &Struct {
        &self.args
    }

    /// The metadata describing this call.
    pub fn meta(&self) -> &CallFunction {
        &self.meta
    }

    fn from_input(registry: &Registry, input: Input<'_>) -> Result<Self, Error> {
        match input.normalize_hex() {
            Input::Bytes(bytes) => Call::decode(registry, &mut bytes.as_ref()),
            Input::Hex(hex) => Call::decode(registry, &mut from_hex(&hex)?.as_slice()),
            Input::Codec(existing) => match existing.downcast_ref::<Call>() {
                Some(call) => Ok(call.clone()),
                None => Call::decode(registry, &mut existing.to_u8a().as_slice()),
            },
            input => {
                let describe = input.describe();
                let mut entries = input_entries(input).ok_or_else(|| {
                    Error::invalid_value(Self::NAME, &describe, "expected an object")
                })?;
                let args = take_entry(&mut entries, "args");
                let meta = match take_entry(&mut entries, "callIndex") {
                    Input::Default => {
                        let section = entry_str(&mut entries, "section", &describe)?;
                        let method = entry_str(&mut entries, "method", &describe)?;
                        registry.find_call_by_name(&section, &method)?
                    }
                    index => registry.find_meta_call(call_index(index, &describe)?)?,
                };
                let args = Struct::from_input(registry, &meta.args, args)?;
                Ok(Call { meta, args })
            }
        }
    }
}

fn entry_str(
    entries: &mut Vec<(String, Input<'_>)>,
    key: &str,
    describe: &str,
) -> Result<String, Error> {
    match take_entry(entries, key) {
        Input::Json(Value::String(s)) => Ok(s),
        _ => Err(Error::invalid_value(
            Call::NAME,
            describe,
            format!("expected a string {key}"),
        )),
    }
}

fn call_index(input: Input<'_>, describe: &str) -> Result<[u8; 2], Error> {
    let bytes = match input.normalize_hex() {
        Input::Hex(hex) => from_hex(&hex)?,
        Input::Bytes(bytes) => bytes.into_owned(),
        Input::Json(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
            .collect::<Option<Vec<u8>>>()
            .unwrap_or_default(),
        _ => Vec::new(),
    };
    <[u8; 2]>::try_from(bytes.as_slice())
        .map_err(|_| Error::invalid_value(Call::NAME, describe, "expected a 2 byte callIndex"))
}

impl NativeCodec for Call {
    const NAME: &'static str = "Call";

    fn decode(registry: &Registry, cursor: &mut &[u8]) -> Result<Self, Error> {
        let index = take_bytes(Self::NAME, cursor, 2)?;
        let meta = registry.find_meta_call([index[0], index[1]])?;
        let args = Struct::decode(registry, &meta.args, cursor)?;
        Ok(Call { meta, args })
    }

    fn construct(registry: &Registry, input: Input<'_>) -> Result<Self, Error> {
        Call::from_input(registry, input)
    }
}

impl Codec for Call {
    fn raw_type(&self) -> String {
        Self::NAME.into()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.meta.index);
        self.args.encode_to(out);
    }

    fn encoded_length(&self) -> usize {
        2 + self.args.encoded_length()
    }

    fn to_json(&self) -> Value {
        json!({
            "callIndex": to_hex(&self.meta.index),
            "args": self.args.to_json(),
        })
    }

    fn to_human(&self) -> Value {
        json!({
            "args": self.args.to_human(),
            "method": self.meta.method,
            "section": self.meta.section,
        })
    }

    fn to_primitive(&self) -> Value {
        json!({
            "callIndex": to_hex(&self.meta.index),
            "args": self.args.to_primitive(),
        })
    }

    fn is_empty(&self) -> bool {
        false
    }
}

/// A runtime event: the pallet and event index followed by the event data.
#[derive(Debug, Clone)]
pub struct Event {
    meta: Arc<CallFunction>,
    data: Struct,
}

impl Event {
    /// The pallet name, in camelCase.
    pub fn section(&self) -> &str {
        &self.meta.section
    }

    /// The event name.
    pub fn method(&self) -> &str {
        &self.meta.method
    }

    /// The pallet index followed by the event index.
    pub fn index(&self) -> [u8; 2] {
        self.meta.index
    }

    /// The event data.
    pub fn data(&self) -> &Struct {
        &self.data
    }

    /// The metadata describing this event.
    pub fn meta(&self) -> &CallFunction {
        &self.meta
    }
}

impl NativeCodec for Event {
    const NAME: &'static str = "Event";

    fn decode(registry: &Registry, cursor: &mut &[u8]) -> Result<Self, Error> {
        let index = take_bytes(Self::NAME, cursor, 2)?;
        let meta = registry.find_meta_event([index[0], index[1]])?;
        let data = Struct::decode(registry, &meta.args, cursor)?;
        Ok(Event { meta, data })
    }

    fn construct(registry: &Registry, input: Input<'_>) -> Result<Self, Error> {
        match input.normalize_hex() {
            Input::Bytes(bytes) => Event::decode(registry, &mut bytes.as_ref()),
            Input::Hex(hex) => Event::decode(registry, &mut from_hex(&hex)?.as_slice()),
            Input::Codec(existing) => match existing.downcast_ref::<Event>() {
                Some(event) => Ok(event.clone()),
                None => Event::decode(registry, &mut existing.to_u8a().as_slice()),
            },
            input => {
                let describe = input.describe();
                let mut entries = input_entries(input).ok_or_else(|| {
                    Error::invalid_value(Self::NAME, &describe, "expected an object")
                })?;
                let data = take_entry(&mut entries, "data");
                let meta = registry.find_meta_event(call_index(take_entry(&mut entries, "index"), &describe)?)?;
                let data = Struct::from_input(registry, &meta.args, data)?;
                Ok(Event { meta, data })
            }
        }
    }
}

impl Codec for Event {
    fn raw_type(&self) -> String {
        Self::NAME.into()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.meta.index);
        self.data.encode_to(out);
    }

    fn to_json(&self) -> Value {
        let data: Vec<Value> = self.data.iter().map(|(_, v)| v.to_json()).collect();
        json!({ "index": to_hex(&self.meta.index), "data": data })
    }

    fn to_human(&self) -> Value {
        let data: Map<String, Value> = self
            .data
            .iter()
            .map(|(name, v)| (name.to_owned(), v.to_human()))
            .collect();
        json!({
            "method": self.meta.method,
            "section": self.meta.section,
            "index": to_hex(&self.meta.index),
            "data": data,
        })
    }

    fn is_empty(&self) -> bool {
        false
    }
}
