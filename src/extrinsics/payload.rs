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

use super::call::Call;
use super::era::ExtrinsicEra;
use super::signature::{SignOptions, Signer, compact_of, era_of};
use super::{input_entries, signed_extension_version, take_entry};
use crate::codec::{Bytes, Codec, Input, Struct};
use crate::error::Error;
use crate::registry::Registry;
use crate::types::{NativeCodec, TypeDef};
use crate::utils::from_hex;
use serde_json::{Map, Value};

// Payloads longer than this are hashed before signing.
const MAX_UNHASHED_PAYLOAD: usize = 256;

/// The data an extrinsic signature is made over: the call, then the
/// explicit signed extension values, then the implicit ones (such as the
/// genesis hash) which are not part of the extrinsic itself.
#[derive(Debug, Clone)]
pub struct ExtrinsicPayload {
    method: Bytes,
    explicit: Struct,
    implicit: Struct,
}

impl ExtrinsicPayload {
    /// The payload for signing some call with the signed extensions of the
    /// given extension version.
    pub fn new(
        registry: &Registry,
        call: &Call,
        extension_version: u8,
        options: &SignOptions,
    ) -> Result<Self, Error> {
        let shapes = registry.extension_shapes(extension_version)?;
        Ok(ExtrinsicPayload {
            method: Bytes::new(call.to_u8a()),
            explicit: options.to_struct(registry, &shapes.explicit)?,
            implicit: options.to_struct(registry, &shapes.implicit)?,
        })
    }

    /// The encoded call.
    pub fn method(&self) -> &[u8] {
        self.method.as_bytes()
    }

    /// The explicit signed extension values, as found in the extrinsic.
    pub fn explicit(&self) -> &Struct {
        &self.explicit
    }

    /// The implicit signed extension values.
    pub fn implicit(&self) -> &Struct {
        &self.implicit
    }

    /// The era, immortal unless the extensions carry one.
    pub fn era(&self) -> ExtrinsicEra {
        era_of(&self.explicit)
    }

    /// The account nonce.
    pub fn nonce(&self) -> u128 {
        compact_of(&self.explicit, "nonce")
    }

    /// The tip.
    pub fn tip(&self) -> u128 {
        compact_of(&self.explicit, "tip")
    }

    /// The bytes which get signed: the call without its length prefix
    /// followed by the extension values, hashed with the registry hasher
    /// when longer than 256 bytes.
    pub fn signing_payload(&self, registry: &Registry) -> Vec<u8> {
        let mut out = self.method.as_bytes().to_vec();
        self.explicit.encode_to(&mut out);
        self.implicit.encode_to(&mut out);
        if out.len() > MAX_UNHASHED_PAYLOAD {
            registry.hash(&out).to_vec()
        } else {
            out
        }
    }

    /// Sign the payload.
    pub fn sign(&self, registry: &Registry, signer: &dyn Signer) -> Result<Input<'static>, Error> {
        signer.sign(&self.signing_payload(registry))
    }

    fn from_input(registry: &Registry, input: Input<'_>) -> Result<Self, Error> {
        match input.normalize_hex() {
            Input::Bytes(bytes) => ExtrinsicPayload::decode(registry, &mut bytes.as_ref()),
            Input::Hex(hex) => ExtrinsicPayload::decode(registry, &mut from_hex(&hex)?.as_slice()),
            Input::Codec(existing) => match existing.downcast_ref::<ExtrinsicPayload>() {
                Some(payload) => Ok(payload.clone()),
                None => ExtrinsicPayload::decode(registry, &mut existing.to_u8a().as_slice()),
            },
            input => {
                let describe = input.describe();
                let mut entries = input_entries(input).ok_or_else(|| {
                    Error::invalid_value(Self::NAME, &describe, "expected an object")
                })?;
                let method = match take_entry(&mut entries, "method") {
                    Input::Codec(existing) => Bytes::new(existing.to_u8a()),
                    other => TypeDef::Bytes
                        .construct(registry, other)?
                        .downcast::<Bytes>()
                        .unwrap_or_default(),
                };
                let shapes = registry.extension_shapes(signed_extension_version(registry))?;
                let explicit = Struct::from_input(registry, &shapes.explicit, Input::Object(entries.clone()))?;
                let implicit = Struct::from_input(registry, &shapes.implicit, Input::Object(entries))?;
                Ok(ExtrinsicPayload {
                    method,
                    explicit,
                    implicit,
                })
            }
        }
    }
}

impl NativeCodec for ExtrinsicPayload {
    const NAME: &'static str = "ExtrinsicPayload";

    fn decode(registry: &Registry, cursor: &mut &[u8]) -> Result<Self, Error> {
        let method = Bytes::decode(cursor)?;
        let shapes = registry.extension_shapes(signed_extension_version(registry))?;
        let explicit = Struct::decode(registry, &shapes.explicit, cursor)?;
        let implicit = Struct::decode(registry, &shapes.implicit, cursor)?;
        Ok(ExtrinsicPayload {
            method,
            explicit,
            implicit,
        })
    }

    fn construct(registry: &Registry, input: Input<'_>) -> Result<Self, Error> {
        ExtrinsicPayload::from_input(registry, input)
    }
}

impl ExtrinsicPayload {
    fn render(&self, f: impl Fn(&dyn Codec) -> Value) -> Value {
        let mut map = Map::new();
        map.insert("method".into(), f(&self.method));
        for (name, value) in self.explicit.iter().chain(self.implicit.iter()) {
            map.insert(name.to_owned(), f(value));
        }
        Value::Object(map)
    }
}

impl Codec for ExtrinsicPayload {
    fn raw_type(&self) -> String {
        Self::NAME.into()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        self.method.encode_to(out);
        self.explicit.encode_to(out);
        self.implicit.encode_to(out);
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
}
