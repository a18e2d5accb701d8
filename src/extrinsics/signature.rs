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

use super::era::ExtrinsicEra;
use crate::codec::{Codec, Compact, Input, Struct, StructDef};
use crate::error::Error;
use crate::registry::Registry;
use crate::types::TypeDef;
use serde_json::{Map, Value};
use std::sync::Arc;

// The names the signer address and signature types are registered under.
pub(crate) const ADDRESS: &str = "Address";
pub(crate) const SIGNATURE: &str = "ExtrinsicSignature";

// The byte used to fill fake signatures.
const FAKE_SIGNATURE_BYTE: u8 = 0x42;

/// Something which can sign extrinsic payloads.
pub trait Signer {
    /// The address of the signing account, constructed as `Address`.
    fn address(&self) -> Input<'static>;

    /// Sign the payload, returning something which can be constructed as an
    /// `ExtrinsicSignature`. The payload is already hashed when it is long.
    fn sign(&self, payload: &[u8]) -> Result<Input<'static>, Error>;
}

/// The values of the signed extension fields, by field name, eg `nonce`,
/// `era` or `blockHash`. Fields which are not given take their default
/// value.
#[derive(Debug, Clone, Default)]
pub struct SignOptions {
    values: Vec<(String, Input<'static>)>,
}

impl SignOptions {
    /// No values; every field takes its default.
    pub fn new() -> Self {
        SignOptions::default()
    }

    pub(crate) fn from_entries(entries: Vec<(String, Input<'_>)>) -> Self {
        SignOptions {
            values: entries
                .into_iter()
                .map(|(name, value)| (name, value.into_owned()))
                .collect(),
        }
    }

    /// Set some field.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Input<'static>>) -> Self {
        let field = field.into();
        let value = value.into();
        match self.values.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((field, value)),
        }
        self
    }

    /// Set the account nonce.
    pub fn nonce(self, nonce: u64) -> Self {
        self.with("nonce", nonce)
    }

    /// Set the tip.
    pub fn tip(self, tip: u128) -> Self {
        self.with("tip", tip)
    }

    /// Set the era.
    pub fn era(self, era: ExtrinsicEra) -> Self {
        self.with("era", Input::Codec(Box::new(era)))
    }

    /// Set the hash of the block the era starts at.
    pub fn block_hash(self, hash: [u8; 32]) -> Self {
        self.with("blockHash", hash.to_vec())
    }

    /// Set the genesis hash of the chain.
    pub fn genesis_hash(self, hash: [u8; 32]) -> Self {
        self.with("genesisHash", hash.to_vec())
    }

    /// Set the runtime spec version.
    pub fn spec_version(self, version: u32) -> Self {
        self.with("specVersion", version)
    }

    /// Set the runtime transaction version.
    pub fn transaction_version(self, version: u32) -> Self {
        self.with("transactionVersion", version)
    }

    /// Construct the fields of some shape from these values.
    pub(crate) fn to_struct(&self, registry: &Registry, def: &Arc<StructDef>) -> Result<Struct, Error> {
        let entries = self
            .values
            .iter()
            .filter(|(name, _)| def.keys().any(|k| k == name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Struct::from_input(registry, def, Input::Object(entries))
    }
}

/// The signature part of a signed extrinsic: the signer address, the
/// signature and the explicit signed extension values.
#[derive(Debug, Clone)]
pub struct ExtrinsicSignature {
    signer: Box<dyn Codec>,
    signature: Box<dyn Codec>,
    extra: Struct,
}

impl ExtrinsicSignature {
    pub(crate) fn decode(
        registry: &Registry,
        extension_version: u8,
        cursor: &mut &[u8],
    ) -> Result<Self, Error> {
        let signer = TypeDef::named(ADDRESS).decode(registry, cursor)?;
        let signature = TypeDef::named(SIGNATURE).decode(registry, cursor)?;
        let shapes = registry.extension_shapes(extension_version)?;
        let extra = Struct::decode(registry, &shapes.explicit, cursor)?;
        Ok(ExtrinsicSignature {
            signer,
            signature,
            extra,
        })
    }

    pub(crate) fn new(
        registry: &Registry,
        signer: Input<'_>,
        signature: Input<'_>,
        extra: Struct,
    ) -> Result<Self, Error> {
        Ok(ExtrinsicSignature {
            signer: TypeDef::named(ADDRESS).construct(registry, signer)?,
            signature: TypeDef::named(SIGNATURE).construct(registry, signature)?,
            extra,
        })
    }

    /// A signature which is the right shape but not valid, for fee estimation.
    pub(crate) fn fake(registry: &Registry, signer: Input<'_>, extra: Struct) -> Result<Self, Error> {
        let bytes = vec![FAKE_SIGNATURE_BYTE; 64];
        let signature = match registry.resolve_def(&TypeDef::named(SIGNATURE))? {
            TypeDef::Enum(def) if def.by_name("Sr25519").is_some() => {
                Input::object([("Sr25519", Input::from(bytes))])
            }
            _ => Input::from(bytes),
        };
        ExtrinsicSignature::new(registry, signer, signature, extra)
    }

    /// The signer address.
    pub fn signer(&self) -> &dyn Codec {
        self.signer.as_ref()
    }

    /// The signature.
    pub fn signature(&self) -> &dyn Codec {
        self.signature.as_ref()
    }

    /// The explicit signed extension values.
    pub fn extra(&self) -> &Struct {
        &self.extra
    }

    /// The era, immortal unless the extensions carry one.
    pub fn era(&self) -> ExtrinsicEra {
        era_of(&self.extra)
    }

    /// The account nonce, zero unless the extensions carry one.
    pub fn nonce(&self) -> u128 {
        compact_of(&self.extra, "nonce")
    }

    /// The tip, zero unless the extensions carry one.
    pub fn tip(&self) -> u128 {
        compact_of(&self.extra, "tip")
    }

    pub(crate) fn to_human(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("signer".into(), self.signer.to_human());
        map.insert("signature".into(), self.signature.to_human());
        map
    }
}

impl Codec for ExtrinsicSignature {
    fn raw_type(&self) -> String {
        "ExtrinsicSignatureV4".into()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        self.signer.encode_to(out);
        self.signature.encode_to(out);
        self.extra.encode_to(out);
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("signer".into(), self.signer.to_json());
        map.insert("signature".into(), self.signature.to_json());
        if let Value::Object(extra) = self.extra.to_json() {
            map.extend(extra);
        }
        Value::Object(map)
    }
}

pub(crate) fn era_of(extra: &Struct) -> ExtrinsicEra {
    extra
        .get("era")
        .and_then(|era| era.downcast_ref::<ExtrinsicEra>())
        .copied()
        .unwrap_or_default()
}

pub(crate) fn compact_of(extra: &Struct, field: &str) -> u128 {
    extra
        .get(field)
        .and_then(|v| v.downcast_ref::<Compact>())
        .map_or(0, Compact::to_u128)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metadata::{MetadataVersioned, TypesAlias, fixtures};
    use serde_json::json;

    fn registry() -> Registry {
        let registry = Registry::new();
        let metadata =
            MetadataVersioned::from_bytes(&fixtures::metadata_bytes(), TypesAlias::new()).unwrap();
        registry.set_metadata(metadata).unwrap();
        registry
    }

    #[test]
    fn options_build_extension_values() {
        let registry = registry();
        let shapes = registry.extension_shapes(0).unwrap();
        let extra = SignOptions::new()
            .nonce(7)
            .tip(100)
            .era(ExtrinsicEra::mortal(64, 5))
            .nonce(8)
            .to_struct(&registry, &shapes.explicit)
            .unwrap();
        assert_eq!(compact_of(&extra, "nonce"), 8);
        assert_eq!(compact_of(&extra, "tip"), 100);
        assert_eq!(era_of(&extra), ExtrinsicEra::mortal(64, 5));

        let defaults = SignOptions::new().to_struct(&registry, &shapes.explicit).unwrap();
        assert_eq!(defaults.to_u8a(), vec![0, 0, 0]);
        assert!(era_of(&defaults).is_immortal());
    }

    #[test]
    fn fake_signatures_use_sr25519() {
        let registry = registry();
        let shapes = registry.extension_shapes(0).unwrap();
        let extra = SignOptions::new().to_struct(&registry, &shapes.explicit).unwrap();
        let address = Input::from(json!({ "Id": format!("0x{}", "11".repeat(32)) }));
        let sig = ExtrinsicSignature::fake(&registry, address, extra).unwrap();

        let bytes = sig.to_u8a();
        // MultiAddress::Id, 32 bytes, MultiSignature::Sr25519, 64 bytes, then the extra.
        assert_eq!(bytes.len(), 1 + 32 + 1 + 64 + 3);
        assert_eq!(bytes[33], 1);
        assert!(bytes[34..98].iter().all(|b| *b == 0x42));

        let decoded = ExtrinsicSignature::decode(&registry, 0, &mut bytes.as_slice()).unwrap();
        assert_eq!(decoded.to_u8a(), bytes);
        assert_eq!(decoded.nonce(), 0);
    }
}
