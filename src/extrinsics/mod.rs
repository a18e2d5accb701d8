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

//! Extrinsics and the types they are built from: calls, eras, signatures
//! and signing payloads.
//!
//! An extrinsic is encoded as a compact length followed by a version byte,
//! an optional preamble and the call. The low six bits of the version byte
//! hold the format version and the top two bits the kind of preamble:
//!
//! - `0b00`: bare, no preamble.
//! - `0b10`: signed (version 4 only); the signer, signature and explicit
//!   signed extension values follow.
//! - `0b01`: general (version 5 only); an extension version byte and the
//!   extension values follow.

mod call;
mod era;
mod payload;
mod signature;

pub use call::{Call, Event};
pub use era::{ExtrinsicEra, ImmortalEra, MortalEra};
pub use payload::ExtrinsicPayload;
pub use signature::{ExtrinsicSignature, SignOptions, Signer};

use crate::codec::{Codec, Input, Int, Struct, decode_length, encode_length, take_bytes};
use crate::error::Error;
use crate::registry::{Hasher, Registry};
use crate::types::{NativeCodec, TypeDef};
use crate::utils::{camel_case, from_hex};
use serde_json::{Map, Value};
use std::sync::OnceLock;

const BARE: u8 = 0b00;
const GENERAL: u8 = 0b01;
const SIGNED: u8 = 0b10;

const VERSION_MASK: u8 = 0b0011_1111;

/// What precedes the call in an extrinsic.
#[derive(Debug, Clone)]
pub enum Preamble {
    /// Nothing; an inherent or unsigned transaction.
    Bare,
    /// A signed transaction.
    Signed(ExtrinsicSignature),
    /// A transaction whose origin is worked out by its extensions.
    General {
        /// The version of the extensions in use.
        extension_version: u8,
        /// The explicit extension values.
        extensions: Struct,
    },
}

impl Preamble {
    fn bits(&self) -> u8 {
        match self {
            Preamble::Bare => BARE,
            Preamble::Signed(_) => SIGNED,
            Preamble::General { .. } => GENERAL,
        }
    }
}

/// The kind of preamble to build an extrinsic with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreambleKind {
    /// No preamble; it can be signed later on.
    #[default]
    Bare,
    /// A general preamble carrying extension values.
    General,
}

/// Options for [`Extrinsic::new`].
#[derive(Debug, Clone, Default)]
pub struct ExtrinsicOptions {
    /// The format version; the latest the metadata supports if not given.
    pub version: Option<u8>,
    /// The kind of preamble.
    pub preamble: PreambleKind,
    /// The extension version of a general extrinsic.
    pub extension_version: u8,
    /// The extension values of a general extrinsic.
    pub extensions: SignOptions,
}

/// An extrinsic: a call with an optional preamble saying who sent it.
///
/// The hash of an extrinsic is calculated on first use and cached until the
/// extrinsic is signed.
#[derive(Debug, Clone)]
pub struct Extrinsic {
    version: u8,
    preamble: Preamble,
    call: Call,
    hasher: Hasher,
    hash: OnceLock<[u8; 32]>,
}

impl Extrinsic {
    /// A new extrinsic around some call.
    pub fn new(registry: &Registry, call: Call, options: ExtrinsicOptions) -> Result<Self, Error> {
        let version = options.version.unwrap_or_else(|| registry.extrinsic_version());
        let preamble = match options.preamble {
            PreambleKind::Bare => Preamble::Bare,
            PreambleKind::General => {
                let shapes = registry.extension_shapes(options.extension_version)?;
                Preamble::General {
                    extension_version: options.extension_version,
                    extensions: options.extensions.to_struct(registry, &shapes.explicit)?,
                }
            }
        };
        check_version(version, preamble.bits())?;
        Ok(Extrinsic {
            version,
            preamble,
            call,
            hasher: registry.hasher(),
            hash: OnceLock::new(),
        })
    }

    /// The format version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// The preamble.
    pub fn preamble(&self) -> &Preamble {
        &self.preamble
    }

    /// The call.
    pub fn call(&self) -> &Call {
        &self.call
    }

    /// Does this extrinsic carry a signature.
    pub fn is_signed(&self) -> bool {
        matches!(self.preamble, Preamble::Signed(_))
    }

    /// Does this extrinsic have a general preamble.
    pub fn is_general(&self) -> bool {
        matches!(self.preamble, Preamble::General { .. })
    }

    /// Does this extrinsic have no preamble.
    pub fn is_bare(&self) -> bool {
        matches!(self.preamble, Preamble::Bare)
    }

    /// The signer address, if signed. General extrinsics have no signer.
    pub fn signer(&self) -> Result<Option<&dyn Codec>, Error> {
        match &self.preamble {
            Preamble::Bare => Ok(None),
            Preamble::Signed(sig) => Ok(Some(sig.signer())),
            Preamble::General { .. } => Err(Error::UnsupportedOperation("signer")),
        }
    }

    /// The signature, if signed. General extrinsics have no signature.
    pub fn signature(&self) -> Result<Option<&dyn Codec>, Error> {
        match &self.preamble {
            Preamble::Bare => Ok(None),
            Preamble::Signed(sig) => Ok(Some(sig.signature())),
            Preamble::General { .. } => Err(Error::UnsupportedOperation("signature")),
        }
    }

    /// The explicit extension values of a signed or general extrinsic.
    pub fn extensions(&self) -> Option<&Struct> {
        match &self.preamble {
            Preamble::Bare => None,
            Preamble::Signed(sig) => Some(sig.extra()),
            Preamble::General { extensions, .. } => Some(extensions),
        }
    }

    /// The era, immortal unless the extensions carry one.
    pub fn era(&self) -> ExtrinsicEra {
        self.extensions().map(signature::era_of).unwrap_or_default()
    }

    /// The account nonce.
    pub fn nonce(&self) -> u128 {
        self.extensions()
            .map_or(0, |ext| signature::compact_of(ext, "nonce"))
    }

    /// The tip.
    pub fn tip(&self) -> u128 {
        self.extensions()
            .map_or(0, |ext| signature::compact_of(ext, "tip"))
    }

    /// The hash of the encoded extrinsic.
    pub fn hash(&self) -> [u8; 32] {
        *self.hash.get_or_init(|| (self.hasher)(&self.to_u8a()))
    }

    /// The payload a signer signs for this extrinsic.
    pub fn payload(&self, registry: &Registry, options: &SignOptions) -> Result<ExtrinsicPayload, Error> {
        ExtrinsicPayload::new(registry, &self.call, signed_extension_version(registry), options)
    }

    /// Sign the extrinsic, replacing any existing preamble.
    pub fn sign(
        &mut self,
        registry: &Registry,
        signer: &dyn Signer,
        options: &SignOptions,
    ) -> Result<(), Error> {
        check_version(self.version, SIGNED)?;
        let payload = self.payload(registry, options)?;
        let signature = payload.sign(registry, signer)?;
        let sig = ExtrinsicSignature::new(
            registry,
            signer.address(),
            signature,
            payload.explicit().clone(),
        )?;
        self.set_preamble(Preamble::Signed(sig));
        Ok(())
    }

    /// Attach a signature made elsewhere.
    pub fn add_signature<'a>(
        &mut self,
        registry: &Registry,
        address: impl Into<Input<'a>>,
        signature: impl Into<Input<'a>>,
        options: &SignOptions,
    ) -> Result<(), Error> {
        check_version(self.version, SIGNED)?;
        let extra = self.explicit_extensions(registry, options)?;
        let sig = ExtrinsicSignature::new(registry, address.into(), signature.into(), extra)?;
        self.set_preamble(Preamble::Signed(sig));
        Ok(())
    }

    /// Attach a signature which has the right shape but is not valid. The
    /// result is only useful for estimating fees.
    pub fn sign_fake<'a>(
        &mut self,
        registry: &Registry,
        address: impl Into<Input<'a>>,
        options: &SignOptions,
    ) -> Result<(), Error> {
        check_version(self.version, SIGNED)?;
        let extra = self.explicit_extensions(registry, options)?;
        let sig = ExtrinsicSignature::fake(registry, address.into(), extra)?;
        self.set_preamble(Preamble::Signed(sig));
        Ok(())
    }

    fn explicit_extensions(&self, registry: &Registry, options: &SignOptions) -> Result<Struct, Error> {
        let shapes = registry.extension_shapes(signed_extension_version(registry))?;
        options.to_struct(registry, &shapes.explicit)
    }

    fn set_preamble(&mut self, preamble: Preamble) {
        self.preamble = preamble;
        self.hash.take();
    }

    fn decode_inner(registry: &Registry, cursor: &mut &[u8]) -> Result<Self, Error> {
        let first = take_bytes(Self::NAME, cursor, 1)?[0];
        let version = first & VERSION_MASK;
        let bits = first >> 6;
        check_version(version, bits)?;

        let preamble = match bits {
            SIGNED => {
                let version = signed_extension_version(registry);
                Preamble::Signed(ExtrinsicSignature::decode(registry, version, cursor)?)
            }
            GENERAL => {
                let extension_version = take_bytes(Self::NAME, cursor, 1)?[0];
                let shapes = registry.extension_shapes(extension_version)?;
                Preamble::General {
                    extension_version,
                    extensions: Struct::decode(registry, &shapes.explicit, cursor)?,
                }
            }
            _ => Preamble::Bare,
        };
        let call = Call::decode(registry, cursor)?;
        log::trace!(
            "Decoded v{version} extrinsic {}.{}",
            call.section(),
            call.method()
        );
        Ok(Extrinsic {
            version,
            preamble,
            call,
            hasher: registry.hasher(),
            hash: OnceLock::new(),
        })
    }

    // The length prefix must cover exactly the bytes which follow it.
    fn from_bytes(registry: &Registry, bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = bytes;
        let len = decode_length(Self::NAME, &mut cursor)?;
        if len != cursor.len() {
            return Err(Error::DecodeLength {
                ty: Self::NAME.into(),
                expected: len,
                found: cursor.len(),
            });
        }
        <Extrinsic as NativeCodec>::decode(registry, &mut &*bytes)
    }

    fn from_input(registry: &Registry, input: Input<'_>) -> Result<Self, Error> {
        match input.normalize_hex() {
            Input::Bytes(bytes) => Extrinsic::from_bytes(registry, &bytes),
            Input::Hex(hex) => Extrinsic::from_bytes(registry, &from_hex(&hex)?),
            Input::Codec(existing) => {
                if let Some(ext) = existing.downcast_ref::<Extrinsic>() {
                    Ok(ext.clone())
                } else if let Some(call) = existing.downcast_ref::<Call>() {
                    Extrinsic::new(registry, call.clone(), ExtrinsicOptions::default())
                } else {
                    Extrinsic::from_bytes(registry, &existing.to_u8a())
                }
            }
            input => {
                let describe = input.describe();
                let mut entries = input_entries(input).ok_or_else(|| {
                    Error::invalid_value(Self::NAME, &describe, "expected an object with a method")
                })?;
                let call = Call::construct(registry, take_entry(&mut entries, "method"))?;
                let version = match take_entry(&mut entries, "version") {
                    Input::Default => None,
                    version => u8::try_from(input_u64(registry, version)?).ok(),
                };
                let options = ExtrinsicOptions {
                    version,
                    ..ExtrinsicOptions::default()
                };
                let mut ext = Extrinsic::new(registry, call, options)?;

                let signer = take_entry(&mut entries, "signer");
                let signature = take_entry(&mut entries, "signature");
                if !matches!(signer, Input::Default) {
                    let options = SignOptions::from_entries(entries);
                    match signature {
                        Input::Default => ext.sign_fake(registry, signer, &options)?,
                        signature => ext.add_signature(registry, signer, signature, &options)?,
                    }
                }
                Ok(ext)
            }
        }
    }

    fn encode_inner(&self, out: &mut Vec<u8>) {
        out.push(self.version | (self.preamble.bits() << 6));
        match &self.preamble {
            Preamble::Bare => {}
            Preamble::Signed(sig) => sig.encode_to(out),
            Preamble::General {
                extension_version,
                extensions,
            } => {
                out.push(*extension_version);
                extensions.encode_to(out);
            }
        }
        self.call.encode_to(out);
    }
}

impl NativeCodec for Extrinsic {
    const NAME: &'static str = "Extrinsic";

    fn decode(registry: &Registry, cursor: &mut &[u8]) -> Result<Self, Error> {
        let len = decode_length(Self::NAME, cursor)?;
        let inner = &mut take_bytes(Self::NAME, cursor, len)?;
        let ext = Extrinsic::decode_inner(registry, inner)?;
        if !inner.is_empty() {
            return Err(Error::DecodeLength {
                ty: Self::NAME.into(),
                expected: len - inner.len(),
                found: len,
            });
        }
        Ok(ext)
    }

    fn construct(registry: &Registry, input: Input<'_>) -> Result<Self, Error> {
        Extrinsic::from_input(registry, input)
    }
}

impl Codec for Extrinsic {
    fn raw_type(&self) -> String {
        Self::NAME.into()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        let mut inner = Vec::new();
        self.encode_inner(&mut inner);
        encode_length(inner.len(), out);
        out.extend_from_slice(&inner);
    }

    fn to_json(&self) -> Value {
        Value::String(self.to_hex())
    }

    fn to_human(&self) -> Value {
        let mut map = Map::new();
        map.insert("isSigned".into(), Value::Bool(self.is_signed()));
        map.insert("method".into(), self.call.to_human());
        match &self.preamble {
            Preamble::Bare => {}
            Preamble::Signed(sig) => {
                map.insert("era".into(), self.era().to_human());
                map.insert("nonce".into(), Value::String(self.nonce().to_string()));
                map.extend(sig.to_human());
                map.insert("tip".into(), Value::String(self.tip().to_string()));
            }
            Preamble::General { extensions, .. } => {
                map.insert("extensions".into(), extensions.to_human());
            }
        }
        Value::Object(map)
    }

    fn to_primitive(&self) -> Value {
        self.to_json()
    }

    fn is_empty(&self) -> bool {
        false
    }
}

fn check_version(version: u8, preamble: u8) -> Result<(), Error> {
    match (version, preamble) {
        (4, BARE | SIGNED) | (5, BARE | GENERAL) => Ok(()),
        _ => Err(Error::UnsupportedExtrinsicVersion { version, preamble }),
    }
}

// Signed extrinsics use the first extension version the metadata declares.
pub(crate) fn signed_extension_version(registry: &Registry) -> u8 {
    registry.extension_versions().first().copied().unwrap_or(0)
}

/// The entries of object input, or `None` for any other input.
pub(crate) fn input_entries(input: Input<'_>) -> Option<Vec<(String, Input<'_>)>> {
    match input {
        Input::Json(Value::Object(map)) => {
            Some(map.into_iter().map(|(k, v)| (k, Input::Json(v))).collect())
        }
        Input::Object(entries) => Some(entries),
        _ => None,
    }
}

/// Take the entry with some key, matched exactly or in camelCase, leaving
/// [`Input::Default`] if there is none.
pub(crate) fn take_entry<'a>(entries: &mut Vec<(String, Input<'a>)>, key: &str) -> Input<'a> {
    let idx = entries
        .iter()
        .position(|(k, _)| k == key)
        .or_else(|| entries.iter().position(|(k, _)| camel_case(k) == key));
    match idx {
        Some(idx) => entries.remove(idx).1,
        None => Input::Default,
    }
}

/// Read some input as an unsigned number.
pub(crate) fn input_u64(registry: &Registry, input: Input<'_>) -> Result<u64, Error> {
    let value = TypeDef::uint(64).construct(registry, input)?;
    value
        .downcast_ref::<Int>()
        .and_then(Int::to_u64)
        .ok_or_else(|| Error::invalid_value("u64", value.to_hex(), "expected an unsigned number"))
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

    fn remark(registry: &Registry) -> Call {
        Call::new(registry, "system", "remark", Input::from(json!({ "remark": [1, 2, 3] }))).unwrap()
    }

    fn address() -> Input<'static> {
        Input::from(json!({ "Id": format!("0x{}", "11".repeat(32)) }))
    }

    struct TestSigner;

    impl Signer for TestSigner {
        fn address(&self) -> Input<'static> {
            address()
        }

        fn sign(&self, payload: &[u8]) -> Result<Input<'static>, Error> {
            // A "signature" made of the payload length, for checking it got here.
            let mut sig = vec![payload.len() as u8; 64];
            sig[0] = 0xff;
            Ok(Input::object([("Ed25519", Input::from(sig))]))
        }
    }

    #[test]
    fn bare_extrinsics() {
        let registry = registry();
        let ext = Extrinsic::new(&registry, remark(&registry), ExtrinsicOptions::default()).unwrap();
        assert!(ext.is_bare());
        assert_eq!(ext.version(), 4);
        // length 7, version 4, call index, Bytes [1, 2, 3].
        assert_eq!(ext.to_u8a(), vec![7 << 2, 0x04, 0, 0, 3 << 2, 1, 2, 3]);
        assert_eq!(ext.signer().unwrap().map(|s| s.to_hex()), None);
        assert_eq!(
            ext.to_human(),
            json!({
                "isSigned": false,
                "method": { "args": { "remark": "0x010203" }, "method": "remark", "section": "system" },
            })
        );
    }

    #[test]
    fn decodes_only_with_matching_length_prefix() {
        let registry = registry();
        let ext = Extrinsic::new(&registry, remark(&registry), ExtrinsicOptions::default()).unwrap();
        let full = ext.to_u8a();

        let decoded = registry.create_type("Extrinsic", full.clone()).unwrap();
        assert_eq!(decoded.to_u8a(), full);

        // The inner bytes alone have a prefix which doesn't match.
        assert!(matches!(
            Extrinsic::construct(&registry, Input::from(&full[1..])),
            Err(Error::DecodeLength { .. })
        ));

        // A length prefix which overruns the data.
        let mut short = full.clone();
        short.pop();
        assert!(matches!(
            Extrinsic::decode(&registry, &mut short.as_slice()),
            Err(Error::DecodeLength { .. })
        ));
        assert!(matches!(
            registry.create_type("Extrinsic", short),
            Err(Error::DecodeLength { .. })
        ));

        // Trailing bytes after the prefixed length.
        let mut long = full;
        long.push(0);
        assert!(matches!(
            registry.create_type("Extrinsic", long),
            Err(Error::DecodeLength { .. })
        ));
    }

    #[test]
    fn length_prefix_overrun_is_reported() {
        let registry = registry();
        assert_eq!(
            registry.create_type("Extrinsic", vec![0x1c, 4, 0, 0]).unwrap_err(),
            Error::DecodeLength {
                ty: "Extrinsic".into(),
                expected: 7,
                found: 3,
            }
        );
    }

    #[test]
    fn unsupported_versions() {
        let registry = registry();
        assert_eq!(
            Extrinsic::decode(&registry, &mut &[4u8, 0x03][..]).unwrap_err(),
            Error::UnsupportedExtrinsicVersion { version: 3, preamble: 0 }
        );
        // A general preamble on version 4, and preamble bits 0b11.
        assert!(Extrinsic::decode(&registry, &mut &[4u8, 0x44][..]).is_err());
        assert!(Extrinsic::decode(&registry, &mut &[4u8, 0xc4][..]).is_err());
    }

    #[test]
    fn signing_resets_the_hash() {
        let registry = registry();
        let mut ext = Extrinsic::new(&registry, remark(&registry), ExtrinsicOptions::default()).unwrap();
        let bare_hash = ext.hash();
        assert_eq!(bare_hash, sp_crypto_hashing::blake2_256(&ext.to_u8a()));

        let options = SignOptions::new()
            .nonce(2)
            .tip(5)
            .era(ExtrinsicEra::mortal(64, 5))
            .block_hash([0xaa; 32]);
        ext.sign(&registry, &TestSigner, &options).unwrap();
        assert!(ext.is_signed());
        assert_ne!(ext.hash(), bare_hash);
        assert_eq!(ext.hash(), sp_crypto_hashing::blake2_256(&ext.to_u8a()));
        assert_eq!((ext.nonce(), ext.tip()), (2, 5));
        assert_eq!(ext.era(), ExtrinsicEra::mortal(64, 5));

        // call (6 bytes) + era, nonce, tip + block hash is the signed payload.
        let sig = ext.signature().unwrap().unwrap().to_u8a();
        assert_eq!(sig[0], 0);
        assert_eq!(sig[1], 0xff);
        assert_eq!(sig[2], 6 + 4 + 32);

        let bytes = ext.to_u8a();
        assert_eq!(bytes[1], 0x84);
        let decoded = Extrinsic::decode(&registry, &mut bytes.as_slice()).unwrap();
        assert!(decoded.is_signed());
        assert_eq!(decoded.nonce(), 2);
        assert_eq!(decoded.hash(), ext.hash());

        let human = decoded.to_human();
        assert_eq!(human["isSigned"], json!(true));
        assert_eq!(human["nonce"], json!("2"));
        assert_eq!(human["era"], json!({ "MortalEra": { "period": "64", "phase": "5" } }));
    }

    #[test]
    fn fake_signatures_and_json_input() {
        let registry = registry();
        let mut ext = Extrinsic::new(&registry, remark(&registry), ExtrinsicOptions::default()).unwrap();
        let hash = ext.hash();
        ext.sign_fake(&registry, address(), &SignOptions::new().nonce(1)).unwrap();
        assert_ne!(ext.hash(), hash);
        assert_eq!(ext.nonce(), 1);

        let from_json = registry
            .create_type(
                "Extrinsic",
                Input::from(json!({
                    "method": remark(&registry).to_hex(),
                    "signer": { "Id": format!("0x{}", "11".repeat(32)) },
                    "nonce": 1,
                })),
            )
            .unwrap();
        assert_eq!(from_json.to_hex(), ext.to_hex());
    }

    #[test]
    fn general_extrinsics() {
        let registry = registry();
        let options = ExtrinsicOptions {
            version: Some(5),
            preamble: PreambleKind::General,
            extension_version: 0,
            extensions: SignOptions::new().nonce(9),
        };
        let ext = Extrinsic::new(&registry, remark(&registry), options).unwrap();
        assert!(ext.is_general());
        assert_eq!(ext.nonce(), 9);
        assert_eq!(ext.signer().unwrap_err(), Error::UnsupportedOperation("signer"));
        assert_eq!(ext.signature().unwrap_err(), Error::UnsupportedOperation("signature"));

        let bytes = ext.to_u8a();
        // version 5 with the general bits, then extension version 0, era, nonce, tip.
        assert_eq!(&bytes[1..6], &[0x45, 0, 0, 9 << 2, 0]);
        let decoded = Extrinsic::decode(&registry, &mut bytes.as_slice()).unwrap();
        assert!(decoded.is_general());
        assert_eq!(decoded.to_u8a(), bytes);

        // General extrinsics cannot be signed.
        let mut ext = decoded;
        assert!(matches!(
            ext.sign_fake(&registry, address(), &SignOptions::new()),
            Err(Error::UnsupportedExtrinsicVersion { version: 5, .. })
        ));
    }
}
