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

//! Decode runtime metadata and convert it forwards, one version at a time,
//! up to the latest version.
//!
//! ```rust
//! use frame_codec::metadata::MetadataVersioned;
//!
//! # fn run(bytes: &[u8]) -> Result<(), frame_codec::Error> {
//! let metadata = MetadataVersioned::from_bytes(bytes, Default::default())?;
//! let latest = metadata.as_latest()?;
//! for pallet in &latest.pallets {
//!     println!("{} ({})", pallet.name, pallet.index);
//! }
//! # Ok(())
//! # }
//! ```

mod legacy;
mod v14;
mod v15;
mod v16;

#[cfg(test)]
pub(crate) mod fixtures;

pub use legacy::UNKNOWN_MODULE_INDEX;
pub use scale_info::PortableRegistry;
pub use v14::{COMPAT_PATH, TypesAlias, apply_alias, compat_entry, compat_type};
pub use v16::extensions_for;

/// Metadata V9.
pub type MetadataV9 = frame_metadata::v9::RuntimeMetadataV9;
/// Metadata V10.
pub type MetadataV10 = frame_metadata::v10::RuntimeMetadataV10;
/// Metadata V11, which adds the extrinsic format.
pub type MetadataV11 = frame_metadata::v11::RuntimeMetadataV11;
/// Metadata V12, which adds module indices.
pub type MetadataV12 = frame_metadata::v12::RuntimeMetadataV12;
/// Metadata V13, which adds `NMap` storage.
pub type MetadataV13 = frame_metadata::v13::RuntimeMetadataV13;
/// Metadata V14, the first version with a portable type lookup.
pub type MetadataV14 = frame_metadata::v14::RuntimeMetadataV14;
/// Metadata V15, which adds runtime APIs and the outer enums.
pub type MetadataV15 = frame_metadata::v15::RuntimeMetadataV15;
/// Metadata V16, which adds transaction extension versions and
/// deprecation info.
pub type MetadataV16 = frame_metadata::v16::RuntimeMetadataV16;

/// The latest metadata shape.
pub type MetadataLatest = MetadataV16;

use crate::codec::{Codec, Input};
use crate::error::Error;
use crate::registry::Registry;
use crate::types::NativeCodec;
use crate::utils::from_hex;
use frame_metadata::{RuntimeMetadata, RuntimeMetadataPrefixed};
use parity_scale_codec::{Decode, Encode};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// `meta`, little endian.
pub const MAGIC_NUMBER: u32 = frame_metadata::META_RESERVED;

/// The oldest metadata version which can be decoded.
pub const MIN_VERSION: u8 = 9;

/// The newest metadata version.
pub const LATEST_VERSION: u8 = 16;

/// Metadata of one specific version.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataView {
    /// Metadata V9.
    V9(Arc<MetadataV9>),
    /// Metadata V10.
    V10(Arc<MetadataV10>),
    /// Metadata V11.
    V11(Arc<MetadataV11>),
    /// Metadata V12.
    V12(Arc<MetadataV12>),
    /// Metadata V13.
    V13(Arc<MetadataV13>),
    /// Metadata V14.
    V14(Arc<MetadataV14>),
    /// Metadata V15.
    V15(Arc<MetadataV15>),
    /// Metadata V16.
    V16(Arc<MetadataV16>),
}

impl MetadataView {
    /// The version of this metadata.
    pub fn version(&self) -> u8 {
        match self {
            MetadataView::V9(_) => 9,
            MetadataView::V10(_) => 10,
            MetadataView::V11(_) => 11,
            MetadataView::V12(_) => 12,
            MetadataView::V13(_) => 13,
            MetadataView::V14(_) => 14,
            MetadataView::V15(_) => 15,
            MetadataView::V16(_) => 16,
        }
    }

    fn decode_version(version: u8, cursor: &mut &[u8]) -> Result<Self, Error> {
        fn body<T: Decode>(version: u8, cursor: &mut &[u8]) -> Result<Arc<T>, Error> {
            T::decode(cursor)
                .map(Arc::new)
                .map_err(|e| Error::codec(format!("MetadataV{version}"), e))
        }
        let view = match version {
            9 => MetadataView::V9(body(version, cursor)?),
            10 => MetadataView::V10(body(version, cursor)?),
            11 => MetadataView::V11(body(version, cursor)?),
            12 => MetadataView::V12(body(version, cursor)?),
            13 => MetadataView::V13(body(version, cursor)?),
            14 => MetadataView::V14(body(version, cursor)?),
            15 => MetadataView::V15(body(version, cursor)?),
            16 => MetadataView::V16(body(version, cursor)?),
            other => return Err(Error::UnsupportedMetadataVersion(other)),
        };
        Ok(view)
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        match self {
            MetadataView::V9(md) => md.encode_to(out),
            MetadataView::V10(md) => md.encode_to(out),
            MetadataView::V11(md) => md.encode_to(out),
            MetadataView::V12(md) => md.encode_to(out),
            MetadataView::V13(md) => md.encode_to(out),
            MetadataView::V14(md) => md.encode_to(out),
            MetadataView::V15(md) => md.encode_to(out),
            MetadataView::V16(md) => md.encode_to(out),
        }
    }

    /// Render this metadata to JSON.
    pub fn to_json(&self) -> Value {
        let value = match self {
            MetadataView::V9(md) => serde_json::to_value(&**md),
            MetadataView::V10(md) => serde_json::to_value(&**md),
            MetadataView::V11(md) => serde_json::to_value(&**md),
            MetadataView::V12(md) => serde_json::to_value(&**md),
            MetadataView::V13(md) => serde_json::to_value(&**md),
            MetadataView::V14(md) => serde_json::to_value(&**md),
            MetadataView::V15(md) => serde_json::to_value(&**md),
            MetadataView::V16(md) => serde_json::to_value(&**md),
        };
        value.unwrap_or_else(|e| {
            log::warn!("Unable to render metadata V{} as JSON: {e}", self.version());
            Value::Null
        })
    }
}

/// Decoded metadata, with lazily computed and cached views of every newer
/// version.
///
/// Views can only be computed forwards from the version which was decoded;
/// asking for an older version fails with [`Error::VersionDowngrade`].
pub struct MetadataVersioned {
    native: MetadataView,
    types_alias: TypesAlias,
    cache: Mutex<HashMap<u8, MetadataView>>,
    calls_only: OnceLock<Arc<MetadataV16>>,
}

impl MetadataVersioned {
    fn new(native: MetadataView, types_alias: TypesAlias) -> Self {
        log::trace!("decoded metadata V{}", native.version());
        MetadataVersioned {
            native,
            types_alias,
            cache: Mutex::new(HashMap::new()),
            calls_only: OnceLock::new(),
        }
    }

    /// Decode metadata from bytes starting with the magic number. Type
    /// aliases are applied when converting V13 or older metadata to V14.
    pub fn from_bytes(bytes: &[u8], types_alias: TypesAlias) -> Result<Self, Error> {
        let cursor = &mut &*bytes;
        let md = Self::decode_from(cursor, types_alias)?;
        if !cursor.is_empty() {
            return Err(Error::Codec {
                ty: "Metadata".into(),
                reason: format!("{} trailing bytes after the metadata", cursor.len()),
            });
        }
        Ok(md)
    }

    /// Decode metadata wrapped in `Option<OpaqueMetadata>`, as returned by
    /// the `Metadata_metadata_at_version` runtime API.
    pub fn from_opaque(bytes: &[u8], types_alias: TypesAlias) -> Result<Self, Error> {
        let opaque = Option::<Vec<u8>>::decode(&mut &*bytes)
            .map_err(|e| Error::codec("Option<OpaqueMetadata>", e))?
            .ok_or_else(|| Error::Codec {
                ty: "Option<OpaqueMetadata>".into(),
                reason: "no metadata at this version".into(),
            })?;
        Self::from_bytes(&opaque, types_alias)
    }

    /// Wrap metadata decoded with `frame-metadata`.
    pub fn from_frame_metadata(
        metadata: RuntimeMetadataPrefixed,
        types_alias: TypesAlias,
    ) -> Result<Self, Error> {
        let RuntimeMetadataPrefixed(magic, metadata) = metadata;
        if magic != MAGIC_NUMBER {
            return Err(Error::MagicNumberMismatch(magic));
        }
        let native = match metadata {
            RuntimeMetadata::V9(md) => MetadataView::V9(Arc::new(md)),
            RuntimeMetadata::V10(md) => MetadataView::V10(Arc::new(md)),
            RuntimeMetadata::V11(md) => MetadataView::V11(Arc::new(md)),
            RuntimeMetadata::V12(md) => MetadataView::V12(Arc::new(md)),
            RuntimeMetadata::V13(md) => MetadataView::V13(Arc::new(md)),
            RuntimeMetadata::V14(md) => MetadataView::V14(Arc::new(md)),
            RuntimeMetadata::V15(md) => MetadataView::V15(Arc::new(md)),
            RuntimeMetadata::V16(md) => MetadataView::V16(Arc::new(md)),
            other => {
                let version = u8::try_from(other.version()).unwrap_or(u8::MAX);
                return Err(Error::UnsupportedMetadataVersion(version));
            }
        };
        Ok(Self::new(native, types_alias))
    }

    fn decode_from(cursor: &mut &[u8], types_alias: TypesAlias) -> Result<Self, Error> {
        let magic = u32::decode(cursor).map_err(|e| Error::codec("Metadata", e))?;
        if magic != MAGIC_NUMBER {
            return Err(Error::MagicNumberMismatch(magic));
        }
        let version = u8::decode(cursor).map_err(|e| Error::codec("Metadata", e))?;
        if version < MIN_VERSION {
            return Err(Error::UnsupportedMetadataVersion(version));
        }
        let native = MetadataView::decode_version(version, cursor)?;
        Ok(Self::new(native, types_alias))
    }

    /// The version which was decoded.
    pub fn version(&self) -> u8 {
        self.native.version()
    }

    /// The magic number, `0x6174656d`.
    pub fn magic_number(&self) -> u32 {
        MAGIC_NUMBER
    }

    /// The metadata as it was decoded.
    pub fn native(&self) -> &MetadataView {
        &self.native
    }

    /// The versions which have been computed and cached so far.
    pub fn cached_versions(&self) -> Vec<u8> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let mut versions: Vec<u8> = cache.keys().copied().collect();
        versions.sort_unstable();
        versions
    }

    fn cached(&self, version: u8) -> Option<MetadataView> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.get(&version).cloned()
    }

    fn store(&self, view: MetadataView) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.entry(view.version()).or_insert(view);
    }

    fn check_version(&self, version: u8) -> Result<(), Error> {
        if self.version() > version {
            return Err(Error::VersionDowngrade {
                from: self.version(),
                to: version,
            });
        }
        Ok(())
    }

    /// The metadata as V9.
    pub fn as_v9(&self) -> Result<Arc<MetadataV9>, Error> {
        match &self.native {
            MetadataView::V9(md) => Ok(md.clone()),
            _ => Err(Error::VersionDowngrade {
                from: self.version(),
                to: 9,
            }),
        }
    }

    /// The metadata as V10.
    pub fn as_v10(&self) -> Result<Arc<MetadataV10>, Error> {
        self.view(10, |md| match md {
            MetadataView::V10(md) => Some(md),
            _ => None,
        }, |this| Ok(MetadataView::V10(Arc::new(legacy::to_v10(&*this.as_v9()?)?))))
    }

    /// The metadata as V11.
    pub fn as_v11(&self) -> Result<Arc<MetadataV11>, Error> {
        self.view(11, |md| match md {
            MetadataView::V11(md) => Some(md),
            _ => None,
        }, |this| Ok(MetadataView::V11(Arc::new(legacy::to_v11(&*this.as_v10()?)?))))
    }

    /// The metadata as V12.
    pub fn as_v12(&self) -> Result<Arc<MetadataV12>, Error> {
        self.view(12, |md| match md {
            MetadataView::V12(md) => Some(md),
            _ => None,
        }, |this| Ok(MetadataView::V12(Arc::new(legacy::to_v12(&*this.as_v11()?)?))))
    }

    /// The metadata as V13.
    pub fn as_v13(&self) -> Result<Arc<MetadataV13>, Error> {
        self.view(13, |md| match md {
            MetadataView::V13(md) => Some(md),
            _ => None,
        }, |this| Ok(MetadataView::V13(Arc::new(legacy::to_v13(&*this.as_v12()?)?))))
    }

    /// The metadata as V14. Legacy type strings become [`COMPAT_PATH`]
    /// lookup entries.
    pub fn as_v14(&self) -> Result<Arc<MetadataV14>, Error> {
        self.view(14, |md| match md {
            MetadataView::V14(md) => Some(md),
            _ => None,
        }, |this| {
            let v13 = this.as_v13()?;
            Ok(MetadataView::V14(Arc::new(v14::to_v14(&v13, &this.types_alias)?)))
        })
    }

    /// The metadata as V15.
    pub fn as_v15(&self) -> Result<Arc<MetadataV15>, Error> {
        self.view(15, |md| match md {
            MetadataView::V15(md) => Some(md),
            _ => None,
        }, |this| Ok(MetadataView::V15(Arc::new(v15::to_v15(&*this.as_v14()?)))))
    }

    /// The metadata as V16.
    pub fn as_v16(&self) -> Result<Arc<MetadataV16>, Error> {
        self.view(16, |md| match md {
            MetadataView::V16(md) => Some(md),
            _ => None,
        }, |this| Ok(MetadataView::V16(Arc::new(v16::to_v16(&*this.as_v15()?)))))
    }

    /// The metadata as the latest version.
    pub fn as_latest(&self) -> Result<Arc<MetadataLatest>, Error> {
        self.as_v16()
    }

    /// The latest metadata reduced to what is needed to dispatch calls.
    pub fn as_calls_only(&self) -> Result<Arc<MetadataV16>, Error> {
        if let Some(md) = self.calls_only.get() {
            return Ok(md.clone());
        }
        let md = Arc::new(v16::to_calls_only(&*self.as_latest()?));
        Ok(self.calls_only.get_or_init(|| md).clone())
    }

    /// The metadata as the given version.
    pub fn as_version(&self, version: u8) -> Result<MetadataView, Error> {
        let view = match version {
            9 => MetadataView::V9(self.as_v9()?),
            10 => MetadataView::V10(self.as_v10()?),
            11 => MetadataView::V11(self.as_v11()?),
            12 => MetadataView::V12(self.as_v12()?),
            13 => MetadataView::V13(self.as_v13()?),
            14 => MetadataView::V14(self.as_v14()?),
            15 => MetadataView::V15(self.as_v15()?),
            16 => MetadataView::V16(self.as_v16()?),
            other => return Err(Error::UnsupportedMetadataVersion(other)),
        };
        Ok(view)
    }

    // The native metadata if it is this version, else a cached view, else
    // one converted from the previous version.
    fn view<T>(
        &self,
        version: u8,
        pick: impl Fn(MetadataView) -> Option<Arc<T>>,
        convert: impl FnOnce(&Self) -> Result<MetadataView, Error>,
    ) -> Result<Arc<T>, Error> {
        if let Some(md) = pick(self.native.clone()) {
            return Ok(md);
        }
        self.check_version(version)?;
        if let Some(md) = self.cached(version).and_then(&pick) {
            return Ok(md);
        }

        log::trace!("converting metadata V{} to V{version}", version - 1);
        let view = convert(self)?;
        self.store(view.clone());
        pick(view).ok_or(Error::UnsupportedMetadataVersion(version))
    }
}

impl Clone for MetadataVersioned {
    fn clone(&self) -> Self {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        MetadataVersioned {
            native: self.native.clone(),
            types_alias: self.types_alias.clone(),
            cache: Mutex::new(cache.clone()),
            calls_only: self.calls_only.clone(),
        }
    }
}

impl core::fmt::Debug for MetadataVersioned {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MetadataVersioned")
            .field("version", &self.version())
            .field("cached", &self.cached_versions())
            .finish()
    }
}

impl Codec for MetadataVersioned {
    fn raw_type(&self) -> String {
        Self::NAME.to_owned()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        MAGIC_NUMBER.encode_to(out);
        out.push(self.version());
        self.native.encode_body(out);
    }

    fn to_json(&self) -> Value {
        let mut metadata = Map::new();
        metadata.insert(format!("v{}", self.version()), self.native.to_json());
        let mut json = Map::new();
        json.insert("magicNumber".into(), Value::from(MAGIC_NUMBER));
        json.insert("metadata".into(), Value::Object(metadata));
        Value::Object(json)
    }

    fn is_empty(&self) -> bool {
        false
    }
}

impl NativeCodec for MetadataVersioned {
    const NAME: &'static str = "Metadata";

    fn decode(registry: &Registry, cursor: &mut &[u8]) -> Result<Self, Error> {
        Self::decode_from(cursor, registry.types_alias())
    }

    fn construct(registry: &Registry, input: Input<'_>) -> Result<Self, Error> {
        match input.normalize_hex() {
            Input::Bytes(bytes) => Self::from_bytes(&bytes, registry.types_alias()),
            Input::Hex(hex) => Self::from_bytes(&from_hex(&hex)?, registry.types_alias()),
            Input::Codec(existing) => Self::from_bytes(&existing.to_u8a(), registry.types_alias()),
            other => Err(Error::invalid_value(
                Self::NAME,
                other.describe(),
                "metadata can only be constructed from its encoded bytes",
            )),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decodes_and_reencodes_exactly() {
        let bytes = fixtures::metadata_bytes();
        let md = MetadataVersioned::from_bytes(&bytes, TypesAlias::new()).unwrap();
        assert_eq!(md.version(), 14);
        assert_eq!(md.to_u8a(), bytes);
        assert_eq!(md.to_json()["magicNumber"], Value::from(1635018093u32));
        assert_eq!(
            md.to_json()["metadata"]["v14"]["pallets"][1]["name"],
            Value::from("Balances")
        );
    }

    #[test]
    fn rejects_bad_magic_and_old_versions() {
        let mut bytes = fixtures::metadata_bytes();
        bytes[0] = 0;
        assert!(matches!(
            MetadataVersioned::from_bytes(&bytes, TypesAlias::new()),
            Err(Error::MagicNumberMismatch(_))
        ));

        let mut old = MAGIC_NUMBER.encode();
        old.push(8);
        assert!(matches!(
            MetadataVersioned::from_bytes(&old, TypesAlias::new()),
            Err(Error::UnsupportedMetadataVersion(8))
        ));
    }

    #[test]
    fn views_walk_forward_and_are_cached() {
        let md = MetadataVersioned::from_bytes(&fixtures::metadata_bytes(), TypesAlias::new())
            .unwrap();
        assert!(md.cached_versions().is_empty());

        let v16 = md.as_v16().unwrap();
        assert_eq!(md.cached_versions(), vec![15, 16]);
        assert!(Arc::ptr_eq(&v16, &md.as_latest().unwrap()));
        assert!(Arc::ptr_eq(&md.as_v14().unwrap(), &md.as_v14().unwrap()));

        assert_eq!(
            md.as_v13().unwrap_err(),
            Error::VersionDowngrade { from: 14, to: 13 }
        );
        assert_eq!(
            md.as_version(13).unwrap_err().to_string(),
            "Cannot convert metadata from version 14 to 13"
        );
    }

    #[test]
    fn legacy_metadata_converts_to_latest() {
        let bytes = fixtures::metadata_v9_bytes();
        let md = MetadataVersioned::from_bytes(&bytes, TypesAlias::new()).unwrap();
        assert_eq!(md.version(), 9);
        let latest = md.as_latest().unwrap();
        assert_eq!(md.cached_versions(), vec![10, 11, 12, 13, 14, 15, 16]);
        assert_eq!(latest.pallets[0].name, "Balances");
        assert_eq!(latest.pallets[0].index, UNKNOWN_MODULE_INDEX);
        assert!(latest.pallets[0].calls.is_some());
        assert_eq!(md.to_u8a(), bytes);
    }

    #[test]
    fn calls_only_projection() {
        let md = MetadataVersioned::from_bytes(&fixtures::metadata_bytes(), TypesAlias::new())
            .unwrap();
        let calls = md.as_calls_only().unwrap();
        assert!(calls.pallets.iter().all(|p| p.storage.is_none()));
        assert!(Arc::ptr_eq(&calls, &md.as_calls_only().unwrap()));
    }

    #[test]
    fn opaque_and_frame_metadata_inputs() {
        let bytes = fixtures::metadata_bytes();
        let opaque = Some(bytes.clone()).encode();
        let md = MetadataVersioned::from_opaque(&opaque, TypesAlias::new()).unwrap();
        assert_eq!(md.to_u8a(), bytes);
        assert!(MetadataVersioned::from_opaque(&[0], TypesAlias::new()).is_err());

        let prefixed = RuntimeMetadataPrefixed::decode(&mut &*bytes).unwrap();
        let md = MetadataVersioned::from_frame_metadata(prefixed, TypesAlias::new()).unwrap();
        assert_eq!(md.version(), 14);
        assert_eq!(md.to_u8a(), bytes);
    }

    #[test]
    fn frame_metadata_legacy_versions_are_wrapped() {
        let prefixed = RuntimeMetadataPrefixed(
            MAGIC_NUMBER,
            RuntimeMetadata::V9(fixtures::metadata_v9()),
        );
        let md = MetadataVersioned::from_frame_metadata(prefixed, TypesAlias::new()).unwrap();
        assert_eq!(md.version(), 9);
        assert_eq!(md.to_u8a(), fixtures::metadata_v9_bytes());
        assert_eq!(md.as_v14().unwrap().pallets[0].name, "Balances");

        let stale = RuntimeMetadataPrefixed(
            MAGIC_NUMBER,
            RuntimeMetadata::V8(frame_metadata::v8::RuntimeMetadataV8 {
                modules: frame_metadata::decode_different::DecodeDifferent::Decoded(vec![]),
            }),
        );
        assert_eq!(
            MetadataVersioned::from_frame_metadata(stale, TypesAlias::new()).unwrap_err(),
            Error::UnsupportedMetadataVersion(8)
        );

        let wrong = RuntimeMetadataPrefixed(0, RuntimeMetadata::V9(fixtures::metadata_v9()));
        assert!(matches!(
            MetadataVersioned::from_frame_metadata(wrong, TypesAlias::new()),
            Err(Error::MagicNumberMismatch(0))
        ));
    }

    #[test]
    fn matches_frame_metadata_encoding() {
        use frame_metadata::v14;
        use scale_info::{TypeDef, meta_type};

        #[derive(scale_info::TypeInfo)]
        #[allow(dead_code, non_camel_case_types)]
        enum Call {
            transfer { dest: [u8; 32], value: u128 },
            remark(Vec<u8>),
        }

        let pallets = vec![v14::PalletMetadata {
            name: "Balances",
            storage: Some(v14::PalletStorageMetadata {
                prefix: "Balances",
                entries: vec![v14::StorageEntryMetadata {
                    name: "TotalIssuance",
                    modifier: v14::StorageEntryModifier::Default,
                    ty: v14::StorageEntryType::Plain(meta_type::<u128>()),
                    default: vec![0; 16],
                    docs: vec![" The total units issued."],
                }],
            }),
            calls: Some(v14::PalletCallMetadata {
                ty: meta_type::<Call>(),
            }),
            event: None,
            constants: vec![v14::PalletConstantMetadata {
                name: "ExistentialDeposit",
                ty: meta_type::<u128>(),
                value: 500u128.encode(),
                docs: vec![],
            }],
            error: None,
            index: 4,
        }];
        let extrinsic = v14::ExtrinsicMetadata {
            ty: meta_type::<Vec<u8>>(),
            version: 4,
            signed_extensions: vec![v14::SignedExtensionMetadata {
                identifier: "CheckNonce",
                ty: meta_type::<u32>(),
                additional_signed: meta_type::<()>(),
            }],
        };
        let runtime = v14::RuntimeMetadataV14::new(pallets, extrinsic, meta_type::<()>());
        let prefixed: RuntimeMetadataPrefixed = runtime.into();
        let bytes = prefixed.encode();

        let md = MetadataVersioned::from_bytes(&bytes, TypesAlias::new()).unwrap();
        assert_eq!(md.to_u8a(), bytes);
        let v14 = md.as_v14().unwrap();
        assert_eq!(v14.pallets[0].index, 4);
        assert_eq!(v14.extrinsic.signed_extensions[0].identifier, "CheckNonce");
        let calls = v14.pallets[0].calls.as_ref().unwrap();
        let call = v14.types.resolve(calls.ty.id).unwrap();
        let TypeDef::Variant(variants) = &call.type_def else {
            panic!("expected variants")
        };
        assert_eq!(variants.variants[0].name, "transfer");
    }
}
