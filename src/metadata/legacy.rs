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

//! Conversions between the pre-V14 metadata versions.
//!
//! Each of these versions only adds to the encoding of the one before, so
//! converting is a matter of re-encoding, appending whatever the newer
//! version introduced, and decoding as the newer version.

use super::{MetadataV9, MetadataV10, MetadataV11, MetadataV12, MetadataV13};
use crate::error::Error;
use frame_metadata::decode_different::{DecodeDifferent, DecodeDifferentStr, FnEncode};
use parity_scale_codec::{Decode, Encode};
use std::borrow::Cow;

/// The pallet index given to modules of metadata older than V12, which
/// don't record one.
pub const UNKNOWN_MODULE_INDEX: u8 = 255;

fn transcode<T: Decode>(bytes: &[u8], version: u8) -> Result<T, Error> {
    let cursor = &mut &*bytes;
    let md = T::decode(cursor).map_err(|e| Error::codec(format!("MetadataV{version}"), e))?;
    if !cursor.is_empty() {
        return Err(Error::Codec {
            ty: format!("MetadataV{version}"),
            reason: format!("{} bytes left over after conversion", cursor.len()),
        });
    }
    Ok(md)
}

/// V9 to V10: only the version tag changed.
pub fn to_v10(v9: &MetadataV9) -> Result<MetadataV10, Error> {
    transcode(&v9.encode(), 10)
}

/// V10 to V11: an empty extrinsic description is appended.
pub fn to_v11(v10: &MetadataV10) -> Result<MetadataV11, Error> {
    let extrinsic = frame_metadata::v11::ExtrinsicMetadata {
        version: 0,
        signed_extensions: Vec::new(),
    };
    transcode(&(v10, extrinsic).encode(), 11)
}

/// V11 to V12: every module gains an index, unknown for converted metadata.
pub fn to_v12(v11: &MetadataV11) -> Result<MetadataV12, Error> {
    let modules: Vec<_> = list(&v11.modules)
        .iter()
        .map(|module| (module, UNKNOWN_MODULE_INDEX))
        .collect();
    transcode(&(modules, &v11.extrinsic).encode(), 12)
}

/// V12 to V13: storage gains `NMap`, nothing else moves.
pub fn to_v13(v12: &MetadataV12) -> Result<MetadataV13, Error> {
    transcode(&v12.encode(), 13)
}

/// The items of a legacy array, whichever side of it is populated.
pub(crate) fn list<'a, T: 'static>(value: &'a DecodeDifferent<&'static [T], Vec<T>>) -> &'a [T] {
    match value {
        DecodeDifferent::Encode(items) => *items,
        DecodeDifferent::Decoded(items) => items.as_slice(),
    }
}

/// The items of a lazily built legacy array.
pub(crate) fn fn_list<'a, T: Encode + 'static>(
    value: &'a DecodeDifferent<FnEncode<&'static [T]>, Vec<T>>,
) -> &'a [T] {
    match value {
        DecodeDifferent::Encode(build) => (build.0)(),
        DecodeDifferent::Decoded(items) => items.as_slice(),
    }
}

/// A lazily built legacy value.
pub(crate) fn fn_value<T: Clone + Encode + 'static>(value: &DecodeDifferent<FnEncode<T>, T>) -> Cow<'_, T> {
    match value {
        DecodeDifferent::Encode(build) => Cow::Owned((build.0)()),
        DecodeDifferent::Decoded(value) => Cow::Borrowed(value),
    }
}

pub(crate) fn text(value: &DecodeDifferentStr) -> &str {
    match value {
        DecodeDifferent::Encode(s) => *s,
        DecodeDifferent::Decoded(s) => s.as_str(),
    }
}

pub(crate) fn texts(value: &DecodeDifferent<&'static [&'static str], Vec<String>>) -> Vec<String> {
    match value {
        DecodeDifferent::Encode(items) => items.iter().map(|s| (*s).to_owned()).collect(),
        DecodeDifferent::Decoded(items) => items.clone(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metadata::fixtures;
    use frame_metadata::{v9, v13};

    #[test]
    fn legacy_chain_walks_forward() {
        let v13 = fixtures::metadata_v13();
        let module = &list(&v13.modules)[0];
        assert_eq!(text(&module.name), "Balances");
        assert_eq!(module.index, UNKNOWN_MODULE_INDEX);
        assert_eq!(v13.extrinsic.version, 0);
        assert!(v13.extrinsic.signed_extensions.is_empty());

        let storage = fn_value(module.storage.as_ref().unwrap());
        let locks = &list(&storage.entries)[1];
        assert!(matches!(
            &locks.ty,
            v13::StorageEntryType::Map {
                hasher: v13::StorageHasher::Twox64Concat,
                unused: false,
                ..
            }
        ));
        assert_eq!(fn_list(&module.errors).len(), 1);
    }

    #[test]
    fn hashers_keep_their_encoding() {
        // Blake2_128Concat is already known to V9.
        assert_eq!(v9::StorageHasher::Blake2_128Concat.encode(), vec![2]);
        assert_eq!(v9::StorageHasher::Twox64Concat.encode(), vec![5]);
        assert_eq!(v13::StorageHasher::Twox64Concat.encode(), vec![5]);
        assert_eq!(v13::StorageHasher::Identity.encode(), vec![6]);
    }

    #[test]
    fn unencoded_values_are_read_directly() {
        static ARGS: &[&str] = &["AccountId", "Balance"];
        let event = v9::EventMetadata {
            name: DecodeDifferent::Encode("Deposit"),
            arguments: DecodeDifferent::Encode(ARGS),
            documentation: DecodeDifferent::Decoded(vec![" Some docs.".into()]),
        };
        assert_eq!(text(&event.name), "Deposit");
        assert_eq!(texts(&event.arguments), vec!["AccountId", "Balance"]);
        assert_eq!(texts(&event.documentation), vec![" Some docs."]);
    }

    #[test]
    fn trailing_bytes_fail_conversion() {
        let mut bytes = fixtures::metadata_v9().encode();
        bytes.push(0);
        assert!(matches!(
            transcode::<MetadataV10>(&bytes, 10),
            Err(Error::Codec { .. })
        ));
    }
}
