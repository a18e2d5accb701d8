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

use super::v14::compat_type;
use super::{MetadataV15, MetadataV16};
use frame_metadata::v16::{
    self, CustomMetadata, EnumDeprecationInfo, ExtrinsicMetadata, ItemDeprecationInfo,
    TransactionExtensionMetadata,
};
use parity_scale_codec::Compact;
use scale_info::form::PortableForm;
use scale_info::{PortableRegistry, PortableType, Type};
use std::collections::BTreeMap;

/// The transaction extensions used by the given extension version.
pub fn extensions_for(
    extrinsic: &ExtrinsicMetadata<PortableForm>,
    version: u8,
) -> impl Iterator<Item = &TransactionExtensionMetadata<PortableForm>> {
    extrinsic
        .transaction_extensions_by_version
        .get(&version)
        .into_iter()
        .flatten()
        .filter_map(|idx| extrinsic.transaction_extensions.get(idx.0 as usize))
}

/// V15 to V16: nothing is deprecated and the single extrinsic version uses
/// every signed extension as extension version 0.
pub fn to_v16(v15: &MetadataV15) -> MetadataV16 {
    let extensions = &v15.extrinsic.signed_extensions;
    let mut by_version = BTreeMap::new();
    by_version.insert(0, (0..extensions.len() as u32).map(Compact).collect());

    MetadataV16 {
        types: v15.types.clone(),
        pallets: v15
            .pallets
            .iter()
            .map(|p| v16::PalletMetadata {
                name: p.name.clone(),
                storage: p.storage.as_ref().map(|s| v16::PalletStorageMetadata {
                    prefix: s.prefix.clone(),
                    entries: s
                        .entries
                        .iter()
                        .map(|e| v16::StorageEntryMetadata {
                            name: e.name.clone(),
                            modifier: e.modifier.clone(),
                            ty: e.ty.clone(),
                            default: e.default.clone(),
                            docs: e.docs.clone(),
                            deprecation_info: ItemDeprecationInfo::NotDeprecated,
                        })
                        .collect(),
                }),
                calls: p.calls.as_ref().map(|c| v16::PalletCallMetadata {
                    ty: c.ty,
                    deprecation_info: EnumDeprecationInfo::nothing_deprecated(),
                }),
                event: p.event.as_ref().map(|e| v16::PalletEventMetadata {
                    ty: e.ty,
                    deprecation_info: EnumDeprecationInfo::nothing_deprecated(),
                }),
                constants: p
                    .constants
                    .iter()
                    .map(|c| v16::PalletConstantMetadata {
                        name: c.name.clone(),
                        ty: c.ty,
                        value: c.value.clone(),
                        docs: c.docs.clone(),
                        deprecation_info: ItemDeprecationInfo::NotDeprecated,
                    })
                    .collect(),
                error: p.error.as_ref().map(|e| v16::PalletErrorMetadata {
                    ty: e.ty,
                    deprecation_info: EnumDeprecationInfo::nothing_deprecated(),
                }),
                associated_types: Vec::new(),
                view_functions: Vec::new(),
                index: p.index,
                docs: p.docs.clone(),
                deprecation_info: ItemDeprecationInfo::NotDeprecated,
            })
            .collect(),
        extrinsic: ExtrinsicMetadata {
            versions: vec![v15.extrinsic.version],
            address_ty: v15.extrinsic.address_ty,
            call_ty: v15.extrinsic.call_ty,
            signature_ty: v15.extrinsic.signature_ty,
            transaction_extensions_by_version: by_version,
            transaction_extensions: extensions
                .iter()
                .map(|e| TransactionExtensionMetadata {
                    identifier: e.identifier.clone(),
                    ty: e.ty,
                    implicit: e.additional_signed,
                })
                .collect(),
        },
        apis: v15
            .apis
            .iter()
            .map(|api| v16::RuntimeApiMetadata {
                name: api.name.clone(),
                methods: api
                    .methods
                    .iter()
                    .map(|m| v16::RuntimeApiMethodMetadata {
                        name: m.name.clone(),
                        inputs: m.inputs.clone(),
                        output: m.output,
                        docs: m.docs.clone(),
                        deprecation_info: ItemDeprecationInfo::NotDeprecated,
                    })
                    .collect(),
                docs: api.docs.clone(),
                version: Compact(0),
                deprecation_info: ItemDeprecationInfo::NotDeprecated,
            })
            .collect(),
        outer_enums: v15.outer_enums.clone(),
        custom: v15.custom.clone(),
    }
}

// Docs up to the first empty line, trimmed.
fn trim_docs(docs: &[String]) -> Vec<String> {
    docs.iter()
        .map(|d| d.trim().to_owned())
        .take_while(|d| !d.is_empty())
        .collect()
}

fn trim_type(ty: &Type<PortableForm>) -> Type<PortableForm> {
    if compat_type(ty).is_some() {
        return ty.clone();
    }
    Type {
        docs: trim_docs(&ty.docs),
        ..ty.clone()
    }
}

/// Reduce the latest metadata to what is needed to dispatch calls: the
/// lookup (with shortened docs), the extrinsic format and each pallet's
/// name, index and calls.
pub fn to_calls_only(latest: &MetadataV16) -> MetadataV16 {
    MetadataV16 {
        types: PortableRegistry {
            types: latest
                .types
                .types
                .iter()
                .map(|t| PortableType::new(t.id, trim_type(&t.ty)))
                .collect(),
        },
        pallets: latest
            .pallets
            .iter()
            .map(|p| v16::PalletMetadata {
                name: p.name.clone(),
                storage: None,
                calls: p.calls.clone(),
                event: None,
                constants: Vec::new(),
                error: None,
                associated_types: Vec::new(),
                view_functions: Vec::new(),
                index: p.index,
                docs: Vec::new(),
                deprecation_info: ItemDeprecationInfo::NotDeprecated,
            })
            .collect(),
        extrinsic: latest.extrinsic.clone(),
        apis: Vec::new(),
        outer_enums: latest.outer_enums.clone(),
        custom: CustomMetadata {
            map: BTreeMap::new(),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metadata::{fixtures, v14::compat_entry, v15::to_v15};
    use parity_scale_codec::Encode;

    #[test]
    fn v15_extensions_become_version_zero() {
        let v16 = to_v16(&to_v15(&fixtures::metadata_v14()));
        assert_eq!(v16.extrinsic.versions, vec![4]);
        let names: Vec<_> = extensions_for(&v16.extrinsic, 0)
            .map(|e| e.identifier.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["CheckMortality", "CheckNonce", "ChargeTransactionPayment"]
        );
        assert_eq!(extensions_for(&v16.extrinsic, 1).count(), 0);
        assert!(
            v16.pallets
                .iter()
                .all(|p| p.deprecation_info == ItemDeprecationInfo::NotDeprecated)
        );
    }

    #[test]
    fn deprecation_info_encoding() {
        assert_eq!(ItemDeprecationInfo::<PortableForm>::NotDeprecated.encode(), vec![0]);
        let mut variants = BTreeMap::new();
        variants.insert(3u8, v16::VariantDeprecationInfo::<PortableForm>::DeprecatedWithoutNote);
        assert_eq!(EnumDeprecationInfo(variants).encode(), vec![0x04, 3, 1]);
    }

    #[test]
    fn calls_only_keeps_dispatch_data() {
        let latest = to_v16(&to_v15(&fixtures::metadata_v14()));
        let calls_only = to_calls_only(&latest);
        assert_eq!(calls_only.pallets.len(), latest.pallets.len());
        assert!(calls_only.pallets.iter().all(|p| p.storage.is_none()
            && p.constants.is_empty()
            && p.event.is_none()));
        assert_eq!(calls_only.pallets[1].calls, latest.pallets[1].calls);
        assert_eq!(calls_only.extrinsic, latest.extrinsic);
        assert_eq!(
            trim_docs(&[" First".into(), " second ".into(), "".into(), "third".into()]),
            vec!["First", "second"]
        );
    }

    #[test]
    fn calls_only_keeps_compat_strings() {
        let entry = compat_entry(" (AccountId, Balance)");
        assert_eq!(trim_type(&entry), entry);
    }
}
