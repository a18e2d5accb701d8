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

use super::{MetadataV14, MetadataV15};
use frame_metadata::v15;
use scale_info::form::PortableForm;
use scale_info::Type;
use std::collections::BTreeMap;

fn param(ty: Option<&Type<PortableForm>>, name: &str) -> u32 {
    ty.and_then(|ty| ty.type_params.iter().find(|p| p.name == name))
        .and_then(|p| p.ty)
        .map_or(0, |ty| ty.id)
}

/// V14 to V15: the extrinsic parts and outer enums are read off the type
/// parameters of the extrinsic and event record types. Unknown types are
/// lookup id 0.
pub fn to_v15(v14: &MetadataV14) -> MetadataV15 {
    let unchecked = v14.types.resolve(v14.extrinsic.ty.id);
    let call_ty = param(unchecked, "Call");

    // The runtime event is the `E` of `frame_system::EventRecord<E, T>`.
    let event_record = v14
        .types
        .types
        .iter()
        .find(|t| t.ty.path.segments == ["frame_system", "EventRecord"])
        .map(|t| &t.ty);
    let error_ty = v14
        .types
        .types
        .iter()
        .find(|t| t.ty.path.segments.last().is_some_and(|n| n == "RuntimeError"))
        .map_or(0, |t| t.id);

    MetadataV15 {
        types: v14.types.clone(),
        pallets: v14
            .pallets
            .iter()
            .map(|p| v15::PalletMetadata {
                name: p.name.clone(),
                storage: p.storage.clone(),
                calls: p.calls.clone(),
                event: p.event.clone(),
                constants: p.constants.clone(),
                error: p.error.clone(),
                index: p.index,
                docs: Vec::new(),
            })
            .collect(),
        extrinsic: v15::ExtrinsicMetadata {
            version: v14.extrinsic.version,
            address_ty: param(unchecked, "Address").into(),
            call_ty: call_ty.into(),
            signature_ty: param(unchecked, "Signature").into(),
            extra_ty: param(unchecked, "Extra").into(),
            signed_extensions: v14
                .extrinsic
                .signed_extensions
                .iter()
                .map(|e| v15::SignedExtensionMetadata {
                    identifier: e.identifier.clone(),
                    ty: e.ty,
                    additional_signed: e.additional_signed,
                })
                .collect(),
        },
        ty: v14.ty,
        apis: Vec::new(),
        outer_enums: v15::OuterEnums {
            call_enum_ty: call_ty.into(),
            event_enum_ty: param(event_record, "E").into(),
            error_enum_ty: error_ty.into(),
        },
        custom: v15::CustomMetadata {
            map: BTreeMap::new(),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metadata::fixtures;

    #[test]
    fn extrinsic_parts_come_from_type_params() {
        let v14 = fixtures::metadata_v14();
        let v15 = to_v15(&v14);

        let unchecked = v14.types.resolve(v14.extrinsic.ty.id);
        assert_eq!(
            unchecked.unwrap().path.segments.last().unwrap(),
            "UncheckedExtrinsic"
        );
        assert_eq!(v15.extrinsic.call_ty.id, fixtures::RUNTIME_CALL);
        assert_eq!(v15.extrinsic.address_ty.id, fixtures::MULTI_ADDRESS);
        assert_eq!(v15.extrinsic.signature_ty.id, param(unchecked, "Signature"));
        assert_eq!(v15.outer_enums.call_enum_ty, v15.extrinsic.call_ty);
        assert_eq!(v15.outer_enums.event_enum_ty.id, fixtures::RUNTIME_EVENT);
        assert_eq!(v15.pallets.len(), v14.pallets.len());
        assert!(v15.apis.is_empty());
    }

    #[test]
    fn missing_params_fall_back_to_id_zero() {
        let mut v14 = fixtures::metadata_v14();
        v14.extrinsic.ty = fixtures::U8.into();
        let v15 = to_v15(&v14);
        assert_eq!(v15.extrinsic.call_ty.id, 0);
        assert_eq!(v15.extrinsic.extra_ty.id, 0);
        assert_eq!(v15.outer_enums.error_enum_ty.id, 0);
    }
}
