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

//! A small but realistic V14 runtime (System and Balances) for tests, and
//! a V9 Balances module for the legacy conversions.
#![allow(dead_code)]

use super::legacy::{to_v10, to_v11, to_v12, to_v13};
use super::{MAGIC_NUMBER, MetadataV9, MetadataV13, MetadataV14};
use frame_metadata::decode_different::DecodeDifferent;
use frame_metadata::{v9, v14};
use parity_scale_codec::Encode;
use scale_info::form::PortableForm;
use scale_info::{
    Field, Path, PortableRegistry, PortableType, Type, TypeDef, TypeDefArray, TypeDefCompact,
    TypeDefComposite, TypeDefPrimitive, TypeDefSequence, TypeDefTuple, TypeDefVariant,
    TypeParameter, Variant,
};

pub const U8: u32 = 0;
pub const U32: u32 = 1;
pub const U128: u32 = 3;
pub const ACCOUNT_ID: u32 = 5;
pub const MULTI_ADDRESS: u32 = 7;
pub const BALANCES_CALL: u32 = 11;
pub const RUNTIME_CALL: u32 = 13;
pub const RUNTIME_EVENT: u32 = 15;
pub const EVENT_RECORDS: u32 = 20;
pub const MULTI_SIGNATURE: u32 = 22;
pub const ERA: u32 = 25;
pub const UNCHECKED_EXTRINSIC: u32 = 30;

pub fn ty(type_def: TypeDef<PortableForm>) -> Type<PortableForm> {
    Type {
        path: Path::default(),
        type_params: Vec::new(),
        type_def,
        docs: Vec::new(),
    }
}

pub fn primitive(p: TypeDefPrimitive) -> Type<PortableForm> {
    ty(TypeDef::Primitive(p))
}

pub fn field(name: Option<&str>, id: u32) -> Field<PortableForm> {
    Field {
        name: name.map(str::to_owned),
        ty: id.into(),
        type_name: None,
        docs: Vec::new(),
    }
}

pub fn variant(name: &str, index: u8, fields: Vec<Field<PortableForm>>) -> Variant<PortableForm> {
    Variant {
        name: name.to_owned(),
        fields,
        index,
        docs: Vec::new(),
    }
}

pub fn with_path(mut ty: Type<PortableForm>, path: &[&str]) -> Type<PortableForm> {
    ty.path = Path {
        segments: path.iter().map(|s| (*s).to_owned()).collect(),
    };
    ty
}

pub fn composite(path: &[&str], fields: Vec<Field<PortableForm>>) -> Type<PortableForm> {
    with_path(ty(TypeDef::Composite(TypeDefComposite { fields })), path)
}

pub fn variants(path: &[&str], variants: Vec<Variant<PortableForm>>) -> Type<PortableForm> {
    with_path(ty(TypeDef::Variant(TypeDefVariant { variants })), path)
}

pub fn array(len: u32, id: u32) -> Type<PortableForm> {
    ty(TypeDef::Array(TypeDefArray {
        len,
        type_param: id.into(),
    }))
}

pub fn sequence(id: u32) -> Type<PortableForm> {
    ty(TypeDef::Sequence(TypeDefSequence {
        type_param: id.into(),
    }))
}

pub fn compact(id: u32) -> Type<PortableForm> {
    ty(TypeDef::Compact(TypeDefCompact {
        type_param: id.into(),
    }))
}

pub fn tuple(ids: &[u32]) -> Type<PortableForm> {
    ty(TypeDef::Tuple(TypeDefTuple {
        fields: ids.iter().map(|id| (*id).into()).collect(),
    }))
}

pub fn params(mut ty: Type<PortableForm>, params: &[(&str, u32)]) -> Type<PortableForm> {
    ty.type_params = params
        .iter()
        .map(|(name, id)| TypeParameter {
            name: (*name).to_owned(),
            ty: Some((*id).into()),
        })
        .collect();
    ty
}

/// A registry holding the given types, their ids following their position.
pub fn registry(types: Vec<Type<PortableForm>>) -> PortableRegistry {
    PortableRegistry {
        types: types
            .into_iter()
            .enumerate()
            .map(|(id, ty)| PortableType::new(id as u32, ty))
            .collect(),
    }
}

pub fn lookup() -> PortableRegistry {
    registry(vec![
        // 0..=3
        primitive(TypeDefPrimitive::U8),
        primitive(TypeDefPrimitive::U32),
        primitive(TypeDefPrimitive::U64),
        primitive(TypeDefPrimitive::U128),
        // 4, 5
        array(32, U8),
        composite(&["sp_core", "crypto", "AccountId32"], vec![field(None, 4)]),
        // 6: Compact<u128>
        compact(U128),
        // 7
        params(
            variants(
                &["sp_runtime", "multiaddress", "MultiAddress"],
                vec![
                    variant("Id", 0, vec![field(None, ACCOUNT_ID)]),
                    variant("Index", 1, vec![field(None, 8)]),
                    variant("Raw", 2, vec![field(None, 9)]),
                    variant("Address32", 3, vec![field(None, 4)]),
                    variant("Address20", 4, vec![field(None, 10)]),
                ],
            ),
            &[("AccountId", ACCOUNT_ID), ("AccountIndex", 28)],
        ),
        // 8: Compact<u32>, 9: Vec<u8>, 10: [u8; 20]
        compact(U32),
        sequence(U8),
        array(20, U8),
        // 11
        variants(
            &["pallet_balances", "pallet", "Call"],
            vec![
                variant(
                    "transfer_allow_death",
                    0,
                    vec![field(Some("dest"), MULTI_ADDRESS), field(Some("value"), 6)],
                ),
                variant(
                    "transfer_keep_alive",
                    3,
                    vec![field(Some("dest"), MULTI_ADDRESS), field(Some("value"), 6)],
                ),
            ],
        ),
        // 12
        variants(
            &["frame_system", "pallet", "Call"],
            vec![variant("remark", 0, vec![field(Some("remark"), 9)])],
        ),
        // 13
        variants(
            &["node_runtime", "RuntimeCall"],
            vec![
                variant("System", 0, vec![field(None, 12)]),
                variant("Balances", 5, vec![field(None, BALANCES_CALL)]),
            ],
        ),
        // 14
        variants(
            &["pallet_balances", "pallet", "Event"],
            vec![variant(
                "Transfer",
                2,
                vec![
                    field(Some("from"), ACCOUNT_ID),
                    field(Some("to"), ACCOUNT_ID),
                    field(Some("amount"), U128),
                ],
            )],
        ),
        // 15
        variants(
            &["node_runtime", "RuntimeEvent"],
            vec![variant("Balances", 5, vec![field(None, 14)])],
        ),
        // 16, 17
        composite(&["primitive_types", "H256"], vec![field(None, 4)]),
        sequence(16),
        // 18
        variants(
            &["frame_system", "Phase"],
            vec![
                variant("ApplyExtrinsic", 0, vec![field(None, U32)]),
                variant("Finalization", 1, vec![]),
                variant("Initialization", 2, vec![]),
            ],
        ),
        // 19, 20
        params(
            composite(
                &["frame_system", "EventRecord"],
                vec![
                    field(Some("phase"), 18),
                    field(Some("event"), RUNTIME_EVENT),
                    field(Some("topics"), 17),
                ],
            ),
            &[("E", RUNTIME_EVENT), ("T", 16)],
        ),
        sequence(19),
        // 21, 22
        array(64, U8),
        variants(
            &["sp_runtime", "MultiSignature"],
            vec![
                variant("Ed25519", 0, vec![field(None, 23)]),
                variant("Sr25519", 1, vec![field(None, 23)]),
                variant("Ecdsa", 2, vec![field(None, 24)]),
            ],
        ),
        // 23, 24
        composite(&["sp_core", "sr25519", "Signature"], vec![field(None, 21)]),
        array(65, U8),
        // 25
        variants(
            &["sp_runtime", "generic", "era", "Era"],
            vec![variant("Immortal", 0, vec![])],
        ),
        // 26, 27
        composite(
            &["frame_system", "extensions", "check_nonce", "CheckNonce"],
            vec![field(None, 8)],
        ),
        composite(
            &["pallet_transaction_payment", "ChargeTransactionPayment"],
            vec![field(None, 6)],
        ),
        // 28: (), 29: extra
        tuple(&[]),
        tuple(&[ERA, 26, 27]),
        // 30
        params(
            composite(
                &["sp_runtime", "generic", "unchecked_extrinsic", "UncheckedExtrinsic"],
                vec![field(None, 9)],
            ),
            &[
                ("Address", MULTI_ADDRESS),
                ("Call", RUNTIME_CALL),
                ("Signature", MULTI_SIGNATURE),
                ("Extra", 29),
            ],
        ),
        // 31
        variants(
            &["pallet_balances", "pallet", "Error"],
            vec![variant("InsufficientBalance", 0, vec![])],
        ),
    ])
}

pub fn metadata_v14() -> MetadataV14 {
    MetadataV14 {
        types: lookup(),
        pallets: vec![
            v14::PalletMetadata {
                name: "System".into(),
                storage: Some(v14::PalletStorageMetadata {
                    prefix: "System".into(),
                    entries: vec![
                        v14::StorageEntryMetadata {
                            name: "Account".into(),
                            modifier: v14::StorageEntryModifier::Default,
                            ty: v14::StorageEntryType::Map {
                                hashers: vec![v14::StorageHasher::Blake2_128Concat],
                                key: ACCOUNT_ID.into(),
                                value: U128.into(),
                            },
                            default: vec![0; 16],
                            docs: vec![" The full account information.".into()],
                        },
                        v14::StorageEntryMetadata {
                            name: "Events".into(),
                            modifier: v14::StorageEntryModifier::Default,
                            ty: v14::StorageEntryType::Plain(EVENT_RECORDS.into()),
                            default: vec![0],
                            docs: vec![],
                        },
                    ],
                }),
                calls: Some(v14::PalletCallMetadata { ty: 12u32.into() }),
                event: None,
                constants: vec![v14::PalletConstantMetadata {
                    name: "BlockHashCount".into(),
                    ty: U32.into(),
                    value: 2400u32.encode(),
                    docs: vec![],
                }],
                error: None,
                index: 0,
            },
            v14::PalletMetadata {
                name: "Balances".into(),
                storage: None,
                calls: Some(v14::PalletCallMetadata {
                    ty: BALANCES_CALL.into(),
                }),
                event: Some(v14::PalletEventMetadata { ty: 14u32.into() }),
                constants: vec![v14::PalletConstantMetadata {
                    name: "ExistentialDeposit".into(),
                    ty: U128.into(),
                    value: 500u128.encode(),
                    docs: vec![],
                }],
                error: Some(v14::PalletErrorMetadata { ty: 31u32.into() }),
                index: 5,
            },
        ],
        extrinsic: v14::ExtrinsicMetadata {
            ty: UNCHECKED_EXTRINSIC.into(),
            version: 4,
            signed_extensions: vec![
                v14::SignedExtensionMetadata {
                    identifier: "CheckMortality".into(),
                    ty: ERA.into(),
                    additional_signed: 16u32.into(),
                },
                v14::SignedExtensionMetadata {
                    identifier: "CheckNonce".into(),
                    ty: 26u32.into(),
                    additional_signed: 28u32.into(),
                },
                v14::SignedExtensionMetadata {
                    identifier: "ChargeTransactionPayment".into(),
                    ty: 27u32.into(),
                    additional_signed: 28u32.into(),
                },
            ],
        },
        ty: 28u32.into(),
    }
}

/// The encoded metadata, as returned by `state_getMetadata`.
pub fn metadata_bytes() -> Vec<u8> {
    let mut bytes = MAGIC_NUMBER.encode();
    bytes.push(14);
    metadata_v14().encode_to(&mut bytes);
    bytes
}

fn text(s: &str) -> DecodeDifferent<&'static str, String> {
    DecodeDifferent::Decoded(s.to_owned())
}

fn texts(items: &[&str]) -> DecodeDifferent<&'static [&'static str], Vec<String>> {
    DecodeDifferent::Decoded(items.iter().map(|s| (*s).to_owned()).collect())
}

fn call_v9(name: &str, args: &[(&str, &str)]) -> v9::FunctionMetadata {
    v9::FunctionMetadata {
        name: text(name),
        arguments: DecodeDifferent::Decoded(
            args.iter()
                .map(|(name, ty)| v9::FunctionArgumentMetadata {
                    name: text(name),
                    ty: text(ty),
                })
                .collect(),
        ),
        documentation: texts(&[" Transfer some liquid free balance."]),
    }
}

/// A Balances module as V9 metadata describes it.
pub fn module_v9() -> v9::ModuleMetadata {
    let entry = |name: &str, ty: v9::StorageEntryType, default: Vec<u8>| v9::StorageEntryMetadata {
        name: text(name),
        modifier: v9::StorageEntryModifier::Default,
        ty,
        default: DecodeDifferent::Decoded(default),
        documentation: texts(&[]),
    };
    v9::ModuleMetadata {
        name: text("Balances"),
        storage: Some(DecodeDifferent::Decoded(v9::StorageMetadata {
            prefix: text("Balances"),
            entries: DecodeDifferent::Decoded(vec![
                entry(
                    "TotalIssuance",
                    v9::StorageEntryType::Plain(text("T::Balance")),
                    vec![0; 16],
                ),
                entry(
                    "Locks",
                    v9::StorageEntryType::Map {
                        hasher: v9::StorageHasher::Twox64Concat,
                        key: text("T::AccountId"),
                        value: text("Vec<BalanceLock<T::Balance>>"),
                        is_linked: false,
                    },
                    vec![0],
                ),
            ]),
        })),
        calls: Some(DecodeDifferent::Decoded(vec![call_v9(
            "transfer",
            &[
                ("dest", "<T::Lookup as StaticLookup>::Source"),
                ("value", "Compact<T::Balance>"),
            ],
        )])),
        event: Some(DecodeDifferent::Decoded(vec![v9::EventMetadata {
            name: text("Transfer"),
            arguments: texts(&["AccountId", "AccountId", "Balance"]),
            documentation: texts(&[]),
        }])),
        constants: DecodeDifferent::Decoded(vec![v9::ModuleConstantMetadata {
            name: text("ExistentialDeposit"),
            ty: text("T::Balance"),
            value: DecodeDifferent::Decoded(vec![0; 16]),
            documentation: texts(&[]),
        }]),
        errors: DecodeDifferent::Decoded(vec![v9::ErrorMetadata {
            name: text("InsufficientBalance"),
            documentation: texts(&[]),
        }]),
    }
}

pub fn metadata_v9() -> MetadataV9 {
    MetadataV9 {
        modules: DecodeDifferent::Decoded(vec![module_v9()]),
    }
}

/// The encoded V9 metadata, with its magic number and version.
pub fn metadata_v9_bytes() -> Vec<u8> {
    let mut bytes = MAGIC_NUMBER.encode();
    bytes.push(9);
    metadata_v9().encode_to(&mut bytes);
    bytes
}

fn upgrade(v9: &MetadataV9) -> MetadataV13 {
    let v10 = to_v10(v9).expect("V9 converts to V10");
    let v11 = to_v11(&v10).expect("V10 converts to V11");
    let v12 = to_v12(&v11).expect("V11 converts to V12");
    to_v13(&v12).expect("V12 converts to V13")
}

/// The V9 Balances module converted to V13.
pub fn metadata_v13() -> MetadataV13 {
    upgrade(&metadata_v9())
}

/// A V13 module with the given number of calls.
pub fn metadata_v13_with_calls(count: usize) -> MetadataV13 {
    let mut module = module_v9();
    module.calls = Some(DecodeDifferent::Decoded(
        (0..count)
            .map(|idx| call_v9(&format!("call_{idx}"), &[]))
            .collect(),
    ));
    upgrade(&MetadataV9 {
        modules: DecodeDifferent::Decoded(vec![module]),
    })
}
