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

use super::legacy::{fn_list, fn_value, list, text, texts};
use super::{MetadataV13, MetadataV14};
use crate::error::Error;
use crate::utils::camel_case;
use frame_metadata::decode_different::DecodeDifferent;
use frame_metadata::{v13, v14};
use scale_info::form::PortableForm;
use scale_info::{
    Field, Path, PortableRegistry, PortableType, Type, TypeDef, TypeDefComposite,
    TypeDefVariant, Variant,
};
use std::collections::{BTreeMap, HashMap};

/// Per-section type renames, keyed by camelCase section name.
pub type TypesAlias = BTreeMap<String, BTreeMap<String, String>>;

type Aliases<'a> = Option<&'a BTreeMap<String, String>>;

/// The path of lookup entries standing in for a legacy type string. The
/// string itself is the only doc line of the entry.
pub const COMPAT_PATH: &str = "HistoricMetaCompat";

/// A lookup entry standing in for a legacy type string.
pub fn compat_entry(def: &str) -> Type<PortableForm> {
    Type {
        path: Path {
            segments: vec![COMPAT_PATH.to_owned()],
        },
        type_params: Vec::new(),
        type_def: TypeDef::Composite(TypeDefComposite { fields: Vec::new() }),
        docs: vec![def.to_owned()],
    }
}

/// The legacy type string of a lookup entry created by converting V13 or
/// older metadata.
pub fn compat_type(ty: &Type<PortableForm>) -> Option<&str> {
    match (ty.path.segments.as_slice(), ty.docs.as_slice(), &ty.type_def) {
        ([path], [def], TypeDef::Composite(c)) if path == COMPAT_PATH && c.fields.is_empty() => {
            Some(def.as_str())
        }
        _ => None,
    }
}

// Builds a lookup of legacy type strings, one entry per unique string.
struct CompatLookup {
    types: Vec<PortableType>,
    ids: HashMap<String, u32>,
}

impl CompatLookup {
    fn new() -> Self {
        let mut compat = CompatLookup {
            types: Vec::new(),
            ids: HashMap::new(),
        };
        // Id 0 is `Null`, used where a type is not known.
        compat.compat("Null");
        compat
    }

    fn push(&mut self, ty: Type<PortableForm>) -> u32 {
        let id = self.types.len() as u32;
        self.types.push(PortableType::new(id, ty));
        id
    }

    fn compat(&mut self, def: &str) -> u32 {
        if let Some(id) = self.ids.get(def) {
            return *id;
        }
        let id = self.push(compat_entry(def));
        self.ids.insert(def.to_owned(), id);
        id
    }

    fn ty(&mut self, aliases: Aliases<'_>, def: &str) -> u32 {
        self.compat(&apply_alias(aliases, def))
    }

    fn variants(&mut self, segments: Vec<String>, variants: Vec<Variant<PortableForm>>) -> u32 {
        self.push(Type {
            path: Path { segments },
            type_params: Vec::new(),
            type_def: TypeDef::Variant(TypeDefVariant { variants }),
            docs: Vec::new(),
        })
    }

    fn storage_type(
        &mut self,
        aliases: Aliases<'_>,
        ty: &v13::StorageEntryType,
    ) -> v14::StorageEntryType<PortableForm> {
        match ty {
            v13::StorageEntryType::Plain(value) => {
                v14::StorageEntryType::Plain(self.ty(aliases, text(value)).into())
            }
            v13::StorageEntryType::Map { hasher, key, value, .. } => v14::StorageEntryType::Map {
                hashers: vec![storage_hasher(hasher)],
                key: self.ty(aliases, text(key)).into(),
                value: self.ty(aliases, text(value)).into(),
            },
            v13::StorageEntryType::DoubleMap {
                hasher,
                key1,
                key2,
                value,
                key2_hasher,
            } => {
                let keys = [text(key1).to_owned(), text(key2).to_owned()];
                v14::StorageEntryType::Map {
                    hashers: vec![storage_hasher(hasher), storage_hasher(key2_hasher)],
                    key: self.ty(aliases, &key_tuple(&keys)).into(),
                    value: self.ty(aliases, text(value)).into(),
                }
            }
            v13::StorageEntryType::NMap {
                keys,
                hashers,
                value,
            } => v14::StorageEntryType::Map {
                hashers: list(hashers).iter().map(storage_hasher).collect(),
                key: self.ty(aliases, &key_tuple(&texts(keys))).into(),
                value: self.ty(aliases, text(value)).into(),
            },
        }
    }

    fn finish(self) -> PortableRegistry {
        PortableRegistry { types: self.types }
    }
}

/// Rename a type through the aliases of its section. Aliases apply to the
/// whole type or to generic parameters and tuple members inside it.
pub fn apply_alias(aliases: Aliases<'_>, ty: &str) -> String {
    let Some(aliases) = aliases else {
        return ty.to_owned();
    };
    if let Some(to) = aliases.get(ty) {
        return to.clone();
    }
    let mut out = ty.to_owned();
    for (from, to) in aliases {
        for (open, close) in [
            ("<", ">"),
            ("<", ","),
            (",", ">"),
            ("(", ")"),
            ("(", ","),
            (",", ","),
            (",", ")"),
            (", ", ">"),
            (", ", ","),
            (", ", ")"),
        ] {
            out = out.replace(&format!("{open}{from}{close}"), &format!("{open}{to}{close}"));
        }
    }
    out
}

fn key_tuple(keys: &[String]) -> String {
    match keys {
        [key] => key.clone(),
        keys => format!("({})", keys.join(", ")),
    }
}

fn storage_hasher(hasher: &v13::StorageHasher) -> v14::StorageHasher {
    match hasher {
        v13::StorageHasher::Blake2_128 => v14::StorageHasher::Blake2_128,
        v13::StorageHasher::Blake2_256 => v14::StorageHasher::Blake2_256,
        v13::StorageHasher::Blake2_128Concat => v14::StorageHasher::Blake2_128Concat,
        v13::StorageHasher::Twox128 => v14::StorageHasher::Twox128,
        v13::StorageHasher::Twox256 => v14::StorageHasher::Twox256,
        v13::StorageHasher::Twox64Concat => v14::StorageHasher::Twox64Concat,
        v13::StorageHasher::Identity => v14::StorageHasher::Identity,
    }
}

fn modifier(modifier: &v13::StorageEntryModifier) -> v14::StorageEntryModifier {
    match modifier {
        v13::StorageEntryModifier::Optional => v14::StorageEntryModifier::Optional,
        v13::StorageEntryModifier::Default => v14::StorageEntryModifier::Default,
    }
}

fn default_bytes(value: &v13::ByteGetter) -> Vec<u8> {
    match value {
        DecodeDifferent::Encode(getter) => v13::DefaultByte::default_byte(getter.0),
        DecodeDifferent::Decoded(bytes) => bytes.clone(),
    }
}

fn variant_index(section: &str, kind: &str, idx: usize) -> Result<u8, Error> {
    u8::try_from(idx).map_err(|_| Error::InvalidTypeDefinition {
        def: format!("{section}::{kind}"),
        reason: format!("variant {idx} does not fit a u8 index"),
    })
}

/// V13 to V14: legacy type strings become [`COMPAT_PATH`] lookup entries
/// and calls, events and errors become variant types.
pub fn to_v14(v13: &MetadataV13, types_alias: &TypesAlias) -> Result<MetadataV14, Error> {
    let mut compat = CompatLookup::new();
    let modules = list(&v13.modules);
    let mut pallets = Vec::with_capacity(modules.len());

    for module in modules {
        let name = text(&module.name);
        let section = camel_case(name);
        let aliases = types_alias.get(&section);

        let storage = match &module.storage {
            Some(storage) => {
                let storage = fn_value(storage);
                let mut entries = Vec::new();
                for entry in list(&storage.entries) {
                    entries.push(v14::StorageEntryMetadata {
                        name: text(&entry.name).to_owned(),
                        modifier: modifier(&entry.modifier),
                        ty: compat.storage_type(aliases, &entry.ty),
                        default: default_bytes(&entry.default),
                        docs: texts(&entry.documentation),
                    });
                }
                Some(v14::PalletStorageMetadata {
                    prefix: text(&storage.prefix).to_owned(),
                    entries,
                })
            }
            None => None,
        };

        let mut constants = Vec::new();
        for constant in fn_list(&module.constants) {
            constants.push(v14::PalletConstantMetadata {
                name: text(&constant.name).to_owned(),
                ty: compat.ty(aliases, text(&constant.ty)).into(),
                value: default_bytes(&constant.value),
                docs: texts(&constant.documentation),
            });
        }

        let calls = match &module.calls {
            Some(calls) => {
                let mut variants = Vec::new();
                for (idx, call) in fn_list(calls).iter().enumerate() {
                    let mut fields = Vec::new();
                    for arg in list(&call.arguments) {
                        let ty = text(&arg.ty);
                        fields.push(Field {
                            name: Some(text(&arg.name).to_owned()),
                            ty: compat.ty(aliases, ty).into(),
                            type_name: Some(ty.to_owned()),
                            docs: Vec::new(),
                        });
                    }
                    variants.push(Variant {
                        name: text(&call.name).to_owned(),
                        fields,
                        index: variant_index(&section, "Call", idx)?,
                        docs: texts(&call.documentation),
                    });
                }
                Some(variants)
            }
            None => None,
        };

        let events = match &module.event {
            Some(events) => {
                let mut variants = Vec::new();
                for (idx, event) in fn_list(events).iter().enumerate() {
                    let fields = texts(&event.arguments)
                        .into_iter()
                        .map(|arg| Field {
                            name: None,
                            ty: compat.ty(aliases, &arg).into(),
                            type_name: Some(arg),
                            docs: Vec::new(),
                        })
                        .collect();
                    variants.push(Variant {
                        name: text(&event.name).to_owned(),
                        fields,
                        index: variant_index(&section, "Event", idx)?,
                        docs: texts(&event.documentation),
                    });
                }
                Some(variants)
            }
            None => None,
        };

        let mut errors = Vec::new();
        for (idx, error) in fn_list(&module.errors).iter().enumerate() {
            errors.push(Variant {
                name: text(&error.name).to_owned(),
                fields: Vec::new(),
                index: variant_index(&section, "Error", idx)?,
                docs: texts(&error.documentation),
            });
        }

        let path = |kind: &str| vec![format!("pallet_{section}"), "pallet".to_owned(), kind.to_owned()];
        let calls = calls.map(|v| v14::PalletCallMetadata {
            ty: compat.variants(path("Call"), v).into(),
        });
        let event = events.map(|v| v14::PalletEventMetadata {
            ty: compat.variants(path("Event"), v).into(),
        });
        let error = (!errors.is_empty()).then(|| v14::PalletErrorMetadata {
            ty: compat.variants(path("Error"), errors).into(),
        });

        pallets.push(v14::PalletMetadata {
            name: name.to_owned(),
            storage,
            calls,
            event,
            constants,
            error,
            index: module.index,
        });
    }

    let extrinsic = v14::ExtrinsicMetadata {
        ty: 0u32.into(),
        version: v13.extrinsic.version,
        signed_extensions: v13
            .extrinsic
            .signed_extensions
            .iter()
            .map(|identifier| v14::SignedExtensionMetadata {
                identifier: text(identifier).to_owned(),
                ty: 0u32.into(),
                additional_signed: 0u32.into(),
            })
            .collect(),
    };

    Ok(MetadataV14 {
        types: compat.finish(),
        pallets,
        extrinsic,
        ty: 0u32.into(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metadata::fixtures;

    fn compat_string(md: &MetadataV14, id: u32) -> &str {
        let ty = md.types.resolve(id).unwrap();
        compat_type(ty).unwrap_or_else(|| panic!("expected a compat type, got {ty:?}"))
    }

    #[test]
    fn legacy_types_become_compat_lookups() {
        let md = to_v14(&fixtures::metadata_v13(), &TypesAlias::new()).unwrap();
        let pallet = &md.pallets[0];
        assert_eq!(pallet.index, crate::metadata::UNKNOWN_MODULE_INDEX);

        let calls = md.types.resolve(pallet.calls.as_ref().unwrap().ty.id).unwrap();
        assert_eq!(calls.path.segments, vec!["pallet_balances", "pallet", "Call"]);
        let TypeDef::Variant(variants) = &calls.type_def else {
            panic!("expected a variant")
        };
        let transfer = &variants.variants[0];
        assert_eq!(transfer.name, "transfer");
        assert_eq!(compat_string(&md, transfer.fields[1].ty.id), "Compact<T::Balance>");

        // The same string shares one lookup entry.
        let constant = pallet.constants[0].ty.id;
        let storage = match &pallet.storage.as_ref().unwrap().entries[0].ty {
            v14::StorageEntryType::Plain(ty) => ty.id,
            other => panic!("expected plain storage, got {other:?}"),
        };
        assert_eq!(constant, storage);
        assert_eq!(compat_string(&md, md.extrinsic.ty.id), "Null");

        let error = md.types.resolve(pallet.error.as_ref().unwrap().ty.id).unwrap();
        assert_eq!(error.path.segments.last().unwrap(), "Error");
    }

    #[test]
    fn compat_entries_are_recognised() {
        let entry = compat_entry("Vec<T::AccountId>");
        assert_eq!(compat_type(&entry), Some("Vec<T::AccountId>"));

        let mut plain = compat_entry("u32");
        plain.path.segments = vec!["sp_core".into(), "Wrapper".into()];
        assert_eq!(compat_type(&plain), None);
    }

    #[test]
    fn aliases_apply_to_whole_types_and_parameters() {
        let aliases: BTreeMap<String, String> =
            [("Balance".to_owned(), "AssetBalance".to_owned())].into_iter().collect();
        assert_eq!(apply_alias(Some(&aliases), "Balance"), "AssetBalance");
        assert_eq!(
            apply_alias(Some(&aliases), "Compact<Balance>"),
            "Compact<AssetBalance>"
        );
        assert_eq!(
            apply_alias(Some(&aliases), "(AccountId, Balance)"),
            "(AccountId, AssetBalance)"
        );
        assert_eq!(apply_alias(Some(&aliases), "BalanceOf"), "BalanceOf");
        assert_eq!(apply_alias(None, "Balance"), "Balance");

        let mut types_alias = TypesAlias::new();
        types_alias.insert(
            "balances".into(),
            [("Vec<BalanceLock<T::Balance>>".to_owned(), "Vec<Lock>".to_owned())]
                .into_iter()
                .collect(),
        );
        let md = to_v14(&fixtures::metadata_v13(), &types_alias).unwrap();
        let v14::StorageEntryType::Map { value, hashers, .. } =
            &md.pallets[0].storage.as_ref().unwrap().entries[1].ty
        else {
            panic!("expected a map")
        };
        assert_eq!(compat_string(&md, value.id), "Vec<Lock>");
        assert_eq!(hashers, &vec![v14::StorageHasher::Twox64Concat]);
    }

    #[test]
    fn more_than_256_calls_are_rejected() {
        let md = fixtures::metadata_v13_with_calls(257);
        assert!(matches!(
            to_v14(&md, &TypesAlias::new()),
            Err(Error::InvalidTypeDefinition { .. })
        ));

        let md = fixtures::metadata_v13_with_calls(256);
        let v14 = to_v14(&md, &TypesAlias::new()).unwrap();
        let calls = v14.types.resolve(v14.pallets[0].calls.as_ref().unwrap().ty.id).unwrap();
        let TypeDef::Variant(variants) = &calls.type_def else {
            panic!("expected a variant")
        };
        assert_eq!(variants.variants.last().unwrap().index, 255);
    }
}
