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

use super::extensions::ExtensionDef;
use crate::error::Error;
use crate::metadata::TypesAlias;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// User supplied type information for a chain.
///
/// This is usually loaded from JSON or YAML:
///
/// ```rust
/// use frame_codec::registry::KnownTypes;
///
/// let known = KnownTypes::from_json(r#"{
///     "types": { "Balance": "u64" },
///     "typesAlias": { "assets": { "Balance": "TAssetBalance" } },
///     "typesBundle": {
///         "spec": {
///             "node": {
///                 "types": [{ "minmax": [0, 100], "types": { "Index": "u64" } }],
///                 "instances": { "council": ["generalCouncil"] }
///             }
///         }
///     }
/// }"#).unwrap();
///
/// assert_eq!(known.types["Balance"], "u64");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownTypes {
    /// Type definitions by name.
    #[serde(default)]
    pub types: Map<String, Value>,
    /// Type renames applied to legacy metadata, per section.
    #[serde(default)]
    pub types_alias: TypesAlias,
    /// Definitions which apply to specific chains and runtime versions.
    #[serde(default)]
    pub types_bundle: TypesBundle,
    /// Definitions of signed extensions, by identifier.
    #[serde(default)]
    pub signed_extensions: BTreeMap<String, ExtensionDef>,
}

/// Definitions for specific chains, keyed by runtime spec name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TypesBundle {
    /// Chain definitions by spec name.
    #[serde(default)]
    pub spec: BTreeMap<String, SpecDefinitions>,
}

/// The definitions of one chain.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecDefinitions {
    /// Type definitions, each for a range of runtime versions.
    #[serde(default)]
    pub types: Vec<VersionedTypes>,
    /// Type renames applied to legacy metadata, per section.
    #[serde(default)]
    pub alias: TypesAlias,
    /// The instance names a module is deployed under.
    #[serde(default)]
    pub instances: BTreeMap<String, Vec<String>>,
    /// Definitions of signed extensions, by identifier.
    #[serde(default)]
    pub signed_extensions: BTreeMap<String, ExtensionDef>,
}

/// Type definitions for the runtime versions `minmax[0]..=minmax[1]`, where
/// a missing bound is unbounded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VersionedTypes {
    /// The inclusive range of spec versions these apply to.
    #[serde(default)]
    pub minmax: [Option<u32>; 2],
    /// Type definitions by name.
    #[serde(default)]
    pub types: Map<String, Value>,
}

impl VersionedTypes {
    /// Do these definitions apply to the given spec version.
    pub fn applies_to(&self, spec_version: u32) -> bool {
        let [min, max] = self.minmax;
        min.is_none_or(|min| spec_version >= min) && max.is_none_or(|max| spec_version <= max)
    }
}

impl KnownTypes {
    /// Load from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a YAML string.
    #[cfg(feature = "yaml")]
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// The type definitions for a chain at some runtime version, in the
    /// order they should be registered.
    pub fn spec_types(&self, spec_name: &str, spec_version: u32) -> Vec<&Map<String, Value>> {
        self.types_bundle
            .spec
            .get(spec_name)
            .map(|spec| {
                spec.types
                    .iter()
                    .filter(|t| t.applies_to(spec_version))
                    .map(|t| &t.types)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The type aliases for a chain, merging chain specific ones over the
    /// general ones.
    pub fn aliases_for(&self, spec_name: Option<&str>) -> TypesAlias {
        let mut aliases = self.types_alias.clone();
        let spec = spec_name.and_then(|name| self.types_bundle.spec.get(name));
        if let Some(spec) = spec {
            for (section, renames) in &spec.alias {
                aliases
                    .entry(section.clone())
                    .or_default()
                    .extend(renames.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        aliases
    }

    /// The signed extension definitions for a chain, merging chain specific
    /// ones over the general ones.
    pub fn extensions_for(&self, spec_name: Option<&str>) -> BTreeMap<String, ExtensionDef> {
        let mut exts = self.signed_extensions.clone();
        let spec = spec_name.and_then(|name| self.types_bundle.spec.get(name));
        if let Some(spec) = spec {
            exts.extend(spec.signed_extensions.clone());
        }
        exts
    }

    /// The instance names of a module on a chain.
    pub fn instances(&self, spec_name: &str, module: &str) -> Option<&[String]> {
        self.types_bundle
            .spec
            .get(spec_name)
            .and_then(|spec| spec.instances.get(module))
            .map(Vec::as_slice)
    }
}

/// The definitions every registry starts with.
pub(crate) fn base_definitions() -> Value {
    json!({
        "AccountId": "AccountId32",
        "AccountId32": "[u8;32]",
        "AccountId20": "[u8;20]",
        "AccountIndex": "u32",
        "Address": "MultiAddress",
        "LookupSource": "MultiAddress",
        "AssetId": "u32",
        "Balance": "u128",
        "BalanceOf": "Balance",
        "BlockNumber": "u32",
        "BlockNumberFor": "BlockNumber",
        "Hash": "H256",
        "H160": "[u8;20]",
        "H256": "[u8;32]",
        "H512": "[u8;64]",
        "Index": "u32",
        "Nonce": "Index",
        "Moment": "u64",
        "Perbill": "u32",
        "Permill": "u32",
        "Percent": "u8",
        "Weight": "WeightV1",
        "WeightV1": "u64",
        "WeightV2": {
            "refTime": "Compact<u64>",
            "proofSize": "Compact<u64>"
        },
        "MultiAddress": {
            "_enum": {
                "Id": "AccountId",
                "Index": "Compact<AccountIndex>",
                "Raw": "Bytes",
                "Address32": "H256",
                "Address20": "H160"
            }
        },
        "EcdsaSignature": "[u8;65]",
        "Ed25519Signature": "H512",
        "Sr25519Signature": "H512",
        "MultiSignature": {
            "_enum": {
                "Ed25519": "Ed25519Signature",
                "Sr25519": "Sr25519Signature",
                "Ecdsa": "EcdsaSignature"
            }
        },
        "ExtrinsicSignature": "MultiSignature",
        "MetadataHashMode": {
            "_enum": ["Disabled", "Enabled"]
        },
        "Phase": {
            "_enum": {
                "ApplyExtrinsic": "u32",
                "Finalization": "Null",
                "Initialization": "Null"
            }
        },
        "EventRecord": {
            "phase": "Phase",
            "event": "Event",
            "topics": "Vec<Hash>"
        },
        "DispatchClass": {
            "_enum": ["Normal", "Operational", "Mandatory"]
        },
        "Pays": {
            "_enum": ["Yes", "No"]
        },
        "DispatchInfo": {
            "weight": "Weight",
            "class": "DispatchClass",
            "paysFee": "Pays"
        },
        "RuntimeDbWeight": {
            "read": "Weight",
            "write": "Weight"
        },
        "Header": {
            "parentHash": "Hash",
            "number": "Compact<BlockNumber>",
            "stateRoot": "Hash",
            "extrinsicsRoot": "Hash",
            "digest": "Vec<Bytes>"
        },
        "OpaqueMetadata": "Bytes",
        "RuntimeVersion": {
            "specName": "Text",
            "implName": "Text",
            "authoringVersion": "u32",
            "specVersion": "u32",
            "implVersion": "u32",
            "apis": "Vec<([u8;8], u32)>",
            "transactionVersion": "u32",
            "stateVersion": "u8"
        }
    })
}
