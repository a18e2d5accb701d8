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

use crate::codec::StructDef;
use crate::error::Error;
use crate::types::{TypeDef, parse_definition};
use crate::utils::camel_case;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// The signed extensions assumed when metadata doesn't list any.
pub const DEFAULT_EXTENSIONS: [&str; 7] = [
    "CheckSpecVersion",
    "CheckTxVersion",
    "CheckGenesis",
    "CheckMortality",
    "CheckNonce",
    "CheckWeight",
    "ChargeTransactionPayment",
];

/// The fields a signed extension adds to an extrinsic (`extrinsic`) and
/// to the signing payload only (`payload`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtensionDef {
    /// Fields encoded in the extrinsic.
    #[serde(default)]
    pub extrinsic: Map<String, Value>,
    /// Fields only found in the signing payload.
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl ExtensionDef {
    fn new(extrinsic: &[(&str, &str)], payload: &[(&str, &str)]) -> Self {
        let to_map = |fields: &[(&str, &str)]| {
            fields
                .iter()
                .map(|(name, ty)| ((*name).to_owned(), Value::from(*ty)))
                .collect()
        };
        ExtensionDef {
            extrinsic: to_map(extrinsic),
            payload: to_map(payload),
        }
    }
}

/// The extensions every FRAME runtime may use, by identifier.
pub fn frame_extensions() -> BTreeMap<&'static str, ExtensionDef> {
    let era = [("era", "ExtrinsicEra")];
    let block_hash = [("blockHash", "Hash")];
    let empty: [(&str, &str); 0] = [];

    let mut exts = BTreeMap::new();
    exts.insert("CheckMortality", ExtensionDef::new(&era, &block_hash));
    exts.insert("CheckEra", ExtensionDef::new(&era, &block_hash));
    exts.insert("CheckNonce", ExtensionDef::new(&[("nonce", "Compact<Index>")], &empty));
    exts.insert(
        "ChargeTransactionPayment",
        ExtensionDef::new(&[("tip", "Compact<Balance>")], &empty),
    );
    exts.insert(
        "ChargeAssetTxPayment",
        ExtensionDef::new(
            &[("tip", "Compact<Balance>"), ("assetId", "Option<AssetId>")],
            &empty,
        ),
    );
    exts.insert(
        "CheckMetadataHash",
        ExtensionDef::new(&[("mode", "MetadataHashMode")], &[("metadataHash", "Option<[u8;32]>")]),
    );
    exts.insert(
        "CheckSpecVersion",
        ExtensionDef::new(&empty, &[("specVersion", "u32")]),
    );
    exts.insert(
        "CheckTxVersion",
        ExtensionDef::new(&empty, &[("transactionVersion", "u32")]),
    );
    exts.insert("CheckGenesis", ExtensionDef::new(&empty, &[("genesisHash", "Hash")]));
    for name in [
        "CheckWeight",
        "CheckNonZeroSender",
        "CheckBlockGasLimit",
        "LockStakingStatus",
        "ValidateEquivocationReport",
        "PrevalidateAttests",
        "RestrictFunctionality",
        "StorageWeightReclaim",
        "WeightReclaim",
        "AuthorizeCall",
    ] {
        exts.insert(name, ExtensionDef::default());
    }
    exts
}

/// A signed extension as declared by metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionInfo {
    /// The extension identifier, eg `CheckNonce`.
    pub identifier: String,
    /// The lookup type of the explicit data.
    pub ty: u32,
    /// The lookup type of the implicit data.
    pub implicit: u32,
}

impl ExtensionInfo {
    /// An extension known only by name.
    pub fn named(identifier: impl Into<String>) -> Self {
        ExtensionInfo {
            identifier: identifier.into(),
            ty: 0,
            implicit: 0,
        }
    }
}

/// The struct shapes of a list of extensions: the explicit fields found in
/// the extrinsic and the implicit fields only found in the signing payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtensionShapes {
    /// Fields found in the extrinsic, in order.
    pub explicit: Arc<StructDef>,
    /// Fields only found in the signing payload, in order.
    pub implicit: Arc<StructDef>,
}

/// Work out the explicit and implicit fields of some extensions.
///
/// User definitions take precedence over the FRAME ones. Extensions known to
/// neither fall back to their lookup types, as long as those carry data.
pub fn extension_shapes(
    extensions: &[ExtensionInfo],
    user: &BTreeMap<String, ExtensionDef>,
    lookup_is_empty: impl Fn(u32) -> bool,
) -> Result<ExtensionShapes, Error> {
    let frame = frame_extensions();
    let mut explicit: Vec<(String, TypeDef)> = Vec::new();
    let mut implicit: Vec<(String, TypeDef)> = Vec::new();

    for ext in extensions {
        let def = user
            .get(&ext.identifier)
            .or_else(|| frame.get(ext.identifier.as_str()));
        match def {
            Some(def) => {
                for (name, ty) in &def.extrinsic {
                    upsert(&mut explicit, name, parse_definition(ty)?);
                }
                for (name, ty) in &def.payload {
                    upsert(&mut implicit, name, parse_definition(ty)?);
                }
            }
            None => {
                let name = camel_case(&ext.identifier);
                if !lookup_is_empty(ext.ty) {
                    log::warn!(
                        "Unknown signed extension {} carries data, decoding it as Lookup{}",
                        ext.identifier,
                        ext.ty
                    );
                    upsert(&mut explicit, &name, TypeDef::Lookup(ext.ty));
                }
                if !lookup_is_empty(ext.implicit) {
                    upsert(&mut implicit, &name, TypeDef::Lookup(ext.implicit));
                }
            }
        }
    }

    Ok(ExtensionShapes {
        explicit: Arc::new(StructDef::new(explicit)),
        implicit: Arc::new(StructDef::new(implicit)),
    })
}

// A later extension redefining a field keeps the position of the first.
fn upsert(fields: &mut Vec<(String, TypeDef)>, name: &str, ty: TypeDef) {
    match fields.iter_mut().find(|(n, _)| n == name) {
        Some((_, existing)) => *existing = ty,
        None => fields.push((name.to_owned(), ty)),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn names(def: &StructDef) -> Vec<&str> {
        def.keys().collect()
    }

    #[test]
    fn default_extensions_shape() {
        let exts: Vec<_> = DEFAULT_EXTENSIONS.iter().map(|n| ExtensionInfo::named(*n)).collect();
        let shapes = extension_shapes(&exts, &BTreeMap::new(), |_| true).unwrap();
        assert_eq!(names(&shapes.explicit), vec!["era", "nonce", "tip"]);
        assert_eq!(
            names(&shapes.implicit),
            vec!["specVersion", "transactionVersion", "genesisHash", "blockHash"]
        );
    }

    #[test]
    fn user_and_unknown_extensions() {
        let mut user = BTreeMap::new();
        user.insert(
            "CheckNonce".to_owned(),
            ExtensionDef::new(&[("nonce", "Compact<u64>")], &[]),
        );
        let exts = vec![
            ExtensionInfo::named("CheckNonce"),
            ExtensionInfo {
                identifier: "CheckAppId".into(),
                ty: 7,
                implicit: 0,
            },
        ];
        let shapes = extension_shapes(&exts, &user, |id| id == 0).unwrap();
        assert_eq!(
            shapes.explicit.fields(),
            &[
                ("nonce".to_owned(), TypeDef::parse("Compact<u64>").unwrap()),
                ("checkAppId".to_owned(), TypeDef::Lookup(7)),
            ]
        );
        assert!(shapes.implicit.fields().is_empty());
    }

    #[test]
    fn repeated_fields_keep_their_position() {
        let exts = vec![
            ExtensionInfo::named("CheckEra"),
            ExtensionInfo::named("CheckNonce"),
            ExtensionInfo::named("CheckMortality"),
        ];
        let shapes = extension_shapes(&exts, &BTreeMap::new(), |_| true).unwrap();
        assert_eq!(names(&shapes.explicit), vec!["era", "nonce"]);
    }
}
