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

//! Turning metadata lookup types into [`TypeDef`]s and human names.

use crate::codec::{EnumDef, IntKind, StructDef, VariantDef};
use crate::error::Error;
use crate::metadata::compat_type;
use crate::types::{TypeDef, parse_type};
use crate::utils::{camel_case, pascal_case};
use scale_info::form::PortableForm;
use scale_info::{Field, PortableRegistry, Type, TypeDef as SiTypeDef, TypeDefPrimitive};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

// Generic containers which are never named after their path.
const GENERIC_PATHS: &[&str] = &[
    "Box",
    "BoundedBTreeMap",
    "BoundedBTreeSet",
    "BoundedVec",
    "BTreeMap",
    "BTreeSet",
    "Cow",
    "Option",
    "PhantomData",
    "Range",
    "RangeInclusive",
    "Result",
    "WeakBoundedVec",
    "WrapperKeepOpaque",
    "WrapperOpaque",
];

// Lookup paths which are decoded by native classes.
const NATIVE_PATHS: &[(&[&str], &str)] = &[
    (&["sp_runtime", "generic", "era", "Era"], "ExtrinsicEra"),
    (
        &["sp_runtime", "generic", "unchecked_extrinsic", "UncheckedExtrinsic"],
        "Extrinsic",
    ),
    (
        &["fp_self_contained", "unchecked_extrinsic", "UncheckedExtrinsic"],
        "Extrinsic",
    ),
];

type SiType = Type<PortableForm>;

fn path_is(ty: &SiType, path: &[&str]) -> bool {
    ty.path.segments.iter().map(String::as_str).eq(path.iter().copied())
}

fn last_segment(ty: &SiType) -> Option<&str> {
    ty.path.segments.last().map(String::as_str)
}

fn param_id(ty: &SiType, name: &str) -> Option<u32> {
    ty.type_params
        .iter()
        .find(|p| p.name == name)
        .and_then(|p| p.ty)
        .map(|p| p.id)
}

fn primitive(p: &TypeDefPrimitive) -> TypeDef {
    match p {
        TypeDefPrimitive::Bool => TypeDef::Bool,
        TypeDefPrimitive::Str => TypeDef::Text,
        TypeDefPrimitive::Char | TypeDefPrimitive::U32 => TypeDef::uint(32),
        TypeDefPrimitive::U8 => TypeDef::uint(8),
        TypeDefPrimitive::U16 => TypeDef::uint(16),
        TypeDefPrimitive::U64 => TypeDef::uint(64),
        TypeDefPrimitive::U128 => TypeDef::uint(128),
        TypeDefPrimitive::U256 => TypeDef::uint(256),
        TypeDefPrimitive::I8 => TypeDef::Int(IntKind::signed(8)),
        TypeDefPrimitive::I16 => TypeDef::Int(IntKind::signed(16)),
        TypeDefPrimitive::I32 => TypeDef::Int(IntKind::signed(32)),
        TypeDefPrimitive::I64 => TypeDef::Int(IntKind::signed(64)),
        TypeDefPrimitive::I128 => TypeDef::Int(IntKind::signed(128)),
        TypeDefPrimitive::I256 => TypeDef::Int(IntKind::signed(256)),
    }
}

fn primitive_name(p: &TypeDefPrimitive) -> &'static str {
    match p {
        TypeDefPrimitive::Bool => "bool",
        TypeDefPrimitive::Char => "char",
        TypeDefPrimitive::Str => "Text",
        TypeDefPrimitive::U8 => "u8",
        TypeDefPrimitive::U16 => "u16",
        TypeDefPrimitive::U32 => "u32",
        TypeDefPrimitive::U64 => "u64",
        TypeDefPrimitive::U128 => "u128",
        TypeDefPrimitive::U256 => "u256",
        TypeDefPrimitive::I8 => "i8",
        TypeDefPrimitive::I16 => "i16",
        TypeDefPrimitive::I32 => "i32",
        TypeDefPrimitive::I64 => "i64",
        TypeDefPrimitive::I128 => "i128",
        TypeDefPrimitive::I256 => "i256",
    }
}

fn is_u8(lookup: &PortableRegistry, id: u32) -> bool {
    matches!(
        lookup.resolve(id).map(|t| &t.type_def),
        Some(SiTypeDef::Primitive(TypeDefPrimitive::U8))
    )
}

/// The payload of a variant, or the body of a composite: nothing, a single
/// unnamed value, a tuple of unnamed values or a struct of named ones.
pub(crate) fn fields_def(fields: &[Field<PortableForm>]) -> TypeDef {
    match fields {
        [] => TypeDef::Null,
        [single] if single.name.is_none() => TypeDef::Lookup(single.ty.id),
        fields if fields.iter().all(|f| f.name.is_none()) => {
            TypeDef::Tuple(fields.iter().map(|f| TypeDef::Lookup(f.ty.id)).collect())
        }
        fields => TypeDef::Struct(Arc::new(StructDef::new(
            fields
                .iter()
                .enumerate()
                .map(|(idx, f)| {
                    let name = f
                        .name
                        .as_deref()
                        .map_or_else(|| format!("field{idx}"), camel_case);
                    (name, TypeDef::Lookup(f.ty.id))
                })
                .collect(),
        ))),
    }
}

/// The definition of a lookup type. `overrides` maps lookup ids to the
/// names of the classes which handle them, eg the runtime call enum to
/// `Call`.
pub(crate) fn to_type_def(
    lookup: &PortableRegistry,
    id: u32,
    overrides: &HashMap<u32, &'static str>,
) -> Result<TypeDef, Error> {
    if let Some(name) = overrides.get(&id) {
        return Ok(TypeDef::named(*name));
    }
    let ty = lookup
        .resolve(id)
        .ok_or_else(|| Error::UnknownType(format!("Lookup{id}")))?;
    if let Some(def) = compat_type(ty) {
        return parse_type(def);
    }
    if let Some((_, name)) = NATIVE_PATHS.iter().find(|(path, _)| path_is(ty, path)) {
        return Ok(TypeDef::named(*name));
    }

    let param = |name: &str| {
        param_id(ty, name)
            .map(TypeDef::Lookup)
            .ok_or_else(|| Error::InvalidTypeDefinition {
                def: ty.path.segments.join("::"),
                reason: format!("missing type parameter {name}"),
            })
    };

    let def = match &ty.type_def {
        SiTypeDef::Primitive(p) => primitive(p),
        SiTypeDef::Compact(inner) => {
            TypeDef::Compact(Box::new(TypeDef::Lookup(inner.type_param.id)))
        }
        SiTypeDef::Sequence(inner) if is_u8(lookup, inner.type_param.id) => TypeDef::Bytes,
        SiTypeDef::Sequence(inner) => TypeDef::Vec(Box::new(TypeDef::Lookup(inner.type_param.id))),
        SiTypeDef::Array(array) if is_u8(lookup, array.type_param.id) => {
            TypeDef::U8aFixed(array.len as usize)
        }
        SiTypeDef::Array(array) => TypeDef::VecFixed(
            Box::new(TypeDef::Lookup(array.type_param.id)),
            array.len as usize,
        ),
        SiTypeDef::Tuple(tuple) if tuple.fields.is_empty() => TypeDef::Null,
        SiTypeDef::Tuple(tuple) => {
            TypeDef::Tuple(tuple.fields.iter().map(|f| TypeDef::Lookup(f.id)).collect())
        }
        SiTypeDef::BitSequence(_) => TypeDef::BitVec,
        SiTypeDef::Composite(_) if last_segment(ty) == Some("BTreeMap") => {
            TypeDef::BTreeMap(Box::new(param("K")?), Box::new(param("V")?))
        }
        SiTypeDef::Composite(_) if last_segment(ty) == Some("BTreeSet") => {
            TypeDef::BTreeSet(Box::new(param("T")?))
        }
        SiTypeDef::Composite(composite) => fields_def(&composite.fields),
        SiTypeDef::Variant(_) if path_is(ty, &["Option"]) => {
            TypeDef::Option(Box::new(param("T")?))
        }
        SiTypeDef::Variant(_) if path_is(ty, &["Result"]) => {
            TypeDef::Result(Box::new(param("T")?), Box::new(param("E")?))
        }
        SiTypeDef::Variant(variants) => TypeDef::Enum(Arc::new(EnumDef::new(
            variants
                .variants
                .iter()
                .map(|v| VariantDef::new(v.name.clone(), v.index, fields_def(&v.fields)))
                .collect(),
        ))),
    };
    Ok(def)
}

// `["pallet_balances", "pallet", "Call"]` becomes `PalletBalancesCall`.
fn path_name(ty: &SiType) -> Option<String> {
    if compat_type(ty).is_some() {
        return None;
    }
    let last = last_segment(ty)?;
    if GENERIC_PATHS.contains(&last) {
        return None;
    }
    Some(
        ty.path
            .segments
            .iter()
            .enumerate()
            .filter(|(idx, segment)| *idx == 0 || segment.as_str() != "pallet")
            .map(|(_, segment)| pascal_case(segment))
            .collect(),
    )
}

fn short_name(lookup: &PortableRegistry, id: u32) -> String {
    let Some(ty) = lookup.resolve(id) else {
        return format!("Lookup{id}");
    };
    if let Some(def) = compat_type(ty) {
        return pascal_case(def);
    }
    if let Some(last) = last_segment(ty) {
        return pascal_case(last);
    }
    match &ty.type_def {
        SiTypeDef::Primitive(p) => pascal_case(primitive_name(p)),
        SiTypeDef::Sequence(inner) => format!("Vec{}", short_name(lookup, inner.type_param.id)),
        SiTypeDef::Compact(inner) => {
            format!("Compact{}", short_name(lookup, inner.type_param.id))
        }
        SiTypeDef::Array(array) => {
            format!("Array{}", short_name(lookup, array.type_param.id))
        }
        SiTypeDef::Tuple(tuple) if tuple.fields.is_empty() => "Null".to_owned(),
        SiTypeDef::Tuple(tuple) => tuple
            .fields
            .iter()
            .map(|f| short_name(lookup, f.id))
            .collect::<Vec<_>>()
            .join(""),
        _ => format!("Lookup{id}"),
    }
}

/// Unique names for every lookup type which has a path.
///
/// Types sharing a path are told apart by their generic parameters, and
/// failing that by their lookup id.
pub(crate) fn lookup_names(lookup: &PortableRegistry) -> BTreeMap<u32, String> {
    let mut by_name: BTreeMap<String, Vec<u32>> = BTreeMap::new();
    for t in &lookup.types {
        if let Some(name) = path_name(&t.ty) {
            by_name.entry(name).or_default().push(t.id);
        }
    }

    let mut names = BTreeMap::new();
    for (name, ids) in by_name {
        if let [id] = ids.as_slice() {
            names.insert(*id, name);
            continue;
        }

        let with_params: Vec<(u32, String)> = ids
            .iter()
            .map(|id| {
                let params: String = lookup
                    .resolve(*id)
                    .map(|t| {
                        t.type_params
                            .iter()
                            .filter_map(|p| p.ty)
                            .map(|p| short_name(lookup, p.id))
                            .collect()
                    })
                    .unwrap_or_default();
                (*id, format!("{name}{params}"))
            })
            .collect();

        for (id, candidate) in &with_params {
            let clashes = with_params.iter().filter(|(_, c)| c == candidate).count();
            if clashes == 1 {
                names.insert(*id, candidate.clone());
            } else {
                log::warn!("Lookup name {candidate} is ambiguous, using {candidate}{id}");
                names.insert(*id, format!("{candidate}{id}"));
            }
        }
    }
    names
}

/// A human readable name of some lookup type.
pub(crate) fn si_name(lookup: &PortableRegistry, names: &BTreeMap<u32, String>, id: u32) -> String {
    if let Some(name) = names.get(&id) {
        return name.clone();
    }
    let Some(ty) = lookup.resolve(id) else {
        return format!("Lookup{id}");
    };
    let name = |id: u32| si_name(lookup, names, id);
    if let Some(def) = compat_type(ty) {
        return def.to_owned();
    }
    let param = |p: &str| param_id(ty, p).map_or_else(|| "Null".to_owned(), name);

    match &ty.type_def {
        SiTypeDef::Primitive(p) => primitive_name(p).to_owned(),
        SiTypeDef::Compact(inner) => format!("Compact<{}>", name(inner.type_param.id)),
        SiTypeDef::Sequence(inner) if is_u8(lookup, inner.type_param.id) => "Bytes".to_owned(),
        SiTypeDef::Sequence(inner) => format!("Vec<{}>", name(inner.type_param.id)),
        SiTypeDef::Array(array) => format!("[{};{}]", name(array.type_param.id), array.len),
        SiTypeDef::Tuple(tuple) if tuple.fields.is_empty() => "Null".to_owned(),
        SiTypeDef::Tuple(tuple) => format!(
            "({})",
            tuple.fields.iter().map(|f| name(f.id)).collect::<Vec<_>>().join(",")
        ),
        SiTypeDef::BitSequence(_) => "BitVec".to_owned(),
        SiTypeDef::Variant(_) if path_is(ty, &["Option"]) => format!("Option<{}>", param("T")),
        SiTypeDef::Variant(_) if path_is(ty, &["Result"]) => {
            format!("Result<{}, {}>", param("T"), param("E"))
        }
        SiTypeDef::Composite(_) if last_segment(ty) == Some("BTreeMap") => {
            format!("BTreeMap<{}, {}>", param("K"), param("V"))
        }
        SiTypeDef::Composite(_) if last_segment(ty) == Some("BTreeSet") => {
            format!("BTreeSet<{}>", param("T"))
        }
        SiTypeDef::Composite(composite) if composite.fields.len() == 1 => {
            name(composite.fields[0].ty.id)
        }
        _ => format!("Lookup{id}"),
    }
}
