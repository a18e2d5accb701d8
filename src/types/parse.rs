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

use super::TypeDef;
use crate::codec::IntKind;
use crate::error::Error;

/// Normalise a Rust-ish type string as found in legacy metadata and type
/// definitions, ie strip whitespace, lifetimes, references, `<T as Trait>::`
/// qualifiers and module paths.
pub fn sanitize(def: &str) -> String {
    let without_qualifiers = strip_as_qualifiers(def);
    let compact: String = without_qualifiers
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let without_lifetimes = compact.replace("&'static", "").replace("'static", "").replace('&', "");
    strip_paths(&without_lifetimes)
}

// Remove `<T as Trait>::` and `<T as Trait<I>>::` prefixes. A qualified
// lookup source, `<T::Lookup as StaticLookup>::Source`, becomes `LookupSource`.
fn strip_as_qualifiers(def: &str) -> String {
    let mut out = def.to_owned();
    let mut from = 0;
    while let Some(offset) = out[from..].find('<') {
        let start = from + offset;
        let Some(len) = matching_close(&out[start..]) else {
            break;
        };
        let end = start + len + 1;
        let qualified = out[end..].starts_with("::");
        match out[start + 1..end - 1].split_once(" as ") {
            Some((self_ty, _)) if qualified => {
                let keep = if self_ty.ends_with("Lookup") { "Lookup" } else { "" };
                out.replace_range(start..end + 2, keep);
                from = start;
            }
            _ => from = start + 1,
        }
    }
    out
}

// Given a string starting with `<`, the offset of the matching `>`.
fn matching_close(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

// `frame_support::weights::Weight` becomes `Weight`, `T::AccountId` becomes `AccountId`.
fn strip_paths(def: &str) -> String {
    let mut out = String::with_capacity(def.len());
    let mut chars = def.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            while out
                .chars()
                .last()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                out.pop();
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Split a string on a separator, ignoring separators nested inside any
/// kind of bracket or a JSON string.
pub fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut start = 0;
    for (idx, c) in s.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '<' | '(' | '[' | '{' if !in_string => depth += 1,
            '>' | ')' | ']' | '}' if !in_string => depth -= 1,
            c if c == sep && depth == 0 && !in_string => {
                parts.push(&s[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Parse a type string into a [`TypeDef`].
pub fn parse_type(def: &str) -> Result<TypeDef, Error> {
    let def = def.trim();
    if def.starts_with('{') {
        let value: serde_json::Value =
            serde_json::from_str(def).map_err(|e| Error::InvalidTypeDefinition {
                def: def.to_owned(),
                reason: e.to_string(),
            })?;
        return super::parse_definition(&value);
    }
    parse_sanitized(&sanitize(def))
}

fn parse_sanitized(def: &str) -> Result<TypeDef, Error> {
    if def.is_empty() {
        return Ok(TypeDef::Null);
    }
    if def.starts_with('{') {
        return parse_type(def);
    }
    if let Some(inner) = def.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        return parse_tuple(inner);
    }
    if let Some(inner) = def.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return parse_fixed(def, inner);
    }
    if def.ends_with('>') {
        if let Some(open) = def.find('<') {
            let wrapper = &def[..open];
            let params = split_top_level(&def[open + 1..def.len() - 1], ',');
            return parse_generic(def, wrapper, &params);
        }
    }
    Ok(parse_name(def))
}

fn parse_tuple(inner: &str) -> Result<TypeDef, Error> {
    let fields = split_top_level(inner, ',')
        .into_iter()
        .filter(|f| !f.is_empty())
        .map(parse_sanitized)
        .collect::<Result<Vec<_>, _>>()?;
    if fields.is_empty() {
        Ok(TypeDef::Null)
    } else {
        Ok(TypeDef::Tuple(fields))
    }
}

fn parse_fixed(def: &str, inner: &str) -> Result<TypeDef, Error> {
    let parts = split_top_level(inner, ';');
    match parts.as_slice() {
        [ty] => match parse_sanitized(ty)? {
            TypeDef::Int(IntKind {
                bits: 8,
                signed: false,
            }) => Ok(TypeDef::Bytes),
            inner => Ok(TypeDef::Vec(Box::new(inner))),
        },
        [ty, len] => {
            let len: usize = len.parse().map_err(|_| Error::InvalidTypeDefinition {
                def: def.to_owned(),
                reason: format!("'{len}' is not a valid array length"),
            })?;
            match parse_sanitized(ty)? {
                TypeDef::Int(IntKind {
                    bits: 8,
                    signed: false,
                }) => Ok(TypeDef::U8aFixed(len)),
                inner => Ok(TypeDef::VecFixed(Box::new(inner), len)),
            }
        }
        _ => Err(Error::InvalidTypeDefinition {
            def: def.to_owned(),
            reason: "expected [Type; Length]".into(),
        }),
    }
}

fn parse_generic(def: &str, wrapper: &str, params: &[&str]) -> Result<TypeDef, Error> {
    let param = |idx: usize| -> Result<TypeDef, Error> {
        match params.get(idx) {
            Some(p) => parse_sanitized(p),
            None => Err(Error::InvalidTypeDefinition {
                def: def.to_owned(),
                reason: format!("{wrapper} expects at least {} type parameters", idx + 1),
            }),
        }
    };
    let boxed = |idx: usize| param(idx).map(Box::new);

    let parsed = match wrapper {
        "Vec" | "BoundedVec" | "WeakBoundedVec" | "VecDeque" => match param(0)? {
            TypeDef::Int(IntKind {
                bits: 8,
                signed: false,
            }) => TypeDef::Bytes,
            inner => TypeDef::Vec(Box::new(inner)),
        },
        "Option" => TypeDef::Option(boxed(0)?),
        "Compact" => TypeDef::Compact(boxed(0)?),
        "Box" | "Cow" | "Arc" | "Rc" => param(0)?,
        "Result" => TypeDef::Result(boxed(0)?, boxed(1)?),
        "BTreeMap" | "HashMap" | "IndexMap" | "BoundedBTreeMap" => {
            TypeDef::BTreeMap(boxed(0)?, boxed(1)?)
        }
        "BTreeSet" | "HashSet" | "BoundedBTreeSet" => TypeDef::BTreeSet(boxed(0)?),
        "PhantomData" => TypeDef::Null,
        "Range" | "RangeInclusive" => {
            let inner = param(0)?;
            TypeDef::Tuple(vec![inner.clone(), inner])
        }
        "WrapperOpaque" | "WrapperKeepOpaque" => TypeDef::Bytes,
        "DoNotConstruct" => TypeDef::DoNotConstruct(params.join(",")),
        "Int" | "UInt" => {
            let bits: u16 = params
                .first()
                .and_then(|b| b.parse().ok())
                .ok_or_else(|| Error::InvalidTypeDefinition {
                    def: def.to_owned(),
                    reason: "expected a bit length".into(),
                })?;
            let kind = if wrapper == "Int" {
                IntKind::signed(bits)
            } else {
                IntKind::unsigned(bits)
            };
            TypeDef::Int(kind)
        }
        // Unknown generic wrappers are registered by their full name.
        _ => TypeDef::Named(def.to_owned()),
    };
    Ok(parsed)
}

fn parse_name(name: &str) -> TypeDef {
    if let Some(kind) = IntKind::from_name(name) {
        return TypeDef::Int(kind);
    }
    match name {
        "Null" | "()" => TypeDef::Null,
        "bool" => TypeDef::Bool,
        "Text" | "String" | "Str" | "str" => TypeDef::Text,
        "Bytes" => TypeDef::Bytes,
        "BitVec" => TypeDef::BitVec,
        _ => match name
            .strip_prefix("Lookup")
            .and_then(|id| id.parse::<u32>().ok())
        {
            Some(id) => TypeDef::Lookup(id),
            None => TypeDef::Named(name.to_owned()),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sanitizes_type_strings() {
        assert_eq!(sanitize("T::AccountId"), "AccountId");
        assert_eq!(sanitize("<T as Trait>::Balance"), "Balance");
        assert_eq!(sanitize("<T as Trait<I>>::Proposal"), "Proposal");
        assert_eq!(sanitize("<T::Lookup as StaticLookup>::Source"), "LookupSource");
        assert_eq!(sanitize("Vec<<T as Trait>::Balance>"), "Vec<Balance>");
        assert_eq!(
            sanitize("Vec<(T::AccountId, BalanceOf<T>)>"),
            "Vec<(AccountId,BalanceOf<T>)>"
        );
        assert_eq!(sanitize("&'static [u8]"), "[u8]");
        assert_eq!(
            sanitize("frame_support::weights::Weight"),
            "Weight"
        );
        assert_eq!(sanitize("Vec<\n  u32\n>"), "Vec<u32>");
    }

    #[test]
    fn splits_only_at_top_level() {
        assert_eq!(
            split_top_level("u32,(u8,u16),Vec<(A,B)>", ','),
            vec!["u32", "(u8,u16)", "Vec<(A,B)>"]
        );
        assert_eq!(split_top_level(r#"{"a":"(u8,u8)"},u8"#, ','), vec![r#"{"a":"(u8,u8)"}"#, "u8"]);
    }

    #[test]
    fn parses_containers() {
        assert_eq!(parse_type("Vec<u8>").unwrap(), TypeDef::Bytes);
        assert_eq!(parse_type("[u8; 32]").unwrap(), TypeDef::U8aFixed(32));
        assert_eq!(
            parse_type("[u32; 4]").unwrap(),
            TypeDef::VecFixed(Box::new(TypeDef::uint(32)), 4)
        );
        assert_eq!(
            parse_type("Option<Compact<Balance>>").unwrap(),
            TypeDef::Option(Box::new(TypeDef::Compact(Box::new(TypeDef::named(
                "Balance"
            )))))
        );
        assert_eq!(
            parse_type("(u8, Vec<u16>)").unwrap(),
            TypeDef::Tuple(vec![
                TypeDef::uint(8),
                TypeDef::Vec(Box::new(TypeDef::uint(16)))
            ])
        );
        assert_eq!(parse_type("()").unwrap(), TypeDef::Null);
        assert_eq!(parse_type("Box<u64>").unwrap(), TypeDef::uint(64));
        assert_eq!(
            parse_type("BoundedVec<T::AccountId, MaxMembers>").unwrap(),
            TypeDef::Vec(Box::new(TypeDef::named("AccountId")))
        );
        assert_eq!(
            parse_type("HashMap<Text, u32>").unwrap(),
            TypeDef::BTreeMap(Box::new(TypeDef::Text), Box::new(TypeDef::uint(32)))
        );
        assert_eq!(parse_type("Lookup42").unwrap(), TypeDef::Lookup(42));
        assert_eq!(parse_type("LookupSource").unwrap(), TypeDef::named("LookupSource"));
        assert_eq!(
            parse_type("Linkage<AccountId>").unwrap(),
            TypeDef::named("Linkage<AccountId>")
        );
    }

    #[test]
    fn rejects_bad_fixed_lengths() {
        assert!(matches!(
            parse_type("[u8; x]"),
            Err(Error::InvalidTypeDefinition { .. })
        ));
    }
}
