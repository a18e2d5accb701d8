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

use crate::metadata::PortableRegistry;

/// Decode some bytes given a type ID and type resolver, and a visitor which decides the output value.
///
/// If the decoding fails and the `error-tracing` feature is enabled, we try to decode again using
/// a tracing visitor in order to return a more detailed error message.
pub fn decode_with_error_tracing<'scale, 'resolver, Resolver, Id, V>(
    cursor: &mut &'scale [u8],
    type_id: Id,
    types: &'resolver Resolver,
    visitor: V,
) -> Result<V::Value<'scale, 'resolver>, DecodeErrorTrace>
where
    Resolver: scale_type_resolver::TypeResolver<TypeId = Id>,
    Id: core::fmt::Debug + Clone,
    V: scale_decode::Visitor<TypeResolver = Resolver>,
    V::Error: core::fmt::Debug,
{
    let initial = *cursor;
    scale_decode::visitor::decode_with_visitor(cursor, type_id.clone(), types, visitor).map_err(
        |e| {
            *cursor = initial;
            trace_failure(format!("{e:?}"), cursor, type_id, types)
        },
    )
}

/// Step over the bytes of some lookup type, failing with a trace if they
/// don't decode.
pub fn skip_lookup_type(
    cursor: &mut &[u8],
    type_id: u32,
    types: &PortableRegistry,
) -> Result<(), DecodeErrorTrace> {
    decode_with_error_tracing(
        cursor,
        type_id,
        types,
        scale_decode::visitor::IgnoreVisitor::<PortableRegistry>::new(),
    )
}

#[cfg(not(feature = "error-tracing"))]
fn trace_failure<Resolver, Id>(
    original_error: String,
    _cursor: &mut &[u8],
    _type_id: Id,
    _types: &Resolver,
) -> DecodeErrorTrace
where
    Resolver: scale_type_resolver::TypeResolver<TypeId = Id>,
    Id: core::fmt::Debug + Clone,
{
    DecodeErrorTrace {
        original_error,
        tracing_error: String::new(),
    }
}

#[cfg(feature = "error-tracing")]
fn trace_failure<Resolver, Id>(
    original_error: String,
    cursor: &mut &[u8],
    type_id: Id,
    types: &Resolver,
) -> DecodeErrorTrace
where
    Resolver: scale_type_resolver::TypeResolver<TypeId = Id>,
    Id: core::fmt::Debug + Clone,
{
    use core::fmt::Write;

    let initial = *cursor;
    let value = match scale_value::scale::tracing::decode_as_type(cursor, type_id, types) {
        Ok(value) => value.map_context(|id| format!("{id:?}")),
        Err(te) => {
            *cursor = initial;
            return DecodeErrorTrace {
                original_error,
                tracing_error: te.to_string(),
            };
        }
    };
    *cursor = initial;

    // The tracing visitor managed to decode what the first pass couldn't, so
    // show what it produced.
    let mut tracing_error =
        String::from("Failed to decode value with custom visitor (but tracing decoded it):\n\n");
    let written = scale_value::stringify::to_writer_custom()
        .pretty()
        .format_context(|type_id, w: &mut &mut String| write!(w, "{type_id}"))
        .add_custom_formatter(|v, w| scale_value::stringify::custom_formatters::format_hex(v, w))
        .write(&value, &mut tracing_error);
    if written.is_err() {
        tracing_error.push_str("<unprintable value>");
    }

    DecodeErrorTrace {
        original_error,
        tracing_error,
    }
}

/// A tracing decode error.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeErrorTrace {
    original_error: String,
    tracing_error: String,
}

impl core::error::Error for DecodeErrorTrace {}

impl core::fmt::Display for DecodeErrorTrace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let DecodeErrorTrace {
            original_error,
            tracing_error,
        } = self;

        write!(f, "{original_error}")?;
        if !tracing_error.is_empty() {
            write!(f, ":\n\n{tracing_error}")?;
        }
        Ok(())
    }
}
