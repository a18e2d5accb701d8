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

//! The values the registry produces. Each implements [`Codec`], which
//! encodes to SCALE bytes and renders to JSON.
//!
//! Values are usually built through [`crate::registry::Registry`], and
//! inspected by downcasting:
//!
//! ```rust
//! use frame_codec::codec::{Codec, Int};
//! use frame_codec::registry::Registry;
//!
//! let registry = Registry::new();
//! let value = registry.create_type("u32", "0x2a").unwrap();
//! assert_eq!(value.to_u8a(), vec![42, 0, 0, 0]);
//! assert_eq!(value.downcast_ref::<Int>().unwrap().to_u128(), Some(42));
//! ```

mod btree;
mod bytes;
mod enums;
mod input;
mod int;
mod option;
mod primitive;
mod sets;
mod structs;
mod tuple;
mod vec;

pub use btree::{BTreeMapCodec, BTreeSetCodec};
pub use bytes::{BitVec, Bytes, Text, U8aFixed};
pub use enums::{Enum, EnumDef, VariantDef};
pub use input::Input;
pub use int::{Compact, Int, IntKind};
pub use option::{OptionCodec, ResultCodec};
pub use primitive::{Bool, Null};
pub use sets::{Set, SetDef};
pub use structs::{Struct, StructDef};
pub use tuple::Tuple;
pub use vec::{VecCodec, VecFixed};

use crate::error::Error;
use crate::utils::{from_hex, to_hex};
use core::any::Any;
use dyn_clone::DynClone;
use serde_json::Value;

/// Access to the concrete type behind a `dyn Codec`.
pub trait AsAny: Any {
    /// Borrow as [`Any`].
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as [`Any`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Convert into a boxed [`Any`].
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A SCALE encodable value which knows its own shape.
///
/// Every value produced by the [`crate::registry::Registry`] implements this,
/// from integers up to extrinsics and metadata.
pub trait Codec: AsAny + DynClone + core::fmt::Debug + Send + Sync {
    /// The type definition string this value was constructed from, eg
    /// `Vec<u32>` or `{"a":"u32","b":"Text"}`.
    fn raw_type(&self) -> String;

    /// Append the SCALE encoding of this value to the given output.
    fn encode_to(&self, out: &mut Vec<u8>);

    /// Render to JSON in a form which can be used to construct the value again.
    fn to_json(&self) -> Value;

    /// The number of bytes [`Codec::to_u8a`] will produce.
    fn encoded_length(&self) -> usize {
        self.to_u8a().len()
    }

    /// The SCALE encoding of this value.
    fn to_u8a(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_to(&mut out);
        out
    }

    /// The SCALE encoding of this value as a `0x` prefixed hex string.
    fn to_hex(&self) -> String {
        to_hex(&self.to_u8a())
    }

    /// Render to JSON for display. This may lose precision and is not
    /// meant to be decoded again.
    fn to_human(&self) -> Value {
        self.to_json()
    }

    /// Render to JSON using only primitive values.
    fn to_primitive(&self) -> Value {
        self.to_json()
    }

    /// Is this the zero/empty value of its type.
    fn is_empty(&self) -> bool {
        self.to_u8a().iter().all(|b| *b == 0)
    }

    /// Compare against bytes, hex, JSON or another codec.
    fn eq_input(&self, other: &Input<'_>) -> bool {
        let ours = self.to_u8a();
        match other {
            Input::Default => self.is_empty(),
            Input::Bytes(bytes) => ours == bytes.as_ref(),
            Input::Hex(hex) => from_hex(hex).is_ok_and(|bytes| bytes == ours),
            Input::Codec(codec) => codec.to_u8a() == ours,
            Input::Json(value) => json_eq(value, &self.to_json(), &self.to_primitive(), &ours),
            Input::Object(_) | Input::Array(_) => false,
        }
    }
}

dyn_clone::clone_trait_object!(Codec);

impl dyn Codec {
    /// Borrow the concrete value behind this codec.
    pub fn downcast_ref<T: Codec>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow the concrete value behind this codec.
    pub fn downcast_mut<T: Codec>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Is the concrete value behind this codec a `T`.
    pub fn is<T: Codec>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Take the concrete value out of a boxed codec.
    pub fn downcast<T: Codec>(self: Box<Self>) -> Option<T> {
        self.into_any().downcast::<T>().ok().map(|b| *b)
    }

    /// Compare with anything that converts into an [`Input`].
    pub fn eq_with<'a>(&self, other: impl Into<Input<'a>>) -> bool {
        self.eq_input(&other.into())
    }
}

impl PartialEq for dyn Codec {
    fn eq(&self, other: &Self) -> bool {
        self.to_u8a() == other.to_u8a()
    }
}

impl core::fmt::Display for dyn Codec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.to_primitive() {
            Value::String(s) => f.write_str(&s),
            other => write!(f, "{other}"),
        }
    }
}

fn json_eq(value: &Value, json: &Value, primitive: &Value, encoded: &[u8]) -> bool {
    if value == json || value == primitive {
        return true;
    }
    match value {
        Value::String(s) if crate::utils::is_hex(s) => {
            from_hex(s).is_ok_and(|bytes| bytes == encoded)
        }
        Value::Null => encoded.iter().all(|b| *b == 0),
        _ => false,
    }
}

/// Fail if fewer than `len` bytes remain in the cursor, else take them.
pub(crate) fn take_bytes<'a>(
    ty: &str,
    cursor: &mut &'a [u8],
    len: usize,
) -> Result<&'a [u8], Error> {
    if cursor.len() < len {
        return Err(Error::DecodeLength {
            ty: ty.to_owned(),
            expected: len,
            found: cursor.len(),
        });
    }
    let (head, tail) = cursor.split_at(len);
    *cursor = tail;
    Ok(head)
}

/// Decode a compact length prefix.
pub(crate) fn decode_length(ty: &str, cursor: &mut &[u8]) -> Result<usize, Error> {
    use parity_scale_codec::{Compact, Decode};
    let len = Compact::<u64>::decode(cursor).map_err(|e| Error::codec(ty, e))?.0;
    usize::try_from(len).map_err(|_| Error::DecodeLength {
        ty: ty.to_owned(),
        expected: usize::MAX,
        found: cursor.len(),
    })
}

/// Append a compact length prefix.
pub(crate) fn encode_length(len: usize, out: &mut Vec<u8>) {
    use parity_scale_codec::{Compact, Encode};
    Compact(len as u64).encode_to(out);
}
