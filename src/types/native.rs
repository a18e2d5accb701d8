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

use crate::codec::{Codec, Input};
use crate::error::Error;
use crate::registry::Registry;

/// A hand written [`Codec`] which the registry can construct by name.
pub trait NativeCodec: Codec + Sized {
    /// The name this type is registered under.
    const NAME: &'static str;

    /// Decode a value from the front of the cursor.
    fn decode(registry: &Registry, cursor: &mut &[u8]) -> Result<Self, Error>;

    /// Construct a value from some input.
    fn construct(registry: &Registry, input: Input<'_>) -> Result<Self, Error>;
}

type ConstructFn = for<'a> fn(&Registry, Input<'a>) -> Result<Box<dyn Codec>, Error>;
type DecodeFn = fn(&Registry, &mut &[u8]) -> Result<Box<dyn Codec>, Error>;

/// The type-erased constructors of a [`NativeCodec`].
#[derive(Clone, Copy)]
pub struct NativeClass {
    name: &'static str,
    construct: ConstructFn,
    decode: DecodeFn,
}

impl NativeClass {
    /// The class of some [`NativeCodec`].
    pub fn of<T: NativeCodec>() -> Self {
        NativeClass {
            name: T::NAME,
            construct: construct_boxed::<T>,
            decode: decode_boxed::<T>,
        }
    }

    /// The registered name of this class.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn construct(
        &self,
        registry: &Registry,
        input: Input<'_>,
    ) -> Result<Box<dyn Codec>, Error> {
        (self.construct)(registry, input)
    }

    pub(crate) fn decode(
        &self,
        registry: &Registry,
        cursor: &mut &[u8],
    ) -> Result<Box<dyn Codec>, Error> {
        (self.decode)(registry, cursor)
    }
}

impl core::fmt::Debug for NativeClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("NativeClass").field(&self.name).finish()
    }
}

impl PartialEq for NativeClass {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

fn construct_boxed<T: NativeCodec>(
    registry: &Registry,
    input: Input<'_>,
) -> Result<Box<dyn Codec>, Error> {
    match input {
        Input::Codec(existing) if existing.is::<T>() => Ok(existing),
        input => T::construct(registry, input).map(|v| Box::new(v) as Box<dyn Codec>),
    }
}

fn decode_boxed<T: NativeCodec>(
    registry: &Registry,
    cursor: &mut &[u8],
) -> Result<Box<dyn Codec>, Error> {
    T::decode(registry, cursor).map(|v| Box::new(v) as Box<dyn Codec>)
}
