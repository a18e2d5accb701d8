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

//! Encode and decode SCALE values from substrate based networks like Polkadot, driven by
//! a type registry which is populated from type definitions and runtime metadata.
//!
//! - See [`registry`] for the [`registry::Registry`], which turns type names into values.
//! - See [`codec`] for the values themselves.
//! - See [`metadata`] for decoding metadata of any version from V9 and converting it to the latest.
//! - See [`extrinsics`] for calls, eras, signing payloads and extrinsics.
//!
//! # Example
//!
//! ```rust
//! use frame_codec::codec::Codec;
//! use frame_codec::registry::Registry;
//! use serde_json::json;
//!
//! let registry = Registry::new();
//! registry.register_json(&json!({
//!     "Transfer": { "to": "AccountId", "amount": "Compact<Balance>" }
//! })).unwrap();
//!
//! let transfer = registry.create_type("Transfer", json!({
//!     "to": format!("0x{}", "01".repeat(32)),
//!     "amount": 1_000_000,
//! })).unwrap();
//!
//! assert_eq!(transfer.encoded_length(), 32 + 4);
//! assert_eq!(transfer.to_human()["amount"], "1,000,000");
//! ```
#![deny(missing_docs)]
#![recursion_limit = "256"]

mod error;
mod types;
mod utils;

pub mod codec;
pub mod extrinsics;
pub mod metadata;
pub mod registry;

pub use error::Error;
pub use types::{
    NativeClass, NativeCodec, TypeDef, parse_definition, parse_type, sanitize, split_top_level,
};

pub mod helpers {
    //! Helper functions and types to assist with encoding and decoding.
    //!
    //! - [`decode_with_error_tracing`] is like [`decode_with_visitor`], but
    //!   will use a tracing visitor (if the `error-tracing` feature is enabled) to provide more
    //!   information in the event that decoding fails.
    //! - [`skip_lookup_type`] steps over a metadata lookup type, with the same tracing.
    //! - [`to_hex`], [`from_hex`] and [`is_hex`] convert between bytes and `0x` prefixed hex.
    //! - [`camel_case`] and [`pascal_case`] convert names the way the registry does.

    pub use crate::utils::{DecodeErrorTrace, decode_with_error_tracing, skip_lookup_type};
    pub use crate::utils::{camel_case, format_number, pascal_case};
    pub use crate::utils::{from_hex, is_hex, serialize_hex, to_hex};

    /// An alias to [`scale_decode::visitor::decode_with_visitor`]. This can be used to decode
    /// values against a [`crate::metadata::PortableRegistry`].
    pub use scale_decode::visitor::decode_with_visitor;

    /// An alias to the underlying [`scale-decode`] crate.
    pub use scale_decode;
}
