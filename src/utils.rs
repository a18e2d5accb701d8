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

mod decode_with_error_tracing;
mod strings;

pub use decode_with_error_tracing::{DecodeErrorTrace, decode_with_error_tracing, skip_lookup_type};
pub use strings::{camel_case, format_number, pascal_case};

use crate::error::Error;

/// Render some bytes as a `0x` prefixed hex string.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Is the given string a `0x` prefixed hex string.
pub fn is_hex(s: &str) -> bool {
    s.strip_prefix("0x")
        .is_some_and(|rest| rest.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Parse a hex string (optionally `0x` prefixed) into bytes. Odd length
/// strings are treated as if they had a leading zero.
pub fn from_hex(s: &str) -> Result<Vec<u8>, Error> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let res = if digits.len() % 2 == 1 {
        hex::decode(format!("0{digits}"))
    } else {
        hex::decode(digits)
    };
    res.map_err(|_| Error::InvalidHex(s.to_owned()))
}

/// A serde helper to serialize byte fields as hex strings.
pub fn serialize_hex<T, S>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: serde::Serializer,
{
    serializer.serialize_str(&to_hex(bytes.as_ref()))
}
