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

use crate::utils::DecodeErrorTrace;

/// An error constructing, decoding or converting a value.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The input is shorter or longer than its length prefix says.
    #[error("{ty}: expected {expected} bytes but only {found} are available")]
    DecodeLength {
        /// The type being decoded.
        ty: String,
        /// The number of bytes required.
        expected: usize,
        /// The number of bytes available.
        found: usize,
    },
    /// An array of values does not line up with the keys of a struct.
    #[error(
        "Struct: unable to map {found} values to an object with known keys {}",
        keys.join(", ")
    )]
    StructArity {
        /// The keys of the struct.
        keys: Vec<String>,
        /// The number of values given.
        found: usize,
    },
    /// A type name which is not registered.
    #[error("Unable to resolve type {0}, it is not registered")]
    UnknownType(String),
    /// An enum was asked for a variant other than the active one.
    #[error("Cannot convert '{active}' via as{requested}")]
    InvalidVariantAccess {
        /// The active variant.
        active: String,
        /// The variant asked for.
        requested: String,
    },
    /// The operation does not apply to this kind of extrinsic.
    #[error("{0}: not implemented for this extrinsic")]
    UnsupportedOperation(&'static str),
    /// Metadata views can only be computed forwards.
    #[error("Cannot convert metadata from version {from} to {to}")]
    VersionDowngrade {
        /// The version the metadata was decoded as.
        from: u8,
        /// The older version asked for.
        to: u8,
    },
    /// A mortal era with an out of range period or phase.
    #[error("Invalid data passed to Mortal era: period {period}, phase {phase}")]
    MalformedEra {
        /// The era period.
        period: u64,
        /// The era phase.
        phase: u64,
    },
    /// The underlying SCALE decoding failed.
    #[error("Cannot decode {ty}: {reason}")]
    Codec {
        /// The type being decoded.
        ty: String,
        /// Why decoding failed.
        reason: String,
    },
    /// A string which is not valid `0x` prefixed hex.
    #[error("Invalid hex string '{0}'")]
    InvalidHex(String),
    /// A value which cannot be used to construct the type.
    #[error("{ty}: cannot construct from {value}: {reason}")]
    InvalidValue {
        /// The type being constructed.
        ty: String,
        /// A description of the value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A type definition which cannot be parsed or resolved.
    #[error("Invalid type definition '{def}': {reason}")]
    InvalidTypeDefinition {
        /// The offending definition.
        def: String,
        /// Why it is invalid.
        reason: String,
    },
    /// A variant name which the enum does not have.
    #[error("Unable to find variant '{variant}' in {ty}")]
    UnknownVariant {
        /// The enum type.
        ty: String,
        /// The variant asked for.
        variant: String,
    },
    /// Re-encoding decoded bytes did not reproduce them.
    #[error(
        "{ty}:: Decoded input doesn't match input, received {received} ({} bytes), created {created} ({} bytes)",
        received.len().saturating_sub(2) / 2,
        created.len().saturating_sub(2) / 2
    )]
    PedanticMismatch {
        /// The type being decoded.
        ty: String,
        /// The input, as hex.
        received: String,
        /// The re-encoded value, as hex.
        created: String,
    },
    /// A metadata version which cannot be decoded.
    #[error("Unsupported metadata version {0}")]
    UnsupportedMetadataVersion(u8),
    /// Metadata which does not start with `meta`.
    #[error("Invalid metadata magic number 0x{0:08x}, expected 0x6174656d")]
    MagicNumberMismatch(u32),
    /// An operation needs metadata but none is set.
    #[error("No metadata has been registered")]
    MetadataNotSet,
    /// A call or event index which the metadata does not know.
    #[error("Unable to find {kind} with index 0x{}", hex::encode(index))]
    UnknownCall {
        /// `call` or `event`.
        kind: &'static str,
        /// The pallet and variant index.
        index: [u8; 2],
    },
    /// A call or event name which the metadata does not know.
    #[error("Unable to find {kind} {section}.{method}")]
    UnknownCallName {
        /// `call` or `event`.
        kind: &'static str,
        /// The pallet name.
        section: String,
        /// The call or event name.
        method: String,
    },
    /// An extrinsic version or preamble which cannot be decoded.
    #[error("Unsupported extrinsic version {version} (preamble 0b{preamble:02b})")]
    UnsupportedExtrinsicVersion {
        /// The version bits.
        version: u8,
        /// The preamble bits.
        preamble: u8,
    },
    /// Decoding a type from the metadata lookup failed.
    #[error("Cannot decode lookup type {id}: {trace}")]
    TypeTrace {
        /// The lookup id.
        id: u32,
        /// Where decoding failed.
        trace: DecodeErrorTrace,
    },
    /// A malformed type configuration file.
    #[error("Invalid type configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn codec(ty: impl Into<String>, reason: parity_scale_codec::Error) -> Self {
        Error::Codec {
            ty: ty.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_value(
        ty: impl Into<String>,
        value: impl core::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidValue {
            ty: ty.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Is this an [`Error::UnknownType`].
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, Error::UnknownType(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}

#[cfg(feature = "yaml")]
impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Config(e.to_string())
    }
}
