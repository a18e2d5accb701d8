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

use super::{input_entries, input_u64, take_entry};
use crate::codec::{Codec, Input, take_bytes};
use crate::error::Error;
use crate::registry::Registry;
use crate::types::NativeCodec;
use crate::utils::{camel_case, format_number, from_hex, to_hex};
use serde_json::{Value, json};

const MIN_PERIOD: u64 = 4;
const MAX_PERIOD: u64 = 1 << 16;

/// The validity window of a mortal transaction: it is valid for `period`
/// blocks, starting from a block whose number is `phase` modulo `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MortalEra {
    period: u64,
    phase: u64,
}

impl MortalEra {
    /// A mortal era from an exact period and phase. The period must be a
    /// power of two in `4..=65536` and the phase below it.
    pub fn new(period: u64, phase: u64) -> Result<Self, Error> {
        if !period.is_power_of_two() || !(MIN_PERIOD..=MAX_PERIOD).contains(&period) || phase >= period {
            return Err(Error::MalformedEra { period, phase });
        }
        Ok(MortalEra { period, phase })
    }

    /// A mortal era lasting about `period` blocks from the `current` block.
    ///
    /// The period is rounded up to a power of two and clamped to
    /// `4..=65536`, and the phase is quantised to the precision the
    /// encoding can hold.
    pub fn from_current(period: u64, current: u64) -> Self {
        let period = period
            .checked_next_power_of_two()
            .unwrap_or(MAX_PERIOD)
            .clamp(MIN_PERIOD, MAX_PERIOD);
        let phase = current % period;
        let quantize_factor = (period >> 12).max(1);
        MortalEra {
            period,
            phase: phase / quantize_factor * quantize_factor,
        }
    }

    /// The period in blocks.
    pub fn period(&self) -> u64 {
        self.period
    }

    /// The phase.
    pub fn phase(&self) -> u64 {
        self.phase
    }

    /// The first block the transaction is valid in, given any block number
    /// within the era.
    pub fn birth(&self, current: u64) -> u64 {
        (current.max(self.phase) - self.phase) / self.period * self.period + self.phase
    }

    /// The first block the transaction is no longer valid in.
    pub fn death(&self, current: u64) -> u64 {
        self.birth(current) + self.period
    }

    fn to_u16(self) -> u16 {
        let quantize_factor = (self.period >> 12).max(1);
        let low = (u64::from(self.period.trailing_zeros()).saturating_sub(1)).clamp(1, 15);
        let high = (self.phase / quantize_factor) << 4;
        (low | high) as u16
    }

    fn from_u16(encoded: u16) -> Result<Self, Error> {
        let encoded = u64::from(encoded);
        let period = 2u64 << (encoded % (1 << 4));
        let quantize_factor = (period >> 12).max(1);
        let phase = (encoded >> 4) * quantize_factor;
        if period >= MIN_PERIOD && phase < period {
            Ok(MortalEra { period, phase })
        } else {
            Err(Error::MalformedEra { period, phase })
        }
    }

    fn from_input(registry: &Registry, input: Input<'_>) -> Result<Self, Error> {
        match input.normalize_hex() {
            Input::Bytes(bytes) => MortalEra::decode(registry, &mut bytes.as_ref()),
            Input::Hex(hex) => MortalEra::decode(registry, &mut from_hex(&hex)?.as_slice()),
            Input::Codec(existing) => match existing.downcast_ref::<MortalEra>() {
                Some(era) => Ok(*era),
                None => MortalEra::decode(registry, &mut existing.to_u8a().as_slice()),
            },
            Input::Json(Value::Array(items)) if items.len() == 2 => {
                let mut items = items.into_iter().map(Input::Json);
                let period = input_u64(registry, items.next().unwrap_or_default())?;
                let phase = input_u64(registry, items.next().unwrap_or_default())?;
                MortalEra::new(period, phase)
            }
            input => {
                let describe = input.describe();
                let mut entries = input_entries(input).ok_or_else(|| {
                    Error::invalid_value("MortalEra", &describe, "expected a period and phase")
                })?;
                let period = input_u64(registry, take_entry(&mut entries, "period"))?;
                match take_entry(&mut entries, "current") {
                    Input::Default => {
                        let phase = input_u64(registry, take_entry(&mut entries, "phase"))?;
                        MortalEra::new(period, phase)
                    }
                    current => Ok(MortalEra::from_current(period, input_u64(registry, current)?)),
                }
            }
        }
    }
}

impl NativeCodec for MortalEra {
    const NAME: &'static str = "MortalEra";

    fn decode(_registry: &Registry, cursor: &mut &[u8]) -> Result<Self, Error> {
        let bytes = take_bytes(Self::NAME, cursor, 2)?;
        MortalEra::from_u16(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn construct(registry: &Registry, input: Input<'_>) -> Result<Self, Error> {
        MortalEra::from_input(registry, input)
    }
}

impl Codec for MortalEra {
    fn raw_type(&self) -> String {
        Self::NAME.into()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_u16().to_le_bytes());
    }

    fn encoded_length(&self) -> usize {
        2
    }

    fn to_json(&self) -> Value {
        Value::String(self.to_hex())
    }

    fn to_human(&self) -> Value {
        json!({
            "period": format_number(&self.period.to_string()),
            "phase": format_number(&self.phase.to_string()),
        })
    }

    fn to_primitive(&self) -> Value {
        json!({ "period": self.period, "phase": self.phase })
    }

    fn is_empty(&self) -> bool {
        false
    }
}

/// The era of a transaction which never expires. It encodes to nothing
/// on its own; inside an [`ExtrinsicEra`] it is the single byte `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImmortalEra;

impl NativeCodec for ImmortalEra {
    const NAME: &'static str = "ImmortalEra";

    fn decode(_registry: &Registry, _cursor: &mut &[u8]) -> Result<Self, Error> {
        Ok(ImmortalEra)
    }

    fn construct(_registry: &Registry, _input: Input<'_>) -> Result<Self, Error> {
        Ok(ImmortalEra)
    }
}

impl Codec for ImmortalEra {
    fn raw_type(&self) -> String {
        Self::NAME.into()
    }

    fn encode_to(&self, _out: &mut Vec<u8>) {}

    fn encoded_length(&self) -> usize {
        0
    }

    fn to_json(&self) -> Value {
        Value::String("0x".into())
    }

    fn to_human(&self) -> Value {
        Value::String(Self::NAME.into())
    }

    fn is_empty(&self) -> bool {
        true
    }
}

/// The era of a transaction: immortal, or mortal for some window of blocks.
///
/// An immortal era encodes as a single zero byte, a mortal one as two
/// bytes holding the period and phase.
///
/// ```rust
/// use frame_codec::extrinsics::{ExtrinsicEra, MortalEra};
///
/// let era = ExtrinsicEra::mortal(64, 5);
/// let mortal = era.as_mortal().unwrap();
/// assert_eq!((mortal.period(), mortal.phase()), (64, 5));
/// assert_eq!(mortal.birth(70), 69);
/// assert_eq!(mortal.death(70), 133);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtrinsicEra {
    /// Valid forever.
    #[default]
    Immortal,
    /// Valid for a window of blocks.
    Mortal(MortalEra),
}

impl ExtrinsicEra {
    /// A mortal era lasting about `period` blocks from the `current` block.
    pub fn mortal(period: u64, current: u64) -> Self {
        ExtrinsicEra::Mortal(MortalEra::from_current(period, current))
    }

    /// Is this the immortal era.
    pub fn is_immortal(&self) -> bool {
        matches!(self, ExtrinsicEra::Immortal)
    }

    /// Is this a mortal era.
    pub fn is_mortal(&self) -> bool {
        matches!(self, ExtrinsicEra::Mortal(_))
    }

    /// The mortal era, failing when the era is immortal.
    pub fn as_mortal(&self) -> Result<&MortalEra, Error> {
        match self {
            ExtrinsicEra::Mortal(era) => Ok(era),
            ExtrinsicEra::Immortal => Err(Error::InvalidVariantAccess {
                active: "ImmortalEra".into(),
                requested: "MortalEra".into(),
            }),
        }
    }

    /// The first block the transaction is valid in; zero when immortal.
    pub fn birth(&self, current: u64) -> u64 {
        match self {
            ExtrinsicEra::Immortal => 0,
            ExtrinsicEra::Mortal(era) => era.birth(current),
        }
    }

    /// The first block the transaction is no longer valid in; never for
    /// an immortal era.
    pub fn death(&self, current: u64) -> u64 {
        match self {
            ExtrinsicEra::Immortal => u64::MAX,
            ExtrinsicEra::Mortal(era) => era.death(current),
        }
    }

    fn variant_name(&self) -> &'static str {
        match self {
            ExtrinsicEra::Immortal => ImmortalEra::NAME,
            ExtrinsicEra::Mortal(_) => MortalEra::NAME,
        }
    }

    fn from_input(registry: &Registry, input: Input<'_>) -> Result<Self, Error> {
        match input.normalize_hex() {
            Input::Default | Input::Json(Value::Null) => Ok(ExtrinsicEra::Immortal),
            Input::Bytes(bytes) => ExtrinsicEra::decode(registry, &mut bytes.as_ref()),
            Input::Hex(hex) => ExtrinsicEra::decode(registry, &mut from_hex(&hex)?.as_slice()),
            Input::Codec(existing) => {
                if let Some(era) = existing.downcast_ref::<ExtrinsicEra>() {
                    Ok(*era)
                } else if let Some(era) = existing.downcast_ref::<MortalEra>() {
                    Ok(ExtrinsicEra::Mortal(*era))
                } else if existing.is::<ImmortalEra>() {
                    Ok(ExtrinsicEra::Immortal)
                } else {
                    ExtrinsicEra::decode(registry, &mut existing.to_u8a().as_slice())
                }
            }
            input => {
                let describe = input.describe();
                let mut entries = input_entries(input).ok_or_else(|| {
                    Error::invalid_value("ExtrinsicEra", &describe, "expected an era")
                })?;
                let immortal = entries
                    .iter()
                    .any(|(k, _)| k.eq_ignore_ascii_case("immortalEra"));
                if immortal {
                    return Ok(ExtrinsicEra::Immortal);
                }
                match take_entry(&mut entries, "mortalEra") {
                    Input::Default => {
                        MortalEra::from_input(registry, Input::Object(entries)).map(ExtrinsicEra::Mortal)
                    }
                    mortal => MortalEra::from_input(registry, mortal).map(ExtrinsicEra::Mortal),
                }
            }
        }
    }
}

impl NativeCodec for ExtrinsicEra {
    const NAME: &'static str = "ExtrinsicEra";

    fn decode(registry: &Registry, cursor: &mut &[u8]) -> Result<Self, Error> {
        match cursor.first() {
            Some(0) => {
                *cursor = &cursor[1..];
                Ok(ExtrinsicEra::Immortal)
            }
            _ => MortalEra::decode(registry, cursor).map(ExtrinsicEra::Mortal),
        }
    }

    fn construct(registry: &Registry, input: Input<'_>) -> Result<Self, Error> {
        ExtrinsicEra::from_input(registry, input)
    }
}

impl Codec for ExtrinsicEra {
    fn raw_type(&self) -> String {
        Self::NAME.into()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        match self {
            ExtrinsicEra::Immortal => out.push(0),
            ExtrinsicEra::Mortal(era) => era.encode_to(out),
        }
    }

    fn encoded_length(&self) -> usize {
        match self {
            ExtrinsicEra::Immortal => 1,
            ExtrinsicEra::Mortal(_) => 2,
        }
    }

    fn to_json(&self) -> Value {
        let value = match self {
            ExtrinsicEra::Immortal => Value::String(to_hex(&[0])),
            ExtrinsicEra::Mortal(era) => era.to_json(),
        };
        let mut map = serde_json::Map::new();
        map.insert(camel_case(self.variant_name()), value);
        Value::Object(map)
    }

    fn to_human(&self) -> Value {
        match self {
            ExtrinsicEra::Immortal => ImmortalEra.to_human(),
            ExtrinsicEra::Mortal(era) => json!({ "MortalEra": era.to_human() }),
        }
    }

    fn to_primitive(&self) -> Value {
        match self {
            ExtrinsicEra::Immortal => json!({ "immortalEra": "0x00" }),
            ExtrinsicEra::Mortal(era) => json!({ "mortalEra": era.to_primitive() }),
        }
    }

    fn is_empty(&self) -> bool {
        self.is_immortal()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mortal_era_round_trip() {
        let era = MortalEra::new(64, 10).unwrap();
        let bytes = era.to_u8a();
        // trailing zeros of 64 is 6, so the low nibble is 5; 10 << 4 = 0xa0.
        assert_eq!(bytes, vec![0xa5, 0x00]);
        let registry = Registry::new();
        let decoded = MortalEra::decode(&registry, &mut bytes.as_slice()).unwrap();
        assert_eq!(decoded, era);

        for current in [0, 9, 10, 11, 1_000, 123_456] {
            assert_eq!(era.death(current) - era.birth(current), era.period());
            assert_eq!(era.birth(current) % era.period(), era.phase());
        }
    }

    #[test]
    fn era_from_current_block() {
        let registry = Registry::new();
        let era = ExtrinsicEra::mortal(64, 5);
        let bytes = era.to_u8a();
        let decoded = ExtrinsicEra::decode(&registry, &mut bytes.as_slice()).unwrap();
        assert_eq!(decoded, era);
        assert_eq!(decoded.to_u8a(), bytes);

        // Periods round up to a power of two within bounds.
        assert_eq!(MortalEra::from_current(50, 0).period(), 64);
        assert_eq!(MortalEra::from_current(1, 0).period(), 4);
        assert_eq!(MortalEra::from_current(1 << 20, 0).period(), 1 << 16);
        // Long periods quantise the phase.
        let long = MortalEra::from_current(1 << 16, 12_345);
        assert_eq!(long.phase(), 12_345 / 16 * 16);
        assert_eq!(MortalEra::from_u16(long.to_u16()).unwrap(), long);
    }

    #[test]
    fn malformed_eras() {
        assert_eq!(
            MortalEra::new(64, 64).unwrap_err(),
            Error::MalformedEra { period: 64, phase: 64 }
        );
        assert!(MortalEra::new(48, 1).is_err());
        assert!(MortalEra::new(2, 1).is_err());
        // A low nibble of 0 gives a period of 2.
        assert!(matches!(
            MortalEra::from_u16(0x0010),
            Err(Error::MalformedEra { period: 2, .. })
        ));
        // Phase 5 is not below period 4.
        assert!(MortalEra::from_u16(0x0051).is_err());
    }

    #[test]
    fn every_encoding_is_rejected_or_reproduced() {
        let mut valid = 0;
        for encoded in 0..=u16::MAX {
            match MortalEra::from_u16(encoded) {
                Ok(era) => {
                    valid += 1;
                    assert_eq!(MortalEra::new(era.period(), era.phase()), Ok(era));
                    assert_eq!(era.to_u16(), encoded, "encoding {encoded:#06x}");
                }
                Err(e) => assert!(matches!(e, Error::MalformedEra { .. })),
            }
        }
        // Low nibbles 1 to 15 give periods 4 to 65536 with at most 4096
        // distinct phases each.
        let expected: u32 = (2..=16).map(|shift| (1u32 << shift).min(4096)).sum();
        assert_eq!(valid, expected);
    }

    #[test]
    fn immortal_era() {
        let registry = Registry::new();
        let era = ExtrinsicEra::decode(&registry, &mut &[0u8][..]).unwrap();
        assert!(era.is_immortal());
        assert_eq!(era.to_u8a(), vec![0]);
        assert_eq!(era.to_json(), json!({ "immortalEra": "0x00" }));
        assert_eq!(era.birth(100), 0);
        assert_eq!(
            era.as_mortal().unwrap_err().to_string(),
            "Cannot convert 'ImmortalEra' via asMortalEra"
        );
    }

    #[test]
    fn constructs_from_json() {
        let registry = Registry::new();
        let era = registry
            .create_type("ExtrinsicEra", Input::from(json!({ "period": 64, "current": 5 })))
            .unwrap();
        assert_eq!(*era.downcast_ref::<ExtrinsicEra>().unwrap(), ExtrinsicEra::mortal(64, 5));

        let era = registry
            .create_type("ExtrinsicEra", Input::from(json!({ "mortalEra": [64, 10] })))
            .unwrap();
        assert_eq!(era.to_hex(), "0xa500");
        assert_eq!(era.to_json(), json!({ "mortalEra": "0xa500" }));
        assert_eq!(era.to_human(), json!({ "MortalEra": { "period": "64", "phase": "10" } }));

        let era = registry.create_type("ExtrinsicEra", "0xa500").unwrap();
        assert!(era.downcast_ref::<ExtrinsicEra>().unwrap().is_mortal());
        let era = registry
            .create_type("ExtrinsicEra", Input::from(json!({ "immortalEra": "0x00" })))
            .unwrap();
        assert_eq!(era.to_u8a(), vec![0]);
        assert_eq!(registry.create_type("ImmortalEra", Input::Default).unwrap().encoded_length(), 0);
    }
}
