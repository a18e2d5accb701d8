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

/// Convert `snake_case`, `PascalCase` or `SCREAMING` words into `camelCase`.
/// A leading run of capitals is lowered as a whole, so `XCMPallet` becomes
/// `xcmPallet` and `ED25519` becomes `ed25519`.
pub fn camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let words = s
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty());

    for (idx, word) in words.enumerate() {
        if idx == 0 {
            out.push_str(&lower_leading(word));
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.push(first.to_ascii_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

/// Convert words into `PascalCase`.
pub fn pascal_case(s: &str) -> String {
    let camel = camel_case(s);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(camel.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => camel,
    }
}

fn lower_leading(word: &str) -> String {
    let bytes = word.as_bytes();
    let run = bytes.iter().take_while(|b| b.is_ascii_uppercase()).count();
    let lowered = match run {
        0 => 0,
        1 => 1,
        n if bytes.get(n).is_some_and(|b| b.is_ascii_lowercase()) => n - 1,
        n => n,
    };
    let mut out = word[..lowered].to_ascii_lowercase();
    out.push_str(&word[lowered..]);
    out
}

/// Group the digits of a decimal number in threes, ie `1234567` becomes `1,234,567`.
pub fn format_number(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push_str(sign);
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn camel_case_conversions() {
        assert_eq!(camel_case("transfer_allow_death"), "transferAllowDeath");
        assert_eq!(camel_case("Balances"), "balances");
        assert_eq!(camel_case("TotalIssuance"), "totalIssuance");
        assert_eq!(camel_case("XCMPallet"), "xcmPallet");
        assert_eq!(camel_case("ED25519"), "ed25519");
        assert_eq!(camel_case("r#type"), "rType");
        assert_eq!(camel_case("already_camelCase"), "alreadyCamelCase");
    }

    #[test]
    fn pascal_case_conversions() {
        assert_eq!(pascal_case("pallet_balances"), "PalletBalances");
        assert_eq!(pascal_case("frame_system"), "FrameSystem");
        assert_eq!(pascal_case("Event"), "Event");
    }

    #[test]
    fn number_grouping() {
        assert_eq!(format_number("0"), "0");
        assert_eq!(format_number("999"), "999");
        assert_eq!(format_number("1000"), "1,000");
        assert_eq!(format_number("1234567"), "1,234,567");
        assert_eq!(format_number("-1234"), "-1,234");
    }
}
