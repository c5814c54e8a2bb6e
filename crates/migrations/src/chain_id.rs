// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chain id encodings.
//!
//! Old state keyed chains by decimal strings (`"137"`), newer state by
//! `0x`-prefixed lowercase hex (`"0x89"`).

use statemig_core::guard::is_hex_string;

/// `"137"` to `"0x89"`. `None` unless `s` is a plain decimal integer.
pub fn decimal_to_hex(s: &str) -> Option<String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u128>().ok().map(|n| format!("0x{n:x}"))
}

/// `"0x89"` to `"137"`. `None` unless `s` is `0x`-prefixed hex.
pub fn hex_to_decimal(s: &str) -> Option<String> {
    if !is_hex_string(s) {
        return None;
    }
    u128::from_str_radix(&s[2..], 16).ok().map(|n| n.to_string())
}

#[cfg(test)]
#[path = "chain_id_tests.rs"]
mod tests;
