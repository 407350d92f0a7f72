// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Various Augmented BNF (ABNF) tools and utilities.
//!
//! # Ranges
//! Ranges are inclusive:
//! ```text
//! DIGIT       =  %x30-39
//! ```
//! is equivalent to:
//! ```text
//! DIGIT       =  "0" / "1" / "2" / "3" / "4" / "5" / "6" /
//!                "7" / "8" / "9"
//! ```
//!
//! # References
//! * [RFC 5234 Augmented BNF for Syntax Specifications: ABNF](https://www.rfc-editor.org/rfc/rfc5234.html)

/// Is the character a visible (printing) character.
///
/// ```text
/// VCHAR          =  %x21-7E
/// ```
#[inline]
pub fn is_visible_character(byte: u8) -> bool {
    matches!(byte, 0x21..=0x7E)
}

/// ```text
/// DIGIT          =  %x30-39
/// ```
#[inline]
pub fn is_digit(byte: u8) -> bool {
    byte.is_ascii_digit()
}

/// Converts a `DIGIT` into its numeric value.
#[inline]
pub fn parse_digit(byte: u8) -> Option<u8> {
    if is_digit(byte) {
        Some(byte - b'0')
    } else {
        None
    }
}

/// ```text
/// HEXDIG         =  DIGIT / "A" / "B" / "C" / "D" / "E" / "F"
/// ```
///
/// Note that RFC 5234 says ABNF strings are case-insensitive, so lowercase
/// letters are accepted as well.
#[inline]
pub fn parse_hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
