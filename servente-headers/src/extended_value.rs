// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Encodings for parameter values that can't be expressed in US-ASCII.
//!
//! # RFC 5987 Extended Values
//! Used by parameters with a name ending in `*`, such as `filename*`:
//! ```text
//! ext-value     = charset  "'" [ language ] "'" value-chars
//! value-chars   = *( pct-encoded / attr-char )
//! attr-char     = ALPHA / DIGIT / "!" / "#" / "$" / "&" / "+" / "-" / "."
//!               / "^" / "_" / "`" / "|" / "~"
//! ```
//!
//! # RFC 2047 Encoded Words
//! Not allowed by HTTP, but sent by older clients in the plain `filename`:
//! ```text
//! encoded-word  = "=?" charset "?" encoding "?" encoded-text "?="
//! ```
//!
//! # References
//! * [RFC 5987](https://www.rfc-editor.org/rfc/rfc5987.html)
//! * [RFC 2047 Section 2](https://www.rfc-editor.org/rfc/rfc2047.html#section-2)

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use phf::phf_map;
use strum_macros::AsRefStr;
use unicase::UniCase;

use crate::{
    abnf,
    log::trace,
    syntax::remove_quotes,
};

/// The character sets that decoding supports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, AsRefStr)]
pub enum Charset {
    #[strum(serialize = "UTF-8")]
    Utf8,
    #[strum(serialize = "ISO-8859-1")]
    Latin1,
    #[strum(serialize = "US-ASCII")]
    Ascii,
}

static CHARSET_BY_NAME: phf::Map<UniCase<&'static str>, Charset> = phf_map!(
    UniCase::ascii("utf-8") => Charset::Utf8,
    UniCase::ascii("utf8") => Charset::Utf8,
    UniCase::ascii("iso-8859-1") => Charset::Latin1,
    UniCase::ascii("latin1") => Charset::Latin1,
    UniCase::ascii("us-ascii") => Charset::Ascii,
    UniCase::ascii("ascii") => Charset::Ascii,
);

impl Charset {
    /// Looks up a charset by its (case-insensitive) name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        CHARSET_BY_NAME.get(&UniCase::ascii(name)).copied()
    }

    /// Decodes the bytes, returning `None` if they aren't valid in this
    /// charset.
    #[must_use]
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
            Self::Latin1 => Some(bytes.iter().map(|byte| char::from(*byte)).collect()),
            Self::Ascii => {
                if bytes.is_ascii() {
                    Some(bytes.iter().map(|byte| char::from(*byte)).collect())
                } else {
                    None
                }
            }
        }
    }
}

/// Encodes the value as `charset''value-chars`. Only the unreserved
/// characters (`ALPHA / DIGIT / "-" / "." / "_" / "~"`) are left as-is,
/// everything else is percent-encoded from its UTF-8 representation.
#[must_use]
pub fn encode_extended_value(charset: &str, value: &str) -> String {
    format!("{charset}''{}", urlencoding::encode(value))
}

/// Decodes an `ext-value`. Returns `None` when the charset isn't supported,
/// a percent-encoding is malformed, or the decoded bytes aren't valid in the
/// declared charset.
#[must_use]
pub fn decode_extended_value(input: &str) -> Option<String> {
    let (charset, rest) = input.split_once('\'')?;
    let (_language, value) = rest.split_once('\'')?;

    if value.contains('\'') || !value.is_ascii() {
        return None;
    }

    let Some(charset) = Charset::from_name(charset) else {
        trace!("Unsupported charset in extended value: {charset:?}");
        return None;
    };

    if !is_well_formed_percent_encoding(value.as_bytes()) {
        trace!("Malformed percent-encoding in extended value: {value:?}");
        return None;
    }

    charset.decode(&urlencoding::decode_binary(value.as_bytes()))
}

fn is_well_formed_percent_encoding(bytes: &[u8]) -> bool {
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' {
            let is_hex = |offset: usize| bytes.get(index + offset).copied().and_then(abnf::parse_hex_digit).is_some();
            if !is_hex(1) || !is_hex(2) {
                return false;
            }
            index += 3;
        } else {
            index += 1;
        }
    }

    true
}

/// Encodes the value as a quoted RFC 2047 encoded word using base64, e.g.
/// `"=?utf-8?B?RmlsZcODTmFtZS5iYXQ=?="`.
#[must_use]
pub fn encode_mime(value: &str) -> String {
    format!("\"=?utf-8?B?{}?=\"", BASE64.encode(value.as_bytes()))
}

/// Decodes an RFC 2047 encoded word, quoted or not. Both the base64 (`B`) and
/// the quoted-printable (`Q`) encodings are supported.
#[must_use]
pub fn decode_mime(input: &str) -> Option<String> {
    let word = remove_quotes(input)
        .strip_prefix("=?")?
        .strip_suffix("?=")?;

    let mut parts = word.split('?');
    let (Some(charset), Some(encoding), Some(text), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
        return None;
    };

    let charset = Charset::from_name(charset)?;
    let bytes = match encoding {
        "B" | "b" => BASE64.decode(text).ok()?,
        "Q" | "q" => decode_quoted_printable(text)?,
        _ => return None,
    };

    charset.decode(&bytes)
}

/// The "Q" encoding: `_` is a space, `=XX` is an encoded byte.
fn decode_quoted_printable(text: &str) -> Option<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());

    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'_' => {
                result.push(b' ');
                index += 1;
            }
            b'=' => {
                let high = abnf::parse_hex_digit(*bytes.get(index + 1)?)?;
                let low = abnf::parse_hex_digit(*bytes.get(index + 2)?)?;
                result.push(high << 4 | low);
                index += 3;
            }
            byte => {
                result.push(byte);
                index += 1;
            }
        }
    }

    Some(result)
}

/// Whether the value can't be sent in a plain parameter: it contains
/// characters outside of ASCII, or controls other than `HTAB`, which a
/// quoted-string can't carry.
#[must_use]
pub fn requires_encoding(value: &str) -> bool {
    value.chars().any(|character| !character.is_ascii() || (character.is_ascii_control() && character != '\t'))
}
