// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! This module contains the grammar primitives shared by all header values:
//! tokens, quoted strings, whitespace and numbers.
//!
//! All functions that take an `input` and a `start` work on byte offsets and
//! return the length of the longest valid prefix starting at `start`. Every
//! production that ends a prefix is ASCII, so the returned offsets always lie
//! on `char` boundaries.
//!
//! # References
//! * [RFC 9110 Section 5.6](https://www.rfc-editor.org/rfc/rfc9110.html#name-common-rules-for-defining-f)

use crate::{
    abnf,
    HeaderValueError,
};

/// Is the given character a character that can occur (anywhere) in a token?
///
/// ```text
/// tchar          = "!" / "#" / "$" / "%" / "&" / "'" / "*"
///                / "+" / "-" / "." / "^" / "_" / "`" / "|" / "~"
///                / DIGIT / ALPHA
///                ; any VCHAR, except delimiters
/// ```
#[inline]
pub fn is_token_character(byte: u8) -> bool {
    match byte {
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'^' | b'_' | b'`' | b'|' | b'~' => true,

        b'0'..=b'9' => true,
        b'A'..=b'Z' => true,
        b'a'..=b'z' => true,

        b'"' | b'(' | b')' | b',' | b'/' | b':' | b';' | b'<' | b'=' | b'>' |
        b'?' | b'@' | b'[' | b'\\' | b']' | b'{' | b'}' => false,

        _ => false,
    }
}

/// Returns whether or not the character is whitespace according to the HTTP
/// specification. This is in effect just `U+0020 SPACE` and `U+0009 CHARACTER
/// TABULATION`.
///
/// # Definition
/// ```text
/// OWS            = *( SP / HTAB )
///                ; optional whitespace
/// RWS            = 1*( SP / HTAB )
///                ; required whitespace
/// BWS            = OWS
///                ; "bad" whitespace
/// ```
///
/// # References
/// * [RFC 9110 Section 5.6.3](https://www.rfc-editor.org/rfc/rfc9110.html#name-whitespace)
#[inline]
pub fn is_whitespace_character(character: char) -> bool {
    character == ' ' || character == '\t'
}

/// Returns the length of the whitespace at `start`. Obsolete line folding
/// (`CRLF` followed by `SP` or `HTAB`) counts as whitespace, a lone `CRLF`
/// doesn't.
///
/// ```text
/// obs-fold       = OWS CRLF RWS
/// ```
pub fn get_whitespace_length(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    let mut current = start;

    while current < bytes.len() {
        match bytes[current] {
            b' ' | b'\t' => current += 1,
            b'\r' if bytes.get(current + 1) == Some(&b'\n')
                && matches!(bytes.get(current + 2), Some(b' ' | b'\t')) => current += 3,
            _ => break,
        }
    }

    current - start
}

/// Returns the length of the token at `start`, or `0` if there isn't one.
pub fn get_token_length(input: &str, start: usize) -> usize {
    let Some(rest) = input.as_bytes().get(start..) else {
        return 0;
    };

    rest.iter()
        .take_while(|byte| is_token_character(**byte))
        .count()
}

/// Returns the length of the quoted string at `start`, including both
/// `DQUOTE`s. Returns `None` if `start` doesn't point to a `DQUOTE`, or if the
/// closing `DQUOTE` is missing.
///
/// Bytes outside of US-ASCII are accepted, as servers tend to send raw UTF-8
/// in quoted `filename` parameters.
///
/// ```text
/// quoted-string  = DQUOTE *( qdtext / quoted-pair ) DQUOTE
/// qdtext         = HTAB / SP / %x21 / %x23-5B / %x5D-7E / obs-text
/// quoted-pair    = "\" ( HTAB / SP / VCHAR / obs-text )
/// ```
///
/// # References
/// * [RFC 9110 Section 5.6.4](https://www.rfc-editor.org/rfc/rfc9110.html#name-quoted-strings)
pub fn get_quoted_string_length(input: &str, start: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(start) != Some(&b'"') {
        return None;
    }

    let mut current = start + 1;
    while current < bytes.len() {
        match bytes[current] {
            b'"' => return Some(current + 1 - start),
            b'\\' => {
                // A quoted-pair, the escaped character must be US-ASCII so we
                // don't split a UTF-8 sequence.
                match bytes.get(current + 1) {
                    Some(escaped) if escaped.is_ascii() => current += 2,
                    _ => return None,
                }
            }
            _ => current += 1,
        }
    }

    None
}

/// Returns the length of the run of `DIGIT`s at `start`. When
/// `allow_decimal` is set, a single `.` may occur within the number.
pub fn get_number_length(input: &str, start: usize, allow_decimal: bool) -> usize {
    let Some(rest) = input.as_bytes().get(start..) else {
        return 0;
    };

    let mut have_dot = !allow_decimal;
    let mut length = 0;
    for byte in rest {
        if abnf::is_digit(*byte) {
            length += 1;
        } else if *byte == b'.' && !have_dot {
            have_dot = true;
            length += 1;
        } else {
            break;
        }
    }

    length
}

#[must_use]
pub fn is_token(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(is_token_character)
}

#[must_use]
pub fn is_quoted_string(value: &str) -> bool {
    get_quoted_string_length(value, 0) == Some(value.len())
}

pub fn validate_token(value: &str) -> Result<(), HeaderValueError> {
    if value.is_empty() {
        return Err(HeaderValueError::Empty);
    }

    if !is_token(value) {
        return Err(HeaderValueError::InvalidToken);
    }

    Ok(())
}

/// Checks whether the value is enclosed in `DQUOTE`s. Doesn't check whether
/// the content is a valid `quoted-string`.
#[must_use]
pub fn is_quoted(value: &str) -> bool {
    value.len() > 1 && value.starts_with('"') && value.ends_with('"')
}

/// Strips the enclosing `DQUOTE`s, if any.
#[must_use]
pub fn remove_quotes(value: &str) -> &str {
    if is_quoted(value) {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Converts the value to a `quoted-string`, escaping `\` and `"`.
///
/// Control characters other than `HTAB` can't be represented.
pub fn escape_as_quoted_string(value: &str) -> Result<String, HeaderValueError> {
    let mut result = String::with_capacity(value.len() + 2);
    result.push('"');

    for character in value.chars() {
        match character {
            '\\' | '"' => {
                result.push('\\');
                result.push(character);
            }
            '\t' => result.push(character),
            '\x00'..='\x1F' | '\x7F' => return Err(HeaderValueError::InvalidQuotedString),
            _ => result.push(character),
        }
    }

    result.push('"');
    Ok(result)
}

/// Removes the enclosing quotes and resolves the `quoted-pair`s.
#[must_use]
pub fn unescape_as_quoted_string(value: &str) -> String {
    let value = remove_quotes(value.trim_matches(is_whitespace_character));

    let mut result = String::with_capacity(value.len());
    let mut characters = value.chars();
    while let Some(character) = characters.next() {
        if character == '\\' {
            if let Some(escaped) = characters.next() {
                result.push(escaped);
                continue;
            }
        }

        result.push(character);
    }

    result
}

/// Parses a value consisting only of digits as a non-negative `i32`, which
/// is what delta-seconds fields are limited to.
#[must_use]
pub fn try_parse_non_negative_i32(value: &str) -> Option<i32> {
    if value.is_empty() || !value.bytes().all(abnf::is_digit) {
        return None;
    }

    value.parse().ok()
}

/// Parses a value consisting only of digits as a non-negative `i64`.
#[must_use]
pub fn try_parse_non_negative_i64(value: &str) -> Option<i64> {
    if value.is_empty() || !value.bytes().all(abnf::is_digit) {
        return None;
    }

    value.parse().ok()
}

/// The amount of digits that always fits in an `i64`.
pub const MAX_INT64_DIGITS: usize = 19;

/// Parses the `length` digits at `start`, rejecting numbers that are longer
/// than [`MAX_INT64_DIGITS`].
#[must_use]
pub fn parse_int64_digits(input: &str, start: usize, length: usize) -> Option<u64> {
    if length == 0 || length > MAX_INT64_DIGITS {
        return None;
    }

    let digits = input.get(start..start + length)?;
    if !digits.bytes().all(abnf::is_digit) {
        return None;
    }

    digits.parse().ok()
}

pub fn format_non_negative_i64(value: i64) -> Result<String, HeaderValueError> {
    if value < 0 {
        return Err(HeaderValueError::OutOfRange { field: "value" });
    }

    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b' ', false)]
    #[case(b'\t', false)]
    #[case(b'!', true)]
    #[case(b'"', false)]
    #[case(b'/', false)]
    #[case(b'=', false)]
    #[case(0x00, false)]
    #[case(b'~', true)]
    #[case(b'\'', true)]
    #[case(0x7F, false)]
    #[case(0xC3, false)]
    fn test_is_token_character(#[case] input: u8, #[case] expected: bool) {
        assert_eq!(is_token_character(input), expected);
    }

    #[rstest]
    #[case("", 0, 0)]
    #[case("text", 0, 4)]
    #[case("text/plain", 0, 4)]
    #[case("text/plain", 5, 5)]
    #[case("text/plain", 4, 0)]
    #[case("te xt", 0, 2)]
    #[case("inline会", 0, 6)]
    #[case("abc", 10, 0)]
    fn test_get_token_length(#[case] input: &str, #[case] start: usize, #[case] expected: usize) {
        assert_eq!(get_token_length(input, start), expected);
    }

    #[rstest]
    #[case("", 0, 0)]
    #[case("   a", 0, 3)]
    #[case("\t a", 0, 2)]
    #[case("\r\n a", 0, 3)]
    #[case("\r\n\ta", 0, 3)]
    #[case(" \r\n  \r\n x", 0, 8)]
    #[case("\r\na", 0, 0)]
    #[case("\r\n", 0, 0)]
    #[case("a  b", 1, 2)]
    fn test_get_whitespace_length(#[case] input: &str, #[case] start: usize, #[case] expected: usize) {
        assert_eq!(get_whitespace_length(input, start), expected);
    }

    #[rstest]
    #[case("\"\"", 0, Some(2))]
    #[case("\"abc\"", 0, Some(5))]
    #[case("\"abc\" trailing", 0, Some(5))]
    #[case("x=\"abc\"", 2, Some(5))]
    #[case("\"a\\\"b\"", 0, Some(6))]
    #[case("\"a\\\\\"", 0, Some(5))]
    #[case("\"Here's a semicolon;.html\"", 0, Some(26))]
    #[case("\"foo-ä.html\"", 0, Some(13))]
    #[case("\"abc", 0, None)]
    #[case("\"abc\\\"", 0, None)]
    #[case("abc", 0, None)]
    #[case("", 0, None)]
    fn test_get_quoted_string_length(#[case] input: &str, #[case] start: usize, #[case] expected: Option<usize>) {
        assert_eq!(get_quoted_string_length(input, start), expected);
    }

    #[rstest]
    #[case("123", 0, false, 3)]
    #[case("123abc", 0, false, 3)]
    #[case("1.5", 0, false, 1)]
    #[case("1.5", 0, true, 3)]
    #[case("1.5.5", 0, true, 3)]
    #[case("abc", 0, true, 0)]
    #[case("bytes 12-", 6, false, 2)]
    fn test_get_number_length(#[case] input: &str, #[case] start: usize, #[case] allow_decimal: bool, #[case] expected: usize) {
        assert_eq!(get_number_length(input, start, allow_decimal), expected);
    }

    #[test]
    fn test_validate_token() {
        assert_eq!(validate_token(""), Err(HeaderValueError::Empty));
        assert_eq!(validate_token("hello"), Ok(()));
        assert_eq!(validate_token(" hello"), Err(HeaderValueError::InvalidToken));
        assert_eq!(validate_token("hello "), Err(HeaderValueError::InvalidToken));
        assert_eq!(validate_token("hel lo"), Err(HeaderValueError::InvalidToken));
        assert_eq!(validate_token("hel\"lo"), Err(HeaderValueError::InvalidToken));
    }

    #[rstest]
    #[case("\"quoted\"", true)]
    #[case("\"\"", true)]
    #[case("\"", false)]
    #[case("unquoted", false)]
    #[case("\"half", false)]
    fn test_is_quoted(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_quoted(input), expected);
        assert_eq!(remove_quotes(input).len(), if expected { input.len() - 2 } else { input.len() });
    }

    #[rstest]
    #[case("plain", "\"plain\"")]
    #[case("with space", "\"with space\"")]
    #[case("a\"b", "\"a\\\"b\"")]
    #[case("a\\b", "\"a\\\\b\"")]
    #[case("", "\"\"")]
    fn test_escape_as_quoted_string(#[case] input: &str, #[case] expected: &str) {
        let escaped = escape_as_quoted_string(input).unwrap();
        assert_eq!(escaped, expected);
        assert!(is_quoted_string(&escaped));
        assert_eq!(unescape_as_quoted_string(&escaped), input);
    }

    #[test]
    fn test_escape_as_quoted_string_control_character() {
        assert_eq!(escape_as_quoted_string("a\nb"), Err(HeaderValueError::InvalidQuotedString));
        assert_eq!(escape_as_quoted_string("a\tb").as_deref(), Ok("\"a\tb\""));
    }

    #[rstest]
    #[case("0", Some(0))]
    #[case("70", Some(70))]
    #[case("2147483647", Some(i32::MAX))]
    #[case("2147483648", None)]
    #[case("-1", None)]
    #[case("+1", None)]
    #[case("1.0", None)]
    #[case("", None)]
    fn test_try_parse_non_negative_i32(#[case] input: &str, #[case] expected: Option<i32>) {
        assert_eq!(try_parse_non_negative_i32(input), expected);
    }

    #[rstest]
    #[case("0", 0, 1, Some(0))]
    #[case("bytes 123-", 6, 3, Some(123))]
    #[case("9999999999999999999", 0, 19, Some(9_999_999_999_999_999_999))]
    #[case("10000000000000000000", 0, 20, None)]
    #[case("12a", 0, 3, None)]
    #[case("", 0, 0, None)]
    fn test_parse_int64_digits(#[case] input: &str, #[case] start: usize, #[case] length: usize, #[case] expected: Option<u64>) {
        assert_eq!(parse_int64_digits(input, start, length), expected);
    }

    #[test]
    fn test_format_non_negative_i64() {
        assert_eq!(format_non_negative_i64(0).as_deref(), Ok("0"));
        assert_eq!(format_non_negative_i64(i64::MAX).as_deref(), Ok("9223372036854775807"));
        assert_eq!(format_non_negative_i64(-1), Err(HeaderValueError::OutOfRange { field: "value" }));
    }
}
