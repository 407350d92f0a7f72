// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! The `Cookie` request header.
//!
//! ```text
//! cookie-header = "Cookie:" OWS cookie-string OWS
//! cookie-string = cookie-pair *( ";" SP cookie-pair )
//! cookie-pair   = cookie-name "=" cookie-value
//! cookie-name   = token
//! cookie-value  = *cookie-octet / ( DQUOTE *cookie-octet DQUOTE )
//! cookie-octet  = %x21 / %x23-2B / %x2D-3A / %x3C-5B / %x5D-7E
//!                 ; US-ASCII characters excluding CTLs,
//!                 ; whitespace DQUOTE, comma, semicolon,
//!                 ; and backslash
//! ```
//!
//! # References
//! * [RFC 6265 Section 4.1.1](https://www.rfc-editor.org/rfc/rfc6265.html#section-4.1.1)
//! * [RFC 6265 Section 4.2.1](https://www.rfc-editor.org/rfc/rfc6265.html#section-4.2.1)

use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

use unicase::UniCase;

use crate::{
    abnf,
    syntax::{
        get_token_length,
        get_whitespace_length,
        remove_quotes,
        validate_token,
    },
    HeaderValueError,
    HeaderValueParser,
};

/// Any `VCHAR`, except `DQUOTE`, `,`, `;` and `\`.
#[inline]
pub(crate) fn is_cookie_octet(byte: u8) -> bool {
    abnf::is_visible_character(byte) && !matches!(byte, b'"' | b',' | b';' | b'\\')
}

/// Returns the cookie value at `start` and the amount of bytes consumed. A
/// quoted value that misses its closing `DQUOTE` is consumed, but results in
/// an empty value.
pub(crate) fn get_cookie_value(input: &str, start: usize) -> (&str, usize) {
    let bytes = input.as_bytes();
    let mut current = start;

    let is_quoted = bytes.get(current) == Some(&b'"');
    if is_quoted {
        current += 1;
    }

    while current < bytes.len() && is_cookie_octet(bytes[current]) {
        current += 1;
    }

    if is_quoted {
        if bytes.get(current) != Some(&b'"') {
            return ("", current - start);
        }
        current += 1;
    }

    (&input[start..current], current - start)
}

pub(crate) fn validate_cookie_value(value: &str) -> Result<(), HeaderValueError> {
    let unquoted = remove_quotes(value);
    if unquoted.bytes().all(is_cookie_octet) {
        Ok(())
    } else {
        Err(HeaderValueError::InvalidCookieValue)
    }
}

/// Parses `cookie-name "=" cookie-value` at `start`, returning the name, the
/// value and the length consumed, excluding trailing whitespace.
pub(crate) fn parse_cookie_pair(input: &str, start: usize) -> Option<(&str, &str, usize)> {
    let name_length = get_token_length(input, start);
    if name_length == 0 {
        return None;
    }

    let name = &input[start..start + name_length];
    let mut current = start + name_length;

    if input.as_bytes().get(current) != Some(&b'=') {
        return None;
    }
    current += 1;

    let (value, value_length) = get_cookie_value(input, current);
    current += value_length;

    Some((name, value, current - start))
}

/// A single `name=value` pair of the `Cookie` header.
///
/// The value is kept as it was received, including the `DQUOTE`s of a quoted
/// value.
#[derive(Clone, Debug)]
pub struct CookieHeaderValue {
    name: String,
    value: String,
}

impl CookieHeaderValue {
    /// Creates a cookie with an empty value.
    pub fn new(name: &str) -> Result<Self, HeaderValueError> {
        Self::with_value(name, "")
    }

    pub fn with_value(name: &str, value: &str) -> Result<Self, HeaderValueError> {
        validate_token(name)?;
        validate_cookie_value(value)?;
        Ok(Self { name: name.to_owned(), value: value.to_owned() })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), HeaderValueError> {
        validate_token(name)?;
        self.name = name.to_owned();
        Ok(())
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: &str) -> Result<(), HeaderValueError> {
        validate_cookie_value(value)?;
        self.value = value.to_owned();
        Ok(())
    }
}

impl HeaderValueParser for CookieHeaderValue {
    const NAME: &'static str = "cookie";

    /// Browsers separate cookies with `;`, but older ones used `,`.
    const SEPARATORS: &'static [u8] = b";,";

    fn parse_value_length(input: &str, start: usize) -> Option<(Self, usize)> {
        let (name, value, length) = parse_cookie_pair(input, start)?;
        let mut current = start + length;
        current += get_whitespace_length(input, current);

        let cookie = Self { name: name.to_owned(), value: value.to_owned() };
        Some((cookie, current - start))
    }
}

impl Display for CookieHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Names are compared case-insensitively, values aren't.
impl PartialEq for CookieHeaderValue {
    fn eq(&self, other: &Self) -> bool {
        UniCase::ascii(&self.name) == UniCase::ascii(&other.name) && self.value == other.value
    }
}

impl Eq for CookieHeaderValue {}

impl Hash for CookieHeaderValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        UniCase::ascii(self.name.as_str()).hash(state);
        self.value.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::parameters::tests::hash_of;

    fn cookie(name: &str, value: &str) -> CookieHeaderValue {
        CookieHeaderValue::with_value(name, value).unwrap()
    }

    #[rstest]
    #[case(b'a', true)]
    #[case(b'!', true)]
    #[case(b'=', true)]
    #[case(b'"', false)]
    #[case(b',', false)]
    #[case(b';', false)]
    #[case(b'\\', false)]
    #[case(b' ', false)]
    #[case(0x7F, false)]
    fn test_is_cookie_octet(#[case] byte: u8, #[case] expected: bool) {
        assert_eq!(is_cookie_octet(byte), expected);
    }

    #[rstest]
    #[case("name1=n1=v1&n2=v2&n3=v3", "name1", "n1=v1&n2=v2&n3=v3")]
    #[case("name2=", "name2", "")]
    #[case("  name3=\"value3\"  ", "name3", "\"value3\"")]
    #[case("name4=\"\"", "name4", "\"\"")]
    #[case("name5=\"value5", "name5", "")]
    fn test_parse_valid(#[case] input: &str, #[case] name: &str, #[case] value: &str) {
        let cookie = CookieHeaderValue::parse(input).unwrap();
        assert_eq!(cookie.name(), name);
        assert_eq!(cookie.value(), value);
    }

    #[rstest]
    #[case("")]
    #[case("name")]
    #[case("=value")]
    #[case("name =value")]
    #[case("name= value")]
    #[case("na me=value")]
    #[case("name=va lue")]
    #[case("name=value\\")]
    #[case("name=\"value\"x")]
    #[case("name=value;")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(CookieHeaderValue::parse(input).is_err(), "{input:?} should be invalid");
    }

    #[test]
    fn test_parse_list() {
        let cookies = CookieHeaderValue::parse_list(&["name1=value1; name2=value2", "name3=value3, name4=\"value4\";;"]);
        assert_eq!(cookies, vec![
            cookie("name1", "value1"),
            cookie("name2", "value2"),
            cookie("name3", "value3"),
            cookie("name4", "\"value4\""),
        ]);
    }

    #[test]
    fn test_parse_list_drops_invalid_cookies() {
        let inputs = ["name1=value1; invalid; name2=value2"];
        assert_eq!(CookieHeaderValue::parse_list(&inputs), vec![cookie("name1", "value1"), cookie("name2", "value2")]);
        assert!(CookieHeaderValue::parse_strict_list(&inputs).is_err());
    }

    #[rstest]
    #[case("", "value", HeaderValueError::Empty)]
    #[case("na;me", "value", HeaderValueError::InvalidToken)]
    #[case("name", "va lue", HeaderValueError::InvalidCookieValue)]
    #[case("name", "\"value", HeaderValueError::InvalidCookieValue)]
    #[case("name", "value\"", HeaderValueError::InvalidCookieValue)]
    #[case("name", "a,b", HeaderValueError::InvalidCookieValue)]
    fn test_with_value_invalid(#[case] name: &str, #[case] value: &str, #[case] expected: HeaderValueError) {
        assert_eq!(CookieHeaderValue::with_value(name, value), Err(expected));
    }

    #[test]
    fn test_setters_and_display() {
        let mut value = CookieHeaderValue::new("name").unwrap();
        assert_eq!(value.to_string(), "name=");

        value.set_value("\"quoted\"").unwrap();
        assert_eq!(value.to_string(), "name=\"quoted\"");

        value.set_name("other").unwrap();
        assert_eq!(value.to_string(), "other=\"quoted\"");

        assert!(value.set_value("in valid").is_err());
        assert!(value.set_name("").is_err());
        assert_eq!(value.to_string(), "other=\"quoted\"");
    }

    #[test]
    fn test_equality_and_hash() {
        assert_eq!(cookie("name", "value"), cookie("NAME", "value"));
        assert_eq!(hash_of(&cookie("name", "value")), hash_of(&cookie("NAME", "value")));
        assert_ne!(cookie("name", "value"), cookie("name", "VALUE"));
        assert_ne!(cookie("name", "value"), cookie("other", "value"));
    }
}
