// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

use unicase::UniCase;

use crate::{
    header_value::range::DEFAULT_RANGE_UNIT,
    syntax::{
        get_number_length,
        get_token_length,
        get_whitespace_length,
        parse_int64_digits,
        validate_token,
    },
    HeaderValueError,
    HeaderValueParser,
};

/// The `Content-Range` header field indicates where in a full body a partial
/// message belongs.
///
/// ```text
/// Content-Range       = range-unit SP ( range-resp / unsatisfied-range )
/// range-resp          = incl-range "/" ( complete-length / "*" )
/// incl-range          = first-pos "-" last-pos
/// unsatisfied-range   = "*/" complete-length
/// ```
///
/// Either the range or the length may be unknown. `bytes */*` can't be
/// constructed, but is accepted by the parser since some servers send it.
///
/// ### References
/// * [RFC 9110 Section 14.4](https://www.rfc-editor.org/rfc/rfc9110.html#name-content-range)
/// * [MDN `Content-Range` header](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Content-Range)
#[derive(Clone, Debug)]
pub struct ContentRangeHeaderValue {
    unit: String,
    range: Option<(u64, u64)>,
    length: Option<u64>,
}

impl ContentRangeHeaderValue {
    /// Creates a `bytes` content range with both a range and a complete
    /// length: `bytes from-to/length`.
    pub fn new(from: u64, to: u64, length: u64) -> Result<Self, HeaderValueError> {
        validate_range(from, to)?;
        if to >= length {
            return Err(HeaderValueError::OutOfRange { field: "to" });
        }

        Ok(Self {
            unit: DEFAULT_RANGE_UNIT.to_owned(),
            range: Some((from, to)),
            length: Some(length),
        })
    }

    /// Creates an unsatisfied range: `bytes */length`.
    #[must_use]
    pub fn with_length(length: u64) -> Self {
        Self {
            unit: DEFAULT_RANGE_UNIT.to_owned(),
            range: None,
            length: Some(length),
        }
    }

    /// Creates a range of unknown complete length: `bytes from-to/*`.
    pub fn with_range(from: u64, to: u64) -> Result<Self, HeaderValueError> {
        validate_range(from, to)?;
        Ok(Self {
            unit: DEFAULT_RANGE_UNIT.to_owned(),
            range: Some((from, to)),
            length: None,
        })
    }

    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn set_unit(&mut self, unit: &str) -> Result<(), HeaderValueError> {
        validate_token(unit)?;
        self.unit = unit.to_owned();
        Ok(())
    }

    /// The first position of the range, inclusive.
    #[must_use]
    pub fn from(&self) -> Option<u64> {
        self.range.map(|(from, _)| from)
    }

    /// The last position of the range, inclusive.
    #[must_use]
    pub fn to(&self) -> Option<u64> {
        self.range.map(|(_, to)| to)
    }

    /// The complete length of the representation.
    #[must_use]
    pub fn length(&self) -> Option<u64> {
        self.length
    }

    #[must_use]
    pub fn has_range(&self) -> bool {
        self.range.is_some()
    }

    #[must_use]
    pub fn has_length(&self) -> bool {
        self.length.is_some()
    }
}

fn validate_range(from: u64, to: u64) -> Result<(), HeaderValueError> {
    if from > to {
        return Err(HeaderValueError::OutOfRange { field: "from" });
    }
    Ok(())
}

/// Parses the digits at `start`, or `*` for an unknown value. The outer
/// `Option` signals failure, the inner one the `*`.
fn parse_position(input: &str, start: usize) -> Option<(Option<u64>, usize)> {
    if input.as_bytes().get(start) == Some(&b'*') {
        return Some((None, 1));
    }

    let length = get_number_length(input, start, false);
    let value = parse_int64_digits(input, start, length)?;
    Some((Some(value), length))
}

impl HeaderValueParser for ContentRangeHeaderValue {
    const NAME: &'static str = "content range";

    fn parse_value_length(input: &str, start: usize) -> Option<(Self, usize)> {
        let bytes = input.as_bytes();

        let unit_length = get_token_length(input, start);
        if unit_length == 0 {
            return None;
        }
        let unit = input[start..start + unit_length].to_owned();
        let mut current = start + unit_length;

        // The unit and the range are separated by at least one space.
        let whitespace_length = get_whitespace_length(input, current);
        if whitespace_length == 0 {
            return None;
        }
        current += whitespace_length;

        let range = if bytes.get(current) == Some(&b'*') {
            current += 1;
            None
        } else {
            let from_length = get_number_length(input, current, false);
            let from = parse_int64_digits(input, current, from_length)?;
            current += from_length;
            current += get_whitespace_length(input, current);

            if bytes.get(current) != Some(&b'-') {
                return None;
            }
            current += 1;
            current += get_whitespace_length(input, current);

            let to_length = get_number_length(input, current, false);
            let to = parse_int64_digits(input, current, to_length)?;
            current += to_length;

            if from > to {
                return None;
            }
            Some((from, to))
        };
        current += get_whitespace_length(input, current);

        if bytes.get(current) != Some(&b'/') {
            return None;
        }
        current += 1;
        current += get_whitespace_length(input, current);

        let (length, length_length) = parse_position(input, current)?;
        current += length_length;
        current += get_whitespace_length(input, current);

        if let (Some((_, to)), Some(length)) = (range, length) {
            if to >= length {
                return None;
            }
        }

        Some((Self { unit, range, length }, current - start))
    }
}

impl Display for ContentRangeHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.unit)?;

        match self.range {
            Some((from, to)) => write!(f, "{from}-{to}")?,
            None => f.write_str("*")?,
        }

        match self.length {
            Some(length) => write!(f, "/{length}"),
            None => f.write_str("/*"),
        }
    }
}

impl PartialEq for ContentRangeHeaderValue {
    fn eq(&self, other: &Self) -> bool {
        UniCase::ascii(&self.unit) == UniCase::ascii(&other.unit)
            && self.range == other.range
            && self.length == other.length
    }
}

impl Eq for ContentRangeHeaderValue {}

impl Hash for ContentRangeHeaderValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        UniCase::ascii(self.unit.as_str()).hash(state);
        self.range.hash(state);
        self.length.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::parameters::tests::hash_of;

    #[rstest]
    #[case("bytes 1-2/3", Some(1), Some(2), Some(3))]
    #[case("bytes */150", None, None, Some(150))]
    #[case("bytes 0-0/*", Some(0), Some(0), None)]
    #[case("bytes */*", None, None, None)]
    #[case("  custom  1 - 2 / 3  ", Some(1), Some(2), Some(3))]
    #[case("bytes 0-9223372036854775806/9223372036854775807", Some(0), Some(9223372036854775806), Some(9223372036854775807))]
    fn test_parse_valid(#[case] input: &str, #[case] from: Option<u64>, #[case] to: Option<u64>, #[case] length: Option<u64>) {
        let value = ContentRangeHeaderValue::parse(input).unwrap();
        assert_eq!(value.from(), from);
        assert_eq!(value.to(), to);
        assert_eq!(value.length(), length);
        assert_eq!(value.has_range(), from.is_some());
        assert_eq!(value.has_length(), length.is_some());
    }

    #[rstest]
    #[case("")]
    #[case("bytes")]
    #[case("bytes1-2/3")]
    #[case("bytes 1-2")]
    #[case("bytes 1-/3")]
    #[case("bytes -2/3")]
    #[case("bytes 2-1/3")]
    #[case("bytes 1-3/3")]
    #[case("bytes 0-0/0")]
    #[case("bytes 1-2/3,")]
    #[case("bytes 1-2/3 4")]
    #[case("bytes */12345678901234567890")]
    #[case("bytes 1-2/3/4")]
    #[case("bytes * /")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(ContentRangeHeaderValue::parse(input).is_err(), "{input:?} should be invalid");
    }

    #[test]
    fn test_unsatisfied_range_scenario() {
        let value = ContentRangeHeaderValue::parse("bytes */150").unwrap();
        assert!(!value.has_range());
        assert!(value.has_length());
        assert_eq!(value.length(), Some(150));
        assert_eq!(value.to_string(), "bytes */150");
    }

    #[test]
    fn test_constructors() {
        assert_eq!(ContentRangeHeaderValue::new(1, 2, 3).unwrap().to_string(), "bytes 1-2/3");
        assert_eq!(ContentRangeHeaderValue::with_range(1, 2).unwrap().to_string(), "bytes 1-2/*");
        assert_eq!(ContentRangeHeaderValue::with_length(3).to_string(), "bytes */3");

        assert_eq!(ContentRangeHeaderValue::new(2, 1, 3), Err(HeaderValueError::OutOfRange { field: "from" }));
        assert_eq!(ContentRangeHeaderValue::new(1, 3, 3), Err(HeaderValueError::OutOfRange { field: "to" }));
        assert_eq!(ContentRangeHeaderValue::new(0, 0, 0), Err(HeaderValueError::OutOfRange { field: "to" }));
        assert_eq!(ContentRangeHeaderValue::with_range(2, 1), Err(HeaderValueError::OutOfRange { field: "from" }));
    }

    #[test]
    fn test_set_unit() {
        let mut value = ContentRangeHeaderValue::with_length(3);
        value.set_unit("custom").unwrap();
        assert_eq!(value.to_string(), "custom */3");
        assert_eq!(value.set_unit(""), Err(HeaderValueError::Empty));
        assert_eq!(value.set_unit("a b"), Err(HeaderValueError::InvalidToken));
        assert_eq!(value.unit(), "custom");
    }

    #[test]
    fn test_equality_and_hash() {
        let value = ContentRangeHeaderValue::parse("bytes 1-2/3").unwrap();
        let upper = ContentRangeHeaderValue::parse("BYTES 1-2/3").unwrap();

        assert_eq!(value, upper);
        assert_eq!(hash_of(&value), hash_of(&upper));
        assert_ne!(value, ContentRangeHeaderValue::parse("bytes 1-2/*").unwrap());
        assert_ne!(value, ContentRangeHeaderValue::parse("bytes 0-2/3").unwrap());
    }
}
