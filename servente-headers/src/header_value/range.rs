// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! The `Range` request header.
//!
//! ```text
//! Range             = ranges-specifier
//! ranges-specifier  = range-unit "=" range-set
//! range-set         = 1#range-spec
//! range-spec        = int-range / suffix-range / other-range
//! int-range         = first-pos "-" [ last-pos ]
//! suffix-range      = "-" suffix-length
//! ```
//!
//! # References
//! * [RFC 9110 Section 14.2](https://www.rfc-editor.org/rfc/rfc9110.html#name-range)

use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

use unicase::UniCase;

use crate::{
    lists::skip_empty_elements,
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

pub const DEFAULT_RANGE_UNIT: &str = "bytes";

/// A single range of a `Range` header: `from-to`, `from-` or `-to`.
///
/// At least one of the bounds is present, and `from` never exceeds `to`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RangeItemHeaderValue {
    from: Option<u64>,
    to: Option<u64>,
}

impl RangeItemHeaderValue {
    pub fn new(from: Option<u64>, to: Option<u64>) -> Result<Self, HeaderValueError> {
        match (from, to) {
            (None, None) => Err(HeaderValueError::InvalidFormat { kind: Self::NAME }),
            (Some(from), Some(to)) if from > to => Err(HeaderValueError::OutOfRange { field: "from" }),
            _ => Ok(Self { from, to }),
        }
    }

    /// The first position, `None` for a suffix range.
    #[must_use]
    pub fn from(&self) -> Option<u64> {
        self.from
    }

    /// The last position, or the suffix length when `from` is `None`.
    #[must_use]
    pub fn to(&self) -> Option<u64> {
        self.to
    }
}

impl HeaderValueParser for RangeItemHeaderValue {
    const NAME: &'static str = "range item";

    fn parse_value_length(input: &str, start: usize) -> Option<(Self, usize)> {
        let mut current = start;

        let from_length = get_number_length(input, current, false);
        let from = match from_length {
            0 => None,
            _ => Some(parse_int64_digits(input, current, from_length)?),
        };
        current += from_length;
        current += get_whitespace_length(input, current);

        if input.as_bytes().get(current) != Some(&b'-') {
            return None;
        }
        current += 1;
        current += get_whitespace_length(input, current);

        let to_length = get_number_length(input, current, false);
        let to = match to_length {
            0 => None,
            _ => Some(parse_int64_digits(input, current, to_length)?),
        };
        current += to_length;
        current += get_whitespace_length(input, current);

        let item = Self::new(from, to).ok()?;
        Some((item, current - start))
    }
}

impl Display for RangeItemHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(from) = self.from {
            write!(f, "{from}")?;
        }
        f.write_str("-")?;
        if let Some(to) = self.to {
            write!(f, "{to}")?;
        }
        Ok(())
    }
}

/// The value of the `Range` header: a unit and one or more ranges.
#[derive(Clone, Debug)]
pub struct RangeHeaderValue {
    unit: String,
    ranges: Vec<RangeItemHeaderValue>,
}

impl RangeHeaderValue {
    /// Creates a `bytes` range header without any ranges. At least one range
    /// has to be added before the value can be sent, `bytes=` alone isn't a
    /// valid `Range` header.
    #[must_use]
    pub fn new() -> Self {
        Self {
            unit: DEFAULT_RANGE_UNIT.to_owned(),
            ranges: Vec::new(),
        }
    }

    /// Creates a `bytes` range header with a single range.
    pub fn with_range(from: Option<u64>, to: Option<u64>) -> Result<Self, HeaderValueError> {
        let mut value = Self::new();
        value.ranges.push(RangeItemHeaderValue::new(from, to)?);
        Ok(value)
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

    #[must_use]
    pub fn ranges(&self) -> &[RangeItemHeaderValue] {
        &self.ranges
    }

    pub fn ranges_mut(&mut self) -> &mut Vec<RangeItemHeaderValue> {
        &mut self.ranges
    }
}

impl Default for RangeHeaderValue {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderValueParser for RangeHeaderValue {
    const NAME: &'static str = "range";

    fn parse_value_length(input: &str, start: usize) -> Option<(Self, usize)> {
        let bytes = input.as_bytes();

        let unit_length = get_token_length(input, start);
        if unit_length == 0 {
            return None;
        }

        let unit = input[start..start + unit_length].to_owned();
        let mut current = start + unit_length;
        current += get_whitespace_length(input, current);

        if bytes.get(current) != Some(&b'=') {
            return None;
        }
        current += 1;

        current = skip_empty_elements(input, current, b",");
        if current == bytes.len() {
            return None;
        }

        let mut ranges = Vec::new();
        loop {
            let (range, length) = RangeItemHeaderValue::parse_value_length(input, current)?;
            ranges.push(range);
            current += length;

            // Ranges must be separated by at least one comma.
            let separator_found = bytes.get(current) == Some(&b',');
            current = skip_empty_elements(input, current, b",");
            if current == bytes.len() {
                break;
            }

            if !separator_found {
                return None;
            }
        }

        Some((Self { unit, ranges }, current - start))
    }
}

impl Display for RangeHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.unit)?;
        for (index, range) in self.ranges.iter().enumerate() {
            if index != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{range}")?;
        }
        Ok(())
    }
}

/// The order of the ranges is significant.
impl PartialEq for RangeHeaderValue {
    fn eq(&self, other: &Self) -> bool {
        UniCase::ascii(&self.unit) == UniCase::ascii(&other.unit) && self.ranges == other.ranges
    }
}

impl Eq for RangeHeaderValue {}

impl Hash for RangeHeaderValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        UniCase::ascii(self.unit.as_str()).hash(state);
        self.ranges.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::parameters::tests::hash_of;

    fn item(from: Option<u64>, to: Option<u64>) -> RangeItemHeaderValue {
        RangeItemHeaderValue::new(from, to).unwrap()
    }

    #[rstest]
    #[case("5-10", Some(5), Some(10))]
    #[case("5-", Some(5), None)]
    #[case("-10", None, Some(10))]
    #[case("0-0", Some(0), Some(0))]
    #[case(" 5 - 10 ", Some(5), Some(10))]
    #[case("9223372036854775807-", Some(9223372036854775807), None)]
    #[case("1-9999999999999999999", Some(1), Some(9999999999999999999))]
    fn test_range_item_parse_valid(#[case] input: &str, #[case] from: Option<u64>, #[case] to: Option<u64>) {
        assert_eq!(RangeItemHeaderValue::parse(input), Ok(item(from, to)));
    }

    #[rstest]
    #[case("-")]
    #[case("10-5")]
    #[case("5")]
    #[case("a-5")]
    #[case("5-a")]
    #[case("5--10")]
    #[case("12345678901234567890-")]
    #[case("-12345678901234567890")]
    fn test_range_item_parse_invalid(#[case] input: &str) {
        assert!(RangeItemHeaderValue::parse(input).is_err(), "{input:?} should be invalid");
    }

    #[test]
    fn test_range_item_new() {
        assert_eq!(RangeItemHeaderValue::new(None, None), Err(HeaderValueError::InvalidFormat { kind: "range item" }));
        assert_eq!(RangeItemHeaderValue::new(Some(2), Some(1)), Err(HeaderValueError::OutOfRange { field: "from" }));
        assert_eq!(item(Some(5), None).to_string(), "5-");
        assert_eq!(item(None, Some(10)).to_string(), "-10");
        assert_eq!(item(Some(5), Some(10)).to_string(), "5-10");
    }

    #[rstest]
    #[case("bytes=1-2", "bytes", &[(Some(1), Some(2))])]
    #[case("bytes = 1-2", "bytes", &[(Some(1), Some(2))])]
    #[case("custom=1-", "custom", &[(Some(1), None)])]
    #[case("bytes=-2", "bytes", &[(None, Some(2))])]
    #[case("bytes=1-2,3-4", "bytes", &[(Some(1), Some(2)), (Some(3), Some(4))])]
    #[case("bytes = , 1 - 2 ,, 3 - ,,", "bytes", &[(Some(1), Some(2)), (Some(3), None)])]
    #[case("bytes=0-0,-1", "bytes", &[(Some(0), Some(0)), (None, Some(1))])]
    fn test_range_parse_valid(#[case] input: &str, #[case] unit: &str, #[case] ranges: &[(Option<u64>, Option<u64>)]) {
        let value = RangeHeaderValue::parse(input).unwrap();
        assert_eq!(value.unit(), unit);
        let expected: Vec<_> = ranges.iter().map(|(from, to)| item(*from, *to)).collect();
        assert_eq!(value.ranges(), expected.as_slice());
    }

    #[rstest]
    #[case("")]
    #[case("bytes")]
    #[case("bytes=")]
    #[case("bytes=,")]
    #[case("=1-2")]
    #[case("bytes=1-2 3-4")]
    #[case("bytes=2-1")]
    #[case("bytes=1-2,x")]
    #[case("bytes 1-2")]
    fn test_range_parse_invalid(#[case] input: &str) {
        assert!(RangeHeaderValue::parse(input).is_err(), "{input:?} should be invalid");
    }

    #[test]
    fn test_range_display() {
        let mut value = RangeHeaderValue::with_range(Some(1), Some(2)).unwrap();
        assert_eq!(value.to_string(), "bytes=1-2");

        value.ranges_mut().push(item(None, Some(500)));
        value.set_unit("custom").unwrap();
        assert_eq!(value.to_string(), "custom=1-2, -500");

        assert_eq!(value.set_unit("in valid"), Err(HeaderValueError::InvalidToken));
    }

    #[test]
    fn test_range_equality_and_hash() {
        let value = RangeHeaderValue::parse("bytes=1-2, 3-4").unwrap();
        let upper = RangeHeaderValue::parse("BYTES=1-2,3-4").unwrap();
        let reordered = RangeHeaderValue::parse("bytes=3-4, 1-2").unwrap();

        assert_eq!(value, upper);
        assert_eq!(hash_of(&value), hash_of(&upper));
        assert_ne!(value, reordered);
        assert_ne!(value, RangeHeaderValue::parse("other=1-2, 3-4").unwrap());
    }

    #[test]
    fn test_default_unit() {
        assert_eq!(RangeHeaderValue::default().unit(), "bytes");
        assert!(RangeHeaderValue::new().ranges().is_empty());

        let mut value = RangeHeaderValue::new();
        assert_eq!(value.to_string(), "bytes=");
        assert!(RangeHeaderValue::parse(&value.to_string()).is_err());

        value.ranges_mut().push(RangeItemHeaderValue::new(Some(0), None).unwrap());
        assert_eq!(RangeHeaderValue::parse(&value.to_string()), Ok(value));
    }
}
