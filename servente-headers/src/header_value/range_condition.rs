// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    fmt::{self, Display},
    time::SystemTime,
};

use crate::{
    date::{format_date, parse_date},
    EntityTagHeaderValue,
    HeaderValueParser,
};

/// The value of the `If-Range` header: the range request is only honored when
/// the representation still matches this validator.
///
/// ```text
/// If-Range = entity-tag / HTTP-date
/// ```
///
/// # References
/// * [RFC 9110 Section 13.1.5](https://www.rfc-editor.org/rfc/rfc9110.html#name-if-range)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RangeConditionHeaderValue {
    EntityTag(EntityTagHeaderValue),
    LastModified(SystemTime),
}

impl RangeConditionHeaderValue {
    #[must_use]
    pub fn entity_tag(&self) -> Option<&EntityTagHeaderValue> {
        match self {
            Self::EntityTag(entity_tag) => Some(entity_tag),
            Self::LastModified(_) => None,
        }
    }

    #[must_use]
    pub fn last_modified(&self) -> Option<SystemTime> {
        match self {
            Self::EntityTag(_) => None,
            Self::LastModified(date) => Some(*date),
        }
    }
}

impl From<EntityTagHeaderValue> for RangeConditionHeaderValue {
    fn from(entity_tag: EntityTagHeaderValue) -> Self {
        Self::EntityTag(entity_tag)
    }
}

impl From<SystemTime> for RangeConditionHeaderValue {
    fn from(date: SystemTime) -> Self {
        Self::LastModified(date)
    }
}

impl HeaderValueParser for RangeConditionHeaderValue {
    const NAME: &'static str = "range condition";

    /// Only a single condition is allowed, so the value always extends to the
    /// end of the input.
    fn parse_value_length(input: &str, start: usize) -> Option<(Self, usize)> {
        let bytes = input.as_bytes();
        if start + 1 >= bytes.len() {
            return None;
        }

        let is_entity_tag = bytes[start] == b'"'
            || (matches!(bytes[start], b'W' | b'w') && bytes[start + 1] == b'/');

        if is_entity_tag {
            let (entity_tag, length) = EntityTagHeaderValue::parse_value_length(input, start)?;
            if start + length != bytes.len() {
                return None;
            }
            return Some((Self::EntityTag(entity_tag), length));
        }

        let date = parse_date(&input[start..])?;
        Some((Self::LastModified(date), bytes.len() - start))
    }
}

impl Display for RangeConditionHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntityTag(entity_tag) => Display::fmt(entity_tag, f),
            Self::LastModified(date) => f.write_str(&format_date(*date, false)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    const NOV_15_1994_08_12_31: u64 = 784887151;

    fn date() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(NOV_15_1994_08_12_31)
    }

    #[rstest]
    #[case("\"x\"", "\"x\"")]
    #[case("  W/\"x\"  ", "W/\"x\"")]
    #[case("w/\"x\"", "W/\"x\"")]
    #[case("Tue, 15 Nov 1994 08:12:31 GMT", "Tue, 15 Nov 1994 08:12:31 GMT")]
    #[case("  Tuesday, 15-Nov-94 08:12:31 GMT  ", "Tue, 15 Nov 1994 08:12:31 GMT")]
    #[case("Wed, 31 Dec 1969 23:59:59 GMT", "Wed, 31 Dec 1969 23:59:59 GMT")]
    fn test_parse_valid(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(RangeConditionHeaderValue::parse(input).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("x")]
    #[case("\"x\" ,")]
    #[case("\"x\", \"y\"")]
    #[case("W/")]
    #[case("*")]
    #[case("Tue, 15 Nov 1994 08:12:31 GMT,")]
    #[case("not a date")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(RangeConditionHeaderValue::parse(input).is_err(), "{input:?} should be invalid");
    }

    #[test]
    fn test_display_before_the_epoch() {
        let condition = RangeConditionHeaderValue::from(SystemTime::UNIX_EPOCH - Duration::from_secs(86_400));
        assert_eq!(condition.to_string(), "Wed, 31 Dec 1969 00:00:00 GMT");
    }

    #[test]
    fn test_accessors() {
        let condition = RangeConditionHeaderValue::from(date());
        assert_eq!(condition.last_modified(), Some(date()));
        assert_eq!(condition.entity_tag(), None);

        let entity_tag = EntityTagHeaderValue::new("\"x\"").unwrap();
        let condition = RangeConditionHeaderValue::from(entity_tag.clone());
        assert_eq!(condition.entity_tag(), Some(&entity_tag));
        assert_eq!(condition.last_modified(), None);
    }

    #[test]
    fn test_equality() {
        let by_date = RangeConditionHeaderValue::parse("Tue, 15 Nov 1994 08:12:31 GMT").unwrap();
        assert_eq!(by_date, RangeConditionHeaderValue::LastModified(date()));
        assert_ne!(by_date, RangeConditionHeaderValue::parse("\"x\"").unwrap());
    }
}
