// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

use unicase::UniCase;

use crate::{
    quality::{
        format_quality,
        parse_quality_value,
        round_quality,
        Weighted,
    },
    syntax::{
        get_token_length,
        get_whitespace_length,
        validate_token,
    },
    HeaderValueError,
    HeaderValueParser,
};

/// A token with an optional weight, used by `Accept-Charset`,
/// `Accept-Encoding`, `Accept-Language` and `TE`.
///
/// ```text
/// element = token [ weight ]
/// ```
#[derive(Clone, Debug)]
pub struct StringWithQualityHeaderValue {
    value: String,
    quality: Option<f64>,
}

impl StringWithQualityHeaderValue {
    pub fn new(value: &str) -> Result<Self, HeaderValueError> {
        validate_token(value)?;
        Ok(Self { value: value.to_owned(), quality: None })
    }

    /// The quality is rounded to three fractional digits.
    pub fn new_with_quality(value: &str, quality: f64) -> Result<Self, HeaderValueError> {
        validate_token(value)?;
        let quality = round_quality(quality)?;
        Ok(Self { value: value.to_owned(), quality: Some(quality) })
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn quality(&self) -> Option<f64> {
        self.quality
    }
}

impl HeaderValueParser for StringWithQualityHeaderValue {
    const NAME: &'static str = "string with quality";

    fn parse_value_length(input: &str, start: usize) -> Option<(Self, usize)> {
        let bytes = input.as_bytes();

        let value_length = get_token_length(input, start);
        if value_length == 0 {
            return None;
        }

        let value = input[start..start + value_length].to_owned();
        let mut current = start + value_length;
        current += get_whitespace_length(input, current);

        if bytes.get(current) != Some(&b';') {
            return Some((Self { value, quality: None }, current - start));
        }

        current += 1;
        current += get_whitespace_length(input, current);

        if !matches!(bytes.get(current), Some(b'q' | b'Q')) {
            return None;
        }
        current += 1;
        current += get_whitespace_length(input, current);

        if bytes.get(current) != Some(&b'=') {
            return None;
        }
        current += 1;
        current += get_whitespace_length(input, current);

        let (quality, quality_length) = parse_quality_value(input, current)?;
        current += quality_length;
        current += get_whitespace_length(input, current);

        Some((Self { value, quality: Some(quality) }, current - start))
    }
}

impl Display for StringWithQualityHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)?;
        if let Some(quality) = self.quality {
            let quality = format_quality(quality).map_err(|_| fmt::Error)?;
            write!(f, "; q={quality}")?;
        }
        Ok(())
    }
}

impl PartialEq for StringWithQualityHeaderValue {
    fn eq(&self, other: &Self) -> bool {
        UniCase::ascii(&self.value) == UniCase::ascii(&other.value)
            && self.quality.map(f64::to_bits) == other.quality.map(f64::to_bits)
    }
}

impl Eq for StringWithQualityHeaderValue {}

impl Hash for StringWithQualityHeaderValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        UniCase::ascii(self.value.as_str()).hash(state);
        self.quality.map(f64::to_bits).hash(state);
    }
}

impl Weighted for StringWithQualityHeaderValue {
    fn quality(&self) -> Option<f64> {
        self.quality
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::parameters::tests::hash_of;

    #[rstest]
    #[case("text", "text", None)]
    #[case("  text  ", "text", None)]
    #[case("*", "*", None)]
    #[case("text;q=0.5", "text", Some(0.5))]
    #[case("text ; Q = 0.5 ", "text", Some(0.5))]
    #[case("text;q=1", "text", Some(1.0))]
    #[case("text;q=0", "text", Some(0.0))]
    #[case("text;q=1.000", "text", Some(1.0))]
    #[case("\r\n text ;\r\n q=0.123", "text", Some(0.123))]
    fn test_parse_valid(#[case] input: &str, #[case] expected_value: &str, #[case] expected_quality: Option<f64>) {
        let value = StringWithQualityHeaderValue::parse(input).unwrap();
        assert_eq!(value.value(), expected_value);
        assert_eq!(value.quality(), expected_quality);
    }

    #[rstest]
    #[case("")]
    #[case("text;")]
    #[case("text;q")]
    #[case("text;q=")]
    #[case("text;q=2")]
    #[case("text;q=1.1")]
    #[case("text;q=0.1234")]
    #[case("text;x=0.5")]
    #[case("text;q=0.5;q=0.4")]
    #[case("text/plain")]
    #[case("\"text\"")]
    #[case("te xt")]
    #[case("text,")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(StringWithQualityHeaderValue::parse(input).is_err(), "{input:?} should be invalid");
    }

    #[test]
    fn test_parse_list() {
        let values = StringWithQualityHeaderValue::parse_list(&["gzip;q=1.0, identity; q=0.5, *;q=0", "br,,"]);
        let values: Vec<String> = values.iter().map(ToString::to_string).collect();
        assert_eq!(values, vec!["gzip; q=1.0", "identity; q=0.5", "*; q=0.0", "br"]);
    }

    #[test]
    fn test_parse_list_lenient_and_strict() {
        let inputs = ["da, en-gb;q=0.8, en;q=0.7", "fr;q=invalid", "de"];
        assert_eq!(StringWithQualityHeaderValue::parse_list(&inputs).len(), 4);
        assert!(StringWithQualityHeaderValue::parse_strict_list(&inputs).is_err());
    }

    #[test]
    fn test_new() {
        assert_eq!(StringWithQualityHeaderValue::new("gzip").unwrap().to_string(), "gzip");
        assert_eq!(StringWithQualityHeaderValue::new_with_quality("gzip", 0.25).unwrap().to_string(), "gzip; q=0.25");
        assert_eq!(StringWithQualityHeaderValue::new(""), Err(HeaderValueError::Empty));
        assert_eq!(StringWithQualityHeaderValue::new("g zip"), Err(HeaderValueError::InvalidToken));
        assert_eq!(StringWithQualityHeaderValue::new_with_quality("gzip", 1.1), Err(HeaderValueError::OutOfRange { field: "quality" }));
    }

    #[rstest]
    #[case(0.5631, 0.563, "gzip; q=0.563")]
    #[case(0.9996, 1.0, "gzip; q=1.0")]
    #[case(0.0004, 0.0, "gzip; q=0.0")]
    #[case(0.1, 0.1, "gzip; q=0.1")]
    fn test_new_with_quality_rounds(#[case] quality: f64, #[case] expected: f64, #[case] formatted: &str) {
        let value = StringWithQualityHeaderValue::new_with_quality("gzip", quality).unwrap();
        assert_eq!(value.quality(), Some(expected));
        assert_eq!(value.to_string(), formatted);
        assert_eq!(StringWithQualityHeaderValue::parse(formatted), Ok(value));
    }

    #[test]
    fn test_equality_and_hash() {
        let lower = StringWithQualityHeaderValue::parse("gzip;q=0.5").unwrap();
        let upper = StringWithQualityHeaderValue::parse("GZIP; Q=0.5").unwrap();
        let unweighted = StringWithQualityHeaderValue::parse("gzip").unwrap();

        assert_eq!(lower, upper);
        assert_eq!(hash_of(&lower), hash_of(&upper));
        assert_ne!(lower, unweighted);
        assert_ne!(lower, StringWithQualityHeaderValue::parse("gzip;q=0.6").unwrap());
    }
}
