// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::{self, Display};

use crate::{
    syntax::{
        get_quoted_string_length,
        get_whitespace_length,
        is_quoted_string,
    },
    HeaderValueError,
    HeaderValueParser,
};

const ANY_TAG: &str = "*";

/// An opaque validator of a representation, used by `ETag`, `If-Match`,
/// `If-None-Match` and `If-Range`.
///
/// ```text
/// entity-tag = [ weak ] opaque-tag
/// weak       = %s"W/"
/// opaque-tag = DQUOTE *etagc DQUOTE
/// ```
///
/// The tag is stored including its `DQUOTE`s. The special value `*` matches
/// any representation and can't be weak.
///
/// # References
/// * [RFC 9110 Section 8.8.3](https://www.rfc-editor.org/rfc/rfc9110.html#name-etag)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityTagHeaderValue {
    tag: String,
    is_weak: bool,
}

impl EntityTagHeaderValue {
    /// Creates a strong entity tag. The tag must be a quoted string, or `*`.
    pub fn new(tag: &str) -> Result<Self, HeaderValueError> {
        Self::with_weakness(tag, false)
    }

    pub fn with_weakness(tag: &str, is_weak: bool) -> Result<Self, HeaderValueError> {
        if tag.is_empty() {
            return Err(HeaderValueError::Empty);
        }

        if tag == ANY_TAG {
            if is_weak {
                return Err(HeaderValueError::InvalidEntityTag);
            }
        } else if !is_quoted_string(tag) {
            return Err(HeaderValueError::InvalidEntityTag);
        }

        Ok(Self { tag: tag.to_owned(), is_weak })
    }

    /// The `*` entity tag.
    #[must_use]
    pub fn any() -> Self {
        Self { tag: ANY_TAG.to_owned(), is_weak: false }
    }

    #[must_use]
    pub fn is_any(&self) -> bool {
        self.tag == ANY_TAG
    }

    /// The opaque tag including its quotes, or `*`.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn is_weak(&self) -> bool {
        self.is_weak
    }

    /// Compares the tags using the strong or the weak comparison function.
    ///
    /// Strong comparison only matches when neither tag is weak, weak
    /// comparison ignores the weakness altogether.
    ///
    /// # References
    /// * [RFC 9110 Section 8.8.3.2](https://www.rfc-editor.org/rfc/rfc9110.html#name-comparison)
    #[must_use]
    pub fn compare(&self, other: &Self, use_strong_comparison: bool) -> bool {
        if use_strong_comparison && (self.is_weak || other.is_weak) {
            return false;
        }

        self.tag == other.tag
    }
}

impl HeaderValueParser for EntityTagHeaderValue {
    const NAME: &'static str = "entity tag";

    fn parse_value_length(input: &str, start: usize) -> Option<(Self, usize)> {
        let bytes = input.as_bytes();
        let mut current = start;

        if bytes.get(current) == Some(&b'*') {
            current += 1;
            current += get_whitespace_length(input, current);
            return Some((Self::any(), current - start));
        }

        let mut is_weak = false;
        if matches!(bytes.get(current), Some(b'W' | b'w')) {
            // "W/" must be followed by the opaque tag.
            if bytes.get(current + 1) != Some(&b'/') || current + 2 >= bytes.len() {
                return None;
            }

            is_weak = true;
            current += 2;
            current += get_whitespace_length(input, current);
        }

        let tag_length = get_quoted_string_length(input, current)?;
        let tag = input[current..current + tag_length].to_owned();
        current += tag_length;
        current += get_whitespace_length(input, current);

        Some((Self { tag, is_weak }, current - start))
    }
}

impl Display for EntityTagHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_weak {
            f.write_str("W/")?;
        }
        f.write_str(&self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("\"tag\"", "\"tag\"", false)]
    #[case("  \"tag\"  ", "\"tag\"", false)]
    #[case("W/\"tag\"", "\"tag\"", true)]
    #[case("w/\"tag\"", "\"tag\"", true)]
    #[case("W/ \"tag\"", "\"tag\"", true)]
    #[case("\"\"", "\"\"", false)]
    #[case("\"a, b\"", "\"a, b\"", false)]
    #[case("\"\\\"escaped\\\"\"", "\"\\\"escaped\\\"\"", false)]
    #[case("*", "*", false)]
    fn test_parse_valid(#[case] input: &str, #[case] expected_tag: &str, #[case] expected_weak: bool) {
        let entity_tag = EntityTagHeaderValue::parse(input).unwrap();
        assert_eq!(entity_tag.tag(), expected_tag);
        assert_eq!(entity_tag.is_weak(), expected_weak);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("tag")]
    #[case("\"tag")]
    #[case("W/")]
    #[case("W/*")]
    #[case("W/tag")]
    #[case("X/\"tag\"")]
    #[case("\"tag\" \"other\"")]
    #[case("\"tag\",")]
    #[case("**")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(EntityTagHeaderValue::parse(input).is_err(), "{input:?} should be invalid");
    }

    #[test]
    fn test_parse_list() {
        let tags = EntityTagHeaderValue::parse_list(&["\"a\", W/\"b\"", "*, invalid, \"c, d\""]);
        let tags: Vec<String> = tags.iter().map(ToString::to_string).collect();
        assert_eq!(tags, vec!["\"a\"", "W/\"b\"", "*", "\"c, d\""]);

        assert!(EntityTagHeaderValue::parse_strict_list(&["\"a\", invalid"]).is_err());
    }

    #[rstest]
    #[case("\"tag\"", false, "\"tag\"")]
    #[case("\"tag\"", true, "W/\"tag\"")]
    #[case("*", false, "*")]
    fn test_new_and_display(#[case] tag: &str, #[case] is_weak: bool, #[case] expected: &str) {
        assert_eq!(EntityTagHeaderValue::with_weakness(tag, is_weak).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("", HeaderValueError::Empty)]
    #[case("tag", HeaderValueError::InvalidEntityTag)]
    #[case("\"tag", HeaderValueError::InvalidEntityTag)]
    #[case("\"tag\" ", HeaderValueError::InvalidEntityTag)]
    fn test_new_invalid(#[case] tag: &str, #[case] expected: HeaderValueError) {
        assert_eq!(EntityTagHeaderValue::new(tag), Err(expected));
    }

    #[test]
    fn test_weak_any_is_invalid() {
        assert_eq!(EntityTagHeaderValue::with_weakness("*", true), Err(HeaderValueError::InvalidEntityTag));
    }

    #[rstest]
    #[case("\"1\"", "\"1\"", true, true)]
    #[case("\"1\"", "\"1\"", false, true)]
    #[case("W/\"1\"", "W/\"1\"", true, false)]
    #[case("W/\"1\"", "W/\"1\"", false, true)]
    #[case("W/\"1\"", "\"1\"", true, false)]
    #[case("W/\"1\"", "\"1\"", false, true)]
    #[case("\"1\"", "\"2\"", false, false)]
    #[case("W/\"1\"", "W/\"2\"", false, false)]
    fn test_compare(#[case] a: &str, #[case] b: &str, #[case] strong: bool, #[case] expected: bool) {
        let a = EntityTagHeaderValue::parse(a).unwrap();
        let b = EntityTagHeaderValue::parse(b).unwrap();
        assert_eq!(a.compare(&b, strong), expected);
        assert_eq!(b.compare(&a, strong), expected);
    }

    #[test]
    fn test_equality_is_case_sensitive() {
        let a = EntityTagHeaderValue::parse("\"tag\"").unwrap();
        assert_eq!(a, EntityTagHeaderValue::parse("\"tag\"").unwrap());
        assert_ne!(a, EntityTagHeaderValue::parse("\"TAG\"").unwrap());
        assert_ne!(a, EntityTagHeaderValue::parse("W/\"tag\"").unwrap());
    }
}
