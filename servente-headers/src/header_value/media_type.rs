// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

use unicase::UniCase;

use crate::{
    extended_value::Charset,
    parameters::{
        parse_parameter_list,
        NameValueHeaderValue,
        Parameters,
    },
    quality::{
        Weighted,
        QUALITY_PARAMETER_NAME,
    },
    syntax::{
        get_token_length,
        get_whitespace_length,
        remove_quotes,
    },
    HeaderValueError,
    HeaderValueParser,
};

const CHARSET_PARAMETER_NAME: &str = "charset";
const BOUNDARY_PARAMETER_NAME: &str = "boundary";
const WILDCARD: &str = "*";

/// A media type or media range, such as `text/html; charset=utf-8`, used
/// by `Content-Type` and `Accept`.
///
/// ```text
/// media-type = type "/" subtype parameters
/// type       = token
/// subtype    = token
/// ```
///
/// The subtype may carry a structured syntax suffix (`application/ld+json`),
/// and its part before the suffix may consist of multiple facets
/// (`vnd.github.v3`).
///
/// # References
/// * [RFC 9110 Section 8.3.1](https://www.rfc-editor.org/rfc/rfc9110.html#name-media-type)
/// * [RFC 6838 Section 4.2](https://www.rfc-editor.org/rfc/rfc6838.html#section-4.2)
#[derive(Clone, Debug)]
pub struct MediaTypeHeaderValue {
    media_type: String,
    parameters: Parameters,
}

impl MediaTypeHeaderValue {
    /// Creates a media type from exactly `type/subtype`, without any
    /// whitespace or parameters.
    pub fn new(media_type: &str) -> Result<Self, HeaderValueError> {
        if media_type.is_empty() {
            return Err(HeaderValueError::Empty);
        }

        match get_media_type_length(media_type, 0) {
            Some((parsed, length)) if length == media_type.len() && parsed == media_type => Ok(Self {
                media_type: parsed,
                parameters: Parameters::new(),
            }),
            _ => Err(HeaderValueError::InvalidMediaType),
        }
    }

    pub fn new_with_quality(media_type: &str, quality: f64) -> Result<Self, HeaderValueError> {
        let mut value = Self::new(media_type)?;
        value.set_quality(Some(quality))?;
        Ok(value)
    }

    /// The `type/subtype` part, without parameters.
    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    #[must_use]
    pub fn type_(&self) -> &str {
        self.split().0
    }

    #[must_use]
    pub fn sub_type(&self) -> &str {
        self.split().1
    }

    fn split(&self) -> (&str, &str) {
        // Both parts are validated on construction, so the slash is present.
        self.media_type.split_once('/').unwrap_or((self.media_type.as_str(), ""))
    }

    /// The structured syntax suffix: the part of the subtype after the last
    /// `+`. `None` when there is no `+`, empty when the `+` is the last
    /// character.
    #[must_use]
    pub fn suffix(&self) -> Option<&str> {
        let sub_type = self.sub_type();
        sub_type.rfind('+').map(|index| &sub_type[index + 1..])
    }

    #[must_use]
    pub fn sub_type_without_suffix(&self) -> &str {
        let sub_type = self.sub_type();
        match sub_type.rfind('+') {
            Some(index) => &sub_type[..index],
            None => sub_type,
        }
    }

    /// The dot-separated pieces of the subtype, excluding the suffix.
    pub fn facets(&self) -> impl Iterator<Item = &str> {
        self.sub_type_without_suffix().split('.')
    }

    /// Is this the `*/*` range?
    #[must_use]
    pub fn matches_all_types(&self) -> bool {
        self.media_type == "*/*"
    }

    #[must_use]
    pub fn matches_all_sub_types(&self) -> bool {
        self.sub_type() == WILDCARD
    }

    /// Does the subtype, disregarding its suffix, match everything? This is
    /// the case for `text/*` and `text/*+json`.
    #[must_use]
    pub fn matches_all_sub_types_without_suffix(&self) -> bool {
        self.sub_type_without_suffix() == WILDCARD
    }

    /// The `charset` parameter, with the quotes removed.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.parameters.get_value(CHARSET_PARAMETER_NAME).map(remove_quotes)
    }

    /// Sets the `charset` parameter, `None` removes it.
    pub fn set_charset(&mut self, charset: Option<&str>) -> Result<(), HeaderValueError> {
        self.set_parameter(CHARSET_PARAMETER_NAME, charset)
    }

    /// The known character set named by the `charset` parameter.
    #[must_use]
    pub fn encoding(&self) -> Option<Charset> {
        self.charset().and_then(Charset::from_name)
    }

    /// The `boundary` parameter of `multipart` types, with the quotes
    /// removed.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameters.get_value(BOUNDARY_PARAMETER_NAME).map(remove_quotes)
    }

    pub fn set_boundary(&mut self, boundary: Option<&str>) -> Result<(), HeaderValueError> {
        self.set_parameter(BOUNDARY_PARAMETER_NAME, boundary)
    }

    fn set_parameter(&mut self, name: &str, value: Option<&str>) -> Result<(), HeaderValueError> {
        let value = match value {
            Some(value) => {
                let parameter = NameValueHeaderValue::with_value(name, value)?;
                parameter.value().map(str::to_owned)
            }
            None => None,
        };

        self.parameters.set_value_unchecked(name, value);
        Ok(())
    }

    #[must_use]
    pub fn quality(&self) -> Option<f64> {
        self.parameters.quality()
    }

    pub fn set_quality(&mut self, quality: Option<f64>) -> Result<(), HeaderValueError> {
        self.parameters.set_quality(quality)
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    /// Checks whether this media type is contained in the media range `set`.
    ///
    /// * `text/plain` is a subset of `text/plain`, `text/*` and `*/*`.
    /// * `application/entity+json` is a subset of `application/json` and
    ///   `application/*+json`, but not of `application/entity+*`: suffixes
    ///   can't be wildcards.
    /// * `text/plain; charset=utf-8` is a subset of `text/plain`, but not the
    ///   other way around. Parameters of `set` starting from `q` are ignored,
    ///   a `*` parameter is skipped.
    #[must_use]
    pub fn is_subset_of(&self, set: &MediaTypeHeaderValue) -> bool {
        self.matches_type(set)
            && self.matches_sub_type(set)
            && self.matches_parameters(set)
    }

    /// Checks whether the other media type falls in this media range,
    /// ignoring all parameters. Returns `false` when the other media type
    /// can't be parsed.
    #[must_use]
    pub fn matches_media_type(&self, other: &str) -> bool {
        match Self::try_parse(other) {
            Some(other) => other.matches_type(self) && other.matches_sub_type(self),
            None => false,
        }
    }

    fn matches_type(&self, set: &MediaTypeHeaderValue) -> bool {
        set.matches_all_types() || UniCase::ascii(set.type_()) == UniCase::ascii(self.type_())
    }

    fn matches_sub_type(&self, set: &MediaTypeHeaderValue) -> bool {
        if set.matches_all_sub_types() {
            return true;
        }

        let Some(set_suffix) = set.suffix() else {
            // application/entity+json is in application/json
            let set_sub_type = UniCase::ascii(set.sub_type());
            return set_sub_type == UniCase::ascii(self.sub_type())
                || self.suffix().is_some_and(|suffix| set_sub_type == UniCase::ascii(suffix));
        };

        let Some(suffix) = self.suffix() else {
            return false;
        };

        let matches_without_suffix = set.matches_all_sub_types_without_suffix()
            || UniCase::ascii(set.sub_type_without_suffix()) == UniCase::ascii(self.sub_type_without_suffix());

        matches_without_suffix && UniCase::ascii(set_suffix) == UniCase::ascii(suffix)
    }

    fn matches_parameters(&self, set: &MediaTypeHeaderValue) -> bool {
        for parameter in set.parameters.iter() {
            if parameter.name() == WILDCARD {
                continue;
            }

            // The weight separates the media type parameters from the
            // accept extension parameters.
            if parameter.has_name(QUALITY_PARAMETER_NAME) {
                break;
            }

            let Some(local) = self.parameters.find(parameter.name()) else {
                return false;
            };

            let matches = match (parameter.value(), local.value()) {
                (Some(expected), Some(actual)) => UniCase::ascii(expected) == UniCase::ascii(actual),
                (expected, actual) => expected == actual,
            };

            if !matches {
                return false;
            }
        }

        true
    }
}

/// Parses `type OWS "/" OWS subtype`, returning the media type without the
/// whitespace and the length consumed, excluding trailing whitespace.
fn get_media_type_length(input: &str, start: usize) -> Option<(String, usize)> {
    let type_length = get_token_length(input, start);
    if type_length == 0 {
        return None;
    }

    let mut current = start + type_length;
    current += get_whitespace_length(input, current);
    if input.as_bytes().get(current) != Some(&b'/') {
        return None;
    }

    current += 1;
    current += get_whitespace_length(input, current);

    let sub_type_length = get_token_length(input, current);
    if sub_type_length == 0 {
        return None;
    }

    let type_ = &input[start..start + type_length];
    let sub_type = &input[current..current + sub_type_length];
    current += sub_type_length;

    Some((format!("{type_}/{sub_type}"), current - start))
}

impl HeaderValueParser for MediaTypeHeaderValue {
    const NAME: &'static str = "media type";

    fn parse_value_length(input: &str, start: usize) -> Option<(Self, usize)> {
        let (media_type, length) = get_media_type_length(input, start)?;
        let mut current = start + length;
        current += get_whitespace_length(input, current);

        let mut parameters = Parameters::new();
        if input.as_bytes().get(current) == Some(&b';') {
            current += 1;
            current += parse_parameter_list(input, current, b';', &mut parameters);
        }

        Some((Self { media_type, parameters }, current - start))
    }
}

impl Display for MediaTypeHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.media_type)?;
        self.parameters.fmt_with_leading_delimiter(f, "; ")
    }
}

impl PartialEq for MediaTypeHeaderValue {
    fn eq(&self, other: &Self) -> bool {
        UniCase::ascii(&self.media_type) == UniCase::ascii(&other.media_type)
            && self.parameters == other.parameters
    }
}

impl Eq for MediaTypeHeaderValue {}

impl Hash for MediaTypeHeaderValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        UniCase::ascii(self.media_type.as_str()).hash(state);
        self.parameters.hash(state);
    }
}

impl Weighted for MediaTypeHeaderValue {
    fn quality(&self) -> Option<f64> {
        self.parameters.quality()
    }
}
