// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! The `name[=value]` pairs that most structured header values carry, like
//! the `charset` of a media type or the `filename` of a content disposition.
//!
//! ```text
//! parameters      = *( OWS ";" OWS [ parameter ] )
//! parameter       = parameter-name "=" parameter-value
//! parameter-name  = token
//! parameter-value = ( token / quoted-string )
//! ```
//!
//! # References
//! * [RFC 9110 Section 5.6.6](https://www.rfc-editor.org/rfc/rfc9110.html#name-parameters)

use std::{
    collections::hash_map::DefaultHasher,
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

use unicase::UniCase;

use crate::{
    lists::HeaderValueParser,
    quality,
    syntax::{
        escape_as_quoted_string,
        get_quoted_string_length,
        get_token_length,
        get_whitespace_length,
        is_quoted,
        is_quoted_string,
        is_token,
        unescape_as_quoted_string,
        validate_token,
    },
    HeaderValueError,
};

/// A single `name[=value]` pair.
///
/// A bare `name` has no value, which is different from `name=` that has an
/// empty value. Both forms survive formatting.
#[derive(Clone, Debug)]
pub struct NameValueHeaderValue {
    name: String,
    value: Option<String>,
}

impl NameValueHeaderValue {
    /// Creates a parameter without a value.
    pub fn new(name: &str) -> Result<Self, HeaderValueError> {
        validate_token(name)?;
        Ok(Self { name: name.to_owned(), value: None })
    }

    /// Creates a parameter with a value. The value must be empty, a `token`
    /// or a `quoted-string`.
    pub fn with_value(name: &str, value: &str) -> Result<Self, HeaderValueError> {
        validate_token(name)?;
        validate_value(value)?;
        Ok(Self { name: name.to_owned(), value: Some(value.to_owned()) })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw value, including the quotes of a quoted-string.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: Option<&str>) -> Result<(), HeaderValueError> {
        if let Some(value) = value {
            validate_value(value)?;
        }

        self.value = value.map(str::to_owned);
        Ok(())
    }

    /// The value with the quotes removed and the quoted-pairs resolved.
    #[must_use]
    pub fn unescaped_value(&self) -> Option<String> {
        let value = self.value.as_deref()?;
        if is_quoted(value) {
            Some(unescape_as_quoted_string(value))
        } else {
            Some(value.to_owned())
        }
    }

    /// Sets the value, converting it to a quoted-string unless it's empty.
    pub fn set_and_escape_value(&mut self, value: Option<&str>) -> Result<(), HeaderValueError> {
        self.value = match value {
            None => None,
            Some("") => Some(String::new()),
            Some(value) => Some(escape_as_quoted_string(value)?),
        };
        Ok(())
    }

    /// Sets a value that was already validated or produced by an encoder.
    pub(crate) fn set_value_unchecked(&mut self, value: Option<String>) {
        debug_assert!(value.as_deref().map_or(true, |value| validate_value(value).is_ok()));
        self.value = value;
    }

    pub(crate) fn new_unchecked(name: &str, value: Option<String>) -> Self {
        debug_assert!(is_token(name));
        Self { name: name.to_owned(), value }
    }

    #[must_use]
    pub(crate) fn has_name(&self, name: &str) -> bool {
        UniCase::ascii(self.name.as_str()) == UniCase::ascii(name)
    }
}

fn validate_value(value: &str) -> Result<(), HeaderValueError> {
    if value.is_empty() || is_token(value) || is_quoted_string(value) {
        Ok(())
    } else {
        Err(HeaderValueError::InvalidParameterValue)
    }
}

/// Returns the length of the value at `start`, which is either a token or a
/// quoted string. Returns `0` if neither is present.
fn get_value_length(input: &str, start: usize) -> usize {
    match get_token_length(input, start) {
        0 => get_quoted_string_length(input, start).unwrap_or(0),
        length => length,
    }
}

impl HeaderValueParser for NameValueHeaderValue {
    const NAME: &'static str = "parameter";

    /// ```text
    /// name-value = token OWS [ "=" OWS ( token / quoted-string ) OWS ]
    /// ```
    fn parse_value_length(input: &str, start: usize) -> Option<(Self, usize)> {
        let name_length = get_token_length(input, start);
        if name_length == 0 {
            return None;
        }

        let name = &input[start..start + name_length];
        let mut current = start + name_length;
        current += get_whitespace_length(input, current);

        if input.as_bytes().get(current) != Some(&b'=') {
            return Some((Self::new_unchecked(name, None), current - start));
        }

        current += 1;
        current += get_whitespace_length(input, current);

        // The value may be empty, anything invalid following the '=' is left
        // for the caller to reject.
        let value_length = get_value_length(input, current);
        let value = input[current..current + value_length].to_owned();
        current += value_length;
        current += get_whitespace_length(input, current);

        Some((Self::new_unchecked(name, Some(value)), current - start))
    }
}

impl Display for NameValueHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(value) = &self.value {
            write!(f, "={value}")?;
        }
        Ok(())
    }
}

/// Quoted values are compared case-sensitively, token values aren't.
impl PartialEq for NameValueHeaderValue {
    fn eq(&self, other: &Self) -> bool {
        if UniCase::ascii(&self.name) != UniCase::ascii(&other.name) {
            return false;
        }

        match (&self.value, &other.value) {
            (None, None) => true,
            (Some(value), Some(other_value)) if value.starts_with('"') => value == other_value,
            (Some(value), Some(other_value)) => UniCase::ascii(value) == UniCase::ascii(other_value),
            _ => false,
        }
    }
}

impl Eq for NameValueHeaderValue {}

impl Hash for NameValueHeaderValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        UniCase::ascii(self.name.as_str()).hash(state);
        match &self.value {
            None => state.write_u8(0),
            Some(value) if value.starts_with('"') => {
                state.write_u8(1);
                value.hash(state);
            }
            Some(value) => {
                state.write_u8(2);
                UniCase::ascii(value.as_str()).hash(state);
            }
        }
    }
}

/// An ordered collection of parameters.
///
/// The order is kept for formatting, but doesn't matter for equality: two
/// collections are equal when they contain the same parameters.
#[derive(Clone, Debug, Default)]
pub struct Parameters {
    entries: Vec<NameValueHeaderValue>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NameValueHeaderValue> {
        self.entries.iter()
    }

    pub fn first(&self) -> Option<&NameValueHeaderValue> {
        self.entries.first()
    }

    pub fn push(&mut self, parameter: NameValueHeaderValue) {
        self.entries.push(parameter);
    }

    /// Finds the first parameter with the given name, case-insensitively.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&NameValueHeaderValue> {
        self.entries.iter().find(|parameter| parameter.has_name(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut NameValueHeaderValue> {
        self.entries.iter_mut().find(|parameter| parameter.has_name(name))
    }

    /// Removes the first parameter that is equal to `parameter`.
    pub fn remove(&mut self, parameter: &NameValueHeaderValue) -> bool {
        match self.entries.iter().position(|entry| entry == parameter) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes all parameters with the given name.
    pub fn remove_by_name(&mut self, name: &str) {
        self.entries.retain(|parameter| !parameter.has_name(name));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The raw value of the first parameter with the given name.
    #[must_use]
    pub fn get_value(&self, name: &str) -> Option<&str> {
        self.find(name).and_then(NameValueHeaderValue::value)
    }

    /// Overwrites the value of the parameter with this name, keeping the
    /// casing of its name and its position, or appends a new parameter.
    /// `None` removes the parameter.
    pub(crate) fn set_value_unchecked(&mut self, name: &str, value: Option<String>) {
        match (self.find_mut(name), value) {
            (Some(parameter), Some(value)) => parameter.set_value_unchecked(Some(value)),
            (None, Some(value)) => self.entries.push(NameValueHeaderValue::new_unchecked(name, Some(value))),
            (_, None) => self.remove_by_name(name),
        }
    }

    /// The value of the `q` parameter, `None` if it's absent or invalid.
    #[must_use]
    pub fn quality(&self) -> Option<f64> {
        let value = self.get_value(quality::QUALITY_PARAMETER_NAME)?;
        match quality::parse_quality_value(value, 0) {
            Some((quality, length)) if length == value.len() => Some(quality),
            _ => None,
        }
    }

    pub fn set_quality(&mut self, quality: Option<f64>) -> Result<(), HeaderValueError> {
        let value = match quality {
            Some(quality) => Some(quality::format_quality(quality)?),
            None => None,
        };

        self.set_value_unchecked(quality::QUALITY_PARAMETER_NAME, value);
        Ok(())
    }

    /// Writes the parameters, each preceded by `delimiter`.
    pub(crate) fn fmt_with_leading_delimiter(&self, f: &mut fmt::Formatter<'_>, delimiter: &str) -> fmt::Result {
        for parameter in &self.entries {
            write!(f, "{delimiter}{parameter}")?;
        }
        Ok(())
    }
}

/// Parses `parameter *( OWS delimiter OWS parameter )` at `start` into
/// `parameters`, returning the amount of bytes consumed. A trailing delimiter
/// is allowed. Parsing stops at the first byte that can't continue the list,
/// the caller decides whether that's valid.
pub(crate) fn parse_parameter_list(input: &str, start: usize, delimiter: u8, parameters: &mut Parameters) -> usize {
    let bytes = input.as_bytes();
    if start >= bytes.len() {
        return 0;
    }

    let mut current = start + get_whitespace_length(input, start);
    loop {
        let Some((parameter, length)) = NameValueHeaderValue::parse_value_length(input, current) else {
            return current - start;
        };

        parameters.push(parameter);
        current += length;
        current += get_whitespace_length(input, current);

        if bytes.get(current) != Some(&delimiter) {
            return current - start;
        }

        current += 1;
        current += get_whitespace_length(input, current);
    }
}

impl PartialEq for Parameters {
    fn eq(&self, other: &Self) -> bool {
        if self.entries.len() != other.entries.len() {
            return false;
        }

        let count = |parameters: &Parameters, parameter: &NameValueHeaderValue| {
            parameters.entries.iter().filter(|entry| *entry == parameter).count()
        };

        self.entries.iter().all(|parameter| count(self, parameter) == count(other, parameter))
    }
}

impl Eq for Parameters {}

/// Order-independent, like the equality.
impl Hash for Parameters {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let combined = self.entries.iter().fold(0u64, |combined, parameter| {
            let mut hasher = DefaultHasher::new();
            parameter.hash(&mut hasher);
            combined.wrapping_add(hasher.finish())
        });

        state.write_usize(self.entries.len());
        state.write_u64(combined);
    }
}

impl FromIterator<NameValueHeaderValue> for Parameters {
    fn from_iter<T: IntoIterator<Item = NameValueHeaderValue>>(iter: T) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a NameValueHeaderValue;
    type IntoIter = std::slice::Iter<'a, NameValueHeaderValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
