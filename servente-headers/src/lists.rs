// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! This module provides support for the HTTP Lists `#rule` ABNF extension,
//! and the parsing framework every header value type plugs into.
//!
//! # Definition for Recipients
//! ```text
//! #element => [ element ] *( OWS "," OWS [ element ] )
//! ```
//!
//! # References
//! * [RFC 9110 Section 5.6.1](https://www.rfc-editor.org/rfc/rfc9110.html#section-5.6.1)

use crate::{
    log::trace,
    syntax::{get_whitespace_length, is_whitespace_character},
    HeaderValueError,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SplitState {
    OutsideQuotes,
    InsideQuotes,
    Escaped,
}

struct HttpListElementIterator<'a> {
    value: &'a str,
    separator: u8,
}

impl<'a> Iterator for HttpListElementIterator<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.value.is_empty() {
            let end = find_next_separator(self.value, 0, &[self.separator]);
            let element = self.value[..end].trim_matches(is_whitespace_character);

            self.value = if end < self.value.len() {
                &self.value[end + 1..]
            } else {
                ""
            };

            if !element.is_empty() {
                return Some(element);
            }
        }

        None
    }
}

/// This function splits a field-value into its list elements, trimming the
/// optional whitespace around them. A separator inside of a quoted-string
/// doesn't split the element. The iterator will never return the empty string,
/// as those cannot occur in HTTP lists and will be ignored.
///
/// # Definition for Recipients
/// ```text
/// #element => [ element ] *( OWS "," OWS [ element ] )
/// ```
///
/// # References
/// * [RFC 9110 Section 5.6.1](https://www.rfc-editor.org/rfc/rfc9110.html#section-5.6.1)
pub fn split_list(value: &str, separator: u8) -> impl Iterator<Item = &'_ str> {
    HttpListElementIterator { value, separator }
}

/// Finds the offset of the next separator at or after `start` that isn't
/// inside of a quoted-string, or `input.len()` if there is none.
pub fn find_next_separator(input: &str, start: usize, separators: &[u8]) -> usize {
    let bytes = input.as_bytes();
    let mut state = SplitState::OutsideQuotes;

    for (index, byte) in bytes.iter().enumerate().skip(start) {
        state = match (state, *byte) {
            (SplitState::OutsideQuotes, b'"') => SplitState::InsideQuotes,
            (SplitState::OutsideQuotes, byte) if separators.contains(&byte) => return index,
            (SplitState::OutsideQuotes, _) => SplitState::OutsideQuotes,
            (SplitState::InsideQuotes, b'\\') => SplitState::Escaped,
            (SplitState::InsideQuotes, b'"') => SplitState::OutsideQuotes,
            (SplitState::InsideQuotes, _) => SplitState::InsideQuotes,
            (SplitState::Escaped, _) => SplitState::InsideQuotes,
        };
    }

    bytes.len()
}

/// Skips whitespace and separators, so empty list elements (`a, ,b`) are
/// ignored.
pub(crate) fn skip_empty_elements(input: &str, start: usize, separators: &[u8]) -> usize {
    let bytes = input.as_bytes();
    let mut current = start;

    loop {
        current += get_whitespace_length(input, current);
        match bytes.get(current) {
            Some(byte) if separators.contains(byte) => current += 1,
            _ => return current,
        }
    }
}

/// A header value that can be parsed from its textual representation.
///
/// Implementors only provide [`HeaderValueParser::parse_value_length`]; the
/// single value and the list entry points are derived from it.
pub trait HeaderValueParser: Sized {
    /// The name of the kind of value, used in errors and diagnostics.
    const NAME: &'static str;

    /// The bytes that separate elements when the value occurs in a list.
    const SEPARATORS: &'static [u8] = b",";

    /// Parses a value at `start`, returning the value and the amount of bytes
    /// consumed, including trailing whitespace. The caller has skipped the
    /// leading whitespace. A value that is followed by anything other than
    /// a separator or the end of the input is rejected by the caller.
    fn parse_value_length(input: &str, start: usize) -> Option<(Self, usize)>;

    /// Parses exactly one value, surrounding whitespace is allowed.
    fn parse(input: &str) -> Result<Self, HeaderValueError> {
        let start = get_whitespace_length(input, 0);
        if start == input.len() {
            return Err(HeaderValueError::Empty);
        }

        let error = HeaderValueError::InvalidFormat { kind: Self::NAME };
        let (value, length) = Self::parse_value_length(input, start).ok_or(error)?;
        if length == 0 {
            return Err(error);
        }

        let end = start + length;
        if end + get_whitespace_length(input, end) != input.len() {
            return Err(error);
        }

        Ok(value)
    }

    fn try_parse(input: &str) -> Option<Self> {
        Self::parse(input).ok()
    }

    /// Parses the values of all the header lines, silently dropping elements
    /// that are invalid.
    fn parse_list<S: AsRef<str>>(inputs: &[S]) -> Vec<Self> {
        let mut values = Vec::new();
        for input in inputs {
            // Lenient parsing never fails.
            _ = parse_line(input.as_ref(), false, &mut values);
        }
        values
    }

    /// Parses the values of all the header lines, failing when any of the
    /// elements is invalid.
    fn parse_strict_list<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<Self>, HeaderValueError> {
        let mut values = Vec::new();
        for input in inputs {
            parse_line(input.as_ref(), true, &mut values)?;
        }
        Ok(values)
    }

    /// Like [`HeaderValueParser::parse_list`], but returns `None` when no
    /// value could be parsed at all.
    fn try_parse_list<S: AsRef<str>>(inputs: &[S]) -> Option<Vec<Self>> {
        let values = Self::parse_list(inputs);
        if values.is_empty() {
            None
        } else {
            Some(values)
        }
    }

    /// Like [`HeaderValueParser::parse_strict_list`], but returns `None` when
    /// an element was invalid or no value was present at all.
    fn try_parse_strict_list<S: AsRef<str>>(inputs: &[S]) -> Option<Vec<Self>> {
        match Self::parse_strict_list(inputs) {
            Ok(values) if !values.is_empty() => Some(values),
            _ => None,
        }
    }
}

fn parse_line<T: HeaderValueParser>(input: &str, strict: bool, values: &mut Vec<T>) -> Result<(), HeaderValueError> {
    let bytes = input.as_bytes();
    let mut current = skip_empty_elements(input, 0, T::SEPARATORS);

    while current < bytes.len() {
        let end = match T::parse_value_length(input, current) {
            Some((value, length)) if length > 0 => {
                let end = current + length;
                let end = end + get_whitespace_length(input, end);
                match bytes.get(end) {
                    Some(byte) if !T::SEPARATORS.contains(byte) => None,
                    _ => {
                        values.push(value);
                        Some(end)
                    }
                }
            }
            _ => None,
        };

        current = match end {
            Some(end) => end,
            None => {
                if strict {
                    return Err(HeaderValueError::InvalidFormat { kind: T::NAME });
                }

                let next = find_next_separator(input, current, T::SEPARATORS);
                trace!("Dropping invalid {} list element: {:?}", T::NAME, &input[current..next]);
                next
            }
        };

        current = skip_empty_elements(input, current, T::SEPARATORS);
    }

    Ok(())
}
