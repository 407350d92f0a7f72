// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Quality values, used for content negotiation.
//!
//! # Definition
//! ```text
//! weight = OWS ";" OWS "q=" qvalue
//! qvalue = ( "0" [ "." 0*3DIGIT ] )
//!        / ( "1" [ "." 0*3("0") ] )
//! ```
//!
//! # References
//! * [RFC 9110 Section 12.4.2](https://www.rfc-editor.org/rfc/rfc9110.html#name-quality-values)

use std::cmp::Ordering;

use crate::{
    abnf,
    HeaderValueError,
    MediaTypeHeaderValue,
};

pub const QUALITY_PARAMETER_NAME: &str = "q";

/// `1.000` is the longest valid quality value.
pub const QUALITY_VALUE_MAX_CHARACTERS: usize = 5;

pub const MAX_QUALITY_FRACTION_DIGITS: usize = 3;

/// Parses a `qvalue` at `start`, returning the value and its length.
///
/// The grammar is a bit more lenient than the definition: any fraction is
/// accepted as long as the result isn't larger than `1`.
pub fn parse_quality_value(input: &str, start: usize) -> Option<(f64, usize)> {
    let bytes = input.as_bytes();
    let limit = start + QUALITY_VALUE_MAX_CHARACTERS;

    let mut current = start;
    let integer = match bytes.get(current) {
        Some(byte @ (b'0' | b'1')) => byte - b'0',
        _ => return None,
    };
    current += 1;

    let mut fraction: u32 = 0;
    let mut divisor: u32 = 1;
    if bytes.get(current) == Some(&b'.') {
        current += 1;
        while current < limit {
            let Some(digit) = bytes.get(current).copied().and_then(abnf::parse_digit) else {
                break;
            };

            fraction = fraction * 10 + u32::from(digit);
            divisor *= 10;
            current += 1;
        }
    }

    // More digits than allowed
    if bytes.get(current).copied().is_some_and(abnf::is_digit) {
        return None;
    }

    let quality = f64::from(integer) + f64::from(fraction) / f64::from(divisor);
    if quality > 1.0 {
        return None;
    }

    Some((quality, current - start))
}

/// Formats a quality value with at least one and at most three fractional
/// digits, rounding the value when necessary.
pub fn format_quality(quality: f64) -> Result<String, HeaderValueError> {
    validate_quality(quality)?;

    let mut formatted = format!("{quality:.precision$}", precision = MAX_QUALITY_FRACTION_DIGITS);
    while formatted.ends_with('0') && !formatted.ends_with(".0") {
        formatted.pop();
    }

    Ok(formatted)
}

/// Rounds the quality to the value its formatted form parses back to.
pub fn round_quality(quality: f64) -> Result<f64, HeaderValueError> {
    let formatted = format_quality(quality)?;
    match parse_quality_value(&formatted, 0) {
        Some((rounded, length)) if length == formatted.len() => Ok(rounded),
        _ => Err(HeaderValueError::OutOfRange { field: "quality" }),
    }
}

pub fn validate_quality(quality: f64) -> Result<(), HeaderValueError> {
    if (0.0..=1.0).contains(&quality) {
        Ok(())
    } else {
        Err(HeaderValueError::OutOfRange { field: "quality" })
    }
}

/// A value that carries an optional quality.
pub trait Weighted {
    /// The quality, `None` when it wasn't specified.
    fn quality(&self) -> Option<f64>;

    /// The quality, defaulting to `1.0`.
    fn effective_quality(&self) -> f64 {
        self.quality().unwrap_or(1.0)
    }
}

/// Orders values by descending quality. Values with an equal quality compare
/// equal, so a stable sort keeps their original order.
pub fn compare_by_quality<T: Weighted>(a: &T, b: &T) -> Ordering {
    b.effective_quality().total_cmp(&a.effective_quality())
}

/// Sorts the values by descending quality, keeping the order of values with
/// the same quality.
pub fn sort_by_quality<T: Weighted>(values: &mut [T]) {
    values.sort_by(compare_by_quality);
}

/// Orders media types from most to least preferred: descending quality,
/// then the more specific range first (`text/plain` before `text/*` before
/// `*/*`), then the range with more parameters first.
///
/// # References
/// * [RFC 9110 Section 12.5.1](https://www.rfc-editor.org/rfc/rfc9110.html#name-accept)
pub fn compare_media_type_preference(a: &MediaTypeHeaderValue, b: &MediaTypeHeaderValue) -> Ordering {
    fn specificity(media_type: &MediaTypeHeaderValue) -> u8 {
        if media_type.matches_all_types() {
            0
        } else if media_type.matches_all_sub_types() {
            1
        } else {
            2
        }
    }

    fn parameter_count(media_type: &MediaTypeHeaderValue) -> usize {
        media_type.parameters().iter()
            .filter(|parameter| !parameter.has_name(QUALITY_PARAMETER_NAME))
            .count()
    }

    compare_by_quality(a, b)
        .then_with(|| specificity(b).cmp(&specificity(a)))
        .then_with(|| parameter_count(b).cmp(&parameter_count(a)))
}
