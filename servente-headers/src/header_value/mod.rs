// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

pub mod cache_control;
pub mod content_disposition;
pub mod content_range;
pub mod cookie;
pub mod entity_tag;
pub mod media_type;
pub mod range;
pub mod range_condition;
pub mod set_cookie;
pub mod string_with_quality;

pub use cache_control::CacheControlHeaderValue;
pub use content_disposition::ContentDispositionHeaderValue;
pub use content_range::ContentRangeHeaderValue;
pub use cookie::CookieHeaderValue;
pub use entity_tag::EntityTagHeaderValue;
pub use media_type::MediaTypeHeaderValue;
pub use range::{RangeHeaderValue, RangeItemHeaderValue};
pub use range_condition::RangeConditionHeaderValue;
pub use set_cookie::{SameSiteMode, SetCookieHeaderValue};
pub use string_with_quality::StringWithQualityHeaderValue;

use std::{
    fmt::{Display, Write},
    sync::Arc,
    time::SystemTime,
};

use crate::{
    date::{format_date, parse_date},
    HeaderValueError,
};

/// Writes a header value into a message that is being built, without
/// allocating an intermediate `String`.
pub trait AppendToMessage {
    fn append_to_message(&self, message: &mut String);
}

impl<T: Display + ?Sized> AppendToMessage for T {
    fn append_to_message(&self, message: &mut String) {
        // Writing into a `String` can't fail.
        _ = write!(message, "{self}");
    }
}

/// Represents a value of a header.
///
/// This makes transforming the response easier for shared code paths, for
/// example when the header is used in multiple places, this avoids
/// serializing and deserializing.
///
/// Values received from the transport are strings, the typed variants are
/// produced by handlers and only serialized when the message is written.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HeaderValue {
    SharedString(Arc<str>),
    StaticString(&'static str),
    String(String),
    CacheControl(CacheControlHeaderValue),
    ContentDisposition(ContentDispositionHeaderValue),
    ContentRange(ContentRangeHeaderValue),
    Cookie(CookieHeaderValue),
    DateTime(SystemTime),
    EntityTag(EntityTagHeaderValue),
    MediaType(MediaTypeHeaderValue),
    Range(RangeHeaderValue),
    RangeCondition(RangeConditionHeaderValue),
    SetCookie(SetCookieHeaderValue),
    Size(usize),
    StringWithQuality(StringWithQualityHeaderValue),
}

impl HeaderValue {
    /// Returns the value as a string, but does not convert it to a string if
    /// it is some other non-convertible type.
    #[must_use]
    pub fn as_str_no_convert(&self) -> Option<&str> {
        match self {
            HeaderValue::StaticString(string) => Some(string),
            HeaderValue::SharedString(string) => Some(string.as_ref()),
            HeaderValue::String(string) => Some(string),
            _ => None,
        }
    }

    pub fn append_to_message(&self, message: &mut String) {
        match self {
            HeaderValue::SharedString(string) => message.push_str(string),
            HeaderValue::StaticString(string) => message.push_str(string),
            HeaderValue::String(string) => message.push_str(string),
            HeaderValue::CacheControl(value) => value.append_to_message(message),
            HeaderValue::ContentDisposition(value) => value.append_to_message(message),
            HeaderValue::ContentRange(value) => value.append_to_message(message),
            HeaderValue::Cookie(value) => value.append_to_message(message),
            HeaderValue::DateTime(date_time) => message.push_str(&format_date(*date_time, false)),
            HeaderValue::EntityTag(value) => value.append_to_message(message),
            HeaderValue::MediaType(value) => value.append_to_message(message),
            HeaderValue::Range(value) => value.append_to_message(message),
            HeaderValue::RangeCondition(value) => value.append_to_message(message),
            HeaderValue::SetCookie(value) => value.append_to_message(message),
            HeaderValue::Size(size) => _ = write!(message, "{size}"),
            HeaderValue::StringWithQuality(value) => value.append_to_message(message),
        }
    }

    /// Get the header in string form.
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> String {
        let mut result = String::new();
        self.append_to_message(&mut result);
        result
    }

    /// Parses the value as a number.
    #[must_use]
    pub fn parse_number(&self) -> Option<usize> {
        match self {
            HeaderValue::StaticString(string) => string.parse().ok(),
            HeaderValue::SharedString(string) => string.parse().ok(),
            HeaderValue::String(string) => string.parse().ok(),
            HeaderValue::Size(size) => Some(*size),
            _ => None,
        }
    }

    /// Calculate the length of the header value in string characters.
    pub fn string_length(&self) -> usize {
        // Fast path, when the type is a string, or can easily be mapped into
        // one:
        if let Some(string) = self.as_str_no_convert() {
            return string.len();
        }

        if let HeaderValue::MediaType(media_type) = self {
            if media_type.parameters().is_empty() {
                return media_type.media_type().len();
            }
        }

        // Otherwise slow path, format it into a new string and get the length
        // of the string after formatting.
        let mut tmp_str = String::new();
        self.append_to_message(&mut tmp_str);
        tmp_str.len()
    }
}

impl From<Arc<str>> for HeaderValue {
    fn from(value: Arc<str>) -> Self {
        HeaderValue::SharedString(value)
    }
}

impl From<&'static str> for HeaderValue {
    fn from(string: &'static str) -> HeaderValue {
        HeaderValue::StaticString(string)
    }
}

impl From<String> for HeaderValue {
    fn from(string: String) -> HeaderValue {
        HeaderValue::String(string)
    }
}

impl From<SystemTime> for HeaderValue {
    fn from(date_time: SystemTime) -> HeaderValue {
        HeaderValue::DateTime(date_time)
    }
}

impl From<usize> for HeaderValue {
    fn from(size: usize) -> HeaderValue {
        HeaderValue::Size(size)
    }
}

macro_rules! impl_from_typed_value {
    ($($variant:ident($type:ty)),* $(,)?) => {
        $(
            impl From<$type> for HeaderValue {
                fn from(value: $type) -> HeaderValue {
                    HeaderValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_typed_value!(
    CacheControl(CacheControlHeaderValue),
    ContentDisposition(ContentDispositionHeaderValue),
    ContentRange(ContentRangeHeaderValue),
    Cookie(CookieHeaderValue),
    EntityTag(EntityTagHeaderValue),
    MediaType(MediaTypeHeaderValue),
    Range(RangeHeaderValue),
    RangeCondition(RangeConditionHeaderValue),
    SetCookie(SetCookieHeaderValue),
    StringWithQuality(StringWithQualityHeaderValue),
);

impl TryFrom<&HeaderValue> for SystemTime {
    type Error = HeaderValueError;

    fn try_from(value: &HeaderValue) -> Result<SystemTime, Self::Error> {
        const ERROR: HeaderValueError = HeaderValueError::InvalidFormat { kind: "date" };

        match value {
            HeaderValue::DateTime(date_time) => Ok(*date_time),
            HeaderValue::RangeCondition(condition) => condition.last_modified().ok_or(ERROR),
            _ => value.as_str_no_convert().and_then(parse_date).ok_or(ERROR),
        }
    }
}
