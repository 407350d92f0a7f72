// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    borrow::Cow,
    time::{Duration, SystemTime},
};

use crate::{
    CacheControlHeaderValue,
    ContentRangeHeaderValue,
    CookieHeaderValue,
    EntityTagHeaderValue,
    HeaderName,
    HeaderValue,
    HeaderValueError,
    HeaderValueParser,
    MediaTypeHeaderValue,
    SetCookieHeaderValue,
};

/// Gives access to the raw values of the header lines of a message, in the
/// order they were received.
pub trait RawHeaderValues {
    fn raw_header_values(&self, header_name: &HeaderName) -> Vec<Cow<'_, str>>;
}

/// An order-preserving list of headers. Names are case-insensitive, because
/// [`HeaderName`] stores unknown names in lowercase.
#[derive(Clone, Debug, Default)]
pub struct HeaderMap {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderMap {
    pub fn new() -> HeaderMap {
        HeaderMap::default()
    }

    pub fn new_with_vec(headers: Vec<(HeaderName, HeaderValue)>) -> HeaderMap {
        HeaderMap { headers }
    }

    /// Appends a header to the list of headers. This is used for headers that
    /// can be duplicated, such as `Set-Cookie`, or for request headers that
    /// were received in multiple lines.
    pub fn append_possible_duplicate(&mut self, header_name: HeaderName, value: HeaderValue) {
        self.headers.push((header_name, value));
    }

    #[must_use]
    pub fn contains(&self, header_name: &HeaderName) -> bool {
        self.headers.iter().any(|(name, _)| name == header_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns the first value of the header.
    #[must_use]
    pub fn get(&self, header_name: &HeaderName) -> Option<&HeaderValue> {
        self.get_all(header_name).next()
    }

    pub fn get_all(&self, header_name: &HeaderName) -> impl Iterator<Item = &HeaderValue> {
        let header_name = header_name.clone();
        self.headers.iter()
            .filter(move |(name, _)| *name == header_name)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(HeaderName, HeaderValue)> {
        self.headers.iter()
    }

    pub fn remove(&mut self, header_name: &HeaderName) {
        self.headers.retain(|(name, _)| name != header_name);
    }

    /// Replaces the first value of the header, or appends it when it isn't
    /// present yet. Other lines of the same header are removed.
    pub fn set(&mut self, header_name: HeaderName, value: HeaderValue) {
        match self.headers.iter().position(|(name, _)| name == &header_name) {
            Some(index) => {
                self.headers[index].1 = value;
                let mut current = 0;
                self.headers.retain(|(name, _)| {
                    current += 1;
                    current - 1 <= index || name != &header_name
                });
            }
            None => self.headers.push((header_name, value)),
        }
    }

    /// Parses the header as a single value. Multiple lines are combined into
    /// one comma-separated line first, except for headers that can't be
    /// combined, of which only the first line is used.
    ///
    /// # References
    /// * [RFC 9110 Section 5.3](https://www.rfc-editor.org/rfc/rfc9110.html#section-5.3)
    pub fn get_parsed<T: HeaderValueParser>(&self, header_name: &HeaderName) -> Result<T, HeaderValueError> {
        let values = self.raw_header_values(header_name);
        match values.as_slice() {
            [] => Err(HeaderValueError::Empty),
            [value] => T::parse(value),
            [value, ..] if header_name.is_list_exempt() => T::parse(value),
            values => T::parse(&values.join(", ")),
        }
    }

    /// Parses all lines of the header as a list, dropping invalid elements.
    pub fn get_list<T: HeaderValueParser>(&self, header_name: &HeaderName) -> Vec<T> {
        T::parse_list(&self.raw_header_values(header_name))
    }

    /// Parses all lines of the header as a list, failing when any element is
    /// invalid.
    pub fn get_strict_list<T: HeaderValueParser>(&self, header_name: &HeaderName) -> Result<Vec<T>, HeaderValueError> {
        T::parse_strict_list(&self.raw_header_values(header_name))
    }
}

impl RawHeaderValues for HeaderMap {
    fn raw_header_values(&self, header_name: &HeaderName) -> Vec<Cow<'_, str>> {
        self.get_all(header_name)
            .map(|value| match value.as_str_no_convert() {
                Some(string) => Cow::Borrowed(string),
                None => Cow::Owned(value.to_string()),
            })
            .collect()
    }
}

#[must_use]
pub fn format_system_time_as_weak_etag(date_time: SystemTime) -> EntityTagHeaderValue {
    let seconds = date_time.duration_since(SystemTime::UNIX_EPOCH).unwrap_or(Duration::default()).as_secs();
    match EntityTagHeaderValue::with_weakness(&format!("\"{seconds:X}\""), true) {
        Ok(entity_tag) => entity_tag,
        Err(_) => EntityTagHeaderValue::any(),
    }
}

//
// Header-specific methods
//
impl HeaderMap {
    /// Returns the typed `Cache-Control` value, combining all lines.
    #[must_use]
    pub fn cache_control(&self) -> Option<CacheControlHeaderValue> {
        match self.get(&HeaderName::CacheControl) {
            Some(HeaderValue::CacheControl(value)) => Some(value.clone()),
            Some(_) => self.get_parsed(&HeaderName::CacheControl).ok(),
            None => None,
        }
    }

    #[must_use]
    pub fn content_type(&self) -> Option<MediaTypeHeaderValue> {
        match self.get(&HeaderName::ContentType) {
            Some(HeaderValue::MediaType(media_type)) => Some(media_type.clone()),
            Some(_) => self.get_parsed(&HeaderName::ContentType).ok(),
            None => None,
        }
    }

    /// The cookies of the request, from all `Cookie` lines.
    #[must_use]
    pub fn cookies(&self) -> Vec<CookieHeaderValue> {
        self.get_list(&HeaderName::Cookie)
    }

    /// The entity tags of `If-None-Match`. Returns `None` when the header is
    /// absent or malformed, in which case the condition must be ignored.
    #[must_use]
    pub fn if_none_match(&self) -> Option<Vec<EntityTagHeaderValue>> {
        EntityTagHeaderValue::try_parse_strict_list(&self.raw_header_values(&HeaderName::IfNoneMatch))
    }

    pub fn add_set_cookie(&mut self, cookie: SetCookieHeaderValue) {
        self.append_possible_duplicate(HeaderName::SetCookie, HeaderValue::SetCookie(cookie));
    }

    pub fn set_cache_control(&mut self, cache_control: CacheControlHeaderValue) {
        self.set(HeaderName::CacheControl, HeaderValue::CacheControl(cache_control));
    }

    pub fn set_content_length(&mut self, length: usize) {
        self.set(HeaderName::ContentLength, HeaderValue::Size(length));
    }

    pub fn set_content_range(&mut self, range: ContentRangeHeaderValue) {
        self.set(HeaderName::ContentRange, HeaderValue::ContentRange(range));
    }

    pub fn set_content_type(&mut self, media_type: MediaTypeHeaderValue) {
        self.set(HeaderName::ContentType, HeaderValue::MediaType(media_type));
    }

    /// Sets the `Last-Modified` header, and a weak `ETag` derived from it
    /// when no entity tag is present yet.
    pub fn set_last_modified(&mut self, date_time: SystemTime) {
        self.set(HeaderName::LastModified, HeaderValue::DateTime(date_time));
        if !self.contains(&HeaderName::ETag) {
            self.set(HeaderName::ETag, format_system_time_as_weak_etag(date_time).into());
        }
    }
}
