// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
    time::{Duration, SystemTime},
};

use phf::phf_map;
use strum_macros::AsRefStr;
use unicase::UniCase;

use crate::{
    date::{format_date, parse_date, validate_date},
    header_value::cookie::{parse_cookie_pair, validate_cookie_value},
    log::trace,
    syntax::{
        get_number_length,
        get_token_length,
        get_whitespace_length,
        is_whitespace_character,
        try_parse_non_negative_i64,
        validate_token,
    },
    HeaderValueError,
    HeaderValueParser,
};

/// The `SameSite` attribute of a cookie.
///
/// # References
/// * [RFC 6265bis Section 4.1.2.7](https://datatracker.ietf.org/doc/html/draft-ietf-httpbis-rfc6265bis#section-4.1.2.7)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum SameSiteMode {
    /// The attribute is absent, or its value wasn't recognized.
    #[default]
    Unspecified,
    None,
    Lax,
    Strict,
}

static SAME_SITE_MODES: phf::Map<UniCase<&'static str>, SameSiteMode> = phf_map!(
    UniCase::ascii("none") => SameSiteMode::None,
    UniCase::ascii("lax") => SameSiteMode::Lax,
    UniCase::ascii("strict") => SameSiteMode::Strict,
);

impl SameSiteMode {
    /// Unknown modes are treated as if the attribute is absent, as browsers
    /// do.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        SAME_SITE_MODES.get(&UniCase::ascii(name)).copied().unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Attribute {
    Expires,
    MaxAge,
    Domain,
    Path,
    Secure,
    HttpOnly,
    SameSite,
}

static ATTRIBUTES: phf::Map<UniCase<&'static str>, Attribute> = phf_map!(
    UniCase::ascii("expires") => Attribute::Expires,
    UniCase::ascii("max-age") => Attribute::MaxAge,
    UniCase::ascii("domain") => Attribute::Domain,
    UniCase::ascii("path") => Attribute::Path,
    UniCase::ascii("secure") => Attribute::Secure,
    UniCase::ascii("httponly") => Attribute::HttpOnly,
    UniCase::ascii("samesite") => Attribute::SameSite,
);

/// The value of a `Set-Cookie` response header: a cookie and its attributes.
///
/// ```text
/// set-cookie-string = cookie-pair *( ";" SP cookie-av )
/// cookie-av         = expires-av / max-age-av / domain-av /
///                     path-av / secure-av / httponly-av /
///                     samesite-av / extension-av
/// ```
///
/// # References
/// * [RFC 6265 Section 4.1](https://www.rfc-editor.org/rfc/rfc6265.html#section-4.1)
#[derive(Clone, Debug)]
pub struct SetCookieHeaderValue {
    name: String,
    value: String,
    expires: Option<SystemTime>,
    max_age: Option<Duration>,
    domain: Option<String>,
    path: Option<String>,
    secure: bool,
    same_site: SameSiteMode,
    http_only: bool,
    extensions: Vec<String>,
}

impl SetCookieHeaderValue {
    /// Creates a cookie with an empty value.
    pub fn new(name: &str) -> Result<Self, HeaderValueError> {
        Self::with_value(name, "")
    }

    pub fn with_value(name: &str, value: &str) -> Result<Self, HeaderValueError> {
        validate_token(name)?;
        validate_cookie_value(value)?;
        Ok(Self::new_unchecked(name, value))
    }

    fn new_unchecked(name: &str, value: &str) -> Self {
        Self {
            name: name.to_owned(),
            value: value.to_owned(),
            expires: None,
            max_age: None,
            domain: None,
            path: None,
            secure: false,
            same_site: SameSiteMode::Unspecified,
            http_only: false,
            extensions: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), HeaderValueError> {
        validate_token(name)?;
        self.name = name.to_owned();
        Ok(())
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: &str) -> Result<(), HeaderValueError> {
        validate_cookie_value(value)?;
        self.value = value.to_owned();
        Ok(())
    }

    #[must_use]
    pub fn expires(&self) -> Option<SystemTime> {
        self.expires
    }

    /// Sets the expiry date. The fraction of a second is dropped, and dates
    /// that don't have a four-digit year are rejected.
    pub fn set_expires(&mut self, expires: Option<SystemTime>) -> Result<(), HeaderValueError> {
        self.expires = expires.map(validate_date).transpose()?;
        Ok(())
    }

    /// The lifetime of the cookie, with a precision of seconds.
    #[must_use]
    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Sets the lifetime of the cookie, dropping the fraction of a second.
    pub fn set_max_age(&mut self, max_age: Option<Duration>) -> Result<(), HeaderValueError> {
        self.max_age = match max_age {
            Some(max_age) if i64::try_from(max_age.as_secs()).is_err() => {
                return Err(HeaderValueError::OutOfRange { field: "max-age" });
            }
            Some(max_age) => Some(Duration::from_secs(max_age.as_secs())),
            None => None,
        };
        Ok(())
    }

    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn set_domain(&mut self, domain: Option<&str>) -> Result<(), HeaderValueError> {
        self.domain = validate_attribute_value(domain)?;
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: Option<&str>) -> Result<(), HeaderValueError> {
        self.path = validate_attribute_value(path)?;
        Ok(())
    }

    #[must_use]
    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn set_secure(&mut self, secure: bool) {
        self.secure = secure;
    }

    #[must_use]
    pub fn same_site(&self) -> SameSiteMode {
        self.same_site
    }

    pub fn set_same_site(&mut self, same_site: SameSiteMode) {
        self.same_site = same_site;
    }

    #[must_use]
    pub fn http_only(&self) -> bool {
        self.http_only
    }

    pub fn set_http_only(&mut self, http_only: bool) {
        self.http_only = http_only;
    }

    /// The attributes that aren't known, in their original form, e.g.
    /// `priority=high`.
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Adds an attribute that isn't known, e.g. `priority=high`. It must start
    /// with a token that isn't the name of a known attribute.
    pub fn add_extension(&mut self, extension: &str) -> Result<(), HeaderValueError> {
        if extension.is_empty() {
            return Err(HeaderValueError::Empty);
        }

        let name_length = get_token_length(extension, 0);
        if name_length == 0 || ATTRIBUTES.contains_key(&UniCase::ascii(&extension[..name_length])) {
            return Err(HeaderValueError::InvalidFormat { kind: "cookie attribute" });
        }

        if let Some(extension) = validate_attribute_value(Some(extension))? {
            self.extensions.push(extension);
        }
        Ok(())
    }

    pub fn clear_extensions(&mut self) {
        self.extensions.clear();
    }
}

/// Attribute values may contain anything but controls, `;` and `,`, and
/// can't start or end with whitespace, as the parser trims it.
fn validate_attribute_value(value: Option<&str>) -> Result<Option<String>, HeaderValueError> {
    let Some(value) = value else {
        return Ok(None);
    };

    if value.bytes().any(|byte| matches!(byte, b';' | b',') || byte.is_ascii_control())
            || value.starts_with(is_whitespace_character)
            || value.ends_with(is_whitespace_character) {
        return Err(HeaderValueError::InvalidFormat { kind: "cookie attribute" });
    }

    Ok(Some(value.to_owned()))
}

/// Reads up to the next `;`, or up to the next `;` or `,` when
/// `include_comma` is set. The result is trimmed.
fn read_attribute_value(input: &str, start: usize, include_comma: bool) -> (&str, usize) {
    let rest = &input[start..];
    let end = rest.bytes()
        .position(|byte| byte == b';' || (include_comma && byte == b','))
        .unwrap_or(rest.len());

    (rest[..end].trim_matches(is_whitespace_character), end)
}

/// Dates contain a comma themselves (`Sun, 06 Nov 1994 08:49:37 GMT`), so the
/// date is read up to the `;`. When that isn't a valid date, the value is
/// probably followed by another cookie of a comma-separated list, so the
/// longest prefix that ends at a comma and is a valid date is used instead.
fn read_expires(input: &str, start: usize) -> Option<(SystemTime, usize)> {
    let (value, length) = read_attribute_value(input, start, false);
    if let Some(date) = parse_date(value) {
        return Some((date, length));
    }

    let candidate = &input[start..start + length];
    candidate.char_indices()
        .filter(|(_, character)| *character == ',')
        .map(|(index, _)| index)
        .rev()
        .find_map(|end| parse_date(&candidate[..end]).map(|date| (date, end)))
}

impl HeaderValueParser for SetCookieHeaderValue {
    const NAME: &'static str = "set-cookie";

    fn parse_value_length(input: &str, start: usize) -> Option<(Self, usize)> {
        let bytes = input.as_bytes();

        let (name, value, length) = parse_cookie_pair(input, start)?;
        let mut cookie = Self::new_unchecked(name, value);
        let mut current = start + length;

        loop {
            current += get_whitespace_length(input, current);
            match bytes.get(current) {
                None | Some(b',') => break,
                Some(b';') => current += 1,
                Some(_) => return None,
            }
            current += get_whitespace_length(input, current);

            let attribute_length = get_token_length(input, current);
            if attribute_length == 0 {
                // A trailing ';' ends the cookie.
                break;
            }

            let attribute_start = current;
            let attribute_name = &input[current..current + attribute_length];
            current += attribute_length;

            let Some(attribute) = ATTRIBUTES.get(&UniCase::ascii(attribute_name)).copied() else {
                let (_, length) = read_attribute_value(input, current, true);
                current += length;
                let extension = input[attribute_start..current].trim_end_matches(is_whitespace_character);
                cookie.extensions.push(extension.to_owned());
                continue;
            };

            match attribute {
                Attribute::Secure => cookie.secure = true,
                Attribute::HttpOnly => cookie.http_only = true,
                Attribute::SameSite => {
                    cookie.same_site = if bytes.get(current) == Some(&b'=') {
                        current += 1;
                        let (mode, length) = read_attribute_value(input, current, true);
                        current += length;
                        SameSiteMode::from_name(mode)
                    } else {
                        SameSiteMode::Unspecified
                    };
                }
                Attribute::Expires | Attribute::MaxAge | Attribute::Domain | Attribute::Path => {
                    if bytes.get(current) != Some(&b'=') {
                        return None;
                    }
                    current += 1;

                    match attribute {
                        Attribute::Expires => {
                            let Some((expires, length)) = read_expires(input, current) else {
                                trace!("Invalid expires attribute in set-cookie: {:?}", &input[start..]);
                                return None;
                            };
                            cookie.expires = Some(expires);
                            current += length;
                        }
                        Attribute::MaxAge => {
                            let length = get_number_length(input, current, false);
                            let seconds = try_parse_non_negative_i64(&input[current..current + length])?;
                            cookie.max_age = Some(Duration::from_secs(seconds.unsigned_abs()));
                            current += length;
                        }
                        Attribute::Domain => {
                            let (domain, length) = read_attribute_value(input, current, true);
                            cookie.domain = Some(domain.to_owned());
                            current += length;
                        }
                        _ => {
                            let (path, length) = read_attribute_value(input, current, true);
                            cookie.path = Some(path.to_owned());
                            current += length;
                        }
                    }
                }
            }
        }

        Some((cookie, current - start))
    }
}

impl Display for SetCookieHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;

        if let Some(expires) = self.expires {
            write!(f, "; expires={}", format_date(expires, false))?;
        }

        if let Some(max_age) = self.max_age {
            write!(f, "; max-age={}", max_age.as_secs())?;
        }

        if let Some(domain) = &self.domain {
            write!(f, "; domain={domain}")?;
        }

        if let Some(path) = &self.path {
            write!(f, "; path={path}")?;
        }

        if self.secure {
            f.write_str("; secure")?;
        }

        if self.same_site != SameSiteMode::Unspecified {
            write!(f, "; samesite={}", self.same_site.as_ref())?;
        }

        if self.http_only {
            f.write_str("; httponly")?;
        }

        for extension in &self.extensions {
            write!(f, "; {extension}")?;
        }

        Ok(())
    }
}

impl PartialEq for SetCookieHeaderValue {
    fn eq(&self, other: &Self) -> bool {
        let eq_ignore_case = |a: &Option<String>, b: &Option<String>| {
            a.as_deref().map(UniCase::ascii) == b.as_deref().map(UniCase::ascii)
        };

        UniCase::ascii(&self.name) == UniCase::ascii(&other.name)
            && self.value == other.value
            && self.expires == other.expires
            && self.max_age == other.max_age
            && eq_ignore_case(&self.domain, &other.domain)
            && eq_ignore_case(&self.path, &other.path)
            && self.secure == other.secure
            && self.same_site == other.same_site
            && self.http_only == other.http_only
            && self.extensions.len() == other.extensions.len()
            && self.extensions.iter().zip(&other.extensions)
                .all(|(a, b)| UniCase::ascii(a) == UniCase::ascii(b))
    }
}

impl Eq for SetCookieHeaderValue {}

impl Hash for SetCookieHeaderValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        UniCase::ascii(self.name.as_str()).hash(state);
        self.value.hash(state);
        self.expires.hash(state);
        self.max_age.hash(state);
        self.domain.as_deref().map(UniCase::ascii).hash(state);
        self.path.as_deref().map(UniCase::ascii).hash(state);
        self.secure.hash(state);
        self.same_site.hash(state);
        self.http_only.hash(state);
        for extension in &self.extensions {
            UniCase::ascii(extension.as_str()).hash(state);
        }
    }
}
