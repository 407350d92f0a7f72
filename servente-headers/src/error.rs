// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use strum_macros::AsRefStr;

/// An error that can occur while parsing, constructing or modifying a header
/// value.
///
/// The variants fall in two kinds: the input has the wrong shape (see
/// [`HeaderValueError::is_format_error`]), or a value has the right shape
/// but lies outside of the domain of the field (see
/// [`HeaderValueError::is_range_error`]).
///
/// Values that are grammatically valid but can't be decoded, for example an
/// RFC 5987 `filename*` parameter with an unknown charset, aren't errors at
/// all: the accessors return `None` instead.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, AsRefStr, thiserror::Error)]
pub enum HeaderValueError {
    /// The value was empty, or consisted only of whitespace.
    #[error("the header value is empty")]
    Empty,

    /// A whole header value of the given kind didn't match its grammar.
    ///
    /// ## Example:
    /// ```text
    /// Content-Type: text/plain,
    /// ```
    #[error("invalid {kind} header value")]
    InvalidFormat {
        kind: &'static str,
    },

    /// A value that should be a `token` contained delimiters, whitespace or
    /// non-visible characters.
    #[error("the value is not a valid token")]
    InvalidToken,

    /// A value that should be a `quoted-string` wasn't enclosed in quotes,
    /// or contained an unescaped quote.
    #[error("the value is not a valid quoted-string")]
    InvalidQuotedString,

    /// The value of a parameter was neither a `token` nor a `quoted-string`.
    ///
    /// ## Example:
    /// ```text
    /// custom=value with spaces
    /// ```
    #[error("the parameter value is neither a token nor a quoted-string")]
    InvalidParameterValue,

    /// The value of a cookie contained characters outside of `cookie-octet`.
    #[error("the cookie value contains invalid characters")]
    InvalidCookieValue,

    /// The entity tag wasn't a `quoted-string`, or a weak tag was `*`.
    #[error("the entity tag is invalid")]
    InvalidEntityTag,

    /// The media type wasn't exactly `type "/" subtype`.
    #[error("the media type is invalid")]
    InvalidMediaType,

    /// A numeric field is syntactically valid, but outside of the range the
    /// field allows.
    ///
    /// ## Examples:
    /// ```text
    /// q=1.5
    /// bytes=500-100
    /// ```
    #[error("the {field} is out of range")]
    OutOfRange {
        field: &'static str,
    },
}

impl HeaderValueError {
    /// The input violated the grammar of the header.
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        !self.is_range_error()
    }

    /// The input had a valid shape, but a value outside of its domain.
    #[must_use]
    pub fn is_range_error(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}
