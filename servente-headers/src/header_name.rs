// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::borrow::Cow;

use phf::phf_map;
use unicase::UniCase;

/// Declares the known header names from a single table, so the variant, the
/// HTTP/1.1 form and the lowercase form can't get out of sync.
macro_rules! header_names {
    ($($variant:ident => $h1:tt, $lowercase:tt;)*) => {
        /// The name of a header field. Field names are case-insensitive, so
        /// names that aren't known are stored in lowercase.
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum HeaderName {
            Other(String),
            $($variant,)*
        }

        static STRING_TO_HEADER_NAME_MAP: phf::Map<UniCase<&'static str>, HeaderName> = phf_map!(
            $(UniCase::ascii($lowercase) => HeaderName::$variant,)*
        );

        impl HeaderName {
            #[must_use]
            pub fn to_string_h1(&self) -> &str {
                match self {
                    HeaderName::Other(str) => str,
                    $(HeaderName::$variant => $h1,)*
                }
            }

            /// # HTTP/2
            /// _RFC 9113, section 8.2 Header Fields_ states:
            /// > Field names MUST be converted to lowercase when constructing
            /// > an HTTP/2 message.
            pub fn to_string_lowercase(&self) -> Cow<'static, str> {
                match self {
                    HeaderName::Other(str) => Cow::Owned(str.to_ascii_lowercase()),
                    $(HeaderName::$variant => Cow::Borrowed($lowercase),)*
                }
            }
        }
    };
}

header_names! {
    Accept => "Accept", "accept";
    AcceptCharset => "Accept-Charset", "accept-charset";
    AcceptEncoding => "Accept-Encoding", "accept-encoding";
    AcceptLanguage => "Accept-Language", "accept-language";
    AcceptRanges => "Accept-Ranges", "accept-ranges";
    Age => "Age", "age";
    CacheControl => "Cache-Control", "cache-control";
    ContentDisposition => "Content-Disposition", "content-disposition";
    ContentEncoding => "Content-Encoding", "content-encoding";
    ContentLength => "Content-Length", "content-length";
    ContentRange => "Content-Range", "content-range";
    ContentType => "Content-Type", "content-type";
    Cookie => "Cookie", "cookie";
    Date => "Date", "date";
    ETag => "ETag", "etag";
    Expires => "Expires", "expires";
    IfMatch => "If-Match", "if-match";
    IfModifiedSince => "If-Modified-Since", "if-modified-since";
    IfNoneMatch => "If-None-Match", "if-none-match";
    IfRange => "If-Range", "if-range";
    IfUnmodifiedSince => "If-Unmodified-Since", "if-unmodified-since";
    LastModified => "Last-Modified", "last-modified";
    Pragma => "Pragma", "pragma";
    Range => "Range", "range";
    SetCookie => "Set-Cookie", "set-cookie";
    TE => "TE", "te";
    Vary => "Vary", "vary";
}

impl From<String> for HeaderName {
    fn from(mut value: String) -> Self {
        match STRING_TO_HEADER_NAME_MAP.get(&UniCase::ascii(value.as_str())) {
            Some(header_name) => header_name.clone(),
            None => {
                value.make_ascii_lowercase();
                HeaderName::Other(value)
            }
        }
    }
}

impl From<&str> for HeaderName {
    fn from(value: &str) -> Self {
        match STRING_TO_HEADER_NAME_MAP.get(&UniCase::ascii(value)) {
            Some(header_name) => header_name.clone(),
            None => HeaderName::Other(value.to_ascii_lowercase()),
        }
    }
}

impl HeaderName {
    /// Whether multiple field lines of this header can't be combined into a
    /// single comma-separated list.
    ///
    /// # References
    /// * [RFC 9110 Section 5.3](https://www.rfc-editor.org/rfc/rfc9110.html#section-5.3)
    #[must_use]
    pub fn is_list_exempt(&self) -> bool {
        matches!(self, HeaderName::SetCookie)
    }
}
