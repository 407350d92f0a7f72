// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! The `Cache-Control` header.
//!
//! ```text
//! Cache-Control   = #cache-directive
//! cache-directive = token [ "=" ( token / quoted-string ) ]
//! ```
//!
//! # References
//! * [RFC 9111 Section 5.2](https://www.rfc-editor.org/rfc/rfc9111.html#name-cache-control)

use std::{
    collections::hash_map::DefaultHasher,
    fmt::{self, Display},
    hash::{Hash, Hasher},
    time::Duration,
};

use phf::phf_map;
use unicase::UniCase;

use crate::{
    lists::{skip_empty_elements, split_list},
    parameters::{NameValueHeaderValue, Parameters},
    syntax::{
        is_quoted,
        is_token,
        try_parse_non_negative_i32,
        try_parse_non_negative_i64,
        unescape_as_quoted_string,
        validate_token,
    },
    HeaderValueError,
    HeaderValueParser,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Directive {
    NoCache,
    NoStore,
    MaxAge,
    SharedMaxAge,
    MaxStale,
    MinFresh,
    NoTransform,
    OnlyIfCached,
    Public,
    Private,
    MustRevalidate,
    ProxyRevalidate,
}

static DIRECTIVES: phf::Map<UniCase<&'static str>, Directive> = phf_map!(
    UniCase::ascii("no-cache") => Directive::NoCache,
    UniCase::ascii("no-store") => Directive::NoStore,
    UniCase::ascii("max-age") => Directive::MaxAge,
    UniCase::ascii("s-maxage") => Directive::SharedMaxAge,
    UniCase::ascii("max-stale") => Directive::MaxStale,
    UniCase::ascii("min-fresh") => Directive::MinFresh,
    UniCase::ascii("no-transform") => Directive::NoTransform,
    UniCase::ascii("only-if-cached") => Directive::OnlyIfCached,
    UniCase::ascii("public") => Directive::Public,
    UniCase::ascii("private") => Directive::Private,
    UniCase::ascii("must-revalidate") => Directive::MustRevalidate,
    UniCase::ascii("proxy-revalidate") => Directive::ProxyRevalidate,
);

/// The directives of a `Cache-Control` header. Directives that aren't known
/// are kept as extensions.
#[derive(Clone, Debug, Default)]
pub struct CacheControlHeaderValue {
    no_cache: bool,
    no_cache_headers: Vec<String>,
    no_store: bool,
    max_age: Option<Duration>,
    shared_max_age: Option<Duration>,
    max_stale: bool,
    max_stale_limit: Option<Duration>,
    min_fresh: Option<Duration>,
    no_transform: bool,
    only_if_cached: bool,
    public: bool,
    private: bool,
    private_headers: Vec<String>,
    must_revalidate: bool,
    proxy_revalidate: bool,
    extensions: Parameters,
}

impl CacheControlHeaderValue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn no_cache(&self) -> bool {
        self.no_cache
    }

    /// Clearing `no-cache` also clears its field names.
    pub fn set_no_cache(&mut self, no_cache: bool) {
        self.no_cache = no_cache;
        if !no_cache {
            self.no_cache_headers.clear();
        }
    }

    /// The field names of `no-cache="..."`.
    #[must_use]
    pub fn no_cache_headers(&self) -> &[String] {
        &self.no_cache_headers
    }

    /// Adds a field name to `no-cache="..."`, which also enables `no-cache`.
    pub fn add_no_cache_header(&mut self, header: &str) -> Result<(), HeaderValueError> {
        validate_token(header)?;
        self.no_cache = true;
        self.no_cache_headers.push(header.to_owned());
        Ok(())
    }

    #[must_use]
    pub fn no_store(&self) -> bool {
        self.no_store
    }

    pub fn set_no_store(&mut self, no_store: bool) {
        self.no_store = no_store;
    }

    #[must_use]
    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    pub fn set_max_age(&mut self, max_age: Option<Duration>) -> Result<(), HeaderValueError> {
        self.max_age = validate_delta_seconds(max_age, "max-age")?;
        Ok(())
    }

    /// The `s-maxage` directive.
    #[must_use]
    pub fn shared_max_age(&self) -> Option<Duration> {
        self.shared_max_age
    }

    pub fn set_shared_max_age(&mut self, shared_max_age: Option<Duration>) -> Result<(), HeaderValueError> {
        self.shared_max_age = validate_delta_seconds(shared_max_age, "s-maxage")?;
        Ok(())
    }

    #[must_use]
    pub fn max_stale(&self) -> bool {
        self.max_stale
    }

    pub fn set_max_stale(&mut self, max_stale: bool) {
        self.max_stale = max_stale;
        if !max_stale {
            self.max_stale_limit = None;
        }
    }

    #[must_use]
    pub fn max_stale_limit(&self) -> Option<Duration> {
        self.max_stale_limit
    }

    /// Sets the limit of `max-stale`, a limit also enables `max-stale`.
    pub fn set_max_stale_limit(&mut self, limit: Option<Duration>) -> Result<(), HeaderValueError> {
        self.max_stale_limit = validate_delta_seconds(limit, "max-stale")?;
        if limit.is_some() {
            self.max_stale = true;
        }
        Ok(())
    }

    #[must_use]
    pub fn min_fresh(&self) -> Option<Duration> {
        self.min_fresh
    }

    pub fn set_min_fresh(&mut self, min_fresh: Option<Duration>) -> Result<(), HeaderValueError> {
        self.min_fresh = validate_delta_seconds(min_fresh, "min-fresh")?;
        Ok(())
    }

    #[must_use]
    pub fn no_transform(&self) -> bool {
        self.no_transform
    }

    pub fn set_no_transform(&mut self, no_transform: bool) {
        self.no_transform = no_transform;
    }

    #[must_use]
    pub fn only_if_cached(&self) -> bool {
        self.only_if_cached
    }

    pub fn set_only_if_cached(&mut self, only_if_cached: bool) {
        self.only_if_cached = only_if_cached;
    }

    #[must_use]
    pub fn public(&self) -> bool {
        self.public
    }

    pub fn set_public(&mut self, public: bool) {
        self.public = public;
    }

    #[must_use]
    pub fn private(&self) -> bool {
        self.private
    }

    /// Clearing `private` also clears its field names.
    pub fn set_private(&mut self, private: bool) {
        self.private = private;
        if !private {
            self.private_headers.clear();
        }
    }

    /// The field names of `private="..."`.
    #[must_use]
    pub fn private_headers(&self) -> &[String] {
        &self.private_headers
    }

    /// Adds a field name to `private="..."`, which also enables `private`.
    pub fn add_private_header(&mut self, header: &str) -> Result<(), HeaderValueError> {
        validate_token(header)?;
        self.private = true;
        self.private_headers.push(header.to_owned());
        Ok(())
    }

    #[must_use]
    pub fn must_revalidate(&self) -> bool {
        self.must_revalidate
    }

    pub fn set_must_revalidate(&mut self, must_revalidate: bool) {
        self.must_revalidate = must_revalidate;
    }

    #[must_use]
    pub fn proxy_revalidate(&self) -> bool {
        self.proxy_revalidate
    }

    pub fn set_proxy_revalidate(&mut self, proxy_revalidate: bool) {
        self.proxy_revalidate = proxy_revalidate;
    }

    #[must_use]
    pub fn extensions(&self) -> &Parameters {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Parameters {
        &mut self.extensions
    }

    /// Applies a parsed directive, returning `None` when its value isn't
    /// valid for the directive.
    fn apply_directive(&mut self, directive: NameValueHeaderValue) -> Option<()> {
        let Some(known) = DIRECTIVES.get(&UniCase::ascii(directive.name())).copied() else {
            self.extensions.push(directive);
            return Some(());
        };

        let value = directive.value();
        match known {
            Directive::NoCache => {
                self.no_cache = true;
                parse_optional_field_names(value, &mut self.no_cache_headers)
            }
            Directive::Private => {
                self.private = true;
                parse_optional_field_names(value, &mut self.private_headers)
            }
            Directive::MaxAge => parse_delta_seconds(value, &mut self.max_age),
            Directive::SharedMaxAge => parse_delta_seconds(value, &mut self.shared_max_age),
            Directive::MinFresh => parse_delta_seconds(value, &mut self.min_fresh),
            Directive::MaxStale => {
                self.max_stale = true;
                match value {
                    None => Some(()),
                    Some(_) => parse_delta_seconds(value, &mut self.max_stale_limit),
                }
            }
            Directive::NoStore => set_flag(value, &mut self.no_store),
            Directive::NoTransform => set_flag(value, &mut self.no_transform),
            Directive::OnlyIfCached => set_flag(value, &mut self.only_if_cached),
            Directive::Public => set_flag(value, &mut self.public),
            Directive::MustRevalidate => set_flag(value, &mut self.must_revalidate),
            Directive::ProxyRevalidate => set_flag(value, &mut self.proxy_revalidate),
        }
    }
}

/// Directives without arguments must not have a value.
fn set_flag(value: Option<&str>, flag: &mut bool) -> Option<()> {
    if value.is_some() {
        return None;
    }

    *flag = true;
    Some(())
}

/// `delta-seconds` are whole seconds, and are limited to the range of `i32`
/// when parsed.
fn validate_delta_seconds(value: Option<Duration>, field: &'static str) -> Result<Option<Duration>, HeaderValueError> {
    let Some(value) = value else {
        return Ok(None);
    };

    if value.as_secs() > u64::from(i32::MAX.unsigned_abs()) {
        return Err(HeaderValueError::OutOfRange { field });
    }

    Ok(Some(Duration::from_secs(value.as_secs())))
}

fn parse_delta_seconds(value: Option<&str>, target: &mut Option<Duration>) -> Option<()> {
    let seconds = try_parse_non_negative_i32(value?)?;
    *target = Some(Duration::from_secs(seconds.unsigned_abs().into()));
    Some(())
}

/// Parses the optional `"field-name, ..."` argument of `no-cache` and
/// `private`. The argument must be a quoted string with at least one token.
fn parse_optional_field_names(value: Option<&str>, target: &mut Vec<String>) -> Option<()> {
    let Some(value) = value else {
        return Some(());
    };

    if !is_quoted(value) || value.len() < 3 {
        return None;
    }

    let unquoted = unescape_as_quoted_string(value);
    let mut found = false;
    for name in split_list(&unquoted, b',') {
        if !is_token(name) {
            return None;
        }

        target.push(name.to_owned());
        found = true;
    }

    found.then_some(())
}

impl HeaderValueParser for CacheControlHeaderValue {
    const NAME: &'static str = "cache control";

    /// The directives are themselves a list, so a value always extends to
    /// the end of the input. Repeated header lines each produce a value.
    fn parse_value_length(input: &str, start: usize) -> Option<(Self, usize)> {
        let bytes = input.as_bytes();
        let mut value = Self::new();
        let mut found = false;

        let mut current = skip_empty_elements(input, start, b",");
        while current < bytes.len() {
            let (directive, length) = NameValueHeaderValue::parse_value_length(input, current)?;
            current += length;

            if current < bytes.len() && bytes[current] != b',' {
                return None;
            }

            value.apply_directive(directive)?;
            found = true;
            current = skip_empty_elements(input, current, b",");
        }

        if !found {
            return None;
        }

        Some((value, current - start))
    }
}

struct Directives<'f, 'a> {
    f: &'f mut fmt::Formatter<'a>,
    first: bool,
}

impl Directives<'_, '_> {
    fn write(&mut self, directive: fmt::Arguments<'_>) -> fmt::Result {
        if !self.first {
            self.f.write_str(", ")?;
        }
        self.first = false;
        self.f.write_fmt(directive)
    }

    fn write_if(&mut self, condition: bool, directive: &str) -> fmt::Result {
        if condition {
            self.write(format_args!("{directive}"))?;
        }
        Ok(())
    }

    fn write_seconds(&mut self, directive: &str, seconds: Option<Duration>) -> fmt::Result {
        if let Some(seconds) = seconds {
            self.write(format_args!("{directive}={}", seconds.as_secs()))?;
        }
        Ok(())
    }

    fn write_field_names(&mut self, condition: bool, directive: &str, names: &[String]) -> fmt::Result {
        if !condition {
            return Ok(());
        }

        if names.is_empty() {
            self.write(format_args!("{directive}"))
        } else {
            self.write(format_args!("{directive}=\"{}\"", names.join(", ")))
        }
    }
}

impl Display for CacheControlHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut directives = Directives { f, first: true };

        directives.write_if(self.no_store, "no-store")?;
        directives.write_if(self.no_transform, "no-transform")?;
        directives.write_if(self.only_if_cached, "only-if-cached")?;
        directives.write_if(self.public, "public")?;
        directives.write_if(self.must_revalidate, "must-revalidate")?;
        directives.write_if(self.proxy_revalidate, "proxy-revalidate")?;
        directives.write_field_names(self.no_cache, "no-cache", &self.no_cache_headers)?;
        directives.write_seconds("max-age", self.max_age)?;
        directives.write_seconds("s-maxage", self.shared_max_age)?;
        if self.max_stale {
            match self.max_stale_limit {
                Some(limit) => directives.write(format_args!("max-stale={}", limit.as_secs()))?,
                None => directives.write(format_args!("max-stale"))?,
            }
        }
        directives.write_seconds("min-fresh", self.min_fresh)?;
        directives.write_field_names(self.private, "private", &self.private_headers)?;

        for extension in &self.extensions {
            directives.write(format_args!("{extension}"))?;
        }

        Ok(())
    }
}

/// Compares field name lists as case-insensitive multisets.
fn field_names_eq(a: &[String], b: &[String]) -> bool {
    let count = |names: &[String], name: &str| {
        names.iter().filter(|other| UniCase::ascii(other.as_str()) == UniCase::ascii(name)).count()
    };

    a.len() == b.len() && a.iter().all(|name| count(a, name) == count(b, name))
}

fn hash_field_names<H: Hasher>(names: &[String], state: &mut H) {
    let combined = names.iter().fold(0u64, |combined, name| {
        let mut hasher = DefaultHasher::new();
        UniCase::ascii(name.as_str()).hash(&mut hasher);
        combined.wrapping_add(hasher.finish())
    });

    state.write_usize(names.len());
    state.write_u64(combined);
}

impl PartialEq for CacheControlHeaderValue {
    fn eq(&self, other: &Self) -> bool {
        self.no_cache == other.no_cache
            && field_names_eq(&self.no_cache_headers, &other.no_cache_headers)
            && self.no_store == other.no_store
            && self.max_age == other.max_age
            && self.shared_max_age == other.shared_max_age
            && self.max_stale == other.max_stale
            && self.max_stale_limit == other.max_stale_limit
            && self.min_fresh == other.min_fresh
            && self.no_transform == other.no_transform
            && self.only_if_cached == other.only_if_cached
            && self.public == other.public
            && self.private == other.private
            && field_names_eq(&self.private_headers, &other.private_headers)
            && self.must_revalidate == other.must_revalidate
            && self.proxy_revalidate == other.proxy_revalidate
            && self.extensions == other.extensions
    }
}

impl Eq for CacheControlHeaderValue {}

impl Hash for CacheControlHeaderValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.no_cache.hash(state);
        hash_field_names(&self.no_cache_headers, state);
        self.no_store.hash(state);
        self.max_age.hash(state);
        self.shared_max_age.hash(state);
        self.max_stale.hash(state);
        self.max_stale_limit.hash(state);
        self.min_fresh.hash(state);
        self.no_transform.hash(state);
        self.only_if_cached.hash(state);
        self.public.hash(state);
        self.private.hash(state);
        hash_field_names(&self.private_headers, state);
        self.must_revalidate.hash(state);
        self.proxy_revalidate.hash(state);
        self.extensions.hash(state);
    }
}

/// Splits a directive element into its name and optional value.
fn split_directive(element: &str) -> (&str, Option<&str>) {
    match element.split_once('=') {
        Some((name, value)) => (name.trim_end(), Some(value.trim_start())),
        None => (element, None),
    }
}

/// Finds the first `directive=seconds` in the raw `Cache-Control` lines,
/// without parsing the full header value.
#[must_use]
pub fn try_parse_seconds<S: AsRef<str>>(header_values: &[S], directive: &str) -> Option<Duration> {
    header_values.iter()
        .flat_map(|line| split_list(line.as_ref(), b','))
        .map(split_directive)
        .find(|(name, _)| UniCase::ascii(*name) == UniCase::ascii(directive))
        .and_then(|(_, value)| try_parse_non_negative_i64(value?))
        .map(|seconds| Duration::from_secs(seconds.unsigned_abs()))
}

/// Checks whether the raw `Cache-Control` lines contain the directive, with
/// or without a value.
#[must_use]
pub fn contains_cache_directive<S: AsRef<str>>(header_values: &[S], directive: &str) -> bool {
    header_values.iter()
        .flat_map(|line| split_list(line.as_ref(), b','))
        .map(split_directive)
        .any(|(name, _)| UniCase::ascii(name) == UniCase::ascii(directive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::parameters::tests::hash_of;

    fn seconds(seconds: u64) -> Option<Duration> {
        Some(Duration::from_secs(seconds))
    }

    #[test]
    fn test_parse_scenario() {
        let value = CacheControlHeaderValue::parse("no-store, no-cache, max-age=70").unwrap();
        assert!(value.no_store());
        assert!(value.no_cache());
        assert_eq!(value.max_age(), seconds(70));
        assert_eq!(value.to_string(), "no-store, no-cache, max-age=70");
    }

    #[test]
    fn test_display_order() {
        let mut value = CacheControlHeaderValue::new();
        value.add_private_header("set-cookie").unwrap();
        value.set_min_fresh(seconds(4)).unwrap();
        value.set_max_stale_limit(seconds(3)).unwrap();
        value.set_shared_max_age(seconds(2)).unwrap();
        value.set_max_age(seconds(1)).unwrap();
        value.add_no_cache_header("h1").unwrap();
        value.add_no_cache_header("h2").unwrap();
        value.set_proxy_revalidate(true);
        value.set_must_revalidate(true);
        value.set_public(true);
        value.set_only_if_cached(true);
        value.set_no_transform(true);
        value.set_no_store(true);
        value.extensions_mut().push(NameValueHeaderValue::with_value("custom", "\"a, b\"").unwrap());

        assert_eq!(value.to_string(), "no-store, no-transform, only-if-cached, public, must-revalidate, \
            proxy-revalidate, no-cache=\"h1, h2\", max-age=1, s-maxage=2, max-stale=3, min-fresh=4, \
            private=\"set-cookie\", custom=\"a, b\"");
    }

    #[test]
    fn test_display_empty() {
        assert_eq!(CacheControlHeaderValue::new().to_string(), "");

        let mut value = CacheControlHeaderValue::new();
        value.set_max_stale(true);
        assert_eq!(value.to_string(), "max-stale");
    }

    #[rstest]
    #[case("no-cache", "no-cache")]
    #[case("NO-CACHE", "no-cache")]
    #[case("no-cache=\"h1,  ,h2\"", "no-cache=\"h1, h2\"")]
    #[case(" , max-age = 5 ,, ", "max-age=5")]
    #[case("max-stale", "max-stale")]
    #[case("max-stale=10", "max-stale=10")]
    #[case("s-maxage=1, min-fresh=2", "s-maxage=1, min-fresh=2")]
    #[case("private, public", "public, private")]
    #[case("private=\"x\"", "private=\"x\"")]
    #[case("custom, other=\"quoted value\"", "custom, other=\"quoted value\"")]
    #[case("max-age=2147483647", "max-age=2147483647")]
    fn test_parse_valid(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(CacheControlHeaderValue::parse(input).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("")]
    #[case(",")]
    #[case("no-store=1")]
    #[case("public=\"x\"")]
    #[case("max-age")]
    #[case("max-age=")]
    #[case("max-age=-1")]
    #[case("max-age=\"1\"")]
    #[case("max-age=2147483648")]
    #[case("max-stale=x")]
    #[case("no-cache=h1")]
    #[case("no-cache=\"\"")]
    #[case("no-cache=\"h1 h2\"")]
    #[case("private=\"h/1\"")]
    #[case("no-store no-cache")]
    #[case("no-store; no-cache")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(CacheControlHeaderValue::parse(input).is_err(), "{input:?} should be invalid");
    }

    #[test]
    fn test_parse_list_per_line() {
        let values = CacheControlHeaderValue::parse_list(&["no-store", "max-age=invalid", "max-age=5"]);
        assert_eq!(values.len(), 2);
        assert!(values[0].no_store());
        assert_eq!(values[1].max_age(), seconds(5));

        assert!(CacheControlHeaderValue::parse_strict_list(&["no-store", "max-age=invalid"]).is_err());
    }

    #[test]
    fn test_extensions() {
        let value = CacheControlHeaderValue::parse("stale-while-revalidate=60, immutable").unwrap();
        assert_eq!(value.extensions().get_value("stale-while-revalidate"), Some("60"));
        assert!(value.extensions().find("immutable").is_some());
        assert_eq!(value.max_age(), None);
    }

    #[test]
    fn test_equality_and_hash() {
        let value = CacheControlHeaderValue::parse("no-cache=\"a, b\", max-age=5, custom=x").unwrap();
        let other = CacheControlHeaderValue::parse("CUSTOM=X, Max-Age=5, no-cache=\"B, A\"").unwrap();

        assert_eq!(value, other);
        assert_eq!(hash_of(&value), hash_of(&other));
        assert_ne!(value, CacheControlHeaderValue::parse("no-cache=\"a\", max-age=5, custom=x").unwrap());
        assert_ne!(value, CacheControlHeaderValue::parse("no-cache=\"a, b\", max-age=6, custom=x").unwrap());
    }

    #[test]
    fn test_setters() {
        let mut value = CacheControlHeaderValue::new();
        value.set_max_stale_limit(seconds(5)).unwrap();
        assert!(value.max_stale());
        value.set_max_stale(false);
        assert_eq!(value.max_stale_limit(), None);

        assert_eq!(value.add_no_cache_header("in valid"), Err(HeaderValueError::InvalidToken));
        assert!(!value.no_cache());
    }

    #[test]
    fn test_delta_seconds_setters() {
        let mut value = CacheControlHeaderValue::new();

        value.set_max_age(Some(Duration::from_millis(2500))).unwrap();
        assert_eq!(value.max_age(), seconds(2));

        value.set_shared_max_age(seconds(2_147_483_647)).unwrap();
        assert_eq!(value.to_string(), "max-age=2, s-maxage=2147483647");

        assert_eq!(value.set_max_age(seconds(3_000_000_000)), Err(HeaderValueError::OutOfRange { field: "max-age" }));
        assert_eq!(value.set_min_fresh(seconds(2_147_483_648)), Err(HeaderValueError::OutOfRange { field: "min-fresh" }));
        assert_eq!(value.set_max_stale_limit(seconds(u64::MAX)), Err(HeaderValueError::OutOfRange { field: "max-stale" }));
        assert!(!value.max_stale());
        assert_eq!(value.max_age(), seconds(2));

        assert_eq!(CacheControlHeaderValue::parse(&value.to_string()), Ok(value));
    }

    #[test]
    fn test_clearing_flags_clears_field_names() {
        let mut value = CacheControlHeaderValue::new();
        value.add_no_cache_header("set-cookie").unwrap();
        value.add_private_header("authorization").unwrap();

        value.set_no_cache(false);
        value.set_private(false);
        assert!(value.no_cache_headers().is_empty());
        assert!(value.private_headers().is_empty());
        assert_eq!(value, CacheControlHeaderValue::new());

        value.set_no_cache(true);
        assert_eq!(value.to_string(), "no-cache");
    }

    #[rstest]
    #[case(&["max-age=5"], "max-age", seconds(5))]
    #[case(&["public", "no-cache, MAX-AGE = 10"], "max-age", seconds(10))]
    #[case(&["s-maxage=1, max-age=2"], "max-age", seconds(2))]
    #[case(&["max-age=x"], "max-age", None)]
    #[case(&["max-age"], "max-age", None)]
    #[case(&["s-maxage=1"], "max-age", None)]
    #[case(&[], "max-age", None)]
    fn test_try_parse_seconds(#[case] lines: &[&str], #[case] directive: &str, #[case] expected: Option<Duration>) {
        assert_eq!(try_parse_seconds(lines, directive), expected);
    }

    #[rstest]
    #[case(&["no-cache"], "no-cache", true)]
    #[case(&["public", "NO-CACHE=\"x\""], "no-cache", true)]
    #[case(&["no-cache-x"], "no-cache", false)]
    #[case(&["private"], "no-cache", false)]
    fn test_contains_cache_directive(#[case] lines: &[&str], #[case] directive: &str, #[case] expected: bool) {
        assert_eq!(contains_cache_directive(lines, directive), expected);
    }
}
