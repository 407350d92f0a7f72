// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! This crate contains the parsers, validators and serializers of the typed
//! HTTP header values, shared by all HTTP versions.
//!
//! Every typed value implements [`HeaderValueParser`] for parsing single
//! values and lists, and [`std::fmt::Display`] for its canonical wire form.

mod log;

pub mod abnf;
pub mod date;
pub mod error;
pub mod extended_value;
pub mod frozen;
pub mod header_map;
pub mod header_name;
pub mod header_value;
pub mod lists;
pub mod parameters;
pub mod quality;
pub mod syntax;

pub use error::HeaderValueError;
pub use frozen::*;
pub use header_map::*;
pub use header_name::*;
pub use header_value::{
    AppendToMessage,
    CacheControlHeaderValue,
    ContentDispositionHeaderValue,
    ContentRangeHeaderValue,
    CookieHeaderValue,
    EntityTagHeaderValue,
    HeaderValue,
    MediaTypeHeaderValue,
    RangeConditionHeaderValue,
    RangeHeaderValue,
    RangeItemHeaderValue,
    SameSiteMode,
    SetCookieHeaderValue,
    StringWithQualityHeaderValue,
};
pub use lists::HeaderValueParser;
pub use parameters::{NameValueHeaderValue, Parameters};
