// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
    time::SystemTime,
};

use unicase::UniCase;

use crate::{
    date::{format_date, parse_date, validate_date},
    extended_value::{
        decode_extended_value,
        decode_mime,
        encode_extended_value,
        encode_mime,
        requires_encoding,
    },
    parameters::{parse_parameter_list, Parameters},
    syntax::{
        escape_as_quoted_string,
        format_non_negative_i64,
        get_token_length,
        get_whitespace_length,
        is_quoted,
        is_token,
        remove_quotes,
        try_parse_non_negative_i64,
        validate_token,
    },
    HeaderValueError,
    HeaderValueParser,
};

const NAME_PARAMETER: &str = "name";
const FILE_NAME_PARAMETER: &str = "filename";
const FILE_NAME_STAR_PARAMETER: &str = "filename*";
const CREATION_DATE_PARAMETER: &str = "creation-date";
const MODIFICATION_DATE_PARAMETER: &str = "modification-date";
const READ_DATE_PARAMETER: &str = "read-date";
const SIZE_PARAMETER: &str = "size";

/// The charset used when encoding extended values.
const EXTENDED_VALUE_CHARSET: &str = "UTF-8";

/// The value of the `Content-Disposition` header, which tells whether a
/// representation should be displayed `inline` or downloaded as an
/// `attachment`, and what its file name is. Also used for the parts of
/// `multipart/form-data` bodies.
///
/// ```text
/// content-disposition = "Content-Disposition" ":"
///                       disposition-type *( ";" disposition-parm )
/// disposition-type    = "inline" | "attachment" | disp-ext-type
/// disposition-parm    = filename-parm | disp-ext-parm
/// filename-parm       = "filename" "=" value
///                     | "filename*" "=" ext-value
/// ```
///
/// Non-ASCII file names are written using an RFC 2047 encoded word in the
/// `filename` parameter, or using an RFC 5987 extended value in the
/// `filename*` parameter. Getters return `None` when a value can't be
/// decoded.
///
/// # References
/// * [RFC 6266](https://www.rfc-editor.org/rfc/rfc6266.html)
/// * [RFC 2183](https://www.rfc-editor.org/rfc/rfc2183.html)
/// * [RFC 7578 Section 4.2](https://www.rfc-editor.org/rfc/rfc7578.html#section-4.2)
#[derive(Clone, Debug)]
pub struct ContentDispositionHeaderValue {
    disposition_type: String,
    parameters: Parameters,
}

impl ContentDispositionHeaderValue {
    pub fn new(disposition_type: &str) -> Result<Self, HeaderValueError> {
        validate_token(disposition_type)?;
        Ok(Self {
            disposition_type: disposition_type.to_owned(),
            parameters: Parameters::new(),
        })
    }

    #[must_use]
    pub fn disposition_type(&self) -> &str {
        &self.disposition_type
    }

    pub fn set_disposition_type(&mut self, disposition_type: &str) -> Result<(), HeaderValueError> {
        validate_token(disposition_type)?;
        self.disposition_type = disposition_type.to_owned();
        Ok(())
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    /// The `name` of a `multipart/form-data` field.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.get_name(NAME_PARAMETER)
    }

    pub fn set_name(&mut self, name: Option<&str>) -> Result<(), HeaderValueError> {
        self.set_name_parameter(NAME_PARAMETER, name)
    }

    #[must_use]
    pub fn file_name(&self) -> Option<String> {
        self.get_name(FILE_NAME_PARAMETER)
    }

    /// Sets the `filename` parameter, quoting the value if it isn't a token
    /// and encoding it as an RFC 2047 encoded word if it isn't printable ASCII.
    pub fn set_file_name(&mut self, file_name: Option<&str>) -> Result<(), HeaderValueError> {
        self.set_name_parameter(FILE_NAME_PARAMETER, file_name)
    }

    #[must_use]
    pub fn file_name_star(&self) -> Option<String> {
        self.get_name(FILE_NAME_STAR_PARAMETER)
    }

    /// Sets the `filename*` parameter as a `UTF-8` extended value.
    pub fn set_file_name_star(&mut self, file_name: Option<&str>) {
        let value = file_name
            .filter(|file_name| !file_name.is_empty())
            .map(|file_name| encode_extended_value(EXTENDED_VALUE_CHARSET, file_name));
        self.parameters.set_value_unchecked(FILE_NAME_STAR_PARAMETER, value);
    }

    /// Sets both the `filename*` parameter and an ASCII fallback in the
    /// `filename` parameter, for recipients that don't understand
    /// `filename*`. Characters outside of ASCII are replaced by `_` in the
    /// fallback.
    ///
    /// # References
    /// * [RFC 6266 Appendix D](https://www.rfc-editor.org/rfc/rfc6266.html#appendix-D)
    pub fn set_http_file_name(&mut self, file_name: Option<&str>) -> Result<(), HeaderValueError> {
        let sanitized = file_name.map(|file_name| {
            file_name.chars()
                .map(|character| if character.is_ascii() { character } else { '_' })
                .collect::<String>()
        });

        self.set_file_name(sanitized.as_deref())?;
        self.set_file_name_star(file_name);
        Ok(())
    }

    /// Sets the `filename` parameter, encoding it if needed, and removes the
    /// `filename*` parameter.
    pub fn set_mime_file_name(&mut self, file_name: Option<&str>) -> Result<(), HeaderValueError> {
        self.set_file_name(file_name)?;
        self.set_file_name_star(None);
        Ok(())
    }

    #[must_use]
    pub fn creation_date(&self) -> Option<SystemTime> {
        self.get_date(CREATION_DATE_PARAMETER)
    }

    pub fn set_creation_date(&mut self, date: Option<SystemTime>) -> Result<(), HeaderValueError> {
        self.set_date(CREATION_DATE_PARAMETER, date)
    }

    #[must_use]
    pub fn modification_date(&self) -> Option<SystemTime> {
        self.get_date(MODIFICATION_DATE_PARAMETER)
    }

    pub fn set_modification_date(&mut self, date: Option<SystemTime>) -> Result<(), HeaderValueError> {
        self.set_date(MODIFICATION_DATE_PARAMETER, date)
    }

    #[must_use]
    pub fn read_date(&self) -> Option<SystemTime> {
        self.get_date(READ_DATE_PARAMETER)
    }

    pub fn set_read_date(&mut self, date: Option<SystemTime>) -> Result<(), HeaderValueError> {
        self.set_date(READ_DATE_PARAMETER, date)
    }

    /// The approximate size of the file in bytes.
    #[must_use]
    pub fn size(&self) -> Option<i64> {
        self.parameters.get_value(SIZE_PARAMETER).and_then(try_parse_non_negative_i64)
    }

    pub fn set_size(&mut self, size: Option<i64>) -> Result<(), HeaderValueError> {
        let value = match size {
            Some(size) => Some(format_non_negative_i64(size).map_err(|_| HeaderValueError::OutOfRange { field: "size" })?),
            None => None,
        };

        self.parameters.set_value_unchecked(SIZE_PARAMETER, value);
        Ok(())
    }

    fn get_date(&self, name: &str) -> Option<SystemTime> {
        let value = self.parameters.get_value(name)?;
        parse_date(remove_quotes(value))
    }

    fn set_date(&mut self, name: &str, date: Option<SystemTime>) -> Result<(), HeaderValueError> {
        let value = match date {
            Some(date) => Some(format_date(validate_date(date)?, true)),
            None => None,
        };

        self.parameters.set_value_unchecked(name, value);
        Ok(())
    }

    /// Parameters ending in `*` hold extended values, the others may hold an
    /// encoded word or a plain (quoted) value.
    fn get_name(&self, name: &str) -> Option<String> {
        let value = self.parameters.get_value(name)?;

        if name.ends_with('*') {
            return decode_extended_value(value);
        }

        decode_mime(value).or_else(|| Some(remove_quotes(value).to_owned()))
    }

    fn set_name_parameter(&mut self, name: &str, value: Option<&str>) -> Result<(), HeaderValueError> {
        let value = match value {
            Some(value) if !value.is_empty() => Some(encode_and_quote_mime(value)?),
            _ => None,
        };

        self.parameters.set_value_unchecked(name, value);
        Ok(())
    }
}

/// Prepares a (file) name for a plain parameter: values with non-ASCII or
/// control characters become an encoded word, values that aren't tokens
/// become quoted strings.
fn encode_and_quote_mime(value: &str) -> Result<String, HeaderValueError> {
    let (value, was_quoted) = if is_quoted(value) {
        (remove_quotes(value), true)
    } else {
        (value, false)
    };

    if requires_encoding(value) {
        return Ok(encode_mime(value));
    }

    if was_quoted || !is_token(value) {
        return escape_as_quoted_string(value);
    }

    Ok(value.to_owned())
}

impl HeaderValueParser for ContentDispositionHeaderValue {
    const NAME: &'static str = "content disposition";

    fn parse_value_length(input: &str, start: usize) -> Option<(Self, usize)> {
        let type_length = get_token_length(input, start);
        if type_length == 0 {
            return None;
        }

        let disposition_type = input[start..start + type_length].to_owned();
        let mut current = start + type_length;
        current += get_whitespace_length(input, current);

        let mut parameters = Parameters::new();
        if input.as_bytes().get(current) == Some(&b';') {
            current += 1;
            current += parse_parameter_list(input, current, b';', &mut parameters);
        }

        Some((Self { disposition_type, parameters }, current - start))
    }
}

impl Display for ContentDispositionHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.disposition_type)?;
        self.parameters.fmt_with_leading_delimiter(f, "; ")
    }
}

impl PartialEq for ContentDispositionHeaderValue {
    fn eq(&self, other: &Self) -> bool {
        UniCase::ascii(&self.disposition_type) == UniCase::ascii(&other.disposition_type)
            && self.parameters == other.parameters
    }
}

impl Eq for ContentDispositionHeaderValue {}

impl Hash for ContentDispositionHeaderValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        UniCase::ascii(self.disposition_type.as_str()).hash(state);
        self.parameters.hash(state);
    }
}
