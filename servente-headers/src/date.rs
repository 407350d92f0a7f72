// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! HTTP dates.
//!
//! Three formats are accepted, but only the IMF-fixdate is ever produced.
//! ```text
//! HTTP-date    = IMF-fixdate / obs-date
//! IMF-fixdate  = day-name "," SP date1 SP time-of-day SP GMT
//!              ; e.g. Tue, 15 Nov 1994 08:12:31 GMT
//! rfc850-date  = day-name-l "," SP date2 SP time-of-day SP GMT
//!              ; e.g. Sunday, 06-Nov-94 08:49:37 GMT
//! asctime-date = day-name SP date3 SP time-of-day SP year
//!              ; e.g. Sun Nov  6 08:49:37 1994
//! ```
//!
//! # References
//! * [RFC 9110 Section 5.6.7](https://www.rfc-editor.org/rfc/rfc9110.html#name-date-time-formats)

use std::time::{Duration, SystemTime};

use crate::{
    abnf,
    log::trace,
    syntax::is_whitespace_character,
    HeaderValueError,
};

const SECONDS_PER_DAY: i64 = 86_400;

/// `0001-01-01T00:00:00Z`, the earliest date with a four-digit year.
const MIN_DATE_SECONDS: i64 = -62_135_596_800;

/// `9999-12-31T23:59:59Z`, the latest date with a four-digit year.
const MAX_DATE_SECONDS: i64 = 253_402_300_799;

/// Indexed by the number of days since the epoch, which was a Thursday.
const DAY_NAMES: [&str; 7] = ["Thu", "Fri", "Sat", "Sun", "Mon", "Tue", "Wed"];

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Parses an HTTP date in any of the accepted formats. The result is always
/// in UTC, as HTTP dates are always in GMT.
///
/// Obsolete line folding inside the date is tolerated.
#[must_use]
pub fn parse_date(input: &str) -> Option<SystemTime> {
    let unfolded = unfold(input);
    let unfolded = unfolded.trim_matches(is_whitespace_character);

    if let Ok(date) = httpdate::parse_http_date(unfolded) {
        return Some(date);
    }

    // Can't be collapsed up front, the asctime format pads the day with a
    // space.
    let collapsed = unfolded.split_whitespace().collect::<Vec<_>>().join(" ");
    if let Ok(date) = httpdate::parse_http_date(&collapsed) {
        trace!("Accepted date after collapsing whitespace: {input:?}");
        return Some(date);
    }

    // httpdate refuses dates before the epoch, which servers use to expire
    // cookies.
    let date = parse_imf_fixdate(&collapsed)?;
    trace!("Accepted date before the epoch: {input:?}");
    Some(date)
}

/// Parses `day-name "," SP day SP month SP year SP hour ":" minute ":" second SP "GMT"`.
fn parse_imf_fixdate(input: &str) -> Option<SystemTime> {
    let (day_name, rest) = input.split_once(", ")?;
    let [day, month, year, time, "GMT"] = rest.split(' ').collect::<Vec<_>>()[..] else {
        return None;
    };
    let [hour, minute, second] = time.split(':').collect::<Vec<_>>()[..] else {
        return None;
    };

    let day = parse_fixed_digits(day, 2)?;
    let month = MONTH_NAMES.iter().position(|name| *name == month)? as i64 + 1;
    let year = parse_fixed_digits(year, 4)?;
    let hour = parse_fixed_digits(hour, 2)?;
    let minute = parse_fixed_digits(minute, 2)?;
    let second = parse_fixed_digits(second, 2)?;

    if day == 0 || day > days_in_month(year, month) || hour > 23 || minute > 59 || second > 59 {
        return None;
    }

    let days = days_from_civil(year, month, day);
    if DAY_NAMES[days.rem_euclid(7) as usize] != day_name {
        return None;
    }

    from_unix_seconds(days * SECONDS_PER_DAY + hour * 3600 + minute * 60 + second)
}

fn parse_fixed_digits(input: &str, digits: usize) -> Option<i64> {
    if input.len() != digits || !input.bytes().all(abnf::is_digit) {
        return None;
    }
    input.parse().ok()
}

fn is_leap_year(year: i64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_month(year: i64, month: i64) -> i64 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// The number of days between the epoch and the given date of the proleptic
/// Gregorian calendar.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let year_of_era = year - era * 400;
    let month_from_march = if month > 2 { month - 3 } else { month + 9 };
    let day_of_year = (153 * month_from_march + 2) / 5 + day - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

/// The inverse of [`days_from_civil`], returning the year, month and day.
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let days = days + 719_468;
    let era = days.div_euclid(146_097);
    let day_of_era = days - era * 146_097;
    let year_of_era = (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let month_from_march = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * month_from_march + 2) / 5 + 1;
    let month = if month_from_march < 10 { month_from_march + 3 } else { month_from_march - 9 };
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Whole seconds since the epoch, rounded towards the past.
fn unix_seconds(date: SystemTime) -> i64 {
    match date.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(since) => i64::try_from(since.as_secs()).unwrap_or(i64::MAX),
        Err(error) => {
            let before = error.duration();
            let seconds = i64::try_from(before.as_secs()).unwrap_or(i64::MAX);
            -seconds - i64::from(before.subsec_nanos() > 0)
        }
    }
}

fn from_unix_seconds(seconds: i64) -> Option<SystemTime> {
    let duration = Duration::from_secs(seconds.unsigned_abs());
    if seconds >= 0 {
        SystemTime::UNIX_EPOCH.checked_add(duration)
    } else {
        SystemTime::UNIX_EPOCH.checked_sub(duration)
    }
}

/// Checks that the date can be written as an IMF-fixdate, i.e. that its year
/// has four digits. The fraction of a second, which the format can't
/// express, is dropped.
pub fn validate_date(date: SystemTime) -> Result<SystemTime, HeaderValueError> {
    let seconds = unix_seconds(date);
    if !(MIN_DATE_SECONDS..=MAX_DATE_SECONDS).contains(&seconds) {
        return Err(HeaderValueError::OutOfRange { field: "date" });
    }

    from_unix_seconds(seconds).ok_or(HeaderValueError::OutOfRange { field: "date" })
}

/// Replaces each `CRLF` that is followed by whitespace with a single space.
fn unfold(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut characters = input.chars().peekable();

    while let Some(character) = characters.next() {
        if character == '\r' {
            let mut lookahead = characters.clone();
            if lookahead.next() == Some('\n') && matches!(lookahead.peek(), Some(' ' | '\t')) {
                characters.next();
                result.push(' ');
                continue;
            }
        }

        result.push(character);
    }

    result
}

/// Formats the date as an IMF-fixdate. When `quoted` is set, the date is
/// enclosed in `DQUOTE`s, which some parameters require.
///
/// Dates that fail [`validate_date`] are still formatted, but their year
/// won't have four digits, so the result can't be parsed back.
#[must_use]
pub fn format_date(date: SystemTime, quoted: bool) -> String {
    let seconds = unix_seconds(date);
    let formatted = if (0..=MAX_DATE_SECONDS).contains(&seconds) {
        httpdate::fmt_http_date(date)
    } else {
        format_imf_fixdate(seconds)
    };
    if quoted {
        format!("\"{formatted}\"")
    } else {
        formatted
    }
}

fn format_imf_fixdate(seconds: i64) -> String {
    let days = seconds.div_euclid(SECONDS_PER_DAY);
    let time_of_day = seconds.rem_euclid(SECONDS_PER_DAY);
    let (year, month, day) = civil_from_days(days);

    format!(
        "{}, {day:02} {} {year:04} {:02}:{:02}:{:02} GMT",
        DAY_NAMES[days.rem_euclid(7) as usize],
        MONTH_NAMES[(month - 1) as usize],
        time_of_day / 3600,
        time_of_day / 60 % 60,
        time_of_day % 60,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    const NOV_06_1994_08_49_37: u64 = 784111777;
    const NOV_15_1994_08_12_31: u64 = 784887151;

    fn seconds(seconds: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(seconds)
    }

    #[rstest]
    #[case("Sun, 06 Nov 1994 08:49:37 GMT", NOV_06_1994_08_49_37)]
    #[case("Sunday, 06-Nov-94 08:49:37 GMT", NOV_06_1994_08_49_37)]
    #[case("Sun Nov  6 08:49:37 1994", NOV_06_1994_08_49_37)]
    #[case("Tue, 15 Nov 1994 08:12:31 GMT", NOV_15_1994_08_12_31)]
    #[case("  Tue, 15 Nov 1994 08:12:31 GMT  ", NOV_15_1994_08_12_31)]
    #[case("Tue,\r\n 15 Nov 1994 08:12:31 GMT", NOV_15_1994_08_12_31)]
    #[case("Tue,  15   Nov 1994 08:12:31 GMT", NOV_15_1994_08_12_31)]
    fn test_parse_date_valid(#[case] input: &str, #[case] expected: u64) {
        assert_eq!(parse_date(input), Some(seconds(expected)));
    }

    #[rstest]
    #[case("")]
    #[case("Tue, 15 Nov 94 08:12 GMT")]
    #[case("Wed, 12 Feb 1997 16:29:51 -0500")]
    #[case("not a date")]
    fn test_parse_date_invalid(#[case] input: &str) {
        assert_eq!(parse_date(input), None);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(seconds(NOV_15_1994_08_12_31), false), "Tue, 15 Nov 1994 08:12:31 GMT");
        assert_eq!(format_date(seconds(NOV_15_1994_08_12_31), true), "\"Tue, 15 Nov 1994 08:12:31 GMT\"");
    }

    #[rstest]
    #[case("Fri, 01 Jan 1960 00:00:00 GMT", -315_619_200)]
    #[case("Thu, 01 Jan 1970 00:00:00 GMT", 0)]
    #[case("Wed, 31 Dec 1969 23:59:59 GMT", -1)]
    #[case("Mon, 29 Feb 1904 12:30:45 GMT", -2_077_702_155)]
    #[case("Mon, 01 Jan 0001 00:00:00 GMT", MIN_DATE_SECONDS)]
    fn test_dates_before_the_epoch(#[case] input: &str, #[case] expected: i64) {
        let date = parse_date(input).unwrap();
        assert_eq!(unix_seconds(date), expected);
        assert_eq!(format_date(date, false), input);
    }

    #[rstest]
    #[case("Sat, 01 Jan 1960 00:00:00 GMT")]
    #[case("Sun, 29 Feb 1900 00:00:00 GMT")]
    #[case("Fri, 01 Jan 1960 24:00:00 GMT")]
    #[case("Fri, 01 Jan 1960 00:00:00 UTC")]
    #[case("Fri, 1 Jan 1960 00:00:00 GMT")]
    fn test_dates_before_the_epoch_invalid(#[case] input: &str) {
        assert_eq!(parse_date(input), None);
    }

    #[test]
    fn test_format_date_never_panics() {
        let before_year_one = SystemTime::UNIX_EPOCH - Duration::from_secs(MIN_DATE_SECONDS.unsigned_abs() + SECONDS_PER_DAY as u64);
        assert_eq!(format_date(before_year_one, false), "Sun, 31 Dec 0000 00:00:00 GMT");

        let year_ten_thousand = seconds(MAX_DATE_SECONDS as u64 + 1);
        assert_eq!(format_date(year_ten_thousand, false), "Sat, 01 Jan 10000 00:00:00 GMT");
    }

    #[test]
    fn test_validate_date() {
        let fraction = SystemTime::UNIX_EPOCH - Duration::from_millis(1500);
        assert_eq!(validate_date(fraction), Ok(SystemTime::UNIX_EPOCH - Duration::from_secs(2)));
        assert_eq!(validate_date(seconds(1) + Duration::from_millis(999)), Ok(seconds(1)));
        assert_eq!(validate_date(seconds(MAX_DATE_SECONDS as u64)), Ok(seconds(MAX_DATE_SECONDS as u64)));
        assert_eq!(validate_date(seconds(MAX_DATE_SECONDS as u64 + 1)), Err(HeaderValueError::OutOfRange { field: "date" }));
        assert_eq!(
            validate_date(SystemTime::UNIX_EPOCH - Duration::from_secs(MIN_DATE_SECONDS.unsigned_abs() + 1)),
            Err(HeaderValueError::OutOfRange { field: "date" })
        );
    }

    #[test]
    fn test_legacy_formats_are_normalized() {
        let date = parse_date("Sunday, 06-Nov-94 08:49:37 GMT").unwrap();
        assert_eq!(format_date(date, false), "Sun, 06 Nov 1994 08:49:37 GMT");
    }
}
