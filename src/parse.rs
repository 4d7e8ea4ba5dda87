//! Attribute-level parsing of day and multi-range input.
//!
//! Parsing never panics: every failure is logged with the offending raw
//! value and returned as an error, and multi-range input is parsed
//! atomically, so one bad element rejects the whole list.

use serde_json::Value;
use tracing::warn;

use crate::consts::MONTH_FIRST_SEPARATOR;
use crate::range::{DateRange, RangeError};
use crate::{Day, ParseError};

/// Parses a single day from attribute text.
///
/// The canonical `YYYY-MM-DD` pattern is tried first so ISO input never
/// falls through to the looser month-first reading, then the text is
/// retried as month-first `MM/DD/YYYY`.
///
/// # Errors
/// Returns the ISO-pattern error if neither form parses.
pub fn parse_single(text: &str) -> Result<Day, ParseError> {
    text.parse::<Day>().or_else(|err| {
        parse_month_first(text).map_err(|_| err)
    })
}

/// Month-first numeric form, `MM/DD/YYYY` (legacy US format).
fn parse_month_first(text: &str) -> Result<Day, ParseError> {
    let parts: Vec<&str> = text
        .trim()
        .split(MONTH_FIRST_SEPARATOR)
        .map(str::trim)
        .collect();
    if parts.len() != 3 {
        return Err(ParseError::InvalidFormat(text.to_owned()));
    }

    let month = parts[0]
        .parse::<u8>()
        .map_err(|_| ParseError::InvalidFormat(parts[0].to_owned()))?;
    let day = parts[1]
        .parse::<u8>()
        .map_err(|_| ParseError::InvalidFormat(parts[1].to_owned()))?;
    let year = parts[2]
        .parse::<u16>()
        .map_err(|_| ParseError::InvalidFormat(parts[2].to_owned()))?;

    Day::from_ymd(year, month, day)
}

/// Parses multi-range attribute text into a list of days and spans.
///
/// The text is first treated as JSON: an array is converted element-wise
/// (each element an ISO day string or a two-element `[start, end]` pair),
/// any other JSON value is an error. Text that is not JSON at all is
/// retried as a single day.
///
/// The result is raw: callers canonicalize it with
/// [`collapse`](crate::collapse).
///
/// # Errors
/// Fails atomically; no partial list is ever returned.
pub fn parse_multi(text: &str) -> Result<Vec<DateRange>, RangeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RangeError::Parse(ParseError::EmptyInput));
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(entries)) => entries.iter().map(parse_entry).collect(),
        Ok(other) => {
            warn!(raw = %other, "multi-date input is JSON but not a list of ranges");
            Err(RangeError::InvalidFormat(trimmed.to_owned()))
        }
        Err(_) => match parse_single(trimmed) {
            Ok(day) => Ok(vec![DateRange::from(day)]),
            Err(err) => {
                warn!(raw = trimmed, "unable to parse as JSON ranges or a single day");
                Err(err.into())
            }
        },
    }
}

fn parse_entry(entry: &Value) -> Result<DateRange, RangeError> {
    match entry {
        Value::String(text) => match parse_single(text) {
            Ok(day) => Ok(DateRange::from(day)),
            Err(err) => {
                warn!(raw = %text, "unable to parse date");
                Err(err.into())
            }
        },
        Value::Array(pair) if pair.len() == 2 => {
            let start = parse_endpoint(&pair[0], "start")?;
            let end = parse_endpoint(&pair[1], "end")?;
            DateRange::span(start, end).map_err(|err| {
                warn!(%start, %end, "start date is after end date");
                err
            })
        }
        other => {
            warn!(raw = %other, "invalid range value");
            Err(RangeError::InvalidFormat(other.to_string()))
        }
    }
}

fn parse_endpoint(value: &Value, which: &'static str) -> Result<Day, RangeError> {
    let Value::String(text) = value else {
        warn!(raw = %value, which, "range endpoint is not a date string");
        return Err(RangeError::InvalidFormat(value.to_string()));
    };
    parse_single(text).map_err(|err| {
        warn!(raw = %text, which, "unable to parse range endpoint");
        RangeError::from(err)
    })
}
