//! Scalar text rules shared by the encoder and the decoder.
//!
//! Covers the `nil` literal, number/bool/timestamp parsing with destination
//! width checks, and the payload escaping that keeps `#`, `(` and `>` from
//! being read as structure.

use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, SecondsFormat, TimeZone};
use std::borrow::Cow;
use std::fmt;
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;

/// The literal token meaning "absent".
pub const NIL: &str = "nil";

fn is_marker(c: char) -> bool {
    c == '(' || c == '>'
}

/// Byte offset of the first `#` not preceded by a backslash.
pub(crate) fn find_comment(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    bytes
        .iter()
        .enumerate()
        .find(|&(i, &b)| b == b'#' && (i == 0 || bytes[i - 1] != b'\\'))
        .map(|(i, _)| i)
}

/// Escapes a payload so that it reads back verbatim.
///
/// Every `#` becomes `\#`. When the text after leading spaces starts with
/// backslashes followed by `(` or `>`, one more backslash is inserted there.
///
/// # Examples
///
/// ```rust
/// use serde_piml::scalar::escape;
///
/// assert_eq!(escape("plain"), "plain");
/// assert_eq!(escape("# heading"), "\\# heading");
/// assert_eq!(escape("  (aside)"), "  \\(aside)");
/// ```
pub fn escape(text: &str) -> Cow<'_, str> {
    let body = text.trim_start_matches(' ');
    let lead = &text[..text.len() - body.len()];
    let needs_marker = body.trim_start_matches('\\').starts_with(is_marker);

    if !needs_marker && !body.contains('#') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 4);
    out.push_str(lead);
    if needs_marker {
        out.push('\\');
    }
    for ch in body.chars() {
        if ch == '#' {
            out.push_str("\\#");
        } else {
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

/// Reverses [`escape`].
///
/// # Examples
///
/// ```rust
/// use serde_piml::scalar::unescape;
///
/// assert_eq!(unescape("\\# heading"), "# heading");
/// assert_eq!(unescape("  \\(aside)"), "  (aside)");
/// assert_eq!(unescape("C:\\temp"), "C:\\temp");
/// ```
pub fn unescape(text: &str) -> Cow<'_, str> {
    let body = text.trim_start_matches(' ');
    let lead = &text[..text.len() - body.len()];
    let strip_marker =
        body.starts_with('\\') && body.trim_start_matches('\\').starts_with(is_marker);

    if !strip_marker && !body.contains("\\#") {
        return Cow::Borrowed(text);
    }

    let body = if strip_marker { &body[1..] } else { body };
    let mut out = String::with_capacity(text.len());
    out.push_str(lead);
    out.push_str(&body.replace("\\#", "#"));
    Cow::Owned(out)
}

fn reject_nil(text: &str, kind: &str) -> Result<()> {
    if text == NIL {
        Err(Error::type_mismatch(kind, "nil (slot is not nilable)"))
    } else {
        Ok(())
    }
}

/// Parses `true` or `false`.
pub fn parse_bool(text: &str) -> Result<bool> {
    reject_nil(text, "boolean")?;
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::type_mismatch("boolean", &format!("{:?}", text))),
    }
}

fn parse_integer<T>(text: &str, kind: &str) -> Result<T>
where
    T: FromStr<Err = ParseIntError>,
{
    reject_nil(text, kind)?;
    text.parse::<T>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Error::type_mismatch(
            &format!("{} in range of {}", kind, std::any::type_name::<T>()),
            &format!("overflowing value {:?}", text),
        ),
        _ => Error::type_mismatch(kind, &format!("{:?}", text)),
    })
}

/// Parses a base-10 signed integer, failing on overflow of `T`.
///
/// # Examples
///
/// ```rust
/// use serde_piml::scalar::parse_signed;
///
/// assert_eq!(parse_signed::<i8>("-12").unwrap(), -12);
/// assert!(parse_signed::<i8>("300").is_err());
/// ```
pub fn parse_signed<T>(text: &str) -> Result<T>
where
    T: FromStr<Err = ParseIntError>,
{
    parse_integer(text, "integer")
}

/// Parses a base-10 unsigned integer, failing on overflow of `T`.
pub fn parse_unsigned<T>(text: &str) -> Result<T>
where
    T: FromStr<Err = ParseIntError>,
{
    parse_integer(text, "unsigned integer")
}

fn names_infinity(text: &str) -> bool {
    text.to_ascii_lowercase().contains("inf")
}

/// Parses a 64-bit float. Finite-looking text that overflows to infinity is
/// rejected.
pub fn parse_f64(text: &str) -> Result<f64> {
    reject_nil(text, "float")?;
    let value = text
        .parse::<f64>()
        .map_err(|_| Error::type_mismatch("float", &format!("{:?}", text)))?;
    if value.is_infinite() && !names_infinity(text) {
        return Err(Error::type_mismatch(
            "float in range of f64",
            &format!("overflowing value {:?}", text),
        ));
    }
    Ok(value)
}

/// Parses a 32-bit float, rejecting finite-looking text beyond `f32::MAX`.
pub fn parse_f32(text: &str) -> Result<f32> {
    reject_nil(text, "float")?;
    let value = text
        .parse::<f32>()
        .map_err(|_| Error::type_mismatch("float", &format!("{:?}", text)))?;
    if value.is_infinite() && !names_infinity(text) {
        return Err(Error::type_mismatch(
            "float in range of f32",
            &format!("overflowing value {:?}", text),
        ));
    }
    Ok(value)
}

/// Parses a single character.
pub fn parse_char(text: &str) -> Result<char> {
    reject_nil(text, "character")?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(Error::type_mismatch("character", &format!("{:?}", text))),
    }
}

/// Formats a timestamp in the canonical form: RFC 3339 with up to nanosecond
/// precision and `Z` for UTC.
///
/// # Examples
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use serde_piml::scalar::format_timestamp;
///
/// let ts = Utc.with_ymd_and_hms(2023, 11, 10, 15, 30, 0).unwrap();
/// assert_eq!(format_timestamp(&ts), "2023-11-10T15:30:00Z");
/// ```
pub fn format_timestamp<Tz>(ts: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses the canonical timestamp form, keeping the written offset.
pub fn parse_timestamp(text: &str) -> Result<DateTime<FixedOffset>> {
    reject_nil(text, "timestamp")?;
    DateTime::parse_from_rfc3339(text)
        .map_err(|e| Error::type_mismatch("timestamp", &format!("{:?} ({})", text, e)))
}

/// Returns the canonical text of an `i64` when `text` is exactly that, so
/// dynamic decoding can treat it as a number without losing spelling.
pub(crate) fn canonical_i64(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().filter(|n| n.to_string() == text)
}

pub(crate) fn canonical_u64(text: &str) -> Option<u64> {
    text.parse::<u64>().ok().filter(|n| n.to_string() == text)
}

pub(crate) fn canonical_f64(text: &str) -> Option<f64> {
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.to_string() == text)
}
