//! Serde helpers that pin timestamp fields to the canonical PIML form.
//!
//! Use with `#[serde(with = "serde_piml::timestamp")]` on a `DateTime<Utc>`
//! or `DateTime<FixedOffset>` field, and `serde_piml::timestamp::option`
//! for an `Option` of either.
//!
//! ```rust
//! use chrono::{DateTime, TimeZone, Utc};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Event {
//!     #[serde(with = "serde_piml::timestamp")]
//!     at: DateTime<Utc>,
//!     #[serde(with = "serde_piml::timestamp::option", default)]
//!     ended: Option<DateTime<Utc>>,
//! }
//!
//! let event = Event {
//!     at: Utc.with_ymd_and_hms(2023, 11, 10, 15, 30, 0).unwrap(),
//!     ended: None,
//! };
//! let piml = serde_piml::to_string(&event).unwrap();
//! assert_eq!(piml, "(at) 2023-11-10T15:30:00Z\n(ended) nil\n");
//! assert_eq!(serde_piml::from_str::<Event>(&piml).unwrap(), event);
//! ```

use crate::scalar::{format_timestamp, parse_timestamp};
use chrono::{DateTime, FixedOffset, TimeZone};
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::Serializer;
use std::borrow::Cow;
use std::fmt;

pub fn serialize<Tz, S>(value: &DateTime<Tz>, serializer: S) -> Result<S::Ok, S::Error>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(value))
}

pub fn deserialize<'de, Tz, D>(deserializer: D) -> Result<DateTime<Tz>, D::Error>
where
    Tz: TimeZone,
    DateTime<Tz>: From<DateTime<FixedOffset>>,
    D: Deserializer<'de>,
{
    let text = Cow::<'de, str>::deserialize(deserializer)?;
    parse(&text)
}

fn parse<Tz, E>(text: &str) -> Result<DateTime<Tz>, E>
where
    Tz: TimeZone,
    DateTime<Tz>: From<DateTime<FixedOffset>>,
    E: de::Error,
{
    parse_timestamp(text).map(DateTime::from).map_err(|_| {
        E::invalid_value(de::Unexpected::Str(text), &"a canonical RFC 3339 timestamp")
    })
}

/// The same conversion for optional timestamps; `nil` maps to `None`.
pub mod option {
    use super::*;

    pub fn serialize<Tz, S>(value: &Option<DateTime<Tz>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_some(&format_timestamp(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, Tz, D>(deserializer: D) -> Result<Option<DateTime<Tz>>, D::Error>
    where
        Tz: TimeZone,
        DateTime<Tz>: From<DateTime<FixedOffset>>,
        D: Deserializer<'de>,
    {
        let text = Option::<Cow<'de, str>>::deserialize(deserializer)?;
        text.map(|text| parse(&text)).transpose()
    }
}
