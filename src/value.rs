//! Dynamic value representation for PIML data.
//!
//! This module provides [`PimlValue`], which can hold any PIML value tree.
//! It's useful when the document structure isn't known at compile time, and
//! as the type of a "dynamic" slot inside an otherwise typed record.
//!
//! ## Creating Values
//!
//! ```rust
//! use serde_piml::{piml, PimlValue};
//!
//! let nil = PimlValue::Nil;
//! let text = PimlValue::from("hello");
//! let number = PimlValue::from(42);
//!
//! let record = piml!({
//!     "name": "Alice",
//!     "roles": ["admin", "dev"]
//! });
//! assert_eq!(record.get("name").and_then(PimlValue::as_str), Some("Alice"));
//! ```
//!
//! ## Decoding Unknown Documents
//!
//! Scalars keep their exact spelling; typed accessors parse on demand.
//!
//! ```rust
//! use serde_piml::{from_str, PimlValue};
//!
//! let doc: PimlValue = from_str("(port) 8080\n(tags)\n  > a\n  > b\n").unwrap();
//! assert_eq!(doc.get("port").and_then(PimlValue::as_u64), Some(8080));
//! assert_eq!(doc.get("tags").and_then(PimlValue::as_list).map(Vec::len), Some(2));
//! ```

use crate::de::{SET_KEY, VALUE_TOKEN};
use crate::scalar::{self, NIL};
use crate::PimlMap;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A dynamically-typed PIML value tree.
///
/// # Examples
///
/// ```rust
/// use serde_piml::PimlValue;
///
/// let value = PimlValue::from(true);
/// assert_eq!(value.as_str(), Some("true"));
/// assert_eq!(value.as_bool(), Some(true));
/// assert!(PimlValue::Nil.is_nil());
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum PimlValue {
    #[default]
    Nil,
    /// Scalar text exactly as written.
    Scalar(String),
    Timestamp(DateTime<FixedOffset>),
    Record(PimlMap),
    List(Vec<PimlValue>),
    /// Members of a `>|` block. Encoded as a list.
    Set(Vec<String>),
}

impl PimlValue {
    /// Returns `true` for [`PimlValue::Nil`].
    #[inline]
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, PimlValue::Nil)
    }

    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, PimlValue::Scalar(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_record(&self) -> bool {
        matches!(self, PimlValue::Record(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, PimlValue::List(_))
    }

    /// Returns the scalar text, if this is a scalar.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PimlValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Parses a scalar as a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        self.as_str().and_then(|s| scalar::parse_bool(s).ok())
    }

    /// Parses a scalar as a signed integer.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_piml::PimlValue;
    ///
    /// assert_eq!(PimlValue::from("-7").as_i64(), Some(-7));
    /// assert_eq!(PimlValue::from("seven").as_i64(), None);
    /// ```
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_str().and_then(|s| scalar::parse_signed(s).ok())
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.as_str().and_then(|s| scalar::parse_unsigned(s).ok())
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_str().and_then(|s| scalar::parse_f64(s).ok())
    }

    #[inline]
    #[must_use]
    pub fn as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            PimlValue::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_record(&self) -> Option<&PimlMap> {
        match self {
            PimlValue::Record(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&Vec<PimlValue>> {
        match self {
            PimlValue::List(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_set(&self) -> Option<&Vec<String>> {
        match self {
            PimlValue::Set(members) => Some(members),
            _ => None,
        }
    }

    /// Looks up a key in a record. Returns `None` for any other variant.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PimlValue> {
        self.as_record().and_then(|map| map.get(key))
    }
}

impl fmt::Display for PimlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PimlValue::Nil => f.write_str(NIL),
            PimlValue::Scalar(s) => f.write_str(s),
            PimlValue::Timestamp(ts) => f.write_str(&scalar::format_timestamp(ts)),
            _ => {
                let text = crate::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&text)
            }
        }
    }
}

impl Serialize for PimlValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PimlValue::Nil => serializer.serialize_none(),
            PimlValue::Scalar(s) => serializer.serialize_str(s),
            PimlValue::Timestamp(ts) => serializer.serialize_str(&scalar::format_timestamp(ts)),
            PimlValue::Record(map) => map.serialize(serializer),
            PimlValue::List(items) => serializer.collect_seq(items),
            PimlValue::Set(members) => serializer.collect_seq(members),
        }
    }
}

impl<'de> Deserialize<'de> for PimlValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct PimlValueVisitor;

        impl<'de> Visitor<'de> for PimlValueVisitor {
            type Value = PimlValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any PIML value")
            }

            fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserializer.deserialize_any(self)
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(PimlValue::from(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(PimlValue::from(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(PimlValue::from(value))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(PimlValue::from(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(scalar_or_timestamp(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(scalar_or_timestamp(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(PimlValue::Nil)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(PimlValue::Nil)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(PimlValue::List(items))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut record = PimlMap::new();
                let first = match map.next_key::<String>()? {
                    Some(key) => key,
                    None => return Ok(PimlValue::Record(record)),
                };
                if first == SET_KEY {
                    return Ok(PimlValue::Set(map.next_value()?));
                }
                record.insert(first, map.next_value()?);
                while let Some((key, value)) = map.next_entry()? {
                    record.insert(key, value);
                }
                Ok(PimlValue::Record(record))
            }
        }

        deserializer.deserialize_newtype_struct(VALUE_TOKEN, PimlValueVisitor)
    }
}

/// Text that is exactly a canonical timestamp becomes a timestamp.
fn scalar_or_timestamp(text: String) -> PimlValue {
    match scalar::parse_timestamp(&text) {
        Ok(ts) if scalar::format_timestamp(&ts) == text => PimlValue::Timestamp(ts),
        _ => PimlValue::Scalar(text),
    }
}

macro_rules! from_display {
    ($($ty:ty)*) => {
        $(
            impl From<$ty> for PimlValue {
                fn from(value: $ty) -> Self {
                    PimlValue::Scalar(value.to_string())
                }
            }
        )*
    };
}

from_display! { bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char }

impl From<String> for PimlValue {
    fn from(value: String) -> Self {
        PimlValue::Scalar(value)
    }
}

impl From<&str> for PimlValue {
    fn from(value: &str) -> Self {
        PimlValue::Scalar(value.to_string())
    }
}

impl<T: Into<PimlValue>> From<Option<T>> for PimlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PimlValue::Nil, Into::into)
    }
}

impl From<DateTime<FixedOffset>> for PimlValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        PimlValue::Timestamp(value)
    }
}

impl From<DateTime<Utc>> for PimlValue {
    fn from(value: DateTime<Utc>) -> Self {
        PimlValue::Timestamp(value.into())
    }
}

impl From<Vec<PimlValue>> for PimlValue {
    fn from(value: Vec<PimlValue>) -> Self {
        PimlValue::List(value)
    }
}

impl From<PimlMap> for PimlValue {
    fn from(value: PimlMap) -> Self {
        PimlValue::Record(value)
    }
}
