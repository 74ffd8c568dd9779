//! # serde_piml
//!
//! A Serde-compatible serialization library for PIML, a hand-editable,
//! indentation-based data format with parenthesized keys.
//!
//! ## What is PIML?
//!
//! ```text
//! (site name) Example        # keys may contain spaces
//! (port) 8080
//! (tags)
//!   > web
//!   > docs
//! (description)
//!   A multi-line
//!   text block.
//! ```
//!
//! Nesting is carried by indentation alone, `>` starts a list element, `>|`
//! a set member, and unprefixed indented lines form a multi-line string. See
//! the [`format`] module for the full grammar.
//!
//! ## Key Features
//!
//! - **Serde Compatible**: works with `#[derive(Serialize, Deserialize)]`,
//!   including `rename`, `skip`, `flatten` and `default`
//! - **Streaming Decoder**: one line of lookahead, no intermediate tree
//! - **Lenient Keys**: unknown keys are skipped, keys match fields ignoring
//!   ASCII case (except in structs with a `#[serde(flatten)]` field, see
//!   [`format`])
//! - **Precise Errors**: syntax errors carry the line, type errors the key
//!   path
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_piml::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     #[serde(rename = "first name")]
//!     first_name: String,
//!     active: bool,
//! }
//!
//! let user = User { id: 7, first_name: "Ann".to_string(), active: true };
//!
//! let piml = to_string(&user).unwrap();
//! assert_eq!(piml, "(id) 7\n(first name) Ann\n(active) true\n");
//!
//! let user_back: User = from_str(&piml).unwrap();
//! assert_eq!(user, user_back);
//! ```
//!
//! ### Lists of Records
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_piml::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Product { id: u32, name: String }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Catalog { products: Vec<Product> }
//!
//! let catalog = Catalog {
//!     products: vec![
//!         Product { id: 1, name: "Widget".to_string() },
//!         Product { id: 2, name: "Gadget".to_string() },
//!     ],
//! };
//!
//! let piml = to_string(&catalog).unwrap();
//! assert!(piml.starts_with("(products)\n  > (Product)\n    (id) 1\n"));
//! assert_eq!(from_str::<Catalog>(&piml).unwrap(), catalog);
//! ```
//!
//! ### Dynamic Values with the piml! Macro
//!
//! ```rust
//! use serde_piml::{piml, PimlValue};
//!
//! let data = piml!({
//!     "name": "Alice",
//!     "tags": ["rust", "serde"]
//! });
//! assert_eq!(data.get("name").and_then(PimlValue::as_str), Some("Alice"));
//! ```
//!
//! ## Logging
//!
//! Diagnostic events go through [`tracing`]: skipped unknown keys at debug
//! level, collections collapsed to `nil` at trace level, and the depth guard
//! at warn level. Nothing is emitted unless a subscriber is installed.

pub mod de;
pub mod error;
pub mod format;
pub mod line;
pub mod macros;
pub mod map;
pub mod options;
pub mod resolve;
pub mod scalar;
pub mod ser;
pub mod timestamp;
pub mod value;

pub use de::Deserializer;
pub use error::{Error, Result};
pub use map::PimlMap;
pub use options::PimlOptions;
pub use ser::Serializer;
pub use value::PimlValue;

use serde::{Deserialize, Serialize};
use std::io;

/// Serialize any `T: Serialize` to a PIML string.
///
/// # Examples
///
/// ```rust
/// use serde_piml::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), "(x) 1\n(y) 2\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for values with no PIML form: a bare
/// scalar at the top level, lists of lists, enum variants carrying data, and
/// map keys that are not strings.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, PimlOptions::default())
}

/// Serialize any `T: Serialize` to a PIML string with custom options.
///
/// # Examples
///
/// ```rust
/// use serde_piml::{to_string_with_options, PimlOptions};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Outer { inner: Inner }
/// #[derive(Serialize)]
/// struct Inner { x: i32 }
///
/// let options = PimlOptions::new().with_indent(4);
/// let piml = to_string_with_options(&Outer { inner: Inner { x: 1 } }, options).unwrap();
/// assert_eq!(piml, "(inner)\n    (x) 1\n");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: PimlOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let mut serializer = Serializer::new(options);
    value.serialize(&mut serializer)?;
    Ok(serializer.into_inner())
}

/// Convert any `T: Serialize` into a [`PimlValue`] tree.
///
/// The value goes through the same encoder as [`to_string`], so the result
/// is what decoding its PIML text would give: empty collections become
/// [`PimlValue::Nil`] and scalars keep their written spelling. Unlike
/// [`to_string`], a bare scalar is accepted.
///
/// # Examples
///
/// ```rust
/// use serde_piml::{to_value, PimlValue};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert!(value.is_record());
/// assert_eq!(value.get("y").and_then(PimlValue::as_i64), Some(2));
/// assert_eq!(to_value(&7).unwrap(), PimlValue::from(7));
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<PimlValue>
where
    T: ?Sized + Serialize,
{
    let mut wrapper = std::collections::BTreeMap::new();
    wrapper.insert(VALUE_SLOT, value);
    let piml = to_string(&wrapper)?;
    match from_str::<PimlValue>(&piml)? {
        PimlValue::Record(mut record) => Ok(record.remove(VALUE_SLOT).unwrap_or_default()),
        other => Ok(other),
    }
}

const VALUE_SLOT: &str = "value";

/// Serialize any `T: Serialize` to PIML bytes.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    to_string(value).map(String::into_bytes)
}

/// Serialize any `T: Serialize` to a writer in PIML format.
///
/// # Examples
///
/// ```rust
/// use serde_piml::to_writer;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(buffer, b"(x) 1\n(y) 2\n");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, PimlOptions::default())
}

/// Serialize any `T: Serialize` to a writer in PIML format with custom options.
///
/// The document is rendered completely before anything is written.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: PimlOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let piml = to_string_with_options(value, options)?;
    writer
        .write_all(piml.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Deserialize an instance of type `T` from a string of PIML text.
///
/// # Examples
///
/// ```rust
/// use serde_piml::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("(x) 1\n(y) 2\n").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns [`Error::Syntax`] for malformed lines, [`Error::TypeMismatch`] for
/// scalars that do not fit their field, and [`Error::InvalidTarget`] when `T`
/// is a bare scalar type.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<'a, T>(s: &'a str) -> Result<T>
where
    T: Deserialize<'a>,
{
    from_str_with_options(s, PimlOptions::default())
}

/// Deserialize an instance of type `T` from PIML text with custom options.
///
/// # Examples
///
/// ```rust
/// use serde_piml::{from_str_with_options, Error, PimlOptions, PimlValue};
///
/// let options = PimlOptions::new().with_max_depth(2);
/// let err = from_str_with_options::<PimlValue>("(a)\n  (b)\n    (c) 1\n", options).unwrap_err();
/// assert!(matches!(err, Error::DepthLimitExceeded { .. }));
/// ```
///
/// # Errors
///
/// As [`from_str`], plus [`Error::DepthLimitExceeded`] when the document nests
/// deeper than `options.max_depth`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options<'a, T>(s: &'a str, options: PimlOptions) -> Result<T>
where
    T: Deserialize<'a>,
{
    let mut deserializer = Deserializer::with_options(s, options);
    let value = T::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

/// Deserialize an instance of type `T` from an I/O stream of PIML.
///
/// # Examples
///
/// ```rust
/// use serde_piml::from_reader;
/// use serde::Deserialize;
/// use std::io::Cursor;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_reader(Cursor::new(b"(x) 1\n(y) 2\n")).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if reading from the reader fails, the input is not valid
/// PIML, or the data cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: for<'de> Deserialize<'de>,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// Deserialize an instance of type `T` from bytes of PIML text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, not valid PIML, or
/// cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<'a, T>(v: &'a [u8]) -> Result<T>
where
    T: Deserialize<'a>,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
    }

    fn sample_user() -> User {
        User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "user".to_string()],
        }
    }

    #[test]
    fn test_serialize_deserialize_point() {
        let point = Point { x: 1, y: -2 };
        let piml = to_string(&point).unwrap();
        let point_back: Point = from_str(&piml).unwrap();
        assert_eq!(point, point_back);
    }

    #[test]
    fn test_serialize_deserialize_user() {
        let user = sample_user();
        let piml = to_string(&user).unwrap();
        assert_eq!(
            piml,
            "(id) 123\n(name) Alice\n(active) true\n(tags)\n  > admin\n  > user\n"
        );
        let user_back: User = from_str(&piml).unwrap();
        assert_eq!(user, user_back);
    }

    #[test]
    fn test_arrays_at_root() {
        let numbers = vec![1, 2, 3, 4, 5];
        let piml = to_string(&numbers).unwrap();
        let numbers_back: Vec<i32> = from_str(&piml).unwrap();
        assert_eq!(numbers, numbers_back);
    }

    #[test]
    fn test_custom_options() {
        let user = sample_user();
        let options = PimlOptions::new().with_indent(3);
        let piml = to_string_with_options(&user, options).unwrap();
        assert!(piml.contains("\n   > admin\n"));
        let user_back: User = from_str(&piml).unwrap();
        assert_eq!(user, user_back);
    }

    #[test]
    fn test_bytes_and_writer() {
        let user = sample_user();
        let bytes = to_vec(&user).unwrap();
        assert_eq!(from_slice::<User>(&bytes).unwrap(), user);

        let mut buffer = Vec::new();
        to_writer(&mut buffer, &user).unwrap();
        assert_eq!(buffer, bytes);
        assert_eq!(from_reader::<_, User>(buffer.as_slice()).unwrap(), user);
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(from_slice::<Point>(&[b'(', 0xff, b')']).is_err());
    }

    #[test]
    fn test_to_value() {
        let value = to_value(&sample_user()).unwrap();
        assert_eq!(value.get("name").and_then(PimlValue::as_str), Some("Alice"));
        assert_eq!(
            value.get("tags").and_then(PimlValue::as_list).map(Vec::len),
            Some(2)
        );

        assert_eq!(to_value("line one\nline two").unwrap().as_str(), Some("line one\nline two"));
        assert_eq!(to_value(&Option::<u8>::None).unwrap(), PimlValue::Nil);
        assert_eq!(to_value(&Vec::<u8>::new()).unwrap(), PimlValue::Nil);
        assert!(matches!(
            to_value(&vec![vec![1]]),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_trailing_line_after_list() {
        let err = from_str::<Vec<i32>>("> 1\n(key) 2\n").unwrap_err();
        assert!(err.is_syntax());
    }
}
