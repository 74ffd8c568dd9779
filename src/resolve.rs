//! Key-to-field resolution for record decoding.
//!
//! A record's slot table is the list of field names serde hands the decoder
//! (already reflecting `#[serde(rename)]` tags and `#[serde(skip)]`
//! exclusions). A document key resolves to a field by exact match first and
//! then by ASCII case-insensitive match; anything else is ignored.

/// Result of matching a document key against a record's fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The key is a field name as written.
    Exact,
    /// The key matches a field name ignoring ASCII case.
    Folded(&'static str),
    /// No field accepts the key.
    NotFound,
}

/// Matches `key` against `fields`.
///
/// # Examples
///
/// ```rust
/// use serde_piml::resolve::{resolve, Resolution};
///
/// const FIELDS: &[&str] = &["name", "email"];
/// assert_eq!(resolve(FIELDS, "name"), Resolution::Exact);
/// assert_eq!(resolve(FIELDS, "Email"), Resolution::Folded("email"));
/// assert_eq!(resolve(FIELDS, "phone"), Resolution::NotFound);
/// ```
pub fn resolve(fields: &'static [&'static str], key: &str) -> Resolution {
    if fields.iter().any(|field| *field == key) {
        return Resolution::Exact;
    }
    fields
        .iter()
        .find(|field| field.eq_ignore_ascii_case(key))
        .map_or(Resolution::NotFound, |field| Resolution::Folded(field))
}
