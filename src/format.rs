//! PIML format reference
//!
//! This module documents the PIML text format as read and written by this
//! library. It contains no code.
//!
//! # Overview
//!
//! PIML is an indentation-based format for hand-written configuration and
//! content files. Keys sit in parentheses, nesting is expressed only through
//! leading spaces, and list, set and multi-line text blocks each have their
//! own line prefix.
//!
//! # Lines
//!
//! Every physical line is classified on its own, after comment stripping:
//!
//! | Line                | Meaning                                  |
//! |---------------------|------------------------------------------|
//! | `(key) value`       | key with an inline scalar                |
//! | `(key)`             | key whose value is the indented block below |
//! | `> value`           | list element                             |
//! | `> (Label)`         | list element that is a record; the label is informational |
//! | `>\| value`         | set member                               |
//! | any other text      | a line of a multi-line string            |
//!
//! Keys may contain spaces and any character except `)`.
//!
//! ## Indentation
//!
//! Only spaces count. A tab in the indentation is a syntax error. A block
//! belongs to the line that opened it and runs over every following line
//! indented deeper than that line; the first line at or left of the opener
//! ends it. The encoder writes two spaces per level (configurable); the
//! decoder accepts any widths as long as nesting strictly deepens.
//!
//! ```text
//! (server)
//!   (host) localhost
//!   (port) 8080
//! (debug) false
//! ```
//!
//! ## One kind per block
//!
//! The children of a `(key)` header are all keys, all list items, all set
//! members or all text lines. Mixing them is a syntax error.
//!
//! # Values
//!
//! ## Scalars
//!
//! | Kind      | Text                                              |
//! |-----------|---------------------------------------------------|
//! | nil       | `nil`                                             |
//! | boolean   | `true`, `false`                                   |
//! | integer   | base 10, range-checked against the field type     |
//! | float     | Rust float syntax, range-checked on narrowing     |
//! | timestamp | RFC 3339, `Z` for UTC, up to nanoseconds          |
//! | string    | everything else, trimmed                          |
//!
//! `nil` is only accepted where a value may be absent: `Option`, lists,
//! maps, sets and [`PimlValue`](crate::PimlValue). An empty list or map is
//! written as `nil` too, so the two read back the same way.
//!
//! ## Lists
//!
//! ```text
//! (tags)
//!   > web
//!   > docs
//! (admins)
//!   > (User)
//!     (id) 1
//!     (name) Ann
//! ```
//!
//! ## Sets
//!
//! ```text
//! (roles)
//!   >| admin
//!   >| dev
//! ```
//!
//! Sets decode into `HashSet`/`BTreeSet`, or into a map from member to
//! `bool` or `()`. They are written back as lists.
//!
//! ## Multi-line strings
//!
//! ```text
//! (description)
//!   This is a multi-line
//!   description for the site.
//!
//!   as well
//! ```
//!
//! decodes to `"This is a multi-line\ndescription for the site.\n\nas well"`.
//! The first line sets the base indentation, which is removed from every
//! line; deeper lines keep their extra spaces. Blank lines between text
//! lines are kept.
//!
//! # Comments and escaping
//!
//! The first `#` not preceded by a backslash starts a comment, on any line.
//! The encoder writes every `#` in a key or value as `\#`, and puts a
//! backslash before a value that would otherwise start with `(` or `>`:
//!
//! ```text
//! (color) \#ff0000   # a literal hash
//! (note) \(not a key)
//! ```
//!
//! # Mapping to Rust types
//!
//! | PIML concept             | Rust                                   |
//! |--------------------------|----------------------------------------|
//! | record                   | struct with `#[derive(Deserialize)]`   |
//! | explicit key             | `#[serde(rename = "first name")]`      |
//! | excluded field           | `#[serde(skip)]`                       |
//! | promoted embedded record | `#[serde(flatten)]`                    |
//! | nilable slot             | `Option<T>`, `Vec<T>`, maps, sets      |
//! | dynamic slot             | [`PimlValue`](crate::PimlValue)        |
//! | unit enum                | variant name as scalar                 |
//!
//! Keys match field names exactly first, then ignoring ASCII case. Keys that
//! match no field are skipped along with their whole block. Within one
//! record a key may appear once; a repeated key is a syntax error. Maps keep
//! the last value of a repeated key.
//!
//! ## Flattened records
//!
//! serde reads a struct holding a `#[serde(flatten)]` field as a map, so the
//! decoder no longer sees its field list. For such a struct:
//!
//! - keys must match field names exactly, case folding does not apply;
//! - promoted values are inferred before they reach their field, so a
//!   `String` field whose text reads as a number, `true`/`false` or `nil`
//!   fails with a type mismatch;
//! - with [`PimlOptions::sort_map_keys`](crate::PimlOptions) its keys are
//!   written sorted.
//!
//! ```rust
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Build { version: String }
//!
//! #[derive(Deserialize)]
//! struct App {
//!     name: String,
//!     #[serde(flatten)]
//!     build: Build,
//! }
//!
//! let app: App = serde_piml::from_str("(name) demo\n(version) v2\n").unwrap();
//! assert_eq!(app.build.version, "v2");
//! assert!(serde_piml::from_str::<App>("(name) demo\n(version) 2\n").is_err());
//! ```
