//! Configuration options for PIML serialization and deserialization.
//!
//! [`PimlOptions`] controls:
//!
//! - the number of spaces per nesting level the encoder writes,
//! - whether map entries are emitted in sorted key order,
//! - how deeply nested a document the decoder accepts.
//!
//! ## Examples
//!
//! ```rust
//! use serde_piml::{to_string_with_options, PimlOptions};
//! use std::collections::HashMap;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Headers { headers: HashMap<String, String> }
//!
//! let mut headers = HashMap::new();
//! headers.insert("b".to_string(), "2".to_string());
//! headers.insert("a".to_string(), "1".to_string());
//!
//! let options = PimlOptions::new().with_sorted_map_keys(true);
//! let piml = to_string_with_options(&Headers { headers }, options).unwrap();
//! assert_eq!(piml, "(headers)\n  (a) 1\n  (b) 2\n");
//! ```

/// Default nesting limit accepted by the decoder.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configuration options for PIML encoding and decoding.
///
/// # Examples
///
/// ```rust
/// use serde_piml::PimlOptions;
///
/// let options = PimlOptions::new()
///     .with_indent(4)
///     .with_sorted_map_keys(true)
///     .with_max_depth(32);
/// assert_eq!(options.indent, 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PimlOptions {
    /// Spaces per nesting level in encoded output.
    pub indent: usize,
    /// Emit map entries sorted by key instead of iteration order.
    pub sort_map_keys: bool,
    /// Maximum nesting depth the decoder will descend into.
    pub max_depth: usize,
}

impl Default for PimlOptions {
    fn default() -> Self {
        PimlOptions {
            indent: 2,
            sort_map_keys: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl PimlOptions {
    /// Creates default options (2-space indent, unsorted maps, depth 128).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_piml::PimlOptions;
    ///
    /// let options = PimlOptions::new();
    /// assert_eq!(options.indent, 2);
    /// assert!(!options.sort_map_keys);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// Nesting is only visible through indentation, so the width is never
    /// allowed to drop below one space.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_piml::PimlOptions;
    ///
    /// assert_eq!(PimlOptions::new().with_indent(4).indent, 4);
    /// assert_eq!(PimlOptions::new().with_indent(0).indent, 1);
    /// ```
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent.max(1);
        self
    }

    /// Emit map entries in lexicographic key order for deterministic output.
    #[must_use]
    pub fn with_sorted_map_keys(mut self, sort: bool) -> Self {
        self.sort_map_keys = sort;
        self
    }

    /// Sets the deepest nesting level the decoder accepts before failing with
    /// [`Error::DepthLimitExceeded`](crate::Error::DepthLimitExceeded).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub(crate) fn indent_str(&self, level: usize) -> String {
        " ".repeat(level * self.indent)
    }
}
