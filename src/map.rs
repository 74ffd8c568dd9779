//! Ordered map type for PIML records.
//!
//! [`PimlMap`] wraps an [`IndexMap`] so that a record decoded into a
//! [`PimlValue`](crate::PimlValue) keeps its keys in document order and
//! encodes back in that same order.
//!
//! ## Examples
//!
//! ```rust
//! use serde_piml::{PimlMap, PimlValue};
//!
//! let mut map = PimlMap::new();
//! map.insert("name".to_string(), PimlValue::from("Alice"));
//! map.insert("age".to_string(), PimlValue::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("age").and_then(PimlValue::as_i64), Some(30));
//! ```

use crate::PimlValue;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// An insertion-ordered map of keys to PIML values.
///
/// # Examples
///
/// ```rust
/// use serde_piml::{PimlMap, PimlValue};
///
/// let mut map = PimlMap::new();
/// map.insert("second".to_string(), PimlValue::from(2));
/// map.insert("first".to_string(), PimlValue::from(1));
///
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["second", "first"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PimlMap(IndexMap<String, PimlValue>);

impl PimlMap {
    #[must_use]
    pub fn new() -> Self {
        PimlMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        PimlMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair. A key already present keeps its position
    /// and its old value is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_piml::{PimlMap, PimlValue};
    ///
    /// let mut map = PimlMap::new();
    /// assert!(map.insert("key".to_string(), PimlValue::from(1)).is_none());
    /// assert!(map.insert("key".to_string(), PimlValue::from(2)).is_some());
    /// ```
    pub fn insert(&mut self, key: String, value: PimlValue) -> Option<PimlValue> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PimlValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut PimlValue> {
        self.0.get_mut(key)
    }

    /// Removes a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<PimlValue> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, PimlValue> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, PimlValue> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, PimlValue> {
        self.0.iter()
    }
}

impl Serialize for PimlMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

impl From<HashMap<String, PimlValue>> for PimlMap {
    fn from(map: HashMap<String, PimlValue>) -> Self {
        PimlMap(map.into_iter().collect())
    }
}

impl From<PimlMap> for HashMap<String, PimlValue> {
    fn from(map: PimlMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for PimlMap {
    type Item = (String, PimlValue);
    type IntoIter = indexmap::map::IntoIter<String, PimlValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PimlMap {
    type Item = (&'a String, &'a PimlValue);
    type IntoIter = indexmap::map::Iter<'a, String, PimlValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, PimlValue)> for PimlMap {
    fn from_iter<T: IntoIterator<Item = (String, PimlValue)>>(iter: T) -> Self {
        PimlMap(IndexMap::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_keeps_order() {
        let mut map: PimlMap = ["a", "b", "c"]
            .iter()
            .map(|k| (k.to_string(), PimlValue::Nil))
            .collect();
        map.remove("b");
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "c"]);
        assert!(!map.contains_key("b"));
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut map = PimlMap::new();
        map.insert("x".into(), PimlValue::from(1));
        map.insert("y".into(), PimlValue::from(2));
        map.insert("x".into(), PimlValue::from(3));
        let entries: Vec<_> = map.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
        assert_eq!(
            entries,
            vec![("x", PimlValue::from(3)), ("y", PimlValue::from(2))]
        );
    }
}
