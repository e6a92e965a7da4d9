//! String-keyed map built on [`AvlTree`].
//!
//! # Overview
//!
//! [`Map`] is a thin layer over an `AvlTree` created with the `string` key
//! type. Unlike the tree, whose `insert` never touches an existing value,
//! [`Map::put`] overwrites the value of a key that is already present.
//! Iteration is in ascending key order.
//!
//! # Examples
//!
//! ```rust
//! use cslib::map::Map;
//!
//! let mut capitals = Map::new();
//! capitals.put("France", "Paris");
//! capitals.put("Japan", "Kyoto");
//! capitals.put("Japan", "Tokyo");
//!
//! assert_eq!(capitals.len(), 2);
//! assert_eq!(capitals.get("Japan"), Some(&"Tokyo"));
//! assert_eq!(capitals.keys().collect::<Vec<_>>(), ["France", "Japan"]);
//! ```

use std::fmt;
use std::vec;

use crate::ReferenceCounter;
use crate::bst::{AvlTree, NodeIterator, TraversalOrder};

const KEY_TYPE: &str = "string";

/// An ordered map from strings to shared values.
///
/// # Time Complexity
///
/// | Operation      | Complexity |
/// |----------------|------------|
/// | `get`          | O(log N)   |
/// | `put`          | O(log N)   |
/// | `remove`       | O(log N)   |
/// | `contains_key` | O(log N)   |
/// | `keys`/`iter`  | O(N)       |
/// | `len`          | O(1)       |
pub struct Map<V> {
    tree: AvlTree<V>,
}

impl<V> Map<V> {
    /// Creates an empty map.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: AvlTree::new(KEY_TYPE),
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map has no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Associates `value` with `key`, replacing any previous value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cslib::map::Map;
    ///
    /// let mut map = Map::new();
    /// map.put("count", 1);
    /// map.put("count", 2);
    /// assert_eq!(map.get("count"), Some(&2));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn put(&mut self, key: &str, value: V) {
        self.tree.insert(key).set_value(value);
    }

    /// Associates an already shared value with `key`, replacing any previous
    /// value.
    pub fn put_shared(&mut self, key: &str, value: ReferenceCounter<V>) {
        self.tree.insert(key).set_shared_value(value);
    }

    /// Returns the value associated with `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.tree.find(key).and_then(|node| node.value())
    }

    /// Returns the shared handle to the value associated with `key`.
    #[must_use]
    pub fn get_shared(&self, key: &str) -> Option<&ReferenceCounter<V>> {
        self.tree.find(key).and_then(|node| node.shared_value())
    }

    /// Returns `true` if `key` has an entry.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.tree.contains_key(key)
    }

    /// Removes the entry for `key`, returning `true` if there was one.
    pub fn remove(&mut self, key: &str) -> bool {
        self.tree.remove(key)
    }

    /// Calls `function` with every key and value in ascending key order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cslib::map::Map;
    ///
    /// let map: Map<u32> = [("b", 2), ("a", 1)].into_iter().collect();
    /// let mut lines = Vec::new();
    /// map.for_each(|key, value| lines.push(format!("{key}={value}")));
    /// assert_eq!(lines, ["a=1", "b=2"]);
    /// ```
    pub fn for_each<F>(&self, mut function: F)
    where
        F: FnMut(&str, &V),
    {
        for (key, value) in self {
            function(key, value);
        }
    }

    /// Returns the keys in ascending order.
    ///
    /// The keys are copied when this is called; the map may be modified while
    /// the returned iterator is in use.
    #[must_use]
    pub fn keys(&self) -> vec::IntoIter<String> {
        self.tree
            .snapshot(TraversalOrder::InOrder)
            .filter_map(|entry| entry.key.as_str().map(str::to_owned))
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Returns an iterator over the entries in ascending key order.
    #[must_use]
    pub fn iter(&self) -> MapIterator<'_, V> {
        MapIterator {
            nodes: self.tree.iter(),
        }
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the entries of a [`Map`] in ascending key order.
pub struct MapIterator<'a, V> {
    nodes: NodeIterator<'a, V>,
}

impl<'a, V> Iterator for MapIterator<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        // Every node of a map has a string key and a value.
        self.nodes
            .by_ref()
            .find_map(|node| Some((node.key().as_str()?, node.value()?)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.nodes.len()))
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<V> Default for Map<V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for Map<V> {
    /// Copies the entries; the values are shared with the original.
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: AsRef<str>, V> FromIterator<(K, V)> for Map<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: AsRef<str>, V> Extend<(K, V)> for Map<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key.as_ref(), value);
        }
    }
}

impl<'a, V> IntoIterator for &'a Map<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = MapIterator<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: PartialEq> PartialEq for Map<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<V: Eq> Eq for Map<V> {}

impl<V: fmt::Debug> fmt::Debug for Map<V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<V: fmt::Display> fmt::Display for Map<V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde
// =============================================================================

#[cfg(feature = "serde")]
impl<V: serde::Serialize> serde::Serialize for Map<V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct MapVisitor<V> {
    value_marker: std::marker::PhantomData<V>,
}

#[cfg(feature = "serde")]
impl<V> MapVisitor<V> {
    const fn new() -> Self {
        Self {
            value_marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, V: serde::Deserialize<'de>> serde::de::Visitor<'de> for MapVisitor<V> {
    type Value = Map<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map with string keys")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut map = Map::new();
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            map.put(&key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, V: serde::Deserialize<'de>> serde::Deserialize<'de> for Map<V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(MapVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================
