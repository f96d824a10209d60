//! # Route Values
//!
//! [`RouteValues`] is the key/value bag that flows through both directions of
//! routing: the matcher fills one with the parameters it extracts from a
//! request path, and the link generator consumes explicit and ambient values
//! to build a path.
//!
//! Keys compare ASCII case-insensitively and are unique within one instance.
//! Insertion order is preserved only so query strings are emitted in the order
//! the caller supplied them; it carries no other meaning.
//!
//! Storage mirrors the request hot path: keys are `Arc<str>` (usually shared
//! with the route pattern that declared them) and entries live inline in a
//! `SmallVec` until more than [`MAX_INLINE_VALUES`] are present.

use serde::ser::{Serialize, SerializeMap, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Number of values stored inline before spilling to the heap.
pub const MAX_INLINE_VALUES: usize = 8;

/// Inline storage for route values.
pub type ValueVec = SmallVec<[(Arc<str>, String); MAX_INLINE_VALUES]>;

/// Case-insensitive mapping from parameter name to value.
#[derive(Clone, Default)]
pub struct RouteValues {
    entries: ValueVec,
}

impl RouteValues {
    /// Create an empty value set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a value by key (ASCII case-insensitive).
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key).map(|i| self.entries[i].1.as_str())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Insert or replace a value, returning the previous one.
    ///
    /// Replacing keeps the entry's original position and key spelling.
    pub fn insert(&mut self, key: impl Into<Arc<str>>, value: impl ToString) -> Option<String> {
        let key = key.into();
        let value = value.to_string();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_ref())
    }

    /// Append without checking for an existing key.
    ///
    /// Callers guarantee uniqueness (pattern parameter names are unique).
    #[inline]
    pub(crate) fn push_unique(&mut self, key: Arc<str>, value: String) {
        self.entries.push((key, value));
    }

    /// Drop entries past `len`; used to unwind speculative captures.
    #[inline]
    pub(crate) fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    #[inline]
    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))
    }
}

/// Compare two optional route values the way routing does: ASCII
/// case-insensitive, with an empty string equal to an absent value.
#[inline]
#[must_use]
pub fn values_equal(a: Option<&str>, b: Option<&str>) -> bool {
    let a = a.unwrap_or("");
    let b = b.unwrap_or("");
    a.eq_ignore_ascii_case(b)
}

impl PartialEq for RouteValues {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for RouteValues {}

impl fmt::Debug for RouteValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for RouteValues
where
    K: Into<Arc<str>>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (k, v) in iter {
            values.insert(k, v);
        }
        values
    }
}

impl<K, V> Extend<(K, V)> for RouteValues
where
    K: Into<Arc<str>>,
    V: ToString,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl Serialize for RouteValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Build a [`RouteValues`] from `key => value` pairs.
///
/// ```
/// use routeweave::route_values;
///
/// let values = route_values! { "controller" => "Customers", "id" => 10 };
/// assert_eq!(values.get("ID"), Some("10"));
/// ```
#[macro_export]
macro_rules! route_values {
    () => {
        $crate::RouteValues::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut values = $crate::RouteValues::new();
        $( values.insert($key, $value); )+
        values
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut values = RouteValues::new();
        values.insert("Controller", "Home");
        assert_eq!(values.get("controller"), Some("Home"));
        assert_eq!(values.insert("CONTROLLER", "About"), Some("Home".to_string()));
        assert_eq!(values.len(), 1);
        assert_eq!(values.keys().next(), Some("Controller"));
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = route_values! { "a" => 1, "b" => 2 };
        let b = route_values! { "B" => 2, "A" => 1 };
        assert_eq!(a, b);
        assert_ne!(a, route_values! { "a" => 1 });
    }

    #[test]
    fn test_values_equal_treats_empty_as_absent() {
        assert!(values_equal(None, Some("")));
        assert!(values_equal(Some("US"), Some("us")));
        assert!(!values_equal(Some("US"), None));
    }

    #[test]
    fn test_truncate_unwinds_captures() {
        let mut values = route_values! { "a" => "1" };
        let mark = values.len();
        values.push_unique(Arc::from("b"), "2".to_string());
        values.truncate(mark);
        assert!(!values.contains_key("b"));
    }

    #[test]
    fn test_serializes_as_map() {
        let values = route_values! { "id" => 10, "region" => "US" };
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"{"id":"10","region":"US"}"#);
    }
}
