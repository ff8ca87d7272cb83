//! Side-channel properties attached to requests and responses.
//!
//! # Responsibilities
//! - Carry named values between policies, matchers and origins of one call
//! - Keep values typed: readers ask for the type they expect
//!
//! # Design Decisions
//! - String keys, heterogeneous values behind `Arc<dyn Any>`
//! - Values are immutable once inserted; cloning a map is cheap and never
//!   aliases mutable state between the caller's request and the working copy

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Value = Arc<dyn Any + Send + Sync>;

/// String-keyed typed extension map.
#[derive(Clone, Default)]
pub struct Properties {
    inner: HashMap<String, Value>,
}

impl Properties {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning true if a previous value was replaced.
    pub fn insert<T>(&mut self, key: impl Into<String>, value: T) -> bool
    where
        T: Any + Send + Sync,
    {
        self.inner.insert(key.into(), Arc::new(value)).is_some()
    }

    /// Get a value by key, if present and of type `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.inner
            .get(key)
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Remove a value by key. Returns true if the key was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.inner.remove(key).is_some()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over the stored keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }
}

impl fmt::Debug for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Properties").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_get() {
        let mut props = Properties::new();
        props.insert("user", String::from("alice"));
        props.insert("tier", 3u8);

        assert_eq!(props.get::<String>("user").map(String::as_str), Some("alice"));
        assert_eq!(props.get::<u8>("tier"), Some(&3));
        // Wrong type reads as absent
        assert_eq!(props.get::<u32>("tier"), None);
        assert_eq!(props.get::<u8>("missing"), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = Properties::new();
        original.insert("a", 1u32);

        let mut copy = original.clone();
        copy.insert("b", 2u32);
        assert!(copy.insert("a", 10u32));

        assert_eq!(original.len(), 1);
        assert_eq!(original.get::<u32>("a"), Some(&1));
        assert_eq!(copy.get::<u32>("a"), Some(&10));
    }

    #[test]
    fn test_debug_lists_sorted_keys() {
        let mut props = Properties::new();
        props.insert("z", ());
        props.insert("a", ());
        assert_eq!(format!("{:?}", props), r#"Properties { keys: ["a", "z"] }"#);
    }
}
