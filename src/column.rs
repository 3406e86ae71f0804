//! Mapping from sortable column names to key comparators
//!
//! A [`ColumnMap`] is built once per entity type by the caller. Each entry
//! erases the concrete key type behind a comparator, so columns with
//! different key types (strings, integers, dates) live in the same map.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Type-erased comparison of two records by one column
pub type KeyCompare<'a, T> = dyn Fn(&T, &T) -> Ordering + Send + Sync + 'a;

/// Column name to key comparator table
pub struct ColumnMap<'a, T> {
    columns: BTreeMap<String, Box<KeyCompare<'a, T>>>,
}

impl<'a, T> ColumnMap<'a, T> {
    pub fn new() -> Self {
        Self {
            columns: BTreeMap::new(),
        }
    }

    /// Add a column whose key is an owned, totally ordered value
    pub fn column<K, F>(mut self, name: impl Into<String>, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'a,
    {
        self.insert(name, key);
        self
    }

    /// Add a column whose key borrows from the record, e.g. a `&str` field
    pub fn column_ref<K, F>(mut self, name: impl Into<String>, key: F) -> Self
    where
        K: Ord + ?Sized,
        F: Fn(&T) -> &K + Send + Sync + 'a,
    {
        self.insert_ref(name, key);
        self
    }

    /// Add a column compared by an explicit function, for keys without `Ord`
    pub fn column_by<F>(mut self, name: impl Into<String>, compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'a,
    {
        self.insert_by(name, compare);
        self
    }

    /// Insert a column, returning `true` if an existing one was replaced
    pub fn insert<K, F>(&mut self, name: impl Into<String>, key: F) -> bool
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'a,
    {
        self.insert_by(name, move |a, b| key(a).cmp(&key(b)))
    }

    pub fn insert_ref<K, F>(&mut self, name: impl Into<String>, key: F) -> bool
    where
        K: Ord + ?Sized,
        F: Fn(&T) -> &K + Send + Sync + 'a,
    {
        self.insert_by(name, move |a, b| key(a).cmp(key(b)))
    }

    pub fn insert_by<F>(&mut self, name: impl Into<String>, compare: F) -> bool
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'a,
    {
        self.columns.insert(name.into(), Box::new(compare)).is_some()
    }

    /// Look up a column by exact name
    pub fn get(&self, name: &str) -> Option<&KeyCompare<'a, T>> {
        self.columns.get(name).map(|compare| &**compare)
    }

    /// Look up a column, also returning the stored name
    pub fn get_entry(&self, name: &str) -> Option<(&str, &KeyCompare<'a, T>)> {
        self.columns
            .get_key_value(name)
            .map(|(name, compare)| (name.as_str(), &**compare))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<T> Default for ColumnMap<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ColumnMap<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
