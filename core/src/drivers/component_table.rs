use std::collections::{hash_map, HashMap};

/// A driver's private key → component table.
///
/// Only the reconciler mutates it, and only while dispatching lifecycle calls. Everything public
/// is read-only; `get` is the driver's `ref(key)` accessor.
pub struct ComponentTable<C> {
    inner: HashMap<String, C>,
}

impl<C> ComponentTable<C> {
    pub(crate) fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&C> {
        self.inner.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn keys(&self) -> hash_map::Keys<'_, String, C> {
        self.inner.keys()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, C> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut C> {
        self.inner.get_mut(key)
    }

    /// Overwrites any previous entry. The displaced component is dropped without an `exit`.
    pub(crate) fn insert(&mut self, key: String, component: C) -> Option<C> {
        self.inner.insert(key, component)
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<C> {
        self.inner.remove(key)
    }

    pub(crate) fn drain(&mut self) -> Vec<(String, C)> {
        self.inner.drain().collect()
    }
}
