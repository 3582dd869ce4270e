// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use indexmap::IndexMap;
use smallvec::SmallVec;

/// A chart coordinate: one integer per grading.
pub type Degree = SmallVec<[i32; 4]>;

/// Structural key encoding used by [`KeyedIndex`].
///
/// Two keys with equal canonical strings address the same entry, whatever object they live in.
pub trait CanonicalKey {
    fn canonical_key(&self) -> String;
}

fn join_ints(values: &[i32]) -> String {
    let mut buf = itoa::Buffer::new();
    let mut out = String::with_capacity(values.len() * 4);
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(buf.format(*value));
    }
    out
}

impl CanonicalKey for [i32] {
    fn canonical_key(&self) -> String {
        join_ints(self)
    }
}

impl<const N: usize> CanonicalKey for [i32; N] {
    fn canonical_key(&self) -> String {
        join_ints(self)
    }
}

impl CanonicalKey for Vec<i32> {
    fn canonical_key(&self) -> String {
        join_ints(self)
    }
}

impl CanonicalKey for Degree {
    fn canonical_key(&self) -> String {
        join_ints(self)
    }
}

/// Map from structured keys to values, keyed by the key's canonical string.
///
/// Iteration follows first-insertion order. The stored key object is the one most recently
/// passed to [`KeyedIndex::set`].
#[derive(Debug, Clone)]
pub struct KeyedIndex<K, V> {
    entries: IndexMap<String, (K, V)>,
}

impl<K, V> Default for KeyedIndex<K, V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<K: CanonicalKey, V> KeyedIndex<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: K, value: V) {
        let canonical = key.canonical_key();
        self.entries.insert(canonical, (key, value));
    }

    pub fn get<Q: CanonicalKey + ?Sized>(&self, key: &Q) -> Option<&V> {
        self.entries.get(&key.canonical_key()).map(|(_, v)| v)
    }

    pub fn get_mut<Q: CanonicalKey + ?Sized>(&mut self, key: &Q) -> Option<&mut V> {
        self.entries.get_mut(&key.canonical_key()).map(|(_, v)| v)
    }

    pub fn has<Q: CanonicalKey + ?Sized>(&self, key: &Q) -> bool {
        self.entries.contains_key(&key.canonical_key())
    }

    pub fn delete<Q: CanonicalKey + ?Sized>(&mut self, key: &Q) -> Option<(K, V)> {
        self.entries.shift_remove(&key.canonical_key())
    }

    /// Reads `key`, falling back to `fallback` without inserting.
    pub fn get_or_default<'a, Q: CanonicalKey + ?Sized>(&'a self, key: &Q, fallback: &'a V) -> &'a V {
        self.get(key).unwrap_or(fallback)
    }

    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: K, make: F) -> &mut V {
        let canonical = key.canonical_key();
        &mut self.entries.entry(canonical).or_insert_with(|| (key, make())).1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.values().map(|(k, v)| (k, v))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.values_mut().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
