//! Insertion-ordered frequency counting.

use std::collections::HashMap;
use std::hash::Hash;

/// Counts keys while remembering the order each key was first seen.
///
/// Ranking is a stable sort by descending count, so equal counts keep
/// first-seen order and the result is deterministic for a given input.
#[derive(Debug, Clone)]
pub struct FrequencyTable<K> {
    entries: Vec<(K, usize)>,
    index: HashMap<K, usize>,
}

impl<K> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> FrequencyTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `key`.
    pub fn record(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    pub fn count(&self, key: &K) -> usize {
        self.index
            .get(key)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.entries.iter().map(|(key, count)| (key, *count))
    }

    /// Keys seen at least `min_count` times, most frequent first, at most `limit`.
    pub fn ranked(&self, min_count: usize, limit: usize) -> Vec<(&K, usize)> {
        let mut kept: Vec<(&K, usize)> = self
            .iter()
            .filter(|(_, count)| *count >= min_count)
            .collect();
        kept.sort_by(|a, b| b.1.cmp(&a.1));
        kept.truncate(limit);
        kept
    }
}
