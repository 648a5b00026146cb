use crate::SliceDebug;
use std::{collections::HashMap, hash::Hash};

/// Duplicate aware bag with constant time add, remove and size, and linear time listing.
///
/// Each distinct value maps to its occurrence count. Counts are never stored as zero,
/// removing the last occurrence drops the value, and `total` is always the sum of all counts.
#[derive(Clone)]
pub struct CountedMultiset<V> {
    counts: HashMap<V, usize>,
    total: usize,
}

impl<V> Default for CountedMultiset<V> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
            total: 0,
        }
    }
}

impl<V: Eq + Hash> PartialEq for CountedMultiset<V> {
    fn eq(&self, other: &Self) -> bool {
        self.total == other.total && self.counts == other.counts
    }
}

impl<V: Eq + Hash> Eq for CountedMultiset<V> {}

impl<V: Eq + Hash> CountedMultiset<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: V) {
        *self.counts.entry(value).or_insert(0) += 1;
        self.total += 1;
    }

    /// Removes one occurrence of `value`, returning false without side effects if it is absent
    pub fn remove(&mut self, value: &V) -> bool {
        let Some(count) = self.counts.get_mut(value) else {
            return false;
        };
        if *count > 1 {
            *count -= 1;
        } else {
            self.counts.remove(value);
        }
        self.total -= 1;
        true
    }

    pub fn size(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn count(&self, value: &V) -> usize {
        self.counts.get(value).copied().unwrap_or(0)
    }

    pub fn contains(&self, value: &V) -> bool {
        self.counts.contains_key(value)
    }

    /// Number of distinct values
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Iterates each distinct value with its occurrence count, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&V, usize)> + '_ {
        self.counts.iter().map(|(value, count)| (value, *count))
    }

    pub fn clear(&mut self) {
        self.counts.clear();
        self.total = 0;
    }
}

impl<V: Eq + Hash + Clone> CountedMultiset<V> {
    /// Every value repeated by its occurrence count. Order across distinct values is unspecified.
    pub fn list(&self) -> Vec<V> {
        let mut list = Vec::with_capacity(self.total);
        for (value, count) in self.counts.iter() {
            list.extend(std::iter::repeat(value).take(*count).cloned());
        }
        list
    }

    /// Any one stored value, `None` if empty
    pub fn first(&self) -> Option<V> {
        self.counts.keys().next().cloned()
    }
}

impl<V: Eq + Hash> FromIterator<V> for CountedMultiset<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut multiset = Self::new();
        multiset.extend(iter);
        multiset
    }
}

impl<V: Eq + Hash> Extend<V> for CountedMultiset<V> {
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for CountedMultiset<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries: Vec<(&V, &usize)> = self.counts.iter().collect();
        f.debug_struct("CountedMultiset")
            .field("total", &self.total)
            .field("entries", &SliceDebug::new(&entries))
            .finish()
    }
}
