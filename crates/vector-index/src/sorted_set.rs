//! Fixed-capacity sorted (key, weight) sets.
//!
//! A [`BoundedSortedSet`] keeps at most `capacity` entries ordered by weight
//! under an [`Order`] policy:
//! - [`Ascending`]: smallest weight first, keeps the smallest (distances)
//! - [`Descending`]: largest weight first, keeps the largest (similarities)
//!
//! It serves both as the top-K accumulator during search and as the neighbour
//! list of a proximity graph vertex. Insertion is a linear scan and shift,
//! which is the fast path for the small capacities used here (typically <= 32).

use std::fmt;
use std::marker::PhantomData;

use crate::scalar::Scalar;

/// Ordering policy of a [`BoundedSortedSet`].
pub trait Order: Send + Sync + 'static {
    /// Returns true when `a` should sort strictly before `b`.
    fn better<W: PartialOrd>(a: &W, b: &W) -> bool;
}

/// Keep-smallest policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ascending;

/// Keep-largest policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Descending;

impl Order for Ascending {
    #[inline]
    fn better<W: PartialOrd>(a: &W, b: &W) -> bool {
        a < b
    }
}

impl Order for Descending {
    #[inline]
    fn better<W: PartialOrd>(a: &W, b: &W) -> bool {
        a > b
    }
}

/// Capacity-bounded set of unique keys sorted by weight.
pub struct BoundedSortedSet<K, W, O: Order> {
    entries: Vec<(K, W)>,
    capacity: usize,
    _order: PhantomData<O>,
}

/// Ascending set, retains the smallest weights.
pub type MinSortedSet<K, W> = BoundedSortedSet<K, W, Ascending>;

/// Descending set, retains the largest weights.
pub type MaxSortedSet<K, W> = BoundedSortedSet<K, W, Descending>;

impl<K, W, O> BoundedSortedSet<K, W, O>
where
    K: Copy + PartialEq,
    W: Copy + PartialOrd,
    O: Order,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            _order: PhantomData,
        }
    }

    /// Try to insert `(key, weight)`.
    ///
    /// Rejected when the key is already present, or when the set is full and
    /// `weight` is not strictly better than the current worst entry. On
    /// acceptance into a full set the worst entry is evicted. Equal weights
    /// keep insertion order.
    pub fn try_add(&mut self, key: K, weight: W) -> bool {
        if self.capacity == 0 || self.contains_key(key) {
            return false;
        }

        if self.is_full() {
            match self.entries.last() {
                Some((_, worst)) if O::better(&weight, worst) => {}
                _ => return false,
            }
        }

        let position = self
            .entries
            .iter()
            .position(|(_, w)| O::better(&weight, w))
            .unwrap_or(self.entries.len());
        self.entries.insert(position, (key, weight));

        if self.entries.len() > self.capacity {
            self.entries.pop();
        }
        true
    }

    /// Remove the entry at sorted `position`, shifting the rest up.
    pub fn remove_at(&mut self, position: usize) -> Option<(K, W)> {
        if position < self.entries.len() {
            Some(self.entries.remove(position))
        } else {
            None
        }
    }

    /// Best retained entry (first position).
    #[inline]
    pub fn best(&self) -> Option<(K, W)> {
        self.entries.first().copied()
    }

    /// Worst retained entry (last position).
    #[inline]
    pub fn worst(&self) -> Option<(K, W)> {
        self.entries.last().copied()
    }

    pub fn contains_key(&self, key: K) -> bool {
        self.entries.iter().any(|(k, _)| *k == key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn get(&self, position: usize) -> Option<(K, W)> {
        self.entries.get(position).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, W)> + '_ {
        self.entries.iter().copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn weights(&self) -> impl Iterator<Item = W> + '_ {
        self.entries.iter().map(|(_, w)| *w)
    }

    pub fn as_slice(&self) -> &[(K, W)] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn into_vec(self) -> Vec<(K, W)> {
        self.entries
    }
}

impl<K: Clone, W: Clone, O: Order> Clone for BoundedSortedSet<K, W, O> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            capacity: self.capacity,
            _order: PhantomData,
        }
    }
}

impl<K: fmt::Debug, W: fmt::Debug, O: Order> fmt::Debug for BoundedSortedSet<K, W, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedSortedSet")
            .field("capacity", &self.capacity)
            .field("entries", &self.entries)
            .finish()
    }
}

/// Ascending accumulator of (vector index, distance) offers.
///
/// Lets one tree traversal serve both single-nearest and top-K search: the
/// traversal only needs to offer candidates and ask how far away a subtree
/// may still be to matter.
pub trait Collector<W: Scalar> {
    /// Offer a candidate; returns whether it was retained.
    fn offer(&mut self, index: usize, distance: W) -> bool;

    /// Distance a candidate must beat to be retained: the worst retained
    /// distance once full, `W::MAX` before that.
    fn bound(&self) -> W;
}

impl<W: Scalar> Collector<W> for MinSortedSet<usize, W> {
    #[inline]
    fn offer(&mut self, index: usize, distance: W) -> bool {
        self.try_add(index, distance)
    }

    #[inline]
    fn bound(&self) -> W {
        match self.worst() {
            Some((_, worst)) if self.is_full() => worst,
            _ => W::MAX,
        }
    }
}

/// Single-best collector, the k = 1 case without the set bookkeeping.
#[derive(Debug, Clone, Copy)]
pub struct Nearest<W> {
    best: Option<(usize, W)>,
}

impl<W: Scalar> Nearest<W> {
    pub fn new() -> Self {
        Self { best: None }
    }

    pub fn get(&self) -> Option<(usize, W)> {
        self.best
    }
}

impl<W: Scalar> Default for Nearest<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Scalar> Collector<W> for Nearest<W> {
    #[inline]
    fn offer(&mut self, index: usize, distance: W) -> bool {
        // equal distances resolve to the lower index, as a linear scan does
        let closer = match self.best {
            None => true,
            Some((best_index, best)) => distance < best || (distance == best && index < best_index),
        };
        if closer {
            self.best = Some((index, distance));
        }
        closer
    }

    #[inline]
    fn bound(&self) -> W {
        self.best.map_or(W::MAX, |(_, d)| d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eviction_scenario() {
        let mut set: MinSortedSet<u32, f32> = BoundedSortedSet::new(2);
        assert!(set.try_add(1, 0.5));
        assert!(set.try_add(2, 0.3));
        assert!(!set.try_add(3, 0.8));

        assert_eq!(set.best(), Some((2, 0.3)));
        assert_eq!(set.worst(), Some((1, 0.5)));

        assert_eq!(set.remove_at(0), Some((2, 0.3)));
        assert_eq!(set.best(), Some((1, 0.5)));
        assert_eq!(set.worst(), Some((1, 0.5)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut set: MinSortedSet<u32, f64> = BoundedSortedSet::new(4);
        assert!(set.try_add(7, 1.0));
        assert!(!set.try_add(7, 0.1));
        assert!(!set.try_add(7, 5.0));
        assert_eq!(set.len(), 1);
        assert_eq!(set.best(), Some((7, 1.0)));
    }

    #[test]
    fn test_descending_keeps_largest() {
        let mut set: MaxSortedSet<u32, f32> = BoundedSortedSet::new(3);
        for (k, w) in [(1, 0.2), (2, 0.9), (3, 0.5), (4, 0.7), (5, 0.1)] {
            set.try_add(k, w);
        }
        let weights: Vec<f32> = set.weights().collect();
        assert_eq!(weights, vec![0.9, 0.7, 0.5]);
        assert_eq!(set.best().map(|e| e.0), Some(2));
        assert_eq!(set.worst().map(|e| e.0), Some(3));
    }

    #[test]
    fn test_equal_weight_does_not_evict() {
        let mut set: MinSortedSet<u32, f32> = BoundedSortedSet::new(2);
        set.try_add(1, 0.5);
        set.try_add(2, 0.5);
        assert!(!set.try_add(3, 0.5));
        let keys: Vec<u32> = set.keys().collect();
        assert_eq!(keys, vec![1, 2]);
    }

    #[test]
    fn test_zero_capacity_rejects_everything() {
        let mut set: MinSortedSet<u32, f32> = BoundedSortedSet::new(0);
        assert!(!set.try_add(1, 0.0));
        assert!(set.is_empty());
        assert!(set.best().is_none());
    }

    #[test]
    fn test_remove_at_out_of_range() {
        let mut set: MinSortedSet<u32, f32> = BoundedSortedSet::new(2);
        set.try_add(1, 1.0);
        assert_eq!(set.remove_at(1), None);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_collector_bound() {
        let mut set: MinSortedSet<usize, f32> = BoundedSortedSet::new(2);
        assert_eq!(Collector::bound(&set), f32::MAX);
        set.offer(0, 3.0);
        assert_eq!(Collector::bound(&set), f32::MAX);
        set.offer(1, 1.0);
        assert_eq!(Collector::bound(&set), 3.0);
    }

    #[test]
    fn test_nearest_collector() {
        let mut nearest = Nearest::<f64>::new();
        assert_eq!(nearest.bound(), f64::MAX);
        assert!(nearest.offer(4, 2.0));
        assert!(!nearest.offer(5, 2.0));
        assert!(nearest.offer(6, 1.0));
        assert_eq!(nearest.get(), Some((6, 1.0)));
    }

    #[test]
    fn test_nearest_prefers_lower_index_on_ties() {
        let mut nearest = Nearest::<f32>::new();
        assert!(nearest.offer(7, 0.0));
        assert!(nearest.offer(2, 0.0));
        assert!(!nearest.offer(5, 0.0));
        assert_eq!(nearest.get(), Some((2, 0.0)));
    }
}
