//! Min-heap entries for best-first traversals.

use std::cmp::Ordering;

use crate::scalar::Scalar;

/// Distance-keyed entry for `BinaryHeap`.
///
/// Ordering is reversed so that `BinaryHeap` (a max-heap) pops the smallest
/// distance first. Equal distances pop the smaller payload first, which keeps
/// traversal order deterministic.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MinEntry<W, P> {
    pub distance: W,
    pub payload: P,
}

impl<W, P> MinEntry<W, P> {
    #[inline]
    pub fn new(distance: W, payload: P) -> Self {
        Self { distance, payload }
    }
}

impl<W: Scalar, P: Ord> PartialEq for MinEntry<W, P> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<W: Scalar, P: Ord> Eq for MinEntry<W, P> {}

impl<W: Scalar, P: Ord> PartialOrd for MinEntry<W, P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<W: Scalar, P: Ord> Ord for MinEntry<W, P> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.payload.cmp(&self.payload))
    }
}
