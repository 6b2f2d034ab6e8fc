//! Lazy rankings returned by [`VectorIndex::rank`](super::VectorIndex::rank).

use std::collections::BinaryHeap;
use std::iter::Flatten;
use std::vec;

use crate::balltree::BallRanking;
use crate::kdtree::KdRanking;
use crate::queue::MinEntry;
use crate::scalar::Scalar;
use crate::storage::VectorStore;

use super::graph::GraphWalk;

/// Stored vector indices ordered by distance to a query.
///
/// Finite and lazy: each backend does only as much work as the consumer pulls.
/// The ranking borrows the index, so the index cannot be mutated while a
/// ranking is alive.
pub struct Ranking<'a, T: Scalar> {
    inner: Inner<'a, T>,
}

enum Inner<'a, T: Scalar> {
    Empty,
    Scan(ScanRanking<T>),
    Kd(KdRanking<'a, T, VectorStore<T>>),
    Ball(BallRanking<'a, T, VectorStore<T>>),
    Graph(GraphWalk<'a, T>),
    Buckets(Flatten<vec::IntoIter<Vec<usize>>>),
}

impl<'a, T: Scalar> Ranking<'a, T> {
    pub(crate) fn empty() -> Self {
        Self { inner: Inner::Empty }
    }

    pub(crate) fn scan(scan: ScanRanking<T>) -> Self {
        Self {
            inner: Inner::Scan(scan),
        }
    }

    pub(crate) fn kd(ranking: KdRanking<'a, T, VectorStore<T>>) -> Self {
        Self {
            inner: Inner::Kd(ranking),
        }
    }

    pub(crate) fn ball(ranking: BallRanking<'a, T, VectorStore<T>>) -> Self {
        Self {
            inner: Inner::Ball(ranking),
        }
    }

    pub(crate) fn graph(walk: GraphWalk<'a, T>) -> Self {
        Self {
            inner: Inner::Graph(walk),
        }
    }

    /// Rank from buckets that are already in order; each bucket in index order.
    pub(crate) fn buckets(buckets: Vec<Vec<usize>>) -> Self {
        Self {
            inner: Inner::Buckets(buckets.into_iter().flatten()),
        }
    }
}

impl<'a, T: Scalar> Iterator for Ranking<'a, T> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        match &mut self.inner {
            Inner::Empty => None,
            Inner::Scan(scan) => scan.next(),
            Inner::Kd(kd) => kd.next(),
            Inner::Ball(ball) => ball.next(),
            Inner::Graph(walk) => walk.next(),
            Inner::Buckets(buckets) => buckets.next(),
        }
    }
}

/// Heap over precomputed distances; heapify is O(n), each pull O(log n).
pub(crate) struct ScanRanking<T> {
    heap: BinaryHeap<MinEntry<T, usize>>,
}

impl<T: Scalar> ScanRanking<T> {
    pub fn from_distances(distances: Vec<T>) -> Self {
        let entries: Vec<MinEntry<T, usize>> = distances
            .into_iter()
            .enumerate()
            .map(|(index, distance)| MinEntry::new(distance, index))
            .collect();
        Self {
            heap: BinaryHeap::from(entries),
        }
    }
}

impl<T: Scalar> Iterator for ScanRanking<T> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.heap.pop().map(|entry| entry.payload)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.heap.len(), Some(self.heap.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_ranking_orders_and_breaks_ties_by_index() {
        let ranking = Ranking::scan(ScanRanking::from_distances(vec![2.0f32, 0.5, 2.0, 0.0]));
        assert_eq!(ranking.collect::<Vec<_>>(), vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_buckets_and_empty() {
        let ranking: Ranking<'_, f32> = Ranking::buckets(vec![vec![4], vec![], vec![0, 2]]);
        assert_eq!(ranking.collect::<Vec<_>>(), vec![4, 0, 2]);
        assert_eq!(Ranking::<f64>::empty().count(), 0);
    }
}
