//! Exact KD tree over a snapshot of stored vectors.
//!
//! Nodes live in a flat `u32` arena as `(vector_index, left, right)` triples.
//! A node handle is the arena offset where its triple begins and
//! [`NO_NODE`] marks a missing child. The tree is built once and never
//! mutated; it does not own coordinates and reads them through a
//! [`VectorStorage`] on every call.
//!
//! Pruning on `|q[axis] - node[axis]|` is exact only for metrics bounded by a
//! single-axis difference (Euclidean, Manhattan).

use std::collections::BinaryHeap;
use std::marker::PhantomData;

use crate::distance::DistanceMetric;
use crate::queue::MinEntry;
use crate::scalar::Scalar;
use crate::sorted_set::{Collector, MinSortedSet, Nearest};
use crate::storage::VectorStorage;
use crate::{Result, VectorError};

/// Sentinel handle for "no child".
pub const NO_NODE: u32 = u32::MAX;

const TRIPLE: usize = 3;

/// Arena-stored KD tree.
#[derive(Debug, Clone)]
pub struct KdTree<T> {
    arena: Vec<u32>,
    root: u32,
    dim: usize,
    metric: DistanceMetric,
    _scalar: PhantomData<T>,
}

impl<T: Scalar> KdTree<T> {
    /// Build over every vector in `storage`.
    pub fn build<S>(storage: &S, metric: DistanceMetric) -> Result<Self>
    where
        S: VectorStorage<T> + ?Sized,
    {
        let indices: Vec<usize> = (0..storage.len()).collect();
        Self::build_from(storage, indices, metric)
    }

    /// Build over a snapshot of `indices` into `storage`.
    pub fn build_from<S>(
        storage: &S,
        mut indices: Vec<usize>,
        metric: DistanceMetric,
    ) -> Result<Self>
    where
        S: VectorStorage<T> + ?Sized,
    {
        if !metric.bounded_by_axis() {
            return Err(VectorError::UnsupportedMetric {
                structure: "kd-tree",
                metric,
            });
        }
        if let Some(&index) = indices.iter().find(|&&i| i >= storage.len()) {
            return Err(VectorError::IndexOutOfRange {
                index,
                len: storage.len(),
            });
        }
        if indices.len() >= NO_NODE as usize {
            return Err(VectorError::InvalidConfig(format!(
                "kd-tree holds at most {} vectors, got {}",
                NO_NODE - 1,
                indices.len()
            )));
        }

        let mut tree = Self {
            arena: Vec::with_capacity(indices.len() * TRIPLE),
            root: NO_NODE,
            dim: storage.dim(),
            metric,
            _scalar: PhantomData,
        };
        tree.root = tree.build_node(storage, &mut indices, 0);
        Ok(tree)
    }

    fn build_node<S>(&mut self, storage: &S, indices: &mut [usize], depth: usize) -> u32
    where
        S: VectorStorage<T> + ?Sized,
    {
        match indices.len() {
            0 => NO_NODE,
            1 => self.push_node(indices[0], NO_NODE, NO_NODE),
            len => {
                let axis = depth % self.dim;
                indices.sort_by(|&a, &b| {
                    storage.vector(a)[axis].total_cmp(&storage.vector(b)[axis])
                });

                let median = len / 2;
                let handle = self.push_node(indices[median], NO_NODE, NO_NODE);
                let (left, rest) = indices.split_at_mut(median);
                let right = &mut rest[1..];

                let left = self.build_node(storage, left, depth + 1);
                let right = self.build_node(storage, right, depth + 1);
                let offset = handle as usize;
                self.arena[offset + 1] = left;
                self.arena[offset + 2] = right;
                handle
            }
        }
    }

    fn push_node(&mut self, index: usize, left: u32, right: u32) -> u32 {
        let handle = self.arena.len() as u32;
        self.arena.extend_from_slice(&[index as u32, left, right]);
        handle
    }

    #[inline]
    fn node(&self, handle: u32) -> (usize, u32, u32) {
        let offset = handle as usize;
        (
            self.arena[offset] as usize,
            self.arena[offset + 1],
            self.arena[offset + 2],
        )
    }

    /// Number of nodes, one per indexed vector.
    pub fn len(&self) -> usize {
        self.arena.len() / TRIPLE
    }

    pub fn is_empty(&self) -> bool {
        self.root == NO_NODE
    }

    pub fn root(&self) -> u32 {
        self.root
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Raw arena of `(vector_index, left, right)` triples.
    pub fn arena(&self) -> &[u32] {
        &self.arena
    }

    /// Exact nearest neighbour: `(index, distance)`, or `None` for an empty tree.
    pub fn search<S>(&self, storage: &S, query: &[T]) -> Option<(usize, T)>
    where
        S: VectorStorage<T> + ?Sized,
    {
        self.knn_search(storage, query, Nearest::new()).get()
    }

    /// Exact k nearest neighbours, closest first.
    pub fn knn<S>(&self, storage: &S, query: &[T], k: usize) -> Vec<(usize, T)>
    where
        S: VectorStorage<T> + ?Sized,
    {
        self.knn_search(storage, query, MinSortedSet::new(k)).into_vec()
    }

    /// Offer every vector that may beat `collector.bound()` to `collector`.
    pub fn knn_search<S, C>(&self, storage: &S, query: &[T], mut collector: C) -> C
    where
        S: VectorStorage<T> + ?Sized,
        C: Collector<T>,
    {
        if self.root != NO_NODE {
            self.visit(storage, query, self.root, 0, &mut collector);
        }
        collector
    }

    fn visit<S, C>(
        &self,
        storage: &S,
        query: &[T],
        mut handle: u32,
        mut depth: usize,
        collector: &mut C,
    ) where
        S: VectorStorage<T> + ?Sized,
        C: Collector<T>,
    {
        loop {
            let (index, left, right) = self.node(handle);
            let point = storage.vector(index);
            collector.offer(index, self.metric.distance(query, point));

            handle = match (left, right) {
                (NO_NODE, NO_NODE) => return,
                (child, NO_NODE) | (NO_NODE, child) => child,
                (left, right) => {
                    let axis = depth % self.dim;
                    let diff = query[axis] - point[axis];
                    let (near, far) = if diff < T::ZERO { (left, right) } else { (right, left) };

                    self.visit(storage, query, near, depth + 1, collector);
                    if diff.abs() <= collector.bound() {
                        far
                    } else {
                        return;
                    }
                }
            };
            depth += 1;
        }
    }

    /// Lazily yield every indexed vector in non-decreasing distance to `query`.
    pub fn rank<'a, S>(&'a self, storage: &'a S, query: &[T]) -> KdRanking<'a, T, S>
    where
        S: VectorStorage<T> + ?Sized,
    {
        let mut heap = BinaryHeap::new();
        if self.root != NO_NODE {
            heap.push(MinEntry::new(T::ZERO, Visit::Node(self.root, 0)));
        }
        KdRanking {
            tree: self,
            storage,
            query: query.to_vec(),
            heap,
        }
    }
}

/// Best-first work item. Points sort before nodes at equal keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Visit {
    Point(usize),
    Node(u32, usize),
}

/// Lazy exact ranking over a [`KdTree`].
///
/// Node keys are lower bounds on the distance of every point in the subtree,
/// so a point popped from the heap is never beaten by anything still queued.
pub struct KdRanking<'a, T: Scalar, S: ?Sized> {
    tree: &'a KdTree<T>,
    storage: &'a S,
    query: Vec<T>,
    heap: BinaryHeap<MinEntry<T, Visit>>,
}

impl<'a, T, S> KdRanking<'a, T, S>
where
    T: Scalar,
    S: VectorStorage<T> + ?Sized,
{
    /// Pop the next `(index, distance)` pair.
    pub fn next_with_distance(&mut self) -> Option<(usize, T)> {
        while let Some(entry) = self.heap.pop() {
            match entry.payload {
                Visit::Point(index) => return Some((index, entry.distance)),
                Visit::Node(handle, depth) => self.expand(handle, depth, entry.distance),
            }
        }
        None
    }

    fn expand(&mut self, handle: u32, depth: usize, bound: T) {
        let (index, left, right) = self.tree.node(handle);
        let point = self.storage.vector(index);
        let distance = self.tree.metric.distance(&self.query, point);
        self.heap.push(MinEntry::new(distance, Visit::Point(index)));

        let axis = depth % self.tree.dim;
        let diff = self.query[axis] - point[axis];
        let (near, far) = if diff < T::ZERO { (left, right) } else { (right, left) };
        let far_bound = if diff.abs() > bound { diff.abs() } else { bound };

        if near != NO_NODE {
            self.heap.push(MinEntry::new(bound, Visit::Node(near, depth + 1)));
        }
        if far != NO_NODE {
            self.heap.push(MinEntry::new(far_bound, Visit::Node(far, depth + 1)));
        }
    }
}

impl<'a, T, S> Iterator for KdRanking<'a, T, S>
where
    T: Scalar,
    S: VectorStorage<T> + ?Sized,
{
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.next_with_distance().map(|(index, _)| index)
    }
}
