//! Exact ball tree.
//!
//! Each node covers a contiguous range of a permuted index array and stores a
//! bounding ball (center, radius). Centers live in one flat buffer next to the
//! node arena, so the whole tree is three vectors and no pointers. Pruning uses
//! the triangle inequality, `d(q, p) >= d(q, center) - radius`, and is exact
//! for true metrics (Euclidean, Manhattan).

use std::collections::BinaryHeap;

use crate::distance::DistanceMetric;
use crate::kdtree::NO_NODE;
use crate::queue::MinEntry;
use crate::scalar::Scalar;
use crate::sorted_set::{Collector, MinSortedSet, Nearest};
use crate::storage::VectorStorage;
use crate::{Result, VectorError};

/// Default number of vectors per leaf.
pub const DEFAULT_LEAF_SIZE: usize = 16;

#[derive(Debug, Clone, Copy)]
struct BallNode<T> {
    radius: T,
    start: usize,
    end: usize,
    left: u32,
    right: u32,
}

/// Arena-stored ball tree.
#[derive(Debug, Clone)]
pub struct BallTree<T> {
    nodes: Vec<BallNode<T>>,
    centers: Vec<T>,
    indices: Vec<usize>,
    dim: usize,
    leaf_size: usize,
    metric: DistanceMetric,
}

impl<T: Scalar> BallTree<T> {
    /// Build over every vector in `storage`.
    pub fn build<S>(storage: &S, metric: DistanceMetric, leaf_size: usize) -> Result<Self>
    where
        S: VectorStorage<T> + ?Sized,
    {
        if !metric.is_metric() {
            return Err(VectorError::UnsupportedMetric {
                structure: "ball-tree",
                metric,
            });
        }
        if leaf_size == 0 {
            return Err(VectorError::InvalidConfig("leaf size must be positive".into()));
        }

        let mut tree = Self {
            nodes: Vec::new(),
            centers: Vec::new(),
            indices: (0..storage.len()).collect(),
            dim: storage.dim(),
            leaf_size,
            metric,
        };
        if !tree.indices.is_empty() {
            tree.build_node(storage, 0, tree.indices.len());
        }
        Ok(tree)
    }

    fn build_node<S>(&mut self, storage: &S, start: usize, end: usize) -> u32
    where
        S: VectorStorage<T> + ?Sized,
    {
        let handle = self.nodes.len() as u32;
        let center = self.centroid(storage, start, end);
        let radius = self.indices[start..end]
            .iter()
            .map(|&i| self.metric.distance(&center, storage.vector(i)))
            .fold(T::ZERO, |acc, d| if d > acc { d } else { acc });

        self.centers.extend_from_slice(&center);
        self.nodes.push(BallNode {
            radius,
            start,
            end,
            left: NO_NODE,
            right: NO_NODE,
        });

        if end - start > self.leaf_size {
            let axis = self.widest_axis(storage, start, end);
            self.indices[start..end]
                .sort_by(|&a, &b| storage.vector(a)[axis].total_cmp(&storage.vector(b)[axis]));
            let mid = start + (end - start) / 2;

            let left = self.build_node(storage, start, mid);
            let right = self.build_node(storage, mid, end);
            let node = &mut self.nodes[handle as usize];
            node.left = left;
            node.right = right;
        }
        handle
    }

    fn centroid<S>(&self, storage: &S, start: usize, end: usize) -> Vec<T>
    where
        S: VectorStorage<T> + ?Sized,
    {
        let mut center = vec![T::ZERO; self.dim];
        for &i in &self.indices[start..end] {
            for (c, &x) in center.iter_mut().zip(storage.vector(i)) {
                *c += x;
            }
        }
        let count = T::from_usize(end - start);
        for c in &mut center {
            *c = *c / count;
        }
        center
    }

    fn widest_axis<S>(&self, storage: &S, start: usize, end: usize) -> usize
    where
        S: VectorStorage<T> + ?Sized,
    {
        let mut best_axis = 0;
        let mut best_spread = T::MIN;
        for axis in 0..self.dim {
            let mut lo = T::MAX;
            let mut hi = T::MIN;
            for &i in &self.indices[start..end] {
                let x = storage.vector(i)[axis];
                if x < lo {
                    lo = x;
                }
                if x > hi {
                    hi = x;
                }
            }
            if hi - lo > best_spread {
                best_spread = hi - lo;
                best_axis = axis;
            }
        }
        best_axis
    }

    fn center(&self, handle: u32) -> &[T] {
        let start = handle as usize * self.dim;
        &self.centers[start..start + self.dim]
    }

    fn lower_bound(&self, handle: u32, query: &[T]) -> T {
        let node = &self.nodes[handle as usize];
        let gap = self.metric.distance(query, self.center(handle)) - node.radius;
        if gap > T::ZERO {
            gap
        } else {
            T::ZERO
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    /// Exact nearest neighbour: `(index, distance)`, or `None` when empty.
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

    pub fn knn_search<S, C>(&self, storage: &S, query: &[T], mut collector: C) -> C
    where
        S: VectorStorage<T> + ?Sized,
        C: Collector<T>,
    {
        if !self.nodes.is_empty() {
            let bound = self.lower_bound(0, query);
            self.visit(storage, query, 0, bound, &mut collector);
        }
        collector
    }

    fn visit<S, C>(&self, storage: &S, query: &[T], handle: u32, bound: T, collector: &mut C)
    where
        S: VectorStorage<T> + ?Sized,
        C: Collector<T>,
    {
        if !(bound <= collector.bound()) {
            return;
        }

        let node = self.nodes[handle as usize];
        if node.left == NO_NODE {
            for &i in &self.indices[node.start..node.end] {
                collector.offer(i, self.metric.distance(query, storage.vector(i)));
            }
            return;
        }

        let left_bound = self.lower_bound(node.left, query);
        let right_bound = self.lower_bound(node.right, query);
        if left_bound <= right_bound {
            self.visit(storage, query, node.left, left_bound, collector);
            self.visit(storage, query, node.right, right_bound, collector);
        } else {
            self.visit(storage, query, node.right, right_bound, collector);
            self.visit(storage, query, node.left, left_bound, collector);
        }
    }

    /// Lazily yield every indexed vector in non-decreasing distance to `query`.
    pub fn rank<'a, S>(&'a self, storage: &'a S, query: &[T]) -> BallRanking<'a, T, S>
    where
        S: VectorStorage<T> + ?Sized,
    {
        let mut heap = BinaryHeap::new();
        if !self.nodes.is_empty() {
            heap.push(MinEntry::new(self.lower_bound(0, query), Visit::Node(0)));
        }
        BallRanking {
            tree: self,
            storage,
            query: query.to_vec(),
            heap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Visit {
    Point(usize),
    Node(u32),
}

/// Lazy exact ranking over a [`BallTree`].
pub struct BallRanking<'a, T: Scalar, S: ?Sized> {
    tree: &'a BallTree<T>,
    storage: &'a S,
    query: Vec<T>,
    heap: BinaryHeap<MinEntry<T, Visit>>,
}

impl<'a, T, S> BallRanking<'a, T, S>
where
    T: Scalar,
    S: VectorStorage<T> + ?Sized,
{
    pub fn next_with_distance(&mut self) -> Option<(usize, T)> {
        while let Some(entry) = self.heap.pop() {
            match entry.payload {
                Visit::Point(index) => return Some((index, entry.distance)),
                Visit::Node(handle) => self.expand(handle),
            }
        }
        None
    }

    fn expand(&mut self, handle: u32) {
        let tree = self.tree;
        let node = tree.nodes[handle as usize];
        if node.left == NO_NODE {
            for &i in &tree.indices[node.start..node.end] {
                let distance = tree.metric.distance(&self.query, self.storage.vector(i));
                self.heap.push(MinEntry::new(distance, Visit::Point(i)));
            }
        } else {
            for child in [node.left, node.right] {
                let bound = tree.lower_bound(child, &self.query);
                self.heap.push(MinEntry::new(bound, Visit::Node(child)));
            }
        }
    }
}

impl<'a, T, S> Iterator for BallRanking<'a, T, S>
where
    T: Scalar,
    S: VectorStorage<T> + ?Sized,
{
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.next_with_distance().map(|(index, _)| index)
    }
}
