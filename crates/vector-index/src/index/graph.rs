//! Approximate proximity graph backend.
//!
//! Single-layer greedy variant of the HNSW construction (Malkov & Yashunin):
//! every new vector runs a beam search from the entry point (vector 0),
//! links itself to the closest vertices found, and offers itself back to each
//! of them. All adjacency lives in bounded-degree [`ProximityGraphNode`]s, so
//! a vertex only ever keeps the closest neighbours it has been offered.
//!
//! Multi-layer entry points are not built; rankings are best-effort.

use std::collections::BinaryHeap;

use crate::distance::DistanceMetric;
use crate::graph_node::ProximityGraphNode;
use crate::queue::MinEntry;
use crate::scalar::Scalar;
use crate::sorted_set::MinSortedSet;
use crate::storage::{VectorStorage, VectorStore};

const ENTRY_POINT: usize = 0;

pub(crate) struct GraphBackend<T> {
    nodes: Vec<ProximityGraphNode<T>>,
    max_degree: usize,
    ef_construction: usize,
    metric: DistanceMetric,
}

impl<T: Scalar> GraphBackend<T> {
    pub fn new(max_degree: usize, ef_construction: usize, metric: DistanceMetric) -> Self {
        Self {
            nodes: Vec::new(),
            max_degree,
            ef_construction,
            metric,
        }
    }

    pub fn nodes(&self) -> &[ProximityGraphNode<T>] {
        &self.nodes
    }

    /// Link the freshly stored vector `index` into the graph.
    pub fn insert(&mut self, store: &VectorStore<T>, index: usize) {
        debug_assert_eq!(index, self.nodes.len());
        let mut node = ProximityGraphNode::new(index, self.max_degree);

        if !self.nodes.is_empty() {
            let query = store.vector(index);
            let candidates = self.beam_search(store, query, self.ef_construction);

            for (candidate, distance) in candidates.iter() {
                if candidate == index {
                    continue;
                }
                node.try_add_neighbour(candidate, distance);
                if self.nodes[candidate].try_add_neighbour(index, distance) {
                    tracing::trace!(from = candidate, to = index, "linked back-edge");
                }
            }
        }

        self.nodes.push(node);
    }

    /// Greedy beam search from the entry point, keeping the `ef` closest.
    fn beam_search(
        &self,
        store: &VectorStore<T>,
        query: &[T],
        ef: usize,
    ) -> MinSortedSet<usize, T> {
        let mut visited = vec![false; self.nodes.len()];
        let mut candidates = BinaryHeap::new();
        let mut results = MinSortedSet::new(ef);

        let entry_distance = self.metric.distance(query, store.vector(ENTRY_POINT));
        visited[ENTRY_POINT] = true;
        candidates.push(MinEntry::new(entry_distance, ENTRY_POINT));
        results.try_add(ENTRY_POINT, entry_distance);

        while let Some(current) = candidates.pop() {
            if let Some((_, furthest)) = results.worst() {
                if results.is_full() && current.distance > furthest {
                    break;
                }
            }

            for &(neighbour, _) in self.nodes[current.payload].neighbours() {
                if visited[neighbour] {
                    continue;
                }
                visited[neighbour] = true;

                let distance = self.metric.distance(query, store.vector(neighbour));
                if results.try_add(neighbour, distance) {
                    candidates.push(MinEntry::new(distance, neighbour));
                }
            }
        }

        results
    }

    /// Walk the graph toward `query`, yielding every vertex once.
    pub fn rank<'a>(&'a self, store: &'a VectorStore<T>, query: &[T]) -> GraphWalk<'a, T> {
        let mut walk = GraphWalk {
            graph: self,
            store,
            query: query.to_vec(),
            heap: BinaryHeap::new(),
            discovered: vec![false; self.nodes.len()],
            next_unvisited: 0,
        };
        if !self.nodes.is_empty() {
            for (index, distance) in self.beam_search(store, query, self.ef_construction).iter() {
                walk.discovered[index] = true;
                walk.heap.push(MinEntry::new(distance, index));
            }
        }
        walk
    }
}

/// Best-first expansion seeded with the beam search's closest vertices.
///
/// Vertices unreachable from the seeds are appended in index order once the
/// reachable component is exhausted.
pub(crate) struct GraphWalk<'a, T> {
    graph: &'a GraphBackend<T>,
    store: &'a VectorStore<T>,
    query: Vec<T>,
    heap: BinaryHeap<MinEntry<T, usize>>,
    discovered: Vec<bool>,
    next_unvisited: usize,
}

impl<'a, T: Scalar> GraphWalk<'a, T> {
    fn distance(&self, index: usize) -> T {
        self.graph.metric.distance(&self.query, self.store.vector(index))
    }

    fn discover(&mut self, index: usize) {
        self.discovered[index] = true;
        let distance = self.distance(index);
        self.heap.push(MinEntry::new(distance, index));
    }
}

impl<'a, T: Scalar> Iterator for GraphWalk<'a, T> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if let Some(entry) = self.heap.pop() {
                let graph = self.graph;
                for &(neighbour, _) in graph.nodes[entry.payload].neighbours() {
                    if !self.discovered[neighbour] {
                        self.discover(neighbour);
                    }
                }
                return Some(entry.payload);
            }

            while self.next_unvisited < self.discovered.len()
                && self.discovered[self.next_unvisited]
            {
                self.next_unvisited += 1;
            }
            if self.next_unvisited == self.discovered.len() {
                return None;
            }
            let index = self.next_unvisited;
            self.discover(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn build(n: usize, dim: usize, degree: usize) -> (VectorStore<f32>, GraphBackend<f32>) {
        let mut rng = StdRng::seed_from_u64(17);
        let mut store = VectorStore::new(dim);
        let mut graph = GraphBackend::new(degree, 16, DistanceMetric::Euclidean);
        for _ in 0..n {
            let v: Vec<f32> = (0..dim).map(|_| rng.r#gen::<f32>()).collect();
            let index = store.push(&v).unwrap();
            graph.insert(&store, index);
        }
        (store, graph)
    }

    #[test]
    fn test_degree_never_exceeds_bound() {
        let (_, graph) = build(300, 8, 6);
        assert_eq!(graph.nodes().len(), 300);
        for node in graph.nodes() {
            assert!(node.degree() <= 6);
            let weights = node.neighbour_weights();
            assert!(weights.windows(2).all(|w| w[0] <= w[1]));
            assert!(!node.neighbour_indices().contains(&node.index()));
        }
    }

    #[test]
    fn test_walk_yields_every_vertex_once() {
        let (store, graph) = build(200, 4, 4);
        let query = vec![0.5; 4];
        let mut order: Vec<usize> = graph.rank(&store, &query).collect();
        assert_eq!(order.len(), 200);
        order.sort_unstable();
        order.dedup();
        assert_eq!(order.len(), 200);
    }

    #[test]
    fn test_walk_finds_stored_vector_early() {
        let (store, graph) = build(200, 4, 8);
        let query = store.vector(123).to_vec();
        let top: Vec<usize> = graph.rank(&store, &query).take(10).collect();
        assert!(top.contains(&123));
    }

    #[test]
    fn test_disconnected_vertices_still_ranked() {
        let store = {
            let mut s = VectorStore::<f32>::new(1);
            s.push(&[0.0]).unwrap();
            s.push(&[1.0]).unwrap();
            s
        };
        // degree 0: no edges at all
        let mut graph = GraphBackend::new(0, 4, DistanceMetric::Euclidean);
        graph.insert(&store, 0);
        graph.insert(&store, 1);
        let order: Vec<usize> = graph.rank(&store, &[1.0]).collect();
        assert_eq!(order, vec![0, 1]);
    }
}
