//! Flat (brute-force) ranking and the bulk scans built on it.
//!
//! Exact by construction: every stored vector is compared with the query.
//! With the `parallel` feature, scans over large stores split the store into
//! chunks across the rayon pool; no other synchronisation is needed because
//! the store is only read.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::distance::DistanceMetric;
use crate::scalar::Scalar;
use crate::storage::{VectorStorage, VectorStore};

use super::ranking::ScanRanking;

/// Below this many vectors a sequential scan beats spawning rayon tasks.
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 4096;

/// Distance from `query` to every stored vector, in index order.
pub(crate) fn distances<T: Scalar>(
    store: &VectorStore<T>,
    query: &[T],
    metric: DistanceMetric,
) -> Vec<T> {
    #[cfg(feature = "parallel")]
    if store.len() >= PARALLEL_THRESHOLD {
        return store
            .as_flat()
            .par_chunks_exact(store.dim())
            .map(|v| metric.distance(query, v))
            .collect();
    }

    store.iter().map(|v| metric.distance(query, v)).collect()
}

/// Exact lazy ranking of the whole store.
pub(crate) fn rank<T: Scalar>(
    store: &VectorStore<T>,
    query: &[T],
    metric: DistanceMetric,
) -> ScanRanking<T> {
    ScanRanking::from_distances(distances(store, query, metric))
}

/// Index of the candidate nearest to `vector`; first one wins on ties.
fn nearest_candidate<T, V>(vector: &[T], candidates: &[V], metric: DistanceMetric) -> usize
where
    T: Scalar,
    V: AsRef<[T]>,
{
    let mut best = 0;
    let mut best_distance = T::MAX;
    for (i, candidate) in candidates.iter().enumerate() {
        let d = metric.distance(vector, candidate.as_ref());
        if d < best_distance {
            best = i;
            best_distance = d;
        }
    }
    best
}

/// For every stored vector, in stored order, the index of its nearest candidate.
///
/// Callers guarantee `candidates` is non-empty and dimension-checked.
pub(crate) fn closest<T, V>(
    store: &VectorStore<T>,
    candidates: &[V],
    metric: DistanceMetric,
) -> Vec<usize>
where
    T: Scalar,
    V: AsRef<[T]> + Sync,
{
    #[cfg(feature = "parallel")]
    {
        store
            .as_flat()
            .par_chunks_exact(store.dim())
            .map(|v| nearest_candidate(v, candidates, metric))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        store
            .iter()
            .map(|v| nearest_candidate(v, candidates, metric))
            .collect()
    }
}

/// Elementwise mean of the vectors at `indices` (already range-checked).
pub(crate) fn average<T: Scalar>(store: &VectorStore<T>, indices: &[usize]) -> Vec<T> {
    let mut sum = vec![T::ZERO; store.dim()];
    for &i in indices {
        for (s, &x) in sum.iter_mut().zip(store.vector(i)) {
            *s += x;
        }
    }
    let count = T::from_usize(indices.len());
    sum.into_iter().map(|s| s / count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store(vectors: &[&[f32]]) -> VectorStore<f32> {
        let mut store = VectorStore::new(vectors[0].len());
        for v in vectors {
            store.push(v).unwrap();
        }
        store
    }

    #[test]
    fn test_rank_euclidean() {
        let store = make_store(&[&[0.0, 0.0, 0.0], &[3.0, 4.0, 0.0], &[1.0, 0.0, 0.0]]);
        let order: Vec<usize> = rank(&store, &[0.0, 0.0, 0.0], DistanceMetric::Euclidean).collect();
        assert_eq!(order, vec![0, 2, 1]);
    }

    #[test]
    fn test_rank_cosine() {
        let store = make_store(&[&[1.0, 0.0], &[0.0, 1.0], &[0.707, 0.707]]);
        let order: Vec<usize> = rank(&store, &[0.9, 0.1], DistanceMetric::Cosine).collect();
        assert_eq!(order, vec![0, 2, 1]);
    }

    #[test]
    fn test_nearest_candidate_first_tie_wins() {
        let candidates = vec![vec![1.0f32, 0.0], vec![-1.0, 0.0]];
        assert_eq!(
            nearest_candidate(&[0.0f32, 0.0], &candidates, DistanceMetric::Euclidean),
            0
        );
    }

    #[test]
    fn test_average() {
        let store = make_store(&[&[0.0, 2.0], &[2.0, 4.0], &[100.0, 100.0]]);
        assert_eq!(average(&store, &[0, 1]), vec![1.0, 3.0]);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_distances_match_sequential() {
        let mut store = VectorStore::<f32>::new(4);
        for i in 0..PARALLEL_THRESHOLD + 10 {
            let x = i as f32 * 0.001;
            store.push(&[x, -x, x * 0.5, 1.0]).unwrap();
        }
        let query = [0.5, -0.5, 0.25, 1.0];
        let parallel = distances(&store, &query, DistanceMetric::Manhattan);
        let sequential: Vec<f32> = store
            .iter()
            .map(|v| DistanceMetric::Manhattan.distance(&query, v))
            .collect();
        assert_eq!(parallel, sequential);
    }
}
