//! Exact tree backends (KD tree, ball tree).
//!
//! The tree is committed on the first query, or by an explicit `build`, and
//! is immutable from then on: further `add` calls are refused instead of
//! silently rebuilding or corrupting the tree.

use std::time::Instant;

use once_cell::sync::OnceCell;

use crate::balltree::BallTree;
use crate::distance::DistanceMetric;
use crate::kdtree::KdTree;
use crate::scalar::Scalar;
use crate::sorted_set::MinSortedSet;
use crate::storage::{VectorStorage, VectorStore};
use crate::{IndexStrategy, Result};

use super::ranking::Ranking;

#[derive(Debug, Clone, Copy)]
pub(crate) enum TreeKind {
    Kd,
    Ball { leaf_size: usize },
}

pub(crate) enum BuiltTree<T> {
    Kd(KdTree<T>),
    Ball(BallTree<T>),
}

pub(crate) struct TreeBackend<T> {
    kind: TreeKind,
    metric: DistanceMetric,
    tree: OnceCell<BuiltTree<T>>,
}

impl<T: Scalar> TreeBackend<T> {
    pub fn new(kind: TreeKind, metric: DistanceMetric) -> Self {
        Self {
            kind,
            metric,
            tree: OnceCell::new(),
        }
    }

    fn strategy(&self) -> IndexStrategy {
        match self.kind {
            TreeKind::Kd => IndexStrategy::KdTree,
            TreeKind::Ball { .. } => IndexStrategy::BallTree,
        }
    }

    pub fn is_built(&self) -> bool {
        self.tree.get().is_some()
    }

    /// The committed tree, building it from `store` on first use.
    pub fn tree(&self, store: &VectorStore<T>) -> Result<&BuiltTree<T>> {
        self.tree.get_or_try_init(|| {
            let started = Instant::now();
            let tree = match self.kind {
                TreeKind::Kd => BuiltTree::Kd(KdTree::build(store, self.metric)?),
                TreeKind::Ball { leaf_size } => {
                    BuiltTree::Ball(BallTree::build(store, self.metric, leaf_size)?)
                }
            };
            tracing::debug!(
                strategy = %self.strategy(),
                vectors = store.len(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "built exact tree"
            );
            Ok(tree)
        })
    }

    pub fn rank<'a>(&'a self, store: &'a VectorStore<T>, query: &[T]) -> Result<Ranking<'a, T>> {
        Ok(match self.tree(store)? {
            BuiltTree::Kd(tree) => Ranking::kd(tree.rank(store, query)),
            BuiltTree::Ball(tree) => Ranking::ball(tree.rank(store, query)),
        })
    }

    /// Exact k nearest, closest first, through the collector-based search.
    pub fn knn(&self, store: &VectorStore<T>, query: &[T], k: usize) -> Result<Vec<(usize, T)>> {
        let collector: MinSortedSet<usize, T> = MinSortedSet::new(k);
        Ok(match self.tree(store)? {
            BuiltTree::Kd(tree) => tree.knn_search(store, query, collector),
            BuiltTree::Ball(tree) => tree.knn_search(store, query, collector),
        }
        .into_vec())
    }

    pub fn nearest(&self, store: &VectorStore<T>, query: &[T]) -> Result<Option<(usize, T)>> {
        Ok(match self.tree(store)? {
            BuiltTree::Kd(tree) => tree.search(store, query),
            BuiltTree::Ball(tree) => tree.search(store, query),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_store() -> VectorStore<f64> {
        let mut store = VectorStore::new(1);
        for x in [4.0, 1.0, 3.0, 0.0, 2.0] {
            store.push(&[x]).unwrap();
        }
        store
    }

    #[test]
    fn test_lazy_build_on_first_rank() {
        let store = line_store();
        let backend = TreeBackend::new(TreeKind::Kd, DistanceMetric::Euclidean);
        assert!(!backend.is_built());

        let order: Vec<usize> = backend.rank(&store, &[2.1]).unwrap().collect();
        assert_eq!(order, vec![4, 2, 1, 0, 3]);
        assert!(backend.is_built());
    }

    #[test]
    fn test_ball_knn_and_nearest() {
        let store = line_store();
        let backend = TreeBackend::new(TreeKind::Ball { leaf_size: 2 }, DistanceMetric::Manhattan);
        assert_eq!(
            backend.knn(&store, &[3.75], 2).unwrap(),
            vec![(0, 0.25), (2, 0.75)]
        );
        assert_eq!(backend.nearest(&store, &[-1.0]).unwrap(), Some((3, 1.0)));
    }
}
