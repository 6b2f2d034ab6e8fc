//! Random projection backend.
//!
//! Every stored vector is mapped through a seeded [`RandomBasis`] into
//! `target_dim` coordinates and ranked there. Axis-bounded metrics rank
//! through a KD tree over the projected store; Cosine ranks the projected
//! store exhaustively. The ranking is approximate with respect to the
//! original space.

use std::time::Instant;

use once_cell::sync::OnceCell;

use crate::distance::DistanceMetric;
use crate::kdtree::KdTree;
use crate::projection::RandomBasis;
use crate::scalar::Scalar;
use crate::storage::{VectorStorage, VectorStore};
use crate::Result;

use super::flat;
use super::ranking::Ranking;

pub(crate) struct ProjectionBackend<T> {
    basis: RandomBasis<T>,
    projected: VectorStore<T>,
    metric: DistanceMetric,
    tree: OnceCell<KdTree<T>>,
}

impl<T: Scalar> ProjectionBackend<T> {
    pub fn new(basis: RandomBasis<T>, metric: DistanceMetric) -> Self {
        let projected = VectorStore::new(basis.rows());
        Self {
            basis,
            projected,
            metric,
            tree: OnceCell::new(),
        }
    }

    pub fn target_dim(&self) -> usize {
        self.basis.rows()
    }

    /// Project and append; a previously built tree no longer covers the store.
    pub fn insert(&mut self, vector: &[T]) -> Result<usize> {
        let index = self.projected.push(&self.basis.project(vector))?;
        if self.tree.take().is_some() {
            tracing::debug!(vectors = self.projected.len(), "projected tree invalidated by add");
        }
        Ok(index)
    }

    pub fn is_built(&self) -> bool {
        !self.metric.bounded_by_axis() || self.tree.get().is_some()
    }

    pub fn build(&self) -> Result<()> {
        if self.metric.bounded_by_axis() {
            self.tree()?;
        }
        Ok(())
    }

    fn tree(&self) -> Result<&KdTree<T>> {
        self.tree.get_or_try_init(|| {
            let started = Instant::now();
            let tree = KdTree::build(&self.projected, self.metric)?;
            tracing::debug!(
                target_dim = self.target_dim(),
                vectors = tree.len(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "built projected kd tree"
            );
            Ok(tree)
        })
    }

    pub fn rank(&self, query: &[T]) -> Result<Ranking<'_, T>> {
        let projected_query = self.basis.project(query);
        if self.metric.bounded_by_axis() {
            let tree = self.tree()?;
            Ok(Ranking::kd(tree.rank(&self.projected, &projected_query)))
        } else {
            Ok(Ranking::scan(flat::rank(&self.projected, &projected_query, self.metric)))
        }
    }
}
