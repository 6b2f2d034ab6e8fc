//! The [`VectorIndex`] contract and its backends.
//!
//! Provides multiple indexing strategies behind one type:
//! - Flat: exact brute-force ranking
//! - KdTree / BallTree: exact trees, committed on first query
//! - RandomProjection: ranking in a seeded lower-dimensional projection
//! - Graph: single-layer bounded-degree proximity graph
//! - BitSignature: random-hyperplane bits ranked by Hamming distance

mod bits;
mod flat;
mod graph;
mod projected;
mod ranking;
mod tree;

use std::ops::Range;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::{IndexConfig, IndexStrategy};
use crate::distance::DistanceMetric;
use crate::graph_node::ProximityGraphNode;
use crate::projection::RandomBasis;
use crate::scalar::Scalar;
use crate::sorted_set::MinSortedSet;
use crate::storage::{VectorStorage, VectorStore};
use crate::{Result, VectorError};

use bits::BitBackend;
use graph::GraphBackend;
use projected::ProjectionBackend;
use tree::{TreeBackend, TreeKind};

pub use ranking::Ranking;

/// Approximate backends re-score this many candidates per requested result.
const OVERSAMPLE: usize = 4;

/// Search result with true distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchResult<T> {
    /// Position of the vector in insertion order.
    pub index: usize,
    /// Distance to the query under the index metric (lower is closer).
    pub distance: T,
}

enum Backend<T> {
    Flat,
    Tree(TreeBackend<T>),
    Projection(ProjectionBackend<T>),
    Graph(GraphBackend<T>),
    Bits(BitBackend<T>),
}

/// Nearest-neighbour index over fixed-dimension vectors.
///
/// Vectors are identified by their insertion position. Mutation takes
/// `&mut self`; every query takes `&self`, so a built index can be shared
/// across threads.
pub struct VectorIndex<T: Scalar = f32> {
    config: IndexConfig,
    store: VectorStore<T>,
    backend: Backend<T>,
}

impl<T: Scalar> VectorIndex<T> {
    /// Create an empty index, validating `config` first.
    pub fn new(config: IndexConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let backend = match config.strategy {
            IndexStrategy::Flat => Backend::Flat,
            IndexStrategy::KdTree => Backend::Tree(TreeBackend::new(TreeKind::Kd, config.metric)),
            IndexStrategy::BallTree => Backend::Tree(TreeBackend::new(
                TreeKind::Ball {
                    leaf_size: config.leaf_size,
                },
                config.metric,
            )),
            IndexStrategy::RandomProjection { target_dim } => {
                Backend::Projection(ProjectionBackend::new(
                    RandomBasis::generate(config.dim, target_dim, &mut rng),
                    config.metric,
                ))
            }
            IndexStrategy::Graph => Backend::Graph(GraphBackend::new(
                config.max_degree,
                config.ef_construction,
                config.metric,
            )),
            IndexStrategy::BitSignature { bits } => {
                Backend::Bits(BitBackend::new(RandomBasis::generate(config.dim, bits, &mut rng)))
            }
        };

        tracing::info!(
            strategy = %config.strategy,
            dim = config.dim,
            metric = %config.metric,
            "created vector index"
        );

        Ok(Self {
            store: VectorStore::new(config.dim),
            config,
            backend,
        })
    }

    /// Create an index with default tuning for `strategy`.
    pub fn with_strategy(
        dim: usize,
        metric: DistanceMetric,
        strategy: IndexStrategy,
    ) -> Result<Self> {
        Self::new(IndexConfig::new(dim, metric, strategy))
    }

    /// Create an index from a strategy name such as `"kdtree"` or `"bits"`.
    ///
    /// A named projection never widens past `dim`.
    pub fn from_name(name: &str, dim: usize, metric: DistanceMetric) -> Result<Self> {
        let strategy = match name.parse::<IndexStrategy>()? {
            IndexStrategy::RandomProjection { target_dim } => IndexStrategy::RandomProjection {
                target_dim: target_dim.min(dim),
            },
            other => other,
        };
        Self::with_strategy(dim, metric, strategy)
    }

    /// Append a vector and return its index.
    pub fn add(&mut self, vector: &[T]) -> Result<usize> {
        let strategy = self.config.strategy;
        if strategy.freezes_on_build() && self.is_built() {
            tracing::warn!(%strategy, "rejected add after tree build");
            return Err(VectorError::IndexFrozen { strategy });
        }

        let index = self.store.push(vector)?;
        match &mut self.backend {
            Backend::Flat | Backend::Tree(_) => {}
            Backend::Projection(projection) => {
                projection.insert(vector)?;
            }
            Backend::Graph(graph) => graph.insert(&self.store, index),
            Backend::Bits(bits) => bits.insert(vector),
        }
        Ok(index)
    }

    /// Append several vectors; nothing is added unless all of them fit.
    pub fn add_batch<V: AsRef<[T]>>(&mut self, vectors: &[V]) -> Result<Range<usize>> {
        for vector in vectors {
            self.check_dim(vector.as_ref())?;
        }

        let start = self.len();
        self.store.reserve(vectors.len());
        for vector in vectors {
            self.add(vector.as_ref())?;
        }
        Ok(start..self.len())
    }

    /// Commit tree backends now instead of on the first query.
    pub fn build(&self) -> Result<()> {
        match &self.backend {
            Backend::Tree(tree) => tree.tree(&self.store).map(|_| ()),
            Backend::Projection(projection) => projection.build(),
            _ => Ok(()),
        }
    }

    /// Whether every lazily built structure is in place.
    pub fn is_built(&self) -> bool {
        match &self.backend {
            Backend::Tree(tree) => tree.is_built(),
            Backend::Projection(projection) => projection.is_built(),
            _ => true,
        }
    }

    /// Every stored index, closest to `query` first.
    ///
    /// Exact for flat and tree backends; best-effort for the others.
    pub fn rank(&self, query: &[T]) -> Result<Ranking<'_, T>> {
        self.check_dim(query)?;
        if self.store.is_empty() {
            return Ok(Ranking::empty());
        }

        match &self.backend {
            Backend::Flat => Ok(Ranking::scan(flat::rank(&self.store, query, self.config.metric))),
            Backend::Tree(tree) => tree.rank(&self.store, query),
            Backend::Projection(projection) => projection.rank(query),
            Backend::Graph(graph) => Ok(Ranking::graph(graph.rank(&self.store, query))),
            Backend::Bits(bits) => Ok(bits.rank(query)),
        }
    }

    /// The `k` nearest vectors with their true distances, closest first.
    pub fn search(&self, query: &[T], k: usize) -> Result<Vec<SearchResult<T>>> {
        self.check_dim(query)?;
        if k == 0 || self.store.is_empty() {
            return Ok(Vec::new());
        }

        let hits = match &self.backend {
            Backend::Tree(tree) => tree.knn(&self.store, query, k)?,
            _ if self.config.strategy.is_exact() => {
                self.rescore(query, self.rank(query)?.take(k), k)
            }
            _ => {
                let candidates = self.rank(query)?.take(k.saturating_mul(OVERSAMPLE));
                self.rescore(query, candidates, k)
            }
        };

        Ok(hits
            .into_iter()
            .map(|(index, distance)| SearchResult { index, distance })
            .collect())
    }

    /// Single nearest vector, or `None` for an empty index.
    pub fn nearest(&self, query: &[T]) -> Result<Option<SearchResult<T>>> {
        if let Backend::Tree(tree) = &self.backend {
            self.check_dim(query)?;
            if self.store.is_empty() {
                return Ok(None);
            }
            return Ok(tree
                .nearest(&self.store, query)?
                .map(|(index, distance)| SearchResult { index, distance }));
        }
        Ok(self.search(query, 1)?.into_iter().next())
    }

    fn rescore(
        &self,
        query: &[T],
        candidates: impl Iterator<Item = usize>,
        k: usize,
    ) -> Vec<(usize, T)> {
        let mut best = MinSortedSet::new(k);
        for index in candidates {
            best.try_add(index, self.config.metric.distance(query, self.store.vector(index)));
        }
        best.into_vec()
    }

    /// Elementwise mean of the vectors at `indices`.
    pub fn get_average(&self, indices: &[usize]) -> Result<Vec<T>> {
        if indices.is_empty() {
            return Err(VectorError::EmptyInput);
        }
        let len = self.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(VectorError::IndexOutOfRange { index, len });
        }
        Ok(flat::average(&self.store, indices))
    }

    /// For every stored vector, in stored order, the position of its nearest
    /// entry in `candidates` under `metric` (first wins on ties).
    pub fn closest<V>(&self, candidates: &[V], metric: DistanceMetric) -> Result<Vec<usize>>
    where
        V: AsRef<[T]> + Sync,
    {
        if candidates.is_empty() {
            return Err(VectorError::EmptyInput);
        }
        for candidate in candidates {
            self.check_dim(candidate.as_ref())?;
        }
        Ok(flat::closest(&self.store, candidates, metric))
    }

    /// Stored vector at `index`.
    pub fn get(&self, index: usize) -> Option<&[T]> {
        self.store.get(index)
    }

    /// Neighbour list of graph vertex `index`; `None` for other backends.
    pub fn graph_node(&self, index: usize) -> Option<&ProximityGraphNode<T>> {
        match &self.backend {
            Backend::Graph(graph) => graph.nodes().get(index),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.config.dim
    }

    pub fn metric(&self) -> DistanceMetric {
        self.config.metric
    }

    pub fn strategy(&self) -> IndexStrategy {
        self.config.strategy
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    fn check_dim(&self, vector: &[T]) -> Result<()> {
        if vector.len() != self.config.dim {
            return Err(VectorError::DimensionMismatch {
                expected: self.config.dim,
                got: vector.len(),
            });
        }
        Ok(())
    }
}
