//! Index configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::balltree::DEFAULT_LEAF_SIZE;
use crate::distance::DistanceMetric;
use crate::graph_node::DEFAULT_MAX_DEGREE;
use crate::{Result, VectorError};

/// Projection width used when a strategy is selected by name.
pub const DEFAULT_PROJECTION_DIM: usize = 16;

/// Signature width used when a strategy is selected by name.
pub const DEFAULT_SIGNATURE_BITS: usize = 64;

/// Backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndexStrategy {
    /// Brute-force scan over every stored vector (exact).
    #[default]
    Flat,
    /// Exact KD tree, built on first query.
    KdTree,
    /// Exact ball tree, built on first query.
    BallTree,
    /// Rank in a `target_dim`-dimensional random projection (approximate).
    RandomProjection { target_dim: usize },
    /// Single-layer greedy proximity graph (approximate).
    Graph,
    /// Random-hyperplane bit signatures ranked by Hamming distance (approximate).
    BitSignature { bits: usize },
}

impl IndexStrategy {
    /// Whether rankings are guaranteed to be in true distance order.
    pub fn is_exact(self) -> bool {
        matches!(
            self,
            IndexStrategy::Flat | IndexStrategy::KdTree | IndexStrategy::BallTree
        )
    }

    /// Whether the backend commits an immutable structure on first query.
    pub fn freezes_on_build(self) -> bool {
        matches!(self, IndexStrategy::KdTree | IndexStrategy::BallTree)
    }

    pub fn name(self) -> &'static str {
        match self {
            IndexStrategy::Flat => "flat",
            IndexStrategy::KdTree => "kdtree",
            IndexStrategy::BallTree => "balltree",
            IndexStrategy::RandomProjection { .. } => "projection",
            IndexStrategy::Graph => "graph",
            IndexStrategy::BitSignature { .. } => "bits",
        }
    }
}

impl fmt::Display for IndexStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexStrategy::RandomProjection { target_dim } => {
                write!(f, "projection({target_dim})")
            }
            IndexStrategy::BitSignature { bits } => write!(f, "bits({bits})"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for IndexStrategy {
    type Err = VectorError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "flat" | "bruteforce" | "brute" => Ok(IndexStrategy::Flat),
            "kdtree" | "kd" => Ok(IndexStrategy::KdTree),
            "balltree" | "ball" => Ok(IndexStrategy::BallTree),
            "projection" | "randomprojection" => Ok(IndexStrategy::RandomProjection {
                target_dim: DEFAULT_PROJECTION_DIM,
            }),
            "graph" | "proximitygraph" | "hnsw" => Ok(IndexStrategy::Graph),
            "bits" | "bitsignature" | "binary" | "hamming" => Ok(IndexStrategy::BitSignature {
                bits: DEFAULT_SIGNATURE_BITS,
            }),
            _ => Err(VectorError::InvalidConfig(format!(
                "unknown index strategy '{s}'"
            ))),
        }
    }
}

/// Index configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Dimensionality of vectors.
    pub dim: usize,
    /// Distance metric to use.
    pub metric: DistanceMetric,
    /// Backend to build.
    pub strategy: IndexStrategy,
    /// Graph-specific: neighbour bound per vertex.
    pub max_degree: usize,
    /// Graph-specific: beam width when linking a new vertex.
    pub ef_construction: usize,
    /// Ball-tree-specific: vectors per leaf.
    pub leaf_size: usize,
    /// Seed for projection bases and signature hyperplanes.
    pub seed: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dim: 128,
            metric: DistanceMetric::Euclidean,
            strategy: IndexStrategy::Flat,
            max_degree: DEFAULT_MAX_DEGREE,
            ef_construction: 32,
            leaf_size: DEFAULT_LEAF_SIZE,
            seed: 0x5eed,
        }
    }
}

impl IndexConfig {
    pub fn new(dim: usize, metric: DistanceMetric, strategy: IndexStrategy) -> Self {
        Self {
            dim,
            metric,
            strategy,
            ..Default::default()
        }
    }

    /// Create config for flat (exact) index.
    pub fn flat(dim: usize, metric: DistanceMetric) -> Self {
        Self::new(dim, metric, IndexStrategy::Flat)
    }

    /// Create config for an exact KD tree.
    pub fn kd_tree(dim: usize, metric: DistanceMetric) -> Self {
        Self::new(dim, metric, IndexStrategy::KdTree)
    }

    /// Create config for an exact ball tree.
    pub fn ball_tree(dim: usize, metric: DistanceMetric) -> Self {
        Self::new(dim, metric, IndexStrategy::BallTree)
    }

    /// Create config ranking in a `target_dim` random projection.
    pub fn projection(dim: usize, metric: DistanceMetric, target_dim: usize) -> Self {
        Self::new(dim, metric, IndexStrategy::RandomProjection { target_dim })
    }

    /// Create config for a proximity graph with default degree.
    pub fn graph(dim: usize, metric: DistanceMetric) -> Self {
        Self::new(dim, metric, IndexStrategy::Graph)
    }

    /// Create high-recall graph config (denser graph, wider beam).
    pub fn graph_high_recall(dim: usize, metric: DistanceMetric) -> Self {
        Self {
            max_degree: 32,
            ef_construction: 128,
            ..Self::graph(dim, metric)
        }
    }

    /// Create config for `bits`-wide bit signatures.
    pub fn bit_signature(dim: usize, metric: DistanceMetric, bits: usize) -> Self {
        Self::new(dim, metric, IndexStrategy::BitSignature { bits })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject configurations no backend can serve.
    pub fn validate(&self) -> Result<()> {
        if self.dim == 0 {
            return Err(VectorError::InvalidConfig("dimension must be positive".into()));
        }

        match self.strategy {
            IndexStrategy::KdTree if !self.metric.bounded_by_axis() => {
                Err(VectorError::UnsupportedMetric {
                    structure: "kd-tree",
                    metric: self.metric,
                })
            }
            IndexStrategy::BallTree if !self.metric.is_metric() => {
                Err(VectorError::UnsupportedMetric {
                    structure: "ball-tree",
                    metric: self.metric,
                })
            }
            IndexStrategy::BallTree if self.leaf_size == 0 => {
                Err(VectorError::InvalidConfig("leaf size must be positive".into()))
            }
            IndexStrategy::RandomProjection { target_dim }
                if target_dim == 0 || target_dim > self.dim =>
            {
                Err(VectorError::InvalidConfig(format!(
                    "projection target dimension {target_dim} must be in 1..={}",
                    self.dim
                )))
            }
            IndexStrategy::Graph if self.max_degree == 0 || self.ef_construction == 0 => {
                Err(VectorError::InvalidConfig(
                    "graph degree and beam width must be positive".into(),
                ))
            }
            IndexStrategy::BitSignature { bits: 0 } => {
                Err(VectorError::InvalidConfig("signature width must be positive".into()))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_name() {
        assert_eq!("flat".parse::<IndexStrategy>().unwrap(), IndexStrategy::Flat);
        assert_eq!("KD-Tree".parse::<IndexStrategy>().unwrap(), IndexStrategy::KdTree);
        assert_eq!("ball_tree".parse::<IndexStrategy>().unwrap(), IndexStrategy::BallTree);
        assert_eq!(
            "projection".parse::<IndexStrategy>().unwrap(),
            IndexStrategy::RandomProjection {
                target_dim: DEFAULT_PROJECTION_DIM
            }
        );
        assert_eq!("hnsw".parse::<IndexStrategy>().unwrap(), IndexStrategy::Graph);
        assert_eq!(
            "hamming".parse::<IndexStrategy>().unwrap(),
            IndexStrategy::BitSignature {
                bits: DEFAULT_SIGNATURE_BITS
            }
        );
        assert!("ivf".parse::<IndexStrategy>().is_err());
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(IndexStrategy::KdTree.to_string(), "kdtree");
        assert_eq!(
            IndexStrategy::BitSignature { bits: 32 }.to_string(),
            "bits(32)"
        );
    }

    #[test]
    fn test_validate() {
        assert!(IndexConfig::flat(4, DistanceMetric::Cosine).validate().is_ok());
        assert!(IndexConfig::flat(0, DistanceMetric::Euclidean).validate().is_err());
        assert!(matches!(
            IndexConfig::kd_tree(4, DistanceMetric::Cosine).validate(),
            Err(VectorError::UnsupportedMetric { .. })
        ));
        assert!(IndexConfig::projection(4, DistanceMetric::Euclidean, 5).validate().is_err());
        assert!(IndexConfig::projection(4, DistanceMetric::Euclidean, 2).validate().is_ok());
        assert!(IndexConfig::bit_signature(4, DistanceMetric::Cosine, 0).validate().is_err());

        let mut graph = IndexConfig::graph(4, DistanceMetric::Euclidean);
        graph.max_degree = 0;
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "dim": 3,
            "metric": "manhattan",
            "strategy": { "type": "random_projection", "target_dim": 2 },
            "seed": 7
        }"#;
        let config: IndexConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.dim, 3);
        assert_eq!(config.metric, DistanceMetric::Manhattan);
        assert_eq!(config.strategy, IndexStrategy::RandomProjection { target_dim: 2 });
        assert_eq!(config.max_degree, DEFAULT_MAX_DEGREE);
        assert_eq!(config.seed, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_high_recall_preset() {
        let config = IndexConfig::graph_high_recall(64, DistanceMetric::Cosine);
        assert_eq!(config.strategy, IndexStrategy::Graph);
        assert_eq!(config.max_degree, 32);
    }
}
