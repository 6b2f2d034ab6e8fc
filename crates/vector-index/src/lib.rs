//! # Vector Index
//!
//! Pluggable nearest-neighbour indices over fixed-dimension vectors.
//!
//! One [`VectorIndex`] contract (append, rank, average, closest-candidate
//! assignment) is served by interchangeable backends:
//!
//! - **Flat**: exact brute-force ranking
//! - **KD tree**: exact, arena-stored, built on first query
//! - **Ball tree**: exact, triangle-inequality pruning, built on first query
//! - **Random projection**: rank in a lower-dimensional random projection
//! - **Graph**: single-layer greedy proximity graph of bounded-degree nodes
//! - **Bit signature**: random-hyperplane bits ranked by Hamming distance
//!
//! The building blocks ([`BoundedSortedSet`], [`ProximityGraphNode`],
//! [`KdTree`], [`BallTree`]) are public for callers that assemble their own
//! structures.
//!
//! ## Example
//!
//! ```rust
//! use vector_index::{DistanceMetric, IndexConfig, VectorIndex};
//!
//! let mut index = VectorIndex::<f32>::new(IndexConfig::kd_tree(2, DistanceMetric::Euclidean))?;
//! index.add(&[0.0, 0.0])?;
//! index.add(&[5.0, 5.0])?;
//! index.add(&[1.0, 1.0])?;
//!
//! let order: Vec<usize> = index.rank(&[0.9, 0.9])?.collect();
//! assert_eq!(order, vec![2, 0, 1]);
//! # Ok::<(), vector_index::VectorError>(())
//! ```

pub mod balltree;
pub mod config;
pub mod distance;
pub mod graph_node;
pub mod index;
pub mod kdtree;
pub mod projection;
mod queue;
pub mod scalar;
pub mod signature;
pub mod simd;
pub mod sorted_set;
pub mod storage;

// Re-export commonly used items
pub use balltree::BallTree;
pub use config::{IndexConfig, IndexStrategy};
pub use distance::{cosine_distance, euclidean_distance, manhattan_distance, DistanceMetric};
pub use graph_node::ProximityGraphNode;
pub use index::{Ranking, SearchResult, VectorIndex};
pub use kdtree::KdTree;
pub use projection::RandomBasis;
pub use scalar::Scalar;
pub use signature::BitSignature;
pub use sorted_set::{
    Ascending, BoundedSortedSet, Collector, Descending, MaxSortedSet, MinSortedSet, Nearest,
};
pub use storage::{VectorStorage, VectorStore};

/// Error types for vector operations
#[derive(Debug, thiserror::Error)]
pub enum VectorError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Index {index} out of range for {len} vectors")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Empty input")]
    EmptyInput,

    #[error("Cannot add to {strategy} index after its tree has been built")]
    IndexFrozen { strategy: IndexStrategy },

    #[error("{structure} does not support the {metric} metric")]
    UnsupportedMetric {
        structure: &'static str,
        metric: DistanceMetric,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, VectorError>;
