//! Distance metrics for vector comparison.
//!
//! Provides generic implementations of:
//! - Euclidean (L2) distance
//! - Cosine distance (1 - cosine similarity)
//! - Manhattan (L1) distance
//!
//! All functions expect slices of equal length; callers validate dimensions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::scalar::Scalar;
use crate::VectorError;

/// Distance metric for vector comparison. Smaller is always closer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Euclidean (L2) distance
    #[default]
    Euclidean,
    /// Cosine distance, in [0, 2]
    Cosine,
    /// Manhattan (L1) distance
    Manhattan,
}

impl DistanceMetric {
    /// Compute the distance between `a` and `b` under this metric.
    #[inline]
    pub fn distance<T: Scalar>(self, a: &[T], b: &[T]) -> T {
        match self {
            DistanceMetric::Euclidean => euclidean_distance(a, b),
            DistanceMetric::Cosine => cosine_distance(a, b),
            DistanceMetric::Manhattan => manhattan_distance(a, b),
        }
    }

    /// Whether `|a[i] - b[i]|` is a lower bound of the distance for every axis.
    ///
    /// Axis-aligned tree pruning is only exact under such metrics.
    pub fn bounded_by_axis(self) -> bool {
        matches!(self, DistanceMetric::Euclidean | DistanceMetric::Manhattan)
    }

    /// Whether the metric satisfies the triangle inequality.
    pub fn is_metric(self) -> bool {
        matches!(self, DistanceMetric::Euclidean | DistanceMetric::Manhattan)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Manhattan => "manhattan",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = VectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            "cosine" => Ok(DistanceMetric::Cosine),
            "manhattan" | "l1" => Ok(DistanceMetric::Manhattan),
            other => Err(VectorError::InvalidConfig(format!(
                "unknown distance metric '{other}'"
            ))),
        }
    }
}

/// Compute L2 norm of a vector.
#[inline]
pub fn l2_norm<T: Scalar>(a: &[T]) -> T {
    T::squared_norm(a).sqrt()
}

/// Compute squared Euclidean distance.
///
/// Cheaper than `euclidean_distance` when only relative ordering matters.
#[inline]
pub fn squared_euclidean_distance<T: Scalar>(a: &[T], b: &[T]) -> T {
    T::squared_l2(a, b)
}

/// Compute Euclidean (L2) distance.
#[inline]
pub fn euclidean_distance<T: Scalar>(a: &[T], b: &[T]) -> T {
    squared_euclidean_distance(a, b).sqrt()
}

/// Compute Manhattan (L1) distance.
#[inline]
pub fn manhattan_distance<T: Scalar>(a: &[T], b: &[T]) -> T {
    T::l1(a, b)
}

/// Compute cosine similarity, in [-1, 1].
///
/// A zero vector has similarity 0 to everything.
#[inline]
pub fn cosine_similarity<T: Scalar>(a: &[T], b: &[T]) -> T {
    let dot = T::dot(a, b);
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    let eps = T::from_f64(1e-10);

    if norm_a < eps || norm_b < eps {
        return T::ZERO;
    }

    dot / (norm_a * norm_b)
}

/// Compute cosine distance (1 - cosine similarity), in [0, 2].
#[inline]
pub fn cosine_distance<T: Scalar>(a: &[T], b: &[T]) -> T {
    T::ONE - cosine_similarity(a, b)
}

/// Batch compute distances from `query` to each of `vectors`, in input order.
pub fn batch_distances<T: Scalar>(
    query: &[T],
    vectors: &[&[T]],
    metric: DistanceMetric,
) -> Vec<T> {
    vectors.iter().map(|v| metric.distance(query, v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0f32, 0.0, 0.0];
        let sim = cosine_similarity(&a, &a);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0f32, 0.0, 0.0];
        let b = vec![0.0f32, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_distance_opposite() {
        let a = vec![1.0f64, 0.0];
        let b = vec![-1.0f64, 0.0];
        assert!((cosine_distance(&a, &b) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_euclidean_distance() {
        let a = vec![0.0f32, 0.0, 0.0];
        let b = vec![3.0f32, 4.0, 0.0];
        assert!((euclidean_distance(&a, &b) - 5.0).abs() < 1e-6);
        assert_eq!(squared_euclidean_distance(&a, &b), 25.0);
    }

    #[test]
    fn test_manhattan_distance() {
        let a = vec![1.0f32, -2.0, 3.0];
        let b = vec![0.0f32, 0.0, 0.0];
        assert!((manhattan_distance(&a, &b) - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_vector_cosine() {
        let a = vec![0.0f32, 0.0, 0.0];
        let b = vec![1.0f32, 0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert_eq!(cosine_distance(&a, &b), 1.0);
    }

    #[test]
    fn test_metric_dispatch() {
        let a = [0.0f64, 0.0];
        let b = [3.0f64, 4.0];
        assert_eq!(DistanceMetric::Euclidean.distance(&a, &b), 5.0);
        assert_eq!(DistanceMetric::Manhattan.distance(&a, &b), 7.0);
        assert_eq!(DistanceMetric::Cosine.distance(&a, &b), 1.0);
    }

    #[test]
    fn test_metric_parse_and_display() {
        assert_eq!("L2".parse::<DistanceMetric>().unwrap(), DistanceMetric::Euclidean);
        assert_eq!("cosine".parse::<DistanceMetric>().unwrap(), DistanceMetric::Cosine);
        assert_eq!(DistanceMetric::Manhattan.to_string(), "manhattan");
        assert!("hamming".parse::<DistanceMetric>().is_err());
    }

    #[test]
    fn test_batch_distances() {
        let query = vec![1.0f32, 0.0, 0.0];
        let vectors: Vec<Vec<f32>> = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![-1.0, 0.0, 0.0],
        ];
        let refs: Vec<&[f32]> = vectors.iter().map(|v| v.as_slice()).collect();

        let distances = batch_distances(&query, &refs, DistanceMetric::Cosine);

        assert!((distances[0] - 0.0).abs() < 1e-6);
        assert!((distances[1] - 1.0).abs() < 1e-6);
        assert!((distances[2] - 2.0).abs() < 1e-6);
    }
}
