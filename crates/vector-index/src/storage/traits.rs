//! Storage trait shared by the index structures.

use crate::scalar::Scalar;

/// Indexed read access to fixed-dimension vectors.
///
/// Implementations must return slices of exactly `dim()` elements for every
/// index below `len()`.
pub trait VectorStorage<T: Scalar>: Send + Sync {
    /// Dimensionality of every stored vector.
    fn dim(&self) -> usize;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    /// Check if the storage is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Coordinates of vector `index`.
    ///
    /// # Panics
    ///
    /// May panic when `index >= len()`; callers check bounds first.
    fn vector(&self, index: usize) -> &[T];

    /// Coordinates of vector `index`, or `None` when out of range.
    fn get(&self, index: usize) -> Option<&[T]> {
        if index < self.len() {
            Some(self.vector(index))
        } else {
            None
        }
    }
}

impl<T: Scalar> VectorStorage<T> for Vec<Vec<T>> {
    fn dim(&self) -> usize {
        self.first().map_or(0, |v| v.len())
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn vector(&self, index: usize) -> &[T] {
        &self[index]
    }
}
