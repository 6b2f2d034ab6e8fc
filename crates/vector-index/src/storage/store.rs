//! Contiguous append-only vector store.

use crate::scalar::Scalar;
use crate::{Result, VectorError};

use super::VectorStorage;

/// Append-only vector store.
///
/// All coordinates live in one flat buffer; vector `i` occupies
/// `data[i * dim..(i + 1) * dim]`. Indices are stable and never reused.
#[derive(Debug, Clone)]
pub struct VectorStore<T> {
    dim: usize,
    data: Vec<T>,
}

impl<T: Scalar> VectorStore<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
        }
    }

    /// Reserve room for `vectors` more vectors.
    pub fn reserve(&mut self, vectors: usize) {
        self.data.reserve(self.dim * vectors);
    }

    /// Append a vector and return its index.
    pub fn push(&mut self, vector: &[T]) -> Result<usize> {
        if vector.len() != self.dim {
            return Err(VectorError::DimensionMismatch {
                expected: self.dim,
                got: vector.len(),
            });
        }
        let index = self.len();
        self.data.extend_from_slice(vector);
        Ok(index)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        // chunks_exact(0) panics; a zero-dimension store is rejected upstream
        self.data.chunks_exact(self.dim.max(1))
    }

    pub fn as_flat(&self) -> &[T] {
        &self.data
    }
}

impl<T: Scalar> VectorStorage<T> for VectorStore<T> {
    #[inline]
    fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    #[inline]
    fn vector(&self, index: usize) -> &[T] {
        let start = index * self.dim;
        &self.data[start..start + self.dim]
    }
}
