//! Random linear maps for dimensionality reduction and hashing.
//!
//! A [`RandomBasis`] is a `rows x dim` matrix with Rademacher entries scaled by
//! `1 / sqrt(rows)` (Achlioptas, "Database-friendly random projections").
//! Projecting through it approximately preserves Euclidean distances; the
//! signs of the projection are random-hyperplane bits whose Hamming distance
//! tracks the angle between vectors.

use rand::Rng;

use crate::scalar::Scalar;
use crate::signature::BitSignature;

/// Dense random projection matrix, row-major.
#[derive(Debug, Clone)]
pub struct RandomBasis<T> {
    rows: usize,
    dim: usize,
    data: Vec<T>,
}

impl<T: Scalar> RandomBasis<T> {
    /// Generate a `rows x dim` basis from `rng`.
    pub fn generate<R: Rng + ?Sized>(dim: usize, rows: usize, rng: &mut R) -> Self {
        let scale = T::from_f64(1.0 / (rows.max(1) as f64).sqrt());
        let data = (0..rows * dim)
            .map(|_| if rng.gen_bool(0.5) { scale } else { -scale })
            .collect();
        Self { rows, dim, data }
    }

    /// Output dimensionality.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Input dimensionality.
    pub fn dim(&self) -> usize {
        self.dim
    }

    fn row(&self, r: usize) -> &[T] {
        &self.data[r * self.dim..(r + 1) * self.dim]
    }

    /// Project `vector` into `out` (`out.len() == rows`).
    pub fn project_into(&self, vector: &[T], out: &mut [T]) {
        debug_assert_eq!(vector.len(), self.dim);
        debug_assert_eq!(out.len(), self.rows);
        for (r, o) in out.iter_mut().enumerate() {
            *o = T::dot(self.row(r), vector);
        }
    }

    pub fn project(&self, vector: &[T]) -> Vec<T> {
        let mut out = vec![T::ZERO; self.rows];
        self.project_into(vector, &mut out);
        out
    }

    /// One bit per row: set when the vector lies on the positive side of
    /// that row's hyperplane.
    pub fn signs(&self, vector: &[T]) -> BitSignature {
        let mut signature = BitSignature::new(self.rows);
        for r in 0..self.rows {
            if T::dot(self.row(r), vector) > T::ZERO {
                signature.set(r);
            }
        }
        signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::euclidean_distance;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_same_seed_same_basis() {
        let a = RandomBasis::<f32>::generate(16, 4, &mut StdRng::seed_from_u64(1));
        let b = RandomBasis::<f32>::generate(16, 4, &mut StdRng::seed_from_u64(1));
        let v: Vec<f32> = (0..16).map(|i| i as f32).collect();
        assert_eq!(a.project(&v), b.project(&v));
    }

    #[test]
    fn test_projection_shape_and_linearity() {
        let basis = RandomBasis::<f64>::generate(10, 3, &mut StdRng::seed_from_u64(2));
        assert_eq!(basis.rows(), 3);
        assert_eq!(basis.dim(), 10);

        let v = vec![1.0; 10];
        let doubled = vec![2.0; 10];
        let p = basis.project(&v);
        let q = basis.project(&doubled);
        for (x, y) in p.iter().zip(&q) {
            assert!((2.0 * x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_projection_roughly_preserves_distance() {
        let mut rng = StdRng::seed_from_u64(3);
        let basis = RandomBasis::<f64>::generate(256, 128, &mut rng);
        let a: Vec<f64> = (0..256).map(|_| rng.r#gen::<f64>()).collect();
        let b: Vec<f64> = (0..256).map(|_| rng.r#gen::<f64>()).collect();

        let original = euclidean_distance(&a, &b);
        let projected = euclidean_distance(&basis.project(&a), &basis.project(&b));
        let ratio = projected / original;
        assert!(ratio > 0.6 && ratio < 1.4, "ratio {ratio}");
    }

    #[test]
    fn test_opposite_vectors_have_complementary_signs() {
        let basis = RandomBasis::<f32>::generate(8, 32, &mut StdRng::seed_from_u64(4));
        let v: Vec<f32> = vec![0.5, -1.0, 2.0, 0.25, 1.0, -0.5, 0.75, 3.125];
        let neg: Vec<f32> = v.iter().map(|x| -x).collect();
        let sv = basis.signs(&v);
        let sn = basis.signs(&neg);
        // no signed sum of these coordinates is zero
        assert_eq!(sv.hamming(&sn), 32);
    }
}
