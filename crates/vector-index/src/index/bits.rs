//! Bit-signature backend: one random-hyperplane signature per vector,
//! ranked by Hamming distance to the query's signature.

use crate::projection::RandomBasis;
use crate::scalar::Scalar;
use crate::signature::BitSignature;

use super::ranking::Ranking;

pub(crate) struct BitBackend<T> {
    basis: RandomBasis<T>,
    signatures: Vec<BitSignature>,
}

impl<T: Scalar> BitBackend<T> {
    pub fn new(basis: RandomBasis<T>) -> Self {
        Self {
            basis,
            signatures: Vec::new(),
        }
    }

    pub fn bits(&self) -> usize {
        self.basis.rows()
    }

    pub fn insert(&mut self, vector: &[T]) {
        self.signatures.push(self.basis.signs(vector));
    }

    #[cfg(test)]
    pub fn signature(&self, index: usize) -> Option<&BitSignature> {
        self.signatures.get(index)
    }

    /// Bucket by Hamming distance; buckets are scanned in index order.
    pub fn rank(&self, query: &[T]) -> Ranking<'_, T> {
        let signature = self.basis.signs(query);
        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); self.bits() + 1];
        for (index, stored) in self.signatures.iter().enumerate() {
            buckets[stored.hamming(&signature) as usize].push(index);
        }
        Ranking::buckets(buckets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rank_orders_by_hamming_then_index() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut backend = BitBackend::<f32>::new(RandomBasis::generate(3, 16, &mut rng));
        backend.insert(&[1.0, 0.0, 0.0]);
        backend.insert(&[-1.0, 0.0, 0.0]);
        backend.insert(&[1.0, 0.0, 0.0]);

        let query = [1.0f32, 0.0, 0.0];
        let order: Vec<usize> = backend.rank(&query).collect();
        assert_eq!(order, vec![0, 2, 1]);

        let query_bits = backend.basis.signs(&query);
        let distances: Vec<u32> = order
            .iter()
            .map(|&i| backend.signature(i).unwrap().hamming(&query_bits))
            .collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }
}
