//! Fixed-width bit signatures compared by Hamming distance.

/// Packed bit vector of a fixed width.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitSignature {
    words: Vec<u64>,
    bits: usize,
}

impl BitSignature {
    /// All-zero signature of `bits` bits.
    pub fn new(bits: usize) -> Self {
        Self {
            words: vec![0; (bits + 63) / 64],
            bits,
        }
    }

    #[inline]
    pub fn bits(&self) -> usize {
        self.bits
    }

    #[inline]
    fn locate(&self, bit: usize) -> (usize, u64) {
        assert!(bit < self.bits, "bit {bit} out of range for width {}", self.bits);
        (bit / 64, 1u64 << (bit % 64))
    }

    pub fn set(&mut self, bit: usize) {
        let (word, mask) = self.locate(bit);
        self.words[word] |= mask;
    }

    pub fn clear(&mut self, bit: usize) {
        let (word, mask) = self.locate(bit);
        self.words[word] &= !mask;
    }

    pub fn get(&self, bit: usize) -> bool {
        let (word, mask) = self.locate(bit);
        self.words[word] & mask != 0
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Bitwise XOR with a signature of the same width.
    pub fn xor(&self, other: &BitSignature) -> BitSignature {
        debug_assert_eq!(self.bits, other.bits);
        BitSignature {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a ^ b)
                .collect(),
            bits: self.bits,
        }
    }

    /// Number of differing bits, without materialising the XOR.
    pub fn hamming(&self, other: &BitSignature) -> u32 {
        debug_assert_eq!(self.bits, other.bits);
        self.words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    pub fn as_words(&self) -> &[u64] {
        &self.words
    }
}
