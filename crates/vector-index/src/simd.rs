//! Portable SIMD kernels for the distance metrics.
//!
//! Uses `wide` lanes (8 x f32, 4 x f64) with a scalar tail for the remainder.
//! These back the `Scalar` implementations for `f32` and `f64`; any other
//! element type goes through the plain loops in [`crate::scalar`].

use wide::{f32x8, f64x4};

const F32_WIDTH: usize = 8;
const F64_WIDTH: usize = 4;

#[inline(always)]
fn load_f32(s: &[f32]) -> f32x8 {
    f32x8::new([s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7]])
}

#[inline(always)]
fn load_f64(s: &[f64]) -> f64x4 {
    f64x4::new([s[0], s[1], s[2], s[3]])
}

/// Dot product of two `f32` slices of equal length.
#[inline]
pub fn dot_f32(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let chunks = a.len() / F32_WIDTH;

    let mut sum = f32x8::ZERO;
    for i in 0..chunks {
        let offset = i * F32_WIDTH;
        sum += load_f32(&a[offset..]) * load_f32(&b[offset..]);
    }

    let mut result = sum.reduce_add();
    for i in chunks * F32_WIDTH..a.len() {
        result += a[i] * b[i];
    }
    result
}

/// Squared Euclidean distance between two `f32` slices.
#[inline]
pub fn squared_l2_f32(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let chunks = a.len() / F32_WIDTH;

    let mut sum = f32x8::ZERO;
    for i in 0..chunks {
        let offset = i * F32_WIDTH;
        let diff = load_f32(&a[offset..]) - load_f32(&b[offset..]);
        sum += diff * diff;
    }

    let mut result = sum.reduce_add();
    for i in chunks * F32_WIDTH..a.len() {
        let d = a[i] - b[i];
        result += d * d;
    }
    result
}

/// Manhattan (L1) distance between two `f32` slices.
#[inline]
pub fn l1_f32(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let chunks = a.len() / F32_WIDTH;

    let mut sum = f32x8::ZERO;
    for i in 0..chunks {
        let offset = i * F32_WIDTH;
        sum += (load_f32(&a[offset..]) - load_f32(&b[offset..])).abs();
    }

    let mut result = sum.reduce_add();
    for i in chunks * F32_WIDTH..a.len() {
        result += (a[i] - b[i]).abs();
    }
    result
}

/// Dot product of two `f64` slices of equal length.
#[inline]
pub fn dot_f64(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let chunks = a.len() / F64_WIDTH;

    let mut sum = f64x4::ZERO;
    for i in 0..chunks {
        let offset = i * F64_WIDTH;
        sum += load_f64(&a[offset..]) * load_f64(&b[offset..]);
    }

    let mut result = sum.reduce_add();
    for i in chunks * F64_WIDTH..a.len() {
        result += a[i] * b[i];
    }
    result
}

/// Squared Euclidean distance between two `f64` slices.
#[inline]
pub fn squared_l2_f64(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let chunks = a.len() / F64_WIDTH;

    let mut sum = f64x4::ZERO;
    for i in 0..chunks {
        let offset = i * F64_WIDTH;
        let diff = load_f64(&a[offset..]) - load_f64(&b[offset..]);
        sum += diff * diff;
    }

    let mut result = sum.reduce_add();
    for i in chunks * F64_WIDTH..a.len() {
        let d = a[i] - b[i];
        result += d * d;
    }
    result
}

/// Manhattan (L1) distance between two `f64` slices.
#[inline]
pub fn l1_f64(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let chunks = a.len() / F64_WIDTH;

    let mut sum = f64x4::ZERO;
    for i in 0..chunks {
        let offset = i * F64_WIDTH;
        sum += (load_f64(&a[offset..]) - load_f64(&b[offset..])).abs();
    }

    let mut result = sum.reduce_add();
    for i in chunks * F64_WIDTH..a.len() {
        result += (a[i] - b[i]).abs();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_dot_matches_naive_with_tail() {
        // 19 = two full lanes plus a 3-element tail
        let a: Vec<f32> = (0..19).map(|i| i as f32 * 0.5).collect();
        let b: Vec<f32> = (0..19).map(|i| (19 - i) as f32 * 0.25).collect();
        assert!((dot_f32(&a, &b) - naive_dot(&a, &b)).abs() < 1e-3);
    }

    #[test]
    fn test_squared_l2_f32() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![4.0, 5.0, 6.0];
        assert!((squared_l2_f32(&a, &b) - 27.0).abs() < 1e-6);
    }

    #[test]
    fn test_l1_f32_long() {
        let a = vec![0.0f32; 16];
        let b = vec![-1.0f32; 16];
        assert!((l1_f32(&a, &b) - 16.0).abs() < 1e-6);
    }

    #[test]
    fn test_f64_kernels() {
        let a: Vec<f64> = (0..9).map(|i| i as f64).collect();
        let b: Vec<f64> = vec![1.0; 9];
        assert_eq!(dot_f64(&a, &b), 36.0);
        assert_eq!(l1_f64(&a, &b), 1.0 + 0.0 + 1.0 + 2.0 + 3.0 + 4.0 + 5.0 + 6.0 + 7.0);
        assert_eq!(squared_l2_f64(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
    }
}
