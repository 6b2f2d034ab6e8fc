//! Numeric bound for vector coordinates, distances and weights.

use std::cmp::Ordering;
use std::fmt::Debug;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use crate::simd;

/// Floating-point element type usable as a coordinate or a distance.
///
/// Implemented for `f32` and `f64`. The slice kernels default to plain loops;
/// both implementations override them with the SIMD versions from
/// [`crate::simd`].
pub trait Scalar:
    Copy
    + Debug
    + Default
    + PartialOrd
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + Sum
    + 'static
{
    const ZERO: Self;
    const ONE: Self;
    /// Largest finite value; used as the "unbounded" distance.
    const MAX: Self;
    /// Smallest finite value.
    const MIN: Self;

    fn abs(self) -> Self;
    fn sqrt(self) -> Self;
    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
    fn total_cmp(&self, other: &Self) -> Ordering;
    fn is_nan(self) -> bool;

    fn from_usize(value: usize) -> Self {
        Self::from_f64(value as f64)
    }

    fn dot(a: &[Self], b: &[Self]) -> Self {
        a.iter().zip(b).map(|(&x, &y)| x * y).sum()
    }

    fn squared_l2(a: &[Self], b: &[Self]) -> Self {
        a.iter()
            .zip(b)
            .map(|(&x, &y)| {
                let d = x - y;
                d * d
            })
            .sum()
    }

    fn l1(a: &[Self], b: &[Self]) -> Self {
        a.iter().zip(b).map(|(&x, &y)| (x - y).abs()).sum()
    }

    fn squared_norm(a: &[Self]) -> Self {
        Self::dot(a, a)
    }
}

macro_rules! impl_scalar {
    ($ty:ty, $dot:path, $l2:path, $l1:path) => {
        impl Scalar for $ty {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const MAX: Self = <$ty>::MAX;
            const MIN: Self = <$ty>::MIN;

            #[inline]
            fn abs(self) -> Self {
                <$ty>::abs(self)
            }

            #[inline]
            fn sqrt(self) -> Self {
                <$ty>::sqrt(self)
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn total_cmp(&self, other: &Self) -> Ordering {
                <$ty>::total_cmp(self, other)
            }

            #[inline]
            fn is_nan(self) -> bool {
                <$ty>::is_nan(self)
            }

            #[inline]
            fn dot(a: &[Self], b: &[Self]) -> Self {
                $dot(a, b)
            }

            #[inline]
            fn squared_l2(a: &[Self], b: &[Self]) -> Self {
                $l2(a, b)
            }

            #[inline]
            fn l1(a: &[Self], b: &[Self]) -> Self {
                $l1(a, b)
            }
        }
    };
}

impl_scalar!(f32, simd::dot_f32, simd::squared_l2_f32, simd::l1_f32);
impl_scalar!(f64, simd::dot_f64, simd::squared_l2_f64, simd::l1_f64);

#[cfg(test)]
mod tests {
    use super::*;

    fn generic_mean<T: Scalar>(values: &[T]) -> T {
        values.iter().copied().sum::<T>() / T::from_usize(values.len())
    }

    #[test]
    fn test_generic_arithmetic_both_precisions() {
        assert_eq!(generic_mean(&[1.0f32, 2.0, 3.0]), 2.0);
        assert_eq!(generic_mean(&[1.0f64, 2.0, 3.0]), 2.0);
    }

    #[test]
    fn test_bounds() {
        assert!(f32::MIN < <f32 as Scalar>::ZERO);
        assert!(<f64 as Scalar>::MAX > 1e300);
        assert_eq!(Scalar::abs(-2.5f32), 2.5);
    }
}
