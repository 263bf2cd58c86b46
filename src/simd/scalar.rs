//! The no-SIMD tier: one lane per vector.
//!
//! Used when no tier feature is enabled. It keeps the same contract as the
//! wide tiers so kernels need no special case: the mask is a `bool` and the
//! "vector" is a single element.

use crate::simd::dispatch::TierKind;
use crate::simd::traits::{LaneMask, Tier, VectorOps};
use crate::types::Element;

/// Scalar tier marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scalar;

impl Tier for Scalar {
    const KIND: TierKind = TierKind::Scalar;
    type F32 = ScalarVec<f32>;
    type F64 = ScalarVec<f64>;
}

/// A one-lane "vector".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(transparent)]
pub struct ScalarVec<E>(pub E);

impl LaneMask for bool {
    const LANES: usize = 1;

    #[inline]
    fn from_bits(bits: u64) -> Self {
        bits & 1 == 1
    }

    #[inline]
    fn to_bits(self) -> u64 {
        self as u64
    }
}

impl<E: Element> VectorOps<E> for ScalarVec<E> {
    type Mask = bool;
    const LANES: usize = 1;

    #[inline]
    unsafe fn load_aligned(ptr: *const E) -> Self {
        Self(ptr.read())
    }

    #[inline]
    unsafe fn load_unaligned(ptr: *const E) -> Self {
        Self(ptr.read())
    }

    #[inline]
    unsafe fn store_aligned(self, ptr: *mut E) {
        ptr.write(self.0)
    }

    #[inline]
    unsafe fn store_unaligned(self, ptr: *mut E) {
        ptr.write(self.0)
    }

    #[inline]
    unsafe fn masked_load(ptr: *const E, mask: bool) -> Self {
        if mask {
            Self(ptr.read())
        } else {
            Self(E::zero())
        }
    }

    #[inline]
    unsafe fn masked_store(self, ptr: *mut E, mask: bool) {
        if mask {
            ptr.write(self.0)
        }
    }

    #[inline]
    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }

    #[inline]
    fn mul(self, other: Self) -> Self {
        Self(self.0 * other.0)
    }

    // No estimate instruction without SIMD, so division stays exact.
    #[inline]
    fn div(self, other: Self) -> Self {
        Self(self.0 / other.0)
    }

    #[inline]
    fn set1(value: E) -> Self {
        Self(value)
    }

    #[inline]
    fn set(lanes: &[E]) -> Self {
        Self(lanes[0])
    }

    #[inline]
    fn abs(self, sign_mask: Self) -> Self {
        Self(E::and_not(sign_mask.0, self.0))
    }

    #[inline]
    fn zero() -> Self {
        Self(E::zero())
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        if self.0 > other.0 {
            self
        } else {
            other
        }
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        if self.0 < other.0 {
            self
        } else {
            other
        }
    }

    #[inline]
    fn masked_max(self, other: Self, mask: bool) -> Self {
        if mask {
            VectorOps::max(self, other)
        } else {
            Self(E::NEG_MAX)
        }
    }

    #[inline]
    fn masked_min(self, other: Self, mask: bool) -> Self {
        if mask {
            VectorOps::min(self, other)
        } else {
            Self(E::MAX)
        }
    }

    #[inline]
    fn index(self, lane: usize) -> E {
        debug_assert_eq!(lane, 0, "lane {} out of range for a scalar vector", lane);
        self.0
    }

    #[inline]
    fn reciprocal(self) -> Self {
        Self(E::one() / self.0)
    }

    #[inline]
    fn reciprocal_sqrt(self) -> Self {
        Self(E::one() / self.0.sqrt())
    }

    #[inline]
    fn sqrt(self) -> Self {
        Self(self.0.sqrt())
    }
}
