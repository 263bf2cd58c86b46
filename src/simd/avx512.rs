//! x86_64 512-bit tier using AVX-512F intrinsics.
//!
//! Masks are compact `__mmask16` / `__mmask8` registers, and masked loads,
//! stores and reductions map onto native masked instructions. This is the only
//! tier with double-precision estimates (`vrcp14pd`, `vrsqrt14pd`), which
//! `fast-math` uses for `f64` reciprocals and square roots. `f64` division
//! stays exact on every tier.
//!
//! Requires a toolchain with stable AVX-512 intrinsics (Rust 1.89+).

#![cfg(all(target_arch = "x86_64", target_feature = "avx512f"))]
#![allow(unused_unsafe)]

use std::arch::x86_64::*;

use crate::simd::dispatch::TierKind;
use crate::simd::traits::{low_bits, LaneMask, Tier, VectorOps};
use crate::types::Element;

/// 512-bit tier marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Avx512;

impl Tier for Avx512 {
    const KIND: TierKind = TierKind::Avx512;
    type F32 = Avx512F32;
    type F64 = Avx512F64;
}

// ============================================================================
// Masks
// ============================================================================

/// One bit per `f32` lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitMask16(pub __mmask16);

impl LaneMask for BitMask16 {
    const LANES: usize = 16;

    #[inline]
    fn from_bits(bits: u64) -> Self {
        Self((bits & low_bits(16)) as __mmask16)
    }

    #[inline]
    fn to_bits(self) -> u64 {
        self.0 as u64
    }
}

/// One bit per `f64` lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitMask8(pub __mmask8);

impl LaneMask for BitMask8 {
    const LANES: usize = 8;

    #[inline]
    fn from_bits(bits: u64) -> Self {
        Self((bits & low_bits(8)) as __mmask8)
    }

    #[inline]
    fn to_bits(self) -> u64 {
        self.0 as u64
    }
}

// ============================================================================
// F32x16
// ============================================================================

/// 16-lane f32 vector.
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct Avx512F32(pub __m512);

impl VectorOps<f32> for Avx512F32 {
    type Mask = BitMask16;
    const LANES: usize = 16;

    #[inline]
    unsafe fn load_aligned(ptr: *const f32) -> Self {
        debug_assert_eq!(ptr as usize % 64, 0);
        Self(_mm512_load_ps(ptr))
    }

    #[inline]
    unsafe fn load_unaligned(ptr: *const f32) -> Self {
        Self(_mm512_loadu_ps(ptr))
    }

    #[inline]
    unsafe fn store_aligned(self, ptr: *mut f32) {
        debug_assert_eq!(ptr as usize % 64, 0);
        _mm512_stream_ps(ptr, self.0)
    }

    #[inline]
    unsafe fn store_unaligned(self, ptr: *mut f32) {
        _mm512_storeu_ps(ptr, self.0)
    }

    #[inline]
    unsafe fn masked_load(ptr: *const f32, mask: BitMask16) -> Self {
        Self(_mm512_mask_loadu_ps(_mm512_setzero_ps(), mask.0, ptr))
    }

    #[inline]
    unsafe fn masked_store(self, ptr: *mut f32, mask: BitMask16) {
        _mm512_mask_storeu_ps(ptr, mask.0, self.0)
    }

    #[inline]
    fn add(self, other: Self) -> Self {
        Self(unsafe { _mm512_add_ps(self.0, other.0) })
    }

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self(unsafe { _mm512_sub_ps(self.0, other.0) })
    }

    #[inline]
    fn mul(self, other: Self) -> Self {
        Self(unsafe { _mm512_mul_ps(self.0, other.0) })
    }

    #[cfg(feature = "fast-math")]
    #[inline]
    fn div(self, other: Self) -> Self {
        Self(unsafe { _mm512_mul_ps(self.0, _mm512_rcp14_ps(other.0)) })
    }

    #[cfg(not(feature = "fast-math"))]
    #[inline]
    fn div(self, other: Self) -> Self {
        Self(unsafe { _mm512_div_ps(self.0, other.0) })
    }

    #[inline]
    fn set1(value: f32) -> Self {
        Self(unsafe { _mm512_set1_ps(value) })
    }

    #[inline]
    fn set(lanes: &[f32]) -> Self {
        let lanes = &lanes[..16];
        let ordered: [f32; 16] = std::array::from_fn(|i| lanes[15 - i]);
        Self(unsafe { _mm512_loadu_ps(ordered.as_ptr()) })
    }

    #[inline]
    fn abs(self, sign_mask: Self) -> Self {
        // vandnps needs AVX-512DQ; the integer form is plain AVX-512F.
        Self(unsafe {
            _mm512_castsi512_ps(_mm512_andnot_si512(
                _mm512_castps_si512(sign_mask.0),
                _mm512_castps_si512(self.0),
            ))
        })
    }

    #[inline]
    fn zero() -> Self {
        Self(unsafe { _mm512_setzero_ps() })
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        Self(unsafe { _mm512_max_ps(self.0, other.0) })
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        Self(unsafe { _mm512_min_ps(self.0, other.0) })
    }

    #[inline]
    fn masked_max(self, other: Self, mask: BitMask16) -> Self {
        Self(unsafe {
            _mm512_mask_max_ps(
                _mm512_set1_ps(<f32 as Element>::NEG_MAX),
                mask.0,
                self.0,
                other.0,
            )
        })
    }

    #[inline]
    fn masked_min(self, other: Self, mask: BitMask16) -> Self {
        Self(unsafe {
            _mm512_mask_min_ps(_mm512_set1_ps(<f32 as Element>::MAX), mask.0, self.0, other.0)
        })
    }

    #[inline]
    fn index(self, lane: usize) -> f32 {
        debug_assert!(lane < 16, "lane {} out of range", lane);
        let mut lanes = [0.0f32; 16];
        unsafe { _mm512_storeu_ps(lanes.as_mut_ptr(), self.0) };
        lanes[lane]
    }

    #[cfg(feature = "fast-math")]
    #[inline]
    fn reciprocal(self) -> Self {
        Self(unsafe { _mm512_rcp14_ps(self.0) })
    }

    #[cfg(not(feature = "fast-math"))]
    #[inline]
    fn reciprocal(self) -> Self {
        Self(unsafe { _mm512_div_ps(_mm512_set1_ps(1.0), self.0) })
    }

    #[cfg(feature = "fast-math")]
    #[inline]
    fn reciprocal_sqrt(self) -> Self {
        Self(unsafe { _mm512_rsqrt14_ps(self.0) })
    }

    #[cfg(not(feature = "fast-math"))]
    #[inline]
    fn reciprocal_sqrt(self) -> Self {
        Self(unsafe { _mm512_div_ps(_mm512_set1_ps(1.0), _mm512_sqrt_ps(self.0)) })
    }

    #[cfg(feature = "fast-math")]
    #[inline]
    fn sqrt(self) -> Self {
        Self(unsafe { _mm512_rcp14_ps(_mm512_rsqrt14_ps(self.0)) })
    }

    #[cfg(not(feature = "fast-math"))]
    #[inline]
    fn sqrt(self) -> Self {
        Self(unsafe { _mm512_sqrt_ps(self.0) })
    }
}

// ============================================================================
// F64x8
// ============================================================================

/// 8-lane f64 vector.
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct Avx512F64(pub __m512d);

impl VectorOps<f64> for Avx512F64 {
    type Mask = BitMask8;
    const LANES: usize = 8;

    #[inline]
    unsafe fn load_aligned(ptr: *const f64) -> Self {
        debug_assert_eq!(ptr as usize % 64, 0);
        Self(_mm512_load_pd(ptr))
    }

    #[inline]
    unsafe fn load_unaligned(ptr: *const f64) -> Self {
        Self(_mm512_loadu_pd(ptr))
    }

    #[inline]
    unsafe fn store_aligned(self, ptr: *mut f64) {
        debug_assert_eq!(ptr as usize % 64, 0);
        _mm512_stream_pd(ptr, self.0)
    }

    #[inline]
    unsafe fn store_unaligned(self, ptr: *mut f64) {
        _mm512_storeu_pd(ptr, self.0)
    }

    #[inline]
    unsafe fn masked_load(ptr: *const f64, mask: BitMask8) -> Self {
        Self(_mm512_mask_loadu_pd(_mm512_setzero_pd(), mask.0, ptr))
    }

    #[inline]
    unsafe fn masked_store(self, ptr: *mut f64, mask: BitMask8) {
        _mm512_mask_storeu_pd(ptr, mask.0, self.0)
    }

    #[inline]
    fn add(self, other: Self) -> Self {
        Self(unsafe { _mm512_add_pd(self.0, other.0) })
    }

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self(unsafe { _mm512_sub_pd(self.0, other.0) })
    }

    #[inline]
    fn mul(self, other: Self) -> Self {
        Self(unsafe { _mm512_mul_pd(self.0, other.0) })
    }

    #[inline]
    fn div(self, other: Self) -> Self {
        Self(unsafe { _mm512_div_pd(self.0, other.0) })
    }

    #[inline]
    fn set1(value: f64) -> Self {
        Self(unsafe { _mm512_set1_pd(value) })
    }

    #[inline]
    fn set(lanes: &[f64]) -> Self {
        let lanes = &lanes[..8];
        let ordered: [f64; 8] = std::array::from_fn(|i| lanes[7 - i]);
        Self(unsafe { _mm512_loadu_pd(ordered.as_ptr()) })
    }

    #[inline]
    fn abs(self, sign_mask: Self) -> Self {
        Self(unsafe {
            _mm512_castsi512_pd(_mm512_andnot_si512(
                _mm512_castpd_si512(sign_mask.0),
                _mm512_castpd_si512(self.0),
            ))
        })
    }

    #[inline]
    fn zero() -> Self {
        Self(unsafe { _mm512_setzero_pd() })
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        Self(unsafe { _mm512_max_pd(self.0, other.0) })
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        Self(unsafe { _mm512_min_pd(self.0, other.0) })
    }

    #[inline]
    fn masked_max(self, other: Self, mask: BitMask8) -> Self {
        Self(unsafe {
            _mm512_mask_max_pd(
                _mm512_set1_pd(<f64 as Element>::NEG_MAX),
                mask.0,
                self.0,
                other.0,
            )
        })
    }

    #[inline]
    fn masked_min(self, other: Self, mask: BitMask8) -> Self {
        Self(unsafe {
            _mm512_mask_min_pd(_mm512_set1_pd(<f64 as Element>::MAX), mask.0, self.0, other.0)
        })
    }

    #[inline]
    fn index(self, lane: usize) -> f64 {
        debug_assert!(lane < 8, "lane {} out of range", lane);
        let mut lanes = [0.0f64; 8];
        unsafe { _mm512_storeu_pd(lanes.as_mut_ptr(), self.0) };
        lanes[lane]
    }

    #[cfg(feature = "fast-math")]
    #[inline]
    fn reciprocal(self) -> Self {
        Self(unsafe { _mm512_rcp14_pd(self.0) })
    }

    #[cfg(not(feature = "fast-math"))]
    #[inline]
    fn reciprocal(self) -> Self {
        Self(unsafe { _mm512_div_pd(_mm512_set1_pd(1.0), self.0) })
    }

    #[cfg(feature = "fast-math")]
    #[inline]
    fn reciprocal_sqrt(self) -> Self {
        Self(unsafe { _mm512_rsqrt14_pd(self.0) })
    }

    #[cfg(not(feature = "fast-math"))]
    #[inline]
    fn reciprocal_sqrt(self) -> Self {
        Self(unsafe { _mm512_div_pd(_mm512_set1_pd(1.0), _mm512_sqrt_pd(self.0)) })
    }

    #[cfg(feature = "fast-math")]
    #[inline]
    fn sqrt(self) -> Self {
        Self(unsafe { _mm512_rcp14_pd(_mm512_rsqrt14_pd(self.0)) })
    }

    #[cfg(not(feature = "fast-math"))]
    #[inline]
    fn sqrt(self) -> Self {
        Self(unsafe { _mm512_sqrt_pd(self.0) })
    }
}
