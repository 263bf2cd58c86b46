//! x86_64 256-bit tiers using AVX and AVX2 intrinsics.
//!
//! Both tiers use `__m256`/`__m256d` registers with full-width `__m256i`
//! masks and share every binding except two:
//! - aligned loads: `vmovaps` on [`Avx`], streaming `vmovntdqa` on [`Avx2`]
//! - lane extraction: a spill on [`Avx`], a `vpermps` on [`Avx2`]
//!
//! This module only exists when the crate is compiled with the target
//! feature enabled, so every intrinsic here is available on the running CPU
//! by construction.

#![cfg(all(target_arch = "x86_64", target_feature = "avx"))]
#![allow(unused_unsafe)]

use std::arch::x86_64::*;

use crate::simd::dispatch::TierKind;
use crate::simd::traits::{LaneMask, Tier, VectorOps};
use crate::types::Element;

/// 256-bit AVX tier marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Avx;

impl Tier for Avx {
    const KIND: TierKind = TierKind::Avx;
    type F32 = AvxF32;
    type F64 = AvxF64;
}

/// 256-bit AVX2 tier marker (streaming aligned loads).
#[cfg(target_feature = "avx2")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Avx2;

#[cfg(target_feature = "avx2")]
impl Tier for Avx2 {
    const KIND: TierKind = TierKind::Avx2;
    type F32 = Avx2F32;
    type F64 = Avx2F64;
}

#[inline(always)]
const fn lane_i32(bits: u64, lane: usize) -> i32 {
    if (bits >> lane) & 1 == 1 {
        -1
    } else {
        0
    }
}

#[inline(always)]
const fn lane_i64(bits: u64, lane: usize) -> i64 {
    if (bits >> lane) & 1 == 1 {
        -1
    } else {
        0
    }
}

// ============================================================================
// Masks
// ============================================================================

/// Eight 32-bit lanes, each all ones (selected) or all zeros.
#[derive(Debug, Clone, Copy)]
pub struct Mask32x8(pub __m256i);

impl LaneMask for Mask32x8 {
    const LANES: usize = 8;

    #[inline]
    fn from_bits(bits: u64) -> Self {
        Self(unsafe {
            _mm256_setr_epi32(
                lane_i32(bits, 0),
                lane_i32(bits, 1),
                lane_i32(bits, 2),
                lane_i32(bits, 3),
                lane_i32(bits, 4),
                lane_i32(bits, 5),
                lane_i32(bits, 6),
                lane_i32(bits, 7),
            )
        })
    }

    #[inline]
    fn to_bits(self) -> u64 {
        unsafe { _mm256_movemask_ps(_mm256_castsi256_ps(self.0)) as u32 as u64 }
    }
}

/// Four 64-bit lanes, each all ones (selected) or all zeros.
#[derive(Debug, Clone, Copy)]
pub struct Mask64x4(pub __m256i);

impl LaneMask for Mask64x4 {
    const LANES: usize = 4;

    #[inline]
    fn from_bits(bits: u64) -> Self {
        Self(unsafe {
            _mm256_setr_epi64x(
                lane_i64(bits, 0),
                lane_i64(bits, 1),
                lane_i64(bits, 2),
                lane_i64(bits, 3),
            )
        })
    }

    #[inline]
    fn to_bits(self) -> u64 {
        unsafe { _mm256_movemask_pd(_mm256_castsi256_pd(self.0)) as u32 as u64 }
    }
}

// ============================================================================
// Shared bindings
// ============================================================================

/// Everything but `load_aligned` and `index`, which each type provides as
/// `load_aligned_impl` / `index_impl`.
macro_rules! avx_f32_ops {
    ($ty:ident) => {
        impl VectorOps<f32> for $ty {
            type Mask = Mask32x8;
            const LANES: usize = 8;

            #[inline]
            unsafe fn load_aligned(ptr: *const f32) -> Self {
                debug_assert_eq!(ptr as usize % 32, 0);
                Self::load_aligned_impl(ptr)
            }

            #[inline]
            unsafe fn load_unaligned(ptr: *const f32) -> Self {
                Self(_mm256_loadu_ps(ptr))
            }

            #[inline]
            unsafe fn store_aligned(self, ptr: *mut f32) {
                debug_assert_eq!(ptr as usize % 32, 0);
                _mm256_stream_ps(ptr, self.0)
            }

            #[inline]
            unsafe fn store_unaligned(self, ptr: *mut f32) {
                _mm256_storeu_ps(ptr, self.0)
            }

            #[inline]
            unsafe fn masked_load(ptr: *const f32, mask: Mask32x8) -> Self {
                Self(_mm256_maskload_ps(ptr, mask.0))
            }

            #[inline]
            unsafe fn masked_store(self, ptr: *mut f32, mask: Mask32x8) {
                _mm256_maskstore_ps(ptr, mask.0, self.0)
            }

            #[inline]
            fn add(self, other: Self) -> Self {
                Self(unsafe { _mm256_add_ps(self.0, other.0) })
            }

            #[inline]
            fn sub(self, other: Self) -> Self {
                Self(unsafe { _mm256_sub_ps(self.0, other.0) })
            }

            #[inline]
            fn mul(self, other: Self) -> Self {
                Self(unsafe { _mm256_mul_ps(self.0, other.0) })
            }

            #[cfg(feature = "fast-math")]
            #[inline]
            fn div(self, other: Self) -> Self {
                Self(unsafe { _mm256_mul_ps(self.0, _mm256_rcp_ps(other.0)) })
            }

            #[cfg(not(feature = "fast-math"))]
            #[inline]
            fn div(self, other: Self) -> Self {
                Self(unsafe { _mm256_div_ps(self.0, other.0) })
            }

            #[inline]
            fn set1(value: f32) -> Self {
                Self(unsafe { _mm256_set1_ps(value) })
            }

            #[inline]
            fn set(lanes: &[f32]) -> Self {
                let l = &lanes[..8];
                Self(unsafe { _mm256_set_ps(l[0], l[1], l[2], l[3], l[4], l[5], l[6], l[7]) })
            }

            #[inline]
            fn abs(self, sign_mask: Self) -> Self {
                Self(unsafe { _mm256_andnot_ps(sign_mask.0, self.0) })
            }

            #[inline]
            fn zero() -> Self {
                Self(unsafe { _mm256_setzero_ps() })
            }

            #[inline]
            fn max(self, other: Self) -> Self {
                Self(unsafe { _mm256_max_ps(self.0, other.0) })
            }

            #[inline]
            fn min(self, other: Self) -> Self {
                Self(unsafe { _mm256_min_ps(self.0, other.0) })
            }

            #[inline]
            fn masked_max(self, other: Self, mask: Mask32x8) -> Self {
                Self(unsafe {
                    _mm256_blendv_ps(
                        _mm256_set1_ps(<f32 as Element>::NEG_MAX),
                        _mm256_max_ps(self.0, other.0),
                        _mm256_castsi256_ps(mask.0),
                    )
                })
            }

            #[inline]
            fn masked_min(self, other: Self, mask: Mask32x8) -> Self {
                Self(unsafe {
                    _mm256_blendv_ps(
                        _mm256_set1_ps(<f32 as Element>::MAX),
                        _mm256_min_ps(self.0, other.0),
                        _mm256_castsi256_ps(mask.0),
                    )
                })
            }

            #[inline]
            fn index(self, lane: usize) -> f32 {
                debug_assert!(lane < 8, "lane {} out of range", lane);
                self.index_impl(lane)
            }

            #[cfg(feature = "fast-math")]
            #[inline]
            fn reciprocal(self) -> Self {
                Self(unsafe { _mm256_rcp_ps(self.0) })
            }

            #[cfg(not(feature = "fast-math"))]
            #[inline]
            fn reciprocal(self) -> Self {
                Self(unsafe { _mm256_div_ps(_mm256_set1_ps(1.0), self.0) })
            }

            #[cfg(feature = "fast-math")]
            #[inline]
            fn reciprocal_sqrt(self) -> Self {
                Self(unsafe { _mm256_rsqrt_ps(self.0) })
            }

            #[cfg(not(feature = "fast-math"))]
            #[inline]
            fn reciprocal_sqrt(self) -> Self {
                Self(unsafe { _mm256_div_ps(_mm256_set1_ps(1.0), _mm256_sqrt_ps(self.0)) })
            }

            #[cfg(feature = "fast-math")]
            #[inline]
            fn sqrt(self) -> Self {
                Self(unsafe { _mm256_rcp_ps(_mm256_rsqrt_ps(self.0)) })
            }

            #[cfg(not(feature = "fast-math"))]
            #[inline]
            fn sqrt(self) -> Self {
                Self(unsafe { _mm256_sqrt_ps(self.0) })
            }
        }
    };
}

/// `f64` counterpart of `avx_f32_ops`. No double-precision estimates exist
/// at this width, so everything is exact.
macro_rules! avx_f64_ops {
    ($ty:ident) => {
        impl VectorOps<f64> for $ty {
            type Mask = Mask64x4;
            const LANES: usize = 4;

            #[inline]
            unsafe fn load_aligned(ptr: *const f64) -> Self {
                debug_assert_eq!(ptr as usize % 32, 0);
                Self::load_aligned_impl(ptr)
            }

            #[inline]
            unsafe fn load_unaligned(ptr: *const f64) -> Self {
                Self(_mm256_loadu_pd(ptr))
            }

            #[inline]
            unsafe fn store_aligned(self, ptr: *mut f64) {
                debug_assert_eq!(ptr as usize % 32, 0);
                _mm256_stream_pd(ptr, self.0)
            }

            #[inline]
            unsafe fn store_unaligned(self, ptr: *mut f64) {
                _mm256_storeu_pd(ptr, self.0)
            }

            #[inline]
            unsafe fn masked_load(ptr: *const f64, mask: Mask64x4) -> Self {
                Self(_mm256_maskload_pd(ptr, mask.0))
            }

            #[inline]
            unsafe fn masked_store(self, ptr: *mut f64, mask: Mask64x4) {
                _mm256_maskstore_pd(ptr, mask.0, self.0)
            }

            #[inline]
            fn add(self, other: Self) -> Self {
                Self(unsafe { _mm256_add_pd(self.0, other.0) })
            }

            #[inline]
            fn sub(self, other: Self) -> Self {
                Self(unsafe { _mm256_sub_pd(self.0, other.0) })
            }

            #[inline]
            fn mul(self, other: Self) -> Self {
                Self(unsafe { _mm256_mul_pd(self.0, other.0) })
            }

            #[inline]
            fn div(self, other: Self) -> Self {
                Self(unsafe { _mm256_div_pd(self.0, other.0) })
            }

            #[inline]
            fn set1(value: f64) -> Self {
                Self(unsafe { _mm256_set1_pd(value) })
            }

            #[inline]
            fn set(lanes: &[f64]) -> Self {
                let l = &lanes[..4];
                Self(unsafe { _mm256_set_pd(l[0], l[1], l[2], l[3]) })
            }

            #[inline]
            fn abs(self, sign_mask: Self) -> Self {
                Self(unsafe { _mm256_andnot_pd(sign_mask.0, self.0) })
            }

            #[inline]
            fn zero() -> Self {
                Self(unsafe { _mm256_setzero_pd() })
            }

            #[inline]
            fn max(self, other: Self) -> Self {
                Self(unsafe { _mm256_max_pd(self.0, other.0) })
            }

            #[inline]
            fn min(self, other: Self) -> Self {
                Self(unsafe { _mm256_min_pd(self.0, other.0) })
            }

            #[inline]
            fn masked_max(self, other: Self, mask: Mask64x4) -> Self {
                Self(unsafe {
                    _mm256_blendv_pd(
                        _mm256_set1_pd(<f64 as Element>::NEG_MAX),
                        _mm256_max_pd(self.0, other.0),
                        _mm256_castsi256_pd(mask.0),
                    )
                })
            }

            #[inline]
            fn masked_min(self, other: Self, mask: Mask64x4) -> Self {
                Self(unsafe {
                    _mm256_blendv_pd(
                        _mm256_set1_pd(<f64 as Element>::MAX),
                        _mm256_min_pd(self.0, other.0),
                        _mm256_castsi256_pd(mask.0),
                    )
                })
            }

            #[inline]
            fn index(self, lane: usize) -> f64 {
                debug_assert!(lane < 4, "lane {} out of range", lane);
                self.index_impl(lane)
            }

            #[inline]
            fn reciprocal(self) -> Self {
                Self(unsafe { _mm256_div_pd(_mm256_set1_pd(1.0), self.0) })
            }

            #[inline]
            fn reciprocal_sqrt(self) -> Self {
                Self(unsafe { _mm256_div_pd(_mm256_set1_pd(1.0), _mm256_sqrt_pd(self.0)) })
            }

            #[inline]
            fn sqrt(self) -> Self {
                Self(unsafe { _mm256_sqrt_pd(self.0) })
            }
        }
    };
}

// ============================================================================
// AVX
// ============================================================================

/// 8-lane f32 vector (AVX).
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct AvxF32(pub __m256);

impl AvxF32 {
    #[inline(always)]
    unsafe fn load_aligned_impl(ptr: *const f32) -> Self {
        Self(_mm256_load_ps(ptr))
    }

    #[inline(always)]
    fn index_impl(self, lane: usize) -> f32 {
        let mut lanes = [0.0f32; 8];
        unsafe { _mm256_storeu_ps(lanes.as_mut_ptr(), self.0) };
        lanes[lane]
    }
}

avx_f32_ops!(AvxF32);

/// 4-lane f64 vector (AVX).
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct AvxF64(pub __m256d);

impl AvxF64 {
    #[inline(always)]
    unsafe fn load_aligned_impl(ptr: *const f64) -> Self {
        Self(_mm256_load_pd(ptr))
    }

    #[inline(always)]
    fn index_impl(self, lane: usize) -> f64 {
        let mut lanes = [0.0f64; 4];
        unsafe { _mm256_storeu_pd(lanes.as_mut_ptr(), self.0) };
        lanes[lane]
    }
}

avx_f64_ops!(AvxF64);

// ============================================================================
// AVX2
// ============================================================================

/// 8-lane f32 vector (AVX2).
#[cfg(target_feature = "avx2")]
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct Avx2F32(pub __m256);

#[cfg(target_feature = "avx2")]
impl Avx2F32 {
    #[inline(always)]
    unsafe fn load_aligned_impl(ptr: *const f32) -> Self {
        Self(_mm256_castsi256_ps(_mm256_stream_load_si256(ptr as *const __m256i)))
    }

    #[inline(always)]
    fn index_impl(self, lane: usize) -> f32 {
        unsafe {
            let idx = _mm256_set1_epi32(lane as i32);
            _mm256_cvtss_f32(_mm256_permutevar8x32_ps(self.0, idx))
        }
    }
}

#[cfg(target_feature = "avx2")]
avx_f32_ops!(Avx2F32);

/// 4-lane f64 vector (AVX2).
#[cfg(target_feature = "avx2")]
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct Avx2F64(pub __m256d);

#[cfg(target_feature = "avx2")]
impl Avx2F64 {
    #[inline(always)]
    unsafe fn load_aligned_impl(ptr: *const f64) -> Self {
        Self(_mm256_castsi256_pd(_mm256_stream_load_si256(ptr as *const __m256i)))
    }

    #[inline(always)]
    fn index_impl(self, lane: usize) -> f64 {
        // Move both 32-bit halves of the lane down to lane 0.
        let lo = 2 * lane as i32;
        unsafe {
            let idx = _mm256_setr_epi32(lo, lo + 1, 0, 0, 0, 0, 0, 0);
            let moved = _mm256_permutevar8x32_ps(_mm256_castpd_ps(self.0), idx);
            _mm256_cvtsd_f64(_mm256_castps_pd(moved))
        }
    }
}

#[cfg(target_feature = "avx2")]
avx_f64_ops!(Avx2F64);
