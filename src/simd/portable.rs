//! The 128-bit tier, built on the `wide` crate.
//!
//! `wide` lowers to SSE2 on x86_64 and to NEON or plain arrays elsewhere, so
//! this tier builds on every target. The few things `wide` does not expose are
//! added for x86_64 only: streaming stores (`movntdq`) always, and streaming
//! loads (`movntdqa`) when SSE4.1 is enabled.
//!
//! Masked loads, stores and reductions are emulated lane by lane. Emulated
//! masked loads only touch selected lanes.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use wide::{f32x4, f64x2, i32x4, i64x2};

use crate::simd::dispatch::TierKind;
use crate::simd::traits::{LaneMask, Tier, VectorOps};
use crate::types::Element;

/// 128-bit tier marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sse2;

impl Tier for Sse2 {
    const KIND: TierKind = TierKind::Sse2;
    type F32 = Sse2F32;
    type F64 = Sse2F64;
}

/// Read one aligned 16-byte register image.
#[inline(always)]
unsafe fn load_aligned_128<A: Copy>(ptr: *const A) -> A {
    debug_assert_eq!(std::mem::size_of::<A>(), 16);
    #[cfg(all(target_arch = "x86_64", target_feature = "sse4.1"))]
    {
        let raw = _mm_stream_load_si128(ptr as *const __m128i);
        std::mem::transmute_copy(&raw)
    }
    #[cfg(not(all(target_arch = "x86_64", target_feature = "sse4.1")))]
    {
        ptr.read()
    }
}

/// Write one aligned 16-byte register image, bypassing the cache on x86_64.
#[inline(always)]
unsafe fn store_aligned_128<A: Copy>(ptr: *mut A, value: A) {
    debug_assert_eq!(std::mem::size_of::<A>(), 16);
    #[cfg(target_arch = "x86_64")]
    {
        let raw: __m128i = std::mem::transmute_copy(&value);
        _mm_stream_si128(ptr as *mut __m128i, raw);
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        ptr.write(value)
    }
}

#[inline(always)]
fn lane_word<T: From<i8>>(bits: u64, lane: usize) -> T {
    if (bits >> lane) & 1 == 1 {
        T::from(-1)
    } else {
        T::from(0)
    }
}

// ============================================================================
// Masks
// ============================================================================

/// Four 32-bit lanes, each all ones (selected) or all zeros.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mask32x4(pub i32x4);

impl LaneMask for Mask32x4 {
    const LANES: usize = 4;

    #[inline]
    fn from_bits(bits: u64) -> Self {
        Self(i32x4::new([
            lane_word(bits, 0),
            lane_word(bits, 1),
            lane_word(bits, 2),
            lane_word(bits, 3),
        ]))
    }

    #[inline]
    fn to_bits(self) -> u64 {
        self.0
            .to_array()
            .iter()
            .enumerate()
            .fold(0, |acc, (i, &w)| acc | (((w != 0) as u64) << i))
    }
}

/// Two 64-bit lanes, each all ones (selected) or all zeros.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mask64x2(pub i64x2);

impl LaneMask for Mask64x2 {
    const LANES: usize = 2;

    #[inline]
    fn from_bits(bits: u64) -> Self {
        Self(i64x2::new([lane_word(bits, 0), lane_word(bits, 1)]))
    }

    #[inline]
    fn to_bits(self) -> u64 {
        self.0
            .to_array()
            .iter()
            .enumerate()
            .fold(0, |acc, (i, &w)| acc | (((w != 0) as u64) << i))
    }
}

// ============================================================================
// F32x4
// ============================================================================

/// 4-lane f32 vector.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(transparent)]
pub struct Sse2F32(pub f32x4);

impl VectorOps<f32> for Sse2F32 {
    type Mask = Mask32x4;
    const LANES: usize = 4;

    #[inline]
    unsafe fn load_aligned(ptr: *const f32) -> Self {
        debug_assert_eq!(ptr as usize % 16, 0);
        Self(f32x4::new(load_aligned_128(ptr as *const [f32; 4])))
    }

    #[inline]
    unsafe fn load_unaligned(ptr: *const f32) -> Self {
        Self(f32x4::new((ptr as *const [f32; 4]).read_unaligned()))
    }

    #[inline]
    unsafe fn store_aligned(self, ptr: *mut f32) {
        debug_assert_eq!(ptr as usize % 16, 0);
        store_aligned_128(ptr as *mut [f32; 4], self.0.to_array())
    }

    #[inline]
    unsafe fn store_unaligned(self, ptr: *mut f32) {
        (ptr as *mut [f32; 4]).write_unaligned(self.0.to_array())
    }

    #[inline]
    unsafe fn masked_load(ptr: *const f32, mask: Mask32x4) -> Self {
        let m = mask.0.to_array();
        let mut lanes = [0.0f32; 4];
        for i in 0..4 {
            if m[i] != 0 {
                lanes[i] = ptr.add(i).read();
            }
        }
        Self(f32x4::new(lanes))
    }

    #[inline]
    unsafe fn masked_store(self, ptr: *mut f32, mask: Mask32x4) {
        let m = mask.0.to_array();
        let v = self.0.to_array();
        for i in 0..4 {
            if m[i] != 0 {
                ptr.add(i).write(v[i]);
            }
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

    #[cfg(feature = "fast-math")]
    #[inline]
    fn div(self, other: Self) -> Self {
        Self(self.0 * other.0.recip())
    }

    #[cfg(not(feature = "fast-math"))]
    #[inline]
    fn div(self, other: Self) -> Self {
        Self(self.0 / other.0)
    }

    #[inline]
    fn set1(value: f32) -> Self {
        Self(f32x4::splat(value))
    }

    #[inline]
    fn set(lanes: &[f32]) -> Self {
        Self(f32x4::new([lanes[3], lanes[2], lanes[1], lanes[0]]))
    }

    #[inline]
    fn abs(self, sign_mask: Self) -> Self {
        // (x | m) ^ m == !m & x
        Self((self.0 | sign_mask.0) ^ sign_mask.0)
    }

    #[inline]
    fn zero() -> Self {
        Self(f32x4::ZERO)
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    #[inline]
    fn masked_max(self, other: Self, mask: Mask32x4) -> Self {
        let m = mask.0.to_array();
        let v = self.0.max(other.0).to_array();
        Self(f32x4::new(std::array::from_fn(|i| {
            if m[i] != 0 {
                v[i]
            } else {
                <f32 as Element>::NEG_MAX
            }
        })))
    }

    #[inline]
    fn masked_min(self, other: Self, mask: Mask32x4) -> Self {
        let m = mask.0.to_array();
        let v = self.0.min(other.0).to_array();
        Self(f32x4::new(std::array::from_fn(|i| {
            if m[i] != 0 {
                v[i]
            } else {
                <f32 as Element>::MAX
            }
        })))
    }

    #[inline]
    fn index(self, lane: usize) -> f32 {
        debug_assert!(lane < 4, "lane {} out of range", lane);
        self.0.to_array()[lane]
    }

    #[cfg(feature = "fast-math")]
    #[inline]
    fn reciprocal(self) -> Self {
        Self(self.0.recip())
    }

    #[cfg(not(feature = "fast-math"))]
    #[inline]
    fn reciprocal(self) -> Self {
        Self(f32x4::splat(1.0) / self.0)
    }

    #[cfg(feature = "fast-math")]
    #[inline]
    fn reciprocal_sqrt(self) -> Self {
        Self(self.0.recip_sqrt())
    }

    #[cfg(not(feature = "fast-math"))]
    #[inline]
    fn reciprocal_sqrt(self) -> Self {
        Self(f32x4::splat(1.0) / self.0.sqrt())
    }

    #[cfg(feature = "fast-math")]
    #[inline]
    fn sqrt(self) -> Self {
        Self(self.0.recip_sqrt().recip())
    }

    #[cfg(not(feature = "fast-math"))]
    #[inline]
    fn sqrt(self) -> Self {
        Self(self.0.sqrt())
    }
}

// ============================================================================
// F64x2
// ============================================================================

/// 2-lane f64 vector.
///
/// There is no double-precision estimate instruction at this width, so every
/// operation is exact regardless of `fast-math`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(transparent)]
pub struct Sse2F64(pub f64x2);

impl VectorOps<f64> for Sse2F64 {
    type Mask = Mask64x2;
    const LANES: usize = 2;

    #[inline]
    unsafe fn load_aligned(ptr: *const f64) -> Self {
        debug_assert_eq!(ptr as usize % 16, 0);
        Self(f64x2::new(load_aligned_128(ptr as *const [f64; 2])))
    }

    #[inline]
    unsafe fn load_unaligned(ptr: *const f64) -> Self {
        Self(f64x2::new((ptr as *const [f64; 2]).read_unaligned()))
    }

    #[inline]
    unsafe fn store_aligned(self, ptr: *mut f64) {
        debug_assert_eq!(ptr as usize % 16, 0);
        store_aligned_128(ptr as *mut [f64; 2], self.0.to_array())
    }

    #[inline]
    unsafe fn store_unaligned(self, ptr: *mut f64) {
        (ptr as *mut [f64; 2]).write_unaligned(self.0.to_array())
    }

    #[inline]
    unsafe fn masked_load(ptr: *const f64, mask: Mask64x2) -> Self {
        let m = mask.0.to_array();
        let mut lanes = [0.0f64; 2];
        for i in 0..2 {
            if m[i] != 0 {
                lanes[i] = ptr.add(i).read();
            }
        }
        Self(f64x2::new(lanes))
    }

    #[inline]
    unsafe fn masked_store(self, ptr: *mut f64, mask: Mask64x2) {
        let m = mask.0.to_array();
        let v = self.0.to_array();
        for i in 0..2 {
            if m[i] != 0 {
                ptr.add(i).write(v[i]);
            }
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

    #[inline]
    fn div(self, other: Self) -> Self {
        Self(self.0 / other.0)
    }

    #[inline]
    fn set1(value: f64) -> Self {
        Self(f64x2::splat(value))
    }

    #[inline]
    fn set(lanes: &[f64]) -> Self {
        Self(f64x2::new([lanes[1], lanes[0]]))
    }

    #[inline]
    fn abs(self, sign_mask: Self) -> Self {
        Self((self.0 | sign_mask.0) ^ sign_mask.0)
    }

    #[inline]
    fn zero() -> Self {
        Self(f64x2::ZERO)
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    #[inline]
    fn masked_max(self, other: Self, mask: Mask64x2) -> Self {
        let m = mask.0.to_array();
        let v = self.0.max(other.0).to_array();
        Self(f64x2::new(std::array::from_fn(|i| {
            if m[i] != 0 {
                v[i]
            } else {
                <f64 as Element>::NEG_MAX
            }
        })))
    }

    #[inline]
    fn masked_min(self, other: Self, mask: Mask64x2) -> Self {
        let m = mask.0.to_array();
        let v = self.0.min(other.0).to_array();
        Self(f64x2::new(std::array::from_fn(|i| {
            if m[i] != 0 {
                v[i]
            } else {
                <f64 as Element>::MAX
            }
        })))
    }

    #[inline]
    fn index(self, lane: usize) -> f64 {
        debug_assert!(lane < 2, "lane {} out of range", lane);
        self.0.to_array()[lane]
    }

    #[inline]
    fn reciprocal(self) -> Self {
        Self(f64x2::splat(1.0) / self.0)
    }

    #[inline]
    fn reciprocal_sqrt(self) -> Self {
        Self(f64x2::splat(1.0) / self.0.sqrt())
    }

    #[inline]
    fn sqrt(self) -> Self {
        Self(self.0.sqrt())
    }
}
