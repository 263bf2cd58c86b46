//! SIMD abstraction layer.
//!
//! One operation table ([`VectorOps`]) with five bindings, one per
//! instruction-set tier:
//!
//! | Tier | f32 lanes | f64 lanes | Mask | Module |
//! |------|-----------|-----------|------|--------|
//! | `Avx512` | 16 | 8 | one bit per lane | `avx512` |
//! | `Avx2` | 8 | 4 | full-width lanes | `x86` |
//! | `Avx` | 8 | 4 | full-width lanes | `x86` |
//! | `Sse2` | 4 | 2 | full-width lanes | `portable` |
//! | `Scalar` | 1 | 1 | `bool` | `scalar` |
//!
//! # Architecture
//!
//! - `traits`: [`Tier`], [`VectorOps`] and [`LaneMask`]
//! - `scalar`: the no-SIMD fallback
//! - `portable`: the 128-bit tier on top of the `wide` crate
//! - `x86`: AVX and AVX2 via `std::arch`
//! - `avx512`: AVX-512F via `std::arch`
//! - `dispatch`: build-time choice of [`SelectedTier`]
//!
//! Every tier the compiler can target is built, so kernels and tests can be
//! instantiated per tier; the Cargo feature only picks which one the
//! crate-level aliases point at.
//!
//! # Usage
//!
//! ```rust
//! use tiered_simd::prelude::*;
//!
//! fn sum<V: VectorOps<f32>>(values: &[f32]) -> f32 {
//!     let end = V::next_boundary(values.len(), 0);
//!     let mut acc = V::zero();
//!     for chunk in values[..end].chunks_exact(V::LANES) {
//!         acc = acc.add(V::load(chunk));
//!     }
//!     let mut total: f32 = (0..V::LANES).map(|i| acc.index(i)).sum();
//!     total += values[end..].iter().sum::<f32>();
//!     total
//! }
//!
//! let data: Vec<f32> = (1..=10).map(|i| i as f32).collect();
//! assert_eq!(sum::<F32Vec>(&data), 55.0);
//! ```

pub mod traits;
pub mod dispatch;
pub mod scalar;
pub mod portable;
#[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
pub mod x86;
#[cfg(all(target_arch = "x86_64", target_feature = "avx512f"))]
pub mod avx512;

#[cfg(test)]
mod tests;

pub use traits::{LaneMask, Tier, VectorOps};
pub use dispatch::{MaskKind, SelectedTier, TierKind};
pub use scalar::{Scalar, ScalarVec};
pub use portable::{Mask32x4, Mask64x2, Sse2, Sse2F32, Sse2F64};
#[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
pub use x86::{Avx, AvxF32, AvxF64, Mask32x8, Mask64x4};
#[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
pub use x86::{Avx2, Avx2F32, Avx2F64};
#[cfg(all(target_arch = "x86_64", target_feature = "avx512f"))]
pub use avx512::{Avx512, Avx512F32, Avx512F64, BitMask16, BitMask8};

/// `f32` vector of the selected tier.
pub type F32Vec = <SelectedTier as Tier>::F32;

/// `f64` vector of the selected tier.
pub type F64Vec = <SelectedTier as Tier>::F64;

/// Mask paired with [`F32Vec`].
pub type F32Mask = <F32Vec as VectorOps<f32>>::Mask;

/// Mask paired with [`F64Vec`].
pub type F64Mask = <F64Vec as VectorOps<f64>>::Mask;

/// Order all earlier non-temporal stores before any later store.
///
/// `store_aligned` bypasses the cache on the SIMD tiers; call this once after
/// a streaming loop and before another thread may read the buffer.
#[inline]
pub fn store_fence() {
    #[cfg(target_arch = "x86_64")]
    unsafe {
        std::arch::x86_64::_mm_sfence();
    }
    #[cfg(not(target_arch = "x86_64"))]
    std::sync::atomic::fence(std::sync::atomic::Ordering::Release);
}
