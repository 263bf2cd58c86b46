//! # tiered-simd
//!
//! A thin, zero-cost vector abstraction over `f32` and `f64` for numeric
//! kernels, bound at build time to one instruction-set tier.
//!
//! ## Overview
//!
//! Kernels are written once against [`VectorOps`](simd::VectorOps) and run on
//! whichever tier the build selects:
//!
//! - **Scalar**: one lane, no SIMD, always available
//! - **SSE2**: 128-bit registers, portable via the `wide` crate
//! - **AVX / AVX2**: 256-bit registers; AVX2 adds streaming aligned loads
//! - **AVX-512**: 512-bit registers with one-bit-per-lane masks
//!
//! Each tier provides aligned, unaligned and masked memory access, lane-wise
//! arithmetic, masked reductions with neutral fill values, lane extraction
//! and reciprocal estimates. A `fast-math` build replaces exact division and
//! square roots with hardware estimates and a documented error bound.
//!
//! ## Quick Start
//!
//! ```rust
//! use tiered_simd::prelude::*;
//!
//! let data: Vec<f32> = (0..37).map(|i| i as f32 - 10.0).collect();
//! let end = next_boundary_f32(data.len(), 0);
//!
//! let mut acc = F32Vec::set1(f32::NEG_MAX);
//! for chunk in data[..end].chunks_exact(F32Vec::LANES) {
//!     acc = acc.max(F32Vec::load(chunk));
//! }
//! if end < data.len() {
//!     let tail = F32Mask::first_n(data.len() - end);
//!     // SAFETY: only the `data.len() - end` masked lanes are read.
//!     let rest = unsafe { F32Vec::masked_load(data[end..].as_ptr(), tail) };
//!     // Unselected lanes of `rest` become NEG_MAX and cannot win.
//!     acc = acc.max(rest.masked_max(rest, tail));
//! }
//!
//! let best = acc.to_vec().into_iter().fold(f32::NEG_MAX, f32::max);
//! assert_eq!(best, 26.0);
//! ```
//!
//! ## Selecting a Tier
//!
//! | Cargo feature | Tier | Compiler flag |
//! |---------------|------|---------------|
//! | (none) | `Scalar` | |
//! | `sse2` | `Sse2` | |
//! | `avx` | `Avx` | `-C target-feature=+avx` |
//! | `avx2` | `Avx2` | `-C target-feature=+avx2` |
//! | `avx512` | `Avx512` | `-C target-feature=+avx512f` |
//!
//! The widest enabled feature wins. Asking for a tier whose target feature
//! the compiler was not given is a compile error.
//!
//! ## Module Overview
//!
//! - [`simd`]: tier traits, the five tier implementations and dispatch
//! - [`alignment`]: alignment introspection and the tail-index helper
//! - [`alloc`]: aligned, padded, fallible allocation

#![allow(clippy::needless_range_loop)]
#![allow(clippy::missing_safety_doc)]

pub mod simd;
pub mod alignment;
pub mod alloc;

mod types;
mod error;
mod config;

pub use types::*;
pub use error::{ErrorCode, Result, SimdError};
pub use config::{BuildConfig, FAST_MATH};
pub use simd::store_fence;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::simd::{
        LaneMask, MaskKind, SelectedTier, Tier, TierKind, VectorOps,
        F32Mask, F32Vec, F64Mask, F64Vec,
        Scalar, ScalarVec, Sse2, Sse2F32, Sse2F64, Mask32x4, Mask64x2,
        store_fence,
    };
    #[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
    pub use crate::simd::{Avx, AvxF32, AvxF64, Mask32x8, Mask64x4};
    #[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
    pub use crate::simd::{Avx2, Avx2F32, Avx2F64};
    #[cfg(all(target_arch = "x86_64", target_feature = "avx512f"))]
    pub use crate::simd::{Avx512, Avx512F32, Avx512F64, BitMask16, BitMask8};

    pub use crate::alignment::{
        alignment_bytes, distance_to_next_aligned, distance_to_next_aligned_f32,
        distance_to_next_aligned_f64, is_aligned, is_aligned_f32, is_aligned_f64, lane_count,
        next_boundary, next_boundary_f32, next_boundary_f64,
    };
    pub use crate::alloc::{aligned_vec_from, AlignedBuffer, AlignedVec};
    pub use crate::config::{BuildConfig, FAST_MATH};
    pub use crate::error::{ErrorCode, Result, SimdError};
    pub use crate::types::*;
}
