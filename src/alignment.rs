//! Alignment introspection and the tail-index helper.
//!
//! Every tier's alignment is a power of two (one register's worth of bytes),
//! so all the arithmetic here is bit masking. Kernels use these to split a
//! slice into a short unaligned prefix, an aligned whole-vector body and a
//! scalar or masked tail:
//!
//! ```rust
//! use tiered_simd::prelude::*;
//!
//! let buf = AlignedBuffer::<f64>::allocate(37).unwrap();
//! let data = &buf[3..];
//! let prefix = distance_to_next_aligned::<SelectedTier, f64>(data.as_ptr()).min(data.len());
//! let body_end = next_boundary::<SelectedTier, f64>(data.len(), prefix);
//! assert!(is_aligned::<SelectedTier, f64>(data[prefix..].as_ptr()));
//! assert_eq!((body_end - prefix) % F64Vec::LANES, 0);
//! assert!(data.len() - body_end < F64Vec::LANES);
//! ```

use crate::simd::{SelectedTier, Tier, VectorOps};
use crate::types::{Element, Vector};

/// True if `addr` is a multiple of `alignment` (a power of two).
#[inline]
pub const fn is_aligned_to(addr: usize, alignment: usize) -> bool {
    debug_assert!(alignment.is_power_of_two());
    addr & (alignment - 1) == 0
}

/// Elements of `element_size` bytes between `addr` and the next multiple of
/// `alignment`; zero if `addr` is already aligned.
#[inline]
pub const fn distance_to_alignment(addr: usize, alignment: usize, element_size: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (addr.wrapping_neg() & (alignment - 1)) / element_size
}

/// `len - (len - start) % lanes`: the end of the last whole `lanes`-sized
/// chunk when walking `start..len`.
#[inline]
pub const fn tail_start(len: usize, start: usize, lanes: usize) -> usize {
    debug_assert!(start <= len);
    len - (len - start) % lanes
}

/// Bytes of alignment an aligned load of `E` needs on tier `T`.
#[inline]
pub fn alignment_bytes<T: Tier, E: Element>() -> usize {
    <Vector<T, E> as VectorOps<E>>::ALIGNMENT
}

/// Lanes per vector of `E` on tier `T`.
#[inline]
pub fn lane_count<T: Tier, E: Element>() -> usize {
    <Vector<T, E> as VectorOps<E>>::LANES
}

/// True if `ptr` may be passed to `load_aligned` / `store_aligned` on tier `T`.
#[inline]
pub fn is_aligned<T: Tier, E: Element>(ptr: *const E) -> bool {
    <Vector<T, E> as VectorOps<E>>::is_aligned(ptr)
}

/// Smallest `k` such that `ptr.add(k)` is aligned for tier `T`.
///
/// `ptr` must itself be aligned to `E`; the result is always below the
/// lane count.
#[inline]
pub fn distance_to_next_aligned<T: Tier, E: Element>(ptr: *const E) -> usize {
    <Vector<T, E> as VectorOps<E>>::distance_to_next_aligned(ptr)
}

/// Smallest index `i >= start` such that `len - i` is a multiple of the lane
/// count: whole vectors cover `start..i`, and `i..len` is left for scalar or
/// masked handling. `len == start` yields `len`.
#[inline]
pub fn next_boundary<T: Tier, E: Element>(len: usize, start: usize) -> usize {
    <Vector<T, E> as VectorOps<E>>::next_boundary(len, start)
}

/// [`next_boundary`] for `f32` on the selected tier.
#[inline]
pub fn next_boundary_f32(len: usize, start: usize) -> usize {
    next_boundary::<SelectedTier, f32>(len, start)
}

/// [`next_boundary`] for `f64` on the selected tier.
#[inline]
pub fn next_boundary_f64(len: usize, start: usize) -> usize {
    next_boundary::<SelectedTier, f64>(len, start)
}

/// [`is_aligned`] for `f32` on the selected tier.
#[inline]
pub fn is_aligned_f32(ptr: *const f32) -> bool {
    is_aligned::<SelectedTier, f32>(ptr)
}

/// [`is_aligned`] for `f64` on the selected tier.
#[inline]
pub fn is_aligned_f64(ptr: *const f64) -> bool {
    is_aligned::<SelectedTier, f64>(ptr)
}

/// [`distance_to_next_aligned`] for `f32` on the selected tier.
#[inline]
pub fn distance_to_next_aligned_f32(ptr: *const f32) -> usize {
    distance_to_next_aligned::<SelectedTier, f32>(ptr)
}

/// [`distance_to_next_aligned`] for `f64` on the selected tier.
#[inline]
pub fn distance_to_next_aligned_f64(ptr: *const f64) -> usize {
    distance_to_next_aligned::<SelectedTier, f64>(ptr)
}
