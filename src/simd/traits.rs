//! Core SIMD traits defining the interface for vectorized operations.
//!
//! Every tier implements the same three traits:
//! - [`Tier`]: a zero-sized marker naming the vector types for `f32` and `f64`
//! - [`VectorOps`]: the per-element-type operation table
//! - [`LaneMask`]: the lane selector paired with each vector type
//!
//! Kernels are generic over `V: VectorOps<E>` (or over `T: Tier`) and are
//! monomorphized once per tier; nothing here dispatches at runtime.

use crate::alignment;
use crate::simd::dispatch::TierKind;
use crate::types::Element;

/// Bit pattern with the low `n` bits set.
#[inline]
pub(crate) const fn low_bits(n: usize) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

/// Per-lane boolean selector.
///
/// The representation is tier-specific (a plain `bool`, an all-bits-set
/// integer lane, or one bit per lane) but the logical contract is the same
/// everywhere: lane `i` is selected iff bit `i` of [`LaneMask::to_bits`] is set.
pub trait LaneMask: Copy + Send + Sync + 'static {
    /// Number of lanes covered by the mask.
    const LANES: usize;

    /// Build a mask from a bit pattern; bit `i` selects lane `i`.
    /// Bits at or above `LANES` are ignored.
    fn from_bits(bits: u64) -> Self;

    /// Compact bit pattern of the selected lanes.
    fn to_bits(self) -> u64;

    /// Every lane selected.
    #[inline]
    fn all() -> Self {
        Self::from_bits(low_bits(Self::LANES))
    }

    /// No lane selected.
    #[inline]
    fn none() -> Self {
        Self::from_bits(0)
    }

    /// Lanes `0..n` selected. `n >= LANES` selects every lane.
    ///
    /// This is the mask for the partial vector left over after
    /// [`next_boundary`](crate::alignment::next_boundary).
    #[inline]
    fn first_n(n: usize) -> Self {
        Self::from_bits(low_bits(n.min(Self::LANES)))
    }

    /// Build a mask from one flag per lane. Missing flags are false.
    fn from_lanes(lanes: &[bool]) -> Self {
        let bits = lanes
            .iter()
            .take(Self::LANES)
            .enumerate()
            .fold(0u64, |acc, (i, &on)| acc | ((on as u64) << i));
        Self::from_bits(bits)
    }

    /// True if `lane` is selected.
    #[inline]
    fn test(self, lane: usize) -> bool {
        lane < Self::LANES && (self.to_bits() >> lane) & 1 == 1
    }

    /// Number of selected lanes.
    #[inline]
    fn count(self) -> u32 {
        self.to_bits().count_ones()
    }
}

/// The operation table for one element type on one tier.
///
/// Pointer-taking operations are `unsafe`: the hot path pays for no bounds
/// or alignment checks. Value operations are safe.
pub trait VectorOps<E: Element>: Copy + Send + Sync + 'static {
    /// Mask type paired with this vector.
    type Mask: LaneMask;

    /// Number of lanes in the vector.
    const LANES: usize;

    /// Byte width of the register, which is also the alignment
    /// [`load_aligned`](VectorOps::load_aligned) requires.
    const ALIGNMENT: usize = Self::LANES * E::SIZE;

    // ------------------------------------------------------------------
    // Load / store
    // ------------------------------------------------------------------

    /// Load `LANES` elements from an aligned address.
    ///
    /// Tiers with streaming loads use a non-temporal read here.
    ///
    /// # Safety
    /// `ptr` must be valid for reading `LANES` elements and be aligned to
    /// [`ALIGNMENT`](VectorOps::ALIGNMENT) bytes.
    unsafe fn load_aligned(ptr: *const E) -> Self;

    /// Load `LANES` elements from any element-aligned address.
    ///
    /// # Safety
    /// `ptr` must be valid for reading `LANES` elements.
    unsafe fn load_unaligned(ptr: *const E) -> Self;

    /// Store `LANES` elements to an aligned address, non-temporally where the
    /// hardware supports it. Follow a loop of these with
    /// [`store_fence`](crate::simd::store_fence) before handing the memory
    /// to another thread.
    ///
    /// # Safety
    /// `ptr` must be valid for writing `LANES` elements and be aligned to
    /// [`ALIGNMENT`](VectorOps::ALIGNMENT) bytes.
    unsafe fn store_aligned(self, ptr: *mut E);

    /// Store `LANES` elements to any element-aligned address.
    ///
    /// # Safety
    /// `ptr` must be valid for writing `LANES` elements.
    unsafe fn store_unaligned(self, ptr: *mut E);

    /// Load the selected lanes; unselected lanes are zero.
    ///
    /// # Safety
    /// `ptr.add(i)` must be valid for reading for every selected lane `i`.
    /// Unselected lanes are never dereferenced.
    unsafe fn masked_load(ptr: *const E, mask: Self::Mask) -> Self;

    /// Store only the selected lanes.
    ///
    /// # Safety
    /// `ptr.add(i)` must be valid for writing for every selected lane `i`.
    unsafe fn masked_store(self, ptr: *mut E, mask: Self::Mask);

    // ------------------------------------------------------------------
    // Arithmetic
    // ------------------------------------------------------------------

    /// Lane-wise addition.
    fn add(self, other: Self) -> Self;

    /// Lane-wise subtraction.
    fn sub(self, other: Self) -> Self;

    /// Lane-wise multiplication.
    fn mul(self, other: Self) -> Self;

    /// Lane-wise division.
    ///
    /// Exact unless the `fast-math` feature is on, in which case `f32`
    /// division multiplies by a reciprocal estimate. `f64` division is
    /// always exact.
    fn div(self, other: Self) -> Self;

    /// Broadcast one scalar to every lane.
    fn set1(value: E) -> Self;

    /// Build a vector from explicit lanes, **highest lane first**
    /// (`lanes[LANES - 1 - i]` lands in lane `i`), matching the argument
    /// order of the hardware `set` instructions.
    ///
    /// # Panics
    /// If `lanes.len() < LANES`.
    fn set(lanes: &[E]) -> Self;

    /// Clear the bits of `sign_mask` from every lane (`!sign_mask & self`).
    /// With `set1(E::SIGN_MASK)` this is the absolute value.
    fn abs(self, sign_mask: Self) -> Self;

    /// All lanes `+0.0`.
    fn zero() -> Self;

    // ------------------------------------------------------------------
    // Reduction
    // ------------------------------------------------------------------

    /// Lane-wise maximum (`a > b ? a : b`).
    fn max(self, other: Self) -> Self;

    /// Lane-wise minimum (`a < b ? a : b`).
    fn min(self, other: Self) -> Self;

    /// [`max`](VectorOps::max) on selected lanes, [`Element::NEG_MAX`] on the rest.
    ///
    /// The result replaces unselected lanes, so it must be folded into a
    /// running maximum with a plain `max`:
    /// `acc = acc.max(rest.masked_max(rest, tail))`.
    fn masked_max(self, other: Self, mask: Self::Mask) -> Self;

    /// [`min`](VectorOps::min) on selected lanes, [`Element::MAX`] on the rest.
    /// Fold with `acc = acc.min(rest.masked_min(rest, tail))`.
    fn masked_min(self, other: Self, mask: Self::Mask) -> Self;

    /// Extract lane `lane` (0-based).
    ///
    /// Out-of-range lanes trip a debug assertion; in release builds they
    /// may panic or return any lane.
    fn index(self, lane: usize) -> E;

    // ------------------------------------------------------------------
    // Approximation
    // ------------------------------------------------------------------

    /// `1 / x`, or a hardware estimate under `fast-math`.
    fn reciprocal(self) -> Self;

    /// `1 / sqrt(x)`, or a hardware estimate under `fast-math`.
    fn reciprocal_sqrt(self) -> Self;

    /// `sqrt(x)`, or `reciprocal(reciprocal_sqrt(x))` from estimates under `fast-math`.
    fn sqrt(self) -> Self;

    // ------------------------------------------------------------------
    // Alignment and tail handling
    // ------------------------------------------------------------------

    /// True if `ptr` satisfies [`ALIGNMENT`](VectorOps::ALIGNMENT).
    #[inline]
    fn is_aligned(ptr: *const E) -> bool {
        alignment::is_aligned_to(ptr as usize, Self::ALIGNMENT)
    }

    /// Elements to skip from `ptr` to reach the next aligned address
    /// (`0..LANES`). `ptr` must be element-aligned.
    #[inline]
    fn distance_to_next_aligned(ptr: *const E) -> usize {
        alignment::distance_to_alignment(ptr as usize, Self::ALIGNMENT, E::SIZE)
    }

    /// First index a whole-vector loop over `start..len` cannot cover.
    #[inline]
    fn next_boundary(len: usize, start: usize) -> usize {
        alignment::tail_start(len, start, Self::LANES)
    }

    // ------------------------------------------------------------------
    // Safe conveniences
    // ------------------------------------------------------------------

    /// Load the first `LANES` elements of a slice.
    ///
    /// # Panics
    /// If `slice.len() < LANES`.
    #[inline]
    fn load(slice: &[E]) -> Self {
        let lanes = &slice[..Self::LANES];
        // SAFETY: `lanes` holds exactly LANES readable elements.
        unsafe { Self::load_unaligned(lanes.as_ptr()) }
    }

    /// Store into the first `LANES` elements of a slice.
    ///
    /// # Panics
    /// If `slice.len() < LANES`.
    #[inline]
    fn store(self, slice: &mut [E]) {
        let lanes = &mut slice[..Self::LANES];
        // SAFETY: `lanes` holds exactly LANES writable elements.
        unsafe { self.store_unaligned(lanes.as_mut_ptr()) }
    }

    /// Load the leading `min(slice.len(), LANES)` elements; remaining lanes are zero.
    #[inline]
    fn load_partial(slice: &[E]) -> Self {
        let mask = <Self::Mask as LaneMask>::first_n(slice.len());
        // SAFETY: only lanes below slice.len() are selected.
        unsafe { Self::masked_load(slice.as_ptr(), mask) }
    }

    /// Copy the lanes out, lane 0 first.
    fn to_vec(self) -> Vec<E> {
        let mut out = vec![E::zero(); Self::LANES];
        self.store(&mut out);
        out
    }
}

/// A build-time instruction-set tier.
pub trait Tier: Copy + Send + Sync + 'static {
    /// Runtime description of the tier.
    const KIND: TierKind;

    /// `f32` vector type.
    type F32: VectorOps<f32>;

    /// `f64` vector type.
    type F64: VectorOps<f64>;
}
