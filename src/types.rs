//! Element types and shared constants.
//!
//! Kernels are written against [`Element`], which is implemented for `f32`
//! and `f64` only. Each element type knows the vector type every tier uses
//! for it, so generic code can name `E::Vector<T>` without branching on the
//! tier.

use std::fmt::Debug;

use num_traits::Float;

use crate::simd::traits::{Tier, VectorOps};

/// Largest alignment any tier requires (one 512-bit register).
pub const MAX_ALIGNMENT: usize = 64;

/// Scalar element type carried by a vector register.
pub trait Element: Float + Default + Debug + Send + Sync + 'static {
    /// Size of one lane in bytes.
    const SIZE: usize;

    /// Largest finite value. Fill for masked-out lanes of a masked minimum.
    const MAX: Self;

    /// Negated largest finite value. Fill for masked-out lanes of a masked maximum.
    const NEG_MAX: Self;

    /// Only the sign bit set (`-0.0`). Pass to `abs` to clear signs.
    const SIGN_MASK: Self;

    /// Worst-case relative error of a single fast-math estimate
    /// (reciprocal, reciprocal square root, or division through one).
    ///
    /// Square roots built from two estimates may be off by twice this.
    const FAST_MATH_REL_ERROR: Self;

    /// Short lowercase type name.
    const NAME: &'static str;

    /// Vector register type for this element on tier `T`.
    type Vector<T: Tier>: VectorOps<Self>;

    /// Raw IEEE-754 bits, zero-extended to 64 bits.
    fn to_bits_u64(self) -> u64;

    /// Inverse of [`Element::to_bits_u64`]; upper bits are ignored for `f32`.
    fn from_bits_u64(bits: u64) -> Self;

    /// Bitwise `!mask & x`.
    #[inline]
    fn and_not(mask: Self, x: Self) -> Self {
        Self::from_bits_u64(!mask.to_bits_u64() & x.to_bits_u64())
    }
}

impl Element for f32 {
    const SIZE: usize = 4;
    const MAX: Self = f32::MAX;
    const NEG_MAX: Self = -f32::MAX;
    const SIGN_MASK: Self = -0.0;
    // rcpps/rsqrtps: |rel err| <= 1.5 * 2^-12
    const FAST_MATH_REL_ERROR: Self = 1.0 / 2048.0;
    const NAME: &'static str = "f32";

    type Vector<T: Tier> = T::F32;

    #[inline]
    fn to_bits_u64(self) -> u64 {
        self.to_bits() as u64
    }

    #[inline]
    fn from_bits_u64(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }
}

impl Element for f64 {
    const SIZE: usize = 8;
    const MAX: Self = f64::MAX;
    const NEG_MAX: Self = -f64::MAX;
    const SIGN_MASK: Self = -0.0;
    // vrcp14pd/vrsqrt14pd: |rel err| <= 2^-14
    const FAST_MATH_REL_ERROR: Self = 1.0 / 16384.0;
    const NAME: &'static str = "f64";

    type Vector<T: Tier> = T::F64;

    #[inline]
    fn to_bits_u64(self) -> u64 {
        self.to_bits()
    }

    #[inline]
    fn from_bits_u64(bits: u64) -> Self {
        f64::from_bits(bits)
    }
}

/// Vector type for element `E` on tier `T`.
pub type Vector<T, E> = <E as Element>::Vector<T>;

/// Round up to the nearest multiple of alignment.
#[inline]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    (value + alignment - 1) & !(alignment - 1)
}
