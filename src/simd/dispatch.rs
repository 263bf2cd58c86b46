//! Build-time tier selection.
//!
//! Exactly one tier is bound to [`SelectedTier`], chosen by Cargo feature:
//! `avx512` > `avx2` > `avx` > `sse2` > scalar (no feature). The x86 tiers
//! only exist when the compiler is told the CPU has them
//! (`-C target-feature=+avx2`, `-C target-cpu=native`, ...). Asking for a tier
//! the target cannot run is a compile error rather than a quiet downgrade.
//! There is no runtime feature probing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimdError;
use crate::types::Element;

#[cfg(all(
    feature = "avx512",
    not(all(target_arch = "x86_64", target_feature = "avx512f"))
))]
compile_error!("feature `avx512` needs an x86_64 target built with `-C target-feature=+avx512f`");

#[cfg(all(
    feature = "avx2",
    not(feature = "avx512"),
    not(all(target_arch = "x86_64", target_feature = "avx2"))
))]
compile_error!("feature `avx2` needs an x86_64 target built with `-C target-feature=+avx2`");

#[cfg(all(
    feature = "avx",
    not(any(feature = "avx2", feature = "avx512")),
    not(all(target_arch = "x86_64", target_feature = "avx"))
))]
compile_error!("feature `avx` needs an x86_64 target built with `-C target-feature=+avx`");

/// The tier every crate-level alias resolves to.
#[cfg(feature = "avx512")]
pub type SelectedTier = crate::simd::avx512::Avx512;

/// The tier every crate-level alias resolves to.
#[cfg(all(feature = "avx2", not(feature = "avx512")))]
pub type SelectedTier = crate::simd::x86::Avx2;

/// The tier every crate-level alias resolves to.
#[cfg(all(feature = "avx", not(any(feature = "avx2", feature = "avx512"))))]
pub type SelectedTier = crate::simd::x86::Avx;

/// The tier every crate-level alias resolves to.
#[cfg(all(
    feature = "sse2",
    not(any(feature = "avx", feature = "avx2", feature = "avx512"))
))]
pub type SelectedTier = crate::simd::portable::Sse2;

/// The tier every crate-level alias resolves to.
#[cfg(not(any(
    feature = "sse2",
    feature = "avx",
    feature = "avx2",
    feature = "avx512"
)))]
pub type SelectedTier = crate::simd::scalar::Scalar;

/// How a tier represents per-lane masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskKind {
    /// A single `bool` (one lane).
    Boolean,
    /// One all-bits-set or all-bits-clear integer per lane.
    FullWidth,
    /// One bit per lane in a mask register.
    Compact,
}

/// Enumeration of instruction-set tiers, narrowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    /// No SIMD: one lane per vector.
    Scalar,
    /// 128-bit registers (SSE2 on x86, portable elsewhere).
    Sse2,
    /// 256-bit AVX registers.
    Avx,
    /// 256-bit registers with streaming aligned loads (AVX2).
    Avx2,
    /// 512-bit AVX-512F registers with compact bit masks.
    Avx512,
}

impl TierKind {
    /// Every tier, widest first.
    pub const ALL: [TierKind; 5] = [
        TierKind::Avx512,
        TierKind::Avx2,
        TierKind::Avx,
        TierKind::Sse2,
        TierKind::Scalar,
    ];

    /// The tier compiled into this build.
    pub const SELECTED: TierKind = <SelectedTier as crate::simd::traits::Tier>::KIND;

    /// Register width in bits. The scalar tier reports 0.
    pub const fn width_bits(self) -> usize {
        match self {
            TierKind::Scalar => 0,
            TierKind::Sse2 => 128,
            TierKind::Avx | TierKind::Avx2 => 256,
            TierKind::Avx512 => 512,
        }
    }

    /// Lanes per vector for an element of `element_size` bytes.
    pub const fn lanes_for_size(self, element_size: usize) -> usize {
        match self {
            TierKind::Scalar => 1,
            _ => self.width_bits() / 8 / element_size,
        }
    }

    /// Lanes per vector for element type `E`.
    pub const fn lanes<E: Element>(self) -> usize {
        self.lanes_for_size(E::SIZE)
    }

    /// Lanes per `f32` vector.
    pub const fn lanes_f32(self) -> usize {
        self.lanes_for_size(4)
    }

    /// Lanes per `f64` vector.
    pub const fn lanes_f64(self) -> usize {
        self.lanes_for_size(8)
    }

    /// Alignment in bytes an aligned load of `E` requires on this tier.
    pub const fn alignment_bytes<E: Element>(self) -> usize {
        self.lanes::<E>() * E::SIZE
    }

    /// Mask representation.
    pub const fn mask_kind(self) -> MaskKind {
        match self {
            TierKind::Scalar => MaskKind::Boolean,
            TierKind::Sse2 | TierKind::Avx | TierKind::Avx2 => MaskKind::FullWidth,
            TierKind::Avx512 => MaskKind::Compact,
        }
    }

    /// True if aligned loads are non-temporal on this tier in this build.
    pub const fn streaming_loads(self) -> bool {
        match self {
            TierKind::Avx2 => true,
            TierKind::Sse2 => cfg!(all(target_arch = "x86_64", target_feature = "sse4.1")),
            _ => false,
        }
    }

    /// True if this build contains the tier's implementation.
    pub const fn is_compiled(self) -> bool {
        match self {
            TierKind::Scalar | TierKind::Sse2 => true,
            TierKind::Avx => cfg!(all(target_arch = "x86_64", target_feature = "avx")),
            TierKind::Avx2 => cfg!(all(target_arch = "x86_64", target_feature = "avx2")),
            TierKind::Avx512 => cfg!(all(target_arch = "x86_64", target_feature = "avx512f")),
        }
    }

    /// Lowercase name, also the Cargo feature that selects the tier.
    pub const fn name(self) -> &'static str {
        match self {
            TierKind::Scalar => "scalar",
            TierKind::Sse2 => "sse2",
            TierKind::Avx => "avx",
            TierKind::Avx2 => "avx2",
            TierKind::Avx512 => "avx512",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TierKind {
    type Err = SimdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        TierKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| SimdError::invalid_argument(format!("unknown SIMD tier: {:?}", s)))
    }
}
