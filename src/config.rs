//! Build configuration.
//!
//! Everything here is fixed at compile time by Cargo features; this module
//! only exposes a serialisable view of it for diagnostics.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::simd::{MaskKind, TierKind};

/// True when the `fast-math` feature swaps exact division and square roots
/// for hardware estimates.
pub const FAST_MATH: bool = cfg!(feature = "fast-math");

/// Snapshot of a tier configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Instruction-set tier.
    pub tier: TierKind,

    /// Whether approximate reciprocal-based math is enabled.
    pub fast_math: bool,

    /// Lanes per `f32` vector.
    pub f32_lanes: usize,

    /// Lanes per `f64` vector.
    pub f64_lanes: usize,

    /// Alignment in bytes for aligned `f32` access.
    pub f32_alignment: usize,

    /// Alignment in bytes for aligned `f64` access.
    pub f64_alignment: usize,

    /// Mask representation.
    pub mask_kind: MaskKind,

    /// Whether aligned loads are non-temporal.
    pub streaming_loads: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::current()
    }
}

impl BuildConfig {
    /// The configuration this crate was compiled with.
    pub const fn current() -> Self {
        Self::for_tier(TierKind::SELECTED, FAST_MATH)
    }

    /// The configuration a build selecting `tier` would have.
    pub const fn for_tier(tier: TierKind, fast_math: bool) -> Self {
        Self {
            tier,
            fast_math,
            f32_lanes: tier.lanes_f32(),
            f64_lanes: tier.lanes_f64(),
            f32_alignment: tier.alignment_bytes::<f32>(),
            f64_alignment: tier.alignment_bytes::<f64>(),
            mask_kind: tier.mask_kind(),
            streaming_loads: tier.streaming_loads(),
        }
    }

    /// True if this configuration's tier is compiled into the running build.
    pub const fn is_available(&self) -> bool {
        self.tier.is_compiled()
    }

    /// Log the configuration at debug level.
    pub fn log_summary(&self) {
        debug!(
            "SIMD tier {} ({} bits): f32 x{}, f64 x{}, {:?} masks, fast-math {}, streaming loads {}",
            self.tier,
            self.tier.width_bits(),
            self.f32_lanes,
            self.f64_lanes,
            self.mask_kind,
            if self.fast_math { "on" } else { "off" },
            if self.streaming_loads { "on" } else { "off" }
        );
    }
}
