//! Tests for SIMD implementations.
//!
//! Every check is written once, generic over the element type and vector
//! type, and instantiated for each tier compiled into this build.

#[cfg(test)]
mod tests {
    use num_traits::cast;

    use crate::alloc::aligned_vec_from;
    use crate::config::FAST_MATH;
    use crate::simd::traits::*;
    use crate::types::Element;

    fn e<E: Element>(x: f64) -> E {
        cast::<f64, E>(x).unwrap()
    }

    /// Lane values `start, start + step, ...`, lane 0 first.
    fn ramp<E: Element>(lanes: usize, start: f64, step: f64) -> Vec<E> {
        (0..lanes).map(|i| e::<E>(start + step * i as f64)).collect()
    }

    fn assert_within<E: Element>(actual: E, expected: E, rel: E, what: &str) {
        if rel == E::zero() {
            assert_eq!(
                actual.to_bits_u64(),
                expected.to_bits_u64(),
                "{} ({}): {:?} != {:?}",
                what,
                E::NAME,
                actual,
                expected
            );
        } else {
            let err = ((actual - expected) / expected).abs();
            assert!(
                err <= rel,
                "{} ({}): {:?} vs {:?}, relative error {:?} > {:?}",
                what,
                E::NAME,
                actual,
                expected,
                err,
                rel
            );
        }
    }

    /// Tolerance of the reciprocal family under the build's math policy.
    fn approx_tolerance<E: Element>() -> E {
        if FAST_MATH {
            E::FAST_MATH_REL_ERROR
        } else {
            E::zero()
        }
    }

    // ========================================================================
    // Alignment
    // ========================================================================

    fn check_alignment<E: Element, V: VectorOps<E>>() {
        assert_eq!(V::ALIGNMENT, V::LANES * E::SIZE);
        assert!(V::ALIGNMENT.is_power_of_two());
        assert_eq!(<V::Mask as LaneMask>::LANES, V::LANES);
    }

    fn check_distance_to_next_aligned<E: Element, V: VectorOps<E>>() {
        let base = 0x10_000usize;
        for offset in 0..2 * V::LANES {
            let ptr = (base + offset * E::SIZE) as *const E;
            let k = V::distance_to_next_aligned(ptr);
            assert!(k < V::LANES);
            assert!(V::is_aligned(ptr.wrapping_add(k)));
            for j in 0..k {
                assert!(!V::is_aligned(ptr.wrapping_add(j)));
            }
        }
    }

    fn check_next_boundary<E: Element, V: VectorOps<E>>() {
        for len in 0..40 {
            for start in 0..=len {
                let b = V::next_boundary(len, start);
                assert!(b >= start && b <= len);
                assert_eq!((b - start) % V::LANES, 0);
                assert!(len - b < V::LANES);
            }
        }
        assert_eq!(V::next_boundary(7, 7), 7);
    }

    // ========================================================================
    // Load / store
    // ========================================================================

    fn check_unaligned_round_trip<E: Element, V: VectorOps<E>>() {
        let input = ramp::<E>(V::LANES + 1, -3.25, 1.5);
        // Offset by one element so the access is misaligned on SIMD tiers.
        let v = unsafe { V::load_unaligned(input[1..].as_ptr()) };
        let mut output = vec![E::zero(); V::LANES + 1];
        unsafe { v.store_unaligned(output[1..].as_mut_ptr()) };
        assert_eq!(&output[1..], &input[1..]);
        assert_eq!(output[0], E::zero());
    }

    fn check_aligned_round_trip<E: Element, V: VectorOps<E>>() {
        let input = aligned_vec_from(&ramp::<E>(V::LANES, 0.5, 2.0));
        let mut output = aligned_vec_from(&vec![E::zero(); V::LANES]);
        assert!(V::is_aligned(input.as_ptr()));
        let v = unsafe { V::load_aligned(input.as_ptr()) };
        unsafe { v.store_aligned(output.as_mut_ptr()) };
        crate::simd::store_fence();
        assert_eq!(&output[..], &input[..]);
    }

    fn check_masked_load<E: Element, V: VectorOps<E>>() {
        let input = ramp::<E>(V::LANES, 1.0, 1.0);
        let none = unsafe { V::masked_load(input.as_ptr(), V::Mask::none()) };
        assert!(none.to_vec().iter().all(|&x| x == E::zero()));

        let all = unsafe { V::masked_load(input.as_ptr(), V::Mask::all()) };
        assert_eq!(all.to_vec(), V::load(&input).to_vec());

        let odd = V::Mask::from_bits(0xAAAA_AAAA_AAAA_AAAA);
        let lanes = unsafe { V::masked_load(input.as_ptr(), odd) }.to_vec();
        for (i, &x) in lanes.iter().enumerate() {
            let expected = if i % 2 == 1 { input[i] } else { E::zero() };
            assert_eq!(x, expected, "lane {}", i);
        }
    }

    fn check_masked_load_reads_only_selected<E: Element, V: VectorOps<E>>() {
        // Only `n` readable elements: the rest of the vector range is not ours.
        for n in 0..=V::LANES {
            let input = ramp::<E>(n, 7.0, -1.0);
            let v = V::load_partial(&input);
            let lanes = v.to_vec();
            assert_eq!(&lanes[..n], &input[..]);
            assert!(lanes[n..].iter().all(|&x| x == E::zero()));
        }
    }

    fn check_masked_store<E: Element, V: VectorOps<E>>() {
        let v = V::set1(e::<E>(9.0));
        let mut out = vec![e::<E>(-1.0); V::LANES];
        let mask = V::Mask::first_n(V::LANES / 2 + 1);
        unsafe { v.masked_store(out.as_mut_ptr(), mask) };
        for (i, &x) in out.iter().enumerate() {
            let expected = if mask.test(i) { e::<E>(9.0) } else { e::<E>(-1.0) };
            assert_eq!(x, expected, "lane {}", i);
        }

        let before = out.clone();
        unsafe { V::set1(e::<E>(3.0)).masked_store(out.as_mut_ptr(), V::Mask::none()) };
        assert_eq!(out, before);
    }

    // ========================================================================
    // Construction and extraction
    // ========================================================================

    fn check_set_order_and_index<E: Element, V: VectorOps<E>>() {
        // Highest lane first: lane i holds i.
        let highest_first: Vec<E> = (0..V::LANES).rev().map(|i| e::<E>(i as f64)).collect();
        let v = V::set(&highest_first);
        for i in 0..V::LANES {
            assert_eq!(v.index(i), e::<E>(i as f64));
        }
        assert_eq!(v.to_vec(), ramp::<E>(V::LANES, 0.0, 1.0));
    }

    fn check_set1_and_zero<E: Element, V: VectorOps<E>>() {
        assert!(V::set1(e::<E>(2.5)).to_vec().iter().all(|&x| x == e::<E>(2.5)));
        assert!(V::zero().to_vec().iter().all(|&x| x == E::zero() && x.is_sign_positive()));
    }

    fn check_abs<E: Element, V: VectorOps<E>>() {
        let v = V::set1(e::<E>(-3.5)).abs(V::set1(E::SIGN_MASK));
        for i in 0..V::LANES {
            assert_eq!(v.index(i), e::<E>(3.5));
        }

        let mixed = V::load(&ramp::<E>(V::LANES, -2.0, 1.0)).abs(V::set1(E::SIGN_MASK));
        for (i, x) in mixed.to_vec().into_iter().enumerate() {
            assert_eq!(x, e::<E>((-2.0 + i as f64).abs()));
        }
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    fn check_arithmetic<E: Element, V: VectorOps<E>>() {
        let a_lanes = ramp::<E>(V::LANES, 1.0, 1.0);
        let b_lanes = ramp::<E>(V::LANES, 0.5, 0.25);
        let a = V::load(&a_lanes);
        let b = V::load(&b_lanes);
        let sum = a.add(b).to_vec();
        let diff = a.sub(b).to_vec();
        let prod = a.mul(b).to_vec();
        for i in 0..V::LANES {
            assert_eq!(sum[i], a_lanes[i] + b_lanes[i]);
            assert_eq!(diff[i], a_lanes[i] - b_lanes[i]);
            assert_eq!(prod[i], a_lanes[i] * b_lanes[i]);
        }
    }

    fn check_div<E: Element, V: VectorOps<E>>() {
        let a_lanes = ramp::<E>(V::LANES, 1.0, 3.0);
        let b_lanes = ramp::<E>(V::LANES, 3.0, 0.7);
        let q = V::load(&a_lanes).div(V::load(&b_lanes)).to_vec();
        // Double precision division is exact under every policy.
        let tol = if E::SIZE == 8 { E::zero() } else { approx_tolerance::<E>() };
        for i in 0..V::LANES {
            assert_within(q[i], a_lanes[i] / b_lanes[i], tol, "div");
        }
    }

    fn check_max_min<E: Element, V: VectorOps<E>>() {
        let a_lanes = ramp::<E>(V::LANES, -4.0, 1.0);
        let b_lanes = ramp::<E>(V::LANES, 4.0, -1.0);
        let a = V::load(&a_lanes);
        let b = V::load(&b_lanes);
        let hi = a.max(b).to_vec();
        let lo = a.min(b).to_vec();
        for i in 0..V::LANES {
            assert_eq!(hi[i], a_lanes[i].max(b_lanes[i]));
            assert_eq!(lo[i], a_lanes[i].min(b_lanes[i]));
        }
    }

    fn check_masked_reductions<E: Element, V: VectorOps<E>>() {
        let a_lanes = ramp::<E>(V::LANES, -1.0, 2.0);
        let b_lanes = ramp::<E>(V::LANES, 1.0, 1.0);
        let a = V::load(&a_lanes);
        let b = V::load(&b_lanes);

        for bits in [0u64, 1, 0b0101_0101_0101_0101, u64::MAX] {
            let mask = V::Mask::from_bits(bits);
            let hi = a.masked_max(b, mask).to_vec();
            let lo = a.masked_min(b, mask).to_vec();
            for i in 0..V::LANES {
                if mask.test(i) {
                    assert_eq!(hi[i], a_lanes[i].max(b_lanes[i]));
                    assert_eq!(lo[i], a_lanes[i].min(b_lanes[i]));
                } else {
                    assert_eq!(hi[i].to_bits_u64(), E::NEG_MAX.to_bits_u64());
                    assert_eq!(lo[i].to_bits_u64(), E::MAX.to_bits_u64());
                }
            }
        }
    }

    /// Running maximum over whole vectors, then the neutralised tail.
    fn fold_max<E: Element, V: VectorOps<E>>(data: &[E]) -> E {
        let end = V::next_boundary(data.len(), 0);
        let mut acc = V::set1(E::NEG_MAX);
        for chunk in data[..end].chunks_exact(V::LANES) {
            acc = acc.max(V::load(chunk));
        }
        if end < data.len() {
            let tail = V::Mask::first_n(data.len() - end);
            let rest = V::load_partial(&data[end..]);
            acc = acc.max(rest.masked_max(rest, tail));
        }
        acc.to_vec().into_iter().fold(E::NEG_MAX, |m, x| m.max(x))
    }

    /// Running minimum over whole vectors, then the neutralised tail.
    fn fold_min<E: Element, V: VectorOps<E>>(data: &[E]) -> E {
        let end = V::next_boundary(data.len(), 0);
        let mut acc = V::set1(E::MAX);
        for chunk in data[..end].chunks_exact(V::LANES) {
            acc = acc.min(V::load(chunk));
        }
        if end < data.len() {
            let tail = V::Mask::first_n(data.len() - end);
            let rest = V::load_partial(&data[end..]);
            acc = acc.min(rest.masked_min(rest, tail));
        }
        acc.to_vec().into_iter().fold(E::MAX, |m, x| m.min(x))
    }

    fn check_masked_max_fold<E: Element, V: VectorOps<E>>() {
        // A negative-only tail must not lose to the zero lanes of a masked load.
        let data: Vec<E> = (0..V::LANES + 1).map(|i| e::<E>(-10.0 - i as f64)).collect();
        assert_eq!(fold_max::<E, V>(&data), e::<E>(-10.0));

        let positive: Vec<E> = (0..V::LANES + 1).map(|i| e::<E>(10.0 + i as f64)).collect();
        assert_eq!(fold_min::<E, V>(&positive), e::<E>(10.0));

        // No tail at all.
        let whole: Vec<E> = (0..2 * V::LANES).map(|i| e::<E>(i as f64)).collect();
        assert_eq!(fold_max::<E, V>(&whole), e::<E>((2 * V::LANES - 1) as f64));
        assert_eq!(fold_min::<E, V>(&whole), E::zero());
    }

    fn check_fold_keeps_extremes_outside_tail<E: Element, V: VectorOps<E>>() {
        // The extreme sits in the last body lane, which the one-lane tail mask
        // leaves unselected.
        if V::LANES < 2 {
            return;
        }
        let mut data = vec![E::zero(); V::LANES + 1];
        data[V::LANES - 1] = e::<E>(100.0);
        data[V::LANES] = e::<E>(1.0);
        assert_eq!(fold_max::<E, V>(&data), e::<E>(100.0));

        let mut data = vec![E::zero(); V::LANES + 1];
        data[V::LANES - 1] = e::<E>(-100.0);
        data[V::LANES] = e::<E>(-1.0);
        assert_eq!(fold_min::<E, V>(&data), e::<E>(-100.0));

        // Every body lane except the first carries the extreme.
        let mut data: Vec<E> = (0..V::LANES + 1).map(|_| e::<E>(50.0)).collect();
        data[0] = E::zero();
        data[V::LANES] = e::<E>(1.0);
        assert_eq!(fold_max::<E, V>(&data), e::<E>(50.0));
    }

    // ========================================================================
    // Approximations
    // ========================================================================

    fn check_reciprocal_family<E: Element, V: VectorOps<E>>() {
        let lanes = ramp::<E>(V::LANES, 0.75, 1.25);
        let v = V::load(&lanes);
        let tol = approx_tolerance::<E>();
        let recip = v.reciprocal().to_vec();
        let rsqrt = v.reciprocal_sqrt().to_vec();
        let sqrt = v.sqrt().to_vec();
        for i in 0..V::LANES {
            let x = lanes[i];
            assert_within(recip[i], E::one() / x, tol, "reciprocal");
            assert_within(rsqrt[i], E::one() / x.sqrt(), tol, "reciprocal_sqrt");
            // Two chained estimates.
            assert_within(sqrt[i], x.sqrt(), tol + tol, "sqrt");
        }
    }

    // ========================================================================
    // Masks
    // ========================================================================

    fn check_mask<E: Element, V: VectorOps<E>>() {
        let lanes = <V::Mask as LaneMask>::LANES;
        assert_eq!(V::Mask::all().count() as usize, lanes);
        assert_eq!(V::Mask::none().count(), 0);
        assert_eq!(V::Mask::all().to_bits(), crate::simd::traits::low_bits(lanes));
        for n in 0..=lanes + 1 {
            let m = V::Mask::first_n(n);
            assert_eq!(m.count() as usize, n.min(lanes));
            for i in 0..lanes {
                assert_eq!(m.test(i), i < n);
            }
        }
        let flags: Vec<bool> = (0..lanes).map(|i| i % 3 == 0).collect();
        let m = V::Mask::from_lanes(&flags);
        for (i, &on) in flags.iter().enumerate() {
            assert_eq!(m.test(i), on);
        }
        assert!(!m.test(lanes));
    }

    macro_rules! for_both {
        ($check:ident, $tier:ty) => {
            $check::<f32, <$tier as Tier>::F32>();
            $check::<f64, <$tier as Tier>::F64>();
        };
    }

    macro_rules! tier_tests {
        ($module:ident, $tier:ty) => {
            mod $module {
                use super::*;

                #[test]
                fn test_alignment() {
                    for_both!(check_alignment, $tier);
                }

                #[test]
                fn test_distance_to_next_aligned() {
                    for_both!(check_distance_to_next_aligned, $tier);
                }

                #[test]
                fn test_next_boundary() {
                    for_both!(check_next_boundary, $tier);
                }

                #[test]
                fn test_unaligned_round_trip() {
                    for_both!(check_unaligned_round_trip, $tier);
                }

                #[test]
                fn test_aligned_round_trip() {
                    for_both!(check_aligned_round_trip, $tier);
                }

                #[test]
                fn test_masked_load() {
                    for_both!(check_masked_load, $tier);
                }

                #[test]
                fn test_masked_load_reads_only_selected() {
                    for_both!(check_masked_load_reads_only_selected, $tier);
                }

                #[test]
                fn test_masked_store() {
                    for_both!(check_masked_store, $tier);
                }

                #[test]
                fn test_set_order_and_index() {
                    for_both!(check_set_order_and_index, $tier);
                }

                #[test]
                fn test_set1_and_zero() {
                    for_both!(check_set1_and_zero, $tier);
                }

                #[test]
                fn test_abs() {
                    for_both!(check_abs, $tier);
                }

                #[test]
                fn test_arithmetic() {
                    for_both!(check_arithmetic, $tier);
                }

                #[test]
                fn test_div() {
                    for_both!(check_div, $tier);
                }

                #[test]
                fn test_max_min() {
                    for_both!(check_max_min, $tier);
                }

                #[test]
                fn test_masked_reductions() {
                    for_both!(check_masked_reductions, $tier);
                }

                #[test]
                fn test_masked_max_fold() {
                    for_both!(check_masked_max_fold, $tier);
                }

                #[test]
                fn test_fold_keeps_extremes_outside_tail() {
                    for_both!(check_fold_keeps_extremes_outside_tail, $tier);
                }

                #[test]
                fn test_reciprocal_family() {
                    for_both!(check_reciprocal_family, $tier);
                }

                #[test]
                fn test_mask() {
                    for_both!(check_mask, $tier);
                }
            }
        };
    }

    tier_tests!(scalar, crate::simd::Scalar);
    tier_tests!(sse2, crate::simd::Sse2);
    #[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
    tier_tests!(avx, crate::simd::Avx);
    #[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
    tier_tests!(avx2, crate::simd::Avx2);
    #[cfg(all(target_arch = "x86_64", target_feature = "avx512f"))]
    tier_tests!(avx512, crate::simd::Avx512);

    #[test]
    fn test_selected_tier_is_compiled() {
        use crate::simd::{SelectedTier, TierKind};
        assert!(<SelectedTier as Tier>::KIND.is_compiled());
        assert_eq!(<SelectedTier as Tier>::KIND, TierKind::SELECTED);
    }
}
