//! Mathematical utility functions.

/// Computes the modular multiplicative inverse of `num` modulo `modulus`.
///
/// Returns `v` such that `(num * v) % modulus == 1`, using an extended-Euclid
/// style loop that only tracks the coefficient of `num`. All intermediates fit
/// in `u64` for any modulus up to `2^32`, which is the largest this engine uses.
///
/// Callers must supply a `num` coprime to `modulus` (odd, for the power-of-two
/// moduli used here); the result for non-coprime inputs is unspecified.
#[must_use]
pub fn mod_inv(num: u64, modulus: u64) -> u64 {
    let mut a = modulus;
    let mut b = num % modulus;
    let mut p0: u64 = 0;
    let mut p1: u64 = 1;
    while b != 0 {
        if b == 1 {
            return p1 % modulus;
        }
        p0 += (a / b) * p1;
        a %= b;
        if a == 0 {
            break;
        }
        if a == 1 {
            return modulus - (p0 % modulus);
        }
        p1 += (b / a) * p0;
        b %= a;
    }
    0
}

/// Computes the multiplicative inverse of an odd 32-bit value modulo `2^32`.
///
/// Used to pair every multiplicative cipher key with the key that exactly undoes
/// it under 32-bit wraparound multiplication.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // result is reduced mod 2^32
pub fn mod_inv32(num: u32) -> u32 {
    mod_inv(u64::from(num), 1u64 << 32) as u32
}

/// Computes the multiplicative inverse of an odd byte modulo `2^8`.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // result is reduced mod 2^8
pub fn mod_inv8(num: u8) -> u8 {
    mod_inv(u64::from(num), 1u64 << 8) as u8
}

/// Checks if a value is a power of two and returns the exponent.
///
/// Returns `Some(n)` if `value == 2^n`, `None` otherwise (including for 0).
///
/// # Examples
///
/// ```rust
/// use cipherforge::utils::pow2_exponent;
///
/// assert_eq!(pow2_exponent(1), Some(0));
/// assert_eq!(pow2_exponent(8), Some(3));
/// assert_eq!(pow2_exponent(0), None);
/// assert_eq!(pow2_exponent(6), None);
/// ```
#[must_use]
pub fn pow2_exponent(value: u32) -> Option<u32> {
    if value.is_power_of_two() {
        Some(value.trailing_zeros())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_mod_inv32_fixed_points() {
        assert_eq!(mod_inv32(1), 1);
        assert_eq!(mod_inv32(0xFFFF_FFFF), 0xFFFF_FFFF);
    }

    #[test]
    fn test_mod_inv32_small_values() {
        assert_eq!(mod_inv32(3).wrapping_mul(3), 1);
        assert_eq!(mod_inv32(5).wrapping_mul(5), 1);
        assert_eq!(mod_inv32(7).wrapping_mul(7), 1);
        assert_eq!(mod_inv32(0x1234_5679).wrapping_mul(0x1234_5679), 1);
    }

    #[test]
    fn test_mod_inv32_random_odd_values() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10_000 {
            let n = rng.gen::<u32>() | 1;
            let inverse = mod_inv32(n);
            assert_eq!(n.wrapping_mul(inverse), 1, "inverse failed for {n:#010x}");
        }
    }

    #[test]
    fn test_mod_inv8_all_odd_values() {
        for n in (1u8..=255).step_by(2) {
            let inverse = mod_inv8(n);
            assert_eq!(n.wrapping_mul(inverse), 1, "inverse failed for {n}");
        }
    }

    #[test]
    fn test_mod_inv_odd_modulus() {
        // 3 * 7 = 21 = 2 * 10 + 1
        assert_eq!(mod_inv(3, 10), 7);
        assert_eq!(mod_inv(7, 10), 3);
    }

    #[test]
    fn test_pow2_exponent() {
        assert_eq!(pow2_exponent(1), Some(0));
        assert_eq!(pow2_exponent(2), Some(1));
        assert_eq!(pow2_exponent(1 << 20), Some(20));
        assert_eq!(pow2_exponent(1 << 31), Some(31));
        assert_eq!(pow2_exponent(0), None);
        assert_eq!(pow2_exponent(3), None);
        assert_eq!(pow2_exponent(6), None);
        assert_eq!(pow2_exponent(u32::MAX), None);
    }
}
