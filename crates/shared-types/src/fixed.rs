//! # Q64.64 Fixed-Point Kernel
//!
//! Signed 64.64 fixed-point arithmetic used everywhere a consensus value is
//! scored, compared or retargeted. Floating point is banned on the consensus
//! path: every node must reproduce ψ sums, Θ retargets and lottery draws
//! bit-for-bit.
//!
//! ## Representation
//!
//! A value is stored as `i128` holding `value * 2^64`. The integer range is
//! ±2^63 with 64 fractional bits (~5.4e-20 resolution), which comfortably
//! covers ψ contributions (≤ Γ ≤ a few units), Θ targets and −ln(u) draws
//! (≤ 128·ln2 ≈ 88.7).
//!
//! ## Rounding
//!
//! `mul` and `div` round to nearest, ties to even. The binary logarithm is
//! computed by 64 squaring steps (exact integer arithmetic, truncating), and
//! the natural logarithm is pinned as `log2(x) · LN2`. The whole pipeline is
//! integer-only and identical on every architecture.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Number of fractional bits.
pub const FRAC_BITS: u32 = 64;

/// A signed Q64.64 fixed-point number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixed(i128);

impl Fixed {
    /// The additive identity.
    pub const ZERO: Fixed = Fixed(0);

    /// The multiplicative identity.
    pub const ONE: Fixed = Fixed(1i128 << FRAC_BITS);

    /// ln(2) in Q64.64 (0xB17217F7D1CF79AC, rounded to nearest).
    pub const LN2: Fixed = Fixed(0xB17217F7D1CF79ACu128 as i128);

    /// Largest representable value.
    pub const MAX: Fixed = Fixed(i128::MAX);

    /// Construct from an integer.
    pub const fn from_int(v: i64) -> Fixed {
        Fixed((v as i128) << FRAC_BITS)
    }

    /// Construct from raw Q64.64 bits (wire / snapshot representation).
    pub const fn from_bits(bits: i128) -> Fixed {
        Fixed(bits)
    }

    /// Raw Q64.64 bits.
    pub const fn to_bits(self) -> i128 {
        self.0
    }

    /// Construct from a ratio, rounding to nearest-even.
    ///
    /// Panics if `den == 0`; policy parameters are validated at load time.
    pub fn from_ratio(num: i64, den: i64) -> Fixed {
        assert!(den != 0, "fixed-point ratio with zero denominator");
        let neg = (num < 0) != (den < 0);
        let n = U256::from(num.unsigned_abs()) << FRAC_BITS;
        let d = U256::from(den.unsigned_abs());
        let bits = div_round_even(n, d);
        Fixed(apply_sign(bits, neg))
    }

    /// Integer part, truncated toward zero.
    pub const fn int_part(self) -> i64 {
        (self.0 / (1i128 << FRAC_BITS)) as i64
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition. `None` on overflow.
    pub fn checked_add(self, rhs: Fixed) -> Option<Fixed> {
        self.0.checked_add(rhs.0).map(Fixed)
    }

    /// Saturating addition.
    pub fn saturating_add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_add(rhs.0))
    }

    /// Addition. Panics on overflow: consensus values are policy-bounded,
    /// so overflow indicates internal corruption.
    pub fn add(self, rhs: Fixed) -> Fixed {
        self.checked_add(rhs)
            .expect("fixed-point addition overflow")
    }

    /// Subtraction. Panics on overflow.
    pub fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(
            self.0
                .checked_sub(rhs.0)
                .expect("fixed-point subtraction overflow"),
        )
    }

    /// Multiplication, rounding to nearest-even.
    pub fn mul(self, rhs: Fixed) -> Fixed {
        let neg = (self.0 < 0) != (rhs.0 < 0);
        let a = U256::from(self.0.unsigned_abs());
        let b = U256::from(rhs.0.unsigned_abs());
        let wide = a * b;
        let bits = shr_round_even(wide, FRAC_BITS);
        Fixed(apply_sign(bits, neg))
    }

    /// Division, rounding to nearest-even. Panics on division by zero.
    pub fn div(self, rhs: Fixed) -> Fixed {
        assert!(rhs.0 != 0, "fixed-point division by zero");
        let neg = (self.0 < 0) != (rhs.0 < 0);
        let n = U256::from(self.0.unsigned_abs()) << FRAC_BITS;
        let d = U256::from(rhs.0.unsigned_abs());
        let bits = div_round_even(n, d);
        Fixed(apply_sign(bits, neg))
    }

    /// Clamp into `[lo, hi]`.
    pub fn clamp(self, lo: Fixed, hi: Fixed) -> Fixed {
        debug_assert!(lo <= hi);
        if self < lo {
            lo
        } else if self > hi {
            hi
        } else {
            self
        }
    }

    pub fn min(self, rhs: Fixed) -> Fixed {
        if self <= rhs { self } else { rhs }
    }

    pub fn max(self, rhs: Fixed) -> Fixed {
        if self >= rhs { self } else { rhs }
    }

    /// Natural logarithm of `1/u` for `u = (frac + 1) / 2^128`, the lottery
    /// mapping from a 256-bit digest prefix to `u ∈ (0, 1]`.
    ///
    /// Writing `u = m · 2^(b-128)` with `m ∈ [1, 2)` and `b` the bit length
    /// of `frac + 1` minus one:
    ///
    /// ```text
    /// -ln u = ((128 - b) - log2 m) · ln 2
    /// ```
    ///
    /// `log2 m` is produced by 64 exact squaring steps, so the result is
    /// identical on every node. The result is always ≥ 0; `frac == u128::MAX`
    /// maps to `u = 1` and returns zero.
    pub fn ln_recip_unit(frac: u128) -> Fixed {
        if frac == u128::MAX {
            return Fixed::ZERO;
        }
        let v = frac + 1; // in [1, 2^128 - 1]
        let mut b = 127 - v.leading_zeros(); // bit length - 1
        // Mantissa in Q64.64, m ∈ [1, 2): shift v so the top set bit lands
        // at bit 64. b < 64 shifts left exactly; b > 64 drops low bits with
        // round-to-nearest-even. Rounding can carry into 2.0 exactly; that
        // renormalizes to m = 1, b + 1.
        let mut m: u128 = if b >= FRAC_BITS {
            shr_round_even_u128(v, b - FRAC_BITS)
        } else {
            v << (FRAC_BITS - b)
        };
        if m == 2u128 << FRAC_BITS {
            m >>= 1;
            b += 1;
        }
        let log2_m = log2_mantissa(m);
        let total = Fixed::from_int((128 - b) as i64).sub(log2_m);
        total.mul(Fixed::LN2)
    }
}

impl std::fmt::Display for Fixed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Decimal rendering for logs and operator output only; never parsed
        // back on the consensus path.
        let neg = self.0 < 0;
        let abs = self.0.unsigned_abs();
        let int = abs >> FRAC_BITS;
        let frac = abs & ((1u128 << FRAC_BITS) - 1);
        // Nine decimal places: frac * 10^9 / 2^64, truncated.
        let scaled = (U256::from(frac) * U256::from(1_000_000_000u64)) >> FRAC_BITS as usize;
        write!(
            f,
            "{}{}.{:09}",
            if neg { "-" } else { "" },
            int,
            scaled.as_u64()
        )
    }
}

/// Binary logarithm of a Q64.64 mantissa in `[1, 2)`, returned in `[0, 1)`.
///
/// Classic square-and-compare: at each step the mantissa is squared (exact,
/// 256-bit) and renormalized; a set result bit means the square crossed 2.
/// Truncation inside the loop is part of the pinned definition.
fn log2_mantissa(m: u128) -> Fixed {
    debug_assert!((1u128 << FRAC_BITS..2u128 << FRAC_BITS).contains(&m));
    let mut x = U256::from(m);
    let mut result: u128 = 0;
    let two = U256::from(2u8) << FRAC_BITS as usize;
    for i in (0..FRAC_BITS).rev() {
        x = (x * x) >> FRAC_BITS as usize;
        if x >= two {
            x >>= 1;
            result |= 1u128 << i;
        }
    }
    Fixed(result as i128)
}

/// Shift right with round-to-nearest-even.
fn shr_round_even(v: U256, shift: u32) -> u128 {
    let q = v >> shift as usize;
    let rem = v & ((U256::one() << shift as usize) - U256::one());
    let half = U256::one() << (shift as usize - 1);
    let q = match rem.cmp(&half) {
        std::cmp::Ordering::Greater => q + U256::one(),
        std::cmp::Ordering::Equal if q & U256::one() == U256::one() => q + U256::one(),
        _ => q,
    };
    to_u128_checked(q)
}

fn shr_round_even_u128(v: u128, shift: u32) -> u128 {
    if shift == 0 {
        return v;
    }
    let q = v >> shift;
    let rem = v & ((1u128 << shift) - 1);
    let half = 1u128 << (shift - 1);
    match rem.cmp(&half) {
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal if q & 1 == 1 => q + 1,
        _ => q,
    }
}

/// Divide with round-to-nearest-even.
fn div_round_even(n: U256, d: U256) -> u128 {
    let q = n / d;
    let rem = n % d;
    let twice = rem << 1usize;
    let q = match twice.cmp(&d) {
        std::cmp::Ordering::Greater => q + U256::one(),
        std::cmp::Ordering::Equal if q & U256::one() == U256::one() => q + U256::one(),
        _ => q,
    };
    to_u128_checked(q)
}

fn to_u128_checked(v: U256) -> u128 {
    assert!(
        v <= U256::from(i128::MAX as u128),
        "fixed-point magnitude overflow"
    );
    v.as_u128()
}

fn apply_sign(mag: u128, neg: bool) -> i128 {
    if neg {
        -(mag as i128)
    } else {
        mag as i128
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(v: Fixed) -> f64 {
        v.to_bits() as f64 / 2f64.powi(64)
    }

    #[test]
    fn test_constants() {
        assert_eq!(Fixed::ONE.to_bits(), 1i128 << 64);
        // ln(2) reference: 0.6931471805599453
        assert!((approx(Fixed::LN2) - 0.693_147_180_559_945_3).abs() < 1e-15);
    }

    #[test]
    fn test_from_ratio() {
        let tenth = Fixed::from_ratio(1, 10);
        assert!((approx(tenth) - 0.1).abs() < 1e-15);

        let eighth = Fixed::from_ratio(1, 8);
        assert_eq!(eighth.to_bits(), 1i128 << 61);

        let neg = Fixed::from_ratio(-3, 4);
        assert_eq!(neg.to_bits(), -(3i128 << 62));
    }

    #[test]
    fn test_mul_exact() {
        let half = Fixed::from_ratio(1, 2);
        assert_eq!(half.mul(half), Fixed::from_ratio(1, 4));
        assert_eq!(Fixed::from_int(3).mul(Fixed::from_int(4)), Fixed::from_int(12));
        assert_eq!(Fixed::from_int(-3).mul(Fixed::from_int(4)), Fixed::from_int(-12));
    }

    #[test]
    fn test_div_exact() {
        assert_eq!(Fixed::from_int(12).div(Fixed::from_int(4)), Fixed::from_int(3));
        assert_eq!(
            Fixed::from_int(1).div(Fixed::from_int(8)),
            Fixed::from_ratio(1, 8)
        );
    }

    #[test]
    fn test_round_to_even_ties() {
        // 3/2^64 shifted by 1: tie between 1 and 2 rounds to 2 (even),
        // 1/2^64 shifted by 1: tie between 0 and 1 rounds to 0 (even).
        assert_eq!(shr_round_even_u128(3, 1), 2);
        assert_eq!(shr_round_even_u128(1, 1), 0);
        assert_eq!(shr_round_even_u128(5, 1), 2);
        assert_eq!(shr_round_even_u128(7, 1), 4);
    }

    #[test]
    fn test_clamp() {
        let lo = Fixed::from_int(1);
        let hi = Fixed::from_int(4);
        assert_eq!(Fixed::from_int(0).clamp(lo, hi), lo);
        assert_eq!(Fixed::from_int(9).clamp(lo, hi), hi);
        assert_eq!(Fixed::from_int(2).clamp(lo, hi), Fixed::from_int(2));
    }

    #[test]
    fn test_ln_recip_unit_bounds() {
        // frac = MAX -> u = 1 -> -ln u = 0.
        assert_eq!(Fixed::ln_recip_unit(u128::MAX), Fixed::ZERO);
        // frac = 0 -> u = 2^-128 -> -ln u = 128 ln 2 ≈ 88.722.
        let max_draw = Fixed::ln_recip_unit(0);
        assert!((approx(max_draw) - 128.0 * 0.693_147_180_559_945_3).abs() < 1e-9);
    }

    #[test]
    fn test_ln_recip_unit_half() {
        // frac + 1 = 2^127 -> u = 1/2 -> -ln u = ln 2.
        let draw = Fixed::ln_recip_unit((1u128 << 127) - 1);
        assert!((approx(draw) - 0.693_147_180_559_945_3).abs() < 1e-12);
    }

    #[test]
    fn test_ln_recip_unit_reference_values() {
        // u = 1/4 and u = 3/4 against f64 references.
        let quarter = Fixed::ln_recip_unit((1u128 << 126) - 1);
        assert!((approx(quarter) - 2.0 * 0.693_147_180_559_945_3).abs() < 1e-12);

        let three_quarters = Fixed::ln_recip_unit(3 * (1u128 << 126) - 1);
        assert!((approx(three_quarters) - 0.287_682_072_451_780_9).abs() < 1e-12);
    }

    #[test]
    fn test_ln_monotone_decreasing_in_frac() {
        // Larger frac -> larger u -> smaller -ln u.
        let mut prev = Fixed::ln_recip_unit(0);
        for i in 1..=16u32 {
            let frac = (u128::MAX / 17) * i as u128;
            let cur = Fixed::ln_recip_unit(frac);
            assert!(cur < prev, "draw must strictly decrease (step {i})");
            prev = cur;
        }
    }

    #[test]
    fn test_log2_mantissa_exact_points() {
        // log2(1) = 0, log2(sqrt(2)) ≈ 0.5.
        assert_eq!(log2_mantissa(1u128 << 64), Fixed::ZERO);
        let sqrt2 = 0x16A09E667F3BCC908u128; // sqrt(2) in Q64.64
        let half = log2_mantissa(sqrt2);
        assert!((approx(half) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_display() {
        assert_eq!(Fixed::from_ratio(5, 2).to_string(), "2.500000000");
        assert_eq!(Fixed::from_int(-3).to_string(), "-3.000000000");
    }

    #[test]
    fn test_bits_round_trip() {
        for v in [
            Fixed::ZERO,
            Fixed::ONE,
            Fixed::LN2,
            Fixed::from_ratio(-7, 3),
        ] {
            assert_eq!(Fixed::from_bits(v.to_bits()), v);
        }
    }
}
