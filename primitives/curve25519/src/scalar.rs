//! Arithmetic in the scalar field F_l,
//! l = 2^252 + 27742317777372353535851937790883648493, the order of the
//! Ristretto255 / Ed25519 prime-order group.
//!
//! Every externally visible scalar is canonical (< l). The wide reduction
//! and all arithmetic are branchless; the only constant the module depends
//! on is l itself, pinned below in limb form.

use core::ops::{Add, Mul, Neg, Sub};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use zeroize::Zeroize;

use crate::macros::{define_binop_variants, define_neg_variant};

/// l as four 64-bit little-endian limbs.
const L: [u64; 4] = [
    0x5812_631a_5cf5_d3ed,
    0x14de_f9de_a2f7_9cd6,
    0x0000_0000_0000_0000,
    0x1000_0000_0000_0000,
];

/// l - 2, the Fermat inversion exponent.
const L_MINUS_2: [u64; 4] = [
    0x5812_631a_5cf5_d3eb,
    0x14de_f9de_a2f7_9cd6,
    0x0000_0000_0000_0000,
    0x1000_0000_0000_0000,
];

/// An element of F_l, held canonical.
#[derive(Copy, Clone, Default)]
pub struct Scalar(pub(crate) [u64; 4]);

impl core::fmt::Debug for Scalar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Scalar({:?})", &self.to_bytes())
    }
}

#[inline(always)]
fn adc(a: u64, b: u64, carry: &mut u64) -> u64 {
    let s = (a as u128) + (b as u128) + (*carry as u128);
    *carry = (s >> 64) as u64;
    s as u64
}

#[inline(always)]
fn sbb(a: u64, b: u64, borrow: &mut u64) -> u64 {
    let (d1, b1) = a.overflowing_sub(b);
    let (d2, b2) = d1.overflowing_sub(*borrow);
    *borrow = (b1 | b2) as u64;
    d2
}

/// Subtract l if the value is >= l. Input must be < 2l. Constant time.
#[inline(always)]
fn reduce_once(limbs: [u64; 4]) -> [u64; 4] {
    let mut borrow = 0u64;
    let mut diff = [0u64; 4];
    for i in 0..4 {
        diff[i] = sbb(limbs[i], L[i], &mut borrow);
    }
    // borrow == 1 means limbs < l, keep the original.
    let keep = Choice::from(borrow as u8);
    let mut out = [0u64; 4];
    for i in 0..4 {
        out[i] = u64::conditional_select(&diff[i], &limbs[i], keep);
    }
    out
}

/// Reduce an arbitrary little-endian bit string modulo l, most significant
/// bit first: r <- 2r + b, minus l whenever the sum reaches it. Branchless.
fn reduce_bits_mod_l(bytes: &[u8]) -> Scalar {
    let nbits = bytes.len() * 8;
    let mut r = [0u64; 4];
    for i in (0..nbits).rev() {
        let bit = ((bytes[i / 8] >> (i % 8)) & 1) as u64;
        // r < l < 2^253, so 2r + bit < 2l fits in 4 limbs.
        let mut shifted = [0u64; 4];
        shifted[0] = (r[0] << 1) | bit;
        shifted[1] = (r[1] << 1) | (r[0] >> 63);
        shifted[2] = (r[2] << 1) | (r[1] >> 63);
        shifted[3] = (r[3] << 1) | (r[2] >> 63);
        r = reduce_once(shifted);
    }
    Scalar(r)
}

impl Scalar {
    pub const ZERO: Scalar = Scalar([0, 0, 0, 0]);
    pub const ONE: Scalar = Scalar([1, 0, 0, 0]);

    /// Deserialize, requiring the canonical range [0, l). Constant time;
    /// the returned `CtOption` is `None` for non-canonical encodings.
    pub fn from_canonical_bytes(bytes: [u8; 32]) -> CtOption<Scalar> {
        let candidate = Scalar::from_bits(&bytes);
        let mut borrow = 0u64;
        for i in 0..4 {
            sbb(candidate.0[i], L[i], &mut borrow);
        }
        // borrow == 1 iff candidate < l.
        CtOption::new(candidate, Choice::from(borrow as u8))
    }

    /// Raw little-endian limb load, no reduction. Internal only: the
    /// caller is responsible for the canonical invariant.
    fn from_bits(bytes: &[u8; 32]) -> Scalar {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            limbs[i] = u64::from_le_bytes(bytes[8 * i..8 * i + 8].try_into().unwrap());
        }
        Scalar(limbs)
    }

    /// Reduce 32 bytes modulo l.
    pub fn from_bytes_mod_order(bytes: [u8; 32]) -> Scalar {
        reduce_bits_mod_l(&bytes)
    }

    /// Reduce 64 uniform bytes modulo l; the result is statistically
    /// uniform in [0, l).
    pub fn from_bytes_mod_order_wide(bytes: &[u8; 64]) -> Scalar {
        reduce_bits_mod_l(bytes)
    }

    /// Canonical 32-byte little-endian serialization.
    pub fn to_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for i in 0..4 {
            out[8 * i..8 * i + 8].copy_from_slice(&self.0[i].to_le_bytes());
        }
        out
    }

    /// Constant-time zero test.
    pub fn is_zero(&self) -> Choice {
        self.ct_eq(&Scalar::ZERO)
    }

    /// r = 1/a = a^(l - 2). Returns zero for zero input.
    pub fn invert(&self) -> Scalar {
        // Fixed square-and-multiply ladder; the exponent is the public
        // constant l - 2, so the branch sequence is input-independent.
        let mut result = Scalar::ONE;
        for i in (0..253).rev() {
            result = &result * &result;
            if (L_MINUS_2[i / 64] >> (i % 64)) & 1 == 1 {
                result = &result * self;
            }
        }
        result
    }

    /// Signed radix-16 digits, 64 values in [-8, 8). Requires the scalar
    /// to be canonical (< 2^253). Used by the constant-time point
    /// multiplication routines.
    pub(crate) fn as_radix_16(&self) -> [i8; 64] {
        let bytes = self.to_bytes();
        let mut output = [0i8; 64];

        for i in 0..32 {
            output[2 * i] = (bytes[i] & 15) as i8;
            output[2 * i + 1] = (bytes[i] >> 4) as i8;
        }
        // Re-center each digit into [-8, 8), pushing the carry upward.
        for i in 0..63 {
            let carry = (output[i] + 8) >> 4;
            output[i] -= carry << 4;
            output[i + 1] += carry;
        }
        output
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Scalar {
        Scalar([value, 0, 0, 0])
    }
}

impl<'a, 'b> Add<&'b Scalar> for &'a Scalar {
    type Output = Scalar;
    fn add(self, rhs: &'b Scalar) -> Scalar {
        let mut carry = 0u64;
        let mut sum = [0u64; 4];
        for i in 0..4 {
            sum[i] = adc(self.0[i], rhs.0[i], &mut carry);
        }
        // Both inputs < l < 2^253: no carry out, one subtraction settles it.
        Scalar(reduce_once(sum))
    }
}

impl<'a, 'b> Sub<&'b Scalar> for &'a Scalar {
    type Output = Scalar;
    fn sub(self, rhs: &'b Scalar) -> Scalar {
        let mut borrow = 0u64;
        let mut diff = [0u64; 4];
        for i in 0..4 {
            diff[i] = sbb(self.0[i], rhs.0[i], &mut borrow);
        }
        // Add l back when the subtraction underflowed.
        let mask = borrow.wrapping_neg();
        let mut carry = 0u64;
        for i in 0..4 {
            diff[i] = adc(diff[i], L[i] & mask, &mut carry);
        }
        Scalar(diff)
    }
}

impl<'a> Neg for &'a Scalar {
    type Output = Scalar;
    fn neg(self) -> Scalar {
        &Scalar::ZERO - self
    }
}

impl<'a, 'b> Mul<&'b Scalar> for &'a Scalar {
    type Output = Scalar;
    fn mul(self, rhs: &'b Scalar) -> Scalar {
        // Schoolbook 256x256 -> 512, then the branchless wide reduction.
        let mut product = [0u64; 8];
        for i in 0..4 {
            let mut carry = 0u64;
            for j in 0..4 {
                let t = (self.0[i] as u128) * (rhs.0[j] as u128)
                    + (product[i + j] as u128)
                    + (carry as u128);
                product[i + j] = t as u64;
                carry = (t >> 64) as u64;
            }
            product[i + 4] = carry;
        }

        let mut bytes = [0u8; 64];
        for i in 0..8 {
            bytes[8 * i..8 * i + 8].copy_from_slice(&product[i].to_le_bytes());
        }
        Scalar::from_bytes_mod_order_wide(&bytes)
    }
}

define_binop_variants!(Add, add, Scalar);
define_binop_variants!(Sub, sub, Scalar);
define_binop_variants!(Mul, mul, Scalar);
define_neg_variant!(Scalar);

impl ConditionallySelectable for Scalar {
    fn conditional_select(a: &Scalar, b: &Scalar, choice: Choice) -> Scalar {
        Scalar([
            u64::conditional_select(&a.0[0], &b.0[0], choice),
            u64::conditional_select(&a.0[1], &b.0[1], choice),
            u64::conditional_select(&a.0[2], &b.0[2], choice),
            u64::conditional_select(&a.0[3], &b.0[3], choice),
        ])
    }
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Scalar) -> Choice {
        self.0[0].ct_eq(&other.0[0])
            & self.0[1].ct_eq(&other.0[1])
            & self.0[2].ct_eq(&other.0[2])
            & self.0[3].ct_eq(&other.0[3])
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Scalar) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for Scalar {}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}
