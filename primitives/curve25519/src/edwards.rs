//! Group operations on the twisted Edwards curve -x^2 + y^2 = 1 + d*x^2*y^2
//! in extended coordinates (X : Y : Z : T), X*Y = Z*T.
//!
//! Most operations here are variable time and must only see public data.
//! The constant-time entry points are explicit: the `Mul` operator
//! (variable base) and [`EdwardsPoint::mul_base`] (fixed base); both use
//! precomputed tables with branch-free lookups and are safe for secret
//! scalars.
//!
//! The addition formulas are complete (no special case for doubling or the
//! identity). Point addition stages its four cross products through the
//! batched field lanes so a SIMD field backend accelerates the curve layer
//! without any change here.

#![allow(non_snake_case)]

use core::ops::{Add, Mul, Neg, Sub};
use std::sync::OnceLock;

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use crate::constants;
use crate::field::{self, FieldElement};
use crate::macros::{define_binop_variants, define_neg_variant};
use crate::scalar::Scalar;

/// A point on the curve in extended coordinates.
#[derive(Copy, Clone, Debug)]
pub struct EdwardsPoint {
    pub(crate) X: FieldElement,
    pub(crate) Y: FieldElement,
    pub(crate) Z: FieldElement,
    pub(crate) T: FieldElement,
}

/// An RFC 8032 compressed point: little-endian y with sign(x) in bit 255.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CompressedEdwardsY(pub [u8; 32]);

/// Table-format point: (Y - X, Y + X, Z, k*T) with k = 2d. Saves the
/// (Y2 - X2)/(Y2 + X2) sums and the k multiplication in the add loop.
#[derive(Copy, Clone)]
pub(crate) struct PrecomputedPoint {
    y_minus_x: FieldElement,
    y_plus_x: FieldElement,
    z: FieldElement,
    kt: FieldElement,
}

/// The (E, F, G, H) stage of addition/doubling, before the final
/// multiplications that land the result back in extended (or projective)
/// coordinates.
struct CompletedPoint {
    e: FieldElement,
    f: FieldElement,
    g: FieldElement,
    h: FieldElement,
}

/// (X : Y : Z) only; the doubling chain does not need T between steps.
struct ProjectivePoint {
    X: FieldElement,
    Y: FieldElement,
    Z: FieldElement,
}

impl CompletedPoint {
    /// Extended result: 4 muls.
    fn to_extended(&self) -> EdwardsPoint {
        let (X, Y, Z, T) = field::mul4(&self.e, &self.f, &self.g, &self.h, &self.f, &self.g, &self.e, &self.h);
        EdwardsPoint { X, Y, Z, T }
    }

    /// Projective result: 3 muls. Saves one multiplication when the next
    /// step is a doubling, which ignores T.
    fn to_projective(&self) -> ProjectivePoint {
        let (X, Y, Z) = field::mul3(&self.e, &self.f, &self.g, &self.h, &self.f, &self.g);
        ProjectivePoint { X, Y, Z }
    }
}

impl ProjectivePoint {
    /// Dedicated doubling, 4 squarings. https://eprint.iacr.org/2008/522
    fn double_partial(&self) -> CompletedPoint {
        let x_plus_y = &self.X + &self.Y;
        let (xx, yy, zz, xy_sq) = field::sqr4(&self.X, &self.Y, &self.Z, &x_plus_y);
        let zz2 = &zz + &zz;
        let h = &xx + &yy;
        let g = &xx - &yy;
        let f = &zz2 + &g;
        let e = &h - &xy_sq;
        CompletedPoint { e, f, g, h }
    }
}

impl EdwardsPoint {
    /// The neutral element (0 : 1 : 1 : 0).
    pub fn identity() -> EdwardsPoint {
        EdwardsPoint {
            X: FieldElement::ZERO,
            Y: FieldElement::ONE,
            Z: FieldElement::ONE,
            T: FieldElement::ZERO,
        }
    }

    pub(crate) fn from_parts(
        X: FieldElement,
        Y: FieldElement,
        Z: FieldElement,
        T: FieldElement,
    ) -> EdwardsPoint {
        EdwardsPoint { X, Y, Z, T }
    }

    fn as_projective(&self) -> ProjectivePoint {
        ProjectivePoint { X: self.X, Y: self.Y, Z: self.Z }
    }

    /// 1 iff this is the identity. Constant time.
    pub fn is_identity(&self) -> Choice {
        self.X.is_zero() & self.Y.ct_eq(&self.Z)
    }

    /// r = 2a.
    pub fn double(&self) -> EdwardsPoint {
        self.as_projective().double_partial().to_extended()
    }

    /// r = 2^k * a. Cheaper than k additions: intermediate doublings skip
    /// the T multiplication.
    pub fn mul_by_pow_2(&self, k: u32) -> EdwardsPoint {
        if k == 0 {
            return *self;
        }
        let mut s = self.as_projective().double_partial();
        for _ in 1..k {
            s = s.to_projective().double_partial();
        }
        s.to_extended()
    }

    fn add_inner(&self, other: &EdwardsPoint) -> CompletedPoint {
        let consts = constants::curve_constants();

        let r1 = &self.Y - &self.X;
        let r3 = &self.Y + &self.X;
        let r2 = &other.Y - &other.X;
        let r4 = &other.Y + &other.X;
        let z2 = &self.Z + &self.Z;

        let (a, b, tt, d) = field::mul4(&r1, &r2, &r3, &r4, &self.T, &other.T, &z2, &other.Z);
        let c = &tt * &consts.k;

        CompletedPoint { e: &b - &a, f: &d - &c, g: &d + &c, h: &b + &a }
    }

    /// Addition against a table-format point; one multiplication cheaper
    /// because (Y2 - X2), (Y2 + X2) and k*T2 are already materialized.
    pub(crate) fn add_precomputed(&self, other: &PrecomputedPoint) -> EdwardsPoint {
        let r1 = &self.Y - &self.X;
        let r3 = &self.Y + &self.X;
        let z2 = &self.Z + &self.Z;

        let (a, b, c, d) = field::mul4(
            &r1,
            &other.y_minus_x,
            &r3,
            &other.y_plus_x,
            &self.T,
            &other.kt,
            &z2,
            &other.z,
        );

        CompletedPoint { e: &b - &a, f: &d - &c, g: &d + &c, h: &b + &a }.to_extended()
    }

    /// Low-order test for an affine point (Z == 1), i.e. order <= 8.
    /// Exactly the eight low-order points have X == 0, Y == 0, or Y equal
    /// to one of the two order-8 y-coordinates.
    pub fn affine_is_small_order(&self) -> bool {
        let consts = constants::curve_constants();
        debug_assert!(self.Z == FieldElement::ONE);
        bool::from(
            self.X.is_zero()
                | self.Y.is_zero()
                | self.Y.ct_eq(&consts.order8_y0)
                | self.Y.ct_eq(&consts.order8_y1),
        )
    }

    /// Normalize to Z = 1 (one field inversion).
    pub fn to_affine(&self) -> EdwardsPoint {
        let zi = self.Z.invert();
        let x = &self.X * &zi;
        let y = &self.Y * &zi;
        EdwardsPoint { X: x, Y: y, Z: FieldElement::ONE, T: &x * &y }
    }

    /// Build an affine point from raw coordinate encodings. No on-curve
    /// check; intended for table construction and tests.
    pub fn from_affine_coordinates(x: &[u8; 32], y: &[u8; 32]) -> EdwardsPoint {
        let X = FieldElement::from_bytes(x);
        let Y = FieldElement::from_bytes(y);
        EdwardsPoint { X, Y, Z: FieldElement::ONE, T: &X * &Y }
    }

    /// Compress to the RFC 8032 wire form.
    pub fn compress(&self) -> CompressedEdwardsY {
        let zi = self.Z.invert();
        let x = &self.X * &zi;
        let y = &self.Y * &zi;
        let mut bytes = y.to_bytes();
        bytes[31] ^= x.is_negative().unwrap_u8() << 7;
        CompressedEdwardsY(bytes)
    }

    /// Variable-time scalar multiplication, plain MSB-first double-and-add.
    /// Public inputs only.
    pub fn mul_vartime(&self, scalar: &Scalar) -> EdwardsPoint {
        let bytes = scalar.to_bytes();
        let mut acc = EdwardsPoint::identity();
        for i in (0..256).rev() {
            acc = acc.double();
            if (bytes[i / 8] >> (i % 8)) & 1 == 1 {
                acc = &acc + self;
            }
        }
        acc
    }

    /// Constant-time fixed-base multiplication r = n * B.
    ///
    /// Uses the static 32x8 table of base-point multiples with branch-free
    /// lookups; safe for secret n.
    pub fn mul_base(scalar: &Scalar) -> EdwardsPoint {
        let table = basepoint_table();
        let digits = scalar.as_radix_16();

        // n = sum(digits[i] * 16^i); split into odd and even windows so a
        // single 4-doubling pass aligns the odd half.
        let mut acc = EdwardsPoint::identity();
        let mut i = 1;
        while i < 64 {
            acc = acc.add_precomputed(&table.select(i / 2, digits[i]));
            i += 2;
        }
        acc = acc.mul_by_pow_2(4);
        let mut i = 0;
        while i < 64 {
            acc = acc.add_precomputed(&table.select(i / 2, digits[i]));
            i += 2;
        }
        acc
    }

    /// Variable-time r = n1 * a + n2 * B.
    pub fn vartime_double_scalar_mul_base(
        n1: &Scalar,
        a: &EdwardsPoint,
        n2: &Scalar,
    ) -> EdwardsPoint {
        let t1 = a.mul_vartime(n1);
        let t2 = constants::basepoint().mul_vartime(n2);
        &t1 + &t2
    }

    /// Variable-time multiscalar multiplication, naive term-by-term sum.
    pub fn vartime_multiscalar_mul_naive(
        scalars: &[Scalar],
        points: &[EdwardsPoint],
    ) -> EdwardsPoint {
        assert_eq!(scalars.len(), points.len());
        let mut acc = EdwardsPoint::identity();
        for (n, p) in scalars.iter().zip(points.iter()) {
            acc = &acc + &p.mul_vartime(n);
        }
        acc
    }

    /// Variable-time multiscalar multiplication.
    ///
    /// Straus interleaving with 4-bit windows: per-point tables of the 16
    /// small multiples, then one shared chain of 4 doublings per window
    /// with a table add per nonzero window digit. Tables are heap
    /// allocated (16 points per input point, ~2 KB each) and the
    /// interleaved path is used for 4..=32 terms; outside that range the
    /// naive sum wins and is used instead. Both paths produce identical
    /// results.
    pub fn vartime_multiscalar_mul(scalars: &[Scalar], points: &[EdwardsPoint]) -> EdwardsPoint {
        assert_eq!(scalars.len(), points.len());
        let sz = scalars.len();

        if sz == 0 {
            return EdwardsPoint::identity();
        }
        if sz == 1 {
            return points[0].mul_vartime(&scalars[0]);
        }
        if !(4..=32).contains(&sz) {
            return EdwardsPoint::vartime_multiscalar_mul_naive(scalars, points);
        }

        // table[i][j] = j * points[i], j in [0, 16), in table format so
        // the inner adds take the cheap path.
        let tables: Vec<[PrecomputedPoint; 16]> = points
            .iter()
            .map(|p| {
                let mut multiples = [EdwardsPoint::identity(); 16];
                multiples[1] = *p;
                multiples[2] = p.double();
                for j in 3..16 {
                    multiples[j] = &multiples[j - 1] + p;
                }
                core::array::from_fn(|j| PrecomputedPoint::from(&multiples[j]))
            })
            .collect();

        let digit_bytes: Vec<[u8; 32]> = scalars.iter().map(|n| n.to_bytes()).collect();

        let mut acc = EdwardsPoint::identity();
        for win in (0..64).rev() {
            if win != 63 {
                acc = acc.mul_by_pow_2(4);
            }
            for i in 0..sz {
                let byte = digit_bytes[i][win / 2];
                let w = if win % 2 == 0 { byte & 0x0f } else { byte >> 4 };
                if w != 0 {
                    acc = acc.add_precomputed(&tables[i][w as usize]);
                }
            }
        }
        acc
    }
}

impl CompressedEdwardsY {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Decode per RFC 8032. Non-canonical y encodings are accepted (the
    /// field decode reduces); returns None when x^2 = (y^2-1)/(d*y^2+1)
    /// has no root.
    pub fn decompress(&self) -> Option<EdwardsPoint> {
        let consts = constants::curve_constants();

        let Y = FieldElement::from_bytes(&self.0);
        let expected_sign = Choice::from(self.0[31] >> 7);

        let yy = Y.square();
        let u = &yy - &FieldElement::ONE;
        let v = &(&yy * &consts.d) + &FieldElement::ONE;

        let (is_square, mut X) = FieldElement::sqrt_ratio(&u, &v);
        if !bool::from(is_square) {
            return None;
        }

        let flip = expected_sign ^ X.is_negative();
        X = FieldElement::conditional_select(&X, &(-&X), flip);

        let T = &X * &Y;
        Some(EdwardsPoint { X, Y, Z: FieldElement::ONE, T })
    }
}

impl<'a, 'b> Add<&'b EdwardsPoint> for &'a EdwardsPoint {
    type Output = EdwardsPoint;
    fn add(self, rhs: &'b EdwardsPoint) -> EdwardsPoint {
        self.add_inner(rhs).to_extended()
    }
}

impl<'a, 'b> Sub<&'b EdwardsPoint> for &'a EdwardsPoint {
    type Output = EdwardsPoint;
    fn sub(self, rhs: &'b EdwardsPoint) -> EdwardsPoint {
        self + &(-rhs)
    }
}

impl<'a> Neg for &'a EdwardsPoint {
    type Output = EdwardsPoint;
    fn neg(self) -> EdwardsPoint {
        EdwardsPoint { X: -&self.X, Y: self.Y, Z: self.Z, T: -&self.T }
    }
}

/// Constant-time variable-base scalar multiplication. Safe for secret
/// scalars: signed radix-16 digits against a branch-free 8-entry table.
impl<'a, 'b> Mul<&'b Scalar> for &'a EdwardsPoint {
    type Output = EdwardsPoint;
    fn mul(self, scalar: &'b Scalar) -> EdwardsPoint {
        let table = PointTable::from_point(self);
        let digits = scalar.as_radix_16();

        let mut acc = EdwardsPoint::identity();
        for i in (0..64).rev() {
            if i != 63 {
                acc = acc.mul_by_pow_2(4);
            }
            acc = acc.add_precomputed(&table.select(digits[i]));
        }
        acc
    }
}

define_binop_variants!(Add, add, EdwardsPoint);
define_binop_variants!(Sub, sub, EdwardsPoint);
define_neg_variant!(EdwardsPoint);

impl Mul<Scalar> for EdwardsPoint {
    type Output = EdwardsPoint;
    fn mul(self, rhs: Scalar) -> EdwardsPoint {
        &self * &rhs
    }
}
impl<'a> Mul<&'a Scalar> for EdwardsPoint {
    type Output = EdwardsPoint;
    fn mul(self, rhs: &'a Scalar) -> EdwardsPoint {
        &self * rhs
    }
}
impl<'a> Mul<Scalar> for &'a EdwardsPoint {
    type Output = EdwardsPoint;
    fn mul(self, rhs: Scalar) -> EdwardsPoint {
        self * &rhs
    }
}

impl ConstantTimeEq for EdwardsPoint {
    /// Projective cross-multiplied comparison; no inversion.
    fn ct_eq(&self, other: &EdwardsPoint) -> Choice {
        let x1 = &other.X * &self.Z;
        let x2 = &self.X * &other.Z;
        let y1 = &other.Y * &self.Z;
        let y2 = &self.Y * &other.Z;
        x1.ct_eq(&x2) & y1.ct_eq(&y2)
    }
}

impl PartialEq for EdwardsPoint {
    fn eq(&self, other: &EdwardsPoint) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for EdwardsPoint {}

impl From<&EdwardsPoint> for PrecomputedPoint {
    fn from(p: &EdwardsPoint) -> PrecomputedPoint {
        let consts = constants::curve_constants();
        PrecomputedPoint {
            y_minus_x: &p.Y - &p.X,
            y_plus_x: &p.Y + &p.X,
            z: p.Z,
            kt: &p.T * &consts.k,
        }
    }
}

impl PrecomputedPoint {
    /// The identity in table format: Y-X = Y+X = Z = 1, kT = 0.
    fn identity() -> PrecomputedPoint {
        PrecomputedPoint {
            y_minus_x: FieldElement::ONE,
            y_plus_x: FieldElement::ONE,
            z: FieldElement::ONE,
            kt: FieldElement::ZERO,
        }
    }

    /// Constant-time negation: swap the (Y-X, Y+X) pair and negate kT.
    fn conditional_negate(&mut self, choice: Choice) {
        FieldElement::conditional_swap(&mut self.y_minus_x, &mut self.y_plus_x, choice);
        let neg_kt = -&self.kt;
        self.kt = FieldElement::conditional_select(&self.kt, &neg_kt, choice);
    }
}

impl ConditionallySelectable for PrecomputedPoint {
    fn conditional_select(
        a: &PrecomputedPoint,
        b: &PrecomputedPoint,
        choice: Choice,
    ) -> PrecomputedPoint {
        PrecomputedPoint {
            y_minus_x: FieldElement::conditional_select(&a.y_minus_x, &b.y_minus_x, choice),
            y_plus_x: FieldElement::conditional_select(&a.y_plus_x, &b.y_plus_x, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
            kt: FieldElement::conditional_select(&a.kt, &b.kt, choice),
        }
    }
}

/// Table of [P, 2P, ..., 8P] with constant-time signed-digit lookup.
struct PointTable([PrecomputedPoint; 8]);

impl PointTable {
    fn from_point(p: &EdwardsPoint) -> PointTable {
        let mut multiples = [*p; 8];
        for j in 1..8 {
            multiples[j] = &multiples[j - 1] + p;
        }
        PointTable([
            PrecomputedPoint::from(&multiples[0]),
            PrecomputedPoint::from(&multiples[1]),
            PrecomputedPoint::from(&multiples[2]),
            PrecomputedPoint::from(&multiples[3]),
            PrecomputedPoint::from(&multiples[4]),
            PrecomputedPoint::from(&multiples[5]),
            PrecomputedPoint::from(&multiples[6]),
            PrecomputedPoint::from(&multiples[7]),
        ])
    }

    /// Return digit * P for digit in [-8, 8], scanning every entry and
    /// selecting without branches.
    fn select(&self, digit: i8) -> PrecomputedPoint {
        let sign_mask = (digit >> 7) as u8; // 0x00 or 0xff
        let magnitude = ((digit as i16 + (sign_mask as i8 as i16)) ^ (sign_mask as i8 as i16)) as u8;

        let mut t = PrecomputedPoint::identity();
        for j in 1u8..9 {
            let c = magnitude.ct_eq(&j);
            t = PrecomputedPoint::conditional_select(&t, &self.0[(j - 1) as usize], c);
        }
        t.conditional_negate(Choice::from(sign_mask & 1));
        t
    }
}

/// 32 windows of 8 base-point multiples: row i holds
/// [1, ..., 8] * 16^(2i) * B. ~32 KB, built once.
struct BasepointTable {
    rows: Vec<PointTable>,
}

impl BasepointTable {
    fn build() -> BasepointTable {
        let mut rows = Vec::with_capacity(32);
        let mut p = *constants::basepoint();
        for _ in 0..32 {
            rows.push(PointTable::from_point(&p));
            p = p.mul_by_pow_2(8);
        }
        BasepointTable { rows }
    }

    fn select(&self, row: usize, digit: i8) -> PrecomputedPoint {
        self.rows[row].select(digit)
    }
}

fn basepoint_table() -> &'static BasepointTable {
    static TABLE: OnceLock<BasepointTable> = OnceLock::new();
    TABLE.get_or_init(BasepointTable::build)
}
