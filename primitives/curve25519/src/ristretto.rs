//! The Ristretto255 prime-order group, built as a quotient of the Edwards
//! curve. Decoding is canonical: torsion components, non-canonical field
//! encodings, and negative representatives are all rejected, so every
//! group element has exactly one accepted 32-byte encoding.

#![allow(non_snake_case)]

use core::ops::{Add, Mul, Neg, Sub};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use crate::constants;
use crate::edwards::EdwardsPoint;
use crate::field::{self, FieldElement};
use crate::macros::{define_binop_variants, define_neg_variant};
use crate::scalar::Scalar;

/// An element of the Ristretto255 group. Internally an Edwards point; the
/// coset structure only matters at encode/compare boundaries.
#[derive(Copy, Clone, Debug)]
pub struct RistrettoPoint(pub(crate) EdwardsPoint);

/// A canonical 32-byte Ristretto255 encoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CompressedRistretto(pub [u8; 32]);

impl CompressedRistretto {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    /// The encoding of the identity (all zeros).
    pub fn identity() -> CompressedRistretto {
        CompressedRistretto([0u8; 32])
    }

    /// Canonical decode. Rejects non-canonical field encodings, negative
    /// s, candidates where the square root does not exist, negative t,
    /// and zero y. The all-zero string decodes to the identity.
    pub fn decompress(&self) -> Option<RistrettoPoint> {
        let consts = constants::curve_constants();
        let one = FieldElement::ONE;

        let s = FieldElement::from_bytes(&self.0);

        // Only canonical, nonnegative s is accepted.
        if s.to_bytes() != self.0 || self.0[0] & 1 == 1 {
            return None;
        }

        let ss = s.square();
        let u1 = &one - &ss;
        let u2 = &one + &ss;
        let u2_sqr = u2.square();

        // v = -(d * u1^2) - u2^2
        let v = &(-&(&u1.square() * &consts.d)) - &u2_sqr;

        let (was_square, inv_sq) = FieldElement::inv_sqrt(&(&v * &u2_sqr));

        let den_x = &inv_sq * &u2;
        let den_y = &(&inv_sq * &den_x) * &v;

        let x = (&(&s + &s) * &den_x).abs();
        let y = &u1 * &den_y;
        let t = &x * &y;

        if !bool::from(was_square) || bool::from(t.is_negative()) || bool::from(y.is_zero()) {
            return None;
        }

        Some(RistrettoPoint(EdwardsPoint::from_parts(x, y, one, t)))
    }
}

impl RistrettoPoint {
    pub fn identity() -> RistrettoPoint {
        RistrettoPoint(EdwardsPoint::identity())
    }

    /// The Ristretto255 base point G.
    pub fn basepoint() -> RistrettoPoint {
        RistrettoPoint(*constants::basepoint())
    }

    pub fn is_identity(&self) -> Choice {
        self.ct_eq(&RistrettoPoint::identity())
    }

    /// Canonical encode, applying the torsion-equivalence rotation so all
    /// four Edwards representatives of a coset produce the same bytes.
    pub fn compress(&self) -> CompressedRistretto {
        let consts = constants::curve_constants();
        let sqrt_m1 = constants::sqrt_m1();

        let (X, Y, Z, T) = (self.0.X, self.0.Y, self.0.Z, self.0.T);

        let u1 = &(&Z + &Y) * &(&Z - &Y);
        let u2 = &X * &Y;

        let (_, inv_sqrt) = FieldElement::inv_sqrt(&(&u1 * &u2.square()));

        let (den1, den2) = field::mul2(&inv_sqrt, &u1, &inv_sqrt, &u2);
        let z_inv = &(&den1 * &den2) * &T;

        let (ix, iy) = field::mul2(&X, sqrt_m1, &Y, sqrt_m1);
        let enchanted_denominator = &den1 * &consts.invsqrt_a_minus_d;

        let rotate = (&T * &z_inv).is_negative();

        let x = FieldElement::conditional_select(&X, &iy, rotate);
        let mut y = FieldElement::conditional_select(&Y, &ix, rotate);
        let den_inv = FieldElement::conditional_select(&den2, &enchanted_denominator, rotate);

        let y_is_flipped = (&x * &z_inv).is_negative();
        y = FieldElement::conditional_select(&y, &(-&y), y_is_flipped);

        let s = (&den_inv * &(&Z - &y)).abs();

        CompressedRistretto(s.to_bytes())
    }

    /// Elligator2 map from 32 uniform bytes to a group element.
    /// https://ristretto.group/formulas/elligator.html
    pub fn map_to_curve(bytes: &[u8; 32]) -> RistrettoPoint {
        let consts = constants::curve_constants();
        let sqrt_m1 = constants::sqrt_m1();
        let one = FieldElement::ONE;

        let r0 = FieldElement::from_bytes(bytes);
        let r = &r0.square() * sqrt_m1;

        let u = &(&r + &one) * &consts.one_minus_d_sq;
        let mut c = FieldElement::MINUS_ONE;

        let v = &(&c - &(&r * &consts.d)) * &(&r + &consts.d);

        let (was_square, mut s) = FieldElement::sqrt_ratio(&u, &v);
        let s_prime = (&s * &r0).neg_abs();

        s = FieldElement::conditional_select(&s_prime, &s, was_square);
        c = FieldElement::conditional_select(&r, &c, was_square);

        let n = &(&(&c * &(&r - &one)) * &consts.d_minus_one_sq) - &v;

        let s_sq = s.square();
        let (w0, w1) = field::mul2(&s, &v, &n, &consts.sqrt_ad_minus_one);
        let w0 = &w0 + &w0;
        let w2 = &one - &s_sq;
        let w3 = &one + &s_sq;

        let (X, Y, Z, T) = field::mul4(&w0, &w3, &w2, &w1, &w1, &w3, &w0, &w2);
        RistrettoPoint(EdwardsPoint::from_parts(X, Y, Z, T))
    }

    /// Hash-to-curve from 64 uniform bytes: the sum of two independent
    /// Elligator maps, indifferentiable from a random oracle.
    pub fn hash_to_curve(bytes: &[u8; 64]) -> RistrettoPoint {
        let p1 = RistrettoPoint::map_to_curve(bytes[0..32].try_into().unwrap());
        let p2 = RistrettoPoint::map_to_curve(bytes[32..64].try_into().unwrap());
        &p1 + &p2
    }

    /// Constant-time fixed-base multiplication n * G.
    pub fn mul_base(scalar: &Scalar) -> RistrettoPoint {
        RistrettoPoint(EdwardsPoint::mul_base(scalar))
    }

    /// Variable-time scalar multiplication. Public inputs only.
    pub fn mul_vartime(&self, scalar: &Scalar) -> RistrettoPoint {
        RistrettoPoint(self.0.mul_vartime(scalar))
    }

    /// Variable-time n1 * a + n2 * G.
    pub fn vartime_double_scalar_mul_base(
        n1: &Scalar,
        a: &RistrettoPoint,
        n2: &Scalar,
    ) -> RistrettoPoint {
        RistrettoPoint(EdwardsPoint::vartime_double_scalar_mul_base(n1, &a.0, n2))
    }

    /// Variable-time multiscalar multiplication (Straus interleave for
    /// 4..=32 terms, naive otherwise).
    pub fn vartime_multiscalar_mul(
        scalars: &[Scalar],
        points: &[RistrettoPoint],
    ) -> RistrettoPoint {
        let inner: Vec<EdwardsPoint> = points.iter().map(|p| p.0).collect();
        RistrettoPoint(EdwardsPoint::vartime_multiscalar_mul(scalars, &inner))
    }
}

impl<'a, 'b> Add<&'b RistrettoPoint> for &'a RistrettoPoint {
    type Output = RistrettoPoint;
    fn add(self, rhs: &'b RistrettoPoint) -> RistrettoPoint {
        RistrettoPoint(&self.0 + &rhs.0)
    }
}

impl<'a, 'b> Sub<&'b RistrettoPoint> for &'a RistrettoPoint {
    type Output = RistrettoPoint;
    fn sub(self, rhs: &'b RistrettoPoint) -> RistrettoPoint {
        RistrettoPoint(&self.0 - &rhs.0)
    }
}

impl<'a> Neg for &'a RistrettoPoint {
    type Output = RistrettoPoint;
    fn neg(self) -> RistrettoPoint {
        RistrettoPoint(-&self.0)
    }
}

/// Constant-time scalar multiplication; safe for secret scalars.
impl<'a, 'b> Mul<&'b Scalar> for &'a RistrettoPoint {
    type Output = RistrettoPoint;
    fn mul(self, scalar: &'b Scalar) -> RistrettoPoint {
        RistrettoPoint(&self.0 * scalar)
    }
}

impl<'a, 'b> Mul<&'b RistrettoPoint> for &'a Scalar {
    type Output = RistrettoPoint;
    fn mul(self, point: &'b RistrettoPoint) -> RistrettoPoint {
        point * self
    }
}

define_binop_variants!(Add, add, RistrettoPoint);
define_binop_variants!(Sub, sub, RistrettoPoint);
define_neg_variant!(RistrettoPoint);

impl Mul<Scalar> for RistrettoPoint {
    type Output = RistrettoPoint;
    fn mul(self, rhs: Scalar) -> RistrettoPoint {
        &self * &rhs
    }
}
impl<'a> Mul<&'a Scalar> for RistrettoPoint {
    type Output = RistrettoPoint;
    fn mul(self, rhs: &'a Scalar) -> RistrettoPoint {
        &self * rhs
    }
}
impl<'a> Mul<RistrettoPoint> for &'a Scalar {
    type Output = RistrettoPoint;
    fn mul(self, rhs: RistrettoPoint) -> RistrettoPoint {
        &rhs * self
    }
}
impl Mul<RistrettoPoint> for Scalar {
    type Output = RistrettoPoint;
    fn mul(self, rhs: RistrettoPoint) -> RistrettoPoint {
        &rhs * &self
    }
}
impl<'a> Mul<Scalar> for &'a RistrettoPoint {
    type Output = RistrettoPoint;
    fn mul(self, rhs: Scalar) -> RistrettoPoint {
        self * &rhs
    }
}

impl ConstantTimeEq for RistrettoPoint {
    /// Torsion-safe equality on the quotient: X1*Y2 == Y1*X2 or
    /// X1*X2 == Y1*Y2.
    fn ct_eq(&self, other: &RistrettoPoint) -> Choice {
        let (X1Y2, Y1X2) = field::mul2(&self.0.X, &other.0.Y, &self.0.Y, &other.0.X);
        let (X1X2, Y1Y2) = field::mul2(&self.0.X, &other.0.X, &self.0.Y, &other.0.Y);
        X1Y2.ct_eq(&Y1X2) | X1X2.ct_eq(&Y1Y2)
    }
}

impl PartialEq for RistrettoPoint {
    fn eq(&self, other: &RistrettoPoint) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for RistrettoPoint {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn random_scalar(rng: &mut ChaCha20Rng) -> Scalar {
        let mut wide = [0u8; 64];
        rng.fill_bytes(&mut wide);
        Scalar::from_bytes_mod_order_wide(&wide)
    }

    fn random_point(rng: &mut ChaCha20Rng) -> RistrettoPoint {
        let mut wide = [0u8; 64];
        rng.fill_bytes(&mut wide);
        RistrettoPoint::hash_to_curve(&wide)
    }

    #[test]
    fn basepoint_encodes_to_pinned_bytes() {
        assert_eq!(
            RistrettoPoint::basepoint().compress().0,
            constants::RISTRETTO_BASEPOINT_COMPRESSED
        );
    }

    /// First multiples of the generator, RFC 9496 §A.1.
    #[test]
    fn generator_multiples() {
        use hex_literal::hex;
        let vectors: [[u8; 32]; 5] = [
            hex!("0000000000000000000000000000000000000000000000000000000000000000"),
            hex!("e2f2ae0a6abc4e71a884a961c500515f58e30b6aa582dd8db6a65945e08d2d76"),
            hex!("6a493210f7499cd17fecb510ae0cea23a110e8d5b901f8acadd3095c73a3b919"),
            hex!("94741f5d5d52755ece4f23f044ee27d5d1ea1e2bd196b462166b16152a9d0259"),
            hex!("da80862773358b466ffadfe0b3293ab3d9fd53c5ea6c955358f568322daf6a57"),
        ];
        let mut p = RistrettoPoint::identity();
        let g = RistrettoPoint::basepoint();
        for v in vectors.iter() {
            assert_eq!(hex::encode(p.compress().0), hex::encode(v));
            assert_eq!(CompressedRistretto(*v).decompress().unwrap(), p);
            p = &p + &g;
        }
    }

    #[test]
    fn zero_bytes_decode_to_identity() {
        let p = CompressedRistretto::identity().decompress().unwrap();
        assert!(bool::from(p.is_identity()));
        assert_eq!(p.compress(), CompressedRistretto::identity());
    }

    #[test]
    fn round_trip_random_points() {
        let mut rng = ChaCha20Rng::from_seed([41u8; 32]);
        for _ in 0..20 {
            let p = random_point(&mut rng);
            let c = p.compress();
            let q = c.decompress().unwrap();
            assert_eq!(p, q);
            assert_eq!(q.compress(), c);
        }
    }

    #[test]
    fn decode_rejects_bad_encodings() {
        // Non-canonical: the byte string for p + 1 re-encodes as 1, so the
        // canonicality check fires (the value itself is even, so the sign
        // check alone would not reject it).
        let mut non_canonical = [0xffu8; 32];
        non_canonical[0] = 0xee;
        non_canonical[31] = 0x7f;
        assert!(CompressedRistretto(non_canonical).decompress().is_none());

        // Negative s: the basepoint encoding with the low bit forced on.
        let mut negative = constants::RISTRETTO_BASEPOINT_COMPRESSED;
        negative[0] |= 1;
        assert!(CompressedRistretto(negative).decompress().is_none());

        // Small-order points never come out of the decoder: any accepted
        // encoding is either the identity or a full-order point.
        for candidate in [constants::ORDER8_POINT_Y0, constants::ORDER8_POINT_Y1] {
            if let Some(p) = CompressedRistretto(candidate).decompress() {
                assert!(!p.0.to_affine().affine_is_small_order());
            }
        }
    }

    #[test]
    fn decode_encode_is_canonicalizing() {
        let mut rng = ChaCha20Rng::from_seed([42u8; 32]);
        // Any accepted encoding re-encodes to itself.
        for _ in 0..10 {
            let c = random_point(&mut rng).compress();
            assert_eq!(c.decompress().unwrap().compress(), c);
        }
    }

    #[test]
    fn map_to_curve_of_zero_is_deterministic_non_identity() {
        let p = RistrettoPoint::map_to_curve(&[0u8; 32]);
        let q = RistrettoPoint::map_to_curve(&[0u8; 32]);
        assert_eq!(p, q);
        assert!(!bool::from(p.is_identity()));

        // hash_to_curve of all zeros is map(0) + map(0) = 2 * map(0).
        let h = RistrettoPoint::hash_to_curve(&[0u8; 64]);
        assert_eq!(h, &p + &p);
    }

    #[test]
    fn hash_to_curve_determinism_and_spread() {
        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        b[0] = 1;
        assert_eq!(
            RistrettoPoint::hash_to_curve(&a).compress(),
            RistrettoPoint::hash_to_curve(&a).compress()
        );
        assert_ne!(
            RistrettoPoint::hash_to_curve(&a).compress(),
            RistrettoPoint::hash_to_curve(&b).compress()
        );
        a[63] = 0x80;
        assert_ne!(
            RistrettoPoint::hash_to_curve(&a).compress(),
            RistrettoPoint::hash_to_curve(&[0u8; 64]).compress()
        );
    }

    #[test]
    fn torsion_safe_equality() {
        let mut rng = ChaCha20Rng::from_seed([43u8; 32]);
        let order8 = crate::edwards::CompressedEdwardsY(constants::ORDER8_POINT_Y0)
            .decompress()
            .unwrap();
        assert!(bool::from(order8.mul_by_pow_2(3).is_identity()));

        // 2 * order8 is a 4-torsion component; adding it changes the
        // Edwards representative but not the Ristretto element.
        let four_torsion = order8.double();
        assert!(!bool::from(four_torsion.is_identity()));

        let p = random_point(&mut rng);
        let r = RistrettoPoint(&p.0 + &four_torsion);
        assert!(!bool::from(p.0.ct_eq(&r.0)));
        assert_eq!(p.compress(), r.compress());
        assert_eq!(p, r);
    }

    #[test]
    fn scalar_algebra_matches_group_ops() {
        let mut rng = ChaCha20Rng::from_seed([44u8; 32]);
        let g = RistrettoPoint::basepoint();
        let a = random_scalar(&mut rng);
        let b = random_scalar(&mut rng);

        // (a + b) G == aG + bG, through all three mul paths.
        let lhs = RistrettoPoint::mul_base(&(&a + &b));
        let rhs = &(&g * &a) + &g.mul_vartime(&b);
        assert_eq!(lhs, rhs);

        // MSM against the operator algebra.
        let p = random_point(&mut rng);
        let msm = RistrettoPoint::vartime_multiscalar_mul(&[a, b], &[g, p]);
        assert_eq!(msm, &(&g * &a) + &(&p * &b));

        // Double-scalar-mul-base.
        let d = RistrettoPoint::vartime_double_scalar_mul_base(&b, &p, &a);
        assert_eq!(d, &(&p * &b) + &(&g * &a));
    }
}
