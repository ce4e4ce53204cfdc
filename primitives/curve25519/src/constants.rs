//! Protocol constants.
//!
//! Only two field constants are pinned as bytes (the Edwards `d` parameter
//! and sqrt(-1)); everything derived from them (k = 2d, the Ristretto
//! encode/Elligator constants) is materialized from the canonical 32-byte
//! forms on first use. The initializer is idempotent and safe under
//! concurrent first invocation.

use std::sync::OnceLock;

use crate::edwards::{CompressedEdwardsY, EdwardsPoint};
use crate::field::FieldElement;

/// Edwards curve parameter d = -121665/121666 mod p (RFC 8032), canonical
/// little-endian bytes.
pub const EDWARDS_D_BYTES: [u8; 32] = [
    0xa3, 0x78, 0x59, 0x13, 0xca, 0x4d, 0xeb, 0x75, 0xab, 0xd8, 0x41, 0x41, 0x4d, 0x0a, 0x70,
    0x00, 0x98, 0xe8, 0x79, 0x77, 0x79, 0x40, 0xc7, 0x8c, 0x73, 0xfe, 0x6f, 0x2b, 0xee, 0x6c,
    0x03, 0x52,
];

/// sqrt(-1) mod p (the nonnegative root), canonical little-endian bytes.
pub const SQRT_M1_BYTES: [u8; 32] = [
    0xb0, 0xa0, 0x0e, 0x4a, 0x27, 0x1b, 0xee, 0xc4, 0x78, 0xe4, 0x2f, 0xad, 0x06, 0x18, 0x43,
    0x2f, 0xa7, 0xd7, 0xfb, 0x3d, 0x99, 0x00, 0x4d, 0x2b, 0x0b, 0xdf, 0xc1, 0x4f, 0x80, 0x24,
    0x83, 0x2b,
];

/// The Ed25519 base point (y = 4/5, even x), RFC 8032 compressed form.
pub const ED25519_BASEPOINT_COMPRESSED: [u8; 32] = [
    0x58, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66,
];

/// The Ristretto255 base point, compressed form. Decodes into the same
/// coset as the Ed25519 base point.
pub const RISTRETTO_BASEPOINT_COMPRESSED: [u8; 32] = [
    0xe2, 0xf2, 0xae, 0x0a, 0x6a, 0xbc, 0x4e, 0x71, 0xa8, 0x84, 0xa9, 0x61, 0xc5, 0x00, 0x51,
    0x5f, 0x58, 0xe3, 0x0b, 0x6a, 0xa5, 0x82, 0xdd, 0x8d, 0xb6, 0xa6, 0x59, 0x45, 0xe0, 0x8d,
    0x2d, 0x76,
];

/// y-coordinate of one order-8 point (the other three order-8 points share
/// +/-y with these two). Used by the affine low-order check.
pub const ORDER8_POINT_Y0: [u8; 32] = [
    0x26, 0xe8, 0x95, 0x8f, 0xc2, 0xb2, 0x27, 0xb0, 0x45, 0xc3, 0xf4, 0x89, 0xf2, 0xef, 0x98,
    0xf0, 0xd5, 0xdf, 0xac, 0x05, 0xd3, 0xc6, 0x33, 0x39, 0xb1, 0x38, 0x02, 0x88, 0x6d, 0x53,
    0xfc, 0x05,
];

/// y-coordinate of the conjugate order-8 point.
pub const ORDER8_POINT_Y1: [u8; 32] = [
    0xc7, 0x17, 0x6a, 0x70, 0x3d, 0x4d, 0xd8, 0x4f, 0xba, 0x3c, 0x0b, 0x76, 0x0d, 0x10, 0x67,
    0x0f, 0x2a, 0x20, 0x53, 0xfa, 0x2c, 0x39, 0xcc, 0xc6, 0x4e, 0xc7, 0xfd, 0x77, 0x92, 0xac,
    0x03, 0x7a,
];

/// Field constants derived from d and sqrt(-1) at first use.
pub struct CurveConstants {
    /// Edwards d.
    pub d: FieldElement,
    /// k = 2d, folded into the T-coordinate product of point addition.
    pub k: FieldElement,
    /// 1/sqrt(a - d), a = -1. Ristretto encode rotation denominator.
    pub invsqrt_a_minus_d: FieldElement,
    /// 1 - d^2. Elligator numerator constant.
    pub one_minus_d_sq: FieldElement,
    /// (d - 1)^2. Elligator N constant.
    pub d_minus_one_sq: FieldElement,
    /// sqrt(a*d - 1), a = -1.
    pub sqrt_ad_minus_one: FieldElement,
    /// y-coordinates of the order-8 points, for the low-order check.
    pub order8_y0: FieldElement,
    pub order8_y1: FieldElement,
}

/// sqrt(-1), materialized from its canonical bytes.
pub fn sqrt_m1() -> &'static FieldElement {
    static SQRT_M1: OnceLock<FieldElement> = OnceLock::new();
    SQRT_M1.get_or_init(|| FieldElement::from_bytes(&SQRT_M1_BYTES))
}

/// The derived curve constants.
pub fn curve_constants() -> &'static CurveConstants {
    static CONSTANTS: OnceLock<CurveConstants> = OnceLock::new();
    CONSTANTS.get_or_init(|| {
        let one = FieldElement::ONE;
        let d = FieldElement::from_bytes(&EDWARDS_D_BYTES);
        let d_sq = d.square();
        let d_minus_one = &d - &one;

        // a = -1, so a - d = -(1 + d) and a*d - 1 = -(d + 1).
        let minus_d_plus_one = -&(&d + &one);

        let (ad_square, sqrt_ad_minus_one) = FieldElement::sqrt_ratio(&minus_d_plus_one, &one);
        debug_assert!(bool::from(ad_square));
        let (amd_square, invsqrt_a_minus_d) = FieldElement::inv_sqrt(&minus_d_plus_one);
        debug_assert!(bool::from(amd_square));

        CurveConstants {
            d,
            k: &d + &d,
            invsqrt_a_minus_d,
            one_minus_d_sq: &one - &d_sq,
            d_minus_one_sq: d_minus_one.square(),
            sqrt_ad_minus_one,
            order8_y0: FieldElement::from_bytes(&ORDER8_POINT_Y0),
            order8_y1: FieldElement::from_bytes(&ORDER8_POINT_Y1),
        }
    })
}

/// The Ed25519 base point in extended coordinates, decoded once from its
/// compressed form.
pub fn basepoint() -> &'static EdwardsPoint {
    static BASEPOINT: OnceLock<EdwardsPoint> = OnceLock::new();
    BASEPOINT.get_or_init(|| {
        CompressedEdwardsY(ED25519_BASEPOINT_COMPRESSED)
            .decompress()
            .expect("pinned base point bytes decode")
    })
}
