//! The two protocol generators.
//!
//! G is the Ristretto255 base point; H is the Pedersen blinding generator
//! the whole TOS protocol is keyed to (public keys are sk^-1 * H, and H
//! carries the opening term of every commitment). Both are pinned as
//! compressed bytes and decompressed once.

use std::sync::OnceLock;

use tos_curve25519::constants::RISTRETTO_BASEPOINT_COMPRESSED;
use tos_curve25519::{CompressedRistretto, RistrettoPoint};

/// The Pedersen blinding generator H, compressed.
pub const PEDERSEN_H_COMPRESSED: [u8; 32] = [
    0x8c, 0x92, 0x40, 0xb4, 0x56, 0xa9, 0xe6, 0xdc, 0x65, 0xc3, 0x77, 0xa1, 0x04, 0x8d, 0x74,
    0x5f, 0x94, 0xa0, 0x8c, 0xdb, 0x7f, 0x44, 0xcb, 0xcd, 0x7b, 0x46, 0xf3, 0x40, 0x48, 0x87,
    0x11, 0x34,
];

/// The Ristretto base point G.
pub fn ristretto_g() -> &'static RistrettoPoint {
    static G: OnceLock<RistrettoPoint> = OnceLock::new();
    G.get_or_init(|| {
        CompressedRistretto(RISTRETTO_BASEPOINT_COMPRESSED)
            .decompress()
            .expect("pinned generator bytes decode")
    })
}

/// The Pedersen blinding generator H, decompressed once and shared by
/// every commitment, key, and signature operation.
pub fn pedersen_h() -> &'static RistrettoPoint {
    static H: OnceLock<RistrettoPoint> = OnceLock::new();
    H.get_or_init(|| {
        CompressedRistretto(PEDERSEN_H_COMPRESSED)
            .decompress()
            .expect("pinned generator bytes decode")
    })
}
