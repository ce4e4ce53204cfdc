//! The TOS Schnorr-variant signature scheme.
//!
//! Not standard Ed25519 and not textbook Schnorr: the key is inverted and
//! the scheme is anchored to the Pedersen blinding generator H instead of
//! the curve base point.
//!
//! - public key: P = sk^-1 * H
//! - sign:       R = k * H, e = H_l(P || msg || R), s = sk^-1 * e + k
//! - verify:     R = s * H - e * P, accept iff e == H_l(P || msg || R)
//!
//! where H_l is SHA3-512 reduced modulo l. The wire form is the 64-byte
//! pair (s || e), both scalars canonical.

use rand_core::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::Zeroize;

use tos_curve25519::sha3::Sha3_512;
use tos_curve25519::{CompressedRistretto, RistrettoPoint, Scalar};

use crate::elgamal::{PrivateKey, PublicKey};
use crate::generators::pedersen_h;

pub const SIGNATURE_SIZE: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid signature encoding")]
    InvalidEncoding,
    #[error("signature verification failed")]
    InvalidSignature,
    #[error("nonce generation failed")]
    RngFailure,
    #[error("batch input arrays have mismatched lengths")]
    LengthMismatch,
}

/// A signature: the response scalar s and the challenge scalar e.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    s: Scalar,
    e: Scalar,
}

impl Signature {
    pub fn from_parts(s: Scalar, e: Scalar) -> Signature {
        Signature { s, e }
    }

    pub fn s(&self) -> &Scalar {
        &self.s
    }

    pub fn e(&self) -> &Scalar {
        &self.e
    }

    /// Serialize as s || e.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_SIZE] {
        let mut out = [0u8; SIGNATURE_SIZE];
        out[..32].copy_from_slice(&self.s.to_bytes());
        out[32..].copy_from_slice(&self.e.to_bytes());
        out
    }

    /// Parse s || e, requiring both scalars canonical.
    pub fn from_bytes(bytes: &[u8; SIGNATURE_SIZE]) -> Result<Signature, SignatureError> {
        let s = Option::from(Scalar::from_canonical_bytes(bytes[..32].try_into().unwrap()))
            .ok_or(SignatureError::InvalidEncoding)?;
        let e = Option::from(Scalar::from_canonical_bytes(bytes[32..].try_into().unwrap()))
            .ok_or(SignatureError::InvalidEncoding)?;
        Ok(Signature { s, e })
    }
}

/// e = SHA3-512(pubkey || message || point) mod l.
fn hash_to_scalar(pubkey: &[u8; 32], message: &[u8], point: &CompressedRistretto) -> Scalar {
    let mut sha = Sha3_512::new();
    sha.update(pubkey);
    sha.update(message);
    sha.update(point.as_bytes());
    Scalar::from_bytes_mod_order_wide(&sha.finalize())
}

/// Sign with a fresh random nonce drawn from the caller's RNG (64-byte
/// wide read, reduced; a zero draw fails rather than being resampled).
pub fn sign<R: RngCore + CryptoRng>(
    rng: &mut R,
    private_key: &PrivateKey,
    public_key: &PublicKey,
    message: &[u8],
) -> Result<Signature, SignatureError> {
    let mut wide = [0u8; 64];
    rng.try_fill_bytes(&mut wide).map_err(|_| SignatureError::RngFailure)?;
    let mut k = Scalar::from_bytes_mod_order_wide(&wide);
    wide.zeroize();

    if bool::from(k.is_zero()) {
        return Err(SignatureError::RngFailure);
    }

    let sig = sign_deterministic(private_key, public_key, message, &k);
    k.zeroize();
    Ok(sig)
}

/// Sign with a caller-chosen nonce k. Intended for tests and derived-nonce
/// schemes; reusing k across messages leaks the key.
pub fn sign_deterministic(
    private_key: &PrivateKey,
    public_key: &PublicKey,
    message: &[u8],
    k: &Scalar,
) -> Signature {
    let h = pedersen_h();

    // R = k * H, constant time: k is secret.
    let r = (h * k).compress();

    let e = hash_to_scalar(&public_key.to_bytes(), message, &r);

    // s = sk^-1 * e + k
    let sk_inv = private_key.as_scalar().invert();
    let s = &(&sk_inv * &e) + k;

    Signature { s, e }
}

/// Verify a signature. Verification is on public data and uses the
/// variable-time multiscalar path.
pub fn verify(
    signature: &Signature,
    public_key: &PublicKey,
    message: &[u8],
) -> Result<(), SignatureError> {
    let h = pedersen_h();

    // R = s*H - e*P = s*H + (-e)*P
    let r = RistrettoPoint::vartime_multiscalar_mul(
        &[signature.s, -&signature.e],
        &[*h, *public_key.as_point()],
    );

    let e_prime = hash_to_scalar(&public_key.to_bytes(), message, &r.compress());

    if bool::from(signature.e.ct_eq(&e_prime)) {
        Ok(())
    } else {
        Err(SignatureError::InvalidSignature)
    }
}

/// Verify a batch of signatures.
///
/// The inverted-key formulation fixes R = s*H - e*P per signature before
/// the challenge can be recomputed, so the usual random-linear-combination
/// aggregation does not apply; verification is sequential. The shared H
/// decompression is amortized across the whole process via the cached
/// generator. An empty batch is vacuously valid.
pub fn verify_batch(
    signatures: &[Signature],
    public_keys: &[PublicKey],
    messages: &[&[u8]],
) -> Result<(), SignatureError> {
    if signatures.len() != public_keys.len() || signatures.len() != messages.len() {
        return Err(SignatureError::LengthMismatch);
    }
    for ((sig, pk), msg) in signatures.iter().zip(public_keys.iter()).zip(messages.iter()) {
        verify(sig, pk, msg)?;
    }
    Ok(())
}
