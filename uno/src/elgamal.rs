//! Pedersen commitments, twisted ElGamal ciphertexts, and keys.
//!
//! A commitment to amount v with opening r is C = v*G + r*H. A ciphertext
//! under public key P carries the commitment together with the decrypt
//! handle D = r*P. Because P = sk^-1 * H, the holder of sk can strip the
//! opening term: C - sk*D = v*G.
//!
//! All randomness is caller-injected through `rand_core` traits; the
//! library never touches an entropy source itself. Openings and private
//! keys zeroize on drop.

use core::ops::{Add, Sub};

use rand_core::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use tos_curve25519::{CompressedRistretto, RistrettoPoint, Scalar};

use crate::generators::pedersen_h;
use crate::schnorr::{self, Signature, SignatureError};

pub const RISTRETTO_COMPRESSED_SIZE: usize = 32;
pub const SCALAR_SIZE: usize = 32;
pub const CIPHERTEXT_SIZE: usize = 64;

/// Maximum resampling attempts when a wide reduction lands on zero.
const GENERATE_ATTEMPTS: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecompressionError {
    #[error("invalid point encoding")]
    InvalidPoint,
    #[error("invalid scalar encoding")]
    InvalidScalar,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("private key is zero")]
    ZeroKey,
    #[error("invalid key encoding")]
    InvalidEncoding,
    #[error("randomness source failure")]
    RngFailure,
}

/// Draw a uniform scalar from 64 bytes of caller randomness, retrying the
/// astronomically unlikely zero up to [`GENERATE_ATTEMPTS`] times.
fn random_nonzero_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Scalar, KeyError> {
    for _ in 0..GENERATE_ATTEMPTS {
        let mut wide = [0u8; 64];
        rng.try_fill_bytes(&mut wide).map_err(|_| KeyError::RngFailure)?;
        let scalar = Scalar::from_bytes_mod_order_wide(&wide);
        wide.zeroize();
        if !bool::from(scalar.is_zero()) {
            return Ok(scalar);
        }
    }
    Err(KeyError::RngFailure)
}

/// A Pedersen opening: the blinding scalar r.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PedersenOpening(Scalar);

impl PedersenOpening {
    /// Generate a uniform non-zero opening.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<PedersenOpening, KeyError> {
        random_nonzero_scalar(rng).map(PedersenOpening)
    }

    pub fn from_scalar(scalar: Scalar) -> PedersenOpening {
        PedersenOpening(scalar)
    }

    pub fn as_scalar(&self) -> &Scalar {
        &self.0
    }
}

/// A Pedersen commitment C = v*G + r*H.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PedersenCommitment(RistrettoPoint);

impl PedersenCommitment {
    /// Commit to `amount` with the given opening. Constant time in the
    /// opening.
    pub fn new(amount: u64, opening: &PedersenOpening) -> PedersenCommitment {
        PedersenCommitment::new_with_scalar(&Scalar::from(amount), opening)
    }

    pub fn new_with_scalar(value: &Scalar, opening: &PedersenOpening) -> PedersenCommitment {
        let v_g = RistrettoPoint::mul_base(value);
        let r_h = pedersen_h() * opening.as_scalar();
        PedersenCommitment(&v_g + &r_h)
    }

    pub fn from_point(point: RistrettoPoint) -> PedersenCommitment {
        PedersenCommitment(point)
    }

    pub fn as_point(&self) -> &RistrettoPoint {
        &self.0
    }

    pub fn compress(&self) -> CompressedRistretto {
        self.0.compress()
    }

    pub fn decompress(bytes: &CompressedRistretto) -> Result<PedersenCommitment, DecompressionError> {
        bytes
            .decompress()
            .map(PedersenCommitment)
            .ok_or(DecompressionError::InvalidPoint)
    }
}

/// The ElGamal decrypt handle D = r*P.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecryptHandle(RistrettoPoint);

impl DecryptHandle {
    /// Constant time in the opening.
    pub fn new(public_key: &PublicKey, opening: &PedersenOpening) -> DecryptHandle {
        DecryptHandle(public_key.as_point() * opening.as_scalar())
    }

    pub fn from_point(point: RistrettoPoint) -> DecryptHandle {
        DecryptHandle(point)
    }

    pub fn as_point(&self) -> &RistrettoPoint {
        &self.0
    }

    pub fn compress(&self) -> CompressedRistretto {
        self.0.compress()
    }
}

/// A twisted ElGamal ciphertext: (C, D) = (v*G + r*H, r*P).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    commitment: PedersenCommitment,
    handle: DecryptHandle,
}

/// The 64-byte wire form of a ciphertext: commitment || handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CompressedCiphertext(pub [u8; 64]);

impl Ciphertext {
    pub fn new(commitment: PedersenCommitment, handle: DecryptHandle) -> Ciphertext {
        Ciphertext { commitment, handle }
    }

    pub fn commitment(&self) -> &PedersenCommitment {
        &self.commitment
    }

    pub fn handle(&self) -> &DecryptHandle {
        &self.handle
    }

    pub fn compress(&self) -> CompressedCiphertext {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(self.commitment.compress().as_bytes());
        bytes[32..].copy_from_slice(self.handle.compress().as_bytes());
        CompressedCiphertext(bytes)
    }

    /// Add `amount * G` to the commitment component; the handle is
    /// unchanged (homomorphic add of a public amount).
    pub fn add_amount(&self, amount: u64) -> Ciphertext {
        self.add_scalar(&Scalar::from(amount))
    }

    /// Subtract `amount * G` from the commitment component.
    pub fn sub_amount(&self, amount: u64) -> Ciphertext {
        self.sub_scalar(&Scalar::from(amount))
    }

    /// Add `scalar * G` to the commitment component.
    pub fn add_scalar(&self, scalar: &Scalar) -> Ciphertext {
        Ciphertext {
            commitment: PedersenCommitment(
                self.commitment.as_point() + &RistrettoPoint::mul_base(scalar),
            ),
            handle: self.handle,
        }
    }

    /// Subtract `scalar * G` from the commitment component.
    pub fn sub_scalar(&self, scalar: &Scalar) -> Ciphertext {
        Ciphertext {
            commitment: PedersenCommitment(
                self.commitment.as_point() - &RistrettoPoint::mul_base(scalar),
            ),
            handle: self.handle,
        }
    }

    /// Multiply both components by a scalar (scales the plaintext and the
    /// opening alike).
    pub fn mul_scalar(&self, scalar: &Scalar) -> Ciphertext {
        Ciphertext {
            commitment: PedersenCommitment(self.commitment.as_point() * scalar),
            handle: DecryptHandle(self.handle.as_point() * scalar),
        }
    }
}

impl CompressedCiphertext {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn decompress(&self) -> Result<Ciphertext, DecompressionError> {
        let commitment = CompressedRistretto(self.0[..32].try_into().unwrap())
            .decompress()
            .ok_or(DecompressionError::InvalidPoint)?;
        let handle = CompressedRistretto(self.0[32..].try_into().unwrap())
            .decompress()
            .ok_or(DecompressionError::InvalidPoint)?;
        Ok(Ciphertext {
            commitment: PedersenCommitment(commitment),
            handle: DecryptHandle(handle),
        })
    }
}

impl<'a, 'b> Add<&'b Ciphertext> for &'a Ciphertext {
    type Output = Ciphertext;
    fn add(self, rhs: &'b Ciphertext) -> Ciphertext {
        Ciphertext {
            commitment: PedersenCommitment(self.commitment.as_point() + rhs.commitment.as_point()),
            handle: DecryptHandle(self.handle.as_point() + rhs.handle.as_point()),
        }
    }
}

impl<'a, 'b> Sub<&'b Ciphertext> for &'a Ciphertext {
    type Output = Ciphertext;
    fn sub(self, rhs: &'b Ciphertext) -> Ciphertext {
        Ciphertext {
            commitment: PedersenCommitment(self.commitment.as_point() - rhs.commitment.as_point()),
            handle: DecryptHandle(self.handle.as_point() - rhs.handle.as_point()),
        }
    }
}

impl Add<Ciphertext> for Ciphertext {
    type Output = Ciphertext;
    fn add(self, rhs: Ciphertext) -> Ciphertext {
        &self + &rhs
    }
}

impl Sub<Ciphertext> for Ciphertext {
    type Output = Ciphertext;
    fn sub(self, rhs: Ciphertext) -> Ciphertext {
        &self - &rhs
    }
}

/// A private key: a non-zero canonical scalar. The public key is
/// sk^-1 * H.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(Scalar);

impl PrivateKey {
    pub fn from_scalar(scalar: Scalar) -> Result<PrivateKey, KeyError> {
        if bool::from(scalar.is_zero()) {
            return Err(KeyError::ZeroKey);
        }
        Ok(PrivateKey(scalar))
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Result<PrivateKey, KeyError> {
        let scalar =
            Option::from(Scalar::from_canonical_bytes(bytes)).ok_or(KeyError::InvalidEncoding)?;
        PrivateKey::from_scalar(scalar)
    }

    pub fn as_scalar(&self) -> &Scalar {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// P = sk^-1 * H. Constant time.
    pub fn to_public(&self) -> PublicKey {
        PublicKey(pedersen_h() * &self.0.invert())
    }

    /// Decrypt a ciphertext to the message point v*G = C - sk*D.
    /// Constant time in the key.
    pub fn decrypt_to_point(&self, ciphertext: &Ciphertext) -> RistrettoPoint {
        let shared = ciphertext.handle.as_point() * &self.0;
        ciphertext.commitment.as_point() - &shared
    }
}

/// A public key, held as its decompressed point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(RistrettoPoint);

impl PublicKey {
    pub fn from_point(point: RistrettoPoint) -> PublicKey {
        PublicKey(point)
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Result<PublicKey, DecompressionError> {
        CompressedRistretto(*bytes)
            .decompress()
            .map(PublicKey)
            .ok_or(DecompressionError::InvalidPoint)
    }

    pub fn as_point(&self) -> &RistrettoPoint {
        &self.0
    }

    pub fn compress(&self) -> CompressedRistretto {
        self.0.compress()
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.compress().to_bytes()
    }

    /// Encrypt with a fresh opening; returns the opening for proof
    /// construction.
    pub fn encrypt<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        amount: u64,
    ) -> Result<(Ciphertext, PedersenOpening), KeyError> {
        let opening = PedersenOpening::generate(rng)?;
        let ciphertext = self.encrypt_with_opening(amount, &opening);
        Ok((ciphertext, opening))
    }

    /// Encrypt with a caller-supplied opening.
    pub fn encrypt_with_opening(&self, amount: u64, opening: &PedersenOpening) -> Ciphertext {
        Ciphertext {
            commitment: PedersenCommitment::new(amount, opening),
            handle: DecryptHandle::new(self, opening),
        }
    }
}

/// A private/public key pair.
#[derive(Clone)]
pub struct KeyPair {
    private: PrivateKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generate from caller randomness: wide-reduce 64 bytes, resampling
    /// a zero scalar up to 8 times.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<KeyPair, KeyError> {
        let scalar = random_nonzero_scalar(rng)?;
        let private = PrivateKey(scalar);
        let public = private.to_public();
        Ok(KeyPair { private, public })
    }

    pub fn from_private(private: PrivateKey) -> KeyPair {
        let public = private.to_public();
        KeyPair { private, public }
    }

    pub fn private(&self) -> &PrivateKey {
        &self.private
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    /// Sign with this keypair's Schnorr identity.
    pub fn sign<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        message: &[u8],
    ) -> Result<Signature, SignatureError> {
        schnorr::sign(rng, &self.private, &self.public, message)
    }

    /// Verify a signature against this keypair's public key.
    pub fn verify_signature(
        &self,
        signature: &Signature,
        message: &[u8],
    ) -> Result<(), SignatureError> {
        schnorr::verify(signature, &self.public, message)
    }
}

/// Constant-time equality for compressed ciphertexts.
impl ConstantTimeEq for CompressedCiphertext {
    fn ct_eq(&self, other: &CompressedCiphertext) -> subtle::Choice {
        self.0.ct_eq(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::from_seed([51u8; 32])
    }

    #[test]
    fn public_key_is_inverse_keyed_to_h() {
        let sk = PrivateKey::from_scalar(Scalar::from(7u64)).unwrap();
        let pk = sk.to_public();
        // sk * P == H
        assert_eq!(&(pk.as_point() * sk.as_scalar()), pedersen_h());
    }

    #[test]
    fn zero_private_key_is_rejected() {
        assert!(matches!(
            PrivateKey::from_scalar(Scalar::ZERO),
            Err(KeyError::ZeroKey)
        ));
        // A wide reduction that lands on zero is also a zero key: l
        // reduces to zero.
        let l_bytes: [u8; 32] = {
            let mut b = [0u8; 32];
            b[..16].copy_from_slice(&[
                0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde,
                0xf9, 0xde, 0x14,
            ]);
            b[31] = 0x10;
            b
        };
        assert!(matches!(
            PrivateKey::from_bytes(l_bytes),
            Err(KeyError::InvalidEncoding)
        ));
    }

    #[test]
    fn decrypt_to_point_recovers_amount_times_g() {
        let mut rng = rng();
        let keypair = KeyPair::generate(&mut rng).unwrap();
        let (ct, _opening) = keypair.public().encrypt(&mut rng, 1234).unwrap();

        let expected = RistrettoPoint::mul_base(&Scalar::from(1234u64));
        assert_eq!(keypair.private().decrypt_to_point(&ct), expected);
    }

    #[test]
    fn ciphertext_homomorphism() {
        let mut rng = rng();
        let keypair = KeyPair::generate(&mut rng).unwrap();
        let pk = keypair.public();
        let (ct_a, _) = pk.encrypt(&mut rng, 100).unwrap();
        let (ct_b, _) = pk.encrypt(&mut rng, 42).unwrap();

        let sum = &ct_a + &ct_b;
        let diff = &ct_a - &ct_b;

        let g142 = RistrettoPoint::mul_base(&Scalar::from(142u64));
        let g58 = RistrettoPoint::mul_base(&Scalar::from(58u64));
        assert_eq!(keypair.private().decrypt_to_point(&sum), g142);
        assert_eq!(keypair.private().decrypt_to_point(&diff), g58);
    }

    #[test]
    fn amount_and_scalar_ops_touch_only_the_commitment() {
        let mut rng = rng();
        let keypair = KeyPair::generate(&mut rng).unwrap();
        let (ct, _) = keypair.public().encrypt(&mut rng, 100).unwrap();

        let plus = ct.add_amount(20);
        assert_eq!(plus.handle(), ct.handle());
        assert_eq!(
            keypair.private().decrypt_to_point(&plus),
            RistrettoPoint::mul_base(&Scalar::from(120u64))
        );

        let minus = ct.sub_amount(30);
        assert_eq!(minus.handle(), ct.handle());
        assert_eq!(
            keypair.private().decrypt_to_point(&minus),
            RistrettoPoint::mul_base(&Scalar::from(70u64))
        );

        assert_eq!(ct.add_scalar(&Scalar::from(20u64)), plus);
        assert_eq!(ct.sub_scalar(&Scalar::from(30u64)), minus);
    }

    #[test]
    fn mul_scalar_scales_the_plaintext() {
        let mut rng = rng();
        let keypair = KeyPair::generate(&mut rng).unwrap();
        let (ct, _) = keypair.public().encrypt(&mut rng, 100).unwrap();

        let scaled = ct.mul_scalar(&Scalar::from(3u64));
        assert_eq!(
            keypair.private().decrypt_to_point(&scaled),
            RistrettoPoint::mul_base(&Scalar::from(300u64))
        );
    }

    #[test]
    fn ciphertext_wire_round_trip() {
        let mut rng = rng();
        let keypair = KeyPair::generate(&mut rng).unwrap();
        let (ct, _) = keypair.public().encrypt(&mut rng, 7).unwrap();

        let compressed = ct.compress();
        assert_eq!(compressed.as_bytes().len(), CIPHERTEXT_SIZE);
        let decompressed = compressed.decompress().unwrap();
        assert_eq!(decompressed, ct);

        // A corrupted handle must not decompress... or decodes to a
        // different ciphertext; either way the original is not returned.
        let mut bad = compressed.0;
        bad[40] ^= 0x01;
        match CompressedCiphertext(bad).decompress() {
            Ok(other) => assert_ne!(other, ct),
            Err(e) => assert_eq!(e, DecompressionError::InvalidPoint),
        }
    }

    #[test]
    fn commitments_are_binding_to_amount_and_opening() {
        let mut rng = rng();
        let opening_a = PedersenOpening::generate(&mut rng).unwrap();
        let opening_b = PedersenOpening::generate(&mut rng).unwrap();

        assert_eq!(
            PedersenCommitment::new(5, &opening_a),
            PedersenCommitment::new(5, &opening_a)
        );
        assert_ne!(
            PedersenCommitment::new(5, &opening_a),
            PedersenCommitment::new(6, &opening_a)
        );
        assert_ne!(
            PedersenCommitment::new(5, &opening_a),
            PedersenCommitment::new(5, &opening_b)
        );
    }

    #[test]
    fn keypair_signs_and_verifies() {
        let mut rng = rng();
        let keypair = KeyPair::generate(&mut rng).unwrap();
        let sig = keypair.sign(&mut rng, b"hello uno").unwrap();
        assert!(keypair.verify_signature(&sig, b"hello uno").is_ok());
        assert!(keypair.verify_signature(&sig, b"hello ono").is_err());
    }

    #[test]
    fn private_key_round_trips_through_bytes() {
        let mut rng = rng();
        let keypair = KeyPair::generate(&mut rng).unwrap();
        let bytes = keypair.private().to_bytes();
        let restored = PrivateKey::from_bytes(bytes).unwrap();
        assert_eq!(restored.as_scalar(), keypair.private().as_scalar());
        assert_eq!(restored.to_public(), *keypair.public());
    }
}
