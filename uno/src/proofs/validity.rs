//! Proof that a transfer ciphertext is correctly formed.

#![allow(non_snake_case)]

use merlin::Transcript;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use tos_curve25519::{CompressedRistretto, RistrettoPoint, Scalar};

use crate::elgamal::{DecryptHandle, PedersenCommitment, PedersenOpening, PublicKey};
use crate::generators::{pedersen_h, ristretto_g};
use crate::proofs::ProofVerificationError;
use crate::transcript::ProtocolTranscript;

pub const CIPHERTEXT_VALIDITY_PROOF_T0_SIZE: usize = 128;
pub const CIPHERTEXT_VALIDITY_PROOF_T1_SIZE: usize = 160;

/// Proof that C = x*G + r*H and D_receiver = r*P_receiver, with an
/// optional third equation D_sender = r*P_sender binding the sender's
/// handle (the T1 transfer format carries handles for both parties).
///
/// Wire format: Y_0 || Y_1 [|| Y_2] || z_r || z_x
/// (128 bytes for T0, 160 bytes for T1).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CiphertextValidityProof {
    Y_0: CompressedRistretto,
    Y_1: CompressedRistretto,
    Y_2: Option<CompressedRistretto>,
    z_r: Scalar,
    z_x: Scalar,
}

impl CiphertextValidityProof {
    /// Prove validity of a ciphertext encrypting `amount` with `opening`.
    /// Pass `sender_pubkey` to produce the dual-handle (T1) variant.
    pub fn new<R: RngCore + CryptoRng>(
        rng: &mut R,
        amount: u64,
        opening: &PedersenOpening,
        receiver_pubkey: &PublicKey,
        sender_pubkey: Option<&PublicKey>,
        transcript: &mut Transcript,
    ) -> Result<CiphertextValidityProof, ProofVerificationError> {
        transcript.validity_proof_domain_separator();

        let mut wide = [0u8; 64];
        rng.fill_bytes(&mut wide);
        let mut y_r = Scalar::from_bytes_mod_order_wide(&wide);
        rng.fill_bytes(&mut wide);
        let mut y_x = Scalar::from_bytes_mod_order_wide(&wide);
        wide.zeroize();

        let Y_0 = (&RistrettoPoint::mul_base(&y_x) + &(pedersen_h() * &y_r)).compress();
        let Y_1 = (receiver_pubkey.as_point() * &y_r).compress();
        let Y_2 = sender_pubkey.map(|pk| (pk.as_point() * &y_r).compress());

        transcript.validate_and_append_point(b"Y_0", &Y_0)?;
        transcript.validate_and_append_point(b"Y_1", &Y_1)?;
        if let Some(ref Y_2) = Y_2 {
            transcript.validate_and_append_point(b"Y_2", Y_2)?;
        }

        let c = transcript.challenge_scalar(b"c");

        let x = Scalar::from(amount);
        let z_r = &y_r + &(&c * opening.as_scalar());
        let z_x = &y_x + &(&c * &x);

        transcript.challenge_scalar(b"w");

        y_r.zeroize();
        y_x.zeroize();

        Ok(CiphertextValidityProof { Y_0, Y_1, Y_2, z_r, z_x })
    }

    /// True when this is the dual-handle (T1) variant.
    pub fn has_sender_binding(&self) -> bool {
        self.Y_2.is_some()
    }

    /// Verify:
    ///
    ///   z_x*G + z_r*H          == Y_0 + c*C
    ///   z_r*P_receiver         == Y_1 + c*D_receiver
    ///   z_r*P_sender (T1 only) == Y_2 + c*D_sender
    pub fn verify(
        &self,
        commitment: &PedersenCommitment,
        receiver_handle: &DecryptHandle,
        receiver_pubkey: &PublicKey,
        sender_handle: Option<&DecryptHandle>,
        sender_pubkey: Option<&PublicKey>,
        transcript: &mut Transcript,
    ) -> Result<(), ProofVerificationError> {
        transcript.validity_proof_domain_separator();
        transcript.validate_and_append_point(b"Y_0", &self.Y_0)?;
        transcript.validate_and_append_point(b"Y_1", &self.Y_1)?;
        if let Some(ref Y_2) = self.Y_2 {
            transcript.validate_and_append_point(b"Y_2", Y_2)?;
        }

        let c = transcript.challenge_scalar(b"c");
        transcript.challenge_scalar(b"w");

        let Y_0 = self
            .Y_0
            .decompress()
            .ok_or(ProofVerificationError::InvalidPoint)?;
        let Y_1 = self
            .Y_1
            .decompress()
            .ok_or(ProofVerificationError::InvalidPoint)?;

        // z_x*G + z_r*H == Y_0 + c*C
        let lhs = &ristretto_g().mul_vartime(&self.z_x) + &pedersen_h().mul_vartime(&self.z_r);
        let rhs = &Y_0 + &commitment.as_point().mul_vartime(&c);
        if lhs != rhs {
            return Err(ProofVerificationError::CiphertextValidityProof);
        }

        // z_r*P_receiver == Y_1 + c*D_receiver
        let lhs = receiver_pubkey.as_point().mul_vartime(&self.z_r);
        let rhs = &Y_1 + &receiver_handle.as_point().mul_vartime(&c);
        if lhs != rhs {
            return Err(ProofVerificationError::CiphertextValidityProof);
        }

        // T1: z_r*P_sender == Y_2 + c*D_sender
        if let Some(ref Y_2) = self.Y_2 {
            let (sender_handle, sender_pubkey) = match (sender_handle, sender_pubkey) {
                (Some(h), Some(p)) => (h, p),
                _ => return Err(ProofVerificationError::Format),
            };
            let Y_2 = Y_2
                .decompress()
                .ok_or(ProofVerificationError::InvalidPoint)?;
            let lhs = sender_pubkey.as_point().mul_vartime(&self.z_r);
            let rhs = &Y_2 + &sender_handle.as_point().mul_vartime(&c);
            if lhs != rhs {
                return Err(ProofVerificationError::CiphertextValidityProof);
            }
        }

        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(if self.Y_2.is_some() {
            CIPHERTEXT_VALIDITY_PROOF_T1_SIZE
        } else {
            CIPHERTEXT_VALIDITY_PROOF_T0_SIZE
        });
        out.extend_from_slice(self.Y_0.as_bytes());
        out.extend_from_slice(self.Y_1.as_bytes());
        if let Some(ref Y_2) = self.Y_2 {
            out.extend_from_slice(Y_2.as_bytes());
        }
        out.extend_from_slice(&self.z_r.to_bytes());
        out.extend_from_slice(&self.z_x.to_bytes());
        out
    }

    /// Parse the wire form; `dual_handle` selects the 160-byte T1 layout.
    pub fn from_bytes(
        bytes: &[u8],
        dual_handle: bool,
    ) -> Result<CiphertextValidityProof, ProofVerificationError> {
        let expected = if dual_handle {
            CIPHERTEXT_VALIDITY_PROOF_T1_SIZE
        } else {
            CIPHERTEXT_VALIDITY_PROOF_T0_SIZE
        };
        if bytes.len() != expected {
            return Err(ProofVerificationError::Format);
        }

        let Y_0 = CompressedRistretto(bytes[..32].try_into().unwrap());
        let Y_1 = CompressedRistretto(bytes[32..64].try_into().unwrap());
        let mut offset = 64;
        let Y_2 = if dual_handle {
            offset += 32;
            Some(CompressedRistretto(bytes[64..96].try_into().unwrap()))
        } else {
            None
        };

        let z_r = Option::from(Scalar::from_canonical_bytes(
            bytes[offset..offset + 32].try_into().unwrap(),
        ))
        .ok_or(ProofVerificationError::InvalidScalar)?;
        let z_x = Option::from(Scalar::from_canonical_bytes(
            bytes[offset + 32..offset + 64].try_into().unwrap(),
        ))
        .ok_or(ProofVerificationError::InvalidScalar)?;

        Ok(CiphertextValidityProof { Y_0, Y_1, Y_2, z_r, z_x })
    }
}
