//! Proof of a well-formed shield (deposit) ciphertext.

#![allow(non_snake_case)]

use merlin::Transcript;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use tos_curve25519::{CompressedRistretto, RistrettoPoint, Scalar};

use crate::elgamal::{DecryptHandle, PedersenCommitment, PedersenOpening, PublicKey};
use crate::generators::pedersen_h;
use crate::proofs::ProofVerificationError;
use crate::transcript::ProtocolTranscript;

pub const SHIELD_COMMITMENT_PROOF_SIZE: usize = 96;

/// Proof of knowledge of r such that C - amount*G = r*H and D = r*P, i.e.
/// that a shield's commitment and handle share the same opening for the
/// claimed public amount.
///
/// Wire format (96 bytes): Y_H || Y_P || z.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShieldCommitmentProof {
    Y_H: CompressedRistretto,
    Y_P: CompressedRistretto,
    z: Scalar,
}

impl ShieldCommitmentProof {
    /// Prove knowledge of `opening` for a shield to `receiver_pubkey`.
    pub fn new<R: RngCore + CryptoRng>(
        rng: &mut R,
        opening: &PedersenOpening,
        receiver_pubkey: &PublicKey,
        transcript: &mut Transcript,
    ) -> Result<ShieldCommitmentProof, ProofVerificationError> {
        transcript.shield_commitment_proof_domain_separator();

        let mut wide = [0u8; 64];
        rng.fill_bytes(&mut wide);
        let mut k = Scalar::from_bytes_mod_order_wide(&wide);
        wide.zeroize();

        let Y_H = (pedersen_h() * &k).compress();
        let Y_P = (receiver_pubkey.as_point() * &k).compress();

        transcript.validate_and_append_point(b"Y_H", &Y_H)?;
        transcript.validate_and_append_point(b"Y_P", &Y_P)?;

        let c = transcript.challenge_scalar(b"c");
        let z = &k + &(&c * opening.as_scalar());

        // Finalization challenge; the value is discarded but the draw
        // keeps chained transcripts in sync with the verifier.
        transcript.challenge_scalar(b"w");

        k.zeroize();

        Ok(ShieldCommitmentProof { Y_H, Y_P, z })
    }

    /// Verify against the shield's commitment, receiver handle, receiver
    /// public key, and public amount:
    ///
    ///   z*H == Y_H + c*(C - amount*G)
    ///   z*P == Y_P + c*D
    pub fn verify(
        &self,
        commitment: &PedersenCommitment,
        receiver_handle: &DecryptHandle,
        receiver_pubkey: &PublicKey,
        amount: u64,
        transcript: &mut Transcript,
    ) -> Result<(), ProofVerificationError> {
        transcript.shield_commitment_proof_domain_separator();
        transcript.validate_and_append_point(b"Y_H", &self.Y_H)?;
        transcript.validate_and_append_point(b"Y_P", &self.Y_P)?;

        let c = transcript.challenge_scalar(b"c");
        transcript.challenge_scalar(b"w");

        let Y_H = self
            .Y_H
            .decompress()
            .ok_or(ProofVerificationError::InvalidPoint)?;
        let Y_P = self
            .Y_P
            .decompress()
            .ok_or(ProofVerificationError::InvalidPoint)?;

        // C - amount*G is the r*H the prover committed to.
        let amount_g = RistrettoPoint::mul_base(&Scalar::from(amount));
        let r_h = commitment.as_point() - &amount_g;

        let lhs_h = pedersen_h().mul_vartime(&self.z);
        let rhs_h = &Y_H + &r_h.mul_vartime(&c);
        if lhs_h != rhs_h {
            return Err(ProofVerificationError::ShieldCommitmentProof);
        }

        let lhs_p = receiver_pubkey.as_point().mul_vartime(&self.z);
        let rhs_p = &Y_P + &receiver_handle.as_point().mul_vartime(&c);
        if lhs_p != rhs_p {
            return Err(ProofVerificationError::ShieldCommitmentProof);
        }

        Ok(())
    }

    pub fn to_bytes(&self) -> [u8; SHIELD_COMMITMENT_PROOF_SIZE] {
        let mut out = [0u8; SHIELD_COMMITMENT_PROOF_SIZE];
        out[..32].copy_from_slice(self.Y_H.as_bytes());
        out[32..64].copy_from_slice(self.Y_P.as_bytes());
        out[64..].copy_from_slice(&self.z.to_bytes());
        out
    }

    /// Parse the 96-byte wire form; the response scalar must be canonical.
    pub fn from_bytes(bytes: &[u8]) -> Result<ShieldCommitmentProof, ProofVerificationError> {
        if bytes.len() != SHIELD_COMMITMENT_PROOF_SIZE {
            return Err(ProofVerificationError::Format);
        }
        let Y_H = CompressedRistretto(bytes[..32].try_into().unwrap());
        let Y_P = CompressedRistretto(bytes[32..64].try_into().unwrap());
        let z = Option::from(Scalar::from_canonical_bytes(bytes[64..].try_into().unwrap()))
            .ok_or(ProofVerificationError::InvalidScalar)?;
        Ok(ShieldCommitmentProof { Y_H, Y_P, z })
    }
}
