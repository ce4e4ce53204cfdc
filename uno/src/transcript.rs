//! Fiat-Shamir transcript plumbing.
//!
//! Every proof drives a [`merlin::Transcript`] through this extension
//! trait. The label strings are protocol constants shared with every other
//! TOS implementation and must not change.

use merlin::Transcript;

use tos_curve25519::{CompressedRistretto, Scalar};

use crate::proofs::ProofVerificationError;

/// TOS protocol operations over a Merlin transcript.
pub trait ProtocolTranscript {
    fn shield_commitment_proof_domain_separator(&mut self);
    fn validity_proof_domain_separator(&mut self);
    fn equality_proof_domain_separator(&mut self);
    fn new_commitment_proof_domain_separator(&mut self);
    fn balance_proof_domain_separator(&mut self);
    fn ownership_proof_domain_separator(&mut self);

    /// Append a compressed point.
    fn append_point(&mut self, label: &'static [u8], point: &CompressedRistretto);

    /// Append a compressed point, rejecting the identity encoding. Used
    /// for the prover-supplied sigma commitments: an identity Y would let
    /// a degenerate witness through.
    fn validate_and_append_point(
        &mut self,
        label: &'static [u8],
        point: &CompressedRistretto,
    ) -> Result<(), ProofVerificationError>;

    /// Append a canonical scalar.
    fn append_scalar(&mut self, label: &'static [u8], scalar: &Scalar);

    /// Append an amount as 8 big-endian bytes.
    fn append_amount(&mut self, label: &'static [u8], amount: u64);

    /// Draw a 64-byte challenge and reduce it modulo l.
    fn challenge_scalar(&mut self, label: &'static [u8]) -> Scalar;
}

impl ProtocolTranscript for Transcript {
    fn shield_commitment_proof_domain_separator(&mut self) {
        self.append_message(b"dom-sep", b"shield-commitment-proof");
    }

    fn validity_proof_domain_separator(&mut self) {
        self.append_message(b"dom-sep", b"validity-proof");
    }

    fn equality_proof_domain_separator(&mut self) {
        self.append_message(b"dom-sep", b"equality-proof");
    }

    fn new_commitment_proof_domain_separator(&mut self) {
        self.append_message(b"dom-sep", b"new-commitment-proof");
    }

    fn balance_proof_domain_separator(&mut self) {
        self.append_message(b"dom-sep", b"balance-proof");
    }

    fn ownership_proof_domain_separator(&mut self) {
        self.append_message(b"dom-sep", b"ownership-proof");
    }

    fn append_point(&mut self, label: &'static [u8], point: &CompressedRistretto) {
        self.append_message(label, point.as_bytes());
    }

    fn validate_and_append_point(
        &mut self,
        label: &'static [u8],
        point: &CompressedRistretto,
    ) -> Result<(), ProofVerificationError> {
        if point.as_bytes() == &[0u8; 32] {
            return Err(ProofVerificationError::IdentityPoint);
        }
        self.append_message(label, point.as_bytes());
        Ok(())
    }

    fn append_scalar(&mut self, label: &'static [u8], scalar: &Scalar) {
        self.append_message(label, &scalar.to_bytes());
    }

    fn append_amount(&mut self, label: &'static [u8], amount: u64) {
        self.append_message(label, &amount.to_be_bytes());
    }

    fn challenge_scalar(&mut self, label: &'static [u8]) -> Scalar {
        let mut wide = [0u8; 64];
        self.challenge_bytes(label, &mut wide);
        Scalar::from_bytes_mod_order_wide(&wide)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenges_are_deterministic_and_domain_separated() {
        let mut a = Transcript::new(b"test");
        let mut b = Transcript::new(b"test");
        a.equality_proof_domain_separator();
        b.equality_proof_domain_separator();
        assert_eq!(a.challenge_scalar(b"c"), b.challenge_scalar(b"c"));

        // A different domain separator forks the challenge stream.
        let mut c = Transcript::new(b"test");
        c.validity_proof_domain_separator();
        let mut d = Transcript::new(b"test");
        d.equality_proof_domain_separator();
        assert_ne!(c.challenge_scalar(b"c"), d.challenge_scalar(b"c"));
    }

    #[test]
    fn identity_points_are_rejected() {
        let mut t = Transcript::new(b"test");
        assert!(t
            .validate_and_append_point(b"Y_0", &CompressedRistretto([0u8; 32]))
            .is_err());
        assert!(t
            .validate_and_append_point(
                b"Y_0",
                &CompressedRistretto(crate::generators::PEDERSEN_H_COMPRESSED)
            )
            .is_ok());
    }
}
