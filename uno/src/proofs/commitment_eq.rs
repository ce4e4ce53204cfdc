//! Equality of a ciphertext's hidden value and a Pedersen commitment,
//! plus the balance proof built on top of it.

#![allow(non_snake_case)]

use merlin::Transcript;
use rand_core::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use tos_curve25519::{CompressedRistretto, RistrettoPoint, Scalar};

use crate::elgamal::{Ciphertext, KeyPair, PedersenCommitment, PedersenOpening, PublicKey};
use crate::generators::{pedersen_h, ristretto_g};
use crate::proofs::ProofVerificationError;
use crate::transcript::ProtocolTranscript;

pub const COMMITMENT_EQ_PROOF_SIZE: usize = 192;
pub const BALANCE_PROOF_SIZE: usize = 8 + COMMITMENT_EQ_PROOF_SIZE;

/// Proof that the value hidden in an ElGamal ciphertext (C_src, D_src)
/// under public key P equals the value committed in a Pedersen commitment
/// C_dest, by a prover who knows the private key, the value, and the
/// destination opening.
///
/// The three underlying sigma equations
///
///   z_s*P              == c*H      + Y_0        (key knowledge)
///   z_x*G + z_s*D_src  == c*C_src  + Y_1        (source value)
///   z_x*G + z_r*H      == c*C_dest + Y_2        (destination value)
///
/// are combined by the verifier into one 11-term multiscalar equation
/// using the Fiat-Shamir randomizer w.
///
/// Wire format (192 bytes): Y_0 || Y_1 || Y_2 || z_s || z_x || z_r.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitmentEqProof {
    Y_0: CompressedRistretto,
    Y_1: CompressedRistretto,
    Y_2: CompressedRistretto,
    z_s: Scalar,
    z_x: Scalar,
    z_r: Scalar,
}

impl CommitmentEqProof {
    /// Prove for `amount` committed with `opening` in the destination
    /// commitment. The caller must have bound the public inputs to the
    /// transcript beforehand.
    pub fn new<R: RngCore + CryptoRng>(
        rng: &mut R,
        source_keypair: &KeyPair,
        source_ciphertext: &Ciphertext,
        amount: &Scalar,
        opening: &PedersenOpening,
        transcript: &mut Transcript,
    ) -> Result<CommitmentEqProof, ProofVerificationError> {
        transcript.equality_proof_domain_separator();

        let P_source = source_keypair.public().as_point();
        let D_source = source_ciphertext.handle().as_point();
        let s = source_keypair.private().as_scalar();
        let r = opening.as_scalar();

        // Random masking factors, also serving as nonces.
        let mut wide = [0u8; 64];
        rng.fill_bytes(&mut wide);
        let mut y_s = Scalar::from_bytes_mod_order_wide(&wide);
        rng.fill_bytes(&mut wide);
        let mut y_x = Scalar::from_bytes_mod_order_wide(&wide);
        rng.fill_bytes(&mut wide);
        let mut y_r = Scalar::from_bytes_mod_order_wide(&wide);
        wide.zeroize();

        let Y_0 = (P_source * &y_s).compress();
        let Y_1 = (&RistrettoPoint::mul_base(&y_x) + &(D_source * &y_s)).compress();
        let Y_2 = (&RistrettoPoint::mul_base(&y_x) + &(pedersen_h() * &y_r)).compress();

        transcript.validate_and_append_point(b"Y_0", &Y_0)?;
        transcript.validate_and_append_point(b"Y_1", &Y_1)?;
        transcript.validate_and_append_point(b"Y_2", &Y_2)?;

        let c = transcript.challenge_scalar(b"c");

        let z_s = &(&c * s) + &y_s;
        let z_x = &(&c * amount) + &y_x;
        let z_r = &(&c * r) + &y_r;

        // The verifier folds the responses into the transcript before
        // drawing w; mirror it so chained proofs stay aligned.
        transcript.append_scalar(b"z_s", &z_s);
        transcript.append_scalar(b"z_x", &z_x);
        transcript.append_scalar(b"z_r", &z_r);
        transcript.challenge_scalar(b"w");

        y_s.zeroize();
        y_x.zeroize();
        y_r.zeroize();

        Ok(CommitmentEqProof { Y_0, Y_1, Y_2, z_s, z_x, z_r })
    }

    /// Verify against the source public key, source ciphertext, and
    /// destination commitment.
    pub fn verify(
        &self,
        source_pubkey: &PublicKey,
        source_ciphertext: &Ciphertext,
        destination_commitment: &PedersenCommitment,
        transcript: &mut Transcript,
    ) -> Result<(), ProofVerificationError> {
        transcript.equality_proof_domain_separator();

        transcript.validate_and_append_point(b"Y_0", &self.Y_0)?;
        transcript.validate_and_append_point(b"Y_1", &self.Y_1)?;
        transcript.validate_and_append_point(b"Y_2", &self.Y_2)?;

        let c = transcript.challenge_scalar(b"c");

        transcript.append_scalar(b"z_s", &self.z_s);
        transcript.append_scalar(b"z_x", &self.z_x);
        transcript.append_scalar(b"z_r", &self.z_r);

        let w = transcript.challenge_scalar(b"w");
        let ww = &w * &w;

        let Y_0 = self
            .Y_0
            .decompress()
            .ok_or(ProofVerificationError::InvalidPoint)?;
        let Y_1 = self
            .Y_1
            .decompress()
            .ok_or(ProofVerificationError::InvalidPoint)?;
        let Y_2 = self
            .Y_2
            .decompress()
            .ok_or(ProofVerificationError::InvalidPoint)?;

        let minus_one = -&Scalar::ONE;
        let w_negated = -&w;
        let ww_negated = -&ww;

        // eq0 + w*eq1 + ww*eq2 == identity, in one multiscalar pass.
        let check = RistrettoPoint::vartime_multiscalar_mul(
            &[
                self.z_s,          // P_source
                -&c,               // H
                minus_one,         // Y_0
                &w * &self.z_x,    // G
                &w * &self.z_s,    // D_source
                &w_negated * &c,   // C_source
                w_negated,         // Y_1
                &ww * &self.z_x,   // G
                &ww * &self.z_r,   // H
                &ww_negated * &c,  // C_destination
                ww_negated,        // Y_2
            ],
            &[
                *source_pubkey.as_point(),
                *pedersen_h(),
                Y_0,
                *ristretto_g(),
                *source_ciphertext.handle().as_point(),
                *source_ciphertext.commitment().as_point(),
                Y_1,
                *ristretto_g(),
                *pedersen_h(),
                *destination_commitment.as_point(),
                Y_2,
            ],
        );

        if bool::from(check.ct_eq(&RistrettoPoint::identity())) {
            Ok(())
        } else {
            Err(ProofVerificationError::CommitmentEqProof)
        }
    }

    pub fn to_bytes(&self) -> [u8; COMMITMENT_EQ_PROOF_SIZE] {
        let mut out = [0u8; COMMITMENT_EQ_PROOF_SIZE];
        out[..32].copy_from_slice(self.Y_0.as_bytes());
        out[32..64].copy_from_slice(self.Y_1.as_bytes());
        out[64..96].copy_from_slice(self.Y_2.as_bytes());
        out[96..128].copy_from_slice(&self.z_s.to_bytes());
        out[128..160].copy_from_slice(&self.z_x.to_bytes());
        out[160..].copy_from_slice(&self.z_r.to_bytes());
        out
    }

    /// Parse the 192-byte wire form; all three response scalars must be
    /// canonical.
    pub fn from_bytes(bytes: &[u8]) -> Result<CommitmentEqProof, ProofVerificationError> {
        if bytes.len() != COMMITMENT_EQ_PROOF_SIZE {
            return Err(ProofVerificationError::Format);
        }
        let scalar_at = |offset: usize| -> Result<Scalar, ProofVerificationError> {
            Option::from(Scalar::from_canonical_bytes(
                bytes[offset..offset + 32].try_into().unwrap(),
            ))
            .ok_or(ProofVerificationError::InvalidScalar)
        };
        Ok(CommitmentEqProof {
            Y_0: CompressedRistretto(bytes[..32].try_into().unwrap()),
            Y_1: CompressedRistretto(bytes[32..64].try_into().unwrap()),
            Y_2: CompressedRistretto(bytes[64..96].try_into().unwrap()),
            z_s: scalar_at(96)?,
            z_x: scalar_at(128)?,
            z_r: scalar_at(160)?,
        })
    }
}

/// Proof that a ciphertext under `public_key` encrypts exactly the
/// disclosed `amount`: the ciphertext minus a reference encryption of the
/// amount (opening 1) must hide zero, which the inner equality proof
/// checks against the fixed commitment 0*G + 1*H.
///
/// Wire format (200 bytes): amount as 8 big-endian bytes, then the inner
/// [`CommitmentEqProof`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceProof {
    amount: u64,
    commitment_eq_proof: CommitmentEqProof,
}

impl BalanceProof {
    /// Prove that `source_ciphertext` encrypts `amount` under the
    /// keypair's public key.
    pub fn new<R: RngCore + CryptoRng>(
        rng: &mut R,
        source_keypair: &KeyPair,
        amount: u64,
        source_ciphertext: &Ciphertext,
    ) -> Result<BalanceProof, ProofVerificationError> {
        let mut transcript = Transcript::new(b"balance_proof");
        BalanceProof::new_with_transcript(rng, source_keypair, amount, source_ciphertext, &mut transcript)
    }

    /// Prover twin of [`BalanceProof::pre_verify`]: the caller provides
    /// the transcript (already framed with any outer context).
    pub fn new_with_transcript<R: RngCore + CryptoRng>(
        rng: &mut R,
        source_keypair: &KeyPair,
        amount: u64,
        source_ciphertext: &Ciphertext,
        transcript: &mut Transcript,
    ) -> Result<BalanceProof, ProofVerificationError> {
        let opening_one = PedersenOpening::from_scalar(Scalar::ONE);

        // source - Enc(amount, opening 1) hides zero iff the claim holds.
        let amount_ciphertext = source_keypair
            .public()
            .encrypt_with_opening(amount, &opening_one);
        let zeroed = source_ciphertext - &amount_ciphertext;

        transcript.balance_proof_domain_separator();
        transcript.append_amount(b"amount", amount);
        transcript.append_message(b"source_ct", source_ciphertext.compress().as_bytes());

        let commitment_eq_proof = CommitmentEqProof::new(
            rng,
            source_keypair,
            &zeroed,
            &Scalar::ZERO,
            &opening_one,
            transcript,
        )?;

        Ok(BalanceProof { amount, commitment_eq_proof })
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Verify with the proof's own transcript seeding.
    pub fn verify(
        &self,
        public_key: &PublicKey,
        source_ciphertext: &Ciphertext,
    ) -> Result<(), ProofVerificationError> {
        let mut transcript = Transcript::new(b"balance_proof");
        self.pre_verify(public_key, source_ciphertext, &mut transcript)
    }

    /// Verify against a caller-provided transcript.
    pub fn pre_verify(
        &self,
        public_key: &PublicKey,
        source_ciphertext: &Ciphertext,
        transcript: &mut Transcript,
    ) -> Result<(), ProofVerificationError> {
        let opening_one = PedersenOpening::from_scalar(Scalar::ONE);

        let amount_ciphertext = public_key.encrypt_with_opening(self.amount, &opening_one);
        let zeroed = source_ciphertext - &amount_ciphertext;
        let destination_commitment = PedersenCommitment::new(0, &opening_one);

        transcript.balance_proof_domain_separator();
        transcript.append_amount(b"amount", self.amount);
        transcript.append_message(b"source_ct", source_ciphertext.compress().as_bytes());

        self.commitment_eq_proof.verify(
            public_key,
            &zeroed,
            &destination_commitment,
            transcript,
        )
    }

    pub fn to_bytes(&self) -> [u8; BALANCE_PROOF_SIZE] {
        let mut out = [0u8; BALANCE_PROOF_SIZE];
        out[..8].copy_from_slice(&self.amount.to_be_bytes());
        out[8..].copy_from_slice(&self.commitment_eq_proof.to_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<BalanceProof, ProofVerificationError> {
        if bytes.len() != BALANCE_PROOF_SIZE {
            return Err(ProofVerificationError::Format);
        }
        let amount = u64::from_be_bytes(bytes[..8].try_into().unwrap());
        let commitment_eq_proof = CommitmentEqProof::from_bytes(&bytes[8..])?;
        Ok(BalanceProof { amount, commitment_eq_proof })
    }
}
