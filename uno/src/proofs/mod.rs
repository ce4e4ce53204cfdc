//! Zero-knowledge proofs for UNO (privacy) transactions.
//!
//! Each proof is a Fiat-Shamir sigma protocol over a caller-provided
//! Merlin transcript. The caller owns the transcript framing: anything the
//! proof must be bound to (public keys, ciphertexts, context) has to be
//! appended before `new`/`verify` are called, with the single exception of
//! [`BalanceProof::verify`] which seeds its own transcript.
//!
//! Provers mirror every verifier transcript operation, so a transcript
//! that chains several proofs stays synchronized between the two sides.

mod commitment_eq;
mod shield;
mod validity;

pub use commitment_eq::{BalanceProof, CommitmentEqProof, BALANCE_PROOF_SIZE, COMMITMENT_EQ_PROOF_SIZE};
pub use shield::{ShieldCommitmentProof, SHIELD_COMMITMENT_PROOF_SIZE};
pub use validity::{
    CiphertextValidityProof, CIPHERTEXT_VALIDITY_PROOF_T0_SIZE, CIPHERTEXT_VALIDITY_PROOF_T1_SIZE,
};

use thiserror::Error;

use crate::elgamal::DecompressionError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProofVerificationError {
    #[error("invalid point encoding in proof")]
    InvalidPoint,
    #[error("invalid scalar encoding in proof")]
    InvalidScalar,
    #[error("malformed proof layout")]
    Format,
    #[error("transcript rejected an identity point")]
    IdentityPoint,
    #[error("shield commitment proof equation failed")]
    ShieldCommitmentProof,
    #[error("ciphertext validity proof equation failed")]
    CiphertextValidityProof,
    #[error("commitment equality proof equation failed")]
    CommitmentEqProof,
}

impl From<DecompressionError> for ProofVerificationError {
    fn from(err: DecompressionError) -> ProofVerificationError {
        match err {
            DecompressionError::InvalidPoint => ProofVerificationError::InvalidPoint,
            DecompressionError::InvalidScalar => ProofVerificationError::InvalidScalar,
        }
    }
}
