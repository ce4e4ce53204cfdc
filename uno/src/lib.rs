//! # tos-uno — the UNO (privacy) protocol layer
//!
//! Schnorr-variant signatures, Pedersen/ElGamal object algebra, and the
//! sigma proofs that TOS confidential transactions are validated with,
//! built on the `tos-curve25519` math core.
//!
//! ## Protocol shape
//!
//! Accounts are keyed to the Pedersen blinding generator H: a private key
//! sk yields the public key P = sk^-1 * H. Balances and transfer amounts
//! live in twisted ElGamal ciphertexts (C, D) = (v*G + r*H, r*P), which
//! are homomorphic componentwise and decryptable to the message point
//! v*G via C - sk*D.
//!
//! Four proof objects cover the transaction kinds:
//!
//! - [`proofs::ShieldCommitmentProof`] — a deposit's commitment and
//!   handle share one opening for the public amount (96 B).
//! - [`proofs::CiphertextValidityProof`] — a transfer ciphertext is well
//!   formed; the T1 variant also binds the sender's handle (128/160 B).
//! - [`proofs::CommitmentEqProof`] — a ciphertext and a Pedersen
//!   commitment hide the same value (192 B).
//! - [`proofs::BalanceProof`] — a ciphertext encrypts a disclosed amount
//!   (8 B big-endian amount + inner equality proof, 200 B).
//!
//! All Fiat-Shamir challenges flow through Merlin transcripts with the
//! fixed label set in [`transcript`]; the byte layouts and the transcript
//! labels are consensus constants.
//!
//! ## Randomness and secrets
//!
//! Nothing here opens an entropy source: key, opening, and nonce
//! generation take a caller-provided `RngCore + CryptoRng`. Private keys,
//! openings, and sigma nonces are zeroized.

pub mod elgamal;
pub mod generators;
pub mod proofs;
pub mod schnorr;
pub mod transcript;


pub use elgamal::{
    Ciphertext, CompressedCiphertext, DecryptHandle, KeyPair, PedersenCommitment,
    PedersenOpening, PrivateKey, PublicKey,
};
pub use schnorr::Signature;
