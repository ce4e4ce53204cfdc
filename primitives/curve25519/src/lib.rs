//! # tos-curve25519 — math core of the TOS crypto stack
//!
//! Field arithmetic over F_{2^255-19}, the twisted Edwards curve in
//! extended coordinates, the Ristretto255 prime-order quotient group, the
//! scalar field F_l, and SHA3-256/512. The protocol layer (`tos-uno`)
//! builds Schnorr signatures, ElGamal/Pedersen algebra, and the UNO sigma
//! proofs on top of these types.
//!
//! ## Timing discipline
//!
//! Variable-time routines carry `vartime` in their name and must only see
//! public data. The scalar-multiplication operators (`&P * &n`,
//! [`EdwardsPoint::mul_base`], and their Ristretto counterparts) are
//! constant time and safe for secret scalars, as are the field/scalar
//! conditional primitives.
//!
//! ## Backends
//!
//! The field engine has a compile-time backend seam (see [`field`]); the
//! portable 5x51 backend is canonical and every backend must produce
//! byte-identical serializations. Derived curve constants are materialized
//! lazily from their pinned 32-byte forms; the initializer is idempotent
//! and thread safe.

mod macros;

pub mod constants;
pub mod edwards;
pub mod field;
pub mod ristretto;
pub mod scalar;
pub mod sha3;

pub use edwards::{CompressedEdwardsY, EdwardsPoint};
pub use ristretto::{CompressedRistretto, RistrettoPoint};
pub use scalar::Scalar;
