//! Arithmetic in the base field F_p, p = 2^255 - 19.
//!
//! Most operations take a variable amount of time depending on inputs and
//! must not see secret data. Constant-time operations are explicit:
//! `conditional_select`, `conditional_swap`, `conditional_negate`, `ct_eq`,
//! and everything built only from limb arithmetic (add/sub/mul/square).
//!
//! The backend is selected at compile time. `serial` is the canonical
//! portable layout (5 limbs, radix 2^51); a SIMD backend packing several
//! elements per vector register slots in as a sibling module behind the
//! same API, and must produce byte-identical `to_bytes` results.

mod serial;

pub use serial::FieldElement;

/// Batched multiplication: two independent products.
///
/// Semantically the tensor product of independent `mul` calls; a SIMD
/// backend is free to pack the lanes into one vector operation.
#[inline]
pub fn mul2(
    a1: &FieldElement,
    b1: &FieldElement,
    a2: &FieldElement,
    b2: &FieldElement,
) -> (FieldElement, FieldElement) {
    (a1 * b1, a2 * b2)
}

/// Batched multiplication: three independent products.
#[inline]
pub fn mul3(
    a1: &FieldElement,
    b1: &FieldElement,
    a2: &FieldElement,
    b2: &FieldElement,
    a3: &FieldElement,
    b3: &FieldElement,
) -> (FieldElement, FieldElement, FieldElement) {
    (a1 * b1, a2 * b2, a3 * b3)
}

/// Batched multiplication: four independent products.
#[inline]
pub fn mul4(
    a1: &FieldElement,
    b1: &FieldElement,
    a2: &FieldElement,
    b2: &FieldElement,
    a3: &FieldElement,
    b3: &FieldElement,
    a4: &FieldElement,
    b4: &FieldElement,
) -> (FieldElement, FieldElement, FieldElement, FieldElement) {
    (a1 * b1, a2 * b2, a3 * b3, a4 * b4)
}

/// Batched squaring: two independent squares.
#[inline]
pub fn sqr2(a1: &FieldElement, a2: &FieldElement) -> (FieldElement, FieldElement) {
    (a1.square(), a2.square())
}

/// Batched squaring: three independent squares.
#[inline]
pub fn sqr3(
    a1: &FieldElement,
    a2: &FieldElement,
    a3: &FieldElement,
) -> (FieldElement, FieldElement, FieldElement) {
    (a1.square(), a2.square(), a3.square())
}

/// Batched squaring: four independent squares.
#[inline]
pub fn sqr4(
    a1: &FieldElement,
    a2: &FieldElement,
    a3: &FieldElement,
    a4: &FieldElement,
) -> (FieldElement, FieldElement, FieldElement, FieldElement) {
    (a1.square(), a2.square(), a3.square(), a4.square())
}
