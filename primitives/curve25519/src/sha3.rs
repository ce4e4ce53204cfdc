//! SHA3-256 and SHA3-512 over the Keccak-f[1600] permutation.
//!
//! SHA3-256 hashes TOS transactions; SHA3-512 feeds the Schnorr-variant
//! challenge derivation. Both expose a streaming `new`/`update`/`finalize`
//! lifecycle and a one-shot convenience function.
//!
//! Padding is the NIST SHA3 domain-separated form (`0x06 … 0x80`), not raw
//! Keccak (`0x01 … 0x80`); digests are not interoperable with pre-FIPS
//! Keccak peers.

const KECCAK_ROUNDS: usize = 24;

const ROUND_CONSTANTS: [u64; KECCAK_ROUNDS] = [
    0x0000000000000001,
    0x0000000000008082,
    0x800000000000808a,
    0x8000000080008000,
    0x000000000000808b,
    0x0000000080000001,
    0x8000000080008081,
    0x8000000000008009,
    0x000000000000008a,
    0x0000000000000088,
    0x0000000080008009,
    0x000000008000000a,
    0x000000008000808b,
    0x800000000000008b,
    0x8000000000008089,
    0x8000000000008003,
    0x8000000000008002,
    0x8000000000000080,
    0x000000000000800a,
    0x800000008000000a,
    0x8000000080008081,
    0x8000000000008080,
    0x0000000080000001,
    0x8000000080008008,
];

/// Rotation offsets for the ρ step, indexed by lane (x + 5*y).
const RHO: [u32; 25] = [
    0, 1, 62, 28, 27, 36, 44, 6, 55, 20, 3, 10, 43, 25, 39, 41, 45, 15, 21, 8, 18, 2, 61, 56, 14,
];

/// Lane source indices for the π step: lane i of the new state is lane
/// `PI_SOURCE[i]` of the ρ output.
const PI_SOURCE: [usize; 25] = [
    0, 6, 12, 18, 24, 3, 9, 10, 16, 22, 1, 7, 13, 19, 20, 4, 5, 11, 17, 23, 2, 8, 14, 15, 21,
];

/// Keccak-f[1600]: 24 rounds of θ, ρ, π, χ, ι over 25 64-bit lanes.
fn keccak_f1600(state: &mut [u64; 25]) {
    for rc in ROUND_CONSTANTS.iter() {
        // θ: column parities, each column XORed with parity of the column
        // to its left and the rotated parity of the column to its right.
        let mut parity = [0u64; 5];
        for x in 0..5 {
            parity[x] =
                state[x] ^ state[x + 5] ^ state[x + 10] ^ state[x + 15] ^ state[x + 20];
        }
        for x in 0..5 {
            let d = parity[(x + 4) % 5] ^ parity[(x + 1) % 5].rotate_left(1);
            for y in 0..5 {
                state[x + 5 * y] ^= d;
            }
        }

        // ρ and π combined: rotate each lane, then shuffle.
        let mut b = [0u64; 25];
        for i in 0..25 {
            b[i] = state[PI_SOURCE[i]].rotate_left(RHO[PI_SOURCE[i]]);
        }

        // χ: row-wise non-linear step.
        for y in 0..5 {
            let row = [b[5 * y], b[5 * y + 1], b[5 * y + 2], b[5 * y + 3], b[5 * y + 4]];
            for x in 0..5 {
                state[x + 5 * y] = row[x] ^ (!row[(x + 1) % 5] & row[(x + 2) % 5]);
            }
        }

        // ι
        state[0] ^= rc;
    }
}

/// Sponge core shared by both digest widths. `RATE` is in bytes.
#[derive(Clone)]
struct Sponge<const RATE: usize> {
    state: [u64; 25],
    /// Byte offset of the next absorb position, always < RATE.
    offset: usize,
}

impl<const RATE: usize> Sponge<RATE> {
    fn new() -> Self {
        Sponge { state: [0u64; 25], offset: 0 }
    }

    fn absorb(&mut self, data: &[u8]) {
        let mut offset = self.offset;
        for &byte in data {
            self.state[offset / 8] ^= (byte as u64) << (8 * (offset % 8));
            offset += 1;
            if offset == RATE {
                keccak_f1600(&mut self.state);
                offset = 0;
            }
        }
        self.offset = offset;
    }

    /// Apply SHA3 padding and squeeze the leading `n` output bytes.
    fn finalize_into(mut self, out: &mut [u8]) {
        self.state[self.offset / 8] ^= 0x06u64 << (8 * (self.offset % 8));
        self.state[(RATE - 1) / 8] ^= 0x80u64 << (8 * ((RATE - 1) % 8));
        keccak_f1600(&mut self.state);

        for (i, byte) in out.iter_mut().enumerate() {
            *byte = (self.state[i / 8] >> (8 * (i % 8))) as u8;
        }
    }
}

/// Streaming SHA3-256 (rate 136, 32-byte digest).
#[derive(Clone)]
pub struct Sha3_256 {
    sponge: Sponge<136>,
}

impl Sha3_256 {
    pub fn new() -> Self {
        Sha3_256 { sponge: Sponge::new() }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.sponge.absorb(data);
    }

    pub fn finalize(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        self.sponge.finalize_into(&mut out);
        out
    }
}

impl Default for Sha3_256 {
    fn default() -> Self {
        Self::new()
    }
}

/// Streaming SHA3-512 (rate 72, 64-byte digest).
#[derive(Clone)]
pub struct Sha3_512 {
    sponge: Sponge<72>,
}

impl Sha3_512 {
    pub fn new() -> Self {
        Sha3_512 { sponge: Sponge::new() }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.sponge.absorb(data);
    }

    pub fn finalize(self) -> [u8; 64] {
        let mut out = [0u8; 64];
        self.sponge.finalize_into(&mut out);
        out
    }
}

impl Default for Sha3_512 {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot SHA3-256.
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    let mut sha = Sha3_256::new();
    sha.update(data);
    sha.finalize()
}

/// One-shot SHA3-512.
pub fn sha3_512(data: &[u8]) -> [u8; 64] {
    let mut sha = Sha3_512::new();
    sha.update(data);
    sha.finalize()
}
