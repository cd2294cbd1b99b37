//! SWAR Hamming distance over nibble-packed words.

use crate::params::{DELETED_LEN, WORD_LEN};

/// Bit 0 of every nibble in a 64-bit word.
const NIBBLE_LSB: u64 = 0x1111_1111_1111_1111;

/// Hamming distance between two nibble codes covering the low `nibbles`
/// groups.
///
/// The XOR of the codes is non-zero exactly in differing nibbles; ORing
/// each group onto its own low bit and masking leaves one set bit per
/// differing position, which popcount totals.
pub const fn hamming_nibbles(a: u64, b: u64, nibbles: u32) -> u32 {
    debug_assert!(nibbles >= 1 && nibbles <= 16);
    let mut x = a ^ b;
    x |= x >> 1;
    x |= x >> 2;
    x &= NIBBLE_LSB >> ((16 - nibbles) * 4);
    x.count_ones()
}

/// Hamming distance between two full 15-symbol codes.
pub const fn hamming_word(a: u64, b: u64) -> u32 {
    hamming_nibbles(a, b, WORD_LEN as u32)
}

/// Hamming distance between two 14-symbol codes (one symbol deleted).
pub const fn hamming_deleted(a: u64, b: u64) -> u32 {
    hamming_nibbles(a, b, DELETED_LEN as u32)
}
