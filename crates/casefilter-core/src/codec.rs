//! Nibble packing of keywords and base-10 packing of probe keys.
//!
//! A 15-symbol word over `A..J` packs into a 64-bit code with symbol `i`
//! occupying bits `[4i, 4i+4)`:
//!
//! ```text
//! bit      60      56                    8       4       0
//!          | w[14] | w[13] |    ...    | w[2] | w[1] | w[0] |
//! ```
//!
//! Only bits `[0, 60)` carry data; a 14-symbol code (one symbol deleted)
//! uses bits `[0, 56)`. Symbols are reduced to their low nibble, so any
//! byte is accepted; only `A..=J` produce meaningful probe keys.

use crate::params::{DELETED_LEN, WORD_LEN};

/// Pack a word into its nibble code.
pub fn encode(word: &[u8; WORD_LEN]) -> u64 {
    let mut code = 0u64;
    for (i, &symbol) in word.iter().enumerate() {
        code |= (u64::from(symbol.wrapping_sub(b'A')) & 0xF) << (i * 4);
    }
    code
}

/// Unpack a nibble code back into its word. Inverse of [`encode`] for
/// words over `A..=J` (and more generally `A..=P`).
pub fn decode(code: u64) -> [u8; WORD_LEN] {
    let mut word = [0u8; WORD_LEN];
    for (i, symbol) in word.iter_mut().enumerate() {
        *symbol = b'A' + ((code >> (i * 4)) & 0xF) as u8;
    }
    word
}

/// Excise nibble `pos` from a code, shifting the upper nibbles down.
///
/// `delete(encode(w), p)` equals the code of `w` with symbol `p` removed,
/// read as a 14-nibble code.
pub const fn delete(code: u64, pos: usize) -> u64 {
    let low_mask = if pos == 0 {
        0
    } else {
        (1u64 << (pos * 4)) - 1
    };
    (code & low_mask) | ((code >> ((pos + 1) * 4)) << (pos * 4))
}

/// Base-10 value of a 6-symbol pair key, least-significant digit first.
pub fn pack_key6(key: &[u8]) -> u32 {
    debug_assert_eq!(key.len(), 6);
    base10(key)
}

/// Base-10 value of a 7-symbol deletion key, least-significant digit first.
pub fn pack_key7(key: &[u8]) -> u32 {
    debug_assert_eq!(key.len(), 7);
    base10(key)
}

/// Each symbol contributes its low nibble as one decimal digit. `A..=J`
/// map to `0..=9`; out-of-alphabet symbols yield digits above 9 and land
/// outside the dense key space.
fn base10(symbols: &[u8]) -> u32 {
    let mut value = 0u32;
    let mut scale = 1u32;
    for &symbol in symbols {
        value += (u32::from(symbol.wrapping_sub(b'A')) & 0xF) * scale;
        scale = scale.wrapping_mul(10);
    }
    value
}

/// Copy of `word` with symbol `pos` removed.
pub fn delete_symbol(word: &[u8; WORD_LEN], pos: usize) -> [u8; DELETED_LEN] {
    let mut out = [0u8; DELETED_LEN];
    out[..pos].copy_from_slice(&word[..pos]);
    out[pos..].copy_from_slice(&word[pos + 1..]);
    out
}
