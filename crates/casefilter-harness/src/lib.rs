//! Verification tooling for the casefilter engine.
//!
//! Intentionally not just tests: the edit-distance oracle and the corpus
//! generators here are reusable from any crate's test suite. The oracle
//! is a banded dynamic program with early cutoff, so capping at the
//! engine's distance threshold keeps differential runs cheap.

use rand::rngs::StdRng;
use rand::Rng;

use casefilter_core::params::WORD_LEN;

/// Alphabet the engine indexes.
pub const ALPHABET: [u8; 10] = *b"ABCDEFGHIJ";

/// Banded Levenshtein distance with early cutoff.
///
/// Exact for distances up to `max_distance`; anything beyond reports
/// `max_distance + 1`.
#[must_use]
pub fn levenshtein_banded(a: &[u8], b: &[u8], max_distance: u32) -> u32 {
    let band = max_distance as usize;
    if a.len().abs_diff(b.len()) > band {
        return max_distance + 1;
    }

    let mut dp: Vec<u32> = (0..=b.len() as u32).collect();
    for i in 1..=a.len() {
        let mut prev = dp[0];
        dp[0] = i as u32;
        let j_start = i.saturating_sub(band).max(1);
        let j_end = (i + band).min(b.len());
        let mut row_min = dp[0];
        for j in j_start..=j_end {
            let stale = dp[j];
            let cost = u32::from(a[i - 1] != b[j - 1]);
            let value = (dp[j] + 1).min(dp[j - 1] + 1).min(prev + cost);
            dp[j] = value;
            prev = stale;
            row_min = row_min.min(value);
        }
        if row_min > max_distance {
            return max_distance + 1;
        }
    }
    dp[b.len()].min(max_distance + 1)
}

/// Symbol-wise Hamming distance of two equal-length words.
#[must_use]
pub fn hamming(a: &[u8], b: &[u8]) -> u32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).filter(|(x, y)| x != y).count() as u32
}

/// The naive answer bit for one query: does any dictionary word sit
/// within `max_distance`?
#[must_use]
pub fn naive_hit(dictionary: &[[u8; WORD_LEN]], query: &[u8], max_distance: u32) -> bool {
    dictionary
        .iter()
        .any(|word| levenshtein_banded(query, word, max_distance) <= max_distance)
}

/// Expected answer bits for a whole query stream.
#[must_use]
pub fn naive_expected(
    dictionary: &[[u8; WORD_LEN]],
    queries: &[Vec<u8>],
    max_distance: u32,
) -> Vec<bool> {
    queries
        .iter()
        .map(|query| naive_hit(dictionary, query, max_distance))
        .collect()
}

/// Uniform random word over the engine alphabet.
pub fn random_word(rng: &mut StdRng) -> [u8; WORD_LEN] {
    let mut word = [0u8; WORD_LEN];
    for symbol in &mut word {
        *symbol = ALPHABET[rng.gen_range(0..ALPHABET.len())];
    }
    word
}

/// Copy of `word` with `count` distinct positions substituted to
/// different symbols.
pub fn with_substitutions(word: &[u8; WORD_LEN], rng: &mut StdRng, count: usize) -> [u8; WORD_LEN] {
    debug_assert!(count <= WORD_LEN);
    let mut out = *word;
    let mut positions: Vec<usize> = (0..WORD_LEN).collect();
    for _ in 0..count {
        let pick = rng.gen_range(0..positions.len());
        let pos = positions.swap_remove(pick);
        let old = out[pos];
        loop {
            let fresh = ALPHABET[rng.gen_range(0..ALPHABET.len())];
            if fresh != old {
                out[pos] = fresh;
                break;
            }
        }
    }
    out
}

/// Copy of `word` with one symbol deleted and a random symbol appended,
/// optionally followed by one substitution anywhere.
///
/// Both resulting edits leave at least one 7-gram half of the deleted
/// form unchanged, which is exactly the class the deletion index
/// guarantees to recover.
pub fn with_aligned_indel(
    word: &[u8; WORD_LEN],
    rng: &mut StdRng,
    substitute: bool,
) -> [u8; WORD_LEN] {
    let pos = rng.gen_range(0..WORD_LEN);
    let mut out = [0u8; WORD_LEN];
    out[..pos].copy_from_slice(&word[..pos]);
    out[pos..WORD_LEN - 1].copy_from_slice(&word[pos + 1..]);
    out[WORD_LEN - 1] = ALPHABET[rng.gen_range(0..ALPHABET.len())];
    if substitute {
        let at = rng.gen_range(0..WORD_LEN);
        let old = out[at];
        loop {
            let fresh = ALPHABET[rng.gen_range(0..ALPHABET.len())];
            if fresh != old {
                out[at] = fresh;
                break;
            }
        }
    }
    out
}
