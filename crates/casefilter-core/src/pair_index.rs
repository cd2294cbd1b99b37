//! Block-pair inverted index for the zero-indel case.
//!
//! Each word splits into five 3-symbol blocks. With at most three
//! substitutions, at least two blocks survive untouched, so the query
//! shares at least one of the C(5,2) = 10 block-pair keys with every
//! matching word. Each pair owns its own key space of 10^6 slots inside
//! one shared table.

use crate::codec;
use crate::csr::{CsrBuilder, CsrTable};
use crate::params::{BLOCK_LEN, PAIR_COUNT, PAIR_KEY_SPACE, WORD_LEN};

/// Block indices of each unordered pair.
pub const PAIR_BLOCKS: [(usize, usize); PAIR_COUNT] = [
    (0, 1),
    (0, 2),
    (0, 3),
    (0, 4),
    (1, 2),
    (1, 3),
    (1, 4),
    (2, 3),
    (2, 4),
    (3, 4),
];

/// Case-A posting table: keyword ids keyed by block-pair slots.
#[derive(Debug)]
pub struct PairIndex {
    table: CsrTable,
}

impl PairIndex {
    /// Slot of `word` under pair `pair`.
    #[must_use]
    pub fn slot(word: &[u8; WORD_LEN], pair: usize) -> u32 {
        let (alpha, beta) = PAIR_BLOCKS[pair];
        let mut key = [0u8; 2 * BLOCK_LEN];
        key[..BLOCK_LEN].copy_from_slice(&word[alpha * BLOCK_LEN..(alpha + 1) * BLOCK_LEN]);
        key[BLOCK_LEN..].copy_from_slice(&word[beta * BLOCK_LEN..(beta + 1) * BLOCK_LEN]);
        codec::pack_key6(&key) + pair as u32 * PAIR_KEY_SPACE
    }

    pub(crate) fn build(words: &[[u8; WORD_LEN]]) -> Self {
        let slot_count = PAIR_KEY_SPACE as usize * PAIR_COUNT;
        let mut builder = CsrBuilder::new(slot_count);
        for word in words {
            for pair in 0..PAIR_COUNT {
                builder.tally(Self::slot(word, pair));
            }
        }
        let mut scatter = builder.seal();
        for (id, word) in words.iter().enumerate() {
            for pair in 0..PAIR_COUNT {
                scatter.place(Self::slot(word, pair), id as u32);
            }
        }
        Self {
            table: scatter.finish(),
        }
    }

    pub(crate) fn from_table(table: CsrTable) -> Self {
        Self { table }
    }

    /// Keyword ids posted under `slot`.
    #[must_use]
    pub fn postings(&self, slot: u32) -> &[u32] {
        self.table.postings(slot)
    }

    #[must_use]
    pub fn posting_len(&self, slot: u32) -> u32 {
        self.table.posting_len(slot)
    }

    pub(crate) fn table(&self) -> &CsrTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_table_is_exhaustive_and_ordered() {
        let mut seen = std::collections::BTreeSet::new();
        for (alpha, beta) in PAIR_BLOCKS {
            assert!(alpha < beta);
            seen.insert((alpha, beta));
        }
        assert_eq!(seen.len(), PAIR_COUNT);
    }

    #[test]
    fn slots_are_namespaced_per_pair() {
        let word = *b"AAAAAAAAAAAAAAA";
        for pair in 0..PAIR_COUNT {
            // The all-A key is 0 in every pair's own space.
            assert_eq!(PairIndex::slot(&word, pair), pair as u32 * PAIR_KEY_SPACE);
        }
    }

    #[test]
    fn every_word_posts_once_per_pair() {
        let words = [*b"ABCDEFGHIJABCDE", *b"JIHGFEDCBAJIHGF", *b"ABCDEFGHIJJJJJJ"];
        let index = PairIndex::build(&words);

        let mut per_id = [0u32; 3];
        for (id, word) in words.iter().enumerate() {
            for pair in 0..PAIR_COUNT {
                let postings = index.postings(PairIndex::slot(word, pair));
                per_id[id] += postings.iter().filter(|&&v| v == id as u32).count() as u32;
            }
        }
        // Words 0 and 2 share blocks 0..=2, so their shared pair slots hold
        // both ids; each id still appears exactly once per pair.
        assert_eq!(per_id, [PAIR_COUNT as u32; 3]);
    }

    #[test]
    fn shared_blocks_share_slots() {
        let words = [*b"ABCDEFGHIJABCDE", *b"ABCDEFGHIJJJJJJ"];
        let index = PairIndex::build(&words);
        // Pair 0 covers blocks 0 and 1, identical across both words.
        let slot = PairIndex::slot(&words[0], 0);
        assert_eq!(slot, PairIndex::slot(&words[1], 0));
        assert_eq!(index.postings(slot), &[0, 1]);
        // Pair 9 covers blocks 3 and 4, which differ.
        let slot_a = PairIndex::slot(&words[0], 9);
        let slot_b = PairIndex::slot(&words[1], 9);
        assert_ne!(slot_a, slot_b);
        assert_eq!(index.postings(slot_a), &[0]);
        assert_eq!(index.postings(slot_b), &[1]);
    }
}
