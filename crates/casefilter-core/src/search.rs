//! Two-phase membership search.
//!
//! Phase A covers substitution-only matches through the block-pair
//! tables; Phase B covers one-insertion-plus-one-deletion matches through
//! the deletion tables. Each candidate is confirmed with an exact SWAR
//! Hamming test, so a `true` answer always witnesses a word within the
//! requested distance.

use crate::codec;
use crate::delete_index;
use crate::hamming;
use crate::index::KeywordIndex;
use crate::pair_index::PairIndex;
use crate::params::{PAIR_COUNT, WORD_LEN};

/// Per-caller search state: the generational visited set.
///
/// The index itself stays immutable during search; all mutation lands
/// here. Give each thread its own context to search one shared index
/// concurrently.
#[derive(Default)]
pub struct SearchContext {
    visited: Vec<u32>,
    generation: u32,
}

impl SearchContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh generation, growing the buffer to cover `keyword_count`
    /// ids. Entries from older generations become logically unvisited
    /// without being touched.
    fn next_generation(&mut self, keyword_count: usize) -> u32 {
        if self.visited.len() < keyword_count {
            self.visited = vec![0; keyword_count];
            self.generation = 0;
        }
        self.bump();
        self.generation
    }

    /// Advance to the next generation within the current buffer.
    fn bump(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.visited.fill(0);
            self.generation = 1;
        }
        self.generation
    }
}

/// Does some keyword lie within edit distance `max_distance` of `query`?
///
/// Queries of the wrong length answer `false` without probing. Symbols
/// outside `A..=J` derive keys outside the dense slot spaces and simply
/// find no postings.
pub fn search(
    index: &KeywordIndex,
    ctx: &mut SearchContext,
    query: &[u8],
    max_distance: u32,
) -> bool {
    let Ok(word) = <&[u8; WORD_LEN]>::try_from(query) else {
        return false;
    };
    let qcode = codec::encode(word);

    let generation = ctx.next_generation(index.len());
    if probe_pairs(index, ctx, word, qcode, max_distance, generation) {
        return true;
    }

    // A separate generation keeps Phase A marks from suppressing Phase B
    // candidates.
    let generation = ctx.bump();
    probe_deletions(index, ctx, word, qcode, max_distance, generation)
}

/// Phase A slots and posting lengths, probed shortest-first.
struct PairProbePlan {
    slots: [u32; PAIR_COUNT],
    lens: [u32; PAIR_COUNT],
    order: [usize; PAIR_COUNT],
}

fn plan_pair_probes(pairs: &PairIndex, word: &[u8; WORD_LEN]) -> PairProbePlan {
    let mut slots = [0u32; PAIR_COUNT];
    let mut lens = [0u32; PAIR_COUNT];
    for pair in 0..PAIR_COUNT {
        slots[pair] = PairIndex::slot(word, pair);
        lens[pair] = pairs.posting_len(slots[pair]);
    }
    let mut order = [0usize; PAIR_COUNT];
    for (i, slot) in order.iter_mut().enumerate() {
        *slot = i;
    }
    // Shortest posting first: highest information per candidate. Ties keep
    // pair order.
    order.sort_unstable_by_key(|&pair| (lens[pair], pair));
    PairProbePlan { slots, lens, order }
}

fn probe_pairs(
    index: &KeywordIndex,
    ctx: &mut SearchContext,
    word: &[u8; WORD_LEN],
    qcode: u64,
    max_distance: u32,
    generation: u32,
) -> bool {
    let plan = plan_pair_probes(index.pair_index(), word);
    for &pair in &plan.order {
        if plan.lens[pair] == 0 {
            continue;
        }
        for &id in index.pair_index().postings(plan.slots[pair]) {
            let mark = &mut ctx.visited[id as usize];
            if *mark == generation {
                continue;
            }
            // The Hamming test is the same for every pair, so one look per
            // id settles it.
            *mark = generation;
            if hamming::hamming_word(qcode, index.code(id)) <= max_distance {
                return true;
            }
        }
    }
    false
}

fn probe_deletions(
    index: &KeywordIndex,
    ctx: &mut SearchContext,
    word: &[u8; WORD_LEN],
    qcode: u64,
    max_distance: u32,
    generation: u32,
) -> bool {
    for pos in 0..WORD_LEN {
        let qdel_code = codec::delete(qcode, pos);
        let (left, right) = delete_index::half_slots(&codec::delete_symbol(word, pos));
        for slot in [left, right] {
            if probe_deletion_slot(index, ctx, slot, qdel_code, max_distance, generation) {
                return true;
            }
        }
    }
    false
}

fn probe_deletion_slot(
    index: &KeywordIndex,
    ctx: &mut SearchContext,
    slot: u32,
    qdel_code: u64,
    max_distance: u32,
    generation: u32,
) -> bool {
    for &entry in index.delete_index().postings(slot) {
        let id = delete_index::posting_id(entry);
        if ctx.visited[id as usize] == generation {
            continue;
        }
        let wdel_code = codec::delete(index.code(id), delete_index::posting_pos(entry));
        // One deletion on each side costs 2; the rest is substitutions.
        if 2 + hamming::hamming_deleted(qdel_code, wdel_code) <= max_distance {
            ctx.visited[id as usize] = generation;
            return true;
        }
        // Keep misses unmarked: a different deletion pairing may still put
        // this keyword within range.
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexBuilder;
    use crate::params::MAX_EDIT_DISTANCE;

    fn build(words: &[&[u8; WORD_LEN]]) -> KeywordIndex {
        let mut builder = IndexBuilder::with_capacity(words.len());
        for word in words {
            builder.insert(word).unwrap();
        }
        builder.finalize()
    }

    #[test]
    fn wrong_length_query_misses_without_probing() {
        let index = build(&[b"AAAAAAAAAAAAAAA"]);
        let mut ctx = SearchContext::new();
        assert!(!search(&index, &mut ctx, b"AAAA", MAX_EDIT_DISTANCE));
        assert!(!search(&index, &mut ctx, b"", MAX_EDIT_DISTANCE));
        assert!(!search(
            &index,
            &mut ctx,
            b"AAAAAAAAAAAAAAAA",
            MAX_EDIT_DISTANCE
        ));
    }

    #[test]
    fn exact_match_hits() {
        let index = build(&[b"ABCDEFGHIJABCDE"]);
        let mut ctx = SearchContext::new();
        assert!(search(&index, &mut ctx, b"ABCDEFGHIJABCDE", MAX_EDIT_DISTANCE));
    }

    #[test]
    fn out_of_alphabet_query_is_total() {
        let index = build(&[b"ABCDEFGHIJABCDE"]);
        let mut ctx = SearchContext::new();
        // 'Z' derives keys outside every dense slot space.
        assert!(!search(&index, &mut ctx, b"ZZZZZZZZZZZZZZZ", MAX_EDIT_DISTANCE));
    }

    #[test]
    fn probe_order_starts_at_a_shortest_posting() {
        // Many words share blocks 0 and 1 with the query; the first probed
        // pair must not be the heavy pair 0.
        let mut builder = IndexBuilder::with_capacity(2048);
        let mut tail = *b"AAAAAAAAA";
        for i in 0..2000u32 {
            // Vary the tail so pairs over blocks 2..=4 stay sparse.
            let mut digits = i;
            for slot in tail.iter_mut() {
                *slot = b'A' + (digits % 10) as u8;
                digits /= 10;
            }
            let mut word = *b"AAAAAAAAAAAAAAA";
            word[6..].copy_from_slice(&tail);
            builder.insert(&word).unwrap();
        }
        let index = builder.finalize();

        let query = *b"AAAAAABBBBBBBBB";
        let plan = plan_pair_probes(index.pair_index(), &query);
        let first = plan.order[0];
        let min_len = *plan.lens.iter().min().unwrap();
        assert_eq!(plan.lens[first], min_len);
        // Pair 0 spans blocks 0 and 1, shared with all 2000 words.
        assert_eq!(plan.lens[0], 2000);
        assert_ne!(first, 0);
    }

    #[test]
    fn probe_order_breaks_ties_by_pair_index() {
        let index = build(&[b"ABCDEFGHIJABCDE"]);
        let plan = plan_pair_probes(index.pair_index(), b"JJJJJJJJJJJJJJJ");
        // All lengths are zero; order must fall back to pair order.
        assert_eq!(plan.order, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn generation_wrap_clears_marks() {
        let index = build(&[b"ABCDEFGHIJABCDE"]);
        let mut ctx = SearchContext::new();
        assert!(search(&index, &mut ctx, b"ABCDEFGHIJABCDE", MAX_EDIT_DISTANCE));
        ctx.generation = u32::MAX - 1;
        assert!(search(&index, &mut ctx, b"ABCDEFGHIJABCDE", MAX_EDIT_DISTANCE));
        assert!(search(&index, &mut ctx, b"ABCDEFGHIJABCDE", MAX_EDIT_DISTANCE));
        assert!(ctx.generation >= 1);
    }

    #[test]
    fn queries_do_not_observe_earlier_marks() {
        let index = build(&[b"ABCDEFGHIJABCDE", b"AAAAAAAAAAAAAAA"]);
        let mut ctx = SearchContext::new();
        let miss = *b"JJJJJJJJJAJJJJJ";
        let results = [
            search(&index, &mut ctx, b"ABCDEFGHIJABCDE", MAX_EDIT_DISTANCE),
            search(&index, &mut ctx, &miss, MAX_EDIT_DISTANCE),
            search(&index, &mut ctx, b"ABCDEFGHIJABCDE", MAX_EDIT_DISTANCE),
        ];
        assert_eq!(results, [true, false, true]);
    }
}
