//! Single-deletion inverted index for the one-indel case.
//!
//! Deleting one symbol from a word leaves 14 symbols, split into a left
//! and a right 7-gram. Each (word, position) posting is recorded under
//! both 7-gram keys as a packed `(id:20 | pos:4)` entry. A query within
//! one insertion plus one deletion (and at most one substitution) of a
//! word shares at least one unchanged half with it, unless the surviving
//! difference straddles the 7/7 split; that residual miss class is an
//! accepted property of the structure, not a defect to patch here.

use crate::codec;
use crate::csr::{CsrBuilder, CsrTable};
use crate::params::{DELETED_LEN, DELETE_KEY_SPACE, WORD_LEN};

/// Symbols in one deletion-key half.
pub const HALF_LEN: usize = DELETED_LEN / 2;

/// Pack a keyword id and deletion position into one posting entry.
#[must_use]
pub const fn pack_posting(id: u32, pos: usize) -> u32 {
    (id & 0xF_FFFF) | ((pos as u32) << 20)
}

/// Keyword id of a packed posting entry.
#[must_use]
pub const fn posting_id(entry: u32) -> u32 {
    entry & 0xF_FFFF
}

/// Deletion position of a packed posting entry.
#[must_use]
pub const fn posting_pos(entry: u32) -> usize {
    ((entry >> 20) & 0xF) as usize
}

/// Left and right 7-gram slots of a 14-symbol deleted word.
#[must_use]
pub fn half_slots(deleted: &[u8; DELETED_LEN]) -> (u32, u32) {
    (
        codec::pack_key7(&deleted[..HALF_LEN]),
        codec::pack_key7(&deleted[HALF_LEN..]),
    )
}

/// Case-B posting table: packed (id, position) entries keyed by 7-gram
/// slots over one key space of 10^7.
#[derive(Debug)]
pub struct DeleteIndex {
    table: CsrTable,
}

impl DeleteIndex {
    pub(crate) fn build(words: &[[u8; WORD_LEN]]) -> Self {
        let mut builder = CsrBuilder::new(DELETE_KEY_SPACE as usize);
        for word in words {
            for pos in 0..WORD_LEN {
                let (left, right) = half_slots(&codec::delete_symbol(word, pos));
                builder.tally(left);
                builder.tally(right);
            }
        }
        let mut scatter = builder.seal();
        for (id, word) in words.iter().enumerate() {
            for pos in 0..WORD_LEN {
                let (left, right) = half_slots(&codec::delete_symbol(word, pos));
                let entry = pack_posting(id as u32, pos);
                scatter.place(left, entry);
                scatter.place(right, entry);
            }
        }
        Self {
            table: scatter.finish(),
        }
    }

    pub(crate) fn from_table(table: CsrTable) -> Self {
        Self { table }
    }

    /// Packed posting entries under `slot`.
    #[must_use]
    pub fn postings(&self, slot: u32) -> &[u32] {
        self.table.postings(slot)
    }

    pub(crate) fn table(&self) -> &CsrTable {
        &self.table
    }
}
