//! Keyword ingestion and the finalized index.
//!
//! [`IndexBuilder`] collects words; [`IndexBuilder::finalize`] consumes it
//! and materializes both posting structures. The finalized [`KeywordIndex`]
//! is immutable, so inserting after finalization is unrepresentable.

use tracing::debug;

use casefilter_error::{CaseFilterError, Result};

use crate::codec;
use crate::delete_index::DeleteIndex;
use crate::pair_index::PairIndex;
use crate::params::{INITIAL_CAPACITY, MAX_KEYWORDS, WORD_LEN};

/// Collecting-state index: accepts inserts, nothing else.
pub struct IndexBuilder {
    words: Vec<[u8; WORD_LEN]>,
    codes: Vec<u64>,
}

impl IndexBuilder {
    /// Create a builder with room for `capacity` keywords (floored at the
    /// default initial capacity).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(INITIAL_CAPACITY);
        Self {
            words: Vec::with_capacity(capacity),
            codes: Vec::with_capacity(capacity),
        }
    }

    /// Append a keyword, assigning the next dense id.
    ///
    /// Ids are 20-bit on the wire, so the dictionary caps at 2^20 words.
    pub fn insert(&mut self, word: &[u8; WORD_LEN]) -> Result<u32> {
        if self.words.len() >= MAX_KEYWORDS {
            return Err(CaseFilterError::DictionaryFull { max: MAX_KEYWORDS });
        }
        let id = self.words.len() as u32;
        self.words.push(*word);
        self.codes.push(codec::encode(word));
        Ok(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Build both posting structures and freeze the index.
    #[must_use]
    pub fn finalize(self) -> KeywordIndex {
        let pairs = PairIndex::build(&self.words);
        let deletes = DeleteIndex::build(&self.words);
        debug!(
            keywords = self.words.len(),
            pair_postings = pairs.table().payload().len(),
            delete_postings = deletes.table().payload().len(),
            "finalized keyword index"
        );
        KeywordIndex {
            words: self.words,
            codes: self.codes,
            pairs,
            deletes,
        }
    }
}

/// Finalized, immutable index over a keyword dictionary.
#[derive(Debug)]
pub struct KeywordIndex {
    words: Vec<[u8; WORD_LEN]>,
    codes: Vec<u64>,
    pairs: PairIndex,
    deletes: DeleteIndex,
}

impl KeywordIndex {
    pub(crate) fn from_parts(
        words: Vec<[u8; WORD_LEN]>,
        pairs: PairIndex,
        deletes: DeleteIndex,
    ) -> Self {
        let codes = words.iter().map(codec::encode).collect();
        Self {
            words,
            codes,
            pairs,
            deletes,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Raw symbols of keyword `id`.
    #[must_use]
    pub fn word(&self, id: u32) -> &[u8; WORD_LEN] {
        &self.words[id as usize]
    }

    /// Nibble code of keyword `id`.
    #[must_use]
    pub fn code(&self, id: u32) -> u64 {
        self.codes[id as usize]
    }

    #[must_use]
    pub fn pair_index(&self) -> &PairIndex {
        &self.pairs
    }

    #[must_use]
    pub fn delete_index(&self) -> &DeleteIndex {
        &self.deletes
    }

    pub(crate) fn words(&self) -> &[[u8; WORD_LEN]] {
        &self.words
    }
}
