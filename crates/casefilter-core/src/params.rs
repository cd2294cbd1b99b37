//! Compile-time parameters of the keyword index.

/// Number of symbols in every keyword and query.
pub const WORD_LEN: usize = 15;
/// Stored keyword record size: the word plus a NUL terminator.
pub const WORD_RECORD_LEN: usize = WORD_LEN + 1;
/// Length of a word after one symbol is deleted.
pub const DELETED_LEN: usize = WORD_LEN - 1;
/// Maximum edit distance the engine answers for.
pub const MAX_EDIT_DISTANCE: u32 = 3;

/// Words split into this many 3-symbol blocks for the pair index.
pub const BLOCK_COUNT: usize = 5;
/// Symbols per block.
pub const BLOCK_LEN: usize = 3;
/// Number of unordered block pairs, C(5, 2).
pub const PAIR_COUNT: usize = 10;
/// Key space of one 6-symbol pair key.
pub const PAIR_KEY_SPACE: u32 = 1_000_000;
/// Key space of a 7-symbol deletion key.
pub const DELETE_KEY_SPACE: u32 = 10_000_000;

/// Keyword ids are 20-bit on the wire.
pub const MAX_KEYWORDS: usize = 1 << 20;
/// Builder capacity floor.
pub const INITIAL_CAPACITY: usize = 1024;
