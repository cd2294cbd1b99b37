//! On-disk index format.
//!
//! Little-endian throughout, regardless of host. Layout, in order:
//!
//! ```text
//! keyword_count   u32
//! words           keyword_count x 16 bytes (15 symbols + NUL)
//! pair block:
//!   key_space     u32  (1_000_000)
//!   pair_count    u32  (10)
//!   count_width   u8   (16 iff every count fits u16, else 32)
//!   counts        key_space*pair_count entries of count_width/8 bytes
//!   payload_total u32
//!   payload       payload_total x 3 bytes, keyword id
//! deletion block:
//!   key_space     u32  (10_000_000)
//!   count_width   u8
//!   counts        key_space entries
//!   payload_total u32
//!   payload       payload_total x 3 bytes, (id:20 | del_pos:4)
//! ```
//!
//! Offsets are not stored; the reader rebuilds them by prefix-summing the
//! counts, and the stored payload total must agree with that sum. Nibble
//! codes are not stored; they are recomputed from the raw words.

use std::io::{Read, Write};

use tracing::debug;

use casefilter_error::{CaseFilterError, Result};

use crate::csr::CsrTable;
use crate::delete_index::{self, DeleteIndex};
use crate::index::KeywordIndex;
use crate::pair_index::PairIndex;
use crate::params::{
    DELETE_KEY_SPACE, MAX_KEYWORDS, PAIR_COUNT, PAIR_KEY_SPACE, WORD_LEN, WORD_RECORD_LEN,
};

/// Payload entries are 3 bytes on disk.
const TRIPLE_LEN: usize = 3;
/// Triples converted per chunk while streaming payload sections.
const TRIPLE_CHUNK: usize = 8192;

/// Write the index in the on-disk format.
///
/// The sink sees many small writes; hand in something buffered.
pub fn serialize<W: Write>(index: &KeywordIndex, out: &mut W) -> Result<()> {
    write_u32(out, index.len() as u32)?;
    for word in index.words() {
        let mut record = [0u8; WORD_RECORD_LEN];
        record[..WORD_LEN].copy_from_slice(word);
        out.write_all(&record)?;
    }

    write_u32(out, PAIR_KEY_SPACE)?;
    write_u32(out, PAIR_COUNT as u32)?;
    write_posting_table(out, index.pair_index().table())?;

    write_u32(out, DELETE_KEY_SPACE)?;
    write_posting_table(out, index.delete_index().table())?;

    debug!(
        keywords = index.len(),
        pair_width = count_width(index.pair_index().table()),
        delete_width = count_width(index.delete_index().table()),
        "serialized keyword index"
    );
    Ok(())
}

/// Read an index back from the on-disk format.
pub fn deserialize<R: Read>(input: &mut R) -> Result<KeywordIndex> {
    let keyword_count = read_u32(input, "keyword count")? as usize;
    if keyword_count > MAX_KEYWORDS {
        return Err(CaseFilterError::corrupt(format!(
            "keyword count {keyword_count} exceeds the {MAX_KEYWORDS} id limit"
        )));
    }

    let mut words = Vec::with_capacity(keyword_count);
    let mut record = [0u8; WORD_RECORD_LEN];
    for _ in 0..keyword_count {
        read_exact(input, &mut record, "keyword records")?;
        let mut word = [0u8; WORD_LEN];
        word.copy_from_slice(&record[..WORD_LEN]);
        words.push(word);
    }

    let key_space = read_u32(input, "pair key space")?;
    if key_space != PAIR_KEY_SPACE {
        return Err(CaseFilterError::corrupt(format!(
            "pair key space {key_space} (expected {PAIR_KEY_SPACE})"
        )));
    }
    let pair_count = read_u32(input, "pair count")?;
    if pair_count != PAIR_COUNT as u32 {
        return Err(CaseFilterError::corrupt(format!(
            "pair count {pair_count} (expected {PAIR_COUNT})"
        )));
    }
    let pair_table = read_posting_table(input, PAIR_KEY_SPACE as usize * PAIR_COUNT, "pair")?;
    for &id in pair_table.payload() {
        if id as usize >= keyword_count {
            return Err(CaseFilterError::corrupt(format!(
                "pair posting id {id} out of range (keyword count {keyword_count})"
            )));
        }
    }

    let key_space = read_u32(input, "deletion key space")?;
    if key_space != DELETE_KEY_SPACE {
        return Err(CaseFilterError::corrupt(format!(
            "deletion key space {key_space} (expected {DELETE_KEY_SPACE})"
        )));
    }
    let delete_table = read_posting_table(input, DELETE_KEY_SPACE as usize, "deletion")?;
    for &entry in delete_table.payload() {
        let id = delete_index::posting_id(entry);
        let pos = delete_index::posting_pos(entry);
        if id as usize >= keyword_count || pos >= WORD_LEN {
            return Err(CaseFilterError::corrupt(format!(
                "deletion posting (id {id}, pos {pos}) out of range"
            )));
        }
    }

    debug!(keywords = keyword_count, "loaded keyword index");
    Ok(KeywordIndex::from_parts(
        words,
        PairIndex::from_table(pair_table),
        DeleteIndex::from_table(delete_table),
    ))
}

fn count_width(table: &CsrTable) -> u8 {
    if table.max_count() <= u32::from(u16::MAX) {
        16
    } else {
        32
    }
}

fn write_posting_table<W: Write>(out: &mut W, table: &CsrTable) -> Result<()> {
    let width = count_width(table);
    out.write_all(&[width])?;
    if width == 16 {
        for &count in table.counts() {
            out.write_all(&(count as u16).to_le_bytes())?;
        }
    } else {
        for &count in table.counts() {
            out.write_all(&count.to_le_bytes())?;
        }
    }

    write_u32(out, table.payload().len() as u32)?;
    for &value in table.payload() {
        out.write_all(&value.to_le_bytes()[..TRIPLE_LEN])?;
    }
    Ok(())
}

fn read_posting_table<R: Read>(
    input: &mut R,
    slot_count: usize,
    section: &'static str,
) -> Result<CsrTable> {
    let width = read_u8(input, section)?;
    let entry_len = match width {
        16 => 2,
        32 => 4,
        other => return Err(CaseFilterError::UnsupportedCountWidth { width: other }),
    };

    let mut raw = vec![0u8; slot_count * entry_len];
    read_exact(input, &mut raw, section)?;
    let counts: Vec<u32> = if entry_len == 2 {
        raw.chunks_exact(2)
            .map(|pair| u32::from(u16::from_le_bytes([pair[0], pair[1]])))
            .collect()
    } else {
        raw.chunks_exact(4)
            .map(|quad| u32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]]))
            .collect()
    };
    drop(raw);

    let payload_total = read_u32(input, section)? as usize;
    let mut payload = Vec::with_capacity(payload_total);
    let mut chunk = [0u8; TRIPLE_CHUNK * TRIPLE_LEN];
    let mut remaining = payload_total;
    while remaining > 0 {
        let take = remaining.min(TRIPLE_CHUNK);
        let buf = &mut chunk[..take * TRIPLE_LEN];
        read_exact(input, buf, section)?;
        payload.extend(
            buf.chunks_exact(TRIPLE_LEN)
                .map(|t| u32::from_le_bytes([t[0], t[1], t[2], 0])),
        );
        remaining -= take;
    }

    CsrTable::from_counts(counts, payload)
}

fn write_u32<W: Write>(out: &mut W, value: u32) -> Result<()> {
    out.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_u8<R: Read>(input: &mut R, section: &'static str) -> Result<u8> {
    let mut buf = [0u8; 1];
    read_exact(input, &mut buf, section)?;
    Ok(buf[0])
}

fn read_u32<R: Read>(input: &mut R, section: &'static str) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact(input, &mut buf, section)?;
    Ok(u32::from_le_bytes(buf))
}

/// Fill `buf` completely, reporting how far a truncated stream got.
fn read_exact<R: Read>(input: &mut R, buf: &mut [u8], section: &'static str) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(CaseFilterError::ShortRead {
                    section,
                    expected: buf.len(),
                    actual: filled,
                });
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => {}
            Err(err) => return Err(CaseFilterError::Io(err)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use super::*;
    use crate::index::IndexBuilder;

    /// One shared index per process; the posting tables dominate the cost
    /// of every build.
    fn small_index() -> &'static KeywordIndex {
        static INDEX: OnceLock<KeywordIndex> = OnceLock::new();
        INDEX.get_or_init(|| {
            let mut builder = IndexBuilder::with_capacity(4);
            builder.insert(b"ABCDEFGHIJABCDE").unwrap();
            builder.insert(b"AAAAAAAAAAAAAAA").unwrap();
            builder.insert(b"JIHGFEDCBAJIHGF").unwrap();
            builder.finalize()
        })
    }

    #[test]
    fn round_trip_preserves_everything_observable() {
        let index = small_index();
        let mut bytes = Vec::new();
        serialize(index, &mut bytes).unwrap();

        let loaded = deserialize(&mut bytes.as_slice()).unwrap();
        assert_eq!(loaded.len(), index.len());
        for id in 0..index.len() as u32 {
            assert_eq!(loaded.word(id), index.word(id));
            assert_eq!(loaded.code(id), index.code(id));
        }
        assert_eq!(
            loaded.pair_index().table().counts(),
            index.pair_index().table().counts()
        );
        assert_eq!(
            loaded.pair_index().table().payload(),
            index.pair_index().table().payload()
        );
        assert_eq!(
            loaded.delete_index().table().counts(),
            index.delete_index().table().counts()
        );
        assert_eq!(
            loaded.delete_index().table().payload(),
            index.delete_index().table().payload()
        );
    }

    #[test]
    fn header_fields_are_little_endian() {
        let index = small_index();
        let mut bytes = Vec::new();
        serialize(index, &mut bytes).unwrap();

        assert_eq!(&bytes[..4], &3u32.to_le_bytes());
        // Three 16-byte records follow, then the pair block header.
        let pair_header = 4 + 3 * WORD_RECORD_LEN;
        assert_eq!(
            &bytes[pair_header..pair_header + 4],
            &PAIR_KEY_SPACE.to_le_bytes()
        );
        assert_eq!(
            &bytes[pair_header + 4..pair_header + 8],
            &(PAIR_COUNT as u32).to_le_bytes()
        );
        // Small dictionary, so the narrow count form is chosen.
        assert_eq!(bytes[pair_header + 8], 16);
    }

    #[test]
    fn truncated_stream_is_rejected() {
        let index = small_index();
        let mut bytes = Vec::new();
        serialize(index, &mut bytes).unwrap();

        for cut in [2, 20, bytes.len() / 2, bytes.len() - 1] {
            let err = deserialize(&mut &bytes[..cut]).unwrap_err();
            assert!(err.is_format_error(), "cut at {cut}: {err}");
        }
    }

    #[test]
    fn total_mismatch_is_rejected() {
        let index = small_index();
        let mut bytes = Vec::new();
        serialize(index, &mut bytes).unwrap();

        // Corrupt the pair payload total (right after the counts section).
        let total_at = 4 + 3 * WORD_RECORD_LEN + 4 + 4 + 1 + 2 * PAIR_KEY_SPACE as usize * PAIR_COUNT;
        bytes[total_at] ^= 1;
        let err = deserialize(&mut bytes.as_slice()).unwrap_err();
        assert!(err.is_format_error(), "{err}");
    }

    #[test]
    fn bad_count_width_is_rejected() {
        let index = small_index();
        let mut bytes = Vec::new();
        serialize(index, &mut bytes).unwrap();

        let width_at = 4 + 3 * WORD_RECORD_LEN + 8;
        bytes[width_at] = 8;
        let err = deserialize(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            CaseFilterError::UnsupportedCountWidth { width: 8 }
        ));
    }

    #[test]
    fn out_of_range_posting_id_is_rejected() {
        let index = small_index();
        let mut bytes = Vec::new();
        serialize(index, &mut bytes).unwrap();

        // First pair payload triple sits right after the stored total.
        let payload_at =
            4 + 3 * WORD_RECORD_LEN + 4 + 4 + 1 + 2 * PAIR_KEY_SPACE as usize * PAIR_COUNT + 4;
        bytes[payload_at] = 0xFF;
        bytes[payload_at + 1] = 0xFF;
        bytes[payload_at + 2] = 0x0F;
        let err = deserialize(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(err, CaseFilterError::IndexCorrupt { .. }), "{err}");
    }
}
