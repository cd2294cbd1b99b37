//! Compressed-sparse-row posting storage.
//!
//! A table keyed by a dense slot id: `offsets[slot..=slot + 1]` delimits a
//! contiguous run in one shared payload array. Construction is two-pass:
//! tally per-slot counts, prefix-sum them into offsets, then scatter the
//! same record stream through a cursor copy of the offsets. The cursor
//! lives only inside [`CsrScatter`] and is dropped at [`CsrScatter::finish`].
//!
//! `counts` is retained after the build; the serializer needs it to choose
//! between the 16- and 32-bit stored forms.

use casefilter_error::{CaseFilterError, Result};

/// First construction stage: per-slot tallies.
pub struct CsrBuilder {
    counts: Vec<u32>,
}

impl CsrBuilder {
    pub fn new(slot_count: usize) -> Self {
        Self {
            counts: vec![0; slot_count],
        }
    }

    /// Record one future posting for `slot`.
    pub fn tally(&mut self, slot: u32) {
        self.counts[slot as usize] += 1;
    }

    /// Freeze the counts and move to the scatter stage.
    pub fn seal(self) -> CsrScatter {
        let offsets = prefix_sum(&self.counts);
        let total = offsets[self.counts.len()] as usize;
        let cursor = offsets[..self.counts.len()].to_vec();
        CsrScatter {
            offsets,
            counts: self.counts,
            payload: vec![0; total],
            cursor,
        }
    }
}

/// Second construction stage: payload placement.
///
/// The record stream must repeat the tally stream exactly; each `place`
/// advances that slot's cursor by one.
pub struct CsrScatter {
    offsets: Vec<u32>,
    counts: Vec<u32>,
    payload: Vec<u32>,
    cursor: Vec<u32>,
}

impl CsrScatter {
    pub fn place(&mut self, slot: u32, value: u32) {
        let at = self.cursor[slot as usize];
        self.payload[at as usize] = value;
        self.cursor[slot as usize] = at + 1;
    }

    pub fn finish(self) -> CsrTable {
        debug_assert!(
            self.cursor
                .iter()
                .zip(&self.offsets[1..])
                .all(|(cur, end)| cur == end),
            "scatter stream did not match tally stream"
        );
        CsrTable {
            offsets: self.offsets,
            counts: self.counts,
            payload: self.payload,
        }
    }
}

/// Immutable posting table.
#[derive(Debug)]
pub struct CsrTable {
    /// `slot_count + 1` entries; the final one equals the payload length.
    offsets: Vec<u32>,
    counts: Vec<u32>,
    payload: Vec<u32>,
}

impl CsrTable {
    /// Rebuild a table from stored counts and payload, recomputing offsets
    /// by prefix sum. Fails if the counts overflow 32 bits or their sum
    /// disagrees with the payload length.
    pub fn from_counts(counts: Vec<u32>, payload: Vec<u32>) -> Result<Self> {
        let mut total = 0u64;
        for &count in &counts {
            total += u64::from(count);
            if total > u64::from(u32::MAX) {
                return Err(CaseFilterError::corrupt("posting counts overflow u32"));
            }
        }
        if total != payload.len() as u64 {
            return Err(CaseFilterError::CountMismatch {
                stored: payload.len() as u64,
                computed: total,
            });
        }
        Ok(Self {
            offsets: prefix_sum(&counts),
            counts,
            payload,
        })
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.counts.len()
    }

    /// Postings recorded under `slot`. Slots outside the key space have no
    /// postings; this keeps probes with out-of-alphabet keys total.
    #[must_use]
    pub fn postings(&self, slot: u32) -> &[u32] {
        let slot = slot as usize;
        match (self.offsets.get(slot), self.offsets.get(slot + 1)) {
            (Some(&begin), Some(&end)) => &self.payload[begin as usize..end as usize],
            _ => &[],
        }
    }

    /// Number of postings under `slot` without touching the payload.
    #[must_use]
    pub fn posting_len(&self, slot: u32) -> u32 {
        let slot = slot as usize;
        match (self.offsets.get(slot), self.offsets.get(slot + 1)) {
            (Some(&begin), Some(&end)) => end - begin,
            _ => 0,
        }
    }

    #[must_use]
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    #[must_use]
    pub fn payload(&self) -> &[u32] {
        &self.payload
    }

    #[must_use]
    pub fn max_count(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

fn prefix_sum(counts: &[u32]) -> Vec<u32> {
    let mut offsets = Vec::with_capacity(counts.len() + 1);
    let mut running = 0u32;
    offsets.push(0);
    for &count in counts {
        running += count;
        offsets.push(running);
    }
    offsets
}
