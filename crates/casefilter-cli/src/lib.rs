//! Shared driver plumbing: line filtering and tracing bootstrap.
//!
//! The drivers speak a line-oriented protocol where stdout carries data
//! (an index stream or an answer stream), so diagnostics always go to
//! stderr through `tracing`.

use casefilter_core::params::WORD_LEN;

/// Strip one trailing newline, with or without a carriage return. Lines
/// are raw bytes: the input files carry no encoding contract.
#[must_use]
pub fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Accept a dictionary line as a keyword: exactly 15 bytes, all inside
/// the `A..=J` alphabet. Anything else is discarded by the caller.
#[must_use]
pub fn keyword_from_line(line: &[u8]) -> Option<&[u8; WORD_LEN]> {
    if !line.iter().all(|b| (b'A'..=b'J').contains(b)) {
        return None;
    }
    line.try_into().ok()
}

/// Install the stderr tracing subscriber. Silent unless `RUST_LOG` (or a
/// compatible env var) opts in.
pub fn init_tracing() {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "off".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
