use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for casefilter operations.
///
/// Structured variants for the cases a caller can react to, with enough
/// context to produce a useful diagnostic without re-deriving state.
#[derive(Error, Debug)]
pub enum CaseFilterError {
    // === I/O ===
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cannot open an input file.
    #[error("unable to open file: '{path}'")]
    CannotOpen { path: PathBuf },

    // === Stored index format ===
    /// A stored index image failed validation.
    #[error("index image is malformed: {detail}")]
    IndexCorrupt { detail: String },

    /// Fewer bytes than the format requires.
    #[error("short read in {section}: expected {expected} bytes, got {actual}")]
    ShortRead {
        section: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The stored payload total disagrees with the prefix sum of counts.
    #[error("posting total mismatch: header says {stored}, counts sum to {computed}")]
    CountMismatch { stored: u64, computed: u64 },

    /// The count-width byte is neither 16 nor 32.
    #[error("unsupported count width: {width} (expected 16 or 32)")]
    UnsupportedCountWidth { width: u8 },

    // === Build ===
    /// Keyword ids are 20-bit on the wire; the dictionary cannot grow past that.
    #[error("dictionary is full: {max} keywords")]
    DictionaryFull { max: usize },
}

impl CaseFilterError {
    /// Create an `IndexCorrupt` error.
    pub fn corrupt(detail: impl Into<String>) -> Self {
        Self::IndexCorrupt {
            detail: detail.into(),
        }
    }

    /// Whether this error means the stored index bytes are unusable,
    /// as opposed to an environmental failure.
    pub const fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::IndexCorrupt { .. }
                | Self::ShortRead { .. }
                | Self::CountMismatch { .. }
                | Self::UnsupportedCountWidth { .. }
        )
    }

    /// Process exit code for CLI use. Drivers exit 0 on success and 1 on
    /// any failure.
    pub const fn exit_code(&self) -> i32 {
        1
    }
}

/// Result type alias using `CaseFilterError`.
pub type Result<T> = std::result::Result<T, CaseFilterError>;
