//! Index preparation driver: dictionary file in, serialized index on stdout.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{info, warn};

use casefilter_cli::{init_tracing, keyword_from_line, trim_line_ending};
use casefilter_core::params::INITIAL_CAPACITY;
use casefilter_core::{wire, IndexBuilder};
use casefilter_error::{CaseFilterError, Result};

/// Build a keyword index from a dictionary file and stream it to stdout.
#[derive(Parser, Debug)]
#[command(name = "casefilter-prep")]
struct Args {
    /// Dictionary file: one 15-symbol keyword per line.
    db_file: PathBuf,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("casefilter-prep: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let file = File::open(&args.db_file).map_err(|_| CaseFilterError::CannotOpen {
        path: args.db_file.clone(),
    })?;
    let mut reader = BufReader::new(file);

    let mut builder = IndexBuilder::with_capacity(INITIAL_CAPACITY);
    let mut discarded = 0usize;
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        let stripped = trim_line_ending(&line);
        if stripped.is_empty() {
            continue;
        }
        match keyword_from_line(stripped) {
            Some(word) => {
                builder.insert(word)?;
            }
            None => discarded += 1,
        }
    }
    if discarded > 0 {
        warn!(discarded, "discarded malformed dictionary lines");
    }
    info!(keywords = builder.len(), "dictionary read");

    let index = builder.finalize();
    let stdout = io::stdout().lock();
    let mut out = BufWriter::new(stdout);
    wire::serialize(&index, &mut out)?;
    out.flush()?;
    Ok(())
}
