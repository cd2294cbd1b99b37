//! Query driver: answers one `0`/`1` byte per query line.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use casefilter_cli::{init_tracing, trim_line_ending};
use casefilter_core::params::MAX_EDIT_DISTANCE;
use casefilter_core::{search, wire, SearchContext};
use casefilter_error::{CaseFilterError, Result};

/// Answer approximate-membership queries against a stored index.
#[derive(Parser, Debug)]
#[command(name = "casefilter-search")]
struct Args {
    /// Query file: one candidate word per line.
    query_file: PathBuf,
    /// Index file produced by casefilter-prep.
    index_file: PathBuf,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("casefilter-search: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let file = File::open(&args.index_file).map_err(|_| CaseFilterError::CannotOpen {
        path: args.index_file.clone(),
    })?;
    let index = wire::deserialize(&mut BufReader::new(file))?;
    info!(keywords = index.len(), "index loaded");

    let queries = File::open(&args.query_file).map_err(|_| CaseFilterError::CannotOpen {
        path: args.query_file.clone(),
    })?;
    let mut reader = BufReader::new(queries);

    let stdout = io::stdout().lock();
    let mut out = BufWriter::new(stdout);
    let mut ctx = SearchContext::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        // Queries are raw bytes; anything malformed simply fails to match.
        let query = trim_line_ending(&line);
        let found = search(&index, &mut ctx, query, MAX_EDIT_DISTANCE);
        out.write_all(if found { b"1" } else { b"0" })?;
    }
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
