//! Timing wrapper: runs a search command, forwards its stdout, counts
//! hits, and optionally appends a CSV record.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, Stdio};
use std::time::Instant;

use chrono::Utc;
use clap::Parser;
use tracing::info;

use casefilter_cli::init_tracing;
use casefilter_error::{CaseFilterError, Result};

const CSV_HEADER: &str = "timestamp_utc,executable,query_file,index_file,dataset,elapsed_seconds,hit_count,return_code";

/// Run a search command under a wall-clock timer.
#[derive(Parser, Debug)]
#[command(name = "casefilter-perf")]
struct Args {
    /// Append a CSV row to the records directory.
    #[arg(long)]
    record: bool,
    /// Dataset label; defaults to the query-file stem minus any `query_` prefix.
    #[arg(long)]
    dataset: Option<String>,
    /// Directory for perf CSV files.
    #[arg(long, default_value = "records")]
    records_dir: PathBuf,
    /// Search command: <search_exe> <query_file> <index_file> [...]
    #[arg(last = true, required = true, num_args = 3..)]
    command: Vec<OsString>,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("casefilter-perf: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(args: &Args) -> Result<u8> {
    let executable = &args.command[0];
    let query_file = Path::new(&args.command[1]);
    let index_file = &args.command[2];

    let started = Instant::now();
    let mut child = Command::new(executable)
        .args(&args.command[1..])
        .stdout(Stdio::piped())
        .spawn()?;

    // Forward the answer stream unmodified while counting hits.
    let mut hits = 0u64;
    {
        let mut child_out = child.stdout.take().expect("stdout was piped");
        let stdout = io::stdout().lock();
        let mut out = io::BufWriter::new(stdout);
        let mut buf = [0u8; 4096];
        loop {
            let n = child_out.read(&mut buf)?;
            if n == 0 {
                break;
            }
            out.write_all(&buf[..n])?;
            hits += buf[..n].iter().filter(|&&b| b == b'1').count() as u64;
        }
        out.flush()?;
    }

    let status = child.wait()?;
    let elapsed = started.elapsed().as_secs_f64();
    let return_code = status.code().unwrap_or(1);
    info!(elapsed, hits, return_code, "search command finished");

    if args.record {
        let dataset = args
            .dataset
            .clone()
            .unwrap_or_else(|| derive_dataset(query_file));
        append_record(
            &args.records_dir,
            &dataset,
            &CsvRow {
                timestamp_utc: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                executable: executable.to_string_lossy().into_owned(),
                query_file: query_file.display().to_string(),
                index_file: Path::new(index_file).display().to_string(),
                elapsed_seconds: elapsed,
                hit_count: hits,
                return_code,
            },
        )?;
    }

    Ok(return_code.clamp(0, 255) as u8)
}

struct CsvRow {
    timestamp_utc: String,
    executable: String,
    query_file: String,
    index_file: String,
    elapsed_seconds: f64,
    hit_count: u64,
    return_code: i32,
}

/// Dataset label from a query path: the file stem, minus any `query_` prefix.
fn derive_dataset(query_file: &Path) -> String {
    let stem = query_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let trimmed = stem.strip_prefix("query_").unwrap_or(&stem);
    if trimmed.is_empty() {
        "unknown".to_owned()
    } else {
        trimmed.to_owned()
    }
}

fn append_record(records_dir: &Path, dataset: &str, row: &CsvRow) -> Result<()> {
    std::fs::create_dir_all(records_dir)?;
    let csv_path = records_dir.join(format!("perf_{dataset}.csv"));
    let write_header = !csv_path.exists();

    let mut csv = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&csv_path)
        .map_err(CaseFilterError::Io)?;
    if write_header {
        writeln!(csv, "{CSV_HEADER}")?;
    }
    writeln!(
        csv,
        "{},{},{},{},{},{:.6},{},{}",
        row.timestamp_utc,
        row.executable,
        row.query_file,
        row.index_file,
        dataset,
        row.elapsed_seconds,
        row.hit_count,
        row.return_code
    )?;
    eprintln!("perf record appended to {}", csv_path.display());
    Ok(())
}
