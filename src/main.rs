//! fsinventory - Concurrent filesystem inventory with content digests.
//!
//! Usage:
//!   fsinv                                  Inventory the current directory
//!   fsinv --start-dir /data --sub-dirs false
//!   fsinv --digests sha256,blake3 --output inventory.json
//!   fsinv --help                           Show help

use std::path::PathBuf;
use std::thread;

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fsinventory_core::{DEFAULT_CONCURRENCY, DEFAULT_OUTPUT, DigestKind, RunConfig, RunReport};
use fsinventory_report::{ReportWriter, collect_host_info};
use fsinventory_scan::{InventoryScanner, ScanProgress, ScanSummary};

#[derive(Parser)]
#[command(
    name = "fsinventory",
    version,
    about = "Inventory a directory tree with per-file content digests",
    long_about = "fsinventory walks a directory, computes content digests for every \
                  regular file on a bounded pool of workers, and writes a single JSON \
                  report with host information, the run's flags, and one record per file."
)]
struct Cli {
    /// Directory (or single file) to inventory
    #[arg(long, default_value = ".")]
    start_dir: PathBuf,

    /// Descend into nested subdirectories
    #[arg(long = "sub-dirs", default_value_t = true, action = ArgAction::Set)]
    sub_dirs: bool,

    /// Maximum number of files digested at once
    #[arg(
        long,
        default_value_t = DEFAULT_CONCURRENCY as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    concurrency: u64,

    /// Report destination
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Log every processed file
    #[arg(
        long,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    debug: bool,

    /// Digest algorithms to compute (md5, sha1, sha256, blake3)
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "md5,sha1,sha256",
        value_parser = parse_digest_kind
    )]
    digests: Vec<DigestKind>,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    setup_logging(cli.debug);

    let config = RunConfig::builder()
        .debug(cli.debug)
        .start_dir(cli.start_dir)
        .recurse(cli.sub_dirs)
        .output(cli.output)
        .concurrency(usize::try_from(cli.concurrency).unwrap_or(usize::MAX))
        .digests(cli.digests)
        .build()
        .wrap_err("Invalid configuration")?;

    let scanner = InventoryScanner::new();

    let cancel = scanner.cancel_token();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, finishing in-flight files...");
        cancel.cancel();
    })
    .context("Failed to set signal handler")?;

    let progress_rx = scanner.subscribe();
    let reporter = thread::Builder::new()
        .name("fsinv-progress".to_string())
        .spawn(move || report_progress(progress_rx))
        .context("Failed to start progress reporter")?;

    eprintln!("Scanning {}...", config.start_dir.display());
    let outcome = scanner.scan(&config);

    // Closes the progress channel so the reporter exits.
    drop(scanner);
    if reporter.join().is_err() {
        warn!("Progress reporter panicked");
    }

    let outcome =
        outcome.wrap_err_with(|| format!("Scan of {} failed", config.start_dir.display()))?;
    print_summary(&outcome.summary);

    let writer = ReportWriter::new(&config.output);
    let report = RunReport::new(collect_host_info(), config, outcome);
    writer
        .write(&report)
        .wrap_err_with(|| format!("Failed to write {}", writer.path().display()))?;

    eprintln!("Report written to {}", writer.path().display());
    println!("Done!");

    Ok(())
}

fn setup_logging(debug: bool) {
    let default = if debug {
        "fsinventory=debug,fsinventory_scan=debug,fsinventory_report=debug,warn"
    } else {
        "fsinventory=info,fsinventory_scan=info,fsinventory_report=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn parse_digest_kind(s: &str) -> Result<DigestKind, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("unknown digest '{s}' (expected md5, sha1, sha256 or blake3)"))
}

/// Log progress snapshots until the scanner goes away.
fn report_progress(mut rx: tokio::sync::broadcast::Receiver<ScanProgress>) {
    loop {
        match rx.blocking_recv() {
            Ok(progress) if !progress.finished => info!(
                files = progress.files_digested,
                size = %format_size(progress.bytes_digested),
                files_per_sec = progress.files_per_second() as u64,
                throughput = %format!("{}/s", format_size(progress.bytes_per_second() as u64)),
                "Progress"
            ),
            Ok(_) => {}
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_summary(summary: &ScanSummary) {
    eprintln!();
    eprintln!("{}", "─".repeat(60));
    eprintln!(
        " {} files, {}",
        summary.total_files,
        format_size(summary.total_bytes)
    );
    if let Some((path, size)) = &summary.largest_file {
        eprintln!(" Largest: {} ({})", path.display(), format_size(*size));
    }
    if summary.digest_failures > 0 {
        eprintln!(" {} file(s) could not be digested", summary.digest_failures);
    }
    if summary.warnings > 0 {
        eprintln!(" {} warning(s) during scan", summary.warnings);
    }
    if summary.aborted {
        eprintln!(
            " Aborted: {} queued file(s) skipped",
            summary.skipped_on_abort
        );
    }
    eprintln!(" Scanned in {:.2}s", summary.scan_duration.as_secs_f64());
    eprintln!("{}", "─".repeat(60));
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
