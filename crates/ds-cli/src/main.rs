//! CLI entry point for devscan.
//!
//! This binary inventories every file on a USB-connected device: it locates
//! the mount point, hashes each file with MD5 and writes the results to a
//! CSV report.
//!
//! # Usage
//!
//! ```bash
//! devscan [OPTIONS]
//!
//! # Auto-detect the phone and write android_scan_<timestamp>.csv
//! devscan
//!
//! # Scan an explicit mount point, echoing each hashed file
//! devscan --path /run/user/1000/gvfs/mtp:host=Google_Pixel_7 --verbose
//!
//! # Choose the report location
//! devscan -p /media/alice/PHONE -o phone.csv
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Local;
use clap::Parser;
use color_eyre::eyre::{WrapErr, eyre};
use ds_core::{
    Config, ConfigError, MountResolver, MtpMountResolver, OutputConfig, ScanRecord, ScanSummary,
};
use ds_scanner::{CsvReportWriter, RecordSink, ScanConfig, ScanError, ScanStats, Scanner};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Width of the separator lines around the scan.
const SEPARATOR_WIDTH: usize = 80;

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Inventory the files on a USB-connected Android device.
///
/// Recursively hashes every file under the device's mount point with MD5
/// and writes path, hash, size and status to a CSV report.
#[derive(Parser)]
#[command(name = "devscan", version, about, long_about = None)]
struct Cli {
    /// Mount point of the device.
    ///
    /// Auto-detected from GVFS or /media when not specified.
    #[arg(short, long, env = "DEVSCAN_PATH")]
    path: Option<Utf8PathBuf>,

    /// Report file.
    ///
    /// Defaults to `android_scan_YYYYMMDD_HHMMSS.csv` in the current directory.
    #[arg(short, long, env = "DEVSCAN_OUTPUT")]
    output: Option<Utf8PathBuf>,

    /// Print each file as it is hashed.
    #[arg(short, long)]
    verbose: bool,

    /// JSON configuration file.
    #[arg(short, long, env = "DEVSCAN_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Visit directory entries in name order for a reproducible report.
    #[arg(long)]
    sorted: bool,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,

    /// Disable colored log output.
    #[arg(long)]
    no_color: bool,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--debug` is set, or `info` level by default. Logs go
/// to stderr; stdout carries the scan report.
fn init_tracing(debug: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if debug { "debug" } else { "info" };
        EnvFilter::new(format!("{level},ignore=warn,globset=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the optional config file and CLI arguments.
///
/// Flags and environment variables override values from the file.
///
/// # Errors
///
/// Returns an error if the config file cannot be read, parsed or validated.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("Failed to load configuration from {path}"))?,
        None => Config::default(),
    };

    if let Some(path) = &cli.path {
        config.scan.root_path = Some(path.clone());
    }
    if let Some(output) = &cli.output {
        config.output.path = Some(output.clone());
    }
    config.scan.sorted |= cli.sorted;
    config.output.verbose |= cli.verbose;

    Ok(config)
}

/// Determines the directory to scan.
///
/// Uses the configured path when present; otherwise asks `resolver` and
/// prints the detection messages to `out`.
///
/// # Errors
///
/// Returns [`ConfigError::MountNotFound`] if detection fails, and
/// [`ConfigError::MissingDirectory`] or [`ConfigError::InvalidPath`] if the
/// configured path is not a directory.
fn resolve_root(
    config: &Config,
    resolver: &MtpMountResolver,
    out: &mut impl Write,
) -> color_eyre::Result<Utf8PathBuf> {
    let root = if let Some(path) = &config.scan.root_path {
        path.clone()
    } else {
        writeln!(out, "Attempting to auto-detect Android device...")?;
        let Some(path) = resolver.find_mount() else {
            print_detection_help(out, resolver)?;
            return Err(ConfigError::MountNotFound.into());
        };
        writeln!(out, "Found Android device at: {path}")?;
        path
    };

    if !root.exists() {
        return Err(ConfigError::MissingDirectory(root).into());
    }
    if !root.is_dir() {
        return Err(ConfigError::InvalidPath {
            path: root,
            reason: "not a directory".to_owned(),
        }
        .into());
    }

    Ok(root)
}

/// Determines the absolute report path.
///
/// # Errors
///
/// Returns an error if the current directory is unavailable or not UTF-8.
fn resolve_output(output: &OutputConfig) -> color_eyre::Result<Utf8PathBuf> {
    let path = output.resolve_path(&Local::now());
    if path.is_absolute() {
        return Ok(path);
    }

    let cwd = Utf8PathBuf::try_from(std::env::current_dir()?)
        .wrap_err("Current directory is not valid UTF-8")?;
    Ok(cwd.join(path))
}

// =============================================================================
// SCAN EXECUTION
// =============================================================================

/// Sink wrapper that echoes every hashed file to the console.
///
/// Lines are numbered by successful files only, matching the
/// `Total files processed` count printed at the end.
struct ConsoleSink<S, W> {
    inner: S,
    out: W,
    echo: bool,
    hashed: u64,
}

impl<S: RecordSink, W: Write> ConsoleSink<S, W> {
    const fn new(inner: S, out: W, echo: bool) -> Self {
        Self {
            inner,
            out,
            echo,
            hashed: 0,
        }
    }
}

impl<S: RecordSink, W: Write> RecordSink for ConsoleSink<S, W> {
    fn write_record(&mut self, record: &ScanRecord) -> io::Result<()> {
        self.inner.write_record(record)?;

        if self.echo && record.status().is_success() {
            self.hashed += 1;
            writeln!(self.out, "[{}] {}", self.hashed, record.path())?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()?;
        self.out.flush()
    }
}

/// Spawns a task that logs the running counts every `secs` seconds.
///
/// Returns `None` when `secs` is zero. The task ends once `done` fires.
fn spawn_progress(
    stats: Arc<ScanStats>,
    secs: u64,
    done: CancellationToken,
) -> Option<JoinHandle<()>> {
    if secs == 0 {
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(secs));
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                () = done.cancelled() => break,
                _ = ticker.tick() => {
                    let snapshot = stats.snapshot();
                    info!(
                        files_processed = snapshot.files_processed,
                        errors = snapshot.errors,
                        "Scan progress"
                    );
                }
            }
        }
    }))
}

/// Resolves once the process receives Ctrl-C (or SIGTERM on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

/// Waits for the scan task while listening for shutdown signals.
///
/// The first signal cancels `cancel` and keeps waiting for the scan to wind
/// down. A second signal stops waiting: the blocking thread may be stuck in
/// a read on a hung mount, so the records counted so far are reported as
/// [`ScanError::Interrupted`] straight away.
///
/// # Errors
///
/// Returns an error if the scan task panicked.
async fn await_scan<F, Fut>(
    mut task: JoinHandle<Result<ScanSummary, ScanError>>,
    cancel: &CancellationToken,
    stats: &ScanStats,
    mut signal: F,
) -> color_eyre::Result<Result<ScanSummary, ScanError>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    tokio::select! {
        joined = &mut task => return Ok(joined?),
        () = signal() => {
            info!("Received shutdown signal, stopping scan");
            cancel.cancel();
        }
    }

    tokio::select! {
        joined = &mut task => Ok(joined?),
        () = signal() => {
            let written = stats.snapshot().total();
            warn!(written, "Received second shutdown signal, abandoning scan");
            Ok(Err(ScanError::Interrupted { written }))
        }
    }
}

/// Runs the scan on a blocking thread until it finishes or a shutdown
/// signal arrives.
///
/// # Errors
///
/// Returns the scanner's error, including [`ScanError::Interrupted`] after a
/// signal, or an error if the scan task panicked.
async fn run_scan(
    scanner: Scanner,
    report: CsvReportWriter<io::BufWriter<std::fs::File>>,
    config: &Config,
) -> color_eyre::Result<Result<ScanSummary, ScanError>> {
    let cancel = CancellationToken::new();
    let progress_done = CancellationToken::new();
    let progress = spawn_progress(
        scanner.stats_handle(),
        config.output.progress_interval_secs,
        progress_done.clone(),
    );

    let echo = config.output.verbose;
    let stats = scanner.stats_handle();
    let token = cancel.clone();
    let task = tokio::task::spawn_blocking(move || {
        let sink = ConsoleSink::new(report, io::stdout(), echo);
        scanner.scan_until(sink, &token)
    });

    let result = await_scan(task, &cancel, &stats, shutdown_signal).await?;

    progress_done.cancel();
    if let Some(handle) = progress {
        handle.await?;
    }

    Ok(result)
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Prints the prerequisites for auto-detection and where to look manually.
fn print_detection_help(out: &mut impl Write, resolver: &MtpMountResolver) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Could not auto-detect Android device.")?;
    writeln!(out)?;
    writeln!(out, "Please ensure:")?;
    writeln!(out, "1. Your Android phone is connected via USB")?;
    writeln!(
        out,
        "2. You have selected 'File Transfer' (MTP) mode on your phone"
    )?;
    writeln!(
        out,
        "3. You have opened the device in your file manager (Nautilus/Files)"
    )?;
    writeln!(out)?;
    writeln!(out, "Or specify the device path manually using -p option.")?;

    let mut candidates = resolver.candidates().peekable();
    if candidates.peek().is_some() {
        writeln!(out)?;
        writeln!(out, "To find the path manually, check:")?;
        for dir in candidates {
            writeln!(out, "  - {dir}/")?;
        }
    }
    Ok(())
}

/// Prints the banner shown before the scan starts.
fn print_banner(out: &mut impl Write, root: &Utf8Path, output: &Utf8Path) -> io::Result<()> {
    writeln!(out, "Scanning: {root}")?;
    writeln!(out, "Output will be written to: {output}")?;
    writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))
}

/// Prints the totals after a completed scan.
fn print_summary(out: &mut impl Write, summary: &ScanSummary, output: &Utf8Path) -> io::Result<()> {
    writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
    writeln!(out, "Scan complete!")?;
    writeln!(out, "Total files processed: {}", summary.files_processed)?;
    writeln!(out, "Errors encountered: {}", summary.errors)?;
    writeln!(out, "Results saved to: {output}")
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.debug, cli.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(&cli));

    // An abandoned scan thread may never return from a hung read
    runtime.shutdown_background();
    result
}

/// Resolves the device and report, then scans.
async fn run(cli: &Cli) -> color_eyre::Result<()> {
    // 4. Merge config file and flags
    let config = build_config(cli)?;

    let stdout = io::stdout();
    let root = resolve_root(&config, &MtpMountResolver::from_env(), &mut stdout.lock())?;
    let output = resolve_output(&config.output)?;

    let scan_config = ScanConfig::new(&root)
        .with_chunk_size(config.scan.chunk_size)
        .with_sorted(config.scan.sorted);
    let scanner = Scanner::new(scan_config)?;
    let report = CsvReportWriter::create(&output)
        .wrap_err_with(|| format!("Failed to create report {output}"))?;

    print_banner(&mut stdout.lock(), &root, &output)?;

    // 5. Scan until done or interrupted
    match run_scan(scanner, report, &config).await? {
        Ok(summary) => {
            print_summary(&mut stdout.lock(), &summary, &output)?;
            Ok(())
        }
        Err(ScanError::Interrupted { written }) => {
            let mut handle = stdout.lock();
            writeln!(handle)?;
            writeln!(handle)?;
            writeln!(handle, "Scan interrupted by user.")?;
            Err(eyre!(
                "scan interrupted after {written} records; partial results saved to {output}"
            ))
        }
        Err(e) => Err(e.into()),
    }
}
