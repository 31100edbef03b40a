use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dskscan::{
    DiskFormat, DiskScanner, FormatSelection, LookbackPolicy, Marker, ScanConfig, DEFAULT_IMAGE,
};
use tracing_subscriber::EnvFilter;

/// With no subcommand the scan arguments apply directly, so a bare
/// `dskscan` scans `tdsk.dsk` in the working directory.
#[derive(Parser, Debug)]
#[command(
    name = "dskscan",
    version,
    about = "Find track/sector labels in Altair disk images",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    scan: ScanArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan an image for marker-terminated track/sector labels.
    Scan(ScanArgs),
    /// List the known disk formats.
    Formats,
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Disk image to scan.
    #[arg(value_name = "IMAGE", default_value = DEFAULT_IMAGE)]
    image: PathBuf,
    /// Two-byte marker that follows each label.
    #[arg(long, default_value = "XX")]
    marker: Marker,
    /// Markers with fewer than four bytes before them: skip, wrap or reject.
    #[arg(long, default_value = "skip")]
    lookback: LookbackPolicy,
    /// Disk format for locating hits (a format name or `auto`).
    #[arg(long, default_value = "auto")]
    format: FormatSelection,
    /// Append the physical track, sector and byte of each hit.
    #[arg(long)]
    annotate: bool,
}

impl ScanArgs {
    fn into_parts(self) -> (PathBuf, ScanConfig) {
        let config = ScanConfig {
            marker: self.marker,
            lookback: self.lookback,
            format: self.format,
            annotate: self.annotate,
        };
        (self.image, config)
    }
}

fn main() -> Result<()> {
    // RUST_LOG overrides; stdout carries the report so logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Scan(args)) => run_scan(args)?,
        Some(Commands::Formats) => run_formats()?,
        None => run_scan(cli.scan)?,
    }

    Ok(())
}

fn run_scan(args: ScanArgs) -> Result<()> {
    let (image, config) = args.into_parts();
    let annotate = config.annotate;
    let report = DiskScanner::new(config)
        .scan_file(&image)
        .with_context(|| format!("scan of {} failed", image.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    dskscan::write_report(&mut out, &report.entries, annotate)
        .context("failed to write report")?;

    Ok(())
}

fn run_formats() -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(
        out,
        "{:<13} {:>10} {:>6} {:>4} {:>4} {:>7} {:>5} {:>5}  Description",
        "Name", "Size", "Tracks", "Res", "Sect", "SectLen", "Block", "Dirs"
    )?;
    for format in DiskFormat::catalog() {
        writeln!(
            out,
            "{:<13} {:>10} {:>6} {:>4} {:>4} {:>7} {:>5} {:>5}  {}",
            format.name,
            format.image_size,
            format.num_tracks,
            format.reserved_tracks,
            format.sectors_per_track,
            format.sector_len,
            format.block_size,
            format.num_directories,
            format.description
        )?;
    }

    Ok(())
}
