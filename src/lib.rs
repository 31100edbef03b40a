//! # Marker scanning for Altair disk images
//!
//! Test disks for the Altair are often written with a label in every
//! sector: two characters of track number, two of sector number, then the
//! marker `XX`. Scanning a raw image for those labels shows where each
//! sector really landed, which is how skew and offset bugs in image tools
//! get caught.
//!
//! ## Pipeline
//!
//! 1. **Load**: read the whole image into memory
//! 2. **Scan**: find every marker not preceded by its own lead byte
//! 3. **Decode**: take the four bytes in front as track and sector codes
//! 4. **Sort**: order hits by track+sector
//! 5. **Locate** (optional): map each offset to a physical track/sector
//!
//! ## Usage Example
//!
//! ```no_run
//! use dskscan::{DiskScanner, ScanConfig};
//!
//! let scanner = DiskScanner::new(ScanConfig::default());
//! let report = scanner.scan_file("tdsk.dsk")?;
//! for entry in &report.entries {
//!     println!("{}", entry.record);
//! }
//! # Ok::<(), dskscan::ScanError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod disk;       // Image formats and geometry
pub mod report;     // Line rendering
pub mod scanner;    // Marker scanning

pub use disk::{DiskFormat, FormatSelection, SectorField, SectorLocation, SectorRegion};
pub use report::{render_report, write_report, ReportEntry};
pub use scanner::{
    FieldCode, LookbackPolicy, Marker, MarkerScanner, MatchRecord, ScanOutcome, MARKER_LOOKBACK,
};

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

/// Image read when no path is given.
pub const DEFAULT_IMAGE: &str = "tdsk.dsk";

/// Errors that can occur while scanning an image
#[derive(Error, Debug)]
pub enum ScanError {
    /// Image could not be read
    #[error("failed to read image {}: {source}", path.display())]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Marker is not exactly two bytes
    #[error("marker must be exactly two bytes, got {0:?}")]
    InvalidMarker(String),

    /// Unrecognised lookback policy name
    #[error("unknown lookback policy {0:?} (expected skip, wrap or reject)")]
    InvalidLookbackPolicy(String),

    /// Marker found with fewer than four bytes in front of it
    #[error("marker at index {index} has no room for a track/sector label before it")]
    InsufficientLookback {
        /// Index of the marker's first byte
        index: usize,
    },

    /// Disk format name not in the catalog
    #[error("unknown disk format {0:?}")]
    UnknownFormat(String),
}

/// Configuration parameters for a scan
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Marker terminating each label
    pub marker: Marker,

    /// Handling of markers too close to the start of the image
    pub lookback: LookbackPolicy,

    /// Disk format used to locate hits
    pub format: FormatSelection,

    /// Attach physical locations to hits
    pub annotate: bool,
}

impl ScanConfig {
    /// Configuration that reproduces the old search script byte for byte.
    pub fn legacy() -> Self {
        Self {
            lookback: LookbackPolicy::Wrap,
            ..Self::default()
        }
    }
}

/// Result of scanning one image
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Hits sorted by track+sector
    pub entries: Vec<ReportEntry>,

    /// Format used for locations, if any
    pub format: Option<DiskFormat>,

    /// Image length in bytes
    pub image_len: usize,

    /// Marker indices dropped under [`LookbackPolicy::Skip`]
    pub skipped: Vec<usize>,
}

impl ScanReport {
    /// Render the report as it is printed on stdout.
    pub fn render(&self, annotate: bool) -> anyhow::Result<String> {
        render_report(&self.entries, annotate)
    }
}

/// Scan orchestrator
///
/// Ties the marker scanner to format resolution and location lookup.
#[derive(Debug, Clone)]
pub struct DiskScanner {
    config: ScanConfig,
    scanner: MarkerScanner,
}

impl DiskScanner {
    /// Create a scanner for `config`.
    pub fn new(config: ScanConfig) -> Self {
        let scanner = MarkerScanner::new(config.marker, config.lookback);
        Self { config, scanner }
    }

    /// Read `path` fully and scan it.
    pub fn scan_file<P: AsRef<Path>>(&self, path: P) -> Result<ScanReport, ScanError> {
        let path = path.as_ref();
        let image = std::fs::read(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), len = image.len(), "loaded image");
        self.scan_bytes(&image)
    }

    /// Scan an in-memory image.
    pub fn scan_bytes(&self, image: &[u8]) -> Result<ScanReport, ScanError> {
        let outcome = self.scanner.scan(image)?;

        let format = if self.config.annotate {
            let format = self.config.format.resolve(image.len());
            match format {
                Some(format) => info!(format = format.name, "using disk format"),
                None => warn!(len = image.len(), "image size matches no known disk format"),
            }
            format
        } else {
            None
        };

        let entries = outcome
            .records
            .into_iter()
            .map(|record| ReportEntry {
                record,
                location: format
                    .zip(record.position())
                    .and_then(|(format, position)| format.locate(position)),
            })
            .collect::<Vec<_>>();

        info!(
            marker = %self.config.marker,
            hits = entries.len(),
            skipped = outcome.skipped.len(),
            "scan complete"
        );

        Ok(ScanReport {
            entries,
            format,
            image_len: image.len(),
            skipped: outcome.skipped,
        })
    }
}
