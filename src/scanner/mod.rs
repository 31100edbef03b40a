//! Marker scanning over raw image bytes.
//!
//! A label in the image is four bytes (two track, two sector) followed by a
//! two-byte marker, `XX` by default. The scanner walks every position once,
//! accepts a marker only when the byte before it is not the marker's lead
//! byte (so runs of `XXX...` count once), and reads the four bytes in front
//! of it.

mod record;

pub use record::{FieldCode, MatchRecord};

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::ScanError;

/// Number of bytes a label occupies in front of its marker.
pub const MARKER_LOOKBACK: usize = 4;

/// The two-byte pattern that terminates a track/sector label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker([u8; 2]);

impl Marker {
    /// Build a marker from two bytes.
    pub fn new(lead: u8, follow: u8) -> Self {
        Self([lead, follow])
    }

    /// The byte that starts the marker; a marker preceded by it is not a hit.
    pub fn lead(&self) -> u8 {
        self.0[0]
    }

    /// Whether `image[index..index + 2]` is this marker.
    fn matches_at(&self, image: &[u8], index: usize) -> bool {
        image.get(index..index + 2) == Some(&self.0[..])
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self(*b"XX")
    }
}

impl FromStr for Marker {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            [lead, follow] => Ok(Self::new(*lead, *follow)),
            _ => Err(ScanError::InvalidMarker(s.to_string())),
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", char::from(self.0[0]), char::from(self.0[1]))
    }
}

/// What to do with a marker found fewer than four bytes into the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookbackPolicy {
    /// Drop the hit.
    #[default]
    Skip,
    /// Read the missing bytes from the end of the image, as negative
    /// indices would. Reproduces the output of the old search script.
    Wrap,
    /// Fail the scan.
    Reject,
}

impl FromStr for LookbackPolicy {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "wrap" => Ok(Self::Wrap),
            "reject" => Ok(Self::Reject),
            _ => Err(ScanError::InvalidLookbackPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for LookbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Skip => "skip",
            Self::Wrap => "wrap",
            Self::Reject => "reject",
        };
        f.write_str(name)
    }
}

/// Records found by one pass, sorted by track+sector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Hits in label order.
    pub records: Vec<MatchRecord>,
    /// Marker indices dropped for lack of lookback.
    pub skipped: Vec<usize>,
}

/// Single-pass scanner for marker-terminated labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerScanner {
    marker: Marker,
    lookback: LookbackPolicy,
}

impl MarkerScanner {
    /// Create a scanner for `marker` with the given lookback policy.
    pub fn new(marker: Marker, lookback: LookbackPolicy) -> Self {
        Self { marker, lookback }
    }

    /// Scan `image` and return every hit sorted by track+sector.
    ///
    /// Hits with equal labels keep their image order.
    pub fn scan(&self, image: &[u8]) -> Result<ScanOutcome, ScanError> {
        let mut outcome = ScanOutcome::default();
        if image.len() < 2 {
            return Ok(outcome);
        }

        for index in 0..image.len() - 1 {
            if !self.marker.matches_at(image, index) {
                continue;
            }

            if index >= MARKER_LOOKBACK {
                if image[index - 1] != self.marker.lead() {
                    outcome.records.push(label_at(image, index));
                }
                continue;
            }

            // Short lookback. Under Skip/Reject the predecessor is only
            // checked when it exists.
            match self.lookback {
                LookbackPolicy::Wrap => {
                    if let Some(record) = self.wrapped_label_at(image, index) {
                        outcome.records.push(record);
                    }
                }
                LookbackPolicy::Skip | LookbackPolicy::Reject => {
                    if index > 0 && image[index - 1] == self.marker.lead() {
                        continue;
                    }
                    if self.lookback == LookbackPolicy::Reject {
                        return Err(ScanError::InsufficientLookback { index });
                    }
                    debug!(index, "skipping marker without a full label in front of it");
                    outcome.skipped.push(index);
                }
            }
        }

        outcome.records.sort_by(MatchRecord::cmp_by_label);
        Ok(outcome)
    }

    fn wrapped_label_at(&self, image: &[u8], index: usize) -> Option<MatchRecord> {
        let byte = |back: usize| wrapped_byte(image, index, back);

        if byte(1) == Some(self.marker.lead()) {
            return None;
        }

        let (Some(t0), Some(t1), Some(s0), Some(s1)) = (byte(4), byte(3), byte(2), byte(1)) else {
            // Image too short to wrap into.
            debug!(index, len = image.len(), "marker lookback falls outside the image");
            return None;
        };

        Some(MatchRecord::new(
            index as i64 - MARKER_LOOKBACK as i64,
            FieldCode::new(t0, t1),
            FieldCode::new(s0, s1),
        ))
    }
}

fn label_at(image: &[u8], index: usize) -> MatchRecord {
    let start = index - MARKER_LOOKBACK;
    MatchRecord::new(
        start as i64,
        FieldCode::new(image[start], image[start + 1]),
        FieldCode::new(image[start + 2], image[start + 3]),
    )
}

/// `image[index - back]`, counting from the end when that goes negative.
fn wrapped_byte(image: &[u8], index: usize, back: usize) -> Option<u8> {
    index
        .checked_sub(back)
        .or_else(|| (image.len() + index).checked_sub(back))
        .and_then(|pos| image.get(pos).copied())
}
