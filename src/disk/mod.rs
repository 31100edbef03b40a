//! Disk image geometry.
//!
//! Maps raw image offsets to the physical track and sector that hold them,
//! so scanner hits can be checked against where they actually sit.

mod format;

pub use format::{DiskFormat, SIMH_MITS8IN_IMAGE_SIZE};

use std::fmt;

use crate::ScanError;

/// Byte offsets of controller fields within a raw sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorLayout {
    /// First track this layout applies to.
    pub start_track: usize,
    /// Last track this layout applies to.
    pub end_track: usize,
    /// Start of the data portion.
    pub off_data: usize,
    /// Track number byte.
    pub off_track_nr: usize,
    /// Sector number byte.
    pub off_sect_nr: usize,
    /// Stop byte (0xFF).
    pub off_stop: usize,
    /// Zero byte.
    pub off_zero: usize,
    /// Checksum byte.
    pub off_csum: usize,
}

impl SectorLayout {
    fn covers(&self, track: usize) -> bool {
        (self.start_track..=self.end_track).contains(&track)
    }

    /// Controller field stored at `byte` of the raw sector. On tracks 0-5
    /// track and sector share byte 0; it is reported as the track number.
    pub fn field_at(&self, byte: usize) -> Option<SectorField> {
        [
            (self.off_track_nr, SectorField::TrackNumber),
            (self.off_sect_nr, SectorField::SectorNumber),
            (self.off_csum, SectorField::Checksum),
            (self.off_stop, SectorField::Stop),
            (self.off_zero, SectorField::Zero),
        ]
        .into_iter()
        .find(|(offset, _)| *offset == byte)
        .map(|(_, field)| field)
    }
}

/// Controller framing byte within a raw sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorField {
    /// Track number.
    TrackNumber,
    /// Sector number.
    SectorNumber,
    /// Data checksum.
    Checksum,
    /// Stop byte.
    Stop,
    /// Zero byte.
    Zero,
}

impl fmt::Display for SectorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TrackNumber => "track-nr",
            Self::SectorNumber => "sector-nr",
            Self::Checksum => "checksum",
            Self::Stop => "stop",
            Self::Zero => "zero",
        };
        f.write_str(name)
    }
}

/// Which part of a raw sector a byte belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorRegion {
    /// Controller bytes before the data.
    Header,
    /// The data portion.
    Data,
    /// Controller bytes after the data.
    Trailer,
}

impl fmt::Display for SectorRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Header => "header",
            Self::Data => "data",
            Self::Trailer => "trailer",
        };
        f.write_str(name)
    }
}

/// Physical position of an image offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorLocation {
    /// Zero-based track.
    pub track: usize,
    /// One-based physical sector.
    pub sector: usize,
    /// Zero-based logical sector, for formats with a known skew.
    pub logical_sector: Option<usize>,
    /// Byte within the raw sector.
    pub byte: usize,
    /// Part of the raw sector holding the byte.
    pub region: SectorRegion,
    /// Framing byte the offset lands on, if any.
    pub field: Option<SectorField>,
}

impl fmt::Display for SectorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{} S{}", self.track, self.sector)?;
        if let Some(logical) = self.logical_sector {
            write!(f, " L{logical}")?;
        }
        write!(f, " +{} {}", self.byte, self.region)?;
        if let Some(field) = self.field {
            write!(f, " {field}")?;
        }
        Ok(())
    }
}

/// How the scanner should pick a disk format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatSelection {
    /// Detect from the image size.
    #[default]
    Auto,
    /// Use this format regardless of size.
    Fixed(DiskFormat),
}

impl FormatSelection {
    /// Resolve the selection for an image of `image_len` bytes.
    pub fn resolve(&self, image_len: usize) -> Option<DiskFormat> {
        match self {
            Self::Auto => DiskFormat::detect(image_len),
            Self::Fixed(format) => Some(*format),
        }
    }
}

impl std::str::FromStr for FormatSelection {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else {
            DiskFormat::by_name(s).map(Self::Fixed)
        }
    }
}

impl DiskFormat {
    /// Look a format up by name, ignoring case.
    pub fn by_name(name: &str) -> Result<DiskFormat, ScanError> {
        Self::catalog()
            .iter()
            .find(|format| format.name.eq_ignore_ascii_case(name))
            .copied()
            .ok_or_else(|| ScanError::UnknownFormat(name.to_string()))
    }

    /// Detect the format of an image from its length.
    pub fn detect(image_len: usize) -> Option<DiskFormat> {
        Self::catalog()
            .iter()
            .find(|format| format.matches_size(image_len))
            .copied()
    }

    /// Raw bytes per track.
    pub fn track_len(&self) -> usize {
        self.sector_len * self.sectors_per_track
    }

    /// Raw bytes covered by the geometry.
    pub fn total_len(&self) -> usize {
        self.track_len() * self.num_tracks
    }

    /// Raw layout for `track`. Tracks outside the first layout's range use
    /// the second.
    pub fn layout(&self, track: usize) -> Option<&SectorLayout> {
        let [first, second] = self.layouts()?;
        if first.covers(track) {
            Some(first)
        } else {
            Some(second)
        }
    }

    /// Physical location of an image offset, or `None` if it lies outside
    /// the geometry.
    pub fn locate(&self, offset: usize) -> Option<SectorLocation> {
        if offset >= self.total_len() {
            return None;
        }

        let track = offset / self.track_len();
        let within_track = offset % self.track_len();
        let sector = within_track / self.sector_len + 1;
        let byte = within_track % self.sector_len;

        let layout = self.layout(track);
        let region = match layout {
            Some(layout) if byte < layout.off_data => SectorRegion::Header,
            Some(layout) if byte >= layout.off_data + self.sector_data_len => SectorRegion::Trailer,
            _ => SectorRegion::Data,
        };
        let field = match region {
            SectorRegion::Data => None,
            _ => layout.and_then(|layout| layout.field_at(byte)),
        };

        Some(SectorLocation {
            track,
            sector,
            logical_sector: self.logical_sector(track, sector),
            byte,
            region,
            field,
        })
    }
}
