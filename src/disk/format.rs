//! Altair disk image formats.
//!
//! Geometry for the image types produced by the MITS, FDC+ and Tarbell
//! controllers. Only the MITS 8" formats store controller framing (track
//! and sector numbers, stop byte, checksum) inside each raw sector; the
//! others are plain 128-byte sectors.

use super::SectorLayout;

/// Image size written by simh for a MITS 8" floppy.
pub const SIMH_MITS8IN_IMAGE_SIZE: usize = 337_664;

/// MITS 8" raw sector framing: tracks 0-5 carry data at byte 3, tracks 6
/// onwards at byte 7 with the checksum moved in front of the data.
const MITS8IN_LAYOUTS: [SectorLayout; 2] = [
    SectorLayout {
        start_track: 0,
        end_track: 5,
        off_data: 3,
        off_track_nr: 0,
        off_sect_nr: 0,
        off_stop: 131,
        off_zero: 133,
        off_csum: 132,
    },
    SectorLayout {
        start_track: 6,
        end_track: 77,
        off_data: 7,
        off_track_nr: 0,
        off_sect_nr: 1,
        off_stop: 135,
        off_zero: 136,
        off_csum: 4,
    },
];

/// Physical sector (1-based) for each logical sector on MITS 8" media.
const MITS_SKEW_TABLE: [usize; 32] = [
    1, 9, 17, 25, 3, 11, 19, 27, 5, 13, 21, 29, 7, 15, 23, 31,
    2, 10, 18, 26, 4, 12, 20, 28, 6, 14, 22, 30, 8, 16, 24, 32,
];

/// First track that gets the extra MITS skew.
const MITS_SECOND_SKEW_TRACK: usize = 6;

/// Parameters of one disk image type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskFormat {
    /// Name as used on the command line, e.g. `FDD_8IN`.
    pub name: &'static str,
    /// Short human description.
    pub description: &'static str,
    /// Raw sector length in bytes, framing included.
    pub sector_len: usize,
    /// Data bytes per sector.
    pub sector_data_len: usize,
    /// Total tracks.
    pub num_tracks: usize,
    /// Tracks reserved for the operating system.
    pub reserved_tracks: usize,
    /// Sectors per track.
    pub sectors_per_track: usize,
    /// Allocation block size in bytes.
    pub block_size: usize,
    /// Directory entries.
    pub num_directories: usize,
    /// Image size in bytes, used for detection.
    pub image_size: usize,
    layouts: Option<[SectorLayout; 2]>,
    mits_skew: bool,
}

impl DiskFormat {
    /// Standard MITS 8" floppy.
    pub const MITS_8IN: DiskFormat = DiskFormat {
        name: "FDD_8IN",
        description: "MITS 8\" floppy",
        sector_len: 137,
        sector_data_len: 128,
        num_tracks: 77,
        reserved_tracks: 2,
        sectors_per_track: 32,
        block_size: 2048,
        num_directories: 64,
        image_size: 337_568,
        layouts: Some(MITS8IN_LAYOUTS),
        mits_skew: true,
    };

    /// FDC+ 8MB "floppy".
    pub const MITS_8IN_8MB: DiskFormat = DiskFormat {
        name: "FDD_8IN_8MB",
        description: "FDC+ 8MB floppy",
        sector_len: 137,
        sector_data_len: 128,
        num_tracks: 2048,
        reserved_tracks: 2,
        sectors_per_track: 32,
        block_size: 4096,
        num_directories: 512,
        image_size: 8_978_432,
        layouts: Some(MITS8IN_LAYOUTS),
        mits_skew: true,
    };

    /// MITS 5MB hard disk.
    pub const MITS_5MB_HDD: DiskFormat = DiskFormat {
        name: "HDD_5MB",
        description: "MITS 5MB hard disk",
        sector_len: 128,
        sector_data_len: 128,
        num_tracks: 406,
        reserved_tracks: 1,
        sectors_per_track: 96,
        block_size: 4096,
        num_directories: 256,
        image_size: 4_988_928,
        layouts: None,
        mits_skew: false,
    };

    /// MITS 5MB hard disk with 1024 directory entries.
    pub const MITS_5MB_HDD_1024: DiskFormat = DiskFormat {
        name: "HDD_5MB_1024",
        description: "MITS 5MB hard disk, 1024 directories",
        num_directories: 1024,
        ..Self::MITS_5MB_HDD
    };

    /// Tarbell floppy.
    pub const TARBELL_FDD: DiskFormat = DiskFormat {
        name: "FDD_TAR",
        description: "Tarbell floppy",
        sector_len: 128,
        sector_data_len: 128,
        num_tracks: 77,
        reserved_tracks: 2,
        sectors_per_track: 26,
        block_size: 1024,
        num_directories: 64,
        image_size: 256_256,
        layouts: None,
        mits_skew: false,
    };

    /// FDC+ 1.5MB floppy.
    pub const FDD_1_5MB: DiskFormat = DiskFormat {
        name: "FDD_1.5MB",
        description: "FDC+ 1.5MB floppy",
        sector_len: 128,
        sector_data_len: 128,
        num_tracks: 149,
        reserved_tracks: 1,
        sectors_per_track: 80,
        block_size: 4096,
        num_directories: 256,
        image_size: 1_525_760,
        layouts: None,
        mits_skew: false,
    };

    /// Every known format, in detection order.
    pub fn catalog() -> &'static [DiskFormat] {
        static CATALOG: [DiskFormat; 6] = [
            DiskFormat::MITS_8IN,
            DiskFormat::MITS_5MB_HDD,
            DiskFormat::MITS_5MB_HDD_1024,
            DiskFormat::TARBELL_FDD,
            DiskFormat::FDD_1_5MB,
            DiskFormat::MITS_8IN_8MB,
        ];
        &CATALOG
    }

    /// Raw sector layouts, if the controller frames its sectors.
    pub fn layouts(&self) -> Option<&[SectorLayout; 2]> {
        self.layouts.as_ref()
    }

    /// Physical sector (1-based) holding `logical` (0-based) on `track`, for
    /// formats with a known skew.
    pub fn physical_sector(&self, track: usize, logical: usize) -> Option<usize> {
        if !self.mits_skew {
            return None;
        }
        let base = *MITS_SKEW_TABLE.get(logical)?;
        if track < MITS_SECOND_SKEW_TRACK {
            Some(base)
        } else {
            Some((base - 1) * 17 % 32 + 1)
        }
    }

    /// Logical sector (0-based) stored in physical sector `physical` on `track`.
    pub fn logical_sector(&self, track: usize, physical: usize) -> Option<usize> {
        (0..MITS_SKEW_TABLE.len())
            .find(|&logical| self.physical_sector(track, logical) == Some(physical))
    }

    /// Whether an image of `len` bytes has this format.
    pub fn matches_size(&self, len: usize) -> bool {
        len == self.image_size || (self.name == Self::MITS_8IN.name && len == SIMH_MITS8IN_IMAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_sizes_match_geometry() {
        for format in DiskFormat::catalog() {
            assert_eq!(
                format.image_size,
                format.num_tracks * format.sectors_per_track * format.sector_len,
                "{} size disagrees with its geometry",
                format.name
            );
        }
    }

    #[test]
    fn only_mits_formats_have_layouts() {
        let framed: Vec<_> = DiskFormat::catalog()
            .iter()
            .filter(|f| f.layouts().is_some())
            .map(|f| f.name)
            .collect();
        assert_eq!(framed, vec!["FDD_8IN", "FDD_8IN_8MB"]);
    }

    #[test]
    fn mits_skew_is_a_permutation_on_every_track() {
        let mits = DiskFormat::MITS_8IN;
        for track in [0, 5, 6, 76] {
            let mut physical: Vec<_> = (0..32)
                .map(|logical| mits.physical_sector(track, logical).unwrap())
                .collect();
            physical.sort_unstable();
            assert_eq!(physical, (1..=32).collect::<Vec<_>>());
        }
    }

    #[test]
    fn mits_skew_values() {
        let mits = DiskFormat::MITS_8IN;
        assert_eq!(mits.physical_sector(0, 1), Some(9));
        assert_eq!(mits.physical_sector(0, 16), Some(2));
        // odd table entries are fixed, even ones move by 16
        assert_eq!(mits.physical_sector(6, 1), Some(9));
        assert_eq!(mits.physical_sector(6, 16), Some(18));
        assert_eq!(mits.logical_sector(0, 2), Some(16));
        assert_eq!(mits.logical_sector(6, 2), Some(18));
        assert_eq!(mits.logical_sector(6, 1), Some(0));
        assert_eq!(mits.physical_sector(0, 32), None);
        assert_eq!(DiskFormat::TARBELL_FDD.logical_sector(0, 1), None);
    }

    #[test]
    fn layouts_keep_data_inside_the_sector() {
        for layout in MITS8IN_LAYOUTS {
            assert!(layout.off_data + 128 <= DiskFormat::MITS_8IN.sector_len);
        }
    }
}
