use std::cmp::Ordering;
use std::fmt;

/// Two raw bytes taken from the image, shown as Latin-1 characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldCode(pub [u8; 2]);

impl FieldCode {
    /// Construct a code from its two raw bytes.
    pub fn new(first: u8, second: u8) -> Self {
        Self([first, second])
    }

    /// Raw bytes as read from the image.
    pub fn bytes(&self) -> [u8; 2] {
        self.0
    }

    /// Characters for the raw bytes (byte value == code point).
    pub fn chars(&self) -> [char; 2] {
        [char::from(self.0[0]), char::from(self.0[1])]
    }
}

impl fmt::Display for FieldCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b] = self.chars();
        write!(f, "{a}{b}")
    }
}

/// One marker hit: where the label starts and the decoded track/sector codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRecord {
    /// Offset of the first track byte (marker index - 4).
    ///
    /// Signed because wrapped lookback near the start of the image yields
    /// negative offsets.
    pub offset: i64,
    /// Track code, the two bytes at marker index - 4 and - 3.
    pub track: FieldCode,
    /// Sector code, the two bytes at marker index - 2 and - 1.
    pub sector: FieldCode,
}

impl MatchRecord {
    /// Construct a record.
    pub fn new(offset: i64, track: FieldCode, sector: FieldCode) -> Self {
        Self {
            offset,
            track,
            sector,
        }
    }

    /// Track bytes followed by sector bytes; the ordering key for reports.
    pub fn sort_key(&self) -> [u8; 4] {
        let [t0, t1] = self.track.bytes();
        let [s0, s1] = self.sector.bytes();
        [t0, t1, s0, s1]
    }

    /// Compare two records by their track+sector key only.
    pub fn cmp_by_label(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }

    /// Offset as an image position, if it is one.
    pub fn position(&self) -> Option<usize> {
        usize::try_from(self.offset).ok()
    }
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.offset, self.track, self.sector)
    }
}
