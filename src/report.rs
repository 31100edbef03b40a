//! Report rendering for scan results.

use std::io::Write;

use anyhow::{anyhow, Result};

use crate::disk::SectorLocation;
use crate::scanner::MatchRecord;

/// A scanner hit with its physical location, when one is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportEntry {
    /// The hit.
    pub record: MatchRecord,
    /// Where the label's first byte sits, if a format was resolved and the
    /// offset falls inside it.
    pub location: Option<SectorLocation>,
}

/// Write one `offset:track:sector` line per entry, optionally followed by a
/// tab and the physical location (`-` when unknown).
pub fn write_report<W: Write>(writer: &mut W, entries: &[ReportEntry], annotate: bool) -> Result<()> {
    for entry in entries {
        if annotate {
            match entry.location {
                Some(location) => writeln!(writer, "{}\t{}", entry.record, location)?,
                None => writeln!(writer, "{}\t-", entry.record)?,
            }
        } else {
            writeln!(writer, "{}", entry.record)?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Render a report into a string (useful for tests and snapshots).
pub fn render_report(entries: &[ReportEntry], annotate: bool) -> Result<String> {
    let mut buffer = Vec::new();
    write_report(&mut buffer, entries, annotate)?;
    String::from_utf8(buffer).map_err(|_| anyhow!("rendered report is not valid UTF-8"))
}
