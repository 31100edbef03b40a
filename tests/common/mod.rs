#![allow(dead_code)]

use std::fs;
use std::path::Path;

use dskscan::DiskFormat;

const UPDATE_VAR: &str = "DSKSCAN_UPDATE_SNAPSHOTS";

/// Compare `actual` against `tests/snapshots/<name>`, reporting the first
/// differing line. With `DSKSCAN_UPDATE_SNAPSHOTS` set the file is rewritten.
pub fn assert_snapshot(name: &str, actual: &str) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/snapshots")
        .join(name);

    if std::env::var_os(UPDATE_VAR).is_some() {
        write_snapshot(&path, actual);
        return;
    }

    let expected = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("cannot read snapshot {}: {err}", path.display()));
    if let Some((line, want, got)) = first_difference(&expected, actual) {
        panic!(
            "{} differs at line {line}\n  expected: {want:?}\n  actual:   {got:?}\nrerun with {UPDATE_VAR}=1 to accept",
            path.display()
        );
    }
}

fn write_snapshot(path: &Path, contents: &str) {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).expect("create snapshot directory");
    }
    fs::write(path, contents).expect("write snapshot");
}

/// One-based line number and both sides of the first mismatch. Line endings
/// are compared without their `\r`.
fn first_difference<'a>(expected: &'a str, actual: &'a str) -> Option<(usize, &'a str, &'a str)> {
    let mut want = expected.lines();
    let mut got = actual.lines();
    let mut line = 1;
    loop {
        match (want.next(), got.next()) {
            (None, None) => return None,
            (w, g) if w == g => line += 1,
            (w, g) => return Some((line, w.unwrap_or("<end>"), g.unwrap_or("<end>"))),
        }
    }
}

/// Blank image of `format`'s size with `label` + `XX` written at each offset.
pub fn labelled_image(format: &DiskFormat, labels: &[(usize, &[u8; 4])]) -> Vec<u8> {
    let mut image = vec![0u8; format.image_size];
    for (offset, label) in labels {
        image[*offset..*offset + 4].copy_from_slice(&label[..]);
        image[*offset + 4..*offset + 6].copy_from_slice(b"XX");
    }
    image
}

/// Offset of the first data byte of a physical sector on a MITS 8" image.
pub fn mits_data_offset(track: usize, sector: usize) -> usize {
    let format = DiskFormat::MITS_8IN;
    let layout = format.layout(track).expect("MITS formats are framed");
    track * format.track_len() + (sector - 1) * format.sector_len + layout.off_data
}
