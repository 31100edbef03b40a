use proptest::prelude::*;
use dskscan::{LookbackPolicy, Marker, MarkerScanner, MARKER_LOOKBACK};

/// Bytes drawn mostly from the marker byte and a few others so runs occur.
fn image_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(
        prop_oneof![Just(b'X'), Just(b'0'), Just(b'1'), Just(0u8), Just(0xffu8)],
        0..max_len,
    )
}

fn marker_starts(image: &[u8]) -> Vec<usize> {
    (0..image.len().saturating_sub(1))
        .filter(|&i| image[i] == b'X' && image[i + 1] == b'X')
        .filter(|&i| i == 0 || image[i - 1] != b'X')
        .collect()
}

proptest! {
    #[test]
    fn images_without_marker_bytes_have_no_hits(
        image in proptest::collection::vec(any::<u8>().prop_filter("no X", |b| *b != b'X'), 0..256),
    ) {
        let outcome = MarkerScanner::default().scan(&image).expect("skip never fails");
        prop_assert!(outcome.records.is_empty());
        prop_assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn hits_are_decoded_from_the_image(image in image_bytes(128)) {
        let outcome = MarkerScanner::default().scan(&image).expect("skip never fails");

        for record in &outcome.records {
            let start = record.position().expect("skip yields non-negative offsets");
            prop_assert_eq!(&image[start + 4..start + 6], b"XX");
            prop_assert_ne!(image[start + 3], b'X');
            prop_assert_eq!(record.track.bytes(), [image[start], image[start + 1]]);
            prop_assert_eq!(record.sector.bytes(), [image[start + 2], image[start + 3]]);
        }
    }

    #[test]
    fn every_marker_is_reported_once(image in image_bytes(128)) {
        let outcome = MarkerScanner::default().scan(&image).expect("skip never fails");
        let starts = marker_starts(&image);

        let mut seen: Vec<usize> = outcome
            .records
            .iter()
            .map(|r| r.position().expect("non-negative") + MARKER_LOOKBACK)
            .chain(outcome.skipped.iter().copied())
            .collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, starts);
    }

    #[test]
    fn hits_are_sorted_by_label(image in image_bytes(256)) {
        let outcome = MarkerScanner::default().scan(&image).expect("skip never fails");
        for pair in outcome.records.windows(2) {
            prop_assert!(pair[0].sort_key() <= pair[1].sort_key());
            if pair[0].sort_key() == pair[1].sort_key() {
                prop_assert!(pair[0].offset < pair[1].offset);
            }
        }
    }

    #[test]
    fn wrap_agrees_with_skip_past_the_start(image in image_bytes(128)) {
        let skip = MarkerScanner::new(Marker::default(), LookbackPolicy::Skip)
            .scan(&image)
            .expect("skip never fails");
        let wrap = MarkerScanner::new(Marker::default(), LookbackPolicy::Wrap)
            .scan(&image)
            .expect("wrap never fails");

        let wrapped_tail: Vec<_> = wrap.records.iter().filter(|r| r.offset >= 0).collect();
        let skipped_tail: Vec<_> = skip.records.iter().collect();
        prop_assert_eq!(wrapped_tail, skipped_tail);
        prop_assert!(wrap.records.iter().all(|r| r.offset >= -(MARKER_LOOKBACK as i64)));
    }
}
