mod common;

use common::*;
use gcrfox::{
    prelude::*,
    rapidlok_sectors_per_track,
    track_schema::rapidlok::{RAPIDLOK_PAYLOAD_LEN, RAPIDLOK_TRIPLE_CT},
    CopyProtectionScheme,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Physical sector order used by the synthetic protected tracks.
const TRACK_1_ORDER: [u8; 12] = [0, 6, 1, 7, 2, 8, 3, 9, 4, 10, 5, 11];
const TRACK_19_ORDER: [u8; 11] = [5, 0, 6, 1, 7, 2, 8, 3, 9, 4, 10];

fn protected_image() -> Vec<u8> {
    build_g64(
        G64_TRACK_SIZE,
        &[
            (whole(1), rapidlok_track(1, &TRACK_1_ORDER)),
            (whole(2), rapidlok_track(2, &TRACK_1_ORDER)),
            (whole(18), standard_track(18, 19)),
            // Sector 4 is missing from track 19.
            (whole(19), rapidlok_track(19, &[5, 0, 6, 1, 7, 2, 8, 3, 9, 10])),
        ],
    )
}

fn protected_options() -> DecodeOptions {
    DecodeOptions::new(TrackSchema::Rapidlok).with_range(18..=18, Some(TrackSchema::CbmGcr))
}

#[test]
fn test_rapidlok_detect() {
    init();
    let image = G64Image::from_bytes(&protected_image()).unwrap();
    assert_eq!(image.detect_copy_protection(), Some(CopyProtectionScheme::Rapidlok));
}

#[test]
fn test_rapidlok_tracks() {
    init();
    let image = G64Image::from_bytes(&protected_image()).unwrap();
    let side = DiskSide::decode(&image, &protected_options());

    let track = side.track(1).unwrap();
    assert_eq!(track.schema(), TrackSchema::Rapidlok);
    assert_eq!(track.slot_ct(), rapidlok_sectors_per_track(1) as usize + 1);
    assert_eq!(track.sector_ct(), 12);

    for (slot, sector) in track.iter_sectors() {
        let expected = test_payload(1, slot as u8, RAPIDLOK_TRIPLE_CT * 2);
        assert_eq!(sector.data(), &expected[..RAPIDLOK_PAYLOAD_LEN]);
        assert!(sector.header().is_none());
        assert_eq!(sector.checksum_valid(), None);
    }

    let track = side.track(19).unwrap();
    assert_eq!(track.slot_ct(), 11);
    assert_eq!(track.sector_ct(), 10);
    assert!(track.sector(4).is_none());
    assert_eq!(
        track.sector(10).unwrap().data(),
        &test_payload(19, 10, RAPIDLOK_TRIPLE_CT * 2)[..RAPIDLOK_PAYLOAD_LEN]
    );

    // The directory track is standard GCR.
    let track = side.track(18).unwrap();
    assert_eq!(track.schema(), TrackSchema::CbmGcr);
    assert_eq!(track.sector_ct(), 19);
}

#[test]
fn test_rapidlok_auto_schema() {
    init();
    let image = G64Image::from_bytes(&protected_image()).unwrap();
    let side = DiskSide::decode(&image, &DecodeOptions::auto());

    assert_eq!(side.track(1).unwrap().schema(), TrackSchema::Rapidlok);
    assert_eq!(side.track(18).unwrap().schema(), TrackSchema::CbmGcr);
    assert_eq!(side.track(19).unwrap().sector_ct(), 10);
    assert_eq!(side.sector_ct(), 12 + 12 + 19 + 10);
}

#[test]
fn test_rapidlok_wrong_schema_finds_nothing() {
    init();
    let image = G64Image::from_bytes(&protected_image()).unwrap();
    let side = DiskSide::decode(&image, &DecodeOptions::new(TrackSchema::CbmGcr));
    let track = side.track(1).unwrap();
    assert_eq!(track.slot_ct(), 21);
    assert_eq!(track.sector_ct(), 0);
}

#[test]
fn test_rapidlok_golden_payload() {
    init();
    let raw: Vec<u8> = (0..RAPIDLOK_TRIPLE_CT * 3).map(|i| ((i * 37 + 11) & 0xFF) as u8).collect();

    let mut data = vec![0x55; 100];
    data.extend(gcrfox::track_schema::rapidlok::synthesize_header(7, 3));
    data.extend([0x55; 14]);
    data.extend([0xFF, 0x6B]);
    data.extend(&raw);

    let track = TrackSchema::Rapidlok.decode_track(7, &data);
    let sector = track.sector(3).unwrap();
    assert_eq!(sector.data().len(), RAPIDLOK_PAYLOAD_LEN);
    assert_eq!(
        compute_slice_hash(sector.data()),
        "9c5023cbebdfc6e7a39b538f329c46c160547bfb"
    );
}

#[test]
fn test_rapidlok_read_span() {
    init();
    let image = G64Image::from_bytes(&protected_image()).unwrap();
    let side = DiskSide::decode(&image, &protected_options());
    let set = DiskSet::new().with_side(side);

    let start = DiskLocation::new(1, 1, 10).with_offset(2);
    let end = DiskLocation::new(1, 2, 1);
    let span = set.read_span(&start, &end, TrackSchema::Rapidlok).unwrap();
    assert_eq!(span.len(), 4 * RAPIDLOK_PAYLOAD_LEN - 2);

    let mut expected = Vec::new();
    for (t, s) in [(1, 10), (1, 11), (2, 0), (2, 1)] {
        expected.extend_from_slice(&test_payload(t, s, RAPIDLOK_TRIPLE_CT * 2)[..RAPIDLOK_PAYLOAD_LEN]);
    }
    assert_eq!(span, expected[2..]);

    let mut location = start;
    location.add_sector_index_in(3, TrackSchema::Rapidlok);
    assert!(location.same_sector(&end));
    assert_eq!(
        set.sector(&location).unwrap().data(),
        &test_payload(2, 1, RAPIDLOK_TRIPLE_CT * 2)[..RAPIDLOK_PAYLOAD_LEN]
    );
}
