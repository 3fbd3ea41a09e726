/*
    GcrFox

    Copyright 2024 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------
*/

//! An implementation of the Rapidlok copy protection track schema.
//!
//! Rapidlok tracks carry no standard sync marks or GCR headers. Each sector instead begins with a
//! 7-byte header that can be computed in advance from the track and sector number, so sectors are
//! located by searching the byte-aligned track for the exact header pattern:
//!
//! ```text
//! | 0x75 | encode_pair(track, sector) | encode_pair(track ^ sector ^ 0x96, 0x96) | gap | 0xFF 0x6B | payload |
//! ```
//!
//! Sectors are not necessarily stored in logical order, so a sector's span runs from its header
//! to the next header found on the track, or to the end of the track.
//!
//! The payload is stored as 194 three-byte triples. Each triple carries 16 bits of data: the low
//! two bits of each 3-bit group of the 24-bit triple, inverted. The last 4 decoded bytes are a
//! checksum trailer and are dropped.

use crate::{
    track::Sector,
    track_schema::SectorSpan,
    types::geometry::rapidlok_sectors_per_track,
};

/// Lead byte of every Rapidlok sector header.
pub const RAPIDLOK_HEADER_LEAD: u8 = 0x75;
/// Length of a synthesized sector header.
pub const RAPIDLOK_HEADER_LEN: usize = 7;
/// Constant mixed into the second half of a sector header.
pub const RAPIDLOK_HEADER_KEY: u8 = 0x96;
/// The two bytes that open a sector payload.
pub const RAPIDLOK_DATA_MARKER: [u8; 2] = [0xFF, 0x6B];
/// The payload marker must begin before this offset from the start of the header, or the sector
/// is considered unformatted.
pub const RAPIDLOK_MARKER_WINDOW: usize = 32;
/// Number of three-byte triples in a sector payload.
pub const RAPIDLOK_TRIPLE_CT: usize = 194;
/// Length of the checksum trailer following the decoded payload.
pub const RAPIDLOK_CHECKSUM_LEN: usize = 4;
/// Length of a fully decoded sector payload.
pub const RAPIDLOK_PAYLOAD_LEN: usize = RAPIDLOK_TRIPLE_CT * 2 - RAPIDLOK_CHECKSUM_LEN;

/// 6-bit header patterns, indexed by nibble value.
#[rustfmt::skip]
pub const RAPIDLOK_NIBBLE_TABLE: [u8; 16] = [
    0x24, 0x25, 0x26, 0x27, 0x2C, 0x2D, 0x2E, 0x2F,
    0x34, 0x35, 0x36, 0x37, 0x3C, 0x3D, 0x3A, 0x3B,
];

/// Encode the byte pair `(a, x)` as three header bytes.
///
/// Each of the four nibbles is mapped through [RAPIDLOK_NIBBLE_TABLE] and the four 6-bit results
/// are packed into 24 bits, high nibble of `x` first and low nibble of `a` last.
pub fn encode_pair(a: u8, x: u8) -> [u8; 3] {
    let t = |n: u8| RAPIDLOK_NIBBLE_TABLE[(n & 0x0F) as usize] as u32;
    let mask = (t(x >> 4) << 18) | (t(x) << 12) | (t(a >> 4) << 6) | t(a);
    [(mask >> 16) as u8, (mask >> 8) as u8, mask as u8]
}

/// Compute the header Rapidlok writes in front of `sector` on `track`.
pub fn synthesize_header(track: u8, sector: u8) -> [u8; RAPIDLOK_HEADER_LEN] {
    let first = encode_pair(track, sector);
    let second = encode_pair(track ^ sector ^ RAPIDLOK_HEADER_KEY, RAPIDLOK_HEADER_KEY);

    let mut header = [0u8; RAPIDLOK_HEADER_LEN];
    header[0] = RAPIDLOK_HEADER_LEAD;
    header[1..4].copy_from_slice(&first);
    header[4..7].copy_from_slice(&second);
    header
}

/// Return the offset of the first occurrence of `pattern` in `data`.
pub fn find_pattern(data: &[u8], pattern: &[u8]) -> Option<usize> {
    if pattern.is_empty() || pattern.len() > data.len() {
        return None;
    }
    data.windows(pattern.len()).position(|w| w == pattern)
}

/// Return the offset of the payload marker within a sector span, searching only the marker
/// window following the header.
fn find_data_marker(span: &[u8]) -> Option<usize> {
    let limit = std::cmp::min(RAPIDLOK_MARKER_WINDOW, span.len().saturating_sub(1));
    (RAPIDLOK_HEADER_LEN..limit).find(|&pos| span[pos..pos + 2] == RAPIDLOK_DATA_MARKER)
}

/// Decode a scrambled payload.
///
/// At most [RAPIDLOK_TRIPLE_CT] triples are read from `data`; a trailing partial triple is
/// ignored. Two bytes are produced per triple. The checksum trailer is not removed.
pub fn unscramble(data: &[u8]) -> Vec<u8> {
    let len = std::cmp::min(data.len(), RAPIDLOK_TRIPLE_CT * 3);
    let mut out = Vec::with_capacity(len / 3 * 2);

    for triple in data[..len].chunks_exact(3) {
        let value = (triple[0] as u32) << 16 | (triple[1] as u32) << 8 | triple[2] as u32;
        let mut word = 0u16;
        for group in 0..8 {
            let bits = (value >> (21 - 3 * group)) & 0x07;
            word = (word << 2) | (bits & 0x03) as u16;
        }
        word ^= 0xFFFF;
        out.extend_from_slice(&word.to_be_bytes());
    }
    out
}

pub struct RapidlokSchema;

impl RapidlokSchema {
    pub(crate) fn locate_sectors(track: u8, data: &[u8]) -> Vec<SectorSpan> {
        let mut starts: Vec<(usize, u8)> = (0..=rapidlok_sectors_per_track(track))
            .filter_map(|sector| {
                let pos = find_pattern(data, &synthesize_header(track, sector));
                if pos.is_none() {
                    log::trace!("locate_sectors(): Track {} sector {}: header not found", track, sector);
                }
                pos.map(|pos| (pos, sector))
            })
            .collect();
        starts.sort_unstable();

        let mut spans = Vec::with_capacity(starts.len());
        for (i, &(start, sector)) in starts.iter().enumerate() {
            let end = starts.get(i + 1).map(|&(next, _)| next).unwrap_or(data.len());
            let span = &data[start..end];

            match find_data_marker(span) {
                Some(marker) => spans.push(SectorSpan {
                    index:    sector,
                    position: start,
                    header:   None,
                    data:     span[marker + RAPIDLOK_DATA_MARKER.len()..].to_vec(),
                }),
                None => {
                    log::debug!(
                        "locate_sectors(): Track {} sector {}: no data marker within {} bytes, unformatted",
                        track,
                        sector,
                        RAPIDLOK_MARKER_WINDOW
                    );
                }
            }
        }
        spans
    }

    pub(crate) fn decode_payload(span: &SectorSpan) -> Option<Sector> {
        let mut payload = unscramble(&span.data);
        if payload.len() < RAPIDLOK_TRIPLE_CT * 2 {
            log::debug!(
                "decode_payload(): Sector {}: short payload, {} of {} triples",
                span.index,
                payload.len() / 2,
                RAPIDLOK_TRIPLE_CT
            );
        }
        payload.truncate(payload.len().saturating_sub(RAPIDLOK_CHECKSUM_LEN));
        Some(Sector::new(None, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track_schema::TrackSchema;

    fn fixture_input() -> Vec<u8> {
        (0..RAPIDLOK_TRIPLE_CT * 3).map(|i| ((i * 37 + 11) & 0xFF) as u8).collect()
    }

    fn sector_bytes(track: u8, sector: u8, fill: u8) -> Vec<u8> {
        let mut out = synthesize_header(track, sector).to_vec();
        out.extend([0x55; 14]);
        out.extend(RAPIDLOK_DATA_MARKER);
        out.extend(std::iter::repeat(fill).take(RAPIDLOK_TRIPLE_CT * 3));
        out.extend([0x55; 6]);
        out
    }

    #[test]
    fn header_fixtures() {
        assert_eq!(synthesize_header(1, 0), [0x75, 0x92, 0x49, 0x25, 0xD6, 0xED, 0x6F]);
        assert_eq!(synthesize_header(18, 5), [0x75, 0x92, 0xD9, 0x66, 0xD6, 0xED, 0x25]);
        assert_eq!(synthesize_header(35, 9), [0x75, 0x93, 0x59, 0xA7, 0xD6, 0xED, 0xFC]);
    }

    #[test]
    fn header_is_deterministic() {
        assert_eq!(synthesize_header(12, 7), synthesize_header(12, 7));
        assert_ne!(synthesize_header(12, 7), synthesize_header(12, 8));
    }

    #[test]
    fn unscramble_fixture() {
        let out = unscramble(&fixture_input());
        assert_eq!(out.len(), RAPIDLOK_TRIPLE_CT * 2);
        assert_eq!(&out[..8], &[0xD4, 0xE6, 0x1A, 0x0F, 0x17, 0x34, 0x5C, 0x5D]);
        assert_eq!(&out[out.len() - 8..out.len() - 4], &[0x02, 0x94, 0x4F, 0xFD]);
    }

    #[test]
    fn unscramble_inverts() {
        assert_eq!(unscramble(&[0x00; 6]), vec![0xFF; 4]);
        assert_eq!(unscramble(&[0xFF; 6]), vec![0x00; 4]);
        // Partial triples are dropped
        assert_eq!(unscramble(&[0x00; 5]).len(), 2);
    }

    #[test]
    fn locates_out_of_order_sectors() {
        let mut data = vec![0x55; 20];
        data.extend(sector_bytes(5, 3, 0x00));
        data.extend(sector_bytes(5, 0, 0xFF));
        data.extend(sector_bytes(5, 11, 0x00));

        let spans = RapidlokSchema::locate_sectors(5, &data);
        assert_eq!(spans.iter().map(|s| s.index).collect::<Vec<_>>(), vec![3, 0, 11]);
        assert_eq!(spans[0].position, 20);

        let track = TrackSchema::Rapidlok.decode_track(5, &data);
        assert_eq!(track.slot_ct(), 12);
        assert_eq!(track.sector_ct(), 3);
        assert_eq!(track.sector(0).unwrap().data(), &[0x00; RAPIDLOK_PAYLOAD_LEN][..]);
        assert_eq!(track.sector(3).unwrap().data(), &[0xFF; RAPIDLOK_PAYLOAD_LEN][..]);
        assert!(track.sector(3).unwrap().header().is_none());
        assert!(track.sector(1).is_none());
    }

    #[test]
    fn marker_outside_window_is_unformatted() {
        let mut data = synthesize_header(20, 1).to_vec();
        data.extend([0x55; 30]);
        data.extend(RAPIDLOK_DATA_MARKER);
        data.extend([0x00; 64]);
        assert!(RapidlokSchema::locate_sectors(20, &data).is_empty());
    }

    #[test]
    fn marker_window_boundary() {
        let sector_with_marker_at = |offset: usize| {
            let mut data = synthesize_header(20, 1).to_vec();
            data.resize(offset, 0x55);
            data.extend(RAPIDLOK_DATA_MARKER);
            data.extend([0x00; 64]);
            data
        };

        let data = sector_with_marker_at(RAPIDLOK_MARKER_WINDOW - 1);
        assert_eq!(find_data_marker(&data), Some(31));
        let spans = RapidlokSchema::locate_sectors(20, &data);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].data.len(), 64);

        let data = sector_with_marker_at(RAPIDLOK_MARKER_WINDOW);
        assert_eq!(find_data_marker(&data), None);
        assert!(RapidlokSchema::locate_sectors(20, &data).is_empty());
    }

    #[test]
    fn header_at_end_of_track_is_unformatted() {
        let mut data = vec![0x55; 40];
        data.extend(synthesize_header(20, 1));
        data.push(0xFF);
        assert!(RapidlokSchema::locate_sectors(20, &data).is_empty());
    }

    #[test]
    fn short_span_is_truncated() {
        let span = SectorSpan {
            index:    2,
            position: 0,
            header:   None,
            data:     vec![0x00; 300],
        };
        let sector = RapidlokSchema::decode_payload(&span).unwrap();
        assert_eq!(sector.data().len(), 196);
    }
}
