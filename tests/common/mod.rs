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

    tests/common/mod.rs

    Common support routines for tests: a GCR encoder and synthetic G64
    image builders.
*/

#![allow(dead_code)]

use gcrfox::{
    bitstream_codec::gcr::GcrCodec,
    file_parsers::g64::{G64_OFFSET_LEN, G64_SIGNATURE},
    track_schema::rapidlok::{synthesize_header, RAPIDLOK_DATA_MARKER, RAPIDLOK_TRIPLE_CT},
    TrackId,
};

use hex::encode;
use sha1::{Digest, Sha1};

/// Nominal track size used by most 1541 G64 images.
pub const G64_TRACK_SIZE: u16 = 7928;

pub fn compute_slice_hash(slice: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(slice);
    let result = hasher.finalize();

    encode(result)
}

/// Deterministic payload bytes for a sector, distinct per track and sector.
pub fn test_payload(track: u8, sector: u8, len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(7).wrapping_add(track.wrapping_mul(31)) ^ sector)
        .collect()
}

/// GCR encode `data`, whose length must be a multiple of 4.
pub fn gcr_encode(data: &[u8]) -> Vec<u8> {
    assert_eq!(data.len() % 4, 0);
    let mut out = Vec::with_capacity(data.len() / 4 * 5);
    for group in data.chunks(4) {
        let bits = group
            .iter()
            .flat_map(|b| [b >> 4, b & 0x0F])
            .fold(0u64, |acc, n| (acc << 5) | GcrCodec::encode_nibble(n) as u64);
        for i in 0..5 {
            out.push((bits >> (32 - 8 * i)) as u8);
        }
    }
    out
}

/// Build one standard 1541 sector: header sync, header, gap, data sync, data block, gap.
pub fn standard_sector(track: u8, sector: u8, id: [u8; 2], payload: &[u8]) -> Vec<u8> {
    assert_eq!(payload.len(), 256);
    let header = [0x08, sector ^ track ^ id[1] ^ id[0], sector, track, id[1], id[0], 0x0F, 0x0F];

    let mut block = vec![0x07];
    block.extend_from_slice(payload);
    block.push(payload.iter().fold(0, |acc, b| acc ^ b));
    block.extend_from_slice(&[0x00, 0x00]);

    let mut out = vec![0xFF; 5];
    out.extend(gcr_encode(&header));
    out.extend([0x55; 9]);
    out.extend([0xFF; 5]);
    out.extend(gcr_encode(&block));
    out.extend([0x55; 8]);
    out
}

/// Build a standard track holding `sector_ct` sectors of [test_payload] data.
pub fn standard_track(track: u8, sector_ct: u8) -> Vec<u8> {
    (0..sector_ct)
        .flat_map(|s| standard_sector(track, s, *b"GF", &test_payload(track, s, 256)))
        .collect()
}

/// Scramble 388 payload bytes (384 data bytes and a 4-byte trailer) into Rapidlok triples.
pub fn rapidlok_scramble(payload: &[u8]) -> Vec<u8> {
    assert_eq!(payload.len(), RAPIDLOK_TRIPLE_CT * 2);
    let mut out = Vec::with_capacity(RAPIDLOK_TRIPLE_CT * 3);
    for pair in payload.chunks(2) {
        let word = !u16::from_be_bytes([pair[0], pair[1]]);
        let mut value = 0u32;
        for group in 0..8 {
            let bits = (word >> (14 - 2 * group)) & 0x03;
            value = (value << 3) | bits as u32;
        }
        out.extend_from_slice(&value.to_be_bytes()[1..]);
    }
    out
}

/// Build one Rapidlok sector: header, gap, data marker, scrambled payload, gap.
pub fn rapidlok_sector(track: u8, sector: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = synthesize_header(track, sector).to_vec();
    out.extend([0x55; 14]);
    out.extend(RAPIDLOK_DATA_MARKER);
    out.extend(rapidlok_scramble(payload));
    out.extend([0x55; 6]);
    out
}

/// Build a Rapidlok track from the sectors in `order`, using [test_payload] data.
pub fn rapidlok_track(track: u8, order: &[u8]) -> Vec<u8> {
    order
        .iter()
        .flat_map(|&s| rapidlok_sector(track, s, &test_payload(track, s, RAPIDLOK_TRIPLE_CT * 2)))
        .collect()
}

/// Build a G64 image with a full 84 entry offset table. Each track is padded with 0x55 to
/// `track_size`; its size prefix records the unpadded length.
pub fn build_g64(track_size: u16, tracks: &[(TrackId, Vec<u8>)]) -> Vec<u8> {
    let entry_ct = 84usize;
    let mut image = Vec::new();
    image.extend_from_slice(G64_SIGNATURE);
    image.push(0);
    image.push(entry_ct as u8);
    image.extend_from_slice(&track_size.to_le_bytes());

    let table_pos = image.len();
    image.resize(table_pos + entry_ct * G64_OFFSET_LEN, 0);

    for (id, data) in tracks {
        assert!(data.len() <= track_size as usize);
        let offset = image.len() as u32;
        let entry = table_pos + id.table_index() * G64_OFFSET_LEN;
        image[entry..entry + G64_OFFSET_LEN].copy_from_slice(&offset.to_le_bytes());
        image.extend_from_slice(&(data.len() as u16).to_le_bytes());
        let mut padded = data.clone();
        padded.resize(track_size as usize, 0x55);
        image.extend_from_slice(&padded);
    }
    image
}

pub fn whole(track: u8) -> TrackId {
    TrackId::whole(track).unwrap()
}
