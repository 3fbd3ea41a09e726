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

//! An implementation of the standard Commodore 1541 track schema.
//!
//! Each sector on a standard track consists of two blocks, each preceded by a sync mark:
//!
//! ```text
//! | sync | header (10 GCR bytes) | gap | sync | data block (325 GCR bytes) | gap |
//! ```
//!
//! The header decodes to 8 bytes: block id (0x08), checksum, sector, track, two format id bytes
//! and two 0x0F pad bytes. The data block decodes to 260 bytes: block id (0x07), 256 bytes of
//! payload, a checksum byte and two pad bytes.
//!
//! Sectors are read sequentially from the start of the track, one slot per expected sector. A
//! slot whose sync marks cannot be found is left empty and reading continues with the next slot
//! from wherever the cursor stopped.

use crate::{
    bit_cursor::{BitCursor, SYNC_MIN_RUN},
    bitstream_codec::gcr::GcrCodec,
    track::{Sector, SectorHeader, DATA_BLOCK_ID, HEADER_BLOCK_ID, HEADER_GCR_LEN},
    track_schema::SectorSpan,
    types::geometry::sectors_per_track,
};

/// Length of a GCR encoded data block, in bytes.
pub const DATA_GCR_LEN: usize = 325;
/// Length of a sector payload, in bytes.
pub const SECTOR_PAYLOAD_LEN: usize = 256;
/// Index of the checksum byte within a decoded data block.
const DATA_CHECKSUM_INDEX: usize = SECTOR_PAYLOAD_LEN + 1;

pub struct CbmGcrSchema;

impl CbmGcrSchema {
    pub(crate) fn locate_sectors(track: u8, data: &[u8]) -> Vec<SectorSpan> {
        let mut cursor = BitCursor::from_bytes(data);
        let slot_ct = sectors_per_track(track) as usize + 1;
        let mut spans = Vec::with_capacity(slot_ct);

        for index in 0..slot_ct {
            match CbmGcrSchema::read_sector(&mut cursor, index as u8) {
                Some(span) => spans.push(span),
                None => {
                    log::trace!(
                        "locate_sectors(): Track {} slot {}: no sector found at bit {}",
                        track,
                        index,
                        cursor.position()
                    );
                }
            }
        }
        spans
    }

    /// Read the header and data block of the next sector from `cursor`.
    pub fn read_sector(cursor: &mut BitCursor, index: u8) -> Option<SectorSpan> {
        cursor.find_sync(SYNC_MIN_RUN)?;
        let header_gcr = cursor.read_bytes(HEADER_GCR_LEN)?;
        let header = SectorHeader::from_gcr(&header_gcr).ok()?;
        if header.block_id != HEADER_BLOCK_ID {
            log::debug!(
                "read_sector(): Unexpected header block id {:02X} for slot {}",
                header.block_id,
                index
            );
        }

        cursor.find_sync(SYNC_MIN_RUN)?;
        let position = cursor.position() / 8;
        let data = cursor.read_bytes(DATA_GCR_LEN)?;

        Some(SectorSpan {
            index,
            position,
            header: Some(header),
            data,
        })
    }

    pub(crate) fn decode_payload(span: &SectorSpan) -> Option<Sector> {
        let (decoded, faults) = match GcrCodec::decode_with_faults(&span.data) {
            Ok(result) => result,
            Err(e) => {
                log::warn!("decode_payload(): Slot {}: {}", span.index, e);
                return None;
            }
        };

        if decoded.len() <= DATA_CHECKSUM_INDEX {
            log::warn!(
                "decode_payload(): Slot {}: data block too short: {} bytes",
                span.index,
                decoded.len()
            );
            return None;
        }

        if decoded[0] != DATA_BLOCK_ID {
            log::debug!(
                "decode_payload(): Unexpected data block id {:02X} for slot {}",
                decoded[0],
                span.index
            );
        }

        let payload = &decoded[1..DATA_CHECKSUM_INDEX];
        let calculated = payload.iter().fold(0u8, |acc, b| acc ^ b);
        let stored = decoded[DATA_CHECKSUM_INDEX];
        if calculated != stored {
            log::debug!(
                "decode_payload(): Slot {}: data checksum mismatch, stored {:02X} calculated {:02X}",
                span.index,
                stored,
                calculated
            );
        }

        Some(
            Sector::new(span.header, payload.to_vec())
                .with_checksum(calculated == stored)
                .with_gcr_faults(faults.len()),
        )
    }
}
