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

//! A decoder for the Commodore 1541's GCR (Group Code Recording) line code.
//!
//! The 1541 writes each 4-bit nibble as a 5-bit codeword chosen so that no more than two 0
//! bits appear in a row and no more than eight 1 bits, which lets a run of ten or more 1 bits
//! serve as a sync mark. Only 16 of the 32 possible 5-bit patterns are valid codewords.
//!
//! Five GCR bytes (40 bits, eight codewords) decode to four data bytes:
//!
//! ```text
//!  GCR bytes  |  byte 0  |  byte 1  |  byte 2  |  byte 3  |  byte 4  |
//!  codewords  | 0    | 1     | 2    | 3     | 4    | 5    | 6     | 7    |
//!  data       |   byte 0     |    byte 1    |    byte 2   |    byte 3   |
//! ```
//!
//! An invalid codeword does not abort decoding. Its nibble is replaced with
//! [GCR_INVALID_NIBBLE] and a [GcrFault] is recorded.

use crate::GcrFoxError;

/// Length of an encoded GCR group in bytes.
pub const GCR_GROUP_LEN: usize = 5;
/// Length of a decoded GCR group in bytes.
pub const GCR_DECODED_GROUP_LEN: usize = 4;
/// Number of 5-bit codewords in a GCR group.
pub const GCR_CODEWORDS_PER_GROUP: usize = 8;
/// Sentinel nibble value substituted for an invalid codeword.
pub const GCR_INVALID_NIBBLE: u8 = 0xFF;

/// GCR codewords, indexed by the nibble they encode.
#[rustfmt::skip]
pub const GCR_ENCODE_TABLE: [u8; 16] = [
    0b01010, 0b01011, 0b10010, 0b10011,
    0b01110, 0b01111, 0b10110, 0b10111,
    0b01001, 0b11001, 0b11010, 0b11011,
    0b01101, 0b11101, 0b11110, 0b10101,
];

const fn generate_decode_table() -> [u8; 32] {
    let mut table = [GCR_INVALID_NIBBLE; 32];
    let mut i = 0;
    while i < 16 {
        table[GCR_ENCODE_TABLE[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Nibble values, indexed by 5-bit codeword. Invalid codewords map to [GCR_INVALID_NIBBLE].
pub const GCR_DECODE_TABLE: [u8; 32] = generate_decode_table();

/// A [GcrFault] records an invalid codeword encountered while decoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GcrFault {
    /// Byte offset of the faulting 5-byte group within the GCR input.
    pub group_offset: usize,
    /// Index (0-7) of the codeword within its group.
    pub position:     usize,
    /// The invalid 5-bit codeword.
    pub codeword:     u8,
}

pub struct GcrCodec;

impl GcrCodec {
    /// Look up a single 5-bit codeword. Returns `None` for the 16 invalid patterns.
    #[inline]
    pub fn decode_codeword(codeword: u8) -> Option<u8> {
        match GCR_DECODE_TABLE[(codeword & 0x1F) as usize] {
            GCR_INVALID_NIBBLE => None,
            nibble => Some(nibble),
        }
    }

    /// Return the 5-bit codeword for the low nibble of `nibble`.
    #[inline]
    pub fn encode_nibble(nibble: u8) -> u8 {
        GCR_ENCODE_TABLE[(nibble & 0x0F) as usize]
    }

    /// Split a 5-byte GCR group into its eight 5-bit codewords, most significant first.
    pub fn group_codewords(group: &[u8; GCR_GROUP_LEN]) -> [u8; GCR_CODEWORDS_PER_GROUP] {
        let bits = group
            .iter()
            .fold(0u64, |acc, &byte| (acc << 8) | byte as u64);

        let mut codewords = [0u8; GCR_CODEWORDS_PER_GROUP];
        for (i, codeword) in codewords.iter_mut().enumerate() {
            *codeword = ((bits >> (35 - 5 * i)) & 0x1F) as u8;
        }
        codewords
    }

    /// Decode GCR bytes into a nibble per codeword. Invalid codewords produce
    /// [GCR_INVALID_NIBBLE] and a [GcrFault] pushed to `faults`.
    pub fn decode_nibbles(gcr_bytes: &[u8], faults: &mut Vec<GcrFault>) -> Result<Vec<u8>, GcrFoxError> {
        if gcr_bytes.len() % GCR_GROUP_LEN != 0 {
            return Err(GcrFoxError::FormatError(format!(
                "GCR data length {} is not a multiple of {}",
                gcr_bytes.len(),
                GCR_GROUP_LEN
            )));
        }

        let mut nibbles = Vec::with_capacity(gcr_bytes.len() / GCR_GROUP_LEN * GCR_CODEWORDS_PER_GROUP);
        for (gi, chunk) in gcr_bytes.chunks_exact(GCR_GROUP_LEN).enumerate() {
            let group: &[u8; GCR_GROUP_LEN] = chunk.try_into().map_err(|_| {
                GcrFoxError::FormatError(format!("Short GCR group at offset {}", gi * GCR_GROUP_LEN))
            })?;
            for (position, codeword) in GcrCodec::group_codewords(group).into_iter().enumerate() {
                match GcrCodec::decode_codeword(codeword) {
                    Some(nibble) => nibbles.push(nibble),
                    None => {
                        let fault = GcrFault {
                            group_offset: gi * GCR_GROUP_LEN,
                            position,
                            codeword,
                        };
                        log::warn!(
                            "GCR error - invalid codeword {:05b} at position {} of group at offset {}: {:02X?}",
                            codeword,
                            position,
                            fault.group_offset,
                            group
                        );
                        faults.push(fault);
                        nibbles.push(GCR_INVALID_NIBBLE);
                    }
                }
            }
        }
        Ok(nibbles)
    }

    /// Decode GCR bytes, returning the decoded bytes along with any codeword faults.
    ///
    /// The length of `gcr_bytes` must be a multiple of 5. The output is always 4/5 of the input
    /// length, regardless of faults.
    pub fn decode_with_faults(gcr_bytes: &[u8]) -> Result<(Vec<u8>, Vec<GcrFault>), GcrFoxError> {
        let mut faults = Vec::new();
        let nibbles = GcrCodec::decode_nibbles(gcr_bytes, &mut faults)?;

        // An invalid high nibble shifts down to 0xF0; an invalid low nibble saturates the byte.
        let bytes = nibbles.chunks_exact(2).map(|pair| (pair[0] << 4) | pair[1]).collect();
        Ok((bytes, faults))
    }

    /// Decode GCR bytes. Codeword faults are logged but otherwise ignored.
    pub fn decode(gcr_bytes: &[u8]) -> Result<Vec<u8>, GcrFoxError> {
        GcrCodec::decode_with_faults(gcr_bytes).map(|(bytes, _)| bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_group(data: [u8; 4]) -> [u8; 5] {
        let bits = data
            .iter()
            .flat_map(|b| [b >> 4, b & 0x0F])
            .fold(0u64, |acc, n| (acc << 5) | GcrCodec::encode_nibble(n) as u64);
        let mut out = [0u8; 5];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = (bits >> (32 - 8 * i)) as u8;
        }
        out
    }

    #[test]
    fn every_codeword_round_trips() {
        for nibble in 0..16u8 {
            let codeword = GcrCodec::encode_nibble(nibble);
            assert_eq!(GcrCodec::decode_codeword(codeword), Some(nibble));
        }
    }

    #[test]
    fn exactly_sixteen_valid_codewords() {
        let valid = (0..32u8).filter(|cw| GcrCodec::decode_codeword(*cw).is_some()).count();
        assert_eq!(valid, 16);
        assert_eq!(GcrCodec::decode_codeword(0b00000), None);
        assert_eq!(GcrCodec::decode_codeword(0b11111), None);
    }

    #[test]
    fn table_fixtures() {
        assert_eq!(GcrCodec::decode_codeword(0b01010), Some(0));
        assert_eq!(GcrCodec::decode_codeword(0b01011), Some(1));
        assert_eq!(GcrCodec::decode_codeword(0b10010), Some(2));
        assert_eq!(GcrCodec::decode_codeword(0b10101), Some(15));
    }

    #[test]
    fn decodes_literal_group() {
        // 0x08 0x00 0x01 0x12: a header block id, checksum, sector 1, track 18
        // 01010 01001 01010 01010 01010 01011 01011 10010
        let group = [0x52, 0x54, 0xA5, 0x2D, 0x72];
        assert_eq!(GcrCodec::decode(&group).unwrap(), vec![0x08, 0x00, 0x01, 0x12]);
        assert_eq!(encode_group([0x08, 0x00, 0x01, 0x12]), group);
    }

    #[test]
    fn splits_group_into_codewords() {
        let group = [0x52, 0x54, 0xA5, 0x2D, 0x72];
        assert_eq!(
            GcrCodec::group_codewords(&group),
            [0b01010, 0b01001, 0b01010, 0b01010, 0b01010, 0b01011, 0b01011, 0b10010]
        );
    }

    #[test]
    fn rejects_partial_group() {
        assert!(matches!(
            GcrCodec::decode(&[0x52, 0x55, 0x29]),
            Err(GcrFoxError::FormatError(_))
        ));
    }

    #[test]
    fn invalid_codeword_is_recoverable() {
        let mut gcr = Vec::new();
        gcr.extend_from_slice(&encode_group([0x12, 0x34, 0x56, 0x78]));
        gcr.extend_from_slice(&encode_group([0x9A, 0xBC, 0xDE, 0xF0]));
        gcr.extend_from_slice(&encode_group([0x11, 0x22, 0x33, 0x44]));

        // Replace codeword 3 of the middle group (low nibble of 0xBC) with 00000.
        // Codeword 3 occupies bits 15-19 of the group: byte 1 bit 0 and byte 2 bits 7-4.
        gcr[6] &= 0xFE;
        gcr[7] &= 0x0F;

        let mut faults = Vec::new();
        let nibbles = GcrCodec::decode_nibbles(&gcr, &mut faults).unwrap();
        assert_eq!(nibbles.len(), 24);
        assert_eq!(nibbles.iter().filter(|n| **n == GCR_INVALID_NIBBLE).count(), 1);
        assert_eq!(nibbles[8 + 3], GCR_INVALID_NIBBLE);
        assert_eq!(
            faults,
            vec![GcrFault {
                group_offset: 5,
                position:     3,
                codeword:     0,
            }]
        );

        let (bytes, faults) = GcrCodec::decode_with_faults(&gcr).unwrap();
        assert_eq!(faults.len(), 1);
        assert_eq!(
            bytes,
            vec![0x12, 0x34, 0x56, 0x78, 0x9A, 0xFF, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44]
        );
    }
}
