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

//! The `track` module defines the decoded disk structures produced by a
//! [TrackSchema](crate::track_schema::TrackSchema): [Track], [Sector] and [SectorHeader].
//!
//! These structures do not depend on the schema that produced them. A [Track] holds one slot
//! per sector index the schema expects on that track; a slot is `None` when the sector could
//! not be located or decoded. Gaps are normal and do not indicate a failed track.

use crate::{bitstream_codec::gcr::GcrCodec, track_schema::TrackSchema, GcrFoxError};
use sha1_smol::{Digest, Sha1};
use std::fmt::{self, Display, Formatter};

/// Length of a GCR encoded sector header, in bytes.
pub const HEADER_GCR_LEN: usize = 10;
/// Block id byte that starts a standard sector header.
pub const HEADER_BLOCK_ID: u8 = 0x08;
/// Block id byte that starts a standard sector data block.
pub const DATA_BLOCK_ID: u8 = 0x07;

/// A standard 1541 sector header.
///
/// Decoded from the 10 GCR bytes that follow a header sync. Rapidlok sectors have no header
/// of this form; their address is implied by the synthesized pattern used to locate them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectorHeader {
    pub block_id:       u8,
    pub block_checksum: u8,
    pub sector:         u8,
    pub track:          u8,
    pub format_id_2:    u8,
    pub format_id_1:    u8,
}

impl SectorHeader {
    /// Build a [SectorHeader] from decoded header bytes. At least 6 bytes are required.
    pub fn from_decoded(bytes: &[u8]) -> Option<SectorHeader> {
        match bytes {
            [block_id, block_checksum, sector, track, format_id_2, format_id_1, ..] => Some(SectorHeader {
                block_id:       *block_id,
                block_checksum: *block_checksum,
                sector:         *sector,
                track:          *track,
                format_id_2:    *format_id_2,
                format_id_1:    *format_id_1,
            }),
            _ => None,
        }
    }

    /// Decode a [SectorHeader] from its GCR encoding.
    pub fn from_gcr(gcr_bytes: &[u8]) -> Result<SectorHeader, GcrFoxError> {
        let decoded = GcrCodec::decode(gcr_bytes)?;
        SectorHeader::from_decoded(&decoded)
            .ok_or_else(|| GcrFoxError::FormatError(format!("Sector header too short: {} bytes", decoded.len())))
    }

    /// Return the two-character disk format id, first id byte first.
    pub fn format_id(&self) -> String {
        [self.format_id_1 as char, self.format_id_2 as char].iter().collect()
    }

    /// Return true if the stored header checksum matches the header contents.
    pub fn checksum_valid(&self) -> bool {
        self.block_checksum == self.sector ^ self.track ^ self.format_id_2 ^ self.format_id_1
    }
}

impl Display for SectorHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Track {} Sector {} ID: {} Checksum: {:02x}",
            self.track,
            self.sector,
            self.format_id(),
            self.block_checksum
        )
    }
}

/// A decoded sector.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sector {
    header:         Option<SectorHeader>,
    data:           Vec<u8>,
    checksum_valid: Option<bool>,
    gcr_faults:     usize,
}

impl Sector {
    pub fn new(header: Option<SectorHeader>, data: Vec<u8>) -> Sector {
        Sector {
            header,
            data,
            checksum_valid: None,
            gcr_faults:     0,
        }
    }

    pub(crate) fn with_checksum(mut self, valid: bool) -> Sector {
        self.checksum_valid = Some(valid);
        self
    }

    pub(crate) fn with_gcr_faults(mut self, faults: usize) -> Sector {
        self.gcr_faults = faults;
        self
    }

    /// Return the sector header, if the schema that produced this sector decodes one.
    pub fn header(&self) -> Option<&SectorHeader> {
        self.header.as_ref()
    }

    /// Return the decoded sector payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Return whether the data checksum matched, or `None` if the schema does not verify one.
    pub fn checksum_valid(&self) -> Option<bool> {
        self.checksum_valid
    }

    /// Return the number of invalid GCR codewords encountered decoding this sector.
    pub fn gcr_faults(&self) -> usize {
        self.gcr_faults
    }
}

impl Display for Sector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.header {
            Some(header) => write!(f, "Sector - {} ({} bytes)", header, self.data.len()),
            None => write!(f, "Sector - ({} bytes)", self.data.len()),
        }
    }
}

/// A decoded track.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Track {
    track:   u8,
    schema:  TrackSchema,
    sectors: Vec<Option<Sector>>,
    raw:     Vec<u8>,
}

impl Track {
    pub(crate) fn new(track: u8, schema: TrackSchema, sectors: Vec<Option<Sector>>, raw: Vec<u8>) -> Track {
        Track {
            track,
            schema,
            sectors,
            raw,
        }
    }

    /// Return the track number.
    pub fn track_number(&self) -> u8 {
        self.track
    }

    /// Return the schema used to decode this track.
    pub fn schema(&self) -> TrackSchema {
        self.schema
    }

    /// Return the sector in slot `index`, or `None` if the slot is empty or out of range.
    pub fn sector(&self, index: usize) -> Option<&Sector> {
        self.sectors.get(index).and_then(|s| s.as_ref())
    }

    /// Return all sector slots, present or absent.
    pub fn sectors(&self) -> &[Option<Sector>] {
        &self.sectors
    }

    /// Return the number of sector slots on this track.
    pub fn slot_ct(&self) -> usize {
        self.sectors.len()
    }

    /// Return the number of slots holding a decoded sector.
    pub fn sector_ct(&self) -> usize {
        self.sectors.iter().filter(|s| s.is_some()).count()
    }

    /// Iterate over present sectors as `(slot index, sector)` pairs.
    pub fn iter_sectors(&self) -> impl Iterator<Item = (usize, &Sector)> {
        self.sectors
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (i, s)))
    }

    /// Return the raw track bytes the track was decoded from, without the size prefix.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Return a hash that uniquely identifies the raw track data. Intended for use in
    /// identifying duplicate tracks.
    pub fn hash(&self) -> Digest {
        let mut hasher = Sha1::new();
        hasher.update(&self.raw);
        hasher.digest()
    }
}

impl Display for Track {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Track {} [{}]: {}/{} sectors",
            self.track,
            self.schema,
            self.sector_ct(),
            self.slot_ct()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_from_decoded_bytes() {
        let header = SectorHeader::from_decoded(&[0x08, 0x05 ^ 0x12 ^ 0x41 ^ 0x42, 0x05, 0x12, 0x41, 0x42, 0x0F, 0x0F])
            .unwrap();
        assert_eq!(header.sector, 5);
        assert_eq!(header.track, 18);
        assert_eq!(header.format_id(), "BA");
        assert!(header.checksum_valid());
        assert_eq!(header.to_string(), "Track 18 Sector 5 ID: BA Checksum: 14");
        assert!(SectorHeader::from_decoded(&[0x08, 0x00]).is_none());
    }

    #[test]
    fn track_slots() {
        let sectors = vec![Some(Sector::new(None, vec![1, 2, 3])), None, Some(Sector::new(None, vec![4]))];
        let track = Track::new(3, TrackSchema::Rapidlok, sectors, vec![0x55; 16]);
        assert_eq!(track.slot_ct(), 3);
        assert_eq!(track.sector_ct(), 2);
        assert!(track.sector(1).is_none());
        assert!(track.sector(7).is_none());
        assert_eq!(track.sector(2).unwrap().data(), &[4]);
        assert_eq!(track.iter_sectors().map(|(i, _)| i).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn identical_tracks_hash_equal() {
        let a = Track::new(1, TrackSchema::CbmGcr, vec![None], vec![0x55; 64]);
        let b = Track::new(1, TrackSchema::CbmGcr, vec![None], vec![0x55; 64]);
        let c = Track::new(1, TrackSchema::CbmGcr, vec![None], vec![0x52; 64]);
        assert_eq!(a.hash(), b.hash());
        assert_ne!(a.hash(), c.hash());
    }
}
