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

//! A parser for the G64 disk image format.
//!
//! G64 images store the raw GCR byte stream of each track of a Commodore 1541 disk, as
//! produced by a nibbler or emulator. Each whole track and half-track has a slot in a track
//! offset table; an offset of 0 means the track was not captured.
//!
//! ```text
//! 0x00  signature          8 bytes  "GCR-1541"
//! 0x08  version            1 byte
//! 0x09  track count        1 byte
//! 0x0A  track size         2 bytes  little-endian, maximum stored track size
//! 0x0C  track offsets      track count * 4 bytes, little-endian
//! ....  track data         2-byte little-endian length prefix + raw GCR bytes
//! ```
//!
//! The parser only frames the container. It owns no decoding logic; see
//! [TrackSchema](crate::track_schema::TrackSchema) for that.

use crate::{
    types::track_id::{TrackId, MAX_TRACK_ENTRIES},
    util::dump_slice,
    GcrFoxError,
};
use binrw::{binrw, BinRead};
use std::{
    collections::BTreeMap,
    io::{Cursor, Write},
    path::{Path, PathBuf},
};

pub const G64_SIGNATURE: &[u8; 8] = b"GCR-1541";
pub const G64_HEADER_LEN: usize = 12;
pub const G64_OFFSET_LEN: usize = 4;
/// Length of the little-endian size prefix preceding each track's data.
pub const TRACK_SIZE_PREFIX_LEN: usize = 2;

#[derive(Debug)]
#[binrw]
#[brw(little)]
struct G64FileHeader {
    signature:  [u8; 8],
    version:    u8,
    track_ct:   u8,
    track_size: u16,
}

/// The raw bytes of a single track, as stored in the container.
#[derive(Clone, Debug)]
pub struct TrackData {
    id:     TrackId,
    offset: u32,
    raw:    Vec<u8>,
}

impl TrackData {
    /// Return the [TrackId] of this track.
    pub fn id(&self) -> TrackId {
        self.id
    }

    /// Return the file offset this track was read from.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Return the stored track bytes, including the 2-byte size prefix.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Return the track bytes following the size prefix.
    pub fn data(&self) -> &[u8] {
        self.raw.get(TRACK_SIZE_PREFIX_LEN..).unwrap_or(&[])
    }

    /// Return the value of the size prefix, which gives the length of the encoded track.
    pub fn encoded_len(&self) -> usize {
        match self.raw.get(..TRACK_SIZE_PREFIX_LEN) {
            Some(prefix) => u16::from_le_bytes([prefix[0], prefix[1]]) as usize,
            None => 0,
        }
    }

    /// Return the track bytes following the size prefix, limited to the encoded length when the
    /// prefix is plausible.
    pub fn encoded_data(&self) -> &[u8] {
        let data = self.data();
        match self.encoded_len() {
            0 => data,
            len => &data[..std::cmp::min(len, data.len())],
        }
    }
}

/// A parsed G64 container. Built once from the image bytes and read-only thereafter.
pub struct G64Image {
    path:       Option<PathBuf>,
    version:    u8,
    track_ct:   u8,
    track_size: u16,
    offsets:    BTreeMap<TrackId, u32>,
    tracks:     BTreeMap<TrackId, TrackData>,
}

impl G64Image {
    /// Return true if `image` begins with the G64 signature.
    pub fn detect(image: &[u8]) -> bool {
        image.get(..G64_SIGNATURE.len()) == Some(&G64_SIGNATURE[..])
    }

    /// Read and parse the G64 image at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<G64Image, GcrFoxError> {
        let path = path.as_ref();
        log::debug!("Loading G64 image: {}", path.display());
        let buffer = std::fs::read(path)?;
        let mut image = G64Image::from_bytes(&buffer)?;
        image.path = Some(path.to_path_buf());
        Ok(image)
    }

    /// Parse a G64 image from a byte slice.
    pub fn from_bytes(image: &[u8]) -> Result<G64Image, GcrFoxError> {
        if !G64Image::detect(image) {
            log::error!("G64 signature not found");
            return Err(GcrFoxError::FormatError("G64 signature not found".to_string()));
        }

        let mut reader = Cursor::new(image);
        let header = G64FileHeader::read(&mut reader)?;
        log::trace!(
            "Got G64 header. Version: {} Tracks: {} Track size: {}",
            header.version,
            header.track_ct,
            header.track_size
        );

        let entry_ct = std::cmp::min(header.track_ct as usize, MAX_TRACK_ENTRIES);
        if (header.track_ct as usize) > MAX_TRACK_ENTRIES {
            log::warn!(
                "G64 header claims {} tracks, only the first {} are addressable",
                header.track_ct,
                MAX_TRACK_ENTRIES
            );
        }

        let mut offsets = BTreeMap::new();
        for track_id in TrackId::iter_all().take(entry_ct) {
            let offset = u32::read_le(&mut reader)?;
            offsets.insert(track_id, offset);
        }

        let mut tracks = BTreeMap::new();
        for (&track_id, &offset) in offsets.iter() {
            if offset == 0 {
                continue;
            }

            let start = offset as usize;
            if start >= image.len() {
                log::warn!("Track {} offset {:08X} lies beyond end of image", track_id, offset);
                continue;
            }

            let mut end = start + header.track_size as usize + TRACK_SIZE_PREFIX_LEN;
            if end > image.len() {
                log::warn!(
                    "Track {} data truncated: expected {} bytes, found {}",
                    track_id,
                    end - start,
                    image.len() - start
                );
                end = image.len();
            }

            log::trace!("Track {}: offset {:08X} length {}", track_id, offset, end - start);
            tracks.insert(
                track_id,
                TrackData {
                    id:  track_id,
                    offset,
                    raw: image[start..end].to_vec(),
                },
            );
        }

        Ok(G64Image {
            path:       None,
            version:    header.version,
            track_ct:   header.track_ct,
            track_size: header.track_size,
            offsets,
            tracks,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Return the number of track entries declared in the header.
    pub fn track_ct(&self) -> u8 {
        self.track_ct
    }

    /// Return the nominal (maximum) track size declared in the header.
    pub fn track_size(&self) -> u16 {
        self.track_size
    }

    /// Return the offset table entry for `id`, if the table covers it. 0 means an absent track.
    pub fn track_offset(&self, id: TrackId) -> Option<u32> {
        self.offsets.get(&id).copied()
    }

    /// Return the data for track `id`, or `None` if the track is absent.
    pub fn track(&self, id: TrackId) -> Option<&TrackData> {
        self.tracks.get(&id)
    }

    /// Iterate over present tracks in ascending [TrackId] order.
    pub fn tracks(&self) -> impl Iterator<Item = &TrackData> {
        self.tracks.values()
    }

    /// Return the number of present tracks.
    pub fn present_track_ct(&self) -> usize {
        self.tracks.len()
    }

    pub fn dump_info<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        if let Some(path) = &self.path {
            writeln!(out, "G64 image: {}", path.display())?;
        }
        writeln!(out, "Version: {}", self.version)?;
        writeln!(out, "Number of tracks: {}", self.track_ct)?;
        writeln!(out, "Track size: {}", self.track_size)?;
        writeln!(out, "Track offsets:")?;
        for (id, offset) in self.offsets.iter().filter(|(_, o)| **o != 0) {
            writeln!(out, "  Track {:>4}: {:08X}", id, offset)?;
        }
        Ok(())
    }

    /// Write a hex dump of the raw bytes of track `id`.
    pub fn dump_track_hex<W: Write>(&self, id: TrackId, bytes_per_row: usize, out: W) -> Result<(), GcrFoxError> {
        let track = self.track(id).ok_or(GcrFoxError::SeekError)?;
        dump_slice(track.raw(), 0, bytes_per_row, out)?;
        Ok(())
    }
}
