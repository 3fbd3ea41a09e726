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

//! The `track_schema` module defines a `TrackSchema` enum that represents a track schema used to
//! interpret the layout of a track.
//!
//! A track schema is responsible for finding sectors on a raw track and for turning the bytes it
//! finds into sector payloads. These two concerns are expressed as the [SectorLocator] and
//! [PayloadDecoder] traits, which `TrackSchema` implements by dispatching to the schema
//! implementation for each variant.
//!
//! A `TrackSchema` contains no state. A disk may mix schemas: a Rapidlok protected disk usually
//! carries a standard GCR directory track alongside its protected tracks, so the schema is
//! selected per track by [DecodeOptions](crate::disk::DecodeOptions).
//!
//! Two schemas are implemented:
//! - [TrackSchema::CbmGcr], the standard Commodore 1541 layout.
//! - [TrackSchema::Rapidlok], the Rapidlok copy protection layout.

mod dispatch;
pub mod cbm_gcr;
pub mod rapidlok;

use crate::{
    track::{Sector, SectorHeader, Track},
    types::geometry::{rapidlok_sectors_per_track, sectors_per_track},
    GcrFoxError,
};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackSchema {
    CbmGcr,
    Rapidlok,
}

impl Display for TrackSchema {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TrackSchema::CbmGcr => write!(f, "CBM GCR"),
            TrackSchema::Rapidlok => write!(f, "Rapidlok"),
        }
    }
}

impl FromStr for TrackSchema {
    type Err = GcrFoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gcr" | "cbm" | "cbm_gcr" => Ok(TrackSchema::CbmGcr),
            "rapidlok" | "rl" => Ok(TrackSchema::Rapidlok),
            _ => Err(GcrFoxError::ParameterError(format!("Unknown track schema: {}", s))),
        }
    }
}

impl TrackSchema {
    /// Return the highest sector index this schema expects on `track`. A decoded [Track] has one
    /// more slot than this, as sector indices count from 0.
    pub fn sectors_per_track(&self, track: u8) -> u8 {
        match self {
            TrackSchema::CbmGcr => sectors_per_track(track),
            TrackSchema::Rapidlok => rapidlok_sectors_per_track(track),
        }
    }

    /// Decode a track using this schema. `data` is the raw track, without its size prefix.
    ///
    /// This never fails. Sectors that cannot be located or decoded leave their slot empty.
    pub fn decode_track(&self, track: u8, data: &[u8]) -> Track {
        let slot_ct = self.sectors_per_track(track) as usize + 1;
        let mut sectors: Vec<Option<Sector>> = vec![None; slot_ct];

        for span in self.locate_sectors(track, data) {
            let index = span.index as usize;
            if index >= slot_ct {
                log::warn!("decode_track(): Track {} sector {} out of range, ignoring", track, index);
                continue;
            }
            sectors[index] = self.decode_payload(&span);
        }

        let track_obj = Track::new(track, *self, sectors, data.to_vec());
        log::debug!("decode_track(): {}", track_obj);
        track_obj
    }
}

/// A [SectorSpan] is the raw, still encoded content of one sector as found by a [SectorLocator].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectorSpan {
    /// The sector slot this span belongs to.
    pub index:    u8,
    /// Byte offset of the start of the sector within the track data. For the standard schema this
    /// is the byte containing the first bit of the data block.
    pub position: usize,
    /// The decoded sector header, for schemas that have one.
    pub header:   Option<SectorHeader>,
    /// The encoded payload bytes.
    pub data:     Vec<u8>,
}

/// A [SectorLocator] finds the sectors on a raw track.
pub trait SectorLocator {
    /// Scan the raw track `data` of track number `track` and return the spans of all sectors found.
    /// Sectors that cannot be found are omitted; this is not an error.
    fn locate_sectors(&self, track: u8, data: &[u8]) -> Vec<SectorSpan>;
}

/// A [PayloadDecoder] turns the raw bytes of a [SectorSpan] into a decoded [Sector].
pub trait PayloadDecoder {
    /// Decode a sector span. Returns `None` if the span does not hold a decodable sector.
    fn decode_payload(&self, span: &SectorSpan) -> Option<Sector>;
}
