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

//! The `location` module defines [DiskLocation], a cursor over sector payloads that spans
//! sector and track boundaries.

use crate::{track_schema::TrackSchema, types::geometry::sectors_per_track};
use std::fmt::{self, Display, Formatter};

/// A [DiskLocation] addresses a byte within a sector's payload on a given disk side.
///
/// Data spanning several sectors is laid out in sector order, continuing on the next track
/// after the last sector of a track. A [DiskLocation] does not wrap around at the edge of the
/// disk; callers walking past the last track must handle that themselves. The track number
/// saturates at 255.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiskLocation {
    pub side:   u8,
    pub track:  u8,
    pub sector: u8,
    pub offset: usize,
}

impl DiskLocation {
    pub fn new(side: u8, track: u8, sector: u8) -> Self {
        DiskLocation {
            side,
            track,
            sector,
            offset: 0,
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Advance to the next sector using the standard zone table.
    pub fn move_to_next_sector(&mut self) {
        self.step(sectors_per_track(self.track));
    }

    /// Advance to the next sector using the sector count of the specified [TrackSchema].
    pub fn move_to_next_sector_in(&mut self, schema: TrackSchema) {
        self.step(schema.sectors_per_track(self.track));
    }

    /// Advance `count` sectors using the standard zone table.
    pub fn add_sector_index(&mut self, count: usize) {
        for _ in 0..count {
            self.move_to_next_sector();
        }
    }

    /// Advance `count` sectors using the sector count of the specified [TrackSchema].
    pub fn add_sector_index_in(&mut self, count: usize, schema: TrackSchema) {
        for _ in 0..count {
            self.move_to_next_sector_in(schema);
        }
    }

    /// Return true if `other` names the same side, track and sector, ignoring the byte offset.
    pub fn same_sector(&self, other: &DiskLocation) -> bool {
        self.side == other.side && self.track == other.track && self.sector == other.sector
    }

    fn step(&mut self, last_sector: u8) {
        if self.sector >= last_sector {
            self.sector = 0;
            self.track = self.track.saturating_add(1);
        }
        else {
            self.sector += 1;
        }
    }
}

impl Display for DiskLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Side {} T/S {}/{} offset {}",
            self.side, self.track, self.sector, self.offset
        )
    }
}
