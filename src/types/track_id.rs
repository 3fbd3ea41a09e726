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

//! The `track_id` module defines [TrackId], which addresses whole and half-tracks in a G64 image.

use crate::GcrFoxError;
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// The first track number present on a 1541 disk.
pub const FIRST_TRACK: u8 = 1;
/// The last track number a G64 image can describe.
pub const LAST_TRACK: u8 = 42;
/// The maximum number of entries in a G64 track offset table (42 tracks, each with a half-track).
pub const MAX_TRACK_ENTRIES: usize = (LAST_TRACK as usize) * 2;

/// A [TrackId] identifies a whole track (`18.0`) or half-track (`18.5`) between 1.0 and 42.5.
///
/// Half-tracks are the head positions between two numbered tracks. Normal disks leave them
/// empty, but protection schemes and mastering tools sometimes write to them, so a G64 image
/// reserves a slot for each.
///
/// A [TrackId] is totally ordered by track number, then half-track.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackId {
    track: u8,
    half:  u8,
}

impl TrackId {
    /// Create a new [TrackId]. `half` must be 0 or 5 (for `x.0` and `x.5`).
    pub fn new(track: u8, half: u8) -> Result<Self, GcrFoxError> {
        if !(FIRST_TRACK..=LAST_TRACK).contains(&track) {
            return Err(GcrFoxError::ParameterError(format!("Invalid track number {}", track)));
        }
        if half != 0 && half != 5 {
            return Err(GcrFoxError::ParameterError(format!("Invalid half track {}", half)));
        }
        Ok(TrackId { track, half })
    }

    /// Create a [TrackId] for the whole track `track`.
    pub fn whole(track: u8) -> Result<Self, GcrFoxError> {
        TrackId::new(track, 0)
    }

    /// Return the first track, 1.0.
    pub const fn first() -> Self {
        TrackId {
            track: FIRST_TRACK,
            half:  0,
        }
    }

    /// Return the last track, 42.5.
    pub const fn last() -> Self {
        TrackId {
            track: LAST_TRACK,
            half:  5,
        }
    }

    /// Return the track number.
    #[inline]
    pub fn track(&self) -> u8 {
        self.track
    }

    /// Return the half-track digit, either 0 or 5.
    #[inline]
    pub fn half_track(&self) -> u8 {
        self.half
    }

    /// Return true if this is a half-track (x.5).
    #[inline]
    pub fn is_half(&self) -> bool {
        self.half == 5
    }

    /// Return true if this is the last track a G64 image can hold (42.5).
    pub fn is_last(&self) -> bool {
        *self == TrackId::last()
    }

    /// Return the following [TrackId]: x.0 becomes x.5, x.5 becomes (x+1).0.
    /// Returns `None` after 42.5.
    pub fn next(&self) -> Option<TrackId> {
        if self.is_last() {
            None
        }
        else if self.half == 0 {
            Some(TrackId {
                track: self.track,
                half:  5,
            })
        }
        else {
            Some(TrackId {
                track: self.track + 1,
                half:  0,
            })
        }
    }

    /// Return the index of this track's entry in a G64 offset table.
    pub fn table_index(&self) -> usize {
        (self.track - FIRST_TRACK) as usize * 2 + (self.half / 5) as usize
    }

    /// Return an iterator over every [TrackId] from 1.0 to 42.5 in ascending order.
    pub fn iter_all() -> impl Iterator<Item = TrackId> {
        std::iter::successors(Some(TrackId::first()), |id| id.next())
    }
}

impl Display for TrackId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.track, self.half)
    }
}

impl FromStr for TrackId {
    type Err = GcrFoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad_id = || GcrFoxError::ParameterError(format!("Invalid track id '{}'", s));

        let (track_str, half_str) = match s.split_once('.') {
            Some((t, h)) => (t, h),
            None => (s, "0"),
        };

        let track = track_str.trim().parse::<u8>().map_err(|_| bad_id())?;
        let half = half_str.trim().parse::<u8>().map_err(|_| bad_id())?;
        TrackId::new(track, half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_steps_through_half_tracks() {
        let t1 = TrackId::new(1, 0).unwrap();
        assert_eq!(t1.next(), Some(TrackId::new(1, 5).unwrap()));
        assert_eq!(TrackId::new(1, 5).unwrap().next(), Some(TrackId::new(2, 0).unwrap()));
    }

    #[test]
    fn last_track_is_terminal() {
        let last = TrackId::new(42, 5).unwrap();
        assert!(last.is_last());
        assert_eq!(last.next(), None);
        assert!(!TrackId::new(42, 0).unwrap().is_last());
    }

    #[test]
    fn invalid_ids_are_rejected() {
        assert!(TrackId::new(43, 0).is_err());
        assert!(TrackId::new(0, 0).is_err());
        assert!(TrackId::new(1, 3).is_err());
    }

    #[test]
    fn ordering_is_track_then_half() {
        let a = TrackId::new(17, 5).unwrap();
        let b = TrackId::new(18, 0).unwrap();
        let c = TrackId::new(18, 5).unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn iter_all_covers_offset_table() {
        let ids: Vec<TrackId> = TrackId::iter_all().collect();
        assert_eq!(ids.len(), MAX_TRACK_ENTRIES);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(id.table_index(), i);
        }
    }

    #[test]
    fn parse_and_display() {
        let id: TrackId = "18.5".parse().unwrap();
        assert_eq!(id, TrackId::new(18, 5).unwrap());
        assert_eq!(id.to_string(), "18.5");
        assert_eq!("35".parse::<TrackId>().unwrap(), TrackId::whole(35).unwrap());
        assert!("18.2".parse::<TrackId>().is_err());
        assert!("abc".parse::<TrackId>().is_err());
    }
}
