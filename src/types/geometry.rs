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

//! Zone tables giving the number of sectors on each track.
//!
//! A 1541 writes more sectors on the longer outer tracks. The tables here describe the highest
//! sector index on a track, so a track holds `sectors_per_track(t) + 1` sector slots, counting
//! from 0.

/// Rapidlok writes 11 sectors (0..=11) below this track, and 10 (0..=10) from it onwards.
pub const RAPIDLOK_ZONE_BOUNDARY: u8 = 19;

/// Return the highest sector index for `track` under the standard GCR zoning used by this
/// library. Note that this is not the generic 1541 zone table: tracks 25-30 hold 17 and tracks
/// 31 and up hold 16.
pub fn sectors_per_track(track: u8) -> u8 {
    match track {
        31.. => 16,
        ..=17 => 20,
        18..=24 => 18,
        _ => 17,
    }
}

/// Return the highest sector index for `track` on a Rapidlok protected track.
pub fn rapidlok_sectors_per_track(track: u8) -> u8 {
    if track < RAPIDLOK_ZONE_BOUNDARY {
        11
    }
    else {
        10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_zones() {
        assert_eq!(sectors_per_track(1), 20);
        assert_eq!(sectors_per_track(17), 20);
        assert_eq!(sectors_per_track(18), 18);
        assert_eq!(sectors_per_track(24), 18);
        assert_eq!(sectors_per_track(25), 17);
        assert_eq!(sectors_per_track(30), 17);
        assert_eq!(sectors_per_track(31), 16);
        assert_eq!(sectors_per_track(42), 16);
    }

    #[test]
    fn rapidlok_zones() {
        assert_eq!(rapidlok_sectors_per_track(1), 11);
        assert_eq!(rapidlok_sectors_per_track(18), 11);
        assert_eq!(rapidlok_sectors_per_track(19), 10);
        assert_eq!(rapidlok_sectors_per_track(35), 10);
    }
}
