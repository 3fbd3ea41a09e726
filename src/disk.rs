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

//! The `disk` module reconstructs whole disk sides from a [G64Image].
//!
//! A [DiskSide] is built by decoding every track of an image with the [TrackSchema] chosen for it
//! by a [DecodeOptions]. A [DiskSet] groups the sides of a multi-sided title so that data can be
//! addressed by [DiskLocation].

use crate::{
    file_parsers::g64::G64Image,
    track::{Sector, Track},
    track_schema::TrackSchema,
    types::{
        location::DiskLocation,
        track_id::{TrackId, LAST_TRACK},
    },
    GcrFoxError,
};
use std::{collections::BTreeMap, ops::RangeInclusive};
use strum::IntoEnumIterator;

/// Options controlling how the tracks of an image are decoded.
///
/// The schema for a track is taken from the last track range override containing it, or from the
/// default schema if no override matches. A schema of `None` means the track is not decoded.
#[derive(Clone, Debug)]
pub struct DecodeOptions {
    default_schema: Option<TrackSchema>,
    overrides:      Vec<(RangeInclusive<u8>, Option<TrackSchema>)>,
    half_tracks:    bool,
    auto:           bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions::new(TrackSchema::CbmGcr)
    }
}

impl DecodeOptions {
    /// Decode every track with `schema`.
    pub fn new(schema: TrackSchema) -> DecodeOptions {
        DecodeOptions {
            default_schema: Some(schema),
            overrides:      Vec::new(),
            half_tracks:    false,
            auto:           false,
        }
    }

    /// Decode every track with whichever schema recovers the most sectors from it.
    pub fn auto() -> DecodeOptions {
        DecodeOptions {
            default_schema: None,
            overrides:      Vec::new(),
            half_tracks:    false,
            auto:           true,
        }
    }

    /// Set the schema used for tracks not covered by an override. This disables automatic
    /// schema selection.
    pub fn with_default_schema(mut self, schema: Option<TrackSchema>) -> DecodeOptions {
        self.default_schema = schema;
        self.auto = false;
        self
    }

    /// Use `schema` for the tracks in `tracks`. Pass `None` to skip those tracks.
    pub fn with_range(mut self, tracks: RangeInclusive<u8>, schema: Option<TrackSchema>) -> DecodeOptions {
        self.overrides.push((tracks, schema));
        self
    }

    /// Set whether half-tracks are decoded.
    pub fn with_half_tracks(mut self, half_tracks: bool) -> DecodeOptions {
        self.half_tracks = half_tracks;
        self
    }

    pub fn half_tracks(&self) -> bool {
        self.half_tracks
    }

    pub fn is_auto(&self) -> bool {
        self.auto
    }

    /// Return the schema configured for `track`. For automatic selection without a matching
    /// override this returns `None`; the schema is then chosen when the track is decoded.
    pub fn schema_for(&self, track: u8) -> Option<TrackSchema> {
        self.override_for(track).unwrap_or(self.default_schema)
    }

    fn override_for(&self, track: u8) -> Option<Option<TrackSchema>> {
        self.overrides
            .iter()
            .rev()
            .find(|(range, _)| range.contains(&track))
            .map(|(_, schema)| *schema)
    }

    /// Decode the raw `data` of track number `track` with the schema these options select for it.
    /// Returns `None` if the track is configured to be skipped.
    pub fn decode_track(&self, track: u8, data: &[u8]) -> Option<Track> {
        match self.override_for(track) {
            Some(schema) => schema.map(|s| s.decode_track(track, data)),
            None if self.auto => Some(decode_best(track, data)),
            None => self.default_schema.map(|s| s.decode_track(track, data)),
        }
    }
}

/// Decode `data` with every schema, keeping the result with the most sectors. Ties go to the
/// schema listed first.
fn decode_best(track: u8, data: &[u8]) -> Track {
    let mut best: Option<Track> = None;
    for schema in TrackSchema::iter() {
        let candidate = schema.decode_track(track, data);
        if best.as_ref().map_or(true, |b| candidate.sector_ct() > b.sector_ct()) {
            best = Some(candidate);
        }
    }
    // TrackSchema has at least one variant.
    best.unwrap_or_else(|| TrackSchema::CbmGcr.decode_track(track, data))
}

/// One decoded side of a disk.
#[derive(Clone, Debug, Default)]
pub struct DiskSide {
    tracks: BTreeMap<TrackId, Track>,
}

impl DiskSide {
    /// Decode the tracks of `image` according to `options`.
    pub fn decode(image: &G64Image, options: &DecodeOptions) -> DiskSide {
        let mut tracks = BTreeMap::new();

        for track_data in image.tracks() {
            let id = track_data.id();
            if id.is_half() && !options.half_tracks {
                continue;
            }

            if let Some(track) = options.decode_track(id.track(), track_data.data()) {
                log::debug!(
                    "DiskSide::decode(): Track {}: {} of {} sectors ({})",
                    id,
                    track.sector_ct(),
                    track.slot_ct(),
                    track.schema()
                );
                tracks.insert(id, track);
            }
        }

        DiskSide { tracks }
    }

    /// Return the decoded whole track `track`.
    pub fn track(&self, track: u8) -> Option<&Track> {
        self.tracks.get(&TrackId::whole(track).ok()?)
    }

    /// Return the decoded track `id`, which may be a half-track.
    pub fn track_by_id(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    /// Iterate over decoded tracks in ascending [TrackId] order.
    pub fn tracks(&self) -> impl Iterator<Item = (&TrackId, &Track)> {
        self.tracks.iter()
    }

    pub fn track_ct(&self) -> usize {
        self.tracks.len()
    }

    /// Return sector slot `sector` of whole track `track`, if present.
    pub fn sector(&self, track: u8, sector: u8) -> Option<&Sector> {
        self.track(track)?.sector(sector as usize)
    }

    /// Return the total number of sectors decoded on this side.
    pub fn sector_ct(&self) -> usize {
        self.tracks.values().map(|t| t.sector_ct()).sum()
    }
}

/// The decoded sides of a disk set. Sides are numbered from 1.
#[derive(Clone, Debug, Default)]
pub struct DiskSet {
    sides: Vec<DiskSide>,
}

impl DiskSet {
    pub fn new() -> DiskSet {
        DiskSet::default()
    }

    /// Add a side to the set, returning its side number.
    pub fn add_side(&mut self, side: DiskSide) -> u8 {
        self.sides.push(side);
        self.sides.len() as u8
    }

    pub fn with_side(mut self, side: DiskSide) -> DiskSet {
        self.add_side(side);
        self
    }

    pub fn side_ct(&self) -> usize {
        self.sides.len()
    }

    /// Return side number `side`.
    pub fn side(&self, side: u8) -> Result<&DiskSide, GcrFoxError> {
        side.checked_sub(1)
            .and_then(|i| self.sides.get(i as usize))
            .ok_or_else(|| {
                GcrFoxError::ParameterError(format!(
                    "Invalid side number: {} (disk set has {} sides)",
                    side,
                    self.side_ct()
                ))
            })
    }

    /// Resolve `location` to a sector. The location's byte offset is ignored.
    pub fn sector(&self, location: &DiskLocation) -> Result<&Sector, GcrFoxError> {
        self.side(location.side)?
            .sector(location.track, location.sector)
            .ok_or(GcrFoxError::SeekError)
    }

    /// Concatenate the payloads of the sectors from `start` through `end` inclusive, walking
    /// sectors with the sector counts of `schema`. Data is taken from `start`'s byte offset
    /// onwards.
    ///
    /// Fails with [GcrFoxError::SeekError] if a sector on the way is absent or the walk runs past
    /// the last track before reaching `end`.
    pub fn read_span(
        &self,
        start: &DiskLocation,
        end: &DiskLocation,
        schema: TrackSchema,
    ) -> Result<Vec<u8>, GcrFoxError> {
        if start.side != end.side {
            return Err(GcrFoxError::ParameterError(format!(
                "Span crosses sides: {} to {}",
                start.side, end.side
            )));
        }

        let mut location = DiskLocation::new(start.side, start.track, start.sector);
        let mut data = Vec::new();
        loop {
            if location.track > LAST_TRACK {
                log::error!("read_span(): Ran past last track looking for {}", end);
                return Err(GcrFoxError::SeekError);
            }

            let sector = self.sector(&location).map_err(|e| {
                log::warn!("read_span(): {} not available", location);
                e
            })?;
            data.extend_from_slice(sector.data());

            if location.same_sector(end) {
                break;
            }
            location.move_to_next_sector_in(schema);
        }

        let skip = std::cmp::min(start.offset, data.len());
        Ok(data.split_off(skip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side_with(track: u8, sectors: Vec<Option<Sector>>) -> DiskSide {
        let mut tracks = BTreeMap::new();
        tracks.insert(
            TrackId::whole(track).unwrap(),
            Track::new(track, TrackSchema::Rapidlok, sectors, Vec::new()),
        );
        DiskSide { tracks }
    }

    #[test]
    fn overrides_last_match_wins() {
        let options = DecodeOptions::new(TrackSchema::Rapidlok)
            .with_range(10..=20, Some(TrackSchema::CbmGcr))
            .with_range(18..=18, None)
            .with_range(20..=25, Some(TrackSchema::Rapidlok));

        assert_eq!(options.schema_for(1), Some(TrackSchema::Rapidlok));
        assert_eq!(options.schema_for(10), Some(TrackSchema::CbmGcr));
        assert_eq!(options.schema_for(18), None);
        assert_eq!(options.schema_for(20), Some(TrackSchema::Rapidlok));
        assert!(!options.half_tracks());
    }

    #[test]
    fn auto_options_have_no_fixed_schema() {
        let options = DecodeOptions::auto().with_range(18..=18, Some(TrackSchema::CbmGcr));
        assert!(options.is_auto());
        assert_eq!(options.schema_for(1), None);
        assert_eq!(options.schema_for(18), Some(TrackSchema::CbmGcr));
    }

    #[test]
    fn disk_set_sides_are_one_based() {
        let set = DiskSet::new().with_side(side_with(1, vec![Some(Sector::new(None, vec![1]))]));
        assert_eq!(set.side_ct(), 1);
        assert!(set.side(1).is_ok());
        assert!(matches!(set.side(0), Err(GcrFoxError::ParameterError(_))));
        assert!(matches!(set.side(2), Err(GcrFoxError::ParameterError(_))));

        assert_eq!(set.sector(&DiskLocation::new(1, 1, 0)).unwrap().data(), &[1]);
        assert!(matches!(
            set.sector(&DiskLocation::new(1, 2, 0)),
            Err(GcrFoxError::SeekError)
        ));
    }

    #[test]
    fn read_span_crosses_tracks() {
        let mut tracks = BTreeMap::new();
        let mut t1: Vec<Option<Sector>> = vec![None; 12];
        t1[10] = Some(Sector::new(None, vec![1, 2]));
        t1[11] = Some(Sector::new(None, vec![3, 4]));
        let mut t2: Vec<Option<Sector>> = vec![None; 12];
        t2[0] = Some(Sector::new(None, vec![5, 6]));
        tracks.insert(TrackId::whole(1).unwrap(), Track::new(1, TrackSchema::Rapidlok, t1, Vec::new()));
        tracks.insert(TrackId::whole(2).unwrap(), Track::new(2, TrackSchema::Rapidlok, t2, Vec::new()));
        let set = DiskSet::new().with_side(DiskSide { tracks });

        let start = DiskLocation::new(1, 1, 10).with_offset(1);
        let end = DiskLocation::new(1, 2, 0);
        assert_eq!(set.read_span(&start, &end, TrackSchema::Rapidlok).unwrap(), vec![2, 3, 4, 5, 6]);

        let end = DiskLocation::new(1, 2, 1);
        assert!(matches!(
            set.read_span(&start, &end, TrackSchema::Rapidlok),
            Err(GcrFoxError::SeekError)
        ));
    }
}
