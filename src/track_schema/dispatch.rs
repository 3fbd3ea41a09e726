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

use crate::{
    track::Sector,
    track_schema::{
        cbm_gcr::CbmGcrSchema,
        rapidlok::RapidlokSchema,
        PayloadDecoder,
        SectorLocator,
        SectorSpan,
        TrackSchema,
    },
};

impl SectorLocator for TrackSchema {
    fn locate_sectors(&self, track: u8, data: &[u8]) -> Vec<SectorSpan> {
        match self {
            TrackSchema::CbmGcr => CbmGcrSchema::locate_sectors(track, data),
            TrackSchema::Rapidlok => RapidlokSchema::locate_sectors(track, data),
        }
    }
}

impl PayloadDecoder for TrackSchema {
    fn decode_payload(&self, span: &SectorSpan) -> Option<Sector> {
        match self {
            TrackSchema::CbmGcr => CbmGcrSchema::decode_payload(span),
            TrackSchema::Rapidlok => RapidlokSchema::decode_payload(span),
        }
    }
}
