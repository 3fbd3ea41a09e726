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

//! # gcrfox
//!
//! gcrfox recovers sector data from G64 images of Commodore 1541 5.25" floppy disks.
//!
//! A G64 image stores each track (and half-track) as the raw GCR byte stream read from the
//! disk surface. gcrfox parses the container, then reconstructs sectors from each track using
//! one of two track schemas:
//!
//! - [TrackSchema::CbmGcr]: the standard 1541 layout of sync marks, GCR encoded headers and
//!   325-byte GCR data blocks.
//! - [TrackSchema::Rapidlok]: the Rapidlok copy protection layout, which replaces syncs and
//!   headers with synthesized byte patterns and scrambles sector payloads.
//!
//! Decoding never fails below the container level. Sectors that cannot be located are simply
//! absent from a [Track]'s slot list.
//!
//! ```no_run
//! use gcrfox::prelude::*;
//!
//! let image = G64Image::load("side1.g64").unwrap();
//! let side = DiskSide::decode(&image, &DecodeOptions::new(TrackSchema::Rapidlok));
//! if let Some(sector) = side.sector(5, 3) {
//!     println!("{} bytes", sector.data().len());
//! }
//! ```

pub mod bit_cursor;
pub mod bitstream_codec;
pub mod copy_protection;
pub mod disk;
pub mod file_parsers;
pub mod track;
pub mod track_schema;
pub mod types;
pub mod util;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GcrFoxError {
    #[error("An IO error occurred reading the disk image: {0}")]
    IoError(String),
    #[error("The disk image format parser encountered an error: {0}")]
    FormatError(String),
    #[error("Invalid parameters were specified to a library function: {0}")]
    ParameterError(String),
    #[error("The requested track or sector could not be found")]
    SeekError,
}

impl From<std::io::Error> for GcrFoxError {
    fn from(err: std::io::Error) -> Self {
        GcrFoxError::IoError(err.to_string())
    }
}

impl From<binrw::Error> for GcrFoxError {
    fn from(err: binrw::Error) -> Self {
        match err {
            binrw::Error::Io(e) => GcrFoxError::FormatError(format!("truncated image: {}", e)),
            _ => GcrFoxError::FormatError(err.to_string()),
        }
    }
}

pub use crate::{
    copy_protection::CopyProtectionScheme,
    disk::{DecodeOptions, DiskSet, DiskSide},
    file_parsers::g64::{G64Image, TrackData},
    track::{Sector, SectorHeader, Track},
    track_schema::TrackSchema,
    types::{
        geometry::{rapidlok_sectors_per_track, sectors_per_track},
        location::DiskLocation,
        track_id::TrackId,
    },
};

pub mod prelude {
    pub use crate::{
        bitstream_codec::gcr::GcrCodec,
        disk::{DecodeOptions, DiskSet, DiskSide},
        file_parsers::g64::G64Image,
        track::{Sector, SectorHeader, Track},
        track_schema::{PayloadDecoder, SectorLocator, TrackSchema},
        types::{location::DiskLocation, track_id::TrackId},
        GcrFoxError,
    };
}
