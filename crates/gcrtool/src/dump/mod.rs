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

    crates/gcrtool/src/dump/mod.rs

    Hex dump of raw tracks and decoded sectors.
*/

pub(crate) mod args;

use anyhow::{bail, Error};
use std::io::{BufWriter, Write};

use crate::{args::GlobalOptions, load_image};
use gcrfox::{util::dump_slice, DecodeOptions};

pub(crate) fn run(global: &GlobalOptions, params: &args::DumpParams) -> Result<(), Error> {
    let row_size = params.row_size.unwrap_or(16) as usize;
    let image = load_image(&params.in_file)?;

    let track_data = match image.track(params.track) {
        Some(track_data) => track_data,
        None => {
            bail!("Specified track: {} not found.", params.track);
        }
    };

    let mut buf = BufWriter::new(std::io::stdout());

    // If sector was provided, dump the decoded sector.
    if let Some(sector) = params.sector {
        let options = match params.schema {
            Some(schema) => DecodeOptions::new(schema),
            None => DecodeOptions::auto(),
        };

        let track = match options.decode_track(params.track.track(), track_data.data()) {
            Some(track) => track,
            None => {
                bail!("Track {} could not be decoded.", params.track);
            }
        };

        let sector_ref = match track.sector(sector as usize) {
            Some(sector_ref) => sector_ref,
            None => {
                bail!("Sector {} not found on track {} ({}).", sector, params.track, track.schema());
            }
        };

        if !global.silent {
            println!("Dumping sector {} of track {} ({}):", sector, params.track, track.schema());
            if let Some(header) = sector_ref.header() {
                println!("{}", header);
            }
            if let Some(valid) = sector_ref.checksum_valid() {
                println!("Data checksum valid: {}", valid);
            }
            if sector_ref.gcr_faults() > 0 {
                println!("GCR faults: {}", sector_ref.gcr_faults());
            }
        }

        dump_slice(sector_ref.data(), 0, row_size, &mut buf)?;
    }
    else {
        // No sector was provided, dump the whole raw track.
        if !global.silent {
            println!(
                "Dumping track {} (offset {:08X}, {} encoded bytes), raw, in hex format:",
                params.track,
                track_data.offset(),
                track_data.encoded_len()
            );
        }

        dump_slice(track_data.data(), 0, row_size, &mut buf)?;
    }

    buf.flush()?;
    Ok(())
}
