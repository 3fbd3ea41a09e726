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

use crate::{args::GlobalOptions, load_image};
use anyhow::Error;
use gcrfox::{DecodeOptions, DiskSide};

pub mod args;

pub(crate) fn run(global: &GlobalOptions, params: &args::InfoParams) -> Result<(), Error> {
    let image = load_image(&params.in_file)?;

    println!("Disk image info:");
    println!("{}", "-".repeat(79));
    image.dump_info(&mut std::io::stdout())?;
    println!();

    match image.detect_copy_protection() {
        Some(scheme) => println!("Copy protection detected: {}", scheme),
        None => println!("No copy protection detected"),
    }
    println!();

    let side = DiskSide::decode(&image, &DecodeOptions::auto().with_half_tracks(true));
    if !global.silent {
        println!("Track report:");
        println!("{}", "-".repeat(79));
    }
    for (id, track) in side.tracks() {
        println!(
            "Track {:>4} [{:>8}]: {:>2}/{:>2} sectors, hash {}",
            id.to_string(),
            track.schema().to_string(),
            track.sector_ct(),
            track.slot_ct(),
            track.hash()
        );

        if params.sector_list {
            for (slot, sector) in track.iter_sectors() {
                match sector.header() {
                    Some(header) => println!("  {:>2}: {}", slot, header),
                    None => println!("  {:>2}: {} bytes", slot, sector.data().len()),
                }
            }
        }
    }
    println!("Total sectors decoded: {}", side.sector_ct());

    Ok(())
}
