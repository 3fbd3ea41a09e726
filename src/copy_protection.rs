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

    src/copy_protection.rs

    Contains an enum for copy protection schemes and code to detect them.
*/

use crate::{
    file_parsers::g64::G64Image,
    track_schema::rapidlok::{find_pattern, synthesize_header},
};
use std::fmt::{Display, Formatter, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CopyProtectionScheme {
    Rapidlok,
}

impl Display for CopyProtectionScheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            CopyProtectionScheme::Rapidlok => write!(f, "Rapidlok"),
        }
    }
}

impl G64Image {
    /// Attempt to determine the copy protection scheme used on the disk image.
    /// Returns None if no copy protection is detected.
    pub fn detect_copy_protection(&self) -> Option<CopyProtectionScheme> {
        for track in self.tracks().filter(|t| !t.id().is_half()) {
            // Check for Rapidlok.
            // Every formatted Rapidlok track carries a header for sector 0.
            let header = synthesize_header(track.id().track(), 0);
            if let Some(pos) = find_pattern(track.data(), &header) {
                log::debug!(
                    "detect_copy_protection(): Rapidlok header found on track {} at offset {}",
                    track.id(),
                    pos
                );
                return Some(CopyProtectionScheme::Rapidlok);
            }
        }

        None
    }
}
