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

    src/bit_cursor/mod.rs

    A bit-level cursor over raw GCR track data.
*/

//! A [BitCursor] walks the bits of a raw GCR track, most significant bit of each byte first.
//!
//! GCR data on a 1541 track is not byte aligned: a sector header or data block starts at
//! whatever bit follows the preceding sync mark. The cursor lets a track reader locate a sync
//! and then read the following bytes at that arbitrary bit alignment.
//!
//! A [BitCursor] does not wrap around at the end of the track. Reads past the end return `None`.

use bit_vec::BitVec;

/// The minimum number of consecutive 1 bits that constitute a sync mark.
pub const SYNC_MIN_RUN: usize = 10;

/// A [BitCursorIter] iterates over the remaining bits of a [BitCursor] without moving it.
pub struct BitCursorIter<'a> {
    cursor: &'a BitCursor,
    index:  usize,
}

impl Iterator for BitCursorIter<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        let bit = self.cursor.bits.get(self.index)?;
        self.index += 1;
        Some(bit)
    }
}

/// A bit-addressable cursor over a track buffer, implemented as a wrapper around a [BitVec]
/// from the bit_vec crate.
#[derive(Clone, Debug)]
pub struct BitCursor {
    bits:   BitVec,
    cursor: usize,
}

/// Produce a [BitCursor] from a byte slice.
impl From<&[u8]> for BitCursor {
    fn from(bytes: &[u8]) -> BitCursor {
        BitCursor {
            bits:   BitVec::from_bytes(bytes),
            cursor: 0,
        }
    }
}

impl BitCursor {
    /// Create a new [BitCursor] from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> BitCursor {
        BitCursor::from(bytes)
    }

    /// Return the length of the underlying buffer in bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Return the current bit position of the cursor.
    #[inline]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Return the number of bits remaining after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.bits.len().saturating_sub(self.cursor)
    }

    /// Move the cursor to the absolute bit position `pos`. Positions past the end are clamped.
    pub fn seek(&mut self, pos: usize) {
        self.cursor = std::cmp::min(pos, self.bits.len());
    }

    /// Move the cursor back by `bits`, stopping at the start of the buffer.
    pub fn rewind(&mut self, bits: usize) {
        self.cursor = self.cursor.saturating_sub(bits);
    }

    /// Iterate over the bits from the cursor to the end of the buffer.
    pub fn iter(&self) -> BitCursorIter<'_> {
        BitCursorIter {
            cursor: self,
            index:  self.cursor,
        }
    }

    /// Read the bit at the cursor and advance by one.
    #[inline]
    pub fn read_bit(&mut self) -> Option<bool> {
        let bit = self.bits.get(self.cursor)?;
        self.cursor += 1;
        Some(bit)
    }

    /// Read `n` bits (at most 32), most significant first. On a short read the cursor is left
    /// at the end of the buffer and `None` is returned.
    pub fn read_bits(&mut self, n: usize) -> Option<u32> {
        debug_assert!(n <= 32);
        let mut value = 0u32;
        for _ in 0..n {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Some(value)
    }

    /// Read a byte starting at the current (possibly unaligned) bit position.
    pub fn read_u8(&mut self) -> Option<u8> {
        self.read_bits(8).map(|v| v as u8)
    }

    /// Read `len` bytes starting at the current bit position.
    pub fn read_bytes(&mut self, len: usize) -> Option<Vec<u8>> {
        if self.remaining() < len * 8 {
            self.cursor = self.bits.len();
            return None;
        }
        (0..len).map(|_| self.read_u8()).collect()
    }

    /// Advance the cursor past the next sync mark.
    ///
    /// A sync mark is a run of at least `min_run` consecutive 1 bits. Once such a run has been
    /// observed, scanning continues to the first 0 bit, and the cursor is left pointing at that
    /// bit, i.e. on the first bit of the data following the sync.
    ///
    /// Returns the bit position after the sync, or `None` if the buffer was exhausted first.
    pub fn find_sync(&mut self, min_run: usize) -> Option<usize> {
        let mut run = 0;
        let mut observed = false;

        while let Some(bit) = self.read_bit() {
            if bit {
                run += 1;
                if run >= min_run {
                    observed = true;
                }
            }
            else if observed {
                self.rewind(1);
                return Some(self.cursor);
            }
            else {
                run = 0;
            }
        }
        None
    }
}
