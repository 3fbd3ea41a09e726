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

    src/util.rs

    Miscellaneous utility functions.
*/

use std::io::Write;

/// Write a hex dump of `data` to `out`, `bytes_per_row` bytes per line. Row addresses start at
/// `start_address`. Printable ASCII is shown to the right of each row.
pub fn dump_slice<W: Write>(data: &[u8], start_address: usize, bytes_per_row: usize, mut out: W) -> std::io::Result<()> {
    let bytes_per_row = std::cmp::max(bytes_per_row, 1);

    for (r, row) in data.chunks(bytes_per_row).enumerate() {
        write!(out, "{:04X}| ", start_address + r * bytes_per_row)?;
        for byte in row {
            write!(out, "{:02X} ", byte)?;
        }
        for _ in row.len()..bytes_per_row {
            write!(out, "   ")?;
        }
        write!(out, "| ")?;
        for byte in row {
            let c = if byte.is_ascii_graphic() || *byte == b' ' {
                *byte as char
            }
            else {
                '.'
            };
            write!(out, "{}", c)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_pads_last_row() {
        let mut out = Vec::new();
        dump_slice(b"GCR-1541\x00", 0x10, 8, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "0010| 47 43 52 2D 31 35 34 31 | GCR-1541");
        assert_eq!(lines[1], "0018| 00                      | .");
    }
}
