//! Colour bitmaps with transparency, and mouse cursors.
//!
//! Each pixel is one byte:
//!
//! ```text
//! 7 6 5 4 3 2 1 0
//! A A B B G G R R
//! ```
//!
//! An alpha of zero is fully transparent. Any other alpha is drawn as
//! opaque.

// -----------------------------------------------------------------------------
// Licence Statement
// -----------------------------------------------------------------------------
// Copyright (c) Jonathan 'theJPster' Pallant and the Neotron Developers, 2023
// Copyright (c) The pico-term-rs developers, 2025
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.
// -----------------------------------------------------------------------------

// -----------------------------------------------------------------------------
// Imports
// -----------------------------------------------------------------------------

use alloc::{borrow::Cow, vec::Vec};

use crate::{colour::Rgb, geometry::Point};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// A bitmap, which either borrows its pixels or owns them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap<'a> {
    pub width: u16,
    pub height: u16,
    data: Cow<'a, [u8]>,
}

impl<'a> Bitmap<'a> {
    /// Wrap some `AABBGGRR` pixel data. Missing pixels are transparent.
    pub const fn new(width: u16, height: u16, data: &'a [u8]) -> Bitmap<'a> {
        Bitmap {
            width,
            height,
            data: Cow::Borrowed(data),
        }
    }

    /// Build an owned bitmap from one-bit-per-pixel data (most significant
    /// bit first, rows padded to a byte). Set bits become `foreground`,
    /// clear bits are transparent.
    pub fn from_mono(width: u16, height: u16, data: &[u8], foreground: Rgb) -> Bitmap<'static> {
        let bytes_per_row = (usize::from(width) + 7) / 8;
        let mut pixels = Vec::with_capacity(usize::from(width) * usize::from(height));
        for y in 0..usize::from(height) {
            for x in 0..usize::from(width) {
                let byte = data.get(y * bytes_per_row + x / 8).copied().unwrap_or(0);
                let set = byte & (0x80 >> (x % 8)) != 0;
                pixels.push(if set { pack(foreground, 3) } else { 0 });
            }
        }
        Bitmap {
            width,
            height,
            data: Cow::Owned(pixels),
        }
    }

    /// Does this bitmap own its pixel storage?
    pub fn is_owned(&self) -> bool {
        matches!(self.data, Cow::Owned(_))
    }

    /// The raw `AABBGGRR` byte at (x, y).
    pub fn pixel(&self, x: u16, y: u16) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        let index = usize::from(y) * usize::from(self.width) + usize::from(x);
        self.data.get(index).copied().unwrap_or(0)
    }
}

/// The alpha of a bitmap pixel, `0..=3`.
pub const fn alpha(pixel: u8) -> u8 {
    pixel >> 6
}

/// The colour of a bitmap pixel.
pub const fn colour(pixel: u8) -> Rgb {
    Rgb::new(pixel, pixel >> 2, pixel >> 4)
}

/// Pack a colour and alpha into a bitmap pixel.
pub const fn pack(rgb: Rgb, alpha: u8) -> u8 {
    (alpha & 0b11) << 6 | (rgb.b & 0b11) << 4 | (rgb.g & 0b11) << 2 | (rgb.r & 0b11)
}

/// A mouse pointer: a bitmap plus the pixel within it that is "the point".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<'a> {
    pub hotspot: Point,
    pub bitmap: Bitmap<'a>,
}

/// The built-in mouse pointers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CursorName {
    /// 11x19 arrow pointer
    PointerSimple,
    /// 9x9 cross
    Cross,
    /// 5x5 dot
    Point,
    /// 11x11 arrows
    LeftArrow,
    RightArrow,
    UpArrow,
    DownArrow,
    /// 7x15 text insertion bar
    TextInput,
}

impl CursorName {
    pub fn cursor(self) -> &'static Cursor<'static> {
        &CURSORS[self as usize]
    }
}

// -----------------------------------------------------------------------------
// Static and Const Data
// -----------------------------------------------------------------------------

const CLEAR: u8 = 0;
const BLACK: u8 = pack(Rgb::BLACK, 3);
const WHITE: u8 = pack(Rgb::WHITE, 3);

const POINTER_SIMPLE: [u8; 11 * 19] = art(&[
    "X..........",
    "XX.........",
    "XoX........",
    "XooX.......",
    "XoooX......",
    "XooooX.....",
    "XoooooX....",
    "XooooooX...",
    "XoooooooX..",
    "XooooooooX.",
    "XoooooXXXXX",
    "XooXooX....",
    "XoX.XooX...",
    "XX..XooX...",
    "X....XooX..",
    ".....XooX..",
    "......XooX.",
    "......XooX.",
    ".......XX..",
]);

const CROSS: [u8; 9 * 9] = art(&[
    "...XXX...",
    "...XoX...",
    "...XoX...",
    "XXXXoXXXX",
    "XoooooooX",
    "XXXXoXXXX",
    "...XoX...",
    "...XoX...",
    "...XXX...",
]);

const POINT: [u8; 5 * 5] = art(&[
    ".XXX.", //
    "XoooX",
    "XoooX",
    "XoooX",
    ".XXX.",
]);

const RIGHT_ARROW: [u8; 11 * 11] = art(&[
    ".....X.....",
    ".....XX....",
    ".....XoX...",
    "XXXXXXooX..",
    "XooooooooX.",
    "XoooooooooX",
    "XooooooooX.",
    "XXXXXXooX..",
    ".....XoX...",
    ".....XX....",
    ".....X.....",
]);
const LEFT_ARROW: [u8; 11 * 11] = mirror(&RIGHT_ARROW, 11);
const DOWN_ARROW: [u8; 11 * 11] = transpose(&RIGHT_ARROW, 11);
const UP_ARROW: [u8; 11 * 11] = transpose(&LEFT_ARROW, 11);

const TEXT_INPUT: [u8; 7 * 15] = art(&[
    "ooo.ooo", //
    "...o...",
    "...o...",
    "...o...",
    "...o...",
    "...o...",
    "...o...",
    "...o...",
    "...o...",
    "...o...",
    "...o...",
    "...o...",
    "...o...",
    "...o...",
    "ooo.ooo",
]);

/// In [`CursorName`] order.
static CURSORS: [Cursor<'static>; 8] = [
    Cursor {
        hotspot: Point::new(0, 0),
        bitmap: Bitmap::new(11, 19, &POINTER_SIMPLE),
    },
    Cursor {
        hotspot: Point::new(4, 4),
        bitmap: Bitmap::new(9, 9, &CROSS),
    },
    Cursor {
        hotspot: Point::new(2, 2),
        bitmap: Bitmap::new(5, 5, &POINT),
    },
    Cursor {
        hotspot: Point::new(0, 5),
        bitmap: Bitmap::new(11, 11, &LEFT_ARROW),
    },
    Cursor {
        hotspot: Point::new(10, 5),
        bitmap: Bitmap::new(11, 11, &RIGHT_ARROW),
    },
    Cursor {
        hotspot: Point::new(5, 0),
        bitmap: Bitmap::new(11, 11, &UP_ARROW),
    },
    Cursor {
        hotspot: Point::new(5, 10),
        bitmap: Bitmap::new(11, 11, &DOWN_ARROW),
    },
    Cursor {
        hotspot: Point::new(3, 7),
        bitmap: Bitmap::new(7, 15, &TEXT_INPUT),
    },
];

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

/// Turn ASCII art into pixels: `X` is black, `o` is white, anything else is
/// transparent.
const fn art<const N: usize>(rows: &[&str]) -> [u8; N] {
    let mut out = [CLEAR; N];
    let mut i = 0;
    let mut y = 0;
    while y < rows.len() {
        let row = rows[y].as_bytes();
        let mut x = 0;
        while x < row.len() {
            out[i] = match row[x] {
                b'X' => BLACK,
                b'o' => WHITE,
                _ => CLEAR,
            };
            i += 1;
            x += 1;
        }
        y += 1;
    }
    out
}

/// Flip a square image left to right.
const fn mirror<const N: usize>(pixels: &[u8; N], side: usize) -> [u8; N] {
    let mut out = [CLEAR; N];
    let mut i = 0;
    while i < N {
        let (y, x) = (i / side, i % side);
        out[i] = pixels[y * side + (side - 1 - x)];
        i += 1;
    }
    out
}

/// Swap the axes of a square image.
const fn transpose<const N: usize>(pixels: &[u8; N], side: usize) -> [u8; N] {
    let mut out = [CLEAR; N];
    let mut i = 0;
    while i < N {
        let (y, x) = (i / side, i % side);
        out[i] = pixels[x * side + y];
        i += 1;
    }
    out
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------


// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
