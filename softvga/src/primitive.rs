//! The drawing commands, and the data they carry.
//!
//! A [`Primitive`] borrows anything bigger than a few words (glyph data,
//! bitmaps, paths) from the application, which must keep it alive until the
//! primitive has executed.

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

use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;

use crate::{
    bitmap::Bitmap,
    colour::{Colour, Rgb},
    geometry::{Point, Rect, Size},
};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// One drawing or state-change command.
#[derive(Debug, Copy, Clone)]
pub enum Primitive<'a> {
    /// Set the colour used for lines, pixels and glyph foregrounds
    SetPenColor(Rgb),
    /// Set the colour used for fills and glyph backgrounds
    SetBrushColor(Rgb),
    /// Paint one pixel with the pen colour
    SetPixel(Point),
    /// Move the current position
    MoveTo(Point),
    /// Draw a line from the current position, then move there
    LineTo(Point),
    /// Fill a rectangle with the brush colour
    FillRect(Rect),
    /// Fill an ellipse centred on the current position
    FillEllipse(Size),
    /// Outline an ellipse centred on the current position
    DrawEllipse(Size),
    /// Fill the clipping area with the brush colour
    Clear,
    /// Scroll the scrolling region vertically. Positive moves content down.
    VScroll(i32),
    /// Scroll the scrolling region horizontally. Positive moves content
    /// right. Much slower than [`Primitive::VScroll`].
    HScroll(i32),
    DrawGlyph(Glyph<'a>),
    SetGlyphOptions(GlyphOptions),
    SetPaintOptions(PaintOptions),
    /// Invert the colour of every pixel in the rectangle
    InvertRect(Rect),
    /// Copy the rectangle to the current position. Source and destination
    /// may overlap.
    CopyRect(Rect),
    SetScrollingRegion(Rect),
    /// Exchange pen-coloured and brush-coloured pixels in the rectangle
    SwapFGBG(Rect),
    /// Copy screen bytes into a buffer
    ReadRawData(RawRegion<'a>),
    /// Copy bytes from a buffer onto the screen
    WriteRawData(RawRegion<'a>),
    RenderGlyphsBuffer(GlyphsBufferRenderInfo<'a>),
    DrawBitmap(BitmapDrawingInfo<'a>),
    /// Run a sprite hide/show pass
    RefreshSprites,
    /// Show the buffer we've been drawing on (double buffering only)
    SwapBuffers,
    /// Fill a polygon with the brush colour (even-odd rule)
    FillPath(&'a [Point]),
    /// Join the points with the pen colour. The path is not closed.
    DrawPath(&'a [Point]),
    SetOrigin(Point),
    SetClippingRect(Rect),
}

impl<'a> Primitive<'a> {
    /// Does this primitive touch the frame buffer?
    ///
    /// Sprites have to be out of the way before any of these run.
    pub fn touches_pixels(&self) -> bool {
        !matches!(
            self,
            Primitive::SetPenColor(_)
                | Primitive::SetBrushColor(_)
                | Primitive::MoveTo(_)
                | Primitive::SetGlyphOptions(_)
                | Primitive::SetPaintOptions(_)
                | Primitive::SetScrollingRegion(_)
                | Primitive::RefreshSprites
                | Primitive::SwapBuffers
                | Primitive::SetOrigin(_)
                | Primitive::SetClippingRect(_)
        )
    }
}

bitflags! {
    /// How glyphs are painted.
    ///
    /// Bits 7 and 8 together hold a [`DoubleWidth`] value.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
    pub struct GlyphOptions: u16 {
        /// Paint the background with the brush colour
        const FILL_BACKGROUND = 1 << 0;
        const BOLD = 1 << 1;
        /// Faint text
        const REDUCE_LUMINOSITY = 1 << 2;
        /// Skew the glyph to the right
        const ITALIC = 1 << 3;
        /// Swap foreground and background (XORed with the paint option)
        const INVERT = 1 << 4;
        /// Paint only the background
        const BLANK = 1 << 5;
        const UNDERLINE = 1 << 6;
        const DOUBLE_WIDTH_BIT0 = 1 << 7;
        const DOUBLE_WIDTH_BIT1 = 1 << 8;
        const USER_OPT1 = 1 << 9;
        const USER_OPT2 = 1 << 10;
    }
}

/// The double width/height field of [`GlyphOptions`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DoubleWidth {
    Normal = 0,
    Double = 1,
    /// Double width, top half of a double height glyph
    DoubleHeightTop = 2,
    /// Double width, bottom half of a double height glyph
    DoubleHeightBottom = 3,
}

impl GlyphOptions {
    const DOUBLE_WIDTH_SHIFT: u16 = 7;

    pub fn fill_background(&self) -> bool {
        self.contains(GlyphOptions::FILL_BACKGROUND)
    }

    pub fn bold(&self) -> bool {
        self.contains(GlyphOptions::BOLD)
    }

    pub fn reduce_luminosity(&self) -> bool {
        self.contains(GlyphOptions::REDUCE_LUMINOSITY)
    }

    pub fn italic(&self) -> bool {
        self.contains(GlyphOptions::ITALIC)
    }

    pub fn invert(&self) -> bool {
        self.contains(GlyphOptions::INVERT)
    }

    pub fn blank(&self) -> bool {
        self.contains(GlyphOptions::BLANK)
    }

    pub fn underline(&self) -> bool {
        self.contains(GlyphOptions::UNDERLINE)
    }

    pub fn double_width(&self) -> DoubleWidth {
        match (self.bits() >> Self::DOUBLE_WIDTH_SHIFT) & 0b11 {
            0 => DoubleWidth::Normal,
            1 => DoubleWidth::Double,
            2 => DoubleWidth::DoubleHeightTop,
            _ => DoubleWidth::DoubleHeightBottom,
        }
    }

    pub fn with_double_width(self, value: DoubleWidth) -> GlyphOptions {
        let cleared = self - (GlyphOptions::DOUBLE_WIDTH_BIT0 | GlyphOptions::DOUBLE_WIDTH_BIT1);
        cleared | GlyphOptions::from_bits_retain((value as u16) << Self::DOUBLE_WIDTH_SHIFT)
    }
}

bitflags! {
    /// Options applied to every drawing primitive.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
    pub struct PaintOptions: u8 {
        /// Paint with the brush colour where the pen is asked for, and
        /// vice versa
        const SWAP_FG_BG = 1 << 0;
    }
}

impl PaintOptions {
    pub fn swap_fg_bg(&self) -> bool {
        self.contains(PaintOptions::SWAP_FG_BG)
    }
}

/// A one-bit-per-pixel image, most significant bit leftmost, each row padded
/// to a whole byte.
#[derive(Debug, Copy, Clone)]
pub struct Glyph<'a> {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
    pub data: &'a [u8],
}

impl<'a> Glyph<'a> {
    pub const fn new(x: i32, y: i32, width: u16, height: u16, data: &'a [u8]) -> Glyph<'a> {
        Glyph {
            x,
            y,
            width,
            height,
            data,
        }
    }

    pub const fn bytes_per_row(&self) -> usize {
        (self.width as usize + 7) / 8
    }

    /// Is the pixel at (x, y) set? Out of range pixels are clear.
    pub fn bit(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return false;
        }
        let index = y as usize * self.bytes_per_row() + x as usize / 8;
        self.data
            .get(index)
            .is_some_and(|byte| byte & (0x80 >> (x % 8)) != 0)
    }
}

/// One packed cell of a [`GlyphsBuffer`].
///
/// | bits   | meaning                |
/// |--------|------------------------|
/// | 0..8   | glyph index            |
/// | 8..12  | background [`Colour`]  |
/// | 12..16 | foreground [`Colour`]  |
/// | 16..32 | [`GlyphOptions`]       |
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlyphMapItem(pub u32);

impl GlyphMapItem {
    pub const fn new(index: u8, background: Colour, foreground: Colour, options: GlyphOptions) -> Self {
        GlyphMapItem(
            index as u32
                | (background as u32) << 8
                | (foreground as u32) << 12
                | (options.bits() as u32) << 16,
        )
    }

    pub const fn index(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub const fn background(self) -> Colour {
        Colour::from_index((self.0 >> 8) as u8)
    }

    pub const fn foreground(self) -> Colour {
        Colour::from_index((self.0 >> 12) as u8)
    }

    pub const fn options(self) -> GlyphOptions {
        GlyphOptions::from_bits_retain((self.0 >> 16) as u16)
    }

    pub const fn with_options(self, options: GlyphOptions) -> Self {
        GlyphMapItem((self.0 & 0xFFFF) | (options.bits() as u32) << 16)
    }
}

/// A text screen: a grid of cells, each naming a glyph in a font and how to
/// colour it.
///
/// The cells are atomics so the application can update them while a render
/// is queued.
#[derive(Debug)]
pub struct GlyphsBuffer<'a> {
    pub glyphs_width: u16,
    pub glyphs_height: u16,
    /// Every glyph, back to back, in [`Glyph`] format
    pub glyphs_data: &'a [u8],
    pub columns: u16,
    pub rows: u16,
    pub map: &'a [AtomicU32],
}

impl<'a> GlyphsBuffer<'a> {
    /// Get a cell, if it exists.
    pub fn item(&self, column: u16, row: u16) -> Option<GlyphMapItem> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        let index = usize::from(row) * usize::from(self.columns) + usize::from(column);
        self.map
            .get(index)
            .map(|cell| GlyphMapItem(cell.load(Ordering::Relaxed)))
    }

    /// Change a cell. Out of range cells are ignored.
    pub fn set_item(&self, column: u16, row: u16, item: GlyphMapItem) {
        if column >= self.columns || row >= self.rows {
            return;
        }
        let index = usize::from(row) * usize::from(self.columns) + usize::from(column);
        if let Some(cell) = self.map.get(index) {
            cell.store(item.0, Ordering::Relaxed);
        }
    }

    /// The bitmap data for one glyph of the font.
    pub fn glyph_data(&self, index: u8) -> &'a [u8] {
        let size = (usize::from(self.glyphs_width) + 7) / 8 * usize::from(self.glyphs_height);
        let start = usize::from(index) * size;
        self.glyphs_data.get(start..start + size).unwrap_or(&[])
    }
}

/// Which cells of a [`GlyphsBuffer`] to render.
#[derive(Debug, Copy, Clone)]
pub struct GlyphsBufferRenderInfo<'a> {
    /// Inclusive range of columns (x) and rows (y)
    pub cells: Rect,
    pub buffer: &'a GlyphsBuffer<'a>,
}

impl<'a> GlyphsBufferRenderInfo<'a> {
    /// Render just one cell.
    pub const fn single(column: i32, row: i32, buffer: &'a GlyphsBuffer<'a>) -> Self {
        GlyphsBufferRenderInfo {
            cells: Rect::new(column, row, column, row),
            buffer,
        }
    }
}

/// Where to draw a bitmap.
#[derive(Debug, Copy, Clone)]
pub struct BitmapDrawingInfo<'a> {
    pub position: Point,
    pub bitmap: &'a Bitmap<'a>,
}

/// Holds raw frame buffer bytes on the way to or from the screen.
///
/// The bytes are row-major, `width * height` of them, and are the encoded
/// form the DMA engine sends (colour and sync bits).
#[derive(Debug, Default)]
pub struct RawBuffer {
    data: spin::Mutex<Vec<u8>>,
}

impl RawBuffer {
    pub const fn new() -> RawBuffer {
        RawBuffer {
            data: spin::Mutex::new(Vec::new()),
        }
    }

    /// Take a copy of the bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.data.lock().clone()
    }

    /// Replace the bytes.
    pub fn replace(&self, bytes: Vec<u8>) {
        *self.data.lock() = bytes;
    }

    pub(crate) fn lock(&self) -> spin::MutexGuard<'_, Vec<u8>> {
        self.data.lock()
    }
}

/// A rectangle of the viewport, in absolute viewport coordinates, and the
/// buffer its bytes are read into or written from.
#[derive(Debug, Copy, Clone)]
pub struct RawRegion<'a> {
    pub rect: Rect,
    pub buffer: &'a RawBuffer,
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------


// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
