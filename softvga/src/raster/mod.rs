//! Rasterisation into a viewport.
//!
//! A [`Canvas`] pairs a viewport with a pixel encoder and a clipping
//! rectangle. All coordinates here are absolute viewport coordinates; the
//! caller has already applied the origin. Anything outside the clipping
//! rectangle is silently dropped, so callers may pass any coordinates they
//! like.

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
// Sub-modules
// -----------------------------------------------------------------------------

mod glyph;
mod scroll;
mod shapes;

// -----------------------------------------------------------------------------
// Imports
// -----------------------------------------------------------------------------

use alloc::vec::Vec;

use crate::{
    bitmap::{self, Bitmap},
    colour::{PixelEncoder, Rgb},
    geometry::{Point, Rect, Size},
    viewport::Viewport,
};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// Something to draw on.
pub struct Canvas<'v> {
    viewport: &'v mut Viewport,
    encoder: PixelEncoder,
    clip: Rect,
}

impl<'v> Canvas<'v> {
    /// Draw on `viewport`, only inside `clip`.
    pub fn new(viewport: &'v mut Viewport, encoder: PixelEncoder, clip: Rect) -> Canvas<'v> {
        let bounds = Rect::with_size(
            Point::default(),
            Size::new(viewport.width() as i32, viewport.height() as i32),
        );
        Canvas {
            viewport,
            encoder,
            clip: clip.intersection(&bounds),
        }
    }

    /// Draw anywhere on `viewport`.
    pub fn unclipped(viewport: &'v mut Viewport, encoder: PixelEncoder) -> Canvas<'v> {
        let all = Rect::new(i32::MIN / 2, i32::MIN / 2, i32::MAX / 2, i32::MAX / 2);
        Canvas::new(viewport, encoder, all)
    }

    pub fn clip(&self) -> Rect {
        self.clip
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            0,
            0,
            self.viewport.width() as i32 - 1,
            self.viewport.height() as i32 - 1,
        )
    }

    pub fn encoder(&self) -> &PixelEncoder {
        &self.encoder
    }

    /// The encoded byte at a viewport position, if it is on screen.
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        if !self.bounds().contains(Point::new(x, y)) {
            return None;
        }
        Some(self.viewport.row(y as usize)[x as usize])
    }

    /// Write an encoded byte, if it is inside the clip.
    pub fn put(&mut self, x: i32, y: i32, byte: u8) {
        if self.clip.contains(Point::new(x, y)) {
            self.viewport.row_mut(y as usize)[x as usize] = byte;
        }
    }

    pub fn set_pixel(&mut self, p: Point, colour: Rgb) {
        let byte = self.encoder.encode(colour);
        self.put(p.x, p.y, byte);
    }

    /// Write an encoded byte across `x1..=x2` of row `y`.
    pub fn hline(&mut self, x1: i32, x2: i32, y: i32, byte: u8) {
        if y < self.clip.y1 || y > self.clip.y2 {
            return;
        }
        let (x1, x2) = (x1.min(x2).max(self.clip.x1), x1.max(x2).min(self.clip.x2));
        if x1 > x2 {
            return;
        }
        self.viewport.row_mut(y as usize)[x1 as usize..=x2 as usize].fill(byte);
    }

    pub fn fill_rect(&mut self, rect: Rect, colour: Rgb) {
        let r = rect.normalized().intersection(&self.clip);
        let byte = self.encoder.encode(colour);
        for y in r.y1..=r.y2 {
            self.hline(r.x1, r.x2, y, byte);
        }
    }

    /// Fill the whole clipping area.
    pub fn clear(&mut self, colour: Rgb) {
        self.fill_rect(self.clip, colour);
    }

    /// Flip every colour bit in the rectangle.
    pub fn invert_rect(&mut self, rect: Rect) {
        let r = rect.normalized().intersection(&self.clip);
        if r.is_empty() {
            return;
        }
        let mask = self.encoder.colour_mask();
        for y in r.y1..=r.y2 {
            let row = self.viewport.row_mut(y as usize);
            for px in &mut row[r.x1 as usize..=r.x2 as usize] {
                *px ^= mask;
            }
        }
    }

    /// Exchange `fg` and `bg` coloured pixels in the rectangle.
    pub fn swap_fg_bg(&mut self, rect: Rect, fg: Rgb, bg: Rgb) {
        let r = rect.normalized().intersection(&self.clip);
        if r.is_empty() {
            return;
        }
        let (fg, bg) = (self.encoder.encode(fg), self.encoder.encode(bg));
        for y in r.y1..=r.y2 {
            let row = self.viewport.row_mut(y as usize);
            for px in &mut row[r.x1 as usize..=r.x2 as usize] {
                if *px == fg {
                    *px = bg;
                } else if *px == bg {
                    *px = fg;
                }
            }
        }
    }

    /// Copy `source` so its top left lands on `dest`.
    ///
    /// Handles overlap in any direction.
    pub fn copy_rect(&mut self, source: Rect, dest: Point) {
        let source = source.normalized();
        let (dx, dy) = (
            dest.x.saturating_sub(source.x1),
            dest.y.saturating_sub(source.y1),
        );
        // what we may write, then what we can read for it
        let target = source.translate(dx, dy).intersection(&self.clip);
        let from = target
            .translate(dx.saturating_neg(), dy.saturating_neg())
            .intersection(&self.bounds());
        let target = from.translate(dx, dy);
        if from.is_empty() {
            return;
        }
        let len = from.width() as usize;
        let copy_row = |canvas: &mut Self, y: i32| {
            canvas.viewport.copy_within(
                (from.x1 as usize, y as usize),
                (target.x1 as usize, (y + dy) as usize),
                len,
            );
        };
        if dy > 0 {
            for y in (from.y1..=from.y2).rev() {
                copy_row(self, y);
            }
        } else {
            for y in from.y1..=from.y2 {
                copy_row(self, y);
            }
        }
    }

    /// Draw a bitmap with its top left at `pos`.
    ///
    /// Pixels with zero alpha are skipped. Everything else is opaque.
    pub fn draw_bitmap(&mut self, pos: Point, bmp: &Bitmap) {
        let area = Rect::with_size(pos, Size::new(i32::from(bmp.width), i32::from(bmp.height)))
            .intersection(&self.clip);
        for y in area.y1..=area.y2 {
            for x in area.x1..=area.x2 {
                let pixel = bmp.pixel((x - pos.x) as u16, (y - pos.y) as u16);
                if bitmap::alpha(pixel) != 0 {
                    let byte = self.encoder.encode(bitmap::colour(pixel));
                    self.viewport.row_mut(y as usize)[x as usize] = byte;
                }
            }
        }
    }

    /// Copy a rectangle of encoded bytes out of the viewport.
    ///
    /// `out` is resized to `width * height`. Positions off the viewport read
    /// as zero.
    pub fn read_rect(&self, rect: Rect, out: &mut Vec<u8>) {
        let rect = rect.normalized();
        let (w, h) = (rect.width() as usize, rect.height() as usize);
        out.clear();
        out.resize(w * h, 0);
        let on_screen = rect.intersection(&self.bounds());
        if on_screen.is_empty() {
            return;
        }
        for y in on_screen.y1..=on_screen.y2 {
            let row = self.viewport.row(y as usize);
            let start = (y - rect.y1) as usize * w + (on_screen.x1 - rect.x1) as usize;
            let len = on_screen.width() as usize;
            out[start..start + len]
                .copy_from_slice(&row[on_screen.x1 as usize..=on_screen.x2 as usize]);
        }
    }

    /// Copy a rectangle of encoded bytes into the viewport, clipped.
    ///
    /// `data` is row-major, `rect.width()` bytes per row. Missing bytes
    /// leave the screen alone.
    pub fn write_rect(&mut self, rect: Rect, data: &[u8]) {
        let rect = rect.normalized();
        let w = rect.width() as usize;
        let visible = rect.intersection(&self.clip);
        if visible.is_empty() {
            return;
        }
        for y in visible.y1..=visible.y2 {
            let start = (y - rect.y1) as usize * w + (visible.x1 - rect.x1) as usize;
            let len = visible.width() as usize;
            let Some(src) = data.get(start..start + len) else {
                continue;
            };
            self.viewport.row_mut(y as usize)[visible.x1 as usize..=visible.x2 as usize]
                .copy_from_slice(src);
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------


// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
