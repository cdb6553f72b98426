//! The mutable drawing context that primitives read and update.

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

use crate::{
    colour::Rgb,
    geometry::{Point, Rect, Size},
    primitive::{GlyphOptions, PaintOptions},
};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// Pen, brush, position and clipping.
///
/// Only primitive execution changes this, and only one context executes
/// primitives at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintState {
    pub pen_color: Rgb,
    pub brush_color: Rgb,
    /// Current position, already offset by `origin`
    pub position: Point,
    pub glyph_options: GlyphOptions,
    pub paint_options: PaintOptions,
    /// In viewport coordinates
    pub scrolling_region: Rect,
    pub origin: Point,
    /// Relative to `origin`
    pub clipping_rect: Rect,
    /// `clipping_rect` moved by `origin` and limited to the viewport
    pub abs_clipping_rect: Rect,
}

impl PaintState {
    /// Default state for a viewport of the given size.
    pub fn new(viewport: Size) -> PaintState {
        let all = Rect::with_size(Point::default(), viewport);
        PaintState {
            pen_color: Rgb::WHITE,
            brush_color: Rgb::BLACK,
            position: Point::default(),
            glyph_options: GlyphOptions::empty(),
            paint_options: PaintOptions::empty(),
            scrolling_region: all,
            origin: Point::default(),
            clipping_rect: all,
            abs_clipping_rect: all,
        }
    }

    pub fn set_origin(&mut self, origin: Point, viewport: Size) {
        self.origin = origin;
        self.update_abs_clipping_rect(viewport);
    }

    pub fn set_clipping_rect(&mut self, rect: Rect, viewport: Size) {
        self.clipping_rect = rect;
        self.update_abs_clipping_rect(viewport);
    }

    /// Set the scrolling region, limited to the viewport.
    pub fn set_scrolling_region(&mut self, rect: Rect, viewport: Size) {
        let all = Rect::with_size(Point::default(), viewport);
        self.scrolling_region = rect.normalized().intersection(&all);
    }

    fn update_abs_clipping_rect(&mut self, viewport: Size) {
        let all = Rect::with_size(Point::default(), viewport);
        self.abs_clipping_rect = self
            .clipping_rect
            .translate(self.origin.x, self.origin.y)
            .intersection(&all);
    }

    /// The colour to draw "pen" pixels in, honouring the swap option.
    pub fn actual_pen_color(&self) -> Rgb {
        if self.paint_options.swap_fg_bg() {
            self.brush_color
        } else {
            self.pen_color
        }
    }

    /// The colour to draw "brush" pixels in, honouring the swap option.
    pub fn actual_brush_color(&self) -> Rgb {
        if self.paint_options.swap_fg_bg() {
            self.pen_color
        } else {
            self.brush_color
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------


// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
