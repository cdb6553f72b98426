//! Painting one-bit glyphs, and whole text screens made of them.

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

use super::Canvas;
use crate::{
    colour::Rgb,
    geometry::{Point, Rect, Size},
    primitive::{DoubleWidth, Glyph, GlyphOptions, GlyphsBufferRenderInfo},
};

// -----------------------------------------------------------------------------
// Static and Const Data
// -----------------------------------------------------------------------------

/// Options the plain per-pixel loop can cope with.
const LIGHT_OPTIONS: GlyphOptions = GlyphOptions::FILL_BACKGROUND
    .union(GlyphOptions::INVERT)
    .union(GlyphOptions::REDUCE_LUMINOSITY);

/// The brightest a faint channel may be.
const FAINT_LIMIT: u8 = 2;

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

impl Canvas<'_> {
    /// Paint a glyph with its top left at (`glyph.x`, `glyph.y`).
    ///
    /// Set bits are painted `fg`. Clear bits are painted `bg` if the options
    /// ask for a background, otherwise left alone.
    pub fn draw_glyph(&mut self, glyph: &Glyph, options: GlyphOptions, fg: Rgb, bg: Rgb) {
        let (fg, bg) = if options.invert() { (bg, fg) } else { (fg, bg) };
        let fg = if options.reduce_luminosity() {
            fg.clamped(FAINT_LIMIT)
        } else {
            fg
        };
        let (fg, bg) = (self.encoder.encode(fg), self.encoder.encode(bg));
        if LIGHT_OPTIONS.contains(options) {
            self.glyph_light(glyph, options.fill_background(), fg, bg);
        } else {
            self.glyph_full(glyph, options, fg, bg);
        }
    }

    /// Paint some cells of a text screen, with cell (0, 0) at `offset`.
    pub fn render_glyphs_buffer(&mut self, info: &GlyphsBufferRenderInfo, offset: Point) {
        let buffer = info.buffer;
        if buffer.columns == 0 || buffer.rows == 0 {
            return;
        }
        let grid = Rect::new(
            0,
            0,
            i32::from(buffer.columns) - 1,
            i32::from(buffer.rows) - 1,
        );
        let cells = info.cells.normalized().intersection(&grid);
        if cells.is_empty() {
            return;
        }
        let (gw, gh) = (i32::from(buffer.glyphs_width), i32::from(buffer.glyphs_height));
        for row in cells.y1..=cells.y2 {
            for column in cells.x1..=cells.x2 {
                let Some(item) = buffer.item(column as u16, row as u16) else {
                    continue;
                };
                let options = item.options();
                let scale = if options.double_width() == DoubleWidth::Normal {
                    1
                } else {
                    2
                };
                let glyph = Glyph::new(
                    offset.x.saturating_add(column * gw * scale),
                    offset.y.saturating_add(row * gh),
                    buffer.glyphs_width,
                    buffer.glyphs_height,
                    buffer.glyph_data(item.index()),
                );
                self.draw_glyph(
                    &glyph,
                    options,
                    item.foreground().rgb(),
                    item.background().rgb(),
                );
            }
        }
    }

    fn glyph_light(&mut self, glyph: &Glyph, fill: bool, fg: u8, bg: u8) {
        let cell = Rect::with_size(
            Point::new(glyph.x, glyph.y),
            Size::new(i32::from(glyph.width), i32::from(glyph.height)),
        );
        let area = cell.intersection(&self.clip);
        if area.is_empty() {
            return;
        }
        for y in area.y1..=area.y2 {
            let gy = y - glyph.y;
            let row = self.viewport.row_mut(y as usize);
            for x in area.x1..=area.x2 {
                if glyph.bit(x - glyph.x, gy) {
                    row[x as usize] = fg;
                } else if fill {
                    row[x as usize] = bg;
                }
            }
        }
    }

    fn glyph_full(&mut self, glyph: &Glyph, options: GlyphOptions, fg: u8, bg: u8) {
        let double_width = options.double_width();
        let scale = if double_width == DoubleWidth::Normal {
            1
        } else {
            2
        };
        let h = i32::from(glyph.height);
        let cell = Rect::with_size(
            Point::new(glyph.x, glyph.y),
            Size::new(i32::from(glyph.width) * scale, h),
        );
        let area = cell.intersection(&self.clip);
        if area.is_empty() {
            return;
        }
        if options.blank() {
            for y in area.y1..=area.y2 {
                self.hline(area.x1, area.x2, y, bg);
            }
            return;
        }

        let fill = options.fill_background();
        for y in area.y1..=area.y2 {
            let oy = y - glyph.y;
            let source_y = match double_width {
                DoubleWidth::Normal | DoubleWidth::Double => oy,
                DoubleWidth::DoubleHeightTop => oy / 2,
                DoubleWidth::DoubleHeightBottom => h / 2 + oy / 2,
            };
            let skew = if options.italic() { (h - 1 - oy) / 4 } else { 0 };
            let underline = options.underline() && oy == h - 1;
            let row = self.viewport.row_mut(y as usize);
            for x in area.x1..=area.x2 {
                let source_x = (x - glyph.x - skew).div_euclid(scale);
                let on = underline
                    || glyph.bit(source_x, source_y)
                    || (options.bold() && glyph.bit(source_x - 1, source_y));
                if on {
                    row[x as usize] = fg;
                } else if fill {
                    row[x as usize] = bg;
                }
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use core::sync::atomic::AtomicU32;

    use super::super::tests::{encoder, frame, pattern, snapshot};
    use super::*;
    use crate::{
        colour::Colour,
        primitive::{GlyphMapItem, GlyphsBuffer},
    };

    /// An 8x4 glyph: a V shape with a flat bottom.
    const VEE: [u8; 4] = [0b1000_0001, 0b0100_0010, 0b0011_1100, 0b0000_0000];

    const FG: Rgb = Rgb::new(3, 0, 0);
    const BG: Rgb = Rgb::new(0, 0, 2);

    fn full_clip(w: i32, h: i32) -> Rect {
        Rect::new(0, 0, w - 1, h - 1)
    }

    #[test]
    fn light_and_full_paths_agree() {
        let enc = encoder();
        for bits in 0..8u16 {
            let mut options = GlyphOptions::empty();
            for (i, flag) in LIGHT_OPTIONS.iter().enumerate() {
                if bits & (1 << i) != 0 {
                    options |= flag;
                }
            }
            let glyph = Glyph::new(3, 1, 8, 4, &VEE);

            let mut light = frame(16, 8);
            pattern(&mut light);
            let mut c = Canvas::new(light.drawing_mut(), enc, full_clip(16, 8));
            c.draw_glyph(&glyph, options, FG, BG);
            drop(c);

            let mut full = frame(16, 8);
            pattern(&mut full);
            let mut c = Canvas::new(full.drawing_mut(), enc, full_clip(16, 8));
            let (fg, bg) = if options.invert() { (BG, FG) } else { (FG, BG) };
            let fg = if options.reduce_luminosity() {
                fg.clamped(FAINT_LIMIT)
            } else {
                fg
            };
            c.glyph_full(&glyph, options, enc.encode(fg), enc.encode(bg));
            drop(c);

            assert_eq!(snapshot(&light), snapshot(&full), "options {:?}", options);
        }
    }

    #[test]
    fn background_is_transparent_unless_filled() {
        let enc = encoder();
        let mut fb = frame(8, 4);
        pattern(&mut fb);
        let before = snapshot(&fb);
        let mut c = Canvas::new(fb.drawing_mut(), enc, full_clip(8, 4));
        c.draw_glyph(&Glyph::new(0, 0, 8, 4, &VEE), GlyphOptions::empty(), FG, BG);
        drop(c);
        let after = snapshot(&fb);
        assert_eq!(after[0][0], enc.encode(FG));
        assert_eq!(after[0][1], before[0][1]);
        assert_eq!(after[3], before[3]);

        let mut c = Canvas::new(fb.drawing_mut(), enc, full_clip(8, 4));
        c.draw_glyph(
            &Glyph::new(0, 0, 8, 4, &VEE),
            GlyphOptions::FILL_BACKGROUND | GlyphOptions::INVERT,
            FG,
            BG,
        );
        drop(c);
        let after = snapshot(&fb);
        assert_eq!(after[0][0], enc.encode(BG));
        assert_eq!(after[0][1], enc.encode(FG));
    }

    #[test]
    fn faint_text_is_dimmer() {
        let enc = encoder();
        let mut fb = frame(8, 4);
        let mut c = Canvas::new(fb.drawing_mut(), enc, full_clip(8, 4));
        c.draw_glyph(
            &Glyph::new(0, 0, 8, 4, &VEE),
            GlyphOptions::REDUCE_LUMINOSITY,
            Rgb::WHITE,
            BG,
        );
        drop(c);
        assert_eq!(fb.drawing().row(0)[0], enc.encode(Rgb::new(2, 2, 2)));
    }

    #[test]
    fn bold_and_underline() {
        let enc = encoder();
        let mut fb = frame(10, 4);
        let mut c = Canvas::new(fb.drawing_mut(), enc, full_clip(10, 4));
        c.draw_glyph(
            &Glyph::new(0, 0, 8, 4, &VEE),
            GlyphOptions::BOLD | GlyphOptions::UNDERLINE,
            FG,
            BG,
        );
        drop(c);
        let fg = enc.encode(FG);
        let black = enc.encode(Rgb::BLACK);
        let row0 = fb.drawing().row(0);
        assert_eq!(&row0[..3], &[fg, fg, black]);
        assert_eq!(row0[7], fg);
        // bold never spills out of the cell
        assert_eq!(row0[8], black);
        assert!(fb.drawing().row(3)[..8].iter().all(|p| *p == fg));
        assert_eq!(fb.drawing().row(3)[8], black);
    }

    #[test]
    fn italic_leans_right() {
        let enc = encoder();
        let mut fb = frame(8, 8);
        let column = [0b1000_0000; 8];
        let mut c = Canvas::new(fb.drawing_mut(), enc, full_clip(8, 8));
        c.draw_glyph(&Glyph::new(0, 0, 8, 8, &column), GlyphOptions::ITALIC, FG, BG);
        drop(c);
        let fg = enc.encode(FG);
        assert_eq!(fb.drawing().row(0)[1], fg);
        assert_eq!(fb.drawing().row(3)[1], fg);
        assert_eq!(fb.drawing().row(4)[0], fg);
        assert_eq!(fb.drawing().row(7)[0], fg);
    }

    #[test]
    fn double_width_and_height() {
        let enc = encoder();
        let fg = enc.encode(FG);
        let black = enc.encode(Rgb::BLACK);
        let glyph = Glyph::new(0, 0, 8, 4, &VEE);

        let mut fb = frame(16, 4);
        let mut c = Canvas::new(fb.drawing_mut(), enc, full_clip(16, 4));
        c.draw_glyph(
            &glyph,
            GlyphOptions::empty().with_double_width(DoubleWidth::Double),
            FG,
            BG,
        );
        drop(c);
        assert_eq!(&fb.drawing().row(0)[..3], &[fg, fg, black]);
        assert_eq!(&fb.drawing().row(0)[13..], &[black, fg, fg]);

        // the top half uses source rows 0 and 1, each twice
        let mut fb = frame(16, 4);
        let mut c = Canvas::new(fb.drawing_mut(), enc, full_clip(16, 4));
        c.draw_glyph(
            &glyph,
            GlyphOptions::empty().with_double_width(DoubleWidth::DoubleHeightTop),
            FG,
            BG,
        );
        drop(c);
        assert_eq!(fb.drawing().row(0), fb.drawing().row(1));
        assert_eq!(fb.drawing().row(2)[2], fg);
        assert_eq!(fb.drawing().row(3)[2], fg);

        // the bottom half uses source rows 2 and 3
        let mut fb = frame(16, 4);
        let mut c = Canvas::new(fb.drawing_mut(), enc, full_clip(16, 4));
        c.draw_glyph(
            &glyph,
            GlyphOptions::empty().with_double_width(DoubleWidth::DoubleHeightBottom),
            FG,
            BG,
        );
        drop(c);
        assert_eq!(fb.drawing().row(0)[4], fg);
        assert!(fb.drawing().row(3).iter().all(|p| *p == black));
    }

    #[test]
    fn blank_paints_only_background() {
        let enc = encoder();
        let mut fb = frame(8, 4);
        let mut c = Canvas::new(fb.drawing_mut(), enc, full_clip(8, 4));
        c.draw_glyph(&Glyph::new(0, 0, 8, 4, &VEE), GlyphOptions::BLANK, FG, BG);
        drop(c);
        for y in 0..4 {
            assert!(fb.drawing().row(y).iter().all(|p| *p == enc.encode(BG)));
        }
    }

    #[test]
    fn glyphs_buffer_cells() {
        let enc = encoder();
        let font = [0xFF, 0x00, 0x00, 0xFF];
        let map = [AtomicU32::new(0), AtomicU32::new(0)];
        let buffer = GlyphsBuffer {
            glyphs_width: 8,
            glyphs_height: 2,
            glyphs_data: &font,
            columns: 2,
            rows: 1,
            map: &map,
        };
        buffer.set_item(
            0,
            0,
            GlyphMapItem::new(0, Colour::Blue, Colour::Red, GlyphOptions::FILL_BACKGROUND),
        );
        buffer.set_item(
            1,
            0,
            GlyphMapItem::new(1, Colour::Green, Colour::White, GlyphOptions::FILL_BACKGROUND),
        );
        let mut fb = frame(16, 2);
        let mut c = Canvas::new(fb.drawing_mut(), enc, full_clip(16, 2));
        let info = GlyphsBufferRenderInfo {
            cells: Rect::new(0, 0, 5, 5),
            buffer: &buffer,
        };
        c.render_glyphs_buffer(&info, Point::default());
        drop(c);
        let vp = fb.drawing();
        assert!(vp.row(0)[..8].iter().all(|p| *p == enc.encode(Colour::Red.rgb())));
        assert!(vp.row(1)[..8].iter().all(|p| *p == enc.encode(Colour::Blue.rgb())));
        assert!(vp.row(0)[8..].iter().all(|p| *p == enc.encode(Colour::Green.rgb())));
        assert!(vp.row(1)[8..].iter().all(|p| *p == enc.encode(Colour::White.rgb())));
    }
}

// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
