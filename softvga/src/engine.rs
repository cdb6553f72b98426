//! Executes primitives against the current paint state and frame buffer.
//!
//! Everything here runs in exactly one context at a time: the controller
//! holds the engine behind a lock, and whoever holds the lock (the
//! application, or the vertical sync interrupt) is the only one drawing.

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
    colour::PixelEncoder,
    dma::DmaChain,
    geometry::{Point, Size},
    paint::PaintState,
    primitive::{Glyph, Primitive},
    raster::Canvas,
    sprite::SpriteLayer,
    timings::Timings,
    viewport::{FrameBuffer, Layout},
};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// Everything that exists once a resolution has been set.
#[derive(Debug)]
pub(crate) struct Display {
    pub timings: Timings,
    pub layout: Layout,
    pub frame: FrameBuffer,
    pub chain: DmaChain,
}

impl Display {
    pub fn size(&self) -> Size {
        Size::new(self.frame.width() as i32, self.frame.height() as i32)
    }
}

#[derive(Debug)]
pub(crate) struct Engine<'a> {
    encoder: PixelEncoder,
    paint: PaintState,
    display: Option<Display>,
    sprites: SpriteLayer<'a>,
}

impl<'a> Engine<'a> {
    pub fn new(encoder: PixelEncoder) -> Engine<'a> {
        Engine {
            encoder,
            paint: PaintState::new(Size::default()),
            display: None,
            sprites: SpriteLayer::new(),
        }
    }

    pub fn encoder(&self) -> PixelEncoder {
        self.encoder
    }

    pub fn paint(&self) -> &PaintState {
        &self.paint
    }

    pub fn display(&self) -> Option<&Display> {
        self.display.as_ref()
    }

    /// Move the screen onto new timings, keeping the frame buffer.
    pub fn replace_chain(&mut self, timings: Timings, chain: DmaChain) -> Option<DmaChain> {
        let display = self.display.as_mut()?;
        display.timings = timings;
        Some(core::mem::replace(&mut display.chain, chain))
    }

    /// Start drawing on a new display (or none), handing back the old one.
    ///
    /// The paint state goes back to its defaults.
    pub fn set_display(
        &mut self,
        encoder: PixelEncoder,
        display: Option<Display>,
    ) -> Option<Display> {
        self.sprites.discard();
        self.encoder = encoder;
        self.paint = PaintState::new(display.as_ref().map_or(Size::default(), Display::size));
        core::mem::replace(&mut self.display, display)
    }

    /// Take the sprites off the screen, if they are on it.
    ///
    /// With double buffering the application redraws whole frames, so the
    /// saved backgrounds are dropped instead of restored.
    pub fn hide_sprites(&mut self) {
        match self.display.as_mut() {
            Some(display) => {
                let restore = !display.frame.is_double_buffered();
                self.sprites
                    .hide(display.frame.drawing_mut(), self.encoder, restore);
            }
            None => self.sprites.discard(),
        }
    }

    /// Put the sprites back on the screen, if there are any.
    pub fn show_sprites(&mut self) {
        if self.sprites.is_empty() {
            return;
        }
        if let Some(display) = self.display.as_mut() {
            self.sprites.show(display.frame.drawing_mut(), self.encoder);
        }
    }

    /// Hide the sprites, let `f` change them, and leave them hidden for the
    /// next show.
    pub fn with_sprites<R>(&mut self, f: impl FnOnce(&mut SpriteLayer<'a>) -> R) -> R {
        self.hide_sprites();
        f(&mut self.sprites)
    }

    pub fn sprites(&self) -> &SpriteLayer<'a> {
        &self.sprites
    }

    /// Run one primitive.
    pub fn execute(&mut self, primitive: Primitive<'a>) {
        if self.display.is_none() {
            return;
        }
        if primitive.touches_pixels() {
            self.hide_sprites();
        }
        let Engine {
            encoder,
            paint,
            display,
            sprites,
        } = self;
        let Some(display) = display.as_mut() else {
            return;
        };
        let size = display.size();
        let origin = paint.origin;
        let pen = paint.actual_pen_color();
        let brush = paint.actual_brush_color();
        let mut canvas = Canvas::new(display.frame.drawing_mut(), *encoder, paint.abs_clipping_rect);

        match primitive {
            Primitive::SetPenColor(colour) => paint.pen_color = colour,
            Primitive::SetBrushColor(colour) => paint.brush_color = colour,
            Primitive::SetPixel(p) => canvas.set_pixel(p.offset(origin.x, origin.y), pen),
            Primitive::MoveTo(p) => paint.position = p.offset(origin.x, origin.y),
            Primitive::LineTo(p) => {
                let to = p.offset(origin.x, origin.y);
                canvas.line(paint.position, to, pen);
                paint.position = to;
            }
            Primitive::FillRect(rect) => canvas.fill_rect(rect.translate(origin.x, origin.y), brush),
            Primitive::FillEllipse(size) => canvas.fill_ellipse(paint.position, size, brush),
            Primitive::DrawEllipse(size) => canvas.draw_ellipse(paint.position, size, pen),
            Primitive::Clear => canvas.clear(brush),
            Primitive::VScroll(n) => {
                if canvas.vscroll(paint.scrolling_region, n) {
                    drop(canvas);
                    let index = display.frame.drawing_index();
                    display
                        .chain
                        .retarget_rows(index, display.frame.drawing().row_ptrs());
                }
            }
            Primitive::HScroll(n) => canvas.hscroll(paint.scrolling_region, n, brush),
            Primitive::DrawGlyph(glyph) => {
                let glyph = Glyph {
                    x: glyph.x.saturating_add(origin.x),
                    y: glyph.y.saturating_add(origin.y),
                    ..glyph
                };
                canvas.draw_glyph(&glyph, paint.glyph_options, pen, brush);
            }
            Primitive::SetGlyphOptions(options) => paint.glyph_options = options,
            Primitive::SetPaintOptions(options) => paint.paint_options = options,
            Primitive::InvertRect(rect) => canvas.invert_rect(rect.translate(origin.x, origin.y)),
            Primitive::CopyRect(source) => {
                canvas.copy_rect(source.translate(origin.x, origin.y), paint.position)
            }
            Primitive::SetScrollingRegion(rect) => paint.set_scrolling_region(rect, size),
            Primitive::SwapFGBG(rect) => canvas.swap_fg_bg(
                rect.translate(origin.x, origin.y),
                paint.pen_color,
                paint.brush_color,
            ),
            Primitive::ReadRawData(region) => {
                canvas.read_rect(region.rect, &mut region.buffer.lock());
            }
            Primitive::WriteRawData(region) => {
                canvas.write_rect(region.rect, &region.buffer.lock());
            }
            Primitive::RenderGlyphsBuffer(info) => canvas.render_glyphs_buffer(&info, origin),
            Primitive::DrawBitmap(info) => {
                canvas.draw_bitmap(info.position.offset(origin.x, origin.y), info.bitmap)
            }
            Primitive::RefreshSprites => {
                drop(canvas);
                let restore = !display.frame.is_double_buffered();
                sprites.hide(display.frame.drawing_mut(), *encoder, restore);
                if !sprites.is_empty() {
                    sprites.show(display.frame.drawing_mut(), *encoder);
                }
            }
            Primitive::SwapBuffers => {
                drop(canvas);
                if display.frame.is_double_buffered() {
                    // the finished frame goes out with its sprites on it
                    if !sprites.is_empty() {
                        sprites.show(display.frame.drawing_mut(), *encoder);
                    }
                    display.frame.swap();
                    let visible = display.frame.visible_index();
                    display
                        .chain
                        .retarget_rows(visible, display.frame.visible().row_ptrs());
                    display.chain.show_segment(visible);
                    sprites.discard();
                }
            }
            Primitive::FillPath(points) => canvas.fill_path(points, origin, brush),
            Primitive::DrawPath(points) => canvas.draw_path(points, origin, pen),
            Primitive::SetOrigin(p) => paint.set_origin(p, size),
            Primitive::SetClippingRect(rect) => paint.set_clipping_rect(rect, size),
        }
    }

    /// Where is the current position, relative to the origin?
    pub fn position(&self) -> Point {
        let origin = self.paint.origin;
        self.paint.position.offset(-origin.x, -origin.y)
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bitmap::{pack, Bitmap},
        colour::{BitsPerChannel, Rgb},
        geometry::Rect,
        primitive::{PaintOptions, RawBuffer, RawRegion},
        sprite::Sprite,
        timings::SyncPolarity,
        viewport::HeapAllocator,
    };

    const TINY: &str = "\"tiny\" 1 32 34 36 40 16 17 18 20 -HSync -VSync";

    fn encoder() -> PixelEncoder {
        PixelEncoder::new(BitsPerChannel::Two, SyncPolarity::Negative, SyncPolarity::Negative)
    }

    fn engine<'a>(double_buffered: bool) -> Engine<'a> {
        let timings: Timings = TINY.parse().unwrap();
        let layout = Layout::centred(&timings, 32, 16);
        let enc = encoder();
        let frame = FrameBuffer::allocate(
            &mut HeapAllocator::default(),
            32,
            Some(16),
            16,
            double_buffered,
            6,
            enc.encode(Rgb::BLACK),
        )
        .unwrap();
        let chain = DmaChain::build(&timings, &layout, &enc, &frame).unwrap();
        let mut engine = Engine::new(enc);
        engine.set_display(
            enc,
            Some(Display {
                timings,
                layout,
                frame,
                chain,
            }),
        );
        engine
    }

    fn pixel(engine: &Engine, x: usize, y: usize) -> Rgb {
        let display = engine.display().unwrap();
        engine.encoder().decode(display.frame.drawing().row(y)[x])
    }

    fn run<'a>(engine: &mut Engine<'a>, primitives: &[Primitive<'a>]) {
        for p in primitives {
            engine.execute(*p);
        }
    }

    #[test]
    fn nothing_happens_without_a_display() {
        let mut e = Engine::new(encoder());
        e.execute(Primitive::MoveTo(Point::new(3, 3)));
        e.execute(Primitive::Clear);
        assert_eq!(e.position(), Point::default());
    }

    #[test]
    fn line_to_moves_even_when_clipped() {
        let mut e = engine(false);
        run(
            &mut e,
            &[
                Primitive::SetClippingRect(Rect::new(0, 0, 3, 3)),
                Primitive::MoveTo(Point::new(0, 0)),
                Primitive::LineTo(Point::new(20, 0)),
            ],
        );
        assert_eq!(e.position(), Point::new(20, 0));
        assert_eq!(pixel(&e, 3, 0), Rgb::WHITE);
        assert_eq!(pixel(&e, 4, 0), Rgb::BLACK);
    }

    #[test]
    fn far_away_coordinates_are_harmless() {
        let mut e = engine(false);
        let green = Rgb::new(0, 3, 0);
        run(
            &mut e,
            &[
                Primitive::SetOrigin(Point::new(5, 5)),
                Primitive::MoveTo(Point::new(i32::MAX, i32::MAX)),
                Primitive::FillEllipse(Size::new(200_000, 200_000)),
                Primitive::DrawEllipse(Size::new(i32::MAX, i32::MAX)),
                Primitive::InvertRect(Rect::new(i32::MAX - 1, 0, i32::MAX, 1)),
                Primitive::CopyRect(Rect::new(i32::MIN, i32::MIN, 0, 0)),
                Primitive::MoveTo(Point::new(-5, -5)),
                Primitive::LineTo(Point::new(300_000_000, -4)),
            ],
        );
        assert_eq!(e.position(), Point::new(300_000_000, -4));
        // only the start of the line is on screen
        assert_eq!(pixel(&e, 0, 0), Rgb::WHITE);
        assert_eq!(pixel(&e, 31, 0), Rgb::WHITE);
        assert_eq!(pixel(&e, 0, 1), Rgb::BLACK);
        assert_eq!(pixel(&e, 16, 8), Rgb::BLACK);

        run(
            &mut e,
            &[
                Primitive::SetBrushColor(green),
                Primitive::MoveTo(Point::new(0, 0)),
                Primitive::FillEllipse(Size::new(200_000, 200_000)),
            ],
        );
        assert_eq!(pixel(&e, 0, 0), green);
        assert_eq!(pixel(&e, 31, 15), green);
    }

    #[test]
    fn origin_moves_everything() {
        let mut e = engine(false);
        let red = Rgb::new(3, 0, 0);
        run(
            &mut e,
            &[
                Primitive::SetOrigin(Point::new(5, 5)),
                Primitive::SetPenColor(red),
                Primitive::SetPixel(Point::new(0, 0)),
                Primitive::SetBrushColor(red),
                Primitive::FillRect(Rect::new(2, 2, 3, 3)),
            ],
        );
        assert_eq!(pixel(&e, 5, 5), red);
        assert_eq!(pixel(&e, 0, 0), Rgb::BLACK);
        assert_eq!(pixel(&e, 7, 8), red);
        assert_eq!(pixel(&e, 9, 9), Rgb::BLACK);
    }

    #[test]
    fn clear_uses_the_brush_inside_the_clip() {
        let mut e = engine(false);
        let blue = Rgb::new(0, 0, 2);
        run(
            &mut e,
            &[
                Primitive::SetBrushColor(blue),
                Primitive::SetClippingRect(Rect::new(4, 4, 7, 7)),
                Primitive::Clear,
            ],
        );
        assert_eq!(pixel(&e, 4, 4), blue);
        assert_eq!(pixel(&e, 7, 7), blue);
        assert_eq!(pixel(&e, 3, 4), Rgb::BLACK);
        assert_eq!(pixel(&e, 8, 8), Rgb::BLACK);
    }

    #[test]
    fn swapped_colours_paint_with_the_brush() {
        let mut e = engine(false);
        let green = Rgb::new(0, 3, 0);
        run(
            &mut e,
            &[
                Primitive::SetBrushColor(green),
                Primitive::SetPaintOptions(PaintOptions::SWAP_FG_BG),
                Primitive::SetPixel(Point::new(1, 1)),
            ],
        );
        assert_eq!(pixel(&e, 1, 1), green);
    }

    #[test]
    fn vscroll_keeps_the_chain_in_step() {
        let mut e = engine(false);
        run(
            &mut e,
            &[
                Primitive::SetPixel(Point::new(0, 0)),
                Primitive::VScroll(3),
            ],
        );
        assert_eq!(pixel(&e, 0, 3), Rgb::WHITE);
        let display = e.display().unwrap();
        let rows = display.frame.drawing().row_ptrs();
        let first_row = display
            .chain
            .walk()
            .find(|d| d.len() == 32)
            .unwrap()
            .buffer();
        assert_eq!(first_row, rows[0].as_ptr() as *const u8);
    }

    #[test]
    fn swap_buffers_flips_the_chain() {
        let mut e = engine(true);
        let shown = e.display().unwrap().chain.shown_segment();
        run(&mut e, &[Primitive::SetPixel(Point::new(2, 2)), Primitive::SwapBuffers]);
        let display = e.display().unwrap();
        assert_ne!(display.chain.shown_segment(), shown);
        let enc = e.encoder();
        assert_eq!(enc.decode(display.frame.visible().row(2)[2]), Rgb::WHITE);
        assert_eq!(pixel(&e, 2, 2), Rgb::BLACK);
    }

    #[test]
    fn swap_buffers_is_a_no_op_when_single_buffered() {
        let mut e = engine(false);
        let shown = e.display().unwrap().chain.shown_segment();
        run(&mut e, &[Primitive::SetPixel(Point::new(2, 2)), Primitive::SwapBuffers]);
        assert_eq!(e.display().unwrap().chain.shown_segment(), shown);
        assert_eq!(pixel(&e, 2, 2), Rgb::WHITE);
    }

    #[test]
    fn drawing_goes_under_sprites() {
        let pixels = [pack(Rgb::new(3, 0, 0), 3); 4];
        let bmp = Bitmap::new(2, 2, &pixels);
        let mut e = engine(false);
        e.with_sprites(|layer| {
            let mut s = Sprite::new();
            s.add_bitmap(&bmp).move_to(4, 4);
            layer.replace(vec![s]);
        });
        e.show_sprites();
        assert_eq!(pixel(&e, 4, 4), Rgb::new(3, 0, 0));

        run(
            &mut e,
            &[
                Primitive::SetBrushColor(Rgb::new(0, 0, 3)),
                Primitive::FillRect(Rect::new(0, 0, 8, 8)),
            ],
        );
        // the sprite came off before the fill
        assert_eq!(pixel(&e, 4, 4), Rgb::new(0, 0, 3));
        e.show_sprites();
        assert_eq!(pixel(&e, 4, 4), Rgb::new(3, 0, 0));
        e.hide_sprites();
        assert_eq!(pixel(&e, 4, 4), Rgb::new(0, 0, 3));
    }

    #[test]
    fn raw_data_round_trip() {
        let mut e = engine(false);
        let buffer = RawBuffer::new();
        let region = RawRegion {
            rect: Rect::new(0, 0, 3, 1),
            buffer: &buffer,
        };
        run(
            &mut e,
            &[
                Primitive::SetPixel(Point::new(1, 1)),
                Primitive::ReadRawData(region),
                Primitive::Clear,
                Primitive::SetClippingRect(Rect::new(10, 10, 11, 11)),
                Primitive::WriteRawData(region),
            ],
        );
        assert_eq!(buffer.to_vec().len(), 8);
        // outside the clip, so nothing written
        assert_eq!(pixel(&e, 1, 1), Rgb::BLACK);

        run(
            &mut e,
            &[
                Primitive::SetClippingRect(Rect::new(1, 0, 1, 1)),
                Primitive::WriteRawData(region),
            ],
        );
        assert_eq!(pixel(&e, 1, 1), Rgb::WHITE);
        assert_eq!(pixel(&e, 0, 0), Rgb::BLACK);
        assert_eq!(pixel(&e, 2, 1), Rgb::BLACK);
    }
}

// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
