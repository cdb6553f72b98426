//! Sprites and the mouse cursor.
//!
//! Sprites are drawn straight into the viewport, on top of whatever the
//! primitives drew. Before a sprite is drawn we save the pixels under it, so
//! we can put them back before the next primitive touches the screen.
//!
//! The layer is either *shown* (sprites on screen, backgrounds saved) or
//! *hidden* (the viewport holds only what primitives drew). Hiding walks the
//! list backwards, so overlapping sprites unpick cleanly. Showing walks it
//! forwards. The mouse cursor is always last to be drawn and first to be
//! removed.

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

use crate::{
    bitmap::{Bitmap, Cursor},
    colour::PixelEncoder,
    geometry::{Point, Rect, Size},
    raster::Canvas,
    viewport::Viewport,
};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// A movable bitmap, with one or more animation frames.
#[derive(Debug, Clone, Default)]
pub struct Sprite<'a> {
    pub x: i32,
    pub y: i32,
    frames: Vec<&'a Bitmap<'a>>,
    current_frame: usize,
    pub visible: bool,
    /// Static sprites are drawn once and then become part of the picture.
    pub is_static: bool,
    allow_draw: bool,
    /// Opaque link to an application collision detector
    pub collision_detector: Option<usize>,
    saved: Vec<u8>,
    saved_rect: Option<Rect>,
}

impl<'a> Sprite<'a> {
    /// A visible sprite with no frames, at (0, 0).
    pub fn new() -> Sprite<'a> {
        Sprite {
            visible: true,
            allow_draw: true,
            ..Default::default()
        }
    }

    /// Append an animation frame.
    pub fn add_bitmap(&mut self, bitmap: &'a Bitmap<'a>) -> &mut Self {
        let bytes = usize::from(bitmap.width) * usize::from(bitmap.height);
        if bytes > self.saved.capacity() {
            self.saved.reserve(bytes - self.saved.len());
        }
        self.frames.push(bitmap);
        self
    }

    pub fn clear_bitmaps(&mut self) {
        self.frames.clear();
        self.current_frame = 0;
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// The bitmap that will be drawn.
    pub fn frame(&self) -> Option<&'a Bitmap<'a>> {
        self.frames.get(self.current_frame).copied()
    }

    /// Move to the next frame, wrapping at the end.
    pub fn next_frame(&mut self) -> &mut Self {
        if !self.frames.is_empty() {
            self.current_frame = (self.current_frame + 1) % self.frames.len();
        }
        self
    }

    /// Select a frame. Out of range indices are ignored.
    pub fn set_frame(&mut self, index: usize) -> &mut Self {
        if index < self.frames.len() {
            self.current_frame = index;
        }
        self
    }

    pub fn width(&self) -> i32 {
        self.frame().map_or(0, |b| i32::from(b.width))
    }

    pub fn height(&self) -> i32 {
        self.frame().map_or(0, |b| i32::from(b.height))
    }

    pub fn move_to(&mut self, x: i32, y: i32) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Move by an offset.
    ///
    /// With `wrap_around` set, a sprite that leaves the given area entirely
    /// comes back in on the opposite edge.
    pub fn move_by(&mut self, dx: i32, dy: i32, wrap_around: Option<Size>) -> &mut Self {
        self.x = self.x.saturating_add(dx);
        self.y = self.y.saturating_add(dy);
        if let Some(area) = wrap_around {
            let (w, h) = (self.width(), self.height());
            if self.x > area.width {
                self.x = -(w - 1);
            } else if self.x < -(w - 1) {
                self.x = area.width;
            }
            if self.y > area.height {
                self.y = -(h - 1);
            } else if self.y < -(h - 1) {
                self.y = area.height;
            }
        }
        self
    }

    /// Draw a static sprite again at the next refresh.
    pub fn force_redraw(&mut self) {
        self.allow_draw = true;
    }

    /// Where the sprite is on screen (or would be), if it has a frame.
    pub fn bounds(&self) -> Option<Rect> {
        let frame = self.frame()?;
        Some(Rect::with_size(
            Point::new(self.x, self.y),
            Size::new(i32::from(frame.width), i32::from(frame.height)),
        ))
    }

    fn wants_drawing(&self) -> bool {
        self.visible && self.frame().is_some() && (!self.is_static || self.allow_draw)
    }

    fn show(&mut self, canvas: &mut Canvas) {
        let (Some(frame), Some(rect)) = (self.frame(), self.bounds()) else {
            return;
        };
        if self.is_static {
            self.allow_draw = false;
        } else {
            canvas.read_rect(rect, &mut self.saved);
            self.saved_rect = Some(rect);
        }
        canvas.draw_bitmap(rect.top_left(), frame);
    }

    fn hide(&mut self, canvas: &mut Canvas, restore: bool) {
        if let Some(rect) = self.saved_rect.take() {
            if restore {
                canvas.write_rect(rect, &self.saved);
            }
        }
    }
}

/// The sprites on one screen, plus the mouse cursor.
#[derive(Debug, Default)]
pub struct SpriteLayer<'a> {
    sprites: Vec<Sprite<'a>>,
    cursor: Option<Sprite<'a>>,
    cursor_hotspot: Point,
    cursor_pos: Point,
    shown: bool,
}

impl<'a> SpriteLayer<'a> {
    pub fn new() -> SpriteLayer<'a> {
        SpriteLayer::default()
    }

    pub fn sprites(&self) -> &[Sprite<'a>] {
        &self.sprites
    }

    /// Change the sprites. The next show picks up the changes.
    pub fn sprites_mut(&mut self) -> &mut [Sprite<'a>] {
        &mut self.sprites
    }

    /// Swap in a new sprite list, handing back the old one.
    ///
    /// Hide the layer first, or the old sprites stay on screen.
    pub fn replace(&mut self, sprites: Vec<Sprite<'a>>) -> Vec<Sprite<'a>> {
        core::mem::replace(&mut self.sprites, sprites)
    }

    /// Are there any sprites, or a cursor?
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty() && self.cursor.is_none()
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Use a mouse pointer (or none). Hide the layer first.
    pub fn set_cursor(&mut self, cursor: Option<&'a Cursor<'a>>) {
        self.cursor = cursor.map(|c| {
            let mut sprite = Sprite::new();
            sprite.add_bitmap(&c.bitmap);
            sprite
        });
        self.cursor_hotspot = cursor.map_or(Point::default(), |c| c.hotspot);
        self.place_cursor();
    }

    pub fn has_cursor(&self) -> bool {
        self.cursor.is_some()
    }

    /// Put the cursor's hotspot at `pos`. Hide the layer first.
    pub fn set_cursor_pos(&mut self, pos: Point) {
        self.cursor_pos = pos;
        self.place_cursor();
    }

    pub fn cursor_pos(&self) -> Point {
        self.cursor_pos
    }

    fn place_cursor(&mut self) {
        let (pos, hotspot) = (self.cursor_pos, self.cursor_hotspot);
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.move_to(
                pos.x.saturating_sub(hotspot.x),
                pos.y.saturating_sub(hotspot.y),
            );
        }
    }

    /// Take the sprites off the screen.
    ///
    /// With `restore` false the saved backgrounds are just dropped. That is
    /// what you want when the application redraws every frame anyway.
    pub fn hide(&mut self, viewport: &mut Viewport, encoder: PixelEncoder, restore: bool) {
        if !self.shown {
            return;
        }
        let mut canvas = Canvas::unclipped(viewport, encoder);
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.hide(&mut canvas, restore);
        }
        for sprite in self.sprites.iter_mut().rev() {
            sprite.hide(&mut canvas, restore);
        }
        self.shown = false;
    }

    /// Forget the saved backgrounds without touching the screen.
    ///
    /// For when the pixels under the sprites are gone anyway, such as after
    /// a buffer swap or a mode change.
    pub fn discard(&mut self) {
        for sprite in self.sprites.iter_mut().chain(self.cursor.as_mut()) {
            sprite.saved_rect = None;
        }
        self.shown = false;
    }

    /// Draw the sprites, saving what is under them first.
    pub fn show(&mut self, viewport: &mut Viewport, encoder: PixelEncoder) {
        if self.shown {
            return;
        }
        let mut canvas = Canvas::unclipped(viewport, encoder);
        let mut drawn = 0;
        for sprite in self.sprites.iter_mut().chain(self.cursor.as_mut()) {
            if sprite.wants_drawing() {
                sprite.show(&mut canvas);
                drawn += 1;
            }
        }
        trace!("{} sprites drawn", drawn);
        self.shown = true;
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------


// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
