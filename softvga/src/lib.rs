//! # softvga
//!
//! A VGA controller implemented in software.
//!
//! The video signal is produced by a DMA engine walking a circular chain of
//! line descriptors. Each descriptor points either at a shared blanking
//! buffer (porches and sync pulses, with the sync levels baked into every
//! byte) or at one row of the frame buffer. Nothing has to be computed per
//! pixel at scan-out time, so a generic parallel-output peripheral can drive
//! the DAC resistors directly.
//!
//! On top of that sit:
//!
//! * a queue of drawing [`Primitive`]s, executed either synchronously or
//!   from the vertical sync interrupt so that drawing never tears;
//! * a rasteriser working on the frame buffer under a [`PaintState`];
//! * a sprite compositor which saves and restores the background beneath
//!   moving bitmaps, including the mouse pointer.
//!
//! The peripheral driver itself lives outside this crate, behind the
//! [`VideoOutput`] trait.
//!
//! ```rust
//! # use softvga::{VgaController, VideoOutput, OutputPins, DmaChain, Config, Primitive, Colour, Point};
//! # struct Dummy;
//! # impl VideoOutput for Dummy {
//! #     fn configure_pins(&mut self, _pins: &OutputPins) {}
//! #     fn install_chain(&mut self, _chain: &DmaChain, _clock: fugit::HertzU32) {}
//! #     fn stop(&mut self) {}
//! # }
//! let vga = VgaController::new(Dummy, OutputPins::sixty_four_colours([0, 1, 2, 3, 4, 5], 6, 7), Config::default());
//! vga.enable_background_primitive_execution(false);
//! vga.set_modeline(softvga::modes::VGA_640X480_60HZ, None, Some(2), false).unwrap();
//! vga.add_primitive(Primitive::SetPenColor(Colour::Red.into()));
//! vga.add_primitive(Primitive::MoveTo(Point::new(0, 0)));
//! vga.add_primitive(Primitive::LineTo(Point::new(639, 0)));
//! vga.process_primitives();
//! ```

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

#![cfg_attr(not(test), no_std)]

extern crate alloc;

// -----------------------------------------------------------------------------
// Sub-modules
// -----------------------------------------------------------------------------

#[macro_use]
mod fmt;

pub mod bitmap;
pub mod colour;
pub mod controller;
pub mod dma;
mod engine;
pub mod error;
pub mod geometry;
pub mod paint;
pub mod primitive;
pub mod queue;
pub mod raster;
pub mod sprite;
pub mod timings;
pub mod viewport;

// -----------------------------------------------------------------------------
// Imports
// -----------------------------------------------------------------------------

pub use bitmap::{Bitmap, Cursor, CursorName};
pub use colour::{BitsPerChannel, Colour, PixelEncoder, Rgb};
pub use controller::{Config, OutputPins, VgaController, VideoOutput};
pub use dma::{DmaChain, DmaDescriptor};
pub use error::{Error, ModelineError};
pub use geometry::{Point, Rect, Size};
pub use paint::PaintState;
pub use primitive::{
    BitmapDrawingInfo, Glyph, GlyphOptions, GlyphsBuffer, GlyphsBufferRenderInfo, PaintOptions,
    Primitive, RawBuffer, RawRegion,
};
pub use sprite::Sprite;
pub use timings::{modes, ScreenBlock, SyncPolarity, Timings};
pub use viewport::{FrameAllocator, HeapAllocator};

// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
