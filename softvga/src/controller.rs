//! The VGA controller: the public face of the crate.
//!
//! A [`VgaController`] owns the frame buffer, the DMA chain, the primitive
//! queue and the sprites. The peripheral that actually clocks bytes out to
//! the pins is supplied by the platform, through [`VideoOutput`].
//!
//! Every method takes `&self`, so one controller can be shared between the
//! application and the vertical sync interrupt handler. The interrupt handler
//! should call [`VgaController::on_vsync`] once per frame.

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

use alloc::{boxed::Box, vec::Vec};
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use fugit::{HertzU32, MicrosDurationU32};
use spin::Mutex;

use crate::{
    bitmap::{Cursor, CursorName},
    colour::{BitsPerChannel, PixelEncoder, Rgb},
    dma::DmaChain,
    engine::{Display, Engine},
    error::Error,
    geometry::{Point, Size},
    paint::PaintState,
    primitive::Primitive,
    queue::PrimitiveQueue,
    sprite::Sprite,
    timings::Timings,
    viewport::{FrameAllocator, FrameBuffer, HeapAllocator, Layout, Viewport},
};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// The platform's parallel-output peripheral.
pub trait VideoOutput {
    /// Route the colour and sync signals to these pins.
    fn configure_pins(&mut self, pins: &OutputPins);

    /// Start streaming `chain` from its head, at `pixel_clock`.
    ///
    /// The chain stays alive, at the same address, until [`stop`] is
    /// called.
    ///
    /// [`stop`]: VideoOutput::stop
    fn install_chain(&mut self, chain: &DmaChain, pixel_clock: HertzU32);

    /// Stop streaming. No descriptor may be read after this returns.
    fn stop(&mut self);
}

/// Which pins carry which signal. The numbers mean whatever the
/// [`VideoOutput`] wants them to mean.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputPins {
    /// R0, R1, G0, G1, B0, B1. Eight colour wiring leaves the high pins off.
    pub colour: [Option<u8>; 6],
    pub hsync: u8,
    pub vsync: u8,
}

impl OutputPins {
    /// One pin each for red, green and blue.
    pub const fn eight_colours(rgb: [u8; 3], hsync: u8, vsync: u8) -> OutputPins {
        OutputPins {
            colour: [Some(rgb[0]), None, Some(rgb[1]), None, Some(rgb[2]), None],
            hsync,
            vsync,
        }
    }

    /// Two pins each for red, green and blue, low bit first.
    pub const fn sixty_four_colours(rgb: [u8; 6], hsync: u8, vsync: u8) -> OutputPins {
        OutputPins {
            colour: [
                Some(rgb[0]),
                Some(rgb[1]),
                Some(rgb[2]),
                Some(rgb[3]),
                Some(rgb[4]),
                Some(rgb[5]),
            ],
            hsync,
            vsync,
        }
    }

    pub fn bits_per_channel(&self) -> BitsPerChannel {
        if self.colour.iter().all(Option::is_some) {
            BitsPerChannel::Two
        } else {
            BitsPerChannel::One
        }
    }
}

/// Runtime settings.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// How many primitives can wait for execution
    pub queue_capacity: usize,
    /// The most separate memory blocks a frame buffer may be split over
    pub max_pools: usize,
    /// The biggest block the default allocator will ask the heap for
    pub pool_block_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            queue_capacity: 1024,
            max_pools: 6,
            pool_block_limit: 64 * 1024,
        }
    }
}

/// What was asked for in the last successful mode change.
#[derive(Debug, Clone)]
struct Setup {
    timings: Timings,
    width: Option<u16>,
    height: Option<u16>,
    double_buffered: bool,
}

/// A VGA controller.
///
/// `'a` is how long borrowed drawing data (glyphs, bitmaps, paths, sprite
/// frames) must stay alive.
pub struct VgaController<'a, O>
where
    O: VideoOutput,
{
    output: Mutex<O>,
    pins: OutputPins,
    config: Config,
    allocator: Mutex<Box<dyn FrameAllocator + Send + 'a>>,
    engine: Mutex<Engine<'a>>,
    queue: PrimitiveQueue<'a>,
    /// Nesting depth of suspend calls
    suspended: AtomicU32,
    background: AtomicBool,
    double_buffered: AtomicBool,
    setup: Mutex<Option<Setup>>,
}

impl<'a, O> VgaController<'a, O>
where
    O: VideoOutput,
{
    /// Make a controller which takes frame buffer memory from the heap.
    pub fn new(output: O, pins: OutputPins, config: Config) -> VgaController<'a, O> {
        let allocator = Box::new(HeapAllocator::new(config.pool_block_limit));
        Self::with_allocator(output, pins, config, allocator)
    }

    /// Make a controller with its own source of frame buffer memory.
    pub fn with_allocator(
        mut output: O,
        pins: OutputPins,
        config: Config,
        allocator: Box<dyn FrameAllocator + Send + 'a>,
    ) -> VgaController<'a, O> {
        output.configure_pins(&pins);
        let encoder = PixelEncoder::new(
            pins.bits_per_channel(),
            crate::SyncPolarity::Negative,
            crate::SyncPolarity::Negative,
        );
        VgaController {
            output: Mutex::new(output),
            pins,
            config,
            allocator: Mutex::new(allocator),
            engine: Mutex::new(Engine::new(encoder)),
            queue: PrimitiveQueue::new(config.queue_capacity),
            suspended: AtomicU32::new(0),
            background: AtomicBool::new(true),
            double_buffered: AtomicBool::new(false),
            setup: Mutex::new(None),
        }
    }

    // -------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------

    /// Change video mode, using a modeline.
    ///
    /// See [`VgaController::set_resolution`].
    pub fn set_modeline(
        &self,
        modeline: &str,
        width: Option<u16>,
        height: Option<u16>,
        double_buffered: bool,
    ) -> Result<(), Error> {
        let timings: Timings = modeline.parse().inspect_err(|e| {
            warn!("rejected modeline: {}", e);
        })?;
        self.set_resolution(&timings, width, height, double_buffered)
    }

    /// Change video mode.
    ///
    /// The viewport is `width` by `height` pixels (the whole visible area
    /// by default), centred on screen. With `height` of `None` you get as
    /// many rows as memory allows.
    ///
    /// If the timings are no good, nothing changes. If we run out of memory
    /// the screen is left off, and
    /// [`VgaController::restore_previous_resolution`] can bring back the
    /// last mode that worked.
    pub fn set_resolution(
        &self,
        timings: &Timings,
        width: Option<u16>,
        height: Option<u16>,
        double_buffered: bool,
    ) -> Result<(), Error> {
        if let Err(e) = timings.validate() {
            warn!("rejected timings {}: {}", timings.label.as_str(), e);
            return Err(e);
        }
        if width == Some(0) || height == Some(0) {
            warn!("rejected empty viewport");
            return Err(Error::DegenerateTimings);
        }
        let encoder = PixelEncoder::new(
            self.pins.bits_per_channel(),
            timings.h_sync_polarity,
            timings.v_sync_polarity,
        );
        let wanted = Layout::centred(
            timings,
            width.unwrap_or(timings.h_visible_area),
            height.unwrap_or(timings.v_visible_area),
        );

        let mut engine = self.engine.lock();
        self.output.lock().stop();
        self.double_buffered.store(false, Ordering::Release);
        // the old buffers go first, as we may need their memory
        drop(engine.set_display(encoder, None));

        let frame = FrameBuffer::allocate(
            &mut **self.allocator.lock(),
            usize::from(wanted.width),
            height.map(|_| usize::from(wanted.height)),
            usize::from(wanted.height),
            double_buffered,
            self.config.max_pools,
            encoder.encode(Rgb::BLACK),
        )
        .inspect_err(|e| warn!("frame buffer allocation failed: {}", e))?;

        let layout = Layout::centred(timings, wanted.width, frame.height() as u16);
        let chain = DmaChain::build(timings, &layout, &encoder, &frame)
            .inspect_err(|e| warn!("descriptor chain failed: {}", e))?;

        self.output.lock().install_chain(&chain, timings.frequency);
        info!(
            "mode {}: {}x{} viewport at {},{}, {} descriptors",
            timings.label.as_str(),
            layout.width,
            layout.height,
            layout.col,
            layout.row,
            chain.len()
        );
        engine.set_display(
            encoder,
            Some(Display {
                timings: timings.clone(),
                layout,
                frame,
                chain,
            }),
        );
        self.double_buffered
            .store(double_buffered, Ordering::Release);
        *self.setup.lock() = Some(Setup {
            timings: timings.clone(),
            width,
            height,
            double_buffered,
        });
        Ok(())
    }

    /// Go back to the last mode that was set successfully.
    pub fn restore_previous_resolution(&self) -> Result<(), Error> {
        let setup = self.setup.lock().clone().ok_or(Error::NotConfigured)?;
        info!("restoring mode {}", setup.timings.label.as_str());
        self.set_resolution(
            &setup.timings,
            setup.width,
            setup.height,
            setup.double_buffered,
        )
    }

    /// Pan the picture. Positive `dx` moves it right, positive `dy` down.
    ///
    /// Only the porches change; the frame buffer is kept.
    pub fn move_screen(&self, dx: i32, dy: i32) -> Result<(), Error> {
        self.adjust_timings(|t| t.moved(dx, dy))
    }

    /// Shrink the porches on both sides, which stretches the picture.
    /// Negative values grow them.
    pub fn shrink_screen(&self, dx: i32, dy: i32) -> Result<(), Error> {
        self.adjust_timings(|t| t.shrunk(dx, dy))
    }

    fn adjust_timings(
        &self,
        adjust: impl FnOnce(&Timings) -> Result<Timings, Error>,
    ) -> Result<(), Error> {
        let mut engine = self.engine.lock();
        let display = engine.display().ok_or(Error::NotConfigured)?;
        let timings = adjust(&display.timings)?;
        let chain = DmaChain::build(&timings, &display.layout, &engine.encoder(), &display.frame)?;
        debug!(
            "porches now h {}/{} v {}/{}",
            timings.h_front_porch,
            timings.h_back_porch,
            timings.v_front_porch,
            timings.v_back_porch
        );

        let mut output = self.output.lock();
        output.stop();
        output.install_chain(&chain, timings.frequency);
        drop(output);
        drop(engine.replace_chain(timings.clone(), chain));
        if let Some(setup) = self.setup.lock().as_mut() {
            setup.timings = timings;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Drawing
    // -------------------------------------------------------------------------

    /// Queue a primitive for execution.
    ///
    /// With background execution off, the whole queue runs here and now,
    /// this primitive included.
    ///
    /// With double buffering the drawing buffer is off screen, so
    /// primitives run straight away. Only [`Primitive::SwapBuffers`] waits
    /// for the vertical blank.
    ///
    /// If the queue is full this waits for room. Beware calling this from
    /// inside a suspend/resume pair with a full queue: nothing will make
    /// room.
    pub fn add_primitive(&self, primitive: Primitive<'a>) {
        if self.double_buffered.load(Ordering::Acquire) {
            if let Primitive::SwapBuffers = primitive {
                self.push(primitive);
                self.primitives_execution_wait();
            } else {
                self.engine.lock().execute(primitive);
            }
            return;
        }
        self.push(primitive);
        if !self.background.load(Ordering::Acquire) {
            self.process_primitives();
        }
    }

    fn push(&self, mut primitive: Primitive<'a>) {
        loop {
            match self.queue.try_push(primitive) {
                Ok(()) => return,
                Err(p) => primitive = p,
            }
            if self.background.load(Ordering::Acquire) {
                core::hint::spin_loop();
            } else {
                self.process_primitives();
            }
        }
    }

    /// Run every queued primitive now, in this context.
    pub fn process_primitives(&self) {
        let mut engine = self.engine.lock();
        self.drain(&mut engine, || true);
    }

    /// Wait until the queue is empty.
    ///
    /// If the interrupt isn't going to empty it, we empty it ourselves.
    pub fn primitives_execution_wait(&self) {
        if self.background_active() {
            while !self.queue.is_empty() {
                core::hint::spin_loop();
            }
            // and let any drain in progress finish
            drop(self.engine.lock());
        } else {
            self.process_primitives();
        }
    }

    /// Stop the interrupt handler from executing primitives. Calls nest.
    pub fn suspend_background_primitive_execution(&self) {
        self.suspended.fetch_add(1, Ordering::AcqRel);
    }

    /// Undo one suspend. The last one runs anything that queued up
    /// meanwhile.
    pub fn resume_background_primitive_execution(&self) {
        let previous = self
            .suspended
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        if previous == Ok(1) && !self.queue.is_empty() {
            self.process_primitives();
        }
    }

    /// Allow (or stop) the interrupt handler executing primitives.
    pub fn enable_background_primitive_execution(&self, enabled: bool) {
        self.background.store(enabled, Ordering::Release);
    }

    fn background_active(&self) -> bool {
        self.background.load(Ordering::Acquire) && self.suspended.load(Ordering::Acquire) == 0
    }

    /// Call at the start of every vertical blank.
    ///
    /// Runs the queue, unless background execution is off or suspended, or
    /// the application is using the engine right now.
    pub fn on_vsync(&self) {
        if !self.background_active() {
            return;
        }
        let Some(mut engine) = self.engine.try_lock() else {
            trace!("vsync: engine busy");
            return;
        };
        self.drain(&mut engine, || true);
    }

    /// As [`VgaController::on_vsync`], but stop once the vertical blank is
    /// over. `elapsed` reports the time since the blank started; whatever
    /// is left runs next time.
    pub fn on_vsync_budgeted(&self, mut elapsed: impl FnMut() -> MicrosDurationU32) {
        if !self.background_active() {
            return;
        }
        let Some(mut engine) = self.engine.try_lock() else {
            trace!("vsync: engine busy");
            return;
        };
        let Some(budget) = engine.display().map(|d| d.timings.vblank_duration()) else {
            return;
        };
        self.drain(&mut engine, || elapsed().ticks() < budget.ticks());
    }

    fn drain(&self, engine: &mut Engine<'a>, mut keep_going: impl FnMut() -> bool) {
        while keep_going() {
            let Some(primitive) = self.queue.try_pop() else {
                break;
            };
            engine.execute(primitive);
        }
        // With double buffering the sprites go on at the swap instead
        if !self.double_buffered.load(Ordering::Acquire) {
            engine.show_sprites();
        }
    }

    /// How many primitives are waiting.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    // -------------------------------------------------------------------------
    // Sprites and mouse
    // -------------------------------------------------------------------------

    /// Replace the sprite list, handing back the old one.
    ///
    /// Sprites are drawn in list order, so later sprites cover earlier
    /// ones.
    pub fn set_sprites(&self, sprites: Vec<Sprite<'a>>) -> Vec<Sprite<'a>> {
        let old = self
            .engine
            .lock()
            .with_sprites(|layer| layer.replace(sprites));
        self.refresh_sprites();
        old
    }

    /// Take all the sprites off the screen.
    pub fn remove_sprites(&self) -> Vec<Sprite<'a>> {
        self.set_sprites(Vec::new())
    }

    /// Change the sprites. They are off screen while `f` runs; call
    /// [`VgaController::refresh_sprites`] afterwards to put them back.
    ///
    /// The engine is locked while `f` runs. Calling back into the
    /// controller from `f` spins forever.
    pub fn with_sprites<R>(&self, f: impl FnOnce(&mut [Sprite<'a>]) -> R) -> R {
        self.engine
            .lock()
            .with_sprites(|layer| f(layer.sprites_mut()))
    }

    /// Redraw the sprites where they now are.
    pub fn refresh_sprites(&self) {
        self.add_primitive(Primitive::RefreshSprites);
    }

    /// Show a mouse pointer, or with `None`, hide it.
    pub fn set_mouse_cursor(&self, cursor: Option<&'a Cursor<'a>>) {
        self.engine
            .lock()
            .with_sprites(|layer| layer.set_cursor(cursor));
        self.refresh_sprites();
    }

    /// Show one of the built in mouse pointers.
    pub fn set_mouse_cursor_named(&self, name: Option<CursorName>) {
        self.set_mouse_cursor(name.map(CursorName::cursor));
    }

    /// Move the mouse pointer's hotspot to `pos`.
    pub fn set_mouse_cursor_pos(&self, pos: Point) {
        self.engine
            .lock()
            .with_sprites(|layer| layer.set_cursor_pos(pos));
        self.refresh_sprites();
    }

    pub fn mouse_cursor_pos(&self) -> Point {
        self.engine.lock().sprites().cursor_pos()
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn bits_per_channel(&self) -> BitsPerChannel {
        self.pins.bits_per_channel()
    }

    pub fn is_double_buffered(&self) -> bool {
        self.double_buffered.load(Ordering::Acquire)
    }

    /// The current timings, if a mode is set.
    pub fn timings(&self) -> Option<Timings> {
        self.engine.lock().display().map(|d| d.timings.clone())
    }

    /// The visible area, in pixels.
    pub fn screen_size(&self) -> Option<Size> {
        self.engine.lock().display().map(|d| {
            Size::new(
                i32::from(d.timings.h_visible_area),
                i32::from(d.timings.v_visible_area),
            )
        })
    }

    /// Where the viewport sits on screen, and how big it is.
    pub fn viewport_layout(&self) -> Option<Layout> {
        self.engine.lock().display().map(|d| d.layout)
    }

    pub fn viewport_size(&self) -> Option<Size> {
        self.engine.lock().display().map(Display::size)
    }

    /// Which viewport row is on this physical scanline of the visible area?
    pub fn row_for_scanline(&self, scanline: u32) -> Option<usize> {
        let engine = self.engine.lock();
        let display = engine.display()?;
        display.layout.row_for_scanline(&display.timings, scanline)
    }

    /// The current position, relative to the origin.
    pub fn position(&self) -> Point {
        self.engine.lock().position()
    }

    /// A copy of the paint state.
    pub fn paint_state(&self) -> PaintState {
        self.engine.lock().paint().clone()
    }

    /// Look at the viewport being streamed.
    ///
    /// The engine is locked while `f` runs, so `f` must not call back into
    /// the controller.
    pub fn with_viewport<R>(&self, f: impl FnOnce(&Viewport, &PixelEncoder) -> R) -> Option<R> {
        let engine = self.engine.lock();
        let encoder = engine.encoder();
        engine.display().map(|d| f(d.frame.visible(), &encoder))
    }

    /// Look at the descriptor chain being streamed.
    ///
    /// As with [`VgaController::with_viewport`], `f` must not call back
    /// into the controller.
    pub fn with_chain<R>(&self, f: impl FnOnce(&DmaChain) -> R) -> Option<R> {
        self.engine.lock().display().map(|d| f(&d.chain))
    }

    /// Get at the output peripheral.
    ///
    /// The output is locked while `f` runs.
    pub fn with_output<R>(&self, f: impl FnOnce(&mut O) -> R) -> R {
        f(&mut self.output.lock())
    }
}

impl<O> Drop for VgaController<'_, O>
where
    O: VideoOutput,
{
    fn drop(&mut self) {
        // nothing may read the chain once we free it
        self.output.get_mut().stop();
    }
}

impl<O> core::fmt::Debug for VgaController<'_, O>
where
    O: VideoOutput,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VgaController")
            .field("pins", &self.pins)
            .field("config", &self.config)
            .field("queue", &self.queue)
            .field("suspended", &self.suspended)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------


// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
