//! Drives a whole controller through its public API, with a fake output
//! peripheral that records what it was asked to do.

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

use std::sync::atomic::{AtomicBool, Ordering};

use fugit::{HertzU32, MicrosDurationU32};
use softvga::{
    bitmap, modes, Bitmap, Colour, Config, DmaChain, Error, OutputPins, Point, Primitive,
    RawBuffer, RawRegion, Rect, Rgb, Size, Sprite, VgaController, VideoOutput,
};

#[derive(Debug, Default)]
struct Recorder {
    clocks: Vec<HertzU32>,
    heads: Vec<usize>,
    stops: usize,
    streaming: bool,
}

impl VideoOutput for Recorder {
    fn configure_pins(&mut self, _pins: &OutputPins) {}

    fn install_chain(&mut self, chain: &DmaChain, pixel_clock: HertzU32) {
        assert!(!self.streaming, "installed a chain without stopping first");
        self.clocks.push(pixel_clock);
        self.heads.push(chain.head() as usize);
        self.streaming = true;
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.streaming = false;
    }
}

const PINS: OutputPins = OutputPins::sixty_four_colours([0, 1, 2, 3, 4, 5], 6, 7);

/// 32x16 visible, tiny blanking, 1 MHz.
const TINY: &str = "\"tiny\" 1 32 34 36 40 16 17 18 20 -HSync -VSync";

fn foreground<'a>(config: Config) -> VgaController<'a, Recorder> {
    let vga = VgaController::new(Recorder::default(), PINS, config);
    vga.enable_background_primitive_execution(false);
    vga
}

fn pixel(vga: &VgaController<'_, Recorder>, x: usize, y: usize) -> Rgb {
    vga.with_viewport(|vp, enc| enc.decode(vp.row(y)[x]))
        .expect("no display")
}

fn screen(vga: &VgaController<'_, Recorder>) -> Vec<u8> {
    vga.with_viewport(|vp, _| (0..vp.height()).flat_map(|y| vp.row(y).to_vec()).collect())
        .expect("no display")
}

#[test_log::test]
fn red_line_across_vga() {
    let vga = foreground(Config::default());
    vga.set_modeline(modes::VGA_640X480_60HZ, None, None, false)
        .unwrap();
    assert_eq!(vga.screen_size(), Some(Size::new(640, 480)));
    assert_eq!(vga.viewport_size(), Some(Size::new(640, 480)));
    assert_eq!(
        vga.with_output(|o| o.clocks.clone()),
        vec![HertzU32::Hz(25_175_000)]
    );

    vga.add_primitive(Primitive::SetPenColor(Colour::BrightRed.into()));
    vga.add_primitive(Primitive::MoveTo(Point::new(0, 0)));
    vga.add_primitive(Primitive::LineTo(Point::new(639, 0)));
    assert_eq!(vga.queued(), 0);

    for x in [0, 1, 320, 638, 639] {
        assert_eq!(pixel(&vga, x, 0), Rgb::new(3, 0, 0));
        assert_eq!(pixel(&vga, x, 1), Rgb::BLACK);
    }
    assert_eq!(vga.position(), Point::new(639, 0));

    // row 0 really is on the wire
    let row0 = vga
        .with_viewport(|vp, _| vp.row_ptrs()[0].as_ptr() as *const u8)
        .unwrap();
    assert!(vga
        .with_chain(|chain| chain.walk().any(|d| d.buffer() == row0))
        .unwrap());
}

#[test_log::test]
fn swapping_buffers() {
    let vga = foreground(Config::default());
    vga.set_modeline(TINY, None, None, true).unwrap();
    assert!(vga.is_double_buffered());
    let shown_before = vga.with_chain(DmaChain::shown_segment).unwrap();

    vga.add_primitive(Primitive::SetBrushColor(Colour::Blue.into()));
    vga.add_primitive(Primitive::Clear);
    // drawing is off screen, and not queued
    assert_eq!(vga.queued(), 0);
    assert_eq!(pixel(&vga, 5, 5), Rgb::BLACK);

    vga.add_primitive(Primitive::SwapBuffers);
    assert_eq!(vga.queued(), 0);
    assert_eq!(pixel(&vga, 5, 5), Rgb::new(0, 0, 2));
    let shown_after = vga.with_chain(DmaChain::shown_segment).unwrap();
    assert_ne!(shown_before, shown_after);

    // and back again shows the untouched buffer
    vga.add_primitive(Primitive::SwapBuffers);
    assert_eq!(pixel(&vga, 5, 5), Rgb::BLACK);
    assert_eq!(vga.with_chain(DmaChain::shown_segment), Some(shown_before));
}

#[test_log::test]
fn suspend_nests() {
    let vga = foreground(Config::default());
    vga.set_modeline(TINY, None, None, false).unwrap();
    vga.enable_background_primitive_execution(true);

    vga.suspend_background_primitive_execution();
    vga.suspend_background_primitive_execution();
    vga.add_primitive(Primitive::SetBrushColor(Colour::Green.into()));
    vga.add_primitive(Primitive::Clear);
    vga.on_vsync();
    assert_eq!(vga.queued(), 2);

    vga.resume_background_primitive_execution();
    vga.on_vsync();
    assert_eq!(vga.queued(), 2);

    vga.resume_background_primitive_execution();
    assert_eq!(vga.queued(), 0);
    assert_eq!(pixel(&vga, 0, 0), Rgb::new(0, 2, 0));
}

#[test_log::test]
fn vsync_runs_the_queue() {
    let vga = VgaController::new(Recorder::default(), PINS, Config::default());
    vga.set_modeline(TINY, None, None, false).unwrap();
    vga.add_primitive(Primitive::SetPixel(Point::new(3, 4)));
    assert_eq!(vga.queued(), 1);
    vga.on_vsync();
    assert_eq!(vga.queued(), 0);
    assert_eq!(pixel(&vga, 3, 4), Rgb::WHITE);
    // nothing queued, so this comes straight back
    vga.primitives_execution_wait();
}

#[test_log::test]
fn background_off_draws_at_once() {
    let pixels = [bitmap::pack(Rgb::new(0, 3, 0), 3); 4];
    let dot = Bitmap::new(2, 2, &pixels);
    let vga = foreground(Config::default());
    vga.set_modeline(TINY, None, None, false).unwrap();
    vga.add_primitive(Primitive::SetPixel(Point::new(3, 3)));
    assert_eq!(vga.queued(), 0);
    assert_eq!(pixel(&vga, 3, 3), Rgb::WHITE);

    // sprites go back on after each primitive
    let mut sprite = Sprite::new();
    sprite.add_bitmap(&dot).move_to(20, 10);
    vga.set_sprites(vec![sprite]);
    vga.add_primitive(Primitive::SetBrushColor(Colour::Blue.into()));
    vga.add_primitive(Primitive::Clear);
    assert_eq!(pixel(&vga, 20, 10), Rgb::new(0, 3, 0));
    assert_eq!(pixel(&vga, 3, 3), Colour::Blue.rgb());
}

#[test_log::test]
fn producer_waits_for_the_interrupt() {
    let vga = VgaController::new(
        Recorder::default(),
        PINS,
        Config {
            queue_capacity: 4,
            ..Config::default()
        },
    );
    vga.set_modeline(TINY, None, None, false).unwrap();
    let done = AtomicBool::new(false);

    std::thread::scope(|s| {
        s.spawn(|| {
            while !done.load(Ordering::Acquire) {
                vga.on_vsync();
                std::thread::yield_now();
            }
        });
        for i in 0..300 {
            vga.add_primitive(Primitive::SetPixel(Point::new(i % 32, i / 32)));
            assert!(vga.queued() <= 4);
        }
        vga.primitives_execution_wait();
        assert_eq!(vga.queued(), 0);
        done.store(true, Ordering::Release);
    });

    for i in 0..300 {
        assert_eq!(pixel(&vga, i % 32, i / 32), Rgb::WHITE);
    }
    assert_eq!(pixel(&vga, 31, 15), Rgb::BLACK);
}

#[test_log::test]
fn vsync_budget_leaves_work_for_later() {
    let vga = VgaController::new(Recorder::default(), PINS, Config::default());
    vga.set_modeline(TINY, None, None, false).unwrap();
    for x in 0..8 {
        vga.add_primitive(Primitive::SetPixel(Point::new(x, 0)));
    }
    assert_eq!(vga.queued(), 8);

    // each primitive appears to take a third of the blanking interval
    let budget = vga.timings().unwrap().vblank_duration();
    let step = budget.ticks() / 3 + 1;
    let mut clock = 0;
    vga.on_vsync_budgeted(|| {
        let now = MicrosDurationU32::micros(clock);
        clock += step;
        now
    });
    assert_eq!(vga.queued(), 5);
    assert_eq!(pixel(&vga, 2, 0), Rgb::WHITE);
    assert_eq!(pixel(&vga, 3, 0), Rgb::BLACK);

    vga.on_vsync_budgeted(|| MicrosDurationU32::micros(0));
    assert_eq!(vga.queued(), 0);
}

#[test_log::test]
fn vertical_scroll_round_trip() {
    let vga = foreground(Config::default());
    vga.set_modeline(TINY, None, None, false).unwrap();
    for y in 0..16 {
        vga.add_primitive(Primitive::SetPenColor(Colour::from_index(y as u8).into()));
        vga.add_primitive(Primitive::SetPixel(Point::new(y, y)));
    }
    vga.process_primitives();
    let before = screen(&vga);

    vga.add_primitive(Primitive::VScroll(3));
    vga.process_primitives();
    assert_ne!(screen(&vga), before);
    assert_eq!(pixel(&vga, 1, 4), Colour::from_index(1).rgb());

    // the chain follows the rotated rows
    let row0 = vga
        .with_viewport(|vp, _| vp.row_ptrs()[0].as_ptr() as *const u8)
        .unwrap();
    assert!(vga
        .with_chain(|chain| chain.walk().any(|d| d.buffer() == row0))
        .unwrap());

    vga.add_primitive(Primitive::VScroll(-3));
    vga.process_primitives();
    assert_eq!(screen(&vga), before);
}

#[test_log::test]
fn sprites_leave_no_trace() {
    let pixels = [bitmap::pack(Rgb::new(3, 3, 0), 3); 16];
    let ball = Bitmap::new(4, 4, &pixels);
    let vga = foreground(Config::default());
    vga.set_modeline(TINY, None, None, false).unwrap();
    vga.add_primitive(Primitive::SetBrushColor(Colour::Cyan.into()));
    vga.add_primitive(Primitive::Clear);
    vga.process_primitives();
    let background = screen(&vga);

    let mut sprite = Sprite::new();
    sprite.add_bitmap(&ball).move_to(10, 6);
    let old = vga.set_sprites(vec![sprite]);
    assert!(old.is_empty());
    vga.process_primitives();
    assert_eq!(pixel(&vga, 11, 7), Rgb::new(3, 3, 0));

    vga.with_sprites(|sprites| {
        sprites[0].move_by(-7, 0, Some(Size::new(32, 16)));
    });
    vga.refresh_sprites();
    vga.process_primitives();
    assert_eq!(pixel(&vga, 11, 7), Colour::Cyan.rgb());

    // drawing goes underneath
    vga.add_primitive(Primitive::SetBrushColor(Colour::Red.into()));
    vga.add_primitive(Primitive::Clear);
    vga.process_primitives();
    let sprite_at = vga.with_sprites(|sprites| Point::new(sprites[0].x, sprites[0].y));
    assert_eq!(
        pixel(&vga, sprite_at.x as usize + 1, sprite_at.y as usize + 1),
        Rgb::new(3, 3, 0)
    );

    vga.remove_sprites();
    vga.process_primitives();
    for (x, y) in [(0, 0), (4, 7), (11, 7), (31, 15)] {
        assert_eq!(pixel(&vga, x, y), Colour::Red.rgb());
    }
    assert_ne!(screen(&vga), background);
}

#[test_log::test]
fn mouse_pointer_follows() {
    let vga = foreground(Config::default());
    vga.set_modeline(TINY, None, None, false).unwrap();
    let blank = screen(&vga);
    vga.set_mouse_cursor_named(Some(softvga::CursorName::PointerSimple));
    vga.set_mouse_cursor_pos(Point::new(4, 4));
    vga.process_primitives();
    assert_eq!(vga.mouse_cursor_pos(), Point::new(4, 4));
    assert_ne!(screen(&vga), blank);

    vga.set_mouse_cursor(None);
    vga.process_primitives();
    assert_eq!(screen(&vga), blank);
}

#[test_log::test]
fn raw_data_round_trip() {
    let saved = RawBuffer::new();
    let vga = foreground(Config::default());
    vga.set_modeline(TINY, None, None, false).unwrap();
    vga.add_primitive(Primitive::SetPenColor(Colour::Magenta.into()));
    vga.add_primitive(Primitive::SetPixel(Point::new(1, 1)));
    let region = Rect::new(0, 0, 3, 3);
    vga.add_primitive(Primitive::ReadRawData(RawRegion {
        rect: region,
        buffer: &saved,
    }));
    vga.add_primitive(Primitive::SetBrushColor(Colour::White.into()));
    vga.add_primitive(Primitive::Clear);
    vga.add_primitive(Primitive::WriteRawData(RawRegion {
        rect: region.translate(8, 8),
        buffer: &saved,
    }));
    vga.process_primitives();

    assert_eq!(saved.to_vec().len(), 16);
    assert_eq!(pixel(&vga, 9, 9), Colour::Magenta.rgb());
    assert_eq!(pixel(&vga, 8, 8), Rgb::BLACK);
    assert_eq!(pixel(&vga, 1, 1), Colour::White.rgb());
}

#[test_log::test]
fn out_of_memory_then_restore() {
    let small = Config {
        max_pools: 2,
        pool_block_limit: 64 * 1024,
        ..Config::default()
    };
    let vga = foreground(small);
    vga.set_modeline(modes::VGA_320X200_75HZ, None, None, false)
        .unwrap();
    assert_eq!(vga.viewport_size(), Some(Size::new(320, 200)));

    let err = vga
        .set_modeline(modes::VGA_640X480_60HZ, None, Some(480), false)
        .unwrap_err();
    assert_eq!(
        err,
        Error::OutOfMemory {
            requested: 480,
            allocated: 204
        }
    );
    assert!(vga.viewport_size().is_none());

    vga.restore_previous_resolution().unwrap();
    assert_eq!(vga.viewport_size(), Some(Size::new(320, 200)));
    assert_eq!(vga.timings().unwrap().label, "320x200@75Hz");
}

#[test_log::test]
fn short_of_memory_gives_fewer_rows() {
    let small = Config {
        max_pools: 2,
        pool_block_limit: 64 * 1024,
        ..Config::default()
    };
    let vga = foreground(small);
    vga.set_modeline(modes::VGA_640X480_60HZ, None, None, false)
        .unwrap();
    // two pools of 102 rows
    assert_eq!(vga.viewport_size(), Some(Size::new(640, 204)));
    let layout = vga.viewport_layout().unwrap();
    assert_eq!(layout.row, (480 - 204) / 2);
    assert_eq!(vga.row_for_scanline(u32::from(layout.row)), Some(0));
    assert_eq!(vga.row_for_scanline(0), None);
}

#[test_log::test]
fn moving_keeps_the_picture() {
    let vga = foreground(Config::default());
    vga.set_modeline(TINY, None, None, false).unwrap();
    vga.add_primitive(Primitive::SetPixel(Point::new(7, 7)));
    vga.process_primitives();
    let before = screen(&vga);

    vga.move_screen(-1, -1).unwrap();
    let t = vga.timings().unwrap();
    assert_eq!((t.h_front_porch, t.h_back_porch), (3, 3));
    assert_eq!((t.v_front_porch, t.v_back_porch), (2, 1));
    assert_eq!(screen(&vga), before);
    assert_eq!(vga.with_output(|o| (o.heads.len(), o.stops)), (2, 2));

    assert_eq!(vga.move_screen(0, -2), Err(Error::DegenerateTimings));
    vga.shrink_screen(2, 0).unwrap();
    let t = vga.timings().unwrap();
    assert_eq!((t.h_front_porch, t.h_back_porch), (1, 1));

    // a later restore brings back the adjusted timings
    vga.restore_previous_resolution().unwrap();
    assert_eq!(vga.timings().unwrap().h_back_porch, 1);
}

#[test_log::test]
fn dropping_stops_the_output() {
    let vga = foreground(Config::default());
    vga.set_modeline(TINY, None, None, false).unwrap();
    assert!(vga.with_output(|o| o.streaming));
    drop(vga);
}

// End of file
