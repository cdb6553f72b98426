//! Frame buffer memory.
//!
//! A viewport is a list of row pointers. The rows themselves live in a small
//! number of pools, each as big as the allocator will give us in one piece,
//! so a fragmented heap can still hold a full screen. Which pool backs which
//! row is decided once, at allocation time.

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
use core::ptr::NonNull;

use crate::{error::Error, timings::Timings};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// Somewhere to get DMA-capable memory from.
pub trait FrameAllocator {
    /// The biggest single block `allocate` could currently return.
    fn largest_free_block(&self) -> usize;

    /// Get a zeroed block of exactly `bytes` bytes.
    fn allocate(&mut self, bytes: usize) -> Option<Box<[u8]>>;
}

/// Allocates from the global heap, with an optional cap on the size of any
/// one block.
#[derive(Debug, Clone)]
pub struct HeapAllocator {
    max_block: usize,
}

impl HeapAllocator {
    pub const fn new(max_block: usize) -> HeapAllocator {
        HeapAllocator { max_block }
    }
}

impl Default for HeapAllocator {
    fn default() -> Self {
        HeapAllocator::new(usize::MAX)
    }
}

impl FrameAllocator for HeapAllocator {
    fn largest_free_block(&self) -> usize {
        self.max_block
    }

    fn allocate(&mut self, bytes: usize) -> Option<Box<[u8]>> {
        if bytes > self.max_block {
            return None;
        }
        let mut v = Vec::new();
        v.try_reserve_exact(bytes).ok()?;
        v.resize(bytes, 0);
        Some(v.into_boxed_slice())
    }
}

/// Where the viewport sits within the visible area.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Layout {
    /// Left edge, in pixels from the start of the visible area
    pub col: u16,
    /// Top edge, in (unscanned) lines from the top of the visible area
    pub row: u16,
    pub width: u16,
    pub height: u16,
}

impl Layout {
    /// Centre a viewport of the given size in the visible area.
    ///
    /// Width is rounded down to a multiple of four, as is the column, so
    /// every row is word aligned for the DMA engine.
    pub fn centred(timings: &Timings, width: u16, height: u16) -> Layout {
        let width = (width.min(timings.h_visible_area) & !3).max(4.min(timings.h_visible_area));
        let height = height.min(timings.v_visible_area);
        Layout {
            col: ((timings.h_visible_area - width) / 2) & !3,
            row: (timings.v_visible_area - height) / 2,
            width,
            height,
        }
    }

    /// Which viewport row does this line of the visible area show?
    ///
    /// `scanline` counts physical scanlines from the top of the visible
    /// area, so with double scan each row appears twice.
    pub fn row_for_scanline(&self, timings: &Timings, scanline: u32) -> Option<usize> {
        let scan_count = u32::from(timings.scan_count.max(1));
        if timings.multi_scan_blank && scanline % scan_count != 0 {
            return None;
        }
        let line = scanline / scan_count;
        let row = line.checked_sub(u32::from(self.row))?;
        (row < u32::from(self.height)).then_some(row as usize)
    }
}

/// One frame's worth of row pointers.
#[derive(Debug)]
pub struct Viewport {
    width: usize,
    rows: Vec<NonNull<u8>>,
}

impl Viewport {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// The encoded pixels of one row.
    pub fn row(&self, y: usize) -> &[u8] {
        // Safety: each pointer refers to `width` bytes of a live pool that
        // no other row overlaps.
        unsafe { core::slice::from_raw_parts(self.rows[y].as_ptr(), self.width) }
    }

    /// The encoded pixels of one row, for writing.
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        // Safety: as for `row`, and we hold `&mut self`.
        unsafe { core::slice::from_raw_parts_mut(self.rows[y].as_ptr(), self.width) }
    }

    /// The row pointers, in display order.
    pub fn row_ptrs(&self) -> &[NonNull<u8>] {
        &self.rows
    }

    /// Rotate the rows `first..=last` by `n` places.
    ///
    /// Positive `n` moves content down. Only pointers move; no pixel is
    /// copied.
    pub fn rotate_rows(&mut self, first: usize, last: usize, n: isize) {
        let span = &mut self.rows[first..=last];
        let len = span.len() as isize;
        let n = n.rem_euclid(len) as usize;
        span.rotate_right(n);
    }

    /// Copy `len` pixels from one place in the viewport to another.
    ///
    /// Source and destination may be on the same row and may overlap.
    pub fn copy_within(&mut self, src: (usize, usize), dst: (usize, usize), len: usize) {
        let (sx, sy) = src;
        let (dx, dy) = dst;
        assert!(sx + len <= self.width && dx + len <= self.width);
        // Safety: both ranges are within their rows (checked above), and
        // `ptr::copy` allows overlap.
        unsafe {
            let from = self.rows[sy].as_ptr().add(sx);
            let to = self.rows[dy].as_ptr().add(dx);
            core::ptr::copy(from, to, len);
        }
    }
}

/// The viewports and the memory behind them.
///
/// With double buffering there are two viewports: one being streamed (the
/// *visible* one) and one being drawn into. Otherwise both roles are played
/// by the same viewport.
#[derive(Debug)]
pub struct FrameBuffer {
    pools: Vec<NonNull<[u8]>>,
    viewports: Vec<Viewport>,
    drawing: usize,
}

// Safety: the pools are owned exclusively by this object and only reached
// through it (or by the DMA engine, which only reads).
unsafe impl Send for FrameBuffer {}

impl FrameBuffer {
    /// Grab memory for one or two viewports.
    ///
    /// With `height` of `None` we take as many rows as we can get, up to
    /// `max_height`. With `Some(h)` we must get all `h` rows, or we fail.
    /// Every byte starts out as `fill`.
    pub fn allocate(
        alloc: &mut dyn FrameAllocator,
        width: usize,
        height: Option<usize>,
        max_height: usize,
        double_buffered: bool,
        max_pools: usize,
        fill: u8,
    ) -> Result<FrameBuffer, Error> {
        let buffers = if double_buffered { 2 } else { 1 };
        let wanted = height.unwrap_or(max_height).min(max_height);
        let mut remaining = wanted * buffers;
        let mut fb = FrameBuffer {
            pools: Vec::new(),
            viewports: Vec::new(),
            drawing: 0,
        };
        let mut row_ptrs: Vec<NonNull<u8>> = Vec::new();
        row_ptrs
            .try_reserve_exact(remaining)
            .map_err(|_| Error::OutOfMemory {
                requested: wanted,
                allocated: 0,
            })?;

        while remaining > 0 && fb.pools.len() < max_pools && width > 0 {
            let rows = remaining.min(alloc.largest_free_block() / width);
            if rows == 0 {
                break;
            }
            let Some(mut pool) = alloc.allocate(rows * width) else {
                break;
            };
            pool.fill(fill);
            let pool = NonNull::from(Box::leak(pool));
            let base = pool.as_ptr() as *mut u8;
            for row in 0..rows {
                // Safety: `row * width` is within the `rows * width` pool.
                row_ptrs.push(unsafe { NonNull::new_unchecked(base.add(row * width)) });
            }
            fb.pools.push(pool);
            remaining -= rows;
            debug!("viewport pool {}: {} rows", fb.pools.len(), rows);
        }

        let per_buffer = row_ptrs.len() / buffers;
        if per_buffer == 0 || (height.is_some() && per_buffer < wanted) {
            warn!("only got {} of {} viewport rows", per_buffer, wanted);
            return Err(Error::OutOfMemory {
                requested: wanted,
                allocated: per_buffer,
            });
        }

        for chunk in row_ptrs.chunks_exact(per_buffer).take(buffers) {
            fb.viewports.push(Viewport {
                width,
                rows: chunk.to_vec(),
            });
        }
        Ok(fb)
    }

    pub fn is_double_buffered(&self) -> bool {
        self.viewports.len() > 1
    }

    pub fn width(&self) -> usize {
        self.viewports[0].width
    }

    pub fn height(&self) -> usize {
        self.viewports[0].rows.len()
    }

    /// Index of the viewport being drawn into.
    pub fn drawing_index(&self) -> usize {
        self.drawing
    }

    /// Index of the viewport being streamed.
    pub fn visible_index(&self) -> usize {
        (self.drawing + 1) % self.viewports.len()
    }

    pub fn viewport(&self, index: usize) -> &Viewport {
        &self.viewports[index]
    }

    pub fn drawing(&self) -> &Viewport {
        &self.viewports[self.drawing]
    }

    pub fn drawing_mut(&mut self) -> &mut Viewport {
        &mut self.viewports[self.drawing]
    }

    pub fn visible(&self) -> &Viewport {
        &self.viewports[self.visible_index()]
    }

    /// Exchange the drawing and visible roles. Does nothing when single
    /// buffered.
    pub fn swap(&mut self) {
        self.drawing = self.visible_index();
    }
}

impl Drop for FrameBuffer {
    fn drop(&mut self) {
        for pool in self.pools.drain(..) {
            // Safety: every pool came from `Box::leak` in `allocate`.
            drop(unsafe { Box::from_raw(pool.as_ptr()) });
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------


// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
