//! The DMA descriptor chain that generates the video signal.
//!
//! The chain is circular and looks like this:
//!
//! ```text
//!            +---------------------+
//!            v                     |
//! [head] -> [visible lines for buffer N] -> [vertical blanking] -+
//!   ^                                                           |
//!   +-----------------------------------------------------------+
//! ```
//!
//! There is one run of visible-area descriptors per viewport. The head is an
//! empty link whose `next` pointer picks which run is streamed, so swapping
//! buffers is one atomic store. The vertical blanking run is shared.
//!
//! Every blanking byte is pre-encoded with the right sync levels, in one
//! line buffer without vertical sync and one with it. A visible line is up
//! to three descriptors: the blank line up to the viewport, the viewport
//! row, and the blank line after the viewport.

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
use core::{
    ptr::NonNull,
    sync::atomic::{AtomicPtr, AtomicU32, AtomicUsize, Ordering},
};

use crate::{
    colour::PixelEncoder,
    error::Error,
    timings::{ScreenBlock, Timings},
    viewport::{FrameBuffer, Layout},
};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// One hardware linked-list descriptor.
///
/// The layout matches the common `lldesc` format: a control word holding
/// the buffer size, the data length and the EOF and owner flags, then the
/// buffer pointer, then the next descriptor.
#[repr(C)]
#[derive(Debug)]
pub struct DmaDescriptor {
    control: AtomicU32,
    buf: AtomicPtr<u8>,
    next: AtomicPtr<DmaDescriptor>,
}

impl DmaDescriptor {
    const SIZE_MASK: u32 = 0xFFF;
    const LENGTH_SHIFT: u32 = 12;
    const EOF_BIT: u32 = 1 << 30;
    const OWNER_BIT: u32 = 1 << 31;

    fn new(len: u32, eof: bool) -> DmaDescriptor {
        let mut control = (len & Self::SIZE_MASK)
            | (len & Self::SIZE_MASK) << Self::LENGTH_SHIFT
            | Self::OWNER_BIT;
        if eof {
            control |= Self::EOF_BIT;
        }
        DmaDescriptor {
            control: AtomicU32::new(control),
            buf: AtomicPtr::new(core::ptr::null_mut()),
            next: AtomicPtr::new(core::ptr::null_mut()),
        }
    }

    /// How many bytes this descriptor sends.
    pub fn len(&self) -> usize {
        ((self.control.load(Ordering::Relaxed) >> Self::LENGTH_SHIFT) & Self::SIZE_MASK) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Does the peripheral raise its end-of-frame interrupt after this one?
    pub fn is_eof(&self) -> bool {
        self.control.load(Ordering::Relaxed) & Self::EOF_BIT != 0
    }

    pub fn buffer(&self) -> *const u8 {
        self.buf.load(Ordering::Acquire)
    }

    pub fn next(&self) -> *const DmaDescriptor {
        self.next.load(Ordering::Acquire)
    }

    /// The bytes this descriptor sends.
    ///
    /// # Safety
    ///
    /// The chain that owns this descriptor, and the frame buffer its rows
    /// point into, must both still be alive.
    pub unsafe fn data(&self) -> &[u8] {
        core::slice::from_raw_parts(self.buffer(), self.len())
    }
}

/// Where a descriptor's bytes come from, before we have pointers.
#[derive(Debug, Copy, Clone)]
enum Source {
    /// Offset into the blank line
    Blank(usize),
    /// Offset into the blank line with vertical sync asserted
    VSync(usize),
    /// A viewport row
    Row { viewport: usize, row: usize },
}

/// A range of descriptors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Segment {
    first: usize,
    count: usize,
}

/// A complete, circular descriptor chain for one video mode.
#[derive(Debug)]
pub struct DmaChain {
    descriptors: Vec<DmaDescriptor>,
    /// Two lines back to back: without vertical sync, then with it
    blank_lines: Vec<u8>,
    /// The visible-area run for each viewport
    segments: Vec<Segment>,
    /// The shared vertical blanking run
    blanking: Segment,
    /// For each viewport, which descriptors point at each row. Row `r` owns
    /// `slots_per_row` consecutive entries starting at `r * slots_per_row`.
    row_slots: Vec<Vec<usize>>,
    slots_per_row: usize,
    /// Which segment the head currently links to
    shown: AtomicUsize,
    line_len: usize,
}

impl DmaChain {
    /// Build the chain for a frame buffer.
    ///
    /// The head initially links to the frame buffer's visible viewport.
    pub fn build(
        timings: &Timings,
        layout: &Layout,
        encoder: &PixelEncoder,
        frame: &FrameBuffer,
    ) -> Result<DmaChain, Error> {
        timings.validate()?;
        let line_len = timings.h_total() as usize;
        let scan_count = usize::from(timings.scan_count);
        let viewport_count = if frame.is_double_buffered() { 2 } else { 1 };
        let height = frame.height().min(usize::from(layout.height));

        let blank_lines = Self::blank_lines(timings, encoder)?;

        // Plan every descriptor as (source, length, eof, next index)
        let mut plan: Vec<(Source, usize, bool, usize)> = Vec::new();
        let estimate = 1
            + viewport_count * usize::from(timings.v_visible_area) * scan_count * 3
            + (timings.v_total() as usize - usize::from(timings.v_visible_area)) * scan_count;
        plan.try_reserve_exact(estimate)
            .map_err(|_| Error::OutOfMemory {
                requested: estimate,
                allocated: 0,
            })?;

        // head; `next` is filled in once we know where the segments are
        plan.push((Source::Blank(0), 0, false, 0));

        let slots_per_row = if timings.multi_scan_blank { 1 } else { scan_count };
        let row_start = timings.h_visible_offset() as usize + usize::from(layout.col);
        let row_len = frame.width();
        let suffix = line_len.saturating_sub(row_start + row_len);
        let mut segments = Vec::with_capacity(viewport_count);
        let mut row_slots = Vec::with_capacity(viewport_count);

        for viewport in 0..viewport_count {
            let first = plan.len();
            let mut slots = Vec::with_capacity(height * slots_per_row);
            for scanline in 0..usize::from(timings.v_visible_area) * scan_count {
                match layout.row_for_scanline(timings, scanline as u32) {
                    Some(row) if row < height => {
                        if row_start > 0 {
                            plan.push((Source::Blank(0), row_start, false, plan.len() + 1));
                        }
                        slots.push(plan.len());
                        plan.push((Source::Row { viewport, row }, row_len, false, plan.len() + 1));
                        if suffix > 0 {
                            let offset = row_start + row_len;
                            plan.push((Source::Blank(offset), suffix, false, plan.len() + 1));
                        }
                    }
                    _ => {
                        plan.push((Source::Blank(0), line_len, false, plan.len() + 1));
                    }
                }
            }
            segments.push(Segment {
                first,
                count: plan.len() - first,
            });
            row_slots.push(slots);
        }

        // The vertical blanking run, in signal order after the visible area
        let blanking_first = plan.len();
        for block in [ScreenBlock::FrontPorch, ScreenBlock::Sync, ScreenBlock::BackPorch] {
            let lines = match block {
                ScreenBlock::FrontPorch => timings.v_front_porch,
                ScreenBlock::Sync => timings.v_sync_pulse,
                _ => timings.v_back_porch,
            };
            for _ in 0..usize::from(lines) * scan_count {
                let source = if block == ScreenBlock::Sync {
                    Source::VSync(0)
                } else {
                    Source::Blank(0)
                };
                // The first blanking line raises the vertical sync interrupt
                let eof = plan.len() == blanking_first;
                plan.push((source, line_len, eof, plan.len() + 1));
            }
        }
        let blanking = Segment {
            first: blanking_first,
            count: plan.len() - blanking_first,
        };

        // Close the loops
        for segment in &segments {
            if let Some(last) = plan.get_mut(segment.first + segment.count - 1) {
                last.3 = blanking.first;
            }
        }
        if let Some(last) = plan.last_mut() {
            last.3 = 0;
        }
        if blanking.count == 0 {
            // No vertical blanking at all, so the visible runs loop straight
            // back to the head
            for segment in &segments {
                plan[segment.first + segment.count - 1].3 = 0;
            }
        }
        let shown = frame.visible_index();
        plan[0].3 = segments[shown].first;

        let mut descriptors = Vec::new();
        descriptors
            .try_reserve_exact(plan.len())
            .map_err(|_| Error::OutOfMemory {
                requested: plan.len(),
                allocated: 0,
            })?;
        for (_, len, eof, _) in &plan {
            descriptors.push(DmaDescriptor::new(*len as u32, *eof));
        }

        let chain = DmaChain {
            descriptors,
            blank_lines,
            segments,
            blanking,
            row_slots,
            slots_per_row,
            shown: AtomicUsize::new(shown),
            line_len,
        };

        let base = chain.descriptors.as_ptr() as *mut DmaDescriptor;
        let blank = chain.blank_lines.as_ptr() as *mut u8;
        for (desc, (source, _, _, next)) in chain.descriptors.iter().zip(plan.iter()) {
            let ptr = match *source {
                // Safety: offsets are within the line (see the plan above),
                // and the vsync line follows the plain one.
                Source::Blank(offset) => unsafe { blank.add(offset) },
                Source::VSync(offset) => unsafe { blank.add(line_len + offset) },
                Source::Row { viewport, row } => frame.viewport(viewport).row_ptrs()[row].as_ptr(),
            };
            desc.buf.store(ptr, Ordering::Relaxed);
            // Safety: every `next` index is within the plan.
            desc.next.store(unsafe { base.add(*next) }, Ordering::Relaxed);
        }
        core::sync::atomic::fence(Ordering::Release);

        debug!(
            "dma chain: {} descriptors, {} per viewport, {} blanking",
            chain.descriptors.len(),
            chain.segments[0].count,
            chain.blanking.count
        );
        Ok(chain)
    }

    /// Encode one blank line without vertical sync, and one with.
    fn blank_lines(timings: &Timings, encoder: &PixelEncoder) -> Result<Vec<u8>, Error> {
        let line_len = timings.h_total() as usize;
        let mut lines = Vec::new();
        lines
            .try_reserve_exact(line_len * 2)
            .map_err(|_| Error::OutOfMemory {
                requested: line_len * 2,
                allocated: 0,
            })?;
        for vsync in [false, true] {
            for block in timings.h_starting_block.cycle() {
                let byte = encoder.blank(block == ScreenBlock::Sync, vsync);
                let len = timings.h_block_len(block) as usize;
                lines.extend(core::iter::repeat(byte).take(len));
            }
        }
        Ok(lines)
    }

    /// The descriptor the peripheral should start from.
    pub fn head(&self) -> *const DmaDescriptor {
        self.descriptors.as_ptr()
    }

    /// Total descriptors in the chain.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Bytes per scanline.
    pub fn line_len(&self) -> usize {
        self.line_len
    }

    /// How many visible-area runs (one per viewport) we have.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Which visible-area run the head points at.
    pub fn shown_segment(&self) -> usize {
        self.shown.load(Ordering::Acquire)
    }

    /// Stream viewport `index` from the next frame onwards.
    ///
    /// This is a single store to the head's `next` pointer, so the
    /// peripheral sees either the old run or the new one.
    pub fn show_segment(&self, index: usize) {
        let Some(segment) = self.segments.get(index) else {
            return;
        };
        let target = &self.descriptors[segment.first] as *const DmaDescriptor as *mut DmaDescriptor;
        self.descriptors[0].next.store(target, Ordering::Release);
        self.shown.store(index, Ordering::Release);
    }

    /// Point viewport `index`'s row descriptors at new row buffers.
    ///
    /// Used after the row pointers of a viewport have been rotated. Each
    /// descriptor's buffer pointer is swapped with a single atomic store.
    pub fn retarget_rows(&self, index: usize, rows: &[NonNull<u8>]) {
        let Some(slots) = self.row_slots.get(index) else {
            return;
        };
        for (row, chunk) in rows.iter().zip(slots.chunks(self.slots_per_row)) {
            for slot in chunk {
                self.descriptors[*slot].buf.store(row.as_ptr(), Ordering::Release);
            }
        }
    }

    /// Follow the chain for one frame, starting after the head.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            chain: self,
            current: self.descriptors[0].next(),
        }
    }
}

/// Walks one frame's worth of descriptors, as the peripheral would.
pub struct Walk<'a> {
    chain: &'a DmaChain,
    current: *const DmaDescriptor,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a DmaDescriptor;

    fn next(&mut self) -> Option<&'a DmaDescriptor> {
        if self.current.is_null() || self.current == self.chain.head() {
            return None;
        }
        // Safety: every `next` pointer refers into `chain.descriptors`, which
        // lives as long as `'a`.
        let desc = unsafe { &*self.current };
        self.current = desc.next();
        Some(desc)
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------


// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
