//! Scrolling a region of the viewport.

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

use super::Canvas;
use crate::{colour::Rgb, geometry::Rect};

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

impl Canvas<'_> {
    /// Rotate the rows of `region` by `n`. Positive `n` moves content down.
    ///
    /// Rows pushed off one edge come back in at the other. When the region
    /// spans the whole width we only shuffle row pointers, and return
    /// `true` so the caller knows the row order changed.
    pub fn vscroll(&mut self, region: Rect, n: i32) -> bool {
        let r = region.normalized().intersection(&self.clip);
        if r.is_empty() || n == 0 {
            return false;
        }
        let height = r.height() as usize;
        let shift = n.rem_euclid(r.height()) as usize;
        if shift == 0 {
            return false;
        }

        if r.x1 == 0 && r.x2 == self.viewport.width() as i32 - 1 {
            self.viewport
                .rotate_rows(r.y1 as usize, r.y2 as usize, shift as isize);
            return true;
        }

        let width = r.width() as usize;
        let (x1, x2) = (r.x1 as usize, r.x2 as usize);
        let mut saved = Vec::with_capacity(width * height);
        for y in r.y1..=r.y2 {
            saved.extend_from_slice(&self.viewport.row(y as usize)[x1..=x2]);
        }
        for (i, src) in saved.chunks_exact(width).enumerate() {
            let y = r.y1 as usize + (i + shift) % height;
            self.viewport.row_mut(y)[x1..=x2].copy_from_slice(src);
        }
        false
    }

    /// Move the columns of `region` by `n`. Positive `n` moves content right.
    ///
    /// Columns uncovered by the move are painted with `fill`.
    pub fn hscroll(&mut self, region: Rect, n: i32, fill: Rgb) {
        let r = region.normalized().intersection(&self.clip);
        if r.is_empty() || n == 0 {
            return;
        }
        let byte = self.encoder.encode(fill);
        let width = r.width() as usize;
        let shift = n.unsigned_abs() as usize;
        for y in r.y1..=r.y2 {
            let span = &mut self.viewport.row_mut(y as usize)[r.x1 as usize..=r.x2 as usize];
            if shift >= width {
                span.fill(byte);
            } else if n > 0 {
                span.copy_within(..width - shift, shift);
                span[..shift].fill(byte);
            } else {
                span.copy_within(shift.., 0);
                span[width - shift..].fill(byte);
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::super::tests::{encoder, frame, pattern, snapshot};
    use super::*;

    #[test]
    fn full_width_scroll_moves_pointers() {
        let mut fb = frame(8, 6);
        pattern(&mut fb);
        let before = snapshot(&fb);
        let ptrs = fb.drawing().row_ptrs().to_vec();
        let moved = Canvas::new(fb.drawing_mut(), encoder(), Rect::new(0, 0, 7, 5))
            .vscroll(Rect::new(0, 1, 7, 4), 1);
        assert!(moved);
        let after = snapshot(&fb);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[1]);
        assert_eq!(after[1], before[4]);
        assert_eq!(after[5], before[5]);
        // no pixel was copied, the rows just swapped places
        assert_eq!(fb.drawing().row_ptrs()[2], ptrs[1]);
    }

    #[test]
    fn vscroll_there_and_back() {
        let mut fb = frame(8, 6);
        pattern(&mut fb);
        let before = snapshot(&fb);
        for region in [Rect::new(0, 0, 7, 5), Rect::new(2, 1, 5, 5)] {
            let mut c = Canvas::new(fb.drawing_mut(), encoder(), Rect::new(0, 0, 7, 5));
            c.vscroll(region, -2);
            c.vscroll(region, 7);
            c.vscroll(region, -5);
            drop(c);
            assert_eq!(snapshot(&fb), before);
        }
    }

    #[test]
    fn partial_vscroll_keeps_other_columns() {
        let mut fb = frame(8, 4);
        pattern(&mut fb);
        let before = snapshot(&fb);
        let moved = Canvas::new(fb.drawing_mut(), encoder(), Rect::new(0, 0, 7, 3))
            .vscroll(Rect::new(2, 0, 4, 3), -1);
        assert!(!moved);
        let after = snapshot(&fb);
        for y in 0..4 {
            assert_eq!(after[y][..2], before[y][..2]);
            assert_eq!(after[y][5..], before[y][5..]);
            assert_eq!(after[y][2..=4], before[(y + 1) % 4][2..=4]);
        }
    }

    #[test]
    fn hscroll_fills_behind() {
        let mut fb = frame(8, 2);
        pattern(&mut fb);
        let before = snapshot(&fb);
        let fill = encoder().encode(Rgb::WHITE);
        let mut c = Canvas::new(fb.drawing_mut(), encoder(), Rect::new(0, 0, 7, 1));
        c.hscroll(Rect::new(1, 0, 6, 0), 2, Rgb::WHITE);
        c.hscroll(Rect::new(1, 1, 6, 1), -3, Rgb::WHITE);
        drop(c);
        let after = snapshot(&fb);
        assert_eq!(after[0][0], before[0][0]);
        assert_eq!(&after[0][1..3], &[fill, fill]);
        assert_eq!(&after[0][3..7], &before[0][1..5]);
        assert_eq!(after[0][7], before[0][7]);
        assert_eq!(&after[1][1..4], &before[1][4..7]);
        assert_eq!(&after[1][4..7], &[fill, fill, fill]);
    }
}

// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
