//! Lines, ellipses and polygons.

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
use crate::{
    colour::Rgb,
    geometry::{Point, Size},
};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// One axis of a line, in steps from its start.
#[derive(Debug, Copy, Clone)]
struct Axis {
    start: i64,
    dir: i64,
    len: i64,
    /// First and last step inside the clip. Empty if `lo > hi`.
    lo: i64,
    hi: i64,
}

impl Axis {
    fn new(from: i32, to: i32, min: i32, max: i32) -> Axis {
        let (start, end) = (i64::from(from), i64::from(to));
        let (min, max) = (i64::from(min), i64::from(max));
        let dir = if end < start { -1 } else { 1 };
        let len = (end - start).abs();
        let (lo, hi) = if dir > 0 {
            (min - start, max - start)
        } else {
            (start - max, start - min)
        };
        Axis {
            start,
            dir,
            len,
            lo: lo.max(0),
            hi: hi.min(len),
        }
    }

    /// Only valid for steps in `lo..=hi`.
    fn at(&self, step: i64) -> i32 {
        (self.start + self.dir * step) as i32
    }
}

/// Half the width and half the height of an ellipse.
#[derive(Debug, Copy, Clone)]
struct Radii {
    w: i64,
    h: i64,
}

impl Radii {
    fn new(size: Size) -> Radii {
        Radii {
            w: i64::from(size.width / 2),
            h: i64::from(size.height / 2),
        }
    }

    /// How far either side of the centre the ellipse reaches, `dy` rows
    /// from the centre row.
    fn span(&self, dy: i64) -> i64 {
        if self.h == 0 {
            return if dy == 0 { self.w } else { -1 };
        }
        let (ww, hh) = (i128::from(self.w * self.w), i128::from(self.h * self.h));
        let dy2 = i128::from(dy * dy);
        if dy2 > hh {
            return -1;
        }
        isqrt(ww * (hh - dy2) / hh) as i64
    }
}

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

impl Canvas<'_> {
    /// Draw a line including both end points.
    ///
    /// These are Bresenham's pixels, worked out directly: after `k` steps
    /// along the major axis the minor axis has taken
    /// `(2 * minor * k + major) / (2 * major)` steps. So we only visit the
    /// steps inside the clip.
    pub fn line(&mut self, from: Point, to: Point, colour: Rgb) {
        let byte = self.encoder.encode(colour);
        if from.y == to.y {
            self.hline(from.x, to.x, from.y, byte);
            return;
        }
        let clip = self.clip;
        let x = Axis::new(from.x, to.x, clip.x1, clip.x2);
        let y = Axis::new(from.y, to.y, clip.y1, clip.y2);
        let x_major = x.len >= y.len;
        let (major, minor) = if x_major { (x, y) } else { (y, x) };
        if major.lo > major.hi || minor.lo > minor.hi {
            return;
        }

        let (a, b) = (i128::from(major.len), i128::from(minor.len));
        let (mut first, mut last) = (i128::from(major.lo), i128::from(major.hi));
        if b > 0 {
            let (lo, hi) = (i128::from(minor.lo), i128::from(minor.hi));
            first = first.max(-(a - 2 * a * lo).div_euclid(2 * b));
            last = last.min((2 * a * (hi + 1) - a - 1).div_euclid(2 * b));
        }
        for k in first..=last {
            let p = major.at(k as i64);
            let q = minor.at(((2 * b * k + a) / (2 * a)) as i64);
            if x_major {
                self.put(p, q, byte);
            } else {
                self.put(q, p, byte);
            }
        }
    }

    /// Fill an ellipse of `size` centred on `centre`.
    pub fn fill_ellipse(&mut self, centre: Point, size: Size, colour: Rgb) {
        if size.width <= 0 || size.height <= 0 {
            return;
        }
        let byte = self.encoder.encode(colour);
        let radii = Radii::new(size);
        let (cx, cy) = (i64::from(centre.x), i64::from(centre.y));
        for y in self.rows_within(cy, radii.h) {
            let half = radii.span((i64::from(y) - cy).abs());
            self.hline(saturate(cx - half), saturate(cx + half), y, byte);
        }
    }

    /// Outline an ellipse of `size` centred on `centre`.
    ///
    /// Each row gets the pixels between its own reach and the reach of the
    /// row beyond it, so the outline has no gaps.
    pub fn draw_ellipse(&mut self, centre: Point, size: Size, colour: Rgb) {
        if size.width <= 0 || size.height <= 0 {
            return;
        }
        let byte = self.encoder.encode(colour);
        let radii = Radii::new(size);
        let (cx, cy) = (i64::from(centre.x), i64::from(centre.y));
        for y in self.rows_within(cy, radii.h) {
            let dy = (i64::from(y) - cy).abs();
            let outer = radii.span(dy);
            let inner = (radii.span(dy + 1) + 1).min(outer);
            self.hline(saturate(cx - outer), saturate(cx - inner), y, byte);
            self.hline(saturate(cx + inner), saturate(cx + outer), y, byte);
        }
    }

    /// The rows inside the clip and within `radius` of `centre`.
    fn rows_within(&self, centre: i64, radius: i64) -> core::ops::RangeInclusive<i32> {
        let top = (centre - radius).max(i64::from(self.clip.y1));
        let bottom = (centre + radius).min(i64::from(self.clip.y2));
        saturate(top)..=saturate(bottom)
    }

    /// Connect the points with lines. The shape is left open.
    pub fn draw_path(&mut self, points: &[Point], offset: Point, colour: Rgb) {
        match points {
            [] => {}
            [p] => self.set_pixel(p.offset(offset.x, offset.y), colour),
            _ => {
                for pair in points.windows(2) {
                    self.line(
                        pair[0].offset(offset.x, offset.y),
                        pair[1].offset(offset.x, offset.y),
                        colour,
                    );
                }
            }
        }
    }

    /// Fill a polygon using the even-odd rule, then outline it.
    ///
    /// The last point joins back to the first.
    pub fn fill_path(&mut self, points: &[Point], offset: Point, colour: Rgb) {
        if points.len() < 3 {
            self.draw_path(points, offset, colour);
            return;
        }
        let byte = self.encoder.encode(colour);
        let pts: Vec<Point> = points
            .iter()
            .map(|p| p.offset(offset.x, offset.y))
            .collect();
        let (mut top, mut bottom) = (i32::MAX, i32::MIN);
        for p in &pts {
            top = top.min(p.y);
            bottom = bottom.max(p.y);
        }
        let top = top.max(self.clip.y1);
        let bottom = bottom.min(self.clip.y2);

        // Crossings are kept as exact fractions (numerator, positive denominator)
        let mut crossings: Vec<(i128, i128)> = Vec::with_capacity(pts.len());
        for y in top..=bottom {
            crossings.clear();
            let mut j = pts.len() - 1;
            for i in 0..pts.len() {
                let (pi, pj) = (pts[i], pts[j]);
                if (pi.y <= y) != (pj.y <= y) {
                    let (xi, yi) = (i128::from(pi.x), i128::from(pi.y));
                    let (xj, yj) = (i128::from(pj.x), i128::from(pj.y));
                    let mut den = yj - yi;
                    let mut num = xi * den + (i128::from(y) - yi) * (xj - xi);
                    if den < 0 {
                        den = -den;
                        num = -num;
                    }
                    crossings.push((num, den));
                }
                j = i;
            }
            crossings.sort_unstable_by(|a, b| (a.0 * b.1).cmp(&(b.0 * a.1)));
            for span in crossings.chunks_exact(2) {
                let left = -(-span[0].0).div_euclid(span[0].1);
                let right = span[1].0.div_euclid(span[1].1);
                if left <= right {
                    self.hline(left as i32, right as i32, y, byte);
                }
            }
        }

        self.draw_path(&pts, Point::default(), colour);
        self.line(pts[pts.len() - 1], pts[0], colour);
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// The largest `r` with `r * r <= n`.
fn isqrt(n: i128) -> i128 {
    if n < 2 {
        return n.max(0);
    }
    // a power of two at or above the root, then Newton's method downwards
    let mut x = 1i128 << ((128 - n.leading_zeros()).div_ceil(2));
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------


// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
