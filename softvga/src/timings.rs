//! Video timings, and the modeline strings that describe them.
//!
//! A modeline looks like:
//!
//! ```text
//! "label" clock_mhz hdisp hsyncstart hsyncend htotal vdisp vsyncstart vsyncend vtotal (+HSync | -HSync) (+VSync | -VSync) [DoubleScan | QuadScan] [FrontPorchBegins | SyncBegins | BackPorchBegins | VisibleBegins] [MultiScanBlank]
//! ```
//!
//! Keywords are not case sensitive.

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

use alloc::string::{String, ToString};
use core::str::FromStr;

use fugit::{HertzU32, MicrosDurationU32};

use crate::error::{Error, ModelineError};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// Describes the polarity of a sync pulse.
///
/// Some pulses are positive (active-high), some are negative (active-low).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncPolarity {
    /// An active-high pulse
    Positive,
    /// An active-low pulse
    Negative,
}

impl SyncPolarity {
    /// The pin level while the pulse is active
    pub const fn enabled(&self) -> bool {
        match self {
            SyncPolarity::Positive => true,
            SyncPolarity::Negative => false,
        }
    }

    /// The pin level while the pulse is inactive
    pub const fn disabled(&self) -> bool {
        match self {
            SyncPolarity::Positive => false,
            SyncPolarity::Negative => true,
        }
    }
}

/// The four parts of a scanline (or of a frame).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenBlock {
    FrontPorch,
    Sync,
    BackPorch,
    VisibleArea,
}

impl ScreenBlock {
    /// The block that follows this one.
    pub const fn next(self) -> ScreenBlock {
        match self {
            ScreenBlock::FrontPorch => ScreenBlock::Sync,
            ScreenBlock::Sync => ScreenBlock::BackPorch,
            ScreenBlock::BackPorch => ScreenBlock::VisibleArea,
            ScreenBlock::VisibleArea => ScreenBlock::FrontPorch,
        }
    }

    /// All four blocks, in signal order, starting with `self`.
    pub const fn cycle(self) -> [ScreenBlock; 4] {
        [self, self.next(), self.next().next(), self.next().next().next()]
    }
}

/// Everything we need to know to generate a video mode.
///
/// Horizontal values are in pixels, vertical values are in lines. The
/// vertical values are multiplied by `scan_count` when the frame is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    /// A name for humans
    pub label: String,
    /// The pixel clock
    pub frequency: HertzU32,
    pub h_visible_area: u16,
    pub h_front_porch: u16,
    pub h_sync_pulse: u16,
    pub h_back_porch: u16,
    pub v_visible_area: u16,
    pub v_front_porch: u16,
    pub v_sync_pulse: u16,
    pub v_back_porch: u16,
    pub h_sync_polarity: SyncPolarity,
    pub v_sync_polarity: SyncPolarity,
    /// How many times each line is sent. 2 gives you 320x240 on a 640x480
    /// monitor timing.
    pub scan_count: u8,
    /// Send blank lines instead of repeats for the extra scans
    pub multi_scan_blank: bool,
    /// Which part of the scanline comes first in memory
    pub h_starting_block: ScreenBlock,
}

impl Timings {
    /// Pixels in a full scanline, blanking included.
    pub const fn h_total(&self) -> u32 {
        self.h_visible_area as u32
            + self.h_front_porch as u32
            + self.h_sync_pulse as u32
            + self.h_back_porch as u32
    }

    /// Lines in a frame, before scan multiplication.
    pub const fn v_total(&self) -> u32 {
        self.v_visible_area as u32
            + self.v_front_porch as u32
            + self.v_sync_pulse as u32
            + self.v_back_porch as u32
    }

    /// Scanlines actually sent to the monitor per frame.
    pub const fn scanlines_per_frame(&self) -> u32 {
        self.v_total() * self.scan_count as u32
    }

    /// Width of a horizontal block, in pixels.
    pub const fn h_block_len(&self, block: ScreenBlock) -> u32 {
        (match block {
            ScreenBlock::FrontPorch => self.h_front_porch,
            ScreenBlock::Sync => self.h_sync_pulse,
            ScreenBlock::BackPorch => self.h_back_porch,
            ScreenBlock::VisibleArea => self.h_visible_area,
        }) as u32
    }

    /// Offset of the visible area from the start of each line buffer.
    pub fn h_visible_offset(&self) -> u32 {
        self.h_starting_block
            .cycle()
            .iter()
            .take_while(|b| **b != ScreenBlock::VisibleArea)
            .map(|b| self.h_block_len(*b))
            .sum()
    }

    /// How long the vertical blanking interval lasts.
    ///
    /// This is how long we can spend drawing without the beam reaching the
    /// visible area.
    pub fn vblank_duration(&self) -> MicrosDurationU32 {
        let lines = u64::from(self.v_total() - u32::from(self.v_visible_area))
            * u64::from(self.scan_count);
        let pixels = lines * u64::from(self.h_total());
        let hz = u64::from(self.frequency.to_Hz()).max(1);
        MicrosDurationU32::micros((pixels * 1_000_000 / hz) as u32)
    }

    /// Check these timings describe something we can generate.
    pub fn validate(&self) -> Result<(), Error> {
        if self.h_visible_area == 0
            || self.v_visible_area == 0
            || self.scan_count == 0
            || self.frequency.to_Hz() == 0
            || self.h_total() == 0
            || self.v_total() == 0
        {
            return Err(Error::DegenerateTimings);
        }
        if self.h_total() > MAX_LINE_PIXELS {
            return Err(Error::LineTooLong {
                pixels: self.h_total(),
            });
        }
        Ok(())
    }

    /// Pan the picture by moving pixels (lines) from one porch to the other.
    ///
    /// Positive `dx` moves the picture right, positive `dy` moves it down.
    /// The visible area is not touched.
    pub fn moved(&self, dx: i32, dy: i32) -> Result<Timings, Error> {
        let mut t = self.clone();
        t.h_front_porch = porch(i32::from(self.h_front_porch) - dx)?;
        t.h_back_porch = porch(i32::from(self.h_back_porch) + dx)?;
        t.v_front_porch = porch(i32::from(self.v_front_porch) - dy)?;
        t.v_back_porch = porch(i32::from(self.v_back_porch) + dy)?;
        t.validate()?;
        Ok(t)
    }

    /// Shrink (or, with negative values, grow) both porches on each axis.
    ///
    /// Shorter porches stretch the visible area across more of the screen.
    /// Porches never go below one pixel (line).
    pub fn shrunk(&self, dx: i32, dy: i32) -> Result<Timings, Error> {
        let clamp = |value: u16, delta: i32| -> Result<u16, Error> {
            porch((i32::from(value) - delta).max(1))
        };
        let mut t = self.clone();
        t.h_front_porch = clamp(self.h_front_porch, dx)?;
        t.h_back_porch = clamp(self.h_back_porch, dx)?;
        t.v_front_porch = clamp(self.v_front_porch, dy)?;
        t.v_back_porch = clamp(self.v_back_porch, dy)?;
        t.validate()?;
        Ok(t)
    }
}

impl FromStr for Timings {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_start();
        let Some(s) = s.strip_prefix('"') else {
            return Err(ModelineError::MissingLabel.into());
        };
        let Some(end) = s.find('"') else {
            return Err(ModelineError::UnterminatedLabel.into());
        };
        let label = s[..end].to_string();
        let mut words = s[end + 1..].split_whitespace();

        let clock = words
            .next()
            .ok_or(ModelineError::MissingField("clock"))?;
        let frequency = parse_mhz(clock).ok_or(ModelineError::BadNumber("clock"))?;

        let mut fields = [0u16; 8];
        for (slot, name) in fields.iter_mut().zip(FIELD_NAMES) {
            let word = words.next().ok_or(ModelineError::MissingField(name))?;
            *slot = word.parse().map_err(|_| ModelineError::BadNumber(name))?;
        }
        let [hdisp, hsyncstart, hsyncend, htotal, vdisp, vsyncstart, vsyncend, vtotal] = fields;

        let h_sync_polarity = parse_polarity(words.next(), "hsync")?;
        let v_sync_polarity = parse_polarity(words.next(), "vsync")?;

        let mut scan_count = 1;
        let mut multi_scan_blank = false;
        let mut h_starting_block = ScreenBlock::FrontPorch;
        for word in words {
            if word.eq_ignore_ascii_case("DoubleScan") {
                scan_count = 2;
            } else if word.eq_ignore_ascii_case("QuadScan") {
                scan_count = 4;
            } else if word.eq_ignore_ascii_case("FrontPorchBegins") {
                h_starting_block = ScreenBlock::FrontPorch;
            } else if word.eq_ignore_ascii_case("SyncBegins") {
                h_starting_block = ScreenBlock::Sync;
            } else if word.eq_ignore_ascii_case("BackPorchBegins") {
                h_starting_block = ScreenBlock::BackPorch;
            } else if word.eq_ignore_ascii_case("VisibleBegins") {
                h_starting_block = ScreenBlock::VisibleArea;
            } else if word.eq_ignore_ascii_case("MultiScanBlank") {
                multi_scan_blank = true;
            } else {
                return Err(ModelineError::UnknownOption.into());
            }
        }

        let span = |from: u16, to: u16| to.checked_sub(from).ok_or(Error::DegenerateTimings);
        let timings = Timings {
            label,
            frequency,
            h_visible_area: hdisp,
            h_front_porch: span(hdisp, hsyncstart)?,
            h_sync_pulse: span(hsyncstart, hsyncend)?,
            h_back_porch: span(hsyncend, htotal)?,
            v_visible_area: vdisp,
            v_front_porch: span(vdisp, vsyncstart)?,
            v_sync_pulse: span(vsyncstart, vsyncend)?,
            v_back_porch: span(vsyncend, vtotal)?,
            h_sync_polarity,
            v_sync_polarity,
            scan_count,
            multi_scan_blank,
            h_starting_block,
        };
        timings.validate()?;
        Ok(timings)
    }
}

// -----------------------------------------------------------------------------
// Static and Const Data
// -----------------------------------------------------------------------------

/// A DMA descriptor length field is 12 bits wide.
pub const MAX_LINE_PIXELS: u32 = 4095;

const FIELD_NAMES: [&str; 8] = [
    "hdisp",
    "hsyncstart",
    "hsyncend",
    "htotal",
    "vdisp",
    "vsyncstart",
    "vsyncend",
    "vtotal",
];

/// Some well-known modelines.
pub mod modes {
    /// 640x480 @ 60Hz, the standard VGA mode
    pub const VGA_640X480_60HZ: &str =
        "\"640x480@60Hz\" 25.175 640 656 752 800 480 490 492 525 -HSync -VSync";
    /// 640x400 @ 70Hz, the standard VGA text mode timing
    pub const VGA_640X400_70HZ: &str =
        "\"640x400@70Hz\" 25.175 640 656 752 800 400 412 414 449 -HSync +VSync";
    /// 640x350 @ 70Hz, EGA compatible
    pub const VGA_640X350_70HZ: &str =
        "\"640x350@70Hz\" 25.175 640 656 752 800 350 387 389 449 +HSync -VSync";
    /// 320x240 @ 60Hz, double scanned 640x480
    pub const VGA_320X240_60HZ: &str =
        "\"320x240@60Hz\" 12.6 320 328 376 400 240 245 246 262 -HSync -VSync DoubleScan";
    /// 320x200 @ 75Hz, double scanned
    pub const VGA_320X200_75HZ: &str =
        "\"320x200@75Hz\" 12.93 320 352 376 408 200 208 211 229 -HSync -VSync DoubleScan";
    /// 400x300 @ 60Hz, double scanned 800x600
    pub const SVGA_400X300_60HZ: &str =
        "\"400x300@60Hz\" 20 400 420 484 528 300 301 303 314 +HSync +VSync DoubleScan";
    /// 512x384 @ 60Hz
    pub const VGA_512X384_60HZ: &str =
        "\"512x384@60Hz\" 32.5 512 524 592 668 384 385 388 403 -HSync -VSync";
    /// 800x600 @ 56Hz
    pub const SVGA_800X600_56HZ: &str =
        "\"800x600@56Hz\" 36 800 824 896 1024 600 601 603 625 -HSync -VSync";
}

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

fn porch(value: i32) -> Result<u16, Error> {
    u16::try_from(value).map_err(|_| Error::DegenerateTimings)
}

/// Parse a decimal MHz value (like `25.175`) into an exact frequency.
fn parse_mhz(text: &str) -> Option<HertzU32> {
    let (whole, frac) = match text.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (text, ""),
    };
    if frac.len() > 6 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut hz = whole.parse::<u32>().ok()?.checked_mul(1_000_000)?;
    let mut scale = 100_000;
    for digit in frac.bytes() {
        hz = hz.checked_add(u32::from(digit - b'0') * scale)?;
        scale /= 10;
    }
    Some(HertzU32::Hz(hz))
}

fn parse_polarity(word: Option<&str>, axis: &str) -> Result<SyncPolarity, Error> {
    let word = word.ok_or(ModelineError::BadPolarity)?;
    let (sign, name) = word.split_at_checked(1).ok_or(ModelineError::BadPolarity)?;
    if !name.eq_ignore_ascii_case(axis) {
        return Err(ModelineError::BadPolarity.into());
    }
    match sign {
        "+" => Ok(SyncPolarity::Positive),
        "-" => Ok(SyncPolarity::Negative),
        _ => Err(ModelineError::BadPolarity.into()),
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_vga() {
        let t: Timings = modes::VGA_640X480_60HZ.parse().unwrap();
        assert_eq!(t.label, "640x480@60Hz");
        assert_eq!(t.frequency.to_Hz(), 25_175_000);
        assert_eq!(
            (t.h_visible_area, t.h_front_porch, t.h_sync_pulse, t.h_back_porch),
            (640, 16, 96, 48)
        );
        assert_eq!(
            (t.v_visible_area, t.v_front_porch, t.v_sync_pulse, t.v_back_porch),
            (480, 10, 2, 33)
        );
        assert_eq!(t.h_sync_polarity, SyncPolarity::Negative);
        assert_eq!(t.scan_count, 1);
        assert_eq!(t.h_starting_block, ScreenBlock::FrontPorch);
        assert_eq!(t.h_total(), 800);
        assert_eq!(t.v_total(), 525);
        // front porch, sync and back porch come before the pixels
        assert_eq!(t.h_visible_offset(), 160);
    }

    #[test]
    fn parse_options_case_insensitively() {
        let t: Timings = "\"x\" 12.6 320 328 376 400 240 245 246 262 -hsync +VSYNC doublescan visiblebegins multiscanblank"
            .parse()
            .unwrap();
        assert_eq!(t.scan_count, 2);
        assert!(t.multi_scan_blank);
        assert_eq!(t.h_starting_block, ScreenBlock::VisibleArea);
        assert_eq!(t.v_sync_polarity, SyncPolarity::Positive);
        assert_eq!(t.h_visible_offset(), 0);
        assert_eq!(t.scanlines_per_frame(), 524);
    }

    #[test]
    fn all_presets_parse() {
        for m in [
            modes::VGA_640X480_60HZ,
            modes::VGA_640X400_70HZ,
            modes::VGA_640X350_70HZ,
            modes::VGA_320X240_60HZ,
            modes::VGA_320X200_75HZ,
            modes::SVGA_400X300_60HZ,
            modes::VGA_512X384_60HZ,
            modes::SVGA_800X600_56HZ,
        ] {
            assert!(m.parse::<Timings>().is_ok(), "{m}");
        }
    }

    #[test]
    fn bad_modelines() {
        assert_eq!(
            "640 480".parse::<Timings>(),
            Err(Error::Modeline(ModelineError::MissingLabel))
        );
        assert_eq!(
            "\"a\" 25 640 656 752".parse::<Timings>(),
            Err(Error::Modeline(ModelineError::MissingField("htotal")))
        );
        assert_eq!(
            "\"a\" 25 640 656 752 800 480 490 492 525 HSync -VSync".parse::<Timings>(),
            Err(Error::Modeline(ModelineError::BadPolarity))
        );
        assert_eq!(
            "\"a\" 25 640 656 752 800 480 490 492 525 -HSync -VSync Wobble".parse::<Timings>(),
            Err(Error::Modeline(ModelineError::UnknownOption))
        );
        // sync starts before the visible area ends
        assert_eq!(
            "\"a\" 25 640 600 752 800 480 490 492 525 -HSync -VSync".parse::<Timings>(),
            Err(Error::DegenerateTimings)
        );
        assert_eq!(
            "\"a\" 25 0 0 0 0 480 490 492 525 -HSync -VSync".parse::<Timings>(),
            Err(Error::DegenerateTimings)
        );
    }

    #[test]
    fn move_and_shrink_only_touch_porches() {
        let t: Timings = modes::VGA_640X480_60HZ.parse().unwrap();
        let m = t.moved(8, -3).unwrap();
        assert_eq!((m.h_front_porch, m.h_back_porch), (8, 56));
        assert_eq!((m.v_front_porch, m.v_back_porch), (13, 30));
        assert_eq!(m.h_total(), t.h_total());
        assert_eq!(m.h_visible_area, 640);
        // front porch would go negative
        assert_eq!(t.moved(17, 0), Err(Error::DegenerateTimings));

        let s = t.shrunk(20, 5).unwrap();
        assert_eq!((s.h_front_porch, s.h_back_porch), (1, 28));
        assert_eq!((s.v_front_porch, s.v_back_porch), (5, 28));
        assert_eq!(s.v_visible_area, 480);
    }

    #[test]
    fn vblank_duration() {
        let t: Timings = modes::VGA_640X480_60HZ.parse().unwrap();
        // 45 lines of 800 pixels at 25.175 MHz
        assert_eq!(t.vblank_duration().ticks(), 1429);
    }
}

// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
