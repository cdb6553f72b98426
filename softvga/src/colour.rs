//! Code for handling RGB colours and the bytes we send to the DAC.

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

use crate::timings::SyncPolarity;

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// Represents a 6-bit colour value.
///
/// Each channel has two bits, so valid channel values are `0..=3`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Black (all bits off)
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// White (all bits on)
    pub const WHITE: Rgb = Rgb::new(3, 3, 3);

    /// Make an [`Rgb`] from three 2-bit channel values.
    ///
    /// Only the bottom 2 bits of each channel are retained.
    pub const fn new(r: u8, g: u8, b: u8) -> Rgb {
        Rgb {
            r: r & 0b11,
            g: g & 0b11,
            b: b & 0b11,
        }
    }

    /// Make an [`Rgb`] from a 24-bit RGB triplet.
    ///
    /// Only the top 2 bits of each colour channel are retained.
    pub const fn from_24bit(red: u8, green: u8, blue: u8) -> Rgb {
        Rgb::new(red >> 6, green >> 6, blue >> 6)
    }

    /// Limit every channel to at most `max`.
    pub const fn clamped(self, max: u8) -> Rgb {
        Rgb {
            r: if self.r > max { max } else { self.r },
            g: if self.g > max { max } else { self.g },
            b: if self.b > max { max } else { self.b },
        }
    }
}

/// The sixteen named colours.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Colour {
    Black = 0,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl Colour {
    /// Get a colour from its 4-bit index. Only the bottom four bits are used.
    pub const fn from_index(index: u8) -> Colour {
        COLOUR_TABLE[(index & 0x0F) as usize]
    }

    pub const fn rgb(self) -> Rgb {
        match self {
            Colour::Black => Rgb::new(0, 0, 0),
            Colour::Red => Rgb::new(2, 0, 0),
            Colour::Green => Rgb::new(0, 2, 0),
            Colour::Yellow => Rgb::new(2, 2, 0),
            Colour::Blue => Rgb::new(0, 0, 2),
            Colour::Magenta => Rgb::new(2, 0, 2),
            Colour::Cyan => Rgb::new(0, 2, 2),
            Colour::White => Rgb::new(2, 2, 2),
            Colour::BrightBlack => Rgb::new(1, 1, 1),
            Colour::BrightRed => Rgb::new(3, 0, 0),
            Colour::BrightGreen => Rgb::new(0, 3, 0),
            Colour::BrightYellow => Rgb::new(3, 3, 0),
            Colour::BrightBlue => Rgb::new(0, 0, 3),
            Colour::BrightMagenta => Rgb::new(3, 0, 3),
            Colour::BrightCyan => Rgb::new(0, 3, 3),
            Colour::BrightWhite => Rgb::new(3, 3, 3),
        }
    }
}

impl From<Colour> for Rgb {
    fn from(value: Colour) -> Self {
        value.rgb()
    }
}

/// How many DAC bits we have per colour channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitsPerChannel {
    /// Eight colours (one pin each for R, G and B)
    One,
    /// Sixty-four colours (two pins each for R, G and B)
    Two,
}

impl BitsPerChannel {
    pub const fn bits(self) -> u8 {
        match self {
            BitsPerChannel::One => 1,
            BitsPerChannel::Two => 2,
        }
    }
}

/// Turns colours into the bytes the DMA engine streams out.
///
/// Each byte is `VHBBGGRR`: two bits per channel, then the electrical level
/// of the horizontal and vertical sync pins. Visible pixels carry the
/// inactive sync levels, so the chain never needs to patch them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PixelEncoder {
    bits: BitsPerChannel,
    hsync: SyncPolarity,
    vsync: SyncPolarity,
}

impl PixelEncoder {
    pub const fn new(bits: BitsPerChannel, hsync: SyncPolarity, vsync: SyncPolarity) -> Self {
        PixelEncoder { bits, hsync, vsync }
    }

    pub const fn bits_per_channel(&self) -> BitsPerChannel {
        self.bits
    }

    /// Encode a visible pixel.
    pub const fn encode(&self, rgb: Rgb) -> u8 {
        self.channels(rgb) | self.sync_bits(false, false)
    }

    /// Recover the colour from an encoded pixel.
    pub const fn decode(&self, pixel: u8) -> Rgb {
        Rgb::new(
            pixel & 0b11,
            (pixel >> GREEN_SHIFT) & 0b11,
            (pixel >> BLUE_SHIFT) & 0b11,
        )
    }

    /// The bits of an encoded pixel that carry colour.
    pub const fn colour_mask(&self) -> u8 {
        match self.bits {
            BitsPerChannel::One => 0b0001_0101,
            BitsPerChannel::Two => COLOUR_MASK,
        }
    }

    /// A blanking byte with the given sync pulses asserted.
    pub const fn blank(&self, hsync_active: bool, vsync_active: bool) -> u8 {
        self.sync_bits(hsync_active, vsync_active)
    }

    const fn channels(&self, rgb: Rgb) -> u8 {
        match self.bits {
            // Only the low pin of each channel is wired up
            BitsPerChannel::One => {
                (rgb.r != 0) as u8
                    | ((rgb.g != 0) as u8) << GREEN_SHIFT
                    | ((rgb.b != 0) as u8) << BLUE_SHIFT
            }
            BitsPerChannel::Two => {
                (rgb.r & 0b11) | (rgb.g & 0b11) << GREEN_SHIFT | (rgb.b & 0b11) << BLUE_SHIFT
            }
        }
    }

    const fn sync_bits(&self, hsync_active: bool, vsync_active: bool) -> u8 {
        let h = if hsync_active {
            self.hsync.enabled()
        } else {
            self.hsync.disabled()
        };
        let v = if vsync_active {
            self.vsync.enabled()
        } else {
            self.vsync.disabled()
        };
        (h as u8) << HSYNC_SHIFT | (v as u8) << VSYNC_SHIFT
    }
}

// -----------------------------------------------------------------------------
// Static and Const Data
// -----------------------------------------------------------------------------

/// The colour bits of an encoded pixel.
pub const COLOUR_MASK: u8 = 0b0011_1111;

const GREEN_SHIFT: u8 = 2;
const BLUE_SHIFT: u8 = 4;
const HSYNC_SHIFT: u8 = 6;
const VSYNC_SHIFT: u8 = 7;

const COLOUR_TABLE: [Colour; 16] = [
    Colour::Black,
    Colour::Red,
    Colour::Green,
    Colour::Yellow,
    Colour::Blue,
    Colour::Magenta,
    Colour::Cyan,
    Colour::White,
    Colour::BrightBlack,
    Colour::BrightRed,
    Colour::BrightGreen,
    Colour::BrightYellow,
    Colour::BrightBlue,
    Colour::BrightMagenta,
    Colour::BrightCyan,
    Colour::BrightWhite,
];

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------


// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
