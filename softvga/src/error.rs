//! Errors reported by the controller.
//!
//! Nothing in here is ever produced inside the vertical sync handler. If
//! something goes wrong there, that frame's work is skipped instead.

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
// Types
// -----------------------------------------------------------------------------

/// Why a modeline string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModelineError {
    /// The string didn't start with a quoted label
    MissingLabel,
    /// The label had no closing quote
    UnterminatedLabel,
    /// A numeric field was missing
    MissingField(&'static str),
    /// A numeric field could not be parsed
    BadNumber(&'static str),
    /// Expected `+HSync`, `-HSync`, `+VSync` or `-VSync`
    BadPolarity,
    /// A trailing word we don't understand
    UnknownOption,
}

/// All the ways the controller can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The modeline text was malformed
    Modeline(ModelineError),
    /// The timings describe an empty or impossible raster: zero visible
    /// area, a negative porch, a zero-length line or frame, a zero scan
    /// count or a zero pixel clock.
    DegenerateTimings,
    /// A scanline is longer than a single DMA descriptor can carry
    LineTooLong {
        /// Pixels in the line
        pixels: u32,
    },
    /// We ran out of memory for the frame buffer or the descriptor chain.
    OutOfMemory {
        /// How many units (rows, or descriptors) we wanted
        requested: usize,
        /// How many we managed to get
        allocated: usize,
    },
    /// No resolution has been configured yet
    NotConfigured,
}

impl From<ModelineError> for Error {
    fn from(value: ModelineError) -> Self {
        Error::Modeline(value)
    }
}

impl core::fmt::Display for ModelineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ModelineError::MissingLabel => write!(f, "modeline must start with a quoted label"),
            ModelineError::UnterminatedLabel => write!(f, "modeline label is missing its closing quote"),
            ModelineError::MissingField(name) => write!(f, "modeline is missing the {name} field"),
            ModelineError::BadNumber(name) => write!(f, "modeline field {name} is not a number"),
            ModelineError::BadPolarity => write!(f, "modeline sync polarity must be +HSync/-HSync then +VSync/-VSync"),
            ModelineError::UnknownOption => write!(f, "modeline has an unknown option"),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Modeline(e) => write!(f, "bad modeline: {e}"),
            Error::DegenerateTimings => write!(f, "timings describe an empty or negative raster"),
            Error::LineTooLong { pixels } => {
                write!(f, "a {pixels} pixel line is too long for one DMA descriptor")
            }
            Error::OutOfMemory {
                requested,
                allocated,
            } => write!(f, "out of memory: wanted {requested}, got {allocated}"),
            Error::NotConfigured => write!(f, "no resolution has been set"),
        }
    }
}

impl core::error::Error for ModelineError {}

impl core::error::Error for Error {}

// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
