//! Display buffer
//!
//! One segment byte per digit position plus the colon indicator found on
//! clock-style backpacks. Segment bits follow the HT16K33 7-segment wiring:
//!
//! ```text
//!      A            bit 0 = A   bit 4 = E
//!     ---           bit 1 = B   bit 5 = F
//!  F |   | B        bit 2 = C   bit 6 = G
//!     -G-           bit 3 = D   bit 7 = DP
//!  E |   | C
//!     ---  .DP
//!      D
//! ```

/// Segment contents for `N` digit positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayBuffer<const N: usize> {
    digits: [u8; N],
    colon: bool,
}

impl<const N: usize> Default for DisplayBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DisplayBuffer<N> {
    /// Number of digit positions
    pub const LEN: usize = N;

    /// Blank buffer
    pub const fn new() -> Self {
        Self {
            digits: [0; N],
            colon: false,
        }
    }

    /// Buffer from raw segment bytes
    pub const fn from_digits(digits: [u8; N]) -> Self {
        Self {
            digits,
            colon: false,
        }
    }

    /// Blank every position and the colon
    pub fn clear(&mut self) {
        self.digits = [0; N];
        self.colon = false;
    }

    /// Segment byte at a position, `None` past the end
    pub fn digit(&self, pos: usize) -> Option<u8> {
        self.digits.get(pos).copied()
    }

    /// Set the segment byte at a position
    ///
    /// Returns false (and changes nothing) past the end.
    pub fn set_digit(&mut self, pos: usize, segments: u8) -> bool {
        match self.digits.get_mut(pos) {
            Some(slot) => {
                *slot = segments;
                true
            }
            None => false,
        }
    }

    /// All segment bytes in position order
    pub fn digits(&self) -> &[u8; N] {
        &self.digits
    }

    /// Mutable access to all segment bytes
    pub fn digits_mut(&mut self) -> &mut [u8; N] {
        &mut self.digits
    }

    /// Colon indicator state
    pub fn colon(&self) -> bool {
        self.colon
    }

    /// Turn the colon indicator on or off
    pub fn set_colon(&mut self, on: bool) {
        self.colon = on;
    }

    /// Copy turned 180 degrees for upside-down mounting
    ///
    /// Digit order is reversed and every digit is rotated in place. The
    /// colon sits in the middle of the display and is left alone.
    pub fn rotated(&self) -> Self {
        let mut digits = self.digits;
        digits.reverse();
        for segments in digits.iter_mut() {
            *segments = rotate_segments(*segments);
        }
        Self {
            digits,
            colon: self.colon,
        }
    }
}

/// Rotate one digit's segments by 180 degrees
///
/// A/D, B/E and C/F swap places; G and DP keep their bits.
pub const fn rotate_segments(segments: u8) -> u8 {
    let abc = segments & 0x07;
    let def = (segments >> 3) & 0x07;
    (segments & 0xC0) | (abc << 3) | def
}
