//! Display RAM layouts
//!
//! The HT16K33 has 16 bytes of display RAM (8 rows x 16 columns). Which
//! byte lights which digit depends on how the backpack is wired, so the
//! mapping lives behind [`RamLayout`].

use lumiseg_core::DisplayBuffer;

/// Size of the HT16K33 display RAM in bytes
pub const RAM_SIZE: usize = 16;

/// Mapping between digit positions and display RAM addresses
pub trait RamLayout<const N: usize> {
    /// RAM address of the digit at `pos` (`pos < N`)
    fn digit_address(&self, pos: usize) -> u8;

    /// RAM address and bit mask of the colon, if the display has one
    fn colon(&self) -> Option<(u8, u8)>;

    /// Full RAM image for a buffer; unused bytes are zero
    fn to_ram(&self, buffer: &DisplayBuffer<N>) -> [u8; RAM_SIZE] {
        let mut ram = [0u8; RAM_SIZE];

        for (pos, &segments) in buffer.digits().iter().enumerate() {
            if let Some(slot) = ram.get_mut(self.digit_address(pos) as usize) {
                *slot = segments;
            }
        }

        if let Some((address, mask)) = self.colon() {
            if buffer.colon() {
                if let Some(slot) = ram.get_mut(address as usize) {
                    *slot |= mask;
                }
            }
        }

        ram
    }

    /// Buffer described by a RAM image
    fn from_ram(&self, ram: &[u8; RAM_SIZE]) -> DisplayBuffer<N> {
        let mut buffer = DisplayBuffer::new();

        for pos in 0..N {
            let segments = ram
                .get(self.digit_address(pos) as usize)
                .copied()
                .unwrap_or(0);
            buffer.set_digit(pos, segments);
        }

        if let Some((address, mask)) = self.colon() {
            let on = ram.get(address as usize).is_some_and(|b| b & mask != 0);
            buffer.set_colon(on);
        }

        buffer
    }
}

/// 4-digit 7-segment backpack with center colon
///
/// Digits sit on rows 0, 1, 3 and 4 (even addresses 0x00, 0x02, 0x06,
/// 0x08); row 2 (0x04) carries the colon on bit 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SevenSegment4;

impl SevenSegment4 {
    const DIGIT_ADDRESSES: [u8; 4] = [0x00, 0x02, 0x06, 0x08];
    const COLON_ADDRESS: u8 = 0x04;
    const COLON_MASK: u8 = 0x02;
}

impl RamLayout<4> for SevenSegment4 {
    fn digit_address(&self, pos: usize) -> u8 {
        Self::DIGIT_ADDRESSES[pos]
    }

    fn colon(&self) -> Option<(u8, u8)> {
        Some((Self::COLON_ADDRESS, Self::COLON_MASK))
    }
}

/// Position `i` at address `i`, no colon
///
/// Fits bargraphs and 8x16 matrices driven column by column. `N` above
/// [`RAM_SIZE`] cannot be represented; extra positions are dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Linear;

impl<const N: usize> RamLayout<N> for Linear {
    fn digit_address(&self, pos: usize) -> u8 {
        // Out of range positions land past the RAM and are skipped
        u8::try_from(pos).unwrap_or(u8::MAX)
    }

    fn colon(&self) -> Option<(u8, u8)> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seven_segment_addresses() {
        let mut buffer = DisplayBuffer::from_digits([0x06, 0x5B, 0x4F, 0x66]);
        buffer.set_colon(true);
        let ram = SevenSegment4.to_ram(&buffer);

        assert_eq!(ram[0x00], 0x06);
        assert_eq!(ram[0x02], 0x5B);
        assert_eq!(ram[0x04], 0x02);
        assert_eq!(ram[0x06], 0x4F);
        assert_eq!(ram[0x08], 0x66);
        // Odd bytes and unused rows stay dark
        for addr in [1usize, 3, 5, 7, 9, 10, 11, 12, 13, 14, 15] {
            assert_eq!(ram[addr], 0, "address {addr}");
        }
    }

    #[test]
    fn test_seven_segment_colon_off() {
        let buffer = DisplayBuffer::from_digits([0xFF; 4]);
        let ram = SevenSegment4.to_ram(&buffer);
        assert_eq!(ram[0x04], 0);
    }

    #[test]
    fn test_seven_segment_from_ram() {
        let mut buffer = DisplayBuffer::from_digits([0x3F, 0x00, 0x7F, 0x80]);
        buffer.set_colon(true);
        let ram = SevenSegment4.to_ram(&buffer);
        assert_eq!(SevenSegment4.from_ram(&ram), buffer);
    }

    #[test]
    fn test_linear_layout() {
        let buffer = DisplayBuffer::from_digits([1, 2, 3, 4, 5, 6, 7, 8]);
        let ram = RamLayout::<8>::to_ram(&Linear, &buffer);
        assert_eq!(&ram[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&ram[8..], &[0; 8]);
        assert_eq!(RamLayout::<8>::from_ram(&Linear, &ram), buffer);
    }

    #[test]
    fn test_linear_drops_positions_past_ram() {
        let mut digits = [0u8; 300];
        digits[16] = 0x11;
        digits[256] = 0xAA;
        digits[272] = 0xBB;
        let buffer = DisplayBuffer::from_digits(digits);

        let ram = RamLayout::<300>::to_ram(&Linear, &buffer);
        assert_eq!(ram, [0u8; RAM_SIZE]);
    }
}
