//! HT16K33 command encoding
//!
//! Every command is a single I2C write. The first byte carries the
//! opcode in its high nibble and parameters in its low nibble:
//!
//! ```text
//! 0x00..0x0F  display RAM address pointer, followed by RAM data
//! 0x20 | S    system setup       S = 1 oscillator on, 0 standby
//! 0x80 | B<<1 | D  display setup  D = display on, B = blink rate
//! 0xE0 | P    dimming            P = duty 1/16 .. 16/16 (0..15)
//! ```

use heapless::Vec;

use lumiseg_core::{BlinkRate, DisplayBuffer, IntensityCode};

use super::layout::{RamLayout, RAM_SIZE};

/// Display RAM address pointer base
pub const DISPLAY_RAM: u8 = 0x00;

/// System setup opcode
pub const SYSTEM_SETUP: u8 = 0x20;

/// Display setup opcode
pub const DISPLAY_SETUP: u8 = 0x80;

/// Dimming set opcode
pub const DIMMING_SET: u8 = 0xE0;

/// Longest command: address pointer plus full RAM
pub const MAX_COMMAND_LEN: usize = RAM_SIZE + 1;

const OPCODE_MASK: u8 = 0xF0;

/// One bus transaction worth of bytes
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    bytes: Vec<u8, MAX_COMMAND_LEN>,
}

impl Command {
    fn single(byte: u8) -> Self {
        let mut bytes = Vec::new();
        // Capacity is always at least 1
        let _ = bytes.push(byte);
        Self { bytes }
    }

    /// Turn the internal system oscillator on (or put the chip in standby)
    pub fn oscillator(on: bool) -> Self {
        Self::single(SYSTEM_SETUP | on as u8)
    }

    /// Turn the display on or off and set the blink rate
    pub fn display_setup(on: bool, blink: BlinkRate) -> Self {
        Self::single(DISPLAY_SETUP | (blink.bits() << 1) | on as u8)
    }

    /// Set the brightness
    pub fn brightness(code: IntensityCode) -> Self {
        Self::single(DIMMING_SET | code.duty_nibble())
    }

    /// Write the whole display RAM starting at address 0
    pub fn display_ram(ram: &[u8; RAM_SIZE]) -> Self {
        let mut bytes = Vec::new();
        let _ = bytes.push(DISPLAY_RAM);
        // 1 + RAM_SIZE == MAX_COMMAND_LEN
        let _ = bytes.extend_from_slice(ram);
        Self { bytes }
    }

    /// Write a display buffer through a RAM layout
    pub fn write_buffer<L, const N: usize>(layout: &L, buffer: &DisplayBuffer<N>) -> Self
    where
        L: RamLayout<N> + ?Sized,
    {
        Self::display_ram(&layout.to_ram(buffer))
    }

    /// Bytes to send
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode the command back into what it asks the chip to do
    pub fn instruction(&self) -> Option<Instruction> {
        Instruction::decode(&self.bytes)
    }
}

/// A decoded HT16K33 command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Instruction {
    /// System setup
    Oscillator {
        /// Oscillator running
        on: bool,
    },
    /// Display setup
    DisplaySetup {
        /// Display enabled
        on: bool,
        /// Blink rate
        blink: BlinkRate,
    },
    /// Dimming set
    Brightness(IntensityCode),
    /// RAM write starting at address 0 covering the whole RAM
    DisplayRam([u8; RAM_SIZE]),
}

impl Instruction {
    /// Decode raw bytes of one transaction
    ///
    /// Partial RAM writes and unknown opcodes yield `None`.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let (&first, rest) = bytes.split_first()?;

        if first == DISPLAY_RAM {
            let ram: [u8; RAM_SIZE] = rest.try_into().ok()?;
            return Some(Instruction::DisplayRam(ram));
        }

        if !rest.is_empty() {
            return None;
        }

        match first & OPCODE_MASK {
            SYSTEM_SETUP => Some(Instruction::Oscillator {
                on: first & 0x01 != 0,
            }),
            DISPLAY_SETUP => {
                let blink = match (first >> 1) & 0b11 {
                    0b00 => BlinkRate::Off,
                    0b01 => BlinkRate::Hz2,
                    0b10 => BlinkRate::Hz1,
                    _ => BlinkRate::HalfHz,
                };
                Some(Instruction::DisplaySetup {
                    on: first & 0x01 != 0,
                    blink,
                })
            }
            DIMMING_SET => IntensityCode::new((first & 0x0F) + 1).map(Instruction::Brightness),
            _ => None,
        }
    }

    /// Buffer carried by a RAM write, read through `layout`
    pub fn buffer<L, const N: usize>(&self, layout: &L) -> Option<DisplayBuffer<N>>
    where
        L: RamLayout<N> + ?Sized,
    {
        match self {
            Instruction::DisplayRam(ram) => Some(layout.from_ram(ram)),
            _ => None,
        }
    }
}
