//! HT16K33 LED controller
//!
//! Holtek's 16x8 LED driver with I2C interface, used on the common
//! 7-segment, 14-segment and matrix backpacks.

pub mod command;
pub mod display;
pub mod layout;

pub use command::{Command, Instruction};
pub use display::{
    DeviceState, Ht16k33, InitError, SevenSegmentDisplay, TickOutcome, TickReport,
};
pub use layout::{Linear, RamLayout, SevenSegment4, RAM_SIZE};
