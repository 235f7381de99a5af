//! Display content
//!
//! Uptime as MM:SS (HH:MM after the first hour) with the colon blinking
//! once per second.

use embassy_time::Instant;

use lumiseg_core::{DisplayBuffer, Render};

/// Segment patterns for 0-9 (bit 0 = A .. bit 6 = G)
const DIGITS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];

/// Segment pattern of a decimal digit
pub fn segments(digit: u8) -> u8 {
    DIGITS[(digit % 10) as usize]
}

/// Renders the time since boot
pub struct UptimeClock;

impl UptimeClock {
    fn draw(buffer: &mut DisplayBuffer<4>, secs: u64) {
        let (major, minor) = if secs < 3600 {
            (secs / 60, secs % 60)
        } else {
            ((secs / 3600) % 100, (secs / 60) % 60)
        };

        let digits = [major / 10, major % 10, minor / 10, minor % 10];
        for (pos, d) in digits.iter().enumerate() {
            buffer.set_digit(pos, segments(*d as u8));
        }
        buffer.set_colon(secs % 2 == 0);
    }
}

impl Render<4> for UptimeClock {
    fn render(&mut self, buffer: &mut DisplayBuffer<4>) {
        Self::draw(buffer, Instant::now().as_secs());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_seconds() {
        let mut buffer = DisplayBuffer::new();
        UptimeClock::draw(&mut buffer, 125);
        assert_eq!(buffer.digits(), &[0x3F, 0x5B, 0x3F, 0x6D]);
        assert!(!buffer.colon());
    }

    #[test]
    fn test_hours_minutes() {
        let mut buffer = DisplayBuffer::new();
        UptimeClock::draw(&mut buffer, 3 * 3600 + 7 * 60);
        assert_eq!(buffer.digits(), &[0x3F, 0x4F, 0x3F, 0x07]);
        assert!(buffer.colon());
    }
}
