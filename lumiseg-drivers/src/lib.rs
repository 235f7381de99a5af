//! Hardware driver implementations
//!
//! This crate provides concrete implementations on top of the traits in
//! lumiseg-core and lumiseg-hal:
//!
//! - HT16K33 LED controller (command encoding, RAM layouts, refresh driver)
//! - Ambient light sensor on an ADC channel

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod ht16k33;
pub mod sensor;
