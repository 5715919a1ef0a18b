//! RP2040-specific HAL for the Glance firmware
//!
//! Implements the shared `glance-hal` traits on top of `embassy-rp`:
//!
//! - UART configuration for the pole display link
//! - GPIO input for the intent button
//! - UART pin mapping checks

#![no_std]

pub mod gpio;
pub mod uart;

// Re-export shared traits from glance-hal for convenience
pub use glance_hal::{InputPin, UartConfig};
