//! Glance Hardware Abstraction Layer
//!
//! Traits and settings shared with chip-specific HALs, so the display
//! drivers and the input handling build and test without a target board.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  glance-firmware / glance-drivers       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  glance-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  glance-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::InputPin`] - Digital input (the intent button)
//!
//! [`uart::UartConfig`] describes the pole display's serial link.

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

pub use gpio::InputPin;
pub use uart::UartConfig;
