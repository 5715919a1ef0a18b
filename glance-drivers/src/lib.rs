//! Display driver implementations
//!
//! Concrete [`glance_core::display::Display`] implementations for real
//! hardware:
//!
//! - HP LD220 customer pole display (serial)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod ld220;

pub use ld220::Ld220;
