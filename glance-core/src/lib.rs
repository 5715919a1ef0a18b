//! Board-agnostic core logic for the Glance display controller
//!
//! This crate contains everything that does not depend on specific
//! hardware:
//!
//! - The display contract, the in-memory screen, fan-out and access gate
//! - The round-robin scheduler with deadlines and intents
//! - Cooperative cancellation tokens
//! - Scheduler configuration

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod cancel;
pub mod config;
pub mod display;
pub mod scheduler;
