//! Content apps for the Glance scheduler
//!
//! Each app implements [`glance_core::scheduler::App`]:
//!
//! - [`clock::Clock`] - 12-hour clock with a blinking colon
//! - [`fortune::Fortune`] - compiled-in fortunes, word wrapped to the display
//! - [`derek::derek`], [`play::play`] - scripted routines
//! - [`eightclap::eight_clap`] - scripted cheer, also usable as an intent
//! - [`babyshark::BabyShark`] - only plays on request
//!
//! Scripted routines are tables of [`script::Step`]s.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod babyshark;
pub mod clock;
pub mod derek;
pub mod eightclap;
pub mod fortune;
pub mod play;
pub mod script;
