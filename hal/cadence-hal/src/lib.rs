//! Hardware abstraction traits for the Cadence driver layer
//!
//! This crate contains the seams between the portable driver engines and
//! chip-specific register code:
//!
//! - GPIO bus access (pin configuration, level setting)
//! - The per-channel USART register surface
//!
//! Chip HALs implement these traits; the engines in `cadence-drivers` stay
//! board-agnostic and run against mocks on the host.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod gpio;
pub mod usart;
