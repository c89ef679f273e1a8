//! Driver engines for the Cadence peripheral layer
//!
//! Two engines that turn blocking hardware protocols into non-blocking,
//! cooperatively scheduled operations:
//!
//! - [`clcd`]: a character-LCD request queue advanced one bus micro-step per
//!   scheduler tick
//! - [`usart`]: byte-wise zero-copy serial transfers advanced from the
//!   interrupt bottom-half
//!
//! Both are generic over the `cadence-hal` traits and carry no chip code.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clcd;
pub mod usart;
