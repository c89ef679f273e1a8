//! Interrupt-driven USART transfer engine
//!
//! Byte-wise, zero-copy transmit and receive across up to three physical
//! channels. Foreground code submits a transfer and returns immediately; the
//! hardware interrupt drives [`UsartEngine::on_interrupt`], which advances
//! the transfer one byte per event and fires a registered
//! [`TransferHandler`] on completion.
//!
//! The per-channel, per-direction busy flag is the only synchronization
//! primitive: setting it at submission is the acquire, the bottom-half
//! clearing it on completion is the release. While a flag is set, only the
//! bottom-half may touch that transfer's indices; while clear, only a
//! foreground submission may arm them. This is a single-writer handoff, not
//! a lock: concurrent foreground submissions on one channel beyond the busy
//! check, or mixing the blocking byte APIs with a pending asynchronous
//! transfer on the same channel, are caller errors the engine does not
//! detect.

mod baud;
mod channel;
mod engine;

pub use baud::brr_value;
pub use cadence_hal::usart::Direction;
pub use channel::{ChannelId, TransferHandler, CHANNEL_COUNT};
pub use engine::{UsartConfig, UsartEngine};

/// Errors surfaced at submission time only
///
/// Once a transfer is accepted it runs to completion (or indefinitely if the
/// hardware never signals; there is no watchdog here).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsartError {
    /// Transfer submitted with an empty buffer
    EmptyBuffer,
    /// Index does not map to a physical channel
    InvalidChannel,
    /// Requested range falls outside the destination buffer
    InvalidRange,
    /// Channel already mid-transfer in that direction; retry later
    Busy,
}
