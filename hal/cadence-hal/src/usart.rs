//! USART register-surface abstraction
//!
//! One trait per physical channel covering the register accesses the serial
//! engine needs: baud-rate programming, frame configuration, data register
//! traffic, status flags, and per-event interrupt arming. Chip HALs map these
//! onto the real SR/DR/BRR/CR1 registers; the host test suite maps them onto
//! a mock.

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WordLength {
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Receiver oversampling mode
///
/// Determines the divisor granularity of the baud-rate generator: 16x
/// sampling uses a 4-bit fraction, 8x sampling doubles the divisor range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oversampling {
    By16,
    By8,
}

impl Oversampling {
    /// Value of the OVER8 control bit
    pub const fn over8(self) -> u32 {
        match self {
            Oversampling::By16 => 0,
            Oversampling::By8 => 1,
        }
    }
}

/// Transfer direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Transmit,
    Receive,
}

/// Interrupt-generating hardware events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsartEvent {
    /// Transmit-complete flag set
    TransmitComplete,
    /// Receive-data-register-not-empty flag set
    ReceiveNotEmpty,
}

/// Frame and direction configuration applied to the control registers
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameSettings {
    pub word_length: WordLength,
    pub parity: Parity,
    pub oversampling: Oversampling,
    /// Transmitter direction enable
    pub transmitter: bool,
    /// Receiver direction enable
    pub receiver: bool,
}

/// Per-channel USART register surface
///
/// Implementations must not buffer: every call maps directly onto a register
/// access so the engine's micro-step ordering is preserved.
pub trait UsartRegisters {
    /// Program the baud-rate register with a packed mantissa/fraction value
    /// (`mantissa << 4 | fraction`)
    fn write_baud(&mut self, value: u16);

    /// Apply word length, parity, oversampling, and direction enables
    fn configure_frame(&mut self, settings: &FrameSettings);

    /// Set the master peripheral enable bit
    fn enable(&mut self);

    /// Write one byte to the data register
    fn write_data(&mut self, byte: u8);

    /// Read one byte from the data register
    fn read_data(&mut self) -> u8;

    /// Transmit-complete status flag
    fn transmit_complete(&self) -> bool;

    /// Receive-data-register-not-empty status flag
    fn receive_not_empty(&self) -> bool;

    /// Clear one status flag
    fn clear_flag(&mut self, event: UsartEvent);

    /// Enable interrupt generation for one event
    fn enable_interrupt(&mut self, event: UsartEvent);
}
