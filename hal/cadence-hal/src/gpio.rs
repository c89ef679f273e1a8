//! GPIO bus abstraction
//!
//! The display driver addresses pins by port letter and pin number through a
//! single bus handle, rather than owning one object per pin. Implementations
//! handle the actual hardware register manipulation for the specific chip.

/// GPIO port identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
}

/// Logic level on a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Level for a single bit of a data byte
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Pin drive mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Input (high impedance)
    Input,
    /// Input with pull-up resistor
    InputPullUp,
    /// Input with pull-down resistor
    InputPullDown,
    /// Output (push-pull)
    OutputPushPull,
    /// Output (open-drain)
    OutputOpenDrain,
}

/// Output slew-rate setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinSpeed {
    Low,
    Medium,
    High,
}

/// A port/pin pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId {
    pub port: Port,
    /// Pin number within the port (0-15)
    pub pin: u8,
}

impl PinId {
    pub const fn new(port: Port, pin: u8) -> Self {
        Self { port, pin }
    }
}

/// Full configuration for one pin
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    pub id: PinId,
    pub mode: PinMode,
    pub speed: PinSpeed,
}

/// GPIO bus access
///
/// The two calls the display protocol driver consumes: pin configuration
/// during init, and level setting on every bus write.
pub trait GpioBus {
    /// Configure a pin's mode and speed
    fn configure(&mut self, config: &PinConfig);

    /// Drive a pin to a logic level
    ///
    /// Only meaningful for pins previously configured as outputs.
    fn set_level(&mut self, id: PinId, level: Level);
}
