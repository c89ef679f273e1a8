//! Character-LCD request engine
//!
//! A fixed-capacity queue of display requests drained by a cooperative state
//! machine. The external scheduler calls [`LcdEngine::poll`] periodically;
//! every invocation advances exactly one micro-step of the parallel-bus
//! protocol, so no call ever blocks. Each logical byte written to the
//! display costs two polls: one to present the data lines and assert the
//! enable strobe, one to release it and latch the byte.
//!
//! Submissions are non-blocking and fail fast: [`LcdError::BufferFull`] when
//! all request slots are occupied, [`LcdError::InvalidPosition`] for a cursor
//! target outside the 2x16 panel. Completion has no callback; callers that
//! need it poll [`LcdEngine::is_idle`].

mod command;
mod engine;
mod request;

pub use command::{
    ddram_address, display_control, entry_mode, function_set, CLEAR_DISPLAY, RETURN_HOME,
};
pub use engine::{InitPhase, LcdConfig, LcdEngine, LcdPins, Lifecycle};
pub use request::{Progress, RequestKind, SlotTable};

/// Display columns per line
pub const COLUMNS: u8 = 16;

/// Display lines (two-line hardware)
pub const LINES: u8 = 2;

/// Errors surfaced at submission or construction time
///
/// Nothing is reported after a request has been accepted; a queued request
/// runs to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LcdError {
    /// Write submitted with an empty text slice
    EmptyText,
    /// Cursor target outside the panel (row 0-1, column 0-15)
    InvalidPosition,
    /// All request slots occupied; retry after the engine drains
    BufferFull,
}

/// Construction-time configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Number of data pins does not match the configured bus width
    DataPinCount,
}

/// Parallel bus width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusWidth {
    Four,
    Eight,
}

impl BusWidth {
    /// Number of data pins this width drives
    pub const fn pin_count(self) -> usize {
        match self {
            BusWidth::Four => 4,
            BusWidth::Eight => 8,
        }
    }
}

/// Line-count field of the function-set command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineCount {
    One,
    Two,
}

/// Character-cell font field of the function-set command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    FiveByEight,
    FiveByEleven,
}
