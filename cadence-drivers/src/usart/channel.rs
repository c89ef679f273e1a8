//! Channel identity, per-channel transfer state, and callback dispatch

use cadence_hal::usart::Direction;

use super::UsartError;

/// Number of physical channels the engine manages
pub const CHANNEL_COUNT: usize = 3;

/// Physical serial channel
///
/// The hardware instances are sparse (USART1, USART2, USART6 on the F4
/// family); this enum is the dense mapping onto table indices {0, 1, 2}.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelId {
    Usart1,
    Usart2,
    Usart6,
}

impl ChannelId {
    /// Dense table index for this channel
    pub const fn index(self) -> usize {
        match self {
            ChannelId::Usart1 => 0,
            ChannelId::Usart2 => 1,
            ChannelId::Usart6 => 2,
        }
    }

    /// Resolve a dense index back to a channel
    pub fn from_index(index: usize) -> Result<Self, UsartError> {
        match index {
            0 => Ok(ChannelId::Usart1),
            1 => Ok(ChannelId::Usart2),
            2 => Ok(ChannelId::Usart6),
            _ => Err(UsartError::InvalidChannel),
        }
    }
}

/// Transmit half of a channel's state
///
/// While `busy` is set the bottom-half owns `index`/`len`; foreground code
/// may only read the flag.
#[derive(Default)]
pub(crate) struct TxState<'a> {
    pub busy: bool,
    pub index: usize,
    pub len: usize,
    /// Borrowed caller buffer, valid only while `busy`
    pub buffer: Option<&'a [u8]>,
}

/// Receive half of a channel's state
#[derive(Default)]
pub(crate) struct RxState<'a> {
    pub busy: bool,
    pub index: usize,
    pub len: usize,
    /// Borrowed caller buffer, valid only while `busy`
    pub buffer: Option<&'a mut [u8]>,
}

/// Both directions of one channel
#[derive(Default)]
pub(crate) struct ChannelState<'a> {
    pub tx: TxState<'a>,
    pub rx: RxState<'a>,
}

/// Completion notification, invoked from interrupt context
///
/// Handlers run inside the bottom-half: keep them short and do not submit
/// new transfers from within one.
pub trait TransferHandler {
    fn on_complete(&self, channel: ChannelId, direction: Direction);
}

/// Fixed (channel x direction) map of completion handlers
///
/// Written by registration from the foreground, read by the bottom-half.
pub(crate) struct CallbackTable<'a> {
    entries: [[Option<&'a dyn TransferHandler>; 2]; CHANNEL_COUNT],
}

impl<'a> CallbackTable<'a> {
    pub const fn new() -> Self {
        Self {
            entries: [[None; 2]; CHANNEL_COUNT],
        }
    }

    const fn direction_index(direction: Direction) -> usize {
        match direction {
            Direction::Transmit => 0,
            Direction::Receive => 1,
        }
    }

    /// Set (or overwrite) the handler for one channel and direction
    pub fn register(
        &mut self,
        channel: ChannelId,
        direction: Direction,
        handler: &'a dyn TransferHandler,
    ) {
        self.entries[channel.index()][Self::direction_index(direction)] = Some(handler);
    }

    pub fn get(&self, channel: ChannelId, direction: Direction) -> Option<&'a dyn TransferHandler> {
        self.entries[channel.index()][Self::direction_index(direction)]
    }
}
