//! Serial transfer engine
//!
//! Owns the three channel register surfaces, the per-channel transfer
//! state, and the callback table. Submission methods run in the foreground
//! and return immediately; [`UsartEngine::on_interrupt`] is the bottom-half
//! the channel's IRQ handler must invoke.

use cadence_hal::usart::{
    Direction, FrameSettings, Oversampling, Parity, UsartEvent, UsartRegisters, WordLength,
};

use super::baud::brr_value;
use super::channel::{CallbackTable, ChannelId, ChannelState, TransferHandler, CHANNEL_COUNT};
use super::UsartError;

/// Channel configuration applied by [`UsartEngine::init`]
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UsartConfig {
    /// Peripheral bus clock feeding the channel
    pub clock_hz: u32,
    pub baudrate: u32,
    pub oversampling: Oversampling,
    pub word_length: WordLength,
    pub parity: Parity,
    pub transmitter: bool,
    pub receiver: bool,
    /// Arm the transmit-complete interrupt when a transfer is submitted
    pub transmit_complete_interrupt: bool,
    /// Arm the receive-not-empty interrupt when a transfer is submitted
    pub receive_not_empty_interrupt: bool,
}

impl Default for UsartConfig {
    fn default() -> Self {
        Self {
            clock_hz: 16_000_000,
            baudrate: 115_200,
            oversampling: Oversampling::By16,
            word_length: WordLength::Eight,
            parity: Parity::None,
            transmitter: true,
            receiver: true,
            transmit_complete_interrupt: true,
            receive_not_empty_interrupt: true,
        }
    }
}

/// Interrupt events the configuration asked for
///
/// Stored at init, applied per transfer. Arming only when a transfer is
/// pending keeps an idle channel from firing spuriously.
#[derive(Default, Clone, Copy)]
struct InterruptIntent {
    transmit_complete: bool,
    receive_not_empty: bool,
}

/// Interrupt-driven serial engine over three channels
///
/// The `'a` lifetime bounds every transfer buffer and callback handler the
/// engine borrows. Buffers are never copied: a caller's transmit slice must
/// stay untouched, and a receive slice stays exclusively borrowed, until the
/// transfer completes.
pub struct UsartEngine<'a, B: UsartRegisters> {
    channels: [B; CHANNEL_COUNT],
    states: [ChannelState<'a>; CHANNEL_COUNT],
    callbacks: CallbackTable<'a>,
    intent: InterruptIntent,
}

impl<'a, B: UsartRegisters> UsartEngine<'a, B> {
    /// Create an engine over the channel register surfaces, ordered by
    /// dense channel index
    pub fn new(channels: [B; CHANNEL_COUNT]) -> Self {
        Self {
            channels,
            states: core::array::from_fn(|_| ChannelState::default()),
            callbacks: CallbackTable::new(),
            intent: InterruptIntent::default(),
        }
    }

    /// Program baud rate, frame format, and direction enables
    ///
    /// Records which interrupt events to arm later but does not enable any
    /// interrupt here; arming happens per transfer.
    pub fn init(&mut self, channel: ChannelId, config: &UsartConfig) {
        let bus = &mut self.channels[channel.index()];
        bus.write_baud(brr_value(
            config.clock_hz,
            config.baudrate,
            config.oversampling,
        ));
        bus.configure_frame(&FrameSettings {
            word_length: config.word_length,
            parity: config.parity,
            oversampling: config.oversampling,
            transmitter: config.transmitter,
            receiver: config.receiver,
        });
        bus.enable();
        self.intent = InterruptIntent {
            transmit_complete: config.transmit_complete_interrupt,
            receive_not_empty: config.receive_not_empty_interrupt,
        };
    }

    /// Submit a zero-copy transmit of the whole slice
    ///
    /// The first byte goes to the data register immediately; the interrupt
    /// bottom-half feeds the rest. The engine borrows `data` until the
    /// transfer completes.
    pub fn send_buffer_zero_copy(
        &mut self,
        channel: ChannelId,
        data: &'a [u8],
    ) -> Result<(), UsartError> {
        if data.is_empty() {
            return Err(UsartError::EmptyBuffer);
        }
        let index = channel.index();
        if self.states[index].tx.busy {
            return Err(UsartError::Busy);
        }

        self.channels[index].write_data(data[0]);
        let tx = &mut self.states[index].tx;
        tx.busy = true;
        tx.index = 1;
        tx.len = data.len();
        tx.buffer = Some(data);
        if self.intent.transmit_complete {
            self.channels[index].enable_interrupt(UsartEvent::TransmitComplete);
        }
        Ok(())
    }

    /// Submit a single byte asynchronously
    pub fn send_byte(&mut self, channel: ChannelId, byte: u8) -> Result<(), UsartError> {
        let index = channel.index();
        if self.states[index].tx.busy {
            return Err(UsartError::Busy);
        }

        self.channels[index].write_data(byte);
        let tx = &mut self.states[index].tx;
        tx.busy = true;
        tx.index = 1;
        tx.len = 1;
        tx.buffer = None;
        if self.intent.transmit_complete {
            self.channels[index].enable_interrupt(UsartEvent::TransmitComplete);
        }
        Ok(())
    }

    /// Submit a receive into `dest[start_index..len]`
    ///
    /// `len` is the end index within `dest`, exclusive; the transfer
    /// completes once that index is reached. The engine holds the exclusive
    /// borrow of `dest` until then.
    pub fn receive_buffer(
        &mut self,
        channel: ChannelId,
        dest: &'a mut [u8],
        start_index: usize,
        len: usize,
    ) -> Result<(), UsartError> {
        if dest.is_empty() {
            return Err(UsartError::EmptyBuffer);
        }
        if start_index >= len || len > dest.len() {
            return Err(UsartError::InvalidRange);
        }
        let index = channel.index();
        if self.states[index].rx.busy {
            return Err(UsartError::Busy);
        }

        let rx = &mut self.states[index].rx;
        rx.busy = true;
        rx.index = start_index;
        rx.len = len;
        rx.buffer = Some(dest);
        if self.intent.receive_not_empty {
            self.channels[index].enable_interrupt(UsartEvent::ReceiveNotEmpty);
        }
        Ok(())
    }

    /// Busy-wait transmit of one byte
    ///
    /// Bypasses the asynchronous state entirely. Must not be interleaved
    /// with a pending asynchronous transmit on the same channel.
    pub fn send_byte_blocking(&mut self, channel: ChannelId, byte: u8) {
        let bus = &mut self.channels[channel.index()];
        bus.write_data(byte);
        while !bus.transmit_complete() {}
    }

    /// Busy-wait receive of one byte
    ///
    /// Same precondition as [`send_byte_blocking`](Self::send_byte_blocking):
    /// no pending asynchronous receive on the channel.
    pub fn receive_byte_blocking(&mut self, channel: ChannelId) -> u8 {
        let bus = &mut self.channels[channel.index()];
        while !bus.receive_not_empty() {}
        bus.read_data()
    }

    /// Register (or overwrite) a completion handler for one channel and
    /// direction
    pub fn register_callback(
        &mut self,
        channel: ChannelId,
        direction: Direction,
        handler: &'a dyn TransferHandler,
    ) {
        self.callbacks.register(channel, direction, handler);
    }

    /// Whether a transmit is pending on the channel
    pub fn tx_busy(&self, channel: ChannelId) -> bool {
        self.states[channel.index()].tx.busy
    }

    /// Whether a receive is pending on the channel
    pub fn rx_busy(&self, channel: ChannelId) -> bool {
        self.states[channel.index()].rx.busy
    }

    /// Interrupt bottom-half for one channel
    ///
    /// Invoke from the channel's IRQ handler on every interrupt event.
    /// Advances a pending transmit by one byte, or finishes it and fires the
    /// transmit callback; stores one received byte, or finishes the receive
    /// and fires the receive callback. Completion clears the busy flag and
    /// length before the callback runs, so a handler observes the channel
    /// already released.
    pub fn on_interrupt(&mut self, channel: ChannelId) {
        let index = channel.index();

        if self.channels[index].transmit_complete() {
            let tx = &mut self.states[index].tx;
            if tx.index == tx.len {
                tx.busy = false;
                tx.len = 0;
                tx.buffer = None;
                if let Some(handler) = self.callbacks.get(channel, Direction::Transmit) {
                    handler.on_complete(channel, Direction::Transmit);
                }
                self.channels[index].clear_flag(UsartEvent::TransmitComplete);
            } else {
                self.channels[index].clear_flag(UsartEvent::TransmitComplete);
                if let Some(buffer) = tx.buffer {
                    self.channels[index].write_data(buffer[tx.index]);
                    tx.index += 1;
                }
            }
        }

        if self.states[index].rx.busy && self.channels[index].receive_not_empty() {
            let byte = self.channels[index].read_data();
            let rx = &mut self.states[index].rx;
            if let Some(buffer) = rx.buffer.as_mut() {
                buffer[rx.index] = byte;
            }
            rx.index += 1;
            if rx.index == rx.len {
                self.channels[index].clear_flag(UsartEvent::ReceiveNotEmpty);
                let rx = &mut self.states[index].rx;
                rx.busy = false;
                rx.len = 0;
                if let Some(handler) = self.callbacks.get(channel, Direction::Receive) {
                    handler.on_complete(channel, Direction::Receive);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    /// Register surface stand-in: records traffic, flags are driven by the
    /// test to play the hardware's part.
    #[derive(Default)]
    struct MockUsart {
        brr: u16,
        frame: Option<FrameSettings>,
        enabled: bool,
        written: std::vec::Vec<u8>,
        rx_queue: std::collections::VecDeque<u8>,
        transmit_complete: bool,
        receive_not_empty: bool,
        armed: std::vec::Vec<UsartEvent>,
        cleared: std::vec::Vec<UsartEvent>,
    }

    impl UsartRegisters for MockUsart {
        fn write_baud(&mut self, value: u16) {
            self.brr = value;
        }

        fn configure_frame(&mut self, settings: &FrameSettings) {
            self.frame = Some(*settings);
        }

        fn enable(&mut self) {
            self.enabled = true;
        }

        fn write_data(&mut self, byte: u8) {
            self.written.push(byte);
        }

        fn read_data(&mut self) -> u8 {
            self.rx_queue.pop_front().unwrap_or(0)
        }

        fn transmit_complete(&self) -> bool {
            self.transmit_complete
        }

        fn receive_not_empty(&self) -> bool {
            self.receive_not_empty
        }

        fn clear_flag(&mut self, event: UsartEvent) {
            match event {
                UsartEvent::TransmitComplete => self.transmit_complete = false,
                UsartEvent::ReceiveNotEmpty => self.receive_not_empty = false,
            }
            self.cleared.push(event);
        }

        fn enable_interrupt(&mut self, event: UsartEvent) {
            self.armed.push(event);
        }
    }

    fn engine<'a>() -> UsartEngine<'a, MockUsart> {
        let mut engine = UsartEngine::new([
            MockUsart::default(),
            MockUsart::default(),
            MockUsart::default(),
        ]);
        engine.init(ChannelId::Usart1, &UsartConfig::default());
        engine
    }

    struct Recorder {
        calls: Cell<usize>,
        last: Cell<Option<(ChannelId, Direction)>>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
                last: Cell::new(None),
            }
        }
    }

    impl TransferHandler for Recorder {
        fn on_complete(&self, channel: ChannelId, direction: Direction) {
            self.calls.set(self.calls.get() + 1);
            self.last.set(Some((channel, direction)));
        }
    }

    #[test]
    fn init_programs_baud_and_frame_without_arming() {
        let mut engine = UsartEngine::new([
            MockUsart::default(),
            MockUsart::default(),
            MockUsart::default(),
        ]);
        engine.init(
            ChannelId::Usart2,
            &UsartConfig {
                baudrate: 9600,
                ..UsartConfig::default()
            },
        );

        let bus = &engine.channels[1];
        assert_eq!(bus.brr, 0x682);
        assert!(bus.enabled);
        assert_eq!(bus.frame.unwrap().word_length, WordLength::Eight);
        // Interrupts are armed per transfer, never at init.
        assert!(bus.armed.is_empty());
    }

    #[test]
    fn send_buffer_writes_first_byte_and_arms() {
        let mut engine = engine();
        engine
            .send_buffer_zero_copy(ChannelId::Usart1, b"abc")
            .unwrap();

        assert!(engine.tx_busy(ChannelId::Usart1));
        assert_eq!(engine.channels[0].written, vec![b'a']);
        assert_eq!(
            engine.channels[0].armed,
            vec![UsartEvent::TransmitComplete]
        );
        assert_eq!(engine.states[0].tx.index, 1);
        assert_eq!(engine.states[0].tx.len, 3);
    }

    #[test]
    fn empty_send_rejected_without_state_change() {
        let mut engine = engine();
        assert_eq!(
            engine.send_buffer_zero_copy(ChannelId::Usart1, b""),
            Err(UsartError::EmptyBuffer)
        );
        assert!(!engine.tx_busy(ChannelId::Usart1));
        assert!(engine.channels[0].written.is_empty());
    }

    #[test]
    fn busy_channel_rejects_and_preserves_indices() {
        let mut engine = engine();
        engine
            .send_buffer_zero_copy(ChannelId::Usart1, b"abc")
            .unwrap();
        assert_eq!(
            engine.send_buffer_zero_copy(ChannelId::Usart1, b"xyz"),
            Err(UsartError::Busy)
        );
        assert_eq!(engine.states[0].tx.index, 1);
        assert_eq!(engine.states[0].tx.len, 3);

        // Drive the transfer to completion through the bottom-half.
        for _ in 0..3 {
            engine.channels[0].transmit_complete = true;
            engine.on_interrupt(ChannelId::Usart1);
        }
        assert!(!engine.tx_busy(ChannelId::Usart1));
        assert_eq!(engine.channels[0].written, b"abc".to_vec());

        // Released channel accepts the next transfer.
        assert_eq!(engine.send_buffer_zero_copy(ChannelId::Usart1, b"xyz"), Ok(()));
    }

    #[test]
    fn transmit_callback_fires_once_after_release() {
        let recorder = Recorder::new();
        let mut engine = engine();
        engine.register_callback(ChannelId::Usart1, Direction::Transmit, &recorder);
        engine
            .send_buffer_zero_copy(ChannelId::Usart1, b"hi")
            .unwrap();

        // One event per remaining byte, one for completion.
        engine.channels[0].transmit_complete = true;
        engine.on_interrupt(ChannelId::Usart1);
        assert_eq!(recorder.calls.get(), 0);

        engine.channels[0].transmit_complete = true;
        engine.on_interrupt(ChannelId::Usart1);
        assert_eq!(recorder.calls.get(), 1);
        assert_eq!(
            recorder.last.get(),
            Some((ChannelId::Usart1, Direction::Transmit))
        );
        assert!(!engine.tx_busy(ChannelId::Usart1));
        assert_eq!(engine.states[0].tx.len, 0);

        // A stale event after completion must not re-fire the callback.
        engine.channels[0].transmit_complete = true;
        engine.on_interrupt(ChannelId::Usart1);
        assert_eq!(recorder.calls.get(), 1);
    }

    #[test]
    fn send_byte_is_a_single_byte_transfer() {
        let recorder = Recorder::new();
        let mut engine = engine();
        engine.register_callback(ChannelId::Usart1, Direction::Transmit, &recorder);
        engine.send_byte(ChannelId::Usart1, 0x55).unwrap();
        assert!(engine.tx_busy(ChannelId::Usart1));
        assert_eq!(engine.channels[0].written, vec![0x55]);

        engine.channels[0].transmit_complete = true;
        engine.on_interrupt(ChannelId::Usart1);
        assert!(!engine.tx_busy(ChannelId::Usart1));
        assert_eq!(recorder.calls.get(), 1);
    }

    #[test]
    fn receive_fills_requested_range_and_fires_callback() {
        let recorder = Recorder::new();
        let mut dest = [0u8; 4];
        {
            let mut engine = engine();
            engine.register_callback(ChannelId::Usart1, Direction::Receive, &recorder);
            engine
                .receive_buffer(ChannelId::Usart1, &mut dest, 1, 4)
                .unwrap();
            assert!(engine.rx_busy(ChannelId::Usart1));
            assert_eq!(engine.channels[0].armed, vec![UsartEvent::ReceiveNotEmpty]);

            for byte in [0x10, 0x20, 0x30] {
                engine.channels[0].rx_queue.push_back(byte);
                engine.channels[0].receive_not_empty = true;
                engine.on_interrupt(ChannelId::Usart1);
            }
            assert!(!engine.rx_busy(ChannelId::Usart1));
            assert_eq!(engine.states[0].rx.len, 0);
            assert_eq!(recorder.calls.get(), 1);
            assert_eq!(
                recorder.last.get(),
                Some((ChannelId::Usart1, Direction::Receive))
            );
        }
        assert_eq!(dest, [0, 0x10, 0x20, 0x30]);
    }

    #[test]
    fn receive_events_ignored_while_not_armed() {
        let mut engine = engine();
        engine.channels[0].rx_queue.push_back(0x42);
        engine.channels[0].receive_not_empty = true;
        engine.on_interrupt(ChannelId::Usart1);
        // No pending receive: the byte stays in the data register.
        assert_eq!(engine.channels[0].rx_queue.len(), 1);
    }

    #[test]
    fn receive_range_validation() {
        let mut dest = [0u8; 4];
        let mut engine = engine();
        assert_eq!(
            engine.receive_buffer(ChannelId::Usart1, &mut dest, 0, 5),
            Err(UsartError::InvalidRange)
        );
        let mut dest = [0u8; 4];
        assert_eq!(
            engine.receive_buffer(ChannelId::Usart1, &mut dest, 4, 4),
            Err(UsartError::InvalidRange)
        );
        let mut empty: [u8; 0] = [];
        assert_eq!(
            engine.receive_buffer(ChannelId::Usart1, &mut empty, 0, 0),
            Err(UsartError::EmptyBuffer)
        );
    }

    #[test]
    fn channels_are_independent() {
        let mut engine = engine();
        engine
            .send_buffer_zero_copy(ChannelId::Usart1, b"abc")
            .unwrap();
        assert!(!engine.tx_busy(ChannelId::Usart6));
        assert_eq!(engine.send_byte(ChannelId::Usart6, 0x01), Ok(()));
        assert_eq!(engine.channels[2].written, vec![0x01]);
    }

    #[test]
    fn blocking_byte_paths_bypass_transfer_state() {
        let mut engine = engine();
        engine.channels[0].transmit_complete = true;
        engine.send_byte_blocking(ChannelId::Usart1, 0x7E);
        assert_eq!(engine.channels[0].written, vec![0x7E]);
        assert!(!engine.tx_busy(ChannelId::Usart1));

        engine.channels[0].rx_queue.push_back(0x99);
        engine.channels[0].receive_not_empty = true;
        assert_eq!(engine.receive_byte_blocking(ChannelId::Usart1), 0x99);
        assert!(!engine.rx_busy(ChannelId::Usart1));
    }
}
