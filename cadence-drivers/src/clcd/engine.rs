//! Display controller state machine
//!
//! The engine owns the GPIO bus handle, the request slot table, and the
//! strobe-phase flag shared by every bus operation. An external scheduler
//! calls [`LcdEngine::poll`] once per tick; each call performs at most one
//! micro-step, so correctness never depends on the tick rate, only
//! throughput does.

use cadence_hal::gpio::{GpioBus, Level, PinConfig, PinId, PinMode, PinSpeed};
use heapless::Vec;

use super::command::{self, CLEAR_DISPLAY};
use super::request::{Progress, RequestKind, SlotTable};
use super::{BusWidth, ConfigError, Font, LcdError, LineCount, COLUMNS, LINES};

/// Minimum polls spent in the function-set phase before the first command is
/// strobed, covering the controller's power-up stabilization window.
const POWER_ON_STABILIZE_TICKS: u8 = 19;

/// Overall engine lifecycle
///
/// Transitions are one-way: Off -> Initializing -> Operational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lifecycle {
    /// Pins not configured yet
    Off,
    /// Power-on command sequence in progress
    Initializing,
    /// Servicing queued requests
    Operational,
}

/// Sub-states of the power-on init sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitPhase {
    PowerOn,
    FunctionSet,
    DisplayControl,
    DisplayClear,
    Done,
}

/// Two-phase enable strobe
///
/// Released: data lines may change. Asserted: enable is high, the next poll
/// drops it and latches the presented byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrobePhase {
    Released,
    Asserted,
}

/// Pin assignment for the parallel display bus
#[derive(Debug, Clone)]
pub struct LcdPins {
    /// Data lines, LSB first; 4 or 8 entries depending on bus width
    pub data: Vec<PinId, 8>,
    pub register_select: PinId,
    pub read_write: PinId,
    pub enable: PinId,
}

/// Display configuration
#[derive(Debug, Clone)]
pub struct LcdConfig {
    pub pins: LcdPins,
    pub bus_width: BusWidth,
    pub lines: LineCount,
    pub font: Font,
    pub display_on: bool,
    pub cursor_on: bool,
    pub blink_on: bool,
}

/// Cooperative character-LCD engine
///
/// `N` is the request-slot capacity. The `'a` lifetime bounds every text
/// slice submitted through [`write_text`](Self::write_text): the engine
/// borrows the bytes until the request is observed complete, it never copies
/// them.
pub struct LcdEngine<'a, B: GpioBus, const N: usize> {
    bus: B,
    config: LcdConfig,
    slots: SlotTable<'a, N>,
    lifecycle: Lifecycle,
    init_phase: InitPhase,
    stabilize: u8,
    strobe: StrobePhase,
    row: u8,
    col: u8,
    /// Index of the slot being serviced; None when idle
    current: Option<usize>,
}

impl<'a, B: GpioBus, const N: usize> LcdEngine<'a, B, N> {
    /// Create an engine over a GPIO bus
    ///
    /// Rejects a configuration whose data-pin count does not match the bus
    /// width; no such mismatch can surface later at run time.
    pub fn new(bus: B, config: LcdConfig) -> Result<Self, ConfigError> {
        if config.pins.data.len() != config.bus_width.pin_count() {
            return Err(ConfigError::DataPinCount);
        }
        Ok(Self {
            bus,
            config,
            slots: SlotTable::new(),
            lifecycle: Lifecycle::Off,
            init_phase: InitPhase::PowerOn,
            stabilize: 0,
            strobe: StrobePhase::Released,
            row: 0,
            col: 0,
            current: None,
        })
    }

    /// Configure all display pins as outputs and start the init sequence
    ///
    /// Returns immediately; the power-on command sequence runs across
    /// subsequent polls.
    pub fn init_asynch(&mut self) {
        for &id in self.config.pins.data.iter() {
            self.bus.configure(&PinConfig {
                id,
                mode: PinMode::OutputPushPull,
                speed: PinSpeed::High,
            });
        }
        for id in [
            self.config.pins.register_select,
            self.config.pins.read_write,
            self.config.pins.enable,
        ] {
            self.bus.configure(&PinConfig {
                id,
                mode: PinMode::OutputPushPull,
                speed: PinSpeed::High,
            });
        }
        self.lifecycle = Lifecycle::Initializing;
        self.init_phase = InitPhase::PowerOn;
        self.stabilize = 0;
    }

    /// Advance one micro-step
    ///
    /// Must be invoked from a single task context only; the engine has no
    /// reentrancy guard.
    pub fn poll(&mut self) {
        match self.lifecycle {
            Lifecycle::Off => {}
            Lifecycle::Initializing => self.poll_init(),
            Lifecycle::Operational => self.poll_request(),
        }
    }

    /// Queue a text write at the current cursor position
    ///
    /// The engine keeps a borrowed view of `text`; the bytes are latched one
    /// character per two polls. An empty slice claims nothing.
    pub fn write_text(&mut self, text: &'a [u8]) -> Result<(), LcdError> {
        if text.is_empty() {
            return Err(LcdError::EmptyText);
        }
        self.submit(RequestKind::Write { text, cursor: 0 })
    }

    /// Queue a cursor move
    ///
    /// `row` must be 0 or 1 (two-line hardware), `col` below 16. Validated
    /// here at submission; the engine trusts queued positions.
    pub fn go_to(&mut self, row: u8, col: u8) -> Result<(), LcdError> {
        if row >= LINES || col >= COLUMNS {
            return Err(LcdError::InvalidPosition);
        }
        self.submit(RequestKind::SetPosition { row, col })
    }

    /// Queue a display clear
    pub fn clear(&mut self) -> Result<(), LcdError> {
        self.submit(RequestKind::Clear)
    }

    /// Queue an arbitrary command byte
    pub fn command(&mut self, byte: u8) -> Result<(), LcdError> {
        self.submit(RequestKind::RawCommand(byte))
    }

    /// Whether the engine has nothing to service
    ///
    /// The only completion signal this engine exposes: callers poll this (or
    /// slot occupancy) instead of registering a callback.
    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Current lifecycle state
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Current init sub-state
    pub fn init_phase(&self) -> InitPhase {
        self.init_phase
    }

    /// Read access to the request table
    pub fn slots(&self) -> &SlotTable<'a, N> {
        &self.slots
    }

    /// Last cursor position the engine set
    pub fn cursor(&self) -> (u8, u8) {
        (self.row, self.col)
    }

    fn submit(&mut self, kind: RequestKind<'a>) -> Result<(), LcdError> {
        let index = self.slots.claim(kind).ok_or(LcdError::BufferFull)?;
        if self.current.is_none() {
            self.current = Some(index);
        }
        Ok(())
    }

    fn poll_init(&mut self) {
        match self.init_phase {
            InitPhase::PowerOn => {
                self.strobe = StrobePhase::Released;
                self.bus.set_level(self.config.pins.enable, Level::Low);
                self.init_phase = InitPhase::FunctionSet;
            }
            InitPhase::FunctionSet => {
                if self.stabilize >= POWER_ON_STABILIZE_TICKS {
                    let byte = command::function_set(
                        self.config.bus_width,
                        self.config.lines,
                        self.config.font,
                    );
                    if self.strobe_command(byte) {
                        self.init_phase = InitPhase::DisplayControl;
                    }
                }
                self.stabilize = self.stabilize.saturating_add(1);
            }
            InitPhase::DisplayControl => {
                let byte = command::display_control(
                    self.config.display_on,
                    self.config.cursor_on,
                    self.config.blink_on,
                );
                if self.strobe_command(byte) {
                    self.init_phase = InitPhase::DisplayClear;
                }
            }
            InitPhase::DisplayClear => {
                if self.strobe_command(CLEAR_DISPLAY) {
                    self.init_phase = InitPhase::Done;
                }
            }
            InitPhase::Done => {
                self.lifecycle = Lifecycle::Operational;
            }
        }
    }

    fn poll_request(&mut self) {
        let Some(current) = self.current else {
            return;
        };
        match self.slots.slot(current).kind {
            RequestKind::Write { .. } => self.poll_write(current),
            RequestKind::Clear => {
                if self.strobe_command(CLEAR_DISPLAY) {
                    self.row = 0;
                    self.col = 0;
                    self.finish(current);
                }
            }
            RequestKind::SetPosition { row, col } => {
                if self.strobe_command(command::ddram_address(row, col)) {
                    self.row = row;
                    self.col = col;
                    self.finish(current);
                }
            }
            RequestKind::RawCommand(byte) => {
                if self.strobe_command(byte) {
                    self.finish(current);
                }
            }
            RequestKind::Done => self.reclaim(current),
            RequestKind::None => {
                // Released slot left current; drop to idle.
                self.current = None;
            }
        }
    }

    fn poll_write(&mut self, current: usize) {
        match self.slots.slot(current).progress {
            Progress::Start => {
                self.slots.slot_mut(current).progress = Progress::InProgress;
            }
            Progress::InProgress => {
                let RequestKind::Write { text, cursor } = self.slots.slot(current).kind else {
                    return;
                };
                if cursor == text.len() {
                    self.finish(current);
                } else if self.strobe_character(text[cursor]) {
                    if let RequestKind::Write { cursor, .. } =
                        &mut self.slots.slot_mut(current).kind
                    {
                        *cursor += 1;
                    }
                    if self.col < COLUMNS - 1 {
                        self.col += 1;
                    }
                }
            }
            Progress::Finished => {}
        }
    }

    /// Mark the current request done; reclaimed on the next poll
    fn finish(&mut self, index: usize) {
        let slot = self.slots.slot_mut(index);
        slot.kind = RequestKind::Done;
        slot.progress = Progress::Finished;
    }

    /// Free the finished slot and pick the next occupied one, scanning
    /// ascending from index 0
    fn reclaim(&mut self, index: usize) {
        self.slots.release(index);
        match self.slots.next_occupied() {
            Some(next) => {
                self.slots.slot_mut(next).progress = Progress::Start;
                self.current = Some(next);
            }
            None => self.current = None,
        }
    }

    /// One strobe step of a command byte; true once the byte is latched
    fn strobe_command(&mut self, byte: u8) -> bool {
        self.strobe_byte(byte, Level::Low)
    }

    /// One strobe step of a character byte; true once the byte is latched
    fn strobe_character(&mut self, byte: u8) -> bool {
        self.strobe_byte(byte, Level::High)
    }

    fn strobe_byte(&mut self, byte: u8, register_select: Level) -> bool {
        match self.strobe {
            StrobePhase::Released => {
                self.present_byte(byte, register_select);
                self.bus.set_level(self.config.pins.enable, Level::High);
                self.strobe = StrobePhase::Asserted;
                false
            }
            StrobePhase::Asserted => {
                self.bus.set_level(self.config.pins.enable, Level::Low);
                self.strobe = StrobePhase::Released;
                true
            }
        }
    }

    /// Drive RS/RW and the data lines for one byte, LSB on data pin 0
    fn present_byte(&mut self, byte: u8, register_select: Level) {
        self.bus
            .set_level(self.config.pins.register_select, register_select);
        self.bus.set_level(self.config.pins.read_write, Level::Low);
        for (bit, &id) in self.config.pins.data.iter().enumerate() {
            self.bus
                .set_level(id, Level::from_bit((byte >> bit) & 1 == 1));
        }
    }
}
