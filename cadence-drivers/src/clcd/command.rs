//! HD44780-style command bytes
//!
//! Command values built from named sub-fields instead of raw magic numbers.
//! RS=low/RW=low selects command mode on the bus; these bytes are what gets
//! latched in that mode.

use super::{BusWidth, Font, LineCount};

/// Clear the display and home the cursor
pub const CLEAR_DISPLAY: u8 = 0x01;

/// Return the cursor to the origin without clearing
pub const RETURN_HOME: u8 = 0x02;

/// Base of the set-DDRAM-address command
const DDRAM_BASE: u8 = 0x80;

/// DDRAM offset of the second display line
const SECOND_LINE_OFFSET: u8 = 0x40;

/// Function-set command: interface width, line count, character font
pub const fn function_set(width: BusWidth, lines: LineCount, font: Font) -> u8 {
    let base: u8 = match width {
        BusWidth::Four => 0x20,
        BusWidth::Eight => 0x30,
    };
    let lines_bit: u8 = match lines {
        LineCount::One => 0,
        LineCount::Two => 1 << 3,
    };
    let font_bit: u8 = match font {
        Font::FiveByEight => 0,
        Font::FiveByEleven => 1 << 2,
    };
    base | lines_bit | font_bit
}

/// Display-control command: display on/off, cursor visibility, cursor blink
pub const fn display_control(display_on: bool, cursor_on: bool, blink_on: bool) -> u8 {
    0x08 | ((display_on as u8) << 2) | ((cursor_on as u8) << 1) | (blink_on as u8)
}

/// Entry-mode command: address counter direction and display shift
pub const fn entry_mode(increment: bool, shift: bool) -> u8 {
    0x04 | ((increment as u8) << 1) | (shift as u8)
}

/// Set-DDRAM-address command for a row/column cursor position
///
/// Row must be 0 or 1 and column below 16; the engine validates positions at
/// submission time, so this just encodes.
pub const fn ddram_address(row: u8, col: u8) -> u8 {
    if row == 0 {
        DDRAM_BASE | col
    } else {
        DDRAM_BASE | (SECOND_LINE_OFFSET + col)
    }
}
